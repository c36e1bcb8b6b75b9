#![allow(clippy::unwrap_used, clippy::expect_used, dead_code)]

//! Common test utilities for integer_seq integration tests

use std::sync::Arc;

use integer_seq::{
    Name, Publication, SequenceImplementation, ServiceDirectory, ServiceRegistrar, StaleFilter,
};
use integer_seq_sdk::Response;
use orbkit::Broker;
use orbkit::memory::MemoryNetwork;

pub const DIRECTORY: &str = "integer-seq";

/// `factor * index`, up to `max_index`.
pub struct Linear {
    pub id: &'static str,
    pub kind: &'static str,
    pub factor: i64,
    pub max_index: i32,
}

impl Linear {
    pub fn arc(id: &'static str, kind: &'static str, factor: i64) -> Arc<dyn SequenceImplementation> {
        Arc::new(Self {
            id,
            kind,
            factor,
            max_index: 1000,
        })
    }
}

impl SequenceImplementation for Linear {
    fn name(&self) -> &str {
        "Linear sequence"
    }

    fn description(&self) -> &str {
        "factor * n"
    }

    fn max_index(&self) -> i32 {
        self.max_index
    }

    fn directory_name(&self) -> Name {
        Name::new(self.id, self.kind)
    }

    fn compute(&self, index: i32) -> anyhow::Result<Response> {
        Ok(Response::Int(self.factor * i64::from(index)))
    }
}

pub fn directory_for(net: &Arc<MemoryNetwork>, endpoint: &str) -> ServiceDirectory {
    let broker: Arc<dyn Broker> = Arc::new(net.broker(endpoint));
    ServiceDirectory::new(broker, DIRECTORY).unwrap()
}

/// Publishes `implementations` from a fresh server endpoint.
pub async fn publish_from(
    net: &Arc<MemoryNetwork>,
    endpoint: &str,
    implementations: &[Arc<dyn SequenceImplementation>],
) -> Publication {
    let directory = directory_for(net, endpoint);
    ServiceRegistrar::new(&directory, 100)
        .publish(implementations, &StaleFilter::none())
        .await
        .unwrap()
}
