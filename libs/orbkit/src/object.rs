//! Object references, servants and object adapters.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;

use crate::error::BrokerError;

/// Opaque, broker-issued handle to a remote object.
///
/// `type_id` is the most derived interface the publisher advertised; it is a
/// hint for narrowing, the remote `is_a` check is authoritative.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ObjectRef {
    pub endpoint: String,
    pub object_key: String,
    pub type_id: String,
}

impl ObjectRef {
    pub fn new(
        endpoint: impl Into<String>,
        object_key: impl Into<String>,
        type_id: impl Into<String>,
    ) -> Self {
        Self {
            endpoint: endpoint.into(),
            object_key: object_key.into(),
            type_id: type_id.into(),
        }
    }
}

impl fmt::Display for ObjectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}#{}", self.type_id, self.endpoint, self.object_key)
    }
}

/// Server-side implementation of a remote interface.
///
/// The broker hands every incoming call to `dispatch` with the operation name
/// and the encoded arguments; the servant returns the encoded result.
#[async_trait]
pub trait Servant: Send + Sync {
    fn type_id(&self) -> &str;

    fn is_a(&self, type_id: &str) -> bool {
        self.type_id() == type_id
    }

    async fn dispatch(&self, operation: &str, payload: Bytes) -> Result<Bytes, BrokerError>;
}

/// Turns local servants into remotely addressable references.
pub trait ObjectAdapter: Send + Sync {
    /// Registers the servant and returns a reference other processes can call.
    fn activate(&self, servant: Arc<dyn Servant>) -> Result<ObjectRef, BrokerError>;

    /// Stops serving the object. Later calls through the reference fail with
    /// `ObjectNotExist`.
    fn deactivate(&self, object: &ObjectRef) -> Result<(), BrokerError>;
}
