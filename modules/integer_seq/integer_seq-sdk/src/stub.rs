//! Client-side typed stub.

use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use orbkit::{Broker, BrokerError, ObjectRef, RemoteInterface};

use crate::api::{IntegerSequence, Response};
use crate::wire::{self, Int32Value, ResponseList, ResponseMsg, StringValue, Unit};
use crate::TYPE_ID;

/// Remote integer sequence reached through a broker.
///
/// Obtained with [`orbkit::narrow`]; every method is one round trip.
#[derive(Clone)]
pub struct IntegerSequenceRef {
    broker: Arc<dyn Broker>,
    object: ObjectRef,
}

impl std::fmt::Debug for IntegerSequenceRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IntegerSequenceRef")
            .field("object", &self.object)
            .finish_non_exhaustive()
    }
}

impl RemoteInterface for IntegerSequenceRef {
    const TYPE_ID: &'static str = TYPE_ID;

    fn from_ref(broker: Arc<dyn Broker>, object: ObjectRef) -> Self {
        Self { broker, object }
    }

    fn object_ref(&self) -> &ObjectRef {
        &self.object
    }
}

impl IntegerSequenceRef {
    async fn call(&self, operation: &str, payload: Bytes) -> Result<Bytes, BrokerError> {
        self.broker.invoke(&self.object, operation, payload).await
    }
}

#[async_trait]
impl IntegerSequence for IntegerSequenceRef {
    async fn name(&self) -> Result<String, BrokerError> {
        let reply = self.call(wire::OP_NAME, wire::encode(&Unit {})).await?;
        Ok(wire::decode::<StringValue>(reply)?.value)
    }

    async fn description(&self) -> Result<String, BrokerError> {
        let reply = self.call(wire::OP_DESCRIPTION, wire::encode(&Unit {})).await?;
        Ok(wire::decode::<StringValue>(reply)?.value)
    }

    async fn max_index(&self) -> Result<i32, BrokerError> {
        let reply = self.call(wire::OP_MAX_INDEX, wire::encode(&Unit {})).await?;
        Ok(wire::decode::<Int32Value>(reply)?.value)
    }

    async fn value_at(&self, index: i32) -> Result<Response, BrokerError> {
        let request = wire::ValueAtRequest { index };
        let reply = self.call(wire::OP_VALUE_AT, wire::encode(&request)).await?;
        wire::decode::<ResponseMsg>(reply)?.try_into()
    }

    async fn values_at(&self, indices: &[i32]) -> Result<Vec<Response>, BrokerError> {
        let request = wire::ValuesAtRequest {
            indices: indices.to_vec(),
        };
        let reply = self.call(wire::OP_VALUES_AT, wire::encode(&request)).await?;
        let list = wire::decode::<ResponseList>(reply)?;
        if list.responses.len() != indices.len() {
            return Err(BrokerError::Marshal(format!(
                "expected {} responses, got {}",
                indices.len(),
                list.responses.len()
            )));
        }
        list.responses.into_iter().map(Response::try_from).collect()
    }
}
