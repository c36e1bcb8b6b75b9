//! Server-side adapter from [`IntegerSequence`] to [`Servant`].

use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use orbkit::{BrokerError, Servant};

use crate::api::IntegerSequence;
use crate::wire::{self, Int32Value, ResponseList, ResponseMsg, StringValue};
use crate::TYPE_ID;

/// Decodes incoming calls and forwards them to a local implementation.
pub struct IntegerSequenceServant {
    inner: Arc<dyn IntegerSequence>,
}

impl IntegerSequenceServant {
    pub fn new(inner: Arc<dyn IntegerSequence>) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl Servant for IntegerSequenceServant {
    fn type_id(&self) -> &str {
        TYPE_ID
    }

    async fn dispatch(&self, operation: &str, payload: Bytes) -> Result<Bytes, BrokerError> {
        match operation {
            wire::OP_NAME => Ok(wire::encode(&StringValue {
                value: self.inner.name().await?,
            })),
            wire::OP_DESCRIPTION => Ok(wire::encode(&StringValue {
                value: self.inner.description().await?,
            })),
            wire::OP_MAX_INDEX => Ok(wire::encode(&Int32Value {
                value: self.inner.max_index().await?,
            })),
            wire::OP_VALUE_AT => {
                let request: wire::ValueAtRequest = wire::decode(payload)?;
                let response = self.inner.value_at(request.index).await?;
                Ok(wire::encode(&ResponseMsg::from(response)))
            }
            wire::OP_VALUES_AT => {
                let request: wire::ValuesAtRequest = wire::decode(payload)?;
                let responses = self.inner.values_at(&request.indices).await?;
                Ok(wire::encode(&ResponseList {
                    responses: responses.into_iter().map(ResponseMsg::from).collect(),
                }))
            }
            other => Err(BrokerError::BadOperation {
                type_id: TYPE_ID.to_owned(),
                operation: other.to_owned(),
            }),
        }
    }
}
