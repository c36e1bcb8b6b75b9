//! Checked conversion of raw references into typed stubs.

use std::sync::Arc;

use tracing::debug;

use crate::broker::Broker;
use crate::error::BrokerError;
use crate::object::ObjectRef;

/// A client-side stub for one remote interface.
///
/// Each interface implements this once; [`narrow`] is then instantiated per
/// interface at compile time.
pub trait RemoteInterface: Sized + Send + Sync {
    /// Repository id of the interface, e.g. `IDL:demo/IntegerSequence:1.0`.
    const TYPE_ID: &'static str;

    fn from_ref(broker: Arc<dyn Broker>, object: ObjectRef) -> Self;

    fn object_ref(&self) -> &ObjectRef;
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum NarrowError {
    #[error("object of type '{actual}' is not compatible with '{expected}'")]
    Incompatible { expected: String, actual: String },

    #[error(transparent)]
    Broker(#[from] BrokerError),
}

/// Narrows `object` to the interface `I`.
///
/// References that advertise exactly `I::TYPE_ID` are accepted locally;
/// anything else is confirmed with a remote `is_a` call.
pub async fn narrow<I: RemoteInterface>(
    broker: Arc<dyn Broker>,
    object: ObjectRef,
) -> Result<I, NarrowError> {
    if object.type_id != I::TYPE_ID {
        debug!(
            advertised = %object.type_id,
            expected = I::TYPE_ID,
            "type id differs, asking the object"
        );
        if !broker.is_a(&object, I::TYPE_ID).await? {
            return Err(NarrowError::Incompatible {
                expected: I::TYPE_ID.to_owned(),
                actual: object.type_id,
            });
        }
    }
    Ok(I::from_ref(broker, object))
}

/// Liveness probe. Any broker failure counts as "not reachable".
pub async fn probe(broker: &dyn Broker, object: &ObjectRef) -> bool {
    match broker.non_existent(object).await {
        Ok(gone) => !gone,
        Err(e) => {
            debug!(object = %object, error = %e, "liveness probe failed");
            false
        }
    }
}
