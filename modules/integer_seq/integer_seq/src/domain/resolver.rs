//! Type-checked resolution of raw references.

use std::sync::Arc;

use orbkit::{Broker, BrokerError, NarrowError, ObjectRef, RemoteInterface, narrow, probe};
use tracing::debug;

use super::error::DirectoryError;
use super::name::Name;

/// Narrows `object` to `I`, then confirms the endpoint still answers.
///
/// A bound name whose server is gone yields
/// [`DirectoryError::ServiceUnreachable`], never `NameNotFound`.
///
/// # Errors
/// [`DirectoryError::IncompatibleService`] on a type mismatch,
/// [`DirectoryError::ServiceUnreachable`] if the probe fails.
pub async fn narrow_live<I: RemoteInterface>(
    broker: Arc<dyn Broker>,
    name: &Name,
    object: ObjectRef,
) -> Result<I, DirectoryError> {
    let typed = narrow::<I>(Arc::clone(&broker), object)
        .await
        .map_err(|e| match e {
            NarrowError::Incompatible { expected, actual } => DirectoryError::IncompatibleService {
                name: name.to_string(),
                expected,
                actual,
            },
            NarrowError::Broker(e) if e.is_unreachable() => {
                DirectoryError::ServiceUnreachable(name.to_string())
            }
            NarrowError::Broker(BrokerError::ObjectNotExist(_)) => {
                DirectoryError::ServiceUnreachable(name.to_string())
            }
            NarrowError::Broker(e) => DirectoryError::Broker(e),
        })?;

    if !probe(broker.as_ref(), typed.object_ref()).await {
        debug!(%name, object = %typed.object_ref(), "bound service does not answer");
        return Err(DirectoryError::ServiceUnreachable(name.to_string()));
    }
    Ok(typed)
}
