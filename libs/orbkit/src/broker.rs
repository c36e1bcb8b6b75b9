//! The broker connection contract.

use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;

use crate::error::BrokerError;
use crate::naming::NamingContext;
use crate::object::{ObjectAdapter, ObjectRef};

/// One explicitly constructed connection to a remote object system.
///
/// A broker is created by the application, passed to whoever needs it and
/// torn down with [`Broker::shutdown`] before the process exits.
#[async_trait]
pub trait Broker: Send + Sync {
    /// Returns the root context of the naming service.
    async fn resolve_naming_root(&self) -> Result<Arc<dyn NamingContext>, BrokerError>;

    /// Returns the adapter used to publish local servants. Only servers need it.
    async fn resolve_object_adapter(&self) -> Result<Arc<dyn ObjectAdapter>, BrokerError>;

    /// Performs one request/response call on a remote object.
    async fn invoke(
        &self,
        target: &ObjectRef,
        operation: &str,
        payload: Bytes,
    ) -> Result<Bytes, BrokerError>;

    /// Asks the remote object whether it implements `type_id`.
    async fn is_a(&self, target: &ObjectRef, type_id: &str) -> Result<bool, BrokerError>;

    /// True if the endpoint answers but no longer hosts the object.
    async fn non_existent(&self, target: &ObjectRef) -> Result<bool, BrokerError>;

    /// Releases connections and stops any hosted servants.
    async fn shutdown(&self);
}
