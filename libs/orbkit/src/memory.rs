//! In-memory broker.
//!
//! A [`MemoryNetwork`] stands in for the network: it owns one naming service
//! and a table of reachable endpoints. Every [`MemoryBroker`] created from it
//! hosts its own endpoint. Disconnecting an endpoint makes its objects
//! unreachable the same way a crashed server would be, and taking the naming
//! service offline makes every naming call fail with `Unavailable`.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use bytes::Bytes;
use dashmap::DashMap;
use tracing::debug;
use uuid::Uuid;

use crate::adapter::ServantRegistry;
use crate::broker::Broker;
use crate::error::BrokerError;
use crate::naming::{Binding, NamePath, NamingContext};
use crate::naming_tree::{NamingTree, ROOT_CONTEXT};
use crate::object::{ObjectAdapter, ObjectRef};

#[derive(Debug)]
pub struct MemoryNetwork {
    naming: Arc<NamingTree>,
    endpoints: DashMap<String, Arc<ServantRegistry>>,
    naming_online: AtomicBool,
}

impl MemoryNetwork {
    #[must_use]
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            naming: Arc::new(NamingTree::new()),
            endpoints: DashMap::new(),
            naming_online: AtomicBool::new(true),
        })
    }

    pub fn naming_tree(&self) -> &Arc<NamingTree> {
        &self.naming
    }

    /// Creates a broker hosting `endpoint`. An endpoint that was disconnected
    /// comes back empty.
    pub fn broker(self: &Arc<Self>, endpoint: impl Into<String>) -> MemoryBroker {
        let endpoint = endpoint.into();
        let registry = Arc::new(ServantRegistry::new(endpoint.clone()));
        self.endpoints.insert(endpoint, Arc::clone(&registry));
        MemoryBroker {
            network: Arc::clone(self),
            registry,
        }
    }

    /// Drops `endpoint` from the network.
    pub fn disconnect(&self, endpoint: &str) {
        if self.endpoints.remove(endpoint).is_some() {
            debug!(endpoint, "endpoint disconnected");
        }
    }

    pub fn set_naming_online(&self, online: bool) {
        self.naming_online.store(online, Ordering::SeqCst);
    }

    fn check_naming(&self) -> Result<(), BrokerError> {
        if self.naming_online.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(BrokerError::Unavailable("naming service is offline".to_owned()))
        }
    }

    fn registry(&self, endpoint: &str) -> Result<Arc<ServantRegistry>, BrokerError> {
        self.endpoints
            .get(endpoint)
            .map(|r| Arc::clone(r.value()))
            .ok_or_else(|| BrokerError::Unavailable(format!("no route to {endpoint}")))
    }
}

/// Broker handle bound to one endpoint of a [`MemoryNetwork`].
#[derive(Debug, Clone)]
pub struct MemoryBroker {
    network: Arc<MemoryNetwork>,
    registry: Arc<ServantRegistry>,
}

impl MemoryBroker {
    pub fn endpoint(&self) -> &str {
        self.registry.endpoint()
    }
}

#[async_trait]
impl Broker for MemoryBroker {
    async fn resolve_naming_root(&self) -> Result<Arc<dyn NamingContext>, BrokerError> {
        self.network.check_naming()?;
        Ok(Arc::new(MemoryNamingContext {
            network: Arc::clone(&self.network),
            ctx: ROOT_CONTEXT,
        }))
    }

    async fn resolve_object_adapter(&self) -> Result<Arc<dyn ObjectAdapter>, BrokerError> {
        Ok(self.registry.clone())
    }

    async fn invoke(
        &self,
        target: &ObjectRef,
        operation: &str,
        payload: Bytes,
    ) -> Result<Bytes, BrokerError> {
        self.network
            .registry(&target.endpoint)?
            .dispatch(&target.object_key, operation, payload)
            .await
    }

    async fn is_a(&self, target: &ObjectRef, type_id: &str) -> Result<bool, BrokerError> {
        self.network
            .registry(&target.endpoint)?
            .is_a(&target.object_key, type_id)
    }

    async fn non_existent(&self, target: &ObjectRef) -> Result<bool, BrokerError> {
        Ok(self
            .network
            .registry(&target.endpoint)?
            .non_existent(&target.object_key))
    }

    async fn shutdown(&self) {
        self.network.disconnect(self.registry.endpoint());
    }
}

/// A context of the network's naming tree.
#[derive(Debug)]
pub struct MemoryNamingContext {
    network: Arc<MemoryNetwork>,
    ctx: Uuid,
}

impl MemoryNamingContext {
    fn tree(&self) -> Result<&NamingTree, BrokerError> {
        self.network.check_naming()?;
        Ok(&self.network.naming)
    }

    fn child(&self, ctx: Uuid) -> Arc<dyn NamingContext> {
        Arc::new(Self {
            network: Arc::clone(&self.network),
            ctx,
        })
    }
}

#[async_trait]
impl NamingContext for MemoryNamingContext {
    async fn bind_new_context(
        &self,
        name: &NamePath,
    ) -> Result<Arc<dyn NamingContext>, BrokerError> {
        let id = self.tree()?.bind_new_context(self.ctx, name)?;
        Ok(self.child(id))
    }

    async fn resolve(&self, name: &NamePath) -> Result<ObjectRef, BrokerError> {
        self.tree()?.resolve(self.ctx, name)
    }

    async fn resolve_context(
        &self,
        name: &NamePath,
    ) -> Result<Arc<dyn NamingContext>, BrokerError> {
        let id = self.tree()?.resolve_context(self.ctx, name)?;
        Ok(self.child(id))
    }

    async fn rebind(&self, name: &NamePath, object: ObjectRef) -> Result<(), BrokerError> {
        self.tree()?.rebind(self.ctx, name, object)
    }

    async fn unbind(&self, name: &NamePath) -> Result<(), BrokerError> {
        self.tree()?.unbind(self.ctx, name)
    }

    async fn list(&self, how_many: usize) -> Result<Vec<Binding>, BrokerError> {
        self.tree()?.list(self.ctx, how_many)
    }
}
