//! Servant registry shared by every transport.
//!
//! The registry is the object adapter of one endpoint: it assigns object
//! keys to servants and routes incoming calls to them.

use std::sync::Arc;

use bytes::Bytes;
use dashmap::DashMap;
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::BrokerError;
use crate::object::{ObjectAdapter, ObjectRef, Servant};

pub struct ServantRegistry {
    endpoint: String,
    servants: DashMap<String, Arc<dyn Servant>>,
}

impl std::fmt::Debug for ServantRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServantRegistry")
            .field("endpoint", &self.endpoint)
            .field("servants", &self.servants.len())
            .finish()
    }
}

impl ServantRegistry {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            servants: DashMap::new(),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn len(&self) -> usize {
        self.servants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.servants.is_empty()
    }

    fn servant(&self, object_key: &str) -> Result<Arc<dyn Servant>, BrokerError> {
        self.servants
            .get(object_key)
            .map(|s| Arc::clone(s.value()))
            .ok_or_else(|| {
                BrokerError::ObjectNotExist(format!("{}#{object_key}", self.endpoint))
            })
    }

    /// Routes one call to the servant registered under `object_key`.
    pub async fn dispatch(
        &self,
        object_key: &str,
        operation: &str,
        payload: Bytes,
    ) -> Result<Bytes, BrokerError> {
        let servant = self.servant(object_key)?;
        debug!(object_key, operation, "dispatching");
        servant.dispatch(operation, payload).await
    }

    pub fn is_a(&self, object_key: &str, type_id: &str) -> Result<bool, BrokerError> {
        Ok(self.servant(object_key)?.is_a(type_id))
    }

    pub fn non_existent(&self, object_key: &str) -> bool {
        !self.servants.contains_key(object_key)
    }
}

impl ObjectAdapter for ServantRegistry {
    fn activate(&self, servant: Arc<dyn Servant>) -> Result<ObjectRef, BrokerError> {
        let key = Uuid::new_v4().simple().to_string();
        let object = ObjectRef::new(self.endpoint.clone(), key.clone(), servant.type_id());
        self.servants.insert(key, servant);
        info!(object = %object, "servant activated");
        Ok(object)
    }

    fn deactivate(&self, object: &ObjectRef) -> Result<(), BrokerError> {
        if object.endpoint != self.endpoint || self.servants.remove(&object.object_key).is_none() {
            return Err(BrokerError::ObjectNotExist(object.to_string()));
        }
        info!(object = %object, "servant deactivated");
        Ok(())
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use async_trait::async_trait;

    struct Echo;

    #[async_trait]
    impl Servant for Echo {
        fn type_id(&self) -> &str {
            "IDL:test/Echo:1.0"
        }

        async fn dispatch(&self, operation: &str, payload: Bytes) -> Result<Bytes, BrokerError> {
            match operation {
                "echo" => Ok(payload),
                _ => Err(BrokerError::BadOperation {
                    type_id: self.type_id().to_owned(),
                    operation: operation.to_owned(),
                }),
            }
        }
    }

    #[tokio::test]
    async fn test_activate_dispatch_deactivate() {
        let registry = ServantRegistry::new("mem://server");
        let object = registry.activate(Arc::new(Echo)).unwrap();
        assert_eq!(object.endpoint, "mem://server");
        assert_eq!(object.type_id, "IDL:test/Echo:1.0");

        let reply = registry
            .dispatch(&object.object_key, "echo", Bytes::from_static(b"hi"))
            .await
            .unwrap();
        assert_eq!(reply, Bytes::from_static(b"hi"));
        assert!(registry.is_a(&object.object_key, "IDL:test/Echo:1.0").unwrap());
        assert!(!registry.non_existent(&object.object_key));

        registry.deactivate(&object).unwrap();
        assert!(registry.non_existent(&object.object_key));
        assert!(matches!(
            registry.dispatch(&object.object_key, "echo", Bytes::new()).await,
            Err(BrokerError::ObjectNotExist(_))
        ));
        assert!(registry.deactivate(&object).is_err());
    }

    #[tokio::test]
    async fn test_unknown_operation_is_bad_operation() {
        let registry = ServantRegistry::new("mem://server");
        let object = registry.activate(Arc::new(Echo)).unwrap();
        let err = registry
            .dispatch(&object.object_key, "shout", Bytes::new())
            .await
            .unwrap_err();
        assert!(matches!(err, BrokerError::BadOperation { .. }));
    }
}
