//! Client-side broker over gRPC.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use dashmap::DashMap;
use orbkit::naming_tree::ROOT_CONTEXT;
use orbkit::{
    Binding, Broker, BrokerError, NamePath, NamingContext, ObjectAdapter, ObjectRef,
    ServantRegistry,
};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tokio::net::TcpListener;
use tokio::sync::OnceCell;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tonic::transport::Channel;

use crate::client::{GrpcClientConfig, connect_lazy, connect_with_retry};
use crate::object_server::serve_objects;
use crate::proto::{
    IsARequest, InvokeRequest, ListRequest, NameRequest, ObjectKeyRequest, RebindRequest,
    name_to_msg,
};
use crate::rpc::naming_service_client::NamingServiceClient;
use crate::rpc::object_service_client::ObjectServiceClient;
use crate::status::from_status;

/// Connection settings of a [`GrpcBroker`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GrpcBrokerConfig {
    /// Where the naming service listens.
    pub naming_uri: String,
    /// Address the object adapter binds to when servants are published.
    pub listen_addr: String,
    /// Host written into published references. Defaults to the bound IP.
    pub advertise_host: Option<String>,
    pub connect_timeout_ms: u64,
    /// Per-call timeout; absent means calls are never cut short.
    pub rpc_timeout_ms: Option<u64>,
    pub max_connect_retries: u32,
}

impl Default for GrpcBrokerConfig {
    fn default() -> Self {
        Self {
            naming_uri: "http://127.0.0.1:2809".to_owned(),
            listen_addr: "127.0.0.1:0".to_owned(),
            advertise_host: None,
            connect_timeout_ms: 3000,
            rpc_timeout_ms: None,
            max_connect_retries: 2,
        }
    }
}

impl GrpcBrokerConfig {
    #[must_use]
    pub fn client_config(&self, service_name: &'static str) -> GrpcClientConfig {
        GrpcClientConfig::new(service_name)
            .with_connect_timeout(Duration::from_millis(self.connect_timeout_ms))
            .with_rpc_timeout(self.rpc_timeout_ms.map(Duration::from_millis))
            .with_max_retries(self.max_connect_retries)
    }
}

fn advertised_endpoint(bound: SocketAddr, advertise_host: Option<&str>) -> String {
    match advertise_host {
        Some(host) => format!("http://{host}:{}", bound.port()),
        None if bound.ip().is_unspecified() => format!("http://127.0.0.1:{}", bound.port()),
        None => format!("http://{bound}"),
    }
}

struct HostedAdapter {
    registry: Arc<ServantRegistry>,
}

/// A broker talking to a remote naming service and to object endpoints
/// over gRPC. Publishing a servant starts a local object server.
pub struct GrpcBroker {
    config: GrpcBrokerConfig,
    naming: OnceCell<NamingServiceClient<Channel>>,
    objects: DashMap<String, ObjectServiceClient<Channel>>,
    adapter: OnceCell<HostedAdapter>,
    cancel: CancellationToken,
    server: Mutex<Option<JoinHandle<()>>>,
}

impl std::fmt::Debug for GrpcBroker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GrpcBroker")
            .field("naming_uri", &self.config.naming_uri)
            .field("connected", &self.naming.initialized())
            .field("object_channels", &self.objects.len())
            .finish_non_exhaustive()
    }
}

impl GrpcBroker {
    #[must_use]
    pub fn new(config: GrpcBrokerConfig) -> Self {
        Self {
            config,
            naming: OnceCell::new(),
            objects: DashMap::new(),
            adapter: OnceCell::new(),
            cancel: CancellationToken::new(),
            server: Mutex::new(None),
        }
    }

    pub fn config(&self) -> &GrpcBrokerConfig {
        &self.config
    }

    /// Endpoint of the local object server, once one was started.
    pub fn local_endpoint(&self) -> Option<&str> {
        self.adapter.get().map(|a| a.registry.endpoint())
    }

    async fn naming_client(&self) -> Result<NamingServiceClient<Channel>, BrokerError> {
        let client = self
            .naming
            .get_or_try_init(|| async {
                let cfg = self.config.client_config("naming");
                connect_with_retry(self.config.naming_uri.clone(), &cfg)
                    .await
                    .map(NamingServiceClient::new)
                    .map_err(|e| BrokerError::Unavailable(format!("{e:#}")))
            })
            .await?;
        Ok(client.clone())
    }

    fn object_client(&self, endpoint: &str) -> Result<ObjectServiceClient<Channel>, BrokerError> {
        if let Some(client) = self.objects.get(endpoint) {
            return Ok(client.clone());
        }
        let cfg = self.config.client_config("object");
        let channel = connect_lazy(endpoint, &cfg)
            .map_err(|e| BrokerError::Unavailable(format!("{endpoint}: {e:#}")))?;
        let client = ObjectServiceClient::new(channel);
        self.objects.insert(endpoint.to_owned(), client.clone());
        Ok(client)
    }

    async fn start_adapter(&self) -> Result<HostedAdapter, BrokerError> {
        let listener = TcpListener::bind(&self.config.listen_addr)
            .await
            .map_err(|e| {
                BrokerError::Unavailable(format!("bind {}: {e}", self.config.listen_addr))
            })?;
        let bound = listener
            .local_addr()
            .map_err(|e| BrokerError::Unavailable(e.to_string()))?;
        let endpoint = advertised_endpoint(bound, self.config.advertise_host.as_deref());
        let registry = Arc::new(ServantRegistry::new(endpoint));

        let cancel = self.cancel.child_token();
        let served = Arc::clone(&registry);
        let handle = tokio::spawn(async move {
            if let Err(e) = serve_objects(listener, served, cancel).await {
                tracing::error!(error = %e, "object server failed");
            }
        });
        *self.server.lock() = Some(handle);

        Ok(HostedAdapter { registry })
    }
}

#[async_trait]
impl Broker for GrpcBroker {
    async fn resolve_naming_root(&self) -> Result<Arc<dyn NamingContext>, BrokerError> {
        let client = self.naming_client().await?;
        Ok(Arc::new(GrpcNamingContext {
            client,
            context_id: ROOT_CONTEXT.to_string(),
        }))
    }

    async fn resolve_object_adapter(&self) -> Result<Arc<dyn ObjectAdapter>, BrokerError> {
        let adapter = self.adapter.get_or_try_init(|| self.start_adapter()).await?;
        Ok(adapter.registry.clone())
    }

    async fn invoke(
        &self,
        target: &ObjectRef,
        operation: &str,
        payload: Bytes,
    ) -> Result<Bytes, BrokerError> {
        let mut client = self.object_client(&target.endpoint)?;
        let reply = client
            .invoke(InvokeRequest {
                object_key: target.object_key.clone(),
                operation: operation.to_owned(),
                payload,
            })
            .await
            .map_err(|s| from_status(&s))?;
        Ok(reply.into_inner().payload)
    }

    async fn is_a(&self, target: &ObjectRef, type_id: &str) -> Result<bool, BrokerError> {
        let mut client = self.object_client(&target.endpoint)?;
        let reply = client
            .is_a(IsARequest {
                object_key: target.object_key.clone(),
                type_id: type_id.to_owned(),
            })
            .await
            .map_err(|s| from_status(&s))?;
        Ok(reply.into_inner().value)
    }

    async fn non_existent(&self, target: &ObjectRef) -> Result<bool, BrokerError> {
        let mut client = self.object_client(&target.endpoint)?;
        let reply = client
            .non_existent(ObjectKeyRequest {
                object_key: target.object_key.clone(),
            })
            .await
            .map_err(|s| from_status(&s))?;
        Ok(reply.into_inner().value)
    }

    async fn shutdown(&self) {
        self.cancel.cancel();
        let handle = self.server.lock().take();
        if let Some(handle) = handle {
            if let Err(e) = handle.await {
                tracing::warn!(error = %e, "object server task did not finish cleanly");
            }
        }
        self.objects.clear();
        tracing::debug!("broker shut down");
    }
}

/// One context of a remote naming service.
#[derive(Debug, Clone)]
pub struct GrpcNamingContext {
    client: NamingServiceClient<Channel>,
    context_id: String,
}

impl GrpcNamingContext {
    fn name_request(&self, name: &NamePath) -> NameRequest {
        NameRequest {
            context_id: self.context_id.clone(),
            name: name_to_msg(name),
        }
    }

    fn child(&self, context_id: String) -> Arc<dyn NamingContext> {
        Arc::new(Self {
            client: self.client.clone(),
            context_id,
        })
    }
}

#[async_trait]
impl NamingContext for GrpcNamingContext {
    async fn bind_new_context(
        &self,
        name: &NamePath,
    ) -> Result<Arc<dyn NamingContext>, BrokerError> {
        let reply = self
            .client
            .clone()
            .bind_new_context(self.name_request(name))
            .await
            .map_err(|s| from_status(&s))?;
        Ok(self.child(reply.into_inner().context_id))
    }

    async fn resolve(&self, name: &NamePath) -> Result<ObjectRef, BrokerError> {
        let reply = self
            .client
            .clone()
            .resolve(self.name_request(name))
            .await
            .map_err(|s| from_status(&s))?;
        Ok(reply.into_inner().into())
    }

    async fn resolve_context(
        &self,
        name: &NamePath,
    ) -> Result<Arc<dyn NamingContext>, BrokerError> {
        let reply = self
            .client
            .clone()
            .resolve_context(self.name_request(name))
            .await
            .map_err(|s| from_status(&s))?;
        Ok(self.child(reply.into_inner().context_id))
    }

    async fn rebind(&self, name: &NamePath, object: ObjectRef) -> Result<(), BrokerError> {
        self.client
            .clone()
            .rebind(RebindRequest {
                context_id: self.context_id.clone(),
                name: name_to_msg(name),
                object: Some(object.into()),
            })
            .await
            .map_err(|s| from_status(&s))?;
        Ok(())
    }

    async fn unbind(&self, name: &NamePath) -> Result<(), BrokerError> {
        self.client
            .clone()
            .unbind(self.name_request(name))
            .await
            .map_err(|s| from_status(&s))?;
        Ok(())
    }

    async fn list(&self, how_many: usize) -> Result<Vec<Binding>, BrokerError> {
        let reply = self
            .client
            .clone()
            .list(ListRequest {
                context_id: self.context_id.clone(),
                how_many: u32::try_from(how_many).unwrap_or(u32::MAX),
            })
            .await
            .map_err(|s| from_status(&s))?;
        reply
            .into_inner()
            .bindings
            .into_iter()
            .map(Binding::try_from)
            .collect()
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn test_advertised_endpoint() {
        let wildcard: SocketAddr = "0.0.0.0:4000".parse().unwrap();
        let local: SocketAddr = "127.0.0.1:4001".parse().unwrap();
        assert_eq!(advertised_endpoint(wildcard, None), "http://127.0.0.1:4000");
        assert_eq!(advertised_endpoint(local, None), "http://127.0.0.1:4001");
        assert_eq!(
            advertised_endpoint(wildcard, Some("seq.example")),
            "http://seq.example:4000"
        );
    }

    #[test]
    fn test_config_defaults_and_partial_override() {
        let cfg: GrpcBrokerConfig =
            serde_json::from_value(serde_json::json!({ "naming_uri": "http://names:2809" }))
                .unwrap();
        assert_eq!(cfg.naming_uri, "http://names:2809");
        assert_eq!(cfg.listen_addr, "127.0.0.1:0");
        assert_eq!(cfg.rpc_timeout_ms, None);

        let client = cfg.client_config("naming");
        assert_eq!(client.rpc_timeout, None);
        assert_eq!(client.max_retries, 2);
    }
}
