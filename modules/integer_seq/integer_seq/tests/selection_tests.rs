#![allow(clippy::unwrap_used, clippy::expect_used)]

//! Integration tests for publication and candidate selection

mod common;

use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use common::{Linear, directory_for, publish_from};
use integer_seq::{
    DirectoryClient, DirectoryError, Name, ServiceDirectory, ServiceRegistrar, StaleFilter,
    narrow_live,
};
use integer_seq_sdk::{IntegerSequenceRef, Response};
use orbkit::memory::{MemoryBroker, MemoryNetwork};
use orbkit::{
    Binding, Broker, BrokerError, NamePath, NamingContext, ObjectAdapter, ObjectRef, Servant,
};

fn client(net: &Arc<MemoryNetwork>) -> DirectoryClient {
    DirectoryClient::new(directory_for(net, "client"), 100)
}

async fn first_value(client: &DirectoryClient, pattern: &str) -> (Name, Response) {
    let proxy = client.select(pattern, false).await.unwrap();
    let mut invocation = proxy.value_at(3).await.unwrap();
    let (_, value) = invocation.results.remove(0);
    (proxy.name().clone(), value)
}

#[tokio::test]
async fn test_publish_then_select_same_name() {
    let net = MemoryNetwork::new();
    let publication = publish_from(&net, "server", &[Linear::arc("fib", "rs", 2)]).await;
    assert_eq!(publication.bound, vec![Name::new("fib", "rs")]);

    let client = client(&net);
    for pattern in ["fib", "fib.rs"] {
        let (name, value) = first_value(&client, pattern).await;
        assert_eq!(name, Name::new("fib", "rs"));
        assert_eq!(value, Response::Int(6));
    }
}

#[tokio::test]
async fn test_healthy_candidate_wins_over_dead_one_listed_first() {
    let net = MemoryNetwork::new();
    publish_from(&net, "dead", &[Linear::arc("fib", "a-dead", 1)]).await;
    publish_from(&net, "alive", &[Linear::arc("fib", "b-alive", 10)]).await;
    net.disconnect("dead");

    let (name, value) = first_value(&client(&net), "fib").await;
    assert_eq!(name, Name::new("fib", "b-alive"));
    assert_eq!(value, Response::Int(30));
}

#[tokio::test]
async fn test_healthy_candidate_wins_over_dead_one_listed_last() {
    let net = MemoryNetwork::new();
    publish_from(&net, "alive", &[Linear::arc("fib", "a-alive", 10)]).await;
    publish_from(&net, "dead", &[Linear::arc("fib", "b-dead", 1)]).await;
    net.disconnect("dead");

    let (name, _) = first_value(&client(&net), "fib").await;
    assert_eq!(name, Name::new("fib", "a-alive"));
}

#[tokio::test]
async fn test_first_listed_live_candidate_is_chosen() {
    let net = MemoryNetwork::new();
    publish_from(
        &net,
        "server",
        &[Linear::arc("fib", "naive", 1), Linear::arc("fib", "mat", 1)],
    )
    .await;

    let (name, _) = first_value(&client(&net), "fib").await;
    assert_eq!(name, Name::new("fib", "mat"));
    let (name, _) = first_value(&client(&net), "fib.naive").await;
    assert_eq!(name, Name::new("fib", "naive"));
}

#[tokio::test]
async fn test_no_match_is_no_matching_service() {
    let net = MemoryNetwork::new();
    publish_from(&net, "server", &[Linear::arc("fib", "rs", 1)]).await;
    let client = client(&net);

    for pattern in ["primes", "fib.py", "rs", ""] {
        assert_eq!(
            client.select(pattern, false).await.unwrap_err(),
            DirectoryError::NoMatchingService(pattern.to_owned())
        );
    }
}

#[tokio::test]
async fn test_only_dead_candidates_is_no_matching_service() {
    let net = MemoryNetwork::new();
    publish_from(&net, "dead", &[Linear::arc("fib", "rs", 1)]).await;
    net.disconnect("dead");

    assert_eq!(
        client(&net).select("fib", false).await.unwrap_err(),
        DirectoryError::NoMatchingService("fib".to_owned())
    );
}

struct Stranger;

#[async_trait]
impl Servant for Stranger {
    fn type_id(&self) -> &str {
        "IDL:demo/Stranger:1.0"
    }

    async fn dispatch(&self, _operation: &str, _payload: Bytes) -> Result<Bytes, BrokerError> {
        Ok(Bytes::new())
    }
}

#[tokio::test]
async fn test_incompatible_binding_is_skipped() {
    let net = MemoryNetwork::new();
    let server = net.broker("server");
    let stranger = server
        .resolve_object_adapter()
        .await
        .unwrap()
        .activate(Arc::new(Stranger))
        .unwrap();
    let dir = directory_for(&net, "binder");
    dir.ensure_directory(true).await.unwrap();
    dir.bind(&Name::new("fib", "a-odd"), stranger.clone())
        .await
        .unwrap();
    publish_from(&net, "good", &[Linear::arc("fib", "b-good", 1)]).await;

    let broker: Arc<dyn Broker> = Arc::new(net.broker("client"));
    let err = narrow_live::<IntegerSequenceRef>(broker, &Name::new("fib", "a-odd"), stranger)
        .await
        .unwrap_err();
    assert!(matches!(err, DirectoryError::IncompatibleService { .. }));

    let (name, _) = first_value(&client(&net), "fib").await;
    assert_eq!(name, Name::new("fib", "b-good"));
}

#[tokio::test]
async fn test_bound_but_dead_is_service_unreachable() {
    let net = MemoryNetwork::new();
    publish_from(&net, "dead", &[Linear::arc("fib", "rs", 1)]).await;
    net.disconnect("dead");

    let dir = directory_for(&net, "client");
    let err = dir
        .get::<IntegerSequenceRef>(&Name::new("fib", "rs"))
        .await
        .unwrap_err();
    assert_eq!(err, DirectoryError::ServiceUnreachable("fib.rs".to_owned()));
}

#[tokio::test]
async fn test_republish_clears_only_own_stale_bindings() {
    let net = MemoryNetwork::new();
    publish_from(&net, "python", &[Linear::arc("fib", "py", 1)]).await;
    publish_from(
        &net,
        "old",
        &[Linear::arc("fib", "rs", 1), Linear::arc("pow3", "naive-rs", 1)],
    )
    .await;
    net.disconnect("old");

    let dir = directory_for(&net, "new");
    let publication = ServiceRegistrar::new(&dir, 100)
        .publish(&[Linear::arc("fib", "rs", 7)], &StaleFilter::kind_suffix("rs"))
        .await
        .unwrap();
    assert_eq!(
        publication.unbound,
        vec![Name::new("fib", "rs"), Name::new("pow3", "naive-rs")]
    );
    assert_eq!(
        dir.list(100).await.unwrap(),
        vec![Name::new("fib", "py"), Name::new("fib", "rs")]
    );

    let (_, value) = first_value(&client(&net), "fib.rs").await;
    assert_eq!(value, Response::Int(21));
}

#[tokio::test]
async fn test_listing_reports_dead_services() {
    let net = MemoryNetwork::new();
    publish_from(&net, "alive", &[Linear::arc("fib", "rs", 1)]).await;
    publish_from(&net, "dead", &[Linear::arc("pow2", "rs", 1)]).await;
    net.disconnect("dead");

    let entries = client(&net).list_services().await.unwrap();
    assert_eq!(entries.len(), 2);
    let details = entries[0].details.as_ref().unwrap();
    assert_eq!(details.name, "Linear sequence");
    assert_eq!(details.max_index, 1000);
    assert_eq!(
        entries[1].details,
        Err("service 'pow2.rs' is not reachable".to_owned())
    );
}

// =============================================================================
// Names removed between listing and use
// =============================================================================

/// Directory context that drops `victim` right after every listing, as if
/// another process unbound it concurrently.
struct VanishingDirectory {
    inner: Arc<dyn NamingContext>,
    victim: NamePath,
}

#[async_trait]
impl NamingContext for VanishingDirectory {
    async fn bind_new_context(
        &self,
        name: &NamePath,
    ) -> Result<Arc<dyn NamingContext>, BrokerError> {
        self.inner.bind_new_context(name).await
    }

    async fn resolve(&self, name: &NamePath) -> Result<ObjectRef, BrokerError> {
        self.inner.resolve(name).await
    }

    async fn resolve_context(
        &self,
        name: &NamePath,
    ) -> Result<Arc<dyn NamingContext>, BrokerError> {
        self.inner.resolve_context(name).await
    }

    async fn rebind(&self, name: &NamePath, object: ObjectRef) -> Result<(), BrokerError> {
        self.inner.rebind(name, object).await
    }

    async fn unbind(&self, name: &NamePath) -> Result<(), BrokerError> {
        self.inner.unbind(name).await
    }

    async fn list(&self, how_many: usize) -> Result<Vec<Binding>, BrokerError> {
        let listed = self.inner.list(how_many).await?;
        let _ = self.inner.unbind(&self.victim).await;
        Ok(listed)
    }
}

/// Root context handing out [`VanishingDirectory`] wrappers.
struct VanishingRoot {
    inner: Arc<dyn NamingContext>,
    victim: NamePath,
}

impl VanishingRoot {
    fn wrap(&self, ctx: Arc<dyn NamingContext>) -> Arc<dyn NamingContext> {
        Arc::new(VanishingDirectory {
            inner: ctx,
            victim: self.victim.clone(),
        })
    }
}

#[async_trait]
impl NamingContext for VanishingRoot {
    async fn bind_new_context(
        &self,
        name: &NamePath,
    ) -> Result<Arc<dyn NamingContext>, BrokerError> {
        Ok(self.wrap(self.inner.bind_new_context(name).await?))
    }

    async fn resolve(&self, name: &NamePath) -> Result<ObjectRef, BrokerError> {
        self.inner.resolve(name).await
    }

    async fn resolve_context(
        &self,
        name: &NamePath,
    ) -> Result<Arc<dyn NamingContext>, BrokerError> {
        Ok(self.wrap(self.inner.resolve_context(name).await?))
    }

    async fn rebind(&self, name: &NamePath, object: ObjectRef) -> Result<(), BrokerError> {
        self.inner.rebind(name, object).await
    }

    async fn unbind(&self, name: &NamePath) -> Result<(), BrokerError> {
        self.inner.unbind(name).await
    }

    async fn list(&self, how_many: usize) -> Result<Vec<Binding>, BrokerError> {
        self.inner.list(how_many).await
    }
}

struct VanishingBroker {
    inner: MemoryBroker,
    victim: Name,
}

#[async_trait]
impl Broker for VanishingBroker {
    async fn resolve_naming_root(&self) -> Result<Arc<dyn NamingContext>, BrokerError> {
        Ok(Arc::new(VanishingRoot {
            inner: self.inner.resolve_naming_root().await?,
            victim: self.victim.to_path(),
        }))
    }

    async fn resolve_object_adapter(&self) -> Result<Arc<dyn ObjectAdapter>, BrokerError> {
        self.inner.resolve_object_adapter().await
    }

    async fn invoke(
        &self,
        target: &ObjectRef,
        operation: &str,
        payload: Bytes,
    ) -> Result<Bytes, BrokerError> {
        self.inner.invoke(target, operation, payload).await
    }

    async fn is_a(&self, target: &ObjectRef, type_id: &str) -> Result<bool, BrokerError> {
        self.inner.is_a(target, type_id).await
    }

    async fn non_existent(&self, target: &ObjectRef) -> Result<bool, BrokerError> {
        self.inner.non_existent(target).await
    }

    async fn shutdown(&self) {
        self.inner.shutdown().await;
    }
}

fn vanishing_directory(
    net: &Arc<MemoryNetwork>,
    endpoint: &str,
    victim: Name,
) -> ServiceDirectory {
    let broker: Arc<dyn Broker> = Arc::new(VanishingBroker {
        inner: net.broker(endpoint),
        victim,
    });
    ServiceDirectory::new(broker, common::DIRECTORY).unwrap()
}

#[tokio::test]
async fn test_candidate_unbound_after_listing_is_skipped() {
    let net = MemoryNetwork::new();
    publish_from(
        &net,
        "server",
        &[Linear::arc("fib", "a-gone", 1), Linear::arc("fib", "b-kept", 5)],
    )
    .await;

    let dir = vanishing_directory(&net, "client", Name::new("fib", "a-gone"));
    let client = DirectoryClient::new(dir, 100);
    let (name, value) = first_value(&client, "fib").await;
    assert_eq!(name, Name::new("fib", "b-kept"));
    assert_eq!(value, Response::Int(15));
}

#[tokio::test]
async fn test_only_candidate_unbound_after_listing_is_no_matching_service() {
    let net = MemoryNetwork::new();
    publish_from(&net, "server", &[Linear::arc("fib", "rs", 1)]).await;

    let dir = vanishing_directory(&net, "client", Name::new("fib", "rs"));
    assert_eq!(
        DirectoryClient::new(dir, 100)
            .select("fib", false)
            .await
            .unwrap_err(),
        DirectoryError::NoMatchingService("fib".to_owned())
    );
}

#[tokio::test]
async fn test_stale_name_removed_concurrently_does_not_fail_publish() {
    let net = MemoryNetwork::new();
    publish_from(
        &net,
        "old",
        &[Linear::arc("fib", "rs", 1), Linear::arc("pow3", "naive-rs", 1)],
    )
    .await;
    net.disconnect("old");

    let dir = vanishing_directory(&net, "new", Name::new("pow3", "naive-rs"));
    let publication = ServiceRegistrar::new(&dir, 100)
        .publish(&[Linear::arc("fib", "rs", 7)], &StaleFilter::kind_suffix("rs"))
        .await
        .unwrap();
    assert_eq!(publication.unbound, vec![Name::new("fib", "rs")]);
    assert_eq!(publication.bound, vec![Name::new("fib", "rs")]);
    assert_eq!(dir.list(100).await.unwrap(), vec![Name::new("fib", "rs")]);
}
