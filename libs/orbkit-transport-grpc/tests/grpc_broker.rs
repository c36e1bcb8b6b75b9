#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use orbkit::{Broker, BrokerError, BindingType, NamePath, NamingTree, Servant, probe};
use orbkit_transport_grpc::{GrpcBroker, GrpcBrokerConfig, serve_naming};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

struct Upper;

#[async_trait]
impl Servant for Upper {
    fn type_id(&self) -> &str {
        "IDL:test/Upper:1.0"
    }

    async fn dispatch(&self, operation: &str, payload: Bytes) -> Result<Bytes, BrokerError> {
        match operation {
            "upper" => Ok(Bytes::from(
                String::from_utf8_lossy(&payload).to_uppercase(),
            )),
            _ => Err(BrokerError::BadOperation {
                type_id: self.type_id().to_owned(),
                operation: operation.to_owned(),
            }),
        }
    }
}

struct NamingHost {
    uri: String,
    cancel: CancellationToken,
    task: JoinHandle<anyhow::Result<()>>,
}

async fn start_naming() -> NamingHost {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let uri = format!("http://{}", listener.local_addr().unwrap());
    let cancel = CancellationToken::new();
    let task = tokio::spawn(serve_naming(
        listener,
        Arc::new(NamingTree::new()),
        cancel.clone(),
    ));
    NamingHost { uri, cancel, task }
}

fn broker_for(uri: &str) -> GrpcBroker {
    GrpcBroker::new(GrpcBrokerConfig {
        naming_uri: uri.to_owned(),
        connect_timeout_ms: 500,
        max_connect_retries: 5,
        ..GrpcBrokerConfig::default()
    })
}

#[tokio::test]
async fn publish_and_invoke_over_grpc() {
    let naming = start_naming().await;
    let server = broker_for(&naming.uri);
    let client = broker_for(&naming.uri);

    let adapter = server.resolve_object_adapter().await.unwrap();
    let object = adapter.activate(Arc::new(Upper)).unwrap();
    assert_eq!(Some(object.endpoint.as_str()), server.local_endpoint());

    let root = server.resolve_naming_root().await.unwrap();
    let dir = root
        .bind_new_context(&NamePath::parse("demo").unwrap())
        .await
        .unwrap();
    dir.rebind(&NamePath::parse("upper.rs").unwrap(), object.clone())
        .await
        .unwrap();

    let client_root = client.resolve_naming_root().await.unwrap();
    let listed = client_root.list(10).await.unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].binding_type, BindingType::Context);

    let raw = client_root
        .resolve(&NamePath::parse("demo/upper.rs").unwrap())
        .await
        .unwrap();
    assert_eq!(raw, object);
    assert!(probe(&client, &raw).await);
    assert!(client.is_a(&raw, "IDL:test/Upper:1.0").await.unwrap());

    let reply = client
        .invoke(&raw, "upper", Bytes::from_static(b"fib"))
        .await
        .unwrap();
    assert_eq!(reply, Bytes::from_static(b"FIB"));

    let err = client.invoke(&raw, "lower", Bytes::new()).await.unwrap_err();
    assert!(matches!(err, BrokerError::BadOperation { .. }));

    server.shutdown().await;
    assert!(!probe(&client, &raw).await);

    client.shutdown().await;
    naming.cancel.cancel();
    naming.task.await.unwrap().unwrap();
}

#[tokio::test]
async fn naming_errors_cross_the_wire() {
    let naming = start_naming().await;
    let broker = broker_for(&naming.uri);
    let root = broker.resolve_naming_root().await.unwrap();

    let name = NamePath::parse("integer-seq").unwrap();
    root.bind_new_context(&name).await.unwrap();
    assert_eq!(
        root.bind_new_context(&name).await.err().unwrap(),
        BrokerError::AlreadyBound("integer-seq".to_owned())
    );
    assert!(matches!(
        root.resolve(&NamePath::parse("missing.rs").unwrap()).await,
        Err(BrokerError::NotFound { .. })
    ));
    assert!(matches!(
        root.unbind(&NamePath::parse("missing.rs").unwrap()).await,
        Err(BrokerError::NotFound { .. })
    ));

    naming.cancel.cancel();
    naming.task.await.unwrap().unwrap();
}

#[tokio::test]
async fn unreachable_naming_service_is_unavailable() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let uri = format!("http://{}", listener.local_addr().unwrap());
    drop(listener);

    let broker = GrpcBroker::new(GrpcBrokerConfig {
        naming_uri: uri,
        connect_timeout_ms: 200,
        max_connect_retries: 0,
        ..GrpcBrokerConfig::default()
    });
    assert!(matches!(
        broker.resolve_naming_root().await.err().unwrap(),
        BrokerError::Unavailable(_)
    ));
}
