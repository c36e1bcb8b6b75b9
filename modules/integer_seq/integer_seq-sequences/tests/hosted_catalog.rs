#![allow(clippy::unwrap_used, clippy::expect_used)]

//! The catalog published and queried end-to-end over the in-memory broker

use std::sync::Arc;

use integer_seq::{DirectoryClient, Name, ServiceDirectory, ServiceRegistrar, StaleFilter};
use integer_seq_sdk::Response;
use integer_seq_sequences::catalog;
use orbkit::Broker;
use orbkit::memory::MemoryNetwork;

fn directory(net: &Arc<MemoryNetwork>, endpoint: &str) -> ServiceDirectory {
    let broker: Arc<dyn Broker> = Arc::new(net.broker(endpoint));
    ServiceDirectory::new(broker, "integer-seq").unwrap()
}

#[tokio::test]
async fn test_both_fibonacci_variants_agree() {
    let net = MemoryNetwork::new();
    let server = directory(&net, "server");
    let publication = ServiceRegistrar::new(&server, 100)
        .publish(&catalog("rs"), &StaleFilter::kind_suffix("rs"))
        .await
        .unwrap();
    assert_eq!(publication.bound.len(), 9);

    let client = DirectoryClient::new(directory(&net, "client"), 100);
    let any_fib = client.select("fib", false).await.unwrap();
    assert_eq!(any_fib.name().id(), "fib");

    for pattern in ["fib.rs", "fib.naive-rs"] {
        let proxy = client.select(pattern, false).await.unwrap();
        let batch = proxy.values_at(&[10, 0]).await.unwrap();
        assert_eq!(
            batch.results,
            vec![(10, Response::Int(55)), (0, Response::Int(0))],
            "{pattern}"
        );
    }
}

#[tokio::test]
async fn test_listing_describes_every_sequence() {
    let net = MemoryNetwork::new();
    let server = directory(&net, "server");
    ServiceRegistrar::new(&server, 100)
        .publish(&catalog("rs"), &StaleFilter::none())
        .await
        .unwrap();

    let entries = DirectoryClient::new(directory(&net, "client"), 100)
        .list_services()
        .await
        .unwrap();
    assert_eq!(entries.len(), 9);
    let primes = entries
        .iter()
        .find(|e| e.name == Name::new("primes", "rs"))
        .unwrap();
    let details = primes.details.as_ref().unwrap();
    assert_eq!(details.name, "Primes (Rust)");
    assert_eq!(details.max_index, 500_000);
}

#[tokio::test]
async fn test_large_values_travel_as_text() {
    let net = MemoryNetwork::new();
    let server = directory(&net, "server");
    ServiceRegistrar::new(&server, 100)
        .publish(&catalog("rs"), &StaleFilter::none())
        .await
        .unwrap();

    let proxy = DirectoryClient::new(directory(&net, "client"), 100)
        .select("pow2.rs", true)
        .await
        .unwrap();
    let mut invocation = proxy.value_at(200).await.unwrap();
    let (index, value) = invocation.results.remove(0);
    let Response::Text(ref digits) = value else {
        panic!("expected text, got {value:?}");
    };
    assert_eq!(digits.len(), 61);
    assert_eq!(
        proxy.render(index, &value),
        format!(
            "pow2(200) = {}...[21 digits skipped]...{}",
            &digits[..20],
            &digits[41..]
        )
    );
}
