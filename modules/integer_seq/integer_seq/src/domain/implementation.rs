//! Hosting of local sequence implementations.

use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use integer_seq_sdk::{IntegerSequence, Response};
use orbkit::BrokerError;
use tracing::{info, warn};

use super::name::Name;

pub const NEGATIVE_INDEX: &str = "Index cannot be negative";
pub const INDEX_TOO_BIG: &str = "Index is too big";

/// A locally computed integer sequence.
///
/// `compute` is only ever called with `0 <= index <= max_index()`.
pub trait SequenceImplementation: Send + Sync + 'static {
    fn name(&self) -> &str;

    fn description(&self) -> &str;

    fn max_index(&self) -> i32;

    /// Name under which the implementation is published.
    fn directory_name(&self) -> Name;

    /// Computes the member at `index`.
    ///
    /// # Errors
    /// Any failure; it is reported to the caller as an error response.
    fn compute(&self, index: i32) -> anyhow::Result<Response>;
}

/// Bounds-checks `index` and computes one member. Failures become error
/// responses.
pub fn evaluate(implementation: &dyn SequenceImplementation, index: i32) -> Response {
    if index < 0 {
        return Response::error(NEGATIVE_INDEX);
    }
    if index > implementation.max_index() {
        return Response::error(INDEX_TOO_BIG);
    }
    match implementation.compute(index) {
        Ok(response) => response,
        Err(e) => Response::error(e.to_string()),
    }
}

/// Serves a [`SequenceImplementation`] as an [`IntegerSequence`].
///
/// Computation runs on the blocking pool so a long request does not stall
/// the object server.
#[derive(Clone)]
pub struct HostedSequence {
    implementation: Arc<dyn SequenceImplementation>,
}

impl HostedSequence {
    pub fn new(implementation: Arc<dyn SequenceImplementation>) -> Self {
        Self { implementation }
    }

    async fn compute_all(&self, indices: Vec<i32>) -> Vec<Response> {
        let implementation = Arc::clone(&self.implementation);
        let count = indices.len();
        let task = tokio::task::spawn_blocking(move || {
            indices
                .into_iter()
                .map(|i| evaluate(implementation.as_ref(), i))
                .collect::<Vec<_>>()
        });
        match task.await {
            Ok(responses) => responses,
            Err(e) => {
                warn!(sequence = self.implementation.name(), error = %e, "computation aborted");
                vec![Response::error(format!("computation aborted: {e}")); count]
            }
        }
    }
}

#[async_trait]
impl IntegerSequence for HostedSequence {
    async fn name(&self) -> Result<String, BrokerError> {
        Ok(self.implementation.name().to_owned())
    }

    async fn description(&self) -> Result<String, BrokerError> {
        Ok(self.implementation.description().to_owned())
    }

    async fn max_index(&self) -> Result<i32, BrokerError> {
        Ok(self.implementation.max_index())
    }

    async fn value_at(&self, index: i32) -> Result<Response, BrokerError> {
        let started = Instant::now();
        let response = self
            .compute_all(vec![index])
            .await
            .pop()
            .unwrap_or_else(|| Response::error("no result computed"));
        info!(
            sequence = self.implementation.name(),
            index,
            elapsed_ms = started.elapsed().as_millis(),
            "value_at served"
        );
        Ok(response)
    }

    async fn values_at(&self, indices: &[i32]) -> Result<Vec<Response>, BrokerError> {
        let started = Instant::now();
        let responses = self.compute_all(indices.to_vec()).await;
        info!(
            sequence = self.implementation.name(),
            ?indices,
            elapsed_ms = started.elapsed().as_millis(),
            "values_at served"
        );
        Ok(responses)
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Doubles {
        calls: AtomicUsize,
    }

    impl SequenceImplementation for Doubles {
        fn name(&self) -> &str {
            "Doubles"
        }

        fn description(&self) -> &str {
            "2n, fails on 7"
        }

        fn max_index(&self) -> i32 {
            10
        }

        fn directory_name(&self) -> Name {
            Name::new("doubles", "test")
        }

        fn compute(&self, index: i32) -> anyhow::Result<Response> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            anyhow::ensure!(index != 7, "seven is unlucky");
            Ok(Response::Int(2 * i64::from(index)))
        }
    }

    fn doubles() -> Arc<Doubles> {
        Arc::new(Doubles {
            calls: AtomicUsize::new(0),
        })
    }

    #[test]
    fn test_out_of_range_never_computes() {
        let d = doubles();
        assert_eq!(evaluate(d.as_ref(), -1), Response::error(NEGATIVE_INDEX));
        assert_eq!(evaluate(d.as_ref(), 11), Response::error(INDEX_TOO_BIG));
        assert_eq!(evaluate(d.as_ref(), i32::MIN), Response::error(NEGATIVE_INDEX));
        assert_eq!(d.calls.load(Ordering::SeqCst), 0);

        assert_eq!(evaluate(d.as_ref(), 10), Response::Int(20));
        assert_eq!(evaluate(d.as_ref(), 0), Response::Int(0));
        assert_eq!(d.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_batch_isolates_per_index_failures() {
        let hosted = HostedSequence::new(doubles());
        let responses = hosted.values_at(&[3, 7, -2, 12, 5]).await.unwrap();
        assert_eq!(
            responses,
            vec![
                Response::Int(6),
                Response::error("seven is unlucky"),
                Response::error(NEGATIVE_INDEX),
                Response::error(INDEX_TOO_BIG),
                Response::Int(10),
            ]
        );
        assert_eq!(hosted.value_at(4).await.unwrap(), Response::Int(8));
    }

    #[tokio::test]
    async fn test_metadata_is_forwarded() {
        let hosted = HostedSequence::new(doubles());
        assert_eq!(hosted.name().await.unwrap(), "Doubles");
        assert_eq!(hosted.description().await.unwrap(), "2n, fails on 7");
        assert_eq!(hosted.max_index().await.unwrap(), 10);
    }
}
