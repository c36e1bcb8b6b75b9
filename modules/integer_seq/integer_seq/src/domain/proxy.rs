//! Client-side invocation of a selected service.

use std::sync::Arc;
use std::time::{Duration, Instant};

use integer_seq_sdk::{IntegerSequence, Response};
use tracing::info;

use super::error::InvocationError;
use super::name::Name;
use super::render;

/// Results of one remote request, paired with the requested indices.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub results: Vec<(i32, Response)>,
    pub elapsed: Duration,
}

/// A resolved service together with the name it was found under.
///
/// Every request is exactly one remote call; nothing is retried.
#[derive(Clone)]
pub struct InvocationProxy {
    name: Name,
    sequence: Arc<dyn IntegerSequence>,
    shorten: bool,
}

impl std::fmt::Debug for InvocationProxy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InvocationProxy")
            .field("name", &self.name)
            .field("shorten", &self.shorten)
            .finish_non_exhaustive()
    }
}

impl InvocationProxy {
    pub fn new(name: Name, sequence: Arc<dyn IntegerSequence>, shorten: bool) -> Self {
        Self {
            name,
            sequence,
            shorten,
        }
    }

    pub fn name(&self) -> &Name {
        &self.name
    }

    pub fn sequence(&self) -> &Arc<dyn IntegerSequence> {
        &self.sequence
    }

    /// Requests a single member.
    ///
    /// # Errors
    /// [`InvocationError::Service`] if the call fails.
    pub async fn value_at(&self, index: i32) -> Result<Invocation, InvocationError> {
        let started = Instant::now();
        let response = self
            .sequence
            .value_at(index)
            .await
            .map_err(|source| self.service_error(source))?;
        let elapsed = started.elapsed();
        info!(name = %self.name, index, elapsed_ms = elapsed.as_millis(), "request completed");
        Ok(Invocation {
            results: vec![(index, response)],
            elapsed,
        })
    }

    /// Requests all `indices` in one call.
    ///
    /// # Errors
    /// [`InvocationError::Service`] if the call fails,
    /// [`InvocationError::ResultCount`] if the service answers with a
    /// different number of results.
    pub async fn values_at(&self, indices: &[i32]) -> Result<Invocation, InvocationError> {
        let started = Instant::now();
        let responses = self
            .sequence
            .values_at(indices)
            .await
            .map_err(|source| self.service_error(source))?;
        let elapsed = started.elapsed();
        if responses.len() != indices.len() {
            return Err(InvocationError::ResultCount {
                name: self.name.to_string(),
                expected: indices.len(),
                actual: responses.len(),
            });
        }
        info!(
            name = %self.name,
            ?indices,
            elapsed_ms = elapsed.as_millis(),
            "batch request completed"
        );
        Ok(Invocation {
            results: indices.iter().copied().zip(responses).collect(),
            elapsed,
        })
    }

    /// One output line for a result, e.g. `fib(10) = 55` or
    /// `Error getting fib(-1): Index cannot be negative`.
    #[must_use]
    pub fn render(&self, index: i32, response: &Response) -> String {
        let id = self.name.id();
        match response {
            Response::Error(message) => format!("Error getting {id}({index}): {message}"),
            value => format!("{id}({index}) = {}", render::display_value(value, self.shorten)),
        }
    }

    fn service_error(&self, source: orbkit::BrokerError) -> InvocationError {
        InvocationError::Service {
            name: self.name.to_string(),
            source,
        }
    }
}
