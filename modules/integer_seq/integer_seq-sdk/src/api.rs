//! The integer sequence interface and its response model.

use std::fmt;

use async_trait::async_trait;
use orbkit::BrokerError;

/// Discriminator of a [`Response`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseType {
    Int,
    Text,
    Error,
}

impl ResponseType {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Int => "t_int",
            Self::Text => "t_string",
            Self::Error => "t_error",
        }
    }
}

impl fmt::Display for ResponseType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One computed sequence member, or the reason it could not be computed.
///
/// Members that fit into `i64` travel as [`Response::Int`]; larger ones as
/// their decimal representation in [`Response::Text`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Response {
    Int(i64),
    Text(String),
    Error(String),
}

impl Response {
    pub fn error(message: impl Into<String>) -> Self {
        Self::Error(message.into())
    }

    #[must_use]
    pub fn response_type(&self) -> ResponseType {
        match self {
            Self::Int(_) => ResponseType::Int,
            Self::Text(_) => ResponseType::Text,
            Self::Error(_) => ResponseType::Error,
        }
    }

    #[must_use]
    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error(_))
    }
}

/// A service computing members of one integer sequence.
///
/// Implemented by the typed stub on the client side and by hosted
/// implementations on the server side. Per-index failures are reported as
/// [`Response::Error`]; `Err` means the call itself failed.
#[async_trait]
pub trait IntegerSequence: Send + Sync {
    /// Human-readable name, e.g. `Fibonacci numbers (Rust)`.
    async fn name(&self) -> Result<String, BrokerError>;

    async fn description(&self) -> Result<String, BrokerError>;

    /// Largest index the service accepts.
    async fn max_index(&self) -> Result<i32, BrokerError>;

    async fn value_at(&self, index: i32) -> Result<Response, BrokerError>;

    /// Computes all `indices` in one call. The i-th response belongs to the
    /// i-th index.
    async fn values_at(&self, indices: &[i32]) -> Result<Vec<Response>, BrokerError>;
}
