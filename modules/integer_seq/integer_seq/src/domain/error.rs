//! Error types of the service directory and the invocation proxy.

use orbkit::BrokerError;
use thiserror::Error;

/// Failures of directory, resolution and selection operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DirectoryError {
    /// The object broker or its naming service cannot be reached.
    #[error("object broker is unavailable")]
    BrokerUnavailable(#[source] BrokerError),

    /// The service directory does not exist and was not created.
    #[error("service directory '{0}' is not available")]
    DirectoryUnavailable(String),

    #[error("invalid directory name '{name}'")]
    InvalidDirectoryName {
        name: String,
        #[source]
        source: BrokerError,
    },

    #[error("name '{0}' is not bound in the service directory")]
    NameNotFound(String),

    /// The bound object does not implement the expected interface.
    #[error("service '{name}' of type '{actual}' is not compatible with '{expected}'")]
    IncompatibleService {
        name: String,
        expected: String,
        actual: String,
    },

    /// The name is bound but its endpoint does not answer.
    #[error("service '{0}' is not reachable")]
    ServiceUnreachable(String),

    #[error("No available services that match the name '{0}'")]
    NoMatchingService(String),

    #[error(transparent)]
    Broker(BrokerError),
}

impl DirectoryError {
    /// Classifies a broker failure observed while operating on `name`.
    pub(crate) fn from_broker(err: BrokerError, name: &str) -> Self {
        match err {
            e if e.is_unreachable() => Self::BrokerUnavailable(e),
            BrokerError::NotFound { .. } => Self::NameNotFound(name.to_owned()),
            e => Self::Broker(e),
        }
    }
}

/// Failure of one remote request made through an invocation proxy.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InvocationError {
    #[error("request to service '{name}' failed")]
    Service {
        name: String,
        #[source]
        source: BrokerError,
    },

    #[error("service '{name}' returned {actual} results for {expected} indices")]
    ResultCount {
        name: String,
        expected: usize,
        actual: usize,
    },
}
