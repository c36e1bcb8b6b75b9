//! Broker error taxonomy.
//!
//! Every capability of the broker (naming, adapters, invocation) reports
//! failures through [`BrokerError`]. The variants mirror the classic object
//! broker exceptions so that transports can map them one-to-one.

use std::fmt;

/// Why a naming lookup failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NotFoundReason {
    /// A component of the path is not bound.
    MissingNode,
    /// An intermediate component is bound to an object, not a context.
    NotContext,
    /// The final component is bound to a context where an object was expected.
    NotObject,
}

impl NotFoundReason {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::MissingNode => "missing-node",
            Self::NotContext => "not-context",
            Self::NotObject => "not-object",
        }
    }

    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "missing-node" => Some(Self::MissingNode),
            "not-context" => Some(Self::NotContext),
            "not-object" => Some(Self::NotObject),
            _ => None,
        }
    }
}

impl fmt::Display for NotFoundReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error type for all broker operations
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum BrokerError {
    /// The broker, its naming service or the target endpoint cannot be reached.
    #[error("broker unavailable: {0}")]
    Unavailable(String),

    /// The call reached the peer but failed in flight.
    #[error("transport error: {0}")]
    Transport(String),

    /// The endpoint is up but does not host the referenced object.
    #[error("object does not exist: {0}")]
    ObjectNotExist(String),

    #[error("operation '{operation}' is not supported by {type_id}")]
    BadOperation { type_id: String, operation: String },

    #[error("marshal error: {0}")]
    Marshal(String),

    #[error("invalid name: {0}")]
    InvalidName(String),

    #[error("name '{name}' not found ({reason})")]
    NotFound { name: String, reason: NotFoundReason },

    #[error("name '{0}' is already bound")]
    AlreadyBound(String),
}

impl BrokerError {
    /// True for failures that mean "nothing answered", as opposed to a
    /// definite answer from a reachable peer.
    #[must_use]
    pub fn is_unreachable(&self) -> bool {
        matches!(self, Self::Unavailable(_) | Self::Transport(_))
    }

    pub fn not_found(name: impl Into<String>, reason: NotFoundReason) -> Self {
        Self::NotFound {
            name: name.into(),
            reason,
        }
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn test_reason_round_trips_through_str() {
        for reason in [
            NotFoundReason::MissingNode,
            NotFoundReason::NotContext,
            NotFoundReason::NotObject,
        ] {
            assert_eq!(NotFoundReason::parse(reason.as_str()), Some(reason));
        }
        assert_eq!(NotFoundReason::parse("bogus"), None);
    }

    #[test]
    fn test_error_messages() {
        let err = BrokerError::not_found("integer-seq", NotFoundReason::MissingNode);
        assert_eq!(
            err.to_string(),
            "name 'integer-seq' not found (missing-node)"
        );
        assert!(BrokerError::Unavailable("down".to_owned()).is_unreachable());
        assert!(!err.is_unreachable());
    }
}
