//! `BrokerError` <-> `tonic::Status` mapping.
//!
//! The status code carries the error class, the `x-orbkit-error` metadata
//! the exact kind, so both sides agree on the variant even where two kinds
//! share a gRPC code.

use orbkit::{BrokerError, NotFoundReason};
use tonic::metadata::{MetadataMap, MetadataValue};
use tonic::{Code, Status};

pub const ERROR_KIND_KEY: &str = "x-orbkit-error";
pub const REASON_KEY: &str = "x-orbkit-reason";
pub const TYPE_ID_KEY: &str = "x-orbkit-type-id";

const UNAVAILABLE: &str = "unavailable";
const TRANSPORT: &str = "transport";
const OBJECT_NOT_EXIST: &str = "object-not-exist";
const BAD_OPERATION: &str = "bad-operation";
const MARSHAL: &str = "marshal";
const INVALID_NAME: &str = "invalid-name";
const NOT_FOUND: &str = "not-found";
const ALREADY_BOUND: &str = "already-bound";

#[must_use]
pub fn to_status(err: &BrokerError) -> Status {
    let (code, kind, message) = match err {
        BrokerError::Unavailable(m) => (Code::Unavailable, UNAVAILABLE, m.as_str()),
        BrokerError::Transport(m) => (Code::Internal, TRANSPORT, m.as_str()),
        BrokerError::ObjectNotExist(m) => (Code::NotFound, OBJECT_NOT_EXIST, m.as_str()),
        BrokerError::BadOperation { operation, .. } => {
            (Code::Unimplemented, BAD_OPERATION, operation.as_str())
        }
        BrokerError::Marshal(m) => (Code::InvalidArgument, MARSHAL, m.as_str()),
        BrokerError::InvalidName(m) => (Code::InvalidArgument, INVALID_NAME, m.as_str()),
        BrokerError::NotFound { name, .. } => (Code::NotFound, NOT_FOUND, name.as_str()),
        BrokerError::AlreadyBound(name) => (Code::AlreadyExists, ALREADY_BOUND, name.as_str()),
    };

    let mut status = Status::new(code, message);
    let meta = status.metadata_mut();
    meta.insert(ERROR_KIND_KEY, MetadataValue::from_static(kind));
    match err {
        BrokerError::NotFound { reason, .. } => {
            meta.insert(REASON_KEY, MetadataValue::from_static(reason.as_str()));
        }
        BrokerError::BadOperation { type_id, .. } => {
            if let Ok(v) = MetadataValue::try_from(type_id.as_str()) {
                meta.insert(TYPE_ID_KEY, v);
            }
        }
        _ => {}
    }
    status
}

fn meta_str<'a>(meta: &'a MetadataMap, key: &str) -> Option<&'a str> {
    meta.get(key).and_then(|v| v.to_str().ok())
}

/// Reconstructs the broker error a peer reported. Statuses that did not
/// originate from [`to_status`] are classified by code alone.
#[must_use]
pub fn from_status(status: &Status) -> BrokerError {
    let message = status.message().to_owned();
    let meta = status.metadata();

    match meta_str(meta, ERROR_KIND_KEY) {
        Some(UNAVAILABLE) => BrokerError::Unavailable(message),
        Some(TRANSPORT) => BrokerError::Transport(message),
        Some(OBJECT_NOT_EXIST) => BrokerError::ObjectNotExist(message),
        Some(BAD_OPERATION) => BrokerError::BadOperation {
            type_id: meta_str(meta, TYPE_ID_KEY).unwrap_or_default().to_owned(),
            operation: message,
        },
        Some(MARSHAL) => BrokerError::Marshal(message),
        Some(INVALID_NAME) => BrokerError::InvalidName(message),
        Some(NOT_FOUND) => BrokerError::NotFound {
            name: message,
            reason: meta_str(meta, REASON_KEY)
                .and_then(NotFoundReason::parse)
                .unwrap_or(NotFoundReason::MissingNode),
        },
        Some(ALREADY_BOUND) => BrokerError::AlreadyBound(message),
        _ => match status.code() {
            Code::Unavailable => BrokerError::Unavailable(message),
            _ => BrokerError::Transport(format!("{}: {message}", status.code())),
        },
    }
}
