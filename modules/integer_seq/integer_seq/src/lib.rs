//! Integer sequence service directory.
//!
//! Servers publish [`SequenceImplementation`]s with a [`ServiceRegistrar`];
//! clients find them with a [`DirectoryClient`] and call them through an
//! [`InvocationProxy`]. Both sides share one [`ServiceDirectory`], a named
//! sub-context of the broker's naming service.

#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

pub mod config;
pub mod domain;

pub use config::{IntegerSeqConfig, MODULE_NAME};
pub use domain::client::DirectoryClient;
pub use domain::directory::ServiceDirectory;
pub use domain::error::{DirectoryError, InvocationError};
pub use domain::implementation::{HostedSequence, SequenceImplementation, evaluate};
pub use domain::listing::{DELIMITER, ListingEntry, ServiceDescription};
pub use domain::name::Name;
pub use domain::proxy::{Invocation, InvocationProxy};
pub use domain::registrar::{Publication, ServiceRegistrar, StaleFilter};
pub use domain::render::shorten;
pub use domain::resolver::narrow_live;
