#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Minimal remote object broker.
//!
//! Provides the capabilities a service directory needs from an object broker:
//! a hierarchical naming service, object adapters that publish local servants,
//! request/response invocation, and checked narrowing of raw references to
//! typed stubs. Transports implement [`Broker`]; an in-process implementation
//! lives in [`memory`].

pub mod adapter;
pub mod broker;
pub mod error;
pub mod memory;
pub mod naming;
pub mod naming_tree;
pub mod narrow;
pub mod object;

pub use adapter::ServantRegistry;
pub use broker::Broker;
pub use error::{BrokerError, NotFoundReason};
pub use naming::{Binding, BindingType, NameComponent, NamePath, NamingContext};
pub use naming_tree::NamingTree;
pub use narrow::{NarrowError, RemoteInterface, narrow, probe};
pub use object::{ObjectAdapter, ObjectRef, Servant};
