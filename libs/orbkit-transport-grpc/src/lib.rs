#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! gRPC transport for the orbkit broker.
//!
//! - [`naming_server`] hosts a [`orbkit::NamingTree`] as a network service.
//! - [`object_server`] exposes the servants of one endpoint.
//! - [`broker::GrpcBroker`] is the client side of both, implementing
//!   [`orbkit::Broker`].

pub mod broker;
pub mod client;
pub mod naming_server;
pub mod object_server;
pub mod proto;
pub mod status;

/// Generated service stubs.
#[allow(clippy::all, clippy::pedantic, rust_2018_idioms)]
pub mod rpc {
    include!(concat!(env!("OUT_DIR"), "/orbkit.naming.v1.NamingService.rs"));
    include!(concat!(env!("OUT_DIR"), "/orbkit.object.v1.ObjectService.rs"));
}

pub use broker::{GrpcBroker, GrpcBrokerConfig, GrpcNamingContext};
pub use naming_server::serve_naming;
