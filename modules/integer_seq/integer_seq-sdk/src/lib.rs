//! Integer Sequence SDK
//!
//! This crate provides the public contract of integer sequence services:
//! - [`IntegerSequence`] trait implemented by local sequences and remote stubs
//! - [`Response`] model returned for every requested index
//! - [`IntegerSequenceRef`] typed stub obtained by narrowing a broker reference
//! - [`IntegerSequenceServant`] exposing a local implementation through a broker

#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

pub mod api;
pub mod servant;
pub mod stub;
pub mod wire;

pub use api::{IntegerSequence, Response, ResponseType};
pub use servant::IntegerSequenceServant;
pub use stub::IntegerSequenceRef;

/// Repository id of the integer sequence interface.
pub const TYPE_ID: &str = "IDL:demo/IntegerSequence:1.0";

/// Most indices one client invocation may request.
pub const MAX_QUERY_SIZE: usize = 100;
