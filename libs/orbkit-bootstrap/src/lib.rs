#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Process bootstrap for orbkit binaries: layered configuration, logging
//! and shutdown signals.

pub mod config;
pub mod logging;
pub mod signals;

pub use config::{AppConfig, CliArgs, ConfigError, ConfigProvider, module_config_or_default};
pub use logging::{LogFormat, LoggingConfig, init_logging};
pub use signals::{shutdown_token, wait_for_shutdown};
