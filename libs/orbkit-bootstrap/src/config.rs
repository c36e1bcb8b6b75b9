//! Layered application configuration.
//!
//! Sources, lowest precedence first:
//! 1. built-in defaults
//! 2. YAML file passed with `--config`
//! 3. environment variables prefixed with `ORBKIT__` (`__` separates sections,
//!    e.g. `ORBKIT__BROKER__NAMING_URI`)
//! 4. command line overrides ([`CliArgs`])
//!
//! Module sections live under `modules.<name>.config` and are read with
//! [`module_config_or_default`].

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use figment::Figment;
use figment::providers::{Env, Format, Serialized, Yaml};
use orbkit_transport_grpc::GrpcBrokerConfig;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::logging::LoggingConfig;

pub const ENV_PREFIX: &str = "ORBKIT__";

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("config file does not exist: {}", .0.display())]
    FileNotFound(PathBuf),
    #[error("failed to load configuration: {0}")]
    Load(#[from] Box<figment::Error>),
    #[error("invalid config for module '{module}': {source}")]
    InvalidConfig {
        module: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Provider of module-specific configuration (raw JSON sections only).
pub trait ConfigProvider: Send + Sync {
    fn get_module_config(&self, module_name: &str) -> Option<&serde_json::Value>;
}

/// Values given on the command line; `None` leaves the loaded value alone.
#[derive(Debug, Clone, Default)]
pub struct CliArgs {
    pub config: Option<PathBuf>,
    pub naming_uri: Option<String>,
    pub listen_addr: Option<String>,
    pub verbose: u8,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    pub broker: GrpcBrokerConfig,
    pub logging: LoggingConfig,
    pub modules: BTreeMap<String, serde_json::Value>,
}

impl AppConfig {
    /// Loads defaults, then the optional YAML file, then the environment.
    ///
    /// # Errors
    /// Fails if `path` is given but is not a file, or if any source does not
    /// match the expected shape.
    pub fn load_layered(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut figment = Figment::new().merge(Serialized::defaults(Self::default()));

        if let Some(path) = path {
            if !path.is_file() {
                return Err(ConfigError::FileNotFound(path.to_path_buf()));
            }
            figment = figment.merge(Yaml::file(path));
        }

        figment
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .extract()
            .map_err(|e| ConfigError::Load(Box::new(e)))
    }

    /// Loads everything and applies the command line on top.
    pub fn load(args: &CliArgs) -> Result<Self, ConfigError> {
        let mut config = Self::load_layered(args.config.as_deref())?;
        config.apply_cli_overrides(args);
        Ok(config)
    }

    pub fn apply_cli_overrides(&mut self, args: &CliArgs) {
        if let Some(uri) = &args.naming_uri {
            self.broker.naming_uri.clone_from(uri);
        }
        if let Some(addr) = &args.listen_addr {
            self.broker.listen_addr.clone_from(addr);
        }
    }

    pub fn to_json_pretty(&self) -> anyhow::Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

impl ConfigProvider for AppConfig {
    fn get_module_config(&self, module_name: &str) -> Option<&serde_json::Value> {
        self.modules.get(module_name)
    }
}

/// Lenient loader: a missing module, a non-object module or a missing
/// `config` field yield `T::default()`. A present but malformed `config`
/// is still an error.
pub fn module_config_or_default<T: DeserializeOwned + Default>(
    provider: &dyn ConfigProvider,
    module_name: &str,
) -> Result<T, ConfigError> {
    let Some(module_raw) = provider.get_module_config(module_name) else {
        return Ok(T::default());
    };
    let Some(obj) = module_raw.as_object() else {
        return Ok(T::default());
    };
    let Some(config_section) = obj.get("config") else {
        return Ok(T::default());
    };

    serde_json::from_value(config_section.clone()).map_err(|e| ConfigError::InvalidConfig {
        module: module_name.to_owned(),
        source: e,
    })
}
