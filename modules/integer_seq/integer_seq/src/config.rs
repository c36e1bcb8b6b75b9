//! Configuration for the integer sequence module.

use serde::Deserialize;

/// Key of the module section under `modules.` in the application config.
pub const MODULE_NAME: &str = "integer_seq";

/// Configuration for the integer sequence module.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct IntegerSeqConfig {
    /// Naming context that holds all sequence bindings.
    /// Default: `integer-seq`
    pub directory_name: String,

    /// Most bindings read from the directory in one listing.
    pub list_limit: usize,

    /// Kind tag of the implementations a server publishes. Bindings whose
    /// kind ends with it are treated as stale on startup.
    pub kind_suffix: String,
}

impl Default for IntegerSeqConfig {
    fn default() -> Self {
        Self {
            directory_name: "integer-seq".to_owned(),
            list_limit: 100,
            kind_suffix: "rs".to_owned(),
        }
    }
}
