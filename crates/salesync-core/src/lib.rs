pub mod config;
pub mod config_file;
pub mod date_range;
pub mod documents;
pub mod run_config;
pub mod settings;
pub mod trigger;

use std::path::PathBuf;

use thiserror::Error;

pub use config::{load_settings, load_settings_from_env};
pub use config_file::{ConfigStore, PersistError};
pub use date_range::{resolve_date_range, DateRange, ExtractionMode, RangeError};
pub use documents::{group, Document, DocumentGrouper, DocumentKey, DocumentLine, SourceRow};
pub use run_config::{Credentials, RunAt, RunConfig};
pub use settings::AgentSettings;
pub use trigger::{poll, FireDecision, TriggerState};

/// Errors raised while loading process settings or the run configuration.
///
/// Every variant is fatal at startup: the agent cannot schedule anything
/// without a valid configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("failed to read config file {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed config file {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("config field `{0}` is missing or blank")]
    MissingField(&'static str),

    #[error("config field `{field}` is invalid: {reason}")]
    InvalidField { field: &'static str, reason: String },
}
