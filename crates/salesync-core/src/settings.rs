use std::path::PathBuf;
use std::time::Duration;

/// Process-level settings read from the environment.
///
/// These govern how the agent runs (logging, cadence, timeouts). What it runs
/// against lives in the JSON run configuration, see [`crate::RunConfig`].
#[derive(Debug, Clone)]
pub struct AgentSettings {
    pub config_path: PathBuf,
    pub log_level: String,
    pub log_file: Option<PathBuf>,
    /// Six-field cron expression for the trigger poll. Must fire at least
    /// once per minute or the run window can be skipped entirely.
    pub tick_cron: String,
    pub http_timeout_secs: u64,
    pub http_connect_timeout_secs: u64,
    pub db_acquire_timeout_secs: u64,
    pub db_query_timeout_secs: u64,
    pub source_view: String,
}

impl AgentSettings {
    #[must_use]
    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }

    #[must_use]
    pub fn http_connect_timeout(&self) -> Duration {
        Duration::from_secs(self.http_connect_timeout_secs)
    }

    #[must_use]
    pub fn db_acquire_timeout(&self) -> Duration {
        Duration::from_secs(self.db_acquire_timeout_secs)
    }

    #[must_use]
    pub fn db_query_timeout(&self) -> Duration {
        Duration::from_secs(self.db_query_timeout_secs)
    }
}
