use std::fs::OpenOptions;
use std::sync::Mutex;

use anyhow::Context;
use salesync_core::AgentSettings;
use tracing_subscriber::EnvFilter;

/// Install the global tracing subscriber.
///
/// `RUST_LOG` wins over `SALESYNC_LOG_LEVEL`. With `SALESYNC_LOG_FILE` set,
/// lines are appended to that file without ANSI colours; otherwise they go to
/// stdout for the service host to capture.
pub fn init(settings: &AgentSettings) -> anyhow::Result<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&settings.log_level))?;
    let builder = tracing_subscriber::fmt().with_env_filter(env_filter);

    match &settings.log_file {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("failed to open log file {}", path.display()))?;
            builder
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .try_init()
        }
        None => builder.try_init(),
    }
    .map_err(|e| anyhow::anyhow!("failed to install tracing subscriber: {e}"))
}
