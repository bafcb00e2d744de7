use std::path::PathBuf;

use crate::settings::AgentSettings;
use crate::ConfigError;

const DEFAULT_CONFIG_PATH: &str = "config.json";
const DEFAULT_TICK_CRON: &str = "30 * * * * *";
const DEFAULT_SOURCE_VIEW: &str = "V_SysSalesByProduct";

/// Load process settings from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but invalid.
pub fn load_settings() -> Result<AgentSettings, ConfigError> {
    dotenvy::dotenv().ok();
    load_settings_from_env()
}

/// Load process settings from environment variables already in the process.
///
/// Unlike [`load_settings`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but invalid.
pub fn load_settings_from_env() -> Result<AgentSettings, ConfigError> {
    build_settings(|key| std::env::var(key))
}

/// Build settings using the provided env-var lookup function, so tests can
/// drive it from a plain `HashMap`.
fn build_settings<F>(lookup: F) -> Result<AgentSettings, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let parse_secs = |var: &str, default: &str| -> Result<u64, ConfigError> {
        let raw = or_default(var, default);
        let secs = raw.trim().parse::<u64>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })?;
        if secs == 0 {
            return Err(ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: "timeout must be at least one second".to_string(),
            });
        }
        Ok(secs)
    };

    let config_path = PathBuf::from(or_default("SALESYNC_CONFIG_PATH", DEFAULT_CONFIG_PATH));
    let log_level = or_default("SALESYNC_LOG_LEVEL", "info");
    let log_file = lookup("SALESYNC_LOG_FILE")
        .ok()
        .filter(|v| !v.trim().is_empty())
        .map(PathBuf::from);
    let tick_cron = or_default("SALESYNC_TICK_CRON", DEFAULT_TICK_CRON);

    let http_timeout_secs = parse_secs("SALESYNC_HTTP_TIMEOUT_SECS", "30")?;
    let http_connect_timeout_secs = parse_secs("SALESYNC_HTTP_CONNECT_TIMEOUT_SECS", "10")?;
    let db_acquire_timeout_secs = parse_secs("SALESYNC_DB_ACQUIRE_TIMEOUT_SECS", "10")?;
    let db_query_timeout_secs = parse_secs("SALESYNC_DB_QUERY_TIMEOUT_SECS", "120")?;

    let source_view = or_default("SALESYNC_SOURCE_VIEW", DEFAULT_SOURCE_VIEW);
    validate_view_identifier(&source_view).map_err(|reason| ConfigError::InvalidEnvVar {
        var: "SALESYNC_SOURCE_VIEW".to_string(),
        reason,
    })?;

    Ok(AgentSettings {
        config_path,
        log_level,
        log_file,
        tick_cron,
        http_timeout_secs,
        http_connect_timeout_secs,
        db_acquire_timeout_secs,
        db_query_timeout_secs,
        source_view,
    })
}

/// The view name is spliced into SQL text, so only dotted plain identifiers
/// (`schema.view`, `V_Sales`) are accepted.
fn validate_view_identifier(view: &str) -> Result<(), String> {
    if view.is_empty() {
        return Err("view name is empty".to_string());
    }
    for segment in view.split('.') {
        let mut chars = segment.chars();
        let Some(first) = chars.next() else {
            return Err(format!("empty segment in '{view}'"));
        };
        if !(first.is_ascii_alphabetic() || first == '_') {
            return Err(format!("segment '{segment}' must start with a letter or '_'"));
        }
        if !chars.all(|c| c.is_ascii_alphanumeric() || c == '_') {
            return Err(format!("segment '{segment}' contains invalid characters"));
        }
    }
    Ok(())
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
