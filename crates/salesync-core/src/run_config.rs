use std::fmt;
use std::str::FromStr;

use chrono::{NaiveTime, Timelike};

use crate::ConfigError;

/// Daily run time at minute resolution (`HH:mm`, 24h clock).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunAt {
    hour: u32,
    minute: u32,
}

impl RunAt {
    #[must_use]
    pub fn hour(self) -> u32 {
        self.hour
    }

    #[must_use]
    pub fn minute(self) -> u32 {
        self.minute
    }

    /// Whether `time` falls inside this run minute.
    #[must_use]
    pub fn matches(self, time: NaiveTime) -> bool {
        time.hour() == self.hour && time.minute() == self.minute
    }

    #[must_use]
    pub fn as_naive_time(self) -> NaiveTime {
        NaiveTime::from_hms_opt(self.hour, self.minute, 0).unwrap_or(NaiveTime::MIN)
    }
}

impl FromStr for RunAt {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(ConfigError::MissingField("runAt"));
        }
        let time = NaiveTime::parse_from_str(trimmed, "%H:%M").map_err(|e| {
            ConfigError::InvalidField {
                field: "runAt",
                reason: format!("expected HH:mm, got '{trimmed}': {e}"),
            }
        })?;
        Ok(Self {
            hour: time.hour(),
            minute: time.minute(),
        })
    }
}

impl fmt::Display for RunAt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour, self.minute)
    }
}

/// Credential bundle exchanged for a bearer token.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
    pub company: String,
    pub instance: String,
    pub grant_type: String,
    pub line: String,
    /// Last token obtained from the API; rewritten after every refresh.
    pub bearer_token: Option<String>,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"[redacted]")
            .field("company", &self.company)
            .field("instance", &self.instance)
            .field("grant_type", &self.grant_type)
            .field("line", &self.line)
            .field(
                "bearer_token",
                &self.bearer_token.as_ref().map(|_| "[redacted]"),
            )
            .finish()
    }
}

/// Snapshot of the run configuration file.
///
/// Only `authorization.bearer_token` changes after load; everything else is
/// fixed for the lifetime of the process.
#[derive(Clone, PartialEq, Eq)]
pub struct RunConfig {
    pub run_at: RunAt,
    pub api_base_url: String,
    pub connection_string: String,
    /// Raw extraction mode. Interpreted per run so an unknown value aborts
    /// that run instead of the whole process.
    pub mode: String,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub authorization: Credentials,
}

impl fmt::Debug for RunConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RunConfig")
            .field("run_at", &self.run_at)
            .field("api_base_url", &self.api_base_url)
            .field("connection_string", &"[redacted]")
            .field("mode", &self.mode)
            .field("start_date", &self.start_date)
            .field("end_date", &self.end_date)
            .field("authorization", &self.authorization)
            .finish()
    }
}
