//! JSON run-configuration file: loading and in-place token persistence.
//!
//! Key matching is case-insensitive and ignores `_`/`-`, so files written for
//! older deployments (`RunAt`, `ApiUrl`, `grant_type`, `secondToken`) load
//! unchanged. Rewrites go through the parsed document rather than a typed
//! struct so keys this crate does not know about survive untouched.

use std::ffi::OsString;
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use serde::Deserialize;
use serde_json::{Map, Value};
use thiserror::Error;

use crate::run_config::{Credentials, RunAt, RunConfig};
use crate::ConfigError;

const RUN_AT: &[&str] = &["runAt"];
const API_BASE_URL: &[&str] = &["apiBaseUrl", "apiUrl"];
const CONNECTION_STRING: &[&str] = &["connectionString"];
const MODE: &[&str] = &["mode"];
const START_DATE: &[&str] = &["startDate"];
const END_DATE: &[&str] = &["endDate"];
const AUTHORIZATION: &[&str] = &["authorization"];
const USERNAME: &[&str] = &["username"];
const PASSWORD: &[&str] = &["password"];
const COMPANY: &[&str] = &["company"];
const INSTANCE: &[&str] = &["instance"];
const GRANT_TYPE: &[&str] = &["grantType"];
const LINE: &[&str] = &["line"];
const BEARER_TOKEN: &[&str] = &["bearerToken", "secondToken"];

/// Errors raised while rewriting the configuration file.
#[derive(Debug, Error)]
pub enum PersistError {
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("existing config {} is not valid JSON: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("config {} (or its `authorization` entry) is not a JSON object", path.display())]
    NotAnObject { path: PathBuf },

    #[error("failed to encode config: {0}")]
    Encode(#[source] serde_json::Error),

    #[error("failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Shape of the file after key normalisation (see [`normalize_key`]).
#[derive(Debug, Default, Deserialize)]
struct FileConfig {
    #[serde(rename = "runat")]
    run_at: Option<String>,
    #[serde(rename = "apibaseurl")]
    api_base_url: Option<String>,
    #[serde(rename = "connectionstring")]
    connection_string: Option<String>,
    mode: Option<String>,
    #[serde(rename = "startdate")]
    start_date: Option<String>,
    #[serde(rename = "enddate")]
    end_date: Option<String>,
    authorization: Option<FileCredentials>,
}

#[derive(Debug, Default, Deserialize)]
struct FileCredentials {
    username: Option<String>,
    password: Option<String>,
    company: Option<String>,
    instance: Option<String>,
    #[serde(rename = "granttype")]
    grant_type: Option<String>,
    line: Option<String>,
    #[serde(rename = "bearertoken")]
    bearer_token: Option<String>,
}

/// Reads and rewrites the run configuration at a fixed path.
#[derive(Debug, Clone)]
pub struct ConfigStore {
    path: PathBuf,
}

impl ConfigStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load and validate the run configuration.
    ///
    /// # Errors
    ///
    /// - [`ConfigError::Read`] if the file cannot be read.
    /// - [`ConfigError::Parse`] if it is not JSON of the expected shape.
    /// - [`ConfigError::MissingField`] if `runAt` or `apiBaseUrl` is absent or blank.
    /// - [`ConfigError::InvalidField`] if `runAt` is not `HH:mm`.
    pub fn load(&self) -> Result<RunConfig, ConfigError> {
        let text = fs::read_to_string(&self.path).map_err(|source| ConfigError::Read {
            path: self.path.clone(),
            source,
        })?;
        parse_run_config(&self.path, &text)
    }

    /// Rewrite every known field of `config` onto the stored document.
    ///
    /// Unknown keys and the existing spelling of known keys are preserved.
    /// Optional fields that are `None` are left as they are on disk.
    ///
    /// # Errors
    ///
    /// Returns [`PersistError`] if the existing file cannot be parsed or the
    /// new content cannot be written.
    pub fn persist(&self, config: &RunConfig) -> Result<(), PersistError> {
        let mut doc = self.read_document()?;
        let root = self.root_object(&mut doc)?;

        set_field(root, RUN_AT, Value::String(config.run_at.to_string()));
        set_field(root, API_BASE_URL, Value::String(config.api_base_url.clone()));
        set_field(
            root,
            CONNECTION_STRING,
            Value::String(config.connection_string.clone()),
        );
        set_field(root, MODE, Value::String(config.mode.clone()));
        if let Some(start) = &config.start_date {
            set_field(root, START_DATE, Value::String(start.clone()));
        }
        if let Some(end) = &config.end_date {
            set_field(root, END_DATE, Value::String(end.clone()));
        }

        let creds = &config.authorization;
        let auth = self.child_object(root, AUTHORIZATION)?;
        set_field(auth, USERNAME, Value::String(creds.username.clone()));
        set_field(auth, PASSWORD, Value::String(creds.password.clone()));
        set_field(auth, COMPANY, Value::String(creds.company.clone()));
        set_field(auth, INSTANCE, Value::String(creds.instance.clone()));
        set_field(auth, GRANT_TYPE, Value::String(creds.grant_type.clone()));
        set_field(auth, LINE, Value::String(creds.line.clone()));
        if let Some(token) = &creds.bearer_token {
            set_field(auth, BEARER_TOKEN, Value::String(token.clone()));
        }

        self.write_atomic(&doc)
    }

    /// Overwrite only `authorization.bearerToken` in the stored document.
    ///
    /// # Errors
    ///
    /// Returns [`PersistError`] if the existing file cannot be parsed or the
    /// new content cannot be written.
    pub fn persist_token(&self, token: &str) -> Result<(), PersistError> {
        let mut doc = self.read_document()?;
        let root = self.root_object(&mut doc)?;
        let auth = self.child_object(root, AUTHORIZATION)?;
        set_field(auth, BEARER_TOKEN, Value::String(token.to_string()));
        self.write_atomic(&doc)
    }

    /// The stored document, or an empty object when the file does not exist.
    fn read_document(&self) -> Result<Value, PersistError> {
        match fs::read_to_string(&self.path) {
            Ok(text) => serde_json::from_str(&text).map_err(|source| PersistError::Parse {
                path: self.path.clone(),
                source,
            }),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(Value::Object(Map::new())),
            Err(source) => Err(PersistError::Read {
                path: self.path.clone(),
                source,
            }),
        }
    }

    fn root_object<'a>(&self, doc: &'a mut Value) -> Result<&'a mut Map<String, Value>, PersistError> {
        doc.as_object_mut().ok_or_else(|| PersistError::NotAnObject {
            path: self.path.clone(),
        })
    }

    /// The nested object under `names`, created when absent.
    fn child_object<'a>(
        &self,
        parent: &'a mut Map<String, Value>,
        names: &[&str],
    ) -> Result<&'a mut Map<String, Value>, PersistError> {
        let key = find_key(parent, names).unwrap_or_else(|| names[0].to_string());
        parent
            .entry(key)
            .or_insert_with(|| Value::Object(Map::new()))
            .as_object_mut()
            .ok_or_else(|| PersistError::NotAnObject {
                path: self.path.clone(),
            })
    }

    /// Write to a sibling temp file, fsync, then rename over the target so a
    /// crash never leaves a truncated config behind.
    fn write_atomic(&self, doc: &Value) -> Result<(), PersistError> {
        let mut body = serde_json::to_string_pretty(doc).map_err(PersistError::Encode)?;
        body.push('\n');

        let tmp = self.temp_path();
        let written = write_synced(&tmp, body.as_bytes()).and_then(|()| fs::rename(&tmp, &self.path));
        if let Err(source) = written {
            let _ = fs::remove_file(&tmp);
            return Err(PersistError::Write {
                path: self.path.clone(),
                source,
            });
        }
        Ok(())
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map_or_else(|| OsString::from("config.json"), OsString::from);
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

fn write_synced(path: &Path, bytes: &[u8]) -> io::Result<()> {
    let mut file = File::create(path)?;
    file.write_all(bytes)?;
    file.sync_all()
}

fn parse_run_config(path: &Path, text: &str) -> Result<RunConfig, ConfigError> {
    let raw: Value = serde_json::from_str(text).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    let normalized = fold_aliases(normalize_keys(raw));
    let file: FileConfig =
        serde_json::from_value(normalized).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

    let run_at: RunAt = file
        .run_at
        .as_deref()
        .ok_or(ConfigError::MissingField("runAt"))?
        .parse()?;

    let api_base_url = file
        .api_base_url
        .map(|url| url.trim().to_string())
        .filter(|url| !url.is_empty())
        .ok_or(ConfigError::MissingField("apiBaseUrl"))?;

    let auth = file.authorization.unwrap_or_default();

    Ok(RunConfig {
        run_at,
        api_base_url,
        connection_string: file.connection_string.unwrap_or_default(),
        mode: file.mode.unwrap_or_default(),
        start_date: file.start_date,
        end_date: file.end_date,
        authorization: Credentials {
            username: auth.username.unwrap_or_default(),
            password: auth.password.unwrap_or_default(),
            company: auth.company.unwrap_or_default(),
            instance: auth.instance.unwrap_or_default(),
            grant_type: auth.grant_type.unwrap_or_default(),
            line: auth.line.unwrap_or_default(),
            bearer_token: auth.bearer_token.filter(|t| !t.is_empty()),
        },
    })
}

/// `runAt`, `RunAt`, `run_at` and `run-at` all normalise to `runat`.
fn normalize_key(key: &str) -> String {
    key.chars()
        .filter(|c| *c != '_' && *c != '-')
        .flat_map(char::to_lowercase)
        .collect()
}

fn normalize_keys(value: Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.into_iter()
                .map(|(k, v)| (normalize_key(&k), normalize_keys(v)))
                .collect(),
        ),
        other => other,
    }
}

/// The existing key matching `names`, trying each name in order so the
/// canonical spelling wins over a legacy alias when both are present.
fn find_key(map: &Map<String, Value>, names: &[&str]) -> Option<String> {
    names.iter().find_map(|name| {
        let wanted = normalize_key(name);
        map.keys().find(|k| normalize_key(k) == wanted).cloned()
    })
}

/// Collapse legacy aliases onto their canonical (normalised) key. The
/// canonical key wins when a file carries both.
fn fold_aliases(mut value: Value) -> Value {
    if let Some(root) = value.as_object_mut() {
        fold_alias(root, API_BASE_URL);
        if let Some(auth) = root
            .get_mut(&normalize_key(AUTHORIZATION[0]))
            .and_then(Value::as_object_mut)
        {
            fold_alias(auth, BEARER_TOKEN);
        }
    }
    value
}

fn fold_alias(map: &mut Map<String, Value>, names: &[&str]) {
    let canonical = normalize_key(names[0]);
    for alias in &names[1..] {
        if let Some(value) = map.remove(&normalize_key(alias)) {
            map.entry(canonical.clone()).or_insert(value);
        }
    }
}

/// Replace the value under whichever spelling of `names` already exists, or
/// insert it under the canonical (first) name.
fn set_field(map: &mut Map<String, Value>, names: &[&str], value: Value) {
    let key = find_key(map, names).unwrap_or_else(|| names[0].to_string());
    map.insert(key, value);
}

#[cfg(test)]
#[path = "config_file_test.rs"]
mod tests;
