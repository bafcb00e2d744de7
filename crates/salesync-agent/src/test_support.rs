//! Fixtures shared by the pipeline and orchestrator tests.

use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use chrono::NaiveDate;
use salesync_api::ApiClient;
use salesync_core::{group, ConfigStore, DateRange, Document, RunConfig, SourceRow};
use salesync_db::DbError;

use crate::pipeline::{Pipeline, SalesSource};

/// In-memory [`SalesSource`] that counts how often it is queried.
pub struct StaticSource {
    documents: Vec<Document>,
    fail: bool,
    calls: AtomicUsize,
    last_range: std::sync::Mutex<Option<DateRange>>,
}

impl StaticSource {
    pub fn with_documents(documents: Vec<Document>) -> Self {
        Self {
            documents,
            fail: false,
            calls: AtomicUsize::new(0),
            last_range: std::sync::Mutex::new(None),
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::with_documents(Vec::new())
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_range(&self) -> Option<DateRange> {
        *self.last_range.lock().unwrap()
    }
}

impl SalesSource for StaticSource {
    async fn documents(&self, range: DateRange) -> Result<Vec<Document>, DbError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_range.lock().unwrap() = Some(range);
        if self.fail {
            return Err(DbError::Timeout { secs: 1 });
        }
        Ok(self.documents.clone())
    }
}

pub fn sample_documents() -> Vec<Document> {
    let date = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
    let row = |doc_type: &str, item: &str, quantity: u32| SourceRow {
        doc_type: doc_type.to_string(),
        work_date: date,
        designation: item.to_string(),
        quantity,
    };
    group(vec![row("FT", "A", 2), row("FT", "B", 1), row("NC", "C", 5)])
}

/// Write a config file pointing at `api_base_url` and return its store.
pub fn write_config(dir: &Path, api_base_url: &str, mode: &str) -> ConfigStore {
    let path = dir.join("config.json");
    let body = serde_json::json!({
        "runAt": "07:15",
        "apiBaseUrl": api_base_url,
        "connectionString": "postgres://sales:pw@127.0.0.1:1/sales",
        "mode": mode,
        "startDate": "2024-01-01",
        "endDate": "2024-01-31",
        "authorization": {
            "username": "agent",
            "password": "s3cret",
            "company": "ACME",
            "instance": "DEFAULT",
            "grantType": "password",
            "line": "professional"
        }
    });
    std::fs::write(&path, serde_json::to_string_pretty(&body).unwrap()).unwrap();
    ConfigStore::new(path)
}

pub fn pipeline_for<S: SalesSource>(store: ConfigStore, config: RunConfig, source: S) -> Pipeline<S> {
    let api = ApiClient::new(
        &config.api_base_url,
        Duration::from_secs(5),
        Duration::from_secs(5),
    )
    .expect("client construction should not fail");
    Pipeline::new(api, store, config, source)
}
