//! One extract-transform-submit run.
//!
//! Authenticate, persist the token, resolve the date range, extract and group
//! documents, then submit each one. Every failure is logged and ends the run
//! with a [`RunOutcome`]; nothing escapes [`Pipeline::run`].

mod source;

use std::fmt;

use chrono::NaiveDate;
use salesync_api::{ApiClient, SubmitResult};
use salesync_core::{resolve_date_range, ConfigStore, RunConfig};
use tokio::sync::Mutex;

pub use source::{PgSalesSource, SalesSource};

/// Where a run stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// Every document was attempted; see the per-document results.
    Completed,
    AuthFailed,
    /// A token was obtained but could not be written to the config file, so
    /// it was not used.
    TokenNotPersisted,
    RangeInvalid,
    ExtractFailed,
    /// The range matched no rows; nothing was submitted.
    NoDocuments,
}

impl fmt::Display for RunOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            RunOutcome::Completed => "completed",
            RunOutcome::AuthFailed => "auth_failed",
            RunOutcome::TokenNotPersisted => "token_not_persisted",
            RunOutcome::RangeInvalid => "range_invalid",
            RunOutcome::ExtractFailed => "extract_failed",
            RunOutcome::NoDocuments => "no_documents",
        };
        f.write_str(label)
    }
}

/// Submission result for one document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentOutcome {
    pub doc_type: String,
    pub date: String,
    pub result: SubmitResult,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    pub outcome: RunOutcome,
    pub documents: Vec<DocumentOutcome>,
}

impl RunReport {
    fn stopped(outcome: RunOutcome) -> Self {
        Self {
            outcome,
            documents: Vec::new(),
        }
    }

    #[must_use]
    pub fn submitted(&self) -> usize {
        self.documents
            .iter()
            .filter(|d| d.result.is_accepted())
            .count()
    }

    #[must_use]
    pub fn failed(&self) -> usize {
        self.documents.len() - self.submitted()
    }

    pub fn log_summary(&self) {
        tracing::info!(
            outcome = %self.outcome,
            documents = self.documents.len(),
            submitted = self.submitted(),
            failed = self.failed(),
            "pipeline: run finished"
        );
    }
}

pub struct Pipeline<S> {
    api: ApiClient,
    store: ConfigStore,
    config: Mutex<RunConfig>,
    source: S,
}

impl<S: SalesSource> Pipeline<S> {
    pub fn new(api: ApiClient, store: ConfigStore, config: RunConfig, source: S) -> Self {
        Self {
            api,
            store,
            config: Mutex::new(config),
            source,
        }
    }

    /// The bearer token currently held in memory.
    #[cfg(test)]
    pub async fn bearer_token(&self) -> Option<String> {
        self.config.lock().await.authorization.bearer_token.clone()
    }

    /// Execute one full run with `today` as the reference date.
    pub async fn run(&self, today: NaiveDate) -> RunReport {
        let mut config = self.config.lock().await;

        let token = match self.api.refresh_token(&config.authorization).await {
            Ok(token) => token,
            Err(e) => {
                tracing::error!(error = %e, "pipeline: token refresh failed; waiting for next trigger");
                return RunReport::stopped(RunOutcome::AuthFailed);
            }
        };

        if let Err(e) = self.store.persist_token(&token) {
            tracing::error!(
                path = %self.store.path().display(),
                error = %e,
                "pipeline: could not save refreshed token; run abandoned"
            );
            return RunReport::stopped(RunOutcome::TokenNotPersisted);
        }
        config.authorization.bearer_token = Some(token.clone());
        tracing::info!(path = %self.store.path().display(), "pipeline: token refreshed and saved");

        let range = match resolve_date_range(
            &config.mode,
            config.start_date.as_deref(),
            config.end_date.as_deref(),
            today,
        ) {
            Ok(range) => range,
            Err(e) => {
                tracing::error!(mode = %config.mode, error = %e, "pipeline: cannot resolve date range");
                return RunReport::stopped(RunOutcome::RangeInvalid);
            }
        };
        drop(config);

        let documents = match self.source.documents(range).await {
            Ok(documents) => documents,
            Err(e) => {
                tracing::error!(range = %range, error = %e, "pipeline: extraction failed");
                return RunReport::stopped(RunOutcome::ExtractFailed);
            }
        };

        if documents.is_empty() {
            tracing::info!(
                start = %range.start,
                end = %range.end,
                "pipeline: no documents found in range"
            );
            return RunReport::stopped(RunOutcome::NoDocuments);
        }

        tracing::info!(range = %range, count = documents.len(), "pipeline: submitting documents");
        let mut outcomes = Vec::with_capacity(documents.len());
        for document in &documents {
            let result = self.api.submit_document(document, &token).await;
            outcomes.push(DocumentOutcome {
                doc_type: document.doc_type.clone(),
                date: document.date.clone(),
                result,
            });
        }

        RunReport {
            outcome: RunOutcome::Completed,
            documents: outcomes,
        }
    }
}

#[cfg(test)]
#[path = "pipeline_test.rs"]
mod tests;
