mod logging;
mod orchestrator;
mod pipeline;
mod scheduler;

#[cfg(test)]
mod test_support;

use std::fmt::Display;
use std::sync::Arc;

use salesync_api::ApiClient;
use salesync_core::ConfigStore;

use crate::{
    orchestrator::Orchestrator,
    pipeline::{PgSalesSource, Pipeline},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = salesync_core::load_settings()?;
    logging::init(&settings)?;

    let store = ConfigStore::new(&settings.config_path);
    let config = store.load().unwrap_or_else(|e| fatal("config", &e));
    tracing::info!(
        path = %store.path().display(),
        run_at = %config.run_at,
        mode = %config.mode,
        "agent: configuration loaded"
    );

    let api = ApiClient::new(
        &config.api_base_url,
        settings.http_timeout(),
        settings.http_connect_timeout(),
    )
    .unwrap_or_else(|e| fatal("api", &e));

    let source = PgSalesSource::new(
        config.connection_string.clone(),
        salesync_db::PoolConfig::from_settings(&settings),
        settings.source_view.clone(),
        settings.db_query_timeout(),
    );
    source.check().await;

    let run_at = config.run_at;
    let pipeline = Pipeline::new(api, store, config, source);
    let orchestrator = Arc::new(Orchestrator::new(run_at, pipeline));

    let mut scheduler = scheduler::build_scheduler(orchestrator, &settings.tick_cron).await?;

    shutdown_signal().await;
    scheduler.shutdown().await?;
    tracing::info!("agent: stopped");
    Ok(())
}

/// Log a startup failure and exit without scheduling anything.
fn fatal(stage: &str, error: &dyn Display) -> ! {
    tracing::error!(stage, error = %error, "agent: startup failed");
    std::process::exit(1);
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "agent: failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "agent: failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("agent: received shutdown signal, stopping scheduler");
}
