//! `promptdeck` server binary

use std::sync::Arc;

use promptdeck_core::{app::App, config::Config, logger::Logger, runtime, server};
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("promptdeck_core=info,promptdeck=info")),
        )
        .init();

    runtime::block_on(run())
}

async fn run() -> anyhow::Result<()> {
    let config = Config::from_env()?;
    let logger = Logger::tracing();
    let app = Arc::new(App::from_config(&config, logger.clone()).await?);

    // Legacy prompts are moved over before serving; a failure leaves the
    // job in its error state so it can be retried through POST /migration
    if app.migration_snapshot().is_some() {
        match app.run_migration().await {
            Ok(report) => logger.info(
                "Legacy prompts migrated",
                Some(serde_json::json!({ "migrated": report.migrated })),
            ),
            Err(e) => logger.error("Legacy migration failed at startup", &e),
        }
    }

    server::serve(config.bind, app).await?;
    Ok(())
}
