use futures_util::future::BoxFuture;
use serde_json::{json, Value};

use crate::app::App;
use crate::errors::Result;

/// Current migration state, `null` when there was nothing to migrate
pub fn status(app: &App, _args: Value) -> BoxFuture<'_, Result<Value>> {
    Box::pin(async move {
        let snapshot = app.migration_snapshot();
        let percent = snapshot.as_ref().and_then(|s| s.progress.percent());
        Ok(json!({ "migration": snapshot, "percent": percent }))
    })
}

/// Start or retry the migration
pub fn run(app: &App, _args: Value) -> BoxFuture<'_, Result<Value>> {
    Box::pin(async move {
        let report = app.run_migration().await?;
        Ok(json!({ "report": report, "migration": app.migration_snapshot() }))
    })
}

pub fn close(app: &App, _args: Value) -> BoxFuture<'_, Result<Value>> {
    Box::pin(async move {
        app.close_migration().await?;
        Ok(json!({ "success": true }))
    })
}
