//! HTTP surface
//!
//! Every route is a thin mapping onto a registered command, so the HTTP API
//! and [`crate::commands::dispatch`] always agree. The prompt routes speak the
//! same shape [`crate::store::HttpBackend`] expects, which lets one promptdeck
//! instance act as the remote store of another.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    extract::{Path, Query, RawQuery, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, put},
    Json, Router,
};
use serde::Deserialize;
use serde_json::{json, Value};
use tokio::net::TcpListener;

use crate::app::App;
use crate::commands::dispatch;
use crate::errors::{PromptError, Result};

pub type SharedApp = Arc<App>;

/// A [`PromptError`] rendered as `{ error, message, category }`
#[derive(Debug)]
pub struct ApiError(PromptError);

impl From<PromptError> for ApiError {
    fn from(err: PromptError) -> Self {
        ApiError(err)
    }
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self.0.category() {
            "not_found" | "command" => StatusCode::NOT_FOUND,
            "validation" | "arguments" | "serialization" | "decode" => StatusCode::BAD_REQUEST,
            "migration" => StatusCode::CONFLICT,
            "store" => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self.0, "request failed");
        }
        let body = json!({
            "error": true,
            "message": self.0.user_message(),
            "category": self.0.category(),
        });
        (status, Json(body)).into_response()
    }
}

type ApiResult<T> = std::result::Result<T, ApiError>;

pub fn router(app: SharedApp) -> Router {
    Router::new()
        .route("/prompts", get(list_prompts).post(create_prompt))
        .route("/prompts/search", get(search_prompts))
        .route("/prompts/view", get(view_prompts))
        .route("/prompts/{id}", put(update_prompt).delete(delete_prompt))
        .route("/stats", get(stats))
        .route("/migration", get(migration_status).post(run_migration))
        .route("/migration/close", axum::routing::post(close_migration))
        .with_state(app)
}

/// Bind `addr` and serve until ctrl-c
pub async fn serve(addr: SocketAddr, app: SharedApp) -> Result<()> {
    let listener = TcpListener::bind(addr).await?;
    tracing::info!(addr = %listener.local_addr()?, "promptdeck listening");

    axum::serve(listener, router(app))
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("shutting down");
        })
        .await?;
    Ok(())
}

// ============================================================================
// Prompts
// ============================================================================

async fn list_prompts(State(app): State<SharedApp>) -> ApiResult<Json<Value>> {
    let mut result = dispatch(&app, "prompts.list", Value::Null).await?;
    Ok(Json(result["prompts"].take()))
}

async fn create_prompt(
    State(app): State<SharedApp>,
    Json(body): Json<Value>,
) -> ApiResult<(StatusCode, Json<Value>)> {
    let prompt = dispatch(&app, "prompts.create", body).await?;
    Ok((StatusCode::CREATED, Json(prompt)))
}

async fn update_prompt(
    State(app): State<SharedApp>,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> ApiResult<Json<Value>> {
    let mut args = match body {
        Value::Object(map) => map,
        _ => serde_json::Map::new(),
    };
    args.insert("id".into(), Value::String(id));
    Ok(Json(dispatch(&app, "prompts.update", Value::Object(args)).await?))
}

async fn delete_prompt(
    State(app): State<SharedApp>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    dispatch(&app, "prompts.delete", json!({ "id": id })).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, Deserialize)]
struct SearchParams {
    #[serde(default)]
    q: String,
}

async fn search_prompts(
    State(app): State<SharedApp>,
    Query(params): Query<SearchParams>,
) -> ApiResult<Json<Value>> {
    let mut result = dispatch(&app, "prompts.search", json!({ "q": params.q })).await?;
    Ok(Json(result["prompts"].take()))
}

async fn view_prompts(
    State(app): State<SharedApp>,
    RawQuery(query): RawQuery,
) -> ApiResult<Json<Value>> {
    let query = query.unwrap_or_default();
    Ok(Json(dispatch(&app, "prompts.view", json!({ "query": query })).await?))
}

// ============================================================================
// Dashboard and migration
// ============================================================================

async fn stats(State(app): State<SharedApp>) -> ApiResult<Json<Value>> {
    Ok(Json(dispatch(&app, "dashboard.stats", Value::Null).await?))
}

async fn migration_status(State(app): State<SharedApp>) -> ApiResult<Json<Value>> {
    Ok(Json(dispatch(&app, "migration.status", Value::Null).await?))
}

async fn run_migration(State(app): State<SharedApp>) -> ApiResult<Json<Value>> {
    Ok(Json(dispatch(&app, "migration.run", Value::Null).await?))
}

async fn close_migration(State(app): State<SharedApp>) -> ApiResult<Json<Value>> {
    Ok(Json(dispatch(&app, "migration.close", Value::Null).await?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::BackendError;

    #[test]
    fn test_error_status_mapping() {
        let cases = [
            (PromptError::Store(BackendError::NotFound("x".into())), StatusCode::NOT_FOUND),
            (PromptError::CommandNotFound("x".into()), StatusCode::NOT_FOUND),
            (PromptError::Validation("blank".into()), StatusCode::BAD_REQUEST),
            (PromptError::migration("No migration pending", None), StatusCode::CONFLICT),
            (
                PromptError::Store(BackendError::Unavailable("down".into())),
                StatusCode::BAD_GATEWAY,
            ),
            (PromptError::Other("boom".into()), StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (err, status) in cases {
            assert_eq!(ApiError::from(err).status(), status);
        }
    }
}
