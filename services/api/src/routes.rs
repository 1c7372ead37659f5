use crate::infra::AppState;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Extension;
use axum::Json;
use plan_check::error::AppError;
use plan_check::projects::{project_router, DocumentInputs, ProjectRepository, ValidationService};
use plan_check::validation::{RuleEntry, ValidationResult};
use serde::Serialize;
use serde_json::json;
use std::sync::Arc;

#[derive(Debug, Serialize)]
pub(crate) struct RuleCatalogResponse {
    pub(crate) total: usize,
    pub(crate) rules: Vec<RuleEntry>,
}

pub(crate) fn with_service_routes<R>(service: Arc<ValidationService<R>>) -> axum::Router
where
    R: ProjectRepository + 'static,
{
    project_router(service)
        .route("/health", axum::routing::get(healthcheck))
        .route("/ready", axum::routing::get(readiness_endpoint))
        .route("/metrics", axum::routing::get(metrics_endpoint))
        .route("/api/v1/rules", axum::routing::get(rules_endpoint))
        .route("/api/v1/validate", axum::routing::post(validate_endpoint))
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

pub(crate) async fn rules_endpoint(
    Extension(state): Extension<AppState>,
) -> Json<RuleCatalogResponse> {
    let rules = state.engine.catalog().entries();
    Json(RuleCatalogResponse {
        total: rules.len(),
        rules,
    })
}

/// Stateless validation. Unreadable inputs come back as a blocked result, not as an HTTP error.
/// The engine runs on the blocking pool so large drawings do not stall the executor.
pub(crate) async fn validate_endpoint(
    Extension(state): Extension<AppState>,
    Json(inputs): Json<DocumentInputs>,
) -> Result<Json<ValidationResult>, AppError> {
    let engine = state.engine.clone();
    let result = tokio::task::spawn_blocking(move || inputs.validate(&engine)).await?;
    Ok(Json(result))
}
