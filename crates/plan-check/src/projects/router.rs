use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde_json::json;

use super::domain::{DocumentId, NewDocument, NewProject, ProjectId};
use super::repository::{ProjectRepository, RepositoryError};
use super::service::{ServiceError, ValidationService};

/// Router builder exposing project, upload and validation endpoints.
pub fn project_router<R>(service: Arc<ValidationService<R>>) -> Router
where
    R: ProjectRepository + 'static,
{
    Router::new()
        .route("/api/v1/projects", post(create_project_handler::<R>))
        .route("/api/v1/projects/:project_id", get(project_handler::<R>))
        .route(
            "/api/v1/projects/:project_id/documents",
            post(upload_handler::<R>),
        )
        .route(
            "/api/v1/documents/:document_id/validate",
            post(validate_handler::<R>),
        )
        .route("/api/v1/documents/:document_id", get(document_handler::<R>))
        .with_state(service)
}

pub(crate) async fn create_project_handler<R>(
    State(service): State<Arc<ValidationService<R>>>,
    axum::Json(request): axum::Json<NewProject>,
) -> Response
where
    R: ProjectRepository + 'static,
{
    match service.create_project(request) {
        Ok(project) => (StatusCode::CREATED, axum::Json(project)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn project_handler<R>(
    State(service): State<Arc<ValidationService<R>>>,
    Path(project_id): Path<String>,
) -> Response
where
    R: ProjectRepository + 'static,
{
    match service.project(&ProjectId(project_id)) {
        Ok(summary) => (StatusCode::OK, axum::Json(summary)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn upload_handler<R>(
    State(service): State<Arc<ValidationService<R>>>,
    Path(project_id): Path<String>,
    axum::Json(request): axum::Json<NewDocument>,
) -> Response
where
    R: ProjectRepository + 'static,
{
    match service.upload_document(&ProjectId(project_id), request) {
        Ok(record) => (StatusCode::CREATED, axum::Json(record.view())).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn validate_handler<R>(
    State(service): State<Arc<ValidationService<R>>>,
    Path(document_id): Path<String>,
) -> Response
where
    R: ProjectRepository + 'static,
{
    match service.validate_document(&DocumentId(document_id)) {
        Ok(record) => (StatusCode::OK, axum::Json(record.view())).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn document_handler<R>(
    State(service): State<Arc<ValidationService<R>>>,
    Path(document_id): Path<String>,
) -> Response
where
    R: ProjectRepository + 'static,
{
    match service.document(&DocumentId(document_id)) {
        Ok(record) => (StatusCode::OK, axum::Json(record.view())).into_response(),
        Err(err) => error_response(err),
    }
}

fn error_response(err: ServiceError) -> Response {
    let status = match &err {
        ServiceError::InvalidRequest(_) => StatusCode::UNPROCESSABLE_ENTITY,
        ServiceError::Repository(RepositoryError::NotFound) => StatusCode::NOT_FOUND,
        ServiceError::Repository(RepositoryError::Conflict) => StatusCode::CONFLICT,
        ServiceError::Repository(RepositoryError::Unavailable(_)) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };
    let payload = json!({
        "error": err.to_string(),
    });
    (status, axum::Json(payload)).into_response()
}
