use crate::config::ConfigError;
use crate::drawing::DrawingImportError;
use crate::projects::{RepositoryError, ServiceError};
use crate::room_list::RoomListImportError;
use crate::telemetry::TelemetryError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use std::fmt;

#[derive(Debug)]
pub enum AppError {
    Config(ConfigError),
    Telemetry(TelemetryError),
    Io(std::io::Error),
    Server(axum::Error),
    Drawing(DrawingImportError),
    RoomList(RoomListImportError),
    Service(ServiceError),
    Output(serde_json::Error),
    Task(tokio::task::JoinError),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Config(err) => write!(f, "configuration error: {}", err),
            AppError::Telemetry(err) => write!(f, "telemetry error: {}", err),
            AppError::Io(err) => write!(f, "io error: {}", err),
            AppError::Server(err) => write!(f, "server error: {}", err),
            AppError::Drawing(err) => write!(f, "drawing error: {}", err),
            AppError::RoomList(err) => write!(f, "room list error: {}", err),
            AppError::Service(err) => write!(f, "service error: {}", err),
            AppError::Output(err) => write!(f, "output error: {}", err),
            AppError::Task(err) => write!(f, "background task error: {}", err),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::Config(err) => Some(err),
            AppError::Telemetry(err) => Some(err),
            AppError::Io(err) => Some(err),
            AppError::Server(err) => Some(err),
            AppError::Drawing(err) => Some(err),
            AppError::RoomList(err) => Some(err),
            AppError::Service(err) => Some(err),
            AppError::Output(err) => Some(err),
            AppError::Task(err) => Some(err),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match self {
            AppError::Drawing(_) | AppError::RoomList(_) => StatusCode::BAD_REQUEST,
            AppError::Service(ServiceError::InvalidRequest(_)) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Service(ServiceError::Repository(RepositoryError::NotFound)) => {
                StatusCode::NOT_FOUND
            }
            AppError::Config(_)
            | AppError::Telemetry(_)
            | AppError::Io(_)
            | AppError::Server(_)
            | AppError::Service(_)
            | AppError::Output(_)
            | AppError::Task(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = Json(json!({ "error": self.to_string() }));
        (status, body).into_response()
    }
}

impl From<ConfigError> for AppError {
    fn from(value: ConfigError) -> Self {
        Self::Config(value)
    }
}

impl From<TelemetryError> for AppError {
    fn from(value: TelemetryError) -> Self {
        Self::Telemetry(value)
    }
}

impl From<std::io::Error> for AppError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<axum::Error> for AppError {
    fn from(value: axum::Error) -> Self {
        Self::Server(value)
    }
}

impl From<DrawingImportError> for AppError {
    fn from(value: DrawingImportError) -> Self {
        Self::Drawing(value)
    }
}

impl From<RoomListImportError> for AppError {
    fn from(value: RoomListImportError) -> Self {
        Self::RoomList(value)
    }
}

impl From<ServiceError> for AppError {
    fn from(value: ServiceError) -> Self {
        Self::Service(value)
    }
}

impl From<serde_json::Error> for AppError {
    fn from(value: serde_json::Error) -> Self {
        Self::Output(value)
    }
}

impl From<tokio::task::JoinError> for AppError {
    fn from(value: tokio::task::JoinError) -> Self {
        Self::Task(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unreadable_inputs_are_bad_requests() {
        let err = AppError::from(DrawingImportError::MissingModelSpace);
        assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn service_errors_map_to_status_codes() {
        let invalid = AppError::from(ServiceError::InvalidRequest("name is required".to_string()));
        assert_eq!(
            invalid.into_response().status(),
            StatusCode::UNPROCESSABLE_ENTITY
        );

        let unavailable = AppError::from(ServiceError::Repository(RepositoryError::Unavailable(
            "offline".to_string(),
        )));
        assert!(unavailable.to_string().contains("offline"));
        assert_eq!(
            unavailable.into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[tokio::test]
    async fn panicked_background_tasks_are_internal_errors() {
        let join_error = tokio::task::spawn_blocking(|| panic!("engine crashed"))
            .await
            .expect_err("task panics");
        let err = AppError::from(join_error);

        assert!(err.to_string().starts_with("background task error"));
        assert_eq!(
            err.into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
