use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;
use tracing::{error, warn};

use crate::models::InvalidInput;
use crate::store::StoreError;
use crate::utils::response::error as error_response;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Seat unavailable: {0}")]
    SeatUnavailable(String),

    #[error("Seat not sold: {0}")]
    SeatNotSold(String),

    #[error("Database error")]
    DatabaseError(#[from] sqlx::Error),
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::ValidationError(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::SeatUnavailable(_) => StatusCode::CONFLICT,
            AppError::SeatNotSold(_) => StatusCode::CONFLICT,
            AppError::DatabaseError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            AppError::ValidationError(_) => "VALIDATION_ERROR",
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::Conflict(_) => "CONFLICT",
            AppError::SeatUnavailable(_) => "SEAT_UNAVAILABLE",
            AppError::SeatNotSold(_) => "SEAT_NOT_SOLD",
            AppError::DatabaseError(_) => "DATABASE_ERROR",
        }
    }

    fn log(&self) {
        match self {
            AppError::ValidationError(msg)
            | AppError::NotFound(msg)
            | AppError::Conflict(msg)
            | AppError::SeatUnavailable(msg)
            | AppError::SeatNotSold(msg) => {
                warn!(code = self.code(), message = %msg, "Request rejected");
            }
            AppError::DatabaseError(e) => {
                error!(error = ?e, "Database error");
            }
        }
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        let message = err.to_string();
        match err {
            StoreError::NotFound(_) => AppError::NotFound(message),
            StoreError::Duplicate(_)
            | StoreError::DuplicateSeat(_)
            | StoreError::ConcurrentUpdate(_) => AppError::Conflict(message),
            StoreError::SeatUnavailable { .. } => AppError::SeatUnavailable(message),
            StoreError::SeatNotSold { .. } => AppError::SeatNotSold(message),
            StoreError::Invalid(_) => AppError::ValidationError(message),
            StoreError::Database(e) => AppError::DatabaseError(e),
        }
    }
}

impl From<InvalidInput> for AppError {
    fn from(err: InvalidInput) -> Self {
        AppError::ValidationError(err.0)
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::ValidationError(rejection.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::ValidationError(rejection.body_text())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let code = self.code();

        // Log internal details
        self.log();

        // Only expose high-level message to the client
        let public_message = match &self {
            AppError::ValidationError(msg)
            | AppError::NotFound(msg)
            | AppError::Conflict(msg)
            | AppError::SeatUnavailable(msg)
            | AppError::SeatNotSold(msg) => msg.clone(),
            AppError::DatabaseError(_) => "A database error occurred".to_string(),
        };

        error_response(code, public_message, None, status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{MovieId, SeatId};

    #[test]
    fn test_store_errors_map_to_client_errors() {
        let movie = MovieId::new();
        let seat = SeatId::parse("A1").unwrap();

        let cases = [
            (StoreError::NotFound(movie), StatusCode::NOT_FOUND, "NOT_FOUND"),
            (
                StoreError::Duplicate("Dune".into()),
                StatusCode::CONFLICT,
                "CONFLICT",
            ),
            (
                StoreError::DuplicateSeat(seat.clone()),
                StatusCode::CONFLICT,
                "CONFLICT",
            ),
            (
                StoreError::ConcurrentUpdate(movie),
                StatusCode::CONFLICT,
                "CONFLICT",
            ),
            (
                StoreError::SeatUnavailable {
                    movie,
                    seat: seat.clone(),
                },
                StatusCode::CONFLICT,
                "SEAT_UNAVAILABLE",
            ),
            (
                StoreError::SeatNotSold { movie, seat },
                StatusCode::CONFLICT,
                "SEAT_NOT_SOLD",
            ),
            (
                StoreError::Invalid(InvalidInput::new("bad")),
                StatusCode::BAD_REQUEST,
                "VALIDATION_ERROR",
            ),
        ];

        for (store_err, status, code) in cases {
            let app_err = AppError::from(store_err);
            assert_eq!(app_err.status_code(), status);
            assert_eq!(app_err.code(), code);
        }
    }

    #[test]
    fn test_database_errors_are_server_errors() {
        let err = AppError::from(StoreError::Database(sqlx::Error::PoolTimedOut));
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.into_response().status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_message_is_carried_through() {
        let err = AppError::from(StoreError::Duplicate("Dune".into()));
        assert!(matches!(err, AppError::Conflict(ref msg) if msg.contains("Dune")));
    }
}
