use axum::{http::StatusCode, response::IntoResponse, Json};
use log::error;
use serde_json::json;

use crate::store::StoreError;

// Domain errors raised by the services. Translated into CustomError at the http boundary
#[derive(Debug, thiserror::Error)]
pub enum GameError {
    #[error("{0}")]
    InvalidInput(String),
    #[error("{0}")]
    InvalidState(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Unauthorized(String),
    #[error("{0}")]
    Conflict(String),
    #[error("storage failure: {0}")]
    Storage(#[from] StoreError),
    #[error("token failure: {0}")]
    Token(#[from] jsonwebtoken::errors::Error),
    #[error("password hashing failure: {0}")]
    Hashing(String),
}

// Custom Errors used in handlers
#[derive(Debug)]
pub enum CustomError {
    BadRequest(String),
    NotFound(String),
    Unauthorized(String),
    InternalServerError,
}

impl From<GameError> for CustomError {
    fn from(err: GameError) -> Self {
        match err {
            GameError::InvalidInput(msg)
            | GameError::InvalidState(msg)
            | GameError::Conflict(msg) => CustomError::BadRequest(msg),
            GameError::NotFound(msg) => CustomError::NotFound(msg),
            GameError::Unauthorized(msg) => CustomError::Unauthorized(msg),
            other => {
                error!("Unexpected error: {}", other);
                CustomError::InternalServerError
            }
        }
    }
}

//implementation of custom errors that are used in handlers
impl IntoResponse for CustomError {
    fn into_response(self) -> axum::response::Response {
        let (status, error_message) = match self {
            Self::InternalServerError => (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error".to_string()),
            Self::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            Self::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            Self::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg),
        };
        (status, Json(json!({"error": error_message}))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn domain_errors_map_to_status_codes() {
        let cases = [
            (GameError::InvalidInput("bad".into()), StatusCode::BAD_REQUEST),
            (GameError::InvalidState("late".into()), StatusCode::BAD_REQUEST),
            (GameError::Conflict("taken".into()), StatusCode::BAD_REQUEST),
            (GameError::NotFound("gone".into()), StatusCode::NOT_FOUND),
            (GameError::Unauthorized("who".into()), StatusCode::UNAUTHORIZED),
            (GameError::Hashing("boom".into()), StatusCode::INTERNAL_SERVER_ERROR),
            (GameError::Storage(StoreError::Corrupt("x".into())), StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (err, status) in cases {
            assert_eq!(CustomError::from(err).into_response().status(), status);
        }
    }
}
