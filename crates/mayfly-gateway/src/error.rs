use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use mayfly_pastebin::PastebinError;
use mayfly_shortener::ShortenerError;
use serde_json::json;
use thiserror::Error;
use tracing::error;

pub type Result<T> = std::result::Result<T, AppError>;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    Validation(String),
    #[error(transparent)]
    Shortener(#[from] ShortenerError),
    #[error(transparent)]
    Pastebin(#[from] PastebinError),
    #[error("request deadline exceeded")]
    DeadlineElapsed,
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        Self::Validation(rejection.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        Self::Validation(rejection.body_text())
    }
}

impl AppError {
    fn status(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::DeadlineElapsed => StatusCode::GATEWAY_TIMEOUT,
            AppError::Shortener(err) => match err {
                ShortenerError::InvalidUrl(_) | ShortenerError::InvalidExpiry(_) => {
                    StatusCode::BAD_REQUEST
                }
                ShortenerError::DuplicateCode(_) => StatusCode::CONFLICT,
                ShortenerError::NotFound(_) | ShortenerError::Expired(_) => StatusCode::NOT_FOUND,
                ShortenerError::Generator(_) | ShortenerError::Storage(_) => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
            AppError::Pastebin(err) => match err {
                PastebinError::InvalidExpiry(_) => StatusCode::BAD_REQUEST,
                PastebinError::DuplicateId(_) => StatusCode::CONFLICT,
                PastebinError::NotFound(_) | PastebinError::Expired(_) => StatusCode::NOT_FOUND,
                PastebinError::Generator(_) | PastebinError::Storage(_) => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        // internal details stay in the logs
        let message = if status == StatusCode::INTERNAL_SERVER_ERROR {
            error!(error = %self, "request failed");
            "internal server error".to_string()
        } else {
            self.to_string()
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mayfly_core::StorageError;

    #[test]
    fn status_codes() {
        let cases = [
            (AppError::Validation("bad".into()), StatusCode::BAD_REQUEST),
            (AppError::DeadlineElapsed, StatusCode::GATEWAY_TIMEOUT),
            (
                ShortenerError::DuplicateCode("abc".into()).into(),
                StatusCode::CONFLICT,
            ),
            (
                ShortenerError::Expired("abc".into()).into(),
                StatusCode::NOT_FOUND,
            ),
            (
                ShortenerError::Storage(StorageError::Timeout("slow".into())).into(),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            (
                PastebinError::DuplicateId("p".into()).into(),
                StatusCode::CONFLICT,
            ),
            (
                PastebinError::NotFound("p".into()).into(),
                StatusCode::NOT_FOUND,
            ),
        ];

        for (err, status) in cases {
            assert_eq!(err.status(), status, "{err}");
        }
    }

    #[test]
    fn not_found_and_expired_read_differently() {
        let missing = AppError::from(ShortenerError::NotFound("abc".into())).to_string();
        let expired = AppError::from(ShortenerError::Expired("abc".into())).to_string();

        assert!(missing.contains("not found"));
        assert!(expired.contains("has expired"));
    }
}
