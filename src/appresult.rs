use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

use crate::store::StoreError;

pub type AppResult<T> = Result<T, AppError>;

#[derive(Debug)]
pub enum AppError {
    /// Wrong username or password.
    InvalidCredentials,
    /// No user in the session.
    Unauthenticated,
    /// Request is missing something it needs. The message goes back to the client.
    Validation(String),
    /// Backend failure. Clients only ever see a generic message.
    Store(StoreError),
    Internal(anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            AppError::InvalidCredentials => (
                StatusCode::UNAUTHORIZED,
                json!({ "ok": false, "error": "Invalid credentials" }),
            ),
            AppError::Unauthenticated => {
                (StatusCode::UNAUTHORIZED, json!({ "error": "Not logged in" }))
            }
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, json!({ "error": msg })),
            AppError::Store(err) => {
                tracing::error!(error = %err, "store error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({ "error": "Database error" }),
                )
            }
            AppError::Internal(err) => {
                tracing::error!("{}\n\n{}", err, err.backtrace());
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({ "error": "Internal error" }),
                )
            }
        };

        (status, Json(body)).into_response()
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        Self::Store(err)
    }
}

macro_rules! apperr_impl {
    ($E:ty) => {
        impl From<$E> for AppError {
            fn from(err: $E) -> Self {
                Self::Internal(anyhow::Error::from(err))
            }
        }
    };
}

apperr_impl!(tower_sessions::session::Error);
