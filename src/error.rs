use axum::{Json, http::StatusCode, response::IntoResponse};
use serde::Serialize;
use sqlx::Error as SqlxError;
use thiserror::Error as ThisError;

#[derive(Debug, ThisError)]
pub enum GuildhallError {
    #[error("database error: {0}")]
    Database(#[from] SqlxError),

    #[error("missing or invalid session")]
    Unauthorized,
}

impl IntoResponse for GuildhallError {
    fn into_response(self) -> axum::response::Response {
        let (status, error_body) = match self {
            GuildhallError::Unauthorized => {
                let body = ApiErrorBody {
                    code: "UNAUTHORIZED".to_string(),
                    message: "A signed-in session is required.".to_string(),
                };
                (StatusCode::UNAUTHORIZED, body)
            }
            GuildhallError::Database(_) => {
                // Store-level details stay in the logs, not the response.
                let body = ApiErrorBody {
                    code: "INTERNAL_ERROR".to_string(),
                    message: "An internal server error occurred.".to_string(),
                };
                (StatusCode::INTERNAL_SERVER_ERROR, body)
            }
        };
        (status, Json(ApiErrorResponse { error: error_body })).into_response()
    }
}

/// Standardized API error response body
#[derive(Serialize)]
pub struct ApiErrorBody {
    pub code: String,
    pub message: String,
}

#[derive(Serialize)]
pub struct ApiErrorResponse {
    pub error: ApiErrorBody,
}
