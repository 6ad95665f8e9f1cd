use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use tracing::error;

#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Internal server error: {0}")]
    Internal(String),

    #[error("Api error: {0} - {1}")]
    Api(StatusCode, String),

    #[error("Failed to verify token: {0}")]
    JwtVerification(String),

    #[error("Database error: {0}")]
    Sqlx(#[from] sqlx::Error),

    #[error("Failed to parse json: {0}")]
    Json(#[from] serde_json::Error),
}

impl ServerError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ServerError::NotFound(_) => StatusCode::NOT_FOUND,
            ServerError::Forbidden(_) => StatusCode::FORBIDDEN,
            ServerError::BadRequest(_) | ServerError::Json(_) => StatusCode::BAD_REQUEST,
            ServerError::Conflict(_) => StatusCode::CONFLICT,
            ServerError::Api(status, _) => *status,
            ServerError::JwtVerification(_) => StatusCode::UNAUTHORIZED,
            ServerError::Internal(_) | ServerError::Sqlx(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message shown to the client. Storage and internal details stay in the logs.
    pub fn client_message(&self) -> String {
        match self {
            ServerError::NotFound(msg)
            | ServerError::Forbidden(msg)
            | ServerError::BadRequest(msg)
            | ServerError::Conflict(msg)
            | ServerError::Api(_, msg) => msg.clone(),
            ServerError::JwtVerification(_) => "Invalid or expired token".into(),
            ServerError::Json(_) => "Malformed request body".into(),
            ServerError::Internal(_) | ServerError::Sqlx(_) => "Internal server error".into(),
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            error!("{}", self);
        }

        let body = json!({
            "status_code": status.as_u16(),
            "success": false,
            "message": self.client_message(),
        });

        (status, Json(body)).into_response()
    }
}
