use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Invoice not found: {0}")]
    InvoiceNotFound(Uuid),

    #[error("Invoice too large: {size} bytes (max {max})")]
    InvoiceTooLarge { size: usize, max: usize },

    #[error("Invoice storage error: {0}")]
    InvoiceStorage(String),

    #[error("Mail relay is not configured")]
    MailRelayDisabled,

    #[error("Mail relay request failed: {0}")]
    MailRelayUnreachable(String),

    #[error("Mail relay rejected the message: status {0}")]
    MailRelayRejected(u16),

    #[error("Invalid request: {0}")]
    BadRequest(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            ServerError::InvoiceNotFound(_) => (StatusCode::NOT_FOUND, self.to_string()),
            ServerError::InvoiceTooLarge { .. } => {
                (StatusCode::PAYLOAD_TOO_LARGE, self.to_string())
            }
            ServerError::InvoiceStorage(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "Invoice storage error".to_string())
            }
            ServerError::MailRelayDisabled => {
                (StatusCode::SERVICE_UNAVAILABLE, self.to_string())
            }
            ServerError::MailRelayUnreachable(_) | ServerError::MailRelayRejected(_) => {
                (StatusCode::BAD_GATEWAY, self.to_string())
            }
            ServerError::BadRequest(_) => (StatusCode::BAD_REQUEST, self.to_string()),
            ServerError::Forbidden(_) => (StatusCode::FORBIDDEN, self.to_string()),
            ServerError::Internal(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error".to_string())
            }
        };

        let body = serde_json::json!({
            "error": message,
        });

        (status, axum::Json(body)).into_response()
    }
}
