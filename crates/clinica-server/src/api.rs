use std::sync::Arc;

use axum::{
    extract::{DefaultBodyLimit, Multipart, Path, State},
    http::{header, HeaderMap, Method, StatusCode},
    middleware,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;
use uuid::Uuid;

use crate::config::ServerConfig;
use crate::error::ServerError;
use crate::invoice_store::InvoiceStore;
use crate::mailer::{EmailRequest, Mailer};
use crate::rate_limit::{rate_limit_middleware, RateLimiter};

#[derive(Clone)]
pub struct AppState {
    pub invoice_store: Arc<InvoiceStore>,
    pub mailer: Mailer,
    pub rate_limiter: RateLimiter,
    pub config: Arc<ServerConfig>,
}

pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health_check))
        .route("/info", get(server_info))
        .route("/api/send-email", post(send_email))
        .route("/api/invoices", post(invoice_upload))
        .route("/invoices/{id}", get(invoice_download))
        .layer(DefaultBodyLimit::max(state.config.max_invoice_size + 64 * 1024))
        .layer(middleware::from_fn_with_state(
            state.rate_limiter.clone(),
            rate_limit_middleware,
        ))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

#[derive(Serialize)]
struct ServerInfoResponse {
    name: String,
    version: &'static str,
    email_enabled: bool,
}

#[derive(Serialize)]
struct SendEmailResponse {
    sent: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct InvoiceUploadResponse {
    id: Uuid,
    download_url: String,
}

async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

async fn server_info(State(state): State<AppState>) -> Json<ServerInfoResponse> {
    Json(ServerInfoResponse {
        name: state.config.instance_name.clone(),
        version: env!("CARGO_PKG_VERSION"),
        email_enabled: state.mailer.is_enabled(),
    })
}

async fn send_email(
    State(state): State<AppState>,
    Json(request): Json<EmailRequest>,
) -> Result<Json<SendEmailResponse>, ServerError> {
    request.validate()?;
    state.mailer.forward(&request).await?;

    info!(recipient = %request.recipient_email, "Email relayed");
    Ok(Json(SendEmailResponse { sent: true }))
}

async fn invoice_upload(
    headers: HeaderMap,
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<InvoiceUploadResponse>, ServerError> {
    verify_admin_token(&headers, &state.config)?;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ServerError::BadRequest(format!("Multipart error: {}", e)))?
    {
        let name = field.name().unwrap_or("").to_string();
        if name == "file" {
            let data = field
                .bytes()
                .await
                .map_err(|e| ServerError::BadRequest(format!("Failed to read field: {}", e)))?;

            let id = state.invoice_store.store_invoice(&data).await?;

            info!(id = %id, size = data.len(), "Invoice uploaded via API");

            return Ok(Json(InvoiceUploadResponse {
                download_url: format!("{}/invoices/{}", state.config.public_base_url, id),
                id,
            }));
        }
    }

    Err(ServerError::BadRequest(
        "Missing 'file' field in multipart form".to_string(),
    ))
}

async fn invoice_download(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ServerError> {
    let data = state.invoice_store.get_invoice(id).await?;

    let headers = [
        (header::CONTENT_TYPE, "application/pdf".to_string()),
        (
            header::CONTENT_DISPOSITION,
            format!("inline; filename=\"invoice-{id}.pdf\""),
        ),
    ];

    Ok((StatusCode::OK, headers, data))
}

/// When `ADMIN_TOKEN` is configured, uploads require a matching bearer token.
/// With no token configured the endpoint is open (local development).
fn verify_admin_token(headers: &HeaderMap, config: &ServerConfig) -> Result<(), ServerError> {
    let Some(ref expected) = config.admin_token else {
        return Ok(());
    };

    let auth = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");

    let token = auth.strip_prefix("Bearer ").unwrap_or(auth);

    // Constant-time comparison to prevent timing attacks on the token.
    use subtle::ConstantTimeEq;
    let token_bytes = token.as_bytes();
    let expected_bytes = expected.as_bytes();
    if token_bytes.len() != expected_bytes.len()
        || token_bytes.ct_eq(expected_bytes).unwrap_u8() != 1
    {
        return Err(ServerError::Forbidden("Invalid admin token".into()));
    }

    Ok(())
}

pub async fn serve(state: AppState, addr: std::net::SocketAddr) -> anyhow::Result<()> {
    let app = build_router(state);

    info!(addr = %addr, "Starting HTTP API server");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<std::net::SocketAddr>(),
    )
    .await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_with_token(token: Option<&str>) -> ServerConfig {
        let mut config = ServerConfig::default();
        config.admin_token = token.map(str::to_string);
        config
    }

    fn bearer(token: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(
            "authorization",
            format!("Bearer {token}").parse().unwrap(),
        );
        headers
    }

    #[test]
    fn test_open_when_no_token_configured() {
        let config = config_with_token(None);
        assert!(verify_admin_token(&HeaderMap::new(), &config).is_ok());
    }

    #[test]
    fn test_matching_token_accepted() {
        let config = config_with_token(Some("s3cret"));
        assert!(verify_admin_token(&bearer("s3cret"), &config).is_ok());
    }

    #[test]
    fn test_wrong_or_missing_token_rejected() {
        let config = config_with_token(Some("s3cret"));
        assert!(verify_admin_token(&bearer("guess"), &config).is_err());
        assert!(verify_admin_token(&HeaderMap::new(), &config).is_err());
    }
}
