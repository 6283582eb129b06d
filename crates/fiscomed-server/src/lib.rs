//! Fiscomed Web Server
//!
//! Axum-based REST API over the fiscomed-core contracts. The handlers stay
//! thin: boundary validation, a call into the core, and an audit log entry.
//!
//! Security posture:
//! - Restrictive CORS policy (explicit allow-list, same-origin otherwise)
//! - Input validation (pagination limits, kind/status parsing, amount checks)
//! - Audit logging for all API access (reads and writes)
//! - Sanitized error responses

use std::sync::Arc;

use axum::{
    http::{HeaderValue, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};
use tracing::{error, info, warn};

use fiscomed_core::ai::AdvisorChain;
use fiscomed_core::db::Database;

mod handlers;

#[cfg(test)]
mod tests;

/// Maximum pagination limit
pub const MAX_PAGE_LIMIT: i64 = 1000;

/// Header carrying the acting user's identity (for audit logging)
const USER_HEADER: &str = "x-fiscomed-user";

/// Server configuration
#[derive(Clone, Default)]
pub struct ServerConfig {
    /// Allowed CORS origins (empty = same-origin only)
    pub allowed_origins: Vec<String>,
}

/// Shared application state
pub struct AppState {
    pub db: Database,
    /// Advisor chain for low-confidence escalation, when configured
    pub advisors: Option<AdvisorChain>,
}

/// Extract the acting user from request headers (for audit logging)
pub fn get_user(headers: &axum::http::HeaderMap) -> String {
    headers
        .get(USER_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .unwrap_or("local")
        .to_string()
}

/// Success response
#[derive(Serialize)]
pub struct SuccessResponse {
    pub success: bool,
}

/// Error payload returned to clients
#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

/// API error with an HTTP status
pub struct AppError {
    status: StatusCode,
    message: String,
}

impl AppError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            message: message.into(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        (self.status, Json(ErrorResponse { error: self.message })).into_response()
    }
}

impl From<fiscomed_core::Error> for AppError {
    fn from(err: fiscomed_core::Error) -> Self {
        use fiscomed_core::Error;

        match err {
            Error::NotFound(message) => Self {
                status: StatusCode::NOT_FOUND,
                message,
            },
            Error::InvalidData(message) => Self {
                status: StatusCode::BAD_REQUEST,
                message,
            },
            // Persistence and advisor failures are unrecoverable here; log the
            // detail, return a sanitized message
            other => {
                error!("Internal error: {}", other);
                Self {
                    status: StatusCode::INTERNAL_SERVER_ERROR,
                    message: "Internal server error".to_string(),
                }
            }
        }
    }
}

/// Health check payload
#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    advisor_configured: bool,
}

async fn health(
    axum::extract::State(state): axum::extract::State<Arc<AppState>>,
) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        advisor_configured: state.advisors.is_some(),
    })
}

/// Create the application router
pub fn create_router(db: Database, config: ServerConfig) -> Router {
    // Advisor chain from config + environment, when credentials exist
    let advisors = AdvisorChain::from_env();
    match &advisors {
        Some(chain) => info!(providers = chain.len(), "Advisor chain configured"),
        None => info!("ℹ️  Advisor chain not configured (set GEMINI_API_KEY to enable escalation)"),
    }

    create_router_with_advisors(db, config, advisors)
}

/// Create the application router with an explicit advisor chain (for testing)
pub fn create_router_with_advisors(
    db: Database,
    config: ServerConfig,
    advisors: Option<AdvisorChain>,
) -> Router {
    let state = Arc::new(AppState { db, advisors });

    let api_routes = Router::new()
        .route("/health", get(health))
        // Transactions
        .route(
            "/transactions",
            get(handlers::list_transactions).post(handlers::create_transaction),
        )
        .route("/transactions/:id", get(handlers::get_transaction))
        .route("/transactions/:id/validate", post(handlers::validate_transaction))
        // Classification
        .route("/classify", post(handlers::classify))
        // Learned rules
        .route("/rules", get(handlers::list_rules))
        // Catalogs
        .route("/catalog/classifications", get(handlers::list_classifications))
        .route("/catalog/payment-methods", get(handlers::list_payment_methods))
        // Reporting
        .route("/summary", get(handlers::get_summary))
        .route("/audit", get(handlers::list_audit));

    let cors = build_cors(&config.allowed_origins);

    Router::new()
        .nest("/api", api_routes)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Run the server on an already-bound listener
pub async fn serve(listener: tokio::net::TcpListener, router: Router) -> std::io::Result<()> {
    axum::serve(listener, router).await
}

fn build_cors(allowed_origins: &[String]) -> CorsLayer {
    if allowed_origins.is_empty() {
        // Same-origin only
        return CorsLayer::new();
    }

    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(origin = %origin, "Ignoring unparseable CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([axum::http::header::CONTENT_TYPE])
}
