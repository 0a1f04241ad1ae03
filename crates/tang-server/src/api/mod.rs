//! API module for the Tang server

pub mod error;
pub mod handlers;

use axum::{
    http::{header, HeaderValue},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use std::sync::Arc;
use tower_http::normalize_path::NormalizePath;
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;

use handlers::AppState;

/// Service name reported by the health endpoint
pub const SERVICE_NAME: &str = "tang-edge";

/// Health check response
#[derive(Serialize)]
pub struct HealthResponse {
    pub service: String,
    pub status: String,
}

/// Health check endpoint
///
/// GET /
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        service: SERVICE_NAME.into(),
        status: "ok".into(),
    })
}

/// The HTTP service: the router behind trailing-slash normalization
pub type TangService = NormalizePath<Router>;

/// Create the API service
///
/// Trailing slashes are trimmed before routing, so `/adv/{thp}/` and
/// `/rec/{thp}/` reach the same handlers as their canonical forms.
pub fn create_router(state: Arc<AppState>) -> TangService {
    let router = Router::new()
        .route("/", get(health))
        // Advertisement
        .route("/adv", get(handlers::advertise))
        .route("/adv/{thp}", get(handlers::advertise_with_key))
        // Recovery
        .route("/rec/{thp}", post(handlers::recover))
        // Rotation
        .route("/rotate", post(handlers::rotate_keys))
        // Middleware
        .layer(SetResponseHeaderLayer::overriding(
            header::X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::CACHE_CONTROL,
            HeaderValue::from_static("no-store"),
        ))
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    NormalizePath::trim_trailing_slash(router)
}
