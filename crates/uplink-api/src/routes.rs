//! Route configuration and setup

use crate::api_doc::ApiDoc;
use crate::auth::auth_middleware;
use crate::handlers;
use crate::health;
use crate::state::AppState;
use axum::{
    http::{HeaderValue, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;
use uplink_core::Config;
use utoipa::OpenApi;
use utoipa_rapidoc::RapiDoc;

const MAX_BODY_BYTES: usize = 64 * 1024;

/// Setup all application routes
pub fn setup_routes(config: &Config, state: Arc<AppState>) -> Result<Router, anyhow::Error> {
    let cors = setup_cors(config)?;

    // Public routes (no authentication required)
    let public_routes = Router::new()
        .route("/health", get(health::liveness_check))
        .route("/health/ready", get(health::readiness_check))
        .route(
            "/api/openapi.json",
            get(|| async { Json(ApiDoc::openapi()) }),
        )
        .nest(
            "/docs",
            RapiDoc::new("/api/openapi.json").path("/docs").into(),
        );

    // Protected routes (require the API key when one is configured)
    let protected_routes = Router::new()
        .route("/api/v0/uploads", post(handlers::uploads::initiate_upload))
        .route(
            "/api/v0/uploads/confirm",
            post(handlers::uploads::confirm_upload),
        )
        .route("/api/v0/uploads/sweep", post(handlers::sweep::trigger_sweep))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    let app = public_routes
        .merge(protected_routes)
        .fallback(not_found_handler)
        .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state);

    Ok(app)
}

fn setup_cors(config: &Config) -> Result<CorsLayer, anyhow::Error> {
    let origins = config.cors_origins();
    if origins.iter().any(|o| o == "*") {
        return Ok(CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any));
    }

    let parsed = origins
        .iter()
        .map(|o| o.parse())
        .collect::<Result<Vec<HeaderValue>, _>>()?;
    Ok(CorsLayer::new()
        .allow_origin(AllowOrigin::list(parsed))
        .allow_methods(Any)
        .allow_headers(Any))
}

async fn not_found_handler() -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(serde_json::json!({ "error": "Not found", "code": "NOT_FOUND" })),
    )
}
