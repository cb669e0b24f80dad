//! Route table and middleware

use axum::{
    extract::DefaultBodyLimit,
    http::{header, HeaderValue, Method},
    middleware,
    routing::{get, post},
    Router,
};
use snaptogether_core::Config;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::error::{render_error_details, ErrorDetailPolicy};
use crate::handlers::{generate, health};
use crate::state::AppState;

pub fn setup_routes(config: &Config, state: Arc<AppState>) -> Result<Router<()>, anyhow::Error> {
    let cors = setup_cors(config)?;
    let detail_policy = ErrorDetailPolicy::for_environment(config.is_production());

    let router = Router::new()
        .route(
            "/api/generate",
            post(generate::generate).fallback(generate::method_not_allowed),
        )
        .route("/health", get(health::liveness_check))
        .with_state(state)
        .layer(middleware::map_response_with_state(
            detail_policy,
            render_error_details,
        ))
        .layer(DefaultBodyLimit::max(config.max_request_body_bytes()))
        .layer(cors)
        .layer(TraceLayer::new_for_http());

    Ok(router)
}

/// Setup CORS configuration. Preflight requests are answered here and never
/// reach a handler.
fn setup_cors(config: &Config) -> Result<CorsLayer, anyhow::Error> {
    let cors = CorsLayer::new()
        .allow_methods([Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE]);

    if config.cors_origins().iter().any(|o| o == "*") {
        tracing::warn!("CORS configured to allow all origins - not recommended for production");
        return Ok(cors.allow_origin(Any));
    }

    let origins = config
        .cors_origins()
        .iter()
        .map(|o| {
            o.parse::<HeaderValue>()
                .map_err(|_| anyhow::anyhow!("Invalid CORS origin '{}'", o))
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(cors.allow_origin(origins))
}
