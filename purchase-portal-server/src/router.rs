//! Router construction for the portal server.

use axum::{
    routing::{get, post},
    Router,
};
use http::Method;
use tower_http::{
    cors::{AllowHeaders, AllowOrigin, CorsLayer},
    trace::TraceLayer,
};

use crate::handlers;
use crate::state::AppState;

/// Build the full axum router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route(
            "/api/send-email",
            post(handlers::send_email::send_email)
                .fallback(handlers::send_email::method_not_allowed),
        )
        .route("/api/document", post(handlers::document::document))
        .route("/api/template", get(handlers::template::template))
        .route("/api/health", get(handlers::health::health))
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer())
        .with_state(state)
}

/// Any origin, with credentials.
///
/// Credentials rule out a wildcard origin, so the request origin is echoed.
/// Every OPTIONS request is answered here with 200 and an empty body.
fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(AllowOrigin::mirror_request())
        .allow_credentials(true)
        .allow_methods([
            Method::GET,
            Method::OPTIONS,
            Method::PATCH,
            Method::DELETE,
            Method::POST,
            Method::PUT,
        ])
        .allow_headers(AllowHeaders::mirror_request())
}
