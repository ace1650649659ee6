//! Cross-origin policy: allow-list enforcement and CORS response headers.
//!
//! Enforcement and headers are separate layers. The middleware rejects
//! requests whose `Origin` is not allow-listed with 403; the tower-http
//! `CorsLayer` handles preflight requests and response headers for the
//! origins that pass.

use axum::{
    extract::{Request, State},
    http::{HeaderValue, header},
    middleware::Next,
    response::Response,
};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};

use crate::config::ServerConfig;
use crate::error::ServerError;
use crate::state::AppState;

/// Reject requests whose `Origin` header is not in the allow-list.
pub async fn origin_middleware(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, ServerError> {
    let origin = request
        .headers()
        .get(header::ORIGIN)
        .and_then(|value| value.to_str().ok());

    if !state.config.origin_allowed(origin) {
        return Err(ServerError::CorsRejected(
            origin.unwrap_or("<none>").to_string(),
        ));
    }

    Ok(next.run(request).await)
}

/// Build the CORS header layer from the configured allow-list.
pub fn cors_layer(config: &ServerConfig) -> CorsLayer {
    if config.allowed_origins.iter().any(|o| o == "*") {
        return CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);
    }

    let origins: Vec<HeaderValue> = config
        .allowed_origins
        .iter()
        .filter_map(|o| o.parse::<HeaderValue>().ok())
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods(Any)
        .allow_headers(Any)
}
