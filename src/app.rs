use axum::http::{header::CONTENT_TYPE, HeaderValue, Method};
use axum::Router;
use tower_http::cors::CorsLayer;

use crate::routes::{analyze, health};
use crate::state::AppState;

pub fn create_app(state: AppState, allowed_origin: &str) -> Router {
    // Frontend origin only; credentials rule out a wildcard here.
    let origin = allowed_origin
        .parse::<HeaderValue>()
        .unwrap_or_else(|_| HeaderValue::from_static("http://localhost:3000"));

    let cors = CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([CONTENT_TYPE])
        .allow_credentials(true);

    Router::<AppState>::new()
        .nest("/health", health::router())
        .nest("/analyze", analyze::router())
        .layer(cors)
        .with_state(state)
}
