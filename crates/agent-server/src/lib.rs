//! # agent-server
//!
//! axum front end for local-advisor: HTML pages plus JSON endpoints for the
//! recipe, demo and route pipelines.

pub mod config;
pub mod handlers;
pub mod render;
pub mod state;

use axum::{
    Router,
    routing::{get, post},
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

pub use config::{ConfigError, ServerConfig, log_filter};
pub use state::AppState;

use crate::handlers::{
    demo_generate, demo_page, generate, health_check, index_page, route_generate, route_page,
};

/// Build the application router
pub fn router(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Health
        .route("/health", get(health_check))
        // Recipe with images
        .route("/", get(index_page))
        .route("/generate", post(generate))
        // Recipe only
        .route("/demo", get(demo_page))
        .route("/demo/generate", post(demo_generate))
        // Travel routes
        .route("/route", get(route_page))
        .route("/route/generate", post(route_generate))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
