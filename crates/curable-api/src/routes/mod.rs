pub mod chat;
pub mod cleanup;
pub mod diagnose;
pub mod health;
pub mod insights;
pub mod profile;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::{
    compression::{
        predicate::{NotForContentType, Predicate},
        CompressionLayer, DefaultPredicate,
    },
    cors::{Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::{config::Config, docs::ApiDoc, handlers::stream, middleware::logging, state::AppState};

pub fn build_router(state: Arc<AppState>) -> Router {
    let api_routes = Router::new()
        // Health
        .route("/", get(health::root))
        .route("/health", get(health::health_check))
        // Chat
        .route("/chat", post(chat::chat))
        .route("/chat-stream", post(stream::chat_stream))
        .route("/cleanup/:user_id", post(cleanup::cleanup))
        // Records
        .route("/profile/:username", get(profile::get_profile))
        .route("/user/:user_id/insights", get(insights::get_insights))
        .route("/diagnose", post(diagnose::diagnose));

    // Covers the longest assistant run plus the seeding calls before it
    let request_timeout = std::time::Duration::from_secs(state.config.assistant.run_timeout_secs + 60);

    Router::new()
        .merge(api_routes)
        .merge(SwaggerUi::new("/api/docs").url("/api/openapi.json", ApiDoc::openapi()))
        .layer(middleware::from_fn(logging::log_request))
        .layer(TimeoutLayer::new(request_timeout))
        .layer(CompressionLayer::new().compress_when(compression_predicate()))
        .layer(build_cors_layer(&state.config))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Plain-text replies are streamed chunk by chunk; gzip would hold them back
fn compression_predicate() -> impl Predicate {
    DefaultPredicate::new().and(NotForContentType::const_new("text/plain"))
}

fn build_cors_layer(config: &Config) -> CorsLayer {
    if config.cors.enabled {
        let cors = CorsLayer::new()
            .allow_methods([
                axum::http::Method::GET,
                axum::http::Method::POST,
                axum::http::Method::OPTIONS,
            ])
            .allow_headers(Any);

        if config.cors.origins.iter().any(|o| o == "*") {
            cors.allow_origin(Any)
        } else {
            let parsed_origins: Vec<axum::http::HeaderValue> = config
                .cors
                .origins
                .iter()
                .filter_map(|o| o.parse::<axum::http::HeaderValue>().ok())
                .collect();

            cors.allow_origin(parsed_origins)
        }
    } else {
        CorsLayer::permissive()
    }
}
