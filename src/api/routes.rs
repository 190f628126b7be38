use crate::api::handlers;
use crate::context::AppContext;
use crate::websocket::websocket_handler;
use axum::{routing::get, Router};
use std::sync::Arc;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};

/// Build the main API router
pub fn build_router(ctx: Arc<AppContext>) -> Router {
    Router::new()
        // Health endpoints
        .route("/health", get(handlers::health_check))
        .route("/health/live", get(handlers::health_check))
        // Archive
        .route("/v1/messages", get(handlers::search_messages))
        .route("/v1/channels", get(handlers::list_channels))
        .route("/v1/users", get(handlers::list_users))
        .route("/v1/team", get(handlers::list_teams))
        // Bot ingestion
        .route("/ws", get(websocket_handler))
        .with_state(ctx)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().include_headers(true))
                .on_response(DefaultOnResponse::new().include_headers(true)),
        )
        .layer(CorsLayer::permissive())
}
