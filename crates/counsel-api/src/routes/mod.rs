//! Route definitions
//!
//! Consultation and message routes are mounted under /api/v1; health
//! routes sit at the root, outside the rate limiter.

use axum::{
    routing::{get, post, put},
    Router,
};

use crate::handlers::{consultations, health, messages};
use crate::state::AppState;

/// Main API router (health routes are added separately)
pub fn create_router() -> Router<AppState> {
    Router::new().nest("/api/v1", api_v1_routes())
}

/// Health check routes
pub fn health_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health::health_check))
        .route("/health/ready", get(health::readiness_check))
}

fn api_v1_routes() -> Router<AppState> {
    Router::new()
        .merge(consultation_routes())
        .merge(message_routes())
}

fn consultation_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/consultations",
            get(consultations::list_consultations).post(consultations::request_consultation),
        )
        // Static segments take priority over `:id`
        .route("/consultations/available", get(consultations::list_available))
        .route("/consultations/stats", get(consultations::stats))
        .route(
            "/consultations/:id",
            get(consultations::get_consultation).patch(consultations::respond),
        )
        .route("/consultations/:id/claim", post(consultations::claim))
        .route("/consultations/:id/accept", post(consultations::accept))
        .route("/consultations/:id/decline", post(consultations::decline))
        .route("/consultations/:id/complete", post(consultations::complete))
        .route("/consultations/:id/cancel", post(consultations::cancel))
        .route("/consultations/:id/assign", put(consultations::assign))
}

fn message_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/consultations/:id/messages",
            get(messages::list_messages).post(messages::send_message),
        )
        .route("/consultations/:id/messages/read", put(messages::mark_read))
}
