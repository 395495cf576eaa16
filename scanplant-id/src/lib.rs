//! scanplant-id library interface
//!
//! Exposes public APIs for integration testing

pub mod api;
pub mod db;
pub mod error;
pub mod models;
pub mod pipeline;
pub mod services;

pub use crate::error::{ApiError, ApiResult};

use axum::Router;
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::pipeline::IdentOrchestrator;
use crate::services::ModerationFilter;
use scanplant_common::events::EventBus;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: SqlitePool,
    /// Event bus for SSE broadcasting
    pub event_bus: EventBus,
    /// The identification pipeline orchestrator
    pub orchestrator: Arc<IdentOrchestrator>,
    /// Moderation filter, shared with the record-update surface
    pub moderation: ModerationFilter,
    /// Service startup timestamp for uptime tracking
    pub startup_time: DateTime<Utc>,
}

impl AppState {
    pub fn new(
        db: SqlitePool,
        event_bus: EventBus,
        orchestrator: Arc<IdentOrchestrator>,
        moderation: ModerationFilter,
    ) -> Self {
        Self {
            db,
            event_bus,
            orchestrator,
            moderation,
            startup_time: Utc::now(),
        }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    use axum::routing::get;

    Router::new()
        .merge(api::identify_routes())
        .merge(api::plant_routes())
        .route("/events", get(api::event_stream))
        .merge(api::health_routes())
        // Oversized captures are a policy decision, not a transport error
        .layer(axum::extract::DefaultBodyLimit::max(10 * 1024 * 1024))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
