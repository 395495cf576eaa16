//! Identification pipeline
//!
//! The orchestrator is the only component the HTTP layer talks to. Soft
//! failures (description, enrichment, location) never appear here: those
//! stages resolve to sentinels internally. Only recognition and persistence
//! may terminate a session.

pub mod orchestrator;

pub use orchestrator::IdentOrchestrator;

use scanplant_common::events::IdentState;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Errors surfaced to the caller of save/cancel
#[derive(Debug, Error)]
pub enum PipelineError {
    /// No identification session in progress
    #[error("No identification session in progress")]
    NoSession,

    /// Operation requires a Ready session
    #[error("Session is in state {0:?}; operation requires Ready")]
    InvalidState(IdentState),

    /// Save-gate validation failure; the session stays in Ready
    #[error("{0}")]
    Validation(String),

    /// Common name rejected by the moderation filter; session stays in Ready
    #[error("{0}")]
    Moderation(String),

    /// Gateway insert failed; the session moved to Failed and the draft was
    /// discarded
    #[error("Persistence failed: {0}")]
    Persistence(#[from] scanplant_common::Error),
}

/// Save request from the user
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SaveRequest {
    /// User-entered common name override (moderated)
    pub common_name: Option<String>,
    /// Owner reference recorded on the persisted row
    pub owner_id: Option<String>,
    /// Confirms an oversized payload ("continue anyway")
    #[serde(default)]
    pub force: bool,
}

/// Save result
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum SaveOutcome {
    /// Record accepted by the gateway
    Saved { plant_id: Uuid },
    /// Encoded payload exceeds the confirm threshold; retry with force=true
    /// to persist it unmodified, or cancel
    ConfirmationRequired { encoded_kb: usize },
}
