//! Identification session state machine
//!
//! One session per capture. Starting a new capture supersedes any session
//! still in flight; the generation token lets stage results from a
//! superseded session be detected and discarded instead of silently merged.

use base64::Engine;
use chrono::{DateTime, Utc};
use scanplant_common::events::IdentState;
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::models::plant::{GeoFix, PlantDraft};

/// Captured image bytes with their sniffed content type
#[derive(Debug, Clone)]
pub struct ImagePayload {
    pub bytes: Vec<u8>,
    pub content_type: String,
}

impl ImagePayload {
    /// Encode as a base64 data URL, the form the record stores
    pub fn to_data_url(&self) -> String {
        let encoded = base64::engine::general_purpose::STANDARD.encode(&self.bytes);
        format!("data:{};base64,{}", self.content_type, encoded)
    }
}

/// State transition record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StateTransition {
    pub session_id: Uuid,
    pub old_state: IdentState,
    pub new_state: IdentState,
    pub transitioned_at: DateTime<Utc>,
}

/// Identification session (in-memory state)
///
/// Owned by the orchestrator; the HTTP layer only sees snapshots.
#[derive(Debug, Clone)]
pub struct IdentSession {
    /// Unique session identifier
    pub session_id: Uuid,

    /// Monotonically increasing token; stage results carrying an older
    /// generation are discarded
    pub generation: u64,

    /// Current state
    pub state: IdentState,

    /// Draft being built by the pipeline stages
    pub draft: PlantDraft,

    /// Captured image, retained across recognition failure for retry
    pub image: Option<ImagePayload>,

    /// Device geolocation fix, joined at save time
    pub geo_fix: Option<GeoFix>,

    /// Last user-facing alert message (recognition/save failures)
    pub alert: Option<String>,

    /// Session start time
    pub started_at: DateTime<Utc>,

    /// Session end time (if saved/failed/cancelled)
    pub ended_at: Option<DateTime<Utc>>,

    /// Cancels in-flight pipeline work when the session is cancelled or
    /// superseded
    pub cancel: CancellationToken,
}

impl IdentSession {
    /// Create a new session for a freshly captured image
    pub fn new(generation: u64, image: ImagePayload, geo_fix: Option<GeoFix>) -> Self {
        Self {
            session_id: Uuid::new_v4(),
            generation,
            state: IdentState::Capturing,
            draft: PlantDraft::default(),
            image: Some(image),
            geo_fix,
            alert: None,
            started_at: Utc::now(),
            ended_at: None,
            cancel: CancellationToken::new(),
        }
    }

    /// Transition to a new state
    pub fn transition_to(&mut self, new_state: IdentState) -> StateTransition {
        let transition = StateTransition {
            session_id: self.session_id,
            old_state: self.state,
            new_state,
            transitioned_at: Utc::now(),
        };
        self.state = new_state;

        if new_state.is_terminal() {
            self.ended_at = Some(Utc::now());
        }

        transition
    }

    /// Check if session is terminal (finished)
    pub fn is_terminal(&self) -> bool {
        self.state.is_terminal()
    }

    /// Observable snapshot for the HTTP layer
    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            session_id: self.session_id,
            generation: self.generation,
            state: self.state,
            draft: self.draft.clone(),
            has_image: self.image.is_some(),
            geo_fix: self.geo_fix,
            alert: self.alert.clone(),
            started_at: self.started_at,
            ended_at: self.ended_at,
        }
    }
}

/// Serializable view of a session, without the image bytes
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub session_id: Uuid,
    pub generation: u64,
    pub state: IdentState,
    pub draft: PlantDraft,
    pub has_image: bool,
    pub geo_fix: Option<GeoFix>,
    pub alert: Option<String>,
    pub started_at: DateTime<Utc>,
    pub ended_at: Option<DateTime<Utc>>,
}
