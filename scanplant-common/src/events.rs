//! Event types for the ScanPlant event system
//!
//! Provides shared event definitions and the EventBus used by the
//! identification service and any future ScanPlant modules.

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use uuid::Uuid;

/// Identification session state
///
/// Shared between the orchestrator (which drives transitions) and the event
/// stream (which reports them to observers).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum IdentState {
    /// No session in progress
    Idle,
    /// Image received, session being set up
    Capturing,
    /// Species recognition call in flight
    Recognizing,
    /// Description and enrichment lookups in flight (concurrent)
    Enriching,
    /// Draft fully merged, awaiting user save or cancel
    Ready,
    /// Save gate running (geocoding, payload policy, persistence)
    Saving,
    /// Record accepted by the persistence gateway
    Saved,
    /// Pipeline aborted (recognition or persistence failure)
    Failed,
    /// Session cancelled by the user
    Cancelled,
}

impl IdentState {
    /// True for states that end a session
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Saved | Self::Failed | Self::Cancelled)
    }
}

/// ScanPlant event types
///
/// Events are broadcast via EventBus and serialized for SSE transmission.
/// The presentation layer observes the pipeline exclusively through these
/// events plus session snapshots; it never drives state itself.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ScanPlantEvent {
    /// A new identification session began (capture accepted)
    ///
    /// Triggers:
    /// - SSE: Show loading UI for the new capture
    SessionStarted {
        /// Session UUID
        session_id: Uuid,
        /// Generation token of this session
        generation: u64,
        /// When the session started
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// Session state changed
    ///
    /// Triggers:
    /// - SSE: Update progress/loading indicators
    StateChanged {
        /// Session UUID
        session_id: Uuid,
        /// State before change
        old_state: IdentState,
        /// State after change
        new_state: IdentState,
        /// When state changed
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// Recognition returned no usable candidate
    ///
    /// The image is retained so the user can retry; the draft stays at
    /// sentinel values.
    ///
    /// Triggers:
    /// - SSE: Show alert, keep captured image on screen
    RecognitionFailed {
        /// Session UUID
        session_id: Uuid,
        /// User-facing alert message
        message: String,
        /// When recognition failed
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// Description and enrichment merged; draft is ready for review
    ///
    /// Triggers:
    /// - SSE: Render identified plant details
    IdentificationReady {
        /// Session UUID
        session_id: Uuid,
        /// Best-guess scientific name
        scientific_name: String,
        /// When the draft became ready
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// Record accepted by the persistence gateway
    ///
    /// Triggers:
    /// - SSE: Show success, navigate away from capture
    PlantSaved {
        /// Session UUID
        session_id: Uuid,
        /// Persisted plant record UUID
        plant_id: Uuid,
        /// When the insert completed
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// Persistence failed; the draft was discarded
    ///
    /// Triggers:
    /// - SSE: Show alert, force navigation away (no retry-in-place)
    SaveFailed {
        /// Session UUID
        session_id: Uuid,
        /// User-facing alert message
        message: String,
        /// When the save failed
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// Session cancelled by the user; draft and image cleared
    SessionCancelled {
        /// Session UUID
        session_id: Uuid,
        /// When the session was cancelled
        timestamp: chrono::DateTime<chrono::Utc>,
    },
}

// ========================================
// EventBus Implementation
// ========================================

/// Central event distribution bus for application-wide events
///
/// The EventBus uses tokio::broadcast internally, providing:
/// - Non-blocking publish (slow subscribers don't block producers)
/// - Multiple concurrent subscribers
/// - Automatic cleanup when subscribers drop
/// - Lagged message detection for slow subscribers
///
/// # Examples
///
/// ```
/// use scanplant_common::events::{EventBus, ScanPlantEvent};
/// use std::sync::Arc;
///
/// let event_bus = Arc::new(EventBus::new(100));
///
/// // Subscribe to events
/// let mut rx = event_bus.subscribe();
///
/// // Emit an event
/// event_bus.emit(ScanPlantEvent::SessionStarted {
///     session_id: uuid::Uuid::new_v4(),
///     generation: 1,
///     timestamp: chrono::Utc::now(),
/// }).ok();
/// ```
#[derive(Clone)]
pub struct EventBus {
    tx: broadcast::Sender<ScanPlantEvent>,
    capacity: usize,
}

impl EventBus {
    /// Creates a new EventBus with specified channel capacity
    ///
    /// # Arguments
    ///
    /// * `capacity` - Number of events to buffer before dropping old events
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx, capacity }
    }

    /// Subscribe to all future events
    ///
    /// Returns a receiver that will receive all events emitted after
    /// subscription. Events emitted before subscription are not received.
    pub fn subscribe(&self) -> broadcast::Receiver<ScanPlantEvent> {
        self.tx.subscribe()
    }

    /// Emit an event to all subscribers
    ///
    /// Returns `Ok(subscriber_count)` if at least one subscriber exists.
    /// An `Err` simply means no subscriber is currently listening; emitting
    /// into an empty bus is not a failure for the pipeline.
    pub fn emit(
        &self,
        event: ScanPlantEvent,
    ) -> std::result::Result<usize, broadcast::error::SendError<ScanPlantEvent>> {
        self.tx.send(event)
    }

    /// Configured channel capacity
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn terminal_states() {
        assert!(IdentState::Saved.is_terminal());
        assert!(IdentState::Failed.is_terminal());
        assert!(IdentState::Cancelled.is_terminal());
        assert!(!IdentState::Ready.is_terminal());
        assert!(!IdentState::Idle.is_terminal());
    }

    #[tokio::test]
    async fn emit_reaches_subscriber() {
        let bus = EventBus::new(10);
        let mut rx = bus.subscribe();

        let session_id = Uuid::new_v4();
        bus.emit(ScanPlantEvent::SessionCancelled {
            session_id,
            timestamp: chrono::Utc::now(),
        })
        .unwrap();

        match rx.recv().await.unwrap() {
            ScanPlantEvent::SessionCancelled { session_id: id, .. } => {
                assert_eq!(id, session_id);
            }
            other => panic!("unexpected event: {:?}", other),
        }
    }

    #[test]
    fn event_serializes_with_type_tag() {
        let event = ScanPlantEvent::RecognitionFailed {
            session_id: Uuid::new_v4(),
            message: "no suggestions".to_string(),
            timestamp: chrono::Utc::now(),
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "RecognitionFailed");
    }
}
