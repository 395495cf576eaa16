//! Identification session orchestration
//!
//! Owns the single in-flight session and drives it through the state
//! machine:
//!
//! Idle → Capturing → Recognizing → Enriching → Ready → Saving →
//! {Saved | Failed | Cancelled}
//!
//! Starting a new capture supersedes any in-flight pipeline; every stage
//! result is written through `update_session`, which discards results whose
//! generation token no longer matches the current session.

use chrono::Utc;
use sqlx::SqlitePool;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::RwLock;

use crate::db;
use crate::models::plant::{GeoFix, PlantDraft, PlantRecord, ResolvedLocation};
use crate::models::session::{IdentSession, ImagePayload, SessionSnapshot, StateTransition};
use crate::pipeline::{PipelineError, SaveOutcome, SaveRequest};
use crate::services::recognizer::DEFAULT_ORGAN;
use crate::services::{
    EnrichmentResolver, GeocodingClient, ModerationFilter, PayloadDecision, PayloadSizer,
    PlantIdClient, WikipediaClient,
};
use scanplant_common::events::{EventBus, IdentState, ScanPlantEvent};

/// Sequences recognition, enrichment, moderation, sizing, and persistence
/// into one state machine
pub struct IdentOrchestrator {
    db: SqlitePool,
    event_bus: EventBus,
    recognizer: PlantIdClient,
    wikipedia: WikipediaClient,
    enrichment: EnrichmentResolver,
    geocoding: GeocodingClient,
    moderation: ModerationFilter,
    sizer: PayloadSizer,
    /// The current session; None before the first capture
    session: RwLock<Option<IdentSession>>,
    /// Monotonically increasing generation counter
    generation: AtomicU64,
}

impl IdentOrchestrator {
    /// Create an orchestrator with default stage components
    pub fn new(db: SqlitePool, event_bus: EventBus, plant_id_api_key: Option<String>) -> Self {
        Self {
            db,
            event_bus,
            recognizer: PlantIdClient::new(plant_id_api_key),
            wikipedia: WikipediaClient::new(),
            enrichment: EnrichmentResolver::default(),
            geocoding: GeocodingClient::new(),
            moderation: ModerationFilter::default(),
            sizer: PayloadSizer::default(),
            session: RwLock::new(None),
            generation: AtomicU64::new(0),
        }
    }

    /// Replace the recognizer client (tests, alternate endpoints)
    pub fn with_recognizer(mut self, recognizer: PlantIdClient) -> Self {
        self.recognizer = recognizer;
        self
    }

    /// Replace the description fetcher
    pub fn with_wikipedia(mut self, wikipedia: WikipediaClient) -> Self {
        self.wikipedia = wikipedia;
        self
    }

    /// Replace the enrichment resolver
    pub fn with_enrichment(mut self, enrichment: EnrichmentResolver) -> Self {
        self.enrichment = enrichment;
        self
    }

    /// Replace the geocoding client
    pub fn with_geocoding(mut self, geocoding: GeocodingClient) -> Self {
        self.geocoding = geocoding;
        self
    }

    /// Replace the moderation filter (injected denylist)
    pub fn with_moderation(mut self, moderation: ModerationFilter) -> Self {
        self.moderation = moderation;
        self
    }

    /// Begin a new capture session, superseding any session in flight
    ///
    /// Returns the snapshot of the freshly installed session (already in
    /// Recognizing). The caller drives the pipeline by invoking
    /// `run_identification` with the snapshot's generation, typically from a
    /// spawned task.
    pub async fn begin_capture(
        &self,
        image: ImagePayload,
        geo_fix: Option<GeoFix>,
    ) -> SessionSnapshot {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let mut session = IdentSession::new(generation, image, geo_fix);

        tracing::info!(
            session_id = %session.session_id,
            generation = generation,
            "Starting identification session"
        );

        let _ = self.event_bus.emit(ScanPlantEvent::SessionStarted {
            session_id: session.session_id,
            generation,
            timestamp: session.started_at,
        });

        // Image accepted; the draft is reset and recognition may begin
        let transition = session.transition_to(IdentState::Recognizing);
        self.emit_state_changed(&transition);

        let snapshot = session.snapshot();

        let mut guard = self.session.write().await;
        match guard.as_ref() {
            // A concurrent capture with a newer token won the install race
            Some(current) if current.generation > generation => {
                tracing::debug!(
                    generation = generation,
                    current = current.generation,
                    "Capture superseded before installation"
                );
            }
            _ => {
                if let Some(prev) = guard.take() {
                    if !prev.is_terminal() {
                        tracing::info!(
                            superseded = %prev.session_id,
                            "New capture supersedes in-flight session"
                        );
                    }
                    prev.cancel.cancel();
                }
                *guard = Some(session);
            }
        }

        snapshot
    }

    /// Drive recognition and enrichment for the session with this generation
    ///
    /// Safe to call for a superseded generation: every write is discarded
    /// once the token no longer matches.
    pub async fn run_identification(&self, generation: u64) {
        let (image, cancel) = {
            let guard = self.session.read().await;
            match guard.as_ref() {
                Some(s) if s.generation == generation && s.state == IdentState::Recognizing => {
                    match &s.image {
                        Some(image) => (image.clone(), s.cancel.clone()),
                        None => return,
                    }
                }
                _ => {
                    tracing::debug!(generation, "Identification skipped; session superseded");
                    return;
                }
            }
        };

        let result = tokio::select! {
            _ = cancel.cancelled() => {
                tracing::debug!(generation, "Recognition cancelled");
                return;
            }
            result = self.recognizer.identify(&image, DEFAULT_ORGAN) => result,
        };

        let candidate = match result {
            Ok(candidate) => candidate,
            Err(e) => {
                tracing::warn!(generation, error = %e, "Recognition failed");
                let message = e.to_string();
                self.update_session(generation, |s| {
                    s.alert = Some(message.clone());
                    let transition = s.transition_to(IdentState::Failed);
                    self.emit_state_changed(&transition);
                    let _ = self.event_bus.emit(ScanPlantEvent::RecognitionFailed {
                        session_id: s.session_id,
                        message,
                        timestamp: Utc::now(),
                    });
                })
                .await;
                return;
            }
        };

        if self
            .update_session(generation, |s| {
                let transition = s.transition_to(IdentState::Enriching);
                self.emit_state_changed(&transition);
            })
            .await
            .is_none()
        {
            return;
        }

        // Description and enrichment are independent; join them concurrently
        let scientific_name = candidate.scientific_name.clone();
        let (description, enriched) = tokio::select! {
            _ = cancel.cancelled() => {
                tracing::debug!(generation, "Enrichment cancelled");
                return;
            }
            pair = async {
                tokio::join!(
                    self.wikipedia.fetch_extract(&scientific_name),
                    self.enrichment.resolve(&scientific_name),
                )
            } => pair,
        };

        let wiki_url = self.wikipedia.article_url(&scientific_name);
        self.update_session(generation, |s| {
            let draft = &mut s.draft;
            draft.scientific_name = Some(candidate.scientific_name);
            draft.family = Some(candidate.family);
            draft.genus = Some(candidate.genus);
            // Curated common name wins over the recognizer's
            draft.common_name = Some(if enriched.common_name.is_empty() {
                candidate.common_name
            } else {
                enriched.common_name
            });
            draft.wiki_description = Some(description);
            draft.wiki_url = Some(wiki_url);
            draft.enhanced_description = Some(enriched.enhanced_description);
            draft.care_instructions = Some(enriched.care_instructions);

            let transition = s.transition_to(IdentState::Ready);
            self.emit_state_changed(&transition);
            let _ = self.event_bus.emit(ScanPlantEvent::IdentificationReady {
                session_id: s.session_id,
                scientific_name: scientific_name.clone(),
                timestamp: Utc::now(),
            });
        })
        .await;
    }

    /// Run the save gate for the current session
    ///
    /// Guards in order: scientific name populated and non-sentinel, common
    /// name passes moderation, image present. Then location and payload
    /// policy, then the gateway insert.
    pub async fn save(&self, request: SaveRequest) -> Result<SaveOutcome, PipelineError> {
        let (generation, draft, image, geo_fix) = {
            let mut guard = self.session.write().await;
            let session = guard.as_mut().ok_or(PipelineError::NoSession)?;
            if session.state != IdentState::Ready {
                return Err(PipelineError::InvalidState(session.state));
            }

            if let Some(name) = &request.common_name {
                session.draft.common_name = Some(name.clone());
            }

            if !session.draft.has_valid_scientific_name() {
                return Err(PipelineError::Validation(
                    "Nome científico não disponível. Por favor, tire uma nova foto.".to_string(),
                ));
            }

            let common_name = session.draft.common_name.clone().unwrap_or_default();
            if let Some(word) = self.moderation.find_violation(&common_name) {
                tracing::info!(word = word, "Common name rejected by moderation filter");
                return Err(PipelineError::Moderation(
                    "O Nome Comum contém palavras impróprias. Por favor, insira um nome válido."
                        .to_string(),
                ));
            }

            let image = session.image.clone().ok_or_else(|| {
                PipelineError::Validation("Nenhuma imagem disponível para salvar.".to_string())
            })?;

            let transition = session.transition_to(IdentState::Saving);
            self.emit_state_changed(&transition);

            (
                session.generation,
                session.draft.clone(),
                image,
                session.geo_fix,
            )
        };

        // Size policy applies to the encoded form the gateway stores
        let data_url = image.to_data_url();
        match self.sizer.assess(data_url.len()) {
            PayloadDecision::ConfirmationRequired { encoded_kb } if !request.force => {
                self.update_session(generation, |s| {
                    let transition = s.transition_to(IdentState::Ready);
                    self.emit_state_changed(&transition);
                })
                .await;
                return Ok(SaveOutcome::ConfirmationRequired { encoded_kb });
            }
            PayloadDecision::ConfirmationRequired { encoded_kb } => {
                tracing::warn!(
                    encoded_kb = encoded_kb,
                    "Oversized payload confirmed; persisting unmodified"
                );
            }
            PayloadDecision::ProceedWithWarning { encoded_kb } => {
                tracing::warn!(encoded_kb = encoded_kb, "Large image payload");
            }
            PayloadDecision::Proceed => {}
        }

        // The geo fix was acquired at capture; it is joined only now
        let location = match geo_fix {
            Some(fix) => self.geocoding.resolve(fix).await,
            None => ResolvedLocation::unavailable(),
        };

        let record = PlantRecord::seal(&draft, data_url, geo_fix, location, request.owner_id);
        let plant_id = record.id;

        match db::plants::insert_plant(&self.db, &record).await {
            Ok(()) => {
                tracing::info!(plant_id = %plant_id, "Plant record persisted");
                self.update_session(generation, |s| {
                    let transition = s.transition_to(IdentState::Saved);
                    self.emit_state_changed(&transition);
                    let _ = self.event_bus.emit(ScanPlantEvent::PlantSaved {
                        session_id: s.session_id,
                        plant_id,
                        timestamp: Utc::now(),
                    });
                })
                .await;
                Ok(SaveOutcome::Saved { plant_id })
            }
            Err(e) => {
                tracing::error!(error = %e, "Persistence failed; discarding draft");
                let message = format!("Erro ao salvar a imagem: {}", e);
                self.update_session(generation, |s| {
                    s.alert = Some(message.clone());
                    s.draft = PlantDraft::default();
                    s.image = None;
                    let transition = s.transition_to(IdentState::Failed);
                    self.emit_state_changed(&transition);
                    let _ = self.event_bus.emit(ScanPlantEvent::SaveFailed {
                        session_id: s.session_id,
                        message,
                        timestamp: Utc::now(),
                    });
                })
                .await;
                Err(PipelineError::Persistence(e))
            }
        }
    }

    /// Cancel the current session: clear draft and image, abort in-flight
    /// work
    pub async fn cancel(&self) -> Result<SessionSnapshot, PipelineError> {
        let mut guard = self.session.write().await;
        let session = guard.as_mut().ok_or(PipelineError::NoSession)?;

        if !session.is_terminal() {
            session.cancel.cancel();
            session.draft = PlantDraft::default();
            session.image = None;
            session.geo_fix = None;
            let transition = session.transition_to(IdentState::Cancelled);
            self.emit_state_changed(&transition);
            let _ = self.event_bus.emit(ScanPlantEvent::SessionCancelled {
                session_id: session.session_id,
                timestamp: Utc::now(),
            });
            tracing::info!(session_id = %session.session_id, "Session cancelled");
        }

        Ok(session.snapshot())
    }

    /// Observable snapshot of the current session
    pub async fn snapshot(&self) -> Option<SessionSnapshot> {
        self.session.read().await.as_ref().map(|s| s.snapshot())
    }

    /// Apply a mutation to the current session iff the generation token
    /// still matches and the session is not terminal; stale results are
    /// discarded, never merged
    async fn update_session<R>(
        &self,
        generation: u64,
        f: impl FnOnce(&mut IdentSession) -> R,
    ) -> Option<R> {
        let mut guard = self.session.write().await;
        match guard.as_mut() {
            Some(session) if session.generation == generation && !session.is_terminal() => {
                Some(f(session))
            }
            _ => {
                tracing::debug!(
                    generation = generation,
                    "Discarding stage result for superseded session"
                );
                None
            }
        }
    }

    fn emit_state_changed(&self, transition: &StateTransition) {
        let _ = self.event_bus.emit(ScanPlantEvent::StateChanged {
            session_id: transition.session_id,
            old_state: transition.old_state,
            new_state: transition.new_state,
            timestamp: transition.transitioned_at,
        });
    }
}
