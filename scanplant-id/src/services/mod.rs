//! Pipeline stage components
//!
//! Each external lookup lives behind its own client; soft-failure stages
//! (description, enrichment, geocoding) resolve every failure to a
//! sentinel/fallback internally, while recognition surfaces hard errors.

pub mod enrichment;
pub mod geocoding;
pub mod moderation;
pub mod payload;
pub mod recognizer;
pub mod wikipedia;

pub use enrichment::{EnrichedInfo, EnrichmentResolver, KnowledgeBase, KnowledgeBaseEntry};
pub use geocoding::GeocodingClient;
pub use moderation::ModerationFilter;
pub use payload::{PayloadDecision, PayloadSizer};
pub use recognizer::{PlantIdClient, RecognitionError, SpeciesCandidate};
pub use wikipedia::WikipediaClient;
