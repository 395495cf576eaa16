//! Data models for the identification service

pub mod plant;
pub mod session;

pub use plant::{GeoFix, PlantDraft, PlantRecord, ResolvedLocation};
pub use session::{IdentSession, ImagePayload, SessionSnapshot, StateTransition};
