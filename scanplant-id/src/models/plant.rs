//! Plant draft and record types
//!
//! A draft is built incrementally by the pipeline stages and either discarded
//! (cancel) or sealed into a PlantRecord at save time. Sentinel strings stand
//! in for missing data so downstream logic stays uniform; they are the
//! user-facing placeholder texts of the capture UI (Portuguese).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Sentinel for a scientific name the recognizer could not supply.
///
/// A draft carrying this value (or no value) must never reach the
/// persistence gateway.
pub const SCIENTIFIC_NAME_UNAVAILABLE: &str = "Nome Científico Não Disponível";

/// Sentinel for a missing common name
pub const COMMON_NAME_UNAVAILABLE: &str = "Nome Comum Não Disponível";

/// Sentinel for a missing family
pub const FAMILY_UNAVAILABLE: &str = "Família Não Disponível";

/// Sentinel for a missing genus
pub const GENUS_UNAVAILABLE: &str = "Gênero Não Disponível";

/// Device geolocation fix, transient per session
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoFix {
    pub latitude: f64,
    pub longitude: f64,
}

/// Human-readable place descriptor produced by the location resolver
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedLocation {
    /// "<road>, <neighbourhood>, <city>"
    pub location_name: String,
    pub city: String,
}

/// In-memory, not-yet-persisted identification record
///
/// All fields optional until the corresponding pipeline stage populates them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlantDraft {
    pub scientific_name: Option<String>,
    pub common_name: Option<String>,
    pub family: Option<String>,
    pub genus: Option<String>,
    pub wiki_description: Option<String>,
    pub wiki_url: Option<String>,
    pub enhanced_description: Option<String>,
    pub care_instructions: Option<String>,
}

impl PlantDraft {
    /// True when the scientific name is populated and not the unavailable
    /// sentinel — the invariant every record must satisfy before persistence.
    pub fn has_valid_scientific_name(&self) -> bool {
        match self.scientific_name.as_deref() {
            Some(name) => !name.is_empty() && name != SCIENTIFIC_NAME_UNAVAILABLE,
            None => false,
        }
    }
}

/// Persisted plant record
///
/// Never mutated by the orchestrator after the gateway accepts it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlantRecord {
    pub id: Uuid,
    /// Base64 data URL of the captured image
    pub image_data: String,
    pub scientific_name: String,
    pub common_name: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub city: String,
    pub location_name: String,
    pub wiki_description: String,
    pub family: String,
    pub genus: String,
    pub care_instructions: String,
    pub enhanced_description: String,
    pub created_at: DateTime<Utc>,
    pub owner_id: Option<String>,
}

impl PlantRecord {
    /// Seal a draft into a record ready for the persistence gateway
    ///
    /// Missing optional draft fields persist as empty strings, matching the
    /// capture UI's record shape.
    pub fn seal(
        draft: &PlantDraft,
        image_data: String,
        geo_fix: Option<GeoFix>,
        location: ResolvedLocation,
        owner_id: Option<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            image_data,
            scientific_name: draft.scientific_name.clone().unwrap_or_default(),
            common_name: draft.common_name.clone().unwrap_or_default(),
            latitude: geo_fix.map(|g| g.latitude),
            longitude: geo_fix.map(|g| g.longitude),
            city: location.city,
            location_name: location.location_name,
            wiki_description: draft.wiki_description.clone().unwrap_or_default(),
            family: draft.family.clone().unwrap_or_default(),
            genus: draft.genus.clone().unwrap_or_default(),
            care_instructions: draft.care_instructions.clone().unwrap_or_default(),
            enhanced_description: draft.enhanced_description.clone().unwrap_or_default(),
            created_at: Utc::now(),
            owner_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_draft_is_not_identified() {
        let draft = PlantDraft::default();
        assert!(!draft.has_valid_scientific_name());
    }

    #[test]
    fn sentinel_scientific_name_is_not_identified() {
        let draft = PlantDraft {
            scientific_name: Some(SCIENTIFIC_NAME_UNAVAILABLE.to_string()),
            ..Default::default()
        };
        assert!(!draft.has_valid_scientific_name());
    }

    #[test]
    fn populated_scientific_name_is_identified() {
        let draft = PlantDraft {
            scientific_name: Some("Rosa gallica".to_string()),
            ..Default::default()
        };
        assert!(draft.has_valid_scientific_name());
    }

    #[test]
    fn seal_fills_missing_fields_with_empty_strings() {
        let draft = PlantDraft {
            scientific_name: Some("Aloe vera".to_string()),
            ..Default::default()
        };
        let record = PlantRecord::seal(
            &draft,
            "data:image/jpeg;base64,AAAA".to_string(),
            None,
            ResolvedLocation {
                location_name: "Rua A, Centro, Lisboa".to_string(),
                city: "Lisboa".to_string(),
            },
            None,
        );
        assert_eq!(record.scientific_name, "Aloe vera");
        assert_eq!(record.common_name, "");
        assert_eq!(record.family, "");
        assert!(record.latitude.is_none());
        assert_eq!(record.city, "Lisboa");
    }
}
