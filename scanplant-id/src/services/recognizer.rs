//! Plant.id species recognition client
//!
//! Uploads the captured image and maps the ranked suggestion list to a single
//! best-guess taxonomic candidate. Recognition is the one lookup allowed to
//! fail hard: an API error or an empty suggestion list aborts the pipeline.

use governor::{Quota, RateLimiter};
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use serde::Deserialize;
use std::num::NonZeroU32;
use std::time::Duration;
use thiserror::Error;

use crate::models::plant::{
    COMMON_NAME_UNAVAILABLE, FAMILY_UNAVAILABLE, GENUS_UNAVAILABLE, SCIENTIFIC_NAME_UNAVAILABLE,
};
use crate::models::ImagePayload;

/// Default organ hint sent with every identification request
pub const DEFAULT_ORGAN: &str = "leaf";

/// Recognition failure — the only soft-less stage of the pipeline
#[derive(Debug, Error)]
pub enum RecognitionError {
    /// Transport failure, non-success status, or unparseable body
    #[error("Plant.id request failed: {0}")]
    RequestFailed(String),

    /// The service answered but ranked no candidate at all
    #[error("Nenhuma sugestão de planta encontrada. Verifique a imagem e tente novamente.")]
    NoSuggestions,

    /// No API key configured; identification cannot run
    #[error("Plant.id API key is not configured")]
    MissingApiKey,
}

/// Plant.id identify response
#[derive(Debug, Deserialize)]
struct IdentifyResponse {
    #[serde(default)]
    suggestions: Vec<Suggestion>,
}

#[derive(Debug, Deserialize)]
struct Suggestion {
    plant_details: PlantDetails,
}

#[derive(Debug, Deserialize)]
struct PlantDetails {
    scientific_name: Option<String>,
    #[serde(default)]
    common_names: Vec<String>,
    family: Option<String>,
    genus: Option<String>,
}

/// Best-guess taxonomic candidate from the top-ranked suggestion
///
/// Missing fields are already replaced by their sentinels, so downstream
/// merge logic stays uniform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpeciesCandidate {
    pub scientific_name: String,
    pub common_name: String,
    pub family: String,
    pub genus: String,
}

/// Plant.id API client
///
/// Carries explicit timeouts and a rate limiter: identification keys are
/// request-metered, so a runaway caller must not burn the quota.
pub struct PlantIdClient {
    client: Client,
    base_url: String,
    api_key: Option<String>,
    rate_limiter: RateLimiter<
        governor::state::direct::NotKeyed,
        governor::state::InMemoryState,
        governor::clock::DefaultClock,
    >,
}

impl PlantIdClient {
    /// Create a new client
    ///
    /// # Arguments
    /// * `api_key` - Plant.id API key; `None` makes every identify call fail
    ///   with `MissingApiKey` so the service can still start without one
    ///
    /// # Panics
    /// Panics if the HTTP client cannot be built (should not happen with
    /// valid config)
    pub fn new(api_key: Option<String>) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .connect_timeout(Duration::from_secs(5))
            .build()
            .expect("Failed to build HTTP client");

        let rate_limiter =
            RateLimiter::direct(Quota::per_second(NonZeroU32::new(1).expect("1 is non-zero")));

        Self {
            client,
            base_url: "https://api.plant.id/v2/identify".to_string(),
            api_key,
            rate_limiter,
        }
    }

    /// Override the endpoint (tests point this at a local server)
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Identify the species on an image
    ///
    /// # Arguments
    /// * `image` - captured image bytes with content type
    /// * `organ` - organ hint (e.g. "leaf", "flower")
    ///
    /// # Errors
    /// `RecognitionError` when the key is missing, the request fails, the
    /// response cannot be parsed, or the suggestion list is empty.
    pub async fn identify(
        &self,
        image: &ImagePayload,
        organ: &str,
    ) -> Result<SpeciesCandidate, RecognitionError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or(RecognitionError::MissingApiKey)?;

        self.rate_limiter.until_ready().await;

        let image_part = Part::bytes(image.bytes.clone())
            .file_name("plant.jpg")
            .mime_str(&image.content_type)
            .map_err(|e| RecognitionError::RequestFailed(format!("invalid content type: {}", e)))?;

        let form = Form::new()
            .part("images", image_part)
            .text("organs", format!("[\"{}\"]", organ))
            .text("include_related_images", "false");

        tracing::debug!(organ = organ, bytes = image.bytes.len(), "Querying Plant.id API");

        let response = self
            .client
            .post(&self.base_url)
            .header("Api-Key", api_key)
            .multipart(form)
            .send()
            .await
            .map_err(|e| RecognitionError::RequestFailed(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(RecognitionError::RequestFailed(format!(
                "Plant.id returned error status: {}",
                status
            )));
        }

        let identify: IdentifyResponse = response
            .json()
            .await
            .map_err(|e| RecognitionError::RequestFailed(format!("parse failure: {}", e)))?;

        let suggestion = identify
            .suggestions
            .into_iter()
            .next()
            .ok_or(RecognitionError::NoSuggestions)?;

        let details = suggestion.plant_details;
        let candidate = SpeciesCandidate {
            scientific_name: details
                .scientific_name
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| SCIENTIFIC_NAME_UNAVAILABLE.to_string()),
            common_name: details
                .common_names
                .into_iter()
                .next()
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| COMMON_NAME_UNAVAILABLE.to_string()),
            family: details
                .family
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| FAMILY_UNAVAILABLE.to_string()),
            genus: details
                .genus
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| GENUS_UNAVAILABLE.to_string()),
        };

        tracing::info!(
            scientific_name = %candidate.scientific_name,
            family = %candidate.family,
            "Plant.id identification successful"
        );

        Ok(candidate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_without_key_is_constructible() {
        let client = PlantIdClient::new(None);
        assert!(client.api_key.is_none());
        assert!(client.base_url.contains("api.plant.id"));
    }

    #[tokio::test]
    async fn identify_without_key_fails_fast() {
        let client = PlantIdClient::new(None);
        let image = ImagePayload {
            bytes: vec![0xFF, 0xD8],
            content_type: "image/jpeg".to_string(),
        };
        let err = client.identify(&image, DEFAULT_ORGAN).await.unwrap_err();
        assert!(matches!(err, RecognitionError::MissingApiKey));
    }

    #[test]
    fn suggestion_parsing_applies_sentinels() {
        let json = r#"{
            "suggestions": [
                {"plant_details": {"scientific_name": "Rosa gallica", "common_names": []}}
            ]
        }"#;
        let parsed: IdentifyResponse = serde_json::from_str(json).unwrap();
        let details = parsed.suggestions.into_iter().next().unwrap().plant_details;
        assert_eq!(details.scientific_name.as_deref(), Some("Rosa gallica"));
        assert!(details.common_names.is_empty());
        assert!(details.family.is_none());
    }

    #[test]
    fn empty_suggestion_list_parses() {
        let parsed: IdentifyResponse = serde_json::from_str("{}").unwrap();
        assert!(parsed.suggestions.is_empty());
    }
}
