//! Reverse geocoding via Nominatim
//!
//! Turns a geolocation fix into a human-readable place descriptor. Never
//! fails outward: any transport, parse, or missing-address failure yields the
//! fixed sentinel strings. A location failure must never block a save.

use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

use crate::models::plant::{GeoFix, ResolvedLocation};
use scanplant_common::config::get_user_agent;

/// Sentinel for an unresolvable city
pub const CITY_UNAVAILABLE: &str = "Cidade Não Disponível";

/// Sentinel for an unresolvable place descriptor
pub const LOCATION_NAME_UNAVAILABLE: &str = "Nome do Local Não Disponível";

impl ResolvedLocation {
    /// The fixed sentinel descriptor
    pub fn unavailable() -> Self {
        Self {
            location_name: LOCATION_NAME_UNAVAILABLE.to_string(),
            city: CITY_UNAVAILABLE.to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ReverseResponse {
    address: Option<Address>,
}

#[derive(Debug, Deserialize)]
struct Address {
    road: Option<String>,
    neighbourhood: Option<String>,
    city: Option<String>,
    town: Option<String>,
    village: Option<String>,
}

/// Nominatim reverse-geocoding client
pub struct GeocodingClient {
    client: Client,
    base_url: String,
}

impl Default for GeocodingClient {
    fn default() -> Self {
        Self::new()
    }
}

impl GeocodingClient {
    pub fn new() -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(10))
            .connect_timeout(Duration::from_secs(5))
            .build()
            .expect("Failed to build HTTP client");

        Self {
            client,
            base_url: "https://nominatim.openstreetmap.org/reverse".to_string(),
        }
    }

    /// Override the endpoint (tests point this at a local server)
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Resolve a fix into a place descriptor; never fails outward
    pub async fn resolve(&self, fix: GeoFix) -> ResolvedLocation {
        match self.try_resolve(fix).await {
            Ok(location) => location,
            Err(e) => {
                tracing::warn!(
                    latitude = fix.latitude,
                    longitude = fix.longitude,
                    error = %e,
                    "Reverse geocoding failed, using sentinel location"
                );
                ResolvedLocation::unavailable()
            }
        }
    }

    async fn try_resolve(&self, fix: GeoFix) -> anyhow::Result<ResolvedLocation> {
        let response = self
            .client
            .get(&self.base_url)
            .header("User-Agent", get_user_agent())
            .query(&[
                ("lat", fix.latitude.to_string()),
                ("lon", fix.longitude.to_string()),
                ("format", "json".to_string()),
            ])
            .send()
            .await?;

        let body: ReverseResponse = response.json().await?;
        let address = body
            .address
            .ok_or_else(|| anyhow::anyhow!("no address in response"))?;

        let city = address
            .city
            .or(address.town)
            .or(address.village)
            .filter(|c| !c.is_empty())
            .unwrap_or_else(|| CITY_UNAVAILABLE.to_string());
        let road = address.road.unwrap_or_default();
        let neighbourhood = address.neighbourhood.unwrap_or_default();

        Ok(ResolvedLocation {
            location_name: format!("{}, {}, {}", road, neighbourhood, city),
            city,
        })
    }
}
