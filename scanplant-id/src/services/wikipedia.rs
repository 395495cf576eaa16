//! Wikipedia description fetcher
//!
//! Fetches a short prose extract for a scientific name from the Portuguese
//! Wikipedia. Never fails outward: every transport or parse failure resolves
//! to the fixed fallback string so the pipeline always proceeds.

use reqwest::Client;
use std::time::Duration;

use scanplant_common::config::get_user_agent;

/// Fixed fallback returned for any fetch/parse failure or missing page
pub const DESCRIPTION_NOT_FOUND: &str = "Descrição não encontrada.";

/// Extract length cap requested from the API
const EXTRACT_CHAR_LIMIT: u32 = 500;

/// Encyclopedia prose lookup keyed by scientific name
pub struct WikipediaClient {
    client: Client,
    base_url: String,
    article_base_url: String,
}

impl Default for WikipediaClient {
    fn default() -> Self {
        Self::new()
    }
}

impl WikipediaClient {
    pub fn new() -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(15))
            .connect_timeout(Duration::from_secs(5))
            .build()
            .expect("Failed to build HTTP client");

        Self {
            client,
            base_url: "https://pt.wikipedia.org/w/api.php".to_string(),
            article_base_url: "https://pt.wikipedia.org/wiki".to_string(),
        }
    }

    /// Override the endpoint (tests point this at a local server)
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Article URL for a scientific name (spaces become underscores)
    pub fn article_url(&self, scientific_name: &str) -> String {
        let title = scientific_name.split_whitespace().collect::<Vec<_>>().join("_");
        format!("{}/{}", self.article_base_url, title)
    }

    /// Fetch the plain-text extract for a scientific name
    ///
    /// Always returns a string; any failure yields `DESCRIPTION_NOT_FOUND`.
    pub async fn fetch_extract(&self, scientific_name: &str) -> String {
        match self.try_fetch_extract(scientific_name).await {
            Ok(extract) => extract,
            Err(e) => {
                tracing::warn!(
                    scientific_name = scientific_name,
                    error = %e,
                    "Wikipedia fetch failed, using fallback description"
                );
                DESCRIPTION_NOT_FOUND.to_string()
            }
        }
    }

    async fn try_fetch_extract(&self, scientific_name: &str) -> anyhow::Result<String> {
        let exchars = EXTRACT_CHAR_LIMIT.to_string();
        let response = self
            .client
            .get(&self.base_url)
            .header("User-Agent", get_user_agent())
            .query(&[
                ("action", "query"),
                ("format", "json"),
                ("titles", scientific_name),
                ("prop", "extracts"),
                ("exchars", exchars.as_str()),
                ("explaintext", "true"),
                ("utf8", "1"),
                ("redirects", "1"),
            ])
            .send()
            .await?;

        let body: serde_json::Value = response.json().await?;

        // Pages are keyed by page id; take the first matching page.
        let extract = body
            .get("query")
            .and_then(|q| q.get("pages"))
            .and_then(|p| p.as_object())
            .and_then(|pages| pages.values().next())
            .and_then(|page| page.get("extract"))
            .and_then(|e| e.as_str())
            .filter(|e| !e.is_empty())
            .ok_or_else(|| anyhow::anyhow!("no extract in response"))?;

        Ok(extract.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn article_url_replaces_whitespace() {
        let client = WikipediaClient::new();
        assert_eq!(
            client.article_url("Rosa gallica"),
            "https://pt.wikipedia.org/wiki/Rosa_gallica"
        );
    }

    #[tokio::test]
    async fn refused_connection_resolves_to_fallback() {
        // Port 1 refuses connections; the fetch must still return a string
        let client = WikipediaClient::new().with_base_url("http://127.0.0.1:1/w/api.php");
        let description = client.fetch_extract("Rosa gallica").await;
        assert_eq!(description, DESCRIPTION_NOT_FOUND);
    }
}
