//! api.bible verse retrieval client.
//!
//! See: <https://scripture.api.bible/livedocs>

use std::sync::LazyLock;

use async_trait::async_trait;
use regex::Regex;
use reqwest::Client;
use serde::Deserialize;
use tracing::instrument;

use super::traits::VerseSource;
use super::{DEFAULT_HTTP_TIMEOUT, build_http, check_status};
use crate::Result;

/// Default base URL for api.bible
pub const DEFAULT_BASE_URL: &str = "https://api.scripture.api.bible";

/// Louis Segond 1910
pub const DEFAULT_BIBLE_ID: &str = "a93a92589195411f-01";

// Verse-number markers rendered inline by the API, e.g. `<span class="v">16</span>`.
static VERSE_NUMBER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"<span[^>]*class="v"[^>]*>[^<]*</span>"#).expect("valid regex")
});
static TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]+>").expect("valid regex"));
static SPACES: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").expect("valid regex"));

/// Strip HTML markup and collapse whitespace.
pub fn strip_html(html: &str) -> String {
    let text = VERSE_NUMBER.replace_all(html, "");
    let text = TAG.replace_all(&text, "");
    SPACES.replace_all(text.trim(), " ").into_owned()
}

#[derive(Clone)]
pub struct BibleApiClient {
    api_key: String,
    bible_id: String,
    http: Client,
    base_url: String,
}

impl BibleApiClient {
    /// Create a client for the default French translation.
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        Self::with_base_url(api_key, DEFAULT_BASE_URL)
    }

    /// Create a client with a custom base URL (for testing with wiremock).
    pub fn with_base_url(api_key: impl Into<String>, base_url: impl Into<String>) -> Result<Self> {
        Ok(Self::with_http_client(
            api_key,
            base_url,
            build_http(DEFAULT_HTTP_TIMEOUT)?,
        ))
    }

    /// Create a client sharing an existing connection pool.
    pub fn with_http_client(
        api_key: impl Into<String>,
        base_url: impl Into<String>,
        http: Client,
    ) -> Self {
        Self {
            api_key: api_key.into(),
            bible_id: DEFAULT_BIBLE_ID.to_string(),
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Use a different translation.
    pub fn bible_id(mut self, bible_id: impl Into<String>) -> Self {
        self.bible_id = bible_id.into();
        self
    }
}

#[async_trait]
impl VerseSource for BibleApiClient {
    fn name(&self) -> &str {
        "bible_api"
    }

    #[instrument(name = "bible_api.fetch_verse", skip(self))]
    async fn fetch_verse(&self, book_code: &str, chapter: u32, verse: u32) -> Result<String> {
        let url = format!(
            "{}/v1/bibles/{}/verses/{}.{}.{}",
            self.base_url, self.bible_id, book_code, chapter, verse
        );

        let response = self
            .http
            .get(&url)
            .header("api-key", &self.api_key)
            .send()
            .await?;

        let response = check_status(response).await?;
        let body: VerseResponse = response.json().await?;

        Ok(strip_html(&body.data.content))
    }
}

#[derive(Deserialize)]
struct VerseResponse {
    data: VerseData,
}

#[derive(Deserialize)]
struct VerseData {
    #[serde(default)]
    content: String,
}
