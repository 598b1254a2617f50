//! Builder for configuring gateway instances

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::StudyGateway;
use super::orchestrator::DEFAULT_CALL_TIMEOUT;
use crate::cache::{CacheConfig, ContentCache};
use crate::fallback::FallbackSource;
use crate::keys::KeyPool;
use crate::providers::{
    BibleApiClient, DEFAULT_HTTP_TIMEOUT, GeminiClient, GenerateProvider, OpenAiCompatClient,
    RetryConfig, VerseSource, bible_api, build_http, gemini, openai,
};
use crate::{LectioError, Result};

/// Main entry point for creating gateway instances.
pub struct Lectio;

impl Lectio {
    /// Create a new builder for configuring the gateway.
    pub fn builder() -> LectioBuilder {
        LectioBuilder::new()
    }
}

/// Which REST dialect the primary provider speaks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PrimaryKind {
    #[default]
    Gemini,
    #[serde(rename = "openai")]
    OpenAi,
}

impl PrimaryKind {
    /// Prefix of the key slot ids (`gemini_1`, `openai_1`, ...).
    pub fn key_prefix(self) -> &'static str {
        match self {
            PrimaryKind::Gemini => "gemini",
            PrimaryKind::OpenAi => "openai",
        }
    }
}

/// Key slot id prefix for custom primaries or none at all.
const GENERIC_KEY_PREFIX: &str = "key";

enum PrimarySpec {
    Rest {
        kind: PrimaryKind,
        model: Option<String>,
        base_url: Option<String>,
    },
    Custom(Arc<dyn GenerateProvider>),
}

enum VerseSpec {
    BibleApi {
        api_key: String,
        base_url: Option<String>,
        bible_id: Option<String>,
    },
    Custom(Arc<dyn VerseSource>),
}

/// Builder for configuring gateway instances.
pub struct LectioBuilder {
    primary: Option<PrimarySpec>,
    keys: Vec<(String, String)>,
    verse_source: Option<VerseSpec>,
    cache: CacheConfig,
    retry: RetryConfig,
    call_timeout: Duration,
    http_timeout: Duration,
}

impl LectioBuilder {
    pub fn new() -> Self {
        Self {
            primary: None,
            keys: Vec::new(),
            verse_source: None,
            cache: CacheConfig::default(),
            retry: RetryConfig::default(),
            call_timeout: DEFAULT_CALL_TIMEOUT,
            http_timeout: DEFAULT_HTTP_TIMEOUT,
        }
    }

    /// Use Gemini as the primary provider.
    pub fn gemini(mut self) -> Self {
        self.primary = Some(PrimarySpec::Rest {
            kind: PrimaryKind::Gemini,
            model: None,
            base_url: None,
        });
        self
    }

    /// Use an OpenAI-compatible endpoint as the primary provider.
    pub fn openai(mut self) -> Self {
        self.primary = Some(PrimarySpec::Rest {
            kind: PrimaryKind::OpenAi,
            model: None,
            base_url: None,
        });
        self
    }

    /// Select the primary REST provider by kind.
    pub fn primary_kind(self, kind: PrimaryKind) -> Self {
        match kind {
            PrimaryKind::Gemini => self.gemini(),
            PrimaryKind::OpenAi => self.openai(),
        }
    }

    /// Override the primary model. No effect on a custom provider.
    pub fn model(mut self, name: impl Into<String>) -> Self {
        if let Some(PrimarySpec::Rest { model, .. }) = &mut self.primary {
            *model = Some(name.into());
        }
        self
    }

    /// Override the primary base URL. No effect on a custom provider.
    pub fn primary_base_url(mut self, url: impl Into<String>) -> Self {
        if let Some(PrimarySpec::Rest { base_url, .. }) = &mut self.primary {
            *base_url = Some(url.into());
        }
        self
    }

    /// Use a custom primary provider (tests, other backends).
    pub fn primary_provider(mut self, provider: Arc<dyn GenerateProvider>) -> Self {
        self.primary = Some(PrimarySpec::Custom(provider));
        self
    }

    /// Append a key to the rotation. Order of calls is rotation order.
    ///
    /// Slot ids are assigned at build time from the primary kind.
    pub fn key(mut self, label: impl Into<String>, secret: impl Into<String>) -> Self {
        self.keys.push((label.into(), secret.into()));
        self
    }

    /// Append several `(label, secret)` pairs.
    pub fn keys<I, L, S>(self, keys: I) -> Self
    where
        I: IntoIterator<Item = (L, S)>,
        L: Into<String>,
        S: Into<String>,
    {
        keys.into_iter()
            .fold(self, |builder, (label, secret)| builder.key(label, secret))
    }

    /// Configure api.bible as the retrieval source.
    pub fn bible_api(mut self, api_key: impl Into<String>) -> Self {
        self.verse_source = Some(VerseSpec::BibleApi {
            api_key: api_key.into(),
            base_url: None,
            bible_id: None,
        });
        self
    }

    /// Override the api.bible base URL.
    pub fn bible_api_url(mut self, url: impl Into<String>) -> Self {
        if let Some(VerseSpec::BibleApi { base_url, .. }) = &mut self.verse_source {
            *base_url = Some(url.into());
        }
        self
    }

    /// Override the translation id.
    pub fn bible_id(mut self, id: impl Into<String>) -> Self {
        if let Some(VerseSpec::BibleApi { bible_id, .. }) = &mut self.verse_source {
            *bible_id = Some(id.into());
        }
        self
    }

    /// Use a custom retrieval source.
    pub fn verse_source(mut self, source: Arc<dyn VerseSource>) -> Self {
        self.verse_source = Some(VerseSpec::Custom(source));
        self
    }

    /// Configure the content cache.
    pub fn cache(mut self, config: CacheConfig) -> Self {
        self.cache = config;
        self
    }

    /// Configure delayed whole-pipeline retries for studies.
    pub fn retry(mut self, config: RetryConfig) -> Self {
        self.retry = config;
        self
    }

    /// Bound on a single primary generation call (default: 60s).
    pub fn call_timeout(mut self, timeout: Duration) -> Self {
        self.call_timeout = timeout;
        self
    }

    /// HTTP client timeout for the built-in REST clients (default: 60s).
    pub fn http_timeout(mut self, timeout: Duration) -> Self {
        self.http_timeout = timeout;
        self
    }

    /// Build the gateway.
    pub fn build(self) -> Result<StudyGateway> {
        if self.call_timeout.is_zero() {
            return Err(LectioError::Configuration(
                "call timeout must be positive".into(),
            ));
        }
        if self.cache.max_entries == 0 {
            return Err(LectioError::Configuration(
                "cache max_entries must be positive".into(),
            ));
        }

        let key_prefix = match &self.primary {
            Some(PrimarySpec::Rest { kind, .. }) => kind.key_prefix(),
            _ => GENERIC_KEY_PREFIX,
        };

        // Shared HTTP client for the REST providers.
        let http = build_http(self.http_timeout)?;

        let primary: Option<Arc<dyn GenerateProvider>> = match self.primary {
            Some(PrimarySpec::Rest {
                kind: PrimaryKind::Gemini,
                model,
                base_url,
            }) => Some(Arc::new(GeminiClient::with_http_client(
                model.unwrap_or_else(|| gemini::DEFAULT_MODEL.to_string()),
                base_url.unwrap_or_else(|| gemini::DEFAULT_BASE_URL.to_string()),
                http.clone(),
            ))),
            Some(PrimarySpec::Rest {
                kind: PrimaryKind::OpenAi,
                model,
                base_url,
            }) => Some(Arc::new(OpenAiCompatClient::with_http_client(
                model.unwrap_or_else(|| openai::DEFAULT_MODEL.to_string()),
                base_url.unwrap_or_else(|| openai::DEFAULT_BASE_URL.to_string()),
                http.clone(),
            ))),
            Some(PrimarySpec::Custom(provider)) => Some(provider),
            None => None,
        };

        let verse_source: Option<Arc<dyn VerseSource>> = match self.verse_source {
            Some(VerseSpec::BibleApi {
                api_key,
                base_url,
                bible_id,
            }) => Some(Arc::new(
                BibleApiClient::with_http_client(
                    api_key,
                    base_url.unwrap_or_else(|| bible_api::DEFAULT_BASE_URL.to_string()),
                    http,
                )
                .bible_id(bible_id.unwrap_or_else(|| bible_api::DEFAULT_BIBLE_ID.to_string())),
            )),
            Some(VerseSpec::Custom(source)) => Some(source),
            None => None,
        };

        let pool = KeyPool::from_secrets(key_prefix, self.keys);
        if primary.is_some() && !pool.has_configured_keys() {
            warn!("primary provider configured without any key, every request will fall back");
        }
        if verse_source.is_none() {
            warn!("no retrieval source configured, fallback content is unavailable");
        }
        info!(
            primary = primary.as_ref().map(|p| p.name()).unwrap_or("none"),
            keys = pool.len(),
            retrieval = verse_source.as_ref().map(|s| s.name()).unwrap_or("none"),
            "gateway built"
        );

        Ok(StudyGateway::new(
            primary,
            pool,
            FallbackSource::new(verse_source),
            ContentCache::new(&self.cache),
            self.retry,
            self.call_timeout,
        ))
    }
}

impl Default for LectioBuilder {
    fn default() -> Self {
        Self::new()
    }
}
