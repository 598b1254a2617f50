//! StudyGateway - cache, key rotation and fallback over a primary generator

use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::Serialize;
use tracing::{info, instrument, warn};

use crate::cache::ContentCache;
use crate::fallback::{FallbackSource, templates};
use crate::history::CallHistory;
use crate::keys::KeyPool;
use crate::passage::{self, LengthBand, Passage};
use crate::providers::{GenerateProvider, RetryConfig};
use crate::status::{ApiStatus, CacheStats, Health, HistoryView};
use crate::study::{self, StudyOutput, StudyRequest};
use crate::{LectioError, Result, telemetry};

/// Default bound on a single upstream generation call.
pub const DEFAULT_CALL_TIMEOUT: Duration = Duration::from_secs(60);

/// Name under which fallback compositions are logged.
const FALLBACK_API_NAME: &str = "Bible API";

/// Cache source label for fallback content.
const FALLBACK_LABEL: &str = "fallback";

/// Cache source label for the error notice.
const ERROR_LABEL: &str = "error";

/// Number of cache entries listed by [`StudyGateway::cache_stats`].
const CACHE_STATS_ENTRIES: usize = 10;

/// Whether a delayed, key-reset retry of the study pipeline can succeed.
///
/// Exhausted or rejected keys come back after the reset, and a verse-format
/// reply may not repeat. Other non-transient errors (a 400, a bad request
/// shape) will fail the same way again.
fn retry_may_help(err: &LectioError) -> bool {
    err.is_transient()
        || err.class().rotates_key()
        || matches!(err, LectioError::NoKeyAvailable | LectioError::UnexpectedFormat(_))
}

/// Terminal state of a generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    CacheHit,
    Primary,
    Fallback,
    AllFailed,
}

impl Outcome {
    pub fn as_str(self) -> &'static str {
        match self {
            Outcome::CacheHit => "cache_hit",
            Outcome::Primary => "primary",
            Outcome::Fallback => "fallback",
            Outcome::AllFailed => "all_failed",
        }
    }
}

/// Caller-facing result of [`StudyGateway::generate`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Generated {
    pub content: String,
    /// Key label, "fallback" or "error"; for cache hits, the original source.
    pub source: String,
    pub from_cache: bool,
    pub outcome: Outcome,
}

/// Orchestrates cache, key rotation and fallback for content generation.
///
/// Built via [`Lectio::builder()`](crate::Lectio::builder). `Send + Sync`;
/// share it behind an `Arc`.
pub struct StudyGateway {
    primary: Option<Arc<dyn GenerateProvider>>,
    pool: KeyPool,
    fallback: FallbackSource,
    cache: ContentCache,
    history: CallHistory,
    retry: RetryConfig,
    call_timeout: Duration,
}

impl StudyGateway {
    pub(crate) fn new(
        primary: Option<Arc<dyn GenerateProvider>>,
        pool: KeyPool,
        fallback: FallbackSource,
        cache: ContentCache,
        retry: RetryConfig,
        call_timeout: Duration,
    ) -> Self {
        Self {
            primary,
            pool,
            fallback,
            cache,
            history: CallHistory::new(),
            retry,
            call_timeout,
        }
    }

    /// Generate verse-by-verse content for `passage`.
    ///
    /// Never fails: when every source is exhausted the result is an
    /// information notice (outcome [`Outcome::AllFailed`]). Every completed
    /// generation is cached under its fingerprint.
    #[instrument(skip(self), fields(outcome = tracing::field::Empty))]
    pub async fn generate(&self, passage: &str, target_length: u32, use_primary: bool) -> Generated {
        let fingerprint = passage::fingerprint(passage, target_length, use_primary);

        if let Some(entry) = self.cache.get(&fingerprint).await {
            info!(source = %entry.source, "cache hit");
            return self.finish(entry.content, entry.source, true, Outcome::CacheHit);
        }

        let parsed = match Passage::parse(passage) {
            Ok(parsed) => parsed,
            Err(e) => {
                warn!(error = %e, "unparseable passage");
                return self.all_failed(&fingerprint, passage).await;
            }
        };
        let band = LengthBand::from_target(target_length);

        if use_primary && self.primary.is_some() {
            let prompt = study::verse_prompt(&parsed);
            match self.rotate(&prompt).await {
                Ok((content, label)) => {
                    self.cache.put(&fingerprint, &content, &label).await;
                    return self.finish(content, label, false, Outcome::Primary);
                }
                Err(e) => info!(error = %e, "primary unavailable, using fallback"),
            }
        }

        match self.fallback.compose(&parsed, band).await {
            Ok(composed) => {
                let content = composed.render();
                self.history.log(FALLBACK_API_NAME, true, content.len(), None);
                metrics::counter!(telemetry::FALLBACK_TOTAL, "result" => "ok").increment(1);
                self.cache.put(&fingerprint, &content, FALLBACK_LABEL).await;
                self.finish(content, FALLBACK_LABEL.to_string(), false, Outcome::Fallback)
            }
            Err(e) => {
                let message = e.to_string();
                self.history.log(FALLBACK_API_NAME, false, 0, Some(&message));
                metrics::counter!(telemetry::FALLBACK_TOTAL, "result" => "error").increment(1);
                self.all_failed(&fingerprint, passage).await
            }
        }
    }

    /// Generate a multi-section study.
    ///
    /// Tries the primary provider once, then up to `retry.max_attempts`
    /// delayed retries with a key-pool reset before each. Retries stop early
    /// on errors a reset cannot clear, and are skipped entirely when no key
    /// carries a secret. Falls back to templated sections built from
    /// retrieved text. Never fails; results are not cached.
    #[instrument(skip_all, fields(passage = %request.passage))]
    pub async fn generate_study(&self, request: &StudyRequest) -> StudyOutput {
        let rubrics = study::select_rubrics(request.rubrics.as_deref());

        let parsed = match Passage::parse(&request.passage) {
            Ok(parsed) => parsed,
            Err(e) => {
                warn!(error = %e, "unparseable passage");
                return StudyOutput {
                    content: templates::error_notice(request.passage.trim()),
                    source: ERROR_LABEL.to_string(),
                    rubrics_generated: 0,
                    from_cache: false,
                };
            }
        };

        if request.use_primary && self.primary.is_some() && self.pool.has_configured_keys() {
            let prompt = study::rubric_prompt(&parsed.to_string(), &rubrics);

            let mut last_error = match self.try_study(&prompt, &rubrics).await {
                Ok(output) => return output,
                Err(e) => e,
            };
            for attempt in 0..self.retry.max_attempts {
                if !retry_may_help(&last_error) {
                    info!(error = %last_error, class = last_error.class().as_str(), "study error is not retryable");
                    break;
                }
                let delay = self.retry.effective_delay(attempt, last_error.retry_after());
                info!(
                    attempt = attempt + 1,
                    max_attempts = self.retry.max_attempts,
                    delay_ms = delay.as_millis() as u64,
                    error = %last_error,
                    "retrying study generation after key reset"
                );
                tokio::time::sleep(delay).await;
                self.pool.reset();
                last_error = match self.try_study(&prompt, &rubrics).await {
                    Ok(output) => return output,
                    Err(e) => e,
                };
            }
            warn!(error = %last_error, "primary provider exhausted, building sections from fallback");
        }

        let mut sections = Vec::with_capacity(rubrics.len());
        for &index in &rubrics {
            let body = self
                .fallback
                .theological_section(&parsed, study::RUBRICS[index])
                .await;
            sections.push(format!("{}\n\n{}", study::section_header(index), body));
        }
        let content = sections.join("\n\n");
        self.history.log(FALLBACK_API_NAME, true, content.len(), None);

        StudyOutput {
            content,
            source: study::FALLBACK_SOURCE.to_string(),
            rubrics_generated: rubrics.len(),
            from_cache: false,
        }
    }

    async fn try_study(&self, prompt: &str, rubrics: &[usize]) -> Result<StudyOutput> {
        let (content, label) = self.rotate(prompt).await?;
        if study::is_verse_format(&content) {
            warn!(key = %label, "study response in verse format, discarding");
            return Err(LectioError::UnexpectedFormat(label));
        }
        Ok(StudyOutput {
            content: study::renumber(&content, rubrics),
            source: label,
            rubrics_generated: rubrics.len(),
            from_cache: false,
        })
    }

    /// Run the key rotation loop for one prompt.
    ///
    /// At most `pool.len()` attempts. Quota, auth and empty responses mark
    /// the key failed and move on; any other error stops the loop without
    /// touching the key. Returns the content and the label of the key that
    /// produced it, or the last error seen.
    async fn rotate(&self, prompt: &str) -> Result<(String, String)> {
        let provider = self.primary.as_ref().ok_or(LectioError::NoProvider)?;
        let mut last_error = LectioError::NoKeyAvailable;

        for _ in 0..self.pool.len() {
            let Some(key) = self.pool.next_available() else {
                info!("all keys exhausted");
                break;
            };

            let start = Instant::now();
            let result = match tokio::time::timeout(
                self.call_timeout,
                provider.generate(prompt, &key.secret),
            )
            .await
            {
                Ok(Ok(content)) if content.trim().is_empty() => Err(LectioError::EmptyResponse),
                Ok(result) => result,
                Err(_) => Err(LectioError::Timeout(self.call_timeout)),
            };
            metrics::histogram!(telemetry::PROVIDER_CALL_DURATION_SECONDS,
                "provider" => provider.name().to_owned(),
            )
            .record(start.elapsed().as_secs_f64());

            match result {
                Ok(content) => {
                    self.record(provider.name(), &key.label, key.index, true, content.len(), None);
                    info!(key = %key.label, content_length = content.len(), "primary generation succeeded");
                    return Ok((content, key.label));
                }
                Err(e) => {
                    let message = e.to_string();
                    self.record(provider.name(), &key.label, key.index, false, 0, Some(&message));

                    // An empty body means the key is unusable today, like a quota error.
                    let class = match e {
                        LectioError::EmptyResponse => "empty",
                        _ if e.class().rotates_key() => e.class().as_str(),
                        _ => {
                            warn!(key = %key.label, class = e.class().as_str(), error = %e, "primary error, not rotating");
                            return Err(e);
                        }
                    };
                    self.pool.mark_failed(key.index);
                    metrics::counter!(telemetry::KEY_ROTATIONS_TOTAL, "class" => class).increment(1);
                    last_error = e;
                }
            }
        }
        Err(last_error)
    }

    fn record(
        &self,
        provider: &str,
        label: &str,
        index: usize,
        success: bool,
        content_length: usize,
        error: Option<&str>,
    ) {
        self.pool.record_call(index, success, error);
        self.history.log(label, success, content_length, error);
        metrics::counter!(telemetry::PROVIDER_CALLS_TOTAL,
            "provider" => provider.to_owned(),
            "status" => if success { "ok" } else { "error" },
        )
        .increment(1);
    }

    async fn all_failed(&self, fingerprint: &str, passage: &str) -> Generated {
        let notice = templates::error_notice(passage.trim());
        self.cache.put(fingerprint, &notice, ERROR_LABEL).await;
        self.finish(notice, ERROR_LABEL.to_string(), false, Outcome::AllFailed)
    }

    fn finish(&self, content: String, source: String, from_cache: bool, outcome: Outcome) -> Generated {
        tracing::Span::current().record("outcome", outcome.as_str());
        metrics::counter!(telemetry::GENERATIONS_TOTAL, "outcome" => outcome.as_str()).increment(1);
        Generated {
            content,
            source,
            from_cache,
            outcome,
        }
    }

    // ===== Administrative accessors =====

    /// Remove every cache entry, returning how many were removed.
    pub async fn clear_cache(&self) -> u64 {
        let removed = self.cache.clear().await;
        info!(removed, "cache cleared");
        removed
    }

    pub async fn cache_stats(&self) -> CacheStats {
        let (primary_available, quota_message) = self.pool.quota_summary();
        CacheStats {
            total_entries: self.cache.len().await,
            entries: self.cache.entries(CACHE_STATS_ENTRIES),
            primary_available,
            quota_message,
            retrieval_configured: self.fallback.is_configured(),
        }
    }

    pub fn status(&self) -> ApiStatus {
        ApiStatus::project(
            &self.pool.snapshot(),
            &self.fallback.stats(),
            self.fallback.is_configured(),
            self.history.snapshot(),
        )
    }

    pub fn history(&self, limit: usize) -> HistoryView {
        HistoryView {
            total_calls: self.history.len(),
            recent_calls: self.history.recent(limit),
        }
    }

    pub async fn health(&self) -> Health {
        let snapshot = self.pool.snapshot();
        Health {
            status: "healthy".to_string(),
            keys: snapshot.keys.iter().map(Health::key_line).collect(),
            current_key: snapshot.current().map(|k| k.label.clone()),
            primary_configured: self.primary.is_some(),
            retrieval_configured: self.fallback.is_configured(),
            cache_entries: self.cache.len().await,
            version: crate::version::version_string(),
        }
    }

    /// Restore every key and rewind rotation to the first key.
    pub fn reset_keys(&self) {
        self.pool.reset();
        info!("key pool reset");
    }

    pub fn key_pool(&self) -> &KeyPool {
        &self.pool
    }

    pub fn fallback(&self) -> &FallbackSource {
        &self.fallback
    }
}
