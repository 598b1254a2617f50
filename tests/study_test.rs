//! Tests for multi-section study generation.

use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use lectio::providers::{GenerateProvider, VerseSource};
use lectio::{Lectio, LectioError, Result, RetryConfig, StudyRequest};

/// Fails with a quota error for the first `fail_first` calls, then answers.
struct FlakyProvider {
    fail_first: u32,
    reply: &'static str,
    call_count: AtomicU32,
}

impl FlakyProvider {
    fn new(fail_first: u32, reply: &'static str) -> Arc<Self> {
        Arc::new(Self {
            fail_first,
            reply,
            call_count: AtomicU32::new(0),
        })
    }

    fn calls(&self) -> u32 {
        self.call_count.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl GenerateProvider for FlakyProvider {
    fn name(&self) -> &str {
        "flaky"
    }

    async fn generate(&self, prompt: &str, _api_key: &str) -> Result<String> {
        assert!(prompt.starts_with("Créez une étude biblique théologique"));
        let n = self.call_count.fetch_add(1, Ordering::Relaxed);
        if n < self.fail_first {
            Err(LectioError::RateLimited { retry_after: None })
        } else {
            Ok(self.reply.to_string())
        }
    }
}

/// Rejects every request with a 400 that no key reset can clear.
struct RejectingProvider {
    call_count: AtomicU32,
}

#[async_trait]
impl GenerateProvider for RejectingProvider {
    fn name(&self) -> &str {
        "rejecting"
    }

    async fn generate(&self, _prompt: &str, _api_key: &str) -> Result<String> {
        self.call_count.fetch_add(1, Ordering::Relaxed);
        Err(LectioError::Api {
            status: 400,
            message: "invalid request body".into(),
        })
    }
}

struct StaticVerses;

#[async_trait]
impl VerseSource for StaticVerses {
    fn name(&self) -> &str {
        "static_verses"
    }

    async fn fetch_verse(&self, book_code: &str, chapter: u32, verse: u32) -> Result<String> {
        Ok(format!("{book_code} {chapter}:{verse}"))
    }
}

fn quick_retry(attempts: u32) -> RetryConfig {
    RetryConfig::new()
        .max_attempts(attempts)
        .initial_delay(Duration::from_secs(5))
        .max_delay(Duration::from_secs(30))
}

#[tokio::test]
async fn test_primary_study_is_returned() {
    let provider = FlakyProvider::new(0, "## Rubrique 1: Prière d'ouverture\n\nSeigneur...");
    let gateway = Lectio::builder()
        .primary_provider(provider.clone())
        .key("KeyA", "a")
        .build()
        .unwrap();

    let study = gateway
        .generate_study(&StudyRequest::new("Jean 3").rubrics([1, 2]))
        .await;

    assert_eq!(study.source, "KeyA");
    assert_eq!(study.rubrics_generated, 2);
    assert!(!study.from_cache);
    assert!(study.content.starts_with("## Rubrique 1: Prière d'ouverture"));
    assert_eq!(provider.calls(), 1);
}

#[tokio::test]
async fn test_single_rubric_is_renumbered() {
    let provider = FlakyProvider::new(0, "## Rubrique 1: Contexte historique\n\nTexte.");
    let gateway = Lectio::builder()
        .primary_provider(provider)
        .key("KeyA", "a")
        .build()
        .unwrap();

    let study = gateway
        .generate_study(&StudyRequest::new("Exode 3").rubrics([6]))
        .await;

    assert!(study.content.starts_with("## Rubrique 6: Contexte historique"));
    assert_eq!(study.rubrics_generated, 1);
}

#[tokio::test(start_paused = true)]
async fn test_retries_after_key_reset() {
    let provider = FlakyProvider::new(2, "## Rubrique 4: Thème doctrinal\n\n...");
    let gateway = Lectio::builder()
        .primary_provider(provider.clone())
        .key("KeyA", "a")
        .retry(quick_retry(3))
        .build()
        .unwrap();

    let start = tokio::time::Instant::now();
    let study = gateway
        .generate_study(&StudyRequest::new("Jean 3").rubrics([4]))
        .await;

    assert_eq!(study.source, "KeyA");
    assert_eq!(provider.calls(), 3);
    // Two delayed retries: 5s then 10s.
    assert!(start.elapsed() >= Duration::from_secs(15));
    assert!(!gateway.key_pool().snapshot().keys[0].failed);
}

#[tokio::test(start_paused = true)]
async fn test_exhausted_retries_fall_back_to_sections() {
    let provider = FlakyProvider::new(u32::MAX, "unused");
    let gateway = Lectio::builder()
        .primary_provider(provider.clone())
        .key("KeyA", "a")
        .verse_source(Arc::new(StaticVerses))
        .retry(quick_retry(2))
        .build()
        .unwrap();

    let study = gateway
        .generate_study(&StudyRequest::new("Jean 3:16").rubrics([1, 9]))
        .await;

    assert_eq!(provider.calls(), 3);
    assert_eq!(study.source, "fallback");
    assert_eq!(study.rubrics_generated, 2);
    assert!(study.content.starts_with("## Rubrique 1: Prière d'ouverture\n\n"));
    assert!(study.content.contains("## Rubrique 9: Analyse lexicale\n\n"));
    assert!(study.content.contains("16. JHN 3:16"));
}

#[tokio::test(start_paused = true)]
async fn test_bad_request_is_not_retried() {
    let provider = Arc::new(RejectingProvider {
        call_count: AtomicU32::new(0),
    });
    let gateway = Lectio::builder()
        .primary_provider(provider.clone())
        .key("KeyA", "a")
        .retry(quick_retry(3))
        .build()
        .unwrap();

    let start = tokio::time::Instant::now();
    let study = gateway
        .generate_study(&StudyRequest::new("Jean 3").rubrics([1]))
        .await;

    assert_eq!(study.source, "fallback");
    assert_eq!(provider.call_count.load(Ordering::Relaxed), 1);
    assert!(start.elapsed() < Duration::from_secs(5));
    assert!(!gateway.key_pool().snapshot().keys[0].failed);
}

#[tokio::test(start_paused = true)]
async fn test_no_configured_keys_skips_retries() {
    let provider = FlakyProvider::new(0, "## Rubrique 1: ...");
    let gateway = Lectio::builder()
        .primary_provider(provider.clone())
        .key("Unset", "")
        .retry(quick_retry(3))
        .build()
        .unwrap();

    let start = tokio::time::Instant::now();
    let study = gateway
        .generate_study(&StudyRequest::new("Jean 3").rubrics([1]))
        .await;

    assert_eq!(study.source, "fallback");
    assert_eq!(provider.calls(), 0);
    assert!(start.elapsed() < Duration::from_secs(5));
}

#[tokio::test]
async fn test_verse_format_response_is_rejected() {
    let provider = FlakyProvider::new(0, "**Verset 1**\n\n**TEXTE BIBLIQUE :** ...");
    let gateway = Lectio::builder()
        .primary_provider(provider.clone())
        .key("KeyA", "a")
        .retry(RetryConfig::disabled())
        .build()
        .unwrap();

    let study = gateway
        .generate_study(&StudyRequest::new("Genèse 1").rubrics([2]))
        .await;

    assert_eq!(provider.calls(), 1);
    assert_eq!(study.source, "fallback");
    assert!(study.content.starts_with("## Rubrique 2: Structure littéraire"));
    // Known text is quoted even without a retrieval source.
    assert!(study.content.contains("1. Au commencement, Dieu créa les cieux et la terre."));
}

#[tokio::test]
async fn test_default_rubrics_without_primary() {
    let gateway = Lectio::builder().build().unwrap();

    let study = gateway.generate_study(&StudyRequest::new("Jean 3")).await;

    assert_eq!(study.source, "fallback");
    assert_eq!(study.rubrics_generated, 5);
    assert!(
        study
            .content
            .starts_with("## Étude verset par verset: Étude verset par verset\n\n")
    );
    assert!(study.content.contains("## Rubrique 4: Thème doctrinal"));
    assert!(!study.content.contains("## Rubrique 5:"));
}

#[tokio::test]
async fn test_use_primary_false_skips_provider() {
    let provider = FlakyProvider::new(0, "## Rubrique 1: ...");
    let gateway = Lectio::builder()
        .primary_provider(provider.clone())
        .key("KeyA", "a")
        .build()
        .unwrap();

    let study = gateway
        .generate_study(&StudyRequest::new("Jean 3").rubrics([1]).use_primary(false))
        .await;

    assert_eq!(provider.calls(), 0);
    assert_eq!(study.source, "fallback");
}

#[tokio::test]
async fn test_unparseable_passage() {
    let gateway = Lectio::builder().build().unwrap();

    let study = gateway.generate_study(&StudyRequest::new("   ")).await;

    assert_eq!(study.source, "error");
    assert_eq!(study.rubrics_generated, 0);
    assert!(study.content.starts_with("**INFORMATION**"));
}

#[test]
fn test_request_deserializes_with_defaults() {
    let request: StudyRequest = serde_json::from_str(r#"{"passage": "Jean 3"}"#).unwrap();
    assert_eq!(request.passage, "Jean 3");
    assert!(request.rubrics.is_none());
    assert!(request.use_primary);
}
