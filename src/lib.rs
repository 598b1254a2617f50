//! Lectio - caching, key-rotating content gateway for Bible-study generation
//!
//! This crate fronts a rate-limited text-generation provider (Gemini, or
//! any OpenAI-compatible endpoint) with a pool of API keys, a TTL content
//! cache, and a fallback source backed by a Bible-text API and built-in
//! verse text. Callers always get content back: when every source fails,
//! the result is an information notice.
//!
//! # Example
//!
//! ```rust,no_run
//! use lectio::Lectio;
//!
//! #[tokio::main]
//! async fn main() -> lectio::Result<()> {
//!     let gateway = Lectio::builder()
//!         .gemini()
//!         .key("Primary", "AIza-your-key")
//!         .key("Secondary", "AIza-other-key")
//!         .bible_api("your-bible-api-key")
//!         .build()?;
//!
//!     let generated = gateway.generate("Genèse 1", 500, true).await;
//!     println!("[{}] {}", generated.source, generated.content);
//!     Ok(())
//! }
//! ```
//!
//! # Study Example
//!
//! ```rust,no_run
//! use lectio::{Lectio, StudyRequest};
//!
//! # async fn run() -> lectio::Result<()> {
//! let gateway = Lectio::builder().gemini().key("Primary", "AIza-key").build()?;
//! let study = gateway
//!     .generate_study(&StudyRequest::new("Jean 3").rubrics([1, 6]))
//!     .await;
//! println!("{} sections from {}", study.rubrics_generated, study.source);
//! # Ok(())
//! # }
//! ```

pub mod cache;
pub mod config;
pub mod error;
pub mod fallback;
pub mod gateway;
pub mod history;
pub mod keys;
pub mod passage;
pub mod providers;
pub mod status;
pub mod study;
pub mod telemetry;
pub mod version;

// Re-export main types at crate root
pub use cache::{CacheConfig, CacheEntry, CacheEntrySummary, ContentCache};
pub use config::{Config, Secrets};
pub use error::{ErrorClass, LectioError, Result, classify};
pub use fallback::{FallbackContent, FallbackSource, FallbackVerse, VerseOrigin};
pub use gateway::{Generated, Lectio, LectioBuilder, Outcome, PrimaryKind, StudyGateway};
pub use history::{CallHistory, CallRecord, SourceStats};
pub use keys::{KeyPool, KeyRecord, KeySelection, PoolSnapshot, QuotaTracker};
pub use passage::{LengthBand, Passage, VerseRange, fingerprint};
pub use providers::{
    BibleApiClient, GeminiClient, GenerateProvider, OpenAiCompatClient, RetryConfig, VerseSource,
};
pub use status::{ApiEntry, ApiStatus, CacheStats, Health, HistoryView, KeyStatus};
pub use study::{StudyOutput, StudyRequest};
pub use version::{BuildInfo, PKG_VERSION, version_string};
