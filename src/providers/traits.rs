//! Provider traits for the primary generator and the verse retrieval source.
//!
//! Both traits are object-safe and used behind `Arc<dyn ...>` by the
//! gateway, so tests can substitute mock implementations.

use async_trait::async_trait;

use crate::Result;

// ============================================================================
// Generate Provider
// ============================================================================

/// Rate-limited text generator called once per pooled key.
///
/// The key is passed per call: the gateway owns the key pool and decides
/// which credential each attempt uses.
#[async_trait]
pub trait GenerateProvider: Send + Sync {
    /// Provider name for logging/debugging.
    fn name(&self) -> &str;

    /// Single-turn generation. An empty string is a valid (soft-failed) result.
    async fn generate(&self, prompt: &str, api_key: &str) -> Result<String>;
}

// ============================================================================
// Verse Source
// ============================================================================

/// Secondary source of raw verse text.
#[async_trait]
pub trait VerseSource: Send + Sync {
    /// Provider name for logging/debugging.
    fn name(&self) -> &str;

    /// Plain text of one verse. `book_code` is the three-character API code
    /// (`GEN`, `JHN`, ...). Markup is already stripped.
    async fn fetch_verse(&self, book_code: &str, chapter: u32, verse: u32) -> Result<String>;
}
