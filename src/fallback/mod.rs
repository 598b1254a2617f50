//! Fallback content source.
//!
//! When the primary generator is unavailable, [`FallbackSource`] assembles
//! per-verse content from three tiers, tried in order for every verse:
//!
//! 1. the retrieval provider ([`VerseSource`], typically api.bible),
//! 2. the built-in table of known verses,
//! 3. a generic placeholder line.
//!
//! Retrieval errors never surface; they are logged and counted, and the
//! verse degrades to the next tier. Commentary is templated per book.

pub mod templates;
pub mod verses;

use std::sync::Arc;

use parking_lot::Mutex;
use serde::Serialize;
use tracing::{debug, instrument, warn};

use crate::history::SourceStats;
use crate::passage::{LengthBand, Passage};
use crate::providers::VerseSource;
use crate::{LectioError, Result};

/// Number of verses quoted in a study section.
const SECTION_VERSES: u32 = 5;

/// Where a verse's text came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum VerseOrigin {
    Retrieval,
    KnownText,
    Generic,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FallbackVerse {
    /// 1-based display position within the composition.
    pub number: usize,
    pub reference: String,
    /// Verse number within the chapter.
    pub actual_verse: u32,
    pub text: String,
    pub origin: VerseOrigin,
}

/// Verses composed for a passage, ready to render.
#[derive(Debug, Clone, Serialize)]
pub struct FallbackContent {
    pub passage: Passage,
    pub band: LengthBand,
    pub verses: Vec<FallbackVerse>,
    /// "Bible API" when any verse was retrieved, otherwise "static".
    pub source: String,
}

impl FallbackContent {
    /// Render as `**VERSET n**` blocks with templated commentary.
    pub fn render(&self) -> String {
        let template = templates::book_template(&self.passage.book);
        self.verses
            .iter()
            .map(|v| {
                let commentary = templates::verse_commentary(
                    &self.passage.book,
                    template.theme(v.number),
                    self.band,
                );
                format!(
                    "**VERSET {}**\n\n**TEXTE BIBLIQUE :**\n{}\n\n**EXPLICATION THÉOLOGIQUE :**\n{}",
                    v.number, v.text, commentary
                )
            })
            .collect::<Vec<_>>()
            .join("\n\n")
    }
}

/// Secondary content source backed by an optional verse retrieval provider.
pub struct FallbackSource {
    source: Option<Arc<dyn VerseSource>>,
    stats: Mutex<SourceStats>,
}

impl FallbackSource {
    pub fn new(source: Option<Arc<dyn VerseSource>>) -> Self {
        Self {
            source,
            stats: Mutex::new(SourceStats::default()),
        }
    }

    /// Whether a retrieval provider is configured.
    pub fn is_configured(&self) -> bool {
        self.source.is_some()
    }

    pub fn stats(&self) -> SourceStats {
        self.stats.lock().clone()
    }

    /// Compose fallback verses for `passage`.
    ///
    /// Fails only when no retrieval provider is configured.
    #[instrument(skip_all, fields(passage = %passage, band = ?band))]
    pub async fn compose(&self, passage: &Passage, band: LengthBand) -> Result<FallbackContent> {
        if self.source.is_none() {
            return Err(LectioError::NoProvider);
        }

        let mut verses = Vec::new();
        for (i, verse) in passage.verses_to_cover(band).into_iter().enumerate() {
            let (text, origin) = self.verse_text(&passage.book, passage.chapter, verse).await;
            verses.push(FallbackVerse {
                number: i + 1,
                reference: passage.verse_reference(verse),
                actual_verse: verse,
                text,
                origin,
            });
        }

        let retrieved = verses.iter().any(|v| v.origin == VerseOrigin::Retrieval);
        Ok(FallbackContent {
            passage: passage.clone(),
            band,
            verses,
            source: if retrieved { "Bible API" } else { "static" }.to_string(),
        })
    }

    /// Build a study section body for one rubric.
    ///
    /// Quotes up to five verses of the passage (retrieved or known text)
    /// and wraps them in the rubric's template. Never fails.
    #[instrument(skip_all, fields(passage = %passage, rubric = rubric_title))]
    pub async fn theological_section(&self, passage: &Passage, rubric_title: &str) -> String {
        let numbers: Vec<u32> = match passage.verses {
            Some(range) => (range.start..=range.end)
                .take(SECTION_VERSES as usize)
                .collect(),
            None => (1..=SECTION_VERSES).collect(),
        };

        let mut lines = Vec::new();
        for verse in numbers {
            let (text, origin) = self.verse_text(&passage.book, passage.chapter, verse).await;
            if origin != VerseOrigin::Generic {
                lines.push(format!("{verse}. {text}"));
            }
        }
        let text = if lines.is_empty() {
            format!("Texte de {passage}")
        } else {
            lines.join("\n")
        };

        templates::rubric_analysis(rubric_title, &passage.to_string(), &text)
    }

    /// Text for one verse, falling through retrieval, known text, generic.
    async fn verse_text(&self, book: &str, chapter: u32, verse: u32) -> (String, VerseOrigin) {
        if let (Some(source), Some(code)) = (&self.source, verses::book_code(book)) {
            match source.fetch_verse(code, chapter, verse).await {
                Ok(text) if !text.trim().is_empty() => {
                    self.stats.lock().record(true);
                    return (text, VerseOrigin::Retrieval);
                }
                Ok(_) => {
                    self.stats.lock().record(false);
                    debug!(book, chapter, verse, "retrieval returned empty text");
                }
                Err(e) => {
                    self.stats.lock().record(false);
                    warn!(book, chapter, verse, error = %e, "verse retrieval failed");
                }
            }
        }

        match verses::known_verse(book, chapter, verse) {
            Some(text) => (text.to_string(), VerseOrigin::KnownText),
            None => (
                verses::generic_verse(book, chapter, verse),
                VerseOrigin::Generic,
            ),
        }
    }
}
