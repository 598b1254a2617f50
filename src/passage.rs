//! Passage descriptors, target-length bands and request fingerprints.

use std::fmt;

use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::{LectioError, Result};

/// Maximum number of verses covered by a single generation.
pub const MAX_VERSES: usize = 5;

/// Inclusive verse range within a chapter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct VerseRange {
    pub start: u32,
    pub end: u32,
}

impl VerseRange {
    pub fn single(verse: u32) -> Self {
        Self {
            start: verse,
            end: verse,
        }
    }
}

/// A parsed passage reference such as `Genèse 1:6-10` or `2 Rois 1`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Passage {
    pub book: String,
    pub chapter: u32,
    pub verses: Option<VerseRange>,
}

impl Passage {
    /// Parse a French passage reference.
    ///
    /// A leading numeric token is part of the book name (`1 Samuel`,
    /// `2 Rois`). A missing chapter defaults to 1.
    pub fn parse(input: &str) -> Result<Self> {
        let tokens: Vec<&str> = input.split_whitespace().collect();
        if tokens.is_empty() {
            return Err(LectioError::InvalidPassage("empty passage".into()));
        }

        let numbered_book =
            tokens.len() >= 2 && tokens[0].chars().all(|c| c.is_ascii_digit());
        let (book, rest) = if numbered_book {
            (format!("{} {}", tokens[0], tokens[1]), &tokens[2..])
        } else {
            (tokens[0].to_string(), &tokens[1..])
        };

        let Some(reference) = rest.first() else {
            return Ok(Self {
                book,
                chapter: 1,
                verses: None,
            });
        };

        let (chapter, verses) = match reference.split_once(':') {
            Some((chapter, verses)) => (chapter, Some(parse_range(input, verses)?)),
            None => (*reference, None),
        };
        let chapter = parse_number(input, chapter)?;

        Ok(Self {
            book,
            chapter,
            verses,
        })
    }

    /// Verse numbers to cover for the given band, capped at [`MAX_VERSES`].
    pub fn verses_to_cover(&self, band: LengthBand) -> Vec<u32> {
        match self.verses {
            Some(range) => (range.start..=range.end).take(MAX_VERSES).collect(),
            None => (1..=band.verse_count().min(MAX_VERSES) as u32).collect(),
        }
    }

    /// `Book chapter:verse` reference for a single verse of this passage.
    pub fn verse_reference(&self, verse: u32) -> String {
        format!("{} {}:{}", self.book, self.chapter, verse)
    }
}

impl fmt::Display for Passage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.book, self.chapter)?;
        match self.verses {
            Some(r) if r.start == r.end => write!(f, ":{}", r.start),
            Some(r) => write!(f, ":{}-{}", r.start, r.end),
            None => Ok(()),
        }
    }
}

fn parse_number(input: &str, s: &str) -> Result<u32> {
    s.trim()
        .parse()
        .map_err(|_| LectioError::InvalidPassage(format!("{input}: '{s}' is not a number")))
}

fn parse_range(input: &str, s: &str) -> Result<VerseRange> {
    let range = match s.split_once('-') {
        Some((start, end)) => VerseRange {
            start: parse_number(input, start)?,
            end: parse_number(input, end)?,
        },
        None => VerseRange::single(parse_number(input, s)?),
    };
    if range.start == 0 || range.end < range.start {
        return Err(LectioError::InvalidPassage(format!(
            "{input}: invalid verse range"
        )));
    }
    Ok(range)
}

/// Target-length band derived from the requested content length.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LengthBand {
    Concise,
    Developed,
    InDepth,
}

impl LengthBand {
    pub fn from_target(target_length: u32) -> Self {
        match target_length {
            0..=500 => LengthBand::Concise,
            501..=1500 => LengthBand::Developed,
            _ => LengthBand::InDepth,
        }
    }

    /// Number of verses a chapter-level request covers in this band.
    pub fn verse_count(self) -> usize {
        match self {
            LengthBand::Concise => 3,
            LengthBand::Developed => 5,
            LengthBand::InDepth => 7,
        }
    }

    /// Adjective used in templated commentary.
    pub fn label(self) -> &'static str {
        match self {
            LengthBand::Concise => "concis",
            LengthBand::Developed => "développé",
            LengthBand::InDepth => "approfondi",
        }
    }
}

/// Stable cache key for a generation request.
///
/// SHA-256 over `{passage}_{target_length}_{use_primary}`, hex-encoded.
/// Stable across processes and toolchains.
pub fn fingerprint(passage: &str, target_length: u32, use_primary: bool) -> String {
    let mut hasher = Sha256::new();
    hasher.update(format!("{}_{}_{}", passage.trim(), target_length, use_primary));
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_chapter_only() {
        let p = Passage::parse("Genèse 1").unwrap();
        assert_eq!(p.book, "Genèse");
        assert_eq!(p.chapter, 1);
        assert!(p.verses.is_none());
    }

    #[test]
    fn parse_single_verse() {
        let p = Passage::parse("Jean 3:16").unwrap();
        assert_eq!(p.chapter, 3);
        assert_eq!(p.verses, Some(VerseRange::single(16)));
        assert_eq!(p.to_string(), "Jean 3:16");
    }

    #[test]
    fn parse_verse_range() {
        let p = Passage::parse("  Genèse 1:6-10 ").unwrap();
        assert_eq!(p.verses, Some(VerseRange { start: 6, end: 10 }));
        assert_eq!(p.to_string(), "Genèse 1:6-10");
    }

    #[test]
    fn parse_numbered_book() {
        let p = Passage::parse("2 Rois 4").unwrap();
        assert_eq!(p.book, "2 Rois");
        assert_eq!(p.chapter, 4);

        let p = Passage::parse("1 Samuel").unwrap();
        assert_eq!(p.book, "1 Samuel");
        assert_eq!(p.chapter, 1);
    }

    #[test]
    fn parse_book_without_chapter_defaults_to_one() {
        let p = Passage::parse("Ruth").unwrap();
        assert_eq!(p.chapter, 1);
    }

    #[test]
    fn parse_rejects_garbage() {
        assert!(Passage::parse("   ").is_err());
        assert!(Passage::parse("Genèse un").is_err());
        assert!(Passage::parse("Genèse 1:10-6").is_err());
        assert!(Passage::parse("Genèse 1:x").is_err());
    }

    #[test]
    fn bands_follow_target_length() {
        assert_eq!(LengthBand::from_target(500), LengthBand::Concise);
        assert_eq!(LengthBand::from_target(501), LengthBand::Developed);
        assert_eq!(LengthBand::from_target(1500), LengthBand::Developed);
        assert_eq!(LengthBand::from_target(2500), LengthBand::InDepth);
    }

    #[test]
    fn verses_to_cover_is_capped() {
        let chapter = Passage::parse("Genèse 1").unwrap();
        assert_eq!(chapter.verses_to_cover(LengthBand::Concise), vec![1, 2, 3]);
        assert_eq!(chapter.verses_to_cover(LengthBand::InDepth), vec![1, 2, 3, 4, 5]);

        let range = Passage::parse("Genèse 1:6-20").unwrap();
        assert_eq!(range.verses_to_cover(LengthBand::Concise), vec![6, 7, 8, 9, 10]);
    }

    #[test]
    fn fingerprint_is_deterministic() {
        let a = fingerprint("Genèse 1", 500, true);
        let b = fingerprint("Genèse 1", 500, true);
        assert_eq!(a, b);
        assert_eq!(a.len(), 64);
    }

    #[test]
    fn fingerprint_differs_on_length_and_flag() {
        let base = fingerprint("Genèse 1", 500, true);
        assert_ne!(base, fingerprint("Genèse 1", 1500, true));
        assert_ne!(base, fingerprint("Genèse 1", 500, false));
        assert_ne!(base, fingerprint("Genèse 2", 500, true));
    }
}
