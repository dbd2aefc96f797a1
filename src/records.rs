//! Flashcard records
//!
//! The generation service returns a JSON array of term/definition/importance
//! objects. Records are immutable once decoded.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::consts::{MAX_IMPORTANCE, MIN_IMPORTANCE};

/// One flashcard as produced by the generation service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlashcardRecord {
    pub term: String,
    pub definition: String,
    /// 1 (peripheral) to 10 (central to the topic)
    pub importance: f32,
}

impl FlashcardRecord {
    pub fn new(term: impl Into<String>, definition: impl Into<String>, importance: f32) -> Self {
        Self {
            term: term.into(),
            definition: definition.into(),
            importance,
        }
    }

    /// Clamp importance into [1, 10]; non-finite values become 1
    pub fn normalized(mut self) -> Self {
        if !self.importance.is_finite() {
            log::warn!("Non-finite importance for '{}', using {}", self.term, MIN_IMPORTANCE);
            self.importance = MIN_IMPORTANCE;
        } else if !(MIN_IMPORTANCE..=MAX_IMPORTANCE).contains(&self.importance) {
            let clamped = self.importance.clamp(MIN_IMPORTANCE, MAX_IMPORTANCE);
            log::warn!(
                "Importance {} for '{}' out of range, clamped to {}",
                self.importance,
                self.term,
                clamped
            );
            self.importance = clamped;
        }
        self
    }
}

/// Failure to turn generation output into records
#[derive(Debug, Error)]
pub enum RecordError {
    #[error("malformed flashcard JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("no flashcards were generated")]
    Empty,
}

static CODE_FENCE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)^```[a-zA-Z]*\s*(.*?)\s*```$").expect("valid code fence pattern")
});

static TRAILING_PARENTHETICAL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(.+?)\s*\((.+?)\)$").expect("valid parenthetical pattern"));

/// Decode a JSON array of records, tolerating a surrounding Markdown code fence
pub fn parse_records(text: &str) -> Result<Vec<FlashcardRecord>, RecordError> {
    let trimmed = text.trim();
    let body = CODE_FENCE
        .captures(trimmed)
        .and_then(|c| c.get(1))
        .map_or(trimmed, |m| m.as_str());

    let records: Vec<FlashcardRecord> = serde_json::from_str(body)?;
    if records.is_empty() {
        return Err(RecordError::Empty);
    }

    Ok(records.into_iter().map(FlashcardRecord::normalized).collect())
}

/// A term split into its main text and an optional translation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TermParts<'a> {
    pub main: &'a str,
    pub translation: Option<&'a str>,
}

/// Split `"한국어 (Korean)"` into `("한국어", Some("Korean"))`
pub fn format_term(term: &str) -> TermParts<'_> {
    match TRAILING_PARENTHETICAL.captures(term) {
        Some(caps) => {
            let main = caps.get(1).map_or(term, |m| m.as_str().trim());
            let translation = caps.get(2).map(|m| m.as_str().trim());
            TermParts { main, translation }
        }
        None => TermParts {
            main: term,
            translation: None,
        },
    }
}
