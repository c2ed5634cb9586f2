// Punctuation-driven sentence splitter.
//
// A sentence ends at a run of terminal punctuation, optionally followed by
// closing quotes or brackets, followed by whitespace. Whatever trails the last
// boundary is kept as a final sentence. No abbreviation handling: "Dr. Who"
// splits after "Dr.".

use anyhow::Result;
use regex_lite::Regex;
use tracing::debug;

use super::traits::{within_bounds, SentenceSegmenter};

/// Terminal punctuation, optional closing quotes or brackets, then whitespace.
pub const BOUNDARY_PATTERN: &str = r#"[.!?…]+["'”’)\]]*\s+"#;

/// Rule-based sentencizer for English-like text.
pub struct RuleSegmenter {
    boundary: Regex,
}

impl RuleSegmenter {
    /// Segmenter using the default boundary rule.
    ///
    /// # Errors
    /// Returns an error if the boundary pattern fails to compile.
    pub fn new() -> Result<Self, regex_lite::Error> {
        Self::with_pattern(BOUNDARY_PATTERN)
    }

    /// Segmenter splitting after every match of `pattern`.
    ///
    /// # Errors
    /// Returns an error if `pattern` is not a valid regex.
    pub fn with_pattern(pattern: &str) -> Result<Self, regex_lite::Error> {
        Ok(Self {
            boundary: Regex::new(pattern)?,
        })
    }

    /// Split `text` into trimmed, non-empty sentences without length filtering.
    pub fn split<'a>(&self, text: &'a str) -> Vec<&'a str> {
        let mut sentences = Vec::new();
        let mut start = 0;

        for m in self.boundary.find_iter(text) {
            let sentence = text[start..m.end()].trim();
            if !sentence.is_empty() {
                sentences.push(sentence);
            }
            start = m.end();
        }

        let tail = text[start..].trim();
        if !tail.is_empty() {
            sentences.push(tail);
        }

        sentences
    }
}

impl SentenceSegmenter for RuleSegmenter {
    fn segment(&self, text: &str, min_length: usize, max_length: usize) -> Result<Vec<String>> {
        let all = self.split(text);
        let total = all.len();

        let kept: Vec<String> = all
            .into_iter()
            .filter(|s| within_bounds(s, min_length, max_length))
            .map(str::to_string)
            .collect();

        debug!(total, kept = kept.len(), min_length, max_length, "Segmented text");

        Ok(kept)
    }
}
