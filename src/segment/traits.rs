// Sentence segmenter trait.

use anyhow::Result;

/// Default lower bound (exclusive) on kept sentence length, in characters.
pub const DEFAULT_MIN_LENGTH: usize = 40;

/// Default upper bound (exclusive) on kept sentence length, in characters.
pub const DEFAULT_MAX_LENGTH: usize = 600;

/// Splits text into trimmed sentences, in document order.
pub trait SentenceSegmenter: Send + Sync {
    /// Return the sentences of `text` whose trimmed character length `len`
    /// satisfies `min_length < len < max_length`.
    fn segment(&self, text: &str, min_length: usize, max_length: usize) -> Result<Vec<String>>;
}

/// Length filter shared by segmenter implementations. Bounds are exclusive
/// and length is counted in characters, not bytes.
pub fn within_bounds(sentence: &str, min_length: usize, max_length: usize) -> bool {
    let len = sentence.chars().count();
    min_length < len && len < max_length
}
