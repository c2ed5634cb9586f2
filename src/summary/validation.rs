// Request validation for the serving boundary.
//
// Mirrors the JSON contract of the summarization endpoint: a body with
// "text" and optional "numOfSents", "sentRatio", "useFirstSent". Numbers and
// booleans may also arrive as strings and are coerced. The summarization core
// itself does not validate; this runs before it.

use serde_json::{Map, Value};
use thiserror::Error;

use super::assembler::{SummaryParams, DEFAULT_SENT_RATIO};

/// Parameter names accepted in a request body.
pub const VALID_PARAMETERS: [&str; 4] = ["text", "numOfSents", "sentRatio", "useFirstSent"];

/// Shortest accepted input text, in characters.
pub const MIN_TEXT_CHARS: usize = 41;

pub const NUM_SENTENCES_RANGE: (i64, i64) = (1, 999);
pub const SENT_RATIO_RANGE: (f64, f64) = (0.05, 1.0);

/// A rejected request. The Display text is the client-facing message.
#[derive(Debug, Error, PartialEq)]
pub enum ValidationError {
    #[error("Malformed request body. Body of the request is empty.")]
    EmptyBody,

    #[error("Malformed request body. Body of the request must be a JSON object.")]
    NotAnObject,

    #[error("Malformed request body. Incorrect parameters provided. A set of correct parameters: \"text\", \"numOfSents\", \"sentRatio\", \"useFirstSent\".")]
    UnknownParameters,

    #[error("Malformed request body. Body of the request must contain a \"text\" parameter.")]
    MissingText,

    #[error("Malformed request body. The parameter \"text\" must have a string value.")]
    TextNotString,

    #[error("Malformed request body. The parameter \"numOfSents\" must have an integer value.")]
    NumOfSentsNotInteger,

    #[error("Malformed request body. The parameter \"sentRatio\" must have a float value.")]
    SentRatioNotFloat,

    #[error("Malformed request body. The parameter \"useFirstSent\" must have a boolean value.")]
    UseFirstSentNotBool,

    #[error("Malformed request body. The value of the \"text\" parameter is too short (below 41 characters).")]
    TextTooShort,

    #[error("Malformed request body. The value of the \"text\" parameter contains only one word.")]
    SingleWord,

    #[error("Malformed request body. The value of the \"numOfSents\" parameter is not in the [1 - 999] range.")]
    NumOfSentsOutOfRange,

    #[error("Malformed request body. The value of the \"sentRatio\" parameter is not in the [0.05 - 1.0] range.")]
    SentRatioOutOfRange,
}

/// A validated summarization request.
#[derive(Debug, Clone, PartialEq)]
pub struct SummaryRequest {
    pub text: String,
    pub num_sentences: Option<usize>,
    pub sent_ratio: f64,
    pub use_first_sent: bool,
}

impl SummaryRequest {
    /// Summary parameters for this request with the given length bounds.
    pub fn params(&self, min_length: usize, max_length: usize) -> SummaryParams {
        SummaryParams {
            sent_ratio: self.sent_ratio,
            num_sentences: self.num_sentences,
            min_length,
            max_length,
            use_first_sent: self.use_first_sent,
        }
    }
}

/// Validate a raw JSON request body: parameter names, types, then ranges.
pub fn validate_request(body: &Value) -> Result<SummaryRequest, ValidationError> {
    let map = match body {
        Value::Null => return Err(ValidationError::EmptyBody),
        Value::Object(map) if map.is_empty() => return Err(ValidationError::EmptyBody),
        Value::Object(map) => map,
        _ => return Err(ValidationError::NotAnObject),
    };

    if map.keys().any(|k| !VALID_PARAMETERS.contains(&k.as_str())) {
        return Err(ValidationError::UnknownParameters);
    }

    let text = match map.get("text") {
        None => return Err(ValidationError::MissingText),
        Some(Value::String(s)) => s.clone(),
        Some(_) => return Err(ValidationError::TextNotString),
    };

    let num_sentences = parse_num_sentences(map)?;
    let sent_ratio = parse_sent_ratio(map)?;
    let use_first_sent = parse_use_first_sent(map)?;

    validate_ranges(&text, num_sentences, sent_ratio)?;

    Ok(SummaryRequest {
        text,
        // In range [1, 999] after validate_ranges, so the cast is lossless.
        num_sentences: num_sentences.map(|n| n as usize),
        sent_ratio,
        use_first_sent,
    })
}

/// Range checks shared by the HTTP surface and the CLI.
pub fn validate_ranges(
    text: &str,
    num_sentences: Option<i64>,
    sent_ratio: f64,
) -> Result<(), ValidationError> {
    if text.chars().count() < MIN_TEXT_CHARS {
        return Err(ValidationError::TextTooShort);
    }

    if text.split_whitespace().count() < 2 {
        return Err(ValidationError::SingleWord);
    }

    if let Some(n) = num_sentences {
        if !(NUM_SENTENCES_RANGE.0..=NUM_SENTENCES_RANGE.1).contains(&n) {
            return Err(ValidationError::NumOfSentsOutOfRange);
        }
    }

    if !(SENT_RATIO_RANGE.0..=SENT_RATIO_RANGE.1).contains(&sent_ratio) {
        return Err(ValidationError::SentRatioOutOfRange);
    }

    Ok(())
}

fn parse_num_sentences(map: &Map<String, Value>) -> Result<Option<i64>, ValidationError> {
    match map.get("numOfSents") {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Number(n)) => n.as_i64().map(Some).ok_or(ValidationError::NumOfSentsNotInteger),
        Some(Value::String(s)) => s
            .trim()
            .parse::<i64>()
            .map(Some)
            .map_err(|_| ValidationError::NumOfSentsNotInteger),
        Some(_) => Err(ValidationError::NumOfSentsNotInteger),
    }
}

// JSON integers are rejected: the ratio must be written as a float ("1.0", not "1").
fn parse_sent_ratio(map: &Map<String, Value>) -> Result<f64, ValidationError> {
    match map.get("sentRatio") {
        None => Ok(DEFAULT_SENT_RATIO),
        Some(Value::Number(n)) if n.is_f64() => n.as_f64().ok_or(ValidationError::SentRatioNotFloat),
        Some(Value::String(s)) => s
            .trim()
            .parse::<f64>()
            .map_err(|_| ValidationError::SentRatioNotFloat),
        Some(_) => Err(ValidationError::SentRatioNotFloat),
    }
}

fn parse_use_first_sent(map: &Map<String, Value>) -> Result<bool, ValidationError> {
    match map.get("useFirstSent") {
        None => Ok(true),
        Some(Value::Bool(b)) => Ok(*b),
        Some(Value::String(s)) => match s.to_lowercase().as_str() {
            "true" => Ok(true),
            "false" => Ok(false),
            _ => Err(ValidationError::UseFirstSentNotBool),
        },
        Some(_) => Err(ValidationError::UseFirstSentNotBool),
    }
}
