//! Recovery of structured values from free-text model output.
//!
//! Models asked to answer with JSON routinely wrap it in prose ("Here is the
//! JSON you requested: ..."). The recovery strategy is to slice from the
//! first opening delimiter of the expected shape to the last closing one and
//! parse that substring strictly. Anything that does not parse resolves to
//! the caller's fallback value, never to an error.
//!
//! Known limitation: if the model emits a stray closing delimiter in prose
//! after the real JSON, the slice captures too much and the strict parse
//! fails, so the operation degrades to its fallback. Bracket-balanced
//! scanning would trade that failure mode for worse ones (braces inside
//! string literals), so it is deliberately not attempted.

use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;

/// Whether a model response is expected to contain a JSON object or array.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    Object,
    Array,
}

impl Shape {
    fn delimiters(self) -> (char, char) {
        match self {
            Shape::Object => ('{', '}'),
            Shape::Array => ('[', ']'),
        }
    }
}

/// Extract and parse the JSON value of the expected shape from raw text.
///
/// Returns `None` when either delimiter is absent, the delimiters are
/// inverted, or the enclosed substring is not valid JSON.
pub fn recover(text: &str, shape: Shape) -> Option<Value> {
    let (open, close) = shape.delimiters();

    let start = text.find(open)?;
    let end = text.rfind(close)?;
    if end < start {
        return None;
    }

    match serde_json::from_str(&text[start..=end]) {
        Ok(value) => Some(value),
        Err(err) => {
            debug!("Recovered slice did not parse as JSON: {}", err);
            None
        }
    }
}

/// Typed variant of [`recover`]: the parsed value must also deserialize
/// into `T`, otherwise the attempt counts as a failure.
pub fn recover_as<T: DeserializeOwned>(text: &str, shape: Shape) -> Option<T> {
    recover(text, shape).and_then(|value| serde_json::from_value(value).ok())
}

/// Resolve raw model output to exactly one of {parsed value, fallback}.
pub fn recover_or<T: DeserializeOwned>(text: &str, shape: Shape, fallback: T) -> T {
    recover_as(text, shape).unwrap_or(fallback)
}
