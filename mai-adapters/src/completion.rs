//! Normalization of model output into JSON.

use serde::ser::{Serialize, SerializeMap, Serializer};
use serde_json::{Value, json};

/// Tag placed in the `error` field of a degraded completion.
pub const NON_JSON_ERROR: &str = "non-JSON response";

/// Outcome of a successful invocation.
#[derive(Clone, Debug, PartialEq)]
pub enum Completion {
    /// The content, or a brace-delimited span of it, parsed as JSON.
    Json(Value),
    /// The model answered but no JSON could be recovered.
    NonJson {
        /// The content exactly as returned.
        raw_content: String,
    },
}

impl Completion {
    /// Interprets message content.
    ///
    /// Tries a strict parse first, then the span from the first `{` to the last
    /// `}`, and otherwise keeps the raw text.
    #[must_use]
    pub fn from_content(content: String) -> Self {
        if let Ok(value) = serde_json::from_str::<Value>(&content) {
            return Self::Json(value);
        }

        if let Some(value) = brace_span(&content).and_then(|span| serde_json::from_str(span).ok())
        {
            tracing::debug!("recovered JSON object from surrounding text");
            return Self::Json(value);
        }

        Self::NonJson {
            raw_content: content,
        }
    }

    /// Returns `true` when the content could not be interpreted as JSON.
    #[must_use]
    pub const fn is_degraded(&self) -> bool {
        matches!(self, Self::NonJson { .. })
    }

    /// Returns the parsed JSON, if any.
    #[must_use]
    pub const fn as_json(&self) -> Option<&Value> {
        match self {
            Self::Json(value) => Some(value),
            Self::NonJson { .. } => None,
        }
    }

    /// Converts into a JSON value; degraded results become
    /// `{"error": "non-JSON response", "raw_content": ...}`.
    #[must_use]
    pub fn into_value(self) -> Value {
        match self {
            Self::Json(value) => value,
            Self::NonJson { raw_content } => json!({
                "error": NON_JSON_ERROR,
                "raw_content": raw_content,
            }),
        }
    }
}

impl Serialize for Completion {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Json(value) => value.serialize(serializer),
            Self::NonJson { raw_content } => {
                let mut map = serializer.serialize_map(Some(2))?;
                map.serialize_entry("error", NON_JSON_ERROR)?;
                map.serialize_entry("raw_content", raw_content)?;
                map.end()
            }
        }
    }
}

fn brace_span(content: &str) -> Option<&str> {
    let start = content.find('{')?;
    let end = content.rfind('}')?;
    (end > start).then(|| &content[start..=end])
}
