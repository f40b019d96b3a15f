//! Archived post record as read from the export and stored in the deletion log.

use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One archived post. Identity is `tweet_id`; the record is never mutated after ingestion.
///
/// Columns beyond the three the cleaner needs are kept in `extra` so the deletion
/// log carries the full archive row, the same shape older logs already have.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PostRecord {
    #[serde(default, deserialize_with = "id_from_string_or_number")]
    pub tweet_id: String,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub timestamp: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl PostRecord {
    pub fn new(id: impl Into<String>, text: impl Into<String>, timestamp: impl Into<String>) -> Self {
        Self { tweet_id: id.into(), text: text.into(), timestamp: timestamp.into(), extra: Map::new() }
    }

    /// True when the id looks like a status id (digits only).
    pub fn has_numeric_id(&self) -> bool {
        is_numeric_id(&self.tweet_id)
    }
}

/// Status ids are unsigned: no sign, no fraction, digits only.
pub fn is_numeric_id(id: &str) -> bool {
    let s = id.trim();
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}

/// Archives and older logs carry ids either as JSON strings or as integers;
/// both normalize to the decimal string.
fn id_from_string_or_number<'de, D>(d: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(d)? {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        Value::Null => Ok(String::new()),
        other => Err(de::Error::custom(format!("expected string or integer id, got {}", other))),
    }
}
