use std::fmt;

use serde::de::IgnoredAny;
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

/// Opaque identifier of a book record.
///
/// Ids travel as text. Servers that emit numeric ids are accepted on input and
/// normalized to their decimal text form, so the same id can be used as a DOM
/// attribute value without conversion.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct BookId(pub String);

impl BookId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for BookId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for BookId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for BookId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<u64> for BookId {
    fn from(value: u64) -> Self {
        Self(value.to_string())
    }
}

/// Any JSON value a loosely typed server may put in a text field.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawText {
    Text(String),
    Bool(bool),
    Unsigned(u64),
    Signed(i64),
    Float(f64),
    Missing(()),
    Other(IgnoredAny),
}

impl RawText {
    fn into_text(self) -> String {
        match self {
            RawText::Text(v) => v,
            RawText::Bool(v) => v.to_string(),
            RawText::Unsigned(v) => v.to_string(),
            RawText::Signed(v) => v.to_string(),
            RawText::Float(v) => v.to_string(),
            RawText::Missing(()) | RawText::Other(_) => String::new(),
        }
    }
}

/// Reads a scalar as text. `null`, arrays and objects become the empty string.
pub fn lenient_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    RawText::deserialize(deserializer).map(RawText::into_text)
}

impl<'de> Deserialize<'de> for BookId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        lenient_text(deserializer).map(Self)
    }
}

/// A catalog entry as served by `GET /books`.
///
/// No field is validated on the way in: absent or `null` fields deserialize to
/// empty values and render as empty content, and other scalars become text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Book {
    #[serde(default)]
    pub id: BookId,
    #[serde(default, deserialize_with = "lenient_text")]
    pub title: String,
    #[serde(default, deserialize_with = "lenient_text")]
    pub author: String,
}

impl Book {
    pub fn new(id: impl Into<BookId>, title: impl Into<String>, author: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            author: author.into(),
        }
    }
}
