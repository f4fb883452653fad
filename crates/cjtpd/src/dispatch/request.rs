//! Request envelope model and wire decoding.
//!
//! Each request line is a JSON object:
//!
//! ```json
//! {"method":"create","path":"/api/categories","date":1700000000,"body":"{\"name\":\"Seafood\"}"}
//! ```
//!
//! Decoding is lenient about absent members so that the validator, not the
//! decoder, reports what is missing: absent or `null` strings become empty,
//! an absent `date` becomes `0`, and an absent `body` becomes `None`. A
//! `date` sent as text is kept as text so the validator can call it illegal
//! alongside any other violation.

use serde::de::{self, Deserializer};
use serde::ser::{self, Serializer};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use strum::{Display, EnumString};

use crate::store::CategoryId;

use super::errors::DispatchError;

/// Operations understood by the protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumString, Display)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Method {
    /// Insert a new category.
    Create,
    /// Fetch one category or list them all.
    Read,
    /// Rename an existing category.
    Update,
    /// Remove a category.
    Delete,
    /// Return the body unchanged.
    Echo,
}

impl Method {
    /// Parses a method name, ignoring ASCII case.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        value.parse().ok()
    }
}

/// Request body as raw text.
///
/// The body is always carried as text. `Structured` records that the
/// envelope held a JSON object, array, number or boolean rather than a JSON
/// string; its text is the compact JSON rendering of that value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestBody {
    /// Body sent as a JSON string.
    Text(String),
    /// Body sent as any other JSON value.
    Structured(String),
}

impl RequestBody {
    /// Raw body text, regardless of how it was sent.
    #[must_use]
    pub fn raw(&self) -> &str {
        match self {
            Self::Text(text) | Self::Structured(text) => text,
        }
    }

    /// Body text when it was sent as a plain JSON string.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            Self::Structured(_) => None,
        }
    }
}

impl<'de> Deserialize<'de> for RequestBody {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Value::deserialize(deserializer)? {
            Value::String(text) => Ok(Self::Text(text)),
            Value::Null => Err(de::Error::custom("null body")),
            other => Ok(Self::Structured(other.to_string())),
        }
    }
}

impl Serialize for RequestBody {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Self::Text(text) => serializer.serialize_str(text),
            Self::Structured(raw) => serde_json::from_str::<Value>(raw)
                .map_err(ser::Error::custom)?
                .serialize(serializer),
        }
    }
}

/// Request timestamp as sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestDate {
    /// Unix seconds; `0` stands for an absent date.
    Seconds(i64),
    /// A value that is not an integer, kept verbatim.
    Unparsed(String),
}

impl RequestDate {
    /// Unix seconds, when the date was sent as an integer or integer text.
    #[must_use]
    pub fn seconds(&self) -> Option<i64> {
        match self {
            Self::Seconds(seconds) => Some(*seconds),
            Self::Unparsed(_) => None,
        }
    }

    /// Returns `true` for the absent-date sentinel.
    #[must_use]
    pub fn is_missing(&self) -> bool {
        matches!(self, Self::Seconds(0))
    }
}

impl Default for RequestDate {
    fn default() -> Self {
        Self::Seconds(0)
    }
}

impl From<i64> for RequestDate {
    fn from(seconds: i64) -> Self {
        Self::Seconds(seconds)
    }
}

impl<'de> Deserialize<'de> for RequestDate {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(match Value::deserialize(deserializer)? {
            Value::Null => Self::default(),
            Value::Number(number) => number
                .as_i64()
                .map_or_else(|| Self::Unparsed(number.to_string()), Self::Seconds),
            Value::String(text) if text.trim().is_empty() => Self::default(),
            Value::String(text) => text
                .trim()
                .parse()
                .map_or(Self::Unparsed(text), Self::Seconds),
            other => Self::Unparsed(other.to_string()),
        })
    }
}

impl Serialize for RequestDate {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Self::Seconds(seconds) => serializer.serialize_i64(*seconds),
            Self::Unparsed(text) => serializer.serialize_str(text),
        }
    }
}

/// Decoded request envelope.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct Request {
    /// Method name as sent; empty when absent.
    #[serde(default, deserialize_with = "null_as_default")]
    pub method: String,
    /// Resource path as sent; empty when absent.
    #[serde(default, deserialize_with = "null_as_default")]
    pub path: String,
    /// Timestamp; `Seconds(0)` when absent.
    #[serde(default)]
    pub date: RequestDate,
    /// Optional body text.
    #[serde(default)]
    pub body: Option<RequestBody>,
}

impl Request {
    /// Creates a request without a body.
    #[must_use]
    pub fn new(method: impl Into<String>, path: impl Into<String>, date: i64) -> Self {
        Self {
            method: method.into(),
            path: path.into(),
            date: RequestDate::Seconds(date),
            body: None,
        }
    }

    /// Attaches a body sent as a JSON string.
    #[must_use]
    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(RequestBody::Text(body.into()));
        self
    }

    /// Parses one request line.
    ///
    /// Trailing whitespace, including the newline delimiter, is ignored.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::MalformedRequest`] when the line is empty or
    /// is not a JSON object matching the envelope.
    pub fn parse(line: &[u8]) -> Result<Self, DispatchError> {
        let trimmed = line.trim_ascii_end();
        if trimmed.is_empty() {
            return Err(DispatchError::malformed("empty request line"));
        }
        serde_json::from_slice(trimmed).map_err(DispatchError::from)
    }

    /// Method parsed from the envelope, if it names a known operation.
    #[must_use]
    pub fn method(&self) -> Option<Method> {
        Method::parse(&self.method)
    }
}

/// Typed shape of create and update bodies.
///
/// Unknown members are ignored. `id` is checked for well-formedness but
/// never selects the target category; the URL does that.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct CrudBody {
    /// Identifier echoed by clients.
    #[serde(default)]
    pub id: Option<CategoryId>,
    /// New category name.
    #[serde(default)]
    pub name: Option<String>,
}

impl CrudBody {
    /// Parses body text as a JSON object.
    ///
    /// Arrays are refused even though serde would map them positionally
    /// onto the fields.
    ///
    /// # Errors
    ///
    /// Returns the decoding error when the text is not an object whose `id`
    /// is an unsigned integer and whose `name` is a string.
    pub fn parse(raw: &str) -> Result<Self, serde_json::Error> {
        match serde_json::from_str(raw)? {
            object @ Value::Object(_) => Self::deserialize(object),
            other => Err(de::Error::invalid_type(unexpected(&other), &"a JSON object")),
        }
    }
}

fn unexpected(value: &Value) -> de::Unexpected<'_> {
    match value {
        Value::Null => de::Unexpected::Unit,
        Value::Bool(flag) => de::Unexpected::Bool(*flag),
        Value::Number(_) => de::Unexpected::Other("number"),
        Value::String(text) => de::Unexpected::Str(text),
        Value::Array(_) => de::Unexpected::Seq,
        Value::Object(_) => de::Unexpected::Map,
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
