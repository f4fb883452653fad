//! Response envelope, status vocabulary and JSONL writer.
//!
//! Every request line is answered with exactly one response line:
//!
//! ```json
//! {"status":"1 Ok","body":"[{\"cid\":1,\"name\":\"Beverages\"}]"}
//! ```

use std::fmt;
use std::io::Write;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

use super::errors::DispatchError;
use super::router::DISPATCH_TARGET;

/// Canonical response statuses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum Status {
    /// Request succeeded.
    Ok,
    /// Resource created. Reserved; create answers with [`Status::Ok`].
    Created,
    /// Resource updated.
    Updated,
    /// Request was rejected.
    BadRequest,
    /// Target resource does not exist.
    NotFound,
    /// Server-side failure outside the protocol grammar.
    Error,
}

impl Status {
    /// Numeric status code.
    #[must_use]
    pub fn code(self) -> u8 {
        match self {
            Self::Ok => 1,
            Self::Created => 2,
            Self::Updated => 3,
            Self::BadRequest => 4,
            Self::NotFound => 5,
            Self::Error => 6,
        }
    }

    /// Human-readable phrase.
    #[must_use]
    pub fn phrase(self) -> &'static str {
        match self {
            Self::Ok => "Ok",
            Self::Created => "Created",
            Self::Updated => "Updated",
            Self::BadRequest => "Bad Request",
            Self::NotFound => "Not Found",
            Self::Error => "Error",
        }
    }

    const ALL: [Self; 6] = [
        Self::Ok,
        Self::Created,
        Self::Updated,
        Self::BadRequest,
        Self::NotFound,
        Self::Error,
    ];
}

impl fmt::Display for Status {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "{} {}", self.code(), self.phrase())
    }
}

/// Error returned when status text is not one of the canonical pairs.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown status '{0}'")]
pub struct StatusParseError(String);

impl FromStr for Status {
    type Err = StatusParseError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.to_string() == input)
            .ok_or_else(|| StatusParseError(input.to_owned()))
    }
}

impl From<Status> for String {
    fn from(status: Status) -> Self {
        status.to_string()
    }
}

impl TryFrom<String> for Status {
    type Error = StatusParseError;

    fn try_from(value: String) -> Result<Self, StatusParseError> {
        value.parse()
    }
}

/// Response envelope sent for every request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Response {
    /// Outcome of the request.
    pub status: Status,
    /// Optional payload text.
    #[serde(default)]
    pub body: Option<String>,
}

impl Response {
    /// Builds a response from its parts.
    #[must_use]
    pub fn new(status: Status, body: Option<String>) -> Self {
        Self { status, body }
    }

    /// `1 Ok` with an optional payload.
    #[must_use]
    pub fn ok(body: Option<String>) -> Self {
        Self::new(Status::Ok, body)
    }

    /// `1 Ok` carrying `value` serialized as JSON.
    ///
    /// Serialization failure degrades to a `4 Bad Request` response.
    #[must_use]
    pub fn ok_data<T: Serialize + ?Sized>(value: &T) -> Self {
        match serde_json::to_string(value) {
            Ok(json) => Self::ok(Some(json)),
            Err(error) => {
                warn!(target: DISPATCH_TARGET, %error, "failed to serialize response data");
                Self::bad_request("JSON serialization error")
            }
        }
    }

    /// `4 Bad Request` with a reason.
    #[must_use]
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(Status::BadRequest, Some(message.into()))
    }

    /// `5 Not Found` without a body.
    #[must_use]
    pub fn not_found() -> Self {
        Self::new(Status::NotFound, None)
    }

    /// `3 Updated` without a body.
    #[must_use]
    pub fn updated() -> Self {
        Self::new(Status::Updated, None)
    }

    /// `6 Error` with a reason. Used for transport faults only.
    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self::new(Status::Error, Some(message.into()))
    }

    /// Returns `true` for `1 Ok`.
    #[must_use]
    pub fn is_ok(&self) -> bool {
        self.status == Status::Ok
    }

    /// Encodes the response as a single JSON object.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::Encode`] if encoding fails.
    pub fn to_json(&self) -> Result<String, DispatchError> {
        serde_json::to_string(self).map_err(DispatchError::Encode)
    }

    /// Decodes a response previously produced by [`Response::to_json`].
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::MalformedRequest`] when the text is not a
    /// response envelope.
    pub fn from_json(text: &str) -> Result<Self, DispatchError> {
        serde_json::from_str(text.trim_end()).map_err(DispatchError::from)
    }
}

/// Writer that serializes responses to a stream.
///
/// Each response becomes one line and the stream is flushed after it.
pub struct ResponseWriter<W> {
    writer: W,
}

impl<W: Write> ResponseWriter<W> {
    /// Creates a new response writer wrapping the given output stream.
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    /// Writes a response as a JSONL line and flushes.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization, writing or flushing fails.
    pub fn write_response(&mut self, response: &Response) -> Result<(), DispatchError> {
        serde_json::to_writer(&mut self.writer, response)
            .map_err(DispatchError::Encode)?;
        self.writer.write_all(b"\n")?;
        self.writer.flush()?;
        Ok(())
    }

    /// Writes the response matching a framing error.
    ///
    /// Malformed envelopes become `4 Bad Request`; everything else becomes
    /// `6 Error`.
    ///
    /// # Errors
    ///
    /// Returns an error if writing fails.
    pub fn write_error(&mut self, error: &DispatchError) -> Result<(), DispatchError> {
        let response = if error.keeps_connection() {
            Response::bad_request(error.to_string())
        } else {
            Response::error(error.to_string())
        };
        self.write_response(&response)
    }
}
