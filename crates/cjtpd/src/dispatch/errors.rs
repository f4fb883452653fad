//! Failures while framing requests and writing responses.
//!
//! These cover the transport tier only. Grammar and routing failures are
//! ordinary [`Response`](super::Response) values, never errors.

use std::io;

use thiserror::Error;

/// Why a request line could not be answered normally.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// The line is empty or is not a JSON request envelope.
    #[error("malformed request: {reason}")]
    MalformedRequest {
        /// Client-facing explanation.
        reason: String,
        /// Decoder failure, if the line was not valid JSON for the envelope.
        #[source]
        source: Option<serde_json::Error>,
    },

    /// No newline within the line-length limit.
    #[error("request too large: {size} bytes exceeds {limit} byte limit")]
    RequestTooLarge {
        /// Bytes read before giving up.
        size: usize,
        /// Configured limit.
        limit: usize,
    },

    /// The socket failed.
    #[error("connection failed: {0}")]
    Io(#[from] io::Error),

    /// A response could not be encoded.
    #[error("cannot encode response: {0}")]
    Encode(#[source] serde_json::Error),
}

impl From<serde_json::Error> for DispatchError {
    fn from(source: serde_json::Error) -> Self {
        Self::MalformedRequest {
            reason: source.to_string(),
            source: Some(source),
        }
    }
}

impl DispatchError {
    /// A malformed request with a hand-written reason.
    pub fn malformed(reason: impl Into<String>) -> Self {
        Self::MalformedRequest {
            reason: reason.into(),
            source: None,
        }
    }

    pub fn request_too_large(size: usize, limit: usize) -> Self {
        Self::RequestTooLarge { size, limit }
    }

    /// Whether the connection may read another line after this error.
    pub fn keeps_connection(&self) -> bool {
        matches!(self, Self::MalformedRequest { .. })
    }
}

/// Reasons a well-formed create or update body still names no category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum BodyError {
    /// Body has no `name` member.
    #[error("Missing 'name' field in request body")]
    MissingName,
    /// `name` is the empty string.
    #[error("Name cannot be empty")]
    EmptyName,
}
