//! Protocol grammar checks applied before any routing.
//!
//! Every rule is evaluated and every violation is reported, in a fixed order,
//! so a client learns all of its mistakes from a single response.

use std::fmt;

use thiserror::Error;
use time::OffsetDateTime;

use super::request::{CrudBody, Method, Request, RequestBody};
use super::response::Response;

/// A single grammar rule broken by a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Violation {
    #[error("missing method")]
    MissingMethod,
    #[error("illegal method")]
    IllegalMethod,
    #[error("missing path")]
    MissingPath,
    #[error("missing date")]
    MissingDate,
    #[error("illegal date")]
    IllegalDate,
    #[error("missing body")]
    MissingBody,
    #[error("illegal body")]
    IllegalBody,
}

/// Every violation found in a request, in reporting order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violations(Vec<Violation>);

impl Violations {
    /// Violations in reporting order.
    #[must_use]
    pub fn as_slice(&self) -> &[Violation] {
        &self.0
    }
}

impl fmt::Display for Violations {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, violation) in self.0.iter().enumerate() {
            if index > 0 {
                formatter.write_str(", ")?;
            }
            write!(formatter, "{violation}")?;
        }
        Ok(())
    }
}

impl std::error::Error for Violations {}

/// A request that satisfies the grammar, with its body already decoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Accepted {
    /// Echo with its text body.
    Echo(String),
    /// An operation on the category store.
    Store(StoreOperation),
}

/// Store-bound operations and the bodies they carry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreOperation {
    /// List the collection or fetch one member.
    Read,
    /// Insert under the next free id.
    Create(CrudBody),
    /// Rename the member named by the path.
    Update(CrudBody),
    /// Remove the member named by the path.
    Delete,
}

impl StoreOperation {
    /// Protocol method this operation came from.
    #[must_use]
    pub fn method(&self) -> Method {
        match self {
            Self::Read => Method::Read,
            Self::Create(_) => Method::Create,
            Self::Update(_) => Method::Update,
            Self::Delete => Method::Delete,
        }
    }
}

/// Checks `request` and returns the decoded operation when the grammar holds.
///
/// # Errors
///
/// Returns every broken rule when at least one check fails.
pub fn check(request: &Request) -> Result<Accepted, Violations> {
    let mut found = Vec::new();

    let method = if request.method.is_empty() {
        found.push(Violation::MissingMethod);
        None
    } else {
        let parsed = request.method();
        if parsed.is_none() {
            found.push(Violation::IllegalMethod);
        }
        parsed
    };

    if method != Some(Method::Echo) && request.path.is_empty() {
        found.push(Violation::MissingPath);
    }

    if request.date.is_missing() {
        found.push(Violation::MissingDate);
    } else if !request
        .date
        .seconds()
        .is_some_and(|seconds| OffsetDateTime::from_unix_timestamp(seconds).is_ok())
    {
        found.push(Violation::IllegalDate);
    }

    let accepted = method.and_then(|method| match accept_body(method, request.body.as_ref()) {
        Ok(accepted) => Some(accepted),
        Err(violation) => {
            found.push(violation);
            None
        }
    });

    match accepted {
        Some(accepted) if found.is_empty() => Ok(accepted),
        _ => Err(Violations(found)),
    }
}

/// Validates `request`, answering `1 Ok` or `4 Bad Request` with every tag.
#[must_use]
pub fn validate(request: &Request) -> Response {
    match check(request) {
        Ok(_) => Response::ok(None),
        Err(violations) => Response::bad_request(violations.to_string()),
    }
}

fn accept_body(method: Method, body: Option<&RequestBody>) -> Result<Accepted, Violation> {
    match method {
        Method::Read => Ok(Accepted::Store(StoreOperation::Read)),
        Method::Delete => Ok(Accepted::Store(StoreOperation::Delete)),
        Method::Echo => match body {
            None => Err(Violation::MissingBody),
            Some(RequestBody::Structured(_)) => Err(Violation::IllegalBody),
            Some(RequestBody::Text(text)) => Ok(Accepted::Echo(text.clone())),
        },
        Method::Create | Method::Update => {
            let body = body.ok_or(Violation::MissingBody)?;
            let crud = match CrudBody::parse(body.raw()) {
                Ok(CrudBody { id: Some(0), .. }) | Err(_) => return Err(Violation::IllegalBody),
                Ok(crud) => crud,
            };
            let operation = if method == Method::Create {
                StoreOperation::Create(crud)
            } else {
                StoreOperation::Update(crud)
            };
            Ok(Accepted::Store(operation))
        }
    }
}
