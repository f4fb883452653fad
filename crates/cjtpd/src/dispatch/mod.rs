//! JSONL request dispatch for the category protocol.
//!
//! Clients send one request envelope per line:
//!
//! ```json
//! {"method":"read","path":"/api/categories/1","date":1700000000,"body":null}
//! ```
//!
//! and receive one response envelope per line:
//!
//! ```json
//! {"status":"1 Ok","body":"{\"cid\":1,\"name\":\"Beverages\"}"}
//! ```
//!
//! ## Pipeline
//!
//! [`Request::parse`] decodes the line, [`validator`] checks the protocol
//! grammar, [`parse_path`] splits the resource path, and [`Dispatcher`]
//! applies the method to the [`CategoryStore`](crate::store::CategoryStore).
//! Grammar and routing failures are ordinary responses. Only framing faults
//! surface as [`DispatchError`].

mod errors;
mod handler;
mod path;
mod request;
mod response;
mod router;
pub mod validator;

pub use self::errors::{BodyError, DispatchError};
pub(crate) use self::handler::DispatchConnectionHandler;
#[cfg(test)]
pub(crate) use self::handler::MAX_REQUEST_BYTES;
pub use self::path::{PathParseResult, parse_path};
pub use self::request::{CrudBody, Method, Request, RequestBody, RequestDate};
pub use self::response::{Response, ResponseWriter, Status, StatusParseError};
pub use self::router::{CATEGORIES_PATH, Dispatcher};
pub use self::validator::{Accepted, StoreOperation, Violation, Violations, validate};
