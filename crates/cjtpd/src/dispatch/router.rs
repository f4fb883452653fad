//! Method routing over the category store.
//!
//! The dispatcher takes a decoded request, applies the grammar checks, then
//! resolves the path and runs the matching store operation. It never fails:
//! every outcome, including bad input, is a [`Response`].

use tracing::debug;

use crate::store::{Category, CategoryId, CategoryStore};

use super::errors::BodyError;
use super::path::{PathParseResult, parse_path};
use super::request::{CrudBody, Method, Request};
use super::response::Response;
use super::validator::{self, Accepted, StoreOperation};

/// Tracing target for dispatch operations.
pub(crate) const DISPATCH_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::dispatch");

/// The only collection served.
pub const CATEGORIES_PATH: &str = "/api/categories";

/// Routes validated requests to store operations.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    store: CategoryStore,
}

impl Dispatcher {
    /// Creates a dispatcher over `store`.
    #[must_use]
    pub fn new(store: CategoryStore) -> Self {
        Self { store }
    }

    /// Store backing this dispatcher.
    #[must_use]
    pub fn store(&self) -> &CategoryStore {
        &self.store
    }

    /// Produces the response for one request.
    #[must_use]
    pub fn handle(&self, request: &Request) -> Response {
        let operation = match validator::check(request) {
            Ok(Accepted::Echo(text)) => return Response::ok(Some(text)),
            Ok(Accepted::Store(operation)) => operation,
            Err(violations) => {
                debug!(target: DISPATCH_TARGET, %violations, "request rejected");
                return Response::bad_request(violations.to_string());
            }
        };
        let method = operation.method();

        let Some(target) = parse_path(&request.path) else {
            return Response::bad_request("Invalid URL format");
        };
        if target.base_path != CATEGORIES_PATH {
            // `/api/categories/abc` names a member slot without a usable id.
            if matches!(method, Method::Update | Method::Delete)
                && is_member_slot(&target.base_path)
            {
                return missing_id(method);
            }
            debug!(
                target: DISPATCH_TARGET,
                base_path = %target.base_path,
                "unknown resource"
            );
            return Response::not_found();
        }

        debug!(
            target: DISPATCH_TARGET,
            %method,
            id = target.id,
            "dispatching request"
        );

        match operation {
            StoreOperation::Read => self.read(&target),
            StoreOperation::Create(body) => self.create(&target, body),
            StoreOperation::Update(body) => self.update(&target, body),
            StoreOperation::Delete => self.delete(&target),
        }
    }

    fn read(&self, target: &PathParseResult) -> Response {
        match target.id {
            Some(id) => match self.store.get(id) {
                Some(category) => Response::ok_data(&category),
                None => Response::not_found(),
            },
            None => Response::ok_data(&self.store.list()),
        }
    }

    fn create(&self, target: &PathParseResult, body: CrudBody) -> Response {
        if target.has_id() {
            return Response::bad_request("CREATE operation cannot have ID in URL");
        }
        let name = match category_name(body) {
            Ok(name) => name,
            Err(error) => return Response::bad_request(error.to_string()),
        };

        let created = self.store.with_table(|table| {
            let id = next_id(table.max_id());
            table
                .create(id, name.clone())
                .then(|| Category::new(id, name))
        });

        match created {
            Some(category) => {
                debug!(target: DISPATCH_TARGET, id = category.id, "category created");
                Response::ok_data(&category)
            }
            None => Response::bad_request("Failed to create category"),
        }
    }

    fn update(&self, target: &PathParseResult, body: CrudBody) -> Response {
        let Some(id) = target.id else {
            return missing_id(Method::Update);
        };
        let name = match category_name(body) {
            Ok(name) => name,
            Err(error) => return Response::bad_request(error.to_string()),
        };

        if self.store.update(id, name) {
            Response::updated()
        } else {
            Response::not_found()
        }
    }

    fn delete(&self, target: &PathParseResult) -> Response {
        let Some(id) = target.id else {
            return missing_id(Method::Delete);
        };

        if self.store.delete(id) {
            Response::ok(Some(String::new()))
        } else {
            Response::not_found()
        }
    }
}

fn is_member_slot(base_path: &str) -> bool {
    base_path
        .rsplit_once('/')
        .is_some_and(|(parent, _)| parent == CATEGORIES_PATH)
}

fn missing_id(method: Method) -> Response {
    let operation = method.to_string().to_uppercase();
    Response::bad_request(format!("{operation} operation requires ID in URL"))
}

fn next_id(max: Option<CategoryId>) -> CategoryId {
    max.map_or(1, |id| id.saturating_add(1))
}

fn category_name(body: CrudBody) -> Result<String, BodyError> {
    match body.name {
        None => Err(BodyError::MissingName),
        Some(name) if name.is_empty() => Err(BodyError::EmptyName),
        Some(name) => Ok(name),
    }
}

#[cfg(test)]
mod tests;
