//! Request path decomposition.
//!
//! A path such as `/api/categories/7` splits into the base path
//! `/api/categories` and the trailing identifier `7`. Only segments made
//! entirely of ASCII digits count as identifiers; `/api/categories/abc` and
//! `/api/categories/-1` have no identifier.

use crate::store::CategoryId;

/// Base path plus optional trailing identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathParseResult {
    /// Path with any trailing identifier removed, always starting with `/`.
    pub base_path: String,
    /// Trailing identifier, when the last segment was numeric.
    pub id: Option<CategoryId>,
}

impl PathParseResult {
    /// Returns `true` when the path ended in a numeric segment.
    #[must_use]
    pub fn has_id(&self) -> bool {
        self.id.is_some()
    }
}

/// Splits `path` into a base path and an optional trailing id.
///
/// Returns `None` for empty or whitespace-only input. Repeated slashes are
/// collapsed, and leading or trailing slashes are ignored.
#[must_use]
pub fn parse_path(path: &str) -> Option<PathParseResult> {
    if path.trim().is_empty() {
        return None;
    }

    let mut segments: Vec<&str> = path
        .trim_matches('/')
        .split('/')
        .filter(|segment| !segment.is_empty())
        .collect();

    let id = segments.last().copied().and_then(parse_id);
    if id.is_some() {
        segments.pop();
    }

    Some(PathParseResult {
        base_path: format!("/{}", segments.join("/")),
        id,
    })
}

fn parse_id(segment: &str) -> Option<CategoryId> {
    if !segment.bytes().all(|byte| byte.is_ascii_digit()) {
        return None;
    }
    segment.parse().ok()
}
