//! In-memory category store shared by every connection.
//!
//! The store owns the mutable `id -> name` table behind a single mutex. It
//! knows nothing about the protocol: callers get plain CRUD primitives plus
//! [`CategoryStore::with_table`] for sequences that must run under one lock,
//! such as choosing the next id and inserting under it.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde::Serialize;
use tracing::warn;

const STORE_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::store");

/// Identifier of a category. Always positive for stored entries.
pub type CategoryId = u64;

/// Entries present in every freshly constructed store.
const SEED: [(CategoryId, &str); 3] = [(1, "Beverages"), (2, "Condiments"), (3, "Confections")];

/// A named category.
///
/// Serializes with the protocol field names `cid` and `name`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Category {
    /// Unique key within the store.
    #[serde(rename = "cid")]
    pub id: CategoryId,
    /// Display name; never empty.
    pub name: String,
}

impl Category {
    /// Creates a category value.
    #[must_use]
    pub fn new(id: CategoryId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }
}

/// Exclusive view of the category table.
///
/// Obtained through [`CategoryStore::with_table`]; every method runs while
/// the store lock is held.
#[derive(Debug, Default)]
pub struct CategoryTable {
    entries: BTreeMap<CategoryId, String>,
}

impl CategoryTable {
    /// Returns every category in ascending id order.
    #[must_use]
    pub fn list(&self) -> Vec<Category> {
        self.entries
            .iter()
            .map(|(id, name)| Category::new(*id, name.clone()))
            .collect()
    }

    /// Looks up a single category.
    #[must_use]
    pub fn get(&self, id: CategoryId) -> Option<Category> {
        self.entries
            .get(&id)
            .map(|name| Category::new(id, name.clone()))
    }

    /// Inserts a category. Returns `false` when `id` is already taken.
    pub fn create(&mut self, id: CategoryId, name: impl Into<String>) -> bool {
        if self.entries.contains_key(&id) {
            return false;
        }
        self.entries.insert(id, name.into());
        true
    }

    /// Renames an existing category. Returns `false` when `id` is absent.
    pub fn update(&mut self, id: CategoryId, name: impl Into<String>) -> bool {
        match self.entries.get_mut(&id) {
            Some(existing) => {
                *existing = name.into();
                true
            }
            None => false,
        }
    }

    /// Removes a category. Returns `false` when `id` is absent.
    pub fn delete(&mut self, id: CategoryId) -> bool {
        self.entries.remove(&id).is_some()
    }

    /// Largest id currently stored.
    #[must_use]
    pub fn max_id(&self) -> Option<CategoryId> {
        self.entries.last_key_value().map(|(id, _)| *id)
    }

    /// Number of stored categories.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` when no categories are stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Cloneable handle to the process-wide category table.
///
/// Clones share the same table; construct one store per process and hand
/// clones to the dispatcher.
#[derive(Debug, Clone, Default)]
pub struct CategoryStore {
    inner: Arc<Mutex<CategoryTable>>,
}

impl CategoryStore {
    /// Creates a store holding the three seed categories.
    #[must_use]
    pub fn seeded() -> Self {
        let mut table = CategoryTable::default();
        for (id, name) in SEED {
            table.create(id, name);
        }
        Self::from_table(table)
    }

    /// Creates a store with no categories.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    fn from_table(table: CategoryTable) -> Self {
        Self {
            inner: Arc::new(Mutex::new(table)),
        }
    }

    /// Runs `f` with exclusive access to the table.
    ///
    /// Every call is one critical section, so read-modify-write sequences
    /// placed inside `f` cannot interleave with other callers.
    pub fn with_table<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&mut CategoryTable) -> R,
    {
        let mut guard = self.lock();
        f(&mut guard)
    }

    /// Returns every category in ascending id order.
    #[must_use]
    pub fn list(&self) -> Vec<Category> {
        self.with_table(|table| table.list())
    }

    /// Looks up a single category.
    #[must_use]
    pub fn get(&self, id: CategoryId) -> Option<Category> {
        self.with_table(|table| table.get(id))
    }

    /// Inserts a category. Returns `false` when `id` is already taken.
    pub fn create(&self, id: CategoryId, name: impl Into<String>) -> bool {
        self.with_table(|table| table.create(id, name))
    }

    /// Renames an existing category. Returns `false` when `id` is absent.
    pub fn update(&self, id: CategoryId, name: impl Into<String>) -> bool {
        self.with_table(|table| table.update(id, name))
    }

    /// Removes a category. Returns `false` when `id` is absent.
    pub fn delete(&self, id: CategoryId) -> bool {
        self.with_table(|table| table.delete(id))
    }

    /// Largest id currently stored.
    #[must_use]
    pub fn max_id(&self) -> Option<CategoryId> {
        self.with_table(|table| table.max_id())
    }

    // Each table operation is a single insert or remove, so a panic while the
    // lock is held cannot leave a half-applied change behind.
    fn lock(&self) -> MutexGuard<'_, CategoryTable> {
        self.inner.lock().unwrap_or_else(|poisoned| {
            warn!(target: STORE_TARGET, "category store lock poisoned; recovering");
            PoisonError::into_inner(poisoned)
        })
    }
}
