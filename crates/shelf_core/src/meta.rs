//! Per-collection metadata record.

use crate::entity::EntityId;
use serde::{Deserialize, Serialize};

/// Durable descriptor of a collection's shape.
///
/// The metadata record is the single source of truth for what exists
/// in a collection and in what persisted order. It is written after
/// every structural mutation (insert, removal) and is the record the
/// whole collection is rehydrated from.
///
/// # Invariants
///
/// - `length == map.len()`
/// - `map` holds exactly the identities of all persisted entities, in
///   insertion order; removal deletes the entry at its position and
///   never renumbers
/// - `last_id >= max(map)` (strictly greater when entities were
///   removed from the tail)
///
/// # Wire Layout
///
/// The serialized field order is a cross-process contract; a fresh
/// collection named `Test` with one entity persists exactly
/// `{"name":"Test","length":1,"lastId":1,"map":[1]}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metadata {
    /// Collection name, used as the key prefix.
    pub name: String,
    /// Number of live entities; always equals `map.len()`.
    pub length: usize,
    /// The last identity ever assigned. Never decreases.
    #[serde(rename = "lastId")]
    pub last_id: u64,
    /// Live identities in insertion order.
    pub map: Vec<EntityId>,
}

impl Metadata {
    /// Creates a zeroed record for a collection that has never been
    /// persisted.
    #[must_use]
    pub fn empty(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            length: 0,
            last_id: 0,
            map: Vec::new(),
        }
    }

    /// Returns the identity the next fresh save will receive.
    #[must_use]
    pub fn next_id(&self) -> EntityId {
        EntityId::new(self.last_id + 1)
    }

    /// Appends a freshly assigned identity.
    pub fn push(&mut self, id: EntityId) {
        self.map.push(id);
        self.length += 1;
        self.last_id = id.get();
    }

    /// Removes an identity from the ledger.
    ///
    /// Returns `false` if the identity is not present. `last_id` is
    /// untouched; identities are never reused.
    pub fn remove(&mut self, id: EntityId) -> bool {
        match self.map.iter().position(|&m| m == id) {
            Some(index) => {
                self.map.remove(index);
                self.length -= 1;
                true
            }
            None => false,
        }
    }

    /// Returns `true` if the identity is currently live.
    #[must_use]
    pub fn contains(&self, id: EntityId) -> bool {
        self.map.contains(&id)
    }
}
