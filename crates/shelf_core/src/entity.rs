//! Entity record and identity.

use crate::error::CollectionError;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Unique identifier for an entity within one collection.
///
/// Identities are positive integers that are:
/// - Assigned once, on first save (`lastId + 1`)
/// - Monotonically increasing within a collection
/// - Never reused, even after the entity is removed
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct EntityId(u64);

impl EntityId {
    /// Creates an entity ID from a raw value.
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the raw ID value.
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }

    /// Returns the identity that follows this one.
    #[must_use]
    pub const fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for EntityId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

impl From<EntityId> for u64 {
    fn from(id: EntityId) -> Self {
        id.0
    }
}

/// A structured record plus its immutable identity tag.
///
/// The payload is a plain JSON object; the identity lives outside the
/// field map, so it can never be overwritten through normal field
/// assignment and never appears in the serialized payload. A fresh
/// entity has no identity until its first save assigns one.
///
/// # Example
///
/// ```rust
/// use shelf_core::Entity;
/// use serde_json::json;
///
/// let mut entity = Entity::try_from(json!({"title": "note"})).unwrap();
/// assert!(entity.id().is_none());
/// entity.set("done", json!(false));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Entity {
    id: Option<EntityId>,
    fields: Map<String, Value>,
}

impl Entity {
    /// Creates a fresh entity (no identity yet) from a field map.
    #[must_use]
    pub fn new(fields: Map<String, Value>) -> Self {
        Self { id: None, fields }
    }

    /// Creates an entity that already carries an identity.
    ///
    /// Used when hydrating persisted entities; callers outside the
    /// crate obtain identities only through `Collection::save`.
    pub(crate) fn with_id(id: EntityId, fields: Map<String, Value>) -> Self {
        Self {
            id: Some(id),
            fields,
        }
    }

    /// Assigns the identity. First save only; the id slot is write-once.
    pub(crate) fn assign_id(&mut self, id: EntityId) {
        debug_assert!(self.id.is_none(), "identity is assigned exactly once");
        self.id = Some(id);
    }

    /// Returns the identity, or `None` if the entity was never saved.
    #[must_use]
    pub fn id(&self) -> Option<EntityId> {
        self.id
    }

    /// Returns the field map.
    #[must_use]
    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }

    /// Returns the field map mutably. The identity is not part of the
    /// map, so it cannot be touched through this.
    pub fn fields_mut(&mut self) -> &mut Map<String, Value> {
        &mut self.fields
    }

    /// Reads a single field.
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    /// Writes a single field, replacing any existing value.
    pub fn set(&mut self, field: impl Into<String>, value: Value) {
        self.fields.insert(field.into(), value);
    }

    /// Returns the payload as a JSON value (identity excluded).
    #[must_use]
    pub fn to_value(&self) -> Value {
        Value::Object(self.fields.clone())
    }
}

impl TryFrom<Value> for Entity {
    type Error = CollectionError;

    /// Builds a fresh entity from a JSON value, which must be an object.
    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Object(fields) => Ok(Self::new(fields)),
            other => Err(CollectionError::invalid_entity_shape(format!(
                "expected a JSON object, got {other}"
            ))),
        }
    }
}
