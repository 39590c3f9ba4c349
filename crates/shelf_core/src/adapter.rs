//! Store adapter: collection name + identity to key-value keys.

use crate::entity::EntityId;
use crate::error::{CollectionError, CollectionResult};
use crate::meta::Metadata;
use serde_json::Value;
use shelf_storage::KeyValueStore;
use std::sync::Arc;

/// Key probed at construction to verify the store is usable.
///
/// Contains a dot so it can never collide with `<name>_meta` or
/// `<name>_<id>` for any collection whose entities have numeric ids.
const PROBE_KEY: &str = "shelf.probe";

/// Translates a collection name and entity identities into key-value
/// store keys, and owns the JSON codec for persisted records.
///
/// Key layout (the durable, cross-process contract):
/// - `"<name>_meta"` - JSON of the [`Metadata`] record
/// - `"<name>_<id>"` - JSON of one entity's serialized payload
///
/// Write ordering is the adapter caller's contract: the entity payload
/// is persisted first and metadata last, so a failed entity write never
/// leaves metadata referencing missing data.
pub(crate) struct StoreAdapter {
    store: Arc<dyn KeyValueStore>,
    name: String,
}

impl StoreAdapter {
    /// Creates an adapter for `name`, probing the store first.
    ///
    /// Fails fast with the underlying storage error if the store
    /// cannot complete a trivial write/remove pair.
    pub fn new(store: Arc<dyn KeyValueStore>, name: impl Into<String>) -> CollectionResult<Self> {
        store.set(PROBE_KEY, "1")?;
        store.remove(PROBE_KEY)?;

        Ok(Self {
            store,
            name: name.into(),
        })
    }

    /// Returns the collection name.
    pub fn name(&self) -> &str {
        &self.name
    }

    fn meta_key(&self) -> String {
        format!("{}_meta", self.name)
    }

    fn entity_key(&self, id: EntityId) -> String {
        format!("{}_{}", self.name, id)
    }

    /// Loads the metadata record, or a zeroed one if none is persisted.
    pub fn load_meta(&self) -> CollectionResult<Metadata> {
        match self.store.get(&self.meta_key())? {
            Some(raw) => Ok(serde_json::from_str(&raw)?),
            None => Ok(Metadata::empty(&self.name)),
        }
    }

    /// Persists the metadata record.
    pub fn save_meta(&self, meta: &Metadata) -> CollectionResult<()> {
        let raw = serde_json::to_string(meta)?;
        self.store.set(&self.meta_key(), &raw)?;
        Ok(())
    }

    /// Loads one entity's raw persisted payload.
    ///
    /// The identity comes from the metadata map, so an absent key means
    /// the persisted state no longer matches the ledger.
    pub fn load_entity(&self, id: EntityId) -> CollectionResult<Value> {
        match self.store.get(&self.entity_key(id))? {
            Some(raw) => Ok(serde_json::from_str(&raw)?),
            None => Err(CollectionError::invalid_format(format!(
                "metadata references entity {id} but key {} is missing",
                self.entity_key(id)
            ))),
        }
    }

    /// Persists one entity's payload under its identity.
    pub fn save_entity(&self, id: EntityId, payload: &Value) -> CollectionResult<()> {
        let raw = serde_json::to_string(payload)?;
        self.store.set(&self.entity_key(id), &raw)?;
        Ok(())
    }

    /// Removes one entity's persisted payload.
    pub fn remove_entity(&self, id: EntityId) -> CollectionResult<()> {
        self.store.remove(&self.entity_key(id))?;
        Ok(())
    }

    /// Removes the metadata record.
    pub fn remove_meta(&self) -> CollectionResult<()> {
        self.store.remove(&self.meta_key())?;
        Ok(())
    }

    /// Removes every key belonging to this collection: one entity key
    /// per ledgered identity, plus the metadata record. Used only by
    /// drop.
    ///
    /// Removal is by exact key, never by prefix scan - collections
    /// whose names share a prefix (`Notes`, `Notes_archive`) coexist
    /// in one store and must not see each other's keys.
    pub fn clear_all(&self, meta: &Metadata) -> CollectionResult<()> {
        for &id in &meta.map {
            self.remove_entity(id)?;
        }
        self.remove_meta()
    }
}
