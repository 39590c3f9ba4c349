//! The collection engine.

use crate::adapter::StoreAdapter;
use crate::entity::{Entity, EntityId};
use crate::error::{CollectionError, CollectionResult};
use crate::meta::Metadata;
use crate::query;
use serde_json::Value;
use shelf_storage::KeyValueStore;
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::debug;

/// Reserved group key for entities without a usable scalar at the
/// grouped field.
pub const UNGROUPED: &str = "_ungrouped";

/// Transform applied to every payload before it is persisted.
///
/// Receives a copy of the entity's field object and must return a JSON
/// object; the live entity is never handed to the hook.
pub type SerializeFn = Box<dyn Fn(Value) -> Value + Send + Sync>;

/// Transform applied to every raw payload loaded from the store.
///
/// Must return a JSON object.
pub type UnserializeFn = Box<dyn Fn(Value) -> Value + Send + Sync>;

/// The filter retained by `find` so fresh saves can be tested against it.
type Predicate = Box<dyn Fn(&Entity) -> bool + Send + Sync>;

/// An ordered, persistent collection of JSON entities.
///
/// A collection owns three things that move together:
/// - `data`: the identity→entity map, the full persisted set
/// - `view`: the ordered projection used for ordinal access, which may
///   be the full set (default) or the result of the last find/sort
/// - the [`Metadata`] record, the durable ledger the collection is
///   rehydrated from
///
/// All mutation goes through the engine, which persists the entity
/// payload first and the metadata record last, so a failed write never
/// leaves the ledger referencing missing data.
///
/// Collections are single-owner: two instances opened over the same
/// store and name each hold an independent in-memory snapshot, and
/// mutations through one are not visible to the other until it is
/// reopened.
///
/// # Example
///
/// ```rust
/// use shelf_core::{Collection, Entity};
/// use shelf_storage::MemoryStore;
/// use serde_json::json;
/// use std::sync::Arc;
///
/// let store = Arc::new(MemoryStore::new());
/// let mut tasks = Collection::open(store, "Tasks").unwrap();
///
/// tasks.save(Entity::try_from(json!({"done": false})).unwrap()).unwrap();
/// tasks.find(|e| e.get("done") == Some(&json!(false)));
/// assert_eq!(tasks.len(), 1);
/// ```
pub struct Collection {
    adapter: StoreAdapter,
    meta: Metadata,
    data: BTreeMap<EntityId, Entity>,
    view: Vec<EntityId>,
    query: Option<Predicate>,
    unserialize: Option<UnserializeFn>,
    serialize: Option<SerializeFn>,
}

impl Collection {
    /// Opens the collection named `name` over `store`, hydrating every
    /// persisted entity.
    ///
    /// # Errors
    ///
    /// Fails fast with a storage error if the store is not usable, and
    /// with `InvalidFormat` / `InvalidEntityShape` if the persisted
    /// state cannot be decoded.
    pub fn open(store: Arc<dyn KeyValueStore>, name: impl Into<String>) -> CollectionResult<Self> {
        Self::open_with_hooks(store, name, None, None)
    }

    /// Opens a collection with caller-supplied transform hooks.
    ///
    /// `unserialize` runs on every raw payload loaded from the store;
    /// `serialize` runs on a copy of every payload before it is
    /// persisted. Both must return JSON objects.
    ///
    /// # Errors
    ///
    /// Same conditions as [`Collection::open`].
    pub fn open_with_hooks(
        store: Arc<dyn KeyValueStore>,
        name: impl Into<String>,
        unserialize: Option<UnserializeFn>,
        serialize: Option<SerializeFn>,
    ) -> CollectionResult<Self> {
        let adapter = StoreAdapter::new(store, name)?;
        let meta = adapter.load_meta()?;

        let mut collection = Self {
            adapter,
            meta,
            data: BTreeMap::new(),
            view: Vec::new(),
            query: None,
            unserialize,
            serialize,
        };
        collection.hydrate()?;
        Ok(collection)
    }

    /// Loads every entity the metadata record references, in map order.
    fn hydrate(&mut self) -> CollectionResult<()> {
        for &id in &self.meta.map {
            let raw = self.adapter.load_entity(id)?;
            let value = match &self.unserialize {
                Some(hook) => hook(raw),
                None => raw,
            };
            let fields = match value {
                Value::Object(fields) => fields,
                other => {
                    return Err(CollectionError::invalid_entity_shape(format!(
                        "unserialized payload for entity {id} is not an object: {other}"
                    )))
                }
            };
            self.data.insert(id, Entity::with_id(id, fields));
            self.view.push(id);
        }

        debug!(
            collection = self.adapter.name(),
            entities = self.data.len(),
            "hydrated collection"
        );
        Ok(())
    }

    /// Returns the collection name.
    #[must_use]
    pub fn name(&self) -> &str {
        self.adapter.name()
    }

    /// Returns the metadata record.
    #[must_use]
    pub fn metadata(&self) -> &Metadata {
        &self.meta
    }

    /// Number of entities currently visible in the view.
    #[must_use]
    pub fn len(&self) -> usize {
        self.view.len()
    }

    /// Returns `true` if the view is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.view.is_empty()
    }

    /// Ordinal access into the view.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Entity> {
        self.view.get(index).and_then(|id| self.data.get(id))
    }

    /// Iterates the view in order.
    pub fn iter(&self) -> impl Iterator<Item = &Entity> {
        self.view.iter().filter_map(|id| self.data.get(id))
    }

    /// Direct lookup by identity, independent of any active filter.
    #[must_use]
    pub fn by_id(&self, id: EntityId) -> Option<&Entity> {
        self.data.get(&id)
    }

    /// Saves a fresh entity or updates an existing one.
    ///
    /// A fresh entity (no identity) is assigned `lastId + 1`, persisted,
    /// appended to the ledger, and appended to the view unless an
    /// active predicate rejects it. An entity that already carries an
    /// identity replaces its persisted payload in place; the metadata
    /// record is untouched because the collection's structure did not
    /// change.
    ///
    /// Returns the entity's identity.
    ///
    /// # Errors
    ///
    /// - `EntityNotFound` when updating an identity that is not in the
    ///   collection
    /// - `InvalidSerialization` when the serialize hook returns a
    ///   non-object
    /// - Storage errors abort the operation before any in-memory
    ///   structure is touched
    pub fn save(&mut self, mut entity: Entity) -> CollectionResult<EntityId> {
        let payload = match &self.serialize {
            Some(hook) => {
                // The hook sees a copy; it can neither observe nor
                // mutate the live entity.
                let transformed = hook(entity.to_value());
                if !transformed.is_object() {
                    return Err(CollectionError::invalid_serialization(format!(
                        "serialize hook must return an object, got {transformed}"
                    )));
                }
                transformed
            }
            None => entity.to_value(),
        };

        if let Some(id) = entity.id() {
            if !self.data.contains_key(&id) {
                return Err(CollectionError::entity_not_found(id, self.adapter.name()));
            }
            self.adapter.save_entity(id, &payload)?;
            self.data.insert(id, entity);
            debug!(collection = self.adapter.name(), %id, "updated entity");
            return Ok(id);
        }

        let id = self.meta.next_id();
        self.adapter.save_entity(id, &payload)?;
        entity.assign_id(id);

        let visible = match &self.query {
            Some(predicate) => predicate(&entity),
            None => true,
        };
        if visible {
            self.view.push(id);
        }
        self.data.insert(id, entity);
        self.meta.push(id);
        self.adapter.save_meta(&self.meta)?;

        debug!(collection = self.adapter.name(), %id, visible, "inserted entity");
        Ok(id)
    }

    /// Removes an entity by identity.
    ///
    /// Returns `Ok(false)` if the identity is unknown - removing
    /// something already absent is not exceptional.
    ///
    /// # Errors
    ///
    /// Storage errors abort the removal before any in-memory structure
    /// is touched.
    pub fn remove(&mut self, id: EntityId) -> CollectionResult<bool> {
        if !self.data.contains_key(&id) {
            return Ok(false);
        }

        self.adapter.remove_entity(id)?;
        self.data.remove(&id);
        self.view.retain(|&v| v != id);
        self.meta.remove(id);
        self.adapter.save_meta(&self.meta)?;

        debug!(collection = self.adapter.name(), %id, "removed entity");
        Ok(true)
    }

    /// Removes an entity by reference.
    ///
    /// Returns `Ok(false)` if the entity never received an identity.
    ///
    /// # Errors
    ///
    /// Same conditions as [`Collection::remove`].
    pub fn remove_entity(&mut self, entity: &Entity) -> CollectionResult<bool> {
        match entity.id() {
            Some(id) => self.remove(id),
            None => Ok(false),
        }
    }

    /// Rebuilds the view to the entities matching `predicate`, in data
    /// order, and retains the predicate: fresh saves are tested
    /// against it until [`Collection::find_all`] clears it.
    pub fn find<P>(&mut self, predicate: P)
    where
        P: Fn(&Entity) -> bool + Send + Sync + 'static,
    {
        let predicate: Predicate = Box::new(predicate);
        self.view = query::filter_ids(&self.data, &*predicate);
        self.query = Some(predicate);
    }

    /// Filters like [`Collection::find`], then orders the result with
    /// `comparator`.
    pub fn find_sorted<P, C>(&mut self, predicate: P, comparator: C)
    where
        P: Fn(&Entity) -> bool + Send + Sync + 'static,
        C: Fn(&Entity, &Entity) -> Ordering,
    {
        self.find(predicate);
        self.sort(comparator);
    }

    /// Clears the active predicate and restores the view to the full
    /// set in data order.
    ///
    /// A no-op when no predicate is active, so an already-full view is
    /// not needlessly rebuilt (and a manual sort of it survives).
    pub fn find_all(&mut self) {
        if self.query.is_none() {
            return;
        }
        self.query = None;
        self.view = query::all_ids(&self.data);
    }

    /// Clears the active predicate, restores the full view, and orders
    /// it with `comparator`.
    pub fn find_all_sorted<C>(&mut self, comparator: C)
    where
        C: Fn(&Entity, &Entity) -> Ordering,
    {
        self.query = None;
        self.view = query::all_ids(&self.data);
        self.sort(comparator);
    }

    /// Reorders the current view in place.
    ///
    /// Does not touch `data` and does not change which entities are
    /// visible. The comparator is a standard three-way total order;
    /// ties stay in implementation-defined order.
    pub fn sort<C>(&mut self, comparator: C)
    where
        C: Fn(&Entity, &Entity) -> Ordering,
    {
        query::sort_ids(&self.data, &mut self.view, &comparator);
    }

    /// Partitions the full set (not just the view) by the value at
    /// `field`.
    ///
    /// Strings and numbers form real groups; entities missing the
    /// field or holding any other value land under [`UNGROUPED`].
    #[must_use]
    pub fn group(&self, field: &str) -> BTreeMap<String, Vec<&Entity>> {
        query::group_by(&self.data, field)
    }

    /// Destroys every persisted entity and the metadata record,
    /// leaving the instance empty but usable: the next save assigns
    /// identity 1 again.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the underlying removals fail.
    pub fn drop_all(&mut self) -> CollectionResult<()> {
        self.adapter.clear_all(&self.meta)?;
        self.data.clear();
        self.view.clear();
        self.meta = self.adapter.load_meta()?;

        debug!(collection = self.adapter.name(), "dropped collection");
        Ok(())
    }
}

impl std::fmt::Debug for Collection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Collection")
            .field("name", &self.adapter.name())
            .field("entities", &self.data.len())
            .field("visible", &self.view.len())
            .field("filtered", &self.query.is_some())
            .finish_non_exhaustive()
    }
}
