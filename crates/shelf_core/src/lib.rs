//! # ShelfDB Core
//!
//! Persistent collection engine for ShelfDB.
//!
//! A [`Collection`] gives callers an array-like, ordered view of a
//! named set of JSON entities, each carrying a stable auto-assigned
//! identity, persisted entity-per-key in a flat
//! [`shelf_storage::KeyValueStore`] alongside a metadata record that
//! describes the collection's shape.
//!
//! This crate provides:
//! - Identity assignment and the entity record ([`Entity`], [`EntityId`])
//! - Metadata bookkeeping ([`Metadata`])
//! - The store adapter translating names and identities to keys
//! - The collection engine: save, remove, find, sort, group, drop
//!
//! ## Example
//!
//! ```rust
//! use shelf_core::{Collection, Entity};
//! use shelf_storage::MemoryStore;
//! use serde_json::json;
//! use std::sync::Arc;
//!
//! let store = Arc::new(MemoryStore::new());
//! let mut notes = Collection::open(store, "Notes").unwrap();
//!
//! let entity = Entity::try_from(json!({"title": "first"})).unwrap();
//! let id = notes.save(entity).unwrap();
//! assert_eq!(id.get(), 1);
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod adapter;
mod collection;
mod entity;
mod error;
mod meta;
pub mod query;

pub use collection::{Collection, SerializeFn, UnserializeFn, UNGROUPED};
pub use entity::{Entity, EntityId};
pub use error::{CollectionError, CollectionResult};
pub use meta::Metadata;
