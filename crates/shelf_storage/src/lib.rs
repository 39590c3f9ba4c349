//! # ShelfDB Storage
//!
//! Key-value store trait and implementations for ShelfDB.
//!
//! This crate provides the flat, string-keyed substrate that the
//! collection layer persists into. Stores are **opaque string maps** -
//! they do not interpret keys or values, and they know nothing about
//! collections, metadata records, or entities.
//!
//! ## Design Principles
//!
//! - Stores are simple synchronous string maps (get, set, remove, keys)
//! - No knowledge of the collection key layout
//! - Must be `Send + Sync` so one store can be shared across collections
//! - ShelfDB owns all key-layout interpretation
//!
//! ## Available Stores
//!
//! - [`MemoryStore`] - For testing and ephemeral collections
//! - [`FileStore`] - For persistent storage, one file per key
//!
//! ## Example
//!
//! ```rust
//! use shelf_storage::{KeyValueStore, MemoryStore};
//!
//! let store = MemoryStore::new();
//! store.set("greeting", "hello").unwrap();
//! assert_eq!(store.get("greeting").unwrap().as_deref(), Some("hello"));
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod error;
mod file;
mod memory;
mod store;

pub use error::{StorageError, StorageResult};
pub use file::FileStore;
pub use memory::MemoryStore;
pub use store::KeyValueStore;
