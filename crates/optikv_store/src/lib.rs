//! # optikv
//!
//! Versioned key-value storage with optimistic concurrency control.
//!
//! One contract, [`Storer`], implemented by interchangeable backends
//! with identical version-CAS semantics: every item embeds an
//! [`ItemId`] whose version the store owns, and a `put` succeeds only
//! when the presented version matches the stored one. Conflicting
//! writers get [`StoreError::VersionGone`], re-read, and retry.
//!
//! ## Backends
//!
//! - [`MemoryStore`] - lock-free chain with wait-free reads; also the
//!   cache tier of the cached store
//! - [`DiskStore`] - one JSON file per item, crash-safe via atomic
//!   write-replace
//! - [`CachedStore`] - any persistent [`Storer`] fronted by a warm
//!   [`MemoryStore`] mirror
//!
//! Remote database adapters implement the same contract out of tree;
//! [`WriteOutcome`] maps their native conflict signals onto
//! [`StoreError::VersionGone`].
//!
//! ## Example
//!
//! ```rust
//! use optikv_store::{Context, Identified, ItemId, MemoryStore, Storer};
//!
//! let store = MemoryStore::new();
//! let ctx = Context::background();
//!
//! let mut item = ItemId::new("invoice-1");
//! store.put(&ctx, &mut item).unwrap();
//! assert_eq!(item.version, 1);
//!
//! // Read, mutate, write back with the expected version.
//! let mut copy = store.get(&ctx, "invoice-1").unwrap().unwrap();
//! store.put(&ctx, &mut copy).unwrap();
//! assert_eq!(copy.version, 2);
//!
//! // The first handle is now stale.
//! assert!(store.put(&ctx, &mut item).unwrap_err().is_version_gone());
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod cached;
mod ctx;
mod disk;
mod error;
mod item;
mod memory;
mod storer;

pub use cached::CachedStore;
pub use ctx::{CancelToken, Context};
pub use disk::{DiskOptions, DiskStore};
pub use error::{StoreError, StoreResult};
pub use item::{Identified, ItemId};
pub use memory::MemoryStore;
pub use storer::{Storer, WriteOutcome};
