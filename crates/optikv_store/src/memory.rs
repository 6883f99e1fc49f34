//! Concurrent in-memory store over a lock-free singly-linked chain.

use crate::ctx::Context;
use crate::error::{StoreError, StoreResult};
use crate::item::Identified;
use crate::storer::Storer;
use arc_swap::{ArcSwap, ArcSwapOption};
use parking_lot::Mutex;
use std::sync::Arc;

/// One entry in the chain.
///
/// Both references are published atomically: a reader sees either the
/// whole old item or the whole new item behind `item`, never a mix, and
/// `next` repointing during a splice leaves the removed node's own tail
/// intact for readers still standing on it.
struct Node<T> {
    item: ArcSwap<T>,
    next: ArcSwapOption<Node<T>>,
}

/// A concurrent, versioned in-memory key-value store.
///
/// Entries live on a singly-linked chain starting at an atomically
/// published head. `list` and `get` traverse with atomic loads only and
/// never wait on writers; `put` and `delete` serialize against each other
/// under one mutex per store, held only across the traverse-and-publish
/// or traverse-and-splice critical path.
///
/// Reference counting keeps a removed node alive while any concurrent
/// reader still holds it, so traversals always reach a valid (possibly
/// stale) tail without reclamation hazards.
///
/// `list` and `get` return deep copies (`T: Clone`), so the returned
/// value can be mutated freely and written back with its expected
/// version.
///
/// # Example
///
/// ```rust
/// use optikv_store::{Context, ItemId, MemoryStore, Storer};
///
/// let store = MemoryStore::new();
/// let ctx = Context::background();
///
/// let mut item = ItemId::new("a");
/// store.put(&ctx, &mut item).unwrap();
/// assert_eq!(item.version, 1);
/// ```
pub struct MemoryStore<T> {
    head: ArcSwapOption<Node<T>>,
    writer: Mutex<()>,
}

impl<T> MemoryStore<T> {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self {
            head: ArcSwapOption::empty(),
            writer: Mutex::new(()),
        }
    }
}

impl<T> Default for MemoryStore<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Drop for MemoryStore<T> {
    fn drop(&mut self) {
        // Unlink iteratively; dropping a long chain through nested Arcs
        // would otherwise recurse once per node.
        let mut current = self.head.swap(None);
        while let Some(node) = current {
            current = node.next.swap(None);
        }
    }
}

impl<T: Identified + Clone> MemoryStore<T> {
    /// Installs `item` at its carried version, inserting or overwriting
    /// without the optimistic version check or increment.
    ///
    /// This is the population path for caching layers: warm-up and
    /// read-repair must mirror exactly what persistence holds, so the
    /// version survives untouched. Versions only move forward: an
    /// incoming item older than the cached entry is dropped, so mirrors
    /// racing each other (no lock spans persistence and cache) cannot
    /// pin the cache at a stale version. Not part of the [`Storer`]
    /// contract.
    pub fn mirror(&self, item: T) {
        let _writer = self.writer.lock();

        let mut current = self.head.load_full();
        while let Some(node) = current {
            let stored = node.item.load_full();
            if stored.id() == item.id() {
                if stored.version() < item.version() {
                    node.item.store(Arc::new(item));
                }
                return;
            }
            current = node.next.load_full();
        }

        self.push_front(item);
    }

    /// Publishes a new node at the head. Caller holds the writer mutex.
    fn push_front(&self, item: T) {
        let node = Arc::new(Node {
            item: ArcSwap::from_pointee(item),
            next: ArcSwapOption::new(self.head.load_full()),
        });
        self.head.store(Some(node));
    }
}

impl<T: Identified + Clone + Send + Sync> Storer<T> for MemoryStore<T> {
    fn list(&self, _ctx: &Context) -> StoreResult<Vec<T>> {
        // Readers take no lock.
        let mut result = Vec::new();

        let mut current = self.head.load_full();
        while let Some(node) = current {
            result.push(node.item.load().as_ref().clone());
            current = node.next.load_full();
        }

        Ok(result)
    }

    fn put(&self, _ctx: &Context, item: &mut T) -> StoreResult<()> {
        let _writer = self.writer.lock();

        let presented = item.version();

        let mut current = self.head.load_full();
        while let Some(node) = current {
            let stored = node.item.load_full();
            if stored.id() == item.id() {
                if stored.version() != presented {
                    return Err(StoreError::version_gone(item.id(), presented));
                }

                item.set_version(presented + 1);
                node.item.store(Arc::new(item.clone()));
                return Ok(());
            }
            current = node.next.load_full();
        }

        // Not found: publish a fresh node at the head. The new node links
        // to the observed head before the head swings, so concurrent
        // traversals see either the old chain or the complete new one.
        item.set_version(presented + 1);
        self.push_front(item.clone());

        Ok(())
    }

    fn get(&self, _ctx: &Context, id: &str) -> StoreResult<Option<T>> {
        // Readers take no lock.
        let mut current = self.head.load_full();
        while let Some(node) = current {
            let stored = node.item.load_full();
            if stored.id() == id {
                return Ok(Some(stored.as_ref().clone()));
            }
            current = node.next.load_full();
        }

        Ok(None)
    }

    fn delete(&self, _ctx: &Context, id: &str) -> StoreResult<()> {
        let _writer = self.writer.lock();

        let mut prev: Option<Arc<Node<T>>> = None;
        let mut current = self.head.load_full();

        while let Some(node) = current {
            if node.item.load().id() == id {
                // Splice around the node. Its own `next` stays untouched,
                // so a reader standing on it still walks a valid tail.
                let next = node.next.load_full();
                match &prev {
                    Some(prev) => prev.next.store(next),
                    None => self.head.store(next),
                }
                return Ok(());
            }
            current = node.next.load_full();
            prev = Some(node);
        }

        // Absent id: deletion is idempotent.
        Ok(())
    }
}
