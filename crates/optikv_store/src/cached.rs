//! Write-through caching layer over any persistent [`Storer`].

use crate::ctx::Context;
use crate::error::StoreResult;
use crate::item::Identified;
use crate::memory::MemoryStore;
use crate::storer::Storer;
use tracing::debug;

/// A two-tier store: an authoritative persistence delegate fronted by an
/// in-memory mirror.
///
/// Persistence is the source of truth; the cache is a best-effort,
/// rebuildable mirror of it. The cache is populated through
/// [`MemoryStore::mirror`], which preserves persisted versions exactly,
/// so an item read through the cache always carries the same version as
/// its persisted form.
///
/// - **construction** warms the cache with everything persistence lists;
///   a failed warm-up aborts construction
/// - **put** writes persistence first and mirrors into the cache only on
///   success, so the cache never runs ahead of persistence
/// - **get** serves cache hits directly; a miss falls back to
///   persistence and repairs the cache before returning
/// - **delete** removes from persistence first, then the cache
/// - **list** is served entirely from the cache
///
/// # Consistency window
///
/// No lock spans both tiers. A `get` racing a `delete` can read-repair
/// the old value back into the cache after persistence already dropped
/// it, so a stale entry may briefly survive in the cache. Persistence
/// stays authoritative: a later `put` of that item is version-checked
/// against persistence and fails with
/// [`VersionGone`](crate::StoreError::VersionGone) rather than
/// resurrecting it, and the failed put leaves the cache untouched.
/// Mirrors racing each other are harmless because
/// [`MemoryStore::mirror`] never moves a cached version backwards.
pub struct CachedStore<T> {
    persistence: Box<dyn Storer<T>>,
    cache: MemoryStore<T>,
}

impl<T: Identified + Clone + Send + Sync> CachedStore<T> {
    /// Builds a cached store over `persistence`, warming the cache from
    /// a full listing.
    ///
    /// # Errors
    ///
    /// Any error from the warm-up listing aborts construction; no store
    /// with unknown cache coverage is ever returned.
    pub fn new(ctx: &Context, persistence: Box<dyn Storer<T>>) -> StoreResult<Self> {
        let cache = MemoryStore::new();

        let items = persistence.list(ctx)?;
        let warmed = items.len();
        for item in items {
            cache.mirror(item);
        }
        debug!(items = warmed, "cache warmed from persistence");

        Ok(Self { persistence, cache })
    }
}

impl<T: Identified + Clone + Send + Sync> Storer<T> for CachedStore<T> {
    fn list(&self, ctx: &Context) -> StoreResult<Vec<T>> {
        self.cache.list(ctx)
    }

    fn put(&self, ctx: &Context, item: &mut T) -> StoreResult<()> {
        // Persistence first; on any failure the cache stays untouched.
        self.persistence.put(ctx, item)?;
        self.cache.mirror(item.clone());
        Ok(())
    }

    fn get(&self, ctx: &Context, id: &str) -> StoreResult<Option<T>> {
        if let Some(item) = self.cache.get(ctx, id)? {
            return Ok(Some(item));
        }

        match self.persistence.get(ctx, id)? {
            Some(item) => {
                // Read-repair: keep the persisted version as is.
                self.cache.mirror(item.clone());
                Ok(Some(item))
            }
            None => Ok(None),
        }
    }

    fn delete(&self, ctx: &Context, id: &str) -> StoreResult<()> {
        self.persistence.delete(ctx, id)?;
        self.cache.delete(ctx, id)
    }
}
