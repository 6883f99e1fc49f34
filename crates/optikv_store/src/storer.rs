//! The storage contract shared by every backend.

use crate::ctx::Context;
use crate::error::{StoreError, StoreResult};
use crate::item::Identified;

/// A versioned key-value store.
///
/// Every backend, from the in-memory and on-disk stores here to remote
/// database adapters, implements this one contract with identical
/// optimistic-concurrency semantics.
///
/// # Invariants
///
/// - `put` of an id not in the store succeeds and bumps the item's
///   version by one (a fresh item at version 0 is stored at version 1)
/// - `put` of an existing id succeeds only when the presented version
///   equals the stored version; the new stored version is presented + 1
///   and the caller's item is updated in place so subsequent writes
///   compose
/// - A failed `put` has no effect on stored state
/// - `get` and `list` return deep copies; mutating a returned item never
///   touches store state
/// - `delete` of an absent id is not an error
///
/// # Implementors
///
/// - [`MemoryStore`](crate::MemoryStore): concurrent in-memory chain
/// - [`DiskStore`](crate::DiskStore): one JSON file per item
/// - [`CachedStore`](crate::CachedStore): persistence fronted by a
///   memory cache
pub trait Storer<T: Identified>: Send + Sync {
    /// Returns every stored item, in unspecified order.
    ///
    /// An empty store yields an empty vec, not an error.
    ///
    /// # Errors
    ///
    /// Returns I/O, codec, or cancellation errors from the backend.
    fn list(&self, ctx: &Context) -> StoreResult<Vec<T>>;

    /// Inserts or updates `item`, keyed by its id.
    ///
    /// On success the stored version is the presented version plus one
    /// and `item` is updated in place to match.
    ///
    /// # Errors
    ///
    /// [`StoreError::VersionGone`] when an item with this id exists at a
    /// different version; I/O, codec, or cancellation errors otherwise.
    fn put(&self, ctx: &Context, item: &mut T) -> StoreResult<()>;

    /// Returns a deep copy of the item with this id, or `None`.
    ///
    /// # Errors
    ///
    /// Returns I/O, codec, or cancellation errors from the backend. An
    /// unknown id is `Ok(None)`.
    fn get(&self, ctx: &Context, id: &str) -> StoreResult<Option<T>>;

    /// Removes the item with this id, if present. Idempotent.
    ///
    /// # Errors
    ///
    /// Returns I/O or cancellation errors from the backend.
    fn delete(&self, ctx: &Context, id: &str) -> StoreResult<()>;
}

/// Outcome of a backend's conditional write, for adapters over databases
/// with native concurrency primitives.
///
/// Remote backends do not compare versions themselves. They issue one
/// conditional write, such as an update guarded by `WHERE version = ?`,
/// and map the result here: zero rows affected becomes
/// [`StoreError::VersionGone`].
///
/// ```rust
/// use optikv_store::WriteOutcome;
///
/// let rows_affected = 0;
/// let result = WriteOutcome::from_affected(rows_affected).into_result("user-1", 4);
/// assert!(result.unwrap_err().is_version_gone());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    /// The conditional write matched and was applied.
    Applied,
    /// The condition matched nothing: the version is gone.
    Conflict,
}

impl WriteOutcome {
    /// Maps an affected-row (or affected-document) count to an outcome.
    #[must_use]
    pub fn from_affected(affected: u64) -> Self {
        if affected == 0 {
            Self::Conflict
        } else {
            Self::Applied
        }
    }

    /// Converts the outcome into a store result for the given write.
    ///
    /// # Errors
    ///
    /// [`StoreError::VersionGone`] for [`WriteOutcome::Conflict`].
    pub fn into_result(self, id: &str, presented: i64) -> StoreResult<()> {
        match self {
            Self::Applied => Ok(()),
            Self::Conflict => Err(StoreError::version_gone(id, presented)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn affected_rows_map_to_outcomes() {
        assert_eq!(WriteOutcome::from_affected(0), WriteOutcome::Conflict);
        assert_eq!(WriteOutcome::from_affected(1), WriteOutcome::Applied);
        assert_eq!(WriteOutcome::from_affected(42), WriteOutcome::Applied);
    }

    #[test]
    fn conflict_becomes_version_gone() {
        let err = WriteOutcome::Conflict.into_result("k", 9).unwrap_err();
        assert!(err.is_version_gone());
        assert!(err.to_string().contains("'k'"));
    }

    #[test]
    fn applied_is_ok() {
        assert!(WriteOutcome::Applied.into_result("k", 9).is_ok());
    }
}
