//! An in-process stand-in for a remote database backend.

use optikv_store::{Context, Identified, Storer, StoreResult, WriteOutcome};
use parking_lot::Mutex;
use std::collections::HashMap;

/// Models a remote database adapter: one conditional write per `put`,
/// with the affected-count mapped through [`WriteOutcome`].
///
/// Real adapters translate the contract onto a native conditional
/// write, such as a replace filtered by both id and version. This stub
/// performs the same conditional update against a map so the
/// conformance suites can exercise that mapping without a server.
#[derive(Debug, Default)]
pub struct RemoteStub<T> {
    rows: Mutex<HashMap<String, T>>,
}

impl<T> RemoteStub<T> {
    /// Creates an empty stub.
    #[must_use]
    pub fn new() -> Self {
        Self {
            rows: Mutex::new(HashMap::new()),
        }
    }
}

impl<T: Identified + Clone + Send + Sync> Storer<T> for RemoteStub<T> {
    fn list(&self, ctx: &Context) -> StoreResult<Vec<T>> {
        ctx.ensure_active()?;
        Ok(self.rows.lock().values().cloned().collect())
    }

    fn put(&self, ctx: &Context, item: &mut T) -> StoreResult<()> {
        ctx.ensure_active()?;

        let presented = item.version();
        let mut rows = self.rows.lock();

        // The "update where id and version match, else insert" a remote
        // database would execute as one statement.
        let affected = match rows.get_mut(item.id()) {
            Some(stored) if stored.version() == presented => {
                item.set_version(presented + 1);
                *stored = item.clone();
                1
            }
            Some(_) => 0,
            None => {
                item.set_version(presented + 1);
                rows.insert(item.id().to_owned(), item.clone());
                1
            }
        };

        WriteOutcome::from_affected(affected).into_result(item.id(), presented)
    }

    fn get(&self, ctx: &Context, id: &str) -> StoreResult<Option<T>> {
        ctx.ensure_active()?;
        Ok(self.rows.lock().get(id).cloned())
    }

    fn delete(&self, ctx: &Context, id: &str) -> StoreResult<()> {
        ctx.ensure_active()?;
        self.rows.lock().remove(id);
        Ok(())
    }
}
