//! Durable store: one JSON file per item with atomic write-replace.

use crate::ctx::Context;
use crate::error::{StoreError, StoreResult};
use crate::item::Identified;
use crate::storer::Storer;
use parking_lot::Mutex;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs::{self, File};
use std::io::{self, BufReader};
use std::marker::PhantomData;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use uuid::Uuid;

/// File extension for item files.
const ITEM_EXT: &str = "json";

/// Configuration for a [`DiskStore`].
#[derive(Debug, Clone, Copy)]
pub struct DiskOptions {
    /// Whether `put` checks the presented version against the file on
    /// disk before writing.
    ///
    /// On (the default), a standalone disk store enforces optimistic
    /// locking by itself. Off, the file layer is last-writer-wins and the
    /// store must sit beneath a version-checking layer such as
    /// [`CachedStore`](crate::CachedStore) over an enforcing delegate.
    /// The version still increments on every successful put in both
    /// modes.
    pub enforce_versions: bool,
}

impl Default for DiskOptions {
    fn default() -> Self {
        Self {
            enforce_versions: true,
        }
    }
}

/// A durable key-value store over a directory.
///
/// Each item is one `<id>.json` file. Writes go to a freshly created,
/// uniquely named temporary file in the same directory, are synced to
/// stable storage, and are then renamed over the target, so a concurrent
/// reader or a crash observes either the old complete file or the new
/// complete file, never a partial one. Listing scans the directory on
/// demand; nothing is preloaded.
///
/// # Concurrency
///
/// Within one store instance, writers serialize under a mutex that is
/// held across the version check and the rename (this is the one place
/// an in-process lock spans I/O). Two instances over the same directory
/// are not serialized against each other: each write stays atomic, but
/// the version check is best-effort across instances and the last rename
/// wins at the file layer.
pub struct DiskStore<T> {
    dir: PathBuf,
    enforce_versions: bool,
    writer: Mutex<()>,
    _marker: PhantomData<T>,
}

impl<T> DiskStore<T> {
    /// Opens a store over `dir` with default options, creating the
    /// directory if needed.
    ///
    /// # Errors
    ///
    /// [`StoreError::Construction`] if the directory cannot be created.
    pub fn open(dir: impl Into<PathBuf>) -> StoreResult<Self> {
        Self::open_with(dir, DiskOptions::default())
    }

    /// Opens a store over `dir`, creating the directory if needed.
    ///
    /// # Errors
    ///
    /// [`StoreError::Construction`] if the directory cannot be created.
    pub fn open_with(dir: impl Into<PathBuf>, options: DiskOptions) -> StoreResult<Self> {
        let dir = dir.into();

        fs::create_dir_all(&dir).map_err(|err| {
            StoreError::construction(format!("ensure data dir '{}': {err}", dir.display()))
        })?;

        Ok(Self {
            dir,
            enforce_versions: options.enforce_versions,
            writer: Mutex::new(()),
            _marker: PhantomData,
        })
    }

    /// Returns the directory this store persists into.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn item_path(&self, id: &str) -> PathBuf {
        self.dir.join(format!("{id}.{ITEM_EXT}"))
    }

    #[cfg(unix)]
    fn sync_dir(&self) -> StoreResult<()> {
        // Fsync the directory so the rename or removal itself is durable.
        let dir = File::open(&self.dir)?;
        dir.sync_all()?;
        Ok(())
    }

    #[cfg(not(unix))]
    fn sync_dir(&self) -> StoreResult<()> {
        // Windows NTFS journals metadata; there is no directory fsync.
        Ok(())
    }
}

impl<T: Identified + Serialize + DeserializeOwned> DiskStore<T> {
    fn read_item(&self, path: &Path) -> StoreResult<Option<T>> {
        let file = match File::open(path) {
            Ok(file) => file,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(err.into()),
        };

        let item = serde_json::from_reader(BufReader::new(file))?;
        Ok(Some(item))
    }

    /// Serializes `item` to a temp file, syncs it, and renames it over
    /// the target. On any failure before the rename the temp file is
    /// removed; the target is never left partial.
    fn write_atomic(&self, item: &T) -> StoreResult<()> {
        let target = self.item_path(item.id());
        let tmp = self
            .dir
            .join(format!("{}.{}.tmp", item.id(), Uuid::new_v4().simple()));

        let written = (|| -> StoreResult<()> {
            let file = File::create(&tmp)?;
            serde_json::to_writer_pretty(&file, item)?;
            file.sync_all()?;
            Ok(())
        })();

        if let Err(err) = written {
            let _ = fs::remove_file(&tmp);
            return Err(err);
        }

        if let Err(err) = fs::rename(&tmp, &target) {
            let _ = fs::remove_file(&tmp);
            return Err(err.into());
        }

        self.sync_dir()
    }
}

impl<T> Storer<T> for DiskStore<T>
where
    T: Identified + Serialize + DeserializeOwned + Send + Sync,
{
    fn list(&self, ctx: &Context) -> StoreResult<Vec<T>> {
        ctx.ensure_active()?;

        let mut result = Vec::new();

        for entry in fs::read_dir(&self.dir)? {
            ctx.ensure_active()?;

            let path = entry?.path();
            if path.is_dir() {
                continue;
            }
            let is_item = path
                .extension()
                .is_some_and(|ext| ext.eq_ignore_ascii_case(ITEM_EXT));
            if !is_item {
                continue;
            }

            match self.read_item(&path) {
                Ok(Some(item)) => result.push(item),
                // Removed between the scan and the open.
                Ok(None) => {}
                // Favor serving the rest of the listing over failing it.
                Err(err) => {
                    warn!(file = %path.display(), error = %err, "skipping unreadable item file");
                }
            }
        }

        Ok(result)
    }

    fn put(&self, ctx: &Context, item: &mut T) -> StoreResult<()> {
        ctx.ensure_active()?;

        let _writer = self.writer.lock();

        let presented = item.version();
        if self.enforce_versions {
            // A missing file is a first write; any presented version is
            // accepted for it.
            if let Some(stored) = self.read_item(&self.item_path(item.id()))? {
                if stored.version() != presented {
                    return Err(StoreError::version_gone(item.id(), presented));
                }
            }
        }

        item.set_version(presented + 1);
        self.write_atomic(item)?;

        debug!(id = item.id(), version = item.version(), "persisted item");
        Ok(())
    }

    fn get(&self, ctx: &Context, id: &str) -> StoreResult<Option<T>> {
        ctx.ensure_active()?;
        self.read_item(&self.item_path(id))
    }

    fn delete(&self, ctx: &Context, id: &str) -> StoreResult<()> {
        ctx.ensure_active()?;

        let _writer = self.writer.lock();

        match fs::remove_file(self.item_path(id)) {
            Ok(()) => {
                self.sync_dir()?;
                debug!(id, "deleted item file");
                Ok(())
            }
            // Already gone: deletion is idempotent.
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }
}
