//! Runs the conformance suites against every backend and checks the
//! cross-backend behaviors: durability across handles, cache warm-up,
//! and read-repair.

use optikv_store::{CachedStore, Context, DiskStore, Identified, MemoryStore, Storer};
use optikv_testkit::{optimistic_locking_suite, storer_suite, RemoteStub, TestItem};
use tempfile::tempdir;

#[test]
fn memory_store_conformance() {
    let store: MemoryStore<TestItem> = MemoryStore::new();
    storer_suite(&store);
    optimistic_locking_suite(&store);
}

#[test]
fn disk_store_conformance() {
    let dir = tempdir().unwrap();
    let store: DiskStore<TestItem> = DiskStore::open(dir.path()).unwrap();
    storer_suite(&store);
    optimistic_locking_suite(&store);
}

#[test]
fn cached_store_conformance() {
    let dir = tempdir().unwrap();
    let ctx = Context::background();

    let disk: DiskStore<TestItem> = DiskStore::open(dir.path()).unwrap();
    let store = CachedStore::new(&ctx, Box::new(disk)).unwrap();

    storer_suite(&store);
    optimistic_locking_suite(&store);
}

#[test]
fn remote_stub_conformance() {
    let store: RemoteStub<TestItem> = RemoteStub::new();
    storer_suite(&store);
    optimistic_locking_suite(&store);
}

#[test]
fn disk_store_survives_reopen() {
    let dir = tempdir().unwrap();
    let ctx = Context::background();

    let mut item = TestItem::new("33", "test");
    {
        let store = DiskStore::open(dir.path()).unwrap();
        store.put(&ctx, &mut item).unwrap();
        store.put(&ctx, &mut item).unwrap();
    }

    let store: DiskStore<TestItem> = DiskStore::open(dir.path()).unwrap();
    assert_eq!(store.list(&ctx).unwrap().len(), 1);

    let got = store.get(&ctx, "33").unwrap().unwrap();
    assert_eq!(got.title, "test");
    assert_eq!(got.version(), 2);
}

#[test]
fn cached_store_warms_up_from_persistence() {
    let dir = tempdir().unwrap();
    let ctx = Context::background();

    let mut item = TestItem::new("prewarmed", "already persisted");
    {
        let store = DiskStore::open(dir.path()).unwrap();
        store.put(&ctx, &mut item).unwrap();
    }

    let disk: DiskStore<TestItem> = DiskStore::open(dir.path()).unwrap();
    let cached = CachedStore::new(&ctx, Box::new(disk)).unwrap();

    // Visible through the cache without any explicit put, at the
    // persisted version.
    let listed = cached.list(&ctx).unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].id(), "prewarmed");
    assert_eq!(listed[0].version(), 1);

    // And the warmed entry accepts a put at that version.
    let mut got = cached.get(&ctx, "prewarmed").unwrap().unwrap();
    cached.put(&ctx, &mut got).unwrap();
    assert_eq!(got.version(), 2);
}

#[test]
fn cached_store_read_repairs_behind_the_cache() {
    let dir = tempdir().unwrap();
    let ctx = Context::background();

    let disk: DiskStore<TestItem> = DiskStore::open(dir.path()).unwrap();
    let cached = CachedStore::new(&ctx, Box::new(disk)).unwrap();

    // A second handle writes straight to the directory, bypassing the
    // cache entirely.
    let side_door: DiskStore<TestItem> = DiskStore::open(dir.path()).unwrap();
    let mut item = TestItem::new("late", "wrote around the cache");
    side_door.put(&ctx, &mut item).unwrap();

    // The cache-only list does not see it yet.
    assert!(cached.list(&ctx).unwrap().is_empty());

    // A get misses the cache, falls back to persistence, and repairs.
    let got = cached.get(&ctx, "late").unwrap().unwrap();
    assert_eq!(got.version(), 1);

    let listed = cached.list(&ctx).unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].id(), "late");
}

/// The end-to-end update-conflict scenario, on every backend.
#[test]
fn update_conflict_scenario() {
    fn run<S: Storer<TestItem>>(store: &S) {
        let ctx = Context::background();

        let mut item = TestItem::new("1", "A");
        store.put(&ctx, &mut item).unwrap();
        assert_eq!(item.version(), 1);

        let got = store.get(&ctx, "1").unwrap().unwrap();
        assert_eq!(got.version(), 1);
        assert_eq!(got.title, "A");

        // A second caller holds the stale version-1 copy.
        let mut stale = store.get(&ctx, "1").unwrap().unwrap();

        let mut current = got;
        current.title = "B".into();
        store.put(&ctx, &mut current).unwrap();
        assert_eq!(current.version(), 2);

        stale.title = "C".into();
        assert!(store.put(&ctx, &mut stale).unwrap_err().is_version_gone());

        let settled = store.get(&ctx, "1").unwrap().unwrap();
        assert_eq!(settled.title, "B");
        assert_eq!(settled.version(), 2);
    }

    run(&MemoryStore::new());

    let dir = tempdir().unwrap();
    run(&DiskStore::open(dir.path()).unwrap());

    let dir = tempdir().unwrap();
    let ctx = Context::background();
    let disk: DiskStore<TestItem> = DiskStore::open(dir.path()).unwrap();
    run(&CachedStore::new(&ctx, Box::new(disk)).unwrap());

    run(&RemoteStub::new());
}
