//! Backend conformance suites.
//!
//! Every [`Storer`] backend must pass both suites against a freshly
//! constructed (empty) store: [`storer_suite`] covers the basic
//! contract, [`optimistic_locking_suite`] the version-conflict
//! semantics under contention. The suites use disjoint ids and may run
//! one after the other on the same store instance.

use crate::fixtures::TestItem;
use optikv_store::{Context, Identified, Storer};
use rand::Rng;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

/// Exercises the basic contract: empty listing, insert, retrieve,
/// update, delete, idempotent delete, and a put/delete churn across
/// threads.
///
/// # Panics
///
/// Panics on the first contract violation.
pub fn storer_suite<S: Storer<TestItem>>(store: &S) {
    let ctx = Context::background();

    // A fresh store lists empty.
    assert!(
        store.list(&ctx).unwrap().is_empty(),
        "fresh store must list empty"
    );

    // First insert: stored version is 1.
    let mut item1 = TestItem::new("1", "Title 1");
    store.put(&ctx, &mut item1).unwrap();
    assert_eq!(item1.version(), 1, "first put must yield version 1");

    // Retrieve it.
    let got = store.get(&ctx, "1").unwrap().expect("item 1 must exist");
    assert_eq!(got.ident, item1.ident);
    assert_eq!(got.title, "Title 1");
    let mut item1 = got;

    // List the single item.
    let listed = store.list(&ctx).unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].ident, item1.ident);

    // Update in place; still one item, version bumped.
    item1.title = "Title 1 updated".into();
    store.put(&ctx, &mut item1).unwrap();
    assert_eq!(item1.version(), 2);

    let listed = store.list(&ctx).unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].title, "Title 1 updated");

    // Second insert.
    let mut item2 = TestItem::new("2", "Title 2");
    store.put(&ctx, &mut item2).unwrap();
    assert_eq!(store.list(&ctx).unwrap().len(), 2);

    // Delete one; the other remains.
    store.delete(&ctx, "1").unwrap();
    let listed = store.list(&ctx).unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].id(), "2");
    assert!(store.get(&ctx, "1").unwrap().is_none());

    // Deleting an absent id is not an error.
    store.delete(&ctx, "1").unwrap();
    store.delete(&ctx, "never-inserted").unwrap();

    // Put/delete churn: deletions race the main thread's inserts.
    std::thread::scope(|scope| {
        for n in 0..100 {
            let id = format!("churn-{n}");
            let mut item = TestItem::new(&id, &id);
            store.put(&ctx, &mut item).unwrap();

            scope.spawn(move || {
                let ctx = Context::background();
                store.delete(&ctx, &id).unwrap();
            });
        }
    });
    let listed = store.list(&ctx).unwrap();
    assert_eq!(listed.len(), 1, "churn items must all be deleted");
}

/// Exercises optimistic locking: a stale writer must fail, and N
/// concurrent read-modify-write workers retrying on conflict must lose
/// no update.
///
/// # Panics
///
/// Panics on the first contract violation.
pub fn optimistic_locking_suite<S: Storer<TestItem>>(store: &S) {
    let ctx = Context::background();

    // Two callers read the same version; the second write is stale.
    let mut item = TestItem::new("optimistic-1", "Title 1");
    store.put(&ctx, &mut item).unwrap();

    let mut first = store.get(&ctx, "optimistic-1").unwrap().unwrap();
    first.counter += 1;
    let mut second = store.get(&ctx, "optimistic-1").unwrap().unwrap();
    second.counter += 1;

    store.put(&ctx, &mut first).unwrap();
    let err = store.put(&ctx, &mut second).unwrap_err();
    assert!(err.is_version_gone(), "stale put must conflict, got: {err}");

    let settled = store.get(&ctx, "optimistic-1").unwrap().unwrap();
    assert_eq!(settled.counter, 1);
    assert_eq!(settled.version(), 2);

    // N workers increment one counter, retrying with bounded jitter on
    // conflict. No update may be lost.
    const WORKERS: usize = 50;

    let mut item = TestItem::new("optimistic-2", "Title 1");
    store.put(&ctx, &mut item).unwrap();

    let collisions = AtomicU32::new(0);

    std::thread::scope(|scope| {
        for _ in 0..WORKERS {
            scope.spawn(|| {
                let ctx = Context::background();
                loop {
                    let mut item = store.get(&ctx, "optimistic-2").unwrap().unwrap();
                    item.counter += 1;

                    match store.put(&ctx, &mut item) {
                        Ok(()) => return,
                        Err(err) if err.is_version_gone() => {
                            collisions.fetch_add(1, Ordering::Relaxed);
                            let jitter = rand::thread_rng().gen_range(0..WORKERS as u64);
                            std::thread::sleep(Duration::from_millis(jitter));
                        }
                        Err(err) => panic!("unexpected put failure: {err}"),
                    }
                }
            });
        }
    });

    let settled = store.get(&ctx, "optimistic-2").unwrap().unwrap();
    assert_eq!(
        settled.counter, WORKERS as i64,
        "lost updates after {} collisions",
        collisions.load(Ordering::Relaxed)
    );
}
