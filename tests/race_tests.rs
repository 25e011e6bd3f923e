//! Overlapping navigations and module caching.

mod common;

use common::*;
use futures::task::LocalSpawnExt;
use spa_navigator::*;
use std::cell::{Cell, RefCell};
use std::rc::Rc;

/// Spawn `go(path)` on the harness pool, recording its result
fn spawn_go(h: &Harness, path: &'static str) -> Rc<RefCell<Option<NavigationResult>>> {
    let slot = Rc::new(RefCell::new(None));
    let sink = Rc::clone(&slot);
    let router = h.router.clone();
    h.pool
        .spawner()
        .spawn_local(async move {
            let result = router.go(path).await;
            *sink.borrow_mut() = Some(result);
        })
        .unwrap();
    slot
}

#[test]
fn test_stale_load_is_discarded() {
    let gate = Gate::new();
    let table = RouteTable::new(|page| match page {
        Page::Foo => Loader::view::<FooView>(),
        Page::Bar => gated_loader::<BarView>(&gate),
    });
    let mut h = harness_with("/", table, |builder| builder);
    h.start();

    // slow navigation to /bar stalls on the gate
    let slow = spawn_go(&h, "/bar");
    h.settle();
    assert_eq!(gate.pending(), 1);
    assert_eq!(h.address(), "/bar");

    // a later navigation completes first
    assert!(h.go("/foo").is_success());
    assert_mounted(&h, "foo");

    // the slow load finishing late must not overwrite it
    gate.open();
    h.settle();

    assert_eq!(
        *slow.borrow(),
        Some(NavigationResult::Superseded {
            path: "/bar".to_string()
        })
    );
    assert_mounted(&h, "foo");
    assert_eq!(h.router.current_route(), Some(Page::Foo));
    assert_eq!(h.container.mount_count(), 2);
}

#[test]
fn test_latest_of_two_slow_loads_wins() {
    let foo_gate = Gate::new();
    let bar_gate = Gate::new();
    let table = RouteTable::new(|page| match page {
        Page::Foo => gated_loader::<FooView>(&foo_gate),
        Page::Bar => gated_loader::<BarView>(&bar_gate),
    });
    let mut h = harness_with("/", table, |builder| builder);

    let first = spawn_go(&h, "/foo");
    h.settle();
    let second = spawn_go(&h, "/bar");
    h.settle();
    assert_eq!(foo_gate.pending() + bar_gate.pending(), 2);

    // release in reverse order of issue
    bar_gate.open();
    h.settle();
    foo_gate.open();
    h.settle();

    assert!(second.borrow().as_ref().unwrap().is_success());
    assert!(first.borrow().as_ref().unwrap().is_superseded());
    assert_mounted(&h, "bar");
    assert_eq!(h.address(), "/bar");
}

#[test]
fn test_back_during_slow_load() {
    let gate = Gate::new();
    let table = RouteTable::new(|page| match page {
        Page::Foo => Loader::view::<FooView>(),
        Page::Bar => gated_loader::<BarView>(&gate),
    });
    let mut h = harness_with("/", table, |builder| builder);
    h.start();

    let slow = spawn_go(&h, "/bar");
    h.settle();
    assert_eq!(gate.pending(), 1);

    // back before /bar finished loading
    assert_eq!(h.back().as_deref(), Some("/"));
    assert_mounted(&h, "foo");

    gate.open();
    h.settle();
    assert!(slow.borrow().as_ref().unwrap().is_superseded());
    assert_eq!(h.address(), "/");
    assert_mounted(&h, "foo");

    // forward again, this time letting the load finish
    h.forward();
    gate.open();
    h.settle();
    assert_eq!(h.address(), "/bar");
    assert_mounted(&h, "bar");
}

#[test]
fn test_failed_stale_load_reports_nothing() {
    let gate = Gate::new();
    let errors = Rc::new(Cell::new(0));
    let counter = Rc::clone(&errors);
    let table = RouteTable::new(|page| match page {
        Page::Foo => Loader::view::<FooView>(),
        Page::Bar => gated_loader::<BarView>(&gate),
    });
    let mut h = harness_with("/", table, move |builder| {
        builder.on_error(move |_| counter.set(counter.get() + 1))
    });
    h.start();

    let slow = spawn_go(&h, "/bar");
    h.settle();
    h.go("/foo");

    gate.fail();
    h.settle();

    assert!(slow.borrow().as_ref().unwrap().is_superseded());
    assert_eq!(errors.get(), 0);
    assert_mounted(&h, "foo");
}

#[test]
fn test_pop_then_go_keeps_view_in_sync() {
    let mut h = harness("/");
    h.start();
    h.go("/bar");

    // the pop load is queued but not yet run when go() is issued
    h.history.back();
    let result = h.go("/bar");
    h.settle();

    assert!(result.is_success());
    assert_eq!(h.address(), "/bar");
    assert_mounted(&h, "bar");
    assert_eq!(
        h.router.status(),
        RouterStatus::Mounted {
            route: Page::Bar,
            path: "/bar".to_string()
        }
    );
}

#[cfg(feature = "cache")]
#[test]
fn test_loader_runs_once_per_route() {
    let foo_calls = Rc::new(Cell::new(0));
    let bar_calls = Rc::new(Cell::new(0));
    let table = RouteTable::new(|page| match page {
        Page::Foo => counting_loader::<FooView>(&foo_calls),
        Page::Bar => counting_loader::<BarView>(&bar_calls),
    });
    let mut h = harness_with("/", table, |builder| builder);

    h.start();
    h.go("/bar");
    h.back();
    h.forward();
    h.go("/foo");

    assert_eq!(foo_calls.get(), 1);
    assert_eq!(bar_calls.get(), 1);
    let stats = h.router.cache_stats();
    assert_eq!(stats.misses, 2);
    assert_eq!(stats.hits, 3);

    h.router.clear_cache();
    h.go("/bar");
    assert_eq!(bar_calls.get(), 2);
}

#[cfg(not(feature = "cache"))]
#[test]
fn test_loader_runs_every_navigation() {
    let foo_calls = Rc::new(std::cell::Cell::new(0));
    let table = RouteTable::new(|page| match page {
        Page::Foo => counting_loader::<FooView>(&foo_calls),
        Page::Bar => Loader::view::<BarView>(),
    });
    let mut h = harness_with("/", table, |builder| builder);

    h.start();
    h.go("/bar");
    h.back();

    assert_eq!(foo_calls.get(), 2);
}
