//! Test utilities for router integration tests
//!
//! Provides the `/foo` + `/bar` route set, views, controllable loaders and a
//! harness wiring a router to in-memory history and container.

#![allow(dead_code)]

use futures::channel::oneshot;
use futures::executor::LocalPool;
use spa_navigator::*;
use std::cell::{Cell, RefCell};
use std::rc::Rc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Page {
    Foo,
    Bar,
}

impl Routable for Page {
    const ALL: &'static [Self] = &[Page::Foo, Page::Bar];

    fn path(self) -> &'static str {
        match self {
            Page::Foo => "/foo",
            Page::Bar => "/bar",
        }
    }
}

#[derive(Default)]
pub struct FooView;

impl View for FooView {
    fn mount(&mut self, cx: &mut MountContext<'_>) -> Result<(), MountError> {
        cx.set_title("foo");
        cx.heading("Foo");
        cx.link("to bar", "/bar");
        Ok(())
    }
}

#[derive(Default)]
pub struct BarView;

impl View for BarView {
    fn mount(&mut self, cx: &mut MountContext<'_>) -> Result<(), MountError> {
        cx.set_title("bar");
        cx.heading("Bar");
        cx.link("home", "/");
        cx.link("nowhere", "/nowhere");
        Ok(())
    }
}

pub struct NotFoundView {
    pub path: String,
}

impl View for NotFoundView {
    fn mount(&mut self, cx: &mut MountContext<'_>) -> Result<(), MountError> {
        cx.set_title("not found");
        cx.text(format!("No page at {}", self.path));
        cx.link("home", "/");
        Ok(())
    }
}

/// View whose mount always fails
#[derive(Default)]
pub struct BrokenView;

impl View for BrokenView {
    fn mount(&mut self, cx: &mut MountContext<'_>) -> Result<(), MountError> {
        cx.set_title("broken");
        Err(MountError::new("template missing"))
    }
}

/// View whose mount panics
#[derive(Default)]
pub struct PanickingView;

impl View for PanickingView {
    fn mount(&mut self, _cx: &mut MountContext<'_>) -> Result<(), MountError> {
        panic!("render exploded");
    }
}

/// View that counts mounts and unmounts
pub struct TrackedView {
    pub title: &'static str,
    pub mounts: Rc<Cell<usize>>,
    pub unmounts: Rc<Cell<usize>>,
}

impl View for TrackedView {
    fn mount(&mut self, cx: &mut MountContext<'_>) -> Result<(), MountError> {
        self.mounts.set(self.mounts.get() + 1);
        cx.set_title(self.title);
        Ok(())
    }

    fn unmount(&mut self) {
        self.unmounts.set(self.unmounts.get() + 1);
    }
}

/// Holds loads until opened
#[derive(Clone, Default)]
pub struct Gate {
    waiting: Rc<RefCell<Vec<oneshot::Sender<()>>>>,
}

impl Gate {
    pub fn new() -> Self {
        Self::default()
    }

    fn wait(&self) -> oneshot::Receiver<()> {
        let (tx, rx) = oneshot::channel();
        self.waiting.borrow_mut().push(tx);
        rx
    }

    /// Release every load currently waiting
    pub fn open(&self) {
        for tx in self.waiting.borrow_mut().drain(..) {
            let _ = tx.send(());
        }
    }

    /// Fail every load currently waiting
    pub fn fail(&self) {
        self.waiting.borrow_mut().clear();
    }

    pub fn pending(&self) -> usize {
        self.waiting.borrow().len()
    }
}

/// Loader for `V` that resolves only once `gate` is opened
pub fn gated_loader<V>(gate: &Gate) -> Loader
where
    V: View + Default + 'static,
{
    let gate = gate.clone();
    Loader::lazy(move || {
        let released = gate.wait();
        async move {
            match released.await {
                Ok(()) => Ok(Loader::factory::<V>()),
                Err(_) => Err(LoadError::new("gate dropped")),
            }
        }
    })
}

/// Loader for `V` that counts invocations
pub fn counting_loader<V>(calls: &Rc<Cell<usize>>) -> Loader
where
    V: View + Default + 'static,
{
    let calls = Rc::clone(calls);
    Loader::lazy(move || {
        calls.set(calls.get() + 1);
        async { Ok(Loader::factory::<V>()) }
    })
}

/// Loader that fails while `offline` is set
pub fn flaky_loader<V>(offline: &Rc<Cell<bool>>) -> Loader
where
    V: View + Default + 'static,
{
    let offline = Rc::clone(offline);
    Loader::lazy(move || {
        let fail = offline.get();
        async move {
            if fail {
                Err(LoadError::new("network error"))
            } else {
                Ok(Loader::factory::<V>())
            }
        }
    })
}

/// The `{ "/foo": FooView, "/bar": BarView }` table
pub fn default_table() -> RouteTable<Page> {
    RouteTable::new(|page| match page {
        Page::Foo => Loader::view::<FooView>(),
        Page::Bar => Loader::lazy(|| async { Ok(Loader::factory::<BarView>()) }),
    })
}

pub struct Harness {
    pub pool: LocalPool,
    pub history: MemoryHistory,
    pub container: MemoryContainer,
    pub router: Router<Page>,
}

impl Harness {
    /// Run `start()` to completion
    pub fn start(&mut self) -> Option<NavigationResult> {
        let router = self.router.clone();
        self.pool.run_until(router.start())
    }

    /// Run `go(path)` to completion
    pub fn go(&mut self, path: &str) -> NavigationResult {
        let router = self.router.clone();
        self.pool.run_until(router.go(path))
    }

    /// Run `reload()` to completion
    pub fn reload(&mut self) -> NavigationResult {
        let router = self.router.clone();
        self.pool.run_until(router.reload())
    }

    /// Simulate the browser back button and let the load finish
    pub fn back(&mut self) -> Option<String> {
        let path = self.history.back();
        self.settle();
        path
    }

    /// Simulate the browser forward button and let the load finish
    pub fn forward(&mut self) -> Option<String> {
        let path = self.history.forward();
        self.settle();
        path
    }

    /// Run every spawned navigation until nothing can make progress
    pub fn settle(&mut self) {
        self.pool.run_until_stalled();
    }

    pub fn title(&self) -> Option<String> {
        self.container.title()
    }

    pub fn address(&self) -> String {
        self.history.current_path()
    }
}

/// Harness over `table` starting at `initial`
pub fn harness_with<F>(initial: &str, table: RouteTable<Page>, configure: F) -> Harness
where
    F: FnOnce(RouterBuilder<Page>) -> RouterBuilder<Page>,
{
    init_logging();
    let pool = LocalPool::new();
    let history = MemoryHistory::new(initial);
    let container = MemoryContainer::new();
    let router = configure(Router::builder(table, Page::Foo)).build(
        history.clone(),
        container.clone(),
        pool.spawner(),
    );
    Harness {
        pool,
        history,
        container,
        router,
    }
}

/// Harness over the default table starting at `initial`
pub fn harness(initial: &str) -> Harness {
    harness_with(initial, default_table(), |builder| builder)
}

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Assert the container shows `title` and no error
pub fn assert_mounted(h: &Harness, title: &str) {
    assert_eq!(h.title().as_deref(), Some(title), "wrong view mounted");
    assert_eq!(h.container.error(), None, "unexpected error indicator");
}
