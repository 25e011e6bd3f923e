//! The router.
//!
//! [`Router`] resolves the current location to a route, loads its view
//! (possibly asynchronously), mounts it into the container and follows
//! history navigation. It is an explicit object built once with
//! [`Router::builder`] and cloned wherever navigation is needed; views get a
//! [`Navigator`] through their mount context.
//!
//! # Navigation
//!
//! Every navigation (start, [`go`](Router::go), [`reload`](Router::reload),
//! a back/forward pop) runs the same steps:
//!
//! 1. Take a new navigation id. This happens when the navigation is issued,
//!    before any of it is awaited or spawned.
//! 2. Rewrite `/` to the default route's path.
//! 3. Resolve the path in the route table (unknown → not-found handling).
//! 4. Get the view factory from the module cache or await the loader.
//! 5. Drop the result if a newer navigation was issued in the meantime.
//! 6. Mount a fresh view into a staged fragment, unmount the previous view,
//!    replace the container's content.
//!
//! Failures are contained: the previous view stays mounted, the container
//! shows an error indicator and the next navigation works normally.
//!
//! # Example
//!
//! ```
//! use futures::executor::LocalPool;
//! use spa_navigator::{
//!     Loader, MemoryContainer, MemoryHistory, MountContext, MountError, Routable, RouteTable,
//!     Router, View,
//! };
//!
//! #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
//! enum Page {
//!     Foo,
//!     Bar,
//! }
//!
//! impl Routable for Page {
//!     const ALL: &'static [Self] = &[Page::Foo, Page::Bar];
//!
//!     fn path(self) -> &'static str {
//!         match self {
//!             Page::Foo => "/foo",
//!             Page::Bar => "/bar",
//!         }
//!     }
//! }
//!
//! #[derive(Default)]
//! struct Foo;
//!
//! impl View for Foo {
//!     fn mount(&mut self, cx: &mut MountContext<'_>) -> Result<(), MountError> {
//!         cx.set_title("foo");
//!         Ok(())
//!     }
//! }
//!
//! #[derive(Default)]
//! struct Bar;
//!
//! impl View for Bar {
//!     fn mount(&mut self, cx: &mut MountContext<'_>) -> Result<(), MountError> {
//!         cx.set_title("bar");
//!         Ok(())
//!     }
//! }
//!
//! let table = RouteTable::new(|page| match page {
//!     Page::Foo => Loader::view::<Foo>(),
//!     Page::Bar => Loader::lazy(|| async { Ok(Loader::factory::<Bar>()) }),
//! });
//!
//! let mut pool = LocalPool::new();
//! let history = MemoryHistory::new("/");
//! let container = MemoryContainer::new();
//! let router = Router::builder(table, Page::Foo).build(
//!     history.clone(),
//!     container.clone(),
//!     pool.spawner(),
//! );
//!
//! pool.run_until(router.start());
//! assert_eq!(container.title().as_deref(), Some("foo"));
//!
//! pool.run_until(router.go("/bar"));
//! assert_eq!(container.title().as_deref(), Some("bar"));
//!
//! history.back();
//! pool.run_until_stalled();
//! assert_eq!(container.title().as_deref(), Some("foo"));
//! ```

#[cfg(feature = "cache")]
use crate::cache::{CacheStats, ModuleCache};
use crate::container::Container;
use crate::error::{ErrorHandlers, NavigationError, NavigationResult};
use crate::history::History;
use crate::route::{Loader, Routable, RouteTable, ViewFactory};
use crate::view::{Fragment, MountContext, View};
use crate::{debug_log, error_log, info_log, trace_log, warn_log};
use futures::task::{LocalSpawn, LocalSpawnExt};
use std::any::Any;
use std::cell::{Cell, RefCell};
use std::fmt;
use std::future::Future;
use std::panic::{self, AssertUnwindSafe};
use std::rc::{Rc, Weak};

/// The root path, rewritten to the default route before resolution.
pub const ROOT_PATH: &str = "/";

/// Default number of loaded modules kept by the module cache.
pub const DEFAULT_MODULE_CACHE_CAPACITY: usize = 64;

// ============================================================================
// Configuration
// ============================================================================

/// Router settings, filled in through [`RouterBuilder`].
#[derive(Debug, Clone)]
pub struct RouterConfig<R> {
    /// Route mounted for `/`.
    pub default_route: R,
    /// Maximum number of loaded modules kept by the module cache. Ignored
    /// without the `cache` feature.
    pub module_cache_capacity: usize,
}

impl<R: Routable> RouterConfig<R> {
    pub fn new(default_route: R) -> Self {
        Self {
            default_route,
            module_cache_capacity: DEFAULT_MODULE_CACHE_CAPACITY,
        }
    }
}

// ============================================================================
// Status
// ============================================================================

/// Where the router is in its Idle → Resolving → Mounted cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouterStatus<R> {
    /// Nothing has been navigated yet.
    Idle,
    /// The latest navigation is waiting for its view to load.
    Resolving { path: String },
    /// The view for `route` is mounted.
    Mounted { route: R, path: String },
    /// The latest navigation targeted an unknown path.
    NotFound { path: String },
    /// The latest navigation failed; the previous view is still mounted.
    Failed { error: NavigationError },
}

// ============================================================================
// Navigator
// ============================================================================

/// Cheap handle for triggering navigation from inside views and containers.
///
/// [`go`](Navigator::go) schedules the navigation on the router's spawner and
/// returns immediately. The handle does not keep the router alive.
#[derive(Clone)]
pub struct Navigator {
    request: Rc<dyn Fn(&str)>,
}

impl Navigator {
    /// Push `path` and load its view.
    pub fn go(&self, path: &str) {
        (self.request)(path);
    }

    /// A navigator not connected to any router; requests are dropped.
    pub fn detached() -> Self {
        Self {
            request: Rc::new(|path: &str| {
                debug_log!("Detached navigator ignoring '{}'", path);
            }),
        }
    }
}

impl fmt::Debug for Navigator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Navigator").finish_non_exhaustive()
    }
}

// ============================================================================
// Router
// ============================================================================

struct ActiveView<R> {
    route: Option<R>,
    path: String,
    view: Box<dyn View>,
}

struct RouterInner<R: Routable> {
    table: RouteTable<R>,
    config: RouterConfig<R>,
    handlers: ErrorHandlers,
    history: RefCell<Box<dyn History>>,
    container: RefCell<Box<dyn Container>>,
    spawner: Box<dyn LocalSpawn>,
    #[cfg(feature = "cache")]
    cache: RefCell<ModuleCache<R>>,
    /// Id of the most recently issued navigation. Loads that finish under an
    /// older id are discarded.
    navigation_id: Cell<u64>,
    started: Cell<bool>,
    active: RefCell<Option<ActiveView<R>>>,
    status: RefCell<RouterStatus<R>>,
}

/// Client-side path router.
///
/// Single-threaded: clones share state through `Rc`, and every future it
/// returns is `!Send`.
pub struct Router<R: Routable> {
    inner: Rc<RouterInner<R>>,
}

impl<R: Routable> Clone for Router<R> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<R: Routable> Router<R> {
    /// Start configuring a router over `table`, mounting `default_route` for
    /// `/`.
    pub fn builder(table: RouteTable<R>, default_route: R) -> RouterBuilder<R> {
        RouterBuilder::new(table, default_route)
    }

    /// Subscribe to back/forward events and mount the view for the current
    /// location.
    ///
    /// Returns `None` without doing anything if the router was already
    /// started.
    pub async fn start(&self) -> Option<NavigationResult> {
        if self.inner.started.replace(true) {
            debug_log!("Router already started; ignoring start()");
            return None;
        }

        let weak: Weak<RouterInner<R>> = Rc::downgrade(&self.inner);
        self.inner
            .history
            .borrow_mut()
            .subscribe(Box::new(move |path: String| {
                if let Some(inner) = weak.upgrade() {
                    debug_log!("History pop to '{}'", path);
                    Router { inner }.spawn_pop(path);
                }
            }));

        let path = self.current_path();
        info_log!("Router started at '{}'", path);
        let navigation_id = self.start_navigation();
        Some(self.load(navigation_id, &path).await)
    }

    /// Push `path` onto history and mount its view.
    ///
    /// The history entry and the navigation id are taken right away, so a
    /// navigation issued later wins even if this future is polled last.
    pub fn go(&self, path: &str) -> impl Future<Output = NavigationResult> {
        let from = self.current_path();
        info_log!("Navigation push: '{}' → '{}'", from, path);
        self.inner.history.borrow_mut().push(path);
        self.issue(path.to_string())
    }

    /// Typed form of [`go`](Self::go).
    pub fn go_to(&self, route: R) -> impl Future<Output = NavigationResult> {
        self.go(route.path())
    }

    /// Load the view for the current location again, without touching
    /// history. Use it to retry after a failed load.
    pub fn reload(&self) -> impl Future<Output = NavigationResult> {
        let path = self.current_path();
        debug_log!("Reloading '{}'", path);
        self.issue(path)
    }

    /// Handle for triggering navigation from views.
    pub fn navigator(&self) -> Navigator {
        let weak: Weak<RouterInner<R>> = Rc::downgrade(&self.inner);
        Navigator {
            request: Rc::new(move |path: &str| match weak.upgrade() {
                Some(inner) => Router { inner }.spawn_go(path),
                None => {
                    warn_log!("Router dropped; ignoring navigation to '{}'", path);
                }
            }),
        }
    }

    /// The path shown in the address bar.
    pub fn current_path(&self) -> String {
        self.inner.history.borrow().current_path()
    }

    /// Route of the mounted view. `None` before the first mount or while the
    /// not-found view is shown.
    pub fn current_route(&self) -> Option<R> {
        self.inner
            .active
            .borrow()
            .as_ref()
            .and_then(|active| active.route)
    }

    pub fn status(&self) -> RouterStatus<R> {
        self.inner.status.borrow().clone()
    }

    pub fn is_started(&self) -> bool {
        self.inner.started.get()
    }

    /// Number of navigations issued so far.
    pub fn navigation_count(&self) -> u64 {
        self.inner.navigation_id.get()
    }

    pub fn config(&self) -> &RouterConfig<R> {
        &self.inner.config
    }

    pub fn table(&self) -> &RouteTable<R> {
        &self.inner.table
    }

    #[cfg(feature = "cache")]
    pub fn cache_stats(&self) -> CacheStats {
        self.inner.cache.borrow().stats().clone()
    }

    /// Forget every loaded module; the next navigation to each route runs
    /// its loader again.
    #[cfg(feature = "cache")]
    pub fn clear_cache(&self) {
        self.inner.cache.borrow_mut().clear();
    }

    // ========================================================================
    // Load pipeline
    // ========================================================================

    /// Take a navigation id now and return the load that runs under it.
    fn issue(&self, path: String) -> impl Future<Output = NavigationResult> {
        let navigation_id = self.start_navigation();
        let router = self.clone();
        async move { router.load(navigation_id, &path).await }
    }

    async fn load(&self, navigation_id: u64, path: &str) -> NavigationResult {
        let path = self.normalize(path);
        trace_log!("Navigation #{} resolving '{}'", navigation_id, path);
        self.set_status(RouterStatus::Resolving { path: path.clone() });

        let Some((route, loader)) = self.inner.table.lookup(&path) else {
            return self.not_found(path);
        };

        let loaded = self.obtain(route, loader.clone(), &path).await;
        if !self.is_navigation_current(navigation_id) {
            debug_log!(
                "Navigation #{} to '{}' superseded by #{}; discarding",
                navigation_id,
                path,
                self.inner.navigation_id.get()
            );
            return NavigationResult::Superseded { path };
        }

        let factory = match loaded {
            Ok(factory) => factory,
            Err(error) => return self.fail(error),
        };

        match self.commit(Some(route), &path, factory.instantiate()) {
            Ok(()) => {
                info_log!("Navigation complete: '{}' ({:?})", path, route);
                self.set_status(RouterStatus::Mounted {
                    route,
                    path: path.clone(),
                });
                NavigationResult::Success { path }
            }
            Err(error) => self.fail(error),
        }
    }

    /// Get the view factory for `route`, from the module cache or the loader.
    async fn obtain(
        &self,
        route: R,
        loader: Loader,
        path: &str,
    ) -> Result<ViewFactory, NavigationError> {
        #[cfg(feature = "cache")]
        {
            let cached = self.inner.cache.borrow_mut().get(route);
            if let Some(factory) = cached {
                return Ok(factory);
            }
        }

        debug_log!("Loading view for {:?}", route);
        let factory = loader
            .load()
            .await
            .map_err(|err| NavigationError::LoadFailed {
                path: path.to_string(),
                message: err.to_string(),
            })?;

        #[cfg(feature = "cache")]
        self.inner.cache.borrow_mut().insert(route, factory.clone());

        Ok(factory)
    }

    /// Mount `view` into a staged fragment, then swap it in for the
    /// previous view.
    fn commit(
        &self,
        route: Option<R>,
        path: &str,
        mut view: Box<dyn View>,
    ) -> Result<(), NavigationError> {
        let navigator = self.navigator();
        let mut fragment = Fragment::new();
        let mounted = panic::catch_unwind(AssertUnwindSafe(|| {
            view.mount(&mut MountContext::new(&mut fragment, &navigator, path))
        }));
        let message = match mounted {
            Ok(Ok(())) => None,
            Ok(Err(err)) => Some(err.to_string()),
            Err(payload) => Some(panic_message(payload.as_ref())),
        };
        if let Some(message) = message {
            return Err(NavigationError::MountFailed {
                path: path.to_string(),
                message,
            });
        }

        let previous = self.inner.active.borrow_mut().take();
        if let Some(mut previous) = previous {
            trace_log!("Unmounting view for '{}'", previous.path);
            previous.view.unmount();
        }

        self.inner.container.borrow_mut().replace(fragment);
        *self.inner.active.borrow_mut() = Some(ActiveView {
            route,
            path: path.to_string(),
            view,
        });
        Ok(())
    }

    fn not_found(&self, path: String) -> NavigationResult {
        warn_log!("No route registered for '{}'", path);
        let error = NavigationError::RouteNotFound { path: path.clone() };

        match self.inner.handlers.not_found_view(&path) {
            Some(view) => {
                if let Err(mount_error) = self.commit(None, &path, view) {
                    return self.fail(mount_error);
                }
            }
            None => self.inner.container.borrow_mut().show_error(&error),
        }

        self.inner.handlers.report(&error);
        self.set_status(RouterStatus::NotFound { path: path.clone() });
        NavigationResult::NotFound { path }
    }

    fn fail(&self, error: NavigationError) -> NavigationResult {
        error_log!("Navigation failed: {}", error);
        self.inner.container.borrow_mut().show_error(&error);
        self.inner.handlers.report(&error);
        self.set_status(RouterStatus::Failed {
            error: error.clone(),
        });
        NavigationResult::Error(error)
    }

    fn normalize(&self, path: &str) -> String {
        if path == ROOT_PATH {
            let default = self.inner.config.default_route.path();
            trace_log!("Rewriting '{}' to default '{}'", ROOT_PATH, default);
            default.to_string()
        } else {
            path.to_string()
        }
    }

    /// Start a new navigation and return its id
    fn start_navigation(&self) -> u64 {
        let id = self.inner.navigation_id.get() + 1;
        self.inner.navigation_id.set(id);
        id
    }

    /// Check if a navigation is still the latest one issued
    fn is_navigation_current(&self, navigation_id: u64) -> bool {
        self.inner.navigation_id.get() == navigation_id
    }

    fn set_status(&self, status: RouterStatus<R>) {
        *self.inner.status.borrow_mut() = status;
    }

    // ========================================================================
    // Event-driven navigation
    // ========================================================================

    fn spawn_pop(&self, path: String) {
        let load = self.issue(path);
        self.spawn(async move {
            load.await;
        });
    }

    fn spawn_go(&self, path: &str) {
        let navigation = self.go(path);
        self.spawn(async move {
            navigation.await;
        });
    }

    fn spawn<F>(&self, task: F)
    where
        F: Future<Output = ()> + 'static,
    {
        if let Err(err) = self.inner.spawner.spawn_local(task) {
            self.fail(NavigationError::SpawnFailed {
                message: err.to_string(),
            });
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    let detail = payload
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str));
    match detail {
        Some(detail) => format!("view panicked: {}", detail),
        None => "view panicked".to_string(),
    }
}

impl<R: Routable> fmt::Debug for Router<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Router")
            .field("table", &self.inner.table)
            .field("config", &self.inner.config)
            .field("status", &self.inner.status.borrow())
            .field("started", &self.inner.started.get())
            .finish_non_exhaustive()
    }
}

// ============================================================================
// RouterBuilder
// ============================================================================

/// Builder returned by [`Router::builder`].
pub struct RouterBuilder<R: Routable> {
    table: RouteTable<R>,
    config: RouterConfig<R>,
    handlers: ErrorHandlers,
}

impl<R: Routable> RouterBuilder<R> {
    pub fn new(table: RouteTable<R>, default_route: R) -> Self {
        Self {
            table,
            config: RouterConfig::new(default_route),
            handlers: ErrorHandlers::new(),
        }
    }

    pub fn module_cache_capacity(mut self, capacity: usize) -> Self {
        self.config.module_cache_capacity = capacity;
        self
    }

    pub fn error_handlers(mut self, handlers: ErrorHandlers) -> Self {
        self.handlers = handlers;
        self
    }

    /// View mounted for unknown paths.
    pub fn on_not_found<F>(mut self, handler: F) -> Self
    where
        F: Fn(&str) -> Box<dyn View> + 'static,
    {
        self.handlers = self.handlers.on_not_found(handler);
        self
    }

    /// Hook notified of every contained failure.
    pub fn on_error<F>(mut self, handler: F) -> Self
    where
        F: Fn(&NavigationError) + 'static,
    {
        self.handlers = self.handlers.on_error(handler);
        self
    }

    /// Wire the router to its history, mount container and spawner.
    ///
    /// The spawner runs navigations triggered by events (back/forward,
    /// followed links).
    pub fn build<H, C, S>(self, history: H, container: C, spawner: S) -> Router<R>
    where
        H: History + 'static,
        C: Container + 'static,
        S: LocalSpawn + 'static,
    {
        info_log!(
            "Building router with {} routes (default '{}')",
            self.table.len(),
            self.config.default_route.path()
        );

        let router = Router {
            inner: Rc::new(RouterInner {
                #[cfg(feature = "cache")]
                cache: RefCell::new(ModuleCache::with_capacity(
                    self.config.module_cache_capacity,
                )),
                table: self.table,
                config: self.config,
                handlers: self.handlers,
                history: RefCell::new(Box::new(history)),
                container: RefCell::new(Box::new(container)),
                spawner: Box::new(spawner),
                navigation_id: Cell::new(0),
                started: Cell::new(false),
                active: RefCell::new(None),
                status: RefCell::new(RouterStatus::Idle),
            }),
        };

        let navigator = router.navigator();
        router.inner.container.borrow_mut().attach(navigator);
        router
    }
}

impl<R: Routable> fmt::Debug for RouterBuilder<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RouterBuilder")
            .field("table", &self.table)
            .field("config", &self.config)
            .field("handlers", &self.handlers)
            .finish()
    }
}

// ============================================================================
// Tests
// ============================================================================
