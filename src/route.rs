//! Route identifiers, view loaders and the route table.
//!
//! Routes are an enum implementing [`Routable`]. Each variant owns one literal
//! path and the table maps every variant to a [`Loader`] that asynchronously
//! produces a [`ViewFactory`].
//!
//! ```
//! use spa_navigator::route::{Loader, Routable, RouteTable};
//! use spa_navigator::view::{MountContext, View};
//! use spa_navigator::MountError;
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
//! let table = RouteTable::new(|page| match page {
//!     Page::Foo => Loader::view::<Foo>(),
//!     Page::Bar => Loader::lazy(|| async { Ok(Loader::factory::<Foo>()) }),
//! });
//!
//! assert_eq!(table.resolve("/bar"), Some(Page::Bar));
//! assert_eq!(table.resolve("/baz"), None);
//! ```

use crate::error::LoadError;
use crate::view::View;
use crate::{trace_log, warn_log};
use futures::future::{self, FutureExt, LocalBoxFuture};
use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::hash::Hash;
use std::rc::Rc;

// ============================================================================
// Routable
// ============================================================================

/// A closed set of routes, usually a fieldless enum.
///
/// Paths are matched literally; `"/foo"` and `"/foo/"` are different paths.
pub trait Routable: Copy + Eq + Hash + fmt::Debug + 'static {
    /// Every route, in no particular order.
    const ALL: &'static [Self];

    /// The literal path this route is served at.
    fn path(self) -> &'static str;

    /// Exact-match lookup of `path` among [`ALL`](Self::ALL).
    fn from_path(path: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|route| route.path() == path)
    }
}

// ============================================================================
// ViewFactory
// ============================================================================

/// Constructs a fresh view instance for each navigation.
#[derive(Clone)]
pub struct ViewFactory {
    make: Rc<dyn Fn() -> Box<dyn View>>,
}

impl ViewFactory {
    pub fn new<F>(make: F) -> Self
    where
        F: Fn() -> Box<dyn View> + 'static,
    {
        Self {
            make: Rc::new(make),
        }
    }

    /// Factory for a `Default`-constructible view type.
    pub fn of<V>() -> Self
    where
        V: View + Default + 'static,
    {
        Self::new(|| Box::new(V::default()))
    }

    pub fn instantiate(&self) -> Box<dyn View> {
        (self.make)()
    }
}

impl fmt::Debug for ViewFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ViewFactory").finish_non_exhaustive()
    }
}

// ============================================================================
// Loader
// ============================================================================

/// Future returned by a [`Loader`].
pub type LoadFuture = LocalBoxFuture<'static, Result<ViewFactory, LoadError>>;

/// Asynchronously produces the view factory for one route.
///
/// Loaders model deferred code: the future may wait on a network fetch before
/// resolving. They are invoked again on every navigation unless the module
/// cache already holds the route.
#[derive(Clone)]
pub struct Loader {
    load: Rc<dyn Fn() -> LoadFuture>,
}

impl Loader {
    /// Loader backed by an async closure.
    pub fn lazy<F, Fut>(load: F) -> Self
    where
        F: Fn() -> Fut + 'static,
        Fut: Future<Output = Result<ViewFactory, LoadError>> + 'static,
    {
        Self {
            load: Rc::new(move || load().boxed_local()),
        }
    }

    /// Loader that resolves immediately with `factory`.
    pub fn ready(factory: ViewFactory) -> Self {
        Self::lazy(move || future::ready(Ok(factory.clone())))
    }

    /// Loader that resolves immediately with a `Default` view of type `V`.
    pub fn view<V>() -> Self
    where
        V: View + Default + 'static,
    {
        Self::ready(ViewFactory::of::<V>())
    }

    /// Shorthand for [`ViewFactory::of`], handy inside lazy loaders.
    pub fn factory<V>() -> ViewFactory
    where
        V: View + Default + 'static,
    {
        ViewFactory::of::<V>()
    }

    /// Start loading.
    pub fn load(&self) -> LoadFuture {
        (self.load)()
    }
}

impl fmt::Debug for Loader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Loader").finish_non_exhaustive()
    }
}

// ============================================================================
// RouteTable
// ============================================================================

/// Static mapping from route to loader, built once at startup.
pub struct RouteTable<R: Routable> {
    loaders: HashMap<R, Loader>,
}

impl<R: Routable> RouteTable<R> {
    /// Build the table by asking `loader_for` for every route in
    /// [`Routable::ALL`].
    pub fn new<F>(mut loader_for: F) -> Self
    where
        F: FnMut(R) -> Loader,
    {
        let mut loaders = HashMap::with_capacity(R::ALL.len());
        for (index, &route) in R::ALL.iter().enumerate() {
            if let Some(first) = R::ALL[..index]
                .iter()
                .find(|earlier| **earlier != route && earlier.path() == route.path())
            {
                warn_log!(
                    "Routes {:?} and {:?} share path '{}'; it resolves to {:?}",
                    first,
                    route,
                    route.path(),
                    first
                );
            }
            loaders.insert(route, loader_for(route));
        }
        Self { loaders }
    }

    /// Resolve a path to its route by exact string match.
    pub fn resolve(&self, path: &str) -> Option<R> {
        self.lookup(path).map(|(route, _)| route)
    }

    /// Resolve a path to its route and that route's loader.
    pub fn lookup(&self, path: &str) -> Option<(R, &Loader)> {
        let entry = R::from_path(path)
            .and_then(|route| self.loaders.get(&route).map(|loader| (route, loader)));
        trace_log!(
            "Resolved '{}' to {:?}",
            path,
            entry.as_ref().map(|(route, _)| route)
        );
        entry
    }

    pub fn loader(&self, route: R) -> Option<&Loader> {
        self.loaders.get(&route)
    }

    pub fn routes(&self) -> impl Iterator<Item = R> + '_ {
        self.loaders.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.loaders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.loaders.is_empty()
    }
}

impl<R: Routable> fmt::Debug for RouteTable<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RouteTable")
            .field("routes", &self.loaders.keys().collect::<Vec<_>>())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::MountError;
    use crate::view::{Fragment, MountContext};
    use crate::Navigator;
    use std::cell::Cell;

    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    enum Page {
        Home,
        About,
    }

    impl Routable for Page {
        const ALL: &'static [Self] = &[Page::Home, Page::About];

        fn path(self) -> &'static str {
            match self {
                Page::Home => "/home",
                Page::About => "/about",
            }
        }
    }

    #[derive(Default)]
    struct Titled;

    impl View for Titled {
        fn mount(&mut self, cx: &mut MountContext<'_>) -> Result<(), MountError> {
            cx.set_title("titled");
            Ok(())
        }
    }

    fn title_of(factory: &ViewFactory) -> Option<String> {
        let mut fragment = Fragment::new();
        let navigator = Navigator::detached();
        let mut view = factory.instantiate();
        view.mount(&mut MountContext::new(&mut fragment, &navigator, "/"))
            .ok()?;
        fragment.title().map(str::to_string)
    }

    #[test]
    fn test_from_path_exact_match() {
        assert_eq!(Page::from_path("/home"), Some(Page::Home));
        assert_eq!(Page::from_path("/about"), Some(Page::About));
        assert_eq!(Page::from_path("/about/"), None);
        assert_eq!(Page::from_path("/"), None);
        assert_eq!(Page::from_path(""), None);
    }

    #[test]
    fn test_table_covers_all_routes() {
        let table = RouteTable::new(|_page: Page| Loader::view::<Titled>());
        assert_eq!(table.len(), 2);
        assert!(table.loader(Page::Home).is_some());
        assert!(table.loader(Page::About).is_some());
        assert_eq!(table.resolve("/home"), Some(Page::Home));
        assert_eq!(table.resolve("/missing"), None);
    }

    #[test]
    fn test_lookup_returns_route_loader() {
        let table = RouteTable::new(|page| match page {
            Page::Home => Loader::view::<Titled>(),
            Page::About => Loader::lazy(|| async { Err(LoadError::new("offline")) }),
        });

        let (route, loader) = table.lookup("/about").unwrap();
        assert_eq!(route, Page::About);
        assert!(pollster::block_on(loader.load()).is_err());
        assert!(table.lookup("/about/").is_none());
    }

    #[test]
    fn test_duplicate_path_resolves_to_first_listed() {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        enum Alias {
            Index,
            Home,
            Other,
        }

        impl Routable for Alias {
            const ALL: &'static [Self] = &[Alias::Index, Alias::Home, Alias::Other];

            fn path(self) -> &'static str {
                match self {
                    Alias::Index | Alias::Home => "/home",
                    Alias::Other => "/other",
                }
            }
        }

        let table = RouteTable::new(|_alias: Alias| Loader::view::<Titled>());
        assert_eq!(table.len(), 3);
        assert_eq!(table.resolve("/home"), Some(Alias::Index));
        assert_eq!(table.resolve("/other"), Some(Alias::Other));
    }

    #[test]
    fn test_ready_loader_resolves() {
        let loader = Loader::view::<Titled>();
        let factory = pollster::block_on(loader.load()).unwrap();
        assert_eq!(title_of(&factory).as_deref(), Some("titled"));
    }

    #[test]
    fn test_lazy_loader_runs_each_call() {
        let calls = Rc::new(Cell::new(0));
        let counter = Rc::clone(&calls);
        let loader = Loader::lazy(move || {
            counter.set(counter.get() + 1);
            async { Ok(Loader::factory::<Titled>()) }
        });

        pollster::block_on(loader.load()).unwrap();
        pollster::block_on(loader.load()).unwrap();
        assert_eq!(calls.get(), 2);
    }

    #[test]
    fn test_failing_loader() {
        let loader = Loader::lazy(|| async { Err(LoadError::new("chunk fetch failed")) });
        let err = pollster::block_on(loader.load()).unwrap_err();
        assert_eq!(err.message(), "chunk fetch failed");
    }

    #[test]
    fn test_factory_builds_fresh_instances() {
        let built = Rc::new(Cell::new(0));
        let counter = Rc::clone(&built);
        let factory = ViewFactory::new(move || {
            counter.set(counter.get() + 1);
            Box::new(Titled)
        });
        factory.instantiate();
        factory.instantiate();
        assert_eq!(built.get(), 2);
    }
}
