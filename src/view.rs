//! Views and the content they mount.
//!
//! A [`View`] renders itself into a [`MountContext`], which stages content in
//! a [`Fragment`]. The router commits the fragment to the
//! [`Container`](crate::container::Container) only once `mount` has returned
//! `Ok`, so a failing view never leaves half-written content behind.
//!
//! # Mount lifecycle
//!
//! 1. The router instantiates the view from its
//!    [`ViewFactory`](crate::route::ViewFactory).
//! 2. [`View::mount`] fills a fresh fragment.
//! 3. The previously mounted view gets [`View::unmount`].
//! 4. The fragment replaces the container's content.
//!
//! # Example
//!
//! ```
//! use spa_navigator::view::{Fragment, MountContext, View};
//! use spa_navigator::{MountError, Navigator};
//!
//! #[derive(Default)]
//! struct Foo;
//!
//! impl View for Foo {
//!     fn mount(&mut self, cx: &mut MountContext<'_>) -> Result<(), MountError> {
//!         cx.set_title("foo");
//!         cx.heading("Foo");
//!         cx.link("Go to bar", "/bar");
//!         Ok(())
//!     }
//! }
//!
//! let mut fragment = Fragment::new();
//! let navigator = Navigator::detached();
//! let mut cx = MountContext::new(&mut fragment, &navigator, "/foo");
//! Foo.mount(&mut cx).unwrap();
//!
//! assert_eq!(fragment.title(), Some("foo"));
//! assert_eq!(fragment.link("Go to bar"), Some("/bar"));
//! ```

use crate::error::MountError;
use crate::router::Navigator;

// ============================================================================
// View trait
// ============================================================================

/// A unit of UI content the router can mount.
///
/// Views are single-threaded (`!Send` is fine) and are instantiated fresh for
/// every navigation.
pub trait View {
    /// Render content into `cx`.
    ///
    /// Return an error to abort the navigation; the previously mounted view
    /// then stays visible. A panic is caught and handled the same way where
    /// the target unwinds, but on `wasm32` with `panic = "abort"` it takes
    /// the whole page down, so report problems through the `Err` path.
    fn mount(&mut self, cx: &mut MountContext<'_>) -> Result<(), MountError>;

    /// Called on the mounted view right before its content is replaced.
    ///
    /// Release anything registered during `mount` here (timers, listeners
    /// held outside the container).
    fn unmount(&mut self) {}
}

// ============================================================================
// Fragment
// ============================================================================

/// One piece of mounted content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    /// A heading line
    Heading(String),
    /// A paragraph of text
    Text(String),
    /// An in-app link that navigates to `href` when followed
    Link { label: String, href: String },
}

/// Content produced by one `mount` call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Fragment {
    title: Option<String>,
    nodes: Vec<Node>,
}

impl Fragment {
    pub fn new() -> Self {
        Self::default()
    }

    /// Document title set by the view, if any.
    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.nodes.is_empty()
    }

    /// Target of the first link labelled `label`.
    pub fn link(&self, label: &str) -> Option<&str> {
        self.nodes.iter().find_map(|node| match node {
            Node::Link { label: l, href } if l == label => Some(href.as_str()),
            _ => None,
        })
    }

    /// Iterate over `(label, href)` of every link.
    pub fn links(&self) -> impl Iterator<Item = (&str, &str)> + '_ {
        self.nodes.iter().filter_map(|node| match node {
            Node::Link { label, href } => Some((label.as_str(), href.as_str())),
            _ => None,
        })
    }

    /// Plain-text rendering, one node per line.
    pub fn text(&self) -> String {
        self.nodes
            .iter()
            .map(|node| match node {
                Node::Heading(text) | Node::Text(text) => text.as_str(),
                Node::Link { label, .. } => label.as_str(),
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn push(&mut self, node: Node) {
        self.nodes.push(node);
    }
}

// ============================================================================
// MountContext
// ============================================================================

/// Handle passed to [`View::mount`].
///
/// Writes go to a staged [`Fragment`]. The [`Navigator`] lets the view wire
/// links or buttons that trigger further navigation.
pub struct MountContext<'a> {
    fragment: &'a mut Fragment,
    navigator: &'a Navigator,
    path: &'a str,
}

impl<'a> MountContext<'a> {
    pub fn new(fragment: &'a mut Fragment, navigator: &'a Navigator, path: &'a str) -> Self {
        Self {
            fragment,
            navigator,
            path,
        }
    }

    /// The resolved path being mounted (after `/` → default rewriting).
    pub fn path(&self) -> &str {
        self.path
    }

    /// Navigation handle for links and buttons inside the view.
    pub fn navigator(&self) -> &Navigator {
        self.navigator
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.fragment.title = Some(title.into());
    }

    pub fn heading(&mut self, text: impl Into<String>) {
        self.fragment.push(Node::Heading(text.into()));
    }

    pub fn text(&mut self, text: impl Into<String>) {
        self.fragment.push(Node::Text(text.into()));
    }

    /// Add an in-app link. Containers route activations through the
    /// router instead of reloading the page.
    pub fn link(&mut self, label: impl Into<String>, href: impl Into<String>) {
        self.fragment.push(Node::Link {
            label: label.into(),
            href: href.into(),
        });
    }
}

impl std::fmt::Debug for MountContext<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MountContext")
            .field("path", &self.path)
            .field("fragment", &self.fragment)
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Tests
// ============================================================================
