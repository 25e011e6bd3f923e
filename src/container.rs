//! Mount containers.
//!
//! A [`Container`] is the single mount point the router writes to. It is
//! handed to the router at construction, so tests can substitute
//! [`MemoryContainer`] for a DOM element.

use crate::error::NavigationError;
use crate::router::Navigator;
use crate::view::Fragment;
use crate::{debug_log, warn_log};
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

/// The fixed element views are mounted into.
pub trait Container {
    /// Replace all content with `content` and hide any error indicator.
    fn replace(&mut self, content: Fragment);

    /// Show an error indicator next to the current content. The content
    /// itself stays as it is.
    fn show_error(&mut self, error: &NavigationError);

    /// Receive the navigator used to follow links inside mounted content.
    /// Called once when the router is built.
    fn attach(&mut self, navigator: Navigator) {
        let _ = navigator;
    }
}

// ============================================================================
// MemoryContainer
// ============================================================================

#[derive(Default)]
struct ContainerState {
    content: Option<Fragment>,
    error: Option<NavigationError>,
    mounts: usize,
    navigator: Option<Navigator>,
}

/// In-memory container.
///
/// Clones share state: keep one handle to inspect what the router mounted
/// and to follow links the way a user would click them.
///
/// ```
/// use spa_navigator::container::{Container, MemoryContainer};
/// use spa_navigator::view::Fragment;
///
/// let mut container = MemoryContainer::new();
/// let inspector = container.clone();
/// container.replace(Fragment::new());
/// assert_eq!(inspector.mount_count(), 1);
/// ```
#[derive(Clone, Default)]
pub struct MemoryContainer {
    state: Rc<RefCell<ContainerState>>,
}

impl MemoryContainer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Currently mounted content, if anything was mounted yet.
    pub fn content(&self) -> Option<Fragment> {
        self.state.borrow().content.clone()
    }

    /// Title of the mounted content.
    pub fn title(&self) -> Option<String> {
        self.state
            .borrow()
            .content
            .as_ref()
            .and_then(|content| content.title().map(str::to_string))
    }

    /// Plain-text rendering of the mounted content.
    pub fn text(&self) -> String {
        self.state
            .borrow()
            .content
            .as_ref()
            .map(Fragment::text)
            .unwrap_or_default()
    }

    /// The error currently indicated, if any.
    pub fn error(&self) -> Option<NavigationError> {
        self.state.borrow().error.clone()
    }

    /// Number of `replace` calls so far.
    pub fn mount_count(&self) -> usize {
        self.state.borrow().mounts
    }

    /// Target of the link labelled `label` in the mounted content.
    pub fn link(&self, label: &str) -> Option<String> {
        self.state
            .borrow()
            .content
            .as_ref()
            .and_then(|content| content.link(label).map(str::to_string))
    }

    /// Activate the link labelled `label`, as a click would.
    ///
    /// The navigation itself is scheduled on the router's spawner. Returns
    /// `false` if there is no such link or no router is attached.
    pub fn follow(&self, label: &str) -> bool {
        let Some(href) = self.link(label) else {
            warn_log!("No link labelled '{}' in mounted content", label);
            return false;
        };
        let navigator = self.state.borrow().navigator.clone();
        match navigator {
            Some(navigator) => {
                debug_log!("Following link '{}' → '{}'", label, href);
                navigator.go(&href);
                true
            }
            None => false,
        }
    }
}

impl Container for MemoryContainer {
    fn replace(&mut self, content: Fragment) {
        let mut state = self.state.borrow_mut();
        state.content = Some(content);
        state.error = None;
        state.mounts += 1;
    }

    fn show_error(&mut self, error: &NavigationError) {
        self.state.borrow_mut().error = Some(error.clone());
    }

    fn attach(&mut self, navigator: Navigator) {
        self.state.borrow_mut().navigator = Some(navigator);
    }
}

impl fmt::Debug for MemoryContainer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.borrow();
        f.debug_struct("MemoryContainer")
            .field("content", &state.content)
            .field("error", &state.error)
            .field("mounts", &state.mounts)
            .finish_non_exhaustive()
    }
}
