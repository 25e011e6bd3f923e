//! History backends.
//!
//! The router never stores the current path itself: the [`History`] owns it.
//! [`MemoryHistory`] is an in-process stack used in tests and headless runs;
//! the `web` feature adds a browser-backed implementation.

use crate::trace_log;
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

/// Callback fired with the new path on back/forward navigation.
pub type PopListener = Box<dyn FnMut(String)>;

/// Source of truth for the current location.
pub trait History {
    /// The path currently shown in the address bar.
    fn current_path(&self) -> String;

    /// Push a new entry without reloading. Does not notify listeners.
    fn push(&mut self, path: &str);

    /// Register a listener for back/forward transitions.
    fn subscribe(&mut self, listener: PopListener);
}

// ============================================================================
// MemoryHistory
// ============================================================================

struct HistoryState {
    /// Navigation history stack
    entries: Vec<String>,
    /// Current position in history
    current: usize,
    listeners: Vec<PopListener>,
}

/// In-memory history stack.
///
/// Clones share the same stack, so a test can keep one handle while the
/// router owns another and drive back/forward from the outside.
///
/// ```
/// use spa_navigator::history::{History, MemoryHistory};
///
/// let mut history = MemoryHistory::new("/");
/// history.push("/bar");
/// assert_eq!(history.current_path(), "/bar");
///
/// assert_eq!(history.back().as_deref(), Some("/"));
/// assert_eq!(history.forward().as_deref(), Some("/bar"));
/// ```
#[derive(Clone)]
pub struct MemoryHistory {
    state: Rc<RefCell<HistoryState>>,
}

impl MemoryHistory {
    /// Create a history whose only entry is `initial`.
    pub fn new(initial: impl Into<String>) -> Self {
        Self {
            state: Rc::new(RefCell::new(HistoryState {
                entries: vec![initial.into()],
                current: 0,
                listeners: Vec::new(),
            })),
        }
    }

    /// Replace the current entry. Does not notify listeners.
    pub fn replace(&self, path: impl Into<String>) {
        let mut state = self.state.borrow_mut();
        let current = state.current;
        state.entries[current] = path.into();
    }

    /// Step back one entry and notify listeners, like the browser back
    /// button. Returns the new path, or `None` at the start of history.
    pub fn back(&self) -> Option<String> {
        let path = {
            let mut state = self.state.borrow_mut();
            if state.current == 0 {
                return None;
            }
            state.current -= 1;
            state.entries[state.current].clone()
        };
        trace_log!("History back to '{}'", path);
        self.notify(&path);
        Some(path)
    }

    /// Step forward one entry and notify listeners.
    pub fn forward(&self) -> Option<String> {
        let path = {
            let mut state = self.state.borrow_mut();
            if state.current + 1 >= state.entries.len() {
                return None;
            }
            state.current += 1;
            state.entries[state.current].clone()
        };
        trace_log!("History forward to '{}'", path);
        self.notify(&path);
        Some(path)
    }

    /// Check if can go back
    pub fn can_go_back(&self) -> bool {
        self.state.borrow().current > 0
    }

    /// Check if can go forward
    pub fn can_go_forward(&self) -> bool {
        let state = self.state.borrow();
        state.current + 1 < state.entries.len()
    }

    /// Number of entries in the stack.
    pub fn len(&self) -> usize {
        self.state.borrow().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.borrow().entries.is_empty()
    }

    /// Snapshot of all entries, oldest first.
    pub fn entries(&self) -> Vec<String> {
        self.state.borrow().entries.clone()
    }

    /// Number of registered pop listeners.
    pub fn listener_count(&self) -> usize {
        self.state.borrow().listeners.len()
    }

    fn notify(&self, path: &str) {
        // Listeners run without the borrow held so they may read history.
        let mut listeners = std::mem::take(&mut self.state.borrow_mut().listeners);
        for listener in &mut listeners {
            listener(path.to_string());
        }
        let mut state = self.state.borrow_mut();
        listeners.append(&mut state.listeners);
        state.listeners = listeners;
    }
}

impl Default for MemoryHistory {
    fn default() -> Self {
        Self::new("/")
    }
}

impl History for MemoryHistory {
    fn current_path(&self) -> String {
        let state = self.state.borrow();
        state.entries[state.current].clone()
    }

    fn push(&mut self, path: &str) {
        let mut state = self.state.borrow_mut();
        // Remove forward history when pushing
        let keep = state.current + 1;
        state.entries.truncate(keep);
        state.entries.push(path.to_string());
        state.current += 1;
    }

    fn subscribe(&mut self, listener: PopListener) {
        self.state.borrow_mut().listeners.push(listener);
    }
}

impl fmt::Debug for MemoryHistory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.borrow();
        f.debug_struct("MemoryHistory")
            .field("entries", &state.entries)
            .field("current", &state.current)
            .field("listeners", &state.listeners.len())
            .finish()
    }
}
