//! Error handling for the router.
//!
//! Every navigation ends in a [`NavigationResult`]. Failures never escape the
//! router: they are logged, shown through the container's error indicator and
//! reported here as values.
//!
//! - [`NavigationResult`]: outcome of one navigation (`Success`, `NotFound`,
//!   `Superseded`, `Error`).
//! - [`NavigationError`]: what went wrong (unknown route, failed load,
//!   failed mount, failed spawn).
//! - [`LoadError`] / [`MountError`]: errors produced by loaders and views.
//! - [`ErrorHandlers`]: a builder for a not-found view and an error hook.
//!
//! # Examples
//!
//! ```
//! use spa_navigator::error::{NavigationError, NavigationResult};
//!
//! let result = NavigationResult::Success { path: "/foo".into() };
//! assert!(result.is_success());
//!
//! let failed = NavigationResult::Error(NavigationError::LoadFailed {
//!     path: "/bar".into(),
//!     message: "chunk fetch failed".into(),
//! });
//! assert!(failed.is_error());
//! assert_eq!(failed.path(), Some("/bar"));
//! ```

use crate::view::View;
use std::fmt;
use std::rc::Rc;

// ============================================================================
// Navigation Result Types
// ============================================================================

/// Outcome of a single navigation.
///
/// Returned by [`Router::go`](crate::Router::go),
/// [`Router::start`](crate::Router::start) and
/// [`Router::reload`](crate::Router::reload).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavigationResult {
    /// The view for `path` is mounted.
    Success { path: String },
    /// No route is registered for `path`.
    NotFound { path: String },
    /// A newer navigation was issued while this one was loading; its result
    /// was discarded without touching the container.
    Superseded { path: String },
    /// Loading or mounting failed. The previous view is still mounted.
    Error(NavigationError),
}

impl NavigationResult {
    /// Check if navigation was successful
    pub fn is_success(&self) -> bool {
        matches!(self, NavigationResult::Success { .. })
    }

    /// Check if route was not found
    pub fn is_not_found(&self) -> bool {
        matches!(self, NavigationResult::NotFound { .. })
    }

    /// Check if a newer navigation won the race
    pub fn is_superseded(&self) -> bool {
        matches!(self, NavigationResult::Superseded { .. })
    }

    /// Check if navigation failed
    pub fn is_error(&self) -> bool {
        matches!(self, NavigationResult::Error(_))
    }

    /// The resolved path this result refers to, if any.
    pub fn path(&self) -> Option<&str> {
        match self {
            NavigationResult::Success { path }
            | NavigationResult::NotFound { path }
            | NavigationResult::Superseded { path } => Some(path),
            NavigationResult::Error(error) => error.path(),
        }
    }
}

/// Detailed error variants that can occur during navigation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavigationError {
    /// No route is registered for the path
    RouteNotFound { path: String },

    /// The route's loader failed to produce a view
    LoadFailed { path: String, message: String },

    /// The view's `mount` returned an error
    MountFailed { path: String, message: String },

    /// A navigation triggered by an event could not be scheduled
    SpawnFailed { message: String },
}

impl NavigationError {
    /// The path involved in the failure, when there is one.
    pub fn path(&self) -> Option<&str> {
        match self {
            NavigationError::RouteNotFound { path }
            | NavigationError::LoadFailed { path, .. }
            | NavigationError::MountFailed { path, .. } => Some(path),
            NavigationError::SpawnFailed { .. } => None,
        }
    }
}

impl fmt::Display for NavigationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NavigationError::RouteNotFound { path } => {
                write!(f, "Route not found: {}", path)
            }
            NavigationError::LoadFailed { path, message } => {
                write!(f, "Failed to load view for {}: {}", path, message)
            }
            NavigationError::MountFailed { path, message } => {
                write!(f, "Failed to mount view for {}: {}", path, message)
            }
            NavigationError::SpawnFailed { message } => {
                write!(f, "Failed to schedule navigation: {}", message)
            }
        }
    }
}

impl std::error::Error for NavigationError {}

// ============================================================================
// Loader / view errors
// ============================================================================

/// Error returned by a [`Loader`](crate::route::Loader), e.g. a failed chunk
/// fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadError {
    message: String,
}

impl LoadError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for LoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for LoadError {}

/// Error returned by [`View::mount`](crate::view::View::mount).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MountError {
    message: String,
}

impl MountError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for MountError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for MountError {}

// ============================================================================
// Error Handlers
// ============================================================================

/// Builds the view mounted for an unknown path.
pub type NotFoundHandler = Rc<dyn Fn(&str) -> Box<dyn View>>;

/// Observes every contained navigation failure.
pub type ErrorHandler = Rc<dyn Fn(&NavigationError)>;

/// Builder for the not-found view and the failure hook.
///
/// # Examples
///
/// ```
/// use spa_navigator::error::ErrorHandlers;
/// use spa_navigator::view::{MountContext, View};
/// use spa_navigator::MountError;
///
/// struct NotFound(String);
///
/// impl View for NotFound {
///     fn mount(&mut self, cx: &mut MountContext<'_>) -> Result<(), MountError> {
///         cx.set_title("not found");
///         cx.text(format!("Nothing lives at {}", self.0));
///         Ok(())
///     }
/// }
///
/// let handlers = ErrorHandlers::new()
///     .on_not_found(|path| Box::new(NotFound(path.to_string())))
///     .on_error(|err| eprintln!("navigation failed: {err}"));
/// assert!(handlers.not_found.is_some());
/// ```
#[derive(Clone, Default)]
pub struct ErrorHandlers {
    /// Handler for unknown paths
    pub not_found: Option<NotFoundHandler>,

    /// Hook for load, mount and spawn failures
    pub error: Option<ErrorHandler>,
}

impl ErrorHandlers {
    /// Create new empty error handlers
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the view mounted for unknown paths
    pub fn on_not_found<F>(mut self, handler: F) -> Self
    where
        F: Fn(&str) -> Box<dyn View> + 'static,
    {
        self.not_found = Some(Rc::new(handler));
        self
    }

    /// Set the failure hook
    pub fn on_error<F>(mut self, handler: F) -> Self
    where
        F: Fn(&NavigationError) + 'static,
    {
        self.error = Some(Rc::new(handler));
        self
    }

    /// Build the not-found view for `path`, if a handler is registered.
    pub fn not_found_view(&self, path: &str) -> Option<Box<dyn View>> {
        self.not_found.as_ref().map(|handler| handler(path))
    }

    /// Pass `error` to the failure hook. Returns `false` when none is set.
    pub fn report(&self, error: &NavigationError) -> bool {
        match &self.error {
            Some(handler) => {
                handler(error);
                true
            }
            None => false,
        }
    }
}

impl fmt::Debug for ErrorHandlers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ErrorHandlers")
            .field("not_found", &self.not_found.is_some())
            .field("error", &self.error.is_some())
            .finish()
    }
}

// ============================================================================
// Tests
// ============================================================================
