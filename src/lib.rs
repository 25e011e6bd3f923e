//! Client-side path router for single-page applications.
//!
//! `spa-navigator` maps the current location to a view, loads that view
//! lazily, mounts it into a single container and keeps it in sync with
//! history navigation.
//!
//! # Features
//!
//! - Enum route identifiers ([`Routable`]) with exhaustive route tables
//! - Async view loaders for deferred code ([`Loader`])
//! - Last-issued navigation wins: stale loads are discarded
//! - Contained failures: unknown routes, failed loads and failed mounts keep
//!   the previous view and raise an error indicator
//! - LRU cache of loaded modules (`cache` feature)
//! - In-memory history and container for tests; browser backends with the
//!   `web` feature
//!
//! # Feature flags
//!
//! | Feature   | Default | Purpose                                   |
//! |-----------|---------|-------------------------------------------|
//! | `log`     | yes     | Log through the `log` crate               |
//! | `tracing` | no      | Log through the `tracing` crate           |
//! | `cache`   | yes     | Cache loaded view modules ([`cache`])     |
//! | `web`     | no      | `web-sys` history, DOM container, spawner |
//!
//! See [`router`] for a complete example.

#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod logging;

#[cfg(feature = "cache")]
pub mod cache;
pub mod container;
pub mod error;
pub mod history;
pub mod route;
pub mod router;
pub mod view;
#[cfg(feature = "web")]
pub mod web;

#[cfg(feature = "cache")]
pub use cache::{CacheStats, ModuleCache};
pub use container::{Container, MemoryContainer};
pub use error::{ErrorHandlers, LoadError, MountError, NavigationError, NavigationResult};
pub use history::{History, MemoryHistory, PopListener};
pub use route::{Loader, Routable, RouteTable, ViewFactory};
pub use router::{
    Navigator, Router, RouterBuilder, RouterConfig, RouterStatus, DEFAULT_MODULE_CACHE_CAPACITY,
    ROOT_PATH,
};
pub use view::{Fragment, MountContext, Node, View};
#[cfg(feature = "web")]
pub use web::{BrowserHistory, ElementContainer, WasmSpawner};
