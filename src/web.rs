//! Browser backend (`web` feature).
//!
//! - [`BrowserHistory`]: `location.pathname`, `history.pushState` and the
//!   `popstate` event.
//! - [`ElementContainer`]: renders fragments into a DOM element and routes
//!   link clicks through the router instead of reloading the page.
//! - [`WasmSpawner`]: runs event-driven navigations on the browser's
//!   microtask queue.
//!
//! ```ignore
//! use spa_navigator::web::{BrowserHistory, ElementContainer, WasmSpawner};
//!
//! let router = Router::builder(table, Page::Foo).build(
//!     BrowserHistory::new().expect("no window"),
//!     ElementContainer::body().expect("no body"),
//!     WasmSpawner,
//! );
//! wasm_bindgen_futures::spawn_local(async move {
//!     router.start().await;
//! });
//! ```

use crate::container::Container;
use crate::error::NavigationError;
use crate::history::{History, PopListener};
use crate::router::Navigator;
use crate::view::{Fragment, Node};
use crate::{debug_log, warn_log};
use futures::task::{LocalFutureObj, LocalSpawn, SpawnError};
use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};

type EventCallback = Closure<dyn FnMut(web_sys::Event)>;

const ERROR_CLASS: &str = "spa-navigator-error";

fn pathname(window: &web_sys::Window) -> String {
    window
        .location()
        .pathname()
        .unwrap_or_else(|_| crate::router::ROOT_PATH.to_string())
}

// ============================================================================
// BrowserHistory
// ============================================================================

/// History backed by `window.history`.
///
/// `popstate` listeners stay registered for the lifetime of this value.
pub struct BrowserHistory {
    window: web_sys::Window,
    listeners: Vec<EventCallback>,
}

impl BrowserHistory {
    /// Returns `None` outside a browser window.
    pub fn new() -> Option<Self> {
        web_sys::window().map(|window| Self {
            window,
            listeners: Vec::new(),
        })
    }
}

impl History for BrowserHistory {
    fn current_path(&self) -> String {
        pathname(&self.window)
    }

    fn push(&mut self, path: &str) {
        let pushed = self
            .window
            .history()
            .and_then(|history| history.push_state_with_url(&JsValue::NULL, "", Some(path)));
        if let Err(err) = pushed {
            warn_log!("pushState to '{}' failed: {:?}", path, err);
        }
    }

    fn subscribe(&mut self, mut listener: PopListener) {
        let window = self.window.clone();
        let on_pop = Closure::wrap(Box::new(move |_event: web_sys::Event| {
            listener(pathname(&window));
        }) as Box<dyn FnMut(web_sys::Event)>);

        let registered = self
            .window
            .add_event_listener_with_callback("popstate", on_pop.as_ref().unchecked_ref());
        match registered {
            Ok(()) => self.listeners.push(on_pop),
            Err(err) => {
                warn_log!("Failed to register popstate listener: {:?}", err);
            }
        }
    }
}

// ============================================================================
// ElementContainer
// ============================================================================

/// Mounts fragments into a DOM element.
///
/// Link click handlers belong to the mounted content and are dropped on the
/// next `replace`.
pub struct ElementContainer {
    document: web_sys::Document,
    root: web_sys::Element,
    navigator: Option<Navigator>,
    link_listeners: Vec<EventCallback>,
    error_banner: Option<web_sys::Element>,
}

impl ElementContainer {
    /// Use `root` as the mount point.
    pub fn new(root: web_sys::Element) -> Option<Self> {
        let document = root.owner_document()?;
        Some(Self {
            document,
            root,
            navigator: None,
            link_listeners: Vec::new(),
            error_banner: None,
        })
    }

    /// Use `document.body` as the mount point.
    pub fn body() -> Option<Self> {
        let body = web_sys::window()?.document()?.body()?;
        Self::new(body.unchecked_into::<web_sys::Element>())
    }

    fn render_node(&mut self, node: &Node) -> Result<(), JsValue> {
        let element = match node {
            Node::Heading(text) => {
                let heading = self.document.create_element("h1")?;
                heading.set_text_content(Some(text));
                heading
            }
            Node::Text(text) => {
                let paragraph = self.document.create_element("p")?;
                paragraph.set_text_content(Some(text));
                paragraph
            }
            Node::Link { label, href } => {
                let anchor = self.document.create_element("a")?;
                anchor.set_attribute("href", href)?;
                anchor.set_text_content(Some(label));
                if let Some(navigator) = self.navigator.clone() {
                    let href = href.clone();
                    let on_click = Closure::wrap(Box::new(move |event: web_sys::Event| {
                        event.prevent_default();
                        navigator.go(&href);
                    })
                        as Box<dyn FnMut(web_sys::Event)>);
                    anchor.add_event_listener_with_callback(
                        "click",
                        on_click.as_ref().unchecked_ref(),
                    )?;
                    self.link_listeners.push(on_click);
                }
                anchor
            }
        };
        self.root.append_child(&element)?;
        Ok(())
    }
}

impl Container for ElementContainer {
    fn replace(&mut self, content: Fragment) {
        self.root.set_inner_html("");
        self.link_listeners.clear();
        self.error_banner = None;

        if let Some(title) = content.title() {
            self.document.set_title(title);
        }
        for node in content.nodes() {
            if let Err(err) = self.render_node(node) {
                warn_log!("Failed to render {:?}: {:?}", node, err);
            }
        }
        debug_log!("Mounted {} nodes", content.nodes().len());
    }

    fn show_error(&mut self, error: &NavigationError) {
        let banner = match self.error_banner.take() {
            Some(banner) => banner,
            None => {
                let created = self.document.create_element("div").and_then(|banner| {
                    banner.set_attribute("class", ERROR_CLASS)?;
                    banner.set_attribute("role", "alert")?;
                    let first = self.root.first_child();
                    self.root.insert_before(&banner, first.as_ref())?;
                    Ok(banner)
                });
                match created {
                    Ok(banner) => banner,
                    Err(err) => {
                        warn_log!("Failed to show error indicator: {:?}", err);
                        return;
                    }
                }
            }
        };
        banner.set_text_content(Some(&error.to_string()));
        self.error_banner = Some(banner);
    }

    fn attach(&mut self, navigator: Navigator) {
        self.navigator = Some(navigator);
    }
}

// ============================================================================
// WasmSpawner
// ============================================================================

/// [`LocalSpawn`] over `wasm_bindgen_futures::spawn_local`.
#[derive(Debug, Clone, Copy, Default)]
pub struct WasmSpawner;

impl LocalSpawn for WasmSpawner {
    fn spawn_local_obj(&self, future: LocalFutureObj<'static, ()>) -> Result<(), SpawnError> {
        wasm_bindgen_futures::spawn_local(future);
        Ok(())
    }
}
