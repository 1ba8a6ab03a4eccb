//! WebAssembly bindings for Hushlist
//!
//! The extension constructs one [`Engine`] per context (background worker or
//! content script). The background side uses the navigation gate; content
//! scripts attach the input interceptor to the page.

mod config;
mod logging;
mod surface;

use std::cell::RefCell;
use std::rc::Rc;

use hl_core::interceptor::SurfaceId;
use hl_core::{canonical_phrase, canonical_site, digest_str, BlockingDecisionService, EditEvent, InputInterceptor};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;

pub use config::JsConfigProvider;
pub use surface::DomSurface;

/// Delay before scrubbing after a paste, so the pasted text has landed.
const PASTE_DELAY_MS: i32 = 10;

type Service = BlockingDecisionService<JsConfigProvider>;
type Interceptor = InputInterceptor<DomSurface>;

struct Listener {
    id: SurfaceId,
    target: web_sys::Element,
    callback: Closure<dyn FnMut(web_sys::Event)>,
}

#[wasm_bindgen]
pub struct Engine {
    service: Rc<Service>,
    interceptor: Rc<RefCell<Interceptor>>,
    listeners: Vec<Listener>,
}

#[wasm_bindgen]
impl Engine {
    /// Create an engine that reads configuration by calling `loader`.
    #[wasm_bindgen(constructor)]
    pub fn new(loader: js_sys::Function) -> Engine {
        Engine {
            service: Rc::new(BlockingDecisionService::new(JsConfigProvider::new(loader))),
            interceptor: Rc::new(RefCell::new(InputInterceptor::new(EditEvent::ALL))),
            listeners: Vec::new(),
        }
    }

    pub fn initialize(&self) -> Result<(), JsValue> {
        self.service
            .initialize()
            .map_err(|e| JsValue::from_str(&format!("Failed to initialize: {}", e)))
    }

    pub fn reload(&self) -> Result<(), JsValue> {
        self.service
            .reload()
            .map_err(|e| JsValue::from_str(&format!("Failed to reload: {}", e)))
    }

    /// Detach from every surface and drop loaded state.
    pub fn dispose(&mut self) {
        for listener in self.listeners.drain(..) {
            remove_listener(&listener);
        }
        self.interceptor.borrow_mut().dispose();
        self.service.dispose();
    }

    pub fn is_ready(&self) -> bool {
        self.service.is_ready()
    }

    pub fn is_enabled(&self) -> bool {
        self.service.is_enabled()
    }

    pub fn contains_blocked_word(&self, text: &str) -> bool {
        self.service.contains_blocked_word(text)
    }

    /// Returns `{ text, matchCount }`.
    pub fn scrub(&self, text: &str) -> JsValue {
        let outcome = self.service.scrub(text);
        let js_result = js_sys::Object::new();
        let _ = js_sys::Reflect::set(&js_result, &"text".into(), &JsValue::from_str(&outcome.text));
        let _ = js_sys::Reflect::set(&js_result, &"matchCount".into(), &JsValue::from(outcome.match_count as u32));
        js_result.into()
    }

    pub fn should_block_url(&self, url: &str) -> bool {
        self.service.should_block_url(url)
    }

    pub fn is_site_blocked(&self, url: &str) -> bool {
        self.service.is_site_blocked(url)
    }

    /// Attach to every element matching `selectors` (an array of CSS
    /// selectors). Returns the number of newly attached elements.
    pub fn attach_to_page(&mut self, selectors: JsValue) -> Result<u32, JsValue> {
        let document = web_sys::window()
            .and_then(|w| w.document())
            .ok_or_else(|| JsValue::from_str("No document available"))?;

        let selector_array = js_sys::Array::from(&selectors);
        let mut attached = 0u32;

        for value in selector_array.iter() {
            let selector = value
                .as_string()
                .ok_or_else(|| JsValue::from_str("Selector must be a string"))?;

            let nodes = match document.query_selector_all(&selector) {
                Ok(nodes) => nodes,
                Err(e) => {
                    log::warn!("Skipping selector {:?}: {}", selector, config::describe(&e));
                    continue;
                }
            };

            for i in 0..nodes.length() {
                let Some(surface) = nodes.get(i).and_then(DomSurface::from_node) else {
                    continue;
                };
                if self.attach_surface(surface)? {
                    attached += 1;
                }
            }
        }

        if attached > 0 {
            log::debug!("Attached to {} new surface(s)", attached);
        }
        Ok(attached)
    }

    /// Detach surfaces that have left the document. Returns how many.
    pub fn prune_detached(&mut self) -> u32 {
        let removed = self.interceptor.borrow_mut().prune(DomSurface::is_connected);
        let interceptor = self.interceptor.borrow();
        self.listeners.retain(|listener| {
            let alive = interceptor.surface(listener.id).is_some();
            if !alive {
                remove_listener(listener);
            }
            alive
        });
        removed as u32
    }

    pub fn attached_count(&self) -> u32 {
        self.interceptor.borrow().registry().len() as u32
    }
}

impl Engine {
    fn attach_surface(&mut self, surface: DomSurface) -> Result<bool, JsValue> {
        let target = surface.element().clone();
        let (id, fresh) = self.interceptor.borrow_mut().attach(surface);
        if !fresh {
            return Ok(false);
        }

        let service = Rc::clone(&self.service);
        let interceptor = Rc::clone(&self.interceptor);
        let callback = Closure::<dyn FnMut(web_sys::Event)>::new(move |event: web_sys::Event| {
            let Some(kind) = EditEvent::from_dom_type(&event.type_()) else {
                return;
            };
            if kind == EditEvent::PASTE {
                schedule_paste(Rc::clone(&interceptor), Rc::clone(&service), id);
            } else {
                handle_edit(&interceptor, &service, id, kind);
            }
        });

        let events = self.interceptor.borrow().events();
        for kind in events.dom_types() {
            target.add_event_listener_with_callback(kind, callback.as_ref().unchecked_ref())?;
        }

        self.listeners.push(Listener { id, target, callback });
        Ok(true)
    }
}

fn handle_edit(interceptor: &RefCell<Interceptor>, service: &Service, id: SurfaceId, kind: EditEvent) {
    // Already borrowed means this event was dispatched by our own rewrite.
    let Ok(mut interceptor) = interceptor.try_borrow_mut() else {
        return;
    };
    interceptor.handle_event(id, kind, service);
}

fn schedule_paste(interceptor: Rc<RefCell<Interceptor>>, service: Rc<Service>, id: SurfaceId) {
    let Some(window) = web_sys::window() else {
        return;
    };
    let callback = Closure::once_into_js(move || {
        handle_edit(&interceptor, &service, id, EditEvent::PASTE);
    });
    if let Err(e) = window.set_timeout_with_callback_and_timeout_and_arguments_0(
        callback.unchecked_ref(),
        PASTE_DELAY_MS,
    ) {
        log::warn!("Failed to schedule paste scrub: {}", config::describe(&e));
    }
}

fn remove_listener(listener: &Listener) {
    for kind in EditEvent::ALL.dom_types() {
        let _ = listener
            .target
            .remove_event_listener_with_callback(kind, listener.callback.as_ref().unchecked_ref());
    }
}

// =============================================================================
// Free functions
// =============================================================================

/// Install the console logger at `level` ("error", "warn", "info", "debug").
#[wasm_bindgen]
pub fn init_logging(level: &str) {
    logging::install(logging::parse_level(level));
}

/// Digest a word or phrase for storage in the block list.
///
/// The entry is reduced to the word keys the matcher hashes, so `"Don't!"`
/// and `"dont"` store the same digest.
#[wasm_bindgen]
pub fn digest_text(text: &str) -> Result<String, JsValue> {
    let canonical = canonical_phrase(text).ok_or_else(|| JsValue::from_str("Entry has no words to block"))?;
    Ok(digest_str(&canonical).to_string())
}

/// Canonical form of a word or phrase entry, for display in list editors.
#[wasm_bindgen]
pub fn canonical_phrase_js(input: &str) -> Option<String> {
    canonical_phrase(input)
}

/// Digest a site entry in its canonical form.
#[wasm_bindgen]
pub fn digest_site(input: &str) -> Result<String, JsValue> {
    let canonical = canonical_site(input).map_err(|e| JsValue::from_str(&e.to_string()))?;
    Ok(digest_str(&canonical).to_string())
}

/// Canonical form of a site entry, for display in list editors.
#[wasm_bindgen]
pub fn canonical_site_js(input: &str) -> Option<String> {
    canonical_site(input).ok()
}
