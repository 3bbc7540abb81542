//! FIRE planner page entry point.
//!
//! Wiring only; all behaviour lives in `fire-page`.
//! 1. `start` runs when the WASM module loads and waits for the DOM.
//! 2. `init` builds the [`Page`], runs load-time initialization and installs
//!    listeners on the document, the window and the root theme attribute.
//! 3. `window.renderChartsFromData` and `window.togglePostFireSpending` are
//!    published for the server-rendered templates and inline scripts.

use std::rc::Rc;

use chrono::Utc;
use fire_page::js_bridge::{self, ApexBackend};
use fire_page::page::wants_auto_calculate;
use fire_page::scheduler::WindowScheduler;
use fire_page::theme::LocalStorageStore;
use fire_page::{Page, PageConfig};
use js_sys::{Array, Reflect};
use log::{error, info, warn};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{
    CustomEvent, Document, Element, Event, EventTarget, MutationObserver,
    MutationObserverInit, StorageEvent, Window,
};

type WebPage = Page<Element, WindowScheduler, ApexBackend>;

#[wasm_bindgen(start)]
pub fn start() -> Result<(), JsValue> {
    if let Err(err) = dioxus_logger::init(dioxus_logger::tracing::Level::INFO) {
        web_sys::console::warn_1(&format!("logger init failed: {}", err).into());
    }
    let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
    let document = window.document().ok_or_else(|| JsValue::from_str("no document"))?;

    if still_loading(&document.ready_state()) {
        let target = document.clone();
        let ready = Closure::once_into_js(move || run_init(&window, &document));
        target.add_event_listener_with_callback("DOMContentLoaded", ready.unchecked_ref())?;
    } else {
        run_init(&window, &document);
    }
    Ok(())
}

/// `document.readyState` before `DOMContentLoaded` has fired.
fn still_loading(ready_state: &str) -> bool {
    ready_state == "loading"
}

fn run_init(window: &Window, document: &Document) {
    if let Err(err) = init(window, document) {
        error!("FIRE page hooks not installed: {:?}", err);
    }
}

fn load_config() -> PageConfig {
    let Some(json) = js_bridge::global_json("fireConfig") else {
        return PageConfig::default();
    };
    PageConfig::from_json(&json).unwrap_or_else(|err| {
        warn!("ignoring window.fireConfig: {}", err);
        PageConfig::default()
    })
}

fn prefers_dark(window: &Window) -> bool {
    window
        .match_media("(prefers-color-scheme: dark)")
        .ok()
        .flatten()
        .map(|query| query.matches())
        .unwrap_or(false)
}

fn init(window: &Window, document: &Document) -> Result<(), JsValue> {
    let config = load_config();
    let root = document
        .document_element()
        .ok_or_else(|| JsValue::from_str("no document element"))?;
    let backend = ApexBackend::new(document.clone(), Rc::new(config.clone()));
    let store = Box::new(LocalStorageStore::new(&config.theme_storage_key));
    let page: Rc<WebPage> = Rc::new(Page::new(config, root.clone(), WindowScheduler, backend, store));

    page.on_load(&Utc::now(), prefers_dark(window));
    if wants_auto_calculate(&window.location().search().unwrap_or_default()) {
        js_bridge::submit_form(&page.config().form_id);
    }

    let p = Rc::clone(&page);
    listen(document, "input", move |event| {
        if let Some(target) = event_element(&event) {
            p.on_input(&target, &Utc::now());
        }
    })?;

    let p = Rc::clone(&page);
    listen(document, "change", move |event| {
        if let Some(target) = event_element(&event) {
            p.on_change(&target, &Utc::now());
        }
    })?;

    let p = Rc::clone(&page);
    listen(document, "htmx:afterSwap", move |event| {
        if let Some((target, _)) = swap_detail(&event) {
            p.on_after_swap(&target);
        }
    })?;

    let p = Rc::clone(&page);
    listen(document, "htmx:beforeSwap", move |event| {
        if let Some((target, detail)) = swap_detail(&event) {
            p.on_before_swap(&target, &response_url(&detail));
        }
    })?;

    let p = Rc::clone(&page);
    let toggle_selector = format!("#{}", page.config().theme_toggle_id);
    listen(document, "click", move |event| {
        let on_toggle = event_element(&event)
            .and_then(|target| target.closest(&toggle_selector).ok().flatten())
            .is_some();
        if on_toggle {
            p.toggle_theme();
        }
    })?;

    let p = Rc::clone(&page);
    listen(window, "storage", move |event| {
        if let Some(storage) = event.dyn_ref::<StorageEvent>() {
            p.on_storage(storage.key().as_deref(), storage.new_value().as_deref());
        }
    })?;

    observe_theme(&root, &page.config().theme_attribute, Rc::clone(&page))?;

    let p = Rc::clone(&page);
    expose(window, "renderChartsFromData", move || {
        p.render_charts();
    })?;
    let p = Rc::clone(&page);
    expose(window, "togglePostFireSpending", move || {
        p.toggle_spending();
    })?;

    info!("FIRE page hooks installed");
    Ok(())
}

fn listen<F>(target: &EventTarget, event: &str, handler: F) -> Result<(), JsValue>
where
    F: FnMut(Event) + 'static,
{
    let closure = Closure::<dyn FnMut(Event)>::new(handler);
    target.add_event_listener_with_callback(event, closure.as_ref().unchecked_ref())?;
    closure.forget();
    Ok(())
}

/// Publish `f` as `window.<name>`.
fn expose<F>(window: &Window, name: &str, f: F) -> Result<(), JsValue>
where
    F: FnMut() + 'static,
{
    let closure = Closure::<dyn FnMut()>::new(f);
    Reflect::set(window, &JsValue::from_str(name), closure.as_ref())?;
    closure.forget();
    Ok(())
}

/// Re-render charts whenever the root theme attribute is written.
fn observe_theme(root: &Element, attribute: &str, page: Rc<WebPage>) -> Result<(), JsValue> {
    let callback = Closure::<dyn FnMut(Array, MutationObserver)>::new(
        move |_records: Array, _observer: MutationObserver| {
            page.on_theme_mutation();
        },
    );
    let observer = MutationObserver::new(callback.as_ref().unchecked_ref())?;
    let options = MutationObserverInit::new();
    options.set_attributes(true);
    options.set_attribute_filter(&Array::of1(&JsValue::from_str(attribute)));
    observer.observe_with_options(root, &options)?;
    callback.forget();
    Ok(())
}

fn event_element(event: &Event) -> Option<Element> {
    event.target()?.dyn_into::<Element>().ok()
}

/// `detail.target` of an htmx swap event, plus the raw detail.
fn swap_detail(event: &Event) -> Option<(Element, JsValue)> {
    let detail = event.dyn_ref::<CustomEvent>()?.detail();
    let target = Reflect::get(&detail, &JsValue::from_str("target"))
        .ok()?
        .dyn_into::<Element>()
        .ok()?;
    Some((target, detail))
}

fn response_url(detail: &JsValue) -> String {
    Reflect::get(detail, &JsValue::from_str("xhr"))
        .ok()
        .and_then(|xhr| Reflect::get(&xhr, &JsValue::from_str("responseURL")).ok())
        .and_then(|url| url.as_string())
        .unwrap_or_default()
}
