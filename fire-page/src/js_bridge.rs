//! Typed wrappers around the page's JavaScript globals.
//!
//! ApexCharts and htmx are loaded by the page as plain `<script>` globals.
//! [`ApexBackend`] drives `window.ApexCharts` through `js_sys::Reflect`, and
//! installs Rust closures as the axis formatter and tooltip renderer.

use std::cell::RefCell;
use std::rc::Rc;

use anyhow::anyhow;
use fire_utils::currency::format_currency;
use js_sys::{Array, Function, Promise, Reflect};
use log::{debug, warn};
use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::{spawn_local, JsFuture};
use web_sys::{Document, Element, Event};

use crate::charts::{
    hover_tooltip, ChartBackend, ChartDataset, ChartName, Hover, PreparedChart, RenderDone,
};
use crate::config::PageConfig;

/// Execute arbitrary JS, wrapping in try/catch to avoid panics.
pub fn call_js(code: &str) {
    let wrapped = format!(
        "try {{ {} }} catch(e) {{ console.warn('FIRE JS call failed:', e); }}",
        code
    );
    let _ = js_sys::eval(&wrapped);
}

/// Submit a form through htmx so its results are swapped in place.
pub fn submit_form(form_id: &str) {
    call_js(&format!(
        "if (window.htmx) htmx.trigger('#{}', 'submit');",
        form_id.replace('\'', "\\'")
    ));
}

/// Read a global `window.<name>` and round-trip it through JSON.
pub fn global_json(name: &str) -> Option<String> {
    let window = web_sys::window()?;
    let value = Reflect::get(&window, &JsValue::from_str(name)).ok()?;
    if value.is_undefined() || value.is_null() {
        return None;
    }
    js_sys::JSON::stringify(&value).ok()?.as_string()
}

pub fn js_error(err: JsValue) -> anyhow::Error {
    if let Some(error) = err.dyn_ref::<js_sys::Error>() {
        return anyhow!("{}", String::from(error.message()));
    }
    match err.as_string() {
        Some(message) => anyhow!(message),
        None => anyhow!("{:?}", err),
    }
}

fn get(target: &JsValue, key: &str) -> JsValue {
    Reflect::get(target, &JsValue::from_str(key)).unwrap_or(JsValue::UNDEFINED)
}

fn call_method(target: &JsValue, method: &str, args: &Array) -> Result<JsValue, JsValue> {
    let function = get(target, method).dyn_into::<Function>()?;
    function.apply(target, args)
}

type JsCallback = Closure<dyn FnMut(JsValue) -> JsValue>;

/// A live ApexCharts instance plus the Rust closures it calls back into.
pub struct ApexChart {
    instance: JsValue,
    container: Element,
    _callbacks: Vec<JsCallback>,
    dblclick: RefCell<Option<Closure<dyn FnMut(Event)>>>,
}

impl ApexChart {
    fn remove_dblclick(&self) {
        if let Some(listener) = self.dblclick.borrow_mut().take() {
            let _ = self
                .container
                .remove_event_listener_with_callback("dblclick", listener.as_ref().unchecked_ref());
        }
    }
}

pub struct ApexBackend {
    document: Document,
    config: Rc<PageConfig>,
}

impl ApexBackend {
    pub fn new(document: Document, config: Rc<PageConfig>) -> Self {
        Self { document, config }
    }

    fn container(&self, name: ChartName) -> Option<Element> {
        self.document.get_element_by_id(self.config.container_id(name))
    }
}

fn currency_formatter() -> JsCallback {
    Closure::new(|value: JsValue| JsValue::from_str(&format_currency(value.as_f64().unwrap_or(0.0))))
}

/// Point the value axis label formatter(s) at `formatter`.
fn install_formatter(config: &JsValue, formatter: &JsCallback) -> Result<(), JsValue> {
    let yaxis = get(config, "yaxis");
    let axes: Vec<JsValue> = match yaxis.dyn_ref::<Array>() {
        Some(array) => array.iter().collect(),
        None => vec![yaxis],
    };
    for axis in axes {
        let labels = get(&axis, "labels");
        if labels.is_object() {
            Reflect::set(&labels, &"formatter".into(), formatter.as_ref())?;
        }
    }
    Ok(())
}

fn tooltip_renderer(prepared: Rc<PreparedChart>) -> JsCallback {
    Closure::new(move |ctx: JsValue| {
        JsValue::from_str(&render_tooltip(&prepared, &ctx).unwrap_or_default())
    })
}

/// Lift ApexCharts' `{series, seriesIndex, dataPointIndex, w}` into a [`Hover`].
fn read_hover(ctx: &JsValue) -> Option<Hover> {
    let series_index = get(ctx, "seriesIndex").as_f64()? as usize;
    let point_index = get(ctx, "dataPointIndex").as_f64()? as usize;
    let globals = get(&get(ctx, "w"), "globals");
    let timestamp_ms = get(&globals, "seriesX")
        .dyn_into::<Array>()
        .ok()
        .and_then(|xs| xs.get(series_index as u32).dyn_into::<Array>().ok())
        .and_then(|xs| xs.get(point_index as u32).as_f64());
    let strings = |key: &str| -> Vec<String> {
        get(&globals, key)
            .dyn_into::<Array>()
            .map(|values| values.iter().map(|v| v.as_string().unwrap_or_default()).collect())
            .unwrap_or_default()
    };
    let values = get(ctx, "series")
        .dyn_into::<Array>()
        .ok()?
        .iter()
        .map(|series| {
            series
                .dyn_into::<Array>()
                .ok()
                .and_then(|values| values.get(point_index as u32).as_f64())
        })
        .collect();
    Some(Hover {
        series_index,
        point_index,
        timestamp_ms,
        names: strings("seriesNames"),
        colors: strings("colors"),
        values,
    })
}

fn render_tooltip(prepared: &PreparedChart, ctx: &JsValue) -> Option<String> {
    hover_tooltip(prepared, &read_hover(ctx)?)
}

impl ChartBackend for ApexBackend {
    type Handle = Rc<ApexChart>;

    fn dataset(&self) -> Option<ChartDataset> {
        let json = global_json("chartData")?;
        match ChartDataset::from_json(&json) {
            Ok(dataset) => Some(dataset),
            Err(err) => {
                warn!("window.chartData is not chart data: {}", err);
                None
            }
        }
    }

    fn has_surface(&self, name: ChartName) -> bool {
        self.container(name).is_some()
    }

    fn create(&self, name: ChartName, chart: PreparedChart) -> anyhow::Result<Rc<ApexChart>> {
        let container = self
            .container(name)
            .ok_or_else(|| anyhow!("container #{} not found", self.config.container_id(name)))?;
        let config = js_sys::JSON::parse(&serde_json::to_string(&chart.config)?).map_err(js_error)?;

        let prepared = Rc::new(chart);
        let mut callbacks = Vec::new();
        if prepared.currency_axis {
            let formatter = currency_formatter();
            install_formatter(&config, &formatter).map_err(js_error)?;
            callbacks.push(formatter);
        }
        if prepared.custom_tooltip {
            let renderer = tooltip_renderer(Rc::clone(&prepared));
            Reflect::set(&get(&config, "tooltip"), &"custom".into(), renderer.as_ref())
                .map_err(js_error)?;
            callbacks.push(renderer);
        }

        let window = web_sys::window().ok_or_else(|| anyhow!("no window"))?;
        let constructor = get(&window, "ApexCharts")
            .dyn_into::<Function>()
            .map_err(|_| anyhow!("ApexCharts is not loaded"))?;
        let instance =
            Reflect::construct(&constructor, &Array::of2(&container, &config)).map_err(js_error)?;
        debug!("created {} chart", name);

        Ok(Rc::new(ApexChart {
            instance,
            container,
            _callbacks: callbacks,
            dblclick: RefCell::new(None),
        }))
    }

    fn render(&self, handle: &Rc<ApexChart>, done: RenderDone) {
        let promise = match call_method(&handle.instance, "render", &Array::new()) {
            Ok(result) => result.dyn_into::<Promise>().ok(),
            Err(err) => return done(Err(js_error(err))),
        };
        let Some(promise) = promise else {
            return done(Ok(()));
        };
        spawn_local(async move {
            let result = JsFuture::from(promise).await.map(|_| ()).map_err(js_error);
            done(result);
        });
    }

    fn attach_zoom_reset(&self, handle: &Rc<ApexChart>, range: (f64, f64)) {
        handle.remove_dblclick();
        let instance = handle.instance.clone();
        let listener = Closure::<dyn FnMut(Event)>::new(move |_event: Event| {
            if let Err(err) = call_method(&instance, "resetSeries", &Array::new()) {
                debug!("resetSeries failed: {:?}", err);
            }
            let bounds = Array::of2(&JsValue::from_f64(range.0), &JsValue::from_f64(range.1));
            if let Err(err) = call_method(&instance, "zoomX", &bounds) {
                debug!("zoomX failed: {:?}", err);
            }
        });
        match handle
            .container
            .add_event_listener_with_callback("dblclick", listener.as_ref().unchecked_ref())
        {
            Ok(()) => *handle.dblclick.borrow_mut() = Some(listener),
            Err(err) => warn!("could not attach zoom reset: {:?}", err),
        }
    }

    fn destroy(&self, handle: Rc<ApexChart>) {
        handle.remove_dblclick();
        if let Err(err) = call_method(&handle.instance, "destroy", &Array::new()) {
            warn!("chart destroy failed: {:?}", err);
        }
    }
}
