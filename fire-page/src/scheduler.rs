//! Bounded timer delays on the UI event loop.

use log::warn;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;

pub trait Scheduler {
    /// Run `task` once, no sooner than `delay_ms` from now.
    fn defer(&self, delay_ms: u32, task: Box<dyn FnOnce()>);
}

/// `window.setTimeout` backed scheduler.
#[derive(Clone, Copy, Default)]
pub struct WindowScheduler;

impl Scheduler for WindowScheduler {
    fn defer(&self, delay_ms: u32, task: Box<dyn FnOnce()>) {
        let Some(window) = web_sys::window() else {
            warn!("no window; dropping deferred task");
            return;
        };
        let callback = Closure::once_into_js(move || task());
        let timeout = i32::try_from(delay_ms).unwrap_or(i32::MAX);
        if let Err(err) = window
            .set_timeout_with_callback_and_timeout_and_arguments_0(callback.unchecked_ref(), timeout)
        {
            warn!("setTimeout failed: {:?}", err);
        }
    }
}
