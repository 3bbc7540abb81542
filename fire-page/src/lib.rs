//! Client-side reactive layer for the FIRE planner page.
//!
//! The page is rendered by the server and updated with htmx fragments; this
//! crate keeps the linked form fields, the dynamic parameter rows and the
//! two ApexCharts widgets consistent with whatever the DOM currently holds.
//!
//! This crate provides:
//! - `sync`: date ⇄ years-from-now derivation and hidden date mirrors
//! - `rows`: remove-button visibility for parameter row containers
//! - `fragments`: hooks run around htmx swaps
//! - `charts`: chart instance registry and lifecycle
//! - `theme`: persisted light/dark preference
//! - `page`: one event-shaped API over all of the above
//! - `js_bridge`: ApexCharts/htmx interop via `js_sys`

pub mod charts;
pub mod config;
pub mod dom;
pub mod fragments;
pub mod js_bridge;
pub mod page;
pub mod rows;
pub mod scheduler;
pub mod spending;
pub mod sync;
pub mod theme;

#[cfg(test)]
mod testing;

pub use config::PageConfig;
pub use page::Page;
