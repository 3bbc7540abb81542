//! Chart instance lifecycle.
//!
//! Each named chart moves `Absent -> Rendering -> Rendered`, and back to
//! `Absent` when destroyed. A re-render always destroys the live handle
//! before creating its replacement, so a container never hosts two
//! instances. The rendering library itself sits behind [`ChartBackend`].

mod prepare;
mod registry;
mod tooltip;

use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use log::{debug, error, warn};
use serde::Deserialize;
use serde_json::Value;

use crate::theme::Theme;

pub use prepare::{full_range, prepare_config, x_millis, PreparedChart, Series, SeriesPoint};
pub use registry::{ChartPhase, ChartRegistry};
pub use tooltip::{hover_tooltip, tooltip_html, Hover, TooltipEntry};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChartName {
    NetWorth,
    MonthlyFlows,
}

impl ChartName {
    pub const ALL: [ChartName; 2] = [ChartName::NetWorth, ChartName::MonthlyFlows];

    /// Key in the page's chart dataset.
    pub fn key(self) -> &'static str {
        match self {
            ChartName::NetWorth => "netWorth",
            ChartName::MonthlyFlows => "monthlyFlows",
        }
    }
}

impl fmt::Display for ChartName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Light and dark variants of one chart, prebuilt by the server.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PlotData {
    pub config_light: Value,
    pub config_dark: Value,
}

impl PlotData {
    pub fn config_for(&self, theme: Theme) -> &Value {
        match theme {
            Theme::Light => &self.config_light,
            Theme::Dark => &self.config_dark,
        }
    }
}

/// The page's embedded chart data, keyed by chart name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChartDataset {
    plots: HashMap<ChartName, PlotData>,
}

impl ChartDataset {
    /// Decode `window.chartData`. Entries for unknown charts are ignored and
    /// malformed entries are skipped, so one bad chart never hides the other.
    pub fn from_json(json: &str) -> anyhow::Result<Self> {
        let raw: serde_json::Map<String, Value> = serde_json::from_str(json)?;
        let mut plots = HashMap::new();
        for name in ChartName::ALL {
            let Some(entry) = raw.get(name.key()) else {
                continue;
            };
            if entry.is_null() {
                continue;
            }
            match serde_json::from_value::<PlotData>(entry.clone()) {
                Ok(plot) => {
                    plots.insert(name, plot);
                }
                Err(err) => warn!("skipping {} chart data: {}", name, err),
            }
        }
        Ok(Self { plots })
    }

    pub fn insert(&mut self, name: ChartName, plot: PlotData) {
        self.plots.insert(name, plot);
    }

    pub fn get(&self, name: ChartName) -> Option<&PlotData> {
        self.plots.get(&name)
    }

    pub fn is_empty(&self) -> bool {
        self.plots.is_empty()
    }
}

/// Completion callback for an asynchronous render.
pub type RenderDone = Box<dyn FnOnce(anyhow::Result<()>)>;

/// The visualization engine, seen only through this interface.
pub trait ChartBackend {
    type Handle: Clone + 'static;

    /// Dataset currently published by the page, if any.
    fn dataset(&self) -> Option<ChartDataset>;
    /// Whether the container for `name` exists on the page.
    fn has_surface(&self, name: ChartName) -> bool;
    fn create(&self, name: ChartName, chart: PreparedChart) -> anyhow::Result<Self::Handle>;
    /// Start drawing; `done` runs once the engine settles.
    fn render(&self, handle: &Self::Handle, done: RenderDone);
    /// Double-click on the chart resets zoom, then zooms to `range`.
    fn attach_zoom_reset(&self, handle: &Self::Handle, range: (f64, f64));
    fn destroy(&self, handle: Self::Handle);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderOutcome {
    /// Creation succeeded; the render is in flight
    Started,
    /// No container or no data for this chart
    Skipped,
    /// The engine rejected the configuration
    Failed,
}

/// Owns the chart registry and drives the backend.
pub struct ChartManager<B: ChartBackend> {
    backend: Rc<B>,
    registry: Rc<RefCell<ChartRegistry<B::Handle>>>,
}

impl<B: ChartBackend> Clone for ChartManager<B> {
    fn clone(&self) -> Self {
        Self {
            backend: Rc::clone(&self.backend),
            registry: Rc::clone(&self.registry),
        }
    }
}

impl<B: ChartBackend + 'static> ChartManager<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend: Rc::new(backend),
            registry: Rc::new(RefCell::new(ChartRegistry::new())),
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Render every known chart; one failing never blocks the other.
    ///
    /// Returns how many renders were started.
    pub fn render_all(&self, theme: Theme) -> usize {
        let Some(dataset) = self.backend.dataset() else {
            debug!("no chart data yet");
            return 0;
        };
        ChartName::ALL
            .into_iter()
            .filter(|name| self.render_with(*name, &dataset, theme) == RenderOutcome::Started)
            .count()
    }

    pub fn render(&self, name: ChartName, theme: Theme) -> RenderOutcome {
        match self.backend.dataset() {
            Some(dataset) => self.render_with(name, &dataset, theme),
            None => RenderOutcome::Skipped,
        }
    }

    fn render_with(&self, name: ChartName, dataset: &ChartDataset, theme: Theme) -> RenderOutcome {
        if !self.backend.has_surface(name) {
            debug!("no container for {} chart", name);
            return RenderOutcome::Skipped;
        }
        let Some(plot) = dataset.get(name) else {
            debug!("no data for {} chart", name);
            return RenderOutcome::Skipped;
        };
        let prepared = prepare_config(plot.config_for(theme).clone());
        let zoom_range = prepared.zoom_range;

        self.destroy(name);
        let handle = match self.backend.create(name, prepared) {
            Ok(handle) => handle,
            Err(err) => {
                error!("Error rendering {} chart: {:#}", name, err);
                return RenderOutcome::Failed;
            }
        };
        let (generation, displaced) = self.registry.borrow_mut().install(name, handle.clone());
        if let Some(old) = displaced {
            self.backend.destroy(old);
        }

        let registry = Rc::clone(&self.registry);
        let backend = Rc::clone(&self.backend);
        self.backend.render(
            &handle,
            Box::new(move |result| match result {
                Ok(()) => {
                    if !registry.borrow_mut().mark_rendered(name, generation) {
                        debug!("{} chart was replaced before its render finished", name);
                        return;
                    }
                    let current = registry.borrow().handle(name).cloned();
                    if let (Some(handle), Some(range)) = (current, zoom_range) {
                        backend.attach_zoom_reset(&handle, range);
                    }
                }
                Err(err) => {
                    error!("Error rendering {} chart: {:#}", name, err);
                    let failed = registry.borrow_mut().take_if_current(name, generation);
                    if let Some(handle) = failed {
                        backend.destroy(handle);
                    }
                }
            }),
        );
        RenderOutcome::Started
    }

    /// Destroy the live instance for `name`, if any.
    pub fn destroy(&self, name: ChartName) -> bool {
        let taken = self.registry.borrow_mut().take(name);
        match taken {
            Some(handle) => {
                self.backend.destroy(handle);
                true
            }
            None => false,
        }
    }

    pub fn phase(&self, name: ChartName) -> ChartPhase {
        self.registry.borrow().phase(name)
    }

    pub fn live_count(&self) -> usize {
        self.registry.borrow().live_count()
    }
}
