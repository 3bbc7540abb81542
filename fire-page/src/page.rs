//! Ties the page hooks together behind one event-shaped API.
//!
//! The WASM entry point forwards browser events here one-to-one; nothing in
//! this module touches `web_sys` directly.

use std::rc::Rc;

use chrono::{DateTime, Utc};
use log::{debug, info};

use crate::charts::{ChartBackend, ChartManager};
use crate::config::PageConfig;
use crate::dom::PageElement;
use crate::fragments::{FragmentHooks, SwapEffects};
use crate::rows::update_all_row_visibility;
use crate::scheduler::Scheduler;
use crate::spending::toggle_post_fire_spending;
use crate::sync::{init_groups, on_field_input};
use crate::theme::{current_theme, Theme, ThemeController, ThemeSignal, ThemeStore};

/// Whether the page was opened with form parameters and should calculate
/// straight away.
pub fn wants_auto_calculate(search: &str) -> bool {
    !search.trim_start_matches('?').is_empty()
}

pub struct Page<E, S, B>
where
    E: PageElement + 'static,
    S: Scheduler + Clone + 'static,
    B: ChartBackend + 'static,
{
    config: Rc<PageConfig>,
    root: E,
    charts: ChartManager<B>,
    theme: ThemeController<E>,
    theme_signal: ThemeSignal,
    fragments: FragmentHooks<S>,
}

impl<E, S, B> Page<E, S, B>
where
    E: PageElement + 'static,
    S: Scheduler + Clone + 'static,
    B: ChartBackend + 'static,
{
    pub fn new(config: PageConfig, root: E, scheduler: S, backend: B, store: Box<dyn ThemeStore>) -> Self {
        let config = Rc::new(config);
        let charts = ChartManager::new(backend);
        let theme = ThemeController::new(root.clone(), store, &config);
        let theme_signal = ThemeSignal::new(theme.current());

        let render: Rc<dyn Fn()> = {
            let charts = charts.clone();
            let root = root.clone();
            let attribute = config.theme_attribute.clone();
            Rc::new(move || {
                charts.render_all(current_theme(&root, &attribute));
            })
        };
        let fragments = FragmentHooks::new(Rc::clone(&config), scheduler).with_chart_renderer(render);

        Self {
            config,
            root,
            charts,
            theme,
            theme_signal,
            fragments,
        }
    }

    pub fn config(&self) -> &PageConfig {
        &self.config
    }

    pub fn charts(&self) -> &ChartManager<B> {
        &self.charts
    }

    /// Page-load initialization: theme, server-rendered groups, remove
    /// buttons. Returns the applied theme.
    pub fn on_load(&self, now: &DateTime<Utc>, prefers_dark: bool) -> Theme {
        let theme = self.theme.initialize(prefers_dark);
        self.theme_signal.notify(theme);
        let synced = init_groups(&self.root, now, &self.config);
        update_all_row_visibility(&self.root, &self.config);
        info!("page ready: theme {}, {} parameter change group(s) synced", theme, synced);
        theme
    }

    /// `input` event on any element.
    pub fn on_input(&self, target: &E, now: &DateTime<Utc>) {
        on_field_input(target, now, &self.config);
    }

    /// `change` event on any element.
    pub fn on_change(&self, target: &E, now: &DateTime<Utc>) {
        if target.element_id() == self.config.spending.checkbox_id {
            self.toggle_spending();
            return;
        }
        on_field_input(target, now, &self.config);
    }

    pub fn toggle_spending(&self) -> Option<bool> {
        toggle_post_fire_spending(&self.root, &self.config.spending)
    }

    pub fn on_after_swap(&self, target: &E) -> SwapEffects {
        let effects = self.fragments.after_swap(target);
        debug!("fragment swapped into #{}: {:?}", target.element_id(), effects);
        effects
    }

    pub fn on_before_swap(&self, target: &E, response_url: &str) -> bool {
        self.fragments.before_swap(target, response_url)
    }

    /// The theme attribute on the root changed. Re-renders every chart once
    /// per actual theme change. Returns the number of renders started.
    pub fn on_theme_mutation(&self) -> usize {
        let theme = self.current_theme();
        if !self.theme_signal.notify(theme) {
            return 0;
        }
        info!("theme changed to {}", theme);
        self.charts.render_all(theme)
    }

    /// Cross-tab storage notification.
    pub fn on_storage(&self, key: Option<&str>, value: Option<&str>) -> usize {
        match self.theme.on_storage_change(key, value) {
            Some(_) => self.on_theme_mutation(),
            None => 0,
        }
    }

    /// User clicked the theme toggle.
    pub fn toggle_theme(&self) -> Theme {
        let theme = self.theme.toggle();
        self.on_theme_mutation();
        theme
    }

    pub fn current_theme(&self) -> Theme {
        self.theme.current()
    }

    /// Global re-render entry point. Safe before any chart data exists.
    pub fn render_charts(&self) -> usize {
        self.charts.render_all(self.current_theme())
    }
}
