//! Reactions to partial page updates.
//!
//! The server swaps HTML fragments into the page for row add/remove, whole
//! parameter groups and calculation results. None of those swaps is started
//! here, so every hook re-derives its invariant from whatever the DOM holds
//! once the swap lands.

use std::rc::Rc;

use log::debug;

use crate::config::PageConfig;
use crate::dom::PageElement;
use crate::rows::update_row_visibility;
use crate::scheduler::Scheduler;
use crate::sync::update_mirror_dates;

/// What an applied swap turned out to be.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SwapEffects {
    /// Results region refreshed; charts re-render after a short delay
    pub results: bool,
    /// A row container was updated (typically a row appended)
    pub rows: bool,
    /// A whole parameter group was inserted or replaced
    pub group: bool,
}

pub struct FragmentHooks<S: Scheduler> {
    config: Rc<PageConfig>,
    scheduler: S,
    render_charts: Option<Rc<dyn Fn()>>,
}

impl<S: Scheduler + Clone + 'static> FragmentHooks<S> {
    pub fn new(config: Rc<PageConfig>, scheduler: S) -> Self {
        Self {
            config,
            scheduler,
            render_charts: None,
        }
    }

    /// Register the chart re-render entry point used after results swaps.
    pub fn with_chart_renderer(mut self, render: Rc<dyn Fn()>) -> Self {
        self.render_charts = Some(render);
        self
    }

    /// A fragment has been swapped into `target`.
    pub fn after_swap<E: PageElement>(&self, target: &E) -> SwapEffects {
        let config = &self.config;
        let mut effects = SwapEffects::default();

        if target.element_id() == config.results_container_id {
            effects.results = true;
            target.scroll_to_start();
            if let Some(render) = &self.render_charts {
                let render = Rc::clone(render);
                self.scheduler
                    .defer(config.chart_render_delay_ms, Box::new(move || render()));
            }
        }

        if target.has_class(&config.rows_container_class) {
            effects.rows = true;
            // A freshly appended row has no mirror value yet
            let new_row = target
                .last_child_element()
                .filter(|row| row.has_class(&config.row_class));
            if let Some(group) = new_row.and_then(|row| row.closest_with_class(&config.group_class)) {
                update_mirror_dates(&group, config);
            }
            update_row_visibility(target, config);
        }

        if target.has_class(&config.group_class) {
            effects.group = true;
            if let Some(container) = target.first_descendant_with_class(&config.rows_container_class) {
                update_row_visibility(&container, config);
            }
        }

        effects
    }

    /// A response from `response_url` is about to be swapped into `target`.
    ///
    /// For row removals the owning container is captured now, while the row
    /// is still attached, and reconciled once the row is gone. Returns true
    /// when a re-check was scheduled.
    pub fn before_swap<E: PageElement + 'static>(&self, target: &E, response_url: &str) -> bool {
        if !self.config.is_removal_request(response_url) {
            return false;
        }
        let Some(container) = target.closest_with_class(&self.config.rows_container_class) else {
            debug!("removed element is not inside a row container");
            return false;
        };
        schedule_recheck(
            self.scheduler.clone(),
            Rc::clone(&self.config),
            container,
            target.clone(),
            self.config.removal_max_rechecks,
        );
        true
    }
}

/// Wait out the removal: poll until `row` has left the document (at most
/// `remaining` extra polls), then reconcile `container` if it still exists.
fn schedule_recheck<S, E>(scheduler: S, config: Rc<PageConfig>, container: E, row: E, remaining: u32)
where
    S: Scheduler + Clone + 'static,
    E: PageElement + 'static,
{
    let delay = config.removal_recheck_ms;
    let next = scheduler.clone();
    scheduler.defer(
        delay,
        Box::new(move || {
            if row.connected() && remaining > 0 {
                schedule_recheck(next, config, container, row, remaining - 1);
                return;
            }
            if !container.connected() {
                debug!("row container gone after removal; skipping");
                return;
            }
            update_row_visibility(&container, &config);
        }),
    );
}
