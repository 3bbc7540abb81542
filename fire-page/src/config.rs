//! Selectors, delays and keys shared by every page hook.
//!
//! The defaults match the server-rendered planner page. A page may override
//! any subset by defining `window.fireConfig` before the WASM module starts.

use serde::Deserialize;

use crate::charts::ChartName;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct PageConfig {
    /// Class of a parameter change group
    pub group_class: String,
    /// Class of the container holding a group's rows
    pub rows_container_class: String,
    /// Class of a single parameter row
    pub row_class: String,
    /// Class of the per-row remove button
    pub remove_button_class: String,
    /// Class of the canonical date input
    pub date_input_class: String,
    /// Class of the years-from-now input
    pub years_input_class: String,
    /// `name` of the hidden inputs mirroring the canonical date
    pub mirror_field_name: String,
    /// Id of the region the calculate form swaps its results into
    pub results_container_id: String,
    /// Id of the calculate form
    pub form_id: String,
    /// Path fragment identifying a row-removal request
    pub remove_row_path: String,
    /// Delay before re-checking a container after a row removal
    pub removal_recheck_ms: u32,
    /// Re-checks allowed while the removed row is still attached
    pub removal_max_rechecks: u32,
    /// Delay before re-rendering charts after a results swap
    pub chart_render_delay_ms: u32,
    /// Local storage key holding the theme preference
    pub theme_storage_key: String,
    /// Attribute on the document root carrying the active theme
    pub theme_attribute: String,
    /// Id of the theme toggle button
    pub theme_toggle_id: String,
    /// Container id for the net worth chart
    pub net_worth_container_id: String,
    /// Container id for the monthly flows chart
    pub monthly_flows_container_id: String,
    pub spending: SpendingConfig,
}

/// Element ids of the post-FIRE spending controls.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct SpendingConfig {
    pub checkbox_id: String,
    pub group_id: String,
    pub input_id: String,
    pub hidden_input_id: String,
    /// Submit name restored on the input when spending is enabled
    pub input_name: String,
}

impl Default for PageConfig {
    fn default() -> Self {
        Self {
            group_class: "parameter-change".to_string(),
            rows_container_class: "parameter-rows-container".to_string(),
            row_class: "parameter-row".to_string(),
            remove_button_class: "remove-parameter-row".to_string(),
            date_input_class: "date-input".to_string(),
            years_input_class: "years-input".to_string(),
            mirror_field_name: "change_dates".to_string(),
            results_container_id: "results-container".to_string(),
            form_id: "calculate-form".to_string(),
            remove_row_path: "/remove-parameter-row".to_string(),
            removal_recheck_ms: 10,
            removal_max_rechecks: 5,
            chart_render_delay_ms: 200,
            theme_storage_key: "theme".to_string(),
            theme_attribute: "data-bs-theme".to_string(),
            theme_toggle_id: "theme-toggle".to_string(),
            net_worth_container_id: "age-vs-net-worth-plot".to_string(),
            monthly_flows_container_id: "monthly-financial-flows-plot".to_string(),
            spending: SpendingConfig::default(),
        }
    }
}

impl Default for SpendingConfig {
    fn default() -> Self {
        Self {
            checkbox_id: "enable_post_fire_spending".to_string(),
            group_id: "post_fire_spending_group".to_string(),
            input_id: "post_fire_spending_per_month".to_string(),
            hidden_input_id: "post_fire_spending_hidden".to_string(),
            input_name: "post_fire_spending_per_month".to_string(),
        }
    }
}

impl PageConfig {
    /// Decode overrides from JSON; missing keys keep their defaults.
    pub fn from_json(json: &str) -> anyhow::Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// DOM id of the element a chart renders into.
    pub fn container_id(&self, name: ChartName) -> &str {
        match name {
            ChartName::NetWorth => &self.net_worth_container_id,
            ChartName::MonthlyFlows => &self.monthly_flows_container_id,
        }
    }

    pub fn is_removal_request(&self, url: &str) -> bool {
        !self.remove_row_path.is_empty() && url.contains(&self.remove_row_path)
    }
}
