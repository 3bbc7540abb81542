//! Post-FIRE spending override.
//!
//! When enabled, the visible amount input is submitted; otherwise it is
//! disabled and unnamed and a hidden fallback input is submitted instead.

use log::debug;

use crate::config::SpendingConfig;
use crate::dom::PageElement;

/// Apply the checkbox state to the spending controls under `root`.
///
/// Returns the checkbox state, or `None` if any control is missing.
pub fn toggle_post_fire_spending<E: PageElement>(root: &E, config: &SpendingConfig) -> Option<bool> {
    let (Some(checkbox), Some(group), Some(input), Some(hidden)) = (
        root.find_by_id(&config.checkbox_id),
        root.find_by_id(&config.group_id),
        root.find_by_id(&config.input_id),
        root.find_by_id(&config.hidden_input_id),
    ) else {
        debug!("post-FIRE spending controls not on this page");
        return None;
    };

    let enabled = checkbox.checked();
    group.set_shown(enabled);
    input.set_input_disabled(!enabled);
    input.set_input_name(if enabled { config.input_name.as_str() } else { "" });
    hidden.set_input_disabled(enabled);
    Some(enabled)
}
