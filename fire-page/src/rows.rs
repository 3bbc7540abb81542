//! Remove-button visibility for parameter row containers.
//!
//! Visibility is derived from the current row count only, so the functions
//! here are safe to call after any structural change, any number of times.

use crate::config::PageConfig;
use crate::dom::PageElement;

/// Show every remove button in `container` iff it holds two or more rows.
pub fn update_row_visibility<E: PageElement>(container: &E, config: &PageConfig) {
    let show = container.descendants_with_class(&config.row_class).len() > 1;
    for button in container.descendants_with_class(&config.remove_button_class) {
        button.set_shown(show);
    }
}

/// Reconcile every row container under `root`.
pub fn update_all_row_visibility<E: PageElement>(root: &E, config: &PageConfig) {
    for container in root.descendants_with_class(&config.rows_container_class) {
        update_row_visibility(&container, config);
    }
}
