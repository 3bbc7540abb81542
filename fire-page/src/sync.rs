//! Date ⇄ years-from-now synchronization for parameter change groups.
//!
//! Each group owns one canonical date input, one years input and any number
//! of hidden mirror inputs that repeat the date for every row in the
//! submitted form. The years field is always derived from the date (clamped
//! at zero, one decimal); the mirrors always equal the date.

use chrono::{DateTime, Utc};
use fire_utils::dates::{
    date_to_years, format_date, format_years, parse_date, parse_years, years_to_date,
};
use log::debug;

use crate::config::PageConfig;
use crate::dom::PageElement;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Date,
    Years,
}

/// Which side of a group `element` is, if either.
pub fn field_kind<E: PageElement>(element: &E, config: &PageConfig) -> Option<FieldKind> {
    if element.has_class(&config.date_input_class) {
        Some(FieldKind::Date)
    } else if element.has_class(&config.years_input_class) {
        Some(FieldKind::Years)
    } else {
        None
    }
}

/// Recompute the opposite field of `target`'s group.
///
/// Returns the field that was written, or `None` when nothing changed: the
/// target is not a group field, the group is incomplete, or the source value
/// is empty or unparseable.
pub fn sync_date_years<E: PageElement>(
    target: &E,
    now: &DateTime<Utc>,
    config: &PageConfig,
) -> Option<FieldKind> {
    let kind = field_kind(target, config)?;
    let group = target.closest_with_class(&config.group_class)?;
    let date_input = group.first_descendant_with_class(&config.date_input_class)?;
    let years_input = group.first_descendant_with_class(&config.years_input_class)?;

    match kind {
        FieldKind::Date => {
            let value = date_input.input_value();
            if value.trim().is_empty() {
                return None;
            }
            let date = match parse_date(&value) {
                Ok(date) => date,
                Err(err) => {
                    debug!("ignoring date {:?}: {}", value, err);
                    return None;
                }
            };
            years_input.set_input_value(&format_years(date_to_years(&date, now)));
            Some(FieldKind::Years)
        }
        FieldKind::Years => {
            let years = parse_years(&years_input.input_value())?;
            let date = years_to_date(years, now)?;
            date_input.set_input_value(&format_date(&date));
            Some(FieldKind::Date)
        }
    }
}

/// Copy the group's canonical date into every hidden mirror input.
///
/// Returns the number of mirrors written.
pub fn update_mirror_dates<E: PageElement>(group: &E, config: &PageConfig) -> usize {
    let Some(date_input) = group.first_descendant_with_class(&config.date_input_class) else {
        return 0;
    };
    let date = date_input.input_value();
    let mirrors = group.hidden_inputs_named(&config.mirror_field_name);
    for mirror in &mirrors {
        mirror.set_input_value(&date);
    }
    mirrors.len()
}

/// Field `input`/`change` handler: derive the opposite field, then push a
/// changed date out to the mirrors.
pub fn on_field_input<E: PageElement>(target: &E, now: &DateTime<Utc>, config: &PageConfig) {
    let Some(kind) = field_kind(target, config) else {
        return;
    };
    sync_date_years(target, now, config);
    if kind == FieldKind::Date {
        if let Some(group) = target.closest_with_class(&config.group_class) {
            update_mirror_dates(&group, config);
        }
    }
}

/// Fill in the years field of every group whose date was rendered by the
/// server. Returns the number of groups synchronized.
pub fn init_groups<E: PageElement>(root: &E, now: &DateTime<Utc>, config: &PageConfig) -> usize {
    root.descendants_with_class(&config.group_class)
        .iter()
        .filter_map(|group| group.first_descendant_with_class(&config.date_input_class))
        .filter(|date_input| !date_input.input_value().is_empty())
        .filter(|date_input| sync_date_years(date_input, now, config).is_some())
        .count()
}
