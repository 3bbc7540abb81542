//! Light/dark theme preference.
//!
//! The active theme lives in one attribute on the document root and is
//! persisted in local storage so it survives reloads and reaches other open
//! tabs. Charts never read storage; they follow the root attribute.

use std::cell::Cell;
use std::fmt;
use std::str::FromStr;

use log::{debug, warn};

use crate::config::PageConfig;
use crate::dom::PageElement;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn as_str(self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Theme {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "light" => Ok(Theme::Light),
            "dark" => Ok(Theme::Dark),
            other => Err(anyhow::anyhow!("unknown theme {:?}", other)),
        }
    }
}

/// Stored preference if valid, otherwise the system colour scheme.
pub fn initial_theme(stored: Option<&str>, prefers_dark: bool) -> Theme {
    match stored.map(str::parse::<Theme>) {
        Some(Ok(theme)) => theme,
        _ if prefers_dark => Theme::Dark,
        _ => Theme::Light,
    }
}

/// Theme named by `attribute` on `root`. Missing or unknown means light.
pub fn current_theme<E: PageElement>(root: &E, attribute: &str) -> Theme {
    root.attr(attribute)
        .and_then(|value| value.parse().ok())
        .unwrap_or_default()
}

/// Cross-session persistence of the preference.
pub trait ThemeStore {
    fn load(&self) -> Option<String>;
    fn save(&self, theme: Theme);
}

/// `window.localStorage` under a single key.
pub struct LocalStorageStore {
    key: String,
}

impl LocalStorageStore {
    pub fn new(key: &str) -> Self {
        Self {
            key: key.to_string(),
        }
    }

    fn storage() -> Option<web_sys::Storage> {
        web_sys::window()?.local_storage().ok().flatten()
    }
}

impl ThemeStore for LocalStorageStore {
    fn load(&self) -> Option<String> {
        Self::storage()?.get_item(&self.key).ok().flatten()
    }

    fn save(&self, theme: Theme) {
        let Some(storage) = Self::storage() else {
            warn!("localStorage unavailable; theme not persisted");
            return;
        };
        if let Err(err) = storage.set_item(&self.key, theme.as_str()) {
            warn!("failed to persist theme: {:?}", err);
        }
    }
}

/// Reads and writes the theme on the document root.
pub struct ThemeController<E: PageElement> {
    root: E,
    store: Box<dyn ThemeStore>,
    attribute: String,
    storage_key: String,
}

impl<E: PageElement> ThemeController<E> {
    pub fn new(root: E, store: Box<dyn ThemeStore>, config: &PageConfig) -> Self {
        Self {
            root,
            store,
            attribute: config.theme_attribute.clone(),
            storage_key: config.theme_storage_key.clone(),
        }
    }

    /// Theme currently applied to the page.
    pub fn current(&self) -> Theme {
        current_theme(&self.root, &self.attribute)
    }

    /// First-load resolution: apply and persist the stored or system theme.
    pub fn initialize(&self, prefers_dark: bool) -> Theme {
        let theme = initial_theme(self.store.load().as_deref(), prefers_dark);
        self.set(theme);
        theme
    }

    /// Explicit user toggle.
    pub fn toggle(&self) -> Theme {
        let theme = self.current().toggled();
        self.set(theme);
        theme
    }

    fn set(&self, theme: Theme) {
        self.root.set_attr(&self.attribute, theme.as_str());
        self.store.save(theme);
    }

    /// Another tab changed the stored preference.
    ///
    /// Only the root attribute is updated; storage is never written from
    /// here. Returns the newly applied theme, if any.
    pub fn on_storage_change(&self, key: Option<&str>, value: Option<&str>) -> Option<Theme> {
        if key != Some(self.storage_key.as_str()) {
            return None;
        }
        let theme = match value?.parse::<Theme>() {
            Ok(theme) => theme,
            Err(err) => {
                debug!("ignoring stored theme: {}", err);
                return None;
            }
        };
        if theme == self.current() {
            return None;
        }
        self.root.set_attr(&self.attribute, theme.as_str());
        Some(theme)
    }
}

/// Single "theme changed" event fed by both the root attribute observer and
/// cross-tab notifications. Repeats of the same theme are swallowed so one
/// change yields one chart re-render.
pub struct ThemeSignal {
    last: Cell<Theme>,
}

impl ThemeSignal {
    pub fn new(initial: Theme) -> Self {
        Self {
            last: Cell::new(initial),
        }
    }

    /// Record `theme`; true when it differs from the last one seen.
    pub fn notify(&self, theme: Theme) -> bool {
        self.last.replace(theme) != theme
    }

    pub fn last(&self) -> Theme {
        self.last.get()
    }
}
