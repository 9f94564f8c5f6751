//! Theme synchronization between the hosting page and embedded tools
//!
//! - `ports`: persisted preferences, OS preference, parent access, root element
//! - `sync`: the tool-side resolver every trigger funnels into
//! - `owner`: the hosting page's toggle and broadcast
//! - `poll`: cancellable polling of a same-origin parent

pub mod owner;
pub mod poll;
pub mod ports;
pub mod sync;

pub use owner::{BroadcastReport, ChannelSubordinate, Subordinate, ThemeOwner};
pub use poll::{start_parent_poll, PollHandle};
pub use ports::{
    CrossOriginParent, JsonFileStore, MemoryStore, ParentContext, PreferenceStore, RootElement,
    SameOriginParent, SystemPreference, ThemeSurface, TopLevel,
};
pub use sync::{ParentAccess, Resolution, ThemeSource, ThemeSynchronizer, Trigger};

use serde::{Deserialize, Serialize};

/// Message type tag of a theme broadcast
pub const THEME_CHANGE: &str = "theme-change";

/// The active visual theme
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThemeState {
    Light,
    #[default]
    Dark,
}

impl ThemeState {
    /// Theme from a dark/light flag
    pub fn from_dark(is_dark: bool) -> Self {
        if is_dark {
            Self::Dark
        } else {
            Self::Light
        }
    }

    /// Whether this is the dark theme
    pub fn is_dark(self) -> bool {
        self == Self::Dark
    }

    /// The other theme
    pub fn toggled(self) -> Self {
        match self {
            Self::Light => Self::Dark,
            Self::Dark => Self::Light,
        }
    }

    /// Root element class; also the persisted value
    pub fn class_name(self) -> &'static str {
        match self {
            Self::Light => "light-theme",
            Self::Dark => "dark-theme",
        }
    }

    /// Host chrome color metadata
    pub fn chrome_color(self) -> &'static str {
        match self {
            Self::Light => "#f8f9fc",
            Self::Dark => "#131620",
        }
    }

    /// Parse a persisted value
    pub fn from_storage(value: &str) -> Option<Self> {
        match value.trim() {
            "light-theme" | "light" => Some(Self::Light),
            "dark-theme" | "dark" => Some(Self::Dark),
            _ => None,
        }
    }
}

impl std::fmt::Display for ThemeState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.class_name())
    }
}

/// Outer page card layout
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewMode {
    #[default]
    Grid,
    List,
}

impl ViewMode {
    /// Persisted value and container class
    pub fn class_name(self) -> &'static str {
        match self {
            Self::Grid => "grid-view",
            Self::List => "list-view",
        }
    }

    /// Parse a persisted value
    pub fn from_storage(value: &str) -> Option<Self> {
        match value.trim() {
            "grid-view" => Some(Self::Grid),
            "list-view" => Some(Self::List),
            _ => None,
        }
    }
}

/// Cross-context theme broadcast: `{type: "theme-change", isDarkTheme: bool}`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThemeChange {
    pub is_dark_theme: bool,
}

#[derive(Deserialize)]
struct WireMessage {
    #[serde(rename = "type")]
    kind: String,
    #[serde(rename = "isDarkTheme")]
    is_dark_theme: bool,
}

impl ThemeChange {
    /// Message announcing `state`
    pub fn new(state: ThemeState) -> Self {
        Self {
            is_dark_theme: state.is_dark(),
        }
    }

    /// Theme carried by the message
    pub fn state(self) -> ThemeState {
        ThemeState::from_dark(self.is_dark_theme)
    }

    /// Serialize into a fresh value; receivers never share our copy
    pub fn to_value(self) -> serde_json::Value {
        serde_json::json!({
            "type": THEME_CHANGE,
            "isDarkTheme": self.is_dark_theme,
        })
    }

    /// Validate an inbound message, `None` for unrelated shapes
    pub fn from_value(value: &serde_json::Value) -> Option<Self> {
        let wire: WireMessage = serde_json::from_value(value.clone()).ok()?;
        (wire.kind == THEME_CHANGE).then_some(Self {
            is_dark_theme: wire.is_dark_theme,
        })
    }
}
