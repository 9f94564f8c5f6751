//! Tool-side theme reconciliation
//!
//! Load, inbound broadcasts, and poll ticks all funnel into
//! [`ThemeSynchronizer::reconcile`], which always leaves exactly one
//! theme applied. Applying a theme updates the root element and persists
//! the choice in the same step.

use super::ports::{ParentContext, PreferenceStore, SystemPreference, ThemeSurface};
use super::{ThemeChange, ThemeState};
use crate::config::ThemeConfig;
use crate::error::ParentAccessError;
use serde_json::Value;

/// Events that can change the tool's theme
#[derive(Debug, Clone, PartialEq)]
pub enum Trigger {
    /// Page load
    Load,

    /// Cross-context message from the owner
    Inbound(Value),

    /// Fallback polling interval elapsed
    PollTick,
}

/// Where a resolved theme came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThemeSource {
    Parent,
    Message,
    Persisted,
    System,
    Default,

    /// The trigger did not change anything
    Unchanged,
}

/// Result of one reconciliation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolution {
    pub state: ThemeState,
    pub source: ThemeSource,
}

/// What is known about reading the parent's theme directly
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParentAccess {
    /// Not probed yet
    Unknown,

    /// No parent context
    TopLevel,

    /// Parent state is readable
    SameOrigin,

    /// Parent state is behind a cross-origin boundary
    Denied,
}

/// Single owner of the tool's theme state
pub struct ThemeSynchronizer {
    state: ThemeState,
    store: Box<dyn PreferenceStore>,
    system: Box<dyn SystemPreference>,
    parent: Box<dyn ParentContext>,
    surface: Box<dyn ThemeSurface>,
    storage_key: String,
    default: ThemeState,
    access: ParentAccess,
}

impl ThemeSynchronizer {
    pub fn new(
        config: &ThemeConfig,
        store: Box<dyn PreferenceStore>,
        system: Box<dyn SystemPreference>,
        parent: Box<dyn ParentContext>,
        surface: Box<dyn ThemeSurface>,
    ) -> Self {
        Self {
            state: config.default_theme,
            store,
            system,
            parent,
            surface,
            storage_key: config.storage_key.clone(),
            default: config.default_theme,
            access: ParentAccess::Unknown,
        }
    }

    /// Currently applied theme
    pub fn state(&self) -> ThemeState {
        self.state
    }

    /// Parent access established by the last probe
    pub fn parent_access(&self) -> ParentAccess {
        self.access
    }

    /// Whether polling the parent can observe anything
    pub fn can_poll(&self) -> bool {
        self.access == ParentAccess::SameOrigin
    }

    /// Resolve and apply the theme for one trigger
    pub fn reconcile(&mut self, trigger: Trigger) -> Resolution {
        match trigger {
            Trigger::Load => self.on_load(),
            Trigger::Inbound(value) => self.on_message(&value),
            Trigger::PollTick => self.on_poll(),
        }
    }

    fn on_load(&mut self) -> Resolution {
        let resolution = match self.probe_parent() {
            Some(state) => Resolution {
                state,
                source: ThemeSource::Parent,
            },
            None => self.resolve_local(),
        };
        self.apply(resolution.state);
        log::debug!(
            "Theme resolved on load: {} ({:?})",
            resolution.state,
            resolution.source
        );
        resolution
    }

    fn on_message(&mut self, value: &Value) -> Resolution {
        let Some(change) = ThemeChange::from_value(value) else {
            log::debug!("Ignoring unrelated message: {}", value);
            return self.unchanged();
        };

        // An explicit owner signal always wins
        self.apply(change.state());
        Resolution {
            state: self.state,
            source: ThemeSource::Message,
        }
    }

    fn on_poll(&mut self) -> Resolution {
        if !self.can_poll() {
            return self.unchanged();
        }

        match self.probe_parent() {
            Some(state) if state != self.state => {
                self.apply(state);
                Resolution {
                    state,
                    source: ThemeSource::Parent,
                }
            }
            _ => self.unchanged(),
        }
    }

    /// Read the parent's theme, recording what access is possible
    fn probe_parent(&mut self) -> Option<ThemeState> {
        match self.parent.read_theme() {
            Ok(state) => {
                self.access = ParentAccess::SameOrigin;
                Some(state)
            }
            Err(ParentAccessError::NotEmbedded) => {
                self.access = ParentAccess::TopLevel;
                None
            }
            Err(e @ ParentAccessError::CrossOrigin(_)) => {
                log::warn!("Cannot read parent theme, using local preference: {}", e);
                self.access = ParentAccess::Denied;
                None
            }
        }
    }

    /// Persisted, then OS, then the configured default
    fn resolve_local(&self) -> Resolution {
        if let Some(state) = self.read_persisted() {
            return Resolution {
                state,
                source: ThemeSource::Persisted,
            };
        }
        if let Some(state) = self.system.color_scheme() {
            return Resolution {
                state,
                source: ThemeSource::System,
            };
        }
        Resolution {
            state: self.default,
            source: ThemeSource::Default,
        }
    }

    fn read_persisted(&self) -> Option<ThemeState> {
        match self.store.get(&self.storage_key) {
            Ok(Some(value)) => {
                let state = ThemeState::from_storage(&value);
                if state.is_none() {
                    log::debug!("Ignoring unknown persisted theme {:?}", value);
                }
                state
            }
            Ok(None) => None,
            Err(e) => {
                log::warn!("Could not read persisted theme: {}", e);
                None
            }
        }
    }

    fn apply(&mut self, state: ThemeState) {
        self.state = state;
        self.surface.apply_theme(state);
        if let Err(e) = self.store.set(&self.storage_key, state.class_name()) {
            log::warn!("Could not persist theme preference: {}", e);
        }
    }

    fn unchanged(&self) -> Resolution {
        Resolution {
            state: self.state,
            source: ThemeSource::Unchanged,
        }
    }
}

impl std::fmt::Debug for ThemeSynchronizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ThemeSynchronizer")
            .field("state", &self.state)
            .field("access", &self.access)
            .field("storage_key", &self.storage_key)
            .finish_non_exhaustive()
    }
}
