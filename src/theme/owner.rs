//! Hosting page side of theme synchronization
//!
//! The owner resolves its own theme on load, flips it on user toggle and
//! broadcasts every change to all embedded tools. Delivery is
//! fire-and-forget: a subordinate that cannot be reached is logged and
//! skipped.

use super::ports::{PreferenceStore, SystemPreference, ThemeSurface};
use super::{ThemeChange, ThemeState, ViewMode};
use crate::config::ThemeConfig;
use crate::error::DeliveryError;
use serde_json::Value;
use std::sync::mpsc::{channel, Receiver, Sender};
use tokio::sync::watch;

/// An embedded context that accepts theme broadcasts
pub trait Subordinate {
    /// Deliver one message; the value is already a private copy
    fn post_message(&self, message: Value) -> Result<(), DeliveryError>;

    /// Name used in logs
    fn label(&self) -> &str;
}

/// Subordinate reached through an in-process channel
#[derive(Debug, Clone)]
pub struct ChannelSubordinate {
    label: String,
    sender: Sender<Value>,
}

impl ChannelSubordinate {
    /// Create a subordinate and the receiving end of its message channel
    pub fn new(label: impl Into<String>) -> (Self, Receiver<Value>) {
        let (sender, receiver) = channel();
        (
            Self {
                label: label.into(),
                sender,
            },
            receiver,
        )
    }
}

impl Subordinate for ChannelSubordinate {
    fn post_message(&self, message: Value) -> Result<(), DeliveryError> {
        self.sender
            .send(message)
            .map_err(|_| DeliveryError::Unreachable)
    }

    fn label(&self) -> &str {
        &self.label
    }
}

/// Result of notifying every subordinate once
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BroadcastReport {
    /// Subordinates that accepted the message
    pub delivered: usize,

    /// Labels and errors of the ones that did not
    pub failed: Vec<(String, DeliveryError)>,
}

impl BroadcastReport {
    pub fn all_delivered(&self) -> bool {
        self.failed.is_empty()
    }
}

/// The hosting page's theme and view mode
pub struct ThemeOwner {
    state: ThemeState,
    view_mode: ViewMode,
    store: Box<dyn PreferenceStore>,
    system: Box<dyn SystemPreference>,
    surface: Box<dyn ThemeSurface>,
    subordinates: Vec<Box<dyn Subordinate>>,
    published: Option<watch::Sender<ThemeState>>,
    theme_key: String,
    view_key: String,
    default: ThemeState,
}

impl ThemeOwner {
    pub fn new(
        config: &ThemeConfig,
        store: Box<dyn PreferenceStore>,
        system: Box<dyn SystemPreference>,
        surface: Box<dyn ThemeSurface>,
    ) -> Self {
        Self {
            state: config.default_theme,
            view_mode: ViewMode::default(),
            store,
            system,
            surface,
            subordinates: Vec::new(),
            published: None,
            theme_key: config.storage_key.clone(),
            view_key: config.view_storage_key.clone(),
            default: config.default_theme,
        }
    }

    /// Current theme
    pub fn state(&self) -> ThemeState {
        self.state
    }

    /// Current view mode
    pub fn view_mode(&self) -> ViewMode {
        self.view_mode
    }

    /// Register an embedded tool
    pub fn attach(&mut self, subordinate: Box<dyn Subordinate>) {
        log::debug!("Attached subordinate {}", subordinate.label());
        self.subordinates.push(subordinate);
    }

    /// Number of registered subordinates
    pub fn subordinate_count(&self) -> usize {
        self.subordinates.len()
    }

    /// Expose the theme as a readable attribute for same-origin tools
    pub fn expose(&mut self) -> watch::Receiver<ThemeState> {
        match &self.published {
            Some(sender) => sender.subscribe(),
            None => {
                let (sender, receiver) = watch::channel(self.state);
                self.published = Some(sender);
                receiver
            }
        }
    }

    /// Resolve persisted, then OS, then default; apply and broadcast
    pub fn load(&mut self) -> BroadcastReport {
        let persisted = self.read_key(&self.theme_key).and_then(|v| ThemeState::from_storage(&v));
        let state = persisted
            .or_else(|| self.system.color_scheme())
            .unwrap_or(self.default);

        if let Some(mode) = self.read_key(&self.view_key).and_then(|v| ViewMode::from_storage(&v)) {
            self.view_mode = mode;
        }

        log::info!("Owner theme resolved to {}", state);
        self.apply(state);
        self.broadcast()
    }

    /// Flip the theme, persist it, then notify every subordinate
    pub fn toggle(&mut self) -> BroadcastReport {
        let next = self.state.toggled();
        log::info!("Theme toggled to {}", next);
        self.apply(next);
        self.broadcast()
    }

    /// Switch the card layout and persist it
    pub fn set_view_mode(&mut self, mode: ViewMode) {
        self.view_mode = mode;
        if let Err(e) = self.store.set(&self.view_key, mode.class_name()) {
            log::warn!("Could not persist view mode: {}", e);
        }
    }

    /// Send the current theme to every subordinate, each attempt isolated
    pub fn broadcast(&self) -> BroadcastReport {
        let message = ThemeChange::new(self.state);
        let mut report = BroadcastReport::default();

        for subordinate in &self.subordinates {
            match subordinate.post_message(message.to_value()) {
                Ok(()) => report.delivered += 1,
                Err(e) => {
                    log::error!("Theme broadcast to {} failed: {}", subordinate.label(), e);
                    report.failed.push((subordinate.label().to_string(), e));
                }
            }
        }

        report
    }

    fn apply(&mut self, state: ThemeState) {
        self.state = state;
        self.surface.apply_theme(state);
        if let Some(sender) = &self.published {
            sender.send_replace(state);
        }
        if let Err(e) = self.store.set(&self.theme_key, state.class_name()) {
            log::warn!("Could not persist theme preference: {}", e);
        }
    }

    fn read_key(&self, key: &str) -> Option<String> {
        match self.store.get(key) {
            Ok(value) => value,
            Err(e) => {
                log::warn!("Could not read preference {}: {}", key, e);
                None
            }
        }
    }
}

impl std::fmt::Debug for ThemeOwner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ThemeOwner")
            .field("state", &self.state)
            .field("view_mode", &self.view_mode)
            .field("subordinates", &self.subordinates.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{THEME_STORAGE_KEY, VIEW_STORAGE_KEY};
    use crate::theme::ports::{MemoryStore, RootElement, TopLevel};
    use crate::theme::sync::{ThemeSynchronizer, Trigger};

    fn owner(store: MemoryStore, system: Option<ThemeState>) -> ThemeOwner {
        ThemeOwner::new(
            &ThemeConfig::default(),
            Box::new(store),
            Box::new(system),
            Box::new(RootElement::new()),
        )
    }

    fn tool() -> ThemeSynchronizer {
        ThemeSynchronizer::new(
            &ThemeConfig::default(),
            Box::new(MemoryStore::new()),
            Box::new(None::<ThemeState>),
            Box::new(TopLevel),
            Box::new(RootElement::new()),
        )
    }

    /// Feed every pending message into the tool
    fn drain(receiver: &Receiver<Value>, tool: &mut ThemeSynchronizer) {
        while let Ok(message) = receiver.try_recv() {
            tool.reconcile(Trigger::Inbound(message));
        }
    }

    #[test]
    fn test_load_defaults_to_dark() {
        let mut owner = owner(MemoryStore::new(), None);
        owner.load();
        assert_eq!(owner.state(), ThemeState::Dark);
        assert_eq!(owner.view_mode(), ViewMode::Grid);
    }

    #[test]
    fn test_load_reads_persisted_theme_and_view() {
        let mut store = MemoryStore::with(THEME_STORAGE_KEY, "light-theme");
        store.set(VIEW_STORAGE_KEY, "list-view").unwrap();
        let mut owner = owner(store, Some(ThemeState::Dark));
        owner.load();

        assert_eq!(owner.state(), ThemeState::Light);
        assert_eq!(owner.view_mode(), ViewMode::List);
    }

    #[test]
    fn test_toggle_twice_restores_subordinates() {
        let mut owner = owner(MemoryStore::new(), None);
        let mut tools = Vec::new();
        for label in ["editor", "converter", "counter"] {
            let (subordinate, receiver) = ChannelSubordinate::new(label);
            owner.attach(Box::new(subordinate));
            let mut sync = tool();
            sync.reconcile(Trigger::Load);
            tools.push((receiver, sync));
        }

        owner.load();
        for (receiver, sync) in &mut tools {
            drain(receiver, sync);
        }
        let original: Vec<_> = tools.iter().map(|(_, sync)| sync.state()).collect();

        owner.toggle();
        for (receiver, sync) in &mut tools {
            drain(receiver, sync);
            assert_eq!(sync.state(), owner.state());
        }

        owner.toggle();
        for (receiver, sync) in &mut tools {
            drain(receiver, sync);
        }
        let restored: Vec<_> = tools.iter().map(|(_, sync)| sync.state()).collect();
        assert_eq!(original, restored);
    }

    #[test]
    fn test_unreachable_subordinate_does_not_block_others() {
        let mut owner = owner(MemoryStore::new(), None);
        let (first, first_rx) = ChannelSubordinate::new("first");
        let (gone, gone_rx) = ChannelSubordinate::new("gone");
        let (last, last_rx) = ChannelSubordinate::new("last");
        owner.attach(Box::new(first));
        owner.attach(Box::new(gone));
        owner.attach(Box::new(last));
        drop(gone_rx);

        let report = owner.toggle();
        assert_eq!(report.delivered, 2);
        assert_eq!(
            report.failed,
            vec![("gone".to_string(), DeliveryError::Unreachable)]
        );
        assert!(!report.all_delivered());

        let expected = ThemeChange::new(owner.state()).to_value();
        assert_eq!(first_rx.try_recv().unwrap(), expected);
        assert_eq!(last_rx.try_recv().unwrap(), expected);
    }

    #[test]
    fn test_exposed_attribute_tracks_toggles() {
        let mut owner = owner(MemoryStore::new(), None);
        owner.load();
        let receiver = owner.expose();
        assert_eq!(*receiver.borrow(), ThemeState::Dark);

        owner.toggle();
        assert_eq!(*receiver.borrow(), ThemeState::Light);
    }

    #[test]
    fn test_set_view_mode() {
        let mut owner = owner(MemoryStore::new(), None);
        owner.set_view_mode(ViewMode::List);
        assert_eq!(owner.view_mode(), ViewMode::List);
    }
}
