//! Environment ports used by theme synchronization
//!
//! Each port isolates one capability the theme logic needs from its host:
//! key-value preference storage, the OS color scheme, read access to the
//! parent context, and the root element whose classes select the theme.

use super::ThemeState;
use crate::config::Config;
use crate::error::{ParentAccessError, StoreError, StoreResult};
use crate::file_handler::{ensure_dir, write_file_atomic_sync};
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use tokio::sync::watch;

/// File name of the persisted preference store inside the data directory
const PREFERENCES_FILE: &str = "preferences.json";

/// Key-value preference storage
pub trait PreferenceStore: Send {
    /// Read a value; `Ok(None)` when absent
    fn get(&self, key: &str) -> StoreResult<Option<String>>;

    /// Write a value
    fn set(&mut self, key: &str, value: &str) -> StoreResult<()>;
}

/// In-memory preference storage
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    values: BTreeMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-seeded with one value
    pub fn with(key: &str, value: &str) -> Self {
        let mut store = Self::new();
        store.values.insert(key.to_string(), value.to_string());
        store
    }

    /// Copy `keys` out of another store; later writes stay in memory
    pub fn snapshot(source: &dyn PreferenceStore, keys: &[&str]) -> StoreResult<Self> {
        let mut store = Self::new();
        for key in keys {
            if let Some(value) = source.get(key)? {
                store.values.insert(key.to_string(), value);
            }
        }
        Ok(store)
    }
}

impl PreferenceStore for MemoryStore {
    fn get(&self, key: &str) -> StoreResult<Option<String>> {
        Ok(self.values.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> StoreResult<()> {
        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Preference storage persisted as a JSON object on disk
///
/// Every `set` rewrites the whole file atomically.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    values: BTreeMap<String, String>,
}

impl JsonFileStore {
    /// Open the store at `path`; a missing file starts empty
    pub fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        let path = path.as_ref().to_path_buf();
        let values = if path.exists() {
            let content = std::fs::read_to_string(&path)
                .map_err(|e| StoreError::Unavailable(format!("{}: {}", path.display(), e)))?;
            serde_json::from_str(&content)
                .map_err(|e| StoreError::Corrupt(format!("{}: {}", path.display(), e)))?
        } else {
            BTreeMap::new()
        };

        log::debug!("Opened preference store at {}", path.display());
        Ok(Self { path, values })
    }

    /// Open the store in the application data directory
    pub fn open_default() -> StoreResult<Self> {
        let dir = Config::data_dir().map_err(|e| StoreError::Unavailable(e.to_string()))?;
        Self::open(dir.join(PREFERENCES_FILE))
    }

    /// Backing file path
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl PreferenceStore for JsonFileStore {
    fn get(&self, key: &str) -> StoreResult<Option<String>> {
        Ok(self.values.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> StoreResult<()> {
        if self.values.get(key).map(String::as_str) == Some(value) {
            return Ok(());
        }

        let mut values = self.values.clone();
        values.insert(key.to_string(), value.to_string());
        let content = serde_json::to_vec_pretty(&values)
            .map_err(|e| StoreError::Corrupt(e.to_string()))?;

        if let Some(parent) = self.path.parent() {
            ensure_dir(parent)?;
        }
        write_file_atomic_sync(&self.path, &content)?;

        self.values = values;
        Ok(())
    }
}

/// Operating system color scheme preference
pub trait SystemPreference: Send {
    /// Preferred theme, `None` when the OS expresses no preference
    fn color_scheme(&self) -> Option<ThemeState>;
}

impl SystemPreference for Option<ThemeState> {
    fn color_scheme(&self) -> Option<ThemeState> {
        *self
    }
}

/// Read access to the parent context's visual state
pub trait ParentContext: Send {
    /// Current theme of the parent root element
    fn read_theme(&self) -> Result<ThemeState, ParentAccessError>;
}

/// A context that is not embedded anywhere
#[derive(Debug, Clone, Copy, Default)]
pub struct TopLevel;

impl ParentContext for TopLevel {
    fn read_theme(&self) -> Result<ThemeState, ParentAccessError> {
        Err(ParentAccessError::NotEmbedded)
    }
}

/// A parent behind a cross-origin boundary; every read is refused
#[derive(Debug, Clone)]
pub struct CrossOriginParent {
    origin: String,
}

impl CrossOriginParent {
    pub fn new(origin: impl Into<String>) -> Self {
        Self {
            origin: origin.into(),
        }
    }
}

impl ParentContext for CrossOriginParent {
    fn read_theme(&self) -> Result<ThemeState, ParentAccessError> {
        Err(ParentAccessError::CrossOrigin(self.origin.clone()))
    }
}

/// A same-origin parent whose theme is observed through a watch channel
#[derive(Debug, Clone)]
pub struct SameOriginParent {
    theme: watch::Receiver<ThemeState>,
}

impl SameOriginParent {
    pub fn new(theme: watch::Receiver<ThemeState>) -> Self {
        Self { theme }
    }
}

impl ParentContext for SameOriginParent {
    fn read_theme(&self) -> Result<ThemeState, ParentAccessError> {
        Ok(*self.theme.borrow())
    }
}

/// The element whose classes select the active theme
pub trait ThemeSurface: Send {
    /// Make `state` the only active theme class and update chrome metadata
    fn apply_theme(&mut self, state: ThemeState);
}

/// Root element model: class list plus the host chrome color
#[derive(Debug, Clone, Default)]
pub struct RootElement {
    classes: BTreeSet<String>,
    chrome_color: Option<String>,
}

impl RootElement {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether `class` is present
    pub fn has_class(&self, class: &str) -> bool {
        self.classes.contains(class)
    }

    /// Add an unrelated class (layout, view mode)
    pub fn add_class(&mut self, class: &str) {
        self.classes.insert(class.to_string());
    }

    /// Theme currently selected by the class list
    pub fn active_theme(&self) -> Option<ThemeState> {
        [ThemeState::Light, ThemeState::Dark]
            .into_iter()
            .find(|state| self.has_class(state.class_name()))
    }

    /// Chrome color metadata, once a theme was applied
    pub fn chrome_color(&self) -> Option<&str> {
        self.chrome_color.as_deref()
    }

    /// All classes, sorted
    pub fn class_list(&self) -> String {
        self.classes.iter().cloned().collect::<Vec<_>>().join(" ")
    }
}

impl ThemeSurface for RootElement {
    fn apply_theme(&mut self, state: ThemeState) {
        self.classes.remove(state.toggled().class_name());
        self.classes.insert(state.class_name().to_string());
        self.chrome_color = Some(state.chrome_color().to_string());
    }
}

impl<T: ThemeSurface> ThemeSurface for std::sync::Arc<std::sync::Mutex<T>> {
    fn apply_theme(&mut self, state: ThemeState) {
        match self.lock() {
            Ok(mut surface) => surface.apply_theme(state),
            Err(e) => log::error!("Theme surface lock poisoned: {}", e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_store() {
        let mut store = MemoryStore::new();
        assert_eq!(store.get("k").unwrap(), None);
        store.set("k", "v").unwrap();
        assert_eq!(store.get("k").unwrap().as_deref(), Some("v"));
    }

    #[test]
    fn test_json_store_persists_across_opens() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prefs").join(PREFERENCES_FILE);

        let mut store = JsonFileStore::open(&path).unwrap();
        store.set("utilicraft-theme", "light-theme").unwrap();

        let reopened = JsonFileStore::open(&path).unwrap();
        assert_eq!(
            reopened.get("utilicraft-theme").unwrap().as_deref(),
            Some("light-theme")
        );
    }

    #[test]
    fn test_snapshot_never_writes_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(PREFERENCES_FILE);
        std::fs::write(&path, r#"{"utilicraft-theme": "light-theme", "other": "x"}"#).unwrap();

        let disk = JsonFileStore::open(&path).unwrap();
        let mut snapshot = MemoryStore::snapshot(&disk, &["utilicraft-theme", "missing"]).unwrap();
        assert_eq!(snapshot.get("utilicraft-theme").unwrap().as_deref(), Some("light-theme"));
        assert_eq!(snapshot.get("other").unwrap(), None);
        assert_eq!(snapshot.get("missing").unwrap(), None);

        snapshot.set("utilicraft-theme", "dark-theme").unwrap();
        let reopened = JsonFileStore::open(&path).unwrap();
        assert_eq!(reopened.get("utilicraft-theme").unwrap().as_deref(), Some("light-theme"));
    }

    #[test]
    fn test_json_store_corrupt_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(PREFERENCES_FILE);
        std::fs::write(&path, "not json").unwrap();
        assert!(matches!(JsonFileStore::open(&path), Err(StoreError::Corrupt(_))));
    }

    #[test]
    fn test_parent_contexts() {
        assert_eq!(TopLevel.read_theme(), Err(ParentAccessError::NotEmbedded));
        assert!(matches!(
            CrossOriginParent::new("https://host.example").read_theme(),
            Err(ParentAccessError::CrossOrigin(_))
        ));

        let (tx, rx) = watch::channel(ThemeState::Light);
        let parent = SameOriginParent::new(rx);
        assert_eq!(parent.read_theme(), Ok(ThemeState::Light));
        tx.send_replace(ThemeState::Dark);
        assert_eq!(parent.read_theme(), Ok(ThemeState::Dark));
    }

    #[test]
    fn test_root_element_single_theme_class() {
        let mut root = RootElement::new();
        root.add_class("grid-view");
        root.apply_theme(ThemeState::Light);
        root.apply_theme(ThemeState::Dark);

        assert!(root.has_class("dark-theme"));
        assert!(!root.has_class("light-theme"));
        assert!(root.has_class("grid-view"));
        assert_eq!(root.active_theme(), Some(ThemeState::Dark));
        assert_eq!(root.chrome_color(), Some("#131620"));
    }
}
