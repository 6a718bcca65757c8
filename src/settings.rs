use std::fs;
use std::path::PathBuf;

use anyhow::Context;
use bevy::prelude::*;
use rook_widgets::drag_drop::TreeSection;

pub use rook_widgets::drag_drop::DragDropOverrides;

/// Fixed key for the persisted alphabetical-sort toggle.
pub const SORT_KEY: &str = "explorer.sortAlphabetical";

const STORE_FILE: &str = "rook_settings.json";

/// User-facing toggles for the scene explorer panel.
///
/// `sort_alphabetical` round-trips through the local store; everything else
/// is session-only.
#[derive(Resource)]
pub struct ExplorerSettings {
    /// Order rows by (category, name) instead of authored sibling order.
    /// While on, sibling reorder drops collapse to reparenting.
    pub sort_alphabetical: bool,
    /// Master toggle for drag-to-reparent in the tree.
    pub drag_to_reparent: bool,
}

impl Default for ExplorerSettings {
    fn default() -> Self {
        Self {
            sort_alphabetical: false,
            drag_to_reparent: true,
        }
    }
}

// ---------------------------------------------------------------------------
// Local key-value store
// ---------------------------------------------------------------------------

/// A flat JSON key-value file. Every failure mode (missing file, bad JSON,
/// unwritable directory) degrades to the caller's in-memory default; nothing
/// here is fatal.
#[derive(Resource)]
pub struct LocalStore {
    path: PathBuf,
}

impl Default for LocalStore {
    fn default() -> Self {
        Self {
            path: PathBuf::from(STORE_FILE),
        }
    }
}

impl LocalStore {
    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn get<T: serde::de::DeserializeOwned>(&self, key: &str) -> Option<T> {
        match self.read_map() {
            Ok(map) => map
                .get(key)
                .cloned()
                .and_then(|value| serde_json::from_value(value).ok()),
            Err(err) => {
                debug!("Settings store unreadable: {err:#}");
                None
            }
        }
    }

    pub fn set<T: serde::Serialize>(&self, key: &str, value: T) {
        let json = match serde_json::to_value(&value) {
            Ok(json) => json,
            Err(err) => {
                debug!("Settings value not serializable: {err:#}");
                return;
            }
        };
        let mut map = self.read_map().unwrap_or_default();
        map.insert(key.to_string(), json);
        if let Err(err) = self.write_map(&map) {
            debug!("Settings store unwritable: {err:#}");
        }
    }

    fn read_map(&self) -> anyhow::Result<serde_json::Map<String, serde_json::Value>> {
        if !self.path.exists() {
            return Ok(serde_json::Map::new());
        }
        let text = fs::read_to_string(&self.path)
            .with_context(|| format!("reading {}", self.path.display()))?;
        let map = serde_json::from_str(&text)
            .with_context(|| format!("parsing {}", self.path.display()))?;
        Ok(map)
    }

    fn write_map(&self, map: &serde_json::Map<String, serde_json::Value>) -> anyhow::Result<()> {
        let text = serde_json::to_string_pretty(map)?;
        fs::write(&self.path, text).with_context(|| format!("writing {}", self.path.display()))?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Systems
// ---------------------------------------------------------------------------

fn load_persisted_settings(store: Res<LocalStore>, mut settings: ResMut<ExplorerSettings>) {
    if let Some(value) = store.get::<bool>(SORT_KEY) {
        settings.sort_alphabetical = value;
    }
}

fn persist_sort_setting(store: Res<LocalStore>, settings: Res<ExplorerSettings>) {
    if settings.is_changed() && !settings.is_added() {
        store.set(SORT_KEY, settings.sort_alphabetical);
    }
}

/// Push the panel-level drag toggle down into every section gate.
fn sync_section_drag_gates(
    settings: Res<ExplorerSettings>,
    mut sections: Query<&mut TreeSection>,
) {
    if !settings.is_changed() {
        return;
    }
    for mut section in &mut sections {
        section.drag_enabled = settings.drag_to_reparent;
    }
}

pub struct SettingsPlugin;

impl Plugin for SettingsPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<LocalStore>()
            .init_resource::<ExplorerSettings>()
            .init_resource::<DragDropOverrides>()
            .add_systems(Startup, load_persisted_settings)
            .add_systems(Update, (persist_sort_setting, sync_section_drag_gates));
    }
}
