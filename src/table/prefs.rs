//! Persisted table preferences
//!
//! Four independent entries per table, each read and written on its own so a
//! bad entry only ever costs that entry:
//! - `{T}_table_settings`: JSON array of `{value, selected}`
//! - `{T}_column_sizing_mode`: `estaticas` or `redimensionables`
//! - `{T}_column_resizing`: JSON map key -> `{width, isResizing}`
//! - `{T}_column_original_widths`: JSON map key -> number

use serde::{Deserialize, Serialize};
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use tracing::{debug, error, info, warn};

use crate::constants::layout::MIN_COLUMN_WIDTH;
use crate::constants::storage::*;
use crate::persistence::KeyValueStore;

/// Whether column widths come from stored measurements or natural layout
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SizingMode {
    #[default]
    Static,
    Resizable,
}

impl SizingMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            SizingMode::Static => MODE_STATIC,
            SizingMode::Resizable => MODE_RESIZABLE,
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim() {
            MODE_STATIC => Some(SizingMode::Static),
            MODE_RESIZABLE => Some(SizingMode::Resizable),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            SizingMode::Static => "Static",
            SizingMode::Resizable => "Resizable",
        }
    }
}

/// Persisted selection entry for one column
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnSelection {
    pub value: String,
    pub selected: bool,
}

/// Persisted manual width for one column
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ColumnWidth {
    pub width: f32,
    #[serde(rename = "isResizing", default)]
    pub is_resizing: bool,
}

impl ColumnWidth {
    pub fn new(width: f32) -> Self {
        Self { width, is_resizing: false }
    }
}

/// Everything stored for one table
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TablePreferences {
    /// `None` when nothing (valid) was stored; defaults then apply untouched
    pub columns: Option<Vec<ColumnSelection>>,
    pub sizing_mode: SizingMode,
    pub widths: HashMap<String, ColumnWidth>,
    pub original_widths: HashMap<String, f32>,
}

/// Storage keys for a table identifier
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreferenceKeys {
    pub table_settings: String,
    pub sizing_mode: String,
    pub column_resizing: String,
    pub original_widths: String,
}

impl PreferenceKeys {
    pub fn for_table(table_id: &str) -> Self {
        Self {
            table_settings: format!("{table_id}{TABLE_SETTINGS_SUFFIX}"),
            sizing_mode: format!("{table_id}{SIZING_MODE_SUFFIX}"),
            column_resizing: format!("{table_id}{COLUMN_RESIZING_SUFFIX}"),
            original_widths: format!("{table_id}{ORIGINAL_WIDTHS_SUFFIX}"),
        }
    }

    fn all(&self) -> [&str; 4] {
        [
            self.table_settings.as_str(),
            self.sizing_mode.as_str(),
            self.column_resizing.as_str(),
            self.original_widths.as_str(),
        ]
    }
}

/// Load preferences for `table_id`
///
/// Missing or malformed entries are logged and replaced by defaults.
pub fn load(store: &dyn KeyValueStore, table_id: &str) -> TablePreferences {
    let keys = PreferenceKeys::for_table(table_id);

    let columns = read_json::<Vec<ColumnSelection>>(store, &keys.table_settings);

    let sizing_mode = match read_raw(store, &keys.sizing_mode) {
        Some(raw) => SizingMode::parse(&raw).unwrap_or_else(|| {
            warn!(key = %keys.sizing_mode, value = %raw, "Unknown sizing mode, using static");
            SizingMode::Static
        }),
        None => SizingMode::Static,
    };

    let mut widths = read_json::<HashMap<String, ColumnWidth>>(store, &keys.column_resizing)
        .unwrap_or_default();
    for (column, width) in widths.iter_mut() {
        if width.width.is_nan() || width.width < MIN_COLUMN_WIDTH {
            warn!(table = %table_id, column = %column, width = width.width, min = MIN_COLUMN_WIDTH, "Stored column width below minimum, clamping");
            width.width = MIN_COLUMN_WIDTH;
        }
        // A drag never survives a reload
        width.is_resizing = false;
    }

    let original_widths = read_json::<HashMap<String, f32>>(store, &keys.original_widths)
        .unwrap_or_default();

    info!(
        table = %table_id,
        saved_columns = columns.as_ref().map_or(0, Vec::len),
        sizing_mode = sizing_mode.as_str(),
        widths = widths.len(),
        "Loaded table preferences"
    );

    TablePreferences {
        columns,
        sizing_mode,
        widths,
        original_widths,
    }
}

/// Write preferences for `table_id`
///
/// Each entry is written independently. Returns how many entries failed;
/// failures are logged and never abort the remaining writes.
pub fn save(store: &mut dyn KeyValueStore, table_id: &str, prefs: &TablePreferences) -> usize {
    let keys = PreferenceKeys::for_table(table_id);
    let mut failures = 0;

    if let Some(columns) = &prefs.columns {
        failures += write_json(store, &keys.table_settings, columns);
    }
    failures += write_raw(store, &keys.sizing_mode, prefs.sizing_mode.as_str());
    failures += write_json(store, &keys.column_resizing, &prefs.widths);
    failures += write_json(store, &keys.original_widths, &prefs.original_widths);

    if failures == 0 {
        debug!(table = %table_id, "Saved table preferences");
    } else {
        warn!(table = %table_id, failures, "Some table preference entries were not saved");
    }
    failures
}

/// Remove every stored entry for `table_id`
pub fn clear(store: &mut dyn KeyValueStore, table_id: &str) -> anyhow::Result<()> {
    let keys = PreferenceKeys::for_table(table_id);
    for key in keys.all() {
        store.remove_item(key)?;
    }
    info!(table = %table_id, "Cleared table preferences");
    Ok(())
}

fn read_raw(store: &dyn KeyValueStore, key: &str) -> Option<String> {
    match store.get_item(key) {
        Ok(value) => value,
        Err(e) => {
            error!(key = %key, error = %e, "Failed to read preference entry");
            None
        }
    }
}

fn read_json<T: DeserializeOwned>(store: &dyn KeyValueStore, key: &str) -> Option<T> {
    let raw = read_raw(store, key)?;
    match serde_json::from_str::<T>(&raw) {
        Ok(value) => Some(value),
        Err(e) => {
            error!(key = %key, error = %e, "Error parsing saved preference entry, using defaults");
            None
        }
    }
}

fn write_raw(store: &mut dyn KeyValueStore, key: &str, value: &str) -> usize {
    match store.set_item(key, value) {
        Ok(()) => 0,
        Err(e) => {
            error!(key = %key, error = %e, "Failed to write preference entry");
            1
        }
    }
}

fn write_json<T: Serialize>(store: &mut dyn KeyValueStore, key: &str, value: &T) -> usize {
    match serde_json::to_string(value) {
        Ok(json) => write_raw(store, key, &json),
        Err(e) => {
            error!(key = %key, error = %e, "Failed to serialize preference entry");
            1
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::MemoryStore;

    const TABLE: &str = "projects-table";

    fn sample_prefs() -> TablePreferences {
        TablePreferences {
            columns: Some(vec![
                ColumnSelection { value: "name".into(), selected: true },
                ColumnSelection { value: "link".into(), selected: false },
            ]),
            sizing_mode: SizingMode::Resizable,
            widths: HashMap::from([("name".to_string(), ColumnWidth::new(180.0))]),
            original_widths: HashMap::from([("name".to_string(), 120.0), ("link".to_string(), 95.0)]),
        }
    }

    #[test]
    fn test_keys_for_table() {
        let keys = PreferenceKeys::for_table(TABLE);
        assert_eq!(keys.table_settings, "projects-table_table_settings");
        assert_eq!(keys.sizing_mode, "projects-table_column_sizing_mode");
        assert_eq!(keys.column_resizing, "projects-table_column_resizing");
        assert_eq!(keys.original_widths, "projects-table_column_original_widths");
    }

    #[test]
    fn test_load_empty_store_gives_defaults() {
        let store = MemoryStore::new();
        assert_eq!(load(&store, TABLE), TablePreferences::default());
    }

    #[test]
    fn test_save_then_load() {
        let mut store = MemoryStore::new();
        let prefs = sample_prefs();
        assert_eq!(save(&mut store, TABLE, &prefs), 0);
        assert_eq!(load(&store, TABLE), prefs);
    }

    #[test]
    fn test_wire_format() {
        let mut store = MemoryStore::new();
        save(&mut store, TABLE, &sample_prefs());

        assert_eq!(
            store.get_item("projects-table_column_sizing_mode").unwrap().as_deref(),
            Some("redimensionables")
        );

        let resizing: serde_json::Value = serde_json::from_str(
            &store.get_item("projects-table_column_resizing").unwrap().unwrap(),
        )
        .unwrap();
        assert_eq!(resizing["name"]["width"], serde_json::json!(180.0));
        assert_eq!(resizing["name"]["isResizing"], serde_json::json!(false));

        let settings: serde_json::Value = serde_json::from_str(
            &store.get_item("projects-table_table_settings").unwrap().unwrap(),
        )
        .unwrap();
        assert_eq!(settings[1], serde_json::json!({ "value": "link", "selected": false }));
    }

    #[test]
    fn test_malformed_entry_only_affects_itself() {
        let mut store = MemoryStore::new();
        save(&mut store, TABLE, &sample_prefs());
        store.set_item("projects-table_column_resizing", "{ broken").unwrap();

        let loaded = load(&store, TABLE);
        assert!(loaded.widths.is_empty());
        assert_eq!(loaded.sizing_mode, SizingMode::Resizable);
        assert_eq!(loaded.columns, sample_prefs().columns);
        assert_eq!(loaded.original_widths.get("link"), Some(&95.0));
    }

    #[test]
    fn test_unknown_sizing_mode_is_static() {
        let mut store = MemoryStore::new();
        store.set_item("projects-table_column_sizing_mode", "stretchy").unwrap();
        assert_eq!(load(&store, TABLE).sizing_mode, SizingMode::Static);
    }

    #[test]
    fn test_saved_extra_fields_are_ignored() {
        let mut store = MemoryStore::new();
        store
            .set_item(
                "projects-table_table_settings",
                r#"[{"value":"name","text":"Name","selected":false,"fixed":true}]"#,
            )
            .unwrap();
        let loaded = load(&store, TABLE);
        assert_eq!(
            loaded.columns,
            Some(vec![ColumnSelection { value: "name".into(), selected: false }])
        );
    }

    #[test]
    fn test_stored_width_below_floor_is_clamped() {
        let mut store = MemoryStore::new();
        store
            .set_item(
                "projects-table_column_resizing",
                r#"{"name":{"width":12,"isResizing":true}}"#,
            )
            .unwrap();
        let loaded = load(&store, TABLE);
        assert_eq!(loaded.widths["name"], ColumnWidth::new(MIN_COLUMN_WIDTH));
    }

    #[test]
    fn test_partial_write_failure_keeps_other_entries() {
        let mut store = MemoryStore::new();
        store.fail_writes_for("projects-table_column_resizing");

        assert_eq!(save(&mut store, TABLE, &sample_prefs()), 1);

        let loaded = load(&store, TABLE);
        assert!(loaded.widths.is_empty());
        assert_eq!(loaded.sizing_mode, SizingMode::Resizable);
        assert_eq!(loaded.original_widths.len(), 2);
        assert!(loaded.columns.is_some());
    }

    #[test]
    fn test_clear_removes_entries() {
        let mut store = MemoryStore::new();
        save(&mut store, TABLE, &sample_prefs());
        save(&mut store, "tasks-table", &sample_prefs());

        clear(&mut store, TABLE).unwrap();

        assert_eq!(load(&store, TABLE), TablePreferences::default());
        assert_eq!(load(&store, "tasks-table"), sample_prefs());
    }
}
