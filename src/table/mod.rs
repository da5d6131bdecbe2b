//! Configurable table engine
//!
//! Everything about a table that is not drawing: which columns exist and in
//! what order, how wide they are, what the settings window is editing, which
//! cell is being edited, and when all of that is written back to storage.
//!
//! - `columns`: column descriptors and value derivation
//! - `prefs`: the four persisted preference entries
//! - `resize`: width state and the resize drag state machine
//! - `settings`: draft-then-commit editing of the column model
//! - `cells`: per-cell presentation and the edit target

pub mod cells;
pub mod columns;
pub mod prefs;
pub mod resize;
pub mod settings;

use std::time::{Duration, Instant};
use tracing::{debug, info};

use crate::persistence::KeyValueStore;
use cells::EditTarget;
use columns::{visible_columns, ColumnDescriptor};
use prefs::{ColumnSelection, TablePreferences};
use resize::{ColumnLayout, SaveDebounce};
use settings::{SettingsCommit, SettingsDraft};

/// Overlay persisted selection (and order) onto the default columns
///
/// Saved keys come first in saved order with their saved `selected` flag;
/// default columns the save does not mention follow in default order. Saved
/// keys that no longer exist are ignored. Nothing but `selected` and position
/// is ever taken from storage.
pub fn apply_saved_selection(
    defaults: &[ColumnDescriptor],
    saved: &[ColumnSelection],
) -> Vec<ColumnDescriptor> {
    let mut remaining: Vec<Option<ColumnDescriptor>> = defaults.iter().cloned().map(Some).collect();
    let mut columns = Vec::with_capacity(defaults.len());

    for entry in saved {
        let slot = remaining
            .iter_mut()
            .find(|slot| slot.as_ref().is_some_and(|c| c.key == entry.value));
        if let Some(mut column) = slot.and_then(|slot| slot.take()) {
            column.selected = entry.selected;
            columns.push(column);
        } else {
            debug!(column = %entry.value, "Ignoring saved setting for unknown column");
        }
    }

    columns.extend(remaining.into_iter().flatten());
    columns
}

/// State of one mounted table
#[derive(Debug)]
pub struct TableState {
    table_id: String,
    columns: Vec<ColumnDescriptor>,
    pub layout: ColumnLayout,
    pub edit_target: EditTarget,
    settings: Option<SettingsDraft>,
    debounce: SaveDebounce,
    save_delay: Duration,
}

impl TableState {
    /// Seed from `defaults`, then overlay whatever is stored for `table_id`
    pub fn mount(
        table_id: &str,
        defaults: &[ColumnDescriptor],
        store: &dyn KeyValueStore,
        save_delay: Duration,
    ) -> Self {
        let prefs = prefs::load(store, table_id);
        let columns = match &prefs.columns {
            Some(saved) => apply_saved_selection(defaults, saved),
            None => defaults.to_vec(),
        };

        info!(
            table = %table_id,
            columns = columns.len(),
            visible = columns.iter().filter(|c| c.is_visible()).count(),
            "Mounted table"
        );

        Self {
            table_id: table_id.to_string(),
            columns,
            layout: ColumnLayout::from_prefs(&prefs),
            edit_target: EditTarget::default(),
            settings: None,
            debounce: SaveDebounce::default(),
            save_delay,
        }
    }

    pub fn table_id(&self) -> &str {
        &self.table_id
    }

    pub fn columns(&self) -> &[ColumnDescriptor] {
        &self.columns
    }

    pub fn visible_columns(&self) -> Vec<&ColumnDescriptor> {
        visible_columns(&self.columns)
    }

    pub fn preferences(&self) -> TablePreferences {
        self.layout.to_prefs(&self.columns)
    }

    /// Write all four preference entries now
    pub fn persist(&mut self, store: &mut dyn KeyValueStore) -> usize {
        self.debounce.take_pending();
        prefs::save(store, &self.table_id, &self.preferences())
    }

    // ----- resize -----------------------------------------------------------

    /// Pointer-down on a header's resize handle
    pub fn begin_resize(&mut self, index: usize, pointer_x: f32, rendered_widths: &[f32]) -> bool {
        let visible = visible_columns(&self.columns);
        self.layout.begin_resize(index, &visible, pointer_x, rendered_widths)
    }

    pub fn drag_resize(&mut self, pointer_x: f32) -> Option<f32> {
        self.layout.drag_to(pointer_x)
    }

    /// Pointer-up anywhere; schedules a write once the frame settles
    pub fn end_resize(&mut self, now: Instant) -> bool {
        let ended = self.layout.release();
        if ended {
            self.debounce.arm(now, self.save_delay);
        }
        ended
    }

    /// Perform a scheduled write if it is due; returns whether one happened
    pub fn poll_save(&mut self, now: Instant, store: &mut dyn KeyValueStore) -> bool {
        if !self.debounce.take_due(now) {
            return false;
        }
        prefs::save(store, &self.table_id, &self.preferences());
        true
    }

    pub fn save_pending(&self) -> bool {
        self.debounce.is_armed()
    }

    /// Write immediately if a debounced write is still outstanding
    pub fn flush(&mut self, store: &mut dyn KeyValueStore) {
        if self.debounce.take_pending() {
            prefs::save(store, &self.table_id, &self.preferences());
        }
    }

    // ----- cell editing -----------------------------------------------------

    /// A cell's editor has written its value back
    ///
    /// The target is only cleared when it still points at that cell. A click
    /// on another cell in the same frame has already moved it elsewhere.
    pub fn finish_edit(&mut self, row_id: i64, column_key: &str) -> bool {
        if !self.edit_target.matches(row_id, column_key) {
            debug!(project = row_id, column = %column_key, "Edit target moved on before save");
            return false;
        }
        self.edit_target.clear();
        true
    }

    // ----- settings window --------------------------------------------------

    pub fn open_settings(&mut self) {
        if self.settings.is_none() {
            self.settings = Some(SettingsDraft::open(&self.columns, self.layout.sizing_mode));
        }
    }

    pub fn settings_draft(&mut self) -> Option<&mut SettingsDraft> {
        self.settings.as_mut()
    }

    pub fn is_settings_open(&self) -> bool {
        self.settings.is_some()
    }

    /// Apply the open draft atomically and persist
    pub fn save_settings(&mut self, store: &mut dyn KeyValueStore) -> bool {
        let Some(draft) = self.settings.take() else {
            return false;
        };
        self.apply_commit(draft.commit());
        self.persist(store);
        true
    }

    pub fn cancel_settings(&mut self) {
        if let Some(draft) = self.settings.take() {
            draft.cancel();
        }
    }

    fn apply_commit(&mut self, commit: SettingsCommit) {
        self.layout.release();
        self.columns = commit.columns;
        self.layout.sizing_mode = commit.sizing_mode;
        if commit.reset_widths {
            self.layout.reset_widths();
        }

        // Drop an edit target whose column is no longer shown
        if let Some(key) = &self.edit_target.column_key
            && !self.columns.iter().any(|c| &c.key == key && c.is_visible())
        {
            self.edit_target.clear();
        }
    }
}
