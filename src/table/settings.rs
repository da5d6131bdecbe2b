//! Draft editing of the column model
//!
//! The settings window works on a private copy of the columns. Nothing
//! reaches the live table until [`SettingsDraft::commit`]; dropping or
//! cancelling the draft leaves the table untouched.

use tracing::{debug, info};

use super::columns::ColumnDescriptor;
use super::prefs::SizingMode;

/// Result of a saved settings session, applied atomically by the table
#[derive(Debug, Clone, PartialEq)]
pub struct SettingsCommit {
    pub columns: Vec<ColumnDescriptor>,
    pub sizing_mode: SizingMode,
    pub reset_widths: bool,
}

#[derive(Debug, Clone)]
pub struct SettingsDraft {
    columns: Vec<ColumnDescriptor>,
    sizing_mode: SizingMode,
    reset_widths: bool,
}

impl SettingsDraft {
    pub fn open(columns: &[ColumnDescriptor], sizing_mode: SizingMode) -> Self {
        Self {
            columns: columns.to_vec(),
            sizing_mode,
            reset_widths: false,
        }
    }

    pub fn columns(&self) -> &[ColumnDescriptor] {
        &self.columns
    }

    pub fn sizing_mode(&self) -> SizingMode {
        self.sizing_mode
    }

    pub fn set_sizing_mode(&mut self, mode: SizingMode) {
        self.sizing_mode = mode;
    }

    pub fn reset_widths_requested(&self) -> bool {
        self.reset_widths
    }

    pub fn request_width_reset(&mut self) {
        self.reset_widths = true;
    }

    /// Flip `selected` on a non-fixed column; returns whether anything changed
    pub fn toggle_selected(&mut self, index: usize) -> bool {
        match self.columns.get_mut(index) {
            Some(column) if !column.fixed => {
                column.selected = !column.selected;
                true
            }
            _ => false,
        }
    }

    /// Fixed columns stay where they are unless something else moves around them
    pub fn can_drag(&self, index: usize) -> bool {
        self.columns.get(index).is_some_and(|c| !c.fixed)
    }

    /// Move the column at `from` so it ends up at `to`
    ///
    /// Splice semantics: remove at `from`, insert at `to` (clamped to the end).
    /// Any column, fixed or not, is a valid drop position.
    pub fn reorder(&mut self, from: usize, to: usize) -> bool {
        if !self.can_drag(from) {
            return false;
        }

        let column = self.columns.remove(from);
        let to = to.min(self.columns.len());
        debug!(column = %column.key, from, to, "Reordered column in draft");
        self.columns.insert(to, column);
        from != to
    }

    pub fn commit(self) -> SettingsCommit {
        info!(
            columns = self.columns.len(),
            visible = self.columns.iter().filter(|c| c.is_visible()).count(),
            sizing_mode = self.sizing_mode.as_str(),
            reset_widths = self.reset_widths,
            "Committing table settings"
        );
        SettingsCommit {
            columns: self.columns,
            sizing_mode: self.sizing_mode,
            reset_widths: self.reset_widths,
        }
    }

    pub fn cancel(self) {
        debug!("Discarded table settings draft");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keys(draft: &SettingsDraft) -> Vec<&str> {
        draft.columns().iter().map(|c| c.key.as_str()).collect()
    }

    fn sample() -> Vec<ColumnDescriptor> {
        vec![
            ColumnDescriptor::plain("name", "Name").fixed(),
            ColumnDescriptor::plain("owner", "Owner"),
            ColumnDescriptor::plain("status", "Status"),
            ColumnDescriptor::plain("link", "Link").hidden(),
            ColumnDescriptor::actions("Actions"),
        ]
    }

    #[test]
    fn test_toggle_fixed_is_noop() {
        let mut draft = SettingsDraft::open(&sample(), SizingMode::Static);
        assert!(!draft.toggle_selected(0));
        assert!(!draft.toggle_selected(4));
        assert_eq!(draft.columns(), sample().as_slice());
    }

    #[test]
    fn test_toggle_flips_only_that_column() {
        let mut draft = SettingsDraft::open(&sample(), SizingMode::Static);
        assert!(draft.toggle_selected(3));

        let expected: Vec<bool> = vec![true, true, true, true, true];
        let selected: Vec<bool> = draft.columns().iter().map(|c| c.selected).collect();
        assert_eq!(selected, expected);

        assert!(draft.toggle_selected(3));
        assert_eq!(draft.columns(), sample().as_slice());
        assert!(!draft.toggle_selected(99));
    }

    #[test]
    fn test_reorder_moves_to_target() {
        let mut draft = SettingsDraft::open(&sample(), SizingMode::Static);
        assert!(draft.reorder(1, 3));
        assert_eq!(keys(&draft), vec!["name", "status", "link", "owner", "actions"]);

        assert!(draft.reorder(3, 1));
        assert_eq!(keys(&draft), vec!["name", "owner", "status", "link", "actions"]);
    }

    #[test]
    fn test_reorder_onto_fixed_target() {
        let mut draft = SettingsDraft::open(&sample(), SizingMode::Static);
        assert!(draft.reorder(2, 0));
        assert_eq!(keys(&draft), vec!["status", "name", "owner", "link", "actions"]);
    }

    #[test]
    fn test_fixed_column_not_draggable() {
        let mut draft = SettingsDraft::open(&sample(), SizingMode::Static);
        assert!(!draft.can_drag(0));
        assert!(!draft.reorder(0, 2));
        assert!(!draft.reorder(4, 0));
        assert!(!draft.reorder(17, 0));
        assert_eq!(draft.columns(), sample().as_slice());
    }

    #[test]
    fn test_reorder_preserves_multiset() {
        let original = sample();
        for from in 0..original.len() {
            for to in 0..original.len() + 1 {
                let mut draft = SettingsDraft::open(&original, SizingMode::Static);
                let moved = original[from].key.clone();
                draft.reorder(from, to);

                let mut before: Vec<_> = original.iter().map(|c| c.key.clone()).collect();
                let mut after: Vec<_> = draft.columns().iter().map(|c| c.key.clone()).collect();
                before.sort();
                after.sort();
                assert_eq!(before, after);

                if !original[from].fixed {
                    let target = to.min(original.len() - 1);
                    assert_eq!(draft.columns()[target].key, moved);
                }
            }
        }
    }

    #[test]
    fn test_commit_carries_mode_and_reset() {
        let mut draft = SettingsDraft::open(&sample(), SizingMode::Static);
        draft.set_sizing_mode(SizingMode::Resizable);
        draft.request_width_reset();
        let commit = draft.commit();
        assert_eq!(commit.sizing_mode, SizingMode::Resizable);
        assert!(commit.reset_widths);
        assert_eq!(commit.columns, sample());
    }
}
