//! Cell presentation decisions and the single inline edit target

use egui::Color32;
use serde_json::Value;

use crate::constants::table::{
    PRIORITY_COLUMN, PRIORITY_OPTIONS, PROGRESS_COLUMN, STATUS_COLUMN, STATUS_OPTIONS,
};
use super::columns::{display_value, format_value, lenient_number, ColumnDescriptor};

/// Triggers rendered in the action column
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionTag {
    View,
    Edit,
    Delete,
}

impl ActionTag {
    pub const ALL: [ActionTag; 3] = [ActionTag::View, ActionTag::Edit, ActionTag::Delete];

    pub fn as_str(&self) -> &'static str {
        match self {
            ActionTag::View => "view",
            ActionTag::Edit => "edit",
            ActionTag::Delete => "delete",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ActionTag::View => "\u{1F441} View",
            ActionTag::Edit => "\u{270F} Edit",
            ActionTag::Delete => "\u{1F5D1} Delete",
        }
    }
}

/// What the table reports back to its owner
#[derive(Debug, Clone, PartialEq)]
pub enum TableEvent {
    Action { tag: ActionTag, row_id: i64 },
    Edit { row_id: i64, column: String },
    Save { row_id: i64, column: String, value: String },
}

/// The one cell currently showing an inline editor
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EditTarget {
    pub row_id: Option<i64>,
    pub column_key: Option<String>,
}

impl EditTarget {
    /// Target a cell, replacing whatever was targeted before
    pub fn set(&mut self, row_id: i64, column_key: &str) {
        self.row_id = Some(row_id);
        self.column_key = Some(column_key.to_string());
    }

    pub fn clear(&mut self) {
        self.row_id = None;
        self.column_key = None;
    }

    pub fn is_active(&self) -> bool {
        self.row_id.is_some() && self.column_key.is_some()
    }

    pub fn matches(&self, row_id: i64, column_key: &str) -> bool {
        self.row_id == Some(row_id) && self.column_key.as_deref() == Some(column_key)
    }
}

/// Caller-supplied tag colours for the closed-set fields
#[derive(Clone, Copy, Default)]
pub struct CellColors {
    pub status: Option<fn(&str) -> Color32>,
    pub priority: Option<fn(&str) -> Color32>,
}

/// How one cell should be drawn
#[derive(Debug, Clone, PartialEq)]
pub enum CellView {
    Actions,
    Select {
        options: &'static [&'static str],
        current: String,
    },
    TextInput {
        current: String,
    },
    Tag {
        text: String,
        color: Color32,
    },
    Progress {
        fraction: f32,
        text: String,
    },
    Text {
        text: String,
    },
}

impl CellView {
    /// Whether clicking the cell should make it the edit target
    pub fn is_click_to_edit(&self) -> bool {
        matches!(self, CellView::Tag { .. } | CellView::Text { .. })
    }
}

/// Numeric id of a row, if it has one
pub fn row_id(row: &Value) -> Option<i64> {
    match row.get("id")? {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Legal values for closed-set columns
pub fn enumerated_options(column_key: &str) -> Option<&'static [&'static str]> {
    match column_key {
        STATUS_COLUMN => Some(&STATUS_OPTIONS),
        PRIORITY_COLUMN => Some(&PRIORITY_OPTIONS),
        _ => None,
    }
}

/// Decide the presentation of `row` x `column`
///
/// `editable` is false when the owner has no save handler; cells then never
/// turn into editors.
pub fn cell_view(
    row: &Value,
    column: &ColumnDescriptor,
    target: &EditTarget,
    colors: &CellColors,
    editable: bool,
) -> CellView {
    if column.is_action_column() {
        return CellView::Actions;
    }

    let value = display_value(row, column);
    let text = format_value(&value);

    let targeted = editable && row_id(row).is_some_and(|id| target.matches(id, &column.key));
    if targeted {
        return match enumerated_options(&column.key) {
            Some(options) => CellView::Select {
                options,
                current: text,
            },
            None => CellView::TextInput { current: text },
        };
    }

    let tag_color = match column.key.as_str() {
        STATUS_COLUMN => colors.status,
        PRIORITY_COLUMN => colors.priority,
        _ => None,
    };
    if let Some(color_for) = tag_color {
        let color = color_for(&text);
        return CellView::Tag { text, color };
    }

    if column.key == PROGRESS_COLUMN {
        let percent = lenient_number(&value);
        return CellView::Progress {
            fraction: (percent / 100.0).clamp(0.0, 1.0) as f32,
            text: format!("{text}%"),
        };
    }

    CellView::Text { text }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn red(_: &str) -> Color32 {
        Color32::RED
    }

    fn colors() -> CellColors {
        CellColors {
            status: Some(red),
            priority: Some(red),
        }
    }

    fn row() -> Value {
        json!({
            "id": 7,
            "name": "Apollo",
            "status": "In progress",
            "priority": "High",
            "progress": 50
        })
    }

    #[test]
    fn test_edit_target_replaces() {
        let mut target = EditTarget::default();
        assert!(!target.is_active());

        target.set(1, "name");
        target.set(2, "status");
        assert!(target.matches(2, "status"));
        assert!(!target.matches(1, "name"));
        assert!(!target.matches(2, "name"));

        target.clear();
        assert!(!target.is_active());
    }

    #[test]
    fn test_action_column() {
        let view = cell_view(&row(), &ColumnDescriptor::actions("Actions"), &EditTarget::default(), &colors(), true);
        assert_eq!(view, CellView::Actions);
    }

    #[test]
    fn test_targeted_closed_set_fields_get_select() {
        let mut target = EditTarget::default();
        target.set(7, "status");
        let view = cell_view(&row(), &ColumnDescriptor::plain("status", "Status"), &target, &colors(), true);
        assert_eq!(
            view,
            CellView::Select {
                options: &STATUS_OPTIONS,
                current: "In progress".to_string()
            }
        );

        target.set(7, "priority");
        let view = cell_view(&row(), &ColumnDescriptor::plain("priority", "Priority"), &target, &colors(), true);
        assert!(matches!(view, CellView::Select { options, .. } if options == &PRIORITY_OPTIONS));
    }

    #[test]
    fn test_targeted_other_field_gets_text_input() {
        let mut target = EditTarget::default();
        target.set(7, "name");
        let view = cell_view(&row(), &ColumnDescriptor::plain("name", "Name"), &target, &colors(), true);
        assert_eq!(view, CellView::TextInput { current: "Apollo".into() });
    }

    #[test]
    fn test_not_editable_without_save_handler() {
        let mut target = EditTarget::default();
        target.set(7, "name");
        let view = cell_view(&row(), &ColumnDescriptor::plain("name", "Name"), &target, &colors(), false);
        assert_eq!(view, CellView::Text { text: "Apollo".into() });
    }

    #[test]
    fn test_tags_need_color_mapping() {
        let status = ColumnDescriptor::plain("status", "Status");
        let tagged = cell_view(&row(), &status, &EditTarget::default(), &colors(), true);
        assert_eq!(
            tagged,
            CellView::Tag {
                text: "In progress".into(),
                color: Color32::RED
            }
        );

        let plain = cell_view(&row(), &status, &EditTarget::default(), &CellColors::default(), true);
        assert_eq!(plain, CellView::Text { text: "In progress".into() });
    }

    #[test]
    fn test_progress_cell() {
        let view = cell_view(&row(), &ColumnDescriptor::plain("progress", "Progress"), &EditTarget::default(), &colors(), true);
        assert_eq!(
            view,
            CellView::Progress {
                fraction: 0.5,
                text: "50%".into()
            }
        );

        let over = json!({ "id": 1, "progress": 250 });
        let view = cell_view(&over, &ColumnDescriptor::plain("progress", "Progress"), &EditTarget::default(), &colors(), true);
        assert!(matches!(view, CellView::Progress { fraction, .. } if fraction == 1.0));
    }

    #[test]
    fn test_click_to_edit_cells() {
        assert!(CellView::Text { text: String::new() }.is_click_to_edit());
        assert!(!CellView::Actions.is_click_to_edit());
        assert!(!CellView::Progress { fraction: 0.0, text: String::new() }.is_click_to_edit());
    }

    #[test]
    fn test_row_id_accepts_numeric_strings() {
        assert_eq!(row_id(&json!({ "id": 3 })), Some(3));
        assert_eq!(row_id(&json!({ "id": "12" })), Some(12));
        assert_eq!(row_id(&json!({ "name": "x" })), None);
    }
}
