//! Project rows shown on the dashboard
//!
//! Rows are kept as loose JSON objects, the same shape the table engine
//! reads. The repository owns them, normalises what it loads and writes edits
//! back to the data file on a best-effort basis.

pub mod filter;
pub mod tasks;

use anyhow::{Context, Result};
use serde_json::{Map, Value};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info, warn};

use crate::constants::table::{ACTIONS_COLUMN, PROGRESS_COLUMN};
use crate::table::cells::row_id;
use crate::table::columns::{lenient_number, ColumnDescriptor};
use filter::StatusGroup;
use tasks::{Task, TASKS_FIELD};

/// Fields stored as lists of names
const LIST_FIELDS: [&str; 2] = ["type", "team"];

/// Default column set of the projects table
pub fn project_columns() -> Vec<ColumnDescriptor> {
    vec![
        ColumnDescriptor::plain("name", "Name").fixed(),
        ColumnDescriptor::plain("owner_name", "Owner"),
        ColumnDescriptor::plain("status", "Status"),
        ColumnDescriptor::plain("type", "Type"),
        ColumnDescriptor::plain("team", "Team"),
        ColumnDescriptor::plain("priority", "Priority"),
        ColumnDescriptor::plain("objective", "Objective"),
        ColumnDescriptor::plain("start_date", "Start Date"),
        ColumnDescriptor::plain("end_date", "End Date"),
        ColumnDescriptor::plain(PROGRESS_COLUMN, "Progress"),
        ColumnDescriptor::plain("link", "Link").hidden(),
        ColumnDescriptor::plain("notes", "Notes").hidden(),
        ColumnDescriptor::actions("Actions"),
    ]
}

/// Headline numbers above the table
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProjectSummary {
    pub total: usize,
    pub completed: usize,
    pub in_progress: usize,
    /// Mean of `progress`, rounded; 0 for an empty set
    pub average_progress: i64,
}

impl ProjectSummary {
    pub fn of<'a>(rows: impl IntoIterator<Item = &'a Value>) -> Self {
        let mut summary = Self::default();
        let mut progress_sum = 0.0;

        for row in rows {
            summary.total += 1;
            progress_sum += row.get(PROGRESS_COLUMN).map(lenient_number).unwrap_or(0.0);
            match StatusGroup::of(&field_str(row, "status")) {
                StatusGroup::Done => summary.completed += 1,
                StatusGroup::InProgress => summary.in_progress += 1,
                StatusGroup::Pending | StatusGroup::Stopped => {}
            }
        }

        if summary.total > 0 {
            summary.average_progress = (progress_sum / summary.total as f64).round() as i64;
        }
        summary
    }
}

#[derive(Debug, Default)]
pub struct ProjectRepository {
    path: Option<PathBuf>,
    rows: Vec<Value>,
}

impl ProjectRepository {
    /// Load rows from a JSON array file
    ///
    /// A missing file gives an empty board that is created on first write.
    pub fn load(path: &Path) -> Result<Self> {
        let rows = match fs::read_to_string(path) {
            Ok(contents) => serde_json::from_str::<Vec<Value>>(&contents)
                .with_context(|| format!("Failed to parse project data from {:?}", path))?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                warn!(path = %path.display(), "Project data file not found, starting with an empty board");
                Vec::new()
            }
            Err(e) => {
                return Err(e).with_context(|| format!("Failed to read project data from {:?}", path));
            }
        };

        let mut repo = Self::from_rows(rows);
        repo.path = Some(path.to_path_buf());
        info!(path = %path.display(), projects = repo.rows.len(), "Loaded projects");
        Ok(repo)
    }

    /// In-memory repository; edits are never written anywhere
    pub fn from_rows(rows: Vec<Value>) -> Self {
        let mut next_id = rows.iter().filter_map(row_id).max().unwrap_or(0) + 1;
        let rows = rows
            .into_iter()
            .filter_map(|row| match row {
                Value::Object(fields) => Some(normalize(fields, &mut next_id)),
                other => {
                    warn!(row = %other, "Skipping project entry that is not an object");
                    None
                }
            })
            .collect();

        Self { path: None, rows }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn rows(&self) -> &[Value] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn get(&self, id: i64) -> Option<&Value> {
        self.rows.iter().find(|row| row_id(row) == Some(id))
    }

    /// Overwrite one field of one row from editor text
    ///
    /// `progress` must parse as a number and is clamped to 0..=100; `type`
    /// and `team` are split on commas. Returns whether a row was updated.
    pub fn update_field(&mut self, id: i64, key: &str, text: &str) -> bool {
        if key == "id" || key == ACTIONS_COLUMN {
            warn!(project = id, field = %key, "Refusing to edit a read-only field");
            return false;
        }

        let value = match field_value(key, text) {
            Some(value) => value,
            None => {
                warn!(project = id, field = %key, value = %text, "Rejected edit with invalid value");
                return false;
            }
        };

        let Some(Value::Object(fields)) = self.rows.iter_mut().find(|row| row_id(row) == Some(id)) else {
            warn!(project = id, "Edit for unknown project");
            return false;
        };

        debug!(project = id, field = %key, "Updated project field");
        fields.insert(key.to_string(), value);
        self.write_back();
        true
    }

    /// Replace a whole row, keeping its id
    pub fn replace(&mut self, id: i64, row: Value) -> bool {
        let Value::Object(mut fields) = row else {
            return false;
        };
        let Some(slot) = self.rows.iter_mut().find(|row| row_id(row) == Some(id)) else {
            return false;
        };

        fields.insert("id".to_string(), Value::from(id));
        // The project form does not carry tasks
        if !fields.contains_key(TASKS_FIELD)
            && let Some(existing) = slot.get(TASKS_FIELD)
        {
            fields.insert(TASKS_FIELD.to_string(), existing.clone());
        }
        let mut unused = id;
        *slot = normalize(fields, &mut unused);
        info!(project = id, "Saved project");
        self.write_back();
        true
    }

    /// Append a new row, assigning it the next free id
    pub fn add(&mut self, row: Value) -> Option<i64> {
        let Value::Object(mut fields) = row else {
            return None;
        };

        let id = self.rows.iter().filter_map(row_id).max().unwrap_or(0) + 1;
        fields.insert("id".to_string(), Value::from(id));
        let mut unused = id;
        self.rows.push(normalize(fields, &mut unused));
        info!(project = id, "Created project");
        self.write_back();
        Some(id)
    }

    pub fn delete(&mut self, id: i64) -> bool {
        let before = self.rows.len();
        self.rows.retain(|row| row_id(row) != Some(id));
        let removed = self.rows.len() != before;
        if removed {
            info!(project = id, "Deleted project");
            self.write_back();
        }
        removed
    }

    pub fn tasks(&self, id: i64) -> Vec<Task> {
        self.get(id).map(tasks::tasks_of).unwrap_or_default()
    }

    pub fn add_task(&mut self, id: i64, description: &str) -> Option<i64> {
        let task_id = self.edit_tasks(id, |list| tasks::add(list, description))?;
        info!(project = id, task = task_id, "Added task");
        Some(task_id)
    }

    /// Returns the task's new completion flag
    pub fn toggle_task(&mut self, id: i64, task_id: i64) -> Option<bool> {
        let completed = self.edit_tasks(id, |list| tasks::toggle(list, task_id))?;
        debug!(project = id, task = task_id, completed, "Toggled task");
        Some(completed)
    }

    pub fn rename_task(&mut self, id: i64, task_id: i64, description: &str) -> bool {
        self.edit_tasks(id, |list| tasks::rename(list, task_id, description).then_some(()))
            .is_some()
    }

    pub fn delete_task(&mut self, id: i64, task_id: i64) -> bool {
        let removed = self
            .edit_tasks(id, |list| tasks::remove(list, task_id).then_some(()))
            .is_some();
        if removed {
            info!(project = id, task = task_id, "Deleted task");
        }
        removed
    }

    /// Run `edit` on a project's task list and store the result if it succeeded
    fn edit_tasks<T>(&mut self, id: i64, edit: impl FnOnce(&mut Vec<Task>) -> Option<T>) -> Option<T> {
        let Some(Value::Object(fields)) = self.rows.iter_mut().find(|row| row_id(row) == Some(id)) else {
            warn!(project = id, "Task change for unknown project");
            return None;
        };

        let mut list = tasks::parse(fields.get(TASKS_FIELD));
        let Some(outcome) = edit(&mut list) else {
            warn!(project = id, "Task change rejected");
            return None;
        };
        fields.insert(TASKS_FIELD.to_string(), tasks::to_value(&list));
        self.write_back();
        Some(outcome)
    }

    /// Distinct non-empty values of a field, sorted, for filter dropdowns
    pub fn distinct(&self, key: &str) -> Vec<String> {
        let mut values: Vec<String> = self
            .rows
            .iter()
            .flat_map(|row| match row.get(key) {
                Some(Value::Array(items)) => items.iter().filter_map(|v| v.as_str().map(str::to_string)).collect(),
                Some(Value::String(s)) => vec![s.clone()],
                _ => Vec::new(),
            })
            .filter(|s| !s.is_empty())
            .collect();
        values.sort();
        values.dedup();
        values
    }

    fn save(&self) -> Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create data directory {:?}", parent))?;
        }

        let json = serde_json::to_string_pretty(&self.rows).context("Failed to serialize projects")?;
        fs::write(path, json).with_context(|| format!("Failed to write project data to {:?}", path))
    }

    fn write_back(&self) {
        if let Err(err) = self.save() {
            error!(error = ?err, "Failed to write project data");
        }
    }
}

/// String reading of a field, empty when absent
pub fn field_str(row: &Value, key: &str) -> String {
    match row.get(key) {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Null) | None => String::new(),
        Some(other) => other.to_string(),
    }
}

/// Display name of a row's owner
pub fn owner_name(row: &Value) -> String {
    let name = field_str(row, "owner_name");
    if name.is_empty() { field_str(row, "owner") } else { name }
}

fn normalize(mut fields: Map<String, Value>, next_id: &mut i64) -> Value {
    for key in LIST_FIELDS {
        if matches!(fields.get(key), None | Some(Value::Null)) {
            fields.insert(key.to_string(), Value::Array(Vec::new()));
        }
    }

    let row = Value::Object(fields.clone());
    if field_str(&row, "owner_name").is_empty() {
        fields.insert("owner_name".to_string(), Value::String(field_str(&row, "owner")));
    }

    for key in ["start_date", "end_date"] {
        if matches!(fields.get(key), None | Some(Value::Null)) {
            fields.insert(key.to_string(), Value::String(String::new()));
        }
    }

    if row_id(&row).is_none() {
        fields.insert("id".to_string(), Value::from(*next_id));
        *next_id += 1;
    }

    Value::Object(fields)
}

fn field_value(key: &str, text: &str) -> Option<Value> {
    if key == PROGRESS_COLUMN {
        let percent = text.trim().trim_end_matches('%').trim().parse::<f64>().ok()?;
        if !percent.is_finite() {
            return None;
        }
        let percent = percent.clamp(0.0, 100.0);
        return Some(if percent.fract() == 0.0 {
            Value::from(percent as i64)
        } else {
            Value::from(percent)
        });
    }

    if LIST_FIELDS.contains(&key) {
        let items = text
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| Value::String(s.to_string()))
            .collect();
        return Some(Value::Array(items));
    }

    Some(Value::String(text.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn scratch_file(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("project-board-projects-{}-{}", name, std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        dir.join("projects.json")
    }

    fn sample() -> Vec<Value> {
        vec![
            json!({ "id": 4, "name": "CRM", "owner": "7", "status": "In progress", "progress": 40 }),
            json!({ "name": "Audit", "owner": "9", "owner_name": "Lee", "type": null, "team": "Finance",
                    "status": "Completed", "progress": "90" }),
            json!("not a project"),
        ]
    }

    #[test]
    fn test_normalization() {
        let repo = ProjectRepository::from_rows(sample());
        assert_eq!(repo.len(), 2);

        let crm = repo.get(4).unwrap();
        assert_eq!(crm["type"], json!([]));
        assert_eq!(crm["team"], json!([]));
        assert_eq!(crm["owner_name"], json!("7"));
        assert_eq!(crm["start_date"], json!(""));

        let audit = repo.get(5).unwrap();
        assert_eq!(audit["name"], json!("Audit"));
        assert_eq!(audit["owner_name"], json!("Lee"));
        assert_eq!(audit["team"], json!("Finance"));
    }

    #[test]
    fn test_update_field_progress() {
        let mut repo = ProjectRepository::from_rows(sample());
        assert!(repo.update_field(4, "progress", "75%"));
        assert_eq!(repo.get(4).unwrap()["progress"], json!(75));

        assert!(repo.update_field(4, "progress", "140"));
        assert_eq!(repo.get(4).unwrap()["progress"], json!(100));

        assert!(!repo.update_field(4, "progress", "lots"));
        assert_eq!(repo.get(4).unwrap()["progress"], json!(100));
    }

    #[test]
    fn test_update_field_lists_and_text() {
        let mut repo = ProjectRepository::from_rows(sample());
        assert!(repo.update_field(4, "team", "IT, CX ,"));
        assert_eq!(repo.get(4).unwrap()["team"], json!(["IT", "CX"]));

        assert!(repo.update_field(4, "status", "Paused"));
        assert_eq!(repo.get(4).unwrap()["status"], json!("Paused"));

        assert!(!repo.update_field(4, "id", "9"));
        assert!(!repo.update_field(99, "status", "Paused"));
    }

    #[test]
    fn test_add_replace_delete() {
        let mut repo = ProjectRepository::from_rows(sample());
        let id = repo.add(json!({ "name": "New", "owner": "7" })).unwrap();
        assert_eq!(id, 6);
        assert_eq!(repo.get(6).unwrap()["owner_name"], json!("7"));

        assert!(repo.replace(6, json!({ "name": "Renamed", "owner": "7", "id": 100 })));
        assert_eq!(repo.get(6).unwrap()["name"], json!("Renamed"));
        assert!(repo.get(100).is_none());

        assert!(repo.delete(6));
        assert!(!repo.delete(6));
        assert_eq!(repo.len(), 2);
    }

    #[test]
    fn test_summary() {
        let repo = ProjectRepository::from_rows(sample());
        let summary = ProjectSummary::of(repo.rows());
        assert_eq!(
            summary,
            ProjectSummary {
                total: 2,
                completed: 1,
                in_progress: 1,
                average_progress: 65
            }
        );
        assert_eq!(ProjectSummary::of(&Vec::<Value>::new()), ProjectSummary::default());
    }

    #[test]
    fn test_distinct_values() {
        let repo = ProjectRepository::from_rows(vec![
            json!({ "id": 1, "team": ["IT", "CX"] }),
            json!({ "id": 2, "team": "IT" }),
            json!({ "id": 3 }),
        ]);
        assert_eq!(repo.distinct("team"), vec!["CX".to_string(), "IT".to_string()]);
    }

    #[test]
    fn test_load_missing_then_round_trip_edits() {
        let path = scratch_file("roundtrip");
        let mut repo = ProjectRepository::load(&path).unwrap();
        assert!(repo.is_empty());

        let id = repo.add(json!({ "name": "Portal", "owner": "3", "progress": 10 })).unwrap();
        repo.update_field(id, "progress", "55");

        let reloaded = ProjectRepository::load(&path).unwrap();
        assert_eq!(reloaded.get(id).unwrap()["progress"], json!(55));
        let _ = fs::remove_dir_all(path.parent().unwrap());
    }

    #[test]
    fn test_task_lifecycle() {
        let mut repo = ProjectRepository::from_rows(sample());
        assert!(repo.tasks(4).is_empty());

        let first = repo.add_task(4, "Map fields").unwrap();
        let second = repo.add_task(4, "Import contacts").unwrap();
        assert_eq!((first, second), (1, 2));
        assert_eq!(repo.add_task(4, " "), None);
        assert_eq!(repo.add_task(99, "Orphan"), None);

        assert_eq!(repo.toggle_task(4, first), Some(true));
        assert!(repo.rename_task(4, second, "Import all contacts"));
        assert!(repo.delete_task(4, first));
        assert!(!repo.delete_task(4, first));
        assert_eq!(repo.toggle_task(4, first), None);

        assert_eq!(
            repo.get(4).unwrap()[TASKS_FIELD],
            json!([{ "id": 2, "description": "Import all contacts", "completed": false }])
        );
        assert!(repo.tasks(5).is_empty());
    }

    #[test]
    fn test_replace_keeps_tasks() {
        let mut repo = ProjectRepository::from_rows(sample());
        repo.add_task(4, "Map fields");

        assert!(repo.replace(4, json!({ "name": "CRM v2", "owner": "7" })));
        assert_eq!(repo.tasks(4).len(), 1);

        assert!(repo.replace(4, json!({ "name": "CRM v3", "owner": "7", "tasks": [] })));
        assert!(repo.tasks(4).is_empty());
    }

    #[test]
    fn test_tasks_written_to_data_file() {
        let path = scratch_file("tasks");
        let mut repo = ProjectRepository::load(&path).unwrap();
        let id = repo.add(json!({ "name": "Portal", "owner": "3" })).unwrap();
        let task = repo.add_task(id, "Design login").unwrap();
        repo.toggle_task(id, task);

        let reloaded = ProjectRepository::load(&path).unwrap();
        let tasks = reloaded.tasks(id);
        assert_eq!(tasks.len(), 1);
        assert!(tasks[0].completed);
        let _ = fs::remove_dir_all(path.parent().unwrap());
    }

    #[test]
    fn test_reading_never_writes_data_file() {
        let path = scratch_file("readonly");
        let repo = ProjectRepository::load(&path).unwrap();
        let _ = repo.rows();
        let _ = repo.tasks(1);
        let _ = repo.distinct("team");
        assert!(!path.exists());
    }

    #[test]
    fn test_load_rejects_malformed_file() {
        let path = scratch_file("malformed");
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "{ not json").unwrap();
        assert!(ProjectRepository::load(&path).is_err());
        let _ = fs::remove_dir_all(path.parent().unwrap());
    }

    #[test]
    fn test_default_columns() {
        let columns = project_columns();
        assert_eq!(columns.len(), 13);
        assert!(columns[0].fixed);
        assert!(columns.last().unwrap().is_action_column());
        let hidden: Vec<_> = columns.iter().filter(|c| !c.is_visible()).map(|c| c.key.as_str()).collect();
        assert_eq!(hidden, vec!["link", "notes"]);
    }
}
