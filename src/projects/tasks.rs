//! Per-project task checklist
//!
//! Tasks live inside their project row as a `tasks` array of
//! `{ "id", "description", "completed" }` objects. Ids are unique within one
//! project and never reused while the task exists.

use serde::Deserialize;
use serde_json::{json, Value};
use tracing::warn;

/// Row field holding the task array
pub const TASKS_FIELD: &str = "tasks";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Task {
    pub id: i64,
    pub description: String,
    #[serde(default)]
    pub completed: bool,
}

impl Task {
    fn to_value(&self) -> Value {
        json!({
            "id": self.id,
            "description": self.description,
            "completed": self.completed,
        })
    }
}

/// Completed and pending totals of one task list
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TaskCounts {
    pub completed: usize,
    pub pending: usize,
}

impl TaskCounts {
    pub fn of(tasks: &[Task]) -> Self {
        let completed = tasks.iter().filter(|task| task.completed).count();
        Self {
            completed,
            pending: tasks.len() - completed,
        }
    }

    pub fn total(&self) -> usize {
        self.completed + self.pending
    }
}

/// Read a stored task array; entries that do not parse are skipped
pub fn parse(value: Option<&Value>) -> Vec<Task> {
    let Some(Value::Array(items)) = value else {
        return Vec::new();
    };

    items
        .iter()
        .filter_map(|item| match Task::deserialize(item) {
            Ok(task) => Some(task),
            Err(err) => {
                warn!(task = %item, error = %err, "Skipping malformed task");
                None
            }
        })
        .collect()
}

pub fn tasks_of(row: &Value) -> Vec<Task> {
    parse(row.get(TASKS_FIELD))
}

pub fn to_value(tasks: &[Task]) -> Value {
    Value::Array(tasks.iter().map(Task::to_value).collect())
}

/// Append a pending task; blank descriptions are refused
pub fn add(tasks: &mut Vec<Task>, description: &str) -> Option<i64> {
    let description = description.trim();
    if description.is_empty() {
        return None;
    }

    let id = tasks.iter().map(|task| task.id).max().unwrap_or(0) + 1;
    tasks.push(Task {
        id,
        description: description.to_string(),
        completed: false,
    });
    Some(id)
}

/// Flip the completion flag; returns the new value
pub fn toggle(tasks: &mut [Task], task_id: i64) -> Option<bool> {
    let task = tasks.iter_mut().find(|task| task.id == task_id)?;
    task.completed = !task.completed;
    Some(task.completed)
}

pub fn rename(tasks: &mut [Task], task_id: i64, description: &str) -> bool {
    let description = description.trim();
    if description.is_empty() {
        return false;
    }
    match tasks.iter_mut().find(|task| task.id == task_id) {
        Some(task) => {
            task.description = description.to_string();
            true
        }
        None => false,
    }
}

pub fn remove(tasks: &mut Vec<Task>, task_id: i64) -> bool {
    let before = tasks.len();
    tasks.retain(|task| task.id != task_id);
    tasks.len() != before
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Vec<Task> {
        parse(Some(&json!([
            { "id": 1, "description": "Kickoff", "completed": true },
            { "id": 4, "description": "Import contacts" },
            { "description": "no id" },
            "junk"
        ])))
    }

    #[test]
    fn test_parse_skips_malformed_entries() {
        let tasks = sample();
        assert_eq!(tasks.len(), 2);
        assert!(tasks[0].completed);
        assert!(!tasks[1].completed);
        assert!(parse(None).is_empty());
        assert!(parse(Some(&json!("none"))).is_empty());
    }

    #[test]
    fn test_add_uses_next_id_and_refuses_blank() {
        let mut tasks = sample();
        assert_eq!(add(&mut tasks, "  Train staff "), Some(5));
        assert_eq!(tasks[2].description, "Train staff");
        assert!(!tasks[2].completed);
        assert_eq!(add(&mut tasks, "   "), None);
        assert_eq!(tasks.len(), 3);

        let mut empty = Vec::new();
        assert_eq!(add(&mut empty, "First"), Some(1));
    }

    #[test]
    fn test_toggle_rename_remove() {
        let mut tasks = sample();
        assert_eq!(toggle(&mut tasks, 4), Some(true));
        assert_eq!(toggle(&mut tasks, 4), Some(false));
        assert_eq!(toggle(&mut tasks, 9), None);

        assert!(rename(&mut tasks, 1, "Kickoff meeting"));
        assert!(!rename(&mut tasks, 1, " "));
        assert_eq!(tasks[0].description, "Kickoff meeting");

        assert!(remove(&mut tasks, 1));
        assert!(!remove(&mut tasks, 1));
        assert_eq!(tasks.len(), 1);
    }

    #[test]
    fn test_counts_and_stored_shape() {
        let tasks = sample();
        let counts = TaskCounts::of(&tasks);
        assert_eq!(counts, TaskCounts { completed: 1, pending: 1 });
        assert_eq!(counts.total(), 2);

        assert_eq!(
            to_value(&tasks),
            json!([
                { "id": 1, "description": "Kickoff", "completed": true },
                { "id": 4, "description": "Import contacts", "completed": false }
            ])
        );
    }
}
