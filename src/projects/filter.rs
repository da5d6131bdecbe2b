//! Row visibility: name search, role gating and the dropdown filters

use serde_json::Value;

use super::{field_str, owner_name};

/// Coarse lifecycle bucket of a status value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusGroup {
    Pending,
    InProgress,
    Stopped,
    Done,
}

const PENDING_STATUSES: [&str; 3] = ["Not started", "Conceptual", "Analysis"];
const IN_PROGRESS_STATUSES: [&str; 4] = ["In progress", "In design", "In development", "Testing"];
const STOPPED_STATUSES: [&str; 2] = ["Cancelled", "Paused"];

impl StatusGroup {
    /// Unrecognised statuses count as done
    pub fn of(status: &str) -> Self {
        if PENDING_STATUSES.contains(&status) {
            StatusGroup::Pending
        } else if IN_PROGRESS_STATUSES.contains(&status) {
            StatusGroup::InProgress
        } else if STOPPED_STATUSES.contains(&status) {
            StatusGroup::Stopped
        } else {
            StatusGroup::Done
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Role {
    Admin,
    #[default]
    User,
}

impl Role {
    pub fn parse(value: &str) -> Self {
        match value.trim().to_lowercase().as_str() {
            "admin" => Role::Admin,
            _ => Role::User,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::User => "user",
        }
    }
}

/// Who is looking at the board
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Viewer {
    pub user_id: String,
    pub role: Role,
}

impl Viewer {
    pub fn new(user_id: impl Into<String>, role: Role) -> Self {
        Self {
            user_id: user_id.into(),
            role,
        }
    }

    /// Admins see every row; everyone else only rows they own
    pub fn can_see(&self, row: &Value) -> bool {
        if self.role == Role::Admin {
            return true;
        }
        if self.user_id.is_empty() {
            return false;
        }
        ["owner_id", "owner"]
            .iter()
            .any(|key| id_text(row.get(*key)).is_some_and(|id| id == self.user_id))
    }
}

/// Current filter bar contents; empty strings mean "any"
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProjectFilter {
    pub search: String,
    pub status: String,
    pub team: String,
    pub priority: String,
    pub owner: String,
}

impl ProjectFilter {
    pub fn is_empty(&self) -> bool {
        self.search.is_empty()
            && self.status.is_empty()
            && self.team.is_empty()
            && self.priority.is_empty()
            && self.owner.is_empty()
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    pub fn matches(&self, row: &Value) -> bool {
        let search = self.search.trim().to_lowercase();
        if !search.is_empty() && !field_str(row, "name").to_lowercase().contains(&search) {
            return false;
        }

        if !self.status.is_empty() && !field_str(row, "status").contains(&self.status) {
            return false;
        }

        if !self.team.is_empty() && !contains_value(row.get("team"), &self.team) {
            return false;
        }

        if !self.priority.is_empty() && field_str(row, "priority") != self.priority {
            return false;
        }

        if !self.owner.is_empty() && owner_name(row) != self.owner {
            return false;
        }

        true
    }
}

/// Rows `viewer` may see that also pass `filter`, in repository order
pub fn visible_rows<'a>(rows: &'a [Value], filter: &ProjectFilter, viewer: &Viewer) -> Vec<&'a Value> {
    rows.iter()
        .filter(|row| viewer.can_see(row) && filter.matches(row))
        .collect()
}

/// Array fields match on a whole element, string fields on a substring
fn contains_value(field: Option<&Value>, needle: &str) -> bool {
    match field {
        Some(Value::Array(items)) => items.iter().any(|item| item.as_str() == Some(needle)),
        Some(Value::String(s)) => s.contains(needle),
        _ => false,
    }
}

fn id_text(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn rows() -> Vec<Value> {
        vec![
            json!({
                "id": 1, "name": "CRM Migration", "owner": "7", "owner_id": 7,
                "owner_name": "Dana", "status": "In progress", "team": ["IT", "CX"],
                "priority": "High"
            }),
            json!({
                "id": 2, "name": "Billing audit", "owner": "9", "owner_name": "Lee",
                "status": "Paused", "team": "Finance office", "priority": "Low"
            }),
            json!({
                "id": 3, "name": "crm dashboards", "owner": "9",
                "status": "Not started", "team": [], "priority": "Medium"
            }),
        ]
    }

    fn ids(rows: Vec<&Value>) -> Vec<i64> {
        rows.iter().filter_map(|r| r["id"].as_i64()).collect()
    }

    fn admin() -> Viewer {
        Viewer::new("1", Role::Admin)
    }

    #[test]
    fn test_status_groups() {
        assert_eq!(StatusGroup::of("Analysis"), StatusGroup::Pending);
        assert_eq!(StatusGroup::of("Testing"), StatusGroup::InProgress);
        assert_eq!(StatusGroup::of("Cancelled"), StatusGroup::Stopped);
        assert_eq!(StatusGroup::of("Completed"), StatusGroup::Done);
        assert_eq!(StatusGroup::of("whatever"), StatusGroup::Done);
    }

    #[test]
    fn test_role_parse() {
        assert_eq!(Role::parse(" Admin "), Role::Admin);
        assert_eq!(Role::parse("viewer"), Role::User);
    }

    #[test]
    fn test_admin_sees_everything() {
        let rows = rows();
        assert_eq!(ids(visible_rows(&rows, &ProjectFilter::default(), &admin())), vec![1, 2, 3]);
    }

    #[test]
    fn test_user_sees_owned_rows() {
        let rows = rows();
        let filter = ProjectFilter::default();
        assert_eq!(ids(visible_rows(&rows, &filter, &Viewer::new("7", Role::User))), vec![1]);
        assert_eq!(ids(visible_rows(&rows, &filter, &Viewer::new("9", Role::User))), vec![2, 3]);
        assert!(visible_rows(&rows, &filter, &Viewer::default()).is_empty());
    }

    #[test]
    fn test_search_is_case_insensitive() {
        let rows = rows();
        let filter = ProjectFilter {
            search: "CRM".into(),
            ..Default::default()
        };
        assert_eq!(ids(visible_rows(&rows, &filter, &admin())), vec![1, 3]);
    }

    #[test]
    fn test_dropdown_filters() {
        let rows = rows();

        let by_status = ProjectFilter { status: "progress".into(), ..Default::default() };
        assert_eq!(ids(visible_rows(&rows, &by_status, &admin())), vec![1]);

        let by_team = ProjectFilter { team: "CX".into(), ..Default::default() };
        assert_eq!(ids(visible_rows(&rows, &by_team, &admin())), vec![1]);

        let by_team_text = ProjectFilter { team: "Finance".into(), ..Default::default() };
        assert_eq!(ids(visible_rows(&rows, &by_team_text, &admin())), vec![2]);

        let by_priority = ProjectFilter { priority: "Med".into(), ..Default::default() };
        assert!(visible_rows(&rows, &by_priority, &admin()).is_empty());

        let by_owner = ProjectFilter { owner: "Lee".into(), ..Default::default() };
        assert_eq!(ids(visible_rows(&rows, &by_owner, &admin())), vec![2]);
    }

    #[test]
    fn test_filter_clear() {
        let mut filter = ProjectFilter { search: "x".into(), owner: "Lee".into(), ..Default::default() };
        assert!(!filter.is_empty());
        filter.clear();
        assert!(filter.is_empty());
    }
}
