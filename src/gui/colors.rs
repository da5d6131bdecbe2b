//! Tag colors handed to the table for status and priority cells

use egui::Color32;

use crate::projects::filter::StatusGroup;
use crate::table::cells::CellColors;
use super::constants::{TAG_BLUE, TAG_GRAY, TAG_GREEN, TAG_RED, TAG_YELLOW};

pub fn status_color(status: &str) -> Color32 {
    match StatusGroup::of(status) {
        StatusGroup::Pending => TAG_YELLOW,
        StatusGroup::InProgress => TAG_BLUE,
        StatusGroup::Stopped => TAG_RED,
        StatusGroup::Done => TAG_GREEN,
    }
}

pub fn priority_color(priority: &str) -> Color32 {
    match priority {
        "High" => TAG_RED,
        "Medium" => TAG_YELLOW,
        "Low" => TAG_GREEN,
        _ => TAG_GRAY,
    }
}

pub fn project_colors() -> CellColors {
    CellColors {
        status: Some(status_color),
        priority: Some(priority_color),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_colors() {
        assert_eq!(status_color("Not started"), TAG_YELLOW);
        assert_eq!(status_color("In development"), TAG_BLUE);
        assert_eq!(status_color("Paused"), TAG_RED);
        assert_eq!(status_color("Completed"), TAG_GREEN);
    }

    #[test]
    fn test_priority_colors() {
        assert_eq!(priority_color("High"), TAG_RED);
        assert_eq!(priority_color("Medium"), TAG_YELLOW);
        assert_eq!(priority_color("Low"), TAG_GREEN);
        assert_eq!(priority_color("Urgent"), TAG_GRAY);
    }
}
