//! GUI-specific constants for layout, tag colors and intervals

/// Dashboard window dimensions
pub const WINDOW_MIN_WIDTH: f32 = 640.0;
pub const WINDOW_MIN_HEIGHT: f32 = 480.0;

/// Layout spacing
pub const SECTION_SPACING: f32 = 15.0;
pub const ITEM_SPACING: f32 = 8.0;
pub const PADDING: f32 = 10.0;

/// Table geometry
pub const ROW_HEIGHT: f32 = 28.0;
pub const HEADER_HEIGHT: f32 = 30.0;
pub const RESIZE_HANDLE_WIDTH: f32 = 6.0;
pub const PROGRESS_BAR_WIDTH: f32 = 70.0;

/// Project detail window
pub const TASK_LIST_HEIGHT: f32 = 220.0;

/// Tag colors
pub const TAG_RED: egui::Color32 = egui::Color32::from_rgb(200, 40, 40);
pub const TAG_YELLOW: egui::Color32 = egui::Color32::from_rgb(200, 160, 0);
pub const TAG_BLUE: egui::Color32 = egui::Color32::from_rgb(40, 110, 210);
pub const TAG_GREEN: egui::Color32 = egui::Color32::from_rgb(0, 160, 60);
pub const TAG_GRAY: egui::Color32 = egui::Color32::from_rgb(120, 120, 120);

/// Status line colors
pub const STATUS_OK: egui::Color32 = egui::Color32::from_rgb(0, 200, 0);
pub const STATUS_ERROR: egui::Color32 = egui::Color32::from_rgb(200, 0, 0);

/// Repaint interval while a layout write is pending
pub const SAVE_POLL_INTERVAL_MS: u64 = 50;
