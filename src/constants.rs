//! Application-wide constants
//!
//! This module contains the magic numbers and string literals used throughout
//! the application, providing a single source of truth for constant values.

/// Column layout constants
pub mod layout {
    /// Minimum width a column may be dragged down to (pixels)
    pub const MIN_COLUMN_WIDTH: f32 = 80.0;

    /// Width used in resizable mode when neither a manual nor an original width is known
    pub const DEFAULT_COLUMN_WIDTH: f32 = 100.0;

    /// Delay between releasing a resize handle and writing preferences
    pub const SAVE_DEBOUNCE_MS: u64 = 100;
}

/// Preference storage key suffixes, appended to `{table_id}`
pub mod storage {
    /// JSON array of `{value, selected}`
    pub const TABLE_SETTINGS_SUFFIX: &str = "_table_settings";

    /// Plain string, one of the sizing mode names below
    pub const SIZING_MODE_SUFFIX: &str = "_column_sizing_mode";

    /// JSON map key -> `{width, isResizing}`
    pub const COLUMN_RESIZING_SUFFIX: &str = "_column_resizing";

    /// JSON map key -> number
    pub const ORIGINAL_WIDTHS_SUFFIX: &str = "_column_original_widths";

    /// Stored name of the static (natural layout) sizing mode
    pub const MODE_STATIC: &str = "estaticas";

    /// Stored name of the user-adjustable sizing mode
    pub const MODE_RESIZABLE: &str = "redimensionables";
}

/// Table content constants
pub mod table {
    /// Key of the column rendering the view/edit/delete triggers
    pub const ACTIONS_COLUMN: &str = "actions";

    /// Key of the column rendered as a progress bar
    pub const PROGRESS_COLUMN: &str = "progress";

    /// Key of the status column (closed value set)
    pub const STATUS_COLUMN: &str = "status";

    /// Key of the priority column (closed value set)
    pub const PRIORITY_COLUMN: &str = "priority";

    /// Display value for anything that cannot be derived
    pub const MISSING_VALUE: &str = "-";

    /// Legal values of the status field
    pub const STATUS_OPTIONS: [&str; 4] = ["Not started", "In progress", "Completed", "Paused"];

    /// Legal values of the priority field
    pub const PRIORITY_OPTIONS: [&str; 3] = ["High", "Medium", "Low"];

    /// Identifier of the projects table in preference storage
    pub const PROJECTS_TABLE_ID: &str = "projects-table";
}

/// Configuration file locations
pub mod config {
    /// Directory under the platform config dir
    pub const APP_DIR: &str = "project-board";

    /// Application settings file name
    pub const FILENAME: &str = "config.json";

    /// Preference store file name (the key-value store backing table layouts)
    pub const PREFERENCES_FILENAME: &str = "preferences.json";

    /// Default project data file name
    pub const DATA_FILENAME: &str = "projects.json";
}

/// Validation limits for configuration values
pub mod validation {
    pub const MIN_WINDOW_WIDTH: f32 = 640.0;
    pub const MAX_WINDOW_WIDTH: f32 = 7680.0;
    pub const MIN_WINDOW_HEIGHT: f32 = 480.0;
    pub const MAX_WINDOW_HEIGHT: f32 = 4320.0;
    pub const MAX_SAVE_DEBOUNCE_MS: u64 = 5_000;
}
