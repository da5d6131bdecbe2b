pub mod filter_bar;
pub mod project_editor;
pub mod table_settings;
pub mod table_view;
