//! Dashboard GUI

pub mod app;
pub mod colors;
pub mod components;
pub mod constants;

pub use app::{run_gui, Dashboard};
