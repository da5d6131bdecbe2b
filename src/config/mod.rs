//! Configuration management for the project board
//!
//! - **app**: AppConfig, the JSON settings file under the platform config dir
//!
//! Table layouts are not configuration; they live in the preference store
//! (see `persistence`) and are managed by the table itself.

pub mod app;

pub use app::AppConfig;
