//! Dashboard window implemented with egui/eframe

use std::time::{Duration, Instant};

use anyhow::{anyhow, Result};
use eframe::{egui, CreationContext, NativeOptions};
use tracing::{info, warn};

use crate::config::AppConfig;
use crate::persistence::FileStore;
use crate::projects::filter::{visible_rows, ProjectFilter, Viewer};
use crate::projects::{project_columns, ProjectRepository, ProjectSummary};
use crate::table::cells::{ActionTag, CellColors, TableEvent};
use crate::table::TableState;

use super::colors::project_colors;
use super::components::project_editor::{EditorAction, ProjectEditor};
use super::components::table_settings::{self, SettingsAction};
use super::components::table_view::TableView;
use super::components::filter_bar;
use super::constants::*;

struct StatusMessage {
    text: String,
    color: egui::Color32,
}

/// Everything the dashboard needs, assembled before the window opens
pub struct Dashboard {
    pub store: FileStore,
    pub repo: ProjectRepository,
    pub viewer: Viewer,
    pub table_id: String,
    pub save_delay: Duration,
}

struct DashboardApp {
    store: FileStore,
    repo: ProjectRepository,
    viewer: Viewer,
    filter: ProjectFilter,
    table: TableState,
    table_view: TableView,
    editor: ProjectEditor,
    colors: CellColors,
    status_message: Option<StatusMessage>,
}

impl DashboardApp {
    fn new(_cc: &CreationContext<'_>, dashboard: Dashboard) -> Self {
        info!(
            user = %dashboard.viewer.user_id,
            role = dashboard.viewer.role.as_str(),
            projects = dashboard.repo.len(),
            "Initializing dashboard"
        );

        let table = TableState::mount(
            &dashboard.table_id,
            &project_columns(),
            &dashboard.store,
            dashboard.save_delay,
        );

        Self {
            store: dashboard.store,
            repo: dashboard.repo,
            viewer: dashboard.viewer,
            filter: ProjectFilter::default(),
            table,
            table_view: TableView::new(),
            editor: ProjectEditor::new(),
            colors: project_colors(),
            status_message: None,
        }
    }

    fn set_status(&mut self, text: impl Into<String>, color: egui::Color32) {
        self.status_message = Some(StatusMessage {
            text: text.into(),
            color,
        });
    }

    fn handle_table_event(&mut self, event: TableEvent) {
        match event {
            TableEvent::Action { tag, row_id } => {
                let Some(row) = self.repo.get(row_id).cloned() else {
                    warn!(project = row_id, action = tag.as_str(), "Action on a project that no longer exists");
                    return;
                };
                match tag {
                    ActionTag::View => self.editor.open_view(row_id, &row),
                    ActionTag::Edit => self.editor.open_edit(row_id, &row),
                    ActionTag::Delete => self.editor.confirm_delete(row_id, &row),
                }
            }
            TableEvent::Edit { row_id, column } => {
                info!(project = row_id, field = %column, "Editing cell");
            }
            TableEvent::Save { row_id, column, value } => {
                if self.repo.update_field(row_id, &column, &value) {
                    self.set_status(format!("Updated {column}"), STATUS_OK);
                } else {
                    self.set_status(format!("Could not update {column}"), STATUS_ERROR);
                }
                self.table.finish_edit(row_id, &column);
            }
        }
    }

    fn handle_editor_action(&mut self, action: EditorAction) {
        match action {
            EditorAction::None => {}
            EditorAction::Saved { id, row } => {
                if self.repo.replace(id, row) {
                    self.set_status("Project saved", STATUS_OK);
                }
            }
            EditorAction::Created(row) => {
                if let Some(id) = self.repo.add(row) {
                    self.set_status(format!("Created project #{id}"), STATUS_OK);
                }
            }
            EditorAction::AddTask { project, description } => {
                if self.repo.add_task(project, &description).is_some() {
                    self.set_status("Task added", STATUS_OK);
                }
                self.refresh_editor_tasks(project);
            }
            EditorAction::ToggleTask { project, task } => {
                if let Some(completed) = self.repo.toggle_task(project, task) {
                    let text = if completed { "Task completed" } else { "Task reopened" };
                    self.set_status(text, STATUS_OK);
                }
                self.refresh_editor_tasks(project);
            }
            EditorAction::RenameTask { project, task, description } => {
                if self.repo.rename_task(project, task, &description) {
                    self.set_status("Task updated", STATUS_OK);
                } else {
                    self.set_status("Could not update task", STATUS_ERROR);
                }
                self.refresh_editor_tasks(project);
            }
            EditorAction::DeleteTask { project, task } => {
                if self.repo.delete_task(project, task) {
                    self.set_status("Task deleted", STATUS_OK);
                }
                self.refresh_editor_tasks(project);
            }
            EditorAction::Delete(id) => {
                if self.repo.delete(id) {
                    if self.table.edit_target.row_id == Some(id) {
                        self.table.edit_target.clear();
                    }
                    self.set_status("Project deleted", STATUS_OK);
                }
            }
        }
    }

    fn refresh_editor_tasks(&mut self, project: i64) {
        if self.editor.viewing() == Some(project) {
            self.editor.set_tasks(self.repo.tasks(project));
        }
    }

    fn poll_layout_save(&mut self, ctx: &egui::Context) {
        if self.table.poll_save(Instant::now(), &mut self.store) {
            return;
        }
        if self.table.save_pending() {
            ctx.request_repaint_after(Duration::from_millis(SAVE_POLL_INTERVAL_MS));
        }
    }
}

impl eframe::App for DashboardApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        egui::TopBottomPanel::top("dashboard_header").show(ctx, |ui| {
            ui.add_space(PADDING);
            ui.horizontal(|ui| {
                ui.heading("Projects");
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    if ui.button("\u{2795} New Project").clicked() {
                        self.editor.open_create(&self.viewer.user_id);
                    }
                });
            });
            ui.add_space(ITEM_SPACING);
            filter_bar::ui(ui, &mut self.filter, &self.repo);
            ui.add_space(ITEM_SPACING);
        });

        egui::TopBottomPanel::bottom("dashboard_status").show(ctx, |ui| {
            if let Some(message) = &self.status_message {
                ui.colored_label(message.color, &message.text);
            } else {
                ui.label(egui::RichText::new(format!("{} project(s)", self.repo.len())).weak());
            }
        });

        let mut events = Vec::new();
        egui::CentralPanel::default().show(ctx, |ui| {
            let rows = visible_rows(self.repo.rows(), &self.filter, &self.viewer);
            filter_bar::summary_ui(ui, &ProjectSummary::of(rows.iter().copied()));
            ui.add_space(SECTION_SPACING);

            events = self.table_view.ui(ui, &mut self.table, &rows, &self.colors, true);
        });

        for event in events {
            self.handle_table_event(event);
        }

        if let Some(draft) = self.table.settings_draft() {
            match table_settings::show(ctx, draft) {
                SettingsAction::None => {}
                SettingsAction::Save => {
                    self.table.save_settings(&mut self.store);
                    self.set_status("Table settings saved", STATUS_OK);
                }
                SettingsAction::Cancel => self.table.cancel_settings(),
            }
        }

        let action = self.editor.ui(ctx);
        self.handle_editor_action(action);

        self.poll_layout_save(ctx);
    }

    fn on_exit(&mut self, _gl: Option<&eframe::glow::Context>) {
        self.table.flush(&mut self.store);
        info!(
            preferences = %self.store.path().display(),
            data = ?self.repo.path(),
            "Dashboard exiting"
        );
    }
}

pub fn run_gui(config: &AppConfig, dashboard: Dashboard) -> Result<()> {
    let options = NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([config.window_width, config.window_height])
            .with_min_inner_size([WINDOW_MIN_WIDTH, WINDOW_MIN_HEIGHT])
            .with_title("Project Board"),
        ..Default::default()
    };

    eframe::run_native(
        "Project Board",
        options,
        Box::new(|cc| Ok(Box::new(DashboardApp::new(cc, dashboard)))),
    )
    .map_err(|err| anyhow!("Failed to launch dashboard: {err}"))
}

