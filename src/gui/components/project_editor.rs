//! Project detail, edit and create dialogs

use eframe::egui;
use serde_json::{json, Value};

use crate::constants::table::{PRIORITY_OPTIONS, STATUS_OPTIONS};
use crate::gui::constants::*;
use crate::projects::tasks::{tasks_of, Task, TaskCounts};
use crate::projects::{field_str, owner_name};
use crate::table::columns::{format_value, lenient_number};

/// Editable copy of a project row
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProjectForm {
    pub name: String,
    pub owner: String,
    pub owner_name: String,
    pub status: String,
    pub priority: String,
    pub project_type: String,
    pub team: String,
    pub objective: String,
    pub start_date: String,
    pub end_date: String,
    pub progress: u8,
    pub link: String,
    pub notes: String,
}

impl ProjectForm {
    pub fn from_row(row: &Value) -> Self {
        let list = |key: &str| row.get(key).map(format_value).unwrap_or_default();
        Self {
            name: field_str(row, "name"),
            owner: field_str(row, "owner"),
            owner_name: owner_name(row),
            status: field_str(row, "status"),
            priority: field_str(row, "priority"),
            project_type: list("type"),
            team: list("team"),
            objective: field_str(row, "objective"),
            start_date: field_str(row, "start_date"),
            end_date: field_str(row, "end_date"),
            progress: row.get("progress").map(lenient_number).unwrap_or(0.0).clamp(0.0, 100.0) as u8,
            link: field_str(row, "link"),
            notes: field_str(row, "notes"),
        }
    }

    /// New projects start unassigned and not started
    pub fn blank(owner: &str) -> Self {
        Self {
            owner: owner.to_string(),
            status: STATUS_OPTIONS[0].to_string(),
            priority: PRIORITY_OPTIONS[1].to_string(),
            ..Default::default()
        }
    }

    pub fn to_row(&self) -> Value {
        let split = |text: &str| -> Vec<String> {
            text.split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect()
        };
        json!({
            "name": self.name.trim(),
            "owner": self.owner.trim(),
            "owner_name": self.owner_name.trim(),
            "status": self.status,
            "priority": self.priority,
            "type": split(&self.project_type),
            "team": split(&self.team),
            "objective": self.objective,
            "start_date": self.start_date.trim(),
            "end_date": self.end_date.trim(),
            "progress": self.progress,
            "link": self.link.trim(),
            "notes": self.notes,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EditorMode {
    View(i64),
    Edit(i64),
    Create,
    ConfirmDelete(i64),
}

#[derive(Debug, Clone, PartialEq)]
pub enum EditorAction {
    None,
    Saved { id: i64, row: Value },
    Created(Value),
    Delete(i64),
    AddTask { project: i64, description: String },
    ToggleTask { project: i64, task: i64 },
    RenameTask { project: i64, task: i64, description: String },
    DeleteTask { project: i64, task: i64 },
}

pub struct ProjectEditor {
    mode: Option<EditorMode>,
    form: ProjectForm,
    error: Option<String>,
    tasks: Vec<Task>,
    new_task: String,
    renaming: Option<(i64, String)>,
    confirm_task_delete: Option<i64>,
}

impl ProjectEditor {
    pub fn new() -> Self {
        Self {
            mode: None,
            form: ProjectForm::default(),
            error: None,
            tasks: Vec::new(),
            new_task: String::new(),
            renaming: None,
            confirm_task_delete: None,
        }
    }

    pub fn is_open(&self) -> bool {
        self.mode.is_some()
    }

    pub fn open_view(&mut self, id: i64, row: &Value) {
        self.form = ProjectForm::from_row(row);
        self.mode = Some(EditorMode::View(id));
        self.error = None;
        self.set_tasks(tasks_of(row));
        self.new_task.clear();
    }

    /// Project currently shown in the detail window
    pub fn viewing(&self) -> Option<i64> {
        match self.mode {
            Some(EditorMode::View(id)) => Some(id),
            _ => None,
        }
    }

    /// Refresh the task list after the repository applied a change
    pub fn set_tasks(&mut self, tasks: Vec<Task>) {
        self.tasks = tasks;
        self.renaming = None;
        self.confirm_task_delete = None;
    }

    pub fn open_edit(&mut self, id: i64, row: &Value) {
        self.form = ProjectForm::from_row(row);
        self.mode = Some(EditorMode::Edit(id));
        self.error = None;
    }

    pub fn open_create(&mut self, owner: &str) {
        self.form = ProjectForm::blank(owner);
        self.mode = Some(EditorMode::Create);
        self.error = None;
    }

    pub fn confirm_delete(&mut self, id: i64, row: &Value) {
        self.form = ProjectForm::from_row(row);
        self.mode = Some(EditorMode::ConfirmDelete(id));
    }

    pub fn close(&mut self) {
        self.mode = None;
    }

    pub fn ui(&mut self, ctx: &egui::Context) -> EditorAction {
        match self.mode {
            None => EditorAction::None,
            Some(EditorMode::View(id)) => self.detail_dialog(ctx, id),
            Some(EditorMode::Edit(id)) => self.form_dialog(ctx, Some(id)),
            Some(EditorMode::Create) => self.form_dialog(ctx, None),
            Some(EditorMode::ConfirmDelete(id)) => self.delete_confirm_dialog(ctx, id),
        }
    }

    fn detail_dialog(&mut self, ctx: &egui::Context, id: i64) -> EditorAction {
        let mut action = EditorAction::None;
        let mut open = true;

        egui::Window::new(format!("Project: {}", self.form.name))
            .collapsible(false)
            .resizable(false)
            .open(&mut open)
            .show(ctx, |ui| {
                egui::Grid::new("project_detail")
                    .num_columns(2)
                    .spacing([ITEM_SPACING * 2.0, ITEM_SPACING])
                    .show(ui, |ui| {
                        let form = &self.form;
                        for (label, value) in [
                            ("Owner", &form.owner_name),
                            ("Status", &form.status),
                            ("Priority", &form.priority),
                            ("Type", &form.project_type),
                            ("Team", &form.team),
                            ("Objective", &form.objective),
                            ("Start Date", &form.start_date),
                            ("End Date", &form.end_date),
                            ("Link", &form.link),
                            ("Notes", &form.notes),
                        ] {
                            ui.label(egui::RichText::new(label).strong());
                            ui.label(if value.is_empty() { "-" } else { value.as_str() });
                            ui.end_row();
                        }
                        ui.label(egui::RichText::new("Progress").strong());
                        ui.add(
                            egui::ProgressBar::new(f32::from(form.progress) / 100.0)
                                .show_percentage()
                                .desired_width(200.0),
                        );
                        ui.end_row();
                    });

                ui.add_space(ITEM_SPACING);
                if ui.button("\u{270F} Edit").clicked() {
                    self.mode = Some(EditorMode::Edit(id));
                }

                ui.separator();
                action = self.tasks_ui(ui, id);
            });

        if !open {
            self.close();
        }
        action
    }

    fn tasks_ui(&mut self, ui: &mut egui::Ui, project: i64) -> EditorAction {
        let mut action = EditorAction::None;
        let counts = TaskCounts::of(&self.tasks);

        ui.horizontal(|ui| {
            ui.label(egui::RichText::new("Tasks").strong());
            ui.label(
                egui::RichText::new(format!("{} completed, {} pending", counts.completed, counts.pending))
                    .small()
                    .weak(),
            );
        });

        if self.tasks.is_empty() {
            ui.label(egui::RichText::new("No tasks in this project yet").weak());
        }

        egui::ScrollArea::vertical()
            .id_salt("project_tasks")
            .max_height(TASK_LIST_HEIGHT)
            .show(ui, |ui| {
                for task in &self.tasks {
                    ui.horizontal(|ui| {
                        let mut completed = task.completed;
                        if ui.checkbox(&mut completed, "").changed() {
                            action = EditorAction::ToggleTask { project, task: task.id };
                        }

                        match &mut self.renaming {
                            Some((renaming_id, text)) if *renaming_id == task.id => {
                                ui.text_edit_singleline(text);
                                if ui.small_button("Save").clicked() && !text.trim().is_empty() {
                                    action = EditorAction::RenameTask {
                                        project,
                                        task: task.id,
                                        description: text.trim().to_string(),
                                    };
                                }
                                if ui.small_button("Cancel").clicked() {
                                    self.renaming = None;
                                }
                            }
                            _ => {
                                let mut text = egui::RichText::new(&task.description);
                                if task.completed {
                                    text = text.strikethrough().weak();
                                }
                                ui.label(text);

                                if self.confirm_task_delete == Some(task.id) {
                                    ui.colored_label(STATUS_ERROR, "Delete?");
                                    if ui.small_button("Yes").clicked() {
                                        action = EditorAction::DeleteTask { project, task: task.id };
                                    }
                                    if ui.small_button("No").clicked() {
                                        self.confirm_task_delete = None;
                                    }
                                } else {
                                    if ui.small_button("\u{270F}").on_hover_text("Edit task").clicked() {
                                        self.renaming = Some((task.id, task.description.clone()));
                                    }
                                    if ui.small_button("\u{1F5D1}").on_hover_text("Delete task").clicked() {
                                        self.confirm_task_delete = Some(task.id);
                                    }
                                }
                            }
                        }
                    });
                }
            });

        ui.horizontal(|ui| {
            let response = ui.add(
                egui::TextEdit::singleline(&mut self.new_task)
                    .hint_text("New task")
                    .desired_width(240.0),
            );
            let submitted = response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter));
            let clicked = ui
                .add_enabled(!self.new_task.trim().is_empty(), egui::Button::new("\u{2795} Add Task"))
                .clicked();
            if (submitted || clicked) && !self.new_task.trim().is_empty() {
                action = EditorAction::AddTask {
                    project,
                    description: std::mem::take(&mut self.new_task).trim().to_string(),
                };
            }
        });

        action
    }

    fn form_dialog(&mut self, ctx: &egui::Context, id: Option<i64>) -> EditorAction {
        let mut action = EditorAction::None;
        let mut open = true;
        let title = if id.is_some() { "Edit Project" } else { "New Project" };

        egui::Window::new(title)
            .collapsible(false)
            .resizable(false)
            .open(&mut open)
            .show(ctx, |ui| {
                let form = &mut self.form;
                egui::Grid::new("project_form")
                    .num_columns(2)
                    .spacing([ITEM_SPACING * 2.0, ITEM_SPACING])
                    .show(ui, |ui| {
                        text_row(ui, "Name", &mut form.name);
                        text_row(ui, "Owner ID", &mut form.owner);
                        text_row(ui, "Owner Name", &mut form.owner_name);
                        choice_row(ui, "status", "Status", &mut form.status, &STATUS_OPTIONS);
                        choice_row(ui, "priority", "Priority", &mut form.priority, &PRIORITY_OPTIONS);
                        text_row(ui, "Type", &mut form.project_type);
                        text_row(ui, "Team", &mut form.team);
                        text_row(ui, "Objective", &mut form.objective);
                        text_row(ui, "Start Date", &mut form.start_date);
                        text_row(ui, "End Date", &mut form.end_date);

                        ui.label("Progress:");
                        ui.add(egui::Slider::new(&mut form.progress, 0..=100).suffix("%"));
                        ui.end_row();

                        text_row(ui, "Link", &mut form.link);
                        ui.label("Notes:");
                        ui.add(egui::TextEdit::multiline(&mut form.notes).desired_rows(3));
                        ui.end_row();
                    });

                ui.label(egui::RichText::new("Type and Team take comma-separated names").small().weak());

                if let Some(error) = &self.error {
                    ui.colored_label(STATUS_ERROR, error);
                }

                ui.add_space(ITEM_SPACING);
                ui.horizontal(|ui| {
                    let label = if id.is_some() { "Save" } else { "Create" };
                    if ui.button(label).clicked() {
                        if self.form.name.trim().is_empty() {
                            self.error = Some("Project name is required".to_string());
                        } else {
                            let row = self.form.to_row();
                            action = match id {
                                Some(id) => EditorAction::Saved { id, row },
                                None => EditorAction::Created(row),
                            };
                        }
                    }

                    if ui.button("Cancel").clicked() {
                        self.mode = None;
                    }
                });
            });

        if !open || action != EditorAction::None {
            self.close();
        }
        action
    }

    fn delete_confirm_dialog(&mut self, ctx: &egui::Context, id: i64) -> EditorAction {
        let mut action = EditorAction::None;

        egui::Window::new("Confirm Delete")
            .collapsible(false)
            .resizable(false)
            .show(ctx, |ui| {
                ui.label(format!("Delete project '{}'?", self.form.name));
                ui.colored_label(STATUS_ERROR, "This cannot be undone!");

                ui.add_space(ITEM_SPACING);

                ui.horizontal(|ui| {
                    if ui.button("Delete").clicked() {
                        action = EditorAction::Delete(id);
                    }

                    if ui.button("Cancel").clicked() {
                        self.mode = None;
                    }
                });
            });

        if action != EditorAction::None {
            self.close();
        }
        action
    }
}

impl Default for ProjectEditor {
    fn default() -> Self {
        Self::new()
    }
}

fn text_row(ui: &mut egui::Ui, label: &str, value: &mut String) {
    ui.label(format!("{label}:"));
    ui.text_edit_singleline(value);
    ui.end_row();
}

fn choice_row(ui: &mut egui::Ui, id: &str, label: &str, value: &mut String, options: &[&str]) {
    ui.label(format!("{label}:"));
    egui::ComboBox::from_id_salt(("project_form", id))
        .selected_text(value.as_str())
        .show_ui(ui, |ui| {
            for option in options {
                ui.selectable_value(value, option.to_string(), *option);
            }
        });
    ui.end_row();
}
