//! Search box, dropdown filters and KPI cards above the table

use eframe::egui;

use crate::constants::table::{PRIORITY_OPTIONS, STATUS_OPTIONS};
use crate::gui::constants::*;
use crate::projects::filter::ProjectFilter;
use crate::projects::{ProjectRepository, ProjectSummary};

/// Renders the filter controls and returns true if any filter changed
pub fn ui(ui: &mut egui::Ui, filter: &mut ProjectFilter, repo: &ProjectRepository) -> bool {
    let mut changed = false;

    ui.horizontal_wrapped(|ui| {
        ui.label("Search:");
        changed |= ui
            .add(
                egui::TextEdit::singleline(&mut filter.search)
                    .hint_text("Project name")
                    .desired_width(180.0),
            )
            .changed();
        ui.add_space(ITEM_SPACING);

        let mut statuses: Vec<String> = STATUS_OPTIONS.iter().map(|s| s.to_string()).collect();
        for status in repo.distinct("status") {
            if !statuses.contains(&status) {
                statuses.push(status);
            }
        }
        let priorities: Vec<String> = PRIORITY_OPTIONS.iter().map(|s| s.to_string()).collect();

        changed |= dropdown(ui, "filter_status", "Status", "All statuses", &mut filter.status, &statuses);
        changed |= dropdown(ui, "filter_team", "Team", "All teams", &mut filter.team, &repo.distinct("team"));
        changed |= dropdown(ui, "filter_priority", "Priority", "All priorities", &mut filter.priority, &priorities);
        changed |= dropdown(ui, "filter_owner", "Owner", "All owners", &mut filter.owner, &repo.distinct("owner_name"));

        if ui
            .add_enabled(!filter.is_empty(), egui::Button::new("Clear"))
            .clicked()
        {
            filter.clear();
            changed = true;
        }
    });

    changed
}

fn dropdown(
    ui: &mut egui::Ui,
    id: &str,
    label: &str,
    any_label: &str,
    value: &mut String,
    options: &[String],
) -> bool {
    let mut changed = false;
    ui.label(format!("{label}:"));
    let selected_text = if value.is_empty() { any_label.to_string() } else { value.clone() };
    egui::ComboBox::from_id_salt(id)
        .selected_text(selected_text)
        .show_ui(ui, |ui| {
            changed |= ui.selectable_value(value, String::new(), any_label).changed();
            for option in options {
                changed |= ui.selectable_value(value, option.clone(), option.as_str()).changed();
            }
        });
    ui.add_space(ITEM_SPACING);
    changed
}

/// KPI cards for the rows currently shown
pub fn summary_ui(ui: &mut egui::Ui, summary: &ProjectSummary) {
    ui.horizontal(|ui| {
        kpi_card(ui, "Total Projects", summary.total.to_string());
        kpi_card(ui, "Completed", summary.completed.to_string());
        kpi_card(ui, "In Progress", summary.in_progress.to_string());
        kpi_card(ui, "Average Progress", format!("{}%", summary.average_progress));
    });
}

fn kpi_card(ui: &mut egui::Ui, title: &str, value: String) {
    ui.group(|ui| {
        ui.vertical(|ui| {
            ui.label(egui::RichText::new(title).small().weak());
            ui.label(egui::RichText::new(value).heading().strong());
        });
    });
}
