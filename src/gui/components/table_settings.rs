//! Table settings window: column visibility, column order and sizing mode

use eframe::egui;

use crate::gui::constants::*;
use crate::table::prefs::SizingMode;
use crate::table::settings::SettingsDraft;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingsAction {
    None,
    Save,
    Cancel,
}

/// Renders the settings window for an open draft
///
/// All edits go to `draft`; the caller applies or discards it depending on
/// the returned action.
pub fn show(ctx: &egui::Context, draft: &mut SettingsDraft) -> SettingsAction {
    let mut action = SettingsAction::None;
    let mut open = true;

    egui::Window::new("Table Settings")
        .collapsible(false)
        .resizable(false)
        .open(&mut open)
        .show(ctx, |ui| {
            sizing_section(ui, draft);
            ui.add_space(SECTION_SPACING);
            columns_section(ui, draft);
            ui.add_space(SECTION_SPACING);

            ui.horizontal(|ui| {
                if ui.button("Cancel").clicked() {
                    action = SettingsAction::Cancel;
                }
                if ui.button("\u{1F4BE} Save Changes").clicked() {
                    action = SettingsAction::Save;
                }
            });
        });

    if !open {
        action = SettingsAction::Cancel;
    }
    action
}

fn sizing_section(ui: &mut egui::Ui, draft: &mut SettingsDraft) {
    ui.group(|ui| {
        ui.label(egui::RichText::new("Column Sizing").strong());
        ui.add_space(ITEM_SPACING);

        let mut mode = draft.sizing_mode();
        ui.horizontal(|ui| {
            for option in [SizingMode::Static, SizingMode::Resizable] {
                ui.radio_value(&mut mode, option, option.label());
            }
        });
        if mode != draft.sizing_mode() {
            draft.set_sizing_mode(mode);
        }

        if mode == SizingMode::Resizable {
            ui.add_space(ITEM_SPACING / 2.0);
            ui.label(
                egui::RichText::new("Drag the right edge of a column header to change its width")
                    .small()
                    .weak(),
            );
            let reset_label = if draft.reset_widths_requested() {
                "Widths will be reset on save"
            } else {
                "\u{21BA} Reset Widths"
            };
            if ui
                .add_enabled(!draft.reset_widths_requested(), egui::Button::new(reset_label))
                .clicked()
            {
                draft.request_width_reset();
            }
        }
    });
}

fn columns_section(ui: &mut egui::Ui, draft: &mut SettingsDraft) {
    ui.group(|ui| {
        ui.label(egui::RichText::new("Columns").strong());
        ui.label(egui::RichText::new("Drag items to reorder; fixed columns stay visible").small().weak());
        ui.add_space(ITEM_SPACING / 2.0);

        let mut toggled = None;
        let mut from_idx = None;
        let mut to_idx = None;

        let frame = egui::Frame::default()
            .inner_margin(4.0)
            .stroke(ui.visuals().widgets.noninteractive.bg_stroke);

        let (_, dropped_payload) = ui.dnd_drop_zone::<usize, ()>(frame, |ui| {
            let count = draft.columns().len();
            for (row_idx, column) in draft.columns().iter().enumerate() {
                let item_id = egui::Id::new("table_settings_column").with(row_idx);

                let row = |ui: &mut egui::Ui| {
                    ui.horizontal(|ui| {
                        let grip = if column.fixed { "\u{1F512}" } else { "\u{2630}" };
                        ui.label(egui::RichText::new(grip).weak());

                        let mut visible = column.is_visible();
                        let checkbox = ui.add_enabled(!column.fixed, egui::Checkbox::new(&mut visible, column.label.as_str()));
                        if checkbox.changed() {
                            toggled = Some(row_idx);
                        }
                    });
                };

                let response = if draft.can_drag(row_idx) {
                    ui.dnd_drag_source(item_id, row_idx, row).response
                } else {
                    ui.scope(row).response
                };

                if row_idx + 1 < count {
                    ui.separator();
                }

                // Dropping onto a row moves the dragged column to that row's position
                if let (Some(_), Some(dragged_payload)) = (
                    response.dnd_hover_payload::<usize>(),
                    response.dnd_release_payload::<usize>(),
                ) {
                    from_idx = Some(*dragged_payload);
                    to_idx = Some(row_idx);
                } else if response.dnd_hover_payload::<usize>().is_some() {
                    let stroke = egui::Stroke::new(2.0, ui.visuals().selection.stroke.color);
                    ui.painter().hline(response.rect.x_range(), response.rect.top(), stroke);
                }
            }
        });

        // Dropped onto empty space: move to the end
        if from_idx.is_none()
            && let Some(dragged_payload) = dropped_payload
        {
            from_idx = Some(*dragged_payload);
            to_idx = Some(draft.columns().len().saturating_sub(1));
        }

        if let Some(index) = toggled {
            draft.toggle_selected(index);
        }
        if let (Some(from), Some(to)) = (from_idx, to_idx) {
            draft.reorder(from, to);
        }
    });
}
