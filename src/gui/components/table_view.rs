//! Configurable table component: header with resize handles, cells and inline editors

use std::time::Instant;

use eframe::egui;
use egui_extras::{Column, TableBuilder};
use serde_json::Value;

use crate::constants::table::MISSING_VALUE;
use crate::gui::constants::*;
use crate::table::cells::{cell_view, row_id, ActionTag, CellColors, CellView, TableEvent};
use crate::table::columns::ColumnDescriptor;
use crate::table::TableState;

/// Per-frame UI state the table keeps between frames
pub struct TableView {
    edit_buffer: String,
    buffer_target: Option<(i64, String)>,
}

impl TableView {
    pub fn new() -> Self {
        Self {
            edit_buffer: String::new(),
            buffer_target: None,
        }
    }

    /// Renders the table and returns whatever the user asked for this frame
    ///
    /// `editable` is false when the caller will not handle [`TableEvent::Save`];
    /// cells then stay read-only.
    pub fn ui(
        &mut self,
        ui: &mut egui::Ui,
        table: &mut TableState,
        rows: &[&Value],
        colors: &CellColors,
        editable: bool,
    ) -> Vec<TableEvent> {
        let mut events = Vec::new();

        ui.horizontal(|ui| {
            if ui.button("\u{2699} Table Settings").clicked() {
                table.open_settings();
            }
            ui.label(
                egui::RichText::new(format!("Columns: {}", table.layout.sizing_mode.label()))
                    .small()
                    .weak(),
            );
        });
        ui.add_space(ITEM_SPACING);

        track_resize_pointer(ui.ctx(), table);

        let visible: Vec<ColumnDescriptor> = table.visible_columns().into_iter().cloned().collect();
        let visible_refs: Vec<&ColumnDescriptor> = visible.iter().collect();
        let handles: Vec<bool> = (0..visible.len())
            .map(|index| table.layout.has_handle(index, &visible_refs))
            .collect();
        let active = table.layout.active_column();
        let table_id = table.table_id().to_string();

        let mut rendered_widths = vec![0.0_f32; visible.len()];
        let mut pending_begin: Option<(usize, f32)> = None;
        let mut cancel_edit = false;
        let target = table.edit_target.clone();

        egui::ScrollArea::horizontal()
            .id_salt((table_id.as_str(), "horizontal"))
            .show(ui, |ui| {
                let mut builder = TableBuilder::new(ui)
                    .id_salt(table_id.as_str())
                    .striped(true)
                    .cell_layout(egui::Layout::left_to_right(egui::Align::Center))
                    .min_scrolled_height(0.0);

                for column in &visible {
                    let layout_column = match table.layout.column_width(&column.key) {
                        Some(width) => Column::exact(width),
                        None => Column::auto(),
                    };
                    builder = builder.column(layout_column.clip(true));
                }

                builder
                    .header(HEADER_HEIGHT, |mut header| {
                        for (index, column) in visible.iter().enumerate() {
                            let (rect, _) = header.col(|ui| {
                                ui.strong(&column.label);
                                if handles[index]
                                    && let Some(x) = resize_handle(ui, &table_id, index, active == Some(index))
                                    && active.is_none()
                                {
                                    pending_begin = Some((index, x));
                                }
                            });
                            rendered_widths[index] = rect.width();
                        }
                    })
                    .body(|body| {
                        body.rows(ROW_HEIGHT, rows.len(), |mut row| {
                            let data = rows[row.index()];
                            let id = row_id(data);
                            for column in &visible {
                                let view = cell_view(data, column, &target, colors, editable && id.is_some());
                                row.col(|ui| {
                                    self.cell_ui(ui, view, id, &column.key, &mut events, &mut cancel_edit);
                                });
                            }
                        });
                    });
            });

        if rows.is_empty() {
            ui.add_space(ITEM_SPACING);
            ui.label(egui::RichText::new("No projects to show").weak());
        }

        if let Some((index, pointer_x)) = pending_begin {
            table.begin_resize(index, pointer_x, &rendered_widths);
        }

        for event in &events {
            if let TableEvent::Edit { row_id, column } = event {
                table.edit_target.set(*row_id, column);
            }
        }
        if cancel_edit {
            table.edit_target.clear();
        }
        if !table.edit_target.is_active() {
            self.buffer_target = None;
        }

        events
    }

    fn cell_ui(
        &mut self,
        ui: &mut egui::Ui,
        view: CellView,
        id: Option<i64>,
        key: &str,
        events: &mut Vec<TableEvent>,
        cancel_edit: &mut bool,
    ) {
        match view {
            CellView::Actions => {
                for tag in ActionTag::ALL {
                    if ui.small_button(tag.label()).clicked()
                        && let Some(row_id) = id
                    {
                        events.push(TableEvent::Action { tag, row_id });
                    }
                }
            }
            CellView::Select { options, current } => {
                let Some(row_id) = id else { return };
                let mut selected = current.clone();
                egui::ComboBox::from_id_salt(("cell_select", row_id, key))
                    .selected_text(&selected)
                    .show_ui(ui, |ui| {
                        for option in options {
                            ui.selectable_value(&mut selected, option.to_string(), *option);
                        }
                    });
                if selected != current {
                    events.push(TableEvent::Save {
                        row_id,
                        column: key.to_string(),
                        value: selected,
                    });
                } else if ui.input(|i| i.key_pressed(egui::Key::Escape)) {
                    *cancel_edit = true;
                }
            }
            CellView::TextInput { current } => {
                let Some(row_id) = id else { return };
                let opened = self.buffer_target.as_ref().is_none_or(|(r, k)| *r != row_id || k != key);
                if opened {
                    self.edit_buffer = if current == MISSING_VALUE { String::new() } else { current };
                    self.buffer_target = Some((row_id, key.to_string()));
                }

                let response = ui.add(
                    egui::TextEdit::singleline(&mut self.edit_buffer).desired_width(f32::INFINITY),
                );
                if opened {
                    response.request_focus();
                }
                if response.lost_focus() {
                    if ui.input(|i| i.key_pressed(egui::Key::Escape)) {
                        *cancel_edit = true;
                    } else {
                        events.push(TableEvent::Save {
                            row_id,
                            column: key.to_string(),
                            value: self.edit_buffer.clone(),
                        });
                    }
                }
            }
            CellView::Tag { text, color } => {
                let tag = egui::RichText::new(format!(" {text} "))
                    .color(egui::Color32::WHITE)
                    .background_color(color);
                let response = ui.add(egui::Label::new(tag).sense(egui::Sense::click()));
                push_edit_on_click(&response, id, key, events);
            }
            CellView::Progress { fraction, text } => {
                ui.add(egui::ProgressBar::new(fraction).desired_width(PROGRESS_BAR_WIDTH));
                ui.label(text);
            }
            CellView::Text { text } => {
                let response = ui.add(egui::Label::new(text).truncate().sense(egui::Sense::click()));
                push_edit_on_click(&response, id, key, events);
            }
        }
    }
}

impl Default for TableView {
    fn default() -> Self {
        Self::new()
    }
}

/// Feed context-wide pointer state into an active resize session
///
/// Movement and release are observed anywhere in the window, not only over
/// the handle that started the drag.
fn track_resize_pointer(ctx: &egui::Context, table: &mut TableState) {
    if !table.layout.is_dragging() {
        return;
    }

    let (position, down, released) = ctx.input(|i| {
        (i.pointer.latest_pos(), i.pointer.primary_down(), i.pointer.any_released())
    });

    if let Some(position) = position {
        table.drag_resize(position.x);
    }
    if released || !down {
        table.end_resize(Instant::now());
    } else {
        ctx.set_cursor_icon(egui::CursorIcon::ResizeColumn);
        ctx.request_repaint();
    }
}

/// Draws the grip on the right edge of a header cell
///
/// Returns the pointer x when the grip was pressed this frame.
fn resize_handle(ui: &mut egui::Ui, table_id: &str, index: usize, active: bool) -> Option<f32> {
    let cell = ui.max_rect();
    let grip = egui::Rect::from_min_max(
        egui::pos2(cell.right() - RESIZE_HANDLE_WIDTH, cell.top()),
        cell.right_bottom(),
    );
    let response = ui.interact(grip, egui::Id::new((table_id, "resize_handle", index)), egui::Sense::drag());

    let stroke = if active || response.hovered() {
        ui.ctx().set_cursor_icon(egui::CursorIcon::ResizeColumn);
        ui.visuals().selection.stroke
    } else {
        ui.visuals().widgets.noninteractive.bg_stroke
    };
    ui.painter().vline(grip.center().x, grip.y_range(), stroke);

    if response.is_pointer_button_down_on() {
        response.interact_pointer_pos().map(|pos| pos.x)
    } else {
        None
    }
}

fn push_edit_on_click(response: &egui::Response, id: Option<i64>, key: &str, events: &mut Vec<TableEvent>) {
    if response.clicked()
        && let Some(row_id) = id
    {
        events.push(TableEvent::Edit {
            row_id,
            column: key.to_string(),
        });
    }
}
