//! Column width state and the resize drag state machine
//!
//! `Idle -> Dragging -> Idle`. A drag starts on a resize handle, tracks the
//! pointer anywhere in the window and ends on the first release.

use std::collections::HashMap;
use std::time::{Duration, Instant};
use tracing::{debug, info};

use crate::constants::layout::{DEFAULT_COLUMN_WIDTH, MIN_COLUMN_WIDTH};
use super::columns::ColumnDescriptor;
use super::prefs::{ColumnWidth, SizingMode, TablePreferences};

/// An in-progress drag on one header's resize handle
#[derive(Debug, Clone, PartialEq)]
pub struct ResizeSession {
    pub column_index: usize,
    pub column_key: String,
    pub start_pointer_x: f32,
    pub start_width: f32,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub enum ResizeState {
    #[default]
    Idle,
    Dragging(ResizeSession),
}

/// Width for a drag, floored at the minimum column width
///
/// Depends only on the drag origin and current pointer, never on the
/// previous live width.
pub fn resized_width(start_width: f32, start_pointer_x: f32, pointer_x: f32) -> f32 {
    (start_width + (pointer_x - start_pointer_x)).max(MIN_COLUMN_WIDTH)
}

/// Deadline-based write delay, polled once per frame
#[derive(Debug, Clone, Default)]
pub struct SaveDebounce {
    deadline: Option<Instant>,
}

impl SaveDebounce {
    /// Arm (or re-arm) the timer
    pub fn arm(&mut self, now: Instant, delay: Duration) {
        self.deadline = Some(now + delay);
    }

    pub fn is_armed(&self) -> bool {
        self.deadline.is_some()
    }

    /// True exactly once when the deadline has passed
    pub fn take_due(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }

    /// Disarm, reporting whether a write was pending
    pub fn take_pending(&mut self) -> bool {
        self.deadline.take().is_some()
    }
}

/// Sizing mode plus the width maps of one table
#[derive(Debug, Clone, Default)]
pub struct ColumnLayout {
    pub sizing_mode: SizingMode,
    pub widths: HashMap<String, ColumnWidth>,
    pub original_widths: HashMap<String, f32>,
    state: ResizeState,
}

impl ColumnLayout {
    pub fn from_prefs(prefs: &TablePreferences) -> Self {
        Self {
            sizing_mode: prefs.sizing_mode,
            widths: prefs.widths.clone(),
            original_widths: prefs.original_widths.clone(),
            state: ResizeState::Idle,
        }
    }

    pub fn state(&self) -> &ResizeState {
        &self.state
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.state, ResizeState::Dragging(_))
    }

    /// Index of the column being resized, if any
    pub fn active_column(&self) -> Option<usize> {
        match &self.state {
            ResizeState::Dragging(session) => Some(session.column_index),
            ResizeState::Idle => None,
        }
    }

    /// Whether the header at `index` gets a resize handle
    ///
    /// Never in static mode, never on the last visible column, never on the
    /// action column.
    pub fn has_handle(&self, index: usize, visible: &[&ColumnDescriptor]) -> bool {
        self.sizing_mode == SizingMode::Resizable
            && index + 1 < visible.len()
            && !visible[index].is_action_column()
    }

    /// Pointer-down on the handle of column `index`
    ///
    /// `rendered_widths` are the current on-screen widths of the visible
    /// columns, index-aligned with `visible`. The first resize of a column
    /// without a recorded original width snapshots every visible column.
    pub fn begin_resize(
        &mut self,
        index: usize,
        visible: &[&ColumnDescriptor],
        pointer_x: f32,
        rendered_widths: &[f32],
    ) -> bool {
        if self.is_dragging() || !self.has_handle(index, visible) {
            return false;
        }

        let column_key = visible[index].key.clone();
        let start_width = rendered_widths
            .get(index)
            .copied()
            .unwrap_or_else(|| self.column_width(&column_key).unwrap_or(DEFAULT_COLUMN_WIDTH));

        if !self.original_widths.contains_key(&column_key) {
            for (column, width) in visible.iter().zip(rendered_widths) {
                self.original_widths.insert(column.key.clone(), *width);
            }
            info!(column = %column_key, columns = rendered_widths.len(), "Captured original column widths");
        }

        debug!(column = %column_key, start_width, pointer_x, "Resize started");
        self.state = ResizeState::Dragging(ResizeSession {
            column_index: index,
            column_key,
            start_pointer_x: pointer_x,
            start_width,
        });
        true
    }

    /// Pointer-move while dragging; returns the new live width
    pub fn drag_to(&mut self, pointer_x: f32) -> Option<f32> {
        let ResizeState::Dragging(session) = &self.state else {
            return None;
        };

        let width = resized_width(session.start_width, session.start_pointer_x, pointer_x);
        self.widths.insert(
            session.column_key.clone(),
            ColumnWidth { width, is_resizing: true },
        );
        Some(width)
    }

    /// Pointer-up; ends the session and reports whether one was active
    pub fn release(&mut self) -> bool {
        let ResizeState::Dragging(session) = std::mem::take(&mut self.state) else {
            return false;
        };

        for width in self.widths.values_mut() {
            width.is_resizing = false;
        }
        debug!(
            column = %session.column_key,
            width = self.widths.get(&session.column_key).map(|w| w.width),
            "Resize finished"
        );
        true
    }

    /// Width to lay the column out at
    ///
    /// Resizable mode: manual width, else original width, else the default.
    /// Static mode: `None`, the column takes its natural width.
    pub fn column_width(&self, key: &str) -> Option<f32> {
        match self.sizing_mode {
            SizingMode::Static => None,
            SizingMode::Resizable => Some(
                self.widths
                    .get(key)
                    .map(|w| w.width)
                    .or_else(|| self.original_widths.get(key).copied())
                    .unwrap_or(DEFAULT_COLUMN_WIDTH),
            ),
        }
    }

    /// Drop manual widths, falling back to the captured originals
    pub fn reset_widths(&mut self) {
        self.release();
        let cleared = self.widths.len();
        self.widths.clear();
        info!(cleared, "Reset column widths to originals");
    }

    /// Preference snapshot for persistence
    pub fn to_prefs(&self, columns: &[ColumnDescriptor]) -> TablePreferences {
        TablePreferences {
            columns: Some(
                columns
                    .iter()
                    .map(|c| super::prefs::ColumnSelection {
                        value: c.key.clone(),
                        selected: c.selected,
                    })
                    .collect(),
            ),
            sizing_mode: self.sizing_mode,
            widths: self.widths.clone(),
            original_widths: self.original_widths.clone(),
        }
    }
}
