//! # TUI Components
//!
//! ## Component Architecture
//!
//! Two patterns, as in the rest of the adapter:
//!
//! ### Stateless Components (Props-Based Rendering)
//!
//! - `TitleBar`: screen name and status message
//!
//! ### Stateful Components (Persistent State + Transient Wrapper)
//!
//! The state struct lives in `TuiState` and implements `EventHandler`;
//! the wrapper borrows it for one frame and implements `Component`.
//!
//! - `RecordListState` / `RecordList`: the list of references
//! - `EditFormState` / `EditForm`: the field editor
//! - `DialogState` / `DialogOverlay`: modal notices and questions
//!
//! Each file holds its state, event type, rendering and tests.

use ratatui::layout::{Constraint, Layout, Rect};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

pub mod dialog;
pub mod edit_form;
pub mod record_list;
mod title_bar;

pub use dialog::{DialogOverlay, DialogState};
pub use edit_form::{EditForm, EditFormEvent, EditFormState};
pub use record_list::{ListEvent, RecordList, RecordListState};
pub use title_bar::TitleBar;

/// Truncate a string to fit within `max_width` display columns, adding "..."
/// if needed.
pub(crate) fn truncate_str(s: &str, max_width: usize) -> String {
    if s.width() <= max_width {
        return s.to_string();
    }
    if max_width <= 3 {
        return ".".repeat(max_width);
    }

    let budget = max_width - 3;
    let mut used = 0;
    let mut out = String::new();
    for c in s.chars() {
        let w = c.width().unwrap_or(0);
        if used + w > budget {
            break;
        }
        used += w;
        out.push(c);
    }
    out.push_str("...");
    out
}

/// Compute a centered rect using percentage of the outer rect.
pub(crate) fn centered_rect(percent_x: u16, percent_y: u16, outer: Rect) -> Rect {
    let [_, center_v, _] = Layout::vertical([
        Constraint::Percentage((100 - percent_y) / 2),
        Constraint::Percentage(percent_y),
        Constraint::Percentage((100 - percent_y) / 2),
    ])
    .areas(outer);
    let [_, center, _] = Layout::horizontal([
        Constraint::Percentage((100 - percent_x) / 2),
        Constraint::Percentage(percent_x),
        Constraint::Percentage((100 - percent_x) / 2),
    ])
    .areas(center_v);
    center
}
