//! # Application State
//!
//! Core business state for refgen. This module contains domain logic only -
//! no TUI-specific types. Presentation state lives in the `tui` module.
//!
//! ```text
//! App
//! ├── model: RecordModel              // store handle + CRUD
//! ├── exporter: Exporter              // template rendering
//! ├── screen: Screen                  // List | Editing | Quit
//! ├── current: Option<CurrentRecord>  // record on (or last on) the edit screen
//! ├── selected: Option<RecordId>      // list selection
//! ├── summaries: Vec<Summary>         // list rows, newest first
//! ├── dialog: Option<Dialog>          // modal message awaiting an answer
//! └── status_message: String          // status bar text
//! ```
//!
//! State changes only happen through `update(state, action)` in action.rs.
//! This keeps things predictable, so no surprise mutations.

use chrono::NaiveDate;

use crate::core::model::{ModelError, RecordModel};
use crate::core::record::{Record, RecordFields, RecordId, Summary};
use crate::export::Exporter;

pub const DISCARD_PROMPT: &str = "You've made changes, dump them?";
pub const RENDER_FAILURE_MESSAGE: &str =
    "Couldn't write document - is the template missing or locked?";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    List,
    Editing,
    Quit,
}

/// The record being edited, plus what it looked like when editing began.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrentRecord {
    pub id: Option<RecordId>,
    pub fields: RecordFields,
    /// Last persisted state, or the defaults for an unsaved record.
    pub snapshot: RecordFields,
}

impl CurrentRecord {
    pub fn new(today: NaiveDate) -> Self {
        let fields = RecordFields::new(today);
        Self {
            id: None,
            snapshot: fields.clone(),
            fields,
        }
    }

    pub fn from_record(record: Record) -> Self {
        Self {
            id: record.id,
            snapshot: record.fields.clone(),
            fields: record.fields,
        }
    }

    pub fn is_dirty(&self) -> bool {
        self.fields != self.snapshot
    }

    pub fn revert(&mut self) {
        self.fields = self.snapshot.clone();
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DialogKind {
    /// Informational; only "OK".
    Notice,
    /// Unsaved edits on cancel.
    ConfirmDiscard,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DialogOption {
    Ok,
    KeepEditing,
    Discard,
}

impl DialogOption {
    pub fn label(&self) -> &'static str {
        match self {
            DialogOption::Ok => "OK",
            DialogOption::KeepEditing => "Keep editing",
            DialogOption::Discard => "Discard",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dialog {
    pub message: String,
    pub kind: DialogKind,
}

impl Dialog {
    pub fn notice(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            kind: DialogKind::Notice,
        }
    }

    pub fn confirm_discard() -> Self {
        Self {
            message: DISCARD_PROMPT.to_string(),
            kind: DialogKind::ConfirmDiscard,
        }
    }

    /// Choices in display order. The first one is the safe default.
    pub fn options(&self) -> &'static [DialogOption] {
        match self.kind {
            DialogKind::Notice => &[DialogOption::Ok],
            DialogKind::ConfirmDiscard => &[DialogOption::KeepEditing, DialogOption::Discard],
        }
    }
}

pub struct App {
    pub model: RecordModel,
    pub exporter: Exporter,
    pub screen: Screen,
    pub current: Option<CurrentRecord>,
    pub selected: Option<RecordId>,
    pub summaries: Vec<Summary>,
    pub dialog: Option<Dialog>,
    pub status_message: String,
}

impl App {
    /// Loads the initial list. Failing here is a startup failure.
    pub fn new(model: RecordModel, exporter: Exporter) -> Result<Self, ModelError> {
        let summaries = model.list_summaries()?;
        let selected = summaries.first().map(|s| s.id);
        Ok(Self {
            model,
            exporter,
            screen: Screen::List,
            current: None,
            selected,
            summaries,
            dialog: None,
            status_message: String::from("Welcome to refgen!"),
        })
    }

    pub fn selected_index(&self) -> Option<usize> {
        let id = self.selected?;
        self.summaries.iter().position(|s| s.id == id)
    }
}
