//! # Records
//!
//! A reference letter as the rest of the crate sees it. The store converts
//! to and from its own column layout; everything above it works with these
//! typed fields.
//!
//! ```text
//! Record
//! ├── id: Option<RecordId>       // None until first persisted
//! └── fields: RecordFields
//!     ├── name: String
//!     ├── reference_date: NaiveDate
//!     ├── start_year: Option<i32> // None = not chosen yet
//!     ├── end_year: Option<i32>   // None = ongoing ("Still here")
//!     ├── target: String
//!     ├── how_known: String
//!     └── recommendation: String
//! ```

use std::fmt;

use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};

/// Store-assigned identifier for a persisted record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RecordId(pub i64);

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// The editable part of a record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordFields {
    pub name: String,
    pub reference_date: NaiveDate,
    pub start_year: Option<i32>,
    pub end_year: Option<i32>,
    pub target: String,
    pub how_known: String,
    pub recommendation: String,
}

impl RecordFields {
    /// Defaults for a brand new record dated `today`.
    pub fn new(today: NaiveDate) -> Self {
        Self {
            name: String::new(),
            reference_date: today,
            start_year: None,
            end_year: None,
            target: String::new(),
            how_known: String::new(),
            recommendation: String::new(),
        }
    }

    /// True while no end year has been chosen.
    pub fn is_ongoing(&self) -> bool {
        self.end_year.is_none()
    }

    /// Copy with the prose fields trimmed and one trailing full stop removed,
    /// so generated sentences don't end in "..".
    pub fn normalized(&self) -> Self {
        Self {
            target: strip_full_stop(&self.target),
            how_known: strip_full_stop(&self.how_known),
            recommendation: strip_full_stop(&self.recommendation),
            ..self.clone()
        }
    }
}

/// A record plus its identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    pub id: Option<RecordId>,
    pub fields: RecordFields,
}

impl Record {
    pub fn persisted(id: RecordId, fields: RecordFields) -> Self {
        Self {
            id: Some(id),
            fields,
        }
    }

    /// The list-screen projection; unsaved records have none.
    pub fn summary(&self) -> Option<Summary> {
        self.id.map(|id| Summary {
            id,
            reference_date: self.fields.reference_date,
            name: self.fields.name.clone(),
            target: self.fields.target.clone(),
        })
    }
}

/// One row of the list screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Summary {
    pub id: RecordId,
    pub reference_date: NaiveDate,
    pub name: String,
    pub target: String,
}

/// Today's date in local time. Used as the default clock everywhere.
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Trim whitespace, then drop a single trailing '.'.
pub fn strip_full_stop(text: &str) -> String {
    let trimmed = text.trim();
    trimmed.strip_suffix('.').unwrap_or(trimmed).to_string()
}
