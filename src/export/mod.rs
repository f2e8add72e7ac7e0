//! # Export
//!
//! Turns a validated record into a document on disk.
//!
//! ```text
//! RecordFields ─► normalize ─► validate ─► TemplateContext ─► Renderer ─► file ─► PostExportAction
//! ```
//!
//! Validation and render failures come back as [`ExportError`] for the
//! caller to show; the post-export step only ever logs.

pub mod renderer;

pub use renderer::{JinjaRenderer, RenderError, Renderer};

use std::cell::RefCell;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};
use std::sync::LazyLock;

use chrono::NaiveDate;
use log::{debug, info, warn};
use regex::Regex;
use serde::Serialize;
use thiserror::Error;

use crate::core::record::{RecordFields, today};
use crate::core::validation::{ValidationError, validate};

pub const DEFAULT_START_MONTH: &str = "Sep";
pub const DEFAULT_END_MONTH: &str = "June";

static NON_WORD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\W+").expect("static regex is valid"));

#[derive(Debug, Error)]
pub enum ExportError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Render(#[from] RenderError),
}

/// Values substituted into the template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TemplateContext {
    pub ref_date: String,
    pub start_date: String,
    pub has_end: bool,
    /// Empty while the relationship is ongoing.
    pub end_date: String,
    pub how_known: String,
    pub recommendation_text: String,
    pub student_name: String,
    pub target: String,
}

impl TemplateContext {
    /// Build from already-normalized fields. A missing start year renders as
    /// an empty year; callers validate first.
    pub fn build(fields: &RecordFields, settings: &ExportSettings) -> Self {
        let start_year = fields.start_year.map(|y| y.to_string()).unwrap_or_default();
        let end_date = match fields.end_year {
            Some(year) => format!("{} {}", settings.end_month, year),
            None => String::new(),
        };
        Self {
            ref_date: fields.reference_date.format("%d %b %Y").to_string(),
            start_date: format!("{} {}", settings.start_month, start_year),
            has_end: !fields.is_ongoing(),
            end_date,
            how_known: fields.how_known.clone(),
            recommendation_text: fields.recommendation.clone(),
            student_name: fields.name.clone(),
            target: fields.target.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportSettings {
    pub template: PathBuf,
    pub output_dir: PathBuf,
    pub start_month: String,
    pub end_month: String,
}

impl ExportSettings {
    /// Output files take the template's extension.
    pub fn extension(&self) -> &str {
        self.template
            .extension()
            .and_then(|ext| ext.to_str())
            .unwrap_or("txt")
    }
}

/// `2024-05-01-Ana_Lee.md`: date, then the name with every run of
/// non-word characters collapsed to `_`.
pub fn output_filename(date: NaiveDate, name: &str, extension: &str) -> String {
    let clean = NON_WORD.replace_all(name, "_");
    format!("{}-{}.{}", date.format("%Y-%m-%d"), clean, extension)
}

/// Something to do with a freshly written document.
pub trait PostExportAction {
    fn run(&self, path: &Path) -> io::Result<()>;
}

/// Leaves the document where it is.
pub struct NoopPostExport;

impl PostExportAction for NoopPostExport {
    fn run(&self, _path: &Path) -> io::Result<()> {
        Ok(())
    }
}

/// Launches an external program (e.g. `xdg-open`) with the document path.
///
/// Children are kept until they exit and are reaped on the next run.
pub struct OpenWithCommand {
    program: String,
    children: RefCell<Vec<Child>>,
}

impl OpenWithCommand {
    pub fn new(program: String) -> Self {
        Self {
            program,
            children: RefCell::new(Vec::new()),
        }
    }

    /// Collect children that have exited. Returns how many are still running.
    pub fn reap(&self) -> usize {
        let mut children = self.children.borrow_mut();
        children.retain_mut(|child| match child.try_wait() {
            Ok(Some(status)) => {
                debug!("Post-export command exited with {}", status);
                false
            }
            Ok(None) => true,
            Err(e) => {
                warn!("Could not check post-export command: {}", e);
                false
            }
        });
        children.len()
    }
}

impl PostExportAction for OpenWithCommand {
    fn run(&self, path: &Path) -> io::Result<()> {
        self.reap();
        // Silence the child so it can't scribble over the TUI
        let child = Command::new(&self.program)
            .arg(path)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()?;
        self.children.borrow_mut().push(child);
        Ok(())
    }
}

/// Validates, renders and writes documents.
pub struct Exporter {
    settings: ExportSettings,
    renderer: Box<dyn Renderer>,
    post_export: Box<dyn PostExportAction>,
    clock: fn() -> NaiveDate,
}

impl Exporter {
    pub fn new(settings: ExportSettings, renderer: Box<dyn Renderer>) -> Self {
        Self {
            settings,
            renderer,
            post_export: Box::new(NoopPostExport),
            clock: today,
        }
    }

    pub fn with_post_export(mut self, action: Box<dyn PostExportAction>) -> Self {
        self.post_export = action;
        self
    }

    pub fn with_clock(mut self, clock: fn() -> NaiveDate) -> Self {
        self.clock = clock;
        self
    }

    pub fn settings(&self) -> &ExportSettings {
        &self.settings
    }

    /// Render `fields` and return the path written.
    pub fn export(&self, fields: &RecordFields) -> Result<PathBuf, ExportError> {
        let fields = fields.normalized();
        validate(&fields)?;

        let context = TemplateContext::build(&fields, &self.settings);
        let bytes = self.renderer.render(&self.settings.template, &context)?;

        let filename = output_filename((self.clock)(), &fields.name, self.settings.extension());
        let path = self.settings.output_dir.join(filename);
        fs::write(&path, bytes).map_err(|source| RenderError::Io {
            path: path.clone(),
            source,
        })?;
        info!("Exported {} to {}", fields.name, path.display());

        if let Err(e) = self.post_export.run(&path) {
            warn!("Post-export step failed for {}: {}", path.display(), e);
        }
        Ok(path)
    }
}
