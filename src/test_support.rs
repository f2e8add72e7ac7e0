//! Test utilities shared across the crate.
//!
//! This module is only compiled during tests (`#[cfg(test)]`).

use std::cell::RefCell;
use std::path::Path;
use std::rc::Rc;

use chrono::NaiveDate;
use tempfile::TempDir;

use crate::core::model::RecordModel;
use crate::core::record::RecordFields;
use crate::core::state::App;
use crate::export::{
    DEFAULT_END_MONTH, DEFAULT_START_MONTH, ExportSettings, Exporter, RenderError, Renderer,
    TemplateContext,
};
use crate::store::MemoryStore;

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// Clock used by every test model and exporter.
pub fn fixed_today() -> NaiveDate {
    date(2024, 5, 1)
}

/// A record that passes validation: started 2019, still ongoing, no target.
pub fn sample_fields(name: &str) -> RecordFields {
    RecordFields {
        name: name.to_string(),
        reference_date: fixed_today(),
        start_year: Some(2019),
        end_year: None,
        target: String::new(),
        how_known: "taught her".to_string(),
        recommendation: "Ana is excellent.".to_string(),
    }
}

/// Export settings writing into `dir` with a template that need not exist.
pub fn test_settings(dir: &Path) -> ExportSettings {
    ExportSettings {
        template: dir.join("reference_template.md"),
        output_dir: dir.to_path_buf(),
        start_month: DEFAULT_START_MONTH.to_string(),
        end_month: DEFAULT_END_MONTH.to_string(),
    }
}

/// Renders the student's name and remembers every context it was given.
pub struct RecordingRenderer {
    seen: Rc<RefCell<Vec<TemplateContext>>>,
}

impl RecordingRenderer {
    pub fn new() -> (Self, Rc<RefCell<Vec<TemplateContext>>>) {
        let seen = Rc::new(RefCell::new(Vec::new()));
        (Self { seen: seen.clone() }, seen)
    }
}

impl Renderer for RecordingRenderer {
    fn render(&self, _template: &Path, context: &TemplateContext) -> Result<Vec<u8>, RenderError> {
        self.seen.borrow_mut().push(context.clone());
        Ok(context.student_name.clone().into_bytes())
    }
}

/// Creates a test App over `store`, exporting into a fresh temp dir.
pub fn test_app_with_store(store: MemoryStore) -> (App, TempDir) {
    let dir = tempfile::tempdir().unwrap();
    let model = RecordModel::with_clock(Box::new(store), fixed_today);
    let (renderer, _) = RecordingRenderer::new();
    let exporter = Exporter::new(test_settings(dir.path()), Box::new(renderer))
        .with_clock(fixed_today);
    let app = App::new(model, exporter).unwrap();
    (app, dir)
}

/// Creates a test App with an empty in-memory store.
pub fn test_app() -> (App, TempDir) {
    test_app_with_store(MemoryStore::new())
}
