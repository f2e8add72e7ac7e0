//! Template rendering.
//!
//! Templates use Jinja2 syntax via minijinja:
//!
//! ```text
//! {{ ref_date }}
//!
//! I have known {{ student_name }} since {{ start_date }}{% if has_end %},
//! until {{ end_date }}{% endif %}, as I {{ how_known }}.
//! ```

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use log::debug;
use minijinja::Environment;
use thiserror::Error;

use crate::export::TemplateContext;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("template not found: {}", .0.display())]
    TemplateNotFound(PathBuf),

    #[error("template error: {0}")]
    Template(#[from] minijinja::Error),

    #[error("I/O error on {}: {source}", path.display())]
    Io { path: PathBuf, source: io::Error },
}

/// Turns a template plus context into document bytes.
pub trait Renderer {
    fn render(&self, template: &Path, context: &TemplateContext) -> Result<Vec<u8>, RenderError>;
}

/// Renders text templates read from disk on every call, so edits to the
/// template take effect without restarting.
#[derive(Debug, Default)]
pub struct JinjaRenderer;

impl JinjaRenderer {
    pub fn new() -> Self {
        Self
    }
}

impl Renderer for JinjaRenderer {
    fn render(&self, template: &Path, context: &TemplateContext) -> Result<Vec<u8>, RenderError> {
        let source = fs::read_to_string(template).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => RenderError::TemplateNotFound(template.to_path_buf()),
            _ => RenderError::Io {
                path: template.to_path_buf(),
                source: e,
            },
        })?;

        let mut env = Environment::new();
        env.set_keep_trailing_newline(true);
        env.add_template_owned("reference".to_string(), source)?;
        let rendered = env.get_template("reference")?.render(context)?;
        debug!("Rendered {} ({} bytes)", template.display(), rendered.len());
        Ok(rendered.into_bytes())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn context() -> TemplateContext {
        TemplateContext {
            ref_date: "01 May 2024".to_string(),
            start_date: "Sep 2019".to_string(),
            has_end: false,
            end_date: String::new(),
            how_known: "taught her".to_string(),
            recommendation_text: "Ana is excellent".to_string(),
            student_name: "Ana Lee".to_string(),
            target: "Oxford".to_string(),
        }
    }

    #[test]
    fn test_renders_fields_and_conditionals() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("t.md");
        fs::write(
            &path,
            "{{ student_name }} from {{ start_date }}{% if has_end %} to {{ end_date }}{% endif %}.\n",
        )
        .unwrap();

        let bytes = JinjaRenderer::new().render(&path, &context()).unwrap();
        assert_eq!(String::from_utf8(bytes).unwrap(), "Ana Lee from Sep 2019.\n");
    }

    #[test]
    fn test_missing_template() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.md");
        let err = JinjaRenderer::new().render(&path, &context()).unwrap_err();
        assert!(matches!(err, RenderError::TemplateNotFound(p) if p == path));
    }

    #[test]
    fn test_syntax_error_is_template_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.md");
        fs::write(&path, "{% if %}").unwrap();
        let err = JinjaRenderer::new().render(&path, &context()).unwrap_err();
        assert!(matches!(err, RenderError::Template(_)));
    }
}
