//! Generate operation - expand every template under a directory.

use std::path::{Path, PathBuf};

use datamatic_codegen::Engine;
use datamatic_core::{Banner, WriteResult, is_template};
use datamatic_spec::Spec;
use eyre::{Context, Result};
use tracing::debug;
use walkdir::WalkDir;

use crate::reports::{FileStatus, GenerateReport, GenerationResult, PreviewFile};

/// Options for the generate operation.
pub struct GenerateOptions<'a> {
    /// Directory searched recursively for templates.
    pub root: &'a Path,
    /// Banner prepended to every destination file.
    pub banner: &'a dyn Banner,
    /// Expand without writing.
    pub dry_run: bool,
}

/// Every `.dm.` file under `root`, in path order.
pub fn discover_templates(root: &Path) -> Result<Vec<PathBuf>> {
    let mut templates = Vec::new();
    for entry in WalkDir::new(root) {
        let entry = entry.wrap_err_with(|| format!("Failed to walk {}", root.display()))?;
        if entry.file_type().is_file() && is_template(entry.path()) {
            templates.push(entry.into_path());
        }
    }
    templates.sort();
    Ok(templates)
}

/// Execute the generate operation.
///
/// Templates are processed in path order and the first failure stops the run.
/// Destinations already written by earlier templates are kept.
pub fn generate(
    engine: &Engine,
    spec: &Spec,
    options: GenerateOptions<'_>,
) -> Result<GenerateReport> {
    let templates = discover_templates(options.root)?;
    debug!(root = %options.root.display(), count = templates.len(), "discovered templates");

    let result = if options.dry_run {
        let mut files = Vec::with_capacity(templates.len());
        for template in &templates {
            let output = engine.render_file(template, spec, options.banner)?;
            files.push(PreviewFile {
                path: output.path().to_path_buf(),
                content: output.content().to_string(),
            });
        }
        GenerationResult::Preview(files)
    } else {
        let mut files = Vec::with_capacity(templates.len());
        for template in &templates {
            let emitted = engine.emit(template, spec, options.banner)?;
            files.push(FileStatus {
                path: emitted.destination,
                changed: emitted.result == WriteResult::Generated,
            });
        }
        GenerationResult::Written(files)
    };

    Ok(GenerateReport {
        root: options.root.to_path_buf(),
        result,
    })
}
