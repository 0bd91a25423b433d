//! Generate command report data structures.

use std::path::PathBuf;

use super::output::{Output, Report};

/// Report data from template expansion.
#[derive(Debug)]
pub struct GenerateReport {
    /// Directory that was searched for templates.
    pub root: PathBuf,
    /// Files written or previewed.
    pub result: GenerationResult,
}

/// Result of template expansion.
#[derive(Debug)]
pub enum GenerationResult {
    /// Destinations were written to disk where they changed.
    Written(Vec<FileStatus>),
    /// Dry-run preview.
    Preview(Vec<PreviewFile>),
}

/// A destination after a real run.
#[derive(Debug)]
pub struct FileStatus {
    pub path: PathBuf,
    /// False when the destination already held the expanded content.
    pub changed: bool,
}

/// A file in preview mode.
#[derive(Debug)]
pub struct PreviewFile {
    pub path: PathBuf,
    pub content: String,
}

impl GenerateReport {
    fn is_empty(&self) -> bool {
        match &self.result {
            GenerationResult::Written(files) => files.is_empty(),
            GenerationResult::Preview(files) => files.is_empty(),
        }
    }
}

impl Report for GenerateReport {
    fn render(&self, out: &mut dyn Output) {
        if self.is_empty() {
            out.warning(&format!("no .dm. templates found under {}", self.root.display()));
            return;
        }

        match &self.result {
            GenerationResult::Written(files) => render_written(out, files),
            GenerationResult::Preview(files) => render_preview(out, files),
        }
    }
}

fn render_written(out: &mut dyn Output, files: &[FileStatus]) {
    let mut generated = 0;
    for file in files {
        if file.changed {
            generated += 1;
            out.added_item(&format!("Generated file {}", file.path.display()));
        } else {
            out.list_item(&format!("No change to {}", file.path.display()));
        }
    }

    out.newline();
    out.key_value(
        "Summary",
        &format!("{} generated, {} unchanged", generated, files.len() - generated),
    );
}

fn render_preview(out: &mut dyn Output, files: &[PreviewFile]) {
    for file in files {
        out.divider(&file.path.display().to_string());
        out.preformatted(&file.content);
    }

    out.divider("Summary");
    out.preformatted(&format!("{} files would be generated", files.len()));
}
