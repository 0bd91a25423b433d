use std::path::{Path, PathBuf};

use eyre::{Context, Result};

/// Marker in a template file name that is dropped from its destination.
pub const TEMPLATE_MARKER: &str = ".dm.";

/// Result of a write operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteResult {
    /// File was created or its content changed
    Generated,
    /// Existing file already had identical content; nothing was written
    Unchanged,
}

/// A file to be generated
#[derive(Debug, Clone)]
pub struct OutputFile {
    path: PathBuf,
    content: String,
}

impl OutputFile {
    /// Create a new output file with the given path and content
    pub fn new(path: impl Into<PathBuf>, content: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            content: content.into(),
        }
    }

    /// Get the file path
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Get the file content
    pub fn content(&self) -> &str {
        &self.content
    }

    /// Check if the file exists
    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Whether the file on disk already holds exactly this content.
    pub fn is_up_to_date(&self) -> Result<bool> {
        if !self.exists() {
            return Ok(false);
        }
        let current = std::fs::read(&self.path)
            .wrap_err_with(|| format!("failed to read {}", self.path.display()))?;
        Ok(current == self.content.as_bytes())
    }

    /// Write the file unless the destination is byte-identical.
    pub fn write(&self) -> Result<WriteResult> {
        if self.is_up_to_date()? {
            return Ok(WriteResult::Unchanged);
        }
        write_file(&self.path, &self.content)
            .wrap_err_with(|| format!("failed to write {}", self.path.display()))?;
        Ok(WriteResult::Generated)
    }
}

fn write_file(path: &Path, content: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, content)?;
    Ok(())
}

/// Whether `path` names a template, i.e. contains `.dm.` in its file name.
pub fn is_template(path: &Path) -> bool {
    path.file_name()
        .and_then(|name| name.to_str())
        .is_some_and(|name| name.contains(TEMPLATE_MARKER))
}

/// Destination of a template: `actual.dm.cpp` becomes `actual.cpp`.
///
/// Returns `None` when the path is not a template.
pub fn destination_for(template: &Path) -> Option<PathBuf> {
    let name = template.file_name()?.to_str()?;
    if !name.contains(TEMPLATE_MARKER) {
        return None;
    }
    Some(template.with_file_name(name.replacen(TEMPLATE_MARKER, ".", 1)))
}
