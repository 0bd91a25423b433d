//! Template files to destination files.

use std::path::{Path, PathBuf};

use datamatic_core::{Banner, OutputFile, WriteResult, destination_for};

use crate::{Error, Result};

/// Outcome of emitting one template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Emitted {
    pub template: PathBuf,
    pub destination: PathBuf,
    pub result: WriteResult,
}

/// Read a template from disk.
pub(crate) fn read_template(path: &Path) -> Result<(PathBuf, String)> {
    let destination = destination_for(path).ok_or_else(|| Error::NotATemplate {
        path: path.to_path_buf(),
    })?;
    let source = std::fs::read_to_string(path).map_err(|source| Error::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok((destination, source))
}

/// Banner line followed by the expanded body.
pub(crate) fn assemble(destination: PathBuf, banner: &dyn Banner, body: &str) -> OutputFile {
    let mut content = String::with_capacity(body.len() + 32);
    if let Some(line) = banner.banner(&destination) {
        content.push_str(&line);
        content.push('\n');
    }
    content.push_str(body);
    OutputFile::new(destination, content)
}
