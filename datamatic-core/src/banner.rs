//! Generated-file banners.

use std::path::Path;

/// Text that marks a file as machine-generated.
pub const GENERATED_MARKER: &str = "GENERATED FILE";

/// Supplies the first line written to a destination file.
///
/// Implementations pick the comment syntax for the destination; returning
/// `None` emits no banner at all.
pub trait Banner: Send + Sync {
    fn banner(&self, destination: &Path) -> Option<String>;
}

/// Banner in the comment syntax implied by the destination's extension.
#[derive(Debug, Clone, Copy, Default)]
pub struct CommentBanner;

impl CommentBanner {
    /// Line-comment prefix for a file extension.
    pub fn comment_prefix(extension: &str) -> &'static str {
        match extension {
            "lua" | "sql" => "--",
            "py" | "sh" | "toml" | "yaml" | "yml" | "cmake" | "txt" => "#",
            _ => "//",
        }
    }
}

impl Banner for CommentBanner {
    fn banner(&self, destination: &Path) -> Option<String> {
        let extension = destination
            .extension()
            .and_then(|ext| ext.to_str())
            .unwrap_or_default();
        Some(format!(
            "{} {}",
            Self::comment_prefix(extension),
            GENERATED_MARKER
        ))
    }
}

/// Emits no banner.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoBanner;

impl Banner for NoBanner {
    fn banner(&self, _destination: &Path) -> Option<String> {
        None
    }
}
