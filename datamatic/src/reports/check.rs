//! Check command report data structures.

use std::path::PathBuf;

use super::output::{Output, Report};

/// Summary of a spec that parsed and validated cleanly.
#[derive(Debug)]
pub struct CheckReport {
    /// Path to the spec file.
    pub spec_path: PathBuf,
    pub components: usize,
    pub attributes: usize,
    /// Declared flags with their defaults.
    pub flags: Vec<(String, bool)>,
}

impl Report for CheckReport {
    fn render(&self, out: &mut dyn Output) {
        out.preformatted(&format!("✓ {} is valid", self.spec_path.display()));
        out.newline();
        out.key_value("Components", &self.components.to_string());
        out.key_value("Attributes", &self.attributes.to_string());

        if !self.flags.is_empty() {
            out.newline();
            out.section("Flags");
            for (flag, default) in &self.flags {
                out.list_item(&format!("{} (default {})", flag, default));
            }
        }
    }
}
