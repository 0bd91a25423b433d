//! Component specification model for Datamatic.
//!
//! A spec is a JSON document listing components (named records of typed,
//! flagged attributes) plus the default value of every flag. This crate
//! parses it, checks its structure and fills per-object flags from the
//! defaults so later stages can filter on them directly.

// Miette's derive macro generates code that triggers these warnings
#![allow(unused_assignments)]

mod component;
mod error;
mod validate;

use std::{path::Path, str::FromStr};

pub use component::{Attribute, Component, FlagMap};
pub use error::{Error, Result};
use serde::Deserialize;
pub use validate::ParseContext;

/// Root of a component spec file.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Spec {
    /// Default value of every flag. Empty when the spec does not use flags.
    #[serde(default)]
    pub flag_defaults: FlagMap,

    /// Components in declaration order.
    pub components: Vec<Component>,
}

impl FromStr for Spec {
    type Err = Box<Error>;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_str_with_filename(s, "components.json")
    }
}

impl Spec {
    /// Parse a spec file from the given path
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            Box::new(Error::Io {
                path: path.to_path_buf(),
                source: e,
            })
        })?;
        Self::from_str_with_filename(&content, &path.display().to_string())
    }

    /// Parse a spec from a string with a custom filename for error reporting
    pub fn from_str_with_filename(content: &str, filename: &str) -> Result<Self> {
        let mut spec: Self =
            serde_json::from_str(content).map_err(|e| Error::parse(e, content, filename))?;
        validate::validate_spec(&spec, content, filename)?;
        spec.resolve_flags();
        Ok(spec)
    }

    /// Whether the spec declares any flags at all.
    pub fn uses_flags(&self) -> bool {
        !self.flag_defaults.is_empty()
    }

    /// Look up a component by name.
    pub fn component(&self, name: &str) -> Option<&Component> {
        self.components.iter().find(|c| c.name == name)
    }

    /// Fill every component and attribute flag map from the defaults.
    ///
    /// Explicit per-object values win over the defaults.
    pub fn resolve_flags(&mut self) {
        for component in &mut self.components {
            component.flags = component::resolve_flags(&self.flag_defaults, &component.flags);
            for attr in &mut component.attributes {
                attr.flags = component::resolve_flags(&self.flag_defaults, &attr.flags);
            }
        }
    }
}
