//! Structural validation of a parsed component spec.

use std::collections::HashSet;

use miette::SourceSpan;

use crate::{Component, Error, FlagMap, Result, Spec};

/// Validation context that carries source information.
///
/// Holds the raw JSON text and filename so errors can point back into the
/// document, plus the path through the spec for error messages.
///
/// # Example
///
/// ```ignore
/// let ctx = ParseContext::new(src, "components.json");
/// let nested = ctx.push("Position").push("x");
/// nested.validate_flags(&attr.flags, &spec.flag_defaults, "attribute")?;
/// ```
#[derive(Debug, Clone)]
pub struct ParseContext<'a> {
    src: &'a str,
    filename: &'a str,
    /// Path segments for nested validation (e.g., ["Position", "x"])
    path: Vec<&'a str>,
}

impl<'a> ParseContext<'a> {
    /// Create a new parse context with the given source and filename.
    pub fn new(src: &'a str, filename: &'a str) -> Self {
        Self {
            src,
            filename,
            path: Vec::new(),
        }
    }

    /// Push a path segment and return a new context.
    pub fn push(&self, segment: &'a str) -> Self {
        let mut path = self.path.clone();
        path.push(segment);
        Self {
            src: self.src,
            filename: self.filename,
            path,
        }
    }

    /// Get the current path as a dot-separated string.
    pub fn path_string(&self) -> String {
        self.path.join(".")
    }

    /// Describe the current location, e.g. "attribute 'Position.x'".
    pub fn context_for(&self, kind: &str) -> String {
        if self.path.is_empty() {
            kind.to_string()
        } else {
            format!("{} '{}'", kind, self.path_string())
        }
    }

    /// Find the span of a quoted string in the source.
    pub fn find_span(&self, text: &str) -> Option<SourceSpan> {
        find_string_span(self.src, text)
    }

    /// Check that every flag on an object is declared in `defaults`.
    pub fn validate_flags(&self, flags: &FlagMap, defaults: &FlagMap, kind: &str) -> Result<()> {
        for flag in flags.keys() {
            if !defaults.contains_key(flag) {
                return Err(Error::unknown_flag(
                    flag,
                    self.context_for(kind),
                    self.src,
                    self.filename,
                    self.find_span(flag),
                ));
            }
        }
        Ok(())
    }

    /// Check that a name is non-empty.
    pub fn validate_name(&self, name: &str, kind: &str) -> Result<()> {
        if name.trim().is_empty() {
            return Err(Error::validation(
                format!("{} name cannot be empty", self.context_for(kind)),
                self.src,
                self.filename,
                None,
            ));
        }
        Ok(())
    }
}

/// Validate the whole spec: names, uniqueness and flag declarations.
pub(crate) fn validate_spec(spec: &Spec, src: &str, filename: &str) -> Result<()> {
    let ctx = ParseContext::new(src, filename);
    let mut seen = HashSet::new();

    for component in &spec.components {
        ctx.validate_name(&component.name, "component")?;
        if !seen.insert(component.name.as_str()) {
            return Err(Error::duplicate_name(
                "component",
                &component.name,
                "",
                src,
                filename,
                ctx.find_span(&component.name),
            ));
        }

        let comp_ctx = ctx.push(&component.name);
        comp_ctx.validate_flags(&component.flags, &spec.flag_defaults, "component")?;
        validate_attributes(component, &comp_ctx, &spec.flag_defaults)?;
    }

    Ok(())
}

fn validate_attributes<'a>(
    component: &'a Component,
    ctx: &ParseContext<'a>,
    defaults: &FlagMap,
) -> Result<()> {
    let mut seen = HashSet::new();

    for attr in &component.attributes {
        ctx.validate_name(&attr.name, "attribute")?;
        if !seen.insert(attr.name.as_str()) {
            return Err(Error::duplicate_name(
                "attribute",
                &attr.name,
                format!(" within component '{}'", component.name),
                ctx.src,
                ctx.filename,
                ctx.find_span(&attr.name),
            ));
        }

        let attr_ctx = ctx.push(&attr.name);
        if attr.type_name.trim().is_empty() {
            return Err(Error::validation(
                format!("{} has an empty type", attr_ctx.context_for("attribute")),
                ctx.src,
                ctx.filename,
                ctx.find_span(&attr.name),
            ));
        }
        attr_ctx.validate_flags(&attr.flags, defaults, "attribute")?;
    }

    Ok(())
}

/// Find the span of `"text"` in the JSON source, excluding the quotes.
pub(crate) fn find_string_span(src: &str, text: &str) -> Option<SourceSpan> {
    let quoted = format!("\"{}\"", text);
    src.find(&quoted)
        .map(|pos| SourceSpan::from((pos + 1, text.len())))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_string_span_skips_quotes() {
        let src = r#"{"name": "Position"}"#;
        let span = find_string_span(src, "Position").unwrap();
        assert_eq!(span.offset(), 10);
        assert_eq!(span.len(), 8);
    }

    #[test]
    fn test_find_string_span_missing() {
        assert!(find_string_span("{}", "Position").is_none());
    }

    #[test]
    fn test_context_for_nested_path() {
        let ctx = ParseContext::new("", "spec.json");
        assert_eq!(ctx.context_for("component"), "component");

        let nested = ctx.push("Position").push("x");
        assert_eq!(nested.context_for("attribute"), "attribute 'Position.x'");
    }

    #[test]
    fn test_validate_flags_rejects_undeclared() {
        let ctx = ParseContext::new(r#"{"SAVE": true}"#, "spec.json");
        let defaults: FlagMap = [("EDIT".to_string(), true)].into_iter().collect();
        let flags: FlagMap = [("SAVE".to_string(), true)].into_iter().collect();

        let err = ctx.validate_flags(&flags, &defaults, "component").unwrap_err();
        assert!(matches!(*err, Error::UnknownFlag { ref flag, .. } if flag == "SAVE"));
    }

    #[test]
    fn test_validate_name_rejects_blank() {
        let ctx = ParseContext::new("", "spec.json");
        assert!(ctx.validate_name("  ", "component").is_err());
        assert!(ctx.validate_name("Position", "component").is_ok());
    }
}
