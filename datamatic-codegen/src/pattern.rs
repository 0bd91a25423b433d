//! Name-pattern dispatch.
//!
//! A [`PatternDispatcher`] maps pattern strings to handlers. Three kinds of
//! pattern are supported:
//!
//! - **exact**: `"int"` matches only `int`
//! - **template**: `"std::vector<{}>"` matches `std::vector<int>` and captures `int`
//! - **variadic**: `"std::tuple<{}...>"` matches `std::tuple<int, float>` and
//!   captures `["int", "float"]`, splitting on top-level commas only
//!
//! Exact matches win; then templates, then variadics, each in registration
//! order. Patterns are expected to be mutually exclusive; when two overlap
//! the first registered one wins.

use indexmap::IndexMap;

use crate::{Error, Result};

/// Placeholder for a single captured sub-type.
pub const PLACEHOLDER: &str = "{}";
/// Placeholder for a comma-separated list of sub-types.
pub const VARIADIC_PLACEHOLDER: &str = "{}...";

const OPEN_BRACKETS: [char; 4] = ['(', '[', '<', '{'];
const CLOSE_BRACKETS: [char; 4] = [')', ']', '>', '}'];

/// How a pattern matches concrete names.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatternKind {
    Exact,
    Template,
    Variadic,
}

/// Fixed text around a placeholder.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Shape {
    prefix: String,
    suffix: String,
}

impl Shape {
    fn split(pattern: &str, placeholder: &str) -> Self {
        let (prefix, suffix) = pattern.split_once(placeholder).unwrap_or((pattern, ""));
        Self {
            prefix: prefix.to_string(),
            suffix: suffix.to_string(),
        }
    }

    /// The text between prefix and suffix, if `name` has this shape.
    fn capture<'n>(&self, name: &'n str) -> Option<&'n str> {
        if name.len() < self.prefix.len() + self.suffix.len() {
            return None;
        }
        let inner = name.strip_prefix(&self.prefix)?.strip_suffix(&self.suffix)?;
        Some(inner.trim())
    }
}

/// A successful lookup: the handler plus whatever the pattern captured.
#[derive(Debug)]
pub struct Resolved<'a, H> {
    pub handler: &'a H,
    pub kind: PatternKind,
    /// Captured sub-types: empty for exact, one for template, any number for variadic.
    pub args: Vec<String>,
}

/// Registry from name patterns to handlers.
#[derive(Debug, Clone)]
pub struct PatternDispatcher<H> {
    exact: IndexMap<String, H>,
    templates: IndexMap<String, (Shape, H)>,
    /// Keyed by the pattern with `{}...` collapsed to `{}`.
    variadics: IndexMap<String, (Shape, H)>,
}

impl<H> Default for PatternDispatcher<H> {
    fn default() -> Self {
        Self {
            exact: IndexMap::new(),
            templates: IndexMap::new(),
            variadics: IndexMap::new(),
        }
    }
}

impl<H> PatternDispatcher<H> {
    /// Create an empty dispatcher.
    pub fn new() -> Self {
        Self::default()
    }

    /// Classify a pattern string, rejecting malformed placeholders.
    pub fn kind_of(pattern: &str) -> Result<PatternKind> {
        let placeholders = pattern.matches(PLACEHOLDER).count();
        let variadic = pattern.matches(VARIADIC_PLACEHOLDER).count();

        match (placeholders, variadic) {
            (0, _) => Ok(PatternKind::Exact),
            (1, 0) => Ok(PatternKind::Template),
            (1, 1) => Ok(PatternKind::Variadic),
            (_, 0) => Err(invalid(
                pattern,
                "only one placeholder is supported, use '{}...' for several",
            )),
            _ => Err(invalid(
                pattern,
                "variadic and non-variadic placeholders cannot be mixed",
            )),
        }
    }

    /// Register a handler for `pattern`.
    ///
    /// Fails if the same pattern (of any kind) is already registered.
    pub fn register(&mut self, pattern: &str, handler: H) -> Result<PatternKind> {
        let pattern = pattern.trim();
        if pattern.is_empty() {
            return Err(invalid(pattern, "pattern cannot be empty"));
        }

        let kind = Self::kind_of(pattern)?;
        let key = pattern.replace(VARIADIC_PLACEHOLDER, PLACEHOLDER);
        if self.contains(&key) {
            return Err(Error::DuplicatePattern {
                pattern: pattern.to_string(),
            });
        }

        match kind {
            PatternKind::Exact => {
                self.exact.insert(key, handler);
            }
            PatternKind::Template => {
                let shape = Shape::split(pattern, PLACEHOLDER);
                self.templates.insert(key, (shape, handler));
            }
            PatternKind::Variadic => {
                let shape = Shape::split(pattern, VARIADIC_PLACEHOLDER);
                self.variadics.insert(key, (shape, handler));
            }
        }
        Ok(kind)
    }

    /// Whether a pattern with this normalized key is registered.
    fn contains(&self, key: &str) -> bool {
        self.exact.contains_key(key)
            || self.templates.contains_key(key)
            || self.variadics.contains_key(key)
    }

    /// Whether `pattern` is registered under any kind.
    pub fn is_registered(&self, pattern: &str) -> bool {
        self.contains(&pattern.trim().replace(VARIADIC_PLACEHOLDER, PLACEHOLDER))
    }

    /// Number of registered patterns.
    pub fn len(&self) -> usize {
        self.exact.len() + self.templates.len() + self.variadics.len()
    }

    /// Check if the dispatcher is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Find the handler for a concrete name.
    pub fn resolve(&self, name: &str) -> Result<Resolved<'_, H>> {
        let name = name.trim();

        if let Some(handler) = self.exact.get(name) {
            return Ok(Resolved {
                handler,
                kind: PatternKind::Exact,
                args: Vec::new(),
            });
        }

        for (shape, handler) in self.templates.values() {
            let Some(inner) = shape.capture(name) else {
                continue;
            };
            if inner.is_empty() || !is_balanced(inner) {
                continue;
            }
            return Ok(Resolved {
                handler,
                kind: PatternKind::Template,
                args: vec![inner.to_string()],
            });
        }

        for (shape, handler) in self.variadics.values() {
            if let Some(inner) = shape.capture(name) {
                return Ok(Resolved {
                    handler,
                    kind: PatternKind::Variadic,
                    args: split_type_list(inner)?,
                });
            }
        }

        Err(Error::UnresolvedType {
            type_name: name.to_string(),
        })
    }
}

fn invalid(pattern: &str, reason: &str) -> Error {
    Error::InvalidPattern {
        pattern: pattern.to_string(),
        reason: reason.to_string(),
    }
}

fn is_balanced(text: &str) -> bool {
    let mut stack = Vec::new();
    for c in text.chars() {
        if let Some(i) = OPEN_BRACKETS.iter().position(|&o| o == c) {
            stack.push(i);
        } else if let Some(i) = CLOSE_BRACKETS.iter().position(|&o| o == c) {
            if stack.pop() != Some(i) {
                return false;
            }
        }
    }
    stack.is_empty()
}

/// Split a comma-separated type list on top-level commas.
///
/// Commas nested inside `()`, `[]`, `{}` or `<>` do not split. Elements are
/// trimmed; an empty string yields an empty list.
pub fn split_type_list(list: &str) -> Result<Vec<String>> {
    let invalid = || Error::InvalidTypeList {
        list: list.to_string(),
    };

    if list.trim().is_empty() {
        return Ok(Vec::new());
    }

    let mut items = Vec::new();
    let mut current = String::new();
    let mut stack = Vec::new();

    for c in list.chars() {
        if let Some(i) = OPEN_BRACKETS.iter().position(|&o| o == c) {
            stack.push(i);
        } else if let Some(i) = CLOSE_BRACKETS.iter().position(|&o| o == c) {
            if stack.pop() != Some(i) {
                return Err(invalid());
            }
        } else if c == ',' && stack.is_empty() {
            items.push(std::mem::take(&mut current));
            continue;
        }
        current.push(c);
    }
    if !stack.is_empty() {
        return Err(invalid());
    }
    items.push(current);

    let items: Vec<String> = items.into_iter().map(|s| s.trim().to_string()).collect();
    if items.iter().any(String::is_empty) {
        return Err(invalid());
    }
    Ok(items)
}

/// Normalize spacing around commas: `std::map<int,int>` → `std::map<int, int>`.
pub fn canonical_type(type_name: &str) -> String {
    let mut out = String::with_capacity(type_name.len() + 4);
    let mut chars = type_name.trim().chars().peekable();

    while let Some(c) = chars.next() {
        if c == ',' {
            let trimmed = out.trim_end().len();
            out.truncate(trimmed);
            out.push_str(", ");
            while chars.peek().is_some_and(|c| c.is_whitespace()) {
                chars.next();
            }
        } else {
            out.push(c);
        }
    }
    out
}
