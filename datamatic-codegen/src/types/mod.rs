//! Type-driven rendering of JSON literals into target-language expressions.
//!
//! A [`TypeRenderer`] maps type patterns to [`TypeHandler`]s through a
//! [`PatternDispatcher`]. Handlers receive the renderer itself so container
//! types can render their elements recursively:
//!
//! ```ignore
//! let mut types = TypeRenderer::new();
//! types.register("Maths::vec3", |_, _, _, value| {
//!     let [x, y, z] = ...;
//!     Ok(format!("Maths::vec3{{{x}, {y}, {z}}}"))
//! })?;
//!
//! assert_eq!(types.render("std::vector<int>", &json!([1, 2]))?, "std::vector<int>{1, 2}");
//! ```

mod builtin;

use std::{fmt, sync::Arc};

use serde_json::Value;

pub use builtin::register_builtin_types;

use crate::{
    Result,
    pattern::{PatternDispatcher, PatternKind},
};

/// Renders a value for a type.
///
/// Arguments are the renderer (for recursion), the full type name as written,
/// the sub-types captured by the pattern, and the value to render.
pub type TypeHandler =
    Arc<dyn Fn(&TypeRenderer, &str, &[String], &Value) -> Result<String> + Send + Sync>;

/// Registry of type renderers.
#[derive(Clone, Default)]
pub struct TypeRenderer {
    dispatcher: PatternDispatcher<TypeHandler>,
}

impl fmt::Debug for TypeRenderer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeRenderer")
            .field("patterns", &self.dispatcher.len())
            .finish()
    }
}

impl TypeRenderer {
    /// Create an empty renderer with no registered types.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a renderer with all built-in types registered.
    pub fn with_builtins() -> Result<Self> {
        let mut types = Self::new();
        register_builtin_types(&mut types)?;
        Ok(types)
    }

    /// Register a renderer for a type pattern.
    ///
    /// Fails if the pattern is malformed or already registered.
    pub fn register<F>(&mut self, pattern: &str, handler: F) -> Result<PatternKind>
    where
        F: Fn(&TypeRenderer, &str, &[String], &Value) -> Result<String> + Send + Sync + 'static,
    {
        self.dispatcher.register(pattern, Arc::new(handler))
    }

    /// Whether a pattern is already registered.
    pub fn is_registered(&self, pattern: &str) -> bool {
        self.dispatcher.is_registered(pattern)
    }

    /// Number of registered type patterns.
    pub fn len(&self) -> usize {
        self.dispatcher.len()
    }

    /// Check if no types are registered.
    pub fn is_empty(&self) -> bool {
        self.dispatcher.is_empty()
    }

    /// Render `value` as a literal of `type_name`.
    pub fn render(&self, type_name: &str, value: &Value) -> Result<String> {
        let type_name = type_name.trim();
        let resolved = self.dispatcher.resolve(type_name)?;
        (resolved.handler)(self, type_name, &resolved.args, value)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::Error;

    #[test]
    fn test_empty_renderer_is_unresolved() {
        let types = TypeRenderer::new();
        let err = types.render("int", &json!(1)).unwrap_err();
        assert!(matches!(err, Error::UnresolvedType { .. }));
    }

    #[test]
    fn test_custom_type_registration() {
        let mut types = TypeRenderer::new();
        types
            .register("Maths::vec2", |_, ty, _, value| {
                let items = value
                    .as_array()
                    .ok_or_else(|| Error::mismatch(ty, value, "expected a list"))?;
                Ok(format!("{}{{{}, {}}}", ty, items[0], items[1]))
            })
            .unwrap();

        assert_eq!(types.render("Maths::vec2", &json!([1, 2])).unwrap(), "Maths::vec2{1, 2}");
        assert!(types.is_registered("Maths::vec2"));
        assert_eq!(types.len(), 1);
    }

    #[test]
    fn test_handlers_recurse_through_renderer() {
        let mut types = TypeRenderer::new();
        types.register("int", |_, _, _, v| Ok(v.to_string())).unwrap();
        types
            .register("Box<{}>", |types, _, args, v| {
                Ok(format!("Box({})", types.render(&args[0], v)?))
            })
            .unwrap();

        assert_eq!(types.render("Box<Box<int>>", &json!(3)).unwrap(), "Box(Box(3))");
    }

    #[test]
    fn test_duplicate_registration_fails() {
        let mut types = TypeRenderer::with_builtins().unwrap();
        let err = types.register("int", |_, _, _, _| Ok(String::new())).unwrap_err();
        assert!(err.is_configuration());
    }
}
