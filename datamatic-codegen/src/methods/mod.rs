//! Token methods: `(namespace, function)` → rendering function.
//!
//! Every handler gets the same [`EvalContext`] and the token's arguments.
//! A token whose function has no registered handler falls back to a plain
//! field lookup on the active component or attribute.

mod builtin;

use std::{collections::HashMap, fmt, sync::Arc};

use serde_json::Value;

pub use builtin::register_builtin_methods;

use crate::{
    Error, Namespace, Result, Token,
    filter::{FilteredAttribute, FilteredComponent, FilteredSpec},
    token,
    types::TypeRenderer,
};

/// Everything a method may look at while rendering one token.
///
/// The spec view is the one filtered for the enclosing block, so positional
/// helpers agree across every line of that block.
#[derive(Debug, Clone, Copy)]
pub struct EvalContext<'a> {
    pub spec: &'a FilteredSpec,
    pub component: &'a FilteredComponent,
    /// Present while rendering `Attr` tokens.
    pub attribute: Option<&'a FilteredAttribute>,
    pub types: &'a TypeRenderer,
}

impl<'a> EvalContext<'a> {
    pub fn new(
        spec: &'a FilteredSpec,
        component: &'a FilteredComponent,
        types: &'a TypeRenderer,
    ) -> Self {
        Self {
            spec,
            component,
            attribute: None,
            types,
        }
    }

    /// The same context with `attribute` active.
    pub fn with_attribute(self, attribute: &'a FilteredAttribute) -> Self {
        Self {
            attribute: Some(attribute),
            ..self
        }
    }

    /// Which namespace lookups run against.
    pub fn namespace(&self) -> Namespace {
        match self.attribute {
            Some(_) => Namespace::Attr,
            None => Namespace::Comp,
        }
    }

    /// The active attribute, or an error naming `function` if there is none.
    pub fn require_attribute(&self, function: &str) -> Result<&'a FilteredAttribute> {
        self.attribute.ok_or_else(|| {
            Error::invalid_argument(function, "Attr methods need an active attribute")
        })
    }

    /// Field of the active object.
    pub fn field(&self, name: &str) -> Option<Value> {
        match self.attribute {
            Some(attr) => attr.field(name),
            None => self.component.field(name),
        }
    }

    /// Whether the active object is the `n`-th of its filtered siblings.
    ///
    /// Negative `n` counts from the end. Out-of-range indices are never a match.
    pub fn is_nth(&self, n: i64) -> bool {
        match self.attribute {
            Some(attr) => nth_matches(&self.component.attributes, attr, n),
            None => nth_matches(&self.spec.components, self.component, n),
        }
    }
}

fn nth_matches<T: PartialEq>(items: &[T], item: &T, n: i64) -> bool {
    let len = i64::try_from(items.len()).unwrap_or(i64::MAX);
    let index = if n < 0 { len + n } else { n };
    usize::try_from(index)
        .ok()
        .and_then(|i| items.get(i))
        .is_some_and(|nth| nth == item)
}

/// Renders a token in a context.
pub type MethodHandler = Arc<dyn Fn(&EvalContext<'_>, &[String]) -> Result<String> + Send + Sync>;

/// How a token will be rendered.
pub enum Resolution<'a> {
    Registered(&'a MethodHandler),
    /// No handler; the function name is read as a field.
    FieldLookup,
}

/// Registry of token methods.
#[derive(Clone, Default)]
pub struct MethodRegistry {
    methods: HashMap<(Namespace, String), MethodHandler>,
}

impl fmt::Debug for MethodRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<String> = self
            .methods
            .keys()
            .map(|(ns, name)| format!("{ns}::{name}"))
            .collect();
        names.sort();
        f.debug_struct("MethodRegistry").field("methods", &names).finish()
    }
}

impl MethodRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry with all built-in methods registered.
    pub fn with_builtins() -> Result<Self> {
        let mut methods = Self::new();
        register_builtin_methods(&mut methods)?;
        Ok(methods)
    }

    /// Register `name` in `namespace`. Fails if it is already taken.
    pub fn register<F>(&mut self, namespace: Namespace, name: &str, handler: F) -> Result<()>
    where
        F: Fn(&EvalContext<'_>, &[String]) -> Result<String> + Send + Sync + 'static,
    {
        self.insert(namespace, name, Arc::new(handler))
    }

    /// Register the same handler in both namespaces.
    pub fn register_both<F>(&mut self, name: &str, handler: F) -> Result<()>
    where
        F: Fn(&EvalContext<'_>, &[String]) -> Result<String> + Send + Sync + 'static,
    {
        let handler: MethodHandler = Arc::new(handler);
        self.insert(Namespace::Comp, name, handler.clone())?;
        self.insert(Namespace::Attr, name, handler)
    }

    fn insert(&mut self, namespace: Namespace, name: &str, handler: MethodHandler) -> Result<()> {
        if !token::is_function_name(name) {
            return Err(Error::InvalidMethodName {
                namespace,
                name: name.to_string(),
            });
        }
        let key = (namespace, name.to_string());
        if self.methods.contains_key(&key) {
            return Err(Error::DuplicateMethod {
                namespace,
                name: name.to_string(),
            });
        }
        self.methods.insert(key, handler);
        Ok(())
    }

    pub fn contains(&self, namespace: Namespace, name: &str) -> bool {
        self.methods.contains_key(&(namespace, name.to_string()))
    }

    pub fn len(&self) -> usize {
        self.methods.len()
    }

    pub fn is_empty(&self) -> bool {
        self.methods.is_empty()
    }

    pub fn resolve(&self, namespace: Namespace, name: &str) -> Resolution<'_> {
        match self.methods.get(&(namespace, name.to_string())) {
            Some(handler) => Resolution::Registered(handler),
            None => Resolution::FieldLookup,
        }
    }

    /// Render `token` in `ctx`.
    pub fn invoke(&self, token: &Token, ctx: &EvalContext<'_>) -> Result<String> {
        let ctx = match (token.namespace, ctx.attribute) {
            (Namespace::Comp, Some(_)) => EvalContext { attribute: None, ..*ctx },
            (Namespace::Attr, None) => {
                return Err(Error::invalid_argument(
                    token.to_string(),
                    "Attr tokens need an active attribute",
                ));
            }
            _ => *ctx,
        };

        match self.resolve(token.namespace, &token.function_name) {
            Resolution::Registered(handler) => handler(&ctx, &token.args),
            Resolution::FieldLookup => lookup_field(token, &ctx),
        }
    }
}

fn lookup_field(token: &Token, ctx: &EvalContext<'_>) -> Result<String> {
    if !token.args.is_empty() {
        return Err(Error::invalid_argument(
            token.to_string(),
            "field lookups take no arguments",
        ));
    }
    match ctx.field(&token.function_name) {
        Some(Value::String(s)) => Ok(s),
        Some(value) => Ok(value.to_string()),
        None => Err(Error::UnknownField {
            namespace: token.namespace,
            field: token.function_name.clone(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn view() -> FilteredSpec {
        let attr = |name: &str| FilteredAttribute {
            name: name.into(),
            display_name: name.to_uppercase(),
            type_name: "int".into(),
            default: json!(1),
            custom: Some(json!({"Scriptable": false, "Doc": "text"})),
        };
        FilteredSpec {
            components: vec![
                FilteredComponent {
                    name: "A".into(),
                    display_name: "Alpha".into(),
                    attributes: vec![attr("x"), attr("y")],
                },
                FilteredComponent {
                    name: "B".into(),
                    display_name: "Beta".into(),
                    attributes: vec![],
                },
            ],
        }
    }

    #[test]
    fn test_is_nth_with_negative_and_out_of_range() {
        let spec = view();
        let types = TypeRenderer::new();
        let first = EvalContext::new(&spec, &spec.components[0], &types);
        let second = EvalContext::new(&spec, &spec.components[1], &types);

        assert!(first.is_nth(0));
        assert!(second.is_nth(-1));
        assert!(first.is_nth(-2));
        assert!(!first.is_nth(5));
        assert!(!first.is_nth(-3));

        let y = first.with_attribute(&spec.components[0].attributes[1]);
        assert_eq!(y.namespace(), Namespace::Attr);
        assert!(y.is_nth(1));
        assert!(y.is_nth(-1));
    }

    #[test]
    fn test_field_lookup_fallback() {
        let spec = view();
        let types = TypeRenderer::new();
        let registry = MethodRegistry::new();
        let ctx = EvalContext::new(&spec, &spec.components[0], &types);

        let token = Token::new(Namespace::Comp, "display_name", vec![]);
        assert_eq!(registry.invoke(&token, &ctx).unwrap(), "Alpha");

        let ctx = ctx.with_attribute(&spec.components[0].attributes[0]);
        let token = Token::new(Namespace::Attr, "Scriptable", vec![]);
        assert_eq!(registry.invoke(&token, &ctx).unwrap(), "false");
        let token = Token::new(Namespace::Attr, "Doc", vec![]);
        assert_eq!(registry.invoke(&token, &ctx).unwrap(), "text");
    }

    #[test]
    fn test_unknown_field_is_error() {
        let spec = view();
        let types = TypeRenderer::new();
        let ctx = EvalContext::new(&spec, &spec.components[0], &types);
        let token = Token::new(Namespace::Comp, "Nope", vec![]);

        let err = MethodRegistry::new().invoke(&token, &ctx).unwrap_err();
        assert!(matches!(err, Error::UnknownField { ref field, .. } if field == "Nope"));
    }

    #[test]
    fn test_comp_tokens_ignore_active_attribute() {
        let spec = view();
        let types = TypeRenderer::new();
        let ctx = EvalContext::new(&spec, &spec.components[0], &types)
            .with_attribute(&spec.components[0].attributes[0]);
        let token = Token::new(Namespace::Comp, "name", vec![]);

        assert_eq!(MethodRegistry::new().invoke(&token, &ctx).unwrap(), "A");
    }

    #[test]
    fn test_attr_token_without_attribute_is_error() {
        let spec = view();
        let types = TypeRenderer::new();
        let ctx = EvalContext::new(&spec, &spec.components[0], &types);
        let token = Token::new(Namespace::Attr, "name", vec![]);

        assert!(MethodRegistry::new().invoke(&token, &ctx).is_err());
    }

    #[test]
    fn test_custom_method_wins_over_field() {
        let spec = view();
        let types = TypeRenderer::new();
        let mut registry = MethodRegistry::new();
        registry
            .register(Namespace::Comp, "name", |ctx, _| Ok(ctx.component.name.to_lowercase()))
            .unwrap();
        let ctx = EvalContext::new(&spec, &spec.components[0], &types);

        let token = Token::new(Namespace::Comp, "name", vec![]);
        assert_eq!(registry.invoke(&token, &ctx).unwrap(), "a");
    }

    #[test]
    fn test_duplicate_registration() {
        let mut registry = MethodRegistry::new();
        registry.register(Namespace::Attr, "Lua.Sig", |_, _| Ok(String::new())).unwrap();
        registry.register(Namespace::Comp, "Lua.Sig", |_, _| Ok(String::new())).unwrap();

        let err = registry
            .register(Namespace::Attr, "Lua.Sig", |_, _| Ok(String::new()))
            .unwrap_err();
        assert!(matches!(err, Error::DuplicateMethod { namespace: Namespace::Attr, .. }));
        assert!(registry.register_both("Lua.Sig", |_, _| Ok(String::new())).is_err());
    }

    #[test]
    fn test_unreachable_method_names_are_rejected() {
        let mut registry = MethodRegistry::new();
        for name in ["to-lua", "", "Lua..Sig", "1st", "has space"] {
            let err = registry
                .register(Namespace::Comp, name, |_, _| Ok(String::new()))
                .unwrap_err();
            assert!(matches!(err, Error::InvalidMethodName { .. }), "{name}: {err}");
            assert!(err.is_configuration());
        }
        assert!(registry.is_empty());
    }
}
