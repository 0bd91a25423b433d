use serde_json::Value;

use super::{EvalContext, MethodRegistry};
use crate::{Error, Namespace, Result};

/// Register every built-in method on `methods`.
pub fn register_builtin_methods(methods: &mut MethodRegistry) -> Result<()> {
    methods.register_both("name", |ctx, args| {
        expect_args("name", args, 0)?;
        Ok(match ctx.attribute {
            Some(attr) => attr.name.clone(),
            None => ctx.component.name.clone(),
        })
    })?;
    methods.register_both("display_name", |ctx, args| {
        expect_args("display_name", args, 0)?;
        Ok(match ctx.attribute {
            Some(attr) => attr.display_name.clone(),
            None => ctx.component.display_name.clone(),
        })
    })?;

    methods.register(Namespace::Attr, "type", |ctx, args| {
        expect_args("type", args, 0)?;
        Ok(ctx.require_attribute("type")?.type_name.clone())
    })?;
    methods.register(Namespace::Attr, "default", |ctx, args| {
        expect_args("default", args, 0)?;
        let attr = ctx.require_attribute("default")?;
        ctx.types.render(&attr.type_name, &attr.default)
    })?;

    methods.register_both("if_nth_else", |ctx, args| {
        let [n, yes, no] = args else {
            return Err(Error::invalid_argument(
                "if_nth_else",
                format!("expected (index, yes, no), found {} arguments", args.len()),
            ));
        };
        let n: i64 = n.trim().parse().map_err(|_| {
            Error::invalid_argument("if_nth_else", format!("'{n}' is not an integer index"))
        })?;
        let chosen = if ctx.is_nth(n) { yes } else { no };
        Ok(chosen.clone())
    })?;
    for (name, index, expected) in [
        ("if_first", 0, true),
        ("if_not_first", 0, false),
        ("if_last", -1, true),
        ("if_not_last", -1, false),
    ] {
        methods.register_both(name, move |ctx, args| {
            let [text] = args else {
                return Err(Error::invalid_argument(
                    name,
                    format!("expected 1 argument, found {}", args.len()),
                ));
            };
            Ok(if ctx.is_nth(index) == expected {
                text.clone()
            } else {
                String::new()
            })
        })?;
    }

    methods.register(Namespace::Comp, "attr_count", |ctx, args| {
        expect_args("attr_count", args, 0)?;
        Ok(ctx.component.attributes.len().to_string())
    })?;
    methods.register(Namespace::Comp, "attr_list", attr_list)?;

    Ok(())
}

fn expect_args(function: &str, args: &[String], count: usize) -> Result<()> {
    if args.len() != count {
        return Err(Error::invalid_argument(
            function,
            format!("expected {} arguments, found {}", count, args.len()),
        ));
    }
    Ok(())
}

/// `attr_list(field, separator[, format])`: join one field of every attribute.
///
/// `format` replaces each `{}` with the field value. `default` is rendered
/// through the type renderer like `{{Attr::default}}`.
fn attr_list(ctx: &EvalContext<'_>, args: &[String]) -> Result<String> {
    let (field, separator, format) = match args {
        [field, separator] => (field, separator, None),
        [field, separator, format] => (field, separator, Some(format)),
        _ => {
            return Err(Error::invalid_argument(
                "attr_list",
                format!("expected (field, separator[, format]), found {} arguments", args.len()),
            ));
        }
    };

    let items = ctx
        .component
        .attributes
        .iter()
        .map(|attr| {
            let value = match field.as_str() {
                "default" => ctx.types.render(&attr.type_name, &attr.default)?,
                _ => match attr.field(field) {
                    Some(Value::String(s)) => s,
                    Some(other) => other.to_string(),
                    None => {
                        return Err(Error::UnknownField {
                            namespace: Namespace::Attr,
                            field: field.clone(),
                        });
                    }
                },
            };
            Ok(match format {
                Some(format) => format.replace("{}", &value),
                None => value,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(items.join(separator))
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::{
        Token,
        filter::{FilteredAttribute, FilteredComponent, FilteredSpec},
        types::TypeRenderer,
    };

    fn view() -> FilteredSpec {
        let attr = |name: &str, type_name: &str, default: Value| FilteredAttribute {
            name: name.into(),
            display_name: name.to_uppercase(),
            type_name: type_name.into(),
            default,
            custom: None,
        };
        FilteredSpec {
            components: vec![
                FilteredComponent {
                    name: "Position".into(),
                    display_name: "Position".into(),
                    attributes: vec![attr("x", "float", json!(0)), attr("y", "float", json!(1.5))],
                },
                FilteredComponent {
                    name: "Tag".into(),
                    display_name: "Tag Component".into(),
                    attributes: vec![],
                },
            ],
        }
    }

    struct Fixture {
        spec: FilteredSpec,
        types: TypeRenderer,
        methods: MethodRegistry,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                spec: view(),
                types: TypeRenderer::with_builtins().unwrap(),
                methods: MethodRegistry::with_builtins().unwrap(),
            }
        }

        fn comp(&self, index: usize, token: &str) -> Result<String> {
            let ctx = EvalContext::new(&self.spec, &self.spec.components[index], &self.types);
            self.methods.invoke(&token.parse::<Token>()?, &ctx)
        }

        fn attr(&self, index: usize, token: &str) -> Result<String> {
            let component = &self.spec.components[0];
            let ctx = EvalContext::new(&self.spec, component, &self.types)
                .with_attribute(&component.attributes[index]);
            self.methods.invoke(&token.parse::<Token>()?, &ctx)
        }
    }

    #[test]
    fn test_accessors() {
        let f = Fixture::new();
        assert_eq!(f.comp(1, "Comp::name").unwrap(), "Tag");
        assert_eq!(f.comp(1, "Comp::display_name").unwrap(), "Tag Component");
        assert_eq!(f.attr(0, "Attr::name").unwrap(), "x");
        assert_eq!(f.attr(0, "Attr::display_name").unwrap(), "X");
        assert_eq!(f.attr(1, "Attr::type").unwrap(), "float");
    }

    #[test]
    fn test_default_uses_type_renderer() {
        let f = Fixture::new();
        assert_eq!(f.attr(0, "Attr::default").unwrap(), "0.0f");
        assert_eq!(f.attr(1, "Attr::default").unwrap(), "1.5f");
    }

    #[test]
    fn test_positional_helpers_on_components() {
        let f = Fixture::new();
        assert_eq!(f.comp(0, "Comp::if_first('first')").unwrap(), "first");
        assert_eq!(f.comp(1, "Comp::if_first('first')").unwrap(), "");
        assert_eq!(f.comp(0, "Comp::if_not_first(', ')").unwrap(), "");
        assert_eq!(f.comp(1, "Comp::if_not_first(', ')").unwrap(), ", ");
        assert_eq!(f.comp(1, "Comp::if_last(';')").unwrap(), ";");
        assert_eq!(f.comp(0, "Comp::if_not_last(',')").unwrap(), ",");
    }

    #[test]
    fn test_if_nth_else() {
        let f = Fixture::new();
        assert_eq!(f.comp(1, r#"Comp::if_nth_else("1", "y", "n")"#).unwrap(), "y");
        assert_eq!(f.comp(1, r#"Comp::if_nth_else("-2", "y", "n")"#).unwrap(), "n");
        assert_eq!(f.comp(0, r#"Comp::if_nth_else("5", "y", "n")"#).unwrap(), "n");
        assert_eq!(f.attr(1, r#"Attr::if_nth_else("-1", "y", "n")"#).unwrap(), "y");
    }

    #[test]
    fn test_positional_helpers_on_attributes() {
        let f = Fixture::new();
        assert_eq!(f.attr(0, "Attr::if_not_last(',')").unwrap(), ",");
        assert_eq!(f.attr(1, "Attr::if_not_last(',')").unwrap(), "");
    }

    #[test]
    fn test_bad_arguments() {
        let f = Fixture::new();
        assert!(matches!(
            f.comp(0, r#"Comp::if_nth_else("x", "y", "n")"#),
            Err(Error::InvalidArgument { .. })
        ));
        assert!(f.comp(0, r#"Comp::if_nth_else("1", "y")"#).is_err());
        assert!(f.comp(0, "Comp::if_first").is_err());
        assert!(f.comp(0, "Comp::name('x')").is_err());
    }

    #[test]
    fn test_attr_count_and_list() {
        let f = Fixture::new();
        assert_eq!(f.comp(0, "Comp::attr_count").unwrap(), "2");
        assert_eq!(f.comp(1, "Comp::attr_count").unwrap(), "0");
        assert_eq!(f.comp(0, "Comp::attr_list('name', ', ')").unwrap(), "x, y");
        assert_eq!(
            f.comp(0, "Comp::attr_list('name', ', ', 'c.{}')").unwrap(),
            "c.x, c.y"
        );
        assert_eq!(f.comp(0, "Comp::attr_list('default', ' ')").unwrap(), "0.0f 1.5f");
        assert_eq!(f.comp(1, "Comp::attr_list('name', ', ')").unwrap(), "");
        assert!(f.comp(0, "Comp::attr_list('nope', ', ')").is_err());
    }

    #[test]
    fn test_attr_only_methods_are_not_in_comp() {
        let f = Fixture::new();
        assert!(matches!(
            f.comp(0, "Comp::default"),
            Err(Error::UnknownField { .. })
        ));
    }
}
