//! Built-in C++ type renderers.

use serde_json::Value;

use super::TypeRenderer;
use crate::{
    Error, Result,
    pattern::canonical_type,
};

/// Integer types and their inclusive value ranges.
const INTEGERS: &[(&str, i128, i128)] = &[
    ("int", i32::MIN as i128, i32::MAX as i128),
    ("unsigned", 0, u32::MAX as i128),
    ("long", i64::MIN as i128, i64::MAX as i128),
    ("std::size_t", 0, u64::MAX as i128),
    ("std::int8_t", i8::MIN as i128, i8::MAX as i128),
    ("std::int16_t", i16::MIN as i128, i16::MAX as i128),
    ("std::int32_t", i32::MIN as i128, i32::MAX as i128),
    ("std::int64_t", i64::MIN as i128, i64::MAX as i128),
    ("std::uint8_t", 0, u8::MAX as i128),
    ("std::uint16_t", 0, u16::MAX as i128),
    ("std::uint32_t", 0, u32::MAX as i128),
    ("std::uint64_t", 0, u64::MAX as i128),
];

const SEQUENCES: &[&str] = &[
    "std::vector<{}>",
    "std::list<{}>",
    "std::deque<{}>",
    "std::forward_list<{}>",
    "std::set<{}>",
    "std::multiset<{}>",
    "std::unordered_set<{}>",
    "std::unordered_multiset<{}>",
];

const MAPS: &[&str] = &[
    "std::map<{}...>",
    "std::multimap<{}...>",
    "std::unordered_map<{}...>",
    "std::unordered_multimap<{}...>",
];

/// Register every built-in type on `types`.
pub fn register_builtin_types(types: &mut TypeRenderer) -> Result<()> {
    for &(name, min, max) in INTEGERS {
        types.register(name, move |_, ty, _, value| render_integer(ty, value, min, max))?;
    }
    types.register("float", |_, ty, _, value| Ok(format!("{}f", render_floating(ty, value)?)))?;
    types.register("double", |_, ty, _, value| render_floating(ty, value))?;
    types.register("bool", |_, ty, _, value| match value {
        Value::Bool(b) => Ok(b.to_string()),
        _ => Err(Error::mismatch(ty, value, "expected true or false")),
    })?;
    types.register("char", |_, ty, _, value| render_char(ty, value))?;
    for name in ["std::string", "std::string_view"] {
        types.register(name, |_, ty, _, value| match value {
            Value::String(s) => Ok(quote(s)),
            _ => Err(Error::mismatch(ty, value, "expected a string")),
        })?;
    }

    for pattern in SEQUENCES {
        types.register(pattern, render_sequence)?;
    }
    for pattern in MAPS {
        types.register(pattern, render_map)?;
    }
    types.register("std::array<{}...>", render_array)?;
    types.register("std::pair<{}...>", render_pair)?;
    types.register("std::tuple<{}...>", render_tuple)?;
    types.register("std::variant<{}...>", render_variant)?;

    types.register("std::optional<{}>", |types, ty, args, value| {
        if value.is_null() {
            return Ok("std::nullopt".to_string());
        }
        Ok(format!("{}{{{}}}", canonical_type(ty), types.render(&args[0], value)?))
    })?;
    for (pattern, factory) in [
        ("std::unique_ptr<{}>", "std::make_unique"),
        ("std::shared_ptr<{}>", "std::make_shared"),
    ] {
        types.register(pattern, move |types, _, args, value| {
            if value.is_null() {
                return Ok("nullptr".to_string());
            }
            Ok(format!(
                "{}<{}>({})",
                factory,
                canonical_type(&args[0]),
                types.render(&args[0], value)?
            ))
        })?;
    }
    types.register("std::weak_ptr<{}>", render_empty)?;
    types.register("std::any", render_empty)?;
    types.register("std::monostate", render_empty)?;
    types.register("std::function<{}>", |_, ty, _, value| match value {
        Value::String(s) => Ok(s.clone()),
        _ => Err(Error::mismatch(ty, value, "expected the callable's source text as a string")),
    })?;

    Ok(())
}

fn render_integer(ty: &str, value: &Value, min: i128, max: i128) -> Result<String> {
    let n = value
        .as_i64()
        .map(i128::from)
        .or_else(|| value.as_u64().map(i128::from))
        .ok_or_else(|| Error::mismatch(ty, value, "expected an integer"))?;
    if min == 0 && n < 0 {
        return Err(Error::mismatch(ty, value, "expected a non-negative integer"));
    }
    if n < min || n > max {
        return Err(Error::mismatch(ty, value, format!("out of range [{min}, {max}]")));
    }
    Ok(n.to_string())
}

/// A floating-point numeral that always contains a decimal point.
fn render_floating(ty: &str, value: &Value) -> Result<String> {
    let Value::Number(number) = value else {
        return Err(Error::mismatch(ty, value, "expected a number"));
    };
    if let Some(n) = number.as_i64() {
        return Ok(format!("{n}.0"));
    }
    if let Some(n) = number.as_u64() {
        return Ok(format!("{n}.0"));
    }
    let f = number
        .as_f64()
        .ok_or_else(|| Error::mismatch(ty, value, "expected a number"))?;

    let text = format!("{f:?}");
    if text.contains('.') {
        return Ok(text);
    }
    Ok(match text.find('e') {
        Some(pos) => format!("{}.0{}", &text[..pos], &text[pos..]),
        None => format!("{text}.0"),
    })
}

fn render_char(ty: &str, value: &Value) -> Result<String> {
    let c = value
        .as_str()
        .and_then(|s| {
            let mut chars = s.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => Some(c),
                _ => None,
            }
        })
        .ok_or_else(|| Error::mismatch(ty, value, "expected a single-character string"))?;
    Ok(match c {
        '\'' => "'\\''".to_string(),
        _ => format!("'{}'", escape_char(c).unwrap_or_else(|| c.to_string())),
    })
}

fn escape_char(c: char) -> Option<String> {
    match c {
        '\\' => Some("\\\\".to_string()),
        '\n' => Some("\\n".to_string()),
        '\t' => Some("\\t".to_string()),
        '\r' => Some("\\r".to_string()),
        _ => None,
    }
}

/// Double-quote a string, escaping backslashes, quotes and control whitespace.
pub(crate) fn quote(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            _ => match escape_char(c) {
                Some(escaped) => out.push_str(&escaped),
                None => out.push(c),
            },
        }
    }
    out.push('"');
    out
}

fn expect_list<'v>(ty: &str, value: &'v Value) -> Result<&'v Vec<Value>> {
    value
        .as_array()
        .ok_or_else(|| Error::mismatch(ty, value, "expected a list"))
}

fn expect_arity(ty: &str, args: &[String], arity: usize, value: &Value) -> Result<()> {
    if args.len() != arity {
        return Err(Error::mismatch(
            ty,
            value,
            format!("expected {} type parameters, found {}", arity, args.len()),
        ));
    }
    Ok(())
}

fn render_each<'a>(
    types: &TypeRenderer,
    pairs: impl IntoIterator<Item = (&'a str, &'a Value)>,
) -> Result<Vec<String>> {
    pairs
        .into_iter()
        .map(|(ty, value)| types.render(ty, value))
        .collect()
}

fn braced(ty: &str, items: &[String]) -> String {
    format!("{}{{{}}}", canonical_type(ty), items.join(", "))
}

fn render_sequence(
    types: &TypeRenderer,
    ty: &str,
    args: &[String],
    value: &Value,
) -> Result<String> {
    let items = expect_list(ty, value)?;
    let rendered = render_each(types, items.iter().map(|v| (args[0].as_str(), v)))?;
    Ok(braced(ty, &rendered))
}

fn render_array(types: &TypeRenderer, ty: &str, args: &[String], value: &Value) -> Result<String> {
    expect_arity(ty, args, 2, value)?;
    let size: usize = args[1]
        .parse()
        .ok()
        .filter(|_| args[1].chars().all(|c| c.is_ascii_digit()))
        .ok_or_else(|| {
            let reason = format!("array size '{}' is not a decimal integer", args[1]);
            Error::mismatch(ty, value, reason)
        })?;

    let items = expect_list(ty, value)?;
    if items.len() != size {
        return Err(Error::mismatch(
            ty,
            value,
            format!("expected {} elements, found {}", size, items.len()),
        ));
    }
    let rendered = render_each(types, items.iter().map(|v| (args[0].as_str(), v)))?;
    Ok(braced(ty, &rendered))
}

fn render_pair(types: &TypeRenderer, ty: &str, args: &[String], value: &Value) -> Result<String> {
    expect_arity(ty, args, 2, value)?;
    let items = expect_list(ty, value)?;
    if items.len() != 2 {
        return Err(Error::mismatch(ty, value, "expected a list of exactly 2 elements"));
    }
    let rendered = render_each(types, args.iter().map(String::as_str).zip(items))?;
    Ok(braced(ty, &rendered))
}

fn render_tuple(types: &TypeRenderer, ty: &str, args: &[String], value: &Value) -> Result<String> {
    let items = expect_list(ty, value)?;
    if items.len() != args.len() {
        return Err(Error::mismatch(
            ty,
            value,
            format!("expected {} elements, found {}", args.len(), items.len()),
        ));
    }
    let rendered = render_each(types, args.iter().map(String::as_str).zip(items))?;
    Ok(braced(ty, &rendered))
}

fn render_map(types: &TypeRenderer, ty: &str, args: &[String], value: &Value) -> Result<String> {
    expect_arity(ty, args, 2, value)?;
    let (key_type, value_type) = (&args[0], &args[1]);

    let entries = match value {
        Value::Object(map) => map
            .iter()
            .map(|(k, v)| Ok((render_key(types, key_type, k)?, types.render(value_type, v)?)))
            .collect::<Result<Vec<_>>>()?,
        Value::Array(items) => items
            .iter()
            .map(|item| match item.as_array().map(Vec::as_slice) {
                Some([k, v]) => Ok((types.render(key_type, k)?, types.render(value_type, v)?)),
                _ => Err(Error::mismatch(ty, item, "expected a [key, value] pair")),
            })
            .collect::<Result<Vec<_>>>()?,
        _ => return Err(Error::mismatch(ty, value, "expected an object or a list of pairs")),
    };

    let entries: Vec<String> = entries
        .into_iter()
        .map(|(k, v)| format!("{{{k}, {v}}}"))
        .collect();
    Ok(braced(ty, &entries))
}

/// Object keys are always strings; fall back to reading them as JSON literals.
fn render_key(types: &TypeRenderer, key_type: &str, key: &str) -> Result<String> {
    match types.render(key_type, &Value::String(key.to_string())) {
        Ok(rendered) => Ok(rendered),
        Err(err) => match serde_json::from_str::<Value>(key) {
            Ok(literal) => types.render(key_type, &literal),
            Err(_) => Err(err),
        },
    }
}

fn render_variant(
    types: &TypeRenderer,
    ty: &str,
    args: &[String],
    value: &Value,
) -> Result<String> {
    let mut attempts = Vec::with_capacity(args.len());
    for alternative in args {
        match types.render(alternative, value) {
            Ok(rendered) => return Ok(rendered),
            Err(err) => attempts.push(err),
        }
    }
    Err(Error::NoAlternative {
        type_name: canonical_type(ty),
        value: value.to_string(),
        attempts,
    })
}

fn render_empty(_: &TypeRenderer, ty: &str, _: &[String], value: &Value) -> Result<String> {
    if !value.is_null() {
        return Err(Error::mismatch(ty, value, "only null is accepted"));
    }
    Ok(format!("{}{{}}", canonical_type(ty)))
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn render(ty: &str, value: Value) -> Result<String> {
        TypeRenderer::with_builtins().unwrap().render(ty, &value)
    }

    #[test]
    fn test_integers() {
        assert_eq!(render("int", json!(5)).unwrap(), "5");
        assert_eq!(render("int", json!(-5)).unwrap(), "-5");
        assert_eq!(render("std::uint64_t", json!(u64::MAX)).unwrap(), u64::MAX.to_string());
        assert!(render("int", json!(5.5)).is_err());
        assert!(render("int", json!(true)).is_err());
        assert!(render("unsigned", json!(-1)).is_err());
        assert!(render("std::int8_t", json!(200)).is_err());
    }

    #[test]
    fn test_floats_always_have_a_decimal_point() {
        assert_eq!(render("float", json!(5)).unwrap(), "5.0f");
        assert_eq!(render("float", json!(0.0)).unwrap(), "0.0f");
        assert_eq!(render("float", json!(1.5)).unwrap(), "1.5f");
        assert_eq!(render("double", json!(-2)).unwrap(), "-2.0");
        assert_eq!(render("double", json!(1e300)).unwrap(), "1.0e300");
        assert!(render("float", json!("1.0")).is_err());
        assert!(render("double", json!(false)).is_err());
    }

    #[test]
    fn test_bool_is_strict() {
        assert_eq!(render("bool", json!(true)).unwrap(), "true");
        assert_eq!(render("bool", json!(false)).unwrap(), "false");
        assert!(render("bool", json!(1)).is_err());
        assert!(render("bool", json!("true")).is_err());
    }

    #[test]
    fn test_strings_and_chars() {
        assert_eq!(render("std::string", json!("hi")).unwrap(), "\"hi\"");
        assert_eq!(
            render("std::string", json!("say \"hi\"\n")).unwrap(),
            r#""say \"hi\"\n""#
        );
        assert_eq!(render("char", json!("a")).unwrap(), "'a'");
        assert_eq!(render("char", json!("'")).unwrap(), r"'\''");
        assert!(render("char", json!("ab")).is_err());
        assert!(render("std::string", json!(1)).is_err());
    }

    #[test]
    fn test_sequences() {
        assert_eq!(
            render("std::vector<int>", json!([1, 2, 3])).unwrap(),
            "std::vector<int>{1, 2, 3}"
        );
        assert_eq!(render("std::set<int>", json!([])).unwrap(), "std::set<int>{}");
        assert_eq!(
            render("std::vector<std::vector<float>>", json!([[1], []])).unwrap(),
            "std::vector<std::vector<float>>{std::vector<float>{1.0f}, std::vector<float>{}}"
        );
        assert!(render("std::vector<int>", json!(1)).is_err());
        assert!(render("std::vector<int>", json!([1, "a"])).is_err());
    }

    #[test]
    fn test_array_size_must_match() {
        assert_eq!(
            render("std::array<int,5>", json!([1, 2, 3, 4, 5])).unwrap(),
            "std::array<int, 5>{1, 2, 3, 4, 5}"
        );
        assert!(render("std::array<int,5>", json!([1, 2, 3, 4])).is_err());
        assert!(render("std::array<int,5>", json!([1, 2, 3, 4, 5, 6])).is_err());
        assert!(render("std::array<int, N>", json!([])).is_err());
        assert!(render("std::array<int>", json!([])).is_err());
    }

    #[test]
    fn test_pair() {
        assert_eq!(
            render("std::pair<int, std::string>", json!([1, "a"])).unwrap(),
            "std::pair<int, std::string>{1, \"a\"}"
        );
        assert!(render("std::pair<int, int>", json!([1])).is_err());

        let err = render("std::pair<int, int, int>", json!([1, 2, 3])).unwrap_err();
        assert!(matches!(err, Error::TypeMismatch { .. }), "{err}");
        assert!(!err.is_configuration());
    }

    #[test]
    fn test_map_from_pairs_and_object() {
        let from_pairs = render("std::map<int, bool>", json!([[1, true], [2, false]])).unwrap();
        let from_object = render("std::map<int,bool>", json!({"1": true, "2": false})).unwrap();
        assert_eq!(from_pairs, "std::map<int, bool>{{1, true}, {2, false}}");
        assert_eq!(from_pairs, from_object);

        assert_eq!(
            render("std::unordered_map<std::string, int>", json!({"a": 1})).unwrap(),
            "std::unordered_map<std::string, int>{{\"a\", 1}}"
        );
        assert!(render("std::map<int, int>", json!([[1, 2, 3]])).is_err());
        assert!(render("std::map<int, int>", json!({"x": 1})).is_err());
    }

    #[test]
    fn test_optional() {
        assert_eq!(render("std::optional<int>", json!(null)).unwrap(), "std::nullopt");
        assert_eq!(render("std::optional<int>", json!(4)).unwrap(), "std::optional<int>{4}");
        assert!(render("std::optional<int>", json!("x")).is_err());
    }

    #[test]
    fn test_pointers() {
        assert_eq!(render("std::unique_ptr<int>", json!(null)).unwrap(), "nullptr");
        assert_eq!(
            render("std::unique_ptr<int>", json!(3)).unwrap(),
            "std::make_unique<int>(3)"
        );
        assert_eq!(
            render("std::shared_ptr<std::vector<int>>", json!([1])).unwrap(),
            "std::make_shared<std::vector<int>>(std::vector<int>{1})"
        );
        assert_eq!(render("std::weak_ptr<int>", json!(null)).unwrap(), "std::weak_ptr<int>{}");
        assert!(render("std::weak_ptr<int>", json!(1)).is_err());
    }

    #[test]
    fn test_null_only_types() {
        assert_eq!(render("std::any", json!(null)).unwrap(), "std::any{}");
        assert_eq!(render("std::monostate", json!(null)).unwrap(), "std::monostate{}");
        assert!(render("std::any", json!(0)).is_err());
    }

    #[test]
    fn test_tuple_length_must_match() {
        assert_eq!(
            render("std::tuple<int, bool, float>", json!([1, true, 2])).unwrap(),
            "std::tuple<int, bool, float>{1, true, 2.0f}"
        );
        assert_eq!(render("std::tuple<>", json!([])).unwrap(), "std::tuple<>{}");
        assert!(render("std::tuple<int, int>", json!([1])).is_err());
    }

    #[test]
    fn test_variant_first_match_wins() {
        assert_eq!(render("std::variant<int,std::string>", json!("hi")).unwrap(), "\"hi\"");
        assert_eq!(render("std::variant<int,std::string>", json!(3)).unwrap(), "3");
        assert_eq!(render("std::variant<float, int>", json!(3)).unwrap(), "3.0f");
        assert_eq!(render("std::variant<int, float>", json!(3)).unwrap(), "3");
    }

    #[test]
    fn test_variant_collects_attempts() {
        let err = render("std::variant<int, bool>", json!("x")).unwrap_err();
        match err {
            Error::NoAlternative { attempts, .. } => assert_eq!(attempts.len(), 2),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_function_passes_source_through() {
        assert_eq!(
            render(
                "std::function<int(bool, float)>",
                json!("[](bool, float) { return 0; }")
            )
            .unwrap(),
            "[](bool, float) { return 0; }"
        );
        assert!(render("std::function<void()>", json!(null)).is_err());
    }

    #[test]
    fn test_unknown_type() {
        assert!(matches!(
            render("Maths::vec3", json!([0, 0, 0])),
            Err(Error::UnresolvedType { .. })
        ));
    }
}
