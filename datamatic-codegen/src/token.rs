//! Inline `{{Namespace::function(args)}}` tokens.
//!
//! ```text
//! token     = "{{" namespace "::" function [ "(" [ arg { "," arg } ] ")" ] "}}"
//! namespace = "Comp" | "Attr"
//! function  = ident { "." ident }
//! arg       = literal { literal }          ; adjacent literals concatenate
//! literal   = '"' ... '"' | "'" ... "'"
//! ```

use std::{fmt, ops::Range, str::FromStr};

use crate::{Error, Result};

const OPEN: &str = "{{";
const CLOSE: &str = "}}";
const SEPARATOR: &str = "::";

/// The object a token is evaluated against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Namespace {
    /// The current component.
    Comp,
    /// The current attribute of the current component.
    Attr,
}

impl Namespace {
    pub fn as_str(&self) -> &'static str {
        match self {
            Namespace::Comp => "Comp",
            Namespace::Attr => "Attr",
        }
    }
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Namespace {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "Comp" => Ok(Namespace::Comp),
            "Attr" => Ok(Namespace::Attr),
            other => Err(Error::UnknownNamespace {
                namespace: other.to_string(),
                raw: s.to_string(),
            }),
        }
    }
}

/// A parsed token.
///
/// Equality ignores surface syntax: `{{Comp::name}}` and `{{Comp::name()}}`
/// are the same token, as are `("ab")` and `("a" 'b')`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Token {
    pub namespace: Namespace,
    pub function_name: String,
    pub args: Vec<String>,
}

impl Token {
    pub fn new(namespace: Namespace, function_name: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            namespace,
            function_name: function_name.into(),
            args,
        }
    }

    /// Parse the text between `{{` and `}}`.
    fn parse_inner(raw: &str) -> Result<Self> {
        let inner = raw.trim();
        let (namespace, rest) = inner
            .split_once(SEPARATOR)
            .ok_or_else(|| Error::invalid_token(raw, "expected 'Namespace::function'"))?;
        let namespace = namespace.parse::<Namespace>().map_err(|_| Error::UnknownNamespace {
            namespace: namespace.to_string(),
            raw: raw.to_string(),
        })?;

        let (function_name, args) = match rest.find('(') {
            Some(open) => (&rest[..open], parse_args(raw, &rest[open + 1..])?),
            None => (rest, Vec::new()),
        };
        validate_function_name(raw, function_name)?;

        Ok(Token::new(namespace, function_name, args))
    }
}

impl FromStr for Token {
    type Err = Error;

    /// Parse a token with or without its surrounding braces.
    fn from_str(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        let inner = trimmed
            .strip_prefix(OPEN)
            .and_then(|t| t.strip_suffix(CLOSE))
            .unwrap_or(trimmed);
        Token::parse_inner(inner)
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{OPEN}{}{SEPARATOR}{}", self.namespace, self.function_name)?;
        if !self.args.is_empty() {
            let args: Vec<String> = self.args.iter().map(|a| quote_arg(a)).collect();
            write!(f, "({})", args.join(", "))?;
        }
        f.write_str(CLOSE)
    }
}

fn quote_arg(arg: &str) -> String {
    let mut out = String::with_capacity(arg.len() + 2);
    out.push('"');
    for c in arg.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            _ => out.push(c),
        }
    }
    out.push('"');
    out
}

fn is_ident(segment: &str) -> bool {
    let mut chars = segment.chars();
    chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Whether `name` can appear as the function part of a token.
pub(crate) fn is_function_name(name: &str) -> bool {
    name.split('.').all(is_ident)
}

fn validate_function_name(raw: &str, name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(Error::invalid_token(raw, "missing function name"));
    }
    if !is_function_name(name) {
        return Err(Error::invalid_token(
            raw,
            format!("'{name}' is not a valid function name"),
        ));
    }
    Ok(())
}

/// Parse the argument list following `(`, up to and including `)`.
fn parse_args(raw: &str, text: &str) -> Result<Vec<String>> {
    let mut chars = text.char_indices().peekable();
    let mut args = Vec::new();
    let mut expecting = false;

    loop {
        while chars.next_if(|(_, c)| c.is_whitespace()).is_some() {}

        match chars.peek().copied() {
            None => return Err(Error::invalid_token(raw, "missing ')'")),
            Some((_, ')')) if !expecting => {
                chars.next();
                break;
            }
            Some((_, ')')) => return Err(Error::invalid_token(raw, "trailing comma")),
            Some((_, ',')) => return Err(Error::invalid_token(raw, "empty argument")),
            Some((_, '"' | '\'')) => {}
            Some((i, _)) => {
                return Err(Error::invalid_token(
                    raw,
                    format!("unquoted argument at '{}'", &text[i..]),
                ));
            }
        }

        // One or more adjacent literals form a single argument
        let mut arg = String::new();
        while let Some((start, quote)) = chars.next_if(|(_, c)| *c == '"' || *c == '\'') {
            let mut closed = false;
            while let Some((_, c)) = chars.next() {
                match c {
                    '\\' => match chars.next() {
                        Some((_, 'n')) => arg.push('\n'),
                        Some((_, 't')) => arg.push('\t'),
                        Some((_, escaped @ ('\\' | '"' | '\''))) => arg.push(escaped),
                        Some((_, other)) => {
                            arg.push('\\');
                            arg.push(other);
                        }
                        None => break,
                    },
                    c if c == quote => {
                        closed = true;
                        break;
                    }
                    c => arg.push(c),
                }
            }
            if !closed {
                return Err(Error::invalid_token(
                    raw,
                    format!("unterminated string {}", &text[start..]),
                ));
            }
            while chars.next_if(|(_, c)| c.is_whitespace()).is_some() {}
        }
        args.push(arg);

        match chars.next() {
            Some((_, ',')) => expecting = true,
            Some((_, ')')) => break,
            Some((i, _)) => {
                return Err(Error::invalid_token(
                    raw,
                    format!("expected ',' or ')' at '{}'", &text[i..]),
                ));
            }
            None => return Err(Error::invalid_token(raw, "missing ')'")),
        }
    }

    if let Some((i, _)) = chars.find(|(_, c)| !c.is_whitespace()) {
        return Err(Error::invalid_token(
            raw,
            format!("unexpected '{}' after ')'", &text[i..]),
        ));
    }
    Ok(args)
}

/// A token found in a line, with its byte range including the braces.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Located {
    pub token: Token,
    pub range: Range<usize>,
}

/// Length of a `Ident::` prefix at the start of `text`, if there is one.
fn namespace_prefix(text: &str) -> Option<usize> {
    let ident = text
        .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
        .unwrap_or(text.len());
    (ident > 0 && is_ident(&text[..ident]) && text[ident..].starts_with(SEPARATOR))
        .then_some(ident)
}

/// Find the `}}` that closes a token body, skipping quoted text.
fn find_close(body: &str) -> Option<usize> {
    let mut quote = None;
    let mut escaped = false;
    for (i, c) in body.char_indices() {
        match quote {
            Some(_) if escaped => escaped = false,
            Some(_) if c == '\\' => escaped = true,
            Some(q) if c == q => quote = None,
            Some(_) => {}
            None if c == '"' || c == '\'' => quote = Some(c),
            None if body[i..].starts_with(CLOSE) => return Some(i),
            None => {}
        }
    }
    None
}

/// Find every token in `line`.
///
/// Only `{{` directly followed by `Ident::` starts a token, so other uses of
/// double braces pass through untouched.
pub fn scan(line: &str) -> Result<Vec<Located>> {
    let mut found = Vec::new();
    let mut cursor = 0;

    while let Some(offset) = line[cursor..].find(OPEN) {
        let start = cursor + offset;
        let body_start = start + OPEN.len();
        let body = &line[body_start..];

        if namespace_prefix(body).is_none() {
            cursor = body_start;
            continue;
        }

        let close = find_close(body)
            .ok_or_else(|| Error::invalid_token(&line[start..], "missing closing '}}'"))?;
        let end = body_start + close + CLOSE.len();
        found.push(Located {
            token: Token::parse_inner(&body[..close])?,
            range: start..end,
        });
        cursor = end;
    }

    Ok(found)
}

/// Rebuild `line` with every located token replaced by `render(index, token)`.
///
/// `tokens` must come from [`scan`] on the same line. Rendered text is not
/// scanned again.
pub fn replace<F>(line: &str, tokens: &[Located], mut render: F) -> Result<String>
where
    F: FnMut(usize, &Token) -> Result<String>,
{
    let mut out = String::with_capacity(line.len());
    let mut last = 0;

    for (index, located) in tokens.iter().enumerate() {
        out.push_str(&line[last..located.range.start]);
        out.push_str(&render(index, &located.token)?);
        last = located.range.end;
    }
    out.push_str(&line[last..]);

    Ok(out)
}
