//! Block expansion.
//!
//! Lines outside blocks are copied through. A block runs from a
//! `DATAMATIC_BEGIN FLAG=value ...` line to the next `DATAMATIC_END` line and
//! is re-emitted once per component matching its flags. Within the block a
//! line with `Attr::` tokens, written directly or produced by a `Comp::`
//! method, is emitted once per matching attribute of that component.

use datamatic_spec::{FlagMap, Spec};
use miette::NamedSource;
use tracing::{debug, trace};

use crate::{
    Error, Namespace, Result,
    filter,
    methods::{EvalContext, MethodRegistry},
    token::{self, Located},
    types::TypeRenderer,
};

/// Opens a block.
pub const BEGIN_MARKER: &str = "DATAMATIC_BEGIN";
/// Closes a block.
pub const END_MARKER: &str = "DATAMATIC_END";

const ATTR_OPEN: &str = "{{Attr::";

#[derive(Debug, Clone, Copy)]
struct SourceLine<'s> {
    /// 1-based line number.
    number: usize,
    /// Byte offset of the line in the template.
    offset: usize,
    text: &'s str,
}

#[derive(Debug)]
struct Block<'s> {
    begin: SourceLine<'s>,
    predicate: FlagMap,
    lines: Vec<SourceLine<'s>>,
}

enum Marker<'s> {
    Begin(&'s str),
    End(&'s str),
    Text,
}

impl<'s> Marker<'s> {
    fn of(text: &'s str) -> Self {
        let trimmed = text.trim();
        let (word, rest) = trimmed
            .split_once(char::is_whitespace)
            .unwrap_or((trimmed, ""));
        match word {
            BEGIN_MARKER => Marker::Begin(rest.trim()),
            END_MARKER => Marker::End(rest.trim()),
            _ => Marker::Text,
        }
    }
}

fn source_lines(source: &str) -> impl Iterator<Item = SourceLine<'_>> {
    let mut offset = 0;
    source
        .split_inclusive('\n')
        .enumerate()
        .map(move |(index, raw)| {
            let line = SourceLine {
                number: index + 1,
                offset,
                text: raw.trim_end_matches('\n').trim_end_matches('\r'),
            };
            offset += raw.len();
            line
        })
}

/// Parse the `FLAG=true|false` words of a BEGIN marker.
fn parse_predicate(spec: &Spec, line: &str, words: &str) -> Result<FlagMap> {
    let mut predicate = FlagMap::new();

    for word in words.split_whitespace() {
        let (flag, value) = word
            .split_once('=')
            .ok_or_else(|| Error::invalid_marker(line, format!("'{word}' is not FLAG=value")))?;
        if flag.is_empty() {
            return Err(Error::invalid_marker(line, format!("'{word}' has no flag name")));
        }
        let value = match value {
            "true" => true,
            "false" => false,
            other => {
                return Err(Error::invalid_marker(
                    line,
                    format!("flag value must be true or false, found '{other}'"),
                ));
            }
        };
        if spec.uses_flags() && !spec.flag_defaults.contains_key(flag) {
            return Err(Error::UnknownFlag {
                flag: flag.to_string(),
            });
        }
        if predicate.insert(flag.to_string(), value).is_some() {
            return Err(Error::invalid_marker(line, format!("flag '{flag}' given twice")));
        }
    }

    Ok(predicate)
}

fn push_line(out: &mut String, text: &str) {
    out.push_str(text.trim_end());
    out.push('\n');
}

/// Expands templates against a spec with a fixed set of registries.
#[derive(Debug, Clone, Copy)]
pub struct Expander<'e> {
    types: &'e TypeRenderer,
    methods: &'e MethodRegistry,
}

impl<'e> Expander<'e> {
    pub fn new(types: &'e TypeRenderer, methods: &'e MethodRegistry) -> Self {
        Self { types, methods }
    }

    /// Expand a whole template held in memory.
    ///
    /// `name` is only used for error reporting. Nothing is returned unless
    /// every block expanded successfully.
    pub fn expand(&self, name: &str, source: &str, spec: &Spec) -> Result<String> {
        let at = |line: &SourceLine<'_>, err: Error| locate(name, source, line, err);
        let mut out = String::with_capacity(source.len());
        let mut block: Option<Block<'_>> = None;

        for line in source_lines(source) {
            match Marker::of(line.text) {
                Marker::Begin(words) => {
                    if block.is_some() {
                        return Err(at(&line, Error::NestedBlock));
                    }
                    let predicate = parse_predicate(spec, line.text.trim(), words)
                        .map_err(|err| at(&line, err))?;
                    block = Some(Block {
                        begin: line,
                        predicate,
                        lines: Vec::new(),
                    });
                }
                Marker::End(rest) => {
                    let Some(open) = block.take() else {
                        return Err(at(&line, Error::UnmatchedEnd));
                    };
                    if !rest.is_empty() {
                        let err = Error::invalid_marker(
                            line.text.trim(),
                            "DATAMATIC_END takes no arguments",
                        );
                        return Err(at(&line, err));
                    }
                    self.expand_block(name, source, spec, &open, &mut out)?;
                }
                Marker::Text => match block.as_mut() {
                    Some(open) => open.lines.push(line),
                    None => push_line(&mut out, line.text),
                },
            }
        }

        if let Some(open) = block {
            return Err(at(&open.begin, Error::UnterminatedBlock));
        }
        Ok(out)
    }

    fn expand_block(
        &self,
        name: &str,
        source: &str,
        spec: &Spec,
        block: &Block<'_>,
        out: &mut String,
    ) -> Result<()> {
        // Tokens are parsed up front so malformed ones fail even if no component matches
        let parsed = block
            .lines
            .iter()
            .map(|line| {
                token::scan(line.text)
                    .map(|tokens| (line, tokens))
                    .map_err(|err| locate(name, source, line, err))
            })
            .collect::<Result<Vec<_>>>()?;

        let view = filter::apply(spec, &block.predicate);
        debug!(
            template = name,
            line = block.begin.number,
            flags = ?block.predicate,
            components = view.components.len(),
            "expanding block"
        );

        for component in &view.components {
            let ctx = EvalContext::new(&view, component, self.types);
            for (line, tokens) in &parsed {
                self.expand_line(&ctx, line.text, tokens, out)
                    .map_err(|err| locate(name, source, line, err))?;
            }
        }
        Ok(())
    }

    fn expand_line(
        &self,
        ctx: &EvalContext<'_>,
        text: &str,
        tokens: &[Located],
        out: &mut String,
    ) -> Result<()> {
        if tokens.is_empty() {
            push_line(out, text);
            return Ok(());
        }

        // Comp tokens render once per component, before any attribute
        let comp_values = tokens
            .iter()
            .map(|located| match located.token.namespace {
                Namespace::Comp => self.methods.invoke(&located.token, ctx).map(Some),
                Namespace::Attr => Ok(None),
            })
            .collect::<Result<Vec<_>>>()?;

        let has_attr = comp_values.iter().any(Option::is_none);
        let spawns_attr = comp_values.iter().flatten().any(|v| v.contains(ATTR_OPEN));
        if !has_attr && !spawns_attr {
            let rendered = token::replace(text, tokens, |i, _| {
                Ok(comp_values[i].clone().unwrap_or_default())
            })?;
            push_rendered(out, &rendered);
            return Ok(());
        }

        // Comp values in place, Attr tokens kept as written, then rescanned so
        // Attr tokens produced by Comp methods expand too
        let line = token::replace(text, tokens, |i, _| match &comp_values[i] {
            Some(value) => Ok(value.clone()),
            None => Ok(text[tokens[i].range.clone()].to_string()),
        })?;
        let attr_tokens = token::scan(&line)?;

        for attribute in &ctx.component.attributes {
            let attr_ctx = ctx.with_attribute(attribute);
            let rendered = token::replace(&line, &attr_tokens, |i, token| match token.namespace {
                Namespace::Attr => self.methods.invoke(token, &attr_ctx),
                Namespace::Comp => Ok(line[attr_tokens[i].range.clone()].to_string()),
            })?;
            push_rendered(out, &rendered);
        }
        Ok(())
    }
}

/// Emit a substituted line unless it rendered to whitespace only.
fn push_rendered(out: &mut String, rendered: &str) {
    if rendered.trim().is_empty() {
        trace!("dropping line that rendered empty");
        return;
    }
    push_line(out, rendered);
}

/// Attach the template location to an error.
fn locate(name: &str, source: &str, line: &SourceLine<'_>, err: Error) -> Error {
    Error::Template {
        path: name.to_string(),
        line: line.number,
        src: NamedSource::new(name, source.to_string()),
        span: (line.offset, line.text.len()).into(),
        source: Box::new(err),
    }
}
