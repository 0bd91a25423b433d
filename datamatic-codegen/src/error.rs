use std::path::PathBuf;

use miette::{Diagnostic, NamedSource, SourceSpan};
use thiserror::Error;

use crate::Namespace;

/// Result type for expansion operations
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Errors raised while building registries or expanding templates.
///
/// Registration errors surface from [`EngineBuilder::build`](crate::EngineBuilder::build)
/// before any template is read; everything else surfaces per template.
#[derive(Debug, Error, Diagnostic)]
pub enum Error {
    #[error("'{pattern}' already has a registered type renderer")]
    #[diagnostic(code(datamatic::duplicate_type))]
    DuplicatePattern { pattern: String },

    #[error("invalid type pattern '{pattern}': {reason}")]
    #[diagnostic(code(datamatic::invalid_pattern))]
    InvalidPattern { pattern: String, reason: String },

    #[error("an implementation already exists for {namespace}::{name}")]
    #[diagnostic(code(datamatic::duplicate_method))]
    DuplicateMethod { namespace: Namespace, name: String },

    #[error("'{name}' cannot be registered for {namespace}, tokens could never reach it")]
    #[diagnostic(
        code(datamatic::invalid_method_name),
        help("method names are identifiers, optionally joined by '.'")
    )]
    InvalidMethodName { namespace: Namespace, name: String },

    #[error("invalid token '{raw}': {reason}")]
    #[diagnostic(
        code(datamatic::invalid_token),
        help("tokens look like {{{{Comp::name}}}} or {{{{Attr::if_not_last(\",\")}}}}")
    )]
    InvalidToken { raw: String, reason: String },

    #[error("unknown namespace '{namespace}' in token '{raw}'")]
    #[diagnostic(code(datamatic::unknown_namespace), help("valid namespaces are: Comp, Attr"))]
    UnknownNamespace { namespace: String, raw: String },

    #[error("invalid block marker '{line}': {reason}")]
    #[diagnostic(
        code(datamatic::invalid_marker),
        help("open blocks with `DATAMATIC_BEGIN FLAG=true|false ...`, close with `DATAMATIC_END`")
    )]
    InvalidMarker { line: String, reason: String },

    #[error("tried to begin a datamatic block while in another, blocks cannot be nested")]
    #[diagnostic(code(datamatic::nested_block))]
    NestedBlock,

    #[error("datamatic block is never closed")]
    #[diagnostic(code(datamatic::unterminated_block), help("add a DATAMATIC_END line"))]
    UnterminatedBlock,

    #[error("DATAMATIC_END without a matching DATAMATIC_BEGIN")]
    #[diagnostic(code(datamatic::unmatched_end))]
    UnmatchedEnd,

    #[error("block filters on undeclared flag '{flag}'")]
    #[diagnostic(
        code(datamatic::unknown_flag),
        help("declare '{flag}' in the spec's \"flag_defaults\" mapping")
    )]
    UnknownFlag { flag: String },

    #[error("invalid type list '{list}'")]
    #[diagnostic(code(datamatic::invalid_type_list), help("brackets must be balanced"))]
    InvalidTypeList { list: String },

    #[error("no renderer registered for type '{type_name}'")]
    #[diagnostic(code(datamatic::unresolved_type))]
    UnresolvedType { type_name: String },

    #[error("{value} is not renderable as '{type_name}': {reason}")]
    #[diagnostic(code(datamatic::type_mismatch))]
    TypeMismatch {
        type_name: String,
        value: String,
        reason: String,
    },

    #[error("{value} is not renderable as any alternative of '{type_name}'")]
    #[diagnostic(code(datamatic::no_alternative))]
    NoAlternative {
        type_name: String,
        value: String,
        #[related]
        attempts: Vec<Error>,
    },

    #[error("{namespace} has no field '{field}'")]
    #[diagnostic(
        code(datamatic::unknown_field),
        help("register a custom method for {namespace}::{field} or use an existing field")
    )]
    UnknownField { namespace: Namespace, field: String },

    #[error("invalid arguments to {function}: {reason}")]
    #[diagnostic(code(datamatic::invalid_argument))]
    InvalidArgument { function: String, reason: String },

    #[error("default value of {component}.{attribute} is not a valid '{type_name}'")]
    #[diagnostic(code(datamatic::invalid_default))]
    InvalidDefault {
        component: String,
        attribute: String,
        type_name: String,
        #[source]
        source: Box<Error>,
    },

    #[error("{path}:{line}: {source}")]
    #[diagnostic(code(datamatic::template_error))]
    Template {
        path: String,
        line: usize,
        #[source_code]
        src: NamedSource<String>,
        #[label("here")]
        span: SourceSpan,
        #[source]
        source: Box<Error>,
    },

    #[error("'{}' is not a template file (expected '.dm.' in its name)", .path.display())]
    #[diagnostic(code(datamatic::not_a_template))]
    NotATemplate { path: PathBuf },

    #[error("failed to read template '{}'", .path.display())]
    #[diagnostic(code(datamatic::io))]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl Error {
    /// A value failed the shape check of a type renderer.
    pub fn mismatch(
        type_name: impl Into<String>,
        value: &serde_json::Value,
        reason: impl Into<String>,
    ) -> Self {
        Error::TypeMismatch {
            type_name: type_name.into(),
            value: value.to_string(),
            reason: reason.into(),
        }
    }

    /// A method was called with arguments it cannot use.
    pub fn invalid_argument(function: impl Into<String>, reason: impl Into<String>) -> Self {
        Error::InvalidArgument {
            function: function.into(),
            reason: reason.into(),
        }
    }

    /// A token could not be parsed.
    pub fn invalid_token(raw: impl Into<String>, reason: impl Into<String>) -> Self {
        Error::InvalidToken {
            raw: raw.into(),
            reason: reason.into(),
        }
    }

    /// A BEGIN/END marker line could not be parsed.
    pub fn invalid_marker(line: impl Into<String>, reason: impl Into<String>) -> Self {
        Error::InvalidMarker {
            line: line.into(),
            reason: reason.into(),
        }
    }

    /// Whether this error was raised while building the registries.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            Error::DuplicatePattern { .. }
                | Error::InvalidPattern { .. }
                | Error::DuplicateMethod { .. }
                | Error::InvalidMethodName { .. }
        )
    }
}
