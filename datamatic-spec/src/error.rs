use std::path::PathBuf;

use miette::{Diagnostic, NamedSource, SourceSpan};
use thiserror::Error;

/// Result type for specification operations (boxed to reduce size on stack)
pub type Result<T> = std::result::Result<T, Box<Error>>;

#[derive(Debug, Error, Diagnostic)]
pub enum Error {
    #[error("failed to read '{path}'")]
    #[diagnostic(
        code(datamatic::io),
        help("pass the path to the component spec with --spec")
    )]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse component spec")]
    #[diagnostic(code(datamatic::parse_error))]
    Parse {
        #[source_code]
        src: NamedSource<String>,
        #[label("parse error here")]
        span: Option<SourceSpan>,
        #[source]
        source: serde_json::Error,
    },

    #[error("unknown flag '{flag}' on {owner}")]
    #[diagnostic(
        code(datamatic::unknown_flag),
        help("declare '{flag}' in the top-level \"flag_defaults\" mapping")
    )]
    UnknownFlag {
        #[source_code]
        src: NamedSource<String>,
        #[label("flag not declared in flag_defaults")]
        span: Option<SourceSpan>,
        flag: String,
        owner: String,
    },

    #[error("duplicate {kind} name '{name}'")]
    #[diagnostic(
        code(datamatic::duplicate_name),
        help("{kind} names must be unique{scope}")
    )]
    DuplicateName {
        #[source_code]
        src: NamedSource<String>,
        #[label("defined more than once")]
        span: Option<SourceSpan>,
        kind: String,
        name: String,
        scope: String,
    },

    #[error("{message}")]
    #[diagnostic(code(datamatic::validation_error))]
    Validation {
        #[source_code]
        src: NamedSource<String>,
        #[label("{message}")]
        span: Option<SourceSpan>,
        message: String,
    },
}

impl Error {
    /// Create a parse error from a serde_json error with source context
    pub fn parse(source: serde_json::Error, src: &str, filename: &str) -> Box<Self> {
        let span =
            offset_of(src, source.line(), source.column()).map(|at| SourceSpan::from((at, 0)));
        Box::new(Error::Parse {
            src: NamedSource::new(filename, src.to_string()),
            span,
            source,
        })
    }

    /// Create an unknown flag error
    pub fn unknown_flag(
        flag: impl Into<String>,
        owner: impl Into<String>,
        src: &str,
        filename: &str,
        span: Option<SourceSpan>,
    ) -> Box<Self> {
        Box::new(Error::UnknownFlag {
            src: NamedSource::new(filename, src.to_string()),
            span,
            flag: flag.into(),
            owner: owner.into(),
        })
    }

    /// Create a duplicate name error
    pub fn duplicate_name(
        kind: impl Into<String>,
        name: impl Into<String>,
        scope: impl Into<String>,
        src: &str,
        filename: &str,
        span: Option<SourceSpan>,
    ) -> Box<Self> {
        Box::new(Error::DuplicateName {
            src: NamedSource::new(filename, src.to_string()),
            span,
            kind: kind.into(),
            name: name.into(),
            scope: scope.into(),
        })
    }

    /// Create a validation error with source context
    pub fn validation(
        message: impl Into<String>,
        src: &str,
        filename: &str,
        span: Option<SourceSpan>,
    ) -> Box<Self> {
        Box::new(Error::Validation {
            src: NamedSource::new(filename, src.to_string()),
            span,
            message: message.into(),
        })
    }
}

/// Convert serde_json's 1-based line/column into a byte offset.
fn offset_of(src: &str, line: usize, column: usize) -> Option<usize> {
    if line == 0 {
        return None;
    }
    let mut offset = 0;
    for (index, text) in src.split_inclusive('\n').enumerate() {
        if index + 1 == line {
            return Some(offset + column.saturating_sub(1).min(text.len()));
        }
        offset += text.len();
    }
    Some(src.len())
}
