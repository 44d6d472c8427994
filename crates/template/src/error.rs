//! Error types for the template crate.

use std::fmt;
use thiserror::Error;

/// Result type alias for template operations.
pub type Result<T> = std::result::Result<T, TemplateError>;

/// Errors that can occur while parsing or rendering a template.
#[derive(Debug, Error)]
pub enum TemplateError {
    /// The template text is malformed
    #[error(transparent)]
    Parse(#[from] ParseError),

    /// A referenced name is absent from the context (strict mode only)
    #[error("missing variable `{name}` (line {line})")]
    MissingVariable {
        /// Name that failed to resolve
        name: String,
        /// 1-based line of the reference
        line: usize,
    },

    /// A name resolved to the wrong kind of value
    #[error("type mismatch for `{name}` (line {line}): expected {expected}, found {found}")]
    TypeMismatch {
        /// Name of the offending key
        name: String,
        /// Kind the directive needs
        expected: ValueKind,
        /// Kind the context holds
        found: ValueKind,
        /// 1-based line of the reference
        line: usize,
    },

    /// Context data could not be converted into a render context
    #[error("invalid context at `{path}`: {reason}")]
    InvalidContext {
        /// Dotted key path of the offending value
        path: String,
        /// What was wrong with it
        reason: String,
    },

    /// JSON context could not be decoded
    #[error("JSON context error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML context could not be decoded
    #[error("TOML context error: {0}")]
    Toml(#[from] toml::de::Error),
}

impl TemplateError {
    /// Name of the tag or key the error is about, if any.
    pub fn name(&self) -> Option<&str> {
        match self {
            TemplateError::Parse(err) => err.name(),
            TemplateError::MissingVariable { name, .. }
            | TemplateError::TypeMismatch { name, .. } => Some(name),
            TemplateError::InvalidContext { path, .. } => Some(path),
            TemplateError::Json(_) | TemplateError::Toml(_) => None,
        }
    }
}

/// Kind of a context value, used in type mismatch reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    /// A string
    Scalar,
    /// An ordered list of mappings
    Sequence,
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValueKind::Scalar => f.write_str("scalar"),
            ValueKind::Sequence => f.write_str("sequence"),
        }
    }
}

/// What went wrong while parsing.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseErrorKind {
    /// `{{` without a matching `}}`
    #[error("unterminated tag, missing closing `}}}}`")]
    UnterminatedTag,

    /// `{{}}`, `{{#}}` or `{{/}}`
    #[error("empty tag")]
    EmptyTag,

    /// Tag name contains whitespace or braces
    #[error("invalid name `{0}`")]
    InvalidName(String),

    /// Tag uses a sigil this renderer does not support
    #[error("unsupported directive `{0}`")]
    UnsupportedDirective(String),

    /// Section opened but never closed
    #[error("unclosed section `{0}`")]
    UnclosedSection(String),

    /// Closing tag without an open section
    #[error("closing tag `{0}` has no matching section")]
    UnexpectedClose(String),

    /// Closing tag for a different section than the innermost open one
    #[error("mismatched closing tag: expected `{expected}`, found `{found}`")]
    MismatchedClose {
        /// Innermost open section
        expected: String,
        /// Name in the closing tag
        found: String,
    },
}

/// A parse failure with its position in the template source.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind} at line {line}, column {column}")]
pub struct ParseError {
    /// What went wrong
    pub kind: ParseErrorKind,
    /// Byte offset of the offending tag
    pub offset: usize,
    /// 1-based line
    pub line: usize,
    /// 1-based column, counted in characters
    pub column: usize,
}

impl ParseError {
    /// Tag name the error refers to, if the tag had one.
    pub fn name(&self) -> Option<&str> {
        match &self.kind {
            ParseErrorKind::InvalidName(name)
            | ParseErrorKind::UnsupportedDirective(name)
            | ParseErrorKind::UnclosedSection(name)
            | ParseErrorKind::UnexpectedClose(name) => Some(name),
            ParseErrorKind::MismatchedClose { found, .. } => Some(found),
            ParseErrorKind::UnterminatedTag | ParseErrorKind::EmptyTag => None,
        }
    }
}
