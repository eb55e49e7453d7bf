use miette::{Diagnostic, NamedSource, SourceSpan};
use thiserror::Error;

#[derive(Error, Debug, Diagnostic, Clone)]
pub enum Error {
    #[error(transparent)]
    #[diagnostic(transparent)]
    InvalidTypeName(#[from] InvalidTypeName),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Qualification(#[from] QualificationError),
}

/// The text handed to the parser is not a well-formed type or assembly name.
#[derive(Error, Debug, Diagnostic, Clone)]
pub enum InvalidTypeName {
    #[error("Unexpected end of format.")]
    #[diagnostic(
        code(typename::unexpected_end),
        help("The name ended while the grammar still expected more characters.")
    )]
    UnexpectedEnd {
        #[source_code]
        src: NamedSource<String>,
        #[label("name ended here")]
        span: SourceSpan,
    },

    #[error("Unexpected char at position {position}.")]
    #[diagnostic(
        code(typename::unexpected_char),
        help("This character is not allowed here. Delimiters inside identifiers must be escaped with '\\'.")
    )]
    UnexpectedChar {
        #[source_code]
        src: NamedSource<String>,
        #[label("unexpected character")]
        span: SourceSpan,
        position: usize,
    },

    #[error("Unexpected char at position {position}.")]
    #[diagnostic(
        code(typename::trailing_characters),
        help("A complete name was read but input remained after it.")
    )]
    TrailingCharacters {
        #[source_code]
        src: NamedSource<String>,
        #[label("nothing may follow the name")]
        span: SourceSpan,
        position: usize,
    },

    #[error("Type arguments nested deeper than {limit} levels at position {position}.")]
    #[diagnostic(
        code(typename::nesting_too_deep),
        help("Generic type arguments may only enclose one another a limited number of times.")
    )]
    NestingTooDeep {
        #[source_code]
        src: NamedSource<String>,
        #[label("too deep")]
        span: SourceSpan,
        position: usize,
        limit: usize,
    },
}

impl InvalidTypeName {
    /// Byte offset of the offending character, when there is one.
    #[must_use]
    pub fn position(&self) -> Option<usize> {
        match self {
            InvalidTypeName::UnexpectedEnd { .. } => None,
            InvalidTypeName::UnexpectedChar { position, .. }
            | InvalidTypeName::TrailingCharacters { position, .. }
            | InvalidTypeName::NestingTooDeep { position, .. } => Some(*position),
        }
    }
}

/// A well-known qualification is present but its value cannot be interpreted.
#[derive(Error, Debug, Diagnostic, Clone, PartialEq, Eq)]
pub enum QualificationError {
    #[error("{name} qualification was provided, but was in an unrecognised format.")]
    #[diagnostic(code(typename::qualification_format))]
    UnrecognisedFormat { name: &'static str, value: String },

    #[error("{name} qualification was provided, but was unrecognised.")]
    #[diagnostic(code(typename::qualification_value))]
    Unrecognised { name: &'static str, value: String },
}

#[derive(Error, Debug, Diagnostic, Clone, PartialEq, Eq)]
#[error("'{0}' is not a version of the form major.minor[.build[.revision]]")]
#[diagnostic(code(typename::version_syntax))]
pub struct ParseVersionError(pub String);

#[derive(Error, Debug, Diagnostic, Clone, PartialEq, Eq)]
#[error("'{0}' is not a known processor architecture")]
#[diagnostic(code(typename::processor_architecture))]
pub struct ParseArchitectureError(pub String);
