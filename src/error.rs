//! Errors returned by the manifest parsers.
//!
//! Only failures that invalidate the whole manifest are errors. A single
//! dependency whose declaration cannot be located in the file text is
//! skipped and logged instead.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that abort a parse call. No partial results accompany them.
#[derive(Error, Debug)]
pub enum ParseError {
    /// The manifest could not be read
    #[error("failed to read manifest file {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The manifest is empty and the format does not allow that
    #[error("empty file: {}", path.display())]
    EmptyFile { path: PathBuf },

    /// XML syntax error
    #[error("failed to parse XML: {source}")]
    Xml {
        #[source]
        source: quick_xml::Error,
    },

    /// XML document ended while elements were still open
    #[error("failed to parse XML: unclosed element <{name}>")]
    UnclosedElement { name: String },

    /// JSON syntax or shape error
    #[error("failed to parse JSON: {source}")]
    Json {
        #[source]
        source: serde_json::Error,
    },

    /// Malformed go.mod
    #[error("failed to parse go.mod: line {line}: {message}")]
    GoMod { line: usize, message: String },

    /// No parser is registered for this file name
    #[error("unsupported manifest file: {}", path.display())]
    Unsupported { path: PathBuf },
}

/// Result type alias for parse operations.
pub type Result<T> = std::result::Result<T, ParseError>;

impl ParseError {
    /// Create an I/O error for the given path.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Create a go.mod error; `line` is 1-based.
    pub fn go_mod(line: usize, message: impl Into<String>) -> Self {
        Self::GoMod {
            line,
            message: message.into(),
        }
    }
}

impl From<quick_xml::Error> for ParseError {
    fn from(source: quick_xml::Error) -> Self {
        Self::Xml { source }
    }
}

impl From<serde_json::Error> for ParseError {
    fn from(source: serde_json::Error) -> Self {
        Self::Json { source }
    }
}
