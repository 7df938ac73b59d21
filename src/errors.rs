//! Shared error types for the rewriting engine.
//!
//! Every variant is fatal for the file it names. Skip outcomes (generated
//! files, unsatisfiable build constraints) are not errors and are modeled by
//! [`crate::rewrite::Outcome`] instead.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// The file could not be read.
    #[error("cannot read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The file is not valid Rust source.
    #[error("parse error in {file}:{line}:{column}: {message}")]
    Parse {
        file: PathBuf,
        line: usize,
        column: usize,
        message: String,
    },

    /// A `traceweave:` directive comment is malformed.
    #[error("malformed directive in {path}: {message}")]
    Directive { path: PathBuf, message: String },

    /// A collected patch targets a body the apply pass never reached.
    /// Indicates an internal invariant violation, never expected in normal
    /// operation.
    #[error("malformed tree in {path}: {unapplied} patch(es) target unreachable bodies")]
    MalformedTree { path: PathBuf, unapplied: usize },

    /// The rewritten source could not be written back.
    #[error("cannot write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The worker pool could not be constructed.
    #[error("concurrency error: {0}")]
    Concurrency(String),
}

impl Error {
    /// Create a parse error carrying the source location syn reported.
    pub fn parse(file: impl Into<PathBuf>, err: &syn::Error) -> Self {
        let start = err.span().start();
        Self::Parse {
            file: file.into(),
            line: start.line,
            column: start.column,
            message: err.to_string(),
        }
    }

    /// Create a directive error for the given file.
    pub fn directive(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::Directive {
            path: path.into(),
            message: message.into(),
        }
    }
}

/// Result type alias using our error type.
pub type Result<T> = std::result::Result<T, Error>;
