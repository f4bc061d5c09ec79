//! Error taxonomy for the compiler.
//!
//! Only the first error encountered in a file is ever preserved (see
//! spec's "Failure semantics"): the lexer and parser each stop recording
//! after their first mistake, so `CompileError` is a single value rather
//! than a collection of diagnostics.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CompileError {
    #[error("{file}:{line}: lexical error: {message}")]
    Lexical {
        file: String,
        line: usize,
        message: String,
    },

    #[error("{file}:{line}: grammar error: {message}")]
    Grammar {
        file: String,
        line: usize,
        message: String,
    },
}

impl CompileError {
    pub fn lexical(file: impl Into<String>, line: usize, message: impl Into<String>) -> Self {
        CompileError::Lexical {
            file: file.into(),
            line,
            message: message.into(),
        }
    }

    pub fn grammar(file: impl Into<String>, line: usize, message: impl Into<String>) -> Self {
        CompileError::Grammar {
            file: file.into(),
            line,
            message: message.into(),
        }
    }
}

/// Top-level driver error: wraps I/O failure (missing directory/file) and
/// per-file compile failure (lexical/grammar) under one type so the CLI
/// binary can report both uniformly and pick an exit code.
#[derive(Debug, Error)]
pub enum DriverError {
    #[error("cannot read '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Compile(#[from] CompileError),
}
