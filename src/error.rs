// src/error.rs

//! Error types for recipe cooking

use std::path::PathBuf;
use thiserror::Error;

/// Result type used throughout the library
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can abort a recipe phase
#[derive(Error, Debug)]
pub enum Error {
    /// A template, source file or install glob that must exist does not
    #[error("not found: {0}")]
    NotFound(String),

    /// Recipe or rule file could not be parsed
    #[error("parse error: {0}")]
    ParseError(String),

    /// Filesystem operation failed
    #[error("I/O error: {0}")]
    IoError(String),

    /// A patch rule pattern is not a valid regular expression
    #[error("invalid pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    /// A rule marked as required matched no line
    #[error("required rule matched nothing in {}: {pattern}", .file.display())]
    RuleNotMatched { file: PathBuf, pattern: String },

    /// External configuration query exited non-zero or could not be run
    #[error("error running {program}: {message}")]
    ConfigQuery { program: String, message: String },

    /// Native build tool target failed
    #[error("make {target} failed with exit code {code:?}\nstderr: {stderr}")]
    BuildFailed {
        target: String,
        code: Option<i32>,
        stderr: String,
    },

    /// A dependency prefix the recipe needs was not supplied
    #[error("missing dependency prefix: {0}")]
    MissingDependency(String),

    /// Recipe references a variable that has no value
    #[error("undefined variable %({0})s")]
    UndefinedVariable(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
