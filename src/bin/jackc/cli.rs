//! # Cli
//!
//! This module contains everything needed for parsing the CLI arguments for jackc.

use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// Struct containing the CLI configuration for jackc.
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Source files or directories to compile. A directory is scanned
    /// (non-recursively) for `.jack` files; each input produces a sibling
    /// `.vm` file.
    #[arg(required = true)]
    pub paths: Vec<PathBuf>,

    /// Also write a `<tokens>` XML dump of the lexer output next to each
    /// compiled file.
    #[arg(long)]
    pub dump_tokens: bool,

    /// Specify the log level of the compiler.
    #[arg(value_enum, short, long, default_value_t = LogLevel::default())]
    pub verbosity: LogLevel,
}

impl Cli {
    pub fn init() -> Self {
        Cli::parse()
    }
}

/// Enum for specifying the log level of jackc.
#[derive(ValueEnum, Clone, Default, Debug)]
pub enum LogLevel {
    /// The default log level. Only critical errors will be logged.
    #[default]
    #[value(alias("0"))]
    Error,

    /// A log level, where also warnings (like undeclared identifiers) are logged.
    #[value(alias("1"))]
    Warn,

    /// Also log information about the general state of the compiler, e.g., which files are
    /// compiled, etc.
    #[value(alias("2"))]
    Info,

    /// Log everything which happens internally in the compiler.
    #[value(alias("3"))]
    Debug,

    /// Log extra information, down to individual token/instruction emission.
    #[value(alias("4"))]
    Trace,
}

impl From<&LogLevel> for log::Level {
    fn from(value: &LogLevel) -> Self {
        match value {
            LogLevel::Error => log::Level::Error,
            LogLevel::Warn => log::Level::Warn,
            LogLevel::Info => log::Level::Info,
            LogLevel::Debug => log::Level::Debug,
            LogLevel::Trace => log::Level::Trace,
        }
    }
}
