//! A single-pass compiler for a small object-based language, targeting a
//! stack-machine VM instruction set.
//!
//! The pipeline is deliberately flat: a [`lexer`] turns source text into
//! tokens, and a [`parser`] walks those tokens once, resolving symbols
//! against [`symbol_table`] and emitting [`vm`] instructions as it goes —
//! there is no intermediate AST. [`driver`] wires this up into a batch
//! CLI tool; [`xml`] is an optional side diagnostic.

pub mod cursor;
pub mod driver;
pub mod error;
pub mod lexer;
pub mod parser;
pub mod symbol_table;
pub mod token;
pub mod vm;
pub mod xml;
