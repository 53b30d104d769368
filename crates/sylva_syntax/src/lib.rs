//! Hand-rolled front-end for Sylva scripts and source files.
//!
//! The language is deliberately small: it has exactly the shapes the forest
//! needs to track (directives, namespaces, types and their member names).
//! The main entry point is [`Unit::parse`].
//!
//! # Architecture
//!
//! - **Lexer** ([`lexer`]): source text to tokens, skipping `//` and `/* */`
//!   comments and recognizing `#load` / `#r`.
//! - **Parser** ([`parser`]): recursive descent with error recovery; directive
//!   placement rules depend on the [`UnitKind`].
//! - **AST** ([`ast`]): node types with spans and serde support.
//! - **Units** ([`unit`]): immutable, identity-compared parse results.

#![warn(missing_docs)]

/// AST node types for Sylva units.
pub mod ast;
/// Lexical analyzer for Sylva source text.
pub mod lexer;
/// Recursive descent parser with error recovery.
pub mod parser;
/// Token types for the Sylva lexer.
pub mod token;
/// Parsed units and their parse options.
pub mod unit;

pub use ast::{CompilationUnit, Directive, DirectiveKind};
pub use token::{SylvaToken, Token};
pub use unit::{ParseOptions, Unit, UnitId, UnitKind};
