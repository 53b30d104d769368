//! Diagnostic codes with category prefixes.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The category of a diagnostic code, determining its prefix letter.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub enum Category {
    /// Syntax errors reported by the lexer and parser, prefixed with `E`.
    Syntax,
    /// Problems with load and reference directives, prefixed with `L`.
    Load,
}

impl Category {
    /// Returns the single-character prefix for this category.
    pub fn prefix(self) -> char {
        match self {
            Category::Syntax => 'E',
            Category::Load => 'L',
        }
    }
}

/// A structured diagnostic code, displayed as prefix plus a 3-digit number.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub struct DiagnosticCode {
    /// The category of this diagnostic.
    pub category: Category,
    /// The numeric identifier within the category.
    pub number: u16,
}

impl DiagnosticCode {
    /// Creates a new diagnostic code.
    pub const fn new(category: Category, number: u16) -> Self {
        Self { category, number }
    }
}

impl fmt::Display for DiagnosticCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{:03}", self.category.prefix(), self.number)
    }
}

/// Codes used across the workspace.
pub mod codes {
    use super::{Category, DiagnosticCode};

    /// The lexer hit a character or literal it cannot tokenize.
    pub const INVALID_TOKEN: DiagnosticCode = DiagnosticCode::new(Category::Syntax, 1);
    /// The parser expected a different token.
    pub const UNEXPECTED_TOKEN: DiagnosticCode = DiagnosticCode::new(Category::Syntax, 2);
    /// A member was declared outside of a type in an ordinary unit.
    pub const MEMBER_OUTSIDE_TYPE: DiagnosticCode = DiagnosticCode::new(Category::Syntax, 3);
    /// A directive is missing its quoted path.
    pub const MISSING_DIRECTIVE_PATH: DiagnosticCode = DiagnosticCode::new(Category::Syntax, 4);
    /// An unknown `#` directive.
    pub const UNKNOWN_DIRECTIVE: DiagnosticCode = DiagnosticCode::new(Category::Syntax, 5);
    /// A `#load` or `#r` directive appears in an ordinary unit.
    pub const DIRECTIVE_OUTSIDE_SCRIPT: DiagnosticCode = DiagnosticCode::new(Category::Load, 1);
    /// A directive appears after the first declaration.
    pub const DIRECTIVE_AFTER_DECLARATION: DiagnosticCode =
        DiagnosticCode::new(Category::Load, 2);
    /// The forest has no resolver, so load directives cannot be honored.
    pub const LOAD_UNSUPPORTED: DiagnosticCode = DiagnosticCode::new(Category::Load, 3);
    /// A load path did not resolve to any file.
    pub const FILE_NOT_FOUND: DiagnosticCode = DiagnosticCode::new(Category::Load, 4);
    /// A resolved file could not be read.
    pub const FILE_READ_FAILED: DiagnosticCode = DiagnosticCode::new(Category::Load, 5);
}
