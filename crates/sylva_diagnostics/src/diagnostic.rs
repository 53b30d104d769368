//! Structured diagnostic messages.

use crate::code::DiagnosticCode;
use crate::severity::Severity;
use serde::{Deserialize, Serialize};
use sylva_source::Span;

/// A structured diagnostic message with a source location.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Diagnostic {
    /// The severity level of this diagnostic.
    pub severity: Severity,
    /// The code identifying the kind of diagnostic.
    pub code: DiagnosticCode,
    /// The main diagnostic message.
    pub message: String,
    /// The source span where the issue was detected.
    pub primary_span: Span,
    /// Explanatory footnotes.
    pub notes: Vec<String>,
}

impl Diagnostic {
    /// Creates a new error diagnostic.
    pub fn error(code: DiagnosticCode, message: impl Into<String>, span: Span) -> Self {
        Self::with_severity(Severity::Error, code, message, span)
    }

    /// Creates a new warning diagnostic.
    pub fn warning(code: DiagnosticCode, message: impl Into<String>, span: Span) -> Self {
        Self::with_severity(Severity::Warning, code, message, span)
    }

    fn with_severity(
        severity: Severity,
        code: DiagnosticCode,
        message: impl Into<String>,
        span: Span,
    ) -> Self {
        Self {
            severity,
            code,
            message: message.into(),
            primary_span: span,
            notes: Vec::new(),
        }
    }

    /// Adds a note to this diagnostic.
    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.notes.push(note.into());
        self
    }

    /// Returns `true` if this is an error.
    pub fn is_error(&self) -> bool {
        self.severity.is_error()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::code::codes;

    #[test]
    fn create_error() {
        let diag = Diagnostic::error(codes::UNEXPECTED_TOKEN, "expected '{'", Span::DUMMY);
        assert!(diag.is_error());
        assert_eq!(diag.message, "expected '{'");
        assert_eq!(format!("{}", diag.code), "E002");
    }

    #[test]
    fn warning_with_note() {
        let diag = Diagnostic::warning(codes::DIRECTIVE_AFTER_DECLARATION, "late #r", Span::DUMMY)
            .with_note("directives must precede declarations");
        assert!(!diag.is_error());
        assert_eq!(diag.notes.len(), 1);
    }
}
