//! Resolved `#load` directives.

use std::path::PathBuf;
use sylva_diagnostics::Diagnostic;
use sylva_source::Span;
use sylva_syntax::Unit;

/// The outcome of resolving one `#load` directive.
///
/// Resolution problems never fail an operation; they are recorded here and
/// the unit carrying the directive still takes part in the forest.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadDirective {
    /// The path as written.
    pub path: String,
    /// The absolute path of the loaded unit, or `None` if the directive could
    /// not be resolved or read.
    pub resolved_path: Option<PathBuf>,
    /// Where the directive appears.
    pub span: Span,
    /// Diagnostics produced while resolving or reading the target.
    pub diagnostics: Vec<Diagnostic>,
}

impl LoadDirective {
    /// Returns `true` if resolving or reading the target failed.
    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(Diagnostic::is_error)
    }

    /// 1-based line and column of the directive inside `loader`, the unit
    /// that carries it.
    pub fn line_col(&self, loader: &Unit) -> (u32, u32) {
        loader.line_col(self.span)
    }
}
