//! Formatting of the diagnostics attached to load directives.

use crate::code::codes;
use crate::diagnostic::Diagnostic;
use std::io;
use std::path::Path;
use sylva_source::Span;

/// Formats the conditions the load-directive expander can report.
///
/// Hosts that localize messages or map them onto their own code space provide
/// their own implementation; [`StandardMessages`] is the default.
pub trait MessageProvider: Send + Sync {
    /// The forest has no resolver, so `#load` cannot be honored.
    fn load_unsupported(&self, span: Span) -> Diagnostic;

    /// `path` did not resolve to a file.
    fn file_not_found(&self, path: &str, span: Span) -> Diagnostic;

    /// `path` resolved but reading it failed.
    fn read_failure(&self, path: &Path, error: &io::Error, span: Span) -> Diagnostic;
}

/// English messages using the workspace's `L` codes.
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardMessages;

impl MessageProvider for StandardMessages {
    fn load_unsupported(&self, span: Span) -> Diagnostic {
        Diagnostic::error(
            codes::LOAD_UNSUPPORTED,
            "source file references are not supported in this context",
            span,
        )
    }

    fn file_not_found(&self, path: &str, span: Span) -> Diagnostic {
        Diagnostic::error(
            codes::FILE_NOT_FOUND,
            format!("source file '{path}' could not be found"),
            span,
        )
    }

    fn read_failure(&self, path: &Path, error: &io::Error, span: Span) -> Diagnostic {
        Diagnostic::error(
            codes::FILE_READ_FAILED,
            format!("unable to read source file '{}'", path.display()),
            span,
        )
        .with_note(error.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_not_found_mentions_path() {
        let diag = StandardMessages.file_not_found("lib/missing.sy", Span::DUMMY);
        assert_eq!(diag.code, codes::FILE_NOT_FOUND);
        assert!(diag.message.contains("lib/missing.sy"));
    }

    #[test]
    fn read_failure_wraps_io_error() {
        let err = io::Error::new(io::ErrorKind::PermissionDenied, "access denied");
        let diag = StandardMessages.read_failure(Path::new("/p/a.sy"), &err, Span::DUMMY);
        assert_eq!(diag.code, codes::FILE_READ_FAILED);
        assert!(diag.message.contains("/p/a.sy"));
        assert_eq!(diag.notes, vec!["access denied".to_string()]);
    }

    #[test]
    fn load_unsupported_is_an_error() {
        assert!(StandardMessages.load_unsupported(Span::DUMMY).is_error());
    }
}
