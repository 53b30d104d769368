//! Diagnostic creation, severity management and message formatting.
//!
//! This crate provides structured [`Diagnostic`] messages with severity levels
//! and codes, the thread-safe [`DiagnosticSink`] that the parser reports into,
//! and the [`MessageProvider`] that formats the few conditions the forest
//! attaches to load directives.

#![warn(missing_docs)]

pub mod code;
pub mod diagnostic;
pub mod messages;
pub mod severity;
pub mod sink;

pub use code::{Category, DiagnosticCode};
pub use diagnostic::Diagnostic;
pub use messages::{MessageProvider, StandardMessages};
pub use severity::Severity;
pub use sink::DiagnosticSink;
