//! Source text, span tracking and load-path resolution.
//!
//! This crate provides [`SourceText`] for the text behind every unit, [`FileId`]
//! and [`Span`] for locations, and the [`SourceResolver`] seam through which
//! load directives are turned into absolute paths and file contents.

#![warn(missing_docs)]

pub mod file_id;
pub mod resolver;
pub mod source_text;
pub mod span;

pub use file_id::FileId;
pub use resolver::{normalize_path, FileSystemResolver, InMemoryResolver, SourceResolver};
pub use source_text::SourceText;
pub use span::Span;
