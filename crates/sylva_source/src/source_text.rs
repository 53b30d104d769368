//! The text behind one unit.

use crate::file_id::FileId;
use std::path::{Path, PathBuf};
use sylva_common::ContentHash;

/// A unit's text, with the offsets of its line starts and a content digest.
pub struct SourceText {
    id: FileId,
    path: PathBuf,
    content: String,
    line_starts: Vec<u32>,
    hash: ContentHash,
}

impl SourceText {
    /// Wraps `content` read from `path`, minting a fresh [`FileId`].
    pub fn new(path: impl Into<PathBuf>, content: impl Into<String>) -> Self {
        let content = content.into();
        let line_starts = std::iter::once(0)
            .chain(
                content
                    .match_indices('\n')
                    .map(|(offset, _)| offset as u32 + 1),
            )
            .collect();
        let hash = ContentHash::of_text(&content);
        Self {
            id: FileId::fresh(),
            path: path.into(),
            content,
            line_starts,
            hash,
        }
    }

    /// The id used in every [`Span`](crate::Span) pointing into this text.
    pub fn id(&self) -> FileId {
        self.id
    }

    /// The path this text was read from (or a synthetic name).
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The full text.
    pub fn content(&self) -> &str {
        &self.content
    }

    /// Digest of the full text.
    pub fn content_hash(&self) -> ContentHash {
        self.hash
    }

    /// 1-based line and column of a byte offset.
    pub fn line_col(&self, offset: u32) -> (u32, u32) {
        // line_starts[0] == 0, so at least one start is <= offset.
        let line = self.line_starts.partition_point(|&start| start <= offset);
        let column = offset - self.line_starts[line - 1] + 1;
        (line as u32, column)
    }
}
