//! Opaque identifier for source texts.

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU32, Ordering};

static NEXT_FILE_ID: AtomicU32 = AtomicU32::new(0);

/// Opaque identifier for one [`SourceText`](crate::SourceText).
///
/// Units are created by editors and by the load-directive expander without a
/// central database, so ids are minted from a process-wide counter.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub struct FileId(u32);

impl FileId {
    /// A dummy file ID used for synthetic spans.
    pub const DUMMY: FileId = FileId(u32::MAX);

    /// Mints a fresh, never-before-returned `FileId`.
    pub fn fresh() -> Self {
        Self(NEXT_FILE_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// Creates a `FileId` from a raw `u32` value.
    pub fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    /// Returns the raw `u32` value of this `FileId`.
    pub fn as_raw(self) -> u32 {
        self.0
    }
}
