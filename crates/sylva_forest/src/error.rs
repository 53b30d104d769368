//! Errors returned by forest operations.

use std::path::PathBuf;
use sylva_common::InternalError;

/// Errors returned by [`Manager`](crate::Manager) operations.
///
/// Problems in user source (unresolvable `#load` paths, unreadable files,
/// syntax errors) are never errors here; they are diagnostics on the units
/// and directives involved.
#[derive(Debug, thiserror::Error)]
pub enum ForestError {
    /// The unit is already an external unit of the manager.
    #[error("unit '{}' is already part of the forest", .0.display())]
    DuplicateUnit(PathBuf),

    /// The unit is not an external unit of the manager.
    #[error("unit '{}' is not part of the forest", .0.display())]
    UnknownUnit(PathBuf),

    /// The forest bookkeeping is inconsistent.
    #[error(transparent)]
    Internal(#[from] InternalError),
}
