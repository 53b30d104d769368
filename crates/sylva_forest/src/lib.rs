//! Incremental management of the units that feed one compilation.
//!
//! A [`Manager`] holds the units a host added, expands them through their
//! `#load` directives into an ordered forest, and maintains a merged
//! [`DeclarationIndex`](sylva_decl::DeclarationIndex) over every unit. Edits
//! return new managers and never disturb snapshots already handed out.
//!
//! # Architecture
//!
//! - **Repository** ([`repository`]): settings fixed for a compilation.
//! - **Expander** (`expand`): appends a unit after everything it loads,
//!   deduplicating by resolved path.
//! - **Snapshot** ([`snapshot`]): immutable unit sequence, ordinals,
//!   directives, loaded-unit map, lazy roots and the declaration index.
//! - **Removal** ([`removal`]): which loaded units leave with a unit and
//!   which are still needed by others.
//! - **Correlation** ([`correlate`]): weak member-name handles salvaged from
//!   a stale skeleton for the rebuild of its replacement.
//! - **Manager** ([`manager`]): the façade tying these together.

#![warn(missing_docs)]

/// Salvaging member-name caches across a replacement.
pub mod correlate;
/// Resolved `#load` directives.
pub mod directive;
/// Errors returned by forest operations.
pub mod error;
mod expand;
/// The forest façade.
pub mod manager;
/// Removal-set computation and rescue.
pub mod removal;
/// Per-compilation settings.
pub mod repository;
/// Immutable forest snapshots.
pub mod snapshot;

pub use correlate::correlate;
pub use directive::LoadDirective;
pub use error::ForestError;
pub use manager::Manager;
pub use removal::{compute_removal_set, settle, RemovalSet};
pub use repository::UnitRepository;
pub use snapshot::{MemberNameHandles, Snapshot};
