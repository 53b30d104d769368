//! Lazily built declaration roots.

use crate::builder::{build_skeleton, SkeletonOptions};
use crate::decl::RootDeclaration;
use crate::member_names::MemberNameSet;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, OnceLock, Weak};
use sylva_syntax::Unit;

/// Identity of a [`LazyRoot`] inside a [`DeclarationIndex`](crate::DeclarationIndex).
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct RootId(u64);

impl RootId {
    fn fresh() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(0);
        Self(NEXT.fetch_add(1, Ordering::Relaxed))
    }
}

struct LazyRootInner {
    id: RootId,
    unit: Unit,
    options: Arc<SkeletonOptions>,
    reuse: Arc<[Weak<MemberNameSet>]>,
    cell: OnceLock<Arc<RootDeclaration>>,
}

/// A unit's skeleton, built at most once on first access.
///
/// Clones share the same cell, so the index and the snapshot that created the
/// root observe the same realization.
#[derive(Clone)]
pub struct LazyRoot(Arc<LazyRootInner>);

impl LazyRoot {
    /// Creates an unrealized root for `unit` that will consume `reuse` when built.
    pub fn new(unit: Unit, options: Arc<SkeletonOptions>, reuse: Arc<[Weak<MemberNameSet>]>) -> Self {
        Self(Arc::new(LazyRootInner {
            id: RootId::fresh(),
            unit,
            options,
            reuse,
            cell: OnceLock::new(),
        }))
    }

    /// The root's identity.
    pub fn id(&self) -> RootId {
        self.0.id
    }

    /// The unit this root describes.
    pub fn unit(&self) -> &Unit {
        &self.0.unit
    }

    /// Builds the skeleton if needed and returns it.
    pub fn get(&self) -> &Arc<RootDeclaration> {
        self.0.cell.get_or_init(|| {
            Arc::new(build_skeleton(
                &self.0.unit,
                &self.0.options,
                &self.0.reuse,
            ))
        })
    }

    /// Returns the skeleton only if it has already been built.
    pub fn realized(&self) -> Option<&Arc<RootDeclaration>> {
        self.0.cell.get()
    }

    /// Returns `true` once the skeleton has been built.
    pub fn is_realized(&self) -> bool {
        self.0.cell.get().is_some()
    }
}

impl fmt::Debug for LazyRoot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LazyRoot")
            .field("id", &self.0.id)
            .field("unit", &self.0.unit)
            .field("realized", &self.is_realized())
            .finish()
    }
}
