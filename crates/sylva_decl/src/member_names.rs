//! The set of member names declared directly in one type.

use std::collections::BTreeSet;
use sylva_common::Ident;

/// Names declared directly in a type body (members and nested types).
///
/// Sets are shared between skeletons through `Arc`, and across edits only
/// through `Weak` handles; a handle is reused when it still upgrades and the
/// set it points to equals a freshly computed one.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MemberNameSet {
    names: BTreeSet<Ident>,
}

impl MemberNameSet {
    /// Creates an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if `name` is declared in the type.
    pub fn contains(&self, name: Ident) -> bool {
        self.names.contains(&name)
    }

    /// The number of distinct names.
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Returns `true` if the type declares nothing.
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Iterates names in interner-key order.
    pub fn iter(&self) -> impl Iterator<Item = Ident> + '_ {
        self.names.iter().copied()
    }
}

impl FromIterator<Ident> for MemberNameSet {
    fn from_iter<I: IntoIterator<Item = Ident>>(iter: I) -> Self {
        Self {
            names: iter.into_iter().collect(),
        }
    }
}
