//! Immutable forest snapshots and the scratch builder that produces them.

use crate::directive::LoadDirective;
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Weak};
use sylva_common::{InternalError, SylvaResult};
use sylva_decl::{DeclarationIndex, LazyRoot, MemberNameSet, RootId};
use sylva_syntax::Unit;

/// Weak member-name handles in skeleton pre-order, one per cache-eligible type.
pub type MemberNameHandles = Arc<[Weak<MemberNameSet>]>;

pub(crate) fn no_handles() -> MemberNameHandles {
    Arc::from(Vec::new())
}

/// Every unit of a forest, in compilation order, with its bookkeeping.
///
/// A snapshot never changes after construction. Loaded units precede the
/// unit that loaded them, ordinals are dense over `0..len()`, and the
/// declaration index holds exactly one root per unit, in unit order.
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    units: Vec<Unit>,
    ordinals: HashMap<Unit, usize>,
    load_directives: HashMap<Unit, Arc<[LoadDirective]>>,
    loaded_units: HashMap<PathBuf, Unit>,
    roots: HashMap<Unit, LazyRoot>,
    member_name_handles: HashMap<Unit, MemberNameHandles>,
    index: DeclarationIndex,
}

impl Snapshot {
    /// Units in compilation order.
    pub fn units(&self) -> &[Unit] {
        &self.units
    }

    /// The number of units.
    pub fn len(&self) -> usize {
        self.units.len()
    }

    /// Returns `true` if the forest is empty.
    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    /// Returns `true` if `unit` is part of the forest.
    pub fn contains(&self, unit: &Unit) -> bool {
        self.ordinals.contains_key(unit)
    }

    /// The position of `unit` in [`units`](Self::units).
    pub fn ordinal(&self, unit: &Unit) -> Option<usize> {
        self.ordinals.get(unit).copied()
    }

    /// The resolved `#load` directives of `unit`, if it has any.
    pub fn load_directives(&self, unit: &Unit) -> Option<&[LoadDirective]> {
        self.load_directives.get(unit).map(|d| &**d)
    }

    /// The unit loaded from `resolved_path`.
    pub fn loaded_unit(&self, resolved_path: &Path) -> Option<&Unit> {
        self.loaded_units.get(resolved_path)
    }

    /// Returns `true` if `unit` was pulled in by a `#load` directive rather
    /// than added by the host.
    pub fn is_loaded_unit(&self, unit: &Unit) -> bool {
        self.loaded_units.get(unit.path()) == Some(unit)
    }

    /// The unit a directive resolved to, if it is still part of the forest.
    pub fn resolve_directive(&self, directive: &LoadDirective) -> Option<&Unit> {
        directive
            .resolved_path
            .as_deref()
            .and_then(|path| self.loaded_units.get(path))
    }

    /// The lazy declaration root of `unit`.
    pub fn root(&self, unit: &Unit) -> Option<&LazyRoot> {
        self.roots.get(unit)
    }

    /// The member-name handles `unit`'s root was created with.
    pub fn member_name_handles(&self, unit: &Unit) -> Option<&MemberNameHandles> {
        self.member_name_handles.get(unit)
    }

    /// The merged declaration index.
    pub fn declaration_index(&self) -> &DeclarationIndex {
        &self.index
    }

    /// Returns `true` if any unit carries a `#load` or `#r` directive.
    pub fn has_reference_or_load_directives(&self) -> bool {
        self.units.iter().any(Unit::has_reference_or_load_directives)
    }

    /// Checks the structural invariants. Any failure is a bookkeeping bug.
    pub fn check_invariants(&self) -> SylvaResult<()> {
        let n = self.units.len();
        if self.ordinals.len() != n {
            return Err(InternalError::new(format!(
                "{} ordinals for {n} units",
                self.ordinals.len()
            )));
        }
        for (i, unit) in self.units.iter().enumerate() {
            if self.ordinals.get(unit) != Some(&i) {
                return Err(InternalError::new(format!(
                    "unit '{}' at position {i} has ordinal {:?}",
                    unit.path().display(),
                    self.ordinals.get(unit)
                )));
            }
            let root = self.roots.get(unit).ok_or_else(|| {
                InternalError::new(format!("unit '{}' has no root", unit.path().display()))
            })?;
            if !self.index.contains(root.id()) {
                return Err(InternalError::new(format!(
                    "root of '{}' is missing from the index",
                    unit.path().display()
                )));
            }
            if !self.member_name_handles.contains_key(unit) {
                return Err(InternalError::new(format!(
                    "unit '{}' has no member-name handle entry",
                    unit.path().display()
                )));
            }
        }
        if self.roots.len() != n || self.index.len() != n || self.member_name_handles.len() != n {
            return Err(InternalError::new(format!(
                "{n} units but {} roots, {} indexed roots, {} handle entries",
                self.roots.len(),
                self.index.len(),
                self.member_name_handles.len()
            )));
        }
        for (path, unit) in &self.loaded_units {
            if !self.ordinals.contains_key(unit) {
                return Err(InternalError::new(format!(
                    "loaded unit '{}' is not in the forest",
                    path.display()
                )));
            }
        }
        for (unit, directives) in &self.load_directives {
            if !self.ordinals.contains_key(unit) {
                return Err(InternalError::new(format!(
                    "directives recorded for unknown unit '{}'",
                    unit.path().display()
                )));
            }
            for directive in directives.iter() {
                let Some(path) = &directive.resolved_path else {
                    continue;
                };
                if !self.loaded_units.contains_key(path) {
                    return Err(InternalError::new(format!(
                        "'{}' loads '{}', which is not in the forest",
                        unit.path().display(),
                        path.display()
                    )));
                }
            }
        }
        Ok(())
    }
}

/// Mutable scratch state frozen into a [`Snapshot`].
///
/// Index changes are collected and applied in one copy at
/// [`freeze`](Self::freeze).
#[derive(Debug, Default)]
pub(crate) struct SnapshotBuilder {
    pub(crate) units: Vec<Unit>,
    pub(crate) ordinals: HashMap<Unit, usize>,
    pub(crate) load_directives: HashMap<Unit, Arc<[LoadDirective]>>,
    pub(crate) loaded_units: HashMap<PathBuf, Unit>,
    pub(crate) roots: HashMap<Unit, LazyRoot>,
    pub(crate) member_name_handles: HashMap<Unit, MemberNameHandles>,
    index: DeclarationIndex,
    added_roots: Vec<LazyRoot>,
    removed_roots: Vec<RootId>,
}

impl SnapshotBuilder {
    /// Starts from an empty forest.
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Starts from a copy of `snapshot`.
    pub(crate) fn from_snapshot(snapshot: &Snapshot) -> Self {
        Self {
            units: snapshot.units.clone(),
            ordinals: snapshot.ordinals.clone(),
            load_directives: snapshot.load_directives.clone(),
            loaded_units: snapshot.loaded_units.clone(),
            roots: snapshot.roots.clone(),
            member_name_handles: snapshot.member_name_handles.clone(),
            index: snapshot.index.clone(),
            added_roots: Vec::new(),
            removed_roots: Vec::new(),
        }
    }

    /// Appends `unit` at the next ordinal with a fresh lazy root built from
    /// `handles`.
    pub(crate) fn append(
        &mut self,
        unit: Unit,
        root: LazyRoot,
        handles: MemberNameHandles,
    ) -> SylvaResult<()> {
        let ordinal = self.units.len();
        if self.ordinals.insert(unit.clone(), ordinal).is_some() {
            return Err(InternalError::new(format!(
                "unit '{}' appended twice",
                unit.path().display()
            )));
        }
        self.units.push(unit.clone());
        self.add_root(unit.clone(), root);
        self.member_name_handles.insert(unit, handles);
        Ok(())
    }

    /// Re-appends a unit whose bookkeeping is already in the builder.
    pub(crate) fn push_existing(&mut self, unit: Unit) -> SylvaResult<()> {
        if !self.roots.contains_key(&unit) {
            return Err(InternalError::new(format!(
                "unit '{}' has no root",
                unit.path().display()
            )));
        }
        let ordinal = self.units.len();
        if self.ordinals.insert(unit.clone(), ordinal).is_some() {
            return Err(InternalError::new(format!(
                "unit '{}' appended twice",
                unit.path().display()
            )));
        }
        self.units.push(unit);
        Ok(())
    }

    /// Re-appends an already known loaded unit that is not yet placed,
    /// after the units it loads. Units already placed, or still being
    /// expanded, are left alone.
    pub(crate) fn pull_forward(&mut self, unit: &Unit) -> SylvaResult<()> {
        let mut visiting = HashSet::new();
        self.pull_forward_inner(unit, &mut visiting)
    }

    fn pull_forward_inner(&mut self, unit: &Unit, visiting: &mut HashSet<Unit>) -> SylvaResult<()> {
        if self.ordinals.contains_key(unit)
            || !self.roots.contains_key(unit)
            || !visiting.insert(unit.clone())
        {
            return Ok(());
        }
        let loaded: Vec<Unit> = self
            .load_directives
            .get(unit)
            .into_iter()
            .flat_map(|directives| directives.iter())
            .filter_map(|d| d.resolved_path.as_deref())
            .filter_map(|path| self.loaded_units.get(path).cloned())
            .collect();
        for dependency in &loaded {
            self.pull_forward_inner(dependency, visiting)?;
        }
        tracing::trace!(path = %unit.path().display(), "pulled loaded unit forward");
        self.push_existing(unit.clone())
    }

    /// Returns `true` if `unit` already has a place in the sequence.
    pub(crate) fn is_placed(&self, unit: &Unit) -> bool {
        self.ordinals.contains_key(unit)
    }

    /// Registers `root` as the root of `unit`.
    pub(crate) fn add_root(&mut self, unit: Unit, root: LazyRoot) {
        self.added_roots.push(root.clone());
        self.roots.insert(unit, root);
    }

    /// Drops every trace of `unit` except its place in `units`, which the
    /// caller rebuilds.
    pub(crate) fn forget(&mut self, unit: &Unit) -> SylvaResult<()> {
        let root = self.roots.remove(unit).ok_or_else(|| {
            InternalError::new(format!("unit '{}' has no root", unit.path().display()))
        })?;
        self.remove_root(root.id());
        self.ordinals.remove(unit);
        self.load_directives.remove(unit);
        self.member_name_handles.remove(unit);
        if self.loaded_units.get(unit.path()) == Some(unit) {
            self.loaded_units.remove(unit.path());
        }
        Ok(())
    }

    fn remove_root(&mut self, id: RootId) {
        if let Some(pos) = self.added_roots.iter().position(|r| r.id() == id) {
            self.added_roots.swap_remove(pos);
        } else {
            self.removed_roots.push(id);
        }
    }

    /// Replaces the unit sequence and recomputes every ordinal.
    pub(crate) fn set_units(&mut self, units: Vec<Unit>) {
        self.ordinals = units
            .iter()
            .enumerate()
            .map(|(i, unit)| (unit.clone(), i))
            .collect();
        self.units = units;
    }

    /// Applies the pending index changes, orders the index roots by ordinal
    /// and freezes the result.
    pub(crate) fn freeze(self) -> SylvaResult<Snapshot> {
        let index = self
            .index
            .apply(self.removed_roots, self.added_roots)?
            .in_order(
                self.units
                    .iter()
                    .filter_map(|unit| self.roots.get(unit).map(LazyRoot::id)),
            )?;
        let snapshot = Snapshot {
            units: self.units,
            ordinals: self.ordinals,
            load_directives: self.load_directives,
            loaded_units: self.loaded_units,
            roots: self.roots,
            member_name_handles: self.member_name_handles,
            index,
        };
        if cfg!(debug_assertions) {
            snapshot.check_invariants()?;
        }
        Ok(snapshot)
    }

    #[cfg(test)]
    pub(crate) fn freeze_unchecked(self) -> Snapshot {
        Snapshot {
            units: self.units,
            ordinals: self.ordinals,
            load_directives: self.load_directives,
            loaded_units: self.loaded_units,
            roots: self.roots,
            member_name_handles: self.member_name_handles,
            index: self.index,
        }
    }
}
