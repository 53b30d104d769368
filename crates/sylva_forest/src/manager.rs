//! The forest façade: external units plus a lazily materialized snapshot.

use crate::correlate::correlate;
use crate::error::ForestError;
use crate::expand::Expander;
use crate::removal::{compute_removal_set, settle};
use crate::repository::UnitRepository;
use crate::snapshot::{no_handles, MemberNameHandles, Snapshot, SnapshotBuilder};
use arc_swap::ArcSwapOption;
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;
use sylva_common::{InternalError, SylvaResult};
use sylva_decl::{DeclarationIndex, LazyRoot};
use sylva_syntax::Unit;

/// The set of units feeding one compilation.
///
/// A manager never changes: [`add_units`](Self::add_units),
/// [`remove_units`](Self::remove_units) and [`replace_unit`](Self::replace_unit)
/// return a new manager and leave this one (and any snapshot it handed out)
/// valid.
///
/// The [`Snapshot`] is computed on first demand. Threads racing on the first
/// request may each build one; exactly one is published and every caller
/// gets that one. When this manager has no snapshot yet, the edit operations
/// only update the external unit list and stay lazy.
#[derive(Clone)]
pub struct Manager {
    external: Arc<[Unit]>,
    repository: Arc<UnitRepository>,
    state: Arc<ArcSwapOption<Snapshot>>,
}

impl Manager {
    /// Creates a manager without units.
    pub fn new(repository: UnitRepository) -> Self {
        Self::from_parts(Arc::from(Vec::new()), Arc::new(repository), None)
    }

    /// Creates a manager over `units`, in order.
    pub fn with_units(
        repository: UnitRepository,
        units: impl IntoIterator<Item = Unit>,
    ) -> Result<Self, ForestError> {
        Self::new(repository).add_units(units)
    }

    fn from_parts(
        external: Arc<[Unit]>,
        repository: Arc<UnitRepository>,
        snapshot: Option<Snapshot>,
    ) -> Self {
        Self {
            external,
            repository,
            state: Arc::new(ArcSwapOption::from(snapshot.map(Arc::new))),
        }
    }

    /// The units added by the host, in order. Units pulled in by `#load` are
    /// not listed here.
    pub fn external_units(&self) -> &[Unit] {
        &self.external
    }

    /// The repository shared by every manager derived from this one.
    pub fn repository(&self) -> &UnitRepository {
        &self.repository
    }

    /// Returns `true` once the snapshot has been computed.
    pub fn is_materialized(&self) -> bool {
        self.state.load().is_some()
    }

    /// The current snapshot, computing it on first use.
    pub fn snapshot(&self) -> Result<Arc<Snapshot>, ForestError> {
        if let Some(snapshot) = self.state.load_full() {
            return Ok(snapshot);
        }
        let fresh = Arc::new(build_snapshot(&self.repository, &self.external)?);
        let previous = self
            .state
            .compare_and_swap(&None::<Arc<Snapshot>>, Some(Arc::clone(&fresh)));
        match &*previous {
            Some(winner) => {
                tracing::trace!("discarding snapshot built concurrently");
                Ok(Arc::clone(winner))
            }
            None => {
                tracing::debug!(units = fresh.len(), "materialized forest snapshot");
                Ok(fresh)
            }
        }
    }

    /// The merged declaration index of the current snapshot.
    pub fn declaration_index(&self) -> Result<DeclarationIndex, ForestError> {
        Ok(self.snapshot()?.declaration_index().clone())
    }

    /// Returns `true` if any unit carries a `#load` or `#r` directive.
    ///
    /// Answers from the external units when no snapshot exists yet; units are
    /// only ever loaded through an external unit's directives.
    pub fn has_reference_or_load_directives(&self) -> bool {
        match &*self.state.load() {
            Some(snapshot) => snapshot.has_reference_or_load_directives(),
            None => self
                .external
                .iter()
                .any(Unit::has_reference_or_load_directives),
        }
    }

    /// Returns a manager with `units` appended, along with everything they load.
    pub fn add_units(&self, units: impl IntoIterator<Item = Unit>) -> Result<Self, ForestError> {
        let units: Vec<Unit> = units.into_iter().collect();
        let mut seen: HashSet<&Unit> = self.external.iter().collect();
        for unit in &units {
            if !seen.insert(unit) {
                return Err(ForestError::DuplicateUnit(unit.path().to_path_buf()));
            }
        }
        let external: Arc<[Unit]> = self.external.iter().chain(&units).cloned().collect();
        tracing::debug!(added = units.len(), total = external.len(), "adding units");

        let Some(snapshot) = self.state.load_full() else {
            return Ok(Self::from_parts(external, Arc::clone(&self.repository), None));
        };
        let mut builder = SnapshotBuilder::from_snapshot(&snapshot);
        let mut expander = Expander::new(&self.repository, &mut builder);
        for unit in &units {
            expander.expand(unit, no_handles())?;
        }
        let next = builder.freeze()?;
        Ok(Self::from_parts(external, Arc::clone(&self.repository), Some(next)))
    }

    /// Returns a manager without `units`. Units they loaded go too, unless a
    /// remaining unit still loads them.
    pub fn remove_units(&self, units: &HashSet<Unit>) -> Result<Self, ForestError> {
        let known: HashSet<&Unit> = self.external.iter().collect();
        if let Some(unknown) = units.iter().find(|u| !known.contains(u)) {
            return Err(ForestError::UnknownUnit(unknown.path().to_path_buf()));
        }
        let external: Arc<[Unit]> = self
            .external
            .iter()
            .filter(|u| !units.contains(*u))
            .cloned()
            .collect();
        tracing::debug!(removed = units.len(), total = external.len(), "removing units");

        let Some(snapshot) = self.state.load_full() else {
            return Ok(Self::from_parts(external, Arc::clone(&self.repository), None));
        };
        let mut removed = HashSet::new();
        for target in units {
            let set = compute_removal_set(target, true, &snapshot)?;
            tracing::trace!(
                path = %target.path().display(),
                referenced = set.referenced,
                dropped = set.units.len(),
                "computed removal set"
            );
            removed.extend(set.units);
        }
        settle(&mut removed, units, &snapshot);

        let mut builder = SnapshotBuilder::from_snapshot(&snapshot);
        drop_units(&mut builder, &snapshot, &removed)?;
        builder.set_units(
            snapshot
                .units()
                .iter()
                .filter(|u| !removed.contains(*u))
                .cloned()
                .collect(),
        );
        let next = builder.freeze()?;
        Ok(Self::from_parts(external, Arc::clone(&self.repository), Some(next)))
    }

    /// Returns a manager with `old` replaced by `new` at the same position.
    ///
    /// When both request the same `#load` paths, only `old`'s own entry is
    /// swapped and everything it loaded stays as it was. Otherwise `old` is
    /// removed like [`remove_units`](Self::remove_units) would and `new` is
    /// expanded in its place. Either way `new`'s skeleton may take over
    /// member-name sets from `old`'s.
    pub fn replace_unit(&self, old: &Unit, new: Unit) -> Result<Self, ForestError> {
        let position = self
            .external
            .iter()
            .position(|u| u == old)
            .ok_or_else(|| ForestError::UnknownUnit(old.path().to_path_buf()))?;
        if self.external.contains(&new) {
            return Err(ForestError::DuplicateUnit(new.path().to_path_buf()));
        }
        let mut external = self.external.to_vec();
        external[position] = new.clone();
        let external: Arc<[Unit]> = Arc::from(external);

        let Some(snapshot) = self.state.load_full() else {
            tracing::debug!(path = %new.path().display(), "replacing unit (lazy)");
            return Ok(Self::from_parts(external, Arc::clone(&self.repository), None));
        };
        let handles = correlate(old, &snapshot);
        let unchanged = old.kind() == new.kind() && old.load_directives_equivalent(&new);
        tracing::debug!(
            path = %new.path().display(),
            text_changed = !old.has_same_text(&new),
            directives_changed = !unchanged,
            reusable = handles.len(),
            "replacing unit"
        );

        let next = if unchanged {
            self.replace_in_place(&snapshot, old, new, handles)?
        } else {
            self.replace_and_expand(&snapshot, old, new, handles)?
        };
        Ok(Self::from_parts(external, Arc::clone(&self.repository), Some(next)))
    }

    fn replace_in_place(
        &self,
        snapshot: &Snapshot,
        old: &Unit,
        new: Unit,
        handles: MemberNameHandles,
    ) -> SylvaResult<Snapshot> {
        let ordinal = ordinal_of(snapshot, old)?;
        let mut builder = SnapshotBuilder::from_snapshot(snapshot);
        let directives = builder.load_directives.get(old).cloned();
        builder.forget(old)?;
        let mut units = snapshot.units().to_vec();
        units[ordinal] = new.clone();
        builder.set_units(units);

        if let Some(directives) = directives {
            builder.load_directives.insert(new.clone(), directives);
        }
        let root = LazyRoot::new(
            new.clone(),
            Arc::clone(self.repository.skeleton_options()),
            Arc::clone(&handles),
        );
        builder.add_root(new.clone(), root);
        builder.member_name_handles.insert(new, handles);
        builder.freeze()
    }

    fn replace_and_expand(
        &self,
        snapshot: &Snapshot,
        old: &Unit,
        new: Unit,
        handles: MemberNameHandles,
    ) -> SylvaResult<Snapshot> {
        let ordinal = ordinal_of(snapshot, old)?;
        let set = compute_removal_set(old, true, snapshot)?;
        let mut removed = set.units;
        let targets: HashSet<Unit> = [old.clone()].into_iter().collect();
        settle(&mut removed, &targets, snapshot);
        tracing::trace!(
            referenced = set.referenced,
            dropped = removed.len(),
            "computed removal set"
        );

        let mut builder = SnapshotBuilder::from_snapshot(snapshot);
        drop_units(&mut builder, snapshot, &removed)?;
        let (before, after) = snapshot.units().split_at(ordinal);
        let survivors = |units: &[Unit]| -> Vec<Unit> {
            units
                .iter()
                .filter(|u| !removed.contains(*u))
                .cloned()
                .collect()
        };
        let prefix = survivors(before);
        let tail = survivors(&after[1..]);

        builder.set_units(prefix);
        Expander::new(&self.repository, &mut builder).expand(&new, handles)?;
        for unit in tail {
            if !builder.is_placed(&unit) {
                builder.push_existing(unit)?;
            }
        }
        builder.freeze()
    }
}

fn build_snapshot(repository: &UnitRepository, external: &[Unit]) -> SylvaResult<Snapshot> {
    let mut builder = SnapshotBuilder::new();
    let mut expander = Expander::new(repository, &mut builder);
    for unit in external {
        expander.expand(unit, no_handles())?;
    }
    builder.freeze()
}

fn ordinal_of(snapshot: &Snapshot, unit: &Unit) -> SylvaResult<usize> {
    snapshot.ordinal(unit).ok_or_else(|| {
        InternalError::new(format!(
            "external unit '{}' has no ordinal",
            unit.path().display()
        ))
    })
}

/// Forgets every unit in `removed`, in sequence order.
fn drop_units(
    builder: &mut SnapshotBuilder,
    snapshot: &Snapshot,
    removed: &HashSet<Unit>,
) -> SylvaResult<()> {
    for unit in snapshot.units().iter().filter(|u| removed.contains(*u)) {
        builder.forget(unit)?;
    }
    Ok(())
}

impl fmt::Debug for Manager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Manager")
            .field("external", &self.external.len())
            .field("materialized", &self.is_materialized())
            .field("repository", &self.repository)
            .finish()
    }
}
