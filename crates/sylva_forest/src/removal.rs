//! Which units go away when a unit leaves the forest.
//!
//! Dropping a unit also drops the units it transitively loads, except those
//! that some surviving unit still loads. [`compute_removal_set`] handles one
//! target with a forward rescue scan; [`settle`] runs after the per-target
//! sets of an operation are merged and rescues anything a survivor still
//! references, wherever it sits in the sequence.

use crate::snapshot::Snapshot;
use std::collections::HashSet;
use sylva_common::{InternalError, SylvaResult};
use sylva_syntax::Unit;

/// The units to drop for one target.
#[derive(Debug, Default)]
pub struct RemovalSet {
    /// The target and every unit that goes with it.
    pub units: HashSet<Unit>,
    /// How many units the target pulled in (itself included) before any rescue.
    pub referenced: usize,
}

/// Computes the units to drop along with `target`.
///
/// With `include_loaded_units`, everything `target` transitively loads is
/// collected first. Units after `target` that still load a collected unit
/// rescue it, together with whatever it loads.
pub fn compute_removal_set(
    target: &Unit,
    include_loaded_units: bool,
    snapshot: &Snapshot,
) -> SylvaResult<RemovalSet> {
    let mut units = HashSet::new();
    if include_loaded_units {
        collect_loaded(target, snapshot, &mut units);
    }
    units.insert(target.clone());
    let referenced = units.len();

    if units.len() > 1 {
        let ordinal = snapshot.ordinal(target).ok_or_else(|| {
            InternalError::new(format!(
                "unit '{}' has no ordinal",
                target.path().display()
            ))
        })?;
        for unit in &snapshot.units()[ordinal + 1..] {
            if units.contains(unit) {
                continue;
            }
            rescue_loaded_by(unit, snapshot, &mut units, |_| false);
        }
    }

    Ok(RemovalSet { units, referenced })
}

/// Rescues from `removed` every unit that a surviving unit still loads.
/// Units in `targets` stay removed.
pub fn settle(removed: &mut HashSet<Unit>, targets: &HashSet<Unit>, snapshot: &Snapshot) {
    for unit in snapshot.units() {
        if removed.contains(unit) {
            continue;
        }
        rescue_loaded_by(unit, snapshot, removed, |u| targets.contains(u));
    }
}

/// Adds every unit `unit` transitively loads to `out`, depth first.
fn collect_loaded(unit: &Unit, snapshot: &Snapshot, out: &mut HashSet<Unit>) {
    let Some(directives) = snapshot.load_directives(unit) else {
        return;
    };
    for directive in directives {
        if let Some(loaded) = snapshot.resolve_directive(directive) {
            if out.insert(loaded.clone()) {
                collect_loaded(loaded, snapshot, out);
            }
        }
    }
}

/// Takes the units `survivor` loads, and what they load in turn, out of `removed`.
fn rescue_loaded_by(
    survivor: &Unit,
    snapshot: &Snapshot,
    removed: &mut HashSet<Unit>,
    pinned: impl Fn(&Unit) -> bool + Copy,
) {
    let Some(directives) = snapshot.load_directives(survivor) else {
        return;
    };
    for directive in directives {
        let Some(loaded) = snapshot.resolve_directive(directive) else {
            continue;
        };
        if !pinned(loaded) && removed.remove(loaded) {
            tracing::trace!(
                path = %loaded.path().display(),
                by = %survivor.path().display(),
                "rescued loaded unit"
            );
            rescue_loaded_by(loaded, snapshot, removed, pinned);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expand::Expander;
    use crate::repository::UnitRepository;
    use crate::snapshot::{no_handles, SnapshotBuilder};
    use std::path::Path;
    use std::sync::Arc;
    use sylva_common::Interner;
    use sylva_source::InMemoryResolver;
    use sylva_syntax::ParseOptions;

    struct Forest {
        snapshot: Snapshot,
    }

    impl Forest {
        fn build(files: &[(&str, &str)], externals: &[(&str, &str)]) -> (Self, Vec<Unit>) {
            let mut resolver = InMemoryResolver::new();
            for (path, text) in files {
                resolver.insert(path, *text);
            }
            let repo = UnitRepository::default().with_resolver(Arc::new(resolver));
            let options = ParseOptions::script(Arc::new(Interner::new()));
            let units: Vec<Unit> = externals
                .iter()
                .map(|(path, text)| Unit::parse(*text, *path, options.clone()))
                .collect();
            let mut builder = SnapshotBuilder::new();
            let mut expander = Expander::new(&repo, &mut builder);
            for unit in &units {
                expander.expand(unit, no_handles()).unwrap();
            }
            let snapshot = builder.freeze().unwrap();
            (Self { snapshot }, units)
        }

        fn loaded(&self, path: &str) -> Unit {
            self.snapshot.loaded_unit(Path::new(path)).unwrap().clone()
        }
    }

    #[test]
    fn unit_without_loads_removes_only_itself() {
        let (forest, units) = Forest::build(&[], &[("/p/a.sy", "class A { }")]);
        let set = compute_removal_set(&units[0], true, &forest.snapshot).unwrap();
        assert_eq!(set.units.len(), 1);
        assert_eq!(set.referenced, 1);
    }

    #[test]
    fn loaded_closure_is_removed() {
        let (forest, units) = Forest::build(
            &[("/p/x.sy", "#load \"y.sy\""), ("/p/y.sy", "class Y { }")],
            &[("/p/a.sy", "#load \"x.sy\"")],
        );
        let set = compute_removal_set(&units[0], true, &forest.snapshot).unwrap();
        assert_eq!(set.units.len(), 3);
        assert_eq!(set.referenced, 3);
        assert!(set.units.contains(&forest.loaded("/p/y.sy")));
    }

    #[test]
    fn without_loaded_units_only_target() {
        let (forest, units) = Forest::build(
            &[("/p/x.sy", "class X { }")],
            &[("/p/a.sy", "#load \"x.sy\"")],
        );
        let set = compute_removal_set(&units[0], false, &forest.snapshot).unwrap();
        assert_eq!(set.units.len(), 1);
    }

    #[test]
    fn later_loader_rescues_transitively() {
        let (forest, units) = Forest::build(
            &[("/p/x.sy", "#load \"y.sy\""), ("/p/y.sy", "class Y { }")],
            &[("/p/a.sy", "#load \"x.sy\""), ("/p/b.sy", "#load \"x.sy\"")],
        );
        let set = compute_removal_set(&units[0], true, &forest.snapshot).unwrap();
        assert_eq!(set.referenced, 3);
        assert_eq!(set.units.len(), 1);
        assert!(set.units.contains(&units[0]));
    }

    #[test]
    fn earlier_loader_needs_settling() {
        let (forest, units) = Forest::build(
            &[("/p/x.sy", "class X { }")],
            &[("/p/b.sy", "#load \"x.sy\""), ("/p/a.sy", "#load \"x.sy\"")],
        );
        let x = forest.loaded("/p/x.sy");
        let a = &units[1];
        let mut set = compute_removal_set(a, true, &forest.snapshot).unwrap();
        // b precedes a, so the forward scan from a sees nothing.
        assert!(set.units.contains(&x));
        let targets: HashSet<Unit> = [a.clone()].into_iter().collect();
        settle(&mut set.units, &targets, &forest.snapshot);
        assert!(!set.units.contains(&x));
        assert!(set.units.contains(a));
    }

    #[test]
    fn removing_every_loader_removes_shared_unit() {
        let (forest, units) = Forest::build(
            &[("/p/x.sy", "class X { }")],
            &[("/p/a.sy", "#load \"x.sy\""), ("/p/b.sy", "#load \"x.sy\"")],
        );
        let targets: HashSet<Unit> = units.iter().cloned().collect();
        let mut removed = HashSet::new();
        for target in &units {
            removed.extend(compute_removal_set(target, true, &forest.snapshot).unwrap().units);
        }
        settle(&mut removed, &targets, &forest.snapshot);
        assert_eq!(removed.len(), 3);
        assert!(removed.contains(&forest.loaded("/p/x.sy")));
    }

    #[test]
    fn missing_ordinal_is_internal_error() {
        let (forest, units) = Forest::build(
            &[("/p/x.sy", "class X { }")],
            &[("/p/a.sy", "#load \"x.sy\"")],
        );
        let mut builder = SnapshotBuilder::from_snapshot(&forest.snapshot);
        builder.ordinals.remove(&units[0]);
        let broken = builder.freeze_unchecked();
        assert!(compute_removal_set(&units[0], true, &broken).is_err());
    }
}
