//! Conformance test helpers for the Sylva unit forest.
//!
//! Provides a [`Workspace`] fixture that serves script files from memory and
//! builds managers over them, plus assertions shared by the integration
//! tests in `tests/`.

#![warn(missing_docs)]

use std::path::Path;
use std::sync::Arc;
use sylva_common::{Ident, Interner};
use sylva_decl::{DeclKind, Declaration, MemberNameSet, RootDeclaration};
use sylva_forest::{Manager, Snapshot, UnitRepository};
use sylva_source::InMemoryResolver;
use sylva_syntax::{ParseOptions, Unit};

/// An in-memory project: files reachable through `#load`, a shared interner
/// and a repository resolving against those files.
pub struct Workspace {
    /// Options every external unit is parsed with.
    pub options: ParseOptions,
    /// Repository handed to every manager.
    pub repository: UnitRepository,
}

impl Workspace {
    /// Creates a workspace serving `files` (absolute path, text) to `#load`.
    pub fn new(files: &[(&str, &str)]) -> Self {
        let mut resolver = InMemoryResolver::new();
        for (path, text) in files {
            resolver.insert(path, *text);
        }
        Self::with_repository(UnitRepository::default().with_resolver(Arc::new(resolver)))
    }

    /// Creates a workspace over an explicit repository.
    pub fn with_repository(repository: UnitRepository) -> Self {
        Self {
            options: ParseOptions::script(Arc::new(Interner::new())),
            repository,
        }
    }

    /// Parses a script unit at `path`.
    pub fn script(&self, path: &str, text: &str) -> Unit {
        Unit::parse(text, path, self.options.clone())
    }

    /// Creates a manager over `units`.
    pub fn manager(&self, units: &[Unit]) -> Manager {
        Manager::with_units(self.repository.clone(), units.iter().cloned())
            .unwrap_or_else(|e| panic!("cannot create manager: {e}"))
    }

    /// Creates a manager over `units` and materializes its snapshot.
    pub fn materialized(&self, units: &[Unit]) -> Manager {
        let manager = self.manager(units);
        manager
            .snapshot()
            .unwrap_or_else(|e| panic!("cannot materialize: {e}"));
        manager
    }

    /// Interns `name` in the workspace interner.
    pub fn ident(&self, name: &str) -> Ident {
        self.options.interner.get_or_intern(name)
    }
}

/// Paths of the snapshot's units, in order.
pub fn unit_paths(snapshot: &Snapshot) -> Vec<String> {
    snapshot
        .units()
        .iter()
        .map(|u| u.path().display().to_string())
        .collect()
}

/// Asserts the structural invariants and that ordinals are exactly `0..len`.
pub fn assert_dense(snapshot: &Snapshot) {
    if let Err(e) = snapshot.check_invariants() {
        panic!("snapshot invariants violated: {e}");
    }
    for (i, unit) in snapshot.units().iter().enumerate() {
        assert_eq!(snapshot.ordinal(unit), Some(i), "ordinal of {unit:?}");
    }
}

/// Asserts that every resolved directive in the snapshot points at a unit
/// that is part of it.
pub fn assert_reachable(snapshot: &Snapshot) {
    for unit in snapshot.units() {
        for directive in snapshot.load_directives(unit).unwrap_or(&[]) {
            if directive.resolved_path.is_some() {
                let target = snapshot.resolve_directive(directive);
                assert!(
                    target.is_some_and(|t| snapshot.contains(t)),
                    "{} loads {:?}, which is missing",
                    unit.path().display(),
                    directive.resolved_path
                );
            }
        }
    }
}

/// The loaded unit at `path`.
pub fn loaded(snapshot: &Snapshot, path: &str) -> Unit {
    snapshot
        .loaded_unit(Path::new(path))
        .unwrap_or_else(|| panic!("{path} is not loaded"))
        .clone()
}

/// Realizes `unit`'s skeleton in `snapshot`.
pub fn skeleton(snapshot: &Snapshot, unit: &Unit) -> Arc<RootDeclaration> {
    let root = snapshot
        .root(unit)
        .unwrap_or_else(|| panic!("{unit:?} has no root"));
    Arc::clone(root.get())
}

/// Member-name sets of the cache-eligible types of a skeleton, in pre-order.
pub fn eligible_member_sets(root: &RootDeclaration) -> Vec<Arc<MemberNameSet>> {
    root.root
        .descendants()
        .filter(|d| d.kind.caches_member_names())
        .filter_map(|d| d.member_names.clone())
        .collect()
}

/// The first type named `name` anywhere in a skeleton.
pub fn find_type<'a>(root: &'a RootDeclaration, name: Ident) -> Option<&'a Declaration> {
    root.root
        .descendants()
        .find(|d| d.kind != DeclKind::Namespace && d.name == name)
}
