//! The merged declaration index over every unit of a forest.

use crate::decl::{DeclKind, Declaration};
use crate::lazy_root::{LazyRoot, RootId};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Arc, OnceLock};
use sylva_common::{Ident, InternalError, SylvaResult};

/// An immutable, ordered set of lazy roots with a merged namespace view.
///
/// [`add_root`](Self::add_root) and [`remove_root`](Self::remove_root) return a
/// new index and leave `self` untouched. Roots keep the order they were added
/// in until [`in_order`](Self::in_order) sets another one; the merged view
/// lists same-named types in that order. The view is computed on first query
/// and cached for the lifetime of this index instance; it realizes every root.
#[derive(Clone, Default)]
pub struct DeclarationIndex {
    roots: Arc<BTreeMap<RootId, LazyRoot>>,
    order: Arc<Vec<RootId>>,
    merged: Arc<OnceLock<MergedNamespace>>,
}

/// One namespace of the merged view: the union of every same-named namespace
/// declared by any unit.
#[derive(Debug, Default)]
pub struct MergedNamespace {
    namespaces: BTreeMap<Ident, MergedNamespace>,
    types: BTreeMap<Ident, Vec<Arc<Declaration>>>,
}

impl MergedNamespace {
    /// A child namespace by name.
    pub fn namespace(&self, name: Ident) -> Option<&MergedNamespace> {
        self.namespaces.get(&name)
    }

    /// Every declaration of a type with this name directly in this namespace.
    /// Partial declarations from several units all appear.
    pub fn types_named(&self, name: Ident) -> &[Arc<Declaration>] {
        self.types.get(&name).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Names of child namespaces.
    pub fn namespace_names(&self) -> impl Iterator<Item = Ident> + '_ {
        self.namespaces.keys().copied()
    }

    /// Names of types declared directly in this namespace.
    pub fn type_names(&self) -> impl Iterator<Item = Ident> + '_ {
        self.types.keys().copied()
    }

    fn absorb(&mut self, decl: &Declaration) {
        for child in &decl.children {
            if child.kind == DeclKind::Namespace {
                self.namespaces.entry(child.name).or_default().absorb(child);
            } else {
                self.types
                    .entry(child.name)
                    .or_default()
                    .push(Arc::clone(child));
            }
        }
    }
}

impl DeclarationIndex {
    /// Creates an empty index.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a new index that also contains `root`.
    ///
    /// Adding a root that is already present is a bookkeeping bug.
    pub fn add_root(&self, root: LazyRoot) -> SylvaResult<Self> {
        if self.roots.contains_key(&root.id()) {
            return Err(InternalError::new(format!(
                "declaration root for '{}' added twice",
                root.unit().path().display()
            )));
        }
        let mut roots = (*self.roots).clone();
        let order = self.order.iter().copied().chain([root.id()]).collect();
        roots.insert(root.id(), root);
        Ok(Self::from_parts(roots, order))
    }

    /// Returns a new index without the root `id`.
    ///
    /// Removing a root that is absent is a bookkeeping bug.
    pub fn remove_root(&self, id: RootId) -> SylvaResult<Self> {
        let mut roots = (*self.roots).clone();
        if roots.remove(&id).is_none() {
            return Err(InternalError::new(format!(
                "declaration root {id:?} is not in the index"
            )));
        }
        let order = self.order.iter().copied().filter(|r| *r != id).collect();
        Ok(Self::from_parts(roots, order))
    }

    /// Removes then adds roots in one copy. Same error rules as
    /// [`add_root`](Self::add_root) and [`remove_root`](Self::remove_root).
    pub fn apply(
        &self,
        removed: impl IntoIterator<Item = RootId>,
        added: impl IntoIterator<Item = LazyRoot>,
    ) -> SylvaResult<Self> {
        let mut roots = (*self.roots).clone();
        for id in removed {
            if roots.remove(&id).is_none() {
                return Err(InternalError::new(format!(
                    "declaration root {id:?} is not in the index"
                )));
            }
        }
        let mut order: Vec<RootId> = self
            .order
            .iter()
            .copied()
            .filter(|id| roots.contains_key(id))
            .collect();
        for root in added {
            let id = root.id();
            if roots.insert(id, root).is_some() {
                return Err(InternalError::new(format!(
                    "declaration root {id:?} added twice"
                )));
            }
            order.push(id);
        }
        Ok(Self::from_parts(roots, order))
    }

    /// Returns the same roots listed in `order`, which must name every root
    /// exactly once.
    pub fn in_order(&self, order: impl IntoIterator<Item = RootId>) -> SylvaResult<Self> {
        let order: Vec<RootId> = order.into_iter().collect();
        let mut seen = BTreeSet::new();
        for id in &order {
            if !self.roots.contains_key(id) || !seen.insert(*id) {
                return Err(InternalError::new(format!(
                    "root order names {id:?} twice or names an unknown root"
                )));
            }
        }
        if seen.len() != self.roots.len() {
            return Err(InternalError::new(format!(
                "root order covers {} of {} roots",
                seen.len(),
                self.roots.len()
            )));
        }
        Ok(Self {
            roots: Arc::clone(&self.roots),
            order: Arc::new(order),
            merged: Arc::new(OnceLock::new()),
        })
    }

    fn from_parts(roots: BTreeMap<RootId, LazyRoot>, order: Vec<RootId>) -> Self {
        Self {
            roots: Arc::new(roots),
            order: Arc::new(order),
            merged: Arc::new(OnceLock::new()),
        }
    }

    /// Returns `true` if the root `id` is present.
    pub fn contains(&self, id: RootId) -> bool {
        self.roots.contains_key(&id)
    }

    /// The number of roots.
    pub fn len(&self) -> usize {
        self.roots.len()
    }

    /// Returns `true` if the index holds no roots.
    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    /// Iterates the roots in index order.
    pub fn roots(&self) -> impl Iterator<Item = &LazyRoot> + '_ {
        self.order.iter().filter_map(|id| self.roots.get(id))
    }

    /// The merged global namespace.
    pub fn global_namespace(&self) -> &MergedNamespace {
        self.merged.get_or_init(|| {
            let mut global = MergedNamespace::default();
            for root in self.roots() {
                global.absorb(&root.get().root);
            }
            global
        })
    }

    /// Looks up a namespace by its path of names. The empty path is the global
    /// namespace.
    pub fn namespace(&self, path: &[Ident]) -> Option<&MergedNamespace> {
        path.iter()
            .try_fold(self.global_namespace(), |ns, name| ns.namespace(*name))
    }

    /// Every declaration of type `name` inside the namespace at `path`.
    pub fn types_named(&self, path: &[Ident], name: Ident) -> &[Arc<Declaration>] {
        self.namespace(path)
            .map(|ns| ns.types_named(name))
            .unwrap_or(&[])
    }

    /// Paths named by `#r` directives across every unit, in root order.
    pub fn reference_directives(&self) -> Vec<String> {
        self.roots()
            .flat_map(|root| root.get().reference_directives.iter().cloned())
            .collect()
    }
}

impl std::fmt::Debug for DeclarationIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeclarationIndex")
            .field("roots", &self.roots.len())
            .field("merged", &self.merged.get().is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::SkeletonOptions;
    use sylva_common::Interner;
    use sylva_syntax::{ParseOptions, Unit};

    struct Fixture {
        interner: Arc<Interner>,
        options: Arc<SkeletonOptions>,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                interner: Arc::new(Interner::new()),
                options: Arc::new(SkeletonOptions::default()),
            }
        }

        fn root(&self, text: &str) -> LazyRoot {
            let unit = Unit::parse(text, "u.sy", ParseOptions::ordinary(Arc::clone(&self.interner)));
            LazyRoot::new(unit, Arc::clone(&self.options), Arc::from(Vec::new()))
        }

        fn script_root(&self, text: &str) -> LazyRoot {
            let unit = Unit::parse(text, "s.sy", ParseOptions::script(Arc::clone(&self.interner)));
            LazyRoot::new(unit, Arc::clone(&self.options), Arc::from(Vec::new()))
        }

        fn id(&self, s: &str) -> Ident {
            self.interner.get_or_intern(s)
        }
    }

    #[test]
    fn add_and_remove_are_copy_on_write() {
        let fx = Fixture::new();
        let a = fx.root("class A { }");
        let empty = DeclarationIndex::new();
        let one = empty.add_root(a.clone()).unwrap();
        assert!(empty.is_empty());
        assert_eq!(one.len(), 1);
        assert!(one.contains(a.id()));
        let none = one.remove_root(a.id()).unwrap();
        assert!(none.is_empty());
        assert_eq!(one.len(), 1);
    }

    #[test]
    fn double_add_is_internal_error() {
        let fx = Fixture::new();
        let a = fx.root("class A { }");
        let index = DeclarationIndex::new().add_root(a.clone()).unwrap();
        assert!(index.add_root(a).is_err());
    }

    #[test]
    fn missing_remove_is_internal_error() {
        let fx = Fixture::new();
        let a = fx.root("class A { }");
        assert!(DeclarationIndex::new().remove_root(a.id()).is_err());
    }

    #[test]
    fn apply_batches_changes() {
        let fx = Fixture::new();
        let a = fx.root("class A { }");
        let b = fx.root("class B { }");
        let index = DeclarationIndex::new().add_root(a.clone()).unwrap();
        let swapped = index.apply([a.id()], [b.clone()]).unwrap();
        assert!(!swapped.contains(a.id()));
        assert!(swapped.contains(b.id()));
        assert!(swapped.apply([a.id()], []).is_err());
        assert!(swapped.apply([], [b]).is_err());
    }

    #[test]
    fn namespaces_merge_across_units() {
        let fx = Fixture::new();
        let index = DeclarationIndex::new()
            .add_root(fx.root("namespace N.M { class A { } }"))
            .unwrap()
            .add_root(fx.root("namespace N { namespace M { class B { } class A { } } }"))
            .unwrap();
        let path = [fx.id("N"), fx.id("M")];
        let ns = index.namespace(&path).unwrap();
        let names: Vec<Ident> = ns.type_names().collect();
        assert_eq!(names.len(), 2);
        assert_eq!(index.types_named(&path, fx.id("A")).len(), 2);
        assert_eq!(index.types_named(&path, fx.id("B")).len(), 1);
        assert!(index.namespace(&[fx.id("Missing")]).is_none());
    }

    #[test]
    fn merged_view_is_cached_per_instance() {
        let fx = Fixture::new();
        let index = DeclarationIndex::new().add_root(fx.root("class A { }")).unwrap();
        let first: *const MergedNamespace = index.global_namespace();
        let second: *const MergedNamespace = index.clone().global_namespace();
        assert_eq!(first, second);
        let grown = index.add_root(fx.root("class B { }")).unwrap();
        assert_eq!(grown.global_namespace().type_names().count(), 2);
        assert_eq!(index.global_namespace().type_names().count(), 1);
    }

    #[test]
    fn merged_view_follows_root_order() {
        let fx = Fixture::new();
        let first = fx.root("class T { fn first; }");
        let second = fx.root("class T { fn second; }");
        let index = DeclarationIndex::new()
            .add_root(first.clone())
            .unwrap()
            .add_root(second.clone())
            .unwrap();
        let leading = |index: &DeclarationIndex| {
            let decls = index.types_named(&[], fx.id("T"));
            assert_eq!(decls.len(), 2);
            decls[0].member_names.clone().unwrap()
        };
        assert!(leading(&index).contains(fx.id("first")));

        let flipped = index.in_order([second.id(), first.id()]).unwrap();
        assert!(leading(&flipped).contains(fx.id("second")));
        assert!(leading(&index).contains(fx.id("first")));
        let ids: Vec<RootId> = flipped.roots().map(LazyRoot::id).collect();
        assert_eq!(ids, [second.id(), first.id()]);

        assert!(index.in_order([first.id()]).is_err());
        assert!(index.in_order([first.id(), first.id()]).is_err());
    }

    #[test]
    fn script_container_and_references() {
        let fx = Fixture::new();
        let index = DeclarationIndex::new()
            .add_root(fx.script_root("#r \"Numerics\"\nfn main;"))
            .unwrap()
            .add_root(fx.script_root("#r \"Text\"\nfn other;"))
            .unwrap();
        let containers = index.types_named(&[], fx.id("Script"));
        assert_eq!(containers.len(), 2);
        assert_eq!(
            index.reference_directives(),
            vec!["Numerics".to_string(), "Text".to_string()]
        );
    }
}
