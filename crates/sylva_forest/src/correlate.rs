//! Salvages member-name caches from a unit that is about to be replaced.

use crate::snapshot::{no_handles, MemberNameHandles, Snapshot};
use std::sync::Arc;
use sylva_decl::Declaration;
use sylva_syntax::Unit;

/// Weak handles to the member-name sets of `old`'s skeleton, in pre-order,
/// one per cache-eligible type.
///
/// If the skeleton was never built, the handles `old` itself was seeded with
/// are passed on unchanged, so a run of edits without any query loses nothing.
pub fn correlate(old: &Unit, snapshot: &Snapshot) -> MemberNameHandles {
    let Some(realized) = snapshot.root(old).and_then(|root| root.realized()) else {
        return snapshot
            .member_name_handles(old)
            .cloned()
            .unwrap_or_else(no_handles);
    };

    let mut handles = Vec::new();
    let mut stack: Vec<&Declaration> = vec![realized.root.as_ref()];
    while let Some(node) = stack.pop() {
        if node.kind.caches_member_names() {
            if let Some(names) = &node.member_names {
                handles.push(Arc::downgrade(names));
            }
        }
        stack.extend(node.children.iter().rev().map(|child| child.as_ref()));
    }
    Arc::from(handles)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expand::Expander;
    use crate::repository::UnitRepository;
    use crate::snapshot::SnapshotBuilder;
    use sylva_common::Interner;
    use sylva_syntax::ParseOptions;

    fn single(text: &str) -> (Snapshot, Unit) {
        let unit = Unit::parse(text, "/p/a.sy", ParseOptions::script(Arc::new(Interner::new())));
        let repo = UnitRepository::default();
        let mut builder = SnapshotBuilder::new();
        Expander::new(&repo, &mut builder)
            .expand(&unit, no_handles())
            .unwrap();
        (builder.freeze().unwrap(), unit)
    }

    #[test]
    fn realized_root_yields_pre_order_handles() {
        let (snapshot, unit) = single("class A { class B { } } enum E { X } struct C { }");
        let root = snapshot.root(&unit).unwrap().get();
        let handles = correlate(&unit, &snapshot);
        // Script container, A, B, C; the enum takes no slot.
        assert_eq!(handles.len(), 4);
        let container = &root.root.children[0];
        let a = &container.children[0];
        let b = &a.children[0];
        let c = &container.children[2];
        let expected = [container, a, b, c];
        for (handle, node) in handles.iter().zip(expected) {
            let live = handle.upgrade().unwrap();
            assert!(Arc::ptr_eq(&live, node.member_names.as_ref().unwrap()));
        }
    }

    #[test]
    fn unrealized_root_passes_seed_through() {
        let (snapshot, unit) = single("class A { }");
        assert!(!snapshot.root(&unit).unwrap().is_realized());
        let handles = correlate(&unit, &snapshot);
        assert!(Arc::ptr_eq(
            &handles,
            snapshot.member_name_handles(&unit).unwrap()
        ));
    }

    #[test]
    fn unknown_unit_has_no_handles() {
        let (snapshot, unit) = single("class A { }");
        let other = unit.with_text("class A { }");
        assert!(correlate(&other, &snapshot).is_empty());
    }
}
