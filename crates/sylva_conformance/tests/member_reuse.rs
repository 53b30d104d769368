//! Member-name sets carried from a replaced unit's skeleton into its
//! replacement's.

use std::sync::Arc;
use sylva_conformance::{eligible_member_sets, find_type, skeleton, Workspace};
use sylva_decl::MemberNameSet;

fn same(a: &Arc<MemberNameSet>, b: &Arc<MemberNameSet>) -> bool {
    Arc::ptr_eq(a, b)
}

#[test]
fn unchanged_types_keep_their_sets() {
    let ws = Workspace::new(&[]);
    let a = ws.script(
        "/p/a.sy",
        "class A { fn a; } struct B { field b; } interface C { fn c; }",
    );
    let manager = ws.materialized(&[a.clone()]);
    let old = skeleton(&manager.snapshot().unwrap(), &a);
    let old_sets = eligible_member_sets(&old);
    assert_eq!(old_sets.len(), 4);

    let a2 = a.with_text("class A { fn a; } struct B { field b; } interface C { fn c2; }");
    let next = manager.replace_unit(&a, a2.clone()).unwrap();
    let new = skeleton(&next.snapshot().unwrap(), &a2);
    let new_sets = eligible_member_sets(&new);

    // Script container, A and B carried over; C recomputed.
    assert!(same(&old_sets[0], &new_sets[0]));
    assert!(same(&old_sets[1], &new_sets[1]));
    assert!(same(&old_sets[2], &new_sets[2]));
    assert!(!same(&old_sets[3], &new_sets[3]));
    assert!(new_sets[3].contains(ws.ident("c2")));
    assert!(!new_sets[3].contains(ws.ident("c")));
    assert_eq!(new.stats.reused, 3);
    assert_eq!(new.stats.recomputed, 1);
}

#[test]
fn reuse_survives_a_directive_change() {
    let ws = Workspace::new(&[("/p/x.sy", "class X { }")]);
    let a = ws.script("/p/a.sy", "class A { fn a; }");
    let manager = ws.materialized(&[a.clone()]);
    let old_sets = eligible_member_sets(&skeleton(&manager.snapshot().unwrap(), &a));

    let a2 = a.with_text("#load \"x.sy\"\nclass A { fn a; }");
    let next = manager.replace_unit(&a, a2.clone()).unwrap();
    let snapshot = next.snapshot().unwrap();
    assert_eq!(snapshot.len(), 2);
    let new_sets = eligible_member_sets(&skeleton(&snapshot, &a2));
    assert!(same(&old_sets[1], &new_sets[1]));
}

#[test]
fn deleting_a_type_never_yields_wrong_members() {
    let ws = Workspace::new(&[]);
    let a = ws.script("/p/a.sy", "class A { fn a; } class B { fn b; } class C { fn c; }");
    let manager = ws.materialized(&[a.clone()]);
    let old = skeleton(&manager.snapshot().unwrap(), &a);
    let old_sets = eligible_member_sets(&old);

    // Deleting A shifts B and C into A's and B's slots.
    let a2 = a.with_text("class B { fn b; } class C { fn c; }");
    let next = manager.replace_unit(&a, a2.clone()).unwrap();
    let new = skeleton(&next.snapshot().unwrap(), &a2);

    let b = find_type(&new, ws.ident("B")).unwrap();
    let c = find_type(&new, ws.ident("C")).unwrap();
    let b_names = b.member_names.as_ref().unwrap();
    let c_names = c.member_names.as_ref().unwrap();
    assert!(b_names.contains(ws.ident("b")) && !b_names.contains(ws.ident("a")));
    assert!(c_names.contains(ws.ident("c")) && !c_names.contains(ws.ident("b")));
    assert!(!same(b_names, &old_sets[1]));
    assert!(!same(c_names, &old_sets[2]));
    assert_eq!(new.stats.reused, 0);
}

#[test]
fn inserting_a_type_never_yields_wrong_members() {
    let ws = Workspace::new(&[]);
    let a = ws.script("/p/a.sy", "class B { fn b; }");
    let manager = ws.materialized(&[a.clone()]);
    let _old = skeleton(&manager.snapshot().unwrap(), &a);

    let a2 = a.with_text("class A { fn a; } class B { fn b; }");
    let next = manager.replace_unit(&a, a2.clone()).unwrap();
    let new = skeleton(&next.snapshot().unwrap(), &a2);

    let a_names = find_type(&new, ws.ident("A")).unwrap().member_names.clone().unwrap();
    let b_names = find_type(&new, ws.ident("B")).unwrap().member_names.clone().unwrap();
    assert_eq!(a_names.iter().collect::<Vec<_>>(), [ws.ident("a")]);
    assert_eq!(b_names.iter().collect::<Vec<_>>(), [ws.ident("b")]);
}

#[test]
fn unrealized_replacement_carries_handles_forward() {
    let ws = Workspace::new(&[]);
    let a = ws.script("/p/a.sy", "class A { fn a; } class B { fn b; }");
    let manager = ws.materialized(&[a.clone()]);
    let old_sets = eligible_member_sets(&skeleton(&manager.snapshot().unwrap(), &a));

    let a2 = a.with_text("class A { fn a; } class B { fn b; } // edit 1");
    let second = manager.replace_unit(&a, a2.clone()).unwrap();
    assert!(!second.snapshot().unwrap().root(&a2).unwrap().is_realized());

    let a3 = a.with_text("class A { fn a; } class B { fn b2; }");
    let third = second.replace_unit(&a2, a3.clone()).unwrap();
    let new = skeleton(&third.snapshot().unwrap(), &a3);
    let new_sets = eligible_member_sets(&new);

    assert!(same(&old_sets[1], &new_sets[1]));
    assert!(!same(&old_sets[2], &new_sets[2]));
    assert_eq!(new.stats.reused, 2);
    assert_eq!(new.stats.recomputed, 1);
}

#[test]
fn dropped_skeleton_is_a_safe_miss() {
    let ws = Workspace::new(&[]);
    let a = ws.script("/p/a.sy", "class A { fn a; }");
    let manager = ws.materialized(&[a.clone()]);
    skeleton(&manager.snapshot().unwrap(), &a);

    let a2 = a.with_text("class A { fn a; }");
    let next = manager.replace_unit(&a, a2.clone()).unwrap();
    drop(manager);

    let new = skeleton(&next.snapshot().unwrap(), &a2);
    assert_eq!(new.stats.reused, 0);
    assert_eq!(new.stats.recomputed, 2);
    let a_names = find_type(&new, ws.ident("A")).unwrap().member_names.clone().unwrap();
    assert!(a_names.contains(ws.ident("a")));
}
