//! Builds the declaration skeleton of one unit.
//!
//! Cache-eligible type nodes are numbered in pre-order (a node's slot is taken
//! before its children are visited). The Nth eligible node may take over the
//! Nth entry of the reuse list, but only when the handle still upgrades and
//! the set it points to equals the freshly computed one. Any other outcome is
//! a silent recompute, so reuse can never change what the skeleton says.

use crate::decl::{DeclKind, Declaration, ReuseStats, RootDeclaration};
use crate::member_names::MemberNameSet;
use std::sync::{Arc, Weak};
use sylva_common::{Ident, Interner};
use sylva_source::Span;
use sylva_syntax::ast::{Item, TypeDecl, TypeItem, TypeKind};
use sylva_syntax::{Unit, UnitKind};

/// Settings shared by every skeleton built for one forest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkeletonOptions {
    /// Name given to the synthetic container of a script's top-level declarations.
    pub script_container: String,
    /// Whether scripts are interactive submissions.
    pub submission: bool,
}

impl Default for SkeletonOptions {
    fn default() -> Self {
        Self {
            script_container: "Script".to_string(),
            submission: false,
        }
    }
}

/// Builds the skeleton of `unit`, reusing member-name sets from `reuse` where
/// they are still valid.
pub fn build_skeleton(
    unit: &Unit,
    options: &SkeletonOptions,
    reuse: &[Weak<MemberNameSet>],
) -> RootDeclaration {
    let mut builder = SkeletonBuilder {
        interner: unit.interner(),
        reuse,
        next_slot: 0,
        stats: ReuseStats::default(),
    };
    let ast = unit.root();

    let mut children = Vec::new();
    if unit.kind() == UnitKind::Script {
        children.push(builder.build_container(unit, options));
    }
    for item in &ast.items {
        match item {
            Item::Namespace(ns) => {
                children.push(builder.build_namespace(&ns.name, &ns.items, ns.span));
            }
            Item::Type(ty) if unit.kind() == UnitKind::Ordinary => {
                children.push(builder.build_type(ty));
            }
            _ => {}
        }
    }

    let root = Arc::new(Declaration {
        name: builder.interner.get_or_intern(""),
        kind: DeclKind::Namespace,
        span: ast.span,
        children,
        member_names: None,
    });

    tracing::trace!(
        path = %unit.path().display(),
        reused = builder.stats.reused,
        recomputed = builder.stats.recomputed,
        "built declaration skeleton"
    );

    RootDeclaration {
        unit: unit.clone(),
        root,
        reference_directives: unit
            .reference_directives()
            .filter_map(|d| d.path.clone())
            .collect(),
        has_load_directives: unit.load_directives().next().is_some(),
        stats: builder.stats,
    }
}

struct SkeletonBuilder<'a> {
    interner: &'a Interner,
    reuse: &'a [Weak<MemberNameSet>],
    next_slot: usize,
    stats: ReuseStats,
}

impl SkeletonBuilder<'_> {
    /// The synthetic type holding a script's top-level types and members.
    fn build_container(&mut self, unit: &Unit, options: &SkeletonOptions) -> Arc<Declaration> {
        let kind = if options.submission {
            DeclKind::Submission
        } else {
            DeclKind::Script
        };
        let slot = self.take_slot(kind);

        let mut names = Vec::new();
        let mut nested = Vec::new();
        for item in &unit.root().items {
            match item {
                Item::Type(ty) => {
                    names.push(ty.name);
                    nested.push(ty);
                }
                Item::Member(member) => names.push(member.name),
                Item::Namespace(_) | Item::Error(_) => {}
            }
        }
        let member_names = self.member_names(kind, slot, names.into_iter().collect());
        let children = nested.into_iter().map(|ty| self.build_type(ty)).collect();

        Arc::new(Declaration {
            name: self.interner.get_or_intern(&options.script_container),
            kind,
            span: unit.root().span,
            children,
            member_names: Some(member_names),
        })
    }

    /// Builds `namespace A.B.C { items }` as three nested nodes.
    fn build_namespace(&mut self, name: &[Ident], items: &[Item], span: Span) -> Arc<Declaration> {
        let Some((&first, rest)) = name.split_first() else {
            // The parser always produces at least one segment.
            return Arc::new(Declaration {
                name: self.interner.get_or_intern("<missing>"),
                kind: DeclKind::Namespace,
                span,
                children: Vec::new(),
                member_names: None,
            });
        };

        let children = if rest.is_empty() {
            let mut children = Vec::new();
            for item in items {
                match item {
                    Item::Namespace(ns) => {
                        children.push(self.build_namespace(&ns.name, &ns.items, ns.span));
                    }
                    Item::Type(ty) => children.push(self.build_type(ty)),
                    Item::Member(_) | Item::Error(_) => {}
                }
            }
            children
        } else {
            vec![self.build_namespace(rest, items, span)]
        };

        Arc::new(Declaration {
            name: first,
            kind: DeclKind::Namespace,
            span,
            children,
            member_names: None,
        })
    }

    fn build_type(&mut self, ty: &TypeDecl) -> Arc<Declaration> {
        let kind = match ty.kind {
            TypeKind::Class => DeclKind::Class,
            TypeKind::Struct => DeclKind::Struct,
            TypeKind::Interface => DeclKind::Interface,
            TypeKind::Enum => DeclKind::Enum,
        };
        let slot = self.take_slot(kind);
        let member_names = self.member_names(kind, slot, ty.member_names().collect());

        let children = ty
            .body
            .iter()
            .filter_map(|item| match item {
                TypeItem::Type(nested) => Some(self.build_type(nested)),
                TypeItem::Member(_) => None,
            })
            .collect();

        Arc::new(Declaration {
            name: ty.name,
            kind,
            span: ty.span,
            children,
            member_names: Some(member_names),
        })
    }

    fn take_slot(&mut self, kind: DeclKind) -> Option<usize> {
        if !kind.caches_member_names() {
            return None;
        }
        let slot = self.next_slot;
        self.next_slot += 1;
        Some(slot)
    }

    fn member_names(
        &mut self,
        kind: DeclKind,
        slot: Option<usize>,
        fresh: MemberNameSet,
    ) -> Arc<MemberNameSet> {
        let Some(slot) = slot else {
            return Arc::new(fresh);
        };
        if let Some(previous) = self.reuse.get(slot).and_then(Weak::upgrade) {
            if *previous == fresh {
                self.stats.reused += 1;
                return previous;
            }
        }
        tracing::trace!(slot, ?kind, "member name cache miss");
        self.stats.recomputed += 1;
        Arc::new(fresh)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sylva_syntax::ParseOptions;

    fn interner() -> Arc<Interner> {
        Arc::new(Interner::new())
    }

    fn eligible_sets(root: &RootDeclaration) -> Vec<Arc<MemberNameSet>> {
        root.root
            .descendants()
            .filter(|d| d.kind.caches_member_names())
            .filter_map(|d| d.member_names.clone())
            .collect()
    }

    fn handles(root: &RootDeclaration) -> Vec<Weak<MemberNameSet>> {
        eligible_sets(root).iter().map(Arc::downgrade).collect()
    }

    #[test]
    fn ordinary_unit_shape() {
        let unit = Unit::parse(
            "namespace A.B { class C { fn f; class D { } } enum E { X } }",
            "a.sy",
            ParseOptions::ordinary(interner()),
        );
        let root = build_skeleton(&unit, &SkeletonOptions::default(), &[]);
        let i = unit.interner();
        assert_eq!(i.resolve(root.root.name), "");
        let a = &root.root.children[0];
        assert_eq!(i.resolve(a.name), "A");
        let b = &a.children[0];
        assert_eq!(i.resolve(b.name), "B");
        let kinds: Vec<DeclKind> = b.children.iter().map(|d| d.kind).collect();
        assert_eq!(kinds, vec![DeclKind::Class, DeclKind::Enum]);
        let c = &b.children[0];
        let names = c.member_names.as_ref().unwrap();
        assert!(names.contains(i.get_or_intern("f")));
        assert!(names.contains(i.get_or_intern("D")));
        assert_eq!(c.children.len(), 1);
        assert_eq!(root.stats.recomputed, 2);
    }

    #[test]
    fn script_container_holds_top_level() {
        let unit = Unit::parse(
            "#r \"Numerics\"\nclass C { }\nfn main;",
            "s.sy",
            ParseOptions::script(interner()),
        );
        let options = SkeletonOptions {
            script_container: "Driver".to_string(),
            submission: false,
        };
        let root = build_skeleton(&unit, &options, &[]);
        let container = &root.root.children[0];
        assert_eq!(container.kind, DeclKind::Script);
        assert_eq!(unit.interner().resolve(container.name), "Driver");
        let names = container.member_names.as_ref().unwrap();
        assert_eq!(names.len(), 2);
        assert_eq!(container.children.len(), 1);
        assert_eq!(root.reference_directives, vec!["Numerics".to_string()]);
        assert!(!root.has_load_directives);
    }

    #[test]
    fn submission_container() {
        let unit = Unit::parse("fn x;", "s.sy", ParseOptions::script(interner()));
        let options = SkeletonOptions {
            submission: true,
            ..SkeletonOptions::default()
        };
        let root = build_skeleton(&unit, &options, &[]);
        assert_eq!(root.root.children[0].kind, DeclKind::Submission);
    }

    #[test]
    fn reuse_is_positional_and_validated() {
        let unit = Unit::parse(
            "class A { fn a; } class B { fn b; } class C { fn c; }",
            "m.sy",
            ParseOptions::ordinary(interner()),
        );
        let first = build_skeleton(&unit, &SkeletonOptions::default(), &[]);
        let old = eligible_sets(&first);

        let edited = unit.with_text("class A { fn a; } class B { fn b; } class C { fn c2; }");
        let second = build_skeleton(&edited, &SkeletonOptions::default(), &handles(&first));
        let new = eligible_sets(&second);

        assert!(Arc::ptr_eq(&old[0], &new[0]));
        assert!(Arc::ptr_eq(&old[1], &new[1]));
        assert!(!Arc::ptr_eq(&old[2], &new[2]));
        assert_eq!(
            second.stats,
            ReuseStats {
                reused: 2,
                recomputed: 1
            }
        );
    }

    #[test]
    fn dead_handles_are_misses() {
        let unit = Unit::parse("class A { fn a; }", "m.sy", ParseOptions::ordinary(interner()));
        let reuse = {
            let first = build_skeleton(&unit, &SkeletonOptions::default(), &[]);
            handles(&first)
        };
        let second = build_skeleton(&unit, &SkeletonOptions::default(), &reuse);
        assert_eq!(second.stats.reused, 0);
        assert_eq!(second.stats.recomputed, 1);
    }

    #[test]
    fn enums_take_no_slot() {
        let unit = Unit::parse(
            "class A { fn a; } enum E { X } class B { fn b; }",
            "m.sy",
            ParseOptions::ordinary(interner()),
        );
        let first = build_skeleton(&unit, &SkeletonOptions::default(), &[]);
        assert_eq!(handles(&first).len(), 2);
        let second = build_skeleton(&unit, &SkeletonOptions::default(), &handles(&first));
        assert_eq!(second.stats.reused, 2);
    }
}
