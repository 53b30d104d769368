//! Declaration skeleton nodes.

use crate::member_names::MemberNameSet;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use sylva_common::Ident;
use sylva_source::Span;
use sylva_syntax::Unit;

/// The kind of a skeleton node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DeclKind {
    /// A namespace (including the unnamed global namespace at the root).
    Namespace,
    /// `class`
    Class,
    /// `struct`
    Struct,
    /// `interface`
    Interface,
    /// `enum`
    Enum,
    /// The synthetic container of a script's top-level declarations.
    Script,
    /// The synthetic container of an interactive submission.
    Submission,
}

impl DeclKind {
    /// Returns `true` if nodes of this kind hold a cached member-name set that
    /// can be carried across edits.
    pub fn caches_member_names(self) -> bool {
        matches!(
            self,
            DeclKind::Class
                | DeclKind::Struct
                | DeclKind::Interface
                | DeclKind::Script
                | DeclKind::Submission
        )
    }

    /// Returns `true` for everything except namespaces.
    pub fn is_type(self) -> bool {
        self != DeclKind::Namespace
    }
}

/// One node of a declaration skeleton.
#[derive(Debug)]
pub struct Declaration {
    /// The declared name. The global namespace uses the empty name.
    pub name: Ident,
    /// What kind of declaration this is.
    pub kind: DeclKind,
    /// Where the declaration appears.
    pub span: Span,
    /// Nested namespaces and types, in source order.
    pub children: Vec<Arc<Declaration>>,
    /// Names declared directly in this type. `None` for namespaces.
    pub member_names: Option<Arc<MemberNameSet>>,
}

impl Declaration {
    /// Iterates this node and all its descendants in pre-order.
    pub fn descendants(&self) -> Descendants<'_> {
        Descendants { stack: vec![self] }
    }
}

/// Pre-order iterator returned by [`Declaration::descendants`].
pub struct Descendants<'a> {
    stack: Vec<&'a Declaration>,
}

impl<'a> Iterator for Descendants<'a> {
    type Item = &'a Declaration;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.stack
            .extend(node.children.iter().rev().map(|child| child.as_ref()));
        Some(node)
    }
}

/// Counters recorded while building one skeleton.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReuseStats {
    /// Member-name sets taken over from a previous skeleton.
    pub reused: usize,
    /// Member-name sets computed afresh for cache-eligible types.
    pub recomputed: usize,
}

/// The realized skeleton of one unit.
#[derive(Debug)]
pub struct RootDeclaration {
    /// The unit the skeleton was built from.
    pub unit: Unit,
    /// The unit's global namespace.
    pub root: Arc<Declaration>,
    /// Paths named by the unit's `#r` directives.
    pub reference_directives: Vec<String>,
    /// Whether the unit carries any `#load` directive.
    pub has_load_directives: bool,
    /// Member-name reuse counters.
    pub stats: ReuseStats,
}
