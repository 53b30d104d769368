//! Declaration skeletons and the merged declaration index.
//!
//! A skeleton is the namespace/type outline of one unit. Skeletons are built
//! lazily ([`LazyRoot`]) and collected into an immutable
//! [`DeclarationIndex`]. Type nodes carry [`MemberNameSet`]s that can be
//! handed across edits as weak handles and taken over when still valid.

#![warn(missing_docs)]

pub mod builder;
pub mod decl;
pub mod index;
pub mod lazy_root;
pub mod member_names;

pub use builder::{build_skeleton, SkeletonOptions};
pub use decl::{DeclKind, Declaration, ReuseStats, RootDeclaration};
pub use index::{DeclarationIndex, MergedNamespace};
pub use lazy_root::{LazyRoot, RootId};
pub use member_names::MemberNameSet;
