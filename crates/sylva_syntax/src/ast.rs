//! AST node types for Sylva units.
//!
//! Every node carries a [`Span`]. Declarations that failed to parse are
//! represented by `Error(Span)` items so later passes can skip them.

use serde::{Deserialize, Serialize};
use sylva_common::Ident;
use sylva_source::Span;

/// The root of a parsed unit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompilationUnit {
    /// `#load` and `#r` directives, in source order.
    pub directives: Vec<Directive>,
    /// Top-level items.
    pub items: Vec<Item>,
    /// The span covering the whole unit.
    pub span: Span,
}

/// Which directive a [`Directive`] is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DirectiveKind {
    /// `#load "path"`
    Load,
    /// `#r "reference"`
    Reference,
}

/// A preprocessor-style directive at the top of a unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Directive {
    /// Load or reference.
    pub kind: DirectiveKind,
    /// The unescaped path literal, or `None` if the path token was missing or malformed.
    pub path: Option<String>,
    /// Span of the whole directive.
    pub span: Span,
}

/// A top-level or namespace-level item.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Item {
    /// `namespace A.B { ... }`
    Namespace(NamespaceDecl),
    /// A type declaration.
    Type(TypeDecl),
    /// A member outside any type (script units only).
    Member(MemberDecl),
    /// An error node produced during recovery.
    Error(Span),
}

/// A namespace declaration. Dotted names are kept as a path.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NamespaceDecl {
    /// Name segments, outermost first.
    pub name: Vec<Ident>,
    /// Nested items.
    pub items: Vec<Item>,
    /// Source span.
    pub span: Span,
}

/// The kind of a type declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TypeKind {
    /// `class`
    Class,
    /// `struct`
    Struct,
    /// `interface`
    Interface,
    /// `enum`
    Enum,
}

/// A type declaration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TypeDecl {
    /// Class, struct, interface or enum.
    pub kind: TypeKind,
    /// The type name.
    pub name: Ident,
    /// Members and nested types, in source order.
    pub body: Vec<TypeItem>,
    /// Source span.
    pub span: Span,
}

/// An item inside a type body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum TypeItem {
    /// A member.
    Member(MemberDecl),
    /// A nested type.
    Type(TypeDecl),
}

/// The kind of a member declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MemberKind {
    /// `fn name;`
    Function,
    /// `field name;`
    Field,
    /// `const name;`
    Constant,
    /// An enum variant.
    Variant,
}

/// A named member.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemberDecl {
    /// What kind of member this is.
    pub kind: MemberKind,
    /// The member name.
    pub name: Ident,
    /// Source span.
    pub span: Span,
}

impl TypeDecl {
    /// Iterates the names declared directly in this type's body, nested type
    /// names included.
    pub fn member_names(&self) -> impl Iterator<Item = Ident> + '_ {
        self.body.iter().map(|item| match item {
            TypeItem::Member(m) => m.name,
            TypeItem::Type(t) => t.name,
        })
    }
}
