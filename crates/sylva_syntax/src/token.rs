//! Token types for the Sylva script lexer.

use serde::{Deserialize, Serialize};
use sylva_source::Span;

/// A Sylva token kind.
///
/// Identifier and string values are not stored in the token; they are read
/// back from the source text through the token's span.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub enum SylvaToken {
    /// `#load`
    LoadDirective,
    /// `#r`
    ReferenceDirective,
    /// `namespace`
    Namespace,
    /// `class`
    Class,
    /// `struct`
    Struct,
    /// `interface`
    Interface,
    /// `enum`
    Enum,
    /// `fn`
    Fn,
    /// `field`
    Field,
    /// `const`
    Const,
    /// An identifier.
    Identifier,
    /// A double-quoted string literal.
    StringLiteral,
    /// `{`
    LeftBrace,
    /// `}`
    RightBrace,
    /// `;`
    Semicolon,
    /// `,`
    Comma,
    /// `.`
    Dot,
    /// A token the lexer could not make sense of (already reported).
    Error,
    /// End of input.
    Eof,
}

impl SylvaToken {
    /// Returns `true` for the keywords that open a type declaration.
    pub fn is_type_keyword(self) -> bool {
        matches!(
            self,
            SylvaToken::Class | SylvaToken::Struct | SylvaToken::Interface | SylvaToken::Enum
        )
    }

    /// Returns `true` for the keywords that open a member declaration.
    pub fn is_member_keyword(self) -> bool {
        matches!(self, SylvaToken::Fn | SylvaToken::Field | SylvaToken::Const)
    }

    /// Returns `true` for `#load` and `#r`.
    pub fn is_directive(self) -> bool {
        matches!(
            self,
            SylvaToken::LoadDirective | SylvaToken::ReferenceDirective
        )
    }
}

/// A token paired with its location.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Token {
    /// The token kind.
    pub kind: SylvaToken,
    /// Where the token appears.
    pub span: Span,
}

/// Maps a keyword spelling to its token kind.
pub fn lookup_keyword(text: &str) -> Option<SylvaToken> {
    Some(match text {
        "namespace" => SylvaToken::Namespace,
        "class" => SylvaToken::Class,
        "struct" => SylvaToken::Struct,
        "interface" => SylvaToken::Interface,
        "enum" => SylvaToken::Enum,
        "fn" => SylvaToken::Fn,
        "field" => SylvaToken::Field,
        "const" => SylvaToken::Const,
        _ => return None,
    })
}

/// Maps a directive name (without `#`) to its token kind.
pub fn lookup_directive(text: &str) -> Option<SylvaToken> {
    match text {
        "load" => Some(SylvaToken::LoadDirective),
        "r" => Some(SylvaToken::ReferenceDirective),
        _ => None,
    }
}
