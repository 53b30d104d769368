//! Recursive descent parser for Sylva units.
//!
//! The [`SylvaParser`] provides the primitive operations (advance, eat, expect)
//! and error recovery. Directive placement rules depend on the [`UnitKind`]
//! being parsed: only script units may carry directives, and only before the
//! first declaration.

use crate::ast::*;
use crate::lexer::unescape_string;
use crate::token::{SylvaToken, Token};
use crate::unit::UnitKind;
use sylva_common::{Ident, Interner};
use sylva_diagnostics::code::codes;
use sylva_diagnostics::{Diagnostic, DiagnosticCode, DiagnosticSink};
use sylva_source::Span;

/// A recursive descent parser over a token stream produced by [`crate::lexer::lex`].
pub struct SylvaParser<'src> {
    tokens: Vec<Token>,
    pos: usize,
    source: &'src str,
    kind: UnitKind,
    interner: &'src Interner,
    sink: &'src DiagnosticSink,
}

impl<'src> SylvaParser<'src> {
    /// Creates a new parser. `tokens` must have been lexed from `source` and
    /// end with [`SylvaToken::Eof`].
    pub fn new(
        tokens: Vec<Token>,
        source: &'src str,
        kind: UnitKind,
        interner: &'src Interner,
        sink: &'src DiagnosticSink,
    ) -> Self {
        Self {
            tokens,
            pos: 0,
            source,
            kind,
            interner,
            sink,
        }
    }

    // ========================================================================
    // Primitive operations
    // ========================================================================

    fn current(&self) -> SylvaToken {
        self.tokens
            .get(self.pos)
            .map_or(SylvaToken::Eof, |t| t.kind)
    }

    fn current_span(&self) -> Span {
        self.tokens
            .get(self.pos)
            .or_else(|| self.tokens.last())
            .map_or(Span::DUMMY, |t| t.span)
    }

    fn current_text(&self) -> &'src str {
        let span = self.current_span();
        self.source
            .get(span.start as usize..span.end as usize)
            .unwrap_or("")
    }

    fn prev_span(&self) -> Span {
        if self.pos > 0 {
            self.tokens[self.pos - 1].span
        } else {
            self.current_span()
        }
    }

    fn at(&self, kind: SylvaToken) -> bool {
        self.current() == kind
    }

    fn at_eof(&self) -> bool {
        self.at(SylvaToken::Eof)
    }

    fn advance(&mut self) {
        if !self.at_eof() {
            self.pos += 1;
        }
    }

    fn eat(&mut self, kind: SylvaToken) -> bool {
        if self.at(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, kind: SylvaToken) {
        if !self.eat(kind) {
            self.expected(&format!("{kind:?}"));
        }
    }

    fn expect_ident(&mut self) -> Ident {
        if self.at(SylvaToken::Identifier) {
            let ident = self.interner.get_or_intern(self.current_text());
            self.advance();
            ident
        } else {
            self.expected("identifier");
            self.interner.get_or_intern("<missing>")
        }
    }

    // ========================================================================
    // Error handling and recovery
    // ========================================================================

    fn error_at(&self, code: DiagnosticCode, msg: impl Into<String>, span: Span) {
        self.sink.emit(Diagnostic::error(code, msg, span));
    }

    /// Directives that are parsed but have no effect are warnings.
    fn warn_at(&self, code: DiagnosticCode, msg: impl Into<String>, span: Span) {
        self.sink.emit(Diagnostic::warning(code, msg, span));
    }

    fn expected(&self, what: &str) {
        // The lexer has already reported error tokens.
        if self.at(SylvaToken::Error) {
            return;
        }
        self.error_at(
            codes::UNEXPECTED_TOKEN,
            format!("expected {what}, found {:?}", self.current()),
            self.current_span(),
        );
    }

    fn recover_to_semicolon(&mut self) {
        while !self.at_eof() && !self.at(SylvaToken::Semicolon) && !self.at(SylvaToken::RightBrace)
        {
            self.advance();
        }
        self.eat(SylvaToken::Semicolon);
    }

    // ========================================================================
    // Units and directives
    // ========================================================================

    /// Parses a complete unit.
    pub fn parse_unit(&mut self) -> CompilationUnit {
        let start = self.current_span();
        let mut directives = Vec::new();
        let mut items = Vec::new();

        while !self.at_eof() {
            if self.current().is_directive() {
                let directive = self.parse_directive();
                if !items.is_empty() {
                    self.warn_at(
                        codes::DIRECTIVE_AFTER_DECLARATION,
                        "directives must precede all declarations",
                        directive.span,
                    );
                } else {
                    if self.kind != UnitKind::Script {
                        self.warn_at(
                            codes::DIRECTIVE_OUTSIDE_SCRIPT,
                            "directives are only permitted in script units",
                            directive.span,
                        );
                    }
                    directives.push(directive);
                }
                continue;
            }
            items.push(self.parse_item(true));
        }

        CompilationUnit {
            directives,
            items,
            span: start.merge(self.current_span()),
        }
    }

    fn parse_directive(&mut self) -> Directive {
        let start = self.current_span();
        let kind = if self.at(SylvaToken::LoadDirective) {
            DirectiveKind::Load
        } else {
            DirectiveKind::Reference
        };
        self.advance();

        let path = match self.current() {
            SylvaToken::StringLiteral => {
                let value = unescape_string(self.current_text());
                self.advance();
                Some(value)
            }
            SylvaToken::Error => {
                self.advance();
                None
            }
            _ => {
                self.error_at(
                    codes::MISSING_DIRECTIVE_PATH,
                    "expected a quoted path after directive",
                    self.current_span(),
                );
                None
            }
        };

        Directive {
            kind,
            path,
            span: start.merge(self.prev_span()),
        }
    }

    // ========================================================================
    // Declarations
    // ========================================================================

    fn parse_item(&mut self, top_level: bool) -> Item {
        let current = self.current();
        if current == SylvaToken::Namespace {
            return Item::Namespace(self.parse_namespace());
        }
        if current.is_type_keyword() {
            return Item::Type(self.parse_type());
        }
        if current.is_member_keyword() {
            let member = self.parse_member();
            if top_level && self.kind == UnitKind::Script {
                return Item::Member(member);
            }
            self.error_at(
                codes::MEMBER_OUTSIDE_TYPE,
                "members must be declared inside a type",
                member.span,
            );
            return Item::Error(member.span);
        }

        let span = self.current_span();
        if current != SylvaToken::Error {
            self.error_at(
                codes::UNEXPECTED_TOKEN,
                format!("expected a declaration, found {current:?}"),
                span,
            );
        }
        self.advance();
        Item::Error(span)
    }

    fn parse_namespace(&mut self) -> NamespaceDecl {
        let start = self.current_span();
        self.advance();
        let mut name = vec![self.expect_ident()];
        while self.eat(SylvaToken::Dot) {
            name.push(self.expect_ident());
        }

        self.expect(SylvaToken::LeftBrace);
        let mut items = Vec::new();
        while !self.at_eof() && !self.at(SylvaToken::RightBrace) {
            if self.current().is_directive() {
                let directive = self.parse_directive();
                self.warn_at(
                    codes::DIRECTIVE_AFTER_DECLARATION,
                    "directives must precede all declarations",
                    directive.span,
                );
                continue;
            }
            items.push(self.parse_item(false));
        }
        self.expect(SylvaToken::RightBrace);

        NamespaceDecl {
            name,
            items,
            span: start.merge(self.prev_span()),
        }
    }

    fn parse_type(&mut self) -> TypeDecl {
        let start = self.current_span();
        let kind = match self.current() {
            SylvaToken::Struct => TypeKind::Struct,
            SylvaToken::Interface => TypeKind::Interface,
            SylvaToken::Enum => TypeKind::Enum,
            _ => TypeKind::Class,
        };
        self.advance();
        let name = self.expect_ident();

        self.expect(SylvaToken::LeftBrace);
        let body = if kind == TypeKind::Enum {
            self.parse_enum_body()
        } else {
            self.parse_type_body()
        };
        self.expect(SylvaToken::RightBrace);

        TypeDecl {
            kind,
            name,
            body,
            span: start.merge(self.prev_span()),
        }
    }

    fn parse_type_body(&mut self) -> Vec<TypeItem> {
        let mut body = Vec::new();
        while !self.at_eof() && !self.at(SylvaToken::RightBrace) {
            let current = self.current();
            if current.is_type_keyword() {
                body.push(TypeItem::Type(self.parse_type()));
            } else if current.is_member_keyword() {
                body.push(TypeItem::Member(self.parse_member()));
            } else {
                self.expected("a member or nested type");
                self.advance();
            }
        }
        body
    }

    fn parse_enum_body(&mut self) -> Vec<TypeItem> {
        let mut body = Vec::new();
        while !self.at_eof() && !self.at(SylvaToken::RightBrace) {
            if !self.at(SylvaToken::Identifier) {
                self.expected("enum variant");
                self.advance();
                continue;
            }
            let span = self.current_span();
            let name = self.expect_ident();
            body.push(TypeItem::Member(MemberDecl {
                kind: MemberKind::Variant,
                name,
                span,
            }));
            if !self.eat(SylvaToken::Comma) && !self.at(SylvaToken::RightBrace) {
                self.expected("',' or '}'");
            }
        }
        body
    }

    fn parse_member(&mut self) -> MemberDecl {
        let start = self.current_span();
        let kind = match self.current() {
            SylvaToken::Field => MemberKind::Field,
            SylvaToken::Const => MemberKind::Constant,
            _ => MemberKind::Function,
        };
        self.advance();
        let name = self.expect_ident();
        if !self.eat(SylvaToken::Semicolon) {
            self.expected("';'");
            self.recover_to_semicolon();
        }
        MemberDecl {
            kind,
            name,
            span: start.merge(self.prev_span()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::lex;
    use sylva_diagnostics::Severity;
    use sylva_source::FileId;

    fn parse(source: &str, kind: UnitKind) -> (CompilationUnit, Vec<Diagnostic>, Interner) {
        let interner = Interner::new();
        let sink = DiagnosticSink::new();
        let tokens = lex(source, FileId::from_raw(0), &sink);
        let unit = SylvaParser::new(tokens, source, kind, &interner, &sink).parse_unit();
        (unit, sink.take_all(), interner)
    }

    fn parse_ok(source: &str, kind: UnitKind) -> (CompilationUnit, Interner) {
        let (unit, diags, interner) = parse(source, kind);
        assert!(
            diags.is_empty(),
            "unexpected errors: {:?}",
            diags.iter().map(|d| &d.message).collect::<Vec<_>>()
        );
        (unit, interner)
    }

    #[test]
    fn script_directives() {
        let (unit, _) = parse_ok(
            "#load \"a.sy\"\n#r \"Numerics\"\n#load \"lib/b.sy\"\nclass C { }",
            UnitKind::Script,
        );
        assert_eq!(unit.directives.len(), 3);
        assert_eq!(unit.directives[0].kind, DirectiveKind::Load);
        assert_eq!(unit.directives[0].path.as_deref(), Some("a.sy"));
        assert_eq!(unit.directives[1].kind, DirectiveKind::Reference);
        assert_eq!(unit.directives[2].path.as_deref(), Some("lib/b.sy"));
        assert_eq!(unit.items.len(), 1);
    }

    #[test]
    fn nested_namespaces_and_types() {
        let (unit, interner) = parse_ok(
            "namespace A.B { class C { fn f; field x; const K; struct Inner { } } }",
            UnitKind::Ordinary,
        );
        let Item::Namespace(ns) = &unit.items[0] else {
            panic!("expected namespace");
        };
        let names: Vec<&str> = ns.name.iter().map(|i| interner.resolve(*i)).collect();
        assert_eq!(names, vec!["A", "B"]);
        let Item::Type(class) = &ns.items[0] else {
            panic!("expected type");
        };
        assert_eq!(class.kind, TypeKind::Class);
        let members: Vec<&str> = class.member_names().map(|i| interner.resolve(i)).collect();
        assert_eq!(members, vec!["f", "x", "K", "Inner"]);
    }

    #[test]
    fn enum_variants() {
        let (unit, interner) = parse_ok("enum Color { Red, Green, Blue, }", UnitKind::Ordinary);
        let Item::Type(e) = &unit.items[0] else {
            panic!("expected type");
        };
        assert_eq!(e.kind, TypeKind::Enum);
        let variants: Vec<&str> = e.member_names().map(|i| interner.resolve(i)).collect();
        assert_eq!(variants, vec!["Red", "Green", "Blue"]);
    }

    #[test]
    fn top_level_member_in_script() {
        let (unit, _) = parse_ok("fn main; field counter;", UnitKind::Script);
        assert!(matches!(unit.items[0], Item::Member(_)));
        assert!(matches!(unit.items[1], Item::Member(_)));
    }

    #[test]
    fn top_level_member_in_ordinary_unit_is_error() {
        let (unit, diags, _) = parse("fn main;", UnitKind::Ordinary);
        assert!(matches!(unit.items[0], Item::Error(_)));
        assert_eq!(diags[0].code, codes::MEMBER_OUTSIDE_TYPE);
    }

    #[test]
    fn member_in_namespace_is_error() {
        let (_, diags, _) = parse("namespace N { fn f; }", UnitKind::Script);
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].code, codes::MEMBER_OUTSIDE_TYPE);
    }

    #[test]
    fn directive_in_ordinary_unit_is_recorded_with_warning() {
        let (unit, diags, _) = parse("#load \"a.sy\"", UnitKind::Ordinary);
        assert_eq!(unit.directives.len(), 1);
        assert_eq!(diags[0].code, codes::DIRECTIVE_OUTSIDE_SCRIPT);
        assert_eq!(diags[0].severity, Severity::Warning);
    }

    #[test]
    fn directive_after_declaration_is_dropped() {
        let (unit, diags, _) = parse("class C { }\n#load \"a.sy\"", UnitKind::Script);
        assert!(unit.directives.is_empty());
        assert_eq!(diags[0].code, codes::DIRECTIVE_AFTER_DECLARATION);
        assert!(!diags[0].is_error());
    }

    #[test]
    fn missing_path_reports_once() {
        let (unit, diags, _) = parse("#load class C { }", UnitKind::Script);
        assert_eq!(unit.directives[0].path, None);
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].code, codes::MISSING_DIRECTIVE_PATH);
    }

    #[test]
    fn malformed_path_reported_by_lexer_only() {
        let (unit, diags, _) = parse("#load \"unterminated\n", UnitKind::Script);
        assert_eq!(unit.directives.len(), 1);
        assert_eq!(unit.directives[0].path, None);
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].code, codes::INVALID_TOKEN);
    }

    #[test]
    fn recovery_continues_after_garbage() {
        let (unit, diags, _) = parse("; class C { fn f }  class D { }", UnitKind::Ordinary);
        assert!(!diags.is_empty());
        let types = unit
            .items
            .iter()
            .filter(|i| matches!(i, Item::Type(_)))
            .count();
        assert_eq!(types, 2);
    }

    #[test]
    fn missing_name_interns_placeholder() {
        let (unit, diags, interner) = parse("class { }", UnitKind::Ordinary);
        assert_eq!(diags.len(), 1);
        let Item::Type(t) = &unit.items[0] else {
            panic!("expected type");
        };
        assert_eq!(interner.resolve(t.name), "<missing>");
    }
}
