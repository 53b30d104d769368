//! Parsed units: immutable, identity-compared handles to source text and its AST.

use crate::ast::{CompilationUnit, Directive, DirectiveKind};
use crate::lexer::lex;
use crate::parser::SylvaParser;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use sylva_common::Interner;
use sylva_diagnostics::{Diagnostic, DiagnosticSink};
use sylva_source::{SourceText, Span};

/// Whether a unit is an ordinary source file or a script.
///
/// Only scripts may carry `#load` / `#r` directives or top-level members.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UnitKind {
    /// An ordinary source file.
    Ordinary,
    /// A script file.
    Script,
}

/// Options a unit was parsed with. Units pulled in through `#load` are parsed
/// with the options of the unit that loaded them.
#[derive(Clone)]
pub struct ParseOptions {
    /// The unit kind.
    pub kind: UnitKind,
    /// The interner shared by every unit of a forest.
    pub interner: Arc<Interner>,
}

impl ParseOptions {
    /// Script options over the given interner.
    pub fn script(interner: Arc<Interner>) -> Self {
        Self {
            kind: UnitKind::Script,
            interner,
        }
    }

    /// Ordinary-file options over the given interner.
    pub fn ordinary(interner: Arc<Interner>) -> Self {
        Self {
            kind: UnitKind::Ordinary,
            interner,
        }
    }
}

impl fmt::Debug for ParseOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ParseOptions")
            .field("kind", &self.kind)
            .finish_non_exhaustive()
    }
}

/// Identity of a [`Unit`], minted once per parse.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
pub struct UnitId(u64);

impl UnitId {
    fn fresh() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(0);
        Self(NEXT.fetch_add(1, Ordering::Relaxed))
    }

    /// Returns the raw id.
    pub fn as_raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for UnitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "u{}", self.0)
    }
}

struct UnitData {
    id: UnitId,
    text: SourceText,
    options: ParseOptions,
    root: CompilationUnit,
    diagnostics: Vec<Diagnostic>,
}

/// A parsed unit.
///
/// Cloning is cheap and yields the same unit. Equality and hashing use the
/// minted [`UnitId`], so two parses of identical text are different units.
#[derive(Clone)]
pub struct Unit(Arc<UnitData>);

impl Unit {
    /// Lexes and parses `text` as the unit at `path`.
    ///
    /// Syntax errors never fail the parse; they are kept in [`Unit::diagnostics`].
    pub fn parse(text: impl Into<String>, path: impl Into<PathBuf>, options: ParseOptions) -> Self {
        let text = SourceText::new(path, text);
        let sink = DiagnosticSink::new();
        let tokens = lex(text.content(), text.id(), &sink);
        let root = SylvaParser::new(
            tokens,
            text.content(),
            options.kind,
            &options.interner,
            &sink,
        )
        .parse_unit();
        Self(Arc::new(UnitData {
            id: UnitId::fresh(),
            text,
            options,
            root,
            diagnostics: sink.take_all(),
        }))
    }

    /// Parses `text` as a new unit with this unit's path and options.
    pub fn with_text(&self, text: impl Into<String>) -> Self {
        Self::parse(text, self.path(), self.0.options.clone())
    }

    /// The unit's identity.
    pub fn id(&self) -> UnitId {
        self.0.id
    }

    /// The path the unit was parsed from.
    pub fn path(&self) -> &Path {
        self.0.text.path()
    }

    /// Ordinary or script.
    pub fn kind(&self) -> UnitKind {
        self.0.options.kind
    }

    /// The options this unit was parsed with.
    pub fn options(&self) -> &ParseOptions {
        &self.0.options
    }

    /// The interner names in this unit's AST belong to.
    pub fn interner(&self) -> &Interner {
        &self.0.options.interner
    }

    /// The source text.
    pub fn text(&self) -> &SourceText {
        &self.0.text
    }

    /// The AST root.
    pub fn root(&self) -> &CompilationUnit {
        &self.0.root
    }

    /// Syntax diagnostics produced while parsing.
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.0.diagnostics
    }

    /// `#load` directives in source order.
    pub fn load_directives(&self) -> impl Iterator<Item = &Directive> + '_ {
        self.directives_of(DirectiveKind::Load)
    }

    /// `#r` directives in source order.
    pub fn reference_directives(&self) -> impl Iterator<Item = &Directive> + '_ {
        self.directives_of(DirectiveKind::Reference)
    }

    fn directives_of(&self, kind: DirectiveKind) -> impl Iterator<Item = &Directive> + '_ {
        self.0.root.directives.iter().filter(move |d| d.kind == kind)
    }

    /// Returns `true` if the unit carries any `#load` or `#r` directive.
    pub fn has_reference_or_load_directives(&self) -> bool {
        !self.0.root.directives.is_empty()
    }

    /// Returns `true` if both units were parsed from identical text.
    pub fn has_same_text(&self, other: &Unit) -> bool {
        self.0.text.content_hash() == other.0.text.content_hash()
            && self.0.text.content() == other.0.text.content()
    }

    /// 1-based line and column where `span` starts.
    pub fn line_col(&self, span: Span) -> (u32, u32) {
        self.0.text.line_col(span.start)
    }

    /// Returns `true` if both units request the same `#load` paths in the same order.
    pub fn load_directives_equivalent(&self, other: &Unit) -> bool {
        if self.has_same_text(other) {
            return true;
        }
        self.load_directives()
            .map(|d| d.path.as_deref())
            .eq(other.load_directives().map(|d| d.path.as_deref()))
    }
}

impl PartialEq for Unit {
    fn eq(&self, other: &Self) -> bool {
        self.0.id == other.0.id
    }
}

impl Eq for Unit {}

impl Hash for Unit {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.id.hash(state);
    }
}

impl fmt::Debug for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Unit")
            .field("id", &self.0.id)
            .field("path", &self.path())
            .finish()
    }
}
