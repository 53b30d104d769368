//! Appends a unit and everything it transitively loads to a snapshot builder.
//!
//! Loaded units are appended before the unit that loads them. A resolved path
//! is registered before its unit is expanded, so load cycles terminate and
//! every path is parsed at most once per forest.

use crate::directive::LoadDirective;
use crate::repository::UnitRepository;
use crate::snapshot::{no_handles, MemberNameHandles, SnapshotBuilder};
use std::sync::Arc;
use sylva_common::SylvaResult;
use sylva_decl::LazyRoot;
use sylva_syntax::{Unit, UnitKind};

pub(crate) struct Expander<'a> {
    repository: &'a UnitRepository,
    builder: &'a mut SnapshotBuilder,
}

impl<'a> Expander<'a> {
    pub(crate) fn new(repository: &'a UnitRepository, builder: &'a mut SnapshotBuilder) -> Self {
        Self {
            repository,
            builder,
        }
    }

    /// Appends `unit` after everything it loads. `handles` seeds the unit's
    /// own skeleton; loaded units start without any.
    pub(crate) fn expand(&mut self, unit: &Unit, handles: MemberNameHandles) -> SylvaResult<()> {
        if unit.kind() == UnitKind::Script {
            let directives = self.resolve_directives(unit)?;
            if !directives.is_empty() {
                self.builder
                    .load_directives
                    .insert(unit.clone(), Arc::from(directives));
            }
        }
        tracing::trace!(
            path = %unit.path().display(),
            ordinal = self.builder.units.len(),
            "appending unit"
        );
        let root = LazyRoot::new(
            unit.clone(),
            Arc::clone(self.repository.skeleton_options()),
            Arc::clone(&handles),
        );
        self.builder.append(unit.clone(), root, handles)
    }

    fn resolve_directives(&mut self, unit: &Unit) -> SylvaResult<Vec<LoadDirective>> {
        let repository = self.repository;
        let messages = repository.messages();
        let mut out = Vec::new();

        for directive in unit.load_directives() {
            // A malformed path was already reported by the parser.
            let Some(path) = directive.path.as_deref() else {
                continue;
            };
            let span = directive.span;
            let mut diagnostics = Vec::new();
            let mut resolved_path = None;

            match repository.resolver() {
                None => diagnostics.push(messages.load_unsupported(span)),
                Some(resolver) => match resolver.resolve(path, Some(unit.path())) {
                    None => {
                        let (line, column) = unit.line_col(span);
                        tracing::trace!(
                            path,
                            loader = %unit.path().display(),
                            line,
                            column,
                            "load target not found"
                        );
                        diagnostics.push(messages.file_not_found(path, span));
                    }
                    Some(resolved) if self.builder.loaded_units.contains_key(&resolved) => {
                        if let Some(existing) = self.builder.loaded_units.get(&resolved).cloned() {
                            self.builder.pull_forward(&existing)?;
                        }
                        resolved_path = Some(resolved);
                    }
                    Some(resolved) => match resolver.read_text(&resolved) {
                        Ok(text) => {
                            let loaded =
                                Unit::parse(text, resolved.clone(), unit.options().clone());
                            self.builder
                                .loaded_units
                                .insert(resolved.clone(), loaded.clone());
                            self.expand(&loaded, no_handles())?;
                            resolved_path = Some(resolved);
                        }
                        Err(error) => {
                            tracing::trace!(path = %resolved.display(), %error, "load target unreadable");
                            diagnostics.push(messages.read_failure(&resolved, &error, span));
                        }
                    },
                },
            }

            out.push(LoadDirective {
                path: path.to_string(),
                resolved_path,
                span,
                diagnostics,
            });
        }
        Ok(out)
    }
}
