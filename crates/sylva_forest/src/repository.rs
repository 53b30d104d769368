//! The per-compilation settings every forest operation consults.

use std::fmt;
use std::sync::Arc;
use sylva_config::ForestConfig;
use sylva_decl::SkeletonOptions;
use sylva_diagnostics::{MessageProvider, StandardMessages};
use sylva_source::{FileSystemResolver, SourceResolver};

/// Settings that stay fixed for the lifetime of a compilation: the synthetic
/// script container name, the submission flag, how `#load` paths are resolved
/// and how load failures are worded.
#[derive(Clone)]
pub struct UnitRepository {
    skeleton: Arc<SkeletonOptions>,
    resolver: Option<Arc<dyn SourceResolver>>,
    messages: Arc<dyn MessageProvider>,
}

impl UnitRepository {
    /// Creates a repository.
    ///
    /// Without a resolver every `#load` is reported as unsupported.
    pub fn new(
        script_container: impl Into<String>,
        resolver: Option<Arc<dyn SourceResolver>>,
        messages: Arc<dyn MessageProvider>,
        submission: bool,
    ) -> Self {
        Self {
            skeleton: Arc::new(SkeletonOptions {
                script_container: script_container.into(),
                submission,
            }),
            resolver,
            messages,
        }
    }

    /// Builds a repository from a loaded `sylva.toml`, resolving against the
    /// filesystem when the resolver is enabled.
    pub fn from_config(config: &ForestConfig) -> Self {
        let resolver: Option<Arc<dyn SourceResolver>> = if config.resolver.enabled {
            Some(Arc::new(FileSystemResolver::with_search_paths(
                config.resolver.search_paths.iter().cloned(),
            )))
        } else {
            None
        };
        Self::new(
            config.forest.script_container.clone(),
            resolver,
            Arc::new(StandardMessages),
            config.forest.submission,
        )
    }

    /// Returns a copy that resolves `#load` paths with `resolver`.
    pub fn with_resolver(mut self, resolver: Arc<dyn SourceResolver>) -> Self {
        self.resolver = Some(resolver);
        self
    }

    /// Returns a copy that formats load diagnostics with `messages`.
    pub fn with_messages(mut self, messages: Arc<dyn MessageProvider>) -> Self {
        self.messages = messages;
        self
    }

    /// The name of the synthetic script container.
    pub fn script_container(&self) -> &str {
        &self.skeleton.script_container
    }

    /// Whether scripts are interactive submissions.
    pub fn is_submission(&self) -> bool {
        self.skeleton.submission
    }

    /// The resolver, if load directives are supported.
    pub fn resolver(&self) -> Option<&dyn SourceResolver> {
        self.resolver.as_deref()
    }

    /// The diagnostic message provider.
    pub fn messages(&self) -> &dyn MessageProvider {
        &*self.messages
    }

    /// Options handed to every skeleton build.
    pub fn skeleton_options(&self) -> &Arc<SkeletonOptions> {
        &self.skeleton
    }
}

impl Default for UnitRepository {
    fn default() -> Self {
        Self::new(
            sylva_config::DEFAULT_SCRIPT_CONTAINER,
            None,
            Arc::new(StandardMessages),
            false,
        )
    }
}

impl fmt::Debug for UnitRepository {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UnitRepository")
            .field("script_container", &self.skeleton.script_container)
            .field("submission", &self.skeleton.submission)
            .field("has_resolver", &self.resolver.is_some())
            .finish()
    }
}
