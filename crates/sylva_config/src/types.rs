//! Configuration types deserialized from `sylva.toml`.

use serde::Deserialize;
use std::path::PathBuf;

/// The default name of the synthetic type that holds top-level script members.
pub const DEFAULT_SCRIPT_CONTAINER: &str = "Script";

/// The top-level forest configuration parsed from `sylva.toml`.
#[derive(Debug, Default, Deserialize)]
pub struct ForestConfig {
    /// Script container and submission settings.
    #[serde(default)]
    pub forest: ForestSection,
    /// Load-directive resolution settings.
    #[serde(default)]
    pub resolver: ResolverConfig,
}

/// Settings shared by every skeleton built for the forest.
#[derive(Debug, Deserialize)]
pub struct ForestSection {
    /// Name of the synthetic type holding top-level script members.
    #[serde(default = "default_script_container")]
    pub script_container: String,
    /// Whether scripts are interactive submissions.
    #[serde(default)]
    pub submission: bool,
}

impl Default for ForestSection {
    fn default() -> Self {
        Self {
            script_container: default_script_container(),
            submission: false,
        }
    }
}

fn default_script_container() -> String {
    DEFAULT_SCRIPT_CONTAINER.to_string()
}

/// How `#load` paths are resolved.
#[derive(Debug, Deserialize)]
pub struct ResolverConfig {
    /// When `false`, the forest has no resolver and every `#load` is reported
    /// as unsupported.
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Directories searched after the referencing unit's own directory.
    #[serde(default)]
    pub search_paths: Vec<PathBuf>,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            search_paths: Vec::new(),
        }
    }
}

fn default_true() -> bool {
    true
}
