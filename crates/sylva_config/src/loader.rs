//! Configuration file loading and validation.

use crate::error::ConfigError;
use crate::types::ForestConfig;
use std::path::Path;

/// The file name looked up by [`load_config`].
pub const CONFIG_FILE_NAME: &str = "sylva.toml";

/// Loads and validates `<project_dir>/sylva.toml`.
///
/// Relative search paths are made absolute against `project_dir`.
pub fn load_config(project_dir: &Path) -> Result<ForestConfig, ConfigError> {
    let content = std::fs::read_to_string(project_dir.join(CONFIG_FILE_NAME))?;
    let mut config = load_config_from_str(&content)?;
    for search_path in &mut config.resolver.search_paths {
        if search_path.is_relative() {
            *search_path = project_dir.join(&*search_path);
        }
    }
    Ok(config)
}

/// Parses and validates a configuration from a string.
pub fn load_config_from_str(content: &str) -> Result<ForestConfig, ConfigError> {
    let config: ForestConfig =
        toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))?;
    validate_config(&config)?;
    Ok(config)
}

fn validate_config(config: &ForestConfig) -> Result<(), ConfigError> {
    let name = &config.forest.script_container;
    if name.is_empty() {
        return Err(ConfigError::ValidationError(
            "forest.script_container must not be empty".to_string(),
        ));
    }
    let mut chars = name.chars();
    let starts_ok = chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_');
    if !starts_ok || !chars.all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return Err(ConfigError::ValidationError(format!(
            "forest.script_container '{name}' is not a valid identifier"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::DEFAULT_SCRIPT_CONTAINER;
    use std::path::PathBuf;

    #[test]
    fn empty_config_uses_defaults() {
        let config = load_config_from_str("").unwrap();
        assert_eq!(config.forest.script_container, DEFAULT_SCRIPT_CONTAINER);
        assert!(!config.forest.submission);
        assert!(config.resolver.enabled);
        assert!(config.resolver.search_paths.is_empty());
    }

    #[test]
    fn parse_full_config() {
        let toml = r#"
[forest]
script_container = "Interactive"
submission = true

[resolver]
enabled = false
search_paths = ["lib", "/opt/shared"]
"#;
        let config = load_config_from_str(toml).unwrap();
        assert_eq!(config.forest.script_container, "Interactive");
        assert!(config.forest.submission);
        assert!(!config.resolver.enabled);
        assert_eq!(
            config.resolver.search_paths,
            vec![PathBuf::from("lib"), PathBuf::from("/opt/shared")]
        );
    }

    #[test]
    fn empty_container_rejected() {
        let err = load_config_from_str("[forest]\nscript_container = \"\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(_)));
    }

    #[test]
    fn non_identifier_container_rejected() {
        let err = load_config_from_str("[forest]\nscript_container = \"9 lives\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(_)));
    }

    #[test]
    fn invalid_toml_errors() {
        let err = load_config_from_str("this is not toml {{{").unwrap_err();
        assert!(matches!(err, ConfigError::ParseError(_)));
    }

    #[test]
    fn load_from_disk_anchors_search_paths() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join(CONFIG_FILE_NAME),
            "[resolver]\nsearch_paths = [\"lib\"]\n",
        )
        .unwrap();
        let config = load_config(dir.path()).unwrap();
        assert_eq!(config.resolver.search_paths, vec![dir.path().join("lib")]);
    }

    #[test]
    fn io_error_from_missing_dir() {
        let err = load_config(Path::new("/nonexistent/sylva/project")).unwrap_err();
        assert!(matches!(err, ConfigError::IoError(_)));
    }
}
