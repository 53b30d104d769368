//! Parsing and validation of `sylva.toml` forest configuration files.
//!
//! The configuration carries the knobs that stay fixed for the lifetime of a
//! compilation: the synthetic script container name, the submission flag, and
//! how load directives are resolved.

#![warn(missing_docs)]

pub mod error;
pub mod loader;
pub mod types;

pub use error::ConfigError;
pub use loader::{load_config, load_config_from_str, CONFIG_FILE_NAME};
pub use types::*;
