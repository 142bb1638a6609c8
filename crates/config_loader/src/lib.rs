//! # Config Loader
//!
//! Blueprint loading and `cfg/set` patch validation.
//!
//! Responsibilities:
//! - Parse TOML/JSON blueprint files
//! - Validate configuration legality
//! - Validate partial configuration patches before merge
//!
//! # Example
//!
//! ```no_run
//! use config_loader::ConfigLoader;
//! use std::path::Path;
//!
//! let blueprint = ConfigLoader::load_from_path(Path::new("config.toml")).unwrap();
//! println!("Component: {}", blueprint.component.id);
//! ```

mod parser;
mod validator;

pub use contracts::ComponentBlueprint;
pub use parser::{parse_patch, ConfigFormat};
pub use validator::validate_patch;

use contracts::ComponentError;
use std::path::Path;

/// Configuration loader
///
/// Provides static methods to load a blueprint from files or strings.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load a blueprint from a file path
    ///
    /// Automatically detects format from the extension (.toml / .json).
    ///
    /// # Errors
    /// - File read failure
    /// - Unsupported format
    /// - Parse failure
    /// - Validation failure
    pub fn load_from_path(path: &Path) -> Result<ComponentBlueprint, ComponentError> {
        let format = Self::detect_format(path)?;
        let content = Self::read_file(path)?;
        Self::load_from_str(&content, format)
    }

    /// Load a blueprint from a string
    ///
    /// # Errors
    /// - Parse failure
    /// - Validation failure
    pub fn load_from_str(
        content: &str,
        format: ConfigFormat,
    ) -> Result<ComponentBlueprint, ComponentError> {
        let blueprint = parser::parse(content, format)?;
        validator::validate(&blueprint)?;
        Ok(blueprint)
    }

    /// Serialize a blueprint to a TOML string
    pub fn to_toml(blueprint: &ComponentBlueprint) -> Result<String, ComponentError> {
        toml::to_string_pretty(blueprint)
            .map_err(|e| ComponentError::config_parse(format!("TOML serialize error: {e}")))
    }

    /// Serialize a blueprint to a JSON string
    pub fn to_json(blueprint: &ComponentBlueprint) -> Result<String, ComponentError> {
        serde_json::to_string_pretty(blueprint)
            .map_err(|e| ComponentError::config_parse(format!("JSON serialize error: {e}")))
    }
}

impl ConfigLoader {
    /// Infer the configuration format from a file extension
    fn detect_format(path: &Path) -> Result<ConfigFormat, ComponentError> {
        let ext = path.extension().and_then(|e| e.to_str()).ok_or_else(|| {
            ComponentError::config_parse("cannot determine file format from extension")
        })?;

        ConfigFormat::from_extension(ext).ok_or_else(|| {
            ComponentError::config_parse(format!("unsupported config format: .{ext}"))
        })
    }

    /// Read a configuration file's content
    fn read_file(path: &Path) -> Result<String, ComponentError> {
        Ok(std::fs::read_to_string(path)?)
    }
}
