//! Configuration management
//!
//! Supports loading configuration from:
//! - Default values
//! - Config file (ssp.toml)
//! - Environment variables (SSP__*)
//!
//! ## Example config file (ssp.toml):
//! ```toml
//! [schemas]
//! resource_dir = "./schemas"
//!
//! [validation]
//! xmllint = "/usr/bin/xmllint"
//! validate_on_save = true
//!
//! [output]
//! indent = "    "
//! ```

use config_crate::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::xml::DEFAULT_INDENT;

/// Main configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SspConfig {
    /// Schema resource settings
    #[serde(default)]
    pub schemas: SchemaSettings,

    /// Validation settings
    #[serde(default)]
    pub validation: ValidationSettings,

    /// Output settings
    #[serde(default)]
    pub output: OutputSettings,
}

/// Where the XSD schemas are read from
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SchemaSettings {
    /// Directory holding the schema files; the bundled schemas are used when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource_dir: Option<PathBuf>,
}

/// Validation configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationSettings {
    /// Program used to validate documents against XSD schemas
    #[serde(default = "default_xmllint")]
    pub xmllint: PathBuf,

    /// Validate documents before they are written on close
    #[serde(default)]
    pub validate_on_save: bool,
}

/// Output configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputSettings {
    /// Indentation used when pretty-printing documents
    #[serde(default = "default_indent")]
    pub indent: String,
}

fn default_xmllint() -> PathBuf {
    PathBuf::from("xmllint")
}

fn default_indent() -> String {
    DEFAULT_INDENT.to_string()
}

impl Default for ValidationSettings {
    fn default() -> Self {
        Self {
            xmllint: default_xmllint(),
            validate_on_save: false,
        }
    }
}

impl Default for OutputSettings {
    fn default() -> Self {
        Self {
            indent: default_indent(),
        }
    }
}

impl SspConfig {
    /// Load configuration from default locations
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(None)
    }

    /// Load configuration from a specific file
    pub fn load_from(config_path: Option<&str>) -> Result<Self, ConfigError> {
        let mut builder = Config::builder();

        // Load from default locations
        let config_locations = ["ssp.toml", ".ssp.toml", "config/ssp.toml"];

        for location in config_locations {
            builder = builder.add_source(File::with_name(location).required(false));
        }

        // Load from XDG config directory
        if let Some(config_dir) = directories::ProjectDirs::from("org", "ssp-standard", "ssp-standard") {
            let xdg_config = config_dir.config_dir().join("ssp.toml");
            if xdg_config.exists() {
                builder = builder.add_source(File::from(xdg_config).required(false));
            }
        }

        // Load from specified path
        if let Some(path) = config_path {
            builder = builder.add_source(File::with_name(path).required(true));
        }

        // Load from environment variables (SSP__*)
        builder = builder.add_source(
            Environment::with_prefix("SSP")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build()?;
        config.try_deserialize()
    }

    /// Save configuration to a file
    pub fn save(&self, path: &str) -> std::io::Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        std::fs::write(path, content)
    }
}
