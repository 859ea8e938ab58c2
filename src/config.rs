//! Configuration file support.
//!
//! Everything that used to be baked into the annotation page (annotator
//! name, server address, attribute schema, starting image) is read from a
//! JSON configuration file instead.

use crate::catalog::DEFAULT_PAGE_SIZE;
use crate::error::SchemaError;
use crate::model::AttributeSchema;
use crate::session::DuplicatePolicy;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Log level setting for the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Show only errors
    Error,
    /// Show errors and warnings
    Warn,
    /// Show errors, warnings, and info messages
    #[default]
    Info,
    /// Show debug-level logging
    Debug,
    /// Show all log messages including trace
    Trace,
}

impl LogLevel {
    /// Convert to log crate's LevelFilter.
    pub fn to_level_filter(&self) -> log::LevelFilter {
        match self {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

/// Current configuration file format version.
/// Increment this when making breaking changes to the config format.
pub const CONFIG_VERSION: u32 = 1;

/// Address of the annotation server, used to build image URLs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerConfig {
    /// URL scheme, `http` or `https`
    #[serde(default = "default_scheme")]
    pub scheme: String,
    /// Host name or address
    #[serde(default = "default_host")]
    pub host: String,
    /// TCP port
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_scheme() -> String {
    "http".to_string()
}

fn default_host() -> String {
    "localhost".to_string()
}

fn default_port() -> u16 {
    5000
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            scheme: default_scheme(),
            host: default_host(),
            port: default_port(),
        }
    }
}

impl ServerConfig {
    /// `scheme://host:port`, without a trailing slash.
    pub fn base_url(&self) -> String {
        format!("{}://{}:{}", self.scheme, self.host, self.port)
    }
}

/// Where the attribute schema comes from.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "source", rename_all = "lowercase")]
pub enum SchemaSource {
    /// The built-in region type classification
    #[default]
    Builtin,
    /// A schema written directly in the configuration
    Inline {
        /// The schema itself
        schema: AttributeSchema,
    },
    /// A VIA attribute JSON file
    File {
        /// Path to the file, relative paths resolve against the config file
        path: PathBuf,
    },
}

impl SchemaSource {
    /// Produce a validated schema. Relative file paths are joined onto `base_dir`.
    pub fn resolve(&self, base_dir: Option<&Path>) -> Result<AttributeSchema, SchemaError> {
        let schema = match self {
            SchemaSource::Builtin => AttributeSchema::region_type(),
            SchemaSource::Inline { schema } => schema.clone(),
            SchemaSource::File { path } => {
                let path = match base_dir {
                    Some(dir) if path.is_relative() => dir.join(path),
                    _ => path.clone(),
                };
                log::debug!("Reading attribute schema from {:?}", path);
                return AttributeSchema::load_from_file(&path);
            }
        };
        schema.validate()?;
        Ok(schema)
    }
}

/// Session configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Version of the configuration file format
    pub version: u32,

    /// Annotator this session is for
    pub annotator: String,

    /// Every annotator the server knows about
    #[serde(default)]
    pub annotators: Vec<String>,

    /// Server address used for image URLs
    #[serde(default)]
    pub server: ServerConfig,

    /// Folder holding one image folder per annotator
    #[serde(default = "default_images_root")]
    pub images_root: PathBuf,

    /// Images per page when a page number is requested
    #[serde(default = "default_page_size")]
    pub page_size: usize,

    /// Index of the image shown first
    #[serde(default)]
    pub initial_index: usize,

    /// Handling of repeated image URLs
    #[serde(default)]
    pub duplicate_policy: DuplicatePolicy,

    /// Attribute schema to install
    #[serde(default)]
    pub schema: SchemaSource,

    /// Log verbosity level
    #[serde(default)]
    pub log_level: LogLevel,
}

fn default_images_root() -> PathBuf {
    PathBuf::from("static/images")
}

fn default_page_size() -> usize {
    DEFAULT_PAGE_SIZE
}

impl SessionConfig {
    /// Create a configuration for one annotator with default values.
    pub fn new(annotator: &str) -> Self {
        Self {
            version: CONFIG_VERSION,
            annotator: annotator.to_string(),
            annotators: vec![annotator.to_string()],
            server: ServerConfig::default(),
            images_root: default_images_root(),
            page_size: default_page_size(),
            initial_index: 0,
            duplicate_policy: DuplicatePolicy::default(),
            schema: SchemaSource::default(),
            log_level: LogLevel::default(),
        }
    }

    /// Serialize the configuration to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Deserialize configuration from JSON.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;

        // Validate version compatibility
        if config.version > CONFIG_VERSION {
            return Err(ConfigError::VersionTooNew {
                file_version: config.version,
                supported_version: CONFIG_VERSION,
            });
        }
        if config.version < CONFIG_VERSION {
            log::warn!(
                "Configuration version {} is older than {}",
                config.version,
                CONFIG_VERSION
            );
        }

        if config.annotator.trim().is_empty() {
            return Err(ConfigError::invalid_value("annotator", "must not be empty"));
        }
        if config.page_size == 0 {
            return Err(ConfigError::invalid_value("page_size", "must be at least 1"));
        }

        Ok(config)
    }

    /// Load configuration from a file.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path)?;
        let config = Self::from_json(&json)?;
        log::info!("Loaded configuration from {:?}", path);
        Ok(config)
    }

    /// Save configuration to a file, creating parent directories as needed.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn save_to_file(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = self.to_json()?;
        std::fs::write(path, json)?;
        log::info!("Saved configuration to {:?}", path);
        Ok(())
    }

    /// Get the default filename for the configuration.
    pub fn default_filename() -> &'static str {
        "via-loader.json"
    }

    /// Get the default config file path.
    /// Returns None on WASM (no filesystem access).
    #[cfg(not(target_arch = "wasm32"))]
    pub fn default_path() -> Option<PathBuf> {
        // Try to use XDG config directory, fall back to home directory
        if let Some(config_dir) = dirs::config_dir() {
            Some(config_dir.join("via-loader").join(Self::default_filename()))
        } else {
            dirs::home_dir().map(|home_dir| {
                home_dir
                    .join(".config")
                    .join("via-loader")
                    .join(Self::default_filename())
            })
        }
    }
}

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// JSON parsing error
    #[error("Failed to parse configuration: {0}")]
    ParseError(#[from] serde_json::Error),

    /// Configuration version is newer than supported
    #[error(
        "Configuration file version {file_version} is newer than supported version {supported_version}"
    )]
    VersionTooNew {
        /// Version found in the file
        file_version: u32,
        /// Newest version this build reads
        supported_version: u32,
    },

    /// A field holds an unusable value
    #[error("Invalid value for '{field}': {message}")]
    InvalidValue {
        /// Name of the offending field
        field: String,
        /// What is wrong with it
        message: String,
    },

    /// I/O error when reading/writing config
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// No usable configuration path could be determined
    #[error("No configuration file given and no default location available")]
    NoPath,
}

impl ConfigError {
    /// Create an invalid value error.
    pub fn invalid_value(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidValue {
            field: field.into(),
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{AttributeKind, REGION_TYPE_KEY};

    #[test]
    fn test_minimal_config_uses_defaults() {
        let config = SessionConfig::from_json(r#"{"version": 1, "annotator": "alice"}"#).unwrap();

        assert_eq!(config.annotator, "alice");
        assert_eq!(config.server.base_url(), "http://localhost:5000");
        assert_eq!(config.page_size, DEFAULT_PAGE_SIZE);
        assert_eq!(config.initial_index, 0);
        assert_eq!(config.duplicate_policy, DuplicatePolicy::Overwrite);
        assert_eq!(config.schema, SchemaSource::Builtin);
        assert_eq!(config.log_level, LogLevel::Info);
    }

    #[test]
    fn test_full_config() {
        let json = r#"{
            "version": 1,
            "annotator": "bob",
            "annotators": ["alice", "bob"],
            "server": { "scheme": "https", "host": "annotate.example.org", "port": 8443 },
            "images_root": "/srv/images",
            "page_size": 25,
            "initial_index": 2,
            "duplicate_policy": "skip",
            "schema": {
                "source": "inline",
                "schema": {
                    "file": {
                        "legible": {
                            "type": "checkbox",
                            "options": { "yes": "Yes" }
                        }
                    }
                }
            },
            "log_level": "debug"
        }"#;
        let config = SessionConfig::from_json(json).unwrap();

        assert_eq!(config.server.base_url(), "https://annotate.example.org:8443");
        assert_eq!(config.images_root, PathBuf::from("/srv/images"));
        assert_eq!(config.page_size, 25);
        assert_eq!(config.duplicate_policy, DuplicatePolicy::Skip);
        assert_eq!(config.log_level.to_level_filter(), log::LevelFilter::Debug);

        let schema = config.schema.resolve(None).unwrap();
        assert_eq!(
            schema.file_attribute("legible").unwrap().kind,
            AttributeKind::Checkbox
        );
    }

    #[test]
    fn test_version_too_new() {
        let err = SessionConfig::from_json(r#"{"version": 99, "annotator": "alice"}"#).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::VersionTooNew {
                file_version: 99,
                ..
            }
        ));
    }

    #[test]
    fn test_rejects_empty_annotator() {
        let err = SessionConfig::from_json(r#"{"version": 1, "annotator": " "}"#).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { ref field, .. } if field == "annotator"));
    }

    #[test]
    fn test_rejects_zero_page_size() {
        let err = SessionConfig::from_json(r#"{"version": 1, "annotator": "a", "page_size": 0}"#)
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { ref field, .. } if field == "page_size"));
    }

    #[test]
    fn test_builtin_schema_resolves() {
        let schema = SchemaSource::Builtin.resolve(None).unwrap();
        assert!(schema.region_attribute(REGION_TYPE_KEY).is_some());
    }

    #[test]
    fn test_schema_file_relative_to_base_dir() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("attributes.json"),
            r#"{"region":{"species":{"type":"radio","options":{"a":"A","b":"B"}}}}"#,
        )
        .unwrap();

        let source = SchemaSource::File {
            path: PathBuf::from("attributes.json"),
        };
        let schema = source.resolve(Some(dir.path())).unwrap();
        assert!(schema.region_attribute("species").is_some());
    }

    #[test]
    fn test_missing_schema_file() {
        let source = SchemaSource::File {
            path: PathBuf::from("/nonexistent/attributes.json"),
        };
        assert!(matches!(source.resolve(None), Err(SchemaError::Io { .. })));
    }

    #[test]
    fn test_file_save_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");

        let mut config = SessionConfig::new("carol");
        config.initial_index = 4;
        config.save_to_file(&path).unwrap();

        let loaded = SessionConfig::load_from_file(&path).unwrap();
        assert_eq!(loaded.annotator, "carol");
        assert_eq!(loaded.annotators, vec!["carol".to_string()]);
        assert_eq!(loaded.initial_index, 4);
    }
}
