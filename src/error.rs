//! Error types for session bootstrap operations.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while importing or validating an attribute schema.
#[derive(Error, Debug)]
pub enum SchemaError {
    /// The schema JSON could not be parsed
    #[error("Failed to parse attribute schema: {0}")]
    Json(#[from] serde_json::Error),

    /// A single-choice attribute declares more than one default option
    #[error("Attribute '{key}' is single-choice but has {count} default options")]
    MultipleDefaults {
        /// Attribute key
        key: String,
        /// Number of defaults that were selected
        count: usize,
    },

    /// A default option refers to an option code that does not exist
    #[error("Attribute '{key}' has default option '{option}' which is not one of its options")]
    UnknownDefault {
        /// Attribute key
        key: String,
        /// The unknown option code
        option: String,
    },

    /// A choice attribute declares no options at all
    #[error("Attribute '{key}' of kind '{kind}' declares no options")]
    EmptyOptions {
        /// Attribute key
        key: String,
        /// Attribute kind name
        kind: String,
    },

    /// Schema file could not be read
    #[error("Failed to read schema file {path:?}: {source}")]
    Io {
        /// Path of the schema file
        path: PathBuf,
        /// Underlying I/O error
        source: std::io::Error,
    },
}

/// Errors raised by the annotation session.
#[derive(Error, Debug)]
pub enum SessionError {
    /// A source locator in a batch is unusable
    #[error("Malformed image locator at position {position}: {locator:?}")]
    MalformedLocator {
        /// Position of the locator in the batch
        position: usize,
        /// The offending locator
        locator: String,
    },

    /// The attribute schema could not be installed
    #[error(transparent)]
    Schema(#[from] SchemaError),
}

/// Errors raised while building an annotator's image list.
#[derive(Error, Debug)]
pub enum CatalogError {
    /// I/O error while listing or creating image folders
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Annotator is not part of the configured roster
    #[error("Annotator '{name}' is not in the annotator list")]
    UnknownAnnotator {
        /// The requested annotator name
        name: String,
    },

    /// Page numbers are 1-based
    #[error("Invalid page {page}: pages start at 1")]
    InvalidPage {
        /// The requested page
        page: usize,
    },
}

/// Top-level error for a full bootstrap run.
#[derive(Error, Debug)]
pub enum LoaderError {
    /// Configuration problem
    #[error(transparent)]
    Config(#[from] crate::config::ConfigError),

    /// Catalogue problem
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    /// Session problem
    #[error(transparent)]
    Session(#[from] SessionError),

    /// Schema problem
    #[error(transparent)]
    Schema(#[from] SchemaError),
}

impl SessionError {
    /// Create a malformed locator error.
    pub fn malformed_locator(position: usize, locator: impl Into<String>) -> Self {
        Self::MalformedLocator {
            position,
            locator: locator.into(),
        }
    }
}
