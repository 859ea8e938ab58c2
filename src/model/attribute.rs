//! Attribute schema data model.
//!
//! Attributes describe what an annotator records about a region or a whole
//! file. The JSON layout follows VIA's project attribute format:
//!
//! ```json
//! {
//!   "region": {
//!     "type": {
//!       "type": "dropdown",
//!       "description": "Category of object",
//!       "options": { "t": "title", "unknown": "Unknown" },
//!       "default_options": { "unknown": true }
//!     }
//!   },
//!   "file": {}
//! }
//! ```

use crate::error::SchemaError;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Key of the built-in region classification attribute.
pub const REGION_TYPE_KEY: &str = "type";

/// The built-in region classification schema in VIA JSON.
pub const REGION_TYPE_SCHEMA_JSON: &str = r#"{"region":{"type":{"type":"dropdown","description":"Category of object","options":{"t":"title","h":"header","text":"text box","figure":"figure","unknown":"Unknown"},"default_options":{"unknown":true}}}}"#;

/// Input widget kind of an attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttributeKind {
    /// Free text
    Text,
    /// Any number of options may be ticked
    Checkbox,
    /// Exactly one option, shown as radio buttons
    Radio,
    /// Exactly one option, shown as a dropdown
    Dropdown,
    /// Exactly one option, shown as image thumbnails
    Image,
}

impl AttributeKind {
    /// Get the display name for this kind.
    pub fn name(&self) -> &'static str {
        match self {
            AttributeKind::Text => "text",
            AttributeKind::Checkbox => "checkbox",
            AttributeKind::Radio => "radio",
            AttributeKind::Dropdown => "dropdown",
            AttributeKind::Image => "image",
        }
    }

    /// Whether at most one option can be selected.
    pub fn is_single_choice(&self) -> bool {
        matches!(
            self,
            AttributeKind::Radio | AttributeKind::Dropdown | AttributeKind::Image
        )
    }

    /// Whether the attribute draws its values from a fixed option set.
    pub fn has_options(&self) -> bool {
        !matches!(self, AttributeKind::Text)
    }
}

/// Descriptor of a single attribute.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeSpec {
    /// Input kind
    #[serde(rename = "type")]
    pub kind: AttributeKind,
    /// Human-readable description
    #[serde(default)]
    pub description: String,
    /// Option code to label
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub options: BTreeMap<String, String>,
    /// Option codes selected by default (`true` means selected)
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub default_options: BTreeMap<String, bool>,
    /// Default value of a text attribute
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<String>,
}

impl AttributeSpec {
    /// Create an attribute without options or defaults.
    pub fn new(kind: AttributeKind, description: &str) -> Self {
        Self {
            kind,
            description: description.to_string(),
            options: BTreeMap::new(),
            default_options: BTreeMap::new(),
            default_value: None,
        }
    }

    /// Add an option.
    pub fn with_option(mut self, code: &str, label: &str) -> Self {
        self.options.insert(code.to_string(), label.to_string());
        self
    }

    /// Mark an option as selected by default.
    pub fn with_default(mut self, code: &str) -> Self {
        self.default_options.insert(code.to_string(), true);
        self
    }

    /// Option codes, sorted.
    pub fn option_codes(&self) -> BTreeSet<&str> {
        self.options.keys().map(String::as_str).collect()
    }

    /// Option codes that are selected by default.
    pub fn defaults(&self) -> BTreeSet<&str> {
        self.default_options
            .iter()
            .filter(|(_, selected)| **selected)
            .map(|(code, _)| code.as_str())
            .collect()
    }

    /// Label for an option code.
    pub fn label(&self, code: &str) -> Option<&str> {
        self.options.get(code).map(String::as_str)
    }

    fn validate(&self, key: &str) -> Result<(), SchemaError> {
        if self.kind.has_options() && self.options.is_empty() {
            return Err(SchemaError::EmptyOptions {
                key: key.to_string(),
                kind: self.kind.name().to_string(),
            });
        }

        let defaults = self.defaults();
        if let Some(option) = defaults.iter().find(|code| !self.options.contains_key(**code)) {
            return Err(SchemaError::UnknownDefault {
                key: key.to_string(),
                option: option.to_string(),
            });
        }

        if self.kind.is_single_choice() && defaults.len() > 1 {
            return Err(SchemaError::MultipleDefaults {
                key: key.to_string(),
                count: defaults.len(),
            });
        }

        Ok(())
    }
}

/// Region and file attribute descriptors.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeSchema {
    /// Attributes attached to each drawn region
    #[serde(default)]
    pub region: BTreeMap<String, AttributeSpec>,
    /// Attributes attached to a whole image
    #[serde(default)]
    pub file: BTreeMap<String, AttributeSpec>,
}

impl AttributeSchema {
    /// Create an empty schema.
    pub fn new() -> Self {
        Self::default()
    }

    /// The built-in single-choice "type of region" classification.
    pub fn region_type() -> Self {
        let spec = AttributeSpec::new(AttributeKind::Dropdown, "Category of object")
            .with_option("t", "title")
            .with_option("h", "header")
            .with_option("text", "text box")
            .with_option("figure", "figure")
            .with_option("unknown", "Unknown")
            .with_default("unknown");

        let mut schema = Self::new();
        schema.region.insert(REGION_TYPE_KEY.to_string(), spec);
        schema
    }

    /// Import a schema from VIA attribute JSON and validate it.
    pub fn from_json(json: &str) -> Result<Self, SchemaError> {
        let schema: Self = serde_json::from_str(json)?;
        schema.validate()?;
        log::debug!(
            "Imported attribute schema: {} region, {} file attribute(s)",
            schema.region.len(),
            schema.file.len()
        );
        Ok(schema)
    }

    /// Load and validate a schema file.
    pub fn load_from_file(path: &std::path::Path) -> Result<Self, SchemaError> {
        let json = std::fs::read_to_string(path).map_err(|source| SchemaError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&json)
    }

    /// Serialize the schema to VIA attribute JSON.
    pub fn to_json(&self) -> Result<String, SchemaError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Check every attribute in both scopes.
    pub fn validate(&self) -> Result<(), SchemaError> {
        for (key, spec) in self.region.iter().chain(self.file.iter()) {
            spec.validate(key)?;
        }
        Ok(())
    }

    /// Look up a region attribute.
    pub fn region_attribute(&self, key: &str) -> Option<&AttributeSpec> {
        self.region.get(key)
    }

    /// Look up a file attribute.
    pub fn file_attribute(&self, key: &str) -> Option<&AttributeSpec> {
        self.file.get(key)
    }

    /// Whether both scopes are empty.
    pub fn is_empty(&self) -> bool {
        self.region.is_empty() && self.file.is_empty()
    }
}
