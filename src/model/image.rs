//! Image records and identifiers.
//!
//! An image is referenced by its source locator (a URL or a base64 data
//! payload). The locator is never fetched here; it is handed to the editor,
//! which loads the image itself.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Separator used when deriving a filename from a locator.
pub const PATH_SEPARATOR: char = '/';

/// Stable key for an image, derived from its source locator.
///
/// The same locator always produces the same identifier, and distinct
/// locators produce distinct identifiers.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ImageId(String);

impl ImageId {
    /// Derive the identifier for a locator.
    pub fn derive(locator: &str) -> Self {
        Self(locator.to_string())
    }

    /// The identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ImageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Derive the display filename of a locator: everything after the last `/`.
///
/// A locator without any separator is its own filename.
pub fn filename_from_locator(locator: &str) -> &str {
    match locator.rfind(PATH_SEPARATOR) {
        Some(pos) => &locator[pos + PATH_SEPARATOR.len_utf8()..],
        None => locator,
    }
}

/// One image registered in an annotation session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageRecord {
    /// Source locator (URL or base64 payload)
    pub locator: String,
    /// Filename derived from the locator
    pub filename: String,
    /// Position of the image in the batch it was loaded with
    pub index: usize,
    /// Data handed to the editor for display
    pub base64_img_data: String,
}

impl ImageRecord {
    /// Create a record for a locator at the given batch position.
    pub fn new(locator: &str, index: usize) -> Self {
        Self {
            locator: locator.to_string(),
            filename: filename_from_locator(locator).to_string(),
            index,
            base64_img_data: locator.to_string(),
        }
    }

    /// The identifier this record is stored under.
    pub fn id(&self) -> ImageId {
        ImageId::derive(&self.locator)
    }
}
