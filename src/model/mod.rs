//! Data models for annotation sessions.

mod attribute;
mod image;

pub use attribute::{
    AttributeKind, AttributeSchema, AttributeSpec, REGION_TYPE_KEY, REGION_TYPE_SCHEMA_JSON,
};
pub use image::{ImageId, ImageRecord, PATH_SEPARATOR, filename_from_locator};
