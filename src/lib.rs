//! via-loader - session bootstrap for VIA-style image annotation
//!
//! Registers an annotator's images in an explicit session, installs the
//! attribute schema regions are classified with, and drives an external
//! annotation editor through the [`editor::AnnotationEditor`] trait.

pub mod bootstrap;
pub mod catalog;
pub mod config;
pub mod editor;
pub mod error;
pub mod model;
pub mod session;

pub use config::SessionConfig;
pub use editor::{AnnotationEditor, LoggingEditor};
pub use error::LoaderError;
pub use session::{AnnotationSession, BatchSummary, DuplicatePolicy};
