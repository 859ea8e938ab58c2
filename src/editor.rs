//! Interface to the annotation editor that displays a session.
//!
//! The editor itself (region drawing, attribute widgets, saving) lives
//! outside this crate. Bootstrap code only needs the handful of operations
//! below.

use crate::model::{AttributeSchema, ImageRecord};

/// Display operations offered by an annotation editor.
pub trait AnnotationEditor {
    /// Display an image. `image` is `None` when nothing exists at `index`.
    fn show_image(&mut self, index: usize, image: Option<&ImageRecord>);

    /// Rebuild the visible filename listing.
    fn refresh_filename_list(&mut self, filenames: &[String]);

    /// Toggle the attribute editor panel.
    fn toggle_attributes_editor(&mut self);

    /// Redraw the attribute panel from the installed schema.
    fn update_attributes_panel(&mut self, schema: Option<&AttributeSchema>);

    /// Reveal the annotation editor.
    fn show_annotation_editor(&mut self);
}

/// Editor that only logs what it is asked to do.
///
/// Useful for headless runs of the bootstrap binary.
#[derive(Debug, Default)]
pub struct LoggingEditor;

impl AnnotationEditor for LoggingEditor {
    fn show_image(&mut self, index: usize, image: Option<&ImageRecord>) {
        match image {
            Some(record) => log::info!("Showing image {}: {}", index, record.filename),
            None => log::info!("No image to show at index {}", index),
        }
    }

    fn refresh_filename_list(&mut self, filenames: &[String]) {
        log::info!("Filename list refreshed ({} entries)", filenames.len());
        for name in filenames {
            log::trace!("  {}", name);
        }
    }

    fn toggle_attributes_editor(&mut self) {
        log::debug!("Attribute editor toggled");
    }

    fn update_attributes_panel(&mut self, schema: Option<&AttributeSchema>) {
        let count = schema.map_or(0, |s| s.region.len() + s.file.len());
        log::debug!("Attribute panel updated ({} attribute(s))", count);
    }

    fn show_annotation_editor(&mut self) {
        log::debug!("Annotation editor shown");
    }
}

/// One call received by a [`RecordingEditor`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditorCall {
    /// `show_image` with the index and the shown filename
    ShowImage {
        /// Requested index
        index: usize,
        /// Filename of the record, if any
        filename: Option<String>,
    },
    /// `refresh_filename_list` with the listed filenames
    RefreshFilenameList(Vec<String>),
    /// `toggle_attributes_editor`
    ToggleAttributesEditor,
    /// `update_attributes_panel`, with whether a schema was present
    UpdateAttributesPanel {
        /// Whether a schema was installed
        has_schema: bool,
    },
    /// `show_annotation_editor`
    ShowAnnotationEditor,
}

/// Editor that records every call in order.
#[derive(Debug, Default)]
pub struct RecordingEditor {
    calls: Vec<EditorCall>,
}

impl RecordingEditor {
    /// Create an editor with no recorded calls.
    pub fn new() -> Self {
        Self::default()
    }

    /// Calls received so far.
    pub fn calls(&self) -> &[EditorCall] {
        &self.calls
    }
}

impl AnnotationEditor for RecordingEditor {
    fn show_image(&mut self, index: usize, image: Option<&ImageRecord>) {
        self.calls.push(EditorCall::ShowImage {
            index,
            filename: image.map(|r| r.filename.clone()),
        });
    }

    fn refresh_filename_list(&mut self, filenames: &[String]) {
        self.calls
            .push(EditorCall::RefreshFilenameList(filenames.to_vec()));
    }

    fn toggle_attributes_editor(&mut self) {
        self.calls.push(EditorCall::ToggleAttributesEditor);
    }

    fn update_attributes_panel(&mut self, schema: Option<&AttributeSchema>) {
        self.calls.push(EditorCall::UpdateAttributesPanel {
            has_schema: schema.is_some(),
        });
    }

    fn show_annotation_editor(&mut self) {
        self.calls.push(EditorCall::ShowAnnotationEditor);
    }
}
