//! Annotation session state.
//!
//! The session owns everything the annotation editor reads while a page is
//! open: the filename list, the id-to-record map, the navigation order, the
//! running image counter and the installed attribute schema.

use crate::error::SessionError;
use crate::model::{AttributeSchema, AttributeSpec, ImageId, ImageRecord};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// What to do when a batch contains a locator that is already registered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DuplicatePolicy {
    /// Replace the stored record; the filename and ordering lists still grow
    #[default]
    Overwrite,
    /// Ignore the later occurrence entirely
    Skip,
}

/// Outcome of loading one batch of locators.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchSummary {
    /// Locators appended to the ordering list
    pub loaded: usize,
    /// Locators that replaced an existing record
    pub overwritten: usize,
    /// Locators ignored as duplicates
    pub skipped: usize,
}

/// In-memory model of an annotation session.
#[derive(Debug, Clone, Default)]
pub struct AnnotationSession {
    /// Display filenames in load order
    filenames: Vec<String>,
    /// Image records keyed by identifier
    images: HashMap<ImageId, ImageRecord>,
    /// Identifiers in navigation order
    order: Vec<ImageId>,
    /// Number of images loaded so far
    image_count: usize,
    /// Set whenever the editor's image table is stale
    reload_img_table: bool,
    /// Index into `order` of the displayed image
    current_index: usize,
    /// Installed attribute schema
    schema: Option<AttributeSchema>,
    duplicate_policy: DuplicatePolicy,
}

impl AnnotationSession {
    /// Create an empty session with the default duplicate policy.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set how duplicate locators are handled.
    pub fn with_duplicate_policy(mut self, policy: DuplicatePolicy) -> Self {
        self.duplicate_policy = policy;
        self
    }

    /// Drop every image and the schema, returning to the freshly created state.
    pub fn reset(&mut self) {
        self.filenames.clear();
        self.images.clear();
        self.order.clear();
        self.image_count = 0;
        self.reload_img_table = false;
        self.current_index = 0;
        self.schema = None;
        log::debug!("Session reset");
    }

    /// Register a batch of image locators, in order.
    ///
    /// Every locator is checked before anything is registered, so a blank
    /// entry leaves the session unchanged. A locator whose filename part is
    /// empty (such as a base64 payload ending in `/`) is accepted with an
    /// empty filename. Each record's `index` is its position within
    /// `locators`.
    pub fn load_batch<S: AsRef<str>>(
        &mut self,
        locators: &[S],
    ) -> Result<BatchSummary, SessionError> {
        for (position, locator) in locators.iter().enumerate() {
            let locator = locator.as_ref();
            if locator.trim().is_empty() {
                return Err(SessionError::malformed_locator(position, locator));
            }
        }

        let mut summary = BatchSummary::default();

        for (position, locator) in locators.iter().enumerate() {
            let record = ImageRecord::new(locator.as_ref(), position);
            let id = record.id();

            if self.images.contains_key(&id) {
                match self.duplicate_policy {
                    DuplicatePolicy::Skip => {
                        log::warn!("Skipping duplicate image {}", id);
                        summary.skipped += 1;
                        continue;
                    }
                    DuplicatePolicy::Overwrite => {
                        log::warn!("Duplicate image {} replaces the earlier record", id);
                        summary.overwritten += 1;
                    }
                }
            }

            log::trace!("Registering image {} as {:?}", position, record.filename);
            self.filenames.push(record.filename.clone());
            self.images.insert(id.clone(), record);
            self.order.push(id);
            self.image_count += 1;
            self.reload_img_table = true;
            summary.loaded += 1;
        }

        log::info!(
            "Loaded {} image(s) ({} overwritten, {} skipped), {} registered",
            summary.loaded,
            summary.overwritten,
            summary.skipped,
            self.images.len()
        );

        Ok(summary)
    }

    /// Validate and install an attribute schema, replacing any previous one.
    pub fn install_schema(&mut self, schema: AttributeSchema) -> Result<(), SessionError> {
        schema.validate()?;
        log::info!(
            "Installed attribute schema: {} region, {} file attribute(s)",
            schema.region.len(),
            schema.file.len()
        );
        self.schema = Some(schema);
        Ok(())
    }

    /// The installed schema, if any.
    pub fn schema(&self) -> Option<&AttributeSchema> {
        self.schema.as_ref()
    }

    /// Look up a region attribute of the installed schema.
    pub fn region_attribute(&self, key: &str) -> Option<&AttributeSpec> {
        self.schema.as_ref()?.region_attribute(key)
    }

    /// Look up a file attribute of the installed schema.
    pub fn file_attribute(&self, key: &str) -> Option<&AttributeSpec> {
        self.schema.as_ref()?.file_attribute(key)
    }

    /// Select the image at `index` in navigation order.
    ///
    /// Out-of-range indices (including any index on an empty session) leave
    /// the selection unchanged and return `None`.
    pub fn show_image(&mut self, index: usize) -> Option<&ImageRecord> {
        if index >= self.order.len() {
            log::debug!(
                "No image at index {} ({} in session)",
                index,
                self.order.len()
            );
            return None;
        }
        self.current_index = index;
        self.image_at(index)
    }

    /// Advance to the next image, wrapping to the first.
    pub fn next_image(&mut self) -> Option<&ImageRecord> {
        if self.order.is_empty() {
            return None;
        }
        let next = (self.current_index + 1) % self.order.len();
        self.show_image(next)
    }

    /// Go back to the previous image, wrapping to the last.
    pub fn previous_image(&mut self) -> Option<&ImageRecord> {
        if self.order.is_empty() {
            return None;
        }
        let len = self.order.len();
        let previous = (self.current_index + len - 1) % len;
        self.show_image(previous)
    }

    /// The currently selected image.
    pub fn current_image(&self) -> Option<&ImageRecord> {
        self.image_at(self.current_index)
    }

    /// Index of the currently selected image.
    pub fn current_index(&self) -> usize {
        self.current_index
    }

    /// The record at a position in navigation order.
    pub fn image_at(&self, index: usize) -> Option<&ImageRecord> {
        self.order.get(index).and_then(|id| self.images.get(id))
    }

    /// Look up a record by identifier.
    pub fn image(&self, id: &ImageId) -> Option<&ImageRecord> {
        self.images.get(id)
    }

    /// Display filenames in load order.
    pub fn filenames(&self) -> &[String] {
        &self.filenames
    }

    /// Identifiers in navigation order.
    pub fn order(&self) -> &[ImageId] {
        &self.order
    }

    /// All registered records keyed by identifier.
    pub fn images(&self) -> &HashMap<ImageId, ImageRecord> {
        &self.images
    }

    /// Number of images loaded, counting overwritten duplicates.
    pub fn image_count(&self) -> usize {
        self.image_count
    }

    /// Whether the session holds no images.
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Whether the editor's image table needs rebuilding.
    pub fn needs_reload(&self) -> bool {
        self.reload_img_table
    }

    /// Read and clear the reload flag.
    pub fn take_reload_flag(&mut self) -> bool {
        std::mem::take(&mut self.reload_img_table)
    }

    /// The duplicate policy in effect.
    pub fn duplicate_policy(&self) -> DuplicatePolicy {
        self.duplicate_policy
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::REGION_TYPE_KEY;
    use std::collections::BTreeSet;

    fn urls(names: &[&str]) -> Vec<String> {
        names
            .iter()
            .map(|n| format!("http://localhost:5000/static/images/alice/{n}"))
            .collect()
    }

    #[test]
    fn test_session_new() {
        let session = AnnotationSession::new();
        assert!(session.is_empty());
        assert_eq!(session.image_count(), 0);
        assert!(!session.needs_reload());
        assert!(session.schema().is_none());
    }

    #[test]
    fn test_load_batch_registers_every_url() {
        let input = urls(&["a.jpg", "b.jpg", "c.png"]);
        let mut session = AnnotationSession::new();
        let summary = session.load_batch(&input).unwrap();

        assert_eq!(summary.loaded, 3);
        assert_eq!(session.order().len(), input.len());
        assert_eq!(session.images().len(), input.len());
        assert_eq!(session.image_count(), 3);
        assert_eq!(session.filenames(), ["a.jpg", "b.jpg", "c.png"]);
        assert!(session.needs_reload());

        for url in &input {
            let record = session.image(&ImageId::derive(url)).unwrap();
            assert_eq!(&record.locator, url);
        }
    }

    #[test]
    fn test_record_index_is_batch_position() {
        let mut session = AnnotationSession::new();
        session.load_batch(&urls(&["a.jpg", "b.jpg", "c.jpg"])).unwrap();

        for (position, id) in session.order().iter().enumerate() {
            assert_eq!(session.image(id).unwrap().index, position);
        }
    }

    #[test]
    fn test_duplicate_overwrites_record_but_extends_order() {
        let input = urls(&["same.jpg", "same.jpg"]);
        let mut session = AnnotationSession::new();
        let summary = session.load_batch(&input).unwrap();

        assert_eq!(summary.overwritten, 1);
        assert_eq!(session.images().len(), 1);
        assert_eq!(session.order().len(), 2);
        assert_eq!(session.filenames().len(), 2);
        assert_eq!(session.image_count(), 2);
        // Later record wins
        assert_eq!(session.image_at(0).unwrap().index, 1);
    }

    #[test]
    fn test_duplicate_skip_policy() {
        let input = urls(&["same.jpg", "other.jpg", "same.jpg"]);
        let mut session = AnnotationSession::new().with_duplicate_policy(DuplicatePolicy::Skip);
        let summary = session.load_batch(&input).unwrap();

        assert_eq!(summary.loaded, 2);
        assert_eq!(summary.skipped, 1);
        assert_eq!(session.order().len(), 2);
        assert_eq!(session.image_at(0).unwrap().index, 0);
    }

    #[test]
    fn test_duplicate_across_batches() {
        let mut session = AnnotationSession::new();
        session.load_batch(&urls(&["a.jpg"])).unwrap();
        let summary = session.load_batch(&urls(&["a.jpg"])).unwrap();

        assert_eq!(summary.overwritten, 1);
        assert_eq!(session.images().len(), 1);
        assert_eq!(session.order().len(), 2);
    }

    #[test]
    fn test_empty_batch() {
        let mut session = AnnotationSession::new();
        let input: Vec<String> = Vec::new();
        let summary = session.load_batch(&input).unwrap();

        assert_eq!(summary, BatchSummary::default());
        assert!(session.is_empty());
        assert!(session.filenames().is_empty());
        assert!(session.images().is_empty());
        assert_eq!(session.image_count(), 0);
        assert!(!session.needs_reload());
        assert!(session.show_image(0).is_none());
        assert!(session.current_image().is_none());
    }

    #[test]
    fn test_malformed_locator_leaves_session_untouched() {
        let mut session = AnnotationSession::new();
        let err = session
            .load_batch(&["http://host/a.jpg", "  ", "http://host/c.jpg"])
            .unwrap_err();

        assert!(matches!(err, SessionError::MalformedLocator { position: 1, .. }));
        assert!(session.is_empty());
        assert_eq!(session.image_count(), 0);
    }

    #[test]
    fn test_base64_locator_ending_in_separator() {
        let payload = "data:image/png;base64,////";
        let mut session = AnnotationSession::new();
        let summary = session.load_batch(&[payload, "http://host/b.jpg"]).unwrap();

        assert_eq!(summary.loaded, 2);
        assert_eq!(session.filenames(), ["", "b.jpg"]);
        assert_eq!(session.image(&ImageId::derive(payload)).unwrap().locator, payload);
    }

    #[test]
    fn test_navigation_wraps() {
        let mut session = AnnotationSession::new();
        session.load_batch(&urls(&["a.jpg", "b.jpg", "c.jpg"])).unwrap();

        assert_eq!(session.show_image(0).unwrap().filename, "a.jpg");
        assert_eq!(session.next_image().unwrap().filename, "b.jpg");
        assert_eq!(session.next_image().unwrap().filename, "c.jpg");
        assert_eq!(session.next_image().unwrap().filename, "a.jpg");
        assert_eq!(session.previous_image().unwrap().filename, "c.jpg");
        assert_eq!(session.current_index(), 2);
    }

    #[test]
    fn test_show_image_out_of_range_keeps_selection() {
        let mut session = AnnotationSession::new();
        session.load_batch(&urls(&["a.jpg", "b.jpg"])).unwrap();
        session.show_image(1);

        assert!(session.show_image(5).is_none());
        assert_eq!(session.current_index(), 1);
    }

    #[test]
    fn test_navigation_on_empty_session() {
        let mut session = AnnotationSession::new();
        assert!(session.next_image().is_none());
        assert!(session.previous_image().is_none());
    }

    #[test]
    fn test_install_schema() {
        let mut session = AnnotationSession::new();
        session
            .install_schema(AttributeSchema::region_type())
            .unwrap();

        let spec = session.region_attribute(REGION_TYPE_KEY).unwrap();
        assert!(spec.kind.is_single_choice());
        assert_eq!(
            spec.option_codes(),
            BTreeSet::from(["t", "h", "text", "figure", "unknown"])
        );
        assert_eq!(spec.defaults(), BTreeSet::from(["unknown"]));
        assert!(session.file_attribute(REGION_TYPE_KEY).is_none());
    }

    #[test]
    fn test_install_invalid_schema_keeps_previous() {
        let mut session = AnnotationSession::new();
        session
            .install_schema(AttributeSchema::region_type())
            .unwrap();

        let mut bad = AttributeSchema::new();
        bad.region.insert(
            "kind".to_string(),
            AttributeSpec::new(crate::model::AttributeKind::Dropdown, "no options"),
        );
        assert!(session.install_schema(bad).is_err());
        assert!(session.region_attribute(REGION_TYPE_KEY).is_some());
    }

    #[test]
    fn test_take_reload_flag() {
        let mut session = AnnotationSession::new();
        session.load_batch(&urls(&["a.jpg"])).unwrap();

        assert!(session.take_reload_flag());
        assert!(!session.needs_reload());
    }

    #[test]
    fn test_reset() {
        let mut session = AnnotationSession::new().with_duplicate_policy(DuplicatePolicy::Skip);
        session.load_batch(&urls(&["a.jpg", "b.jpg"])).unwrap();
        session
            .install_schema(AttributeSchema::region_type())
            .unwrap();
        session.show_image(1);

        session.reset();

        assert!(session.is_empty());
        assert!(session.filenames().is_empty());
        assert_eq!(session.image_count(), 0);
        assert_eq!(session.current_index(), 0);
        assert!(session.schema().is_none());
        assert_eq!(session.duplicate_policy(), DuplicatePolicy::Skip);
    }
}
