//! Session bootstrap.
//!
//! Runs once per page load: register the image batch, install the attribute
//! schema, then hand control to the editor (first image, filename list,
//! attribute and annotation panels).

use crate::catalog::{self, Roster};
use crate::config::SessionConfig;
use crate::editor::AnnotationEditor;
use crate::error::LoaderError;
use crate::model::AttributeSchema;
use crate::session::{AnnotationSession, BatchSummary};
use std::path::Path;

/// Show the image at `initial_index` and refresh the filename listing.
///
/// An index past the end of a non-empty session falls back to the first
/// image, so the editor always shows the session's current image. An empty
/// session shows nothing; this never fails.
pub fn trigger_ui<E: AnnotationEditor + ?Sized>(
    session: &mut AnnotationSession,
    editor: &mut E,
    initial_index: usize,
) {
    let index = if session.is_empty() || initial_index < session.order().len() {
        initial_index
    } else {
        log::warn!(
            "Initial index {} is past the last of {} image(s), showing the first",
            initial_index,
            session.order().len()
        );
        0
    };

    let shown = session.show_image(index);
    editor.show_image(index, shown);
    editor.refresh_filename_list(session.filenames());
    session.take_reload_flag();
}

/// Reveal the attribute editor and the annotation editor.
pub fn load_submodules<E: AnnotationEditor + ?Sized>(session: &AnnotationSession, editor: &mut E) {
    editor.toggle_attributes_editor();
    editor.update_attributes_panel(session.schema());
    editor.show_annotation_editor();
}

/// Load a batch, install a schema and drive the editor.
pub fn initialize<S, E>(
    session: &mut AnnotationSession,
    editor: &mut E,
    locators: &[S],
    schema: AttributeSchema,
    initial_index: usize,
) -> Result<BatchSummary, LoaderError>
where
    S: AsRef<str>,
    E: AnnotationEditor + ?Sized,
{
    let summary = session.load_batch(locators)?;
    session.install_schema(schema)?;
    trigger_ui(session, editor, initial_index);
    load_submodules(session, editor);
    Ok(summary)
}

/// Build the image list for the configured annotator.
///
/// `page` selects a 1-based page of `config.page_size` images; `None`
/// returns the whole list.
#[cfg(not(target_arch = "wasm32"))]
pub fn image_list(config: &SessionConfig, page: Option<usize>) -> Result<Vec<String>, LoaderError> {
    let roster = Roster::new(config.annotators.iter().cloned());
    roster.check(&config.annotator)?;

    let urls = catalog::image_urls_for(
        &config.images_root,
        &config.annotator,
        &config.server.base_url(),
    )?;

    let urls = match page {
        Some(page) => catalog::page(&urls, page, config.page_size)?,
        None => urls,
    };

    if urls.is_empty() {
        log::error!("Image list not obtained for annotator {:?}", config.annotator);
    }

    Ok(urls)
}

/// Run the whole bootstrap from a configuration.
///
/// `config_dir` is used to resolve a relative schema file path.
#[cfg(not(target_arch = "wasm32"))]
pub fn run<E: AnnotationEditor + ?Sized>(
    config: &SessionConfig,
    config_dir: Option<&Path>,
    page: Option<usize>,
    editor: &mut E,
) -> Result<AnnotationSession, LoaderError> {
    let urls = image_list(config, page)?;
    let schema = config.schema.resolve(config_dir)?;

    let mut session = AnnotationSession::new().with_duplicate_policy(config.duplicate_policy);
    initialize(&mut session, editor, &urls, schema, config.initial_index)?;
    Ok(session)
}
