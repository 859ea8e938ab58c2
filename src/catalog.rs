//! Image catalogue for annotators.
//!
//! Each annotator has a folder `<images_root>/<annotator>`; the images in it
//! are served under `<base_url>/static/images/<annotator>/<file>`.

use crate::error::CatalogError;
use std::path::Path;

/// Supported image extensions
pub const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "bmp", "tiff", "tif", "webp", "gif"];

/// Images per page when a listing is split into pages.
pub const DEFAULT_PAGE_SIZE: usize = 100;

/// Check if a filename has a supported image extension.
pub fn is_image_filename(name: &str) -> bool {
    let lower = name.to_lowercase();
    IMAGE_EXTENSIONS
        .iter()
        .any(|ext| lower.ends_with(&format!(".{}", ext)))
}

/// The annotators a server accepts.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Roster {
    names: Vec<String>,
}

impl Roster {
    /// Create a roster from annotator names.
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            names: names.into_iter().map(Into::into).collect(),
        }
    }

    /// Whether the annotator is known.
    pub fn contains(&self, name: &str) -> bool {
        self.names.iter().any(|n| n == name)
    }

    /// Fail unless the annotator is known.
    pub fn check(&self, name: &str) -> Result<(), CatalogError> {
        if self.contains(name) {
            Ok(())
        } else {
            log::error!("Annotator {:?} not in the annotator list", name);
            Err(CatalogError::UnknownAnnotator {
                name: name.to_string(),
            })
        }
    }

    /// Annotator names in configured order.
    pub fn names(&self) -> &[String] {
        &self.names
    }
}

/// Create `<images_root>/<annotator>` for every annotator that lacks one.
///
/// Returns the number of folders created.
#[cfg(not(target_arch = "wasm32"))]
pub fn ensure_annotator_folders(images_root: &Path, roster: &Roster) -> Result<usize, CatalogError> {
    let mut created = 0;
    for annotator in roster.names() {
        let dir = images_root.join(annotator);
        if !dir.exists() {
            log::warn!("Creating image dir {:?}", dir);
            std::fs::create_dir_all(&dir)?;
            created += 1;
        }
    }
    Ok(created)
}

/// List the image URLs of one annotator, sorted.
///
/// Hidden files and files without an image extension are ignored. A missing
/// annotator folder is logged and produces an empty list.
#[cfg(not(target_arch = "wasm32"))]
pub fn image_urls_for(
    images_root: &Path,
    annotator: &str,
    base_url: &str,
) -> Result<Vec<String>, CatalogError> {
    let folder = images_root.join(annotator);
    if !folder.is_dir() {
        log::error!("Image folder {:?} doesn't exist", folder);
        return Ok(Vec::new());
    }

    let mut names: Vec<String> = Vec::new();
    for entry in std::fs::read_dir(&folder)? {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                log::debug!("Skipping unreadable entry in {:?}: {}", folder, e);
                continue;
            }
        };
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let Some(name) = entry.file_name().to_str().map(str::to_string) else {
            log::debug!("Skipping non UTF-8 filename {:?}", path);
            continue;
        };
        if name.starts_with('.') || !is_image_filename(&name) {
            log::trace!("Ignoring {:?}", path);
            continue;
        }
        names.push(name);
    }

    // Sort by filename for consistent ordering
    names.sort();

    let base_url = base_url.trim_end_matches('/');
    let urls: Vec<String> = names
        .iter()
        .map(|name| format!("{}/static/images/{}/{}", base_url, annotator, name))
        .collect();

    log::info!(
        "Found {} image(s) for annotator {:?} in {:?}",
        urls.len(),
        annotator,
        folder
    );

    Ok(urls)
}

/// Return the 1-based `page` of `urls`, `page_size` entries per page.
///
/// Pages past the end are empty.
pub fn page(urls: &[String], page: usize, page_size: usize) -> Result<Vec<String>, CatalogError> {
    if page == 0 {
        return Err(CatalogError::InvalidPage { page });
    }
    let start = (page - 1).saturating_mul(page_size).min(urls.len());
    let end = start.saturating_add(page_size).min(urls.len());
    Ok(urls[start..end].to_vec())
}
