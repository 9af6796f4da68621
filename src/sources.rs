//! Where the wall gets its images and background colour from.

use std::fs;
use std::path::Path;

use tracing::{debug, info, warn};
use url::Url;
use walkdir::WalkDir;

use crate::color::DEFAULT_BACKGROUND;
use crate::error::{Error, Result};
use crate::image_ref::ImageRef;

/// Largest single file embedded as a data URI.
pub const MAX_INLINE_FILE_BYTES: u64 = 5 * 1024 * 1024;
/// Combined size cap for embedded images.
pub const MAX_INLINE_TOTAL_BYTES: u64 = 20 * 1024 * 1024;

const IMAGE_EXTENSIONS: [&str; 5] = ["jpg", "jpeg", "png", "gif", "webp"];

/// Supplies the image list and background colour the wall is built from.
pub trait ImageSource {
    /// Image references in source order; may be empty.
    fn images(&self) -> Vec<String>;

    /// Background colour as a hex string.
    fn background_color(&self) -> String;
}

/// A fixed list, e.g. from configuration or command-line flags.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaticSource {
    images: Vec<String>,
    background: String,
}

impl StaticSource {
    pub fn new(images: Vec<String>, background: impl Into<String>) -> Self {
        Self {
            images,
            background: background.into(),
        }
    }

    /// Appends `more` after the current images.
    pub fn extend(&mut self, more: impl IntoIterator<Item = String>) {
        self.images.extend(more);
    }

    /// Adds pasted URLs, separated by commas or newlines.
    ///
    /// Only `http://` and `https://` entries are kept, and entries already in
    /// the list are skipped. Returns how many were added.
    pub fn add_urls(&mut self, raw: &str) -> usize {
        let mut added = 0;
        for entry in raw.split([',', '\n']).map(str::trim).filter(|e| !e.is_empty()) {
            if !is_http_url(entry) {
                warn!(entry, "ignoring non-http image url");
                continue;
            }
            if self.images.iter().any(|known| known == entry) {
                debug!(entry, "image url already listed");
                continue;
            }
            self.images.push(entry.to_string());
            added += 1;
        }
        if added > 0 {
            info!(added, total = self.images.len(), "added image urls");
        }
        added
    }
}

fn is_http_url(entry: &str) -> bool {
    ["http://", "https://"].iter().any(|scheme| {
        entry
            .get(..scheme.len())
            .is_some_and(|head| head.eq_ignore_ascii_case(scheme))
    })
}

impl Default for StaticSource {
    fn default() -> Self {
        Self::new(Vec::new(), DEFAULT_BACKGROUND)
    }
}

impl ImageSource for StaticSource {
    fn images(&self) -> Vec<String> {
        self.images.clone()
    }

    fn background_color(&self) -> String {
        self.background.clone()
    }
}

/// How directory images are referenced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Embedding {
    /// `file://` URLs pointing at the files on disk.
    #[default]
    FileUrl,
    /// Base64 `data:` URIs, subject to the inline size caps.
    Inline,
}

/// Images found under a directory, scanned once up front.
#[derive(Debug, Clone)]
pub struct DirectorySource {
    images: Vec<String>,
    background: String,
}

impl DirectorySource {
    pub fn scan(
        root: impl AsRef<Path>,
        embedding: Embedding,
        background: impl Into<String>,
    ) -> Result<Self> {
        let root = root.as_ref();
        if !root.is_dir() {
            return Err(Error::BadDir(root.to_path_buf()));
        }
        let root = root.canonicalize()?;

        let mut images = Vec::new();
        let mut inline_total = 0_u64;
        let mut skipped = 0_usize;
        for entry in WalkDir::new(&root)
            .follow_links(true)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|e| e.ok())
        {
            let path = entry.path();
            if !entry.file_type().is_file() || !has_image_extension(path) {
                continue;
            }
            match reference_for(path, embedding, &mut inline_total) {
                Ok(Some(reference)) => images.push(reference),
                Ok(None) => skipped += 1,
                Err(err) => {
                    warn!(path = %path.display(), %err, "skipping unreadable image");
                    skipped += 1;
                }
            }
        }

        info!(
            root = %root.display(),
            ?embedding,
            found = images.len(),
            skipped,
            "scanned image directory"
        );
        Ok(Self {
            images,
            background: background.into(),
        })
    }

}

impl ImageSource for DirectorySource {
    fn images(&self) -> Vec<String> {
        self.images.clone()
    }

    fn background_color(&self) -> String {
        self.background.clone()
    }
}

fn has_image_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| {
            IMAGE_EXTENSIONS
                .iter()
                .any(|known| ext.eq_ignore_ascii_case(known))
        })
}

/// Sniffs the file and builds its reference. `Ok(None)` means skipped on purpose.
fn reference_for(path: &Path, embedding: Embedding, inline_total: &mut u64) -> Result<Option<String>> {
    let bytes = fs::read(path)?;
    let format = match image::guess_format(&bytes) {
        Ok(format) => format,
        Err(err) => {
            warn!(path = %path.display(), %err, "not a recognisable image");
            return Ok(None);
        }
    };

    match embedding {
        Embedding::FileUrl => {
            let url = Url::from_file_path(path)
                .map_err(|()| Error::MalformedImageRef(path.display().to_string()))?;
            debug!(path = %path.display(), ?format, "image by url");
            Ok(Some(url.to_string()))
        }
        Embedding::Inline => {
            let size = bytes.len() as u64;
            if size > MAX_INLINE_FILE_BYTES {
                warn!(path = %path.display(), size, "image too large to inline");
                return Ok(None);
            }
            if *inline_total + size > MAX_INLINE_TOTAL_BYTES {
                warn!(path = %path.display(), total = *inline_total, "inline size cap reached");
                return Ok(None);
            }
            *inline_total += size;
            let image = ImageRef::inline(format.to_mime_type(), &bytes);
            Ok(Some(image.as_str().to_string()))
        }
    }
}
