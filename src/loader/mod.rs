// src/loader/mod.rs
pub mod encoding;

use std::fs;
use std::path::{Path, PathBuf};

use encoding_rs::Encoding;
use once_cell::sync::Lazy;
use scraper::{Html, Selector};

use crate::utils::error::LoadError;
pub use encoding::{decode_bytes, EncodingDetector, SniffingDetector};

const UNKNOWN_LOCATION: &str = "Unknown Location";

static TITLE_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("title").expect("Failed to compile TITLE_SELECTOR"));

/// A parsed source page. The tree is never mutated after loading.
pub struct SourceDocument {
    pub path: PathBuf,
    pub encoding: &'static Encoding,
    pub html: Html,
}

impl SourceDocument {
    /// The location/category string used for output naming and the page heading.
    pub fn location(&self) -> String {
        document_location(&self.html)
    }

    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.path.display().to_string())
    }
}

/// Reads, decodes and parses one source page.
pub fn load_document(
    path: &Path,
    detector: Option<&dyn EncodingDetector>,
) -> Result<SourceDocument, LoadError> {
    if !path.is_file() {
        return Err(LoadError::MissingInput(path.to_path_buf()));
    }

    let raw = fs::read(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let decoded = decode_bytes(&raw, detector);
    tracing::info!(
        "Detected encoding for {}: {}",
        path.file_name().map(|n| n.to_string_lossy()).unwrap_or_default(),
        decoded.encoding.name()
    );
    if decoded.lossy {
        tracing::warn!("{} contained bytes invalid for {}; replaced", path.display(), decoded.encoding.name());
    }

    Ok(SourceDocument {
        path: path.to_path_buf(),
        encoding: decoded.encoding,
        html: Html::parse_document(&decoded.text),
    })
}

/// Text after the last `-` of the `<title>`, trimmed and lower-cased.
pub fn document_location(html: &Html) -> String {
    let title = html
        .select(&TITLE_SELECTOR)
        .next()
        .map(|title| title.text().collect::<String>())
        .unwrap_or_else(|| UNKNOWN_LOCATION.to_string());

    title
        .rsplit('-')
        .next()
        .unwrap_or_default()
        .trim()
        .to_lowercase()
}
