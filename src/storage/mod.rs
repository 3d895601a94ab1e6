// src/storage/mod.rs
use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::extractors::section::SectionRecord;
use crate::utils::error::StorageError;

const PAGE_SUFFIX: &str = "_pokemon.html";

pub struct StorageManager {
    base_dir: PathBuf,
}

/// Per-area summary written to the metadata sidecar.
#[derive(Debug, Serialize)]
pub struct SectionSummary {
    pub area: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rows: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl From<&SectionRecord> for SectionSummary {
    fn from(record: &SectionRecord) -> Self {
        match &record.rows {
            Ok(rows) => Self { area: record.area_name.clone(), rows: Some(rows.len()), error: None },
            Err(e) => Self { area: record.area_name.clone(), rows: None, error: Some(e.to_string()) },
        }
    }
}

#[derive(Debug, Serialize)]
pub struct PageMetadata {
    pub identifier: String,
    pub source_file: String,
    pub schema: String,
    pub encoding: String,
    pub sections: Vec<SectionSummary>,
}

impl StorageManager {
    /// Creates a new StorageManager with the specified base directory
    pub fn new<P: AsRef<Path>>(base_dir: P) -> Result<Self, StorageError> {
        let base_path = base_dir.as_ref().to_path_buf();

        // Create the base directory if it doesn't exist
        if !base_path.exists() {
            fs::create_dir_all(&base_path).map_err(StorageError::IoError)?;
            tracing::info!("Created output directory: {}", base_path.display());
        }

        Ok(Self { base_dir: base_path })
    }

    /// Output file name for a location, `<location>_pokemon.html`. Path
    /// separators are replaced so the file always lands in the base directory.
    pub fn page_file_name(location: &str) -> String {
        let safe: String = location
            .chars()
            .map(|c| if c == '/' || c == '\\' { '_' } else { c })
            .collect();
        format!("{}{}", safe, PAGE_SUFFIX)
    }

    /// Writes a generated page. An existing file of the same name is replaced.
    pub fn save_page(&self, file_name: &str, html: &str) -> Result<PathBuf, StorageError> {
        let file_path = self.base_dir.join(file_name);
        if file_path.exists() {
            tracing::debug!("Overwriting {}", file_path.display());
        }

        fs::write(&file_path, html).map_err(StorageError::IoError)?;

        tracing::info!("Done! Output saved to '{}'.", file_path.display());
        Ok(file_path)
    }

    /// Saves a JSON sidecar `<stem>_meta.json` next to a generated page.
    pub fn save_page_metadata(&self, file_name: &str, metadata: &PageMetadata) -> Result<PathBuf, StorageError> {
        let stem = Path::new(file_name)
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| file_name.to_string());
        let file_path = self.base_dir.join(format!("{}_meta.json", stem));

        let document = serde_json::json!({
            "page": metadata,
            "extraction_timestamp": chrono::Utc::now().to_rfc3339(),
        });

        let metadata_str = serde_json::to_string_pretty(&document)
            .map_err(|e| StorageError::SerializationError(e.to_string()))?;

        fs::write(&file_path, metadata_str).map_err(StorageError::IoError)?;

        tracing::info!("Saved metadata to {}", file_path.display());
        Ok(file_path)
    }
}
