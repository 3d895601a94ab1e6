// src/batch.rs
// Batch runners. Every input is processed independently: a failure is logged,
// recorded in the report, and the next input is processed.

use std::fs;
use std::path::{Path, PathBuf};

use crate::config::ExtractConfig;
use crate::extractors::schema::ColumnSchema;
use crate::extractors::section::{find_swarm_table, SectionExtractor};
use crate::extractors::extract_area_sections;
use crate::loader::{load_document, EncodingDetector};
use crate::render::{render_page, render_section, render_table, PageShell};
use crate::storage::{PageMetadata, SectionSummary, StorageManager};
use crate::utils::error::AppError;

/// Source page extensions picked up from directories.
pub const SOURCE_EXTENSIONS: &[&str] = &["html", "shtml"];

/// File name of the swarm page when none is given.
pub const SWARM_OUTPUT_FILE: &str = "swarm_pokemon.html";

#[derive(Debug, Default)]
pub struct BatchReport {
    pub written: Vec<PathBuf>,
    pub skipped: Vec<(PathBuf, String)>,
}

impl BatchReport {
    fn record(&mut self, input: &Path, outcome: Result<PathBuf, AppError>) {
        match outcome {
            Ok(path) => self.written.push(path),
            Err(e) => {
                tracing::warn!("Skipping {}: {}", input.display(), e);
                self.skipped.push((input.to_path_buf(), e.to_string()));
            }
        }
    }
}

/// Expands directories into their matching files, sorted by name. Explicit
/// files and paths that do not exist are passed through untouched so the
/// processing step can report them.
pub fn collect_inputs(paths: &[PathBuf], extensions: &[&str]) -> Vec<PathBuf> {
    let mut inputs = Vec::new();
    for path in paths {
        if !path.is_dir() {
            inputs.push(path.clone());
            continue;
        }

        let entries = match fs::read_dir(path) {
            Ok(entries) => entries,
            Err(e) => {
                tracing::warn!("Could not read directory {}: {}", path.display(), e);
                continue;
            }
        };
        let mut found: Vec<PathBuf> = entries
            .filter_map(Result::ok)
            .map(|entry| entry.path())
            .filter(|p| p.is_file() && has_extension(p, extensions))
            .collect();
        found.sort();
        tracing::debug!("{} matching files in {}", found.len(), path.display());
        inputs.extend(found);
    }
    inputs
}

fn has_extension(path: &Path, extensions: &[&str]) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map_or(false, |ext| extensions.iter().any(|want| ext.eq_ignore_ascii_case(want)))
}

/// Turns location pages into one area dex page each.
pub struct AreaBatch<'a> {
    extractor: SectionExtractor,
    storage: &'a StorageManager,
    config: &'a ExtractConfig,
    detector: Option<&'a dyn EncodingDetector>,
}

impl<'a> AreaBatch<'a> {
    pub fn new(
        storage: &'a StorageManager,
        config: &'a ExtractConfig,
        detector: Option<&'a dyn EncodingDetector>,
    ) -> Self {
        Self {
            extractor: SectionExtractor::new(ColumnSchema::area_dex(), config),
            storage,
            config,
            detector,
        }
    }

    pub fn run(&self, inputs: &[PathBuf]) -> BatchReport {
        let mut report = BatchReport::default();
        for input in inputs {
            report.record(input, self.process_file(input));
        }
        tracing::info!(
            "Processing finished. Written: {}, Skipped: {}",
            report.written.len(),
            report.skipped.len()
        );
        report
    }

    /// Extracts one location page and writes `<location>_pokemon.html`.
    pub fn process_file(&self, input: &Path) -> Result<PathBuf, AppError> {
        let document = load_document(input, self.detector)?;
        let location = document.location();
        tracing::info!("Detected location: {} in file {}", location, document.file_name());

        let sections = extract_area_sections(&document.html, &self.extractor)?;
        let fragments: Vec<String> = sections
            .iter()
            .map(|record| render_section(self.extractor.schema(), record))
            .collect();

        let page = render_page(&PageShell::for_location(&location), &fragments);
        let file_name = StorageManager::page_file_name(&location);
        let path = self.storage.save_page(&file_name, &page)?;

        if self.config.write_metadata {
            let metadata = PageMetadata {
                identifier: location,
                source_file: document.file_name(),
                schema: self.extractor.schema().name.to_string(),
                encoding: document.encoding.name().to_string(),
                sections: sections.iter().map(SectionSummary::from).collect(),
            };
            if let Err(e) = self.storage.save_page_metadata(&file_name, &metadata) {
                tracing::error!("Failed to save page metadata: {}", e);
            }
        }

        Ok(path)
    }
}

/// Turns the site-wide swarm page into `swarm_pokemon.html` (or `file_name`).
pub fn run_swarm(
    input: &Path,
    storage: &StorageManager,
    file_name: &str,
    config: &ExtractConfig,
    detector: Option<&dyn EncodingDetector>,
) -> Result<PathBuf, AppError> {
    let document = load_document(input, detector)?;
    let extractor = SectionExtractor::new(ColumnSchema::swarm(), config);

    let table = find_swarm_table(&document.html)?;
    let rows = extractor.extract_rows(table);
    tracing::info!("Swarm table: {} rows", rows.len());

    let shell = PageShell::swarm();
    let page = render_page(&shell, &[render_table(extractor.schema(), &rows)]);
    let path = storage.save_page(file_name, &page)?;

    if config.write_metadata {
        let metadata = PageMetadata {
            identifier: shell.identifier,
            source_file: document.file_name(),
            schema: extractor.schema().name.to_string(),
            encoding: document.encoding.name().to_string(),
            sections: vec![SectionSummary { area: "swarm".to_string(), rows: Some(rows.len()), error: None }],
        };
        if let Err(e) = storage.save_page_metadata(file_name, &metadata) {
            tracing::error!("Failed to save page metadata: {}", e);
        }
    }

    Ok(path)
}
