// src/extractors/mod.rs
pub mod areas;
pub mod markup;
pub mod schema;
pub mod section;
pub mod transform;

use scraper::Html;

use crate::utils::error::ExtractError;
use areas::locate_areas;
use section::{SectionExtractor, SectionRecord};

/// Locates every area of a location page and extracts its section.
/// Fails only when the page has no areas at all.
pub fn extract_area_sections(
    document: &Html,
    extractor: &SectionExtractor,
) -> Result<Vec<SectionRecord>, ExtractError> {
    let areas = locate_areas(document)?;
    tracing::info!("Found {} areas ({:?})", areas.names.len(), areas.source);
    Ok(extractor.extract_sections(document, &areas.names))
}
