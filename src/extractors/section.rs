// src/extractors/section.rs

// --- Imports ---
use crate::config::ExtractConfig;
use crate::extractors::schema::ColumnSchema;
use crate::extractors::transform::{DataRow, RowTransformer};
use crate::utils::error::ExtractError;
use crate::utils::text::normalized_text;
use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};

// --- CSS Selectors (Lazy Static) ---
static PARAGRAPH_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("p").expect("Failed to compile PARAGRAPH_SELECTOR"));

static NAMED_ANCHOR_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("a[name]").expect("Failed to compile NAMED_ANCHOR_SELECTOR"));

// Per-area creature tables
static DEX_TABLE_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("table.dextable").expect("Failed to compile DEX_TABLE_SELECTOR"));

// The single site-wide swarm table
static SWARM_TABLE_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("table.tab").expect("Failed to compile SWARM_TABLE_SELECTOR"));

pub const SWARM_TABLE_CLASS: &str = "tab";

// --- Data Structures ---
/// Outcome of extracting one area. Section-level failures are carried as
/// values and rendered inline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionRecord {
    pub area_name: String,
    pub rows: Result<Vec<DataRow>, ExtractError>,
}

/// How the anchoring paragraph was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParagraphMatch {
    /// A nested `<a name>` equals the area name.
    Exact,
    /// The paragraph text contains, or is contained in, the area name.
    Fuzzy,
}

// --- Main Extractor Structure ---
pub struct SectionExtractor {
    transformer: RowTransformer,
}

impl SectionExtractor {
    pub fn new(schema: ColumnSchema, config: &ExtractConfig) -> Self {
        Self { transformer: RowTransformer::new(schema, config) }
    }

    pub fn schema(&self) -> &ColumnSchema {
        self.transformer.schema()
    }

    /// Extracts every named area in order.
    pub fn extract_sections(&self, document: &Html, area_names: &[String]) -> Vec<SectionRecord> {
        area_names
            .iter()
            .map(|area| self.extract_section(document, area))
            .collect()
    }

    /// Finds the area's paragraph, the next data table after it, and its rows.
    pub fn extract_section(&self, document: &Html, area_name: &str) -> SectionRecord {
        let rows = self.section_rows(document, area_name);
        match &rows {
            Ok(rows) => tracing::info!("Area '{}': {} rows", area_name, rows.len()),
            Err(e) => tracing::warn!("{}", e),
        }
        SectionRecord { area_name: area_name.to_string(), rows }
    }

    fn section_rows(&self, document: &Html, area_name: &str) -> Result<Vec<DataRow>, ExtractError> {
        let (paragraph, how) = find_area_paragraph(document, area_name)
            .ok_or_else(|| ExtractError::AreaNotFound(area_name.to_string()))?;
        tracing::debug!("Matched paragraph for '{}' ({:?})", area_name, how);

        let table = find_next(document, paragraph, &DEX_TABLE_SELECTOR)
            .ok_or_else(|| ExtractError::TableNotFound(area_name.to_string()))?;

        Ok(self.extract_rows(table))
    }

    /// Data rows of `table`: header row skipped, short rows dropped.
    pub fn extract_rows(&self, table: ElementRef) -> Vec<DataRow> {
        table_rows(table)
            .into_iter()
            .skip(1)
            .filter_map(|row| self.transformer.transform(&data_cells(row)))
            .collect()
    }
}

/// First paragraph whose first named anchor equals `area_name`; failing that,
/// the first paragraph whose text contains `area_name` or is contained in it.
/// Both searches run in document order and the first hit wins.
pub fn find_area_paragraph<'a>(
    document: &'a Html,
    area_name: &str,
) -> Option<(ElementRef<'a>, ParagraphMatch)> {
    let exact = document.select(&PARAGRAPH_SELECTOR).find(|paragraph| {
        paragraph
            .select(&NAMED_ANCHOR_SELECTOR)
            .next()
            .and_then(|anchor| anchor.value().attr("name"))
            .map_or(false, |name| name.to_lowercase() == area_name)
    });
    if let Some(paragraph) = exact {
        return Some((paragraph, ParagraphMatch::Exact));
    }

    // An empty paragraph text is contained in every name and therefore matches.
    document
        .select(&PARAGRAPH_SELECTOR)
        .find(|paragraph| {
            let text = normalized_text(*paragraph);
            text.contains(area_name) || area_name.contains(text.as_str())
        })
        .map(|paragraph| (paragraph, ParagraphMatch::Fuzzy))
}

/// First element after `from` in document order (its own descendants
/// included) matching `selector`.
pub fn find_next<'a>(document: &'a Html, from: ElementRef<'a>, selector: &Selector) -> Option<ElementRef<'a>> {
    document
        .tree
        .root()
        .descendants()
        .skip_while(|node| node.id() != from.id())
        .skip(1)
        .filter_map(ElementRef::wrap)
        .find(|element| selector.matches(element))
}

/// The table's own rows: direct `<tr>` children and rows of its own row
/// groups. Rows of nested tables are never included.
pub fn table_rows(table: ElementRef) -> Vec<ElementRef> {
    let mut rows = Vec::new();
    for child in table.children().filter_map(ElementRef::wrap) {
        match child.value().name() {
            "tr" => rows.push(child),
            "thead" | "tbody" | "tfoot" => rows.extend(
                child
                    .children()
                    .filter_map(ElementRef::wrap)
                    .filter(|row| row.value().name() == "tr"),
            ),
            _ => {}
        }
    }
    rows
}

/// Direct `<td>` children of a row; `<th>` and anything else is ignored.
pub fn data_cells(row: ElementRef) -> Vec<ElementRef> {
    row.children()
        .filter_map(ElementRef::wrap)
        .filter(|cell| cell.value().name() == "td")
        .collect()
}

/// The first `table.tab` in the document.
pub fn find_swarm_table(document: &Html) -> Result<ElementRef<'_>, ExtractError> {
    document
        .select(&SWARM_TABLE_SELECTOR)
        .next()
        .ok_or_else(|| ExtractError::TableMissing(SWARM_TABLE_CLASS.to_string()))
}
