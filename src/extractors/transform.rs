// src/extractors/transform.rs
use scraper::ElementRef;

use crate::config::ExtractConfig;
use crate::extractors::markup::{FragmentWriter, ImageResolver};
use crate::extractors::schema::{CellTransform, ColumnSchema};
use crate::utils::text::{collapse_whitespace, escape_text, stripped_text, text_pieces};

// Separator used for multi-valued cells such as ability lists.
const LIST_SEPARATOR: &str = "<br>";

/// One output cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Cell {
    /// Plain text; escaped when rendered.
    Text(String),
    /// Markup fragment; emitted verbatim.
    Markup(String),
    /// The synthetic editable column, always empty at generation time.
    Annotation,
}

impl Cell {
    #[cfg(test)]
    pub fn as_str(&self) -> &str {
        match self {
            Cell::Text(s) | Cell::Markup(s) => s,
            Cell::Annotation => "",
        }
    }
}

/// A fixed-length row in schema target order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataRow {
    pub cells: Vec<Cell>,
}

impl DataRow {
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    #[cfg(test)]
    pub fn values(&self) -> Vec<&str> {
        self.cells.iter().map(Cell::as_str).collect()
    }
}

/// Maps raw `<td>` cells onto a [`ColumnSchema`].
#[derive(Debug, Clone)]
pub struct RowTransformer {
    schema: ColumnSchema,
    images: ImageResolver,
}

impl RowTransformer {
    pub fn new(schema: ColumnSchema, config: &ExtractConfig) -> Self {
        let images = ImageResolver::new(config, schema.url_style);
        Self { schema, images }
    }

    pub fn schema(&self) -> &ColumnSchema {
        &self.schema
    }

    /// Returns `None` when the row has fewer cells than the schema needs.
    pub fn transform(&self, cells: &[ElementRef]) -> Option<DataRow> {
        if cells.len() < self.schema.min_source_cells {
            tracing::trace!(
                "Dropping row with {} cells (need {})",
                cells.len(),
                self.schema.min_source_cells
            );
            return None;
        }

        let mut row = Vec::with_capacity(self.schema.target_len());
        for column in self.schema.emitted() {
            let cell = cells[column.source];
            row.push(self.transform_cell(cell, column.transform));
        }
        row.push(Cell::Annotation);

        let row = DataRow { cells: row };
        debug_assert_eq!(row.len(), self.schema.target_len());
        Some(row)
    }

    fn transform_cell(&self, cell: ElementRef, transform: CellTransform) -> Cell {
        match transform {
            CellTransform::Text => Cell::Text(collapse_whitespace(&stripped_text(cell))),
            CellTransform::Markup { max_image_width, strip_links } => {
                let writer = FragmentWriter::new(&self.images)
                    .max_image_width(max_image_width)
                    .strip_links(strip_links);
                Cell::Markup(writer.inner_markup(cell))
            }
            CellTransform::ListJoin => {
                let pieces: Vec<String> = text_pieces(cell).map(escape_text).collect();
                Cell::Markup(pieces.join(LIST_SEPARATOR))
            }
            // filtered out by `emitted()`
            CellTransform::Drop => Cell::Text(String::new()),
        }
    }
}
