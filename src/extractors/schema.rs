// src/extractors/schema.rs
// Declarative column tables. Each schema lists, in target order, which source
// cell feeds which output column and how it is transformed. Dropped source
// columns are listed too so the mapping stays readable against the source page.

/// How image sources are made absolute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UrlStyle {
    /// Relative sources are treated as site-root paths (`x.png` -> `/x.png`).
    RootRelative,
    /// Leading dots are stripped and bare relative sources are joined onto the
    /// configured base path.
    BasePath,
}

/// Per-column transform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellTransform {
    /// Stripped, whitespace-collapsed visible text.
    Text,
    /// Inner markup re-serialized with absolute image sources.
    Markup {
        max_image_width: Option<u32>,
        strip_links: bool,
    },
    /// Visible text pieces joined with `<br>`.
    ListJoin,
    /// Consumed but not emitted.
    Drop,
}

impl CellTransform {
    pub const fn images() -> Self {
        CellTransform::Markup { max_image_width: None, strip_links: false }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnSpec {
    pub source: usize,
    pub header: &'static str,
    pub transform: CellTransform,
    /// Fixed `<th>` width in pixels.
    pub header_width: Option<u32>,
}

impl ColumnSpec {
    pub const fn new(source: usize, header: &'static str, transform: CellTransform) -> Self {
        Self { source, header, transform, header_width: None }
    }

    pub const fn text(source: usize, header: &'static str) -> Self {
        Self::new(source, header, CellTransform::Text)
    }

    pub const fn dropped(source: usize, header: &'static str) -> Self {
        Self::new(source, header, CellTransform::Drop)
    }

    pub const fn with_header_width(self, width: u32) -> Self {
        Self { header_width: Some(width), ..self }
    }

    pub fn is_emitted(&self) -> bool {
        self.transform != CellTransform::Drop
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnSchema {
    pub name: &'static str,
    pub columns: Vec<ColumnSpec>,
    /// Header of the synthetic editable column appended to every row.
    pub annotation_header: &'static str,
    /// Rows with fewer `<td>` cells than this are dropped.
    pub min_source_cells: usize,
    pub url_style: UrlStyle,
    /// Render the table with `align="center"`.
    pub centered: bool,
}

impl ColumnSchema {
    /// Per-area creature table: 10 source columns, 11 output columns.
    pub fn area_dex() -> Self {
        Self {
            name: "area-dex",
            columns: vec![
                ColumnSpec::text(0, "No."),
                ColumnSpec::new(1, "Pic", CellTransform::images()),
                ColumnSpec::text(2, "Name"),
                ColumnSpec::new(3, "Type", CellTransform::images()),
                ColumnSpec::text(4, "HP"),
                ColumnSpec::text(5, "Attack"),
                ColumnSpec::text(6, "Defence"),
                ColumnSpec::text(7, "Speed"),
                ColumnSpec::text(8, "Movement Range"),
                ColumnSpec::text(9, "Area Level"),
            ],
            annotation_header: "Trainers",
            min_source_cells: 10,
            url_style: UrlStyle::RootRelative,
            centered: false,
        }
    }

    /// Site-wide swarm table: 12 source columns, "Moves" dropped, 12 output columns.
    pub fn swarm() -> Self {
        Self {
            name: "swarm",
            columns: vec![
                ColumnSpec::text(0, "No."),
                ColumnSpec::new(
                    1,
                    "Pic",
                    CellTransform::Markup { max_image_width: Some(50), strip_links: false },
                )
                .with_header_width(60),
                ColumnSpec::text(2, "Name"),
                ColumnSpec::new(3, "Type", CellTransform::images()),
                ColumnSpec::text(4, "Hp"),
                ColumnSpec::text(5, "Attack"),
                ColumnSpec::text(6, "Defence"),
                ColumnSpec::text(7, "Speed"),
                ColumnSpec::text(8, "Movement Range"),
                ColumnSpec::dropped(9, "Moves"),
                ColumnSpec::new(10, "Abilities", CellTransform::ListJoin),
                ColumnSpec::new(
                    11,
                    "Nation",
                    CellTransform::Markup { max_image_width: None, strip_links: true },
                ),
            ],
            annotation_header: "Trainers",
            min_source_cells: 12,
            url_style: UrlStyle::BasePath,
            centered: true,
        }
    }

    /// Emitted columns in output order, without the annotation column.
    pub fn emitted(&self) -> impl Iterator<Item = &ColumnSpec> {
        self.columns.iter().filter(|column| column.is_emitted())
    }

    /// Output headers, annotation column last.
    pub fn target_headers(&self) -> Vec<&'static str> {
        self.emitted()
            .map(|column| column.header)
            .chain(std::iter::once(self.annotation_header))
            .collect()
    }

    /// Number of cells in every emitted row.
    pub fn target_len(&self) -> usize {
        self.emitted().count() + 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_area_dex_shape() {
        let schema = ColumnSchema::area_dex();
        assert_eq!(schema.target_len(), 11);
        assert_eq!(schema.min_source_cells, 10);
        let headers = schema.target_headers();
        assert_eq!(headers.first(), Some(&"No."));
        assert_eq!(headers[9], "Area Level");
        assert_eq!(headers.last(), Some(&"Trainers"));
    }

    #[test]
    fn test_swarm_drops_moves() {
        let schema = ColumnSchema::swarm();
        assert_eq!(schema.target_len(), 12);
        let headers = schema.target_headers();
        assert!(!headers.contains(&"Moves"));
        assert_eq!(&headers[8..], &["Movement Range", "Abilities", "Nation", "Trainers"]);
    }

    #[test]
    fn test_minimum_covers_every_source_index() {
        for schema in [ColumnSchema::area_dex(), ColumnSchema::swarm()] {
            let highest = schema.columns.iter().map(|c| c.source).max().unwrap();
            assert!(schema.min_source_cells > highest, "{} reads past its minimum", schema.name);
        }
    }
}
