// src/render/mod.rs
// HTML output: tables, inline warnings, the page shell and the persistence
// script. The script and its storage key format are a fixed contract with
// data already saved in users' browsers; only the identifier varies.

use crate::extractors::schema::ColumnSchema;
use crate::extractors::section::SectionRecord;
use crate::extractors::transform::{Cell, DataRow};
use crate::utils::error::ExtractError;
use crate::utils::text::{escape_text, title_case};

/// Class binding annotation cells to the persistence script.
pub const ANNOTATION_CLASS: &str = "trainers-col";

const IDENTIFIER_PLACEHOLDER: &str = "{identifier}";

const PERSISTENCE_SCRIPT: &str = r#"<script>
document.addEventListener('DOMContentLoaded', function() {
  const trainerCells = document.querySelectorAll('td.trainers-col');
  trainerCells.forEach((cell, i) => {
    const key = 'trainers_cell_{identifier}_' + i;
    const saved = localStorage.getItem(key);
    if (saved) cell.textContent = saved;
    cell.addEventListener('blur', () => {
      localStorage.setItem(key, cell.textContent);
    });
  });
});
</script>"#;

/// Title and heading of a generated page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageShell {
    pub title: String,
    pub heading: String,
    /// Namespaces the browser storage keys.
    pub identifier: String,
}

impl PageShell {
    /// Shell for a location page, e.g. "aurora" -> "Aurora Areas" / "Aurora".
    pub fn for_location(location: &str) -> Self {
        let heading = title_case(location);
        Self {
            title: format!("{} Areas", heading),
            heading,
            identifier: location.to_string(),
        }
    }

    pub fn swarm() -> Self {
        Self {
            title: "Swarm Pokemon".to_string(),
            heading: "Swarm Pokemon".to_string(),
            identifier: "swarm".to_string(),
        }
    }
}

/// The client-side script restoring and saving annotation cells under
/// `trainers_cell_<identifier>_<row-index>`.
pub fn persistence_script(identifier: &str) -> String {
    PERSISTENCE_SCRIPT.replace(IDENTIFIER_PLACEHOLDER, identifier)
}

pub fn render_table(schema: &ColumnSchema, rows: &[DataRow]) -> String {
    let mut html = Vec::new();
    if schema.centered {
        html.push(r#"<table border="1" cellpadding="5" cellspacing="0" style="border-collapse:collapse;" align="center">"#.to_string());
    } else {
        html.push(r#"<table border="1" cellpadding="5" cellspacing="0" style="border-collapse:collapse;">"#.to_string());
    }

    html.push("<thead><tr>".to_string());
    for column in schema.emitted() {
        match column.header_width {
            Some(width) => html.push(format!("<th style='width:{}px;'>{}</th>", width, column.header)),
            None => html.push(format!("<th>{}</th>", column.header)),
        }
    }
    html.push(format!("<th>{}</th>", schema.annotation_header));
    html.push("</tr></thead>".to_string());

    html.push("<tbody>".to_string());
    for row in rows {
        html.push("<tr>".to_string());
        for cell in &row.cells {
            html.push(render_cell(cell));
        }
        html.push("</tr>".to_string());
    }
    html.push("</tbody>".to_string());
    html.push("</table>".to_string());
    html.join("\n")
}

fn render_cell(cell: &Cell) -> String {
    match cell {
        Cell::Text(text) => format!("<td>{}</td>", escape_text(text)),
        Cell::Markup(markup) => format!("<td>{}</td>", markup),
        Cell::Annotation => format!(r#"<td contenteditable="true" class="{}"></td>"#, ANNOTATION_CLASS),
    }
}

/// Visible inline warning used in place of a table.
pub fn render_warning(error: &ExtractError) -> String {
    format!("<p style='color:red;'>{}</p>", escape_text(&error.to_string()))
}

/// Heading and table for one area, or a warning paragraph.
pub fn render_section(schema: &ColumnSchema, record: &SectionRecord) -> String {
    match &record.rows {
        Ok(rows) => format!(
            "<h3 style='margin-bottom: 5px;'>{}</h3>\n{}\n<div style='margin-bottom: 20px;'></div>",
            escape_text(&title_case(&record.area_name)),
            render_table(schema, rows)
        ),
        Err(e) => render_warning(e),
    }
}

/// A complete standalone document.
pub fn render_page(shell: &PageShell, fragments: &[String]) -> String {
    format!(
        r#"<!DOCTYPE html>
<html>
<head>
  <meta charset="UTF-8">
  <title>{title}</title>
</head>
<body>
  <h1>{heading}</h1>
  {body}
  {script}
</body>
</html>
"#,
        title = escape_text(&shell.title),
        heading = escape_text(&shell.heading),
        body = fragments.concat(),
        script = persistence_script(&shell.identifier),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(values: &[&str]) -> DataRow {
        let mut cells: Vec<Cell> = values.iter().map(|v| Cell::Text(v.to_string())).collect();
        cells.push(Cell::Annotation);
        DataRow { cells }
    }

    #[test]
    fn test_script_key_scheme() {
        let script = persistence_script("aurora");
        assert!(script.contains("const key = 'trainers_cell_aurora_' + i;"));
        assert!(script.contains("document.querySelectorAll('td.trainers-col')"));
        assert!(script.contains("cell.addEventListener('blur'"));
        assert!(!script.contains(IDENTIFIER_PLACEHOLDER));
    }

    #[test]
    fn test_table_has_one_header_per_target_column() {
        let schema = ColumnSchema::area_dex();
        let html = render_table(&schema, &[row(&["1"; 10])]);
        assert_eq!(html.matches("<th>").count(), 11);
        assert_eq!(html.matches("<td").count(), 11);
        assert!(html.contains(r#"<td contenteditable="true" class="trainers-col"></td>"#));
        assert!(!html.contains("align=\"center\""));
    }

    #[test]
    fn test_swarm_table_styling() {
        let schema = ColumnSchema::swarm();
        let html = render_table(&schema, &[]);
        assert!(html.contains("align=\"center\""));
        assert!(html.contains("<th style='width:60px;'>Pic</th>"));
        assert!(!html.contains("Moves"));
    }

    #[test]
    fn test_text_is_escaped_markup_is_not() {
        assert_eq!(render_cell(&Cell::Text("a<b".into())), "<td>a&lt;b</td>");
        assert_eq!(render_cell(&Cell::Markup("<img src=\"x\">".into())), "<td><img src=\"x\"></td>");
    }

    #[test]
    fn test_section_and_warning() {
        let schema = ColumnSchema::area_dex();
        let ok = SectionRecord { area_name: "north field".into(), rows: Ok(vec![]) };
        assert!(render_section(&schema, &ok).starts_with("<h3 style='margin-bottom: 5px;'>North Field</h3>"));

        let missing = SectionRecord {
            area_name: "cave".into(),
            rows: Err(ExtractError::AreaNotFound("cave".into())),
        };
        assert_eq!(render_section(&schema, &missing), "<p style='color:red;'>Could not find area: cave</p>");

        let no_table = SectionRecord {
            area_name: "cave".into(),
            rows: Err(ExtractError::TableNotFound("cave".into())),
        };
        assert_eq!(render_section(&schema, &no_table), "<p style='color:red;'>No dextable found for cave</p>");
    }

    #[test]
    fn test_page_shell() {
        let shell = PageShell::for_location("aurora");
        let page = render_page(&shell, &["<p>one</p>".to_string(), "<p>two</p>".to_string()]);
        assert!(page.starts_with("<!DOCTYPE html>"));
        assert!(page.contains("<title>Aurora Areas</title>"));
        assert!(page.contains("<h1>Aurora</h1>"));
        assert!(page.contains("<p>one</p><p>two</p>"));
        assert!(page.contains("trainers_cell_aurora_"));
    }
}
