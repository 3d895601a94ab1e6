// src/extractors/areas.rs
// Discovers the ordered list of area names in a location page.

use std::collections::HashSet;

use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};

use crate::utils::error::ExtractError;
use crate::utils::text::normalized_text;

// Anchor-index tables carry a header link with this text; it is not an area.
const ANCHOR_TABLE_EXCLUSION: &str = "area anchors";

static NAMED_ANCHOR_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("a[name]").expect("Failed to compile NAMED_ANCHOR_SELECTOR"));

static FONT_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("font").expect("Failed to compile FONT_SELECTOR"));

static ANCHOR_TABLE_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("table.anctab").expect("Failed to compile ANCHOR_TABLE_SELECTOR"));

static ANCHOR_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("a").expect("Failed to compile ANCHOR_SELECTOR"));

/// Which strategy produced the area list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AreaSource {
    ParagraphAnchors,
    AnchorTable,
}

/// Ordered, de-duplicated area names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AreaList {
    pub names: Vec<String>,
    pub source: AreaSource,
}

/// Collects unique names in first-seen order.
#[derive(Default)]
struct OrderedNames {
    seen: HashSet<String>,
    names: Vec<String>,
}

impl OrderedNames {
    fn push(&mut self, name: String) {
        if !name.is_empty() && self.seen.insert(name.clone()) {
            self.names.push(name);
        }
    }
}

/// Runs the paragraph-anchor strategy, then the anchor-table fallback only if
/// the first found nothing.
pub fn locate_areas(document: &Html) -> Result<AreaList, ExtractError> {
    let names = areas_from_anchors(document);
    if !names.is_empty() {
        tracing::debug!("Found {} areas from paragraph anchors", names.len());
        return Ok(AreaList { names, source: AreaSource::ParagraphAnchors });
    }

    let names = areas_from_anchor_table(document);
    if !names.is_empty() {
        tracing::debug!("Found {} areas from the anchor table", names.len());
        return Ok(AreaList { names, source: AreaSource::AnchorTable });
    }

    Err(ExtractError::NoAreasDiscovered)
}

/// Every `<a name>` whose nearest enclosing `<p>` holds a `<font>`; the font's
/// text is the area name.
pub fn areas_from_anchors(document: &Html) -> Vec<String> {
    let mut names = OrderedNames::default();
    for anchor in document.select(&NAMED_ANCHOR_SELECTOR) {
        let Some(paragraph) = enclosing_paragraph(anchor) else {
            continue;
        };
        if let Some(font) = paragraph.select(&FONT_SELECTOR).next() {
            names.push(normalized_text(font));
        }
    }
    names.names
}

/// Every link inside the first `table.anctab`, minus the index's own header.
pub fn areas_from_anchor_table(document: &Html) -> Vec<String> {
    let Some(table) = document.select(&ANCHOR_TABLE_SELECTOR).next() else {
        tracing::trace!("No anchor table present");
        return Vec::new();
    };

    let mut names = OrderedNames::default();
    for anchor in table.select(&ANCHOR_SELECTOR) {
        let text = normalized_text(anchor);
        if text.contains(ANCHOR_TABLE_EXCLUSION) {
            continue;
        }
        names.push(text);
    }
    names.names
}

fn enclosing_paragraph(element: ElementRef) -> Option<ElementRef> {
    element
        .ancestors()
        .filter_map(ElementRef::wrap)
        .find(|ancestor| ancestor.value().name() == "p")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paragraph_anchors_in_first_seen_order() {
        let html = Html::parse_document(
            r#"<html><body>
            <p><a name="castle"></a><font size="4">Castle</font></p>
            <p><a name="field"></a><font size="4"> Field </font></p>
            <p><a name="castle2"></a><font size="4">CASTLE</font></p>
            <p><a name="nofont"></a>No font here</p>
            <div><a name="outside"></a><font>Outside</font></div>
            </body></html>"#,
        );
        let areas = locate_areas(&html).unwrap();
        assert_eq!(areas.source, AreaSource::ParagraphAnchors);
        assert_eq!(areas.names, vec!["castle", "field"]);
    }

    #[test]
    fn test_anchor_table_is_only_a_fallback() {
        let html = Html::parse_document(
            r##"<html><body>
            <table class="anctab"><tr>
              <td><a href="#top">Area Anchors</a></td>
              <td><a href="#grass">Grassland</a></td>
              <td><a href="#cave">Cave</a></td>
              <td><a href="#grass">grassland</a></td>
            </tr></table>
            </body></html>"##,
        );
        assert!(areas_from_anchors(&html).is_empty());
        let areas = locate_areas(&html).unwrap();
        assert_eq!(areas.source, AreaSource::AnchorTable);
        assert_eq!(areas.names, vec!["grassland", "cave"]);
    }

    #[test]
    fn test_anchor_table_ignored_when_anchors_found() {
        let html = Html::parse_document(
            r##"<html><body>
            <table class="anctab"><tr><td><a href="#x">Other</a></td></tr></table>
            <p><a name="lake"></a><font>Lake</font></p>
            </body></html>"##,
        );
        let areas = locate_areas(&html).unwrap();
        assert_eq!(areas.source, AreaSource::ParagraphAnchors);
        assert_eq!(areas.names, vec!["lake"]);
    }

    #[test]
    fn test_no_areas() {
        let html = Html::parse_document("<html><body><p>Nothing</p></body></html>");
        assert_eq!(locate_areas(&html), Err(ExtractError::NoAreasDiscovered));
    }
}
