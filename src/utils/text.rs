// src/utils/text.rs
// Text helpers shared by the locator, the transformer and the renderer.

use once_cell::sync::Lazy;
use regex::Regex;
use scraper::ElementRef;

static WHITESPACE_RUN_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s+").expect("Failed to compile WHITESPACE_RUN_RE"));

/// Visible text of an element with every text node trimmed and the pieces
/// concatenated without a separator. Empty pieces are skipped.
pub fn stripped_text(element: ElementRef) -> String {
    joined_text(element, "")
}

/// Trimmed, non-empty text nodes of an element in document order.
pub fn text_pieces<'a>(element: ElementRef<'a>) -> impl Iterator<Item = &'a str> {
    element.text().map(str::trim).filter(|piece| !piece.is_empty())
}

/// Like [`stripped_text`], but pieces are joined with `separator`.
pub fn joined_text(element: ElementRef, separator: &str) -> String {
    text_pieces(element).collect::<Vec<_>>().join(separator)
}

/// Normalized, lower-cased text used for area names and paragraph matching.
pub fn normalized_text(element: ElementRef) -> String {
    stripped_text(element).to_lowercase()
}

/// Trims and collapses every whitespace run into one space.
pub fn collapse_whitespace(s: &str) -> String {
    WHITESPACE_RUN_RE.replace_all(s.trim(), " ").into_owned()
}

pub fn escape_text(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(ch),
        }
    }
    out
}

pub fn escape_attr(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(ch),
        }
    }
    out
}

/// Upper-cases the first letter of every alphabetic run and lower-cases the rest,
/// so "route 1" becomes "Route 1" and "mt. coronet" becomes "Mt. Coronet".
pub fn title_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut prev_is_letter = false;
    for ch in s.chars() {
        if ch.is_alphabetic() {
            if prev_is_letter {
                out.extend(ch.to_lowercase());
            } else {
                out.extend(ch.to_uppercase());
            }
            prev_is_letter = true;
        } else {
            out.push(ch);
            prev_is_letter = false;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use scraper::{Html, Selector};

    #[test]
    fn test_stripped_text_concatenates_trimmed_pieces() {
        let doc = Html::parse_fragment("<p>  Route <b> 1 </b>\n</p>");
        let p = doc.select(&Selector::parse("p").unwrap()).next().unwrap();
        assert_eq!(stripped_text(p), "Route1");
        assert_eq!(joined_text(p, "<br>"), "Route<br>1");
    }

    #[test]
    fn test_collapse_whitespace() {
        assert_eq!(collapse_whitespace("  Bulba\n   saur \t"), "Bulba saur");
        assert_eq!(collapse_whitespace(""), "");
    }

    #[test]
    fn test_title_case_matches_word_boundaries() {
        assert_eq!(title_case("route 1"), "Route 1");
        assert_eq!(title_case("mt. coronet"), "Mt. Coronet");
        assert_eq!(title_case("AURORA"), "Aurora");
        assert_eq!(title_case("b2f"), "B2F");
    }

    #[test]
    fn test_escaping() {
        assert_eq!(escape_text("a < b & c"), "a &lt; b &amp; c");
        assert_eq!(escape_attr(r#"say "hi" & go"#), "say &quot;hi&quot; &amp; go");
    }
}
