// src/loader/encoding.rs
// Best-effort charset detection for scraped pages. Detection never fails:
// when nothing can be determined the bytes are decoded as UTF-8 with
// replacement characters.

use encoding_rs::{Encoding, UTF_16BE, UTF_16LE, UTF_8, UTF_8_INIT};
use once_cell::sync::Lazy;
use regex::Regex;

/// Encoding used when no detector is configured or the detector has no opinion.
pub static FALLBACK_ENCODING: &Encoding = &UTF_8_INIT;

// Declarations are expected near the top of the document.
const META_SNIFF_LIMIT: usize = 4096;

// Matches both `<meta charset="x">` and `<meta http-equiv=... content="text/html; charset=x">`.
static META_CHARSET_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)<meta[^>]*?charset\s*=\s*["']?\s*([A-Za-z0-9_:.\-]+)"#)
        .expect("Failed to compile META_CHARSET_RE")
});

/// A pluggable guesser. Returns the most likely encoding, or `None` when it
/// cannot tell; there is no confidence score.
pub trait EncodingDetector {
    fn detect(&self, bytes: &[u8]) -> Option<&'static Encoding>;
}

/// Default detector: byte order mark, then a `<meta>` charset declaration,
/// then "is this valid UTF-8", then a statistical guess over the bytes.
#[derive(Debug, Default, Clone, Copy)]
pub struct SniffingDetector;

impl EncodingDetector for SniffingDetector {
    fn detect(&self, bytes: &[u8]) -> Option<&'static Encoding> {
        if let Some((encoding, _bom_len)) = Encoding::for_bom(bytes) {
            tracing::trace!("Encoding from BOM: {}", encoding.name());
            return Some(encoding);
        }

        if let Some(encoding) = declared_encoding(bytes) {
            return Some(encoding);
        }

        if std::str::from_utf8(bytes).is_ok() {
            return Some(UTF_8);
        }
        StatisticalDetector.detect(bytes)
    }
}

/// Guesses from byte frequencies alone, for pages that declare nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct StatisticalDetector;

impl EncodingDetector for StatisticalDetector {
    fn detect(&self, bytes: &[u8]) -> Option<&'static Encoding> {
        let mut guesser = chardetng::EncodingDetector::new();
        guesser.feed(bytes, true);
        let encoding = guesser.guess(None, true);
        tracing::debug!("Guessed encoding from content: {}", encoding.name());
        Some(encoding)
    }
}

/// Encoding named by a `<meta>` tag near the top of the page. A UTF-16 label
/// in an ASCII-compatible page is read as UTF-8.
fn declared_encoding(bytes: &[u8]) -> Option<&'static Encoding> {
    let head = String::from_utf8_lossy(&bytes[..bytes.len().min(META_SNIFF_LIMIT)]);
    let label = META_CHARSET_RE.captures(&head).and_then(|caps| caps.get(1))?;

    match Encoding::for_label(label.as_str().as_bytes()) {
        Some(encoding) if encoding == UTF_16LE || encoding == UTF_16BE => {
            tracing::debug!("Reading <meta> label '{}' as UTF-8", label.as_str());
            Some(UTF_8)
        }
        Some(encoding) => {
            tracing::trace!("Encoding from <meta> declaration '{}': {}", label.as_str(), encoding.name());
            Some(encoding)
        }
        None => {
            tracing::debug!("Ignoring unknown charset label '{}'", label.as_str());
            None
        }
    }
}

/// Result of decoding a page's raw bytes.
#[derive(Debug, Clone)]
pub struct DecodedText {
    pub text: String,
    pub encoding: &'static Encoding,
    /// Some bytes were malformed and replaced with U+FFFD.
    pub lossy: bool,
}

/// Decodes `bytes` with whatever `detector` guesses, falling back to
/// [`FALLBACK_ENCODING`]. Never fails.
pub fn decode_bytes(bytes: &[u8], detector: Option<&dyn EncodingDetector>) -> DecodedText {
    let encoding = match detector.and_then(|d| d.detect(bytes)) {
        Some(encoding) => encoding,
        None => {
            tracing::debug!(
                "Encoding could not be detected; using {} with replacement",
                FALLBACK_ENCODING.name()
            );
            FALLBACK_ENCODING
        }
    };

    let (text, used, lossy) = encoding.decode(bytes);
    DecodedText {
        text: text.into_owned(),
        encoding: used,
        lossy,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use encoding_rs::WINDOWS_1252;

    struct NoOpinion;

    impl EncodingDetector for NoOpinion {
        fn detect(&self, _bytes: &[u8]) -> Option<&'static Encoding> {
            None
        }
    }

    #[test]
    fn test_meta_charset_declaration_wins_over_utf8_check() {
        let html = b"<html><head><meta http-equiv=\"Content-Type\" content=\"text/html; charset=iso-8859-1\"></head><body>Pok\xe9mon</body></html>";
        let decoded = decode_bytes(html, Some(&SniffingDetector));
        assert_eq!(decoded.encoding, WINDOWS_1252);
        assert!(decoded.text.contains("Pokémon"));
        assert!(!decoded.lossy);
    }

    #[test]
    fn test_html5_meta_charset() {
        let detector = SniffingDetector;
        assert_eq!(detector.detect(b"<meta charset='windows-1252'>"), Some(WINDOWS_1252));
    }

    #[test]
    fn test_bom_is_honoured() {
        let bytes = [0xFF, 0xFE, b'h', 0x00, b'i', 0x00];
        let decoded = decode_bytes(&bytes, Some(&SniffingDetector));
        assert_eq!(decoded.encoding, UTF_16LE);
        assert_eq!(decoded.text, "hi");
    }

    #[test]
    fn test_undeclared_latin1_is_guessed() {
        let decoded = decode_bytes(
            b"<html><body><p>Pok\xe9mon Caf\xe9</p></body></html>",
            Some(&SniffingDetector),
        );
        assert_ne!(decoded.encoding, UTF_8);
        assert!(decoded.text.contains("Pok\u{e9}mon Caf\u{e9}"));
        assert!(!decoded.lossy);
    }

    #[test]
    fn test_utf16_meta_label_reads_as_utf8() {
        let detector = SniffingDetector;
        assert_eq!(detector.detect(b"<meta charset=\"utf-16\"><p>hi</p>"), Some(UTF_8));
        assert_eq!(detector.detect(b"<meta charset=\"UTF-16BE\"><p>hi</p>"), Some(UTF_8));

        let decoded = decode_bytes(b"<meta charset=\"utf-16\"><p>hi</p>", Some(&detector));
        assert!(decoded.text.contains("<p>hi</p>"));
    }

    #[test]
    fn test_no_opinion_falls_back_lossily() {
        let decoded = decode_bytes(b"<p>caf\xe9</p>", Some(&NoOpinion));
        assert_eq!(decoded.encoding, FALLBACK_ENCODING);
        assert!(decoded.lossy);
        assert!(decoded.text.contains('\u{FFFD}'));
    }

    #[test]
    fn test_missing_detector_is_a_fallback_not_an_error() {
        let decoded = decode_bytes("<p>plain</p>".as_bytes(), None);
        assert_eq!(decoded.encoding, UTF_8);
        assert_eq!(decoded.text, "<p>plain</p>");
        assert!(!decoded.lossy);
    }
}
