// src/extractors/markup.rs
// Re-serializes a cell's inner markup from the read-only tree, rewriting image
// sources and optionally unwrapping links on the way out. The source tree is
// never modified.

use scraper::{node::Node, ElementRef};

use crate::config::ExtractConfig;
use crate::extractors::schema::UrlStyle;
use crate::utils::text::{escape_attr, escape_text};

// Elements serialized without a closing tag.
const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param", "source",
    "track", "wbr",
];

/// Turns relative `<img src>` values into absolute URLs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageResolver {
    base_url: String,
    base_path: String,
    style: UrlStyle,
}

impl ImageResolver {
    pub fn new(config: &ExtractConfig, style: UrlStyle) -> Self {
        Self {
            base_url: config.base_url.clone(),
            base_path: config.base_path.clone(),
            style,
        }
    }

    /// Absolute (`http`-prefixed) sources are returned unchanged, which makes
    /// resolving idempotent.
    pub fn resolve(&self, src: &str) -> String {
        match self.style {
            UrlStyle::RootRelative => {
                if src.starts_with("http") {
                    return src.to_string();
                }
                if src.starts_with('/') {
                    format!("{}{}", self.base_url, src)
                } else {
                    format!("{}/{}", self.base_url, src)
                }
            }
            UrlStyle::BasePath => {
                // "./x" and "../x" both lose their dots and become "/x".
                let src = src.trim().trim_start_matches('.');
                if src.starts_with("http") {
                    return src.to_string();
                }
                let mut path = if src.starts_with('/') {
                    src.to_string()
                } else {
                    join_url_path(&self.base_path, src)
                };
                if !path.starts_with('/') {
                    path.insert(0, '/');
                }
                format!("{}{}", self.base_url, path)
            }
        }
    }
}

/// Posix-style join: an absolute `tail` replaces `base`.
fn join_url_path(base: &str, tail: &str) -> String {
    if tail.starts_with('/') || base.is_empty() {
        tail.to_string()
    } else if base.ends_with('/') {
        format!("{}{}", base, tail)
    } else {
        format!("{}/{}", base, tail)
    }
}

/// Appends a width cap to an inline style unless one is already present.
fn cap_image_width(style: &str, max_width: u32) -> String {
    if style.contains("max-width") {
        return style.to_string();
    }
    let cap = format!("max-width:{}px; height:auto;", max_width);
    if style.is_empty() {
        cap
    } else {
        format!("{} {}", style, cap)
    }
}

/// Serializer for one cell's children.
pub struct FragmentWriter<'r> {
    images: &'r ImageResolver,
    max_image_width: Option<u32>,
    strip_links: bool,
}

impl<'r> FragmentWriter<'r> {
    pub fn new(images: &'r ImageResolver) -> Self {
        Self { images, max_image_width: None, strip_links: false }
    }

    pub fn max_image_width(mut self, width: Option<u32>) -> Self {
        self.max_image_width = width;
        self
    }

    pub fn strip_links(mut self, strip: bool) -> Self {
        self.strip_links = strip;
        self
    }

    /// Inner markup of `element` with the configured rewrites applied.
    pub fn inner_markup(&self, element: ElementRef) -> String {
        let mut out = String::new();
        self.write_children(element, &mut out);
        out
    }

    fn write_children(&self, element: ElementRef, out: &mut String) {
        for child in element.children() {
            match child.value() {
                Node::Text(text) => out.push_str(&escape_text(text)),
                Node::Comment(comment) => {
                    out.push_str("<!--");
                    out.push_str(comment);
                    out.push_str("-->");
                }
                Node::Element(_) => {
                    if let Some(child_element) = ElementRef::wrap(child) {
                        self.write_element(child_element, out);
                    }
                }
                _ => {}
            }
        }
    }

    fn write_element(&self, element: ElementRef, out: &mut String) {
        let name = element.value().name();
        if self.strip_links && name == "a" {
            self.write_children(element, out);
            return;
        }

        let is_img = name == "img";
        let mut has_style = false;

        out.push('<');
        out.push_str(name);
        for (attr, value) in element.value().attrs() {
            let value = match (is_img, attr) {
                (true, "src") => self.images.resolve(value),
                (true, "style") => {
                    has_style = true;
                    match self.max_image_width {
                        Some(width) => cap_image_width(value, width),
                        None => value.to_string(),
                    }
                }
                _ => value.to_string(),
            };
            push_attr(out, attr, &value);
        }
        if is_img && !has_style {
            if let Some(width) = self.max_image_width {
                push_attr(out, "style", &cap_image_width("", width));
            }
        }
        out.push('>');

        if VOID_ELEMENTS.contains(&name) {
            return;
        }
        self.write_children(element, out);
        out.push_str("</");
        out.push_str(name);
        out.push('>');
    }
}

fn push_attr(out: &mut String, name: &str, value: &str) {
    out.push(' ');
    out.push_str(name);
    out.push_str("=\"");
    out.push_str(&escape_attr(value));
    out.push('"');
}
