// src/config.rs

pub const DEFAULT_BASE_URL: &str = "https://www.serebii.net";
pub const DEFAULT_BASE_PATH: &str = "/conquest";

/// Site-level settings for one extraction run. Built once from the command
/// line and passed down explicitly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractConfig {
    /// Origin prepended to every relative image source, without a trailing slash.
    pub base_url: String,
    /// Directory the source pages live under on the site, used for
    /// document-relative image sources.
    pub base_path: String,
    /// Write a `<stem>_meta.json` sidecar next to every generated page.
    pub write_metadata: bool,
}

impl ExtractConfig {
    pub fn new(base_url: impl Into<String>, base_path: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            base_path: base_path.into(),
            write_metadata: false,
        }
    }

    pub fn with_metadata(mut self, write_metadata: bool) -> Self {
        self.write_metadata = write_metadata;
        self
    }
}

impl Default for ExtractConfig {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL, DEFAULT_BASE_PATH)
    }
}
