//! Collection types for item extraction
//!
//! A collection type names a family of file extensions. Each requested type is
//! compiled into one regex that finds absolute, protocol-relative or
//! root-relative references ending in one of its extensions.

use crate::ConfigError;
use regex::Regex;

/// Collection types that collect the page URL itself instead of pattern matches
pub const PAGE_COLLECTIONS: &[&str] = &["html", "page"];

/// Built-in collection presets and their extensions
const PRESETS: &[(&str, &str)] = &[
    ("images", "jpg|jpeg|png|gif|bmp|svg|webp|tiff"),
    ("video", "mp4|webm|ogg|flv|avi|mov|wmv|3gp"),
    ("audio", "mp3|wav|ogg|flac|wma|aac|alac|aiff"),
    ("pdf", "pdf"),
    ("doc", "doc|docx"),
    ("xls", "xls|xlsx"),
    ("ppt", "ppt|pptx"),
    ("archive", "zip|rar|7z|tar|gz|bz2|tgz|tbz2|txz"),
    ("code", "py|rb|java|c|cpp|cs|go|swift|kt"),
    ("shell", "sh|bat|ps1|bash"),
    ("text", "txt|md|csv|log|toml|ini|cfg|conf|text|rtf"),
    ("json", "json"),
    ("yaml", "yml|yaml"),
    ("font", "ttf|otf|woff|woff2|eot|svg"),
];

/// Start of a reference: a scheme character or a path separator, followed by
/// a run of characters that cannot end a quoted attribute value
const REFERENCE_PREFIX: &str = r#"(?:[htps:?]|/)[^\s()'"<>]+\."#;

/// Compiled patterns for the requested collection types
#[derive(Debug, Clone, Default)]
pub struct CollectionSet {
    patterns: Vec<(String, Regex)>,
    collect_pages: bool,
}

impl CollectionSet {
    /// Compiles the requested collection types
    ///
    /// Preset names map to their extension lists. Any other name is read as a
    /// custom extension list such as `"csv|tsv"` or `"epub"`. The reserved
    /// `html` and `page` types carry no pattern.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidCollection` if a pattern fails to compile.
    pub fn compile(names: &[String]) -> Result<Self, ConfigError> {
        let mut set = Self::default();

        for name in names {
            let name = name.trim();
            if name.is_empty() {
                continue;
            }

            if PAGE_COLLECTIONS.contains(&name) {
                set.collect_pages = true;
                continue;
            }

            if set.patterns.iter().any(|(existing, _)| existing == name) {
                continue;
            }

            let extensions = preset_extensions(name).unwrap_or(name);
            let pattern = format!(r"{}(?:{})\b", REFERENCE_PREFIX, extensions);
            let regex = Regex::new(&pattern).map_err(|source| ConfigError::InvalidCollection {
                name: name.to_string(),
                source,
            })?;

            tracing::debug!("Compiled collection '{}': {}", name, pattern);
            set.patterns.push((name.to_string(), regex));
        }

        Ok(set)
    }

    /// Returns true if the page URL itself should be collected
    pub fn collects_pages(&self) -> bool {
        self.collect_pages
    }

    /// Returns true if at least one extension pattern is compiled
    pub fn has_patterns(&self) -> bool {
        !self.patterns.is_empty()
    }

    /// Finds every pattern match in `markup`, pattern by pattern
    pub fn find_all<'a>(&'a self, markup: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.patterns
            .iter()
            .flat_map(move |(_, regex)| regex.find_iter(markup).map(|m| m.as_str()))
    }
}

/// Looks up the extension list of a preset collection
fn preset_extensions(name: &str) -> Option<&'static str> {
    PRESETS
        .iter()
        .find(|(preset, _)| *preset == name)
        .map(|(_, extensions)| *extensions)
}
