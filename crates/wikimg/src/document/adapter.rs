//! Document format adapter trait and registry
//!
//! Decides which files under the documents root are migrated, and how image
//! embeds are found in them. Markdown is the only built-in format.

use super::wikilink::{scan_wikilinks, WikiEmbed};
use std::path::Path;

/// Trait for document format adapters
///
/// # Example
///
/// ```
/// use std::path::Path;
/// use wikimg::document::{DocFormatAdapter, MarkdownAdapter};
///
/// let adapter = MarkdownAdapter;
/// assert_eq!(adapter.id(), "markdown");
/// assert!(adapter.supports_path(Path::new("post.markdown")));
/// ```
pub trait DocFormatAdapter {
    /// Returns the adapter identifier (e.g., "markdown")
    fn id(&self) -> &str;

    /// Check if this adapter handles the given file, based on its extension
    fn supports_path(&self, path: &Path) -> bool;

    /// Find image embeds in document content, in document order
    fn scan_embeds<'a>(&self, content: &'a str) -> Vec<WikiEmbed<'a>>;
}

/// Registry for managing document format adapters
///
/// # Example
///
/// ```
/// use std::path::Path;
/// use wikimg::document::{AdapterRegistry, MarkdownAdapter};
///
/// let mut registry = AdapterRegistry::new();
/// registry.register(Box::new(MarkdownAdapter));
///
/// let adapter = registry.resolve(Path::new("notes/readme.md")).unwrap();
/// assert_eq!(adapter.id(), "markdown");
/// assert!(registry.resolve(Path::new("notes/readme.txt")).is_none());
/// ```
pub struct AdapterRegistry {
    adapters: Vec<Box<dyn DocFormatAdapter>>,
}

impl AdapterRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self {
            adapters: Vec::new(),
        }
    }

    /// Create a registry with built-in adapters registered
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register(Box::new(MarkdownAdapter));
        registry
    }

    /// Register a format adapter
    pub fn register(&mut self, adapter: Box<dyn DocFormatAdapter>) {
        self.adapters.push(adapter);
    }

    /// Resolve the adapter for a file path, first registered wins
    pub fn resolve(&self, path: &Path) -> Option<&dyn DocFormatAdapter> {
        self.adapters
            .iter()
            .find(|adapter| adapter.supports_path(path))
            .map(|adapter| adapter.as_ref())
    }
}

impl Default for AdapterRegistry {
    fn default() -> Self {
        Self::with_builtins()
    }
}

/// Markdown format adapter
///
/// Handles `.md` and `.markdown` files (case-insensitive) and finds
/// Obsidian image wikilinks in them.
pub struct MarkdownAdapter;

impl DocFormatAdapter for MarkdownAdapter {
    fn id(&self) -> &str {
        "markdown"
    }

    fn supports_path(&self, path: &Path) -> bool {
        match path.extension() {
            Some(ext) => {
                let ext = ext.to_string_lossy();
                ext.eq_ignore_ascii_case("md") || ext.eq_ignore_ascii_case("markdown")
            }
            None => false,
        }
    }

    fn scan_embeds<'a>(&self, content: &'a str) -> Vec<WikiEmbed<'a>> {
        scan_wikilinks(content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_markdown_supports_path() {
        let adapter = MarkdownAdapter;

        assert!(adapter.supports_path(Path::new("README.md")));
        assert!(adapter.supports_path(Path::new("posts/guide.md")));
        assert!(adapter.supports_path(Path::new("file.markdown")));
        assert!(adapter.supports_path(Path::new("FILE.MD")));

        assert!(!adapter.supports_path(Path::new("file.txt")));
        assert!(!adapter.supports_path(Path::new("image.png")));
        assert!(!adapter.supports_path(Path::new("md")));
    }

    #[test]
    fn test_markdown_scan_embeds() {
        let adapter = MarkdownAdapter;
        let embeds = adapter.scan_embeds("# Post\n\n![[cover.png]]\n\n[[Other note]]\n");
        assert_eq!(embeds.len(), 1);
        assert_eq!(embeds[0].target, "cover.png");
    }

    #[test]
    fn test_empty_registry_resolves_nothing() {
        let registry = AdapterRegistry::new();
        assert!(registry.resolve(Path::new("a.md")).is_none());
    }

    #[test]
    fn test_default_registry_has_markdown() {
        let registry = AdapterRegistry::default();
        let adapter = registry.resolve(Path::new("a.markdown")).unwrap();
        assert_eq!(adapter.id(), "markdown");
    }
}
