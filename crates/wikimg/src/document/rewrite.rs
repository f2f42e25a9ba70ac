//! The wikilink rewrite transform.
//!
//! Pure over its inputs: the only outside access is through the
//! [`AssetLocator`], so tests can drive it with an in-memory locator.

use super::adapter::DocFormatAdapter;
use super::assets::AssetLocator;
use super::wikilink::markdown_image_link;
use std::path::PathBuf;
use tracing::debug;

/// A wikilink that resolved to an image on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedEmbed {
    /// Target as written in the document
    pub target: String,
    /// File name the image is published under
    pub file_name: String,
    /// Where the image was found
    pub source: PathBuf,
}

/// Result of rewriting one document's content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rewrite {
    pub content: String,
    /// One entry per resolved occurrence, in document order
    pub resolved: Vec<ResolvedEmbed>,
    /// Targets that could not be found, one per occurrence
    pub missing: Vec<String>,
}

/// Replaces image wikilinks with Markdown image links.
///
/// # Example
///
/// ```
/// use std::collections::HashMap;
/// use std::path::PathBuf;
/// use wikimg::document::{AssetLocator, LinkRewriter, MarkdownAdapter};
///
/// struct Fixed(HashMap<&'static str, PathBuf>);
///
/// impl AssetLocator for Fixed {
///     fn locate(&self, target: &str) -> Option<PathBuf> {
///         self.0.get(target).cloned()
///     }
/// }
///
/// let locator = Fixed(HashMap::from([("cat.png", PathBuf::from("/vault/cat.png"))]));
/// let rewriter = LinkRewriter::new(&locator, "images");
/// let out = rewriter.rewrite(&MarkdownAdapter, "![[cat.png]] ![[dog.png]]");
///
/// assert_eq!(out.content, "![cat](images/cat.png) ![[dog.png]]");
/// assert_eq!(out.missing, vec!["dog.png".to_string()]);
/// ```
pub struct LinkRewriter<'a, L: AssetLocator> {
    locator: &'a L,
    url_prefix: String,
}

impl<'a, L: AssetLocator> LinkRewriter<'a, L> {
    pub fn new(locator: &'a L, url_prefix: impl Into<String>) -> Self {
        Self {
            locator,
            url_prefix: url_prefix.into(),
        }
    }

    /// Rewrite every embed the adapter finds in `content`.
    ///
    /// Unresolved embeds keep their original text.
    pub fn rewrite(&self, adapter: &dyn DocFormatAdapter, content: &str) -> Rewrite {
        let mut output = String::with_capacity(content.len());
        let mut resolved = Vec::new();
        let mut missing = Vec::new();
        let mut cursor = 0;

        for embed in adapter.scan_embeds(content) {
            output.push_str(&content[cursor..embed.span.start]);
            cursor = embed.span.end;

            match self.locator.locate(embed.target) {
                Some(source) => {
                    let file_name = embed.file_name();
                    debug!("Resolved {} -> {}", embed.target, source.display());
                    output.push_str(&markdown_image_link(&self.url_prefix, file_name));
                    resolved.push(ResolvedEmbed {
                        target: embed.target.to_string(),
                        file_name: file_name.to_string(),
                        source,
                    });
                }
                None => {
                    debug!("Unresolved {}", embed.target);
                    output.push_str(embed.raw);
                    missing.push(embed.target.to_string());
                }
            }
        }
        output.push_str(&content[cursor..]);

        Rewrite {
            content: output,
            resolved,
            missing,
        }
    }
}
