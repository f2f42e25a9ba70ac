//! Obsidian image wikilinks and their Markdown replacements.
//!
//! Recognized forms:
//!
//! - `[[Pasted image 1.png]]`
//! - `![[diagram.svg]]` (embed marker)
//! - `![[attachments/photo.JPG|300]]` (subfolder, size/alias suffix)
//!
//! The alias suffix is ignored. Only targets ending in one of
//! [`IMAGE_EXTENSIONS`] (case-insensitive) match.

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use regex::Regex;
use std::ops::Range;
use std::sync::OnceLock;

/// Image file extensions recognized in wikilinks and in the attachments tree.
pub const IMAGE_EXTENSIONS: [&str; 6] = ["png", "jpg", "jpeg", "gif", "webp", "svg"];

/// Characters left unescaped in generated link URLs, matching URL path quoting.
const URL_PATH_SAFE: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~')
    .remove(b'/');

static WIKILINK_REGEX: OnceLock<Regex> = OnceLock::new();

fn wikilink_regex() -> &'static Regex {
    WIKILINK_REGEX.get_or_init(|| {
        let pattern = format!(
            r"(?i)!?\[\[([^\]|]+\.(?:{}))(?:\|[^\]]*)?\]\]",
            IMAGE_EXTENSIONS.join("|")
        );
        Regex::new(&pattern).expect("Wikilink regex should compile")
    })
}

/// One image wikilink found in a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WikiEmbed<'a> {
    /// Byte range of the whole match in the document
    pub span: Range<usize>,
    /// The matched text, e.g. `![[img.png|200]]`
    pub raw: &'a str,
    /// The link target without alias, e.g. `sub/img.png`
    pub target: &'a str,
}

impl<'a> WikiEmbed<'a> {
    /// Final path segment of the target.
    pub fn file_name(&self) -> &'a str {
        file_name(self.target)
    }
}

/// Find every image wikilink in `content`, in document order.
///
/// # Example
///
/// ```
/// use wikimg::document::scan_wikilinks;
///
/// let embeds = scan_wikilinks("See ![[shots/Diagram.PNG|400]] and [[notes.md]]");
/// assert_eq!(embeds.len(), 1);
/// assert_eq!(embeds[0].target, "shots/Diagram.PNG");
/// assert_eq!(embeds[0].file_name(), "Diagram.PNG");
/// ```
pub fn scan_wikilinks(content: &str) -> Vec<WikiEmbed<'_>> {
    wikilink_regex()
        .captures_iter(content)
        .filter_map(|cap| {
            let whole = cap.get(0)?;
            let target = cap.get(1)?;
            Some(WikiEmbed {
                span: whole.range(),
                raw: whole.as_str(),
                target: target.as_str(),
            })
        })
        .collect()
}

/// Final segment of a link target. Both `/` and `\` separate segments.
pub fn file_name(target: &str) -> &str {
    target.rsplit(['/', '\\']).next().unwrap_or(target)
}

/// Alt text for a file name: the name without its last extension.
///
/// A name whose only dot is the leading one keeps that dot (`.png` stays
/// `.png`).
pub fn alt_text(file_name: &str) -> &str {
    match file_name.rfind('.') {
        Some(pos) if file_name[..pos].trim_start_matches('.').is_empty() => file_name,
        Some(pos) => &file_name[..pos],
        None => file_name,
    }
}

/// Percent-encode a file name for use in a link URL.
pub fn encode_file_name(file_name: &str) -> String {
    utf8_percent_encode(file_name, URL_PATH_SAFE).to_string()
}

/// Build the Markdown image link that replaces a wikilink.
///
/// # Example
///
/// ```
/// use wikimg::document::markdown_image_link;
///
/// assert_eq!(
///     markdown_image_link("images", "Pasted image 1.png"),
///     "![Pasted image 1](images/Pasted%20image%201.png)"
/// );
/// ```
pub fn markdown_image_link(url_prefix: &str, file_name: &str) -> String {
    let encoded = encode_file_name(file_name);
    let url = if url_prefix.is_empty() {
        encoded
    } else if url_prefix.ends_with('/') {
        format!("{}{}", url_prefix, encoded)
    } else {
        format!("{}/{}", url_prefix, encoded)
    };
    format!("![{}]({})", alt_text(file_name), url)
}

/// Whether a file name carries one of the recognized image extensions.
pub fn is_image_file_name(name: &str) -> bool {
    let stem = alt_text(name);
    if stem.len() == name.len() {
        return false;
    }
    let ext = &name[stem.len() + 1..];
    IMAGE_EXTENSIONS
        .iter()
        .any(|known| known.eq_ignore_ascii_case(ext))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scan_plain_and_embed_forms() {
        let content = "a [[one.png]] b ![[two.jpg]] c";
        let embeds = scan_wikilinks(content);
        assert_eq!(embeds.len(), 2);
        assert_eq!(embeds[0].raw, "[[one.png]]");
        assert_eq!(embeds[0].target, "one.png");
        assert_eq!(embeds[1].raw, "![[two.jpg]]");
        assert_eq!(&content[embeds[1].span.clone()], "![[two.jpg]]");
    }

    #[test]
    fn test_scan_strips_alias() {
        let embeds = scan_wikilinks("![[diagram.png|200]]");
        assert_eq!(embeds.len(), 1);
        assert_eq!(embeds[0].target, "diagram.png");
        assert_eq!(embeds[0].raw, "![[diagram.png|200]]");
    }

    #[test]
    fn test_scan_is_case_insensitive_on_extension() {
        let embeds = scan_wikilinks("[[Photo.JPEG]] [[icon.Svg]] [[anim.GIF]] [[x.webp]]");
        let targets: Vec<_> = embeds.iter().map(|e| e.target).collect();
        assert_eq!(targets, vec!["Photo.JPEG", "icon.Svg", "anim.GIF", "x.webp"]);
    }

    #[test]
    fn test_scan_ignores_non_images_and_markdown_links() {
        let content = "[[Some note]] [[doc.md]] [[file.pdf]] ![alt](images/a.png) [[a.png.txt]]";
        assert!(scan_wikilinks(content).is_empty());
    }

    #[test]
    fn test_scan_keeps_subfolder_in_target() {
        let embeds = scan_wikilinks("![[attachments/2024/shot.png]]");
        assert_eq!(embeds[0].target, "attachments/2024/shot.png");
        assert_eq!(embeds[0].file_name(), "shot.png");
    }

    #[test]
    fn test_file_name_handles_both_separators() {
        assert_eq!(file_name("a/b/c.png"), "c.png");
        assert_eq!(file_name(r"a\b\c.png"), "c.png");
        assert_eq!(file_name("c.png"), "c.png");
    }

    #[test]
    fn test_alt_text() {
        assert_eq!(alt_text("Pasted image 1.png"), "Pasted image 1");
        assert_eq!(alt_text("archive.tar.png"), "archive.tar");
        assert_eq!(alt_text(".png"), ".png");
        assert_eq!(alt_text("noext"), "noext");
    }

    #[test]
    fn test_encode_file_name() {
        assert_eq!(encode_file_name("Pasted image 1.png"), "Pasted%20image%201.png");
        assert_eq!(encode_file_name("a_b-c~d.png"), "a_b-c~d.png");
        assert_eq!(encode_file_name("a(1)#.png"), "a%281%29%23.png");
        assert_eq!(encode_file_name("café.png"), "caf%C3%A9.png");
    }

    #[test]
    fn test_markdown_image_link_prefixes() {
        assert_eq!(
            markdown_image_link("images", "photo.jpg"),
            "![photo](images/photo.jpg)"
        );
        assert_eq!(
            markdown_image_link("/images/", "photo.jpg"),
            "![photo](/images/photo.jpg)"
        );
        assert_eq!(markdown_image_link("", "photo.jpg"), "![photo](photo.jpg)");
    }

    #[test]
    fn test_is_image_file_name() {
        assert!(is_image_file_name("a.png"));
        assert!(is_image_file_name("A.JPG"));
        assert!(is_image_file_name("b.jpeg"));
        assert!(!is_image_file_name("c.pdf"));
        assert!(!is_image_file_name("png"));
        assert!(!is_image_file_name(".png"));
    }
}
