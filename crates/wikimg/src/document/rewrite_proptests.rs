//! Property-based tests for the rewrite transform
//!
//! Checks the rewrite invariants over generated documents: text outside
//! wikilinks survives untouched, and a second pass changes nothing.

use super::*;
use proptest::prelude::*;
use std::path::PathBuf;

/// Resolves every target to a file under a fake vault.
struct Everything;

impl AssetLocator for Everything {
    fn locate(&self, target: &str) -> Option<PathBuf> {
        Some(PathBuf::from("/vault").join(file_name(target)))
    }
}

/// Resolves nothing.
struct Nothing;

impl AssetLocator for Nothing {
    fn locate(&self, _target: &str) -> Option<PathBuf> {
        None
    }
}

// Plain prose never containing "[["
fn prose_strategy() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9 .,!#()\n-]{0,80}"
}

// File names that may contain spaces and odd punctuation
fn image_name_strategy() -> impl Strategy<Value = String> {
    (
        "[a-zA-Z0-9][a-zA-Z0-9 _()-]{0,20}",
        prop_oneof![
            Just("png"),
            Just("JPG"),
            Just("jpeg"),
            Just("gif"),
            Just("webp"),
            Just("svg")
        ],
    )
        .prop_map(|(stem, ext)| format!("{}.{}", stem, ext))
}

// A document alternating prose and wikilink embeds
fn document_strategy() -> impl Strategy<Value = String> {
    prop::collection::vec(
        (prose_strategy(), image_name_strategy(), any::<bool>()),
        0..6,
    )
    .prop_map(|parts| {
        parts
            .into_iter()
            .map(|(prose, name, embed)| {
                format!("{}{}[[{}]]", prose, if embed { "!" } else { "" }, name)
            })
            .collect()
    })
}

proptest! {
    #[test]
    fn prop_prose_without_wikilinks_is_untouched(content in prose_strategy()) {
        let out = LinkRewriter::new(&Everything, "images").rewrite(&MarkdownAdapter, &content);
        prop_assert_eq!(out.content, content);
        prop_assert!(out.resolved.is_empty());
    }

    #[test]
    fn prop_unresolvable_documents_are_untouched(content in document_strategy()) {
        let out = LinkRewriter::new(&Nothing, "images").rewrite(&MarkdownAdapter, &content);
        prop_assert_eq!(out.missing.len(), scan_wikilinks(&content).len());
        prop_assert_eq!(out.content, content);
    }

    #[test]
    fn prop_rewrite_is_idempotent(content in document_strategy()) {
        let rewriter = LinkRewriter::new(&Everything, "images");
        let first = rewriter.rewrite(&MarkdownAdapter, &content);
        let second = rewriter.rewrite(&MarkdownAdapter, &first.content);
        prop_assert!(second.resolved.is_empty());
        prop_assert_eq!(second.content, first.content);
    }

    #[test]
    fn prop_encoded_names_have_no_spaces(name in image_name_strategy()) {
        let link = markdown_image_link("images", &name);
        let url = link.rsplit_once("](").map(|(_, url)| url).unwrap_or_default();
        prop_assert!(!url.contains(' '));
        prop_assert!(url.starts_with("images/"));
    }
}
