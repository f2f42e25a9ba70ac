//! Document handling: finding image wikilinks, resolving them against the
//! attachments tree, rewriting them, and publishing the images.

mod adapter;
mod assets;
mod rewrite;
mod wikilink;

pub use adapter::{AdapterRegistry, DocFormatAdapter, MarkdownAdapter};
pub use assets::{AssetIndex, AssetLocator, AssetPublisher, AttachmentStore, Publish};
pub use rewrite::{LinkRewriter, ResolvedEmbed, Rewrite};
pub use wikilink::{
    alt_text, encode_file_name, file_name, is_image_file_name, markdown_image_link,
    scan_wikilinks, WikiEmbed, IMAGE_EXTENSIONS,
};

#[cfg(test)]
mod rewrite_proptests;
