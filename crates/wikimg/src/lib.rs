//! wikimg library
//!
//! Rewrites Obsidian image wikilinks (`![[Pasted image.png|300]]`) in a tree of
//! Markdown documents into standard Markdown image links, and copies the
//! referenced images from an attachments tree into a static images directory.
//!
//! The binary is a thin wrapper around [`Migrator`]; the rewrite itself
//! ([`document::LinkRewriter`]) is usable on its own.

pub mod cli;
pub mod config;
pub mod document;
pub mod errors;
pub mod migrate;
pub mod output;
pub mod report;

// Re-export commonly used types
pub use config::{Settings, WikimgConfig};
pub use errors::MigrateError;
pub use migrate::{DocumentChange, Migrator};
pub use output::{ExitCode, JsonError, JsonOutput};
pub use report::{DocumentOutcome, MigrationReport};
