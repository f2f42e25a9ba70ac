//! Command-line interface definitions using clap.

use crate::config::SettingsOverrides;
use clap::{ArgAction, Parser};
use std::path::PathBuf;

/// Rewrite Obsidian image wikilinks into Markdown image links
///
/// Walks the documents tree, replaces every `![[image.png]]` style reference
/// with `![image](images/image.png)`, and copies each referenced image from the
/// attachments tree into the images directory. Safe to run again: converted
/// links are left alone and existing images are never overwritten.
///
/// Exit Codes:
///   0  - Run completed
///   1  - Generic error occurred
///   2  - Invalid arguments or configuration
///   3  - Documents or attachments directory not found
///   4  - Unresolved references (with --fail-on-missing)
///   5  - Permission denied
///  10  - File system failure
#[derive(Debug, Parser)]
#[command(name = "wikimg", version)]
#[command(about = "Rewrite Obsidian image wikilinks and collect the images", long_about = None)]
pub struct Cli {
    /// Tree of Markdown documents to rewrite [default: content]
    #[arg(long, env = "WIKIMG_DOCS_DIR", value_name = "DIR")]
    pub docs: Option<PathBuf>,

    /// Obsidian attachments tree to take images from [default: attachments]
    #[arg(long, env = "WIKIMG_ATTACHMENTS_DIR", value_name = "DIR")]
    pub attachments: Option<PathBuf>,

    /// Directory images are copied to [default: static/images]
    #[arg(long, env = "WIKIMG_IMAGES_DIR", value_name = "DIR")]
    pub images: Option<PathBuf>,

    /// Path prefix for generated image links [default: images]
    #[arg(long, env = "WIKIMG_URL_PREFIX", value_name = "PREFIX")]
    pub url_prefix: Option<String>,

    /// Config file (default: ./wikimg.toml when present)
    #[arg(long, env = "WIKIMG_CONFIG", value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Report what would change without writing anything
    #[arg(long)]
    pub dry_run: bool,

    /// Print a diff of every changed document
    #[arg(long)]
    pub diff: bool,

    /// Exit with code 4 when any reference could not be resolved
    #[arg(long)]
    pub fail_on_missing: bool,

    /// Output the report as JSON
    #[arg(long)]
    pub json: bool,

    /// Suppress non-essential output (for scripting)
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Log more detail to stderr (repeat for more)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,

    /// Export the JSON schema of the report and exit
    #[arg(long)]
    pub schema: bool,
}

impl Cli {
    /// Settings given on the command line, to be merged with the config file.
    pub fn overrides(&self) -> SettingsOverrides {
        SettingsOverrides {
            docs_root: self.docs.clone(),
            attachments_root: self.attachments.clone(),
            images_dir: self.images.clone(),
            url_prefix: self.url_prefix.clone(),
            dry_run: self.dry_run,
        }
    }

    /// Default log filter for the requested verbosity.
    pub fn log_level(&self) -> &'static str {
        if self.quiet {
            return "error";
        }
        match self.verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    }
}
