//! Configuration file loading and settings resolution.
//!
//! Settings come from, in order of precedence: command-line flags (and their
//! environment variables, handled by clap), `wikimg.toml`, then defaults that
//! match a static-site root (`content/`, `attachments/`, `static/images/`).

use crate::errors::MigrateError;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Config file looked up in the working directory when `--config` is not given.
pub const CONFIG_FILE_NAME: &str = "wikimg.toml";

pub const DEFAULT_DOCS_ROOT: &str = "content";
pub const DEFAULT_ATTACHMENTS_ROOT: &str = "attachments";
pub const DEFAULT_IMAGES_DIR: &str = "static/images";
pub const DEFAULT_URL_PREFIX: &str = "images";

/// Root configuration structure loaded from `wikimg.toml`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WikimgConfig {
    /// Input and output directories (optional).
    pub paths: Option<PathsConfig>,
    /// Generated link settings (optional).
    pub links: Option<LinksConfig>,
}

/// Directory configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PathsConfig {
    /// Tree of Markdown documents to rewrite (default: "content").
    pub docs_root: Option<PathBuf>,
    /// Obsidian attachments tree to take images from (default: "attachments").
    pub attachments_root: Option<PathBuf>,
    /// Where images are copied to (default: "static/images").
    pub images_dir: Option<PathBuf>,
}

/// Generated link configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LinksConfig {
    /// Path prefix put in front of image file names (default: "images").
    pub url_prefix: Option<String>,
}

impl WikimgConfig {
    /// Load configuration from an explicit file, which must exist.
    pub fn load(path: &Path) -> Result<Self, MigrateError> {
        let content = std::fs::read_to_string(path).map_err(|source| MigrateError::ReadConfig {
            path: path.to_path_buf(),
            source,
        })?;

        toml::from_str(&content).map_err(|source| MigrateError::ParseConfig {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Load `wikimg.toml` from `dir` if it exists.
    ///
    /// Returns an empty config (all fields None) if the file doesn't exist.
    /// Returns an error if the file exists but is malformed.
    pub fn discover(dir: &Path) -> Result<Self, MigrateError> {
        let path = dir.join(CONFIG_FILE_NAME);
        if !path.exists() {
            return Ok(Self::default());
        }
        Self::load(&path)
    }
}

/// Values given on the command line (or through their environment variables).
#[derive(Debug, Clone, Default)]
pub struct SettingsOverrides {
    pub docs_root: Option<PathBuf>,
    pub attachments_root: Option<PathBuf>,
    pub images_dir: Option<PathBuf>,
    pub url_prefix: Option<String>,
    pub dry_run: bool,
}

/// Fully resolved settings for one migration run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub docs_root: PathBuf,
    pub attachments_root: PathBuf,
    pub images_dir: PathBuf,
    pub url_prefix: String,
    pub dry_run: bool,
}

impl Settings {
    /// Merge overrides, config file and defaults. Relative paths are joined
    /// onto `base_dir`.
    pub fn resolve(overrides: SettingsOverrides, config: &WikimgConfig, base_dir: &Path) -> Self {
        let paths = config.paths.clone().unwrap_or_default();
        let links = config.links.clone().unwrap_or_default();

        let pick = |flag: Option<PathBuf>, file: Option<PathBuf>, default: &str| {
            let path = flag.or(file).unwrap_or_else(|| PathBuf::from(default));
            base_dir.join(path)
        };

        Self {
            docs_root: pick(overrides.docs_root, paths.docs_root, DEFAULT_DOCS_ROOT),
            attachments_root: pick(
                overrides.attachments_root,
                paths.attachments_root,
                DEFAULT_ATTACHMENTS_ROOT,
            ),
            images_dir: pick(overrides.images_dir, paths.images_dir, DEFAULT_IMAGES_DIR),
            url_prefix: overrides
                .url_prefix
                .or(links.url_prefix)
                .unwrap_or_else(|| DEFAULT_URL_PREFIX.to_string()),
            dry_run: overrides.dry_run,
        }
    }

    /// Check that both input trees exist.
    pub fn validate(&self) -> Result<(), MigrateError> {
        if !self.docs_root.is_dir() {
            return Err(MigrateError::MissingRoot {
                role: "documents",
                path: self.docs_root.clone(),
            });
        }
        if !self.attachments_root.is_dir() {
            return Err(MigrateError::MissingRoot {
                role: "attachments",
                path: self.attachments_root.clone(),
            });
        }
        Ok(())
    }
}
