//! Asset discovery and publishing
//!
//! Indexes the images under the attachments root, resolves wikilink targets
//! against that tree, and copies resolved images into the static images
//! directory.

use super::wikilink::{file_name, is_image_file_name};
use crate::errors::MigrateError;
use std::collections::{BTreeMap, HashSet};
use std::fs::{self, FileTimes};
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use walkdir::WalkDir;

/// Lowercase file name to every image path registered under that name.
///
/// Paths for one name are kept in walk order. Directory entries are visited
/// sorted by file name, so the first path for a name is stable across runs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssetIndex {
    entries: BTreeMap<String, Vec<PathBuf>>,
}

impl AssetIndex {
    /// Walk `root` recursively and register every image file.
    ///
    /// Any traversal error aborts the build.
    pub fn build(root: &Path) -> Result<Self, MigrateError> {
        let mut index = Self::default();

        for entry in WalkDir::new(root).sort_by_file_name() {
            let entry = entry.map_err(|source| MigrateError::Walk {
                root: root.to_path_buf(),
                source,
            })?;
            if !entry.path().is_file() {
                continue;
            }
            let name = entry.file_name().to_string_lossy();
            if is_image_file_name(&name) {
                index.insert(&name, entry.path().to_path_buf());
            }
        }

        debug!(
            "Indexed {} image name(s) under {}",
            index.len(),
            root.display()
        );
        Ok(index)
    }

    /// Register `path` under `name`, after any paths already registered.
    pub fn insert(&mut self, name: &str, path: PathBuf) {
        self.entries.entry(name.to_lowercase()).or_default().push(path);
    }

    /// First path registered for a file name, compared case-insensitively.
    pub fn lookup(&self, name: &str) -> Option<&Path> {
        self.candidates(name).first().map(PathBuf::as_path)
    }

    /// All paths registered for a file name, in walk order.
    pub fn candidates(&self, name: &str) -> &[PathBuf] {
        self.entries
            .get(&name.to_lowercase())
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Names registered more than once, with their paths.
    pub fn collisions(&self) -> impl Iterator<Item = (&str, &[PathBuf])> {
        self.entries
            .iter()
            .filter(|(_, paths)| paths.len() > 1)
            .map(|(name, paths)| (name.as_str(), paths.as_slice()))
    }

    /// Number of distinct names.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Resolves a wikilink target to an image on disk.
pub trait AssetLocator {
    /// Source path for `target`, or `None` when it cannot be found.
    fn locate(&self, target: &str) -> Option<PathBuf>;
}

/// The attachments tree: a root directory plus its [`AssetIndex`].
///
/// A target is first tried as a path relative to the root, then looked up by
/// file name anywhere in the tree.
#[derive(Debug, Clone)]
pub struct AttachmentStore {
    root: PathBuf,
    index: AssetIndex,
}

impl AttachmentStore {
    pub fn new(root: &Path, index: AssetIndex) -> Self {
        Self {
            root: root.to_path_buf(),
            index,
        }
    }

    /// Index `root` and wrap it.
    pub fn open(root: &Path) -> Result<Self, MigrateError> {
        let index = AssetIndex::build(root)?;
        Ok(Self::new(root, index))
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn index(&self) -> &AssetIndex {
        &self.index
    }
}

impl AssetLocator for AttachmentStore {
    fn locate(&self, target: &str) -> Option<PathBuf> {
        let direct = self.root.join(target);
        if direct.exists() {
            return Some(direct);
        }
        self.index.lookup(file_name(target)).map(Path::to_path_buf)
    }
}

/// What happened when an image was published.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Publish {
    /// The image was copied (or, in a dry run, would be) to this path
    Copied(PathBuf),
    /// A file with the same name was already in the images directory
    AlreadyPresent(PathBuf),
}

/// Copies resolved images into the static images directory.
///
/// Never overwrites: an existing destination file short-circuits the copy,
/// whatever its content. In a dry run nothing is written, but names already
/// planned count as present so the totals match a real run.
#[derive(Debug)]
pub struct AssetPublisher {
    images_dir: PathBuf,
    dry_run: bool,
    planned: HashSet<String>,
}

impl AssetPublisher {
    pub fn new(images_dir: &Path, dry_run: bool) -> Self {
        Self {
            images_dir: images_dir.to_path_buf(),
            dry_run,
            planned: HashSet::new(),
        }
    }

    /// Create the images directory and its parents unless this is a dry run.
    pub fn prepare(&self) -> Result<(), MigrateError> {
        if self.dry_run {
            return Ok(());
        }
        fs::create_dir_all(&self.images_dir).map_err(|source| MigrateError::CreateImagesDir {
            path: self.images_dir.clone(),
            source,
        })
    }

    /// Place `source` at `images_dir/file_name` unless something is already there.
    pub fn publish(&mut self, source: &Path, file_name: &str) -> Result<Publish, MigrateError> {
        let destination = self.images_dir.join(file_name);

        if destination.exists() || self.planned.contains(file_name) {
            debug!("{} already present", destination.display());
            return Ok(Publish::AlreadyPresent(destination));
        }

        if self.dry_run {
            self.planned.insert(file_name.to_string());
        } else {
            copy_with_metadata(source, &destination).map_err(|err| MigrateError::CopyAsset {
                from: source.to_path_buf(),
                to: destination.clone(),
                source: err,
            })?;
            info!("Copied {} -> {}", source.display(), destination.display());
        }

        Ok(Publish::Copied(destination))
    }
}

/// Copy file content and permissions, then carry over access and
/// modification times.
///
/// Times are set through a read-only handle: the copy inherits the source's
/// permissions and may not be writable.
fn copy_with_metadata(from: &Path, to: &Path) -> io::Result<()> {
    fs::copy(from, to)?;

    let metadata = fs::metadata(from)?;
    let mut times = FileTimes::new();
    if let Ok(modified) = metadata.modified() {
        times = times.set_modified(modified);
    }
    if let Ok(accessed) = metadata.accessed() {
        times = times.set_accessed(accessed);
    }
    fs::File::open(to)?.set_times(times)
}
