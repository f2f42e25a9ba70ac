//! The migration run: index attachments, rewrite every document, publish
//! the images they reference.

use crate::config::Settings;
use crate::document::{
    AdapterRegistry, AssetPublisher, AttachmentStore, DocFormatAdapter, LinkRewriter, Publish,
};
use crate::errors::MigrateError;
use crate::report::{DocumentOutcome, MigrationReport};
use std::fs;
use std::path::Path;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

/// A document whose content changed, handed to the change observer.
#[derive(Debug, Clone, Copy)]
pub struct DocumentChange<'a> {
    pub path: &'a Path,
    pub before: &'a str,
    pub after: &'a str,
}

/// Runs one migration over the configured trees.
///
/// The attachments index is built once, before any document is read, and is
/// not modified afterwards.
pub struct Migrator {
    settings: Settings,
    registry: AdapterRegistry,
}

impl Migrator {
    pub fn new(settings: Settings) -> Self {
        Self::with_registry(settings, AdapterRegistry::with_builtins())
    }

    pub fn with_registry(settings: Settings, registry: AdapterRegistry) -> Self {
        Self { settings, registry }
    }

    /// Run the migration.
    pub fn run(&self) -> Result<MigrationReport, MigrateError> {
        self.run_with(|_| {})
    }

    /// Run the migration, calling `on_change` for every document whose
    /// content changed, before it is written.
    pub fn run_with<F>(&self, mut on_change: F) -> Result<MigrationReport, MigrateError>
    where
        F: FnMut(DocumentChange<'_>),
    {
        let settings = &self.settings;
        let mut publisher = AssetPublisher::new(&settings.images_dir, settings.dry_run);
        publisher.prepare()?;

        let store = AttachmentStore::open(&settings.attachments_root)?;
        info!(
            "Indexed {} image name(s) under {}",
            store.index().len(),
            store.root().display()
        );
        for (name, paths) in store.index().collisions() {
            let candidates: Vec<String> = paths.iter().map(|p| p.display().to_string()).collect();
            warn!(
                "{} image(s) named '{}': {}; using {}",
                paths.len(),
                name,
                candidates.join(", "),
                candidates[0]
            );
        }

        let rewriter = LinkRewriter::new(&store, settings.url_prefix.as_str());
        let mut report = MigrationReport::new(settings.images_dir.clone(), settings.dry_run);

        for entry in WalkDir::new(&settings.docs_root).sort_by_file_name() {
            let entry = entry.map_err(|source| MigrateError::Walk {
                root: settings.docs_root.clone(),
                source,
            })?;
            // Follows symlinks, like the attachments walk
            if !entry.path().is_file() {
                continue;
            }
            let Some(adapter) = self.registry.resolve(entry.path()) else {
                continue;
            };

            let outcome = self.process_document(
                entry.path(),
                adapter,
                &rewriter,
                &mut publisher,
                &mut on_change,
            )?;
            report.record(outcome);
        }

        Ok(report)
    }

    fn process_document<F>(
        &self,
        path: &Path,
        adapter: &dyn DocFormatAdapter,
        rewriter: &LinkRewriter<'_, AttachmentStore>,
        publisher: &mut AssetPublisher,
        on_change: &mut F,
    ) -> Result<DocumentOutcome, MigrateError>
    where
        F: FnMut(DocumentChange<'_>),
    {
        let content = fs::read_to_string(path).map_err(|source| MigrateError::ReadDocument {
            path: path.to_path_buf(),
            source,
        })?;

        let rewrite = rewriter.rewrite(adapter, &content);

        let mut copied = Vec::new();
        for embed in &rewrite.resolved {
            let published = publisher.publish(&embed.source, &embed.file_name)?;
            if let Publish::Copied(destination) = published {
                copied.push(destination);
            }
        }

        let changed = rewrite.content != content;
        if changed {
            on_change(DocumentChange {
                path,
                before: &content,
                after: &rewrite.content,
            });
            if !self.settings.dry_run {
                fs::write(path, &rewrite.content).map_err(|source| {
                    MigrateError::WriteDocument {
                        path: path.to_path_buf(),
                        source,
                    }
                })?;
                info!("Rewrote {}", path.display());
            }
        } else {
            debug!("No changes in {}", path.display());
        }

        Ok(DocumentOutcome {
            path: path.to_path_buf(),
            changed,
            copied,
            missing: rewrite.missing,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn settings(root: &Path, dry_run: bool) -> Settings {
        Settings {
            docs_root: root.join("content"),
            attachments_root: root.join("vault"),
            images_dir: root.join("static/images"),
            url_prefix: "images".to_string(),
            dry_run,
        }
    }

    fn fixture() -> TempDir {
        let temp = TempDir::new().unwrap();
        fs::create_dir_all(temp.path().join("content/posts")).unwrap();
        fs::create_dir_all(temp.path().join("vault/pics")).unwrap();
        fs::write(temp.path().join("vault/pics/cat.png"), b"cat").unwrap();
        fs::write(
            temp.path().join("content/posts/a.md"),
            "![[cat.png]] and ![[dog.png]]\n",
        )
        .unwrap();
        fs::write(temp.path().join("content/posts/b.txt"), "![[cat.png]]").unwrap();
        temp
    }

    #[test]
    fn test_run_rewrites_and_copies() {
        let temp = fixture();
        let report = Migrator::new(settings(temp.path(), false)).run().unwrap();

        assert_eq!(report.documents_scanned, 1);
        assert_eq!(report.changed_count(), 1);
        assert_eq!(report.copied_count(), 1);
        assert!(report.missing.contains("dog.png"));
        assert_eq!(
            fs::read_to_string(temp.path().join("content/posts/a.md")).unwrap(),
            "![cat](images/cat.png) and ![[dog.png]]\n"
        );
        assert_eq!(
            fs::read(temp.path().join("static/images/cat.png")).unwrap(),
            b"cat"
        );
        // Non-Markdown files are left alone
        assert_eq!(
            fs::read_to_string(temp.path().join("content/posts/b.txt")).unwrap(),
            "![[cat.png]]"
        );
    }

    #[test]
    fn test_dry_run_writes_nothing() {
        let temp = fixture();
        let mut changes = Vec::new();
        let report = Migrator::new(settings(temp.path(), true))
            .run_with(|change| changes.push(change.after.to_string()))
            .unwrap();

        assert!(report.dry_run);
        assert_eq!(report.changed_count(), 1);
        assert_eq!(report.copied_count(), 1);
        assert_eq!(changes, vec!["![cat](images/cat.png) and ![[dog.png]]\n"]);
        assert!(!temp.path().join("static").exists());
        assert_eq!(
            fs::read_to_string(temp.path().join("content/posts/a.md")).unwrap(),
            "![[cat.png]] and ![[dog.png]]\n"
        );
    }

    #[test]
    fn test_unreadable_document_aborts() {
        let temp = fixture();
        fs::write(temp.path().join("content/bad.md"), [0xff, 0xfe, 0x00]).unwrap();

        let result = Migrator::new(settings(temp.path(), false)).run();
        assert!(matches!(result, Err(MigrateError::ReadDocument { .. })));
    }

    #[test]
    fn test_missing_attachments_root_aborts() {
        let temp = fixture();
        fs::remove_dir_all(temp.path().join("vault")).unwrap();

        let result = Migrator::new(settings(temp.path(), false)).run();
        assert!(matches!(result, Err(MigrateError::Walk { .. })));
    }
}
