//! Run summary: changed documents, copied images, unresolved references.

use schemars::JsonSchema;
use serde::Serialize;
use std::collections::BTreeSet;
use std::path::PathBuf;

/// Result of processing one document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocumentOutcome {
    pub path: PathBuf,
    /// Content differed after rewriting (and was written, unless dry run)
    pub changed: bool,
    /// Destinations copied for this document
    pub copied: Vec<PathBuf>,
    /// Unresolved targets, one per occurrence
    pub missing: Vec<String>,
}

/// Summary of a whole migration run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, JsonSchema)]
pub struct MigrationReport {
    /// Nothing was written to disk
    pub dry_run: bool,
    /// Destination directory for images
    pub images_dir: PathBuf,
    /// Number of Markdown documents examined
    pub documents_scanned: usize,
    /// Documents whose content changed, in walk order
    pub changed_files: Vec<PathBuf>,
    /// Images copied into the destination directory, in copy order
    pub copied_images: Vec<PathBuf>,
    /// Distinct unresolved wikilink targets, sorted
    pub missing: BTreeSet<String>,
}

impl MigrationReport {
    pub fn new(images_dir: PathBuf, dry_run: bool) -> Self {
        Self {
            dry_run,
            images_dir,
            ..Default::default()
        }
    }

    /// Fold one document's outcome into the totals.
    pub fn record(&mut self, outcome: DocumentOutcome) {
        self.documents_scanned += 1;
        if outcome.changed {
            self.changed_files.push(outcome.path);
        }
        self.copied_images.extend(outcome.copied);
        self.missing.extend(outcome.missing);
    }

    pub fn changed_count(&self) -> usize {
        self.changed_files.len()
    }

    pub fn copied_count(&self) -> usize {
        self.copied_images.len()
    }

    pub fn has_missing(&self) -> bool {
        !self.missing.is_empty()
    }

    /// Human-readable summary, one line per entry.
    pub fn render(&self) -> String {
        let mut out = String::new();
        if self.dry_run {
            out.push_str("Dry run: no files were written.\n");
            out.push_str(&format!(
                "Would update {} markdown files.\n",
                self.changed_count()
            ));
            out.push_str(&format!(
                "Would copy {} image(s) to {}.\n",
                self.copied_count(),
                self.images_dir.display()
            ));
        } else {
            out.push_str(&format!("Updated {} markdown files.\n", self.changed_count()));
            out.push_str(&format!(
                "Copied {} image(s) to {}.\n",
                self.copied_count(),
                self.images_dir.display()
            ));
        }

        if self.has_missing() {
            out.push_str("Images referenced but not found under attachments:\n");
            for target in &self.missing {
                out.push_str(&format!("  - {}\n", target));
            }
        }
        out
    }
}
