//! Error types for the migration.
//!
//! `MigrateError` covers every hard failure the library can raise. Unresolved
//! wikilinks are not errors; they are collected in the report instead.
//!
//! `ActionableError` wraps a fatal error with possible causes and remediation
//! steps for display at the command line.

use std::fmt;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Hard failures that abort a migration run.
#[derive(Debug, Error)]
pub enum MigrateError {
    #[error("{role} directory not found: {}", .path.display())]
    MissingRoot { role: &'static str, path: PathBuf },

    #[error("Failed to walk {}: {source}", .root.display())]
    Walk {
        root: PathBuf,
        #[source]
        source: walkdir::Error,
    },

    #[error("Failed to read document {}: {source}", .path.display())]
    ReadDocument {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to write document {}: {source}", .path.display())]
    WriteDocument {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to create images directory {}: {source}", .path.display())]
    CreateImagesDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to copy {} to {}: {source}", .from.display(), .to.display())]
    CopyAsset {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to read config {}: {source}", .path.display())]
    ReadConfig {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Invalid config {}: {source}", .path.display())]
    ParseConfig {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

impl MigrateError {
    /// The underlying I/O error, if this failure came from the filesystem.
    pub fn io_error(&self) -> Option<&io::Error> {
        match self {
            MigrateError::ReadDocument { source, .. }
            | MigrateError::WriteDocument { source, .. }
            | MigrateError::CreateImagesDir { source, .. }
            | MigrateError::CopyAsset { source, .. }
            | MigrateError::ReadConfig { source, .. } => Some(source),
            MigrateError::Walk { source, .. } => source.io_error(),
            MigrateError::MissingRoot { .. } | MigrateError::ParseConfig { .. } => None,
        }
    }
}

/// An error with diagnostic context and remediation steps.
///
/// # Example
///
/// ```
/// use wikimg::errors::ActionableError;
///
/// let error = ActionableError::new("attachments directory not found: vault/attachments")
///     .with_cause("The vault may live somewhere else")
///     .with_remedy("Pass the vault attachments folder: wikimg --attachments <DIR>");
///
/// assert!(error.to_string().contains("To fix:"));
/// ```
#[derive(Debug, Clone)]
pub struct ActionableError {
    error: String,
    causes: Vec<String>,
    remediation: Vec<String>,
}

impl ActionableError {
    /// Create a new actionable error with the given message.
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            causes: Vec::new(),
            remediation: Vec::new(),
        }
    }

    /// Add a possible cause (diagnostic hint).
    pub fn with_cause(mut self, cause: impl Into<String>) -> Self {
        self.causes.push(cause.into());
        self
    }

    /// Add a remediation step (actionable fix).
    pub fn with_remedy(mut self, remedy: impl Into<String>) -> Self {
        self.remediation.push(remedy.into());
        self
    }

    pub fn remedies(&self) -> &[String] {
        &self.remediation
    }

    /// Convert to a formatted error message suitable for display.
    pub fn to_error_message(&self) -> String {
        let mut msg = format!("{}\n", self.error);

        if !self.causes.is_empty() {
            msg.push_str("\nPossible causes:\n");
            for cause in &self.causes {
                msg.push_str(&format!("  • {}\n", cause));
            }
        }

        if !self.remediation.is_empty() {
            msg.push_str("\nTo fix:\n");
            for remedy in &self.remediation {
                msg.push_str(&format!("  • {}\n", remedy));
            }
        }

        msg
    }
}

impl fmt::Display for ActionableError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_error_message())
    }
}

impl std::error::Error for ActionableError {}

/// Explain a `MigrateError` with causes and fixes where we know any.
pub fn explain(error: &MigrateError) -> ActionableError {
    match error {
        MigrateError::MissingRoot { role, path } => {
            let flag = match *role {
                "documents" => "--docs",
                "attachments" => "--attachments",
                _ => "--config",
            };
            ActionableError::new(error.to_string())
                .with_cause(format!(
                    "The {} path is relative to the current directory",
                    role
                ))
                .with_cause("The path may be misspelled in wikimg.toml")
                .with_remedy(format!(
                    "Pass the directory explicitly: wikimg {} <DIR>",
                    flag
                ))
                .with_remedy(format!("Check that {} exists", path.display()))
        }
        MigrateError::ParseConfig { path, .. } => ActionableError::new(error.to_string())
            .with_cause("Only [paths] and [links] sections are recognized")
            .with_remedy(format!("Fix or remove {}", path.display())),
        MigrateError::ReadDocument { .. } => ActionableError::new(error.to_string())
            .with_cause("The document may not be valid UTF-8")
            .with_cause("The file may not be readable by the current user")
            .with_remedy("Re-save the document as UTF-8 or move it out of the documents root"),
        _ => ActionableError::new(error.to_string()),
    }
}
