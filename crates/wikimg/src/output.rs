//! Structured output formatting for the CLI.
//!
//! Human output goes through [`OutputContext`], machine output through the
//! [`JsonOutput`] / [`JsonError`] envelopes. Exit codes live here too.

use chrono::Utc;
use serde::{Serialize, Serializer};
use similar::{ChangeTag, TextDiff};
use std::fmt::Display;
use std::io::{self, Write};
use std::path::Path;

use crate::errors::{explain, MigrateError};

/// Version of the JSON output format
const OUTPUT_VERSION: &str = "0.1.0";

// ============================================================================
// Output Context
// ============================================================================

/// Context for choosing between human and JSON output
///
/// `--quiet` only lowers the log level; the report itself is essential output.
pub struct OutputContext {
    json: bool,
}

impl OutputContext {
    pub fn new(json: bool) -> Self {
        Self { json }
    }

    /// Print essential output (always shown unless --json)
    pub fn print_data(&self, msg: impl Display) -> io::Result<()> {
        if !self.json {
            write_safe(&format!("{}", msg))
        } else {
            Ok(())
        }
    }

    /// Print error (always shown to stderr)
    pub fn print_error(&self, msg: impl Display) -> io::Result<()> {
        writeln_safe_stderr(&format!("Error: {}", msg))
    }

    pub fn is_json(&self) -> bool {
        self.json
    }
}

/// Safe print that handles broken pipes gracefully
fn write_safe(msg: &str) -> io::Result<()> {
    match write!(io::stdout(), "{}", msg) {
        Ok(_) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::BrokenPipe => {
            // Expected when piping to head, etc.
            std::process::exit(0);
        }
        Err(e) => Err(e),
    }
}

/// Safe eprintln that handles broken pipes gracefully
fn writeln_safe_stderr(msg: &str) -> io::Result<()> {
    match writeln!(io::stderr(), "{}", msg) {
        Ok(_) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::BrokenPipe => {
            std::process::exit(0);
        }
        Err(e) => Err(e),
    }
}

/// Unified line diff of a document change.
pub fn format_diff(path: &Path, before: &str, after: &str) -> String {
    let mut out = format!("--- a/{}\n+++ b/{}\n", path.display(), path.display());
    let diff = TextDiff::from_lines(before, after);

    for change in diff.iter_all_changes() {
        let sign = match change.tag() {
            ChangeTag::Delete => "-",
            ChangeTag::Insert => "+",
            ChangeTag::Equal => " ",
        };
        out.push_str(sign);
        out.push_str(change.value());
        if change.missing_newline() {
            out.push('\n');
        }
    }
    out
}

// ============================================================================
// JSON Output Types
// ============================================================================

/// Wrapper for successful command output with metadata
#[derive(Debug, Serialize)]
pub struct JsonOutput<T: Serialize> {
    pub success: bool,
    pub data: T,
    pub metadata: Metadata,
}

impl<T: Serialize> JsonOutput<T> {
    pub fn success(data: T, command: impl Into<String>) -> Self {
        Self {
            success: true,
            data,
            metadata: Metadata::new(command),
        }
    }

    /// Serialize to JSON string with pretty formatting
    pub fn to_json_string(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

/// Wrapper for error output with suggestions
#[derive(Debug, Serialize)]
pub struct JsonError {
    pub success: bool,
    pub error: ErrorDetail,
    pub metadata: Metadata,
}

impl JsonError {
    pub fn new(
        code: impl Into<String>,
        message: impl Into<String>,
        command: impl Into<String>,
    ) -> Self {
        Self {
            success: false,
            error: ErrorDetail {
                code: code.into(),
                message: message.into(),
                suggestions: Vec::new(),
            },
            metadata: Metadata::new(command),
        }
    }

    /// Build an error envelope from a migration failure, carrying its fixes.
    pub fn from_migrate_error(error: &MigrateError, command: impl Into<String>) -> Self {
        let explained = explain(error);
        Self::new(ErrorCode::for_error(error), error.to_string(), command)
            .with_suggestions(explained.remedies().to_vec())
    }

    /// Add multiple suggestions to the error
    pub fn with_suggestions(mut self, suggestions: Vec<String>) -> Self {
        self.error.suggestions.extend(suggestions);
        self
    }

    /// Serialize to JSON string with pretty formatting
    pub fn to_json_string(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

/// Error details including code, message, and suggestions
#[derive(Debug, Serialize)]
pub struct ErrorDetail {
    /// Error code (e.g., "MISSING_ROOT", "IO_ERROR")
    pub code: String,
    /// Human-readable error message
    pub message: String,
    /// Suggested actions to resolve the error
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub suggestions: Vec<String>,
}

/// Response metadata
#[derive(Debug, Serialize)]
pub struct Metadata {
    /// Timestamp when the response was generated
    #[serde(serialize_with = "serialize_timestamp")]
    pub timestamp: chrono::DateTime<Utc>,
    /// Version of the output format
    pub version: String,
    /// Command that generated this response
    pub command: String,
}

impl Metadata {
    fn new(command: impl Into<String>) -> Self {
        Self {
            timestamp: Utc::now(),
            version: OUTPUT_VERSION.to_string(),
            command: command.into(),
        }
    }
}

/// Serialize timestamp in ISO 8601 format
fn serialize_timestamp<S>(dt: &chrono::DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&dt.to_rfc3339())
}

// ============================================================================
// Exit Codes
// ============================================================================

/// Exit codes for the wikimg CLI
///
/// ```rust
/// use wikimg::ExitCode;
///
/// assert_eq!(ExitCode::Success.code(), 0);
/// assert_eq!(ExitCode::UnresolvedReferences.code(), 4);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ExitCode {
    /// Run completed (0)
    Success = 0,

    /// Generic error (1)
    GenericError = 1,

    /// Invalid arguments or configuration (2)
    InvalidArgument = 2,

    /// Documents or attachments directory not found (3)
    NotFound = 3,

    /// Unresolved references with --fail-on-missing (4)
    UnresolvedReferences = 4,

    /// Permission denied (5)
    PermissionDenied = 5,

    /// File system failure (10)
    ExternalError = 10,
}

impl ExitCode {
    /// Convert exit code to i32 for `std::process::exit`
    pub fn code(self) -> i32 {
        self as i32
    }

    /// Exit code for a migration failure.
    pub fn for_error(error: &MigrateError) -> Self {
        ErrorCode::to_exit_code(ErrorCode::for_error(error))
    }
}

// ============================================================================
// Error Codes (String constants for JSON responses)
// ============================================================================

/// Standard error codes (JSON format)
pub struct ErrorCode;

impl ErrorCode {
    pub const MISSING_ROOT: &'static str = "MISSING_ROOT";
    pub const INVALID_CONFIG: &'static str = "INVALID_CONFIG";
    pub const PERMISSION_DENIED: &'static str = "PERMISSION_DENIED";
    pub const UNRESOLVED_REFERENCES: &'static str = "UNRESOLVED_REFERENCES";
    pub const IO_ERROR: &'static str = "IO_ERROR";

    pub fn for_error(error: &MigrateError) -> &'static str {
        match error {
            MigrateError::MissingRoot { .. } => Self::MISSING_ROOT,
            MigrateError::ParseConfig { .. } => Self::INVALID_CONFIG,
            _ => match error.io_error().map(io::Error::kind) {
                Some(io::ErrorKind::PermissionDenied) => Self::PERMISSION_DENIED,
                _ => Self::IO_ERROR,
            },
        }
    }

    pub fn to_exit_code(code: &str) -> ExitCode {
        match code {
            Self::MISSING_ROOT => ExitCode::NotFound,
            Self::INVALID_CONFIG => ExitCode::InvalidArgument,
            Self::UNRESOLVED_REFERENCES => ExitCode::UnresolvedReferences,
            Self::PERMISSION_DENIED => ExitCode::PermissionDenied,
            Self::IO_ERROR => ExitCode::ExternalError,
            _ => ExitCode::GenericError,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_json_output_envelope() {
        let output = JsonOutput::success(serde_json::json!({"files_changed": 2}), "migrate");
        let json: serde_json::Value =
            serde_json::from_str(&output.to_json_string().unwrap()).unwrap();
        assert_eq!(json["success"], true);
        assert_eq!(json["data"]["files_changed"], 2);
        assert_eq!(json["metadata"]["command"], "migrate");
        assert_eq!(json["metadata"]["version"], OUTPUT_VERSION);
    }

    #[test]
    fn test_json_error_from_missing_root() {
        let error = MigrateError::MissingRoot {
            role: "documents",
            path: PathBuf::from("content"),
        };
        let json_error = JsonError::from_migrate_error(&error, "migrate");
        assert_eq!(json_error.error.code, ErrorCode::MISSING_ROOT);
        assert_eq!(
            ErrorCode::to_exit_code(&json_error.error.code),
            ExitCode::NotFound
        );
        assert!(json_error
            .error
            .suggestions
            .iter()
            .any(|s| s.contains("--docs")));
    }

    #[test]
    fn test_exit_code_for_io_errors() {
        let denied = MigrateError::WriteDocument {
            path: PathBuf::from("a.md"),
            source: io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
        };
        assert_eq!(ExitCode::for_error(&denied), ExitCode::PermissionDenied);

        let full = MigrateError::CopyAsset {
            from: PathBuf::from("a.png"),
            to: PathBuf::from("b.png"),
            source: io::Error::new(io::ErrorKind::Other, "disk full"),
        };
        assert_eq!(ExitCode::for_error(&full), ExitCode::ExternalError);
    }

    #[test]
    fn test_unknown_error_code_is_generic() {
        assert_eq!(ErrorCode::to_exit_code("SOMETHING"), ExitCode::GenericError);
    }

    #[test]
    fn test_format_diff_marks_changed_lines() {
        let diff = format_diff(
            Path::new("posts/a.md"),
            "# Title\n![[a.png]]\n",
            "# Title\n![a](images/a.png)\n",
        );
        assert!(diff.starts_with("--- a/posts/a.md\n+++ b/posts/a.md\n"));
        assert!(diff.contains(" # Title\n"));
        assert!(diff.contains("-![[a.png]]\n"));
        assert!(diff.contains("+![a](images/a.png)\n"));
    }
}
