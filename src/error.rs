//! Error types for tfsculpt.
//!
//! This module defines the error hierarchy using `thiserror`. All errors
//! carry source-location context and propagate with the `?` operator.
//!
//! # Error Categories
//!
//! - **I/O errors**: file system operations on the input/output trees
//! - **Structural errors**: unterminated blocks, malformed hierarchies,
//!   overlapping edit sets
//! - **Config errors**: invalid configuration files or values
//!
//! Absent blocks and fields are *not* errors: the engine returns `Option`
//! for those, and callers branch on it. Errors here are reserved for
//! malformed input and caller contract violations.

use std::path::PathBuf;
use thiserror::Error;

/// Macro to create errors with automatic source location tracking.
///
/// Usage:
/// ```ignore
/// return Err(err!(ConfigValue { key: "split.depth".to_string(), message: "..".to_string() }));
/// ```
#[macro_export]
macro_rules! err {
    ($variant:ident { $($field:ident: $value:expr),* $(,)? }) => {
        $crate::error::TfSculptError::$variant {
            $($field: $value,)*
            src_path: file!(),
            src_line: line!(),
        }
    };
}

/// A specialized Result type for tfsculpt operations.
pub type Result<T> = std::result::Result<T, TfSculptError>;

/// The main error type for tfsculpt.
#[derive(Error, Debug)]
pub enum TfSculptError {
    // =========================================================================
    // I/O and File System Errors
    // =========================================================================
    /// I/O error with path context.
    #[error("I/O error at '{path}' ({src_path}:{src_line}): {source}")]
    Io {
        /// The path where the error occurred
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
        /// Source file path
        src_path: &'static str,
        /// Source line number
        src_line: u32,
    },

    /// File not found.
    #[error("File not found: {path} ({src_path}:{src_line})")]
    FileNotFound {
        /// The missing file path
        path: PathBuf,
        /// Source file path
        src_path: &'static str,
        /// Source line number
        src_line: u32,
    },

    /// Directory not found.
    #[error("Directory not found: {path} ({src_path}:{src_line})")]
    DirectoryNotFound {
        /// The missing directory path
        path: PathBuf,
        /// Source file path
        src_path: &'static str,
        /// Source line number
        src_line: u32,
    },

    // =========================================================================
    // Structural Errors
    // =========================================================================
    /// A block's braces never balance before end of input.
    #[error("Unterminated block '{label}' at offset {offset} ({src_path}:{src_line})")]
    UnterminatedBlock {
        /// Label of the truncated block
        label: String,
        /// Offset of the block header in the buffer
        offset: usize,
        /// Source file path
        src_path: &'static str,
        /// Source line number
        src_line: u32,
    },

    /// A child reference forms a cycle or re-parents an existing node.
    #[error("Malformed hierarchy at '{name}' ({src_path}:{src_line}): {message}")]
    MalformedHierarchy {
        /// The offending node name
        name: String,
        /// Description of the violation
        message: String,
        /// Source file path
        src_path: &'static str,
        /// Source line number
        src_line: u32,
    },

    /// Two edits in one set cover overlapping spans.
    #[error("Overlapping edits {first} and {second} ({src_path}:{src_line})")]
    OverlappingEdits {
        /// The earlier span, as `start..end`
        first: String,
        /// The overlapping span, as `start..end`
        second: String,
        /// Source file path
        src_path: &'static str,
        /// Source line number
        src_line: u32,
    },

    /// Invalid block header pattern.
    #[error("Invalid header pattern '{pattern}' ({src_path}:{src_line}): {message}")]
    Pattern {
        /// The pattern that failed to compile
        pattern: String,
        /// Error message
        message: String,
        /// Source file path
        src_path: &'static str,
        /// Source line number
        src_line: u32,
    },

    // =========================================================================
    // Configuration Errors
    // =========================================================================
    /// Configuration parsing error.
    #[error("Failed to parse configuration ({src_path}:{src_line}): {message}")]
    ConfigParse {
        /// Error message
        message: String,
        /// The underlying error (if any)
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
        /// Source file path
        src_path: &'static str,
        /// Source line number
        src_line: u32,
    },

    /// Invalid configuration value.
    #[error("Invalid configuration value for '{key}' ({src_path}:{src_line}): {message}")]
    ConfigValue {
        /// The configuration key
        key: String,
        /// Error message
        message: String,
        /// Source file path
        src_path: &'static str,
        /// Source line number
        src_line: u32,
    },

    // =========================================================================
    // Generic Errors
    // =========================================================================
    /// Internal error (should not happen in normal operation).
    #[error("Internal error ({src_path}:{src_line}): {message}")]
    Internal {
        /// Error message
        message: String,
        /// Source file path
        src_path: &'static str,
        /// Source line number
        src_line: u32,
    },

    /// Multiple errors occurred.
    #[error("Multiple errors occurred ({count} total)")]
    Multiple {
        /// Number of errors
        count: usize,
        /// The individual errors
        errors: Vec<TfSculptError>,
    },
}

impl TfSculptError {
    /// Creates an `Io` error.
    #[must_use]
    pub fn io(
        path: impl Into<PathBuf>,
        source: std::io::Error,
        src_path: &'static str,
        src_line: u32,
    ) -> Self {
        Self::Io {
            path: path.into(),
            source,
            src_path,
            src_line,
        }
    }

    /// Creates an `Internal` error.
    #[must_use]
    pub fn internal(message: String, src_path: &'static str, src_line: u32) -> Self {
        Self::Internal {
            message,
            src_path,
            src_line,
        }
    }

    /// Whether the pipeline should continue with the next independent pass
    /// after this error. Structural problems in one file are recoverable;
    /// caller contract violations and I/O failures are not.
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::FileNotFound { .. }
                | Self::UnterminatedBlock { .. }
                | Self::MalformedHierarchy { .. }
                | Self::Pattern { .. }
        )
    }

    /// Returns the appropriate exit code for the error.
    #[must_use]
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Io { source, .. } if source.kind() == std::io::ErrorKind::PermissionDenied => 13,
            Self::FileNotFound { .. } => 14,
            Self::DirectoryNotFound { .. } => 15,
            Self::ConfigParse { .. } => 18,
            Self::ConfigValue { .. } => 19,
            Self::MalformedHierarchy { .. } => 20,
            Self::Multiple { .. } => 21,
            _ => 1,
        }
    }

    /// Consolidates multiple errors into a single `Multiple` if there's
    /// more than one. Otherwise, returns the single error or `Ok(())`.
    pub fn collect(errors: Vec<Self>) -> Result<()> {
        if errors.is_empty() {
            Ok(())
        } else if errors.len() == 1 {
            Err(errors.into_iter().next().unwrap())
        } else {
            Err(Self::Multiple {
                count: errors.len(),
                errors,
            })
        }
    }
}

impl From<std::io::Error> for TfSculptError {
    fn from(source: std::io::Error) -> Self {
        // Used when a PathBuf is not readily available; prefer
        // TfSculptError::io(path, source, file!(), line!()) otherwise
        Self::Io {
            path: PathBuf::new(),
            source,
            src_path: file!(),
            src_line: line!(),
        }
    }
}

impl From<serde_json::Error> for TfSculptError {
    fn from(source: serde_json::Error) -> Self {
        Self::Internal {
            message: format!("JSON serialization/deserialization error: {}", source),
            src_path: file!(),
            src_line: line!(),
        }
    }
}

/// A utility for collecting multiple errors during a pipeline run.
#[derive(Debug, Default)]
pub struct ErrorCollector {
    errors: Vec<TfSculptError>,
}

impl ErrorCollector {
    /// Create a new error collector.
    #[must_use]
    pub fn new() -> Self {
        Self { errors: Vec::new() }
    }

    /// Add an error to the collection.
    pub fn add(&mut self, error: TfSculptError) {
        self.errors.push(error);
    }

    /// Get the number of collected errors.
    #[must_use]
    pub fn count(&self) -> usize {
        self.errors.len()
    }

    /// Check if there are any errors.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Convert to a Result, returning Multiple error if there are any errors.
    pub fn into_result(self) -> Result<()> {
        TfSculptError::collect(self.errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collect_empty() {
        assert!(TfSculptError::collect(vec![]).is_ok());
    }

    #[test]
    fn test_collect_single() {
        let errors = vec![crate::err!(Internal {
            message: "one".to_string(),
        })];
        assert!(matches!(
            TfSculptError::collect(errors),
            Err(TfSculptError::Internal { .. })
        ));
    }

    #[test]
    fn test_collect_multiple() {
        let errors = vec![
            crate::err!(Internal {
                message: "one".to_string(),
            }),
            crate::err!(Internal {
                message: "two".to_string(),
            }),
        ];
        match TfSculptError::collect(errors) {
            Err(TfSculptError::Multiple { count, .. }) => assert_eq!(count, 2),
            other => panic!("expected Multiple, got {other:?}"),
        }
    }

    #[test]
    fn test_recoverable_classification() {
        let unterminated = crate::err!(UnterminatedBlock {
            label: "rule_a".to_string(),
            offset: 0,
        });
        assert!(unterminated.is_recoverable());

        let overlapping = crate::err!(OverlappingEdits {
            first: "0..4".to_string(),
            second: "2..6".to_string(),
        });
        assert!(!overlapping.is_recoverable());
    }
}
