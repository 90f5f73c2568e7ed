//! Error types and result alias for trend conversions.
//!
//! Every variant is terminal for a conversion run. Messages are single-line
//! and name the offending path or value.

use std::io;
use std::path::PathBuf;

/// The result type used throughout the crate.
pub type Result<T> = std::result::Result<T, ConvertError>;

/// Errors that can stop a conversion run.
#[derive(Debug, thiserror::Error)]
pub enum ConvertError {
    /// No input path was given.
    #[error("Input file not specified!")]
    InputNotSpecified,

    /// The input path does not exist.
    #[error("Input file not found: {}", .0.display())]
    InputNotFound(PathBuf),

    /// The input exists but could not be read.
    #[error("Input file could not be read: {}", .path.display())]
    InputUnreadable {
        /// Path that failed to read.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: io::Error,
    },

    /// The input file has no content.
    #[error("Input file is empty: {}", .0.display())]
    InputEmpty(PathBuf),

    /// The input file is not parseable JSON.
    #[error("Input file does not contain valid JSON: {}", .path.display())]
    InputNotValidJson {
        /// Path of the offending file.
        path: PathBuf,
        /// Parser failure.
        #[source]
        source: serde_json::Error,
    },

    /// No output path was given.
    #[error("Output file not specified!")]
    OutputNotSpecified,

    /// The field delimiter is neither `,` nor `;`.
    #[error("Only \",\" and \";\" are supported as field delimiters, got {0:?}")]
    UnsupportedDelimiter(String),

    /// The record delimiter is neither the escaped `\r\n` nor `\n`.
    #[error("Only \"\\r\\n\" and \"\\n\" are supported as record delimiters, got {0:?}")]
    UnsupportedRecordDelimiter(String),

    /// The encoding name is not one the writer knows.
    #[error("Unsupported encoding {0:?} (utf-8, ascii, base64, base64url, ucs2, utf16le, latin1)")]
    UnsupportedEncoding(String),

    /// The JSON document does not have the trend export shape.
    #[error("Malformed input structure: {0}")]
    MalformedInput(String),

    /// Two series in one document share a name.
    #[error("Duplicate metric name in input: {0:?}")]
    DuplicateMetricName(String),

    /// Writing the CSV file failed.
    #[error("Writing CSV failed: {}", .path.display())]
    WriteFailure {
        /// Destination that could not be written.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: io::Error,
    },

    /// The output directory of the watcher could not be created.
    #[error("Output directory could not be created: {}", .path.display())]
    OutputDirectory {
        /// Directory that could not be created.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: io::Error,
    },

    /// The file-system watcher failed.
    #[error("Watching {} failed", .path.display())]
    Watch {
        /// Directory being watched.
        path: PathBuf,
        /// Watcher failure.
        #[source]
        source: notify::Error,
    },
}

impl ConvertError {
    /// Builds a [`ConvertError::MalformedInput`] from any message.
    #[must_use]
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedInput(message.into())
    }

    /// Whether usage help should accompany this diagnostic.
    #[must_use]
    pub fn wants_usage(&self) -> bool {
        matches!(self, Self::InputNotSpecified | Self::OutputNotSpecified)
    }
}
