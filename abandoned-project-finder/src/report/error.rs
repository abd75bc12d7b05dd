//! Report error types.

use thiserror::Error;

/// Errors that can occur while writing or reading a report.
#[derive(Debug, Error)]
pub enum ReportError {
    /// The output file cannot be created, written or moved into place.
    #[error("Failed to write report '{path}': {source}")]
    OutputWrite {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// A row could not be encoded.
    #[error("Failed to encode report '{path}': {source}")]
    Encode {
        path: String,
        #[source]
        source: csv::Error,
    },

    /// A report could not be read back.
    #[error("Failed to read report '{path}': {source}")]
    Read {
        path: String,
        #[source]
        source: csv::Error,
    },
}
