//! Output destinations for streaming writes
//!
//! `DataSink` is the write counterpart to `DataSource`.
//!
//! # Example
//!
//! ```no_run
//! use fastqual::io::DataSink;
//!
//! // Write to local file (gzip, from the extension)
//! let sink = DataSink::from_path("output.fq.gz");
//!
//! // Write to stdout
//! let sink = DataSink::stdout();
//! ```

use std::path::{Path, PathBuf};

/// Output destination for streaming writes
#[derive(Debug, Clone)]
pub enum DataSink {
    /// Write to a local file path
    ///
    /// Compression is chosen from the extension:
    /// - `.gz`, `.bgz`, `.gzip` → gzip
    /// - other → uncompressed
    Local(PathBuf),

    /// Write to standard output, always uncompressed
    Stdout,
}

impl DataSink {
    /// Create a sink from a file path
    pub fn from_path<P: AsRef<Path>>(path: P) -> Self {
        Self::Local(path.as_ref().to_path_buf())
    }

    /// Create a sink for standard output
    pub fn stdout() -> Self {
        Self::Stdout
    }

    /// Get the file extension if this is a local file sink
    pub(crate) fn extension(&self) -> Option<&str> {
        match self {
            Self::Local(path) => path.extension().and_then(|s| s.to_str()),
            Self::Stdout => None,
        }
    }

    /// Check if this sink represents a compressed output
    pub fn is_compressed(&self) -> bool {
        matches!(self.extension(), Some("gz") | Some("bgz") | Some("gzip"))
    }
}
