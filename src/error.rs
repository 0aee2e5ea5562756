//! Error types for everything around the timeline core.
//!
//! Reconstruction and aggregation are total functions and never fail. The
//! errors here come from the edges: reading traces, writing charts, and
//! loading configuration. The CLI converts them into `anyhow::Error` with
//! context and exits non-zero.

use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum TraceError {
    /// Trace file could not be read
    #[error("failed to read trace {}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Chart or report could not be written
    #[error("failed to write {}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Input contained no recognizable OMPT events
    #[error("no trace events found in {source_name}")]
    NoEvents { source_name: String },

    /// Config file exists (or was requested) but could not be read
    #[error("failed to read config {}", path.display())]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Config file is not valid TOML for our schema
    #[error("failed to parse config {}: {message}", path.display())]
    ConfigParse { path: PathBuf, message: String },

    /// Config parsed but holds unusable values
    #[error("invalid configuration: {message}")]
    InvalidConfig { message: String },
}
