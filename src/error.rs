use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum PlyError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Not a PLY file. A dispatcher should try the next loader.
    #[error("Not a PLY file: {0}")]
    FormatMismatch(String),

    #[error("Invalid PLY header at line {line}: {reason}")]
    HeaderParse { line: usize, reason: String },

    #[error("PLY header ended before end_header")]
    HeaderTruncated,

    #[error("Malformed {element} record {index}: {reason}")]
    MalformedRecord {
        element: String,
        index: usize,
        reason: String,
    },

    #[error("Truncated binary {element} record {record_index} at byte offset {file_position}")]
    TruncatedBinaryRecord {
        element: String,
        record_index: usize,
        file_position: u64,
    },

    #[error("Data ended before {element} record {index}")]
    UnexpectedEndOfData { element: String, index: usize },

    #[error("Decoding cancelled at {element} record {index}")]
    Cancelled { element: String, index: usize },

    #[error("Vertex {vertex} has fewer than three scalar values for its position")]
    MissingPosition { vertex: usize },

    #[error("Face {face} references vertex {index}, but only {vertex_count} vertices exist")]
    FaceIndexOutOfRange {
        face: usize,
        index: usize,
        vertex_count: usize,
    },
}

impl PlyError {
    /// True when the input simply isn't PLY, as opposed to a broken PLY file.
    pub fn is_format_mismatch(&self) -> bool {
        matches!(self, PlyError::FormatMismatch(_))
    }

    pub(crate) fn header(line: usize, reason: impl Into<String>) -> Self {
        PlyError::HeaderParse {
            line,
            reason: reason.into(),
        }
    }
}

/// A fatal failure while loading a recognized PLY file from disk.
#[derive(Error, Debug)]
#[error("Failed to load {}: {source}", .path.display())]
pub struct LoadError {
    pub path: PathBuf,
    #[source]
    pub source: PlyError,
}
