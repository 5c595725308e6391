use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while converting an XDATCAR trajectory.
///
/// Only [`Error::FrameIncomplete`] is recovered from during a conversion. Every other variant
/// aborts the run before any output is written.
#[derive(Error, Debug)]
pub enum Error {
    /// The input could not be read, or the output could not be written.
    #[error("could not access '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The trajectory does not have the expected structure.
    ///
    /// `line` is the 1-based position among the non-empty lines, if the problem is tied to one.
    #[error("{}", format_error(*line, reason))]
    Format { line: Option<usize>, reason: String },

    /// A frame runs past the end of the file.
    #[error("frame {ordinal} is incomplete: needs {needed} lines, only {available} available")]
    FrameIncomplete {
        /// Position of the frame marker among all markers in the file.
        ordinal: usize,
        needed: usize,
        available: usize,
    },

    /// A lattice that cannot describe a cell, such as one with a zero-length vector.
    #[error("degenerate lattice in frame {frame}: {source}")]
    Geometry {
        frame: usize,
        #[source]
        source: DegenerateLattice,
    },
}

/// A lattice vector without a usable length.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("lattice vector {vector} has length {length}")]
pub struct DegenerateLattice {
    /// Name of the vector, `a`, `b` or `c`.
    pub vector: char,
    pub length: f64,
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub(crate) fn format(line: usize, reason: impl Into<String>) -> Self {
        Self::Format {
            line: Some(line + 1),
            reason: reason.into(),
        }
    }

    /// Returns `true` if a conversion may skip over this error and carry on.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::FrameIncomplete { .. })
    }
}

fn format_error(line: Option<usize>, reason: &str) -> String {
    match line {
        Some(line) => format!("malformed XDATCAR at line {line}: {reason}"),
        None => format!("malformed XDATCAR: {reason}"),
    }
}
