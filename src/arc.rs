//! Writing Materials Studio arc archives.
//!
//! An archive consists of two header lines followed by a block for every frame:
//!
//! ```text
//! !BIOSYM archive 3
//! PBC=ON
//! frame 0
//! !DATE Mon Oct 19 12:00:00 2026
//! PBC   10.00000  10.00000  10.00000  90.00000  90.00000  90.00000
//! Si1      5.000000000    5.000000000    5.000000000 XXXX 1      xx      Si  0.000
//! end
//! end
//! ```
use std::collections::HashMap;
use std::path::Path;

use glam::DVec3;

use crate::error::{Error, Result};
use crate::lattice::CellParameters;
use crate::Frame;

pub const HEADER: [&str; 2] = ["!BIOSYM archive 3", "PBC=ON"];

/// When the per-element atom label counters start over.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum LabelNumbering {
    /// Count once through the whole document.
    #[default]
    PerDocument,
    /// Start counting from 1 again at every frame.
    PerFrame,
}

/// Hands out atom labels like `Si1`, `Si2`, `O1` by counting the occurrences of each symbol.
#[derive(Debug, Default, Clone)]
pub struct LabelCounter {
    counts: HashMap<String, usize>,
}

impl LabelCounter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next_label(&mut self, symbol: &str) -> String {
        let count = self.counts.entry(symbol.to_string()).or_default();
        *count += 1;
        format!("{symbol}{count}")
    }

    pub fn reset(&mut self) {
        self.counts.clear();
    }
}

/// Renders the block for a single frame, including its two `end` lines.
pub fn render_frame(
    index: usize,
    timestamp: &str,
    params: &CellParameters,
    positions: &[DVec3],
    symbols: &[String],
    labels: &mut LabelCounter,
) -> Vec<String> {
    let mut block = Vec::with_capacity(positions.len() + 5);
    block.push(format!("frame {index}"));
    block.push(format!("!DATE {timestamp}"));
    block.push(format!(
        "PBC {:10.5}{:10.5}{:10.5}{:10.5}{:10.5}{:10.5}",
        params.a, params.b, params.c, params.alpha, params.beta, params.gamma
    ));
    for (pos, symbol) in positions.iter().zip(symbols) {
        block.push(format_atom(&labels.next_label(symbol), symbol, *pos));
    }
    block.push("end".to_string());
    block.push("end".to_string());
    block
}

/// Formats one atom record.
pub fn format_atom(label: &str, symbol: &str, pos: DVec3) -> String {
    format!(
        "{label:5}{:15.9}{:15.9}{:15.9} XXXX 1      xx      {symbol:>2}  0.000",
        pos.x, pos.y, pos.z
    )
}

/// An arc archive that is assembled in memory, frame by frame.
#[derive(Debug, Clone)]
pub struct ArcDocument {
    timestamp: String,
    numbering: LabelNumbering,
    labels: LabelCounter,
    lines: Vec<String>,
    nframes: usize,
}

impl ArcDocument {
    /// Creates an empty document. Every frame is stamped with the same `timestamp`.
    pub fn new(timestamp: impl Into<String>) -> Self {
        Self {
            timestamp: timestamp.into(),
            numbering: LabelNumbering::default(),
            labels: LabelCounter::new(),
            lines: HEADER.iter().map(|line| line.to_string()).collect(),
            nframes: 0,
        }
    }

    pub fn with_numbering(mut self, numbering: LabelNumbering) -> Self {
        self.numbering = numbering;
        self
    }

    /// The number of frames added so far. This is also the index of the next frame.
    pub fn nframes(&self) -> usize {
        self.nframes
    }

    /// Appends a frame under the next free index, ignoring the index stored in the frame.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Geometry`] if the lattice of the frame is degenerate. The document is
    /// left unchanged in that case.
    pub fn push_frame(&mut self, frame: &Frame, symbols: &[String]) -> Result<()> {
        let index = self.nframes;
        let params = frame
            .lattice
            .parameters()
            .map_err(|source| Error::Geometry {
                frame: index,
                source,
            })?;
        if self.numbering == LabelNumbering::PerFrame {
            self.labels.reset();
        }
        let block = render_frame(
            index,
            &self.timestamp,
            &params,
            &frame.positions,
            symbols,
            &mut self.labels,
        );
        self.lines.extend(block);
        self.nframes += 1;
        Ok(())
    }

    /// Joins the document into its final text.
    ///
    /// The last frame is followed by a single empty line.
    pub fn finish(mut self) -> String {
        if self.nframes > 0 {
            self.lines.push(String::new());
        }
        self.lines.join("\n")
    }

    /// Writes the finished document to `path` in one go and returns the number of frames.
    pub fn write<P: AsRef<Path>>(self, path: P) -> Result<usize> {
        let path = path.as_ref();
        let nframes = self.nframes;
        std::fs::write(path, self.finish()).map_err(|source| Error::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(nframes)
    }
}
