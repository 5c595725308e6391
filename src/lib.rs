//! Convert VASP XDATCAR trajectories into Materials Studio arc archives.
//!
//! ```no_run
//! let timestamp = xdatarc::timestamp_now();
//! let nframes = xdatarc::convert("XDATCAR", "XDATCAR.arc", &timestamp)?;
//! println!("converted {nframes} frames");
//! # Ok::<(), xdatarc::Error>(())
//! ```
use std::path::Path;

use glam::DVec3;
use log::info;

pub use crate::arc::{ArcDocument, LabelCounter, LabelNumbering};
pub use crate::error::{DegenerateLattice, Error, Result};
pub use crate::lattice::{CellParameters, Lattice};
pub use crate::reader::{CellBlock, XdatcarReader};

pub mod arc;
mod error;
pub mod lattice;
pub mod reader;

/// Format of the `!DATE` stamp in an arc archive, e.g. `Mon Oct 19 12:00:00 2026`.
pub const TIMESTAMP_FORMAT: &str = "%a %b %d %H:%M:%S %Y";

/// A single configuration of the trajectory, in Cartesian coordinates.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Frame {
    /// Zero-based position among the frames that could be read.
    pub index: usize,
    pub lattice: Lattice,
    /// Positions wrapped into the cell, one for every atom.
    pub positions: Vec<DVec3>,
}

impl Frame {
    pub fn coords(&self) -> impl Iterator<Item = DVec3> + '_ {
        self.positions.iter().copied()
    }
}

/// The element species of a trajectory and the number of atoms of each, in file order.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Composition {
    species: Vec<(String, usize)>,
    total_atoms: usize,
}

impl Composition {
    /// Pairs up symbols and counts. Surplus entries on either side are dropped from the
    /// species, but every count still adds to [`Composition::total_atoms`].
    ///
    /// Returns [`None`] if the counts add up to more than `usize::MAX`.
    pub fn new(symbols: Vec<String>, counts: Vec<usize>) -> Option<Self> {
        let total_atoms = counts
            .iter()
            .try_fold(0usize, |total, &count| total.checked_add(count))?;
        Some(Self {
            species: symbols.into_iter().zip(counts).collect(),
            total_atoms,
        })
    }

    /// Names the species `A`, `B`, `C` and onwards, for files without a symbol line.
    pub fn with_placeholders(counts: Vec<usize>) -> Option<Self> {
        let symbols = (0..counts.len())
            .map(|idx| {
                u32::try_from(idx)
                    .ok()
                    .and_then(|idx| char::from_u32(u32::from(b'A') + idx))
                    .unwrap_or(char::REPLACEMENT_CHARACTER)
                    .to_string()
            })
            .collect();
        Self::new(symbols, counts)
    }

    pub fn species(&self) -> &[(String, usize)] {
        &self.species
    }

    /// The sum of all atom counts, which is the number of coordinate lines in a frame.
    pub fn total_atoms(&self) -> usize {
        self.total_atoms
    }

    /// Expands the composition into one symbol per atom.
    ///
    /// Atoms counted without a matching symbol have no entry, so the table is shorter than
    /// [`Composition::total_atoms`] in that case.
    pub fn symbols(&self) -> Vec<String> {
        self.species
            .iter()
            .flat_map(|(symbol, count)| std::iter::repeat(symbol).take(*count).cloned())
            .collect()
    }
}

/// The header of an XDATCAR file.
#[derive(Debug, Clone, PartialEq)]
pub struct Header {
    pub title: String,
    /// The lattice, with the scale factor already applied.
    pub lattice: Lattice,
    pub composition: Composition,
    /// Index of the first non-empty line after the header.
    pub offset: usize,
}

/// Whether the lattice stays the same for all frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellMode {
    /// All frames share the lattice from the header.
    Fixed,
    /// Every frame starts with its own lattice block.
    Variable,
}

/// The current local time, formatted for the `!DATE` lines of an archive.
pub fn timestamp_now() -> String {
    chrono::Local::now().format(TIMESTAMP_FORMAT).to_string()
}

/// Converts the contents of an XDATCAR file into an arc archive.
///
/// Returns the archive text and the number of frames in it. Incomplete frames are skipped.
pub fn convert_str(content: &str, timestamp: &str) -> Result<(String, usize)> {
    let reader = XdatcarReader::new(content)?;
    let document = assemble(&reader, timestamp)?;
    let nframes = document.nframes();
    Ok((document.finish(), nframes))
}

/// Converts the XDATCAR file at `input` into an arc archive at `output`.
///
/// The output is written only once the whole archive has been assembled, so it is left
/// untouched if the conversion fails. Returns the number of frames that were written.
pub fn convert<P: AsRef<Path>, Q: AsRef<Path>>(
    input: P,
    output: Q,
    timestamp: &str,
) -> Result<usize> {
    let reader = XdatcarReader::open(&input)?;
    let nframes = assemble(&reader, timestamp)?.write(&output)?;
    info!(
        "wrote {nframes} of {} frames to '{}'",
        reader.frame_starts().len(),
        output.as_ref().display()
    );
    Ok(nframes)
}

fn assemble(reader: &XdatcarReader, timestamp: &str) -> Result<ArcDocument> {
    let mut document = ArcDocument::new(timestamp);
    for frame in reader.read_all_frames()?.iter() {
        document.push_frame(frame, reader.symbols())?;
    }
    Ok(document)
}
