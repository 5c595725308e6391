use std::path::Path;

use glam::DVec3;
use log::{debug, warn};

use crate::error::{Error, Result};
use crate::lattice::{wrap, Lattice};
use crate::{CellMode, Composition, Frame, Header};

/// The prefix of a line that starts a frame, compared case-insensitively.
pub const FRAME_MARKER: &str = "direct configuration";

/// A fully buffered XDATCAR trajectory.
///
/// Construction parses the header, locates the frames and determines the [`CellMode`]. The
/// frames themselves are parsed on demand with [`XdatcarReader::read_frame`] or all at once
/// with [`XdatcarReader::read_all_frames`].
#[derive(Debug, Clone)]
pub struct XdatcarReader {
    /// The non-empty lines of the file, trimmed.
    lines: Vec<String>,
    header: Header,
    symbols: Vec<String>,
    frame_starts: Vec<usize>,
    cell_mode: CellMode,
}

impl XdatcarReader {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| Error::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::new(&content)
    }

    pub fn new(content: &str) -> Result<Self> {
        let lines = significant_lines(content);
        let header = parse_header(&lines)?;
        let symbols = header.composition.symbols();
        let frame_starts = locate_frames(&lines)?;
        let natoms = header.composition.total_atoms();
        let cell_mode = detect_cell_mode(&frame_starts, natoms);
        debug!(
            "found {} frame markers for {natoms} atoms, {cell_mode:?} cell",
            frame_starts.len()
        );
        if symbols.len() < natoms {
            warn!(
                "{} of {natoms} atoms have no element symbol and are left out",
                natoms - symbols.len()
            );
        }

        Ok(Self {
            lines,
            header,
            symbols,
            frame_starts,
            cell_mode,
        })
    }

    pub fn header(&self) -> &Header {
        &self.header
    }

    /// The element symbol of every atom, in the order of the coordinate lines.
    ///
    /// Atoms whose count has no matching symbol in the header come last and have no entry.
    pub fn symbols(&self) -> &[String] {
        &self.symbols
    }

    /// The number of coordinate lines in every frame.
    pub fn natoms(&self) -> usize {
        self.header.composition.total_atoms()
    }

    /// Indices of the frame marker lines among the non-empty lines of the file.
    pub fn frame_starts(&self) -> &[usize] {
        &self.frame_starts
    }

    pub fn cell_mode(&self) -> CellMode {
        self.cell_mode
    }

    /// Parses the frame that starts at the marker with position `ordinal`.
    ///
    /// The returned frame has `ordinal` as its index. When frames are skipped, the caller is
    /// responsible for renumbering, as [`XdatcarReader::read_all_frames`] does.
    ///
    /// # Errors
    ///
    /// Returns [`Error::FrameIncomplete`] if the frame runs past the end of the file, and
    /// [`Error::Format`] if one of its lines cannot be parsed.
    ///
    /// # Panics
    ///
    /// Panics if `ordinal` is not smaller than the number of frame markers.
    pub fn read_frame(&self, ordinal: usize) -> Result<Frame> {
        let marker = self.frame_starts[ordinal];
        let natoms = self.natoms();
        let incomplete = |needed: usize| Error::FrameIncomplete {
            ordinal,
            needed,
            available: self.lines.len() - marker - 1,
        };

        let (lattice, coord_start) = match self.cell_mode {
            CellMode::Fixed => (self.header.lattice, marker + 1),
            CellMode::Variable => {
                // A cut-off cell block reports the smallest frame it could have been.
                let block = parse_cell_block(&self.lines, marker + 1)
                    .ok_or_else(|| incomplete(natoms + 3))??;
                let lattice = match block {
                    CellBlock::Scaled { scale, vectors } => {
                        Lattice::from_rows(vectors).scaled(scale)
                    }
                    CellBlock::Raw { vectors } => Lattice::from_rows(vectors),
                };
                (lattice, marker + 1 + block.line_count())
            }
        };

        let coord_end = coord_start + natoms;
        if coord_end > self.lines.len() {
            return Err(incomplete(coord_end - marker - 1));
        }

        let positions = self.lines[coord_start..coord_end]
            .iter()
            .enumerate()
            .map(|(offset, line)| {
                let frac = parse_triple(line, coord_start + offset)?;
                Ok(lattice.to_cartesian(wrap(DVec3::from_array(frac))))
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Frame {
            index: ordinal,
            lattice,
            positions,
        })
    }

    /// A convenience function to read all complete frames in the trajectory.
    ///
    /// Incomplete frames are skipped with a warning. The remaining frames are numbered
    /// contiguously from zero, so a skipped frame does not use up an index.
    pub fn read_all_frames(&self) -> Result<Box<[Frame]>> {
        let mut frames = Vec::with_capacity(self.frame_starts.len());
        for ordinal in 0..self.frame_starts.len() {
            match self.read_frame(ordinal) {
                Ok(mut frame) => {
                    frame.index = frames.len();
                    frames.push(frame);
                }
                Err(err) if err.is_recoverable() => {
                    warn!("skipping frame {ordinal}: {err}");
                }
                // Something else went wrong...
                Err(err) => return Err(err),
            }
        }
        Ok(frames.into_boxed_slice())
    }
}

/// The lattice block that follows a frame marker in a variable-cell trajectory.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CellBlock {
    /// A scale line followed by three lattice vectors that are to be multiplied by it.
    Scaled { scale: f64, vectors: [[f64; 3]; 3] },
    /// Three lattice vectors without a scale line.
    Raw { vectors: [[f64; 3]; 3] },
}

impl CellBlock {
    /// The number of lines this block occupies.
    pub fn line_count(&self) -> usize {
        match self {
            CellBlock::Scaled { .. } => 4,
            CellBlock::Raw { .. } => 3,
        }
    }
}

/// Returns the trimmed non-empty lines of `content`.
pub fn significant_lines(content: &str) -> Vec<String> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(String::from)
        .collect()
}

/// Parses the header of an XDATCAR file from its non-empty lines.
pub fn parse_header<S: AsRef<str>>(lines: &[S]) -> Result<Header> {
    if lines.len() < 6 {
        return Err(Error::Format {
            line: None,
            reason: format!("expected at least 6 header lines, found {}", lines.len()),
        });
    }
    let line = move |idx: usize| lines[idx].as_ref();

    let title = line(0).to_string();
    let scale = match line(1).split_whitespace().next() {
        Some(token) => parse_f64(token, 1)?,
        None => return Err(Error::format(1, "missing scale factor")),
    };
    let vectors = [
        parse_triple(line(2), 2)?,
        parse_triple(line(3), 3)?,
        parse_triple(line(4), 4)?,
    ];
    let lattice = Lattice::from_rows(vectors).scaled(scale);

    let has_symbols = line(5)
        .split_whitespace()
        .next()
        .is_some_and(|token| token.chars().all(char::is_alphabetic));
    let (symbols, counts_idx) = if has_symbols {
        if lines.len() < 7 {
            return Err(Error::format(5, "element symbols are not followed by atom counts"));
        }
        let symbols: Vec<String> = line(5).split_whitespace().map(String::from).collect();
        (Some(symbols), 6)
    } else {
        (None, 5)
    };

    let counts = line(counts_idx)
        .split_whitespace()
        .map(|token| {
            token.parse::<usize>().map_err(|_| {
                Error::format(counts_idx, format!("invalid atom count '{token}'"))
            })
        })
        .collect::<Result<Vec<_>>>()?;

    let composition = match symbols {
        Some(symbols) => Composition::new(symbols, counts),
        None => Composition::with_placeholders(counts),
    };
    // No frame of the file can hold more atoms than the file has lines.
    let composition = composition
        .filter(|composition| composition.total_atoms() <= lines.len())
        .ok_or_else(|| Error::format(counts_idx, "atom counts exceed the length of the file"))?;
    debug!(
        "header '{title}': {} atoms of {} species",
        composition.total_atoms(),
        composition.species().len()
    );

    Ok(Header {
        title,
        lattice,
        composition,
        offset: counts_idx + 1,
    })
}

/// Returns the indices of all frame marker lines.
pub fn locate_frames<S: AsRef<str>>(lines: &[S]) -> Result<Vec<usize>> {
    let starts: Vec<usize> = lines
        .iter()
        .enumerate()
        .filter(|(_, line)| is_frame_marker(line.as_ref()))
        .map(|(idx, _)| idx)
        .collect();
    if starts.is_empty() {
        return Err(Error::Format {
            line: None,
            reason: format!("no frames found (no line starts with '{FRAME_MARKER}')"),
        });
    }
    Ok(starts)
}

pub fn is_frame_marker(line: &str) -> bool {
    line.get(..FRAME_MARKER.len())
        .is_some_and(|prefix| prefix.eq_ignore_ascii_case(FRAME_MARKER))
}

/// Determines whether the lattice changes between frames.
///
/// In a fixed-cell trajectory the first two markers are exactly `natoms + 1` lines apart. A
/// single frame is always taken to have a fixed cell.
pub fn detect_cell_mode(frame_starts: &[usize], natoms: usize) -> CellMode {
    match frame_starts {
        [first, second, ..] if second - first != natoms + 1 => CellMode::Variable,
        _ => CellMode::Fixed,
    }
}

/// Parses the lattice block that starts at line `start`.
///
/// Returns [`None`] if the block would run past the end of `lines`.
pub fn parse_cell_block<S: AsRef<str>>(lines: &[S], start: usize) -> Option<Result<CellBlock>> {
    let first = lines.get(start)?.as_ref();
    let block = match first.parse::<f64>() {
        Ok(scale) => {
            let rows = lines.get(start + 1..start + 4)?;
            parse_vectors(rows, start + 1).map(|vectors| CellBlock::Scaled { scale, vectors })
        }
        Err(_) => {
            let rows = lines.get(start..start + 3)?;
            parse_vectors(rows, start).map(|vectors| CellBlock::Raw { vectors })
        }
    };
    Some(block)
}

fn parse_vectors<S: AsRef<str>>(rows: &[S], start: usize) -> Result<[[f64; 3]; 3]> {
    Ok([
        parse_triple(rows[0].as_ref(), start)?,
        parse_triple(rows[1].as_ref(), start + 1)?,
        parse_triple(rows[2].as_ref(), start + 2)?,
    ])
}

/// Parses the first three whitespace-separated numbers of a line. Any further tokens are ignored.
fn parse_triple(line: &str, idx: usize) -> Result<[f64; 3]> {
    let mut tokens = line.split_whitespace();
    let mut triple = [0.0; 3];
    for value in &mut triple {
        let token = tokens
            .next()
            .ok_or_else(|| Error::format(idx, format!("expected three numbers in '{line}'")))?;
        *value = parse_f64(token, idx)?;
    }
    Ok(triple)
}

fn parse_f64(token: &str, idx: usize) -> Result<f64> {
    token
        .parse()
        .map_err(|_| Error::format(idx, format!("invalid number '{token}'")))
}
