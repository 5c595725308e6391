#![allow(dead_code)]

pub mod trajectories {
    pub const FIXED: &str = "tests/trajectories/fixed.xdatcar";
    pub const TRUNCATED: &str = "tests/trajectories/truncated.xdatcar";
    pub const VARIABLE: &str = "tests/trajectories/variable.xdatcar";
    pub const VARIABLE_RAW: &str = "tests/trajectories/variable_raw.xdatcar";
    pub const NO_SYMBOLS: &str = "tests/trajectories/no_symbols.xdatcar";
    pub const TOO_SHORT: &str = "tests/trajectories/too_short.xdatcar";
    pub const NO_FRAMES: &str = "tests/trajectories/no_frames.xdatcar";
    pub const DEGENERATE: &str = "tests/trajectories/degenerate.xdatcar";
}

pub const DATE: &str = "Mon Oct 19 12:00:00 2026";

/// A path in the temporary directory that is unique to this test process.
pub fn scratch_path(name: &str) -> std::path::PathBuf {
    std::env::temp_dir().join(format!("xdatarc-{}-{name}", std::process::id()))
}

/// Writes a fixed-cell trajectory with the given composition and number of frames.
///
/// Atom `i` of frame `f` sits at fractional coordinate `(f + i) / 100` along each axis.
pub fn fixed_trajectory(species: &[(&str, usize)], nframes: usize, edge: f64) -> String {
    let mut s = String::from("generated\n1.0\n");
    s += &format!("{edge} 0.0 0.0\n0.0 {edge} 0.0\n0.0 0.0 {edge}\n");
    let symbols: Vec<&str> = species.iter().map(|(symbol, _)| *symbol).collect();
    let counts: Vec<String> = species.iter().map(|(_, count)| count.to_string()).collect();
    s += &format!("{}\n{}\n", symbols.join(" "), counts.join(" "));
    let natoms: usize = species.iter().map(|(_, count)| count).sum();
    for f in 0..nframes {
        s += &format!("Direct configuration= {:5}\n", f + 1);
        for i in 0..natoms {
            let x = (f + i) as f64 / 100.0;
            s += &format!("  {x:.8} {x:.8} {x:.8}\n");
        }
    }
    s
}

/// The atom records of an archive.
pub fn atom_lines(arc: &str) -> Vec<&str> {
    arc.lines().filter(|line| line.contains(" XXXX ")).collect()
}

/// The `frame <i>` lines of an archive.
pub fn frame_lines(arc: &str) -> Vec<&str> {
    arc.lines().filter(|line| line.starts_with("frame ")).collect()
}
