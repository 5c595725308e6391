use glam::{DMat3, DVec3};

use crate::error::DegenerateLattice;

/// The lattice of a periodic cell.
///
/// Internally the three lattice vectors a, b and c are the columns of a [`DMat3`]. This makes
/// the conversion from fractional to Cartesian coordinates a single matrix-vector product,
/// while the vectors themselves are read and written as rows, like in the XDATCAR format.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct Lattice(DMat3);

impl Lattice {
    pub fn from_rows(rows: [[f64; 3]; 3]) -> Self {
        Self(DMat3::from_cols_array_2d(&rows))
    }

    pub fn from_vectors(a: DVec3, b: DVec3, c: DVec3) -> Self {
        Self(DMat3::from_cols(a, b, c))
    }

    /// A cubic lattice with edge length `a`.
    pub fn cubic(a: f64) -> Self {
        Self(DMat3::from_diagonal(DVec3::splat(a)))
    }

    /// Returns the lattice vectors a, b and c.
    pub fn vectors(&self) -> [DVec3; 3] {
        [self.0.x_axis, self.0.y_axis, self.0.z_axis]
    }

    pub fn rows(&self) -> [[f64; 3]; 3] {
        self.0.to_cols_array_2d()
    }

    pub fn scaled(self, scale: f64) -> Self {
        Self(self.0 * scale)
    }

    /// Converts a fractional coordinate into a Cartesian position.
    ///
    /// Component `k` of the result is `sum_j frac[j] * vectors[j][k]`.
    pub fn to_cartesian(&self, frac: DVec3) -> DVec3 {
        self.0 * frac
    }

    /// Computes the lattice parameters of this cell.
    ///
    /// # Errors
    ///
    /// Returns [`DegenerateLattice`] if one of the vectors has no length, in which case the
    /// angles are undefined.
    pub fn parameters(&self) -> Result<CellParameters, DegenerateLattice> {
        let [va, vb, vc] = self.vectors();
        let [a, b, c] = [va, vb, vc].map(DVec3::length);
        for (vector, length) in [('a', a), ('b', b), ('c', c)] {
            if length == 0.0 || !length.is_finite() {
                return Err(DegenerateLattice { vector, length });
            }
        }

        Ok(CellParameters {
            a,
            b,
            c,
            alpha: angle(vb, vc),
            beta: angle(va, vc),
            gamma: angle(va, vb),
        })
    }
}

/// The six lattice parameters. Lengths are in the unit of the lattice, angles in degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CellParameters {
    pub a: f64,
    pub b: f64,
    pub c: f64,
    /// Angle between b and c.
    pub alpha: f64,
    /// Angle between a and c.
    pub beta: f64,
    /// Angle between a and b.
    pub gamma: f64,
}

/// Angle between two vectors of non-zero length, in degrees.
fn angle(u: DVec3, w: DVec3) -> f64 {
    let cos = u.dot(w) / (u.length() * w.length());
    // Rounding may push (anti)parallel vectors just outside of the domain of acos.
    cos.clamp(-1.0, 1.0).acos().to_degrees()
}

/// Wraps a fractional coordinate into the unit cell, such that each component lies in [0, 1).
pub fn wrap(frac: DVec3) -> DVec3 {
    // Not `DVec3::fract_gl`, since that can return exactly 1.0 for tiny negative values.
    let wrap1 = |x: f64| {
        let wrapped = x - x.floor();
        if wrapped >= 1.0 {
            0.0
        } else {
            wrapped
        }
    };
    DVec3::new(wrap1(frac.x), wrap1(frac.y), wrap1(frac.z))
}
