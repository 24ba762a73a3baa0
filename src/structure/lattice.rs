/*
MIT License

Copyright (c) 2025 Ameyanagi
*/

//! Unit-cell geometry and its crystallographic reciprocal lattice
//!
//! The reciprocal basis follows the crystallographic convention without the
//! factor of 2π, so a reciprocal-lattice vector `g(hkl)` has length `1/d(hkl)`
//! and `a_i . b_j = δ_ij`.

use super::errors::{Result, StructureError};
use super::vector::Vector3D;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Relative volume below which a cell is treated as flat
const DEGENERACY_TOLERANCE: f64 = 1e-10;

/// Integer triple (h, k, l) labelling a family of lattice planes
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
pub struct MillerIndex {
    pub h: i32,
    pub k: i32,
    pub l: i32,
}

impl MillerIndex {
    pub fn new(h: i32, k: i32, l: i32) -> Self {
        Self { h, k, l }
    }

    /// True for (0, 0, 0)
    pub fn is_origin(&self) -> bool {
        self.h == 0 && self.k == 0 && self.l == 0
    }

    /// The Friedel mate (-h, -k, -l)
    pub fn negated(&self) -> Self {
        Self::new(-self.h, -self.k, -self.l)
    }

    pub fn to_array(&self) -> [i32; 3] {
        [self.h, self.k, self.l]
    }

    pub fn to_f64(&self) -> [f64; 3] {
        [self.h as f64, self.k as f64, self.l as f64]
    }
}

impl From<[i32; 3]> for MillerIndex {
    fn from(hkl: [i32; 3]) -> Self {
        Self::new(hkl[0], hkl[1], hkl[2])
    }
}

impl From<(i32, i32, i32)> for MillerIndex {
    fn from((h, k, l): (i32, i32, i32)) -> Self {
        Self::new(h, k, l)
    }
}

impl fmt::Display for MillerIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({} {} {})", self.h, self.k, self.l)
    }
}

/// Serialized forms a lattice may be described in
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LatticeDescription {
    /// Basis vectors as matrix rows, in Angstroms
    Matrix { matrix: [[f64; 3]; 3] },
    /// Cell lengths in Angstroms and angles in degrees
    Parameters {
        a: f64,
        b: f64,
        c: f64,
        alpha: f64,
        beta: f64,
        gamma: f64,
    },
}

/// A validated, immutable unit cell
///
/// Construction fails with [`StructureError::DegenerateLattice`] when the basis
/// does not span a volume, so every `Lattice` value can be enumerated safely.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "LatticeDescription", into = "LatticeDescription")]
pub struct Lattice {
    /// Real-space basis vectors a, b, c
    vectors: [Vector3D; 3],
    /// Cell volume in Å³ (always positive)
    volume: f64,
    /// Reciprocal basis vectors a*, b*, c* in Å⁻¹
    reciprocal: [Vector3D; 3],
    /// Reciprocal metric tensor G*_ij = b_i . b_j
    reciprocal_metric: [[f64; 3]; 3],
}

impl Lattice {
    /// Create a lattice from three basis vectors given as matrix rows
    pub fn new(matrix: [[f64; 3]; 3]) -> Result<Self> {
        let vectors = [
            Vector3D::from(matrix[0]),
            Vector3D::from(matrix[1]),
            Vector3D::from(matrix[2]),
        ];

        if vectors.iter().any(|v| !v.is_finite()) {
            return Err(StructureError::DegenerateLattice(
                "basis vectors contain non-finite components".to_string(),
            ));
        }

        let signed_volume = vectors[0].triple_product(&vectors[1], &vectors[2]);
        let length_product: f64 = vectors.iter().map(|v| v.length()).product();

        if length_product == 0.0 || signed_volume.abs() / length_product < DEGENERACY_TOLERANCE {
            return Err(StructureError::DegenerateLattice(format!(
                "cell volume {:.3e} Å³ is zero for basis {}, {}, {}",
                signed_volume, vectors[0], vectors[1], vectors[2]
            )));
        }

        // Dividing by the signed volume keeps a_i . b_j = δ_ij for left-handed bases
        let reciprocal = [
            vectors[1].cross(&vectors[2]) * (1.0 / signed_volume),
            vectors[2].cross(&vectors[0]) * (1.0 / signed_volume),
            vectors[0].cross(&vectors[1]) * (1.0 / signed_volume),
        ];

        let mut reciprocal_metric = [[0.0; 3]; 3];
        for i in 0..3 {
            for j in 0..3 {
                reciprocal_metric[i][j] = reciprocal[i].dot(&reciprocal[j]);
            }
        }

        Ok(Self {
            vectors,
            volume: signed_volume.abs(),
            reciprocal,
            reciprocal_metric,
        })
    }

    /// Create a lattice from cell parameters (lengths in Å, angles in degrees)
    ///
    /// The cell is placed in the standard orientation with `a` along x and
    /// `b` in the xy plane.
    pub fn from_parameters(
        a: f64,
        b: f64,
        c: f64,
        alpha: f64,
        beta: f64,
        gamma: f64,
    ) -> Result<Self> {
        if !(a > 0.0 && b > 0.0 && c > 0.0) {
            return Err(StructureError::DegenerateLattice(format!(
                "cell lengths must be positive, got a={}, b={}, c={}",
                a, b, c
            )));
        }
        for angle in [alpha, beta, gamma] {
            if !(angle > 0.0 && angle < 180.0) {
                return Err(StructureError::DegenerateLattice(format!(
                    "cell angles must lie strictly between 0 and 180 degrees, got {}",
                    angle
                )));
            }
        }

        let (cos_alpha, cos_beta) = (alpha.to_radians().cos(), beta.to_radians().cos());
        let (sin_gamma, cos_gamma) = gamma.to_radians().sin_cos();

        let cy = (cos_alpha - cos_beta * cos_gamma) / sin_gamma;
        let cz_squared = 1.0 - cos_beta * cos_beta - cy * cy;
        if cz_squared <= 0.0 {
            return Err(StructureError::DegenerateLattice(format!(
                "angles alpha={}, beta={}, gamma={} do not form a cell",
                alpha, beta, gamma
            )));
        }

        Self::new([
            [a, 0.0, 0.0],
            [b * cos_gamma, b * sin_gamma, 0.0],
            [c * cos_beta, c * cy, c * cz_squared.sqrt()],
        ])
    }

    /// Simple cubic cell with edge `a`
    pub fn cubic(a: f64) -> Result<Self> {
        Self::from_parameters(a, a, a, 90.0, 90.0, 90.0)
    }

    /// Tetragonal cell with edges `a = b` and `c`
    pub fn tetragonal(a: f64, c: f64) -> Result<Self> {
        Self::from_parameters(a, a, c, 90.0, 90.0, 90.0)
    }

    /// Orthorhombic cell
    pub fn orthorhombic(a: f64, b: f64, c: f64) -> Result<Self> {
        Self::from_parameters(a, b, c, 90.0, 90.0, 90.0)
    }

    /// Hexagonal cell with `gamma = 120°`
    pub fn hexagonal(a: f64, c: f64) -> Result<Self> {
        Self::from_parameters(a, a, c, 90.0, 90.0, 120.0)
    }

    /// Basis vectors as matrix rows
    pub fn matrix(&self) -> [[f64; 3]; 3] {
        [
            self.vectors[0].to_array(),
            self.vectors[1].to_array(),
            self.vectors[2].to_array(),
        ]
    }

    pub fn vectors(&self) -> &[Vector3D; 3] {
        &self.vectors
    }

    /// Cell edge lengths (a, b, c)
    pub fn abc(&self) -> [f64; 3] {
        [
            self.vectors[0].length(),
            self.vectors[1].length(),
            self.vectors[2].length(),
        ]
    }

    /// Cell angles (alpha, beta, gamma) in degrees
    pub fn angles(&self) -> [f64; 3] {
        let angle = |u: &Vector3D, v: &Vector3D| {
            (u.dot(v) / (u.length() * v.length()))
                .clamp(-1.0, 1.0)
                .acos()
                .to_degrees()
        };
        [
            angle(&self.vectors[1], &self.vectors[2]),
            angle(&self.vectors[0], &self.vectors[2]),
            angle(&self.vectors[0], &self.vectors[1]),
        ]
    }

    /// Cell volume in Å³
    pub fn volume(&self) -> f64 {
        self.volume
    }

    pub fn reciprocal_vectors(&self) -> &[Vector3D; 3] {
        &self.reciprocal
    }

    pub fn reciprocal_metric(&self) -> &[[f64; 3]; 3] {
        &self.reciprocal_metric
    }

    /// |g(hkl)|² in Å⁻², evaluated with the reciprocal metric tensor
    pub fn reciprocal_length_squared(&self, hkl: &MillerIndex) -> f64 {
        let h = hkl.to_f64();
        let g = &self.reciprocal_metric;
        let mut sum = 0.0;
        for i in 0..3 {
            for j in 0..3 {
                sum += h[i] * g[i][j] * h[j];
            }
        }
        // Rounding can push the quadratic form of a tiny vector below zero
        sum.max(0.0)
    }

    /// |g(hkl)| = 1/d(hkl) in Å⁻¹
    pub fn reciprocal_length(&self, hkl: &MillerIndex) -> f64 {
        self.reciprocal_length_squared(hkl).sqrt()
    }

    /// Interplanar spacing d(hkl) in Å; infinite for (0, 0, 0)
    pub fn d_spacing(&self, hkl: &MillerIndex) -> f64 {
        let g = self.reciprocal_length(hkl);
        if g > 0.0 {
            1.0 / g
        } else {
            f64::INFINITY
        }
    }
}

impl TryFrom<LatticeDescription> for Lattice {
    type Error = StructureError;

    fn try_from(description: LatticeDescription) -> Result<Self> {
        match description {
            LatticeDescription::Matrix { matrix } => Lattice::new(matrix),
            LatticeDescription::Parameters {
                a,
                b,
                c,
                alpha,
                beta,
                gamma,
            } => Lattice::from_parameters(a, b, c, alpha, beta, gamma),
        }
    }
}

impl From<Lattice> for LatticeDescription {
    fn from(lattice: Lattice) -> Self {
        LatticeDescription::Matrix {
            matrix: lattice.matrix(),
        }
    }
}

impl fmt::Display for Lattice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [a, b, c] = self.abc();
        let [alpha, beta, gamma] = self.angles();
        write!(
            f,
            "a={:.4} b={:.4} c={:.4} alpha={:.2} beta={:.2} gamma={:.2} V={:.3}",
            a, b, c, alpha, beta, gamma, self.volume
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_cubic_reciprocal_metric() {
        let lattice = Lattice::cubic(4.0).unwrap();
        assert_relative_eq!(lattice.volume(), 64.0, epsilon = 1e-10);

        let metric = lattice.reciprocal_metric();
        for (i, row) in metric.iter().enumerate() {
            for (j, value) in row.iter().enumerate() {
                let expected = if i == j { 1.0 / 16.0 } else { 0.0 };
                assert_relative_eq!(*value, expected, epsilon = 1e-12);
            }
        }

        assert_relative_eq!(
            lattice.d_spacing(&MillerIndex::new(1, 1, 1)),
            4.0 / 3f64.sqrt(),
            epsilon = 1e-10
        );
    }

    #[test]
    fn test_reciprocal_basis_is_dual() {
        let lattice = Lattice::from_parameters(3.1, 4.7, 5.3, 81.0, 97.0, 112.0).unwrap();
        let real = lattice.vectors();
        let recip = lattice.reciprocal_vectors();
        for i in 0..3 {
            for j in 0..3 {
                let expected = if i == j { 1.0 } else { 0.0 };
                assert_relative_eq!(real[i].dot(&recip[j]), expected, epsilon = 1e-10);
            }
        }
    }

    #[test]
    fn test_left_handed_basis_keeps_positive_volume() {
        let lattice = Lattice::new([[0.0, 2.0, 0.0], [2.0, 0.0, 0.0], [0.0, 0.0, 2.0]]).unwrap();
        assert_relative_eq!(lattice.volume(), 8.0, epsilon = 1e-12);
        assert_relative_eq!(
            lattice.d_spacing(&MillerIndex::new(1, 0, 0)),
            2.0,
            epsilon = 1e-12
        );
    }

    #[test]
    fn test_hexagonal_parameters_round_trip() {
        let lattice = Lattice::hexagonal(3.21, 5.21).unwrap();
        let [a, b, c] = lattice.abc();
        let [alpha, beta, gamma] = lattice.angles();
        assert_relative_eq!(a, 3.21, epsilon = 1e-10);
        assert_relative_eq!(b, 3.21, epsilon = 1e-10);
        assert_relative_eq!(c, 5.21, epsilon = 1e-10);
        assert_relative_eq!(alpha, 90.0, epsilon = 1e-8);
        assert_relative_eq!(beta, 90.0, epsilon = 1e-8);
        assert_relative_eq!(gamma, 120.0, epsilon = 1e-8);

        // d(100) of a hexagonal cell is a * sqrt(3) / 2
        assert_relative_eq!(
            lattice.d_spacing(&MillerIndex::new(1, 0, 0)),
            3.21 * 3f64.sqrt() / 2.0,
            epsilon = 1e-10
        );
    }

    #[test]
    fn test_degenerate_lattices_rejected() {
        let flat = Lattice::new([[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [1.0, 1.0, 0.0]]);
        assert!(matches!(flat, Err(StructureError::DegenerateLattice(_))));

        let zero = Lattice::new([[0.0; 3]; 3]);
        assert!(matches!(zero, Err(StructureError::DegenerateLattice(_))));

        let bad_angles = Lattice::from_parameters(1.0, 1.0, 1.0, 150.0, 150.0, 150.0);
        assert!(matches!(
            bad_angles,
            Err(StructureError::DegenerateLattice(_))
        ));

        let nan = Lattice::new([[f64::NAN, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]]);
        assert!(nan.is_err());
    }

    #[test]
    fn test_deserialize_from_either_description() {
        let from_matrix: Lattice =
            serde_json::from_str(r#"{"matrix": [[4.05, 0, 0], [0, 4.05, 0], [0, 0, 4.05]]}"#)
                .unwrap();
        let from_params: Lattice = serde_json::from_str(
            r#"{"a": 4.05, "b": 4.05, "c": 4.05, "alpha": 90, "beta": 90, "gamma": 90}"#,
        )
        .unwrap();
        assert_relative_eq!(from_matrix.volume(), from_params.volume(), epsilon = 1e-9);

        let degenerate: std::result::Result<Lattice, _> =
            serde_json::from_str(r#"{"matrix": [[1, 0, 0], [2, 0, 0], [0, 0, 1]]}"#);
        assert!(degenerate.is_err());
    }
}
