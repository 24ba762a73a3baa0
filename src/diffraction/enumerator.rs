/*
MIT License

Copyright (c) 2025 Ameyanagi
*/

//! Enumeration of reciprocal-lattice points reachable in a 2θ window
//!
//! Bragg's law in reciprocal-space form, `|g| = 2 sin(θ) / λ`, turns the
//! angular window into a shell `g_min <= |g| <= g_max`. Since `h = g . a`,
//! every point of the shell satisfies `|h| <= g_max |a|` (likewise for k and
//! l), which gives a bounding box that is complete for any cell shape.

use super::errors::{Result, XrdError};
use crate::structure::{Lattice, MillerIndex};
use log::debug;
use serde::{Deserialize, Serialize};

/// Reflections with `sin(θ)` this close to 1 (exact backscatter) are skipped,
/// since the Lorentz-polarization factor diverges at 2θ = 180°
pub const BACKSCATTER_EPSILON: f64 = 1e-12;

/// A validated 2θ window in degrees, `0 <= min < max <= 180`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "(f64, f64)", into = "(f64, f64)")]
pub struct TwoThetaRange {
    min: f64,
    max: f64,
}

impl TwoThetaRange {
    pub fn new(min: f64, max: f64) -> Result<Self> {
        if !(min.is_finite() && max.is_finite()) {
            return Err(XrdError::InvalidRange(format!(
                "bounds must be finite, got ({}, {})",
                min, max
            )));
        }
        if min < 0.0 || max > 180.0 || min >= max {
            return Err(XrdError::InvalidRange(format!(
                "expected 0 <= min < max <= 180 degrees, got ({}, {})",
                min, max
            )));
        }
        Ok(Self { min, max })
    }

    pub fn min(&self) -> f64 {
        self.min
    }

    pub fn max(&self) -> f64 {
        self.max
    }

    /// True if `two_theta` lies inside the closed window
    pub fn contains(&self, two_theta: f64) -> bool {
        two_theta >= self.min && two_theta <= self.max
    }
}

impl Default for TwoThetaRange {
    fn default() -> Self {
        Self {
            min: 0.0,
            max: 90.0,
        }
    }
}

impl TryFrom<(f64, f64)> for TwoThetaRange {
    type Error = XrdError;

    fn try_from((min, max): (f64, f64)) -> Result<Self> {
        Self::new(min, max)
    }
}

impl From<TwoThetaRange> for (f64, f64) {
    fn from(range: TwoThetaRange) -> Self {
        (range.min, range.max)
    }
}

/// |g| in Å⁻¹ of a reflection diffracting at `two_theta` degrees
pub fn reciprocal_length_at(two_theta: f64, wavelength: f64) -> f64 {
    2.0 * (two_theta.to_radians() / 2.0).sin() / wavelength
}

/// Diffraction angle 2θ in degrees for a reciprocal vector of length `g`,
/// or `None` if it cannot diffract at this wavelength
///
/// The edges are excluded: `g = 0` (2θ = 0°) and `sin(θ)` within
/// [`BACKSCATTER_EPSILON`] of 1 (2θ = 180°) both give `None`.
pub fn bragg_two_theta(g: f64, wavelength: f64) -> Option<f64> {
    let sin_theta = wavelength * g / 2.0;
    if !(sin_theta > 0.0 && sin_theta <= 1.0 - BACKSCATTER_EPSILON) {
        return None;
    }
    Some(2.0 * sin_theta.asin().to_degrees())
}

/// Lazy iterator over the Miller indices whose reflections fall inside a
/// 2θ window
///
/// Each qualifying triple is produced exactly once; (0, 0, 0) never is.
/// Friedel mates (h, k, l) and (-h, -k, -l) are both produced.
#[derive(Debug, Clone)]
pub struct ReflectionEnumerator<'a> {
    lattice: &'a Lattice,
    g_min_squared: f64,
    g_max_squared: f64,
    bounds: [i32; 3],
    cursor: [i32; 3],
    exhausted: bool,
}

impl<'a> ReflectionEnumerator<'a> {
    /// Prepare the search for `lattice` at `wavelength` Å over `range`
    pub fn new(lattice: &'a Lattice, wavelength: f64, range: TwoThetaRange) -> Result<Self> {
        if !(wavelength.is_finite() && wavelength > 0.0) {
            return Err(XrdError::InvalidParameter(format!(
                "wavelength must be positive, got {}",
                wavelength
            )));
        }

        let g_min = reciprocal_length_at(range.min(), wavelength);
        let g_max = reciprocal_length_at(range.max(), wavelength)
            .min(2.0 * (1.0 - BACKSCATTER_EPSILON) / wavelength);

        let mut bounds = [0i32; 3];
        for (bound, length) in bounds.iter_mut().zip(lattice.abc()) {
            let extent = (g_max * length).ceil();
            if extent >= i32::MAX as f64 {
                return Err(XrdError::InvalidParameter(format!(
                    "index search bound {} overflows; cell or 2θ range too large",
                    extent
                )));
            }
            *bound = extent as i32;
        }

        debug!(
            "Enumerating |g| in [{:.6}, {:.6}] Å⁻¹ with index bounds ±{:?}",
            g_min, g_max, bounds
        );

        Ok(Self {
            lattice,
            g_min_squared: g_min * g_min,
            g_max_squared: g_max * g_max,
            bounds,
            cursor: [-bounds[0], -bounds[1], -bounds[2]],
            exhausted: false,
        })
    }

    /// Half-widths of the (h, k, l) search box
    pub fn bounds(&self) -> [i32; 3] {
        self.bounds
    }

    fn advance(&mut self) {
        for axis in (0..3).rev() {
            if self.cursor[axis] < self.bounds[axis] {
                self.cursor[axis] += 1;
                return;
            }
            self.cursor[axis] = -self.bounds[axis];
        }
        self.exhausted = true;
    }
}

impl Iterator for ReflectionEnumerator<'_> {
    type Item = MillerIndex;

    fn next(&mut self) -> Option<MillerIndex> {
        while !self.exhausted {
            let hkl = MillerIndex::from(self.cursor);
            self.advance();

            if hkl.is_origin() {
                continue;
            }

            let g_squared = self.lattice.reciprocal_length_squared(&hkl);
            if g_squared >= self.g_min_squared && g_squared <= self.g_max_squared {
                return Some(hkl);
            }
        }
        None
    }
}

/// Enumerate the Miller indices reachable in `range` (see [`ReflectionEnumerator`])
pub fn enumerate(
    lattice: &Lattice,
    wavelength: f64,
    range: TwoThetaRange,
) -> Result<ReflectionEnumerator<'_>> {
    ReflectionEnumerator::new(lattice, wavelength, range)
}
