/*
MIT License

Copyright (c) 2025 Ameyanagi
*/

//! Merging of coincident reflections into powder peaks
//!
//! Reflections are sorted by angle and swept once from low to high 2θ. A
//! reflection joins the current peak while it lies within the tolerance of
//! the peak's anchor, the first (lowest-angle) reflection of the peak;
//! otherwise it starts a new peak. Because the sort is total, the result does
//! not depend on the order in which reflections were evaluated.

use super::errors::{Result, XrdError};
use super::structure_factor::EvaluatedReflection;
use crate::structure::MillerIndex;
use log::debug;

/// Default merge tolerance in degrees 2θ
pub const DEFAULT_TWO_THETA_TOLERANCE: f64 = 1e-5;

/// Reflections that coincide in 2θ, with their summed |F|²
#[derive(Debug, Clone, PartialEq)]
pub struct MergedPeak {
    /// Angle of the anchor reflection, in degrees
    pub two_theta: f64,
    /// d-spacing of the anchor reflection, in Å
    pub d_spacing: f64,
    /// Sum of the members' |F|², before any angular correction
    pub intensity: f64,
    /// Contributing reflections, sorted
    pub hkls: Vec<MillerIndex>,
}

impl MergedPeak {
    fn start(reflection: &EvaluatedReflection) -> Self {
        Self {
            two_theta: reflection.two_theta,
            d_spacing: reflection.d_spacing,
            intensity: reflection.intensity,
            hkls: vec![reflection.hkl],
        }
    }

    pub fn multiplicity(&self) -> usize {
        self.hkls.len()
    }
}

/// Merge reflections whose angles differ from a peak's anchor by less than
/// `tolerance` degrees
pub fn aggregate(
    mut reflections: Vec<EvaluatedReflection>,
    tolerance: f64,
) -> Result<Vec<MergedPeak>> {
    if !(tolerance.is_finite() && tolerance >= 0.0) {
        return Err(XrdError::InvalidParameter(format!(
            "2θ tolerance must be a non-negative number, got {}",
            tolerance
        )));
    }

    let num_reflections = reflections.len();
    reflections.sort_by(|a, b| {
        a.two_theta
            .total_cmp(&b.two_theta)
            .then_with(|| a.hkl.cmp(&b.hkl))
    });

    let mut peaks: Vec<MergedPeak> = Vec::new();
    for reflection in &reflections {
        match peaks.last_mut() {
            Some(peak) if (reflection.two_theta - peak.two_theta).abs() < tolerance => {
                peak.intensity += reflection.intensity;
                peak.hkls.push(reflection.hkl);
            }
            _ => peaks.push(MergedPeak::start(reflection)),
        }
    }

    for peak in &mut peaks {
        peak.hkls.sort_unstable();
    }

    debug!(
        "Merged {} reflections into {} peaks (tolerance {}°)",
        num_reflections,
        peaks.len(),
        tolerance
    );

    Ok(peaks)
}
