/*
MIT License

Copyright (c) 2025 Ameyanagi
*/

//! Angular intensity correction and normalization of merged peaks

use super::aggregator::MergedPeak;
use super::enumerator::BACKSCATTER_EPSILON;
use super::errors::{Result, XrdError};
use super::pattern::{unique_families, DiffractionPeak, Pattern};
use log::debug;
use serde::{Deserialize, Serialize};

/// Lorentz-polarization factor `(1 + cos²2θ) / (sin²θ cosθ)` for an
/// unpolarized beam, with `two_theta` in degrees
///
/// Diverges at 2θ = 0° and 180°.
pub fn lorentz_polarization(two_theta: f64) -> f64 {
    let theta = (two_theta / 2.0).to_radians();
    let cos_two_theta = two_theta.to_radians().cos();
    (1.0 + cos_two_theta * cos_two_theta) / (theta.sin().powi(2) * theta.cos())
}

/// How corrected intensities are turned into the reported values
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NormalizationOptions {
    /// Rescale so the strongest peak equals `scale_to`
    pub scaled: bool,
    pub scale_to: f64,
    /// Peaks with `I / I_max` at or below this are dropped
    pub min_intensity_fraction: f64,
}

impl Default for NormalizationOptions {
    fn default() -> Self {
        Self {
            scaled: true,
            scale_to: 100.0,
            min_intensity_fraction: 1e-5,
        }
    }
}

impl NormalizationOptions {
    pub fn validate(&self) -> Result<()> {
        if !(self.scale_to.is_finite() && self.scale_to > 0.0) {
            return Err(XrdError::InvalidParameter(format!(
                "scale_to must be positive, got {}",
                self.scale_to
            )));
        }
        if !(0.0..1.0).contains(&self.min_intensity_fraction) {
            return Err(XrdError::InvalidParameter(format!(
                "min_intensity_fraction must be in [0, 1), got {}",
                self.min_intensity_fraction
            )));
        }
        Ok(())
    }
}

/// Apply the Lorentz-polarization factor to each peak, normalize and filter
///
/// Multiplicity is not applied: symmetry-equivalent reflections were already
/// summed when they merged by angle. Fails with [`XrdError::EmptyPattern`]
/// if there are no peaks or none has positive intensity, and with
/// [`XrdError::InvalidRange`] if a peak sits at 2θ = 0° or 180°.
pub fn correct_and_normalize(
    peaks: Vec<MergedPeak>,
    wavelength: f64,
    options: &NormalizationOptions,
) -> Result<Pattern> {
    options.validate()?;

    if peaks.is_empty() {
        return Err(XrdError::EmptyPattern(
            "no reflections in the 2θ range".to_string(),
        ));
    }

    let mut corrected = Vec::with_capacity(peaks.len());
    for peak in peaks {
        let sin_theta = (peak.two_theta / 2.0).to_radians().sin();
        if !(peak.two_theta > 0.0 && peak.two_theta < 180.0)
            || sin_theta > 1.0 - BACKSCATTER_EPSILON
        {
            return Err(XrdError::InvalidRange(format!(
                "peak at 2θ = {}° lies on the 0°/180° edge where the \
                 Lorentz-polarization factor diverges",
                peak.two_theta
            )));
        }
        let intensity = peak.intensity * lorentz_polarization(peak.two_theta);
        if !intensity.is_finite() {
            return Err(XrdError::InvalidRange(format!(
                "Lorentz-polarization factor is not finite at 2θ = {}°",
                peak.two_theta
            )));
        }
        corrected.push((peak, intensity));
    }

    let max_intensity = corrected
        .iter()
        .map(|(_, intensity)| *intensity)
        .fold(0.0, f64::max);
    if max_intensity <= 0.0 {
        return Err(XrdError::EmptyPattern(
            "every reflection has zero intensity".to_string(),
        ));
    }

    let total = corrected.len();
    let peaks: Vec<DiffractionPeak> = corrected
        .into_iter()
        .filter(|(_, intensity)| intensity / max_intensity > options.min_intensity_fraction)
        .map(|(peak, intensity)| DiffractionPeak {
            two_theta: peak.two_theta,
            intensity: if options.scaled {
                intensity / max_intensity * options.scale_to
            } else {
                intensity
            },
            d_spacing: peak.d_spacing,
            families: unique_families(&peak.hkls),
            hkls: peak.hkls,
        })
        .collect();

    debug!(
        "Kept {} of {} peaks above {} of the maximum",
        peaks.len(),
        total,
        options.min_intensity_fraction
    );

    Ok(Pattern::new(wavelength, options.scaled, peaks))
}
