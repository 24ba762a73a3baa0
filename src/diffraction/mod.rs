/*
MIT License

Copyright (c) 2025 Ameyanagi
*/

//! Powder X-ray diffraction pattern calculation
//!
//! This module turns a crystal structure into a list of powder peaks:
//! reflections inside the 2θ window are enumerated, their structure factors
//! evaluated, coincident reflections merged, and the merged intensities
//! corrected for Lorentz-polarization and normalized.

pub mod aggregator;
pub mod calculator;
pub mod cancellation;
pub mod corrections;
pub mod enumerator;
pub mod errors;
pub mod pattern;
pub mod structure_factor;
pub mod wavelength;

pub use aggregator::{aggregate, MergedPeak, DEFAULT_TWO_THETA_TOLERANCE};
pub use calculator::{
    compute_pattern, compute_pattern_with_cancellation, PatternConfig, XrdCalculator,
};
pub use cancellation::CancellationToken;
pub use corrections::{correct_and_normalize, lorentz_polarization, NormalizationOptions};
pub use enumerator::{
    bragg_two_theta, enumerate, reciprocal_length_at, ReflectionEnumerator, TwoThetaRange,
};
pub use errors::{Result, XrdError};
pub use pattern::{unique_families, DiffractionPeak, HklFamily, Pattern};
pub use structure_factor::{evaluate_reflection, EvaluatedReflection, StructureFactorEvaluator};
pub use wavelength::{RadiationSource, Wavelength};
