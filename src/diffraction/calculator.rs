/*
MIT License

Copyright (c) 2025 Ameyanagi
*/

//! Pattern calculation entry points
//!
//! The pipeline runs enumeration, structure-factor evaluation, merging and
//! intensity correction in that order. [`compute_pattern`] is the stateless
//! form; [`XrdCalculator`] keeps a scattering table and a configuration
//! around for repeated use.

use super::aggregator::{aggregate, DEFAULT_TWO_THETA_TOLERANCE};
use super::cancellation::CancellationToken;
use super::corrections::{correct_and_normalize, NormalizationOptions};
use super::enumerator::{enumerate, TwoThetaRange};
use super::errors::{Result, XrdError};
use super::pattern::Pattern;
use super::structure_factor::StructureFactorEvaluator;
use super::wavelength::Wavelength;
use crate::scattering::ScatteringTable;
use crate::structure::{MillerIndex, Structure};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

/// Parameters of a pattern calculation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PatternConfig {
    /// Incident wavelength, a preset name or a value in Å
    pub wavelength: Wavelength,
    /// 2θ window in degrees
    pub two_theta_range: TwoThetaRange,
    /// Rescale so the strongest peak equals `scale_to`
    pub scaled: bool,
    pub scale_to: f64,
    /// Peaks at or below this fraction of the strongest one are dropped
    pub min_intensity_fraction: f64,
    /// Reflections closer than this in 2θ (degrees) form one peak
    pub two_theta_tolerance: f64,
    /// Isotropic B factors in Å² by species, for sites without their own
    pub debye_waller_factors: HashMap<String, f64>,
    /// Evaluate structure factors on the rayon thread pool
    pub parallel: bool,
}

impl Default for PatternConfig {
    fn default() -> Self {
        let normalization = NormalizationOptions::default();
        Self {
            wavelength: Wavelength::default(),
            two_theta_range: TwoThetaRange::default(),
            scaled: normalization.scaled,
            scale_to: normalization.scale_to,
            min_intensity_fraction: normalization.min_intensity_fraction,
            two_theta_tolerance: DEFAULT_TWO_THETA_TOLERANCE,
            debye_waller_factors: HashMap::new(),
            parallel: true,
        }
    }
}

impl PatternConfig {
    pub fn normalization(&self) -> NormalizationOptions {
        NormalizationOptions {
            scaled: self.scaled,
            scale_to: self.scale_to,
            min_intensity_fraction: self.min_intensity_fraction,
        }
    }

    /// Check every parameter before any work is done
    pub fn validate(&self) -> Result<()> {
        self.wavelength.validated()?;
        self.normalization().validate()?;
        if !(self.two_theta_tolerance.is_finite() && self.two_theta_tolerance >= 0.0) {
            return Err(XrdError::InvalidParameter(format!(
                "2θ tolerance must be a non-negative number, got {}",
                self.two_theta_tolerance
            )));
        }
        Ok(())
    }
}

/// Compute the powder pattern of `structure`
pub fn compute_pattern(
    structure: &Structure,
    table: &ScatteringTable,
    config: &PatternConfig,
) -> Result<Pattern> {
    compute_pattern_with_cancellation(structure, table, config, None)
}

/// Compute the powder pattern of `structure`, polling `cancellation` once per
/// reflection candidate
pub fn compute_pattern_with_cancellation(
    structure: &Structure,
    table: &ScatteringTable,
    config: &PatternConfig,
    cancellation: Option<&CancellationToken>,
) -> Result<Pattern> {
    let start = Instant::now();
    config.validate()?;
    let wavelength = config.wavelength.validated()?;
    let lattice = structure.lattice();

    let evaluator = StructureFactorEvaluator::with_debye_waller(
        lattice,
        structure.sites(),
        table,
        wavelength,
        &config.debye_waller_factors,
    )?;

    let candidates: Vec<MillerIndex> =
        enumerate(lattice, wavelength, config.two_theta_range)?.collect();
    debug!("{} reflection candidates", candidates.len());

    let reflections = evaluator.evaluate_all(&candidates, config.parallel, cancellation)?;
    let peaks = aggregate(reflections, config.two_theta_tolerance)?;
    let pattern = correct_and_normalize(peaks, wavelength, &config.normalization())?;

    info!(
        "Computed {} peaks from {} reflections of {} sites at λ = {} Å in {:.2?}",
        pattern.len(),
        candidates.len(),
        structure.num_sites(),
        wavelength,
        start.elapsed()
    );

    Ok(pattern)
}

/// Reusable pattern calculator holding a shared scattering table
///
/// ```
/// use xrd_rs::diffraction::{RadiationSource, XrdCalculator};
/// use xrd_rs::structure::{Lattice, Site, Structure};
///
/// let structure = Structure::new(
///     Lattice::cubic(4.05).unwrap(),
///     vec![
///         Site::new("Al", [0.0, 0.0, 0.0]).unwrap(),
///         Site::new("Al", [0.5, 0.5, 0.0]).unwrap(),
///         Site::new("Al", [0.5, 0.0, 0.5]).unwrap(),
///         Site::new("Al", [0.0, 0.5, 0.5]).unwrap(),
///     ],
/// );
///
/// let mut calculator = XrdCalculator::new();
/// calculator.set_wavelength(RadiationSource::CuKa);
/// let pattern = calculator.get_pattern(&structure).unwrap();
/// assert!(pattern.strongest().is_some());
/// ```
#[derive(Debug, Clone)]
pub struct XrdCalculator {
    table: Arc<ScatteringTable>,
    config: PatternConfig,
}

impl Default for XrdCalculator {
    fn default() -> Self {
        Self::new()
    }
}

impl XrdCalculator {
    /// Calculator with the built-in scattering table and default settings
    pub fn new() -> Self {
        Self::with_table(ScatteringTable::builtin())
    }

    pub fn with_table(table: Arc<ScatteringTable>) -> Self {
        Self {
            table,
            config: PatternConfig::default(),
        }
    }

    pub fn table(&self) -> &ScatteringTable {
        &self.table
    }

    pub fn config(&self) -> &PatternConfig {
        &self.config
    }

    pub fn set_config(&mut self, config: PatternConfig) -> &mut Self {
        self.config = config;
        self
    }

    pub fn set_wavelength(&mut self, wavelength: impl Into<Wavelength>) -> &mut Self {
        self.config.wavelength = wavelength.into();
        self
    }

    pub fn set_two_theta_range(&mut self, range: TwoThetaRange) -> &mut Self {
        self.config.two_theta_range = range;
        self
    }

    pub fn set_scaled(&mut self, scaled: bool) -> &mut Self {
        self.config.scaled = scaled;
        self
    }

    pub fn set_scale_to(&mut self, scale_to: f64) -> &mut Self {
        self.config.scale_to = scale_to;
        self
    }

    pub fn set_min_intensity_fraction(&mut self, fraction: f64) -> &mut Self {
        self.config.min_intensity_fraction = fraction;
        self
    }

    pub fn set_two_theta_tolerance(&mut self, tolerance: f64) -> &mut Self {
        self.config.two_theta_tolerance = tolerance;
        self
    }

    /// Set the B factor (Å²) used for every site of `species` that has none
    pub fn set_debye_waller_factor(&mut self, species: &str, b_factor: f64) -> &mut Self {
        self.config
            .debye_waller_factors
            .insert(species.to_string(), b_factor);
        self
    }

    pub fn set_parallel(&mut self, parallel: bool) -> &mut Self {
        self.config.parallel = parallel;
        self
    }

    pub fn get_pattern(&self, structure: &Structure) -> Result<Pattern> {
        compute_pattern(structure, &self.table, &self.config)
    }

    pub fn get_pattern_with_cancellation(
        &self,
        structure: &Structure,
        cancellation: &CancellationToken,
    ) -> Result<Pattern> {
        compute_pattern_with_cancellation(structure, &self.table, &self.config, Some(cancellation))
    }
}
