/*
MIT License

Copyright (c) 2025 Ameyanagi
*/

//! Structure-factor evaluation
//!
//! For a reflection (h, k, l) with `s = sin(θ)/λ = |g|/2`:
//!
//! ```text
//! F(hkl) = Σ_j occ_j · f_j(s) · exp(-B_j s²) · exp(2πi (h x_j + k y_j + l z_j))
//! ```
//!
//! and the reflection's intensity is `|F|²`.

use super::cancellation::CancellationToken;
use super::enumerator::bragg_two_theta;
use super::errors::{Result, XrdError};
use crate::scattering::{FormFactorCoefficients, ScatteringTable};
use crate::structure::{Lattice, MillerIndex, Site};
use log::debug;
use num_complex::Complex64;
use rayon::prelude::*;
use std::collections::HashMap;
use std::f64::consts::PI;

/// Candidate counts below this are evaluated on the calling thread
const PARALLEL_THRESHOLD: usize = 64;

/// A reflection with its geometry and complex structure factor
#[derive(Debug, Clone, PartialEq)]
pub struct EvaluatedReflection {
    pub hkl: MillerIndex,
    /// |g| in Å⁻¹
    pub reciprocal_length: f64,
    /// Diffraction angle in degrees
    pub two_theta: f64,
    /// Interplanar spacing in Å
    pub d_spacing: f64,
    pub structure_factor: Complex64,
    /// |F|²
    pub intensity: f64,
}

/// A distinct (species, B factor) pair; its damped form factor is computed
/// once per reflection and shared by every site that references it
#[derive(Debug, Clone, Copy, PartialEq)]
struct Scatterer {
    species_index: usize,
    debye_waller: Option<f64>,
}

#[derive(Debug, Clone)]
struct PreparedSite {
    coords: [f64; 3],
    occupancy: f64,
    scatterer_index: usize,
}

/// Evaluates structure factors for one structure at one wavelength
///
/// Species are resolved against the scattering table once, at construction,
/// so an unknown species fails before any reflection is evaluated.
#[derive(Debug, Clone)]
pub struct StructureFactorEvaluator<'a> {
    lattice: &'a Lattice,
    wavelength: f64,
    form_factors: Vec<&'a FormFactorCoefficients>,
    scatterers: Vec<Scatterer>,
    sites: Vec<PreparedSite>,
}

impl<'a> StructureFactorEvaluator<'a> {
    /// Prepare an evaluator without thermal corrections beyond those set on
    /// the sites themselves
    pub fn new(
        lattice: &'a Lattice,
        sites: &[Site],
        table: &'a ScatteringTable,
        wavelength: f64,
    ) -> Result<Self> {
        Self::with_debye_waller(lattice, sites, table, wavelength, &HashMap::new())
    }

    /// Prepare an evaluator; sites without their own B factor take the one
    /// registered for their species in `debye_waller_factors`, if any
    pub fn with_debye_waller(
        lattice: &'a Lattice,
        sites: &[Site],
        table: &'a ScatteringTable,
        wavelength: f64,
        debye_waller_factors: &HashMap<String, f64>,
    ) -> Result<Self> {
        if !(wavelength.is_finite() && wavelength > 0.0) {
            return Err(XrdError::InvalidParameter(format!(
                "wavelength must be positive, got {}",
                wavelength
            )));
        }
        for (species, b) in debye_waller_factors {
            if !b.is_finite() {
                return Err(XrdError::InvalidParameter(format!(
                    "Debye-Waller factor for {} must be finite, got {}",
                    species, b
                )));
            }
        }

        let mut form_factors = Vec::new();
        let mut species_indices: HashMap<&str, usize> = HashMap::new();
        let mut scatterers: Vec<Scatterer> = Vec::new();
        let mut prepared = Vec::with_capacity(sites.len());

        for site in sites {
            let species = site.species();
            let species_index = match species_indices.get(species) {
                Some(&index) => index,
                None => {
                    form_factors.push(table.lookup(species)?);
                    species_indices.insert(species, form_factors.len() - 1);
                    form_factors.len() - 1
                }
            };

            let scatterer = Scatterer {
                species_index,
                debye_waller: site
                    .debye_waller()
                    .or_else(|| debye_waller_factors.get(species).copied()),
            };
            let scatterer_index = match scatterers.iter().position(|known| *known == scatterer) {
                Some(index) => index,
                None => {
                    scatterers.push(scatterer);
                    scatterers.len() - 1
                }
            };

            prepared.push(PreparedSite {
                coords: site.coords(),
                occupancy: site.occupancy(),
                scatterer_index,
            });
        }

        debug!(
            "Prepared {} sites over {} distinct species and {} scatterers",
            prepared.len(),
            form_factors.len(),
            scatterers.len()
        );

        Ok(Self {
            lattice,
            wavelength,
            form_factors,
            scatterers,
            sites: prepared,
        })
    }

    pub fn wavelength(&self) -> f64 {
        self.wavelength
    }

    pub fn num_sites(&self) -> usize {
        self.sites.len()
    }

    /// Evaluate a single reflection
    ///
    /// Fails with [`XrdError::InvalidRange`] if the reflection cannot
    /// diffract at this wavelength (`λ|g|/2` at or within
    /// [`BACKSCATTER_EPSILON`](super::enumerator::BACKSCATTER_EPSILON) of 1)
    /// or is the origin.
    pub fn evaluate(&self, hkl: MillerIndex) -> Result<EvaluatedReflection> {
        let mut amplitudes = Vec::with_capacity(self.scatterers.len());
        self.evaluate_with(hkl, &mut amplitudes)
    }

    /// Evaluate `hkl`, reusing `amplitudes` as scratch space for the damped
    /// form factor of each scatterer
    fn evaluate_with(
        &self,
        hkl: MillerIndex,
        amplitudes: &mut Vec<f64>,
    ) -> Result<EvaluatedReflection> {
        if hkl.is_origin() {
            return Err(XrdError::InvalidRange(
                "(0 0 0) is not a diffracting reflection".to_string(),
            ));
        }

        let g = self.lattice.reciprocal_length(&hkl);
        let two_theta = bragg_two_theta(g, self.wavelength).ok_or_else(|| {
            XrdError::InvalidRange(format!(
                "reflection {} (|g| = {:.6} Å⁻¹) is unreachable at λ = {} Å",
                hkl, g, self.wavelength
            ))
        })?;

        let s = g / 2.0;
        let s_squared = s * s;
        amplitudes.clear();
        amplitudes.extend(self.scatterers.iter().map(|scatterer| {
            let f = self.form_factors[scatterer.species_index].evaluate(s);
            match scatterer.debye_waller {
                Some(b) => f * (-b * s_squared).exp(),
                None => f,
            }
        }));
        let [h, k, l] = hkl.to_f64();

        let mut structure_factor = Complex64::new(0.0, 0.0);
        for site in &self.sites {
            let amplitude = site.occupancy * amplitudes[site.scatterer_index];
            let [x, y, z] = site.coords;
            let phase = 2.0 * PI * (h * x + k * y + l * z);
            structure_factor += Complex64::from_polar(amplitude, phase);
        }

        Ok(EvaluatedReflection {
            hkl,
            reciprocal_length: g,
            two_theta,
            d_spacing: 1.0 / g,
            structure_factor,
            intensity: structure_factor.norm_sqr(),
        })
    }

    /// Evaluate every candidate, preserving input order in the output
    ///
    /// With `parallel` set, candidates are spread over the rayon pool; each
    /// result lands in its own slot, so the output is identical either way.
    pub fn evaluate_all(
        &self,
        candidates: &[MillerIndex],
        parallel: bool,
        cancellation: Option<&CancellationToken>,
    ) -> Result<Vec<EvaluatedReflection>> {
        let evaluate_one = |amplitudes: &mut Vec<f64>, hkl: &MillerIndex| {
            if cancellation.is_some_and(|token| token.is_cancelled()) {
                return Err(XrdError::Cancelled);
            }
            self.evaluate_with(*hkl, amplitudes)
        };
        let scratch = || Vec::with_capacity(self.scatterers.len());

        if parallel && candidates.len() >= PARALLEL_THRESHOLD {
            candidates
                .par_iter()
                .map_init(scratch, evaluate_one)
                .collect()
        } else {
            let mut amplitudes = scratch();
            candidates
                .iter()
                .map(|hkl| evaluate_one(&mut amplitudes, hkl))
                .collect()
        }
    }
}

/// Evaluate one reflection of `sites` in `lattice` at `wavelength` Å
pub fn evaluate_reflection(
    hkl: MillerIndex,
    lattice: &Lattice,
    sites: &[Site],
    table: &ScatteringTable,
    wavelength: f64,
) -> Result<EvaluatedReflection> {
    StructureFactorEvaluator::new(lattice, sites, table, wavelength)?.evaluate(hkl)
}
