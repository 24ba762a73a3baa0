/*
MIT License

Copyright (c) 2025 Ameyanagi
*/

//! Atomic form-factor parameterisations
//!
//! Both forms are functions of `s = sin(θ)/λ = |g|/2` in Å⁻¹.

use super::errors::{Result, ScatteringError};
use serde::{Deserialize, Serialize};

/// Prefactor of the Mott-Bethe-style expression, in Å²
///
/// Equals `m e² / (8π² ε₀ h²)` expressed for `s` in Å⁻¹.
pub const MOTT_BETHE_PREFACTOR: f64 = 41.78214;

/// Coefficients of one species' atomic form factor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "model", rename_all = "snake_case")]
pub enum FormFactorCoefficients {
    /// Sum of Gaussians plus a constant (Cromer-Mann, Waasmaier-Kirfel):
    /// `f(s) = c + Σ a_i exp(-b_i s²)`
    Gaussian { a: Vec<f64>, b: Vec<f64>, c: f64 },

    /// Screened-nucleus form: `f(s) = Z - 41.78214 s² Σ a_i exp(-b_i s²)`
    MottBethe { z: u32, pairs: Vec<[f64; 2]> },
}

impl FormFactorCoefficients {
    /// Cromer-Mann coefficients with four Gaussians
    pub fn cromer_mann(a: [f64; 4], b: [f64; 4], c: f64) -> Self {
        FormFactorCoefficients::Gaussian {
            a: a.to_vec(),
            b: b.to_vec(),
            c,
        }
    }

    /// Evaluate f(s) with `s = sin(θ)/λ`
    #[inline]
    pub fn evaluate(&self, s: f64) -> f64 {
        let s_squared = s * s;
        match self {
            FormFactorCoefficients::Gaussian { a, b, c } => {
                let mut f = *c;
                for (ai, bi) in a.iter().zip(b.iter()) {
                    f += ai * (-bi * s_squared).exp();
                }
                f
            }
            FormFactorCoefficients::MottBethe { z, pairs } => {
                let mut sum = 0.0;
                for [ai, bi] in pairs {
                    sum += ai * (-bi * s_squared).exp();
                }
                *z as f64 - MOTT_BETHE_PREFACTOR * s_squared * sum
            }
        }
    }

    /// Check that the coefficients describe a usable form factor
    pub fn validate(&self, species: &str) -> Result<()> {
        let invalid = |reason: String| ScatteringError::InvalidCoefficients {
            species: species.to_string(),
            reason,
        };

        match self {
            FormFactorCoefficients::Gaussian { a, b, c } => {
                if a.len() != b.len() {
                    return Err(invalid(format!(
                        "{} amplitudes but {} exponents",
                        a.len(),
                        b.len()
                    )));
                }
                if a.iter().chain(b.iter()).any(|v| !v.is_finite()) || !c.is_finite() {
                    return Err(invalid("non-finite coefficient".to_string()));
                }
            }
            FormFactorCoefficients::MottBethe { z, pairs } => {
                if *z == 0 {
                    return Err(invalid("atomic number must be positive".to_string()));
                }
                if pairs.iter().flatten().any(|v| !v.is_finite()) {
                    return Err(invalid("non-finite coefficient".to_string()));
                }
            }
        }
        Ok(())
    }
}
