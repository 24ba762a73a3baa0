/*
MIT License

Copyright (c) 2025 Ameyanagi
*/

//! Atomic X-ray scattering factors
//!
//! This module maps species symbols to atomic form-factor coefficients and
//! evaluates `f(s)` with `s = sin(θ)/λ`. The table is built once and shared
//! read-only between calculations.

pub mod coefficients;
pub mod elements;
pub mod errors;
pub mod table;

pub use coefficients::{FormFactorCoefficients, MOTT_BETHE_PREFACTOR};
pub use elements::{atomic_number, element_of, element_symbol};
pub use errors::{Result, ScatteringError};
pub use table::ScatteringTable;
