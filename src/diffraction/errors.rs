/*
MIT License

Copyright (c) 2025 Ameyanagi
*/

//! Error types for diffraction pattern calculations

use crate::scattering::ScatteringError;
use crate::structure::StructureError;
use thiserror::Error;

/// Errors that can occur while computing a powder pattern
///
/// Every error aborts the whole calculation; no partial pattern is returned.
#[derive(Error, Debug)]
pub enum XrdError {
    /// Malformed 2θ window or an angle where the intensity corrections are undefined
    #[error("Invalid 2θ range: {0}")]
    InvalidRange(String),

    /// No reflection survived enumeration, or all have zero intensity
    #[error("Empty pattern: {0}")]
    EmptyPattern(String),

    /// A configuration value is out of its allowed domain
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// The calculation was stopped through its cancellation token
    #[error("Calculation cancelled")]
    Cancelled,

    /// Lattice or site validation failed (includes degenerate lattices)
    #[error(transparent)]
    Structure(#[from] StructureError),

    /// Scattering-factor lookup failed (includes unknown species)
    #[error(transparent)]
    Scattering(#[from] ScatteringError),
}

/// Result type for diffraction operations
pub type Result<T> = std::result::Result<T, XrdError>;
