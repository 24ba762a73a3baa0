/*
MIT License

Copyright (c) 2025 Ameyanagi
*/

//! Error types for the scattering module

use std::io;
use thiserror::Error;

/// Errors raised by scattering-factor lookups and table loading
#[derive(Error, Debug)]
pub enum ScatteringError {
    /// No form-factor entry exists for the species
    #[error("Unknown species: no scattering factor entry for '{0}'")]
    UnknownSpecies(String),

    /// Coefficients are malformed (mismatched lengths, non-finite values)
    #[error("Invalid scattering coefficients for '{species}': {reason}")]
    InvalidCoefficients { species: String, reason: String },

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for scattering operations
pub type Result<T> = std::result::Result<T, ScatteringError>;
