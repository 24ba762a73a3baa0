/*
MIT License

Copyright (c) 2025 Ameyanagi
*/

//! Error types for the structure module

use thiserror::Error;

/// Errors raised while building lattices, sites and structures
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StructureError {
    /// The three basis vectors span (numerically) zero volume
    #[error("Degenerate lattice: {0}")]
    DegenerateLattice(String),

    /// A site has malformed coordinates or occupancy
    #[error("Invalid site: {0}")]
    InvalidSite(String),
}

/// Result type for structure operations
pub type Result<T> = std::result::Result<T, StructureError>;
