/*
MIT License

Copyright (c) 2025 Ameyanagi
*/

//! # xrd-rs
//!
//! Powder X-ray diffraction patterns computed from crystal structures.
//!
//! Given a unit cell, its occupied sites and an incident wavelength, the
//! crate enumerates the reflections reachable in a 2θ window, evaluates
//! their structure factors from tabulated atomic form factors, merges
//! reflections that coincide in angle, applies the Lorentz-polarization
//! correction and normalizes the result.
//!
//! ```
//! use xrd_rs::diffraction::{compute_pattern, PatternConfig, TwoThetaRange};
//! use xrd_rs::scattering::ScatteringTable;
//! use xrd_rs::structure::{Lattice, Site, Structure};
//!
//! let structure = Structure::new(
//!     Lattice::cubic(5.64).unwrap(),
//!     vec![
//!         Site::new("Na", [0.0, 0.0, 0.0]).unwrap(),
//!         Site::new("Cl", [0.5, 0.5, 0.5]).unwrap(),
//!     ],
//! );
//! let config = PatternConfig {
//!     two_theta_range: TwoThetaRange::new(10.0, 80.0).unwrap(),
//!     ..Default::default()
//! };
//!
//! let pattern = compute_pattern(&structure, &ScatteringTable::builtin(), &config).unwrap();
//! for peak in &pattern {
//!     println!("{:8.3} {:8.2}", peak.two_theta, peak.intensity);
//! }
//! ```

pub mod cli;
pub mod diffraction;
pub mod scattering;
pub mod structure;

pub use diffraction::{
    compute_pattern, DiffractionPeak, Pattern, PatternConfig, RadiationSource, Wavelength,
    XrdCalculator, XrdError,
};
pub use scattering::ScatteringTable;
pub use structure::{Lattice, MillerIndex, Site, Structure};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const AUTHORS: &str = env!("CARGO_PKG_AUTHORS");
