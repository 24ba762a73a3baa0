/*
MIT License

Copyright (c) 2025 Ameyanagi
*/

//! Crystal structure representation
//!
//! This module provides the immutable inputs of a diffraction calculation:
//! the unit cell ([`Lattice`]) and the ordered list of occupied [`Site`]s.

pub mod errors;
pub mod lattice;
pub mod site;
pub mod vector;

pub use errors::{Result, StructureError};
pub use lattice::{Lattice, LatticeDescription, MillerIndex};
pub use site::{Site, SiteDescription};
pub use vector::Vector3D;

use serde::{Deserialize, Serialize};

/// A periodic crystal: one unit cell and the sites it contains
///
/// Site order carries no physical meaning but is preserved so that
/// repeated calculations accumulate in the same order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Structure {
    lattice: Lattice,
    #[serde(default)]
    sites: Vec<Site>,
}

impl Structure {
    /// Create a structure from a lattice and its sites
    pub fn new(lattice: Lattice, sites: Vec<Site>) -> Self {
        Self { lattice, sites }
    }

    pub fn lattice(&self) -> &Lattice {
        &self.lattice
    }

    pub fn sites(&self) -> &[Site] {
        &self.sites
    }

    /// Get the number of sites
    pub fn num_sites(&self) -> usize {
        self.sites.len()
    }

    /// Distinct species symbols in order of first appearance
    pub fn species(&self) -> Vec<&str> {
        let mut species: Vec<&str> = Vec::new();
        for site in &self.sites {
            if !species.contains(&site.species()) {
                species.push(site.species());
            }
        }
        species
    }
}
