/*
MIT License

Copyright (c) 2025 Ameyanagi
*/

//! Crystallographic sites in fractional coordinates

use super::errors::{Result, StructureError};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Site as written in structure files, before validation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteDescription {
    pub species: String,
    pub coords: [f64; 3],
    #[serde(default = "full_occupancy")]
    pub occupancy: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub debye_waller: Option<f64>,
}

fn full_occupancy() -> f64 {
    1.0
}

/// A single species on a position of the unit cell
///
/// Coordinates are wrapped into `[0, 1)`. A disordered position is described
/// by several sites sharing the same coordinates with partial occupancies.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "SiteDescription", into = "SiteDescription")]
pub struct Site {
    species: String,
    coords: [f64; 3],
    occupancy: f64,
    /// Isotropic displacement parameter B in Å²
    debye_waller: Option<f64>,
}

impl Site {
    /// Create a fully occupied site
    pub fn new(species: &str, coords: [f64; 3]) -> Result<Self> {
        let species = species.trim();
        if species.is_empty() {
            return Err(StructureError::InvalidSite(
                "species symbol is empty".to_string(),
            ));
        }
        if coords.iter().any(|x| !x.is_finite()) {
            return Err(StructureError::InvalidSite(format!(
                "non-finite fractional coordinates {:?} for {}",
                coords, species
            )));
        }

        Ok(Self {
            species: species.to_string(),
            coords: coords.map(wrap_fractional),
            occupancy: 1.0,
            debye_waller: None,
        })
    }

    /// Set the fractional occupancy, which must lie in (0, 1]
    pub fn with_occupancy(mut self, occupancy: f64) -> Result<Self> {
        if !(occupancy > 0.0 && occupancy <= 1.0) {
            return Err(StructureError::InvalidSite(format!(
                "occupancy {} of {} is outside (0, 1]",
                occupancy, self.species
            )));
        }
        self.occupancy = occupancy;
        Ok(self)
    }

    /// Set the isotropic Debye-Waller factor B in Å²
    pub fn with_debye_waller(mut self, b_factor: f64) -> Result<Self> {
        if !b_factor.is_finite() {
            return Err(StructureError::InvalidSite(format!(
                "Debye-Waller factor {} of {} is not finite",
                b_factor, self.species
            )));
        }
        self.debye_waller = Some(b_factor);
        Ok(self)
    }

    pub fn species(&self) -> &str {
        &self.species
    }

    /// Fractional coordinates in `[0, 1)`
    pub fn coords(&self) -> [f64; 3] {
        self.coords
    }

    pub fn occupancy(&self) -> f64 {
        self.occupancy
    }

    pub fn debye_waller(&self) -> Option<f64> {
        self.debye_waller
    }
}

/// Map a fractional coordinate into `[0, 1)`
fn wrap_fractional(x: f64) -> f64 {
    let wrapped = x - x.floor();
    // -1e-17 wraps to exactly 1.0 in floating point
    if wrapped >= 1.0 {
        0.0
    } else {
        wrapped
    }
}

impl TryFrom<SiteDescription> for Site {
    type Error = StructureError;

    fn try_from(description: SiteDescription) -> Result<Self> {
        let site = Site::new(&description.species, description.coords)?
            .with_occupancy(description.occupancy)?;
        match description.debye_waller {
            Some(b_factor) => site.with_debye_waller(b_factor),
            None => Ok(site),
        }
    }
}

impl From<Site> for SiteDescription {
    fn from(site: Site) -> Self {
        SiteDescription {
            species: site.species,
            coords: site.coords,
            occupancy: site.occupancy,
            debye_waller: site.debye_waller,
        }
    }
}

impl fmt::Display for Site {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} at ({:.5}, {:.5}, {:.5}) occ={:.3}",
            self.species, self.coords[0], self.coords[1], self.coords[2], self.occupancy
        )
    }
}
