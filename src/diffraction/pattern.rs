/*
MIT License

Copyright (c) 2025 Ameyanagi
*/

use crate::structure::MillerIndex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Reflections of one peak that share the same set of |h|, |k|, |l|
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HklFamily {
    /// Lexicographically largest member, e.g. (1 1 1) for {±1 ±1 ±1}
    pub hkl: MillerIndex,
    /// Number of member reflections
    pub multiplicity: usize,
}

/// Group reflections into families keyed by their sorted absolute indices
///
/// Families are returned in ascending order of that key. This is for
/// reporting only; intensities already include every member.
pub fn unique_families(hkls: &[MillerIndex]) -> Vec<HklFamily> {
    let mut families: BTreeMap<[i32; 3], HklFamily> = BTreeMap::new();

    for hkl in hkls {
        let mut key = hkl.to_array().map(i32::abs);
        key.sort_unstable();

        families
            .entry(key)
            .and_modify(|family| {
                family.multiplicity += 1;
                if *hkl > family.hkl {
                    family.hkl = *hkl;
                }
            })
            .or_insert(HklFamily {
                hkl: *hkl,
                multiplicity: 1,
            });
    }

    families.into_values().collect()
}

/// One peak of a powder pattern
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiffractionPeak {
    /// Diffraction angle in degrees
    pub two_theta: f64,
    pub intensity: f64,
    /// Interplanar spacing in Å
    pub d_spacing: f64,
    /// Every contributing reflection, sorted
    pub hkls: Vec<MillerIndex>,
    pub families: Vec<HklFamily>,
}

impl DiffractionPeak {
    /// Total number of contributing reflections
    pub fn multiplicity(&self) -> usize {
        self.hkls.len()
    }
}

/// A simulated powder pattern, peaks in ascending 2θ
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pattern {
    wavelength: f64,
    scaled: bool,
    peaks: Vec<DiffractionPeak>,
}

impl Pattern {
    pub fn new(wavelength: f64, scaled: bool, mut peaks: Vec<DiffractionPeak>) -> Self {
        peaks.sort_by(|a, b| a.two_theta.total_cmp(&b.two_theta));
        Self {
            wavelength,
            scaled,
            peaks,
        }
    }

    /// Wavelength in Å
    pub fn wavelength(&self) -> f64 {
        self.wavelength
    }

    /// True if intensities were rescaled to a reference maximum
    pub fn is_scaled(&self) -> bool {
        self.scaled
    }

    pub fn peaks(&self) -> &[DiffractionPeak] {
        &self.peaks
    }

    pub fn len(&self) -> usize {
        self.peaks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.peaks.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, DiffractionPeak> {
        self.peaks.iter()
    }

    pub fn two_thetas(&self) -> Vec<f64> {
        self.peaks.iter().map(|p| p.two_theta).collect()
    }

    pub fn intensities(&self) -> Vec<f64> {
        self.peaks.iter().map(|p| p.intensity).collect()
    }

    /// The most intense peak; the lowest angle wins a tie
    pub fn strongest(&self) -> Option<&DiffractionPeak> {
        self.peaks.iter().reduce(|best, peak| {
            if peak.intensity > best.intensity {
                peak
            } else {
                best
            }
        })
    }

    /// Peak closest to `two_theta`, if one lies within `window` degrees
    pub fn peak_near(&self, two_theta: f64, window: f64) -> Option<&DiffractionPeak> {
        self.peaks
            .iter()
            .filter(|p| (p.two_theta - two_theta).abs() <= window)
            .min_by(|a, b| {
                (a.two_theta - two_theta)
                    .abs()
                    .total_cmp(&(b.two_theta - two_theta).abs())
            })
    }

    pub fn into_peaks(self) -> Vec<DiffractionPeak> {
        self.peaks
    }
}

impl<'a> IntoIterator for &'a Pattern {
    type Item = &'a DiffractionPeak;
    type IntoIter = std::slice::Iter<'a, DiffractionPeak>;

    fn into_iter(self) -> Self::IntoIter {
        self.peaks.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn peak(two_theta: f64, intensity: f64) -> DiffractionPeak {
        DiffractionPeak {
            two_theta,
            intensity,
            d_spacing: 1.0,
            hkls: Vec::new(),
            families: Vec::new(),
        }
    }

    #[test]
    fn test_families_of_cubic_111() {
        let mut hkls = Vec::new();
        for h in [-1, 1] {
            for k in [-1, 1] {
                for l in [-1, 1] {
                    hkls.push(MillerIndex::new(h, k, l));
                }
            }
        }
        let families = unique_families(&hkls);
        assert_eq!(
            families,
            vec![HklFamily {
                hkl: MillerIndex::new(1, 1, 1),
                multiplicity: 8
            }]
        );
    }

    #[test]
    fn test_families_split_by_absolute_indices() {
        // (3 0 0) and (2 2 1) coincide in a cubic cell but are distinct families
        let hkls = vec![
            MillerIndex::new(3, 0, 0),
            MillerIndex::new(0, -3, 0),
            MillerIndex::new(2, 2, 1),
            MillerIndex::new(1, -2, 2),
        ];
        let families = unique_families(&hkls);
        assert_eq!(families.len(), 2);
        assert_eq!(families[0].hkl, MillerIndex::new(3, 0, 0));
        assert_eq!(families[0].multiplicity, 2);
        assert_eq!(families[1].hkl, MillerIndex::new(2, 2, 1));
        assert_eq!(families[1].multiplicity, 2);
    }

    #[test]
    fn test_pattern_accessors() {
        let pattern = Pattern::new(1.5406, true, vec![peak(40.0, 50.0), peak(20.0, 100.0)]);
        assert_eq!(pattern.two_thetas(), vec![20.0, 40.0]);
        assert_eq!(pattern.intensities(), vec![100.0, 50.0]);
        assert_eq!(pattern.strongest().map(|p| p.two_theta), Some(20.0));
        assert_eq!(pattern.peak_near(39.9, 0.2).map(|p| p.two_theta), Some(40.0));
        assert!(pattern.peak_near(30.0, 0.2).is_none());
        assert_eq!((&pattern).into_iter().count(), 2);
    }
}
