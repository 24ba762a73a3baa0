/*
MIT License

Copyright (c) 2025 Ameyanagi
*/

use approx::assert_relative_eq;
use rstest::rstest;
use std::sync::Arc;
use xrd_rs::diffraction::{
    aggregate, compute_pattern, correct_and_normalize, evaluate_reflection, lorentz_polarization,
    CancellationToken, NormalizationOptions, PatternConfig, RadiationSource, TwoThetaRange,
    Wavelength, XrdCalculator, XrdError, DEFAULT_TWO_THETA_TOLERANCE,
};
use xrd_rs::scattering::{FormFactorCoefficients, ScatteringError, ScatteringTable};
use xrd_rs::structure::{Lattice, MillerIndex, Site, Structure};

fn face_centred(species: &str, a: f64) -> Structure {
    let sites = [
        [0.0, 0.0, 0.0],
        [0.5, 0.5, 0.0],
        [0.5, 0.0, 0.5],
        [0.0, 0.5, 0.5],
    ]
    .into_iter()
    .map(|coords| Site::new(species, coords).unwrap())
    .collect();
    Structure::new(Lattice::cubic(a).unwrap(), sites)
}

fn aluminium() -> Structure {
    face_centred("Al", 4.05)
}

fn rock_salt() -> Structure {
    let mut sites = Vec::new();
    for [x, y, z] in [
        [0.0, 0.0, 0.0],
        [0.5, 0.5, 0.0],
        [0.5, 0.0, 0.5],
        [0.0, 0.5, 0.5],
    ] {
        sites.push(Site::new("Na", [x, y, z]).unwrap());
        sites.push(Site::new("Cl", [x + 0.5, y + 0.5, z + 0.5]).unwrap());
    }
    Structure::new(Lattice::cubic(5.64).unwrap(), sites)
}

fn config(min: f64, max: f64) -> PatternConfig {
    PatternConfig {
        two_theta_range: TwoThetaRange::new(min, max).unwrap(),
        ..Default::default()
    }
}

#[test]
fn test_aluminium_pattern() {
    let table = ScatteringTable::builtin();
    let pattern = compute_pattern(&aluminium(), &table, &config(20.0, 80.0)).unwrap();

    let expected = [
        (38.4686, 100.0, [1, 1, 1], 8),
        (44.7163, 48.37, [2, 0, 0], 6),
        (65.0897, 30.70, [2, 2, 0], 12),
        (78.2204, 35.54, [3, 1, 1], 24),
    ];
    assert_eq!(pattern.len(), expected.len());
    for (peak, (two_theta, intensity, family, multiplicity)) in pattern.iter().zip(expected) {
        assert_relative_eq!(peak.two_theta, two_theta, epsilon = 1e-3);
        assert_relative_eq!(peak.intensity, intensity, epsilon = 0.05);
        assert_eq!(peak.families.len(), 1);
        assert_eq!(peak.families[0].hkl, MillerIndex::from(family));
        assert_eq!(peak.multiplicity(), multiplicity);
    }

    let strongest = pattern.strongest().unwrap();
    assert!((strongest.two_theta - 38.47).abs() < 0.05);
    assert_relative_eq!(strongest.intensity, 100.0, epsilon = 1e-10);
    assert_relative_eq!(strongest.d_spacing, 4.05 / 3.0_f64.sqrt(), epsilon = 1e-10);
}

#[test]
fn test_rock_salt_strongest_peak_is_200() {
    let table = ScatteringTable::builtin();
    let pattern = compute_pattern(&rock_salt(), &table, &config(10.0, 80.0)).unwrap();

    let strongest = pattern.strongest().unwrap();
    assert_relative_eq!(strongest.two_theta, 31.7043, epsilon = 1e-3);
    assert_eq!(strongest.families[0].hkl, MillerIndex::new(2, 0, 0));

    // (1 1 1) is weak but present since Na and Cl scatter differently
    let weak = pattern.peak_near(27.367, 0.01).unwrap();
    assert!(weak.intensity > 1.0 && weak.intensity < 20.0);
}

#[rstest]
#[case(aluminium())]
#[case(rock_salt())]
#[case(face_centred("Cu", 3.615))]
fn test_normalization_invariant(#[case] structure: Structure) {
    let table = ScatteringTable::builtin();
    let pattern = compute_pattern(&structure, &table, &config(5.0, 150.0)).unwrap();

    let max = pattern.intensities().into_iter().fold(f64::MIN, f64::max);
    assert_relative_eq!(max, 100.0, epsilon = 1e-10);
    assert!(pattern.iter().all(|p| p.intensity >= 0.0 && p.intensity.is_finite()));

    let angles = pattern.two_thetas();
    assert!(angles.windows(2).all(|w| w[0] < w[1]));
}

#[test]
fn test_scale_and_threshold_options() {
    let table = ScatteringTable::builtin();
    let structure = rock_salt();

    let mut options = config(10.0, 80.0);
    options.scale_to = 1.0;
    let unit = compute_pattern(&structure, &table, &options).unwrap();
    assert_relative_eq!(unit.strongest().unwrap().intensity, 1.0, epsilon = 1e-12);

    // NaCl has peaks near 2 and 1 percent of (2 0 0)
    options.min_intensity_fraction = 0.05;
    let filtered = compute_pattern(&structure, &table, &options).unwrap();
    assert!(filtered.len() < unit.len());
    assert!(filtered.iter().all(|p| p.intensity > 0.05));
}

#[test]
fn test_unscaled_pattern_keeps_corrected_intensities() {
    let table = ScatteringTable::builtin();
    let mut options = config(20.0, 80.0);
    options.scaled = false;
    let pattern = compute_pattern(&aluminium(), &table, &options).unwrap();
    assert!(!pattern.is_scaled());

    // (1 1 1): 8 reflections of |F|² = (4 f)²
    let peak = &pattern.peaks()[0];
    let s = 1.0 / peak.d_spacing / 2.0;
    let f = table.lookup("Al").unwrap().evaluate(s);
    let expected = 8.0 * 16.0 * f * f * lorentz_polarization(peak.two_theta);
    assert_relative_eq!(peak.intensity, expected, max_relative = 1e-10);
}

#[test]
fn test_determinism() {
    let table = ScatteringTable::builtin();
    let structure = rock_salt();
    let mut options = config(5.0, 170.0);

    let first = compute_pattern(&structure, &table, &options).unwrap();
    let second = compute_pattern(&structure, &table, &options).unwrap();
    options.parallel = false;
    let serial = compute_pattern(&structure, &table, &options).unwrap();

    assert_eq!(first, second);
    assert_eq!(first, serial);
}

#[test]
fn test_site_order_does_not_change_pattern() {
    let table = ScatteringTable::builtin();
    let structure = rock_salt();
    let mut reversed_sites = structure.sites().to_vec();
    reversed_sites.reverse();
    let reversed = Structure::new(structure.lattice().clone(), reversed_sites);

    let forward = compute_pattern(&structure, &table, &config(10.0, 120.0)).unwrap();
    let backward = compute_pattern(&reversed, &table, &config(10.0, 120.0)).unwrap();
    assert_eq!(forward.len(), backward.len());
    for (a, b) in forward.iter().zip(backward.iter()) {
        assert_eq!(a.two_theta, b.two_theta);
        assert_relative_eq!(a.intensity, b.intensity, max_relative = 1e-9);
    }
}

#[test]
fn test_nearly_coincident_reflections_merge() {
    let table = ScatteringTable::builtin();
    let sites = vec![Site::new("Cu", [0.0, 0.0, 0.0]).unwrap()];
    let options = config(10.0, 25.0);

    // c differs from a by a few parts in 1e8: (1 0 0) and (0 0 1) coincide
    let pseudo_cubic = Structure::new(Lattice::tetragonal(4.0, 4.0000001).unwrap(), sites.clone());
    let merged = compute_pattern(&pseudo_cubic, &table, &options).unwrap();
    assert_eq!(merged.len(), 1);
    assert_eq!(merged.peaks()[0].multiplicity(), 6);

    // A real tetragonal distortion splits them
    let tetragonal = Structure::new(Lattice::tetragonal(4.0, 4.01).unwrap(), sites);
    let split = compute_pattern(&tetragonal, &table, &options).unwrap();
    assert_eq!(split.len(), 2);
    assert_eq!(split.peaks()[0].multiplicity(), 2);
    assert_eq!(split.peaks()[1].multiplicity(), 4);
}

#[test]
fn test_debye_waller_damps_high_angles() {
    let table = ScatteringTable::builtin();
    let mut options = config(20.0, 80.0);
    let cold = compute_pattern(&aluminium(), &table, &options).unwrap();

    options.debye_waller_factors.insert("Al".to_string(), 1.0);
    let warm = compute_pattern(&aluminium(), &table, &options).unwrap();

    assert_relative_eq!(warm.peaks()[3].intensity, 27.85, epsilon = 0.05);
    assert!(warm.peaks()[3].intensity < cold.peaks()[3].intensity);
    assert_relative_eq!(warm.peaks()[0].intensity, 100.0, epsilon = 1e-10);
}

#[test]
fn test_wavelength_presets_shift_peaks() {
    let mut calculator = XrdCalculator::new();
    calculator
        .set_wavelength(RadiationSource::MoKa)
        .set_two_theta_range(TwoThetaRange::new(10.0, 40.0).unwrap());
    let molybdenum = calculator.get_pattern(&aluminium()).unwrap();
    assert_relative_eq!(molybdenum.wavelength(), 0.7107);
    assert_relative_eq!(molybdenum.peaks()[0].two_theta, 17.4824, epsilon = 1e-3);
    assert_eq!(molybdenum.len(), 5);

    calculator.set_wavelength("CuKa".parse::<Wavelength>().unwrap());
    let copper = calculator.get_pattern(&aluminium()).unwrap();
    assert_relative_eq!(copper.peaks()[0].two_theta, 38.4686, epsilon = 1e-3);
}

#[test]
fn test_empty_structure_is_an_empty_pattern() {
    let table = ScatteringTable::builtin();
    let empty = Structure::new(Lattice::cubic(4.0).unwrap(), Vec::new());
    assert!(matches!(
        compute_pattern(&empty, &table, &PatternConfig::default()),
        Err(XrdError::EmptyPattern(_))
    ));
}

#[test]
fn test_window_without_reflections_is_an_empty_pattern() {
    let table = ScatteringTable::builtin();
    assert!(matches!(
        compute_pattern(&aluminium(), &table, &config(1.0, 2.0)),
        Err(XrdError::EmptyPattern(_))
    ));
}

#[test]
fn test_unknown_species() {
    let table = ScatteringTable::builtin();
    let structure = Structure::new(
        Lattice::cubic(4.0).unwrap(),
        vec![Site::new("Qq", [0.0, 0.0, 0.0]).unwrap()],
    );
    let err = compute_pattern(&structure, &table, &PatternConfig::default()).unwrap_err();
    assert!(matches!(
        err,
        XrdError::Scattering(ScatteringError::UnknownSpecies(ref s)) if s == "Qq"
    ));
}

#[test]
fn test_invalid_configuration() {
    let table = ScatteringTable::builtin();
    let options = PatternConfig {
        wavelength: Wavelength::Angstrom(-1.5),
        ..Default::default()
    };
    assert!(matches!(
        compute_pattern(&aluminium(), &table, &options),
        Err(XrdError::InvalidParameter(_))
    ));

    let options = PatternConfig {
        min_intensity_fraction: 1.5,
        ..Default::default()
    };
    assert!(matches!(
        compute_pattern(&aluminium(), &table, &options),
        Err(XrdError::InvalidParameter(_))
    ));
}

#[test]
fn test_cancelled_calculation_returns_no_pattern() {
    let token = CancellationToken::new();
    token.cancel();

    let calculator = XrdCalculator::new();
    assert!(matches!(
        calculator.get_pattern_with_cancellation(&rock_salt(), &token),
        Err(XrdError::Cancelled)
    ));
}

#[test]
fn test_custom_table() {
    // A table holding only Al, with the built-in coefficients
    let mut table = ScatteringTable::new();
    table
        .insert(
            "Al",
            FormFactorCoefficients::cromer_mann(
                [6.4202, 1.9002, 1.5936, 1.9646],
                [3.0387, 0.7426, 31.5472, 85.0886],
                1.1151,
            ),
        )
        .unwrap();

    let calculator = XrdCalculator::with_table(Arc::new(table));
    let custom = calculator.get_pattern(&aluminium()).unwrap();
    let builtin = XrdCalculator::new().get_pattern(&aluminium()).unwrap();
    assert_eq!(custom, builtin);

    assert!(matches!(
        calculator.get_pattern(&rock_salt()),
        Err(XrdError::Scattering(ScatteringError::UnknownSpecies(_)))
    ));
}

#[test]
fn test_backscatter_reflection_fails_in_staged_pipeline() {
    let table = ScatteringTable::builtin();
    let hydrogen = vec![Site::new("H", [0.0, 0.0, 0.0]).unwrap()];

    // λ = 2a puts (1 0 0) at exactly 2θ = 180°
    let tiny = Lattice::cubic(1.0).unwrap();
    assert!(matches!(
        evaluate_reflection(MillerIndex::new(1, 0, 0), &tiny, &hydrogen, &table, 2.0),
        Err(XrdError::InvalidRange(_))
    ));

    // A 180° reflection built by hand next to a real one is caught before
    // it can dominate the normalization
    let wide = Lattice::cubic(4.0).unwrap();
    let real = evaluate_reflection(MillerIndex::new(1, 0, 0), &wide, &hydrogen, &table, 2.0).unwrap();
    let mut backscatter = real.clone();
    backscatter.hkl = MillerIndex::new(4, 0, 0);
    backscatter.two_theta = 180.0;

    let merged = aggregate(vec![real.clone(), backscatter], DEFAULT_TWO_THETA_TOLERANCE).unwrap();
    assert_eq!(merged.len(), 2);
    assert!(matches!(
        correct_and_normalize(merged, 2.0, &NormalizationOptions::default()),
        Err(XrdError::InvalidRange(_))
    ));

    // Without it the real peak survives at full scale
    let merged = aggregate(vec![real], DEFAULT_TWO_THETA_TOLERANCE).unwrap();
    let pattern = correct_and_normalize(merged, 2.0, &NormalizationOptions::default()).unwrap();
    assert_eq!(pattern.len(), 1);
    assert_relative_eq!(pattern.peaks()[0].intensity, 100.0, epsilon = 1e-12);
}
