/*
MIT License

Copyright (c) 2025 Ameyanagi
*/

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use xrd_rs::diffraction::{
    compute_pattern, enumerate, PatternConfig, StructureFactorEvaluator, TwoThetaRange,
};
use xrd_rs::scattering::ScatteringTable;
use xrd_rs::structure::{Lattice, MillerIndex, Site, Structure};

/// Rock-salt supercell with `n`³ conventional cells
fn rock_salt_supercell(n: usize) -> Structure {
    let a = 5.64;
    let mut sites = Vec::new();
    let step = 1.0 / n as f64;
    for i in 0..n {
        for j in 0..n {
            for k in 0..n {
                let origin = [i as f64 * step, j as f64 * step, k as f64 * step];
                for [x, y, z] in [
                    [0.0, 0.0, 0.0],
                    [0.5, 0.5, 0.0],
                    [0.5, 0.0, 0.5],
                    [0.0, 0.5, 0.5],
                ] {
                    let na = [origin[0] + x * step, origin[1] + y * step, origin[2] + z * step];
                    let cl = [na[0] + 0.5 * step, na[1] + 0.5 * step, na[2] + 0.5 * step];
                    sites.push(Site::new("Na", na).unwrap());
                    sites.push(Site::new("Cl", cl).unwrap());
                }
            }
        }
    }
    Structure::new(Lattice::cubic(a * n as f64).unwrap(), sites)
}

fn structure_factor_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("Structure Factors");
    let table = ScatteringTable::builtin();

    for n in [1, 2, 3] {
        let structure = rock_salt_supercell(n);
        let evaluator = StructureFactorEvaluator::new(
            structure.lattice(),
            structure.sites(),
            &table,
            1.5406,
        )
        .unwrap();
        let candidates: Vec<MillerIndex> = enumerate(
            structure.lattice(),
            1.5406,
            TwoThetaRange::new(10.0, 90.0).unwrap(),
        )
        .unwrap()
        .collect();

        group.bench_with_input(
            BenchmarkId::new("serial", structure.num_sites()),
            &candidates,
            |b, candidates| b.iter(|| black_box(evaluator.evaluate_all(candidates, false, None))),
        );
        group.bench_with_input(
            BenchmarkId::new("parallel", structure.num_sites()),
            &candidates,
            |b, candidates| b.iter(|| black_box(evaluator.evaluate_all(candidates, true, None))),
        );
    }

    group.finish();
}

fn pattern_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("Patterns");
    let table = ScatteringTable::builtin();
    let structure = rock_salt_supercell(2);
    let config = PatternConfig::default();

    group.bench_function("rock_salt_2x2x2", |b| {
        b.iter(|| black_box(compute_pattern(black_box(&structure), &table, &config)))
    });

    group.finish();
}

criterion_group!(benches, structure_factor_benchmark, pattern_benchmark);
criterion_main!(benches);
