//! Integration tests for reducer invariants and reference scenarios

use mutomo_grid::{Dimension, VoxelGrid, VoxelRange};
use mutomo_reduce::{
    count_neighbours, difference, efficiency_purity, fill_distribution, neighbour_analysis,
    Binning, DifferenceOptions, Distribution,
};
use mutomo_region::{Comparison, Frame, Plane, RegionPredicate};
use rstest::{fixture, rstest};

/// Deterministic pseudo-random values in [10, 13) with some unmeasured voxels
fn noisy(name: &str, seed: u64) -> VoxelGrid {
    let mut grid = VoxelGrid::uniform(name, [8, 8, 8], [-120.0, 120.0]).unwrap();
    let mut state = seed;
    for v in grid.values_mut() {
        state = state.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
        let r = (state >> 33) as f64 / (1u64 << 31) as f64;
        *v = if r < 0.1 { 0.0 } else { 10.0 + 3.0 * r };
    }
    grid
}

/// Scenario A: 10x10x10 of 5.0 with voxel (5,5,5) unmeasured
#[fixture]
fn scenario_a() -> VoxelGrid {
    let mut grid = VoxelGrid::uniform("histMedianMetric", [10, 10, 10], [-150.0, 150.0]).unwrap();
    grid.values_mut().iter_mut().for_each(|v| *v = 5.0);
    grid.set(5, 5, 5, 0.0).unwrap();
    grid
}

#[fixture]
fn drum() -> RegionPredicate {
    RegionPredicate::builder()
        .frame(Frame::centred([30.0, 30.0, 30.0]))
        .cylinder(Plane::Yz, 90.0)
        .interval(Dimension::X, -60.0, 60.0)
        .build()
}

#[rstest]
fn scenario_a_distribution(scenario_a: VoxelGrid) {
    let d = fill_distribution(
        &scenario_a,
        &VoxelRange::all(&scenario_a),
        &RegionPredicate::everywhere(),
        Binning::new(10, 0.0, 10.0),
    )
    .unwrap();

    assert_eq!(d.entries(), 1000);
    assert_eq!(d.count(5), 999.0);
    assert_eq!(d.count(0), 1.0);
}

#[rstest]
fn scenario_a_difference(scenario_a: VoxelGrid) {
    let other = scenario_a.clone();
    let result = difference(
        &scenario_a,
        &other,
        &VoxelRange::all(&scenario_a),
        &RegionPredicate::everywhere(),
        DifferenceOptions {
            invert: false,
            binning: Some(Binning::new(500, -2.0, 2.0)),
        },
    )
    .unwrap();

    assert_eq!(result.skipped, 1);
    assert_eq!(result.compared, 999);
    assert_eq!(result.distribution.unwrap().entries(), 999);
}

#[rstest]
#[case(1, 2)]
#[case(7, 3)]
#[case(11, 13)]
fn difference_skips_unmeasured(#[case] seed_a: u64, #[case] seed_b: u64) {
    let (a, b) = (noisy("a", seed_a), noisy("b", seed_b));
    let range = VoxelRange::all(&a);
    let options = DifferenceOptions {
        invert: false,
        binning: Some(Binning::new(500, -2.0, 2.0)),
    };
    let result = difference(&a, &b, &range, &RegionPredicate::everywhere(), options).unwrap();

    let mut measured = 0;
    for (bin, va) in a.iter() {
        let vb = b.get(bin[0], bin[1], bin[2]);
        let diff = result.grid.get(bin[0], bin[1], bin[2]);
        if va == 0.0 || vb == 0.0 {
            assert_eq!(diff, 0.0);
        } else {
            assert_eq!(diff, va - vb);
            measured += 1;
        }
    }
    assert_eq!(result.compared, measured);
    assert_eq!(result.distribution.unwrap().entries(), measured as u64);
}

#[rstest]
#[case(1, 2)]
#[case(5, 9)]
fn difference_is_antisymmetric(drum: RegionPredicate, #[case] seed_a: u64, #[case] seed_b: u64) {
    let (a, b) = (noisy("a", seed_a), noisy("b", seed_b));
    let range = VoxelRange::all(&a);
    let ab = difference(&a, &b, &range, &drum, DifferenceOptions::default()).unwrap();
    let ba = difference(&b, &a, &range, &drum, DifferenceOptions::default()).unwrap();

    for (x, y) in ab.grid.values().iter().zip(ba.grid.values()) {
        assert_eq!(*x, -*y);
    }
    assert_eq!(ab.compared, ba.compared);
}

#[test]
fn difference_requires_equal_shapes() {
    let a = noisy("a", 1);
    let b = VoxelGrid::uniform("b", [8, 8, 7], [-120.0, 120.0]).unwrap();
    let err = difference(
        &a,
        &b,
        &VoxelRange::all(&a),
        &RegionPredicate::everywhere(),
        DifferenceOptions::default(),
    )
    .unwrap_err();
    assert!(matches!(
        err,
        mutomo_reduce::Error::Grid(mutomo_grid::Error::DimensionMismatch { .. })
    ));
}

#[rstest]
#[case(Binning::new(10, 0.0, 10.0))]
#[case(Binning::new(100, 10.0, 13.0))]
#[case(Binning::new(3, 50.0, 60.0))]
fn entries_match_selected_voxels(drum: RegionPredicate, #[case] binning: Binning) {
    let grid = noisy("g", 42);
    let range = VoxelRange::all(&grid);
    let selected = range.iter().filter(|b| drum.accepts_voxel(&grid, *b)).count();

    let d = fill_distribution(&grid, &range, &drum, binning).unwrap();
    assert_eq!(d.entries(), selected as u64);
    assert!(selected > 0);
}

/// Scenario B: identical uniform signal and background, 100 per bin
#[test]
fn scenario_b_efficiency() {
    let mut signal = Distribution::new("signal", Binning::new(10, 0.0, 10.0)).unwrap();
    for bin in 0..10 {
        for _ in 0..100 {
            signal.fill(bin as f64 + 0.5);
        }
    }
    let background = signal.clone();

    let points = efficiency_purity(&signal, &background).unwrap();
    assert_eq!(points.len(), 10);
    assert_eq!(points[0].efficiency, 1.0);
    assert!((points[9].efficiency - 0.1).abs() < 1e-12);
    assert!(points.iter().all(|p| p.purity == 0.5));
}

#[rstest]
#[case(1)]
#[case(2)]
#[case(3)]
fn efficiency_never_increases(#[case] seed: u64) {
    let grid = noisy("g", seed);
    let range = VoxelRange::all(&grid);
    let everything = RegionPredicate::everywhere();
    let binning = Binning::new(30, 10.0, 13.0);

    let signal = fill_distribution(&grid, &range, &everything, binning).unwrap();
    let background = fill_distribution(&noisy("b", seed + 100), &range, &everything, binning).unwrap();

    let points = efficiency_purity(&signal, &background).unwrap();
    for pair in points.windows(2) {
        assert!(pair[1].efficiency <= pair[0].efficiency);
    }
}

#[rstest]
#[case(10.5)]
#[case(11.17)]
#[case(12.5)]
fn neighbour_counts_are_complementary(#[case] threshold: f64) {
    let grid = noisy("g", 99);
    for bin in VoxelRange::all(&grid).iter() {
        let above = count_neighbours(&grid, bin, threshold, Comparison::Above);
        let below = count_neighbours(&grid, bin, threshold, Comparison::Below);
        assert_eq!(above + below, 27);
        assert!(above <= 27 && below <= 27);
    }

    let analysis = neighbour_analysis(
        &grid,
        &VoxelRange::all(&grid),
        &RegionPredicate::everywhere(),
        threshold,
    )
    .unwrap();
    let centres = grid.values().iter().filter(|v| **v >= threshold).count() as u64;
    assert_eq!(analysis.above.entries(), centres);
    assert_eq!(analysis.below.entries(), centres);
}
