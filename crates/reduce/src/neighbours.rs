//! 27-cell neighbour counting for cluster detection
//!
//! The stencil is the full 3x3x3 block around a voxel, the voxel itself
//! included, so counts run from 0 to 27. Cells outside the grid read as
//! `0.0` like any unmeasured voxel.

// crate modules
use crate::distribution::{Binning, Distribution};
use crate::error::Result;
use mutomo_grid::{VoxelGrid, VoxelRange};
use mutomo_region::{Comparison, RegionPredicate};
use mutomo_utils::f;

// external crates
use itertools::iproduct;
use log::debug;

/// Number of cells in the stencil
pub const STENCIL_SIZE: usize = 27;

/// Count stencil cells around `bin` on the given side of `threshold`
///
/// ```rust
/// # use mutomo_grid::VoxelGrid;
/// # use mutomo_region::Comparison;
/// # use mutomo_reduce::count_neighbours;
/// let mut grid = VoxelGrid::uniform("g", [5, 5, 5], [0.0, 5.0]).unwrap();
/// grid.values_mut().iter_mut().for_each(|v| *v = 12.0);
///
/// assert_eq!(count_neighbours(&grid, [3, 3, 3], 11.17, Comparison::Above), 27);
/// // a corner only has 8 cells inside the grid
/// assert_eq!(count_neighbours(&grid, [1, 1, 1], 11.17, Comparison::Above), 8);
/// assert_eq!(count_neighbours(&grid, [1, 1, 1], 11.17, Comparison::Below), 19);
/// ```
pub fn count_neighbours(
    grid: &VoxelGrid,
    bin: [usize; 3],
    threshold: f64,
    comparison: Comparison,
) -> usize {
    iproduct!(-1..=1_isize, -1..=1_isize, -1..=1_isize)
        .filter(|(a, b, c)| comparison.passes(grid.get_offset(bin, [*a, *b, *c]), threshold))
        .count()
}

/// Neighbour count distributions around centres at or above the threshold
#[derive(Debug, Clone, PartialEq)]
pub struct NeighbourAnalysis {
    /// Cells `>= threshold` around each centre
    pub above: Distribution,
    /// Cells `< threshold` around each centre
    pub below: Distribution,
}

/// Histogram both neighbour counts of every selected centre in one pass
///
/// Only centres at or above the threshold are counted. Each one fills
/// `above` and `below` once, so both hold the same number of entries.
pub fn neighbour_analysis(
    grid: &VoxelGrid,
    range: &VoxelRange,
    predicate: &RegionPredicate,
    threshold: f64,
) -> Result<NeighbourAnalysis> {
    predicate.check_against(grid);
    let binning = Binning::counts(STENCIL_SIZE - 1);
    let mut above = Distribution::new(&f!("{}_neighbours_above", grid.name), binning)?;
    let mut below = Distribution::new(&f!("{}_neighbours_below", grid.name), binning)?;

    for bin in range.iter() {
        let sample = predicate.sample(grid, bin);
        if !predicate.accepts(&sample) {
            continue;
        }

        if !Comparison::Above.passes(sample.value, threshold) {
            continue;
        }
        above.fill(count_neighbours(grid, bin, threshold, Comparison::Above) as f64);
        below.fill(count_neighbours(grid, bin, threshold, Comparison::Below) as f64);
    }

    debug!("Neighbours above: {above}");
    debug!("Neighbours below: {below}");
    Ok(NeighbourAnalysis { above, below })
}

/// Histogram neighbour counts with explicit centre and neighbour conditions
///
/// Only centres passing `centre` are counted, using cells passing `count`.
/// e.g. `(Above, Below)` gives the number of low cells around every
/// hydrogen-like voxel.
pub fn neighbour_distribution(
    grid: &VoxelGrid,
    range: &VoxelRange,
    predicate: &RegionPredicate,
    threshold: f64,
    centre: Comparison,
    count: Comparison,
) -> Result<Distribution> {
    predicate.check_against(grid);
    let mut distribution = Distribution::new(
        &f!("{}_neighbours", grid.name),
        Binning::counts(STENCIL_SIZE - 1),
    )?;

    for bin in range.iter() {
        let sample = predicate.sample(grid, bin);
        if predicate.accepts(&sample) && centre.passes(sample.value, threshold) {
            distribution.fill(count_neighbours(grid, bin, threshold, count) as f64);
        }
    }
    Ok(distribution)
}
