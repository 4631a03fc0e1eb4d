// crate modules
use crate::distribution::{Binning, Distribution};
use crate::error::Result;
use mutomo_grid::{VoxelGrid, VoxelRange};
use mutomo_region::RegionPredicate;

// external crates
use log::{debug, warn};

/// Histogram the values of every selected voxel
///
/// Every voxel in `range` accepted by `predicate` is one entry, whether or not
/// its value falls inside the binning range.
pub fn fill_distribution(
    grid: &VoxelGrid,
    range: &VoxelRange,
    predicate: &RegionPredicate,
    binning: Binning,
) -> Result<Distribution> {
    predicate.check_against(grid);
    let mut distribution = Distribution::new(&grid.name, binning)?;

    for bin in range.iter() {
        let sample = predicate.sample(grid, bin);
        if predicate.accepts(&sample) {
            distribution.fill(sample.value);
        }
    }

    if distribution.entries() == 0 {
        warn!("No voxels of \"{}\" selected", grid.name);
    }
    debug!("Filled {distribution}");
    Ok(distribution)
}
