// crate modules
use crate::error::Result;
use mutomo_grid::{VoxelGrid, VoxelRange};
use mutomo_region::{Comparison, RegionPredicate};
use mutomo_utils::f;

// external crates
use log::debug;
use serde::{Deserialize, Serialize};

/// A region with its own hydrogen-like threshold
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BinaryRegion {
    #[serde(flatten)]
    pub predicate: RegionPredicate,
    pub threshold: f64,
}

impl BinaryRegion {
    pub fn new(predicate: RegionPredicate, threshold: f64) -> Self {
        Self {
            predicate,
            threshold,
        }
    }

    fn marks(&self, grid: &VoxelGrid, bin: [usize; 3]) -> bool {
        let sample = self.predicate.sample(grid, bin);
        self.predicate.accepts(&sample) && Comparison::Above.passes(sample.value, self.threshold)
    }
}

/// Mask of voxels at or above the threshold of any region containing them
///
/// Marked voxels are `1.0`, everything else `0.0`.
///
/// ```rust
/// # use mutomo_grid::{Dimension, VoxelGrid, VoxelRange};
/// # use mutomo_region::RegionPredicate;
/// # use mutomo_reduce::{binary_map, BinaryRegion};
/// let mut grid = VoxelGrid::uniform("histMedianMetric", [4, 1, 1], [0.0, 4.0]).unwrap();
/// for (i, v) in [11.0, 11.3, 11.3, 11.6].iter().enumerate() {
///     grid.set(i + 1, 1, 1, *v).unwrap();
/// }
///
/// let left = RegionPredicate::builder().interval(Dimension::X, 0.0, 2.0).build();
/// let right = RegionPredicate::builder().interval(Dimension::X, 2.0, 4.0).build();
/// let regions = [BinaryRegion::new(left, 11.2), BinaryRegion::new(right, 11.5)];
///
/// let map = binary_map(&grid, &VoxelRange::all(&grid), &regions).unwrap();
/// assert_eq!(map.values(), &[0.0, 1.0, 0.0, 1.0]);
/// ```
pub fn binary_map(
    grid: &VoxelGrid,
    range: &VoxelRange,
    regions: &[BinaryRegion],
) -> Result<VoxelGrid> {
    let mut map = grid.blank_like(&f!("{}_binary", grid.name));
    for region in regions {
        region.predicate.check_against(grid);
    }

    let mut marked = 0;
    for bin in range.iter() {
        if regions.iter().any(|r| r.marks(grid, bin)) {
            map.set(bin[0], bin[1], bin[2], 1.0)?;
            marked += 1;
        }
    }

    debug!("Binary map \"{}\": {marked} voxels marked", map.name);
    Ok(map)
}
