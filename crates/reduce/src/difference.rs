// crate modules
use crate::distribution::{Binning, Distribution};
use crate::error::Result;
use mutomo_grid::{VoxelGrid, VoxelRange};
use mutomo_region::RegionPredicate;
use mutomo_utils::{f, VoxelValueExt};

// external crates
use log::debug;
use serde::{Deserialize, Serialize};

/// Options for [difference()]
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct DifferenceOptions {
    /// Histogram `b - a` instead of `a - b`, the grid is unaffected
    #[serde(default)]
    pub invert: bool,
    /// Also fill a distribution of the differences
    #[serde(default)]
    pub binning: Option<Binning>,
}

/// Output of [difference()]
#[derive(Debug, Clone, PartialEq)]
pub struct DifferenceResult {
    /// `a - b` where both voxels are measured, `0.0` elsewhere
    pub grid: VoxelGrid,
    pub distribution: Option<Distribution>,
    /// Number of voxels with a difference
    pub compared: usize,
    /// Number of selected voxels skipped as unmeasured in either grid
    pub skipped: usize,
}

/// Voxel-by-voxel difference of two grids of the same shape
///
/// Voxels where either grid is exactly `0.0` are treated as unmeasured. They
/// stay `0.0` in the difference grid and are not histogrammed. The predicate
/// is evaluated with the value taken from `a`.
///
/// ```rust
/// # use mutomo_grid::{VoxelGrid, VoxelRange};
/// # use mutomo_region::RegionPredicate;
/// # use mutomo_reduce::{difference, DifferenceOptions};
/// let mut a = VoxelGrid::uniform("histBS", [2, 2, 2], [0.0, 2.0]).unwrap();
/// let mut b = a.blank_like("histNS");
/// a.set(1, 1, 1, 12.0).unwrap();
/// b.set(1, 1, 1, 11.5).unwrap();
/// a.set(2, 1, 1, 12.0).unwrap();  // unmeasured in b
///
/// let result = difference(&a, &b, &VoxelRange::all(&a), &RegionPredicate::everywhere(), DifferenceOptions::default()).unwrap();
/// assert_eq!(result.grid.get(1, 1, 1), 0.5);
/// assert_eq!(result.grid.get(2, 1, 1), 0.0);
/// assert_eq!(result.compared, 1);
/// ```
pub fn difference(
    a: &VoxelGrid,
    b: &VoxelGrid,
    range: &VoxelRange,
    predicate: &RegionPredicate,
    options: DifferenceOptions,
) -> Result<DifferenceResult> {
    a.check_shape(b)?;
    predicate.check_against(a);

    let mut grid = a.blank_like(&f!("{}-{}", a.name, b.name));
    let mut distribution = match options.binning {
        Some(binning) => Some(Distribution::new(&grid.name, binning)?),
        None => None,
    };

    let (mut compared, mut skipped) = (0, 0);
    for bin in range.iter() {
        let sample = predicate.sample(a, bin);
        if !predicate.accepts(&sample) {
            continue;
        }

        let [i, j, k] = bin;
        let (va, vb) = (a.get(i, j, k), b.get(i, j, k));
        if va.is_unmeasured() || vb.is_unmeasured() {
            skipped += 1;
            continue;
        }

        let diff = va - vb;
        grid.set(i, j, k, diff)?;
        compared += 1;

        if let Some(d) = distribution.as_mut() {
            d.fill(if options.invert { -diff } else { diff });
        }
    }

    debug!(
        "Difference \"{}\": {compared} voxels compared, {skipped} unmeasured",
        grid.name
    );
    Ok(DifferenceResult {
        grid,
        distribution,
        compared,
        skipped,
    })
}
