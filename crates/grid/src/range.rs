// crate modules
use crate::grid::VoxelGrid;
use crate::Axis;

// external crates
use serde::{Deserialize, Serialize};

/// Physical window `[lo, hi]` along any of the three axes
///
/// Missing axes cover the whole grid.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Window {
    pub x: Option<[f64; 2]>,
    pub y: Option<[f64; 2]>,
    pub z: Option<[f64; 2]>,
}

impl Window {
    /// True if no axis is restricted
    pub fn is_unbounded(&self) -> bool {
        self.x.is_none() && self.y.is_none() && self.z.is_none()
    }
}

/// Block of voxel bin numbers to iterate over
///
/// Lower bounds are inclusive and upper bounds exclusive, always within the
/// real bins `1..=n` of the grid it was made for.
///
/// ```rust
/// # use mutomo_grid::{VoxelGrid, VoxelRange, Window};
/// let grid = VoxelGrid::uniform("g", [10, 10, 10], [0.0, 100.0]).unwrap();
/// let window = Window { x: Some([20.0, 50.0]), ..Default::default() };
///
/// let range = VoxelRange::from_window(&grid, &window);
/// assert_eq!(range.len(), 3 * 10 * 10);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VoxelRange {
    pub start: [usize; 3],
    pub end: [usize; 3],
}

impl VoxelRange {
    /// Every real voxel of the grid
    pub fn all(grid: &VoxelGrid) -> Self {
        let [nx, ny, nz] = grid.shape();
        Self {
            start: [1, 1, 1],
            end: [nx + 1, ny + 1, nz + 1],
        }
    }

    /// Voxels whose bins lie between the bins of the window edges
    ///
    /// Mirrors the common `for i in find_bin(lo)..find_bin(hi)` loop, so the
    /// bin containing `hi` is excluded. Bounds are clamped to the real bins.
    pub fn from_window(grid: &VoxelGrid, window: &Window) -> Self {
        let [x, y, z] = [
            Self::axis_bounds(&grid.x, window.x),
            Self::axis_bounds(&grid.y, window.y),
            Self::axis_bounds(&grid.z, window.z),
        ];
        Self {
            start: [x.0, y.0, z.0],
            end: [x.1, y.1, z.1],
        }
    }

    fn axis_bounds(axis: &Axis, window: Option<[f64; 2]>) -> (usize, usize) {
        let n = axis.n_bins();
        match window {
            None => (1, n + 1),
            Some([lo, hi]) => {
                let start = axis.find_bin(lo).clamp(1, n + 1);
                let end = axis.find_bin(hi).clamp(1, n + 1);
                (start, end.max(start))
            }
        }
    }

    /// Number of voxels in the range
    pub fn len(&self) -> usize {
        (0..3).map(|d| self.end[d] - self.start[d]).product()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// True if the bin triple is inside the range
    pub fn contains(&self, bin: [usize; 3]) -> bool {
        (0..3).all(|d| (self.start[d]..self.end[d]).contains(&bin[d]))
    }

    /// Iterate over bin triples, x fastest
    pub fn iter(&self) -> impl Iterator<Item = [usize; 3]> {
        let [sx, sy, sz] = self.start;
        let [ex, ey, ez] = self.end;
        (sz..ez).flat_map(move |k| (sy..ey).flat_map(move |j| (sx..ex).map(move |i| [i, j, k])))
    }
}
