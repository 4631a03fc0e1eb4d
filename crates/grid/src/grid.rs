// crate modules
use crate::axis::{Axis, Dimension};
use crate::error::{Error, Result};
use mutomo_utils::{f, ValueExt, VoxelValueExt};

// external crates
use log::warn;
use serde::{Deserialize, Serialize};

/// Regular 3D field of voxel values
///
/// Values are stored flat with x varying fastest, then y, then z. Indices
/// passed to the accessors use histogram bin numbers, so real voxels are
/// `1..=n` on every axis.
///
/// Reading outside the grid is allowed and always returns `0.0`, the same
/// value as an unmeasured voxel. This keeps stencil operations near the
/// border simple.
///
/// ```rust
/// # use mutomo_grid::VoxelGrid;
/// let mut grid = VoxelGrid::uniform("example", [10, 10, 10], [-150.0, 150.0]).unwrap();
/// grid.set(5, 5, 5, 11.2).unwrap();
///
/// assert_eq!(grid.get(5, 5, 5), 11.2);
/// assert_eq!(grid.get(0, 5, 5), 0.0);   // underflow
/// assert_eq!(grid.get(5, 5, 11), 0.0);  // overflow
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VoxelGrid {
    /// Field name within a container, e.g. "histMedianMetric"
    pub name: String,
    /// Optional free text description
    pub title: String,
    pub x: Axis,
    pub y: Axis,
    pub z: Axis,
    values: Vec<f64>,
}

impl VoxelGrid {
    /// New grid of unmeasured voxels over the given axes
    pub fn new(name: &str, x: Axis, y: Axis, z: Axis) -> Self {
        let n = x.n_bins() * y.n_bins() * z.n_bins();
        Self {
            name: name.to_string(),
            title: String::new(),
            x,
            y,
            z,
            values: vec![0.0; n],
        }
    }

    /// New grid with the same uniform `[lo, hi]` range on every axis
    pub fn uniform(name: &str, shape: [usize; 3], range: [f64; 2]) -> Result<Self> {
        Ok(Self::new(
            name,
            Axis::uniform(shape[0], range[0], range[1])?,
            Axis::uniform(shape[1], range[0], range[1])?,
            Axis::uniform(shape[2], range[0], range[1])?,
        ))
    }

    /// Grid from existing values in storage order
    ///
    /// Fails if the number of values is not exactly `nx*ny*nz`.
    pub fn from_values(name: &str, x: Axis, y: Axis, z: Axis, values: Vec<f64>) -> Result<Self> {
        let mut grid = Self::new(name, x, y, z);
        if values.len() != grid.values.len() {
            return Err(Error::UnexpectedNumberOfVoxels {
                expected: grid.values.len(),
                found: values.len(),
            });
        }
        grid.values = values;
        Ok(grid)
    }

    /// Set the title
    pub fn with_title(mut self, title: &str) -> Self {
        self.title = title.to_string();
        self
    }

    /// Number of real bins as `[nx, ny, nz]`
    pub fn shape(&self) -> [usize; 3] {
        [self.x.n_bins(), self.y.n_bins(), self.z.n_bins()]
    }

    /// Total number of voxels
    pub fn n_voxels(&self) -> usize {
        self.values.len()
    }

    /// Axis for a given dimension
    pub fn axis(&self, dimension: Dimension) -> &Axis {
        match dimension {
            Dimension::X => &self.x,
            Dimension::Y => &self.y,
            Dimension::Z => &self.z,
        }
    }

    /// Flat storage index of a real voxel, `None` outside `1..=n`
    pub fn flat_index(&self, i: usize, j: usize, k: usize) -> Option<usize> {
        let [nx, ny, nz] = self.shape();
        if !(1..=nx).contains(&i) || !(1..=ny).contains(&j) || !(1..=nz).contains(&k) {
            return None;
        }
        Some((i - 1) + nx * ((j - 1) + ny * (k - 1)))
    }

    /// Bin numbers of a flat storage index
    pub fn bin_of(&self, index: usize) -> Option<[usize; 3]> {
        if index >= self.values.len() {
            return None;
        }
        let [nx, ny, _] = self.shape();
        Some([index % nx + 1, (index / nx) % ny + 1, index / (nx * ny) + 1])
    }

    /// Value of voxel `(i, j, k)`, `0.0` outside the grid
    pub fn get(&self, i: usize, j: usize, k: usize) -> f64 {
        self.flat_index(i, j, k)
            .map(|index| self.values[index])
            .unwrap_or(0.0)
    }

    /// Same as [get()](VoxelGrid::get) for signed neighbour offsets
    ///
    /// Anything that would step below bin 0 is outside the grid.
    pub fn get_offset(&self, bin: [usize; 3], offset: [isize; 3]) -> f64 {
        let shifted = [0, 1, 2].map(|d| bin[d].checked_add_signed(offset[d]));
        match shifted {
            [Some(i), Some(j), Some(k)] => self.get(i, j, k),
            _ => 0.0,
        }
    }

    /// Set the value of a real voxel
    pub fn set(&mut self, i: usize, j: usize, k: usize, value: f64) -> Result<()> {
        let index = self
            .flat_index(i, j, k)
            .ok_or_else(|| Error::OutOfBounds {
                bin: [i, j, k],
                shape: self.shape(),
            })?;
        self.values[index] = value;
        Ok(())
    }

    /// Raw values in storage order
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Mutable raw values in storage order
    pub fn values_mut(&mut self) -> &mut [f64] {
        &mut self.values
    }

    /// Set every voxel back to unmeasured
    pub fn reset(&mut self) {
        self.values.iter_mut().for_each(|v| *v = 0.0);
    }

    /// Empty copy with the same axes and a new name
    pub fn blank_like(&self, name: &str) -> Self {
        Self::new(name, self.x.clone(), self.y.clone(), self.z.clone()).with_title(&self.title)
    }

    /// Fail with `DimensionMismatch` unless both grids have the same shape
    pub fn check_shape(&self, other: &VoxelGrid) -> Result<()> {
        if self.shape() != other.shape() {
            return Err(Error::DimensionMismatch {
                expected: self.shape(),
                found: other.shape(),
            });
        }
        Ok(())
    }

    /// Check internal consistency, e.g. after deserialising
    pub fn validate(&self) -> Result<()> {
        for axis in [&self.x, &self.y, &self.z] {
            mutomo_utils::EdgesExt::check_edges(axis.edges())?;
        }

        let expected = self.shape().iter().product::<usize>();
        if self.values.len() != expected {
            return Err(Error::UnexpectedNumberOfVoxels {
                expected,
                found: self.values.len(),
            });
        }

        if self.values.iter().any(|v| v.is_nan()) {
            warn!("Grid \"{}\" contains NaN voxel values", self.name);
        }
        Ok(())
    }

    /// Iterate over `([i, j, k], value)` for every voxel in storage order
    pub fn iter(&self) -> impl Iterator<Item = ([usize; 3], f64)> + '_ {
        let [nx, ny, _] = self.shape();
        self.values.iter().enumerate().map(move |(index, value)| {
            let bin = [index % nx + 1, (index / nx) % ny + 1, index / (nx * ny) + 1];
            (bin, *value)
        })
    }

    /// Number of voxels holding a measurement, i.e. not exactly zero
    pub fn n_measured(&self) -> usize {
        self.values.iter().filter(|v| v.is_measured()).count()
    }

    /// Smallest and largest measured values
    pub fn measured_range(&self) -> Option<(f64, f64)> {
        self.values
            .iter()
            .copied()
            .filter(|v| v.is_measured() && !v.is_nan())
            .fold(None, |acc, v| match acc {
                None => Some((v, v)),
                Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
            })
    }
}

impl std::fmt::Display for VoxelGrid {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let [nx, ny, nz] = self.shape();
        writeln!(f, "Grid \"{}\" {}", self.name, self.title)?;
        writeln!(f, "  shape    : {nx} x {ny} x {nz} ({} voxels)", self.n_voxels())?;
        writeln!(f, "  x        : {}", self.x)?;
        writeln!(f, "  y        : {}", self.y)?;
        writeln!(f, "  z        : {}", self.z)?;
        let range = match self.measured_range() {
            Some((lo, hi)) => f!("[{}, {}]", lo.sci(4, 2), hi.sci(4, 2)),
            None => "none".to_string(),
        };
        write!(f, "  measured : {} voxels, {range}", self.n_measured())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small() -> VoxelGrid {
        let values = (1..=24).map(|v| v as f64).collect();
        VoxelGrid::from_values(
            "small",
            Axis::uniform(2, 0.0, 2.0).unwrap(),
            Axis::uniform(3, 0.0, 3.0).unwrap(),
            Axis::uniform(4, 0.0, 4.0).unwrap(),
            values,
        )
        .unwrap()
    }

    #[test]
    fn storage_order_is_x_fastest() {
        let grid = small();
        assert_eq!(grid.get(1, 1, 1), 1.0);
        assert_eq!(grid.get(2, 1, 1), 2.0);
        assert_eq!(grid.get(1, 2, 1), 3.0);
        assert_eq!(grid.get(1, 1, 2), 7.0);
        assert_eq!(grid.get(2, 3, 4), 24.0);
        assert_eq!(grid.bin_of(23), Some([2, 3, 4]));
    }

    #[test]
    fn iter_matches_get() {
        let grid = small();
        for ([i, j, k], value) in grid.iter() {
            assert_eq!(grid.get(i, j, k), value);
        }
        assert_eq!(grid.iter().count(), 24);
    }

    #[test]
    fn outside_reads_zero_and_writes_fail() {
        let mut grid = small();
        assert_eq!(grid.get(3, 1, 1), 0.0);
        assert_eq!(grid.get_offset([1, 1, 1], [-1, 0, 0]), 0.0);
        assert_eq!(grid.get_offset([1, 1, 1], [1, 1, 1]), grid.get(2, 2, 2));
        assert!(matches!(
            grid.set(0, 1, 1, 1.0),
            Err(Error::OutOfBounds { .. })
        ));
    }

    #[test]
    fn wrong_number_of_values() {
        let result = VoxelGrid::from_values(
            "bad",
            Axis::uniform(2, 0.0, 2.0).unwrap(),
            Axis::uniform(2, 0.0, 2.0).unwrap(),
            Axis::uniform(2, 0.0, 2.0).unwrap(),
            vec![1.0; 7],
        );
        assert!(matches!(
            result,
            Err(Error::UnexpectedNumberOfVoxels {
                expected: 8,
                found: 7
            })
        ));
    }

    #[test]
    fn blank_and_reset() {
        let mut grid = small();
        let blank = grid.blank_like("blank");
        assert_eq!(blank.shape(), grid.shape());
        assert_eq!(blank.n_measured(), 0);
        assert!(grid.check_shape(&blank).is_ok());

        grid.reset();
        assert_eq!(grid.n_measured(), 0);
        assert_eq!(grid.measured_range(), None);
    }
}
