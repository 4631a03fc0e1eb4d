// crate modules
use crate::distribution::Binning;
use crate::error::{Error, Result};
use mutomo_grid::{Axis, Table, VoxelGrid};
use mutomo_utils::f;

// external crates
use log::{debug, warn};
use serde::{Deserialize, Serialize};

/// Box layout and statistics for [voxelize_table()]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VoxelizeOptions {
    /// Column averaged in each box, e.g. "discr"
    pub column: String,
    /// Box edge length, must divide every range exactly
    pub width: f64,
    pub x: [f64; 2],
    pub y: [f64; 2],
    pub z: [f64; 2],
    /// Histogram binning the mean is taken over
    #[serde(default = "default_binning")]
    pub binning: Binning,
    /// Bins with centres in this window contribute to the mean
    #[serde(default = "default_window")]
    pub window: [f64; 2],
}

fn default_binning() -> Binning {
    Binning::new(200, 0.0, 140.0)
}

fn default_window() -> [f64; 2] {
    [7.0, 14.0]
}

impl VoxelizeOptions {
    /// Boxes of `width` over the given ranges with the default statistics
    pub fn new(column: &str, width: f64, x: [f64; 2], y: [f64; 2], z: [f64; 2]) -> Self {
        Self {
            column: column.to_string(),
            width,
            x,
            y,
            z,
            binning: default_binning(),
            window: default_window(),
        }
    }

    /// Number of boxes along a range, failing unless it divides evenly
    fn n_boxes(&self, name: &str, [lo, hi]: [f64; 2]) -> Result<usize> {
        let n = ((hi - lo) / self.width).round();
        let divides = n >= 1.0 && ((n * self.width) - (hi - lo)).abs() <= 1e-9 * (hi - lo).abs();
        if !(self.width > 0.0) || !divides {
            return Err(Error::InvalidInput(f!(
                "{name} range [{lo}, {hi}] is not a whole number of {} wide boxes",
                self.width
            )));
        }
        Ok(n as usize)
    }
}

/// Box index of `value` if strictly inside one of `n` boxes
fn box_index(value: f64, lo: f64, width: f64, n: usize) -> Option<usize> {
    let index = ((value - lo) / width).floor();
    if !(index >= 0.0) || index >= n as f64 {
        return None;
    }
    let box_lo = lo + index * width;
    match value > box_lo && value < box_lo + width {
        true => Some(index as usize),
        false => None,
    }
}

/// Build a grid of per-box means from a per-event table
///
/// Rows are sorted into boxes by their `x`, `y`, and `z` columns, excluding
/// rows on any box face. Each box holds the histogram mean of its rows over
/// the bins whose centres fall within the window. Empty boxes stay `0.0`.
///
/// ```rust
/// # use mutomo_grid::Table;
/// # use mutomo_reduce::{voxelize_table, VoxelizeOptions};
/// let mut events = Table::new("T");
/// events.add_column("x", vec![-10.0, -10.0, 10.0, 0.0]).unwrap();
/// events.add_column("y", vec![5.0, 5.0, 5.0, 5.0]).unwrap();
/// events.add_column("z", vec![5.0, 5.0, 5.0, 5.0]).unwrap();
/// events.add_column("discr", vec![10.01, 12.01, 9.0, 99.0]).unwrap();
///
/// let options = VoxelizeOptions::new("discr", 20.0, [-20.0, 20.0], [0.0, 20.0], [0.0, 20.0]);
/// let grid = voxelize_table(&events, &options).unwrap();
///
/// assert_eq!(grid.shape(), [2, 1, 1]);
/// // binned means, 10.15 and 12.25 are the bin centres
/// assert!((grid.get(1, 1, 1) - 11.2).abs() < 1e-9);
/// assert!((grid.get(2, 1, 1) - 8.75).abs() < 1e-9);
/// ```
pub fn voxelize_table(table: &Table, options: &VoxelizeOptions) -> Result<VoxelGrid> {
    options.binning.validate()?;
    let shape = [
        options.n_boxes("x", options.x)?,
        options.n_boxes("y", options.y)?,
        options.n_boxes("z", options.z)?,
    ];

    let mut grid = VoxelGrid::new(
        &f!("{}_{}_mean", table.name, options.column),
        Axis::uniform(shape[0], options.x[0], options.x[1])?.with_title("x (mm)"),
        Axis::uniform(shape[1], options.y[0], options.y[1])?.with_title("y (mm)"),
        Axis::uniform(shape[2], options.z[0], options.z[1])?.with_title("z (mm)"),
    );

    let columns = [
        table.column("x")?,
        table.column("y")?,
        table.column("z")?,
        table.column(&options.column)?,
    ];

    // per box sum of weights and sum of weighted bin centres
    let mut sums = vec![(0.0_f64, 0.0_f64); grid.n_voxels()];
    let [lo, hi] = options.window;

    for row in 0..table.n_rows() {
        let position = [0, 1, 2].map(|d| {
            let range = [options.x, options.y, options.z][d];
            box_index(columns[d][row], range[0], options.width, shape[d])
        });
        let [Some(i), Some(j), Some(k)] = position else {
            continue;
        };

        let Ok(bin) = options.binning.index(columns[3][row]) else {
            continue;
        };
        let centre = options.binning.centre(bin);
        if centre < lo || centre > hi {
            continue;
        }

        if let Some(index) = grid.flat_index(i + 1, j + 1, k + 1) {
            sums[index].0 += 1.0;
            sums[index].1 += centre;
        }
    }

    let mut empty = 0;
    for (value, (w, wx)) in grid.values_mut().iter_mut().zip(sums) {
        match w > 0.0 {
            true => *value = wx / w,
            false => empty += 1,
        }
    }

    if empty == grid.n_voxels() {
        warn!("No rows of \"{}\" fall inside any box", table.name);
    }
    debug!(
        "Voxelized \"{}\" into {:?} boxes, {empty} empty",
        table.name, shape
    );
    Ok(grid)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ranges_must_divide() {
        let table = Table::new("T");
        let options = VoxelizeOptions::new("discr", 25.0, [-480.0, 480.0], [0.0, 50.0], [0.0, 50.0]);
        assert!(matches!(
            voxelize_table(&table, &options),
            Err(Error::InvalidInput(_))
        ));
    }

    #[test]
    fn faces_are_excluded() {
        assert_eq!(box_index(20.0, -20.0, 20.0, 2), None);
        assert_eq!(box_index(0.0, -20.0, 20.0, 2), None);
        assert_eq!(box_index(0.1, -20.0, 20.0, 2), Some(1));
        assert_eq!(box_index(-19.9, -20.0, 20.0, 2), Some(0));
        assert_eq!(box_index(f64::NAN, -20.0, 20.0, 2), None);
    }
}
