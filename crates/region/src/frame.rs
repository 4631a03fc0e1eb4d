// crate modules
use mutomo_grid::{Dimension, VoxelGrid};

// external crates
use log::{debug, warn};
use serde::{Deserialize, Serialize};

/// Mapping from voxel bin numbers to physical coordinates in mm
///
/// Discriminator files are usually analysed with a drum-centred frame and a
/// fixed voxel pitch, independent of the axis edges stored in the file.
///
/// ```rust
/// # use mutomo_grid::VoxelGrid;
/// # use mutomo_region::Frame;
/// let grid = VoxelGrid::uniform("g", [11, 10, 10], [0.0, 1.0]).unwrap();
/// let frame = Frame::centred([30.0, 30.0, 30.0]);
///
/// // n/2 is floored, so odd axes are not symmetric about zero
/// assert_eq!(frame.point(&grid, [1, 1, 5]), [-120.0, -120.0, 0.0]);
/// assert_eq!(frame.point(&grid, [11, 10, 10]), [180.0, 150.0, 150.0]);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Frame {
    /// `(i - n/2) * width` per axis, integer division for `n/2`
    Centred { width: [f64; 3] },
    /// Centres of the grid's own axis bins
    AxisCentres,
}

impl Frame {
    /// Drum-centred frame with the given voxel pitch on each axis
    pub fn centred(width: [f64; 3]) -> Self {
        Self::Centred { width }
    }

    /// Physical coordinate of a voxel centre
    pub fn point(&self, grid: &VoxelGrid, bin: [usize; 3]) -> [f64; 3] {
        match self {
            Self::Centred { width } => {
                let shape = grid.shape();
                [0, 1, 2].map(|d| (bin[d] as i64 - (shape[d] / 2) as i64) as f64 * width[d])
            }
            Self::AxisCentres => Dimension::ALL.map(|d| {
                grid.axis(d)
                    .bin_centre(bin[d.index()])
                    .unwrap_or(f64::NAN)
            }),
        }
    }

    /// Warn about frames that disagree with the grid they are applied to
    ///
    /// A centred frame ignores the stored axis edges entirely, so a pitch that
    /// differs from the stored bin width silently shifts every cut.
    pub fn check_against(&self, grid: &VoxelGrid) {
        let Self::Centred { width } = self else {
            debug!("Regions on \"{}\" use the stored axis bin centres", grid.name);
            return;
        };
        debug!("Regions on \"{}\" use a centred frame, pitch {width:?}", grid.name);

        for d in Dimension::ALL {
            let axis = grid.axis(d);
            if axis.n_bins() % 2 == 1 {
                warn!(
                    "Odd number of {d} bins ({}) in \"{}\", centred frame is not symmetric",
                    axis.n_bins(),
                    grid.name
                );
            }

            let pitch = width[d.index()];
            if axis.is_uniform() {
                if let Some(stored) = axis.bin_width(1) {
                    if (stored - pitch).abs() > 1e-6 * pitch.abs().max(1.0) {
                        warn!(
                            "Frame {d} pitch {pitch} differs from stored bin width {stored} in \"{}\"",
                            grid.name
                        );
                    }
                }
            }
        }
    }
}

impl Default for Frame {
    fn default() -> Self {
        Self::AxisCentres
    }
}
