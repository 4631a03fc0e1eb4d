// crate modules
use crate::error::{Error, Result};
use crate::predicate::VoxelSample;
use mutomo_grid::Dimension;
use mutomo_utils::f;

// external crates
use serde::{Deserialize, Serialize};

/// Plane perpendicular to a cylinder axis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Plane {
    Xy,
    Yz,
    Xz,
}

impl Plane {
    /// The two in-plane coordinates of a point
    pub fn project(&self, point: [f64; 3]) -> [f64; 2] {
        match self {
            Self::Xy => [point[0], point[1]],
            Self::Yz => [point[1], point[2]],
            Self::Xz => [point[0], point[2]],
        }
    }
}

/// Which side of a threshold passes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Comparison {
    /// `value >= cut`
    Above,
    /// `value < cut`
    Below,
}

impl Comparison {
    #[inline]
    pub fn passes(&self, value: f64, cut: f64) -> bool {
        match self {
            Self::Above => value >= cut,
            Self::Below => value < cut,
        }
    }

    /// The other side of the threshold
    pub fn complement(&self) -> Self {
        match self {
            Self::Above => Self::Below,
            Self::Below => Self::Above,
        }
    }
}

/// Horizontal z band relative to the drum centre
///
/// For a half width `h` the bands are disjoint and together cover every z.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ZBand {
    /// `-h < z <= h`
    Central,
    /// `z > h`
    Upper,
    /// `z <= -h`
    Lower,
}

impl ZBand {
    pub fn contains(&self, z: f64, half_width: f64) -> bool {
        match self {
            Self::Central => z > -half_width && z <= half_width,
            Self::Upper => z > half_width,
            Self::Lower => z <= -half_width,
        }
    }
}

/// A single geometric or value constraint
///
/// Coordinates are the physical voxel centre from a [Frame](crate::Frame),
/// the value is the voxel content.
///
/// ```rust
/// # use mutomo_region::{Plane, Region, VoxelSample};
/// let drum = Region::Cylinder { plane: Plane::Yz, radius: 100.0, centre: [0.0, 0.0] };
///
/// assert!(drum.accepts(&VoxelSample::at([0.0, 0.0, 0.0], 1.0)));
/// assert!(!drum.accepts(&VoxelSample::at([0.0, 150.0, 0.0], 1.0)));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "shape", rename_all = "snake_case")]
pub enum Region {
    /// Always true
    Everywhere,
    /// Strictly inside a circle in `plane`, extruded along the third axis
    Cylinder {
        plane: Plane,
        radius: f64,
        #[serde(default)]
        centre: [f64; 2],
    },
    /// `lo < coordinate <= hi` on one axis
    Interval { axis: Dimension, lo: f64, hi: f64 },
    /// `lo < c <= hi` on all three axes
    Cuboid {
        x: [f64; 2],
        y: [f64; 2],
        z: [f64; 2],
    },
    /// Voxel value against a cut
    Threshold { comparison: Comparison, cut: f64 },
    /// One of the central, upper, or lower z bands
    Band { band: ZBand, half_width: f64 },
    /// Everything except the listed voxel bins
    Exclude { bins: Vec<[usize; 3]> },
    Not { region: Box<Region> },
    All { regions: Vec<Region> },
    Any { regions: Vec<Region> },
}

impl Region {
    /// Evaluate the constraint
    pub fn accepts(&self, sample: &VoxelSample) -> bool {
        let [x, y, z] = sample.point;
        match self {
            Self::Everywhere => true,
            Self::Cylinder {
                plane,
                radius,
                centre,
            } => {
                let [a, b] = plane.project(sample.point);
                let (da, db) = (a - centre[0], b - centre[1]);
                da * da + db * db < radius * radius
            }
            Self::Interval { axis, lo, hi } => {
                let c = sample.point[axis.index()];
                *lo < c && c <= *hi
            }
            Self::Cuboid {
                x: [xl, xh],
                y: [yl, yh],
                z: [zl, zh],
            } => *xl < x && x <= *xh && *yl < y && y <= *yh && *zl < z && z <= *zh,
            Self::Threshold { comparison, cut } => comparison.passes(sample.value, *cut),
            Self::Band { band, half_width } => band.contains(z, *half_width),
            Self::Exclude { bins } => match sample.bin {
                Some(bin) => !bins.contains(&bin),
                None => true,
            },
            Self::Not { region } => !region.accepts(sample),
            Self::All { regions } => regions.iter().all(|r| r.accepts(sample)),
            Self::Any { regions } => regions.iter().any(|r| r.accepts(sample)),
        }
    }

    /// True if the constraint depends on voxel position, and so on the frame
    pub fn is_geometric(&self) -> bool {
        match self {
            Self::Cylinder { .. }
            | Self::Interval { .. }
            | Self::Cuboid { .. }
            | Self::Band { .. } => true,
            Self::Everywhere | Self::Threshold { .. } | Self::Exclude { .. } => false,
            Self::Not { region } => region.is_geometric(),
            Self::All { regions } | Self::Any { regions } => {
                regions.iter().any(|r| r.is_geometric())
            }
        }
    }

    /// Check parameters make geometric sense
    pub fn validate(&self) -> Result<()> {
        match self {
            Self::Cylinder { radius, .. } if !(radius.is_finite() && *radius > 0.0) => Err(
                Error::InvalidRegion(f!("cylinder radius must be positive, found {radius}")),
            ),
            Self::Interval { axis, lo, hi } if !(lo < hi) => Err(Error::InvalidRegion(f!(
                "empty {axis} interval ({lo}, {hi}]"
            ))),
            Self::Cuboid { x, y, z } => {
                for (name, [lo, hi]) in [("x", x), ("y", y), ("z", z)] {
                    if !(lo < hi) {
                        return Err(Error::InvalidRegion(f!(
                            "empty cuboid {name} range ({lo}, {hi}]"
                        )));
                    }
                }
                Ok(())
            }
            Self::Threshold { cut, .. } if cut.is_nan() => {
                Err(Error::InvalidRegion("threshold cut is NaN".to_string()))
            }
            Self::Band { half_width, .. } if !(*half_width >= 0.0) => Err(Error::InvalidRegion(
                f!("band half width must not be negative, found {half_width}"),
            )),
            Self::Not { region } => region.validate(),
            Self::All { regions } | Self::Any { regions } => {
                regions.iter().try_for_each(|r| r.validate())
            }
            _ => Ok(()),
        }
    }
}
