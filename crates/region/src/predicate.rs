// crate modules
use crate::error::Result;
use crate::frame::Frame;
use crate::region::{Comparison, Plane, Region, ZBand};
use mutomo_grid::{Dimension, VoxelGrid};

// external crates
use serde::{Deserialize, Serialize};

/// Everything a region needs to know about one voxel or event
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VoxelSample {
    /// Bin numbers, only for samples taken from a grid
    pub bin: Option<[usize; 3]>,
    /// Physical position in mm
    pub point: [f64; 3],
    /// Voxel content or event value
    pub value: f64,
}

impl VoxelSample {
    /// Sample at an arbitrary point, e.g. a single event
    pub fn at(point: [f64; 3], value: f64) -> Self {
        Self {
            bin: None,
            point,
            value,
        }
    }

    /// Sample a grid voxel through a frame
    pub fn from_grid(grid: &VoxelGrid, frame: &Frame, bin: [usize; 3]) -> Self {
        Self {
            bin: Some(bin),
            point: frame.point(grid, bin),
            value: grid.get(bin[0], bin[1], bin[2]),
        }
    }
}

/// Conjunction of regions evaluated in a given frame
///
/// An empty predicate accepts everything. Alternatives that should be
/// evaluated as separate selections (e.g. the three z bands) are separate
/// predicates, not an [Any](Region::Any) of one.
///
/// The frame has no serde default, so every predicate read from JSON names
/// the coordinates its regions are evaluated in.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RegionPredicate {
    pub frame: Frame,
    #[serde(default)]
    pub regions: Vec<Region>,
}

impl RegionPredicate {
    /// Predicate accepting every voxel
    pub fn everywhere() -> Self {
        Self::default()
    }

    pub fn new(frame: Frame, regions: Vec<Region>) -> Self {
        Self { frame, regions }
    }

    /// Get an instance of the [RegionPredicateBuilder]
    pub fn builder() -> RegionPredicateBuilder {
        RegionPredicateBuilder::default()
    }

    /// True only if every region accepts the sample
    pub fn accepts(&self, sample: &VoxelSample) -> bool {
        self.regions.iter().all(|r| r.accepts(sample))
    }

    /// Evaluate for a grid voxel
    pub fn accepts_voxel(&self, grid: &VoxelGrid, bin: [usize; 3]) -> bool {
        self.accepts(&self.sample(grid, bin))
    }

    /// Evaluate for a position and value not tied to a grid
    pub fn accepts_point(&self, point: [f64; 3], value: f64) -> bool {
        self.accepts(&VoxelSample::at(point, value))
    }

    /// Sample a voxel using this predicate's frame
    pub fn sample(&self, grid: &VoxelGrid, bin: [usize; 3]) -> VoxelSample {
        VoxelSample::from_grid(grid, &self.frame, bin)
    }

    /// Same predicate with one more region
    pub fn and(mut self, region: Region) -> Self {
        self.regions.push(region);
        self
    }

    /// Check every region is geometrically sensible
    pub fn validate(&self) -> Result<()> {
        self.regions.iter().try_for_each(|r| r.validate())
    }

    /// True if any region depends on voxel position
    pub fn is_geometric(&self) -> bool {
        self.regions.iter().any(|r| r.is_geometric())
    }

    /// Log warnings where the frame and grid disagree
    pub fn check_against(&self, grid: &VoxelGrid) {
        self.frame.check_against(grid)
    }
}

/// Builder implementation for [RegionPredicate]
///
/// Every call adds one more constraint, combined by AND.
///
/// ```rust
/// # use mutomo_grid::Dimension;
/// # use mutomo_region::{Comparison, Frame, Plane, RegionPredicate, ZBand};
/// let upper_slice = RegionPredicate::builder()
///     .frame(Frame::centred([30.0, 30.0, 30.0]))
///     .cylinder(Plane::Yz, 240.0)
///     .interval(Dimension::X, -100.0, 0.0)
///     .band(ZBand::Upper, 100.0)
///     .build();
///
/// assert!(upper_slice.accepts_point([-50.0, 0.0, 150.0], 1.0));
/// assert!(!upper_slice.accepts_point([-50.0, 0.0, 50.0], 1.0));
/// ```
#[derive(Debug, Default)]
pub struct RegionPredicateBuilder {
    frame: Frame,
    regions: Vec<Region>,
}

impl RegionPredicateBuilder {
    /// Create a new instance of the builder with default parameters
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the [RegionPredicate] type
    pub fn build(self) -> RegionPredicate {
        RegionPredicate {
            frame: self.frame,
            regions: self.regions,
        }
    }

    /// Bin to coordinate mapping, axis bin centres by default
    pub fn frame(mut self, frame: Frame) -> Self {
        self.frame = frame;
        self
    }

    /// Any region
    pub fn region(mut self, region: Region) -> Self {
        self.regions.push(region);
        self
    }

    /// Several regions at once
    pub fn regions(mut self, regions: impl IntoIterator<Item = Region>) -> Self {
        self.regions.extend(regions);
        self
    }

    /// Cylinder about the origin
    pub fn cylinder(self, plane: Plane, radius: f64) -> Self {
        self.region(Region::Cylinder {
            plane,
            radius,
            centre: [0.0, 0.0],
        })
    }

    /// `lo < coordinate <= hi`
    pub fn interval(self, axis: Dimension, lo: f64, hi: f64) -> Self {
        self.region(Region::Interval { axis, lo, hi })
    }

    pub fn threshold(self, comparison: Comparison, cut: f64) -> Self {
        self.region(Region::Threshold { comparison, cut })
    }

    pub fn band(self, band: ZBand, half_width: f64) -> Self {
        self.region(Region::Band { band, half_width })
    }

    /// Skip specific voxels, e.g. known hot spots
    pub fn exclude(self, bins: Vec<[usize; 3]>) -> Self {
        self.region(Region::Exclude { bins })
    }
}
