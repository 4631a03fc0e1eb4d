//! Reducers, distributions, and summary statistics
#![doc = include_str!("../readme.md")]

// Split into subfiles for development, but anything important is re-exported
mod binary_map;
mod difference;
mod distribution;
mod efficiency;
mod error;
mod fill;
mod neighbours;
mod projection;
mod summary;
mod trend;
mod voxelize;

#[doc(inline)]
pub use binary_map::{binary_map, BinaryRegion};

#[doc(inline)]
pub use difference::{difference, DifferenceOptions, DifferenceResult};

#[doc(inline)]
pub use distribution::{Binning, Distribution};

#[doc(inline)]
pub use efficiency::{efficiency_purity, write_cut_points, CutPoint};

#[doc(inline)]
pub use fill::fill_distribution;

#[doc(inline)]
pub use neighbours::{count_neighbours, neighbour_analysis, neighbour_distribution, NeighbourAnalysis};

#[doc(inline)]
pub use projection::project_table;

#[doc(inline)]
pub use summary::Summary;

#[doc(inline)]
pub use trend::{linear_fit, LineFit, Trend, TrendPoint};

#[doc(inline)]
pub use voxelize::{voxelize_table, VoxelizeOptions};

#[doc(inline)]
pub use error::{Error, Result};
