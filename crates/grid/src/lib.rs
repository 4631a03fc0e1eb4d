//! Voxel grid, event table, and container file tools
#![doc = include_str!("../readme.md")]

// Split into subfiles for development, but anything important is re-exported
mod axis;
mod container;
mod error;
mod grid;
mod range;
mod table;

pub mod vtk;

#[doc(inline)]
pub use axis::{Axis, Dimension};

#[doc(inline)]
pub use container::{read_container, read_grid, read_table, Container, ContainerFormat};

#[doc(inline)]
pub use grid::VoxelGrid;

#[doc(inline)]
pub use range::{VoxelRange, Window};

#[doc(inline)]
pub use table::Table;

#[doc(inline)]
pub use vtk::{grid_to_vtk, write_vtk, VtkFormat};

#[doc(inline)]
pub use error::{Error, Result};
