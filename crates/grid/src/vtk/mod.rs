//! Conversion of voxel grids to VTK rectilinear grids
//!
//! Any number of grids sharing the same shape may be written to a single
//! file, each as its own cell data array named after the grid.
//!
//! ```rust, no_run
//! # use mutomo_grid::read_grid;
//! # use mutomo_grid::vtk::{write_vtk, GridToVtk, VtkFormat};
//! let grid = read_grid("drum.discriminator.bin", "histMedianMetric").unwrap();
//!
//! let vtk = GridToVtk::builder()
//!     .mask_unmeasured(true)
//!     .build()
//!     .convert(&[&grid])
//!     .unwrap();
//!
//! write_vtk(vtk, "median.vtr", VtkFormat::Xml).unwrap();
//! ```

mod builder;
mod convert;

// standard library
use std::path::Path;

// crate modules
use crate::error::Result;
use crate::VoxelGrid;

// external crates
use log::info;
use serde::{Deserialize, Serialize};
use vtkio::model::{ByteOrder, Vtk};

#[doc(inline)]
pub use builder::GridToVtkBuilder;

#[doc(inline)]
pub use convert::GridToVtk;

/// Supported VTK file flavours
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VtkFormat {
    /// Legacy text format, `.vtk`
    LegacyAscii,
    /// Legacy binary format, `.vtk`
    LegacyBinary,
    /// XML format, `.vtr` for rectilinear grids
    Xml,
}

impl VtkFormat {
    /// Guess from a file extension, `None` if it is not a VTK extension
    pub fn from_path<P: AsRef<Path>>(path: P) -> Option<Self> {
        match path.as_ref().extension()?.to_str()? {
            "vtr" => Some(Self::Xml),
            "vtk" => Some(Self::LegacyBinary),
            _ => None,
        }
    }
}

/// Convert grids with the default [GridToVtk] configuration
pub fn grid_to_vtk(grids: &[&VoxelGrid]) -> Result<Vtk> {
    GridToVtk::default().convert(grids)
}

/// Write a [Vtk] to `path` in the requested format
///
/// Binary legacy files respect the byte order set on the [Vtk].
pub fn write_vtk<P: AsRef<Path>>(vtk: Vtk, path: P, format: VtkFormat) -> Result<()> {
    let path = path.as_ref();
    match format {
        VtkFormat::LegacyAscii => vtk.export_ascii(path)?,
        VtkFormat::LegacyBinary => match vtk.byte_order {
            ByteOrder::BigEndian => vtk.export_be(path)?,
            ByteOrder::LittleEndian => vtk.export_le(path)?,
        },
        VtkFormat::Xml => vtk.export(path)?,
    }
    info!("Written {path:?}");
    Ok(())
}
