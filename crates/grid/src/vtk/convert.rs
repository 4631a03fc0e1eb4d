// standard library
use std::ops::RangeInclusive;

// crate modules
use crate::error::{Error, Result};
use crate::vtk::GridToVtkBuilder;
use crate::VoxelGrid;
use mutomo_utils::VoxelValueExt;

// external crates
use vtkio::model::{
    Attribute, Attributes, ByteOrder, Coordinates, DataArray, DataSet, ElementType, Extent,
    IOBuffer, RangeExtent, RectilinearGridPiece, Version, Vtk,
};

/// Convert voxel grids to vtk rectilinear grids for plotting
///
/// Every grid becomes one scalar cell data array. The first grid defines
/// the coordinates, so all grids must share its shape.
#[derive(Debug, PartialEq)]
pub struct GridToVtk {
    /// Byte ordering as big or little endian
    pub byte_order: ByteOrder,
    /// Replace exact zeros with NaN
    pub mask_unmeasured: bool,
    /// Dataset title
    pub title: Option<String>,
}

impl GridToVtk {
    /// Start with the default configuration
    pub fn new() -> GridToVtk {
        Default::default()
    }

    /// Get an instance of the [GridToVtkBuilder]
    pub fn builder() -> GridToVtkBuilder {
        GridToVtkBuilder::default()
    }

    /// Convert grids of identical shape into a single vtkio::Vtk object
    pub fn convert(&self, grids: &[&VoxelGrid]) -> Result<Vtk> {
        let Some(first) = grids.first() else {
            return Err(Error::NothingToConvert);
        };

        for grid in &grids[1..] {
            first.check_shape(grid)?;
        }

        let title = self.title.clone().unwrap_or_else(|| {
            grids
                .iter()
                .map(|g| g.name.as_str())
                .collect::<Vec<&str>>()
                .join(", ")
        });

        Ok(Vtk {
            version: Version::Auto,
            title,
            byte_order: self.byte_order,
            file_path: None,
            data: DataSet::inline(RectilinearGridPiece {
                extent: Self::extent(first),
                coords: Self::coordinates(first),
                data: self.collect_attributes(grids),
            }),
        })
    }

    /// Number of voxels in each extent for the rectilinear grid
    fn extent(grid: &VoxelGrid) -> Extent {
        let [nx, ny, nz] = grid.shape();
        let range_ext: RangeExtent = [
            RangeInclusive::new(0, nx as i32),
            RangeInclusive::new(0, ny as i32),
            RangeInclusive::new(0, nz as i32),
        ];
        Extent::Ranges(range_ext)
    }

    /// Coordinates are the axis bin edges
    fn coordinates(grid: &VoxelGrid) -> Coordinates {
        Coordinates {
            x: IOBuffer::F64(grid.x.edges().to_vec()),
            y: IOBuffer::F64(grid.y.edges().to_vec()),
            z: IOBuffer::F64(grid.z.edges().to_vec()),
        }
    }

    /// One cell array per grid, already in vtk cell order (x fastest)
    fn collect_attributes(&self, grids: &[&VoxelGrid]) -> Attributes {
        let mut attributes = Attributes::new();

        for grid in grids {
            let values = grid
                .values()
                .iter()
                .map(|v| match self.mask_unmeasured && v.is_unmeasured() {
                    true => f64::NAN,
                    false => *v,
                })
                .collect::<Vec<f64>>();

            attributes.cell.push(Attribute::DataArray(DataArray {
                name: grid.name.clone(),
                elem: ElementType::Scalars {
                    num_comp: 1,
                    lookup_table: None,
                },
                data: IOBuffer::F64(values),
            }));
        }

        attributes
    }
}

impl Default for GridToVtk {
    fn default() -> Self {
        GridToVtkBuilder::default().build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn masks_only_when_asked() {
        let mut grid = VoxelGrid::uniform("g", [2, 2, 2], [0.0, 2.0]).unwrap();
        grid.set(1, 1, 1, 3.0).unwrap();

        let plain = GridToVtk::new().collect_attributes(&[&grid]);
        let masked = GridToVtk::builder()
            .mask_unmeasured(true)
            .build()
            .collect_attributes(&[&grid]);

        let first = |a: &Attributes| match &a.cell[0] {
            Attribute::DataArray(DataArray {
                data: IOBuffer::F64(v),
                ..
            }) => v.clone(),
            _ => unreachable!(),
        };

        assert_eq!(first(&plain)[1], 0.0);
        assert!(first(&masked)[1].is_nan());
        assert_eq!(first(&masked)[0], 3.0);
    }

    #[test]
    fn shapes_must_match() {
        let a = VoxelGrid::uniform("a", [2, 2, 2], [0.0, 2.0]).unwrap();
        let b = VoxelGrid::uniform("b", [2, 2, 3], [0.0, 2.0]).unwrap();
        assert!(GridToVtk::new().convert(&[&a, &b]).is_err());
        assert!(GridToVtk::new().convert(&[&a, &a]).is_ok());
        assert!(GridToVtk::new().convert(&[]).is_err());
    }
}
