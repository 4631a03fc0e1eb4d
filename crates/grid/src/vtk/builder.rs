// crate modules
use crate::vtk::GridToVtk;

// external crates
use vtkio::model::ByteOrder;

/// Builder implementation for GridToVtk configuration
///
/// ```rust
/// # use mutomo_grid::vtk::GridToVtk;
/// # use vtkio::model::ByteOrder;
/// let converter = GridToVtk::builder()
///     .mask_unmeasured(true)
///     .byte_order(ByteOrder::LittleEndian)
///     .title("bubble map")
///     .build();
/// # assert!(converter.mask_unmeasured);
/// ```
pub struct GridToVtkBuilder {
    byte_order: ByteOrder,
    mask_unmeasured: bool,
    title: Option<String>,
}

impl GridToVtkBuilder {
    /// Create a new instance of the builder with default parameters
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the [GridToVtk] type
    pub fn build(self) -> GridToVtk {
        GridToVtk {
            byte_order: self.byte_order,
            mask_unmeasured: self.mask_unmeasured,
            title: self.title,
        }
    }

    /// Set the byte ordering
    ///
    /// Visit only reads big endian, which is the default. ParaView does not
    /// care either way.
    pub fn byte_order(mut self, order: ByteOrder) -> Self {
        self.byte_order = order;
        self
    }

    /// Write unmeasured voxels as NaN so viewers can threshold them away
    pub fn mask_unmeasured(mut self, mask: bool) -> Self {
        self.mask_unmeasured = mask;
        self
    }

    /// Dataset title, defaults to the grid names
    pub fn title(mut self, title: &str) -> Self {
        self.title = Some(title.to_string());
        self
    }
}

impl Default for GridToVtkBuilder {
    fn default() -> Self {
        Self {
            byte_order: ByteOrder::BigEndian,
            mask_unmeasured: false,
            title: None,
        }
    }
}
