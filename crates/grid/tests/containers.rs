//! Integration tests for container I/O

use mutomo_grid::vtk::{write_vtk, GridToVtk, VtkFormat};
use mutomo_grid::{read_grid, read_table, Container, Error, Table, VoxelGrid};
use rstest::{fixture, rstest};
use std::path::PathBuf;

/// 10x10x10 grid of 5.0 with a single unmeasured voxel at (5,5,5)
#[fixture]
fn drum() -> VoxelGrid {
    let mut grid = VoxelGrid::uniform("histMedianMetric", [10, 10, 10], [-150.0, 150.0]).unwrap();
    grid.values_mut().iter_mut().for_each(|v| *v = 5.0);
    grid.set(5, 5, 5, 0.0).unwrap();
    grid
}

#[fixture]
fn events() -> Table {
    let mut table = Table::new("T");
    table.add_column("x", vec![-10.0, 0.0, 10.0]).unwrap();
    table.add_column("y", vec![0.0, 50.0, 400.0]).unwrap();
    table.add_column("z", vec![0.0, 0.0, 0.0]).unwrap();
    table.add_column("discr", vec![8.0, 9.5, 13.0]).unwrap();
    table
}

fn temp(name: &str) -> PathBuf {
    std::env::temp_dir().join(name)
}

#[rstest]
#[case("mutomo_grid_roundtrip.bin")]
#[case("mutomo_grid_roundtrip.json")]
fn container_roundtrip(drum: VoxelGrid, events: Table, #[case] name: &str) {
    let path = temp(name);
    let mut container = Container::default();
    container.insert_grid(drum.clone());
    container.insert_table(events.clone());
    container.write(&path).unwrap();

    // grids and tables outlive the container they came from
    let grid = read_grid(&path, "histMedianMetric").unwrap();
    let table = read_table(&path, "T").unwrap();
    assert_eq!(grid, drum);
    assert_eq!(table, events);
    assert_eq!(grid.n_measured(), 999);
}

#[rstest]
fn missing_inputs_are_not_found(drum: VoxelGrid) {
    let path = temp("mutomo_grid_missing.bin");
    let mut container = Container::default();
    container.insert_grid(drum);
    container.write(&path).unwrap();

    let err = read_grid(temp("mutomo_grid_does_not_exist.bin"), "histMedianMetric").unwrap_err();
    assert!(matches!(err, Error::ContainerNotFound { .. }));
    assert!(err.is_not_found());

    let err = read_grid(&path, "histNS").unwrap_err();
    assert!(matches!(err, Error::GridNotFound { ref name } if name == "histNS"));

    let err = read_table(&path, "T").unwrap_err();
    assert!(matches!(err, Error::TableNotFound { .. }));
}

#[rstest]
fn shape_mismatch(drum: VoxelGrid) {
    let other = VoxelGrid::uniform("other", [10, 10, 9], [-150.0, 150.0]).unwrap();
    let err = drum.check_shape(&other).unwrap_err();
    assert!(matches!(
        err,
        Error::DimensionMismatch {
            expected: [10, 10, 10],
            found: [10, 10, 9]
        }
    ));
    assert!(!err.is_not_found());
}

#[rstest]
#[case("mutomo_grid_export_ascii.vtk", VtkFormat::LegacyAscii)]
#[case("mutomo_grid_export_binary.vtk", VtkFormat::LegacyBinary)]
#[case("mutomo_grid_export.vtr", VtkFormat::Xml)]
fn vtk_export(drum: VoxelGrid, #[case] name: &str, #[case] format: VtkFormat) {
    let path = temp(name);
    let vtk = GridToVtk::builder()
        .mask_unmeasured(true)
        .build()
        .convert(&[&drum])
        .unwrap();
    write_vtk(vtk, &path, format).unwrap();
    assert!(path.exists());
}

#[test]
fn vtk_format_from_extension() {
    assert_eq!(VtkFormat::from_path("a.vtr"), Some(VtkFormat::Xml));
    assert_eq!(VtkFormat::from_path("a.vtk"), Some(VtkFormat::LegacyBinary));
    assert_eq!(VtkFormat::from_path("a.bin"), None);
}
