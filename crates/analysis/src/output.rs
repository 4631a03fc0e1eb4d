//! Where and how analysis results are written

// standard library
use std::fs::{create_dir_all, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

// crate modules
use crate::error::Result;
use mutomo_grid::vtk::{write_vtk, GridToVtk, VtkFormat};
use mutomo_grid::{Container, ContainerFormat, VoxelGrid};
use mutomo_reduce::Distribution;
use mutomo_utils::f;

// external crates
use log::info;
use serde::Serialize;

/// Output file beside the configured stem
///
/// Any extension on the stem is replaced, and a non-empty `suffix` is joined
/// with an underscore.
///
/// ```rust
/// # use std::path::PathBuf;
/// # use mutomo_analysis::output_path;
/// assert_eq!(output_path("out/slice", "", "csv"), PathBuf::from("out/slice.csv"));
/// assert_eq!(output_path("out/slice.vtk", "above", "csv"), PathBuf::from("out/slice_above.csv"));
/// ```
pub fn output_path<P: AsRef<Path>>(stem: P, suffix: &str, extension: &str) -> PathBuf {
    let stem = stem.as_ref();
    let path = match suffix.is_empty() {
        true => stem.to_path_buf(),
        false => {
            let name = stem.file_stem().unwrap_or_default().to_string_lossy();
            stem.with_file_name(f!("{name}_{suffix}"))
        }
    };
    path.with_extension(extension)
}

/// Create any missing parent directories of `path`
pub fn ensure_parent<P: AsRef<Path>>(path: P) -> Result<()> {
    if let Some(parent) = path.as_ref().parent() {
        if !parent.as_os_str().is_empty() {
            create_dir_all(parent)?;
        }
    }
    Ok(())
}

/// Write a distribution as both `.csv` and `.json`
pub fn write_distribution(
    distribution: &Distribution,
    stem: &Path,
    suffix: &str,
) -> Result<Vec<PathBuf>> {
    let csv = output_path(stem, suffix, "csv");
    let json = output_path(stem, suffix, "json");
    ensure_parent(&csv)?;
    distribution.write_csv(&csv)?;
    distribution.write_json(&json)?;
    Ok(vec![csv, json])
}

/// Write a derived grid
///
/// A `.vtk` or `.vtr` stem writes a VTK file with unmeasured voxels masked.
/// Anything else writes a container holding just this grid, as `.json` for a
/// `.json` stem and `.bin` otherwise. The extension goes through
/// [output_path()] like every other output, so a `suffix` keeps the grid
/// apart from other files written beside the same stem.
pub fn write_grid(grid: &VoxelGrid, stem: &Path, suffix: &str) -> Result<PathBuf> {
    if let Some(format) = VtkFormat::from_path(stem) {
        let extension = match format {
            VtkFormat::Xml => "vtr",
            VtkFormat::LegacyAscii | VtkFormat::LegacyBinary => "vtk",
        };
        let path = output_path(stem, suffix, extension);
        ensure_parent(&path)?;

        let mut builder = GridToVtk::builder().mask_unmeasured(true);
        if !grid.title.is_empty() {
            builder = builder.title(&grid.title);
        }
        let vtk = builder.build().convert(&[grid])?;
        write_vtk(vtk, &path, format)?;
        return Ok(path);
    }

    let extension = match ContainerFormat::from_path(stem) {
        ContainerFormat::Json => "json",
        ContainerFormat::Binary => "bin",
    };
    let path = output_path(stem, suffix, extension);
    ensure_parent(&path)?;

    let mut container = Container::default();
    container.insert_grid(grid.clone());
    container.write(&path)?;
    info!("Written {path:?}");
    Ok(path)
}

/// Write any serialisable report as pretty JSON
pub fn write_report<T: Serialize>(report: &T, stem: &Path, suffix: &str) -> Result<PathBuf> {
    let path = output_path(stem, suffix, "json");
    ensure_parent(&path)?;
    let mut writer = BufWriter::new(File::create(&path)?);
    serde_json::to_writer_pretty(&mut writer, report)?;
    writer.flush()?;
    info!("Written {path:?}");
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn suffix_and_extension() {
        assert_eq!(
            output_path("a/b/median", "cumulative", "csv"),
            PathBuf::from("a/b/median_cumulative.csv")
        );
        assert_eq!(output_path("median", "", "json"), PathBuf::from("median.json"));
        assert_eq!(output_path("median.bin", "", "json"), PathBuf::from("median.json"));
    }

    #[test]
    fn grid_extension_follows_stem() {
        let dir = std::env::temp_dir().join("mutomo_analysis_output_grid");
        let grid = VoxelGrid::uniform("g", [2, 2, 2], [0.0, 2.0]).unwrap();

        let path = write_grid(&grid, &dir.join("map.json"), "grid").unwrap();
        assert_eq!(path, dir.join("map_grid.json"));
        let path = write_grid(&grid, &dir.join("map"), "").unwrap();
        assert_eq!(path, dir.join("map.bin"));
        let path = write_grid(&grid, &dir.join("map.vtr"), "grid").unwrap();
        assert_eq!(path, dir.join("map_grid.vtr"));
        assert!(path.exists());
    }
}
