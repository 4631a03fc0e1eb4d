//! Persisted collections of named grids and tables

// standard library
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

// crate modules
use crate::error::{Error, Result};
use crate::{Table, VoxelGrid};

// external crates
use log::{debug, info};
use serde::{Deserialize, Serialize};

/// On-disk encoding of a [Container]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContainerFormat {
    /// Compact `bincode` encoding
    Binary,
    /// Human readable `serde_json` encoding
    Json,
}

impl ContainerFormat {
    /// JSON for `.json` paths, binary for anything else
    pub fn from_path<P: AsRef<Path>>(path: P) -> Self {
        match path
            .as_ref()
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
        {
            Some(e) if e == "json" => Self::Json,
            _ => Self::Binary,
        }
    }
}

/// Named collection of voxel grids and event tables
///
/// Files are opened and closed within each call. Anything taken out of a
/// container owns its data and stays valid once the container is dropped.
///
/// ```rust
/// # use mutomo_grid::{Container, VoxelGrid, read_grid};
/// let grid = VoxelGrid::uniform("histBS", [4, 4, 4], [-60.0, 60.0]).unwrap();
///
/// let mut container = Container::default();
/// container.insert_grid(grid.clone());
///
/// let path = std::env::temp_dir().join("mutomo_container_doc.bin");
/// container.write(&path).unwrap();
///
/// assert_eq!(read_grid(&path, "histBS").unwrap(), grid);
/// assert!(read_grid(&path, "histNS").unwrap_err().is_not_found());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Container {
    pub grids: BTreeMap<String, VoxelGrid>,
    pub tables: BTreeMap<String, Table>,
}

impl Container {
    /// Read a whole container, format chosen by extension
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| Error::ContainerNotFound {
            path: path.to_path_buf(),
            source,
        })?;
        let reader = BufReader::new(file);

        let container: Container = match ContainerFormat::from_path(path) {
            ContainerFormat::Binary => bincode::deserialize_from(reader)?,
            ContainerFormat::Json => serde_json::from_reader(reader)?,
        };

        for grid in container.grids.values() {
            grid.validate()?;
        }
        for table in container.tables.values() {
            table.validate()?;
        }

        debug!(
            "Opened {path:?}: {} grids, {} tables",
            container.grids.len(),
            container.tables.len()
        );
        Ok(container)
    }

    /// Write the container, format chosen by extension
    pub fn write<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        self.write_as(path.as_ref(), ContainerFormat::from_path(path.as_ref()))
    }

    /// Write the container in an explicit format
    pub fn write_as<P: AsRef<Path>>(&self, path: P, format: ContainerFormat) -> Result<()> {
        let path = path.as_ref();
        let mut writer = BufWriter::new(File::create(path)?);
        match format {
            ContainerFormat::Binary => bincode::serialize_into(&mut writer, self)?,
            ContainerFormat::Json => serde_json::to_writer_pretty(&mut writer, self)?,
        }
        writer.flush()?;
        info!("Written {path:?}");
        Ok(())
    }

    /// Add or replace a grid, keyed by its name
    pub fn insert_grid(&mut self, grid: VoxelGrid) -> Option<VoxelGrid> {
        self.grids.insert(grid.name.clone(), grid)
    }

    /// Add or replace a table, keyed by its name
    pub fn insert_table(&mut self, table: Table) -> Option<Table> {
        self.tables.insert(table.name.clone(), table)
    }

    /// Borrow a grid by name
    pub fn grid(&self, name: &str) -> Result<&VoxelGrid> {
        self.grids.get(name).ok_or_else(|| Error::GridNotFound {
            name: name.to_string(),
        })
    }

    /// Borrow a table by name
    pub fn table(&self, name: &str) -> Result<&Table> {
        self.tables.get(name).ok_or_else(|| Error::TableNotFound {
            name: name.to_string(),
        })
    }

    /// Move a grid out of the container
    pub fn take_grid(&mut self, name: &str) -> Result<VoxelGrid> {
        self.grids.remove(name).ok_or_else(|| Error::GridNotFound {
            name: name.to_string(),
        })
    }

    /// Move a table out of the container
    pub fn take_table(&mut self, name: &str) -> Result<Table> {
        self.tables.remove(name).ok_or_else(|| Error::TableNotFound {
            name: name.to_string(),
        })
    }
}

/// Read every grid and table in a container file
pub fn read_container<P: AsRef<Path>>(path: P) -> Result<Container> {
    Container::open(path)
}

/// Read a single named grid, detached from the container
pub fn read_grid<P: AsRef<Path>>(path: P, field: &str) -> Result<VoxelGrid> {
    Container::open(path)?.take_grid(field)
}

/// Read a single named table, detached from the container
pub fn read_table<P: AsRef<Path>>(path: P, name: &str) -> Result<Table> {
    Container::open(path)?.take_table(name)
}
