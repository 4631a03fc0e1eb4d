// standard library
use std::collections::BTreeMap;
use std::path::Path;

// crate modules
use crate::error::{Error, Result};

// external crates
use log::{debug, warn};
use serde::{Deserialize, Serialize};

/// Flat per-event tree of named numeric columns
///
/// Every column has the same number of rows, one per event.
///
/// ```rust
/// # use mutomo_grid::Table;
/// let mut table = Table::new("T");
/// table.add_column("x", vec![0.0, 10.0, 20.0]).unwrap();
/// table.add_column("discr", vec![7.5, 9.1, 12.0]).unwrap();
///
/// assert_eq!(table.n_rows(), 3);
/// assert_eq!(table.column("discr").unwrap()[1], 9.1);
/// assert!(table.add_column("y", vec![1.0]).is_err());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Table {
    pub name: String,
    columns: BTreeMap<String, Vec<f64>>,
}

impl Table {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            columns: BTreeMap::new(),
        }
    }

    /// Add or replace a column, rejecting lengths that differ from the table
    pub fn add_column(&mut self, name: &str, values: Vec<f64>) -> Result<()> {
        let others = self.columns.iter().find(|(key, _)| *key != name);
        if let Some((_, existing)) = others {
            if existing.len() != values.len() {
                return Err(Error::UnequalColumnLength {
                    name: name.to_string(),
                    expected: existing.len(),
                    found: values.len(),
                });
            }
        }
        self.columns.insert(name.to_string(), values);
        Ok(())
    }

    /// Column values by name, `ColumnNotFound` if missing
    pub fn column(&self, name: &str) -> Result<&[f64]> {
        self.columns
            .get(name)
            .map(|v| v.as_slice())
            .ok_or_else(|| Error::ColumnNotFound {
                name: name.to_string(),
            })
    }

    /// Column names in sorted order
    pub fn column_names(&self) -> Vec<&str> {
        self.columns.keys().map(|k| k.as_str()).collect()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.columns.contains_key(name)
    }

    /// Number of events
    pub fn n_rows(&self) -> usize {
        self.columns.values().next().map(|c| c.len()).unwrap_or(0)
    }

    pub fn n_columns(&self) -> usize {
        self.columns.len()
    }

    /// Check every column has the same length, e.g. after deserialising
    pub fn validate(&self) -> Result<()> {
        let expected = self.n_rows();
        match self.columns.iter().find(|(_, c)| c.len() != expected) {
            Some((name, column)) => Err(Error::UnequalColumnLength {
                name: name.clone(),
                expected,
                found: column.len(),
            }),
            None => Ok(()),
        }
    }

    /// Read a table from a CSV file with a header row
    ///
    /// Every field must parse as a number. Columns are named by the header.
    pub fn from_csv<P: AsRef<Path>>(name: &str, path: P) -> Result<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_path(path.as_ref())?;

        let headers = reader
            .headers()?
            .iter()
            .map(|h| h.to_string())
            .collect::<Vec<String>>();
        let mut columns: Vec<Vec<f64>> = vec![Vec::new(); headers.len()];

        for record in reader.deserialize::<Vec<f64>>() {
            let row = record?;
            for (column, value) in columns.iter_mut().zip(row) {
                column.push(value);
            }
        }

        let mut table = Self::new(name);
        for (header, column) in headers.iter().zip(columns) {
            if table.has_column(header) {
                warn!("Duplicate column \"{header}\" in csv, keeping the last one");
            }
            table.add_column(header, column)?;
        }

        debug!(
            "Read table \"{name}\" from {:?}: {} columns, {} rows",
            path.as_ref(),
            table.n_columns(),
            table.n_rows()
        );
        Ok(table)
    }
}

impl std::fmt::Display for Table {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Table \"{}\"", self.name)?;
        writeln!(f, "  rows    : {}", self.n_rows())?;
        write!(f, "  columns : {}", self.column_names().join(", "))
    }
}
