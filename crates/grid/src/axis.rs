// crate modules
use crate::error::Result;
use mutomo_utils::{f, EdgesExt};

// external crates
use serde::{Deserialize, Serialize};

/// One of the three grid axes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dimension {
    X,
    Y,
    Z,
}

impl Dimension {
    /// All three axes in storage order, x varying fastest
    pub const ALL: [Dimension; 3] = [Dimension::X, Dimension::Y, Dimension::Z];

    /// Position of the axis in `[x, y, z]` arrays
    pub fn index(&self) -> usize {
        match self {
            Self::X => 0,
            Self::Y => 1,
            Self::Z => 2,
        }
    }
}

impl std::fmt::Display for Dimension {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::X => "x",
            Self::Y => "y",
            Self::Z => "z",
        };
        write!(f, "{s}")
    }
}

/// Binning along a single grid axis
///
/// Stored as the `n + 1` bin edges. Bins are numbered from 1, with bin `0`
/// and bin `n + 1` reserved for anything below or above the axis range.
///
/// ```rust
/// # use mutomo_grid::Axis;
/// let axis = Axis::uniform(3, -45.0, 45.0).unwrap();
/// assert_eq!(axis.n_bins(), 3);
/// assert_eq!(axis.find_bin(0.0), 2);
/// assert_eq!(axis.bin_centre(1), Some(-30.0));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Axis {
    /// Axis label, usually a unit e.g. "x (mm)"
    pub title: String,
    edges: Vec<f64>,
}

impl Axis {
    /// Equal width bins between `lo` and `hi`
    pub fn uniform(n_bins: usize, lo: f64, hi: f64) -> Result<Self> {
        let width = (hi - lo) / n_bins as f64;
        let edges = (0..=n_bins)
            .map(|i| lo + i as f64 * width)
            .collect::<Vec<f64>>();
        Self::from_edges(edges)
    }

    /// Variable width bins from explicit edges
    pub fn from_edges(edges: Vec<f64>) -> Result<Self> {
        edges.check_edges()?;
        Ok(Self {
            title: String::new(),
            edges,
        })
    }

    /// Set the axis label
    pub fn with_title(mut self, title: &str) -> Self {
        self.title = title.to_string();
        self
    }

    /// Bin edges, always at least two
    pub fn edges(&self) -> &[f64] {
        &self.edges
    }

    pub fn n_bins(&self) -> usize {
        self.edges.n_bins()
    }

    /// Lower edge of the first bin
    pub fn lower(&self) -> f64 {
        self.edges[0]
    }

    /// Upper edge of the last bin
    pub fn upper(&self) -> f64 {
        self.edges[self.edges.len() - 1]
    }

    /// Bin number containing `value`, see [EdgesExt::find_bin]
    pub fn find_bin(&self, value: f64) -> usize {
        self.edges.find_bin(value)
    }

    pub fn bin_centre(&self, bin: usize) -> Option<f64> {
        self.edges.bin_centre(bin)
    }

    pub fn bin_width(&self, bin: usize) -> Option<f64> {
        self.edges.bin_width(bin)
    }

    /// Centres of all real bins, in bin order
    pub fn centres(&self) -> Vec<f64> {
        self.edges
            .windows(2)
            .map(|pair| 0.5 * (pair[0] + pair[1]))
            .collect()
    }

    /// True if every bin has the same width
    pub fn is_uniform(&self) -> bool {
        let first = self.edges[1] - self.edges[0];
        self.edges
            .windows(2)
            .all(|pair| ((pair[1] - pair[0]) - first).abs() <= 1e-9 * first.abs())
    }
}

impl std::fmt::Display for Axis {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let title = match self.title.is_empty() {
            true => String::new(),
            false => f!(" \"{}\"", self.title),
        };
        write!(
            f,
            "{} bins [{}, {}]{title}",
            self.n_bins(),
            self.lower(),
            self.upper()
        )
    }
}
