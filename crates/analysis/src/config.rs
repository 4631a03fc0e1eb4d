//! Serde types describing a batch of analyses

// standard library
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

// crate modules
use crate::error::{Error, Result};
use mutomo_grid::{VoxelGrid, VoxelRange, Window};
use mutomo_reduce::{BinaryRegion, Binning, DifferenceOptions, VoxelizeOptions};
use mutomo_region::{CutExpr, Frame, Region, RegionPredicate};
use mutomo_utils::f;

// external crates
use log::debug;
use serde::{Deserialize, Serialize};

/// Every analysis to run, in order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalysisConfig {
    pub analyses: Vec<Analysis>,
}

impl AnalysisConfig {
    /// Read a JSON configuration file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let reader = BufReader::new(File::open(path)?);
        let config: AnalysisConfig = serde_json::from_reader(reader)?;
        debug!("Read {} analyses from {path:?}", config.analyses.len());
        Ok(config)
    }

    /// Parse a JSON configuration string
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Check every analysis before anything is run
    pub fn validate(&self) -> Result<()> {
        self.analyses.iter().try_for_each(|a| a.validate())
    }
}

/// A single named analysis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Analysis {
    pub name: String,
    pub task: Task,
    /// Output path, extensions are replaced per output type
    pub output: PathBuf,
}

impl Analysis {
    /// Check regions, binning, and cut strings without touching any file
    pub fn validate(&self) -> Result<()> {
        let invalid = |reason: String| Error::InvalidConfig {
            analysis: self.name.clone(),
            reason,
        };

        if self.output.as_os_str().is_empty() {
            return Err(invalid("empty output path".to_string()));
        }

        match &self.task {
            Task::Distribution {
                selection, binning, ..
            }
            | Task::Difference {
                selection,
                options:
                    DifferenceOptions {
                        binning: Some(binning),
                        ..
                    },
                ..
            }
            | Task::Significance {
                selection, binning, ..
            }
            | Task::Trend {
                selection, binning, ..
            } => {
                selection.validate()?;
                binning.validate()?;
            }
            Task::Difference { selection, .. } | Task::Neighbours { selection, .. } => {
                selection.validate()?
            }
            Task::Efficiency {
                selection,
                background_selection,
                binning,
                ..
            } => {
                selection.validate()?;
                if let Some(s) = background_selection {
                    s.validate()?;
                }
                binning.validate()?;
            }
            Task::BinaryMap { regions, .. } => {
                if regions.is_empty() {
                    return Err(invalid("binary map without any regions".to_string()));
                }
                for region in regions {
                    region.predicate.validate()?;
                }
            }
            Task::Projection { cut, binning, .. } => {
                CutExpr::parse(cut)?;
                binning.validate()?;
            }
            Task::Voxelize { options, .. } => options.binning.validate()?,
        }

        if let Task::Trend { points, .. } = &self.task {
            if points.len() < 2 {
                return Err(invalid(f!("trend needs at least 2 points, found {}", points.len())));
            }
        }
        Ok(())
    }
}

/// A named voxel grid inside a container file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridSource {
    pub path: PathBuf,
    pub field: String,
}

/// A named event table inside a container file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableSource {
    pub path: PathBuf,
    pub table: String,
}

/// Which voxels of a grid to use
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Selection {
    /// Bin to mm mapping used by every region, required by geometric regions
    pub frame: Option<Frame>,
    /// Physical loop window, see [VoxelRange::from_window]
    pub window: Window,
    /// Constraints combined with AND
    pub regions: Vec<Region>,
}

impl Selection {
    /// Predicate over the regions, in the stored axis centres if no frame is set
    pub fn predicate(&self) -> RegionPredicate {
        RegionPredicate::new(self.frame.unwrap_or_default(), self.regions.clone())
    }

    pub fn range(&self, grid: &VoxelGrid) -> VoxelRange {
        VoxelRange::from_window(grid, &self.window)
    }

    /// Check the regions, and that geometric regions come with a frame
    pub fn validate(&self) -> Result<()> {
        let predicate = self.predicate();
        predicate.validate()?;
        if self.frame.is_none() && predicate.is_geometric() {
            return Err(mutomo_region::Error::InvalidRegion(
                "geometric regions need an explicit frame".to_string(),
            )
            .into());
        }
        Ok(())
    }
}

/// One point of a trend: a grid and the control value it was taken at
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendSource {
    pub x: f64,
    #[serde(flatten)]
    pub source: GridSource,
}

/// The reduction an analysis performs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Task {
    /// Histogram of selected voxel values
    Distribution {
        source: GridSource,
        #[serde(default)]
        selection: Selection,
        binning: Binning,
        /// Report mean and error over bins in this window
        #[serde(default)]
        summary_window: Option<[f64; 2]>,
        /// Also write the backward cumulative in percent of the total
        #[serde(default)]
        cumulative: bool,
    },
    /// Voxel-by-voxel difference `a - b`
    Difference {
        a: GridSource,
        b: GridSource,
        #[serde(default)]
        selection: Selection,
        #[serde(flatten)]
        options: DifferenceOptions,
    },
    /// Efficiency and purity of a threshold cut
    Efficiency {
        signal: GridSource,
        background: GridSource,
        #[serde(default)]
        selection: Selection,
        /// Selection for the background grid if it differs
        #[serde(default)]
        background_selection: Option<Selection>,
        binning: Binning,
    },
    /// 27-cell neighbour count distributions
    Neighbours {
        source: GridSource,
        #[serde(default)]
        selection: Selection,
        threshold: f64,
    },
    /// 0/1 map of voxels above per-region thresholds
    BinaryMap {
        source: GridSource,
        #[serde(default)]
        window: Window,
        regions: Vec<BinaryRegion>,
    },
    /// Histogram of a table column passing a cut string
    Projection {
        source: TableSource,
        column: String,
        #[serde(default = "default_cut")]
        cut: String,
        binning: Binning,
        #[serde(default)]
        summary_window: Option<[f64; 2]>,
    },
    /// Separation of a signal and background mean
    Significance {
        signal: GridSource,
        background: GridSource,
        #[serde(default)]
        selection: Selection,
        binning: Binning,
        summary_window: [f64; 2],
    },
    /// Summaries against a control variable with a straight line fit
    Trend {
        points: Vec<TrendSource>,
        /// Subtract this grid's summary from every point
        #[serde(default)]
        reference: Option<GridSource>,
        #[serde(default)]
        selection: Selection,
        binning: Binning,
        summary_window: [f64; 2],
    },
    /// Per-box means of a table column
    Voxelize {
        source: TableSource,
        #[serde(flatten)]
        options: VoxelizeOptions,
    },
}

fn default_cut() -> String {
    "1".to_string()
}

impl Task {
    /// Short name of the task kind for logging
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Distribution { .. } => "distribution",
            Self::Difference { .. } => "difference",
            Self::Efficiency { .. } => "efficiency",
            Self::Neighbours { .. } => "neighbours",
            Self::BinaryMap { .. } => "binary_map",
            Self::Projection { .. } => "projection",
            Self::Significance { .. } => "significance",
            Self::Trend { .. } => "trend",
            Self::Voxelize { .. } => "voxelize",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(task: &str) -> Analysis {
        serde_json::from_str(&f!(
            r#"{{ "name": "test", "output": "out/test", "task": {task} }}"#
        ))
        .unwrap()
    }

    #[test]
    fn projection_defaults_to_every_row() {
        let analysis = parse(
            r#"{ "kind": "projection", "source": { "path": "e.bin", "table": "T" },
                 "column": "discr", "binning": { "bins": 10, "lo": 0.0, "hi": 1.0 } }"#,
        );
        match &analysis.task {
            Task::Projection { cut, summary_window, .. } => {
                assert_eq!(cut, "1");
                assert!(summary_window.is_none());
            }
            other => panic!("unexpected task {other:?}"),
        }
        assert!(analysis.validate().is_ok());
    }

    #[test]
    fn difference_options_are_inline() {
        let analysis = parse(
            r#"{ "kind": "difference",
                 "a": { "path": "a.bin", "field": "h" },
                 "b": { "path": "b.bin", "field": "h" },
                 "invert": true }"#,
        );
        let Task::Difference { options, .. } = &analysis.task else {
            panic!("not a difference")
        };
        assert!(options.invert);
        assert!(options.binning.is_none());
        assert_eq!(analysis.task.kind(), "difference");
    }

    #[test]
    fn rejects_bad_cut_and_short_trend() {
        let analysis = parse(
            r#"{ "kind": "projection", "source": { "path": "e.bin", "table": "T" },
                 "column": "discr", "cut": "x >", "binning": { "bins": 10, "lo": 0.0, "hi": 1.0 } }"#,
        );
        assert!(analysis.validate().is_err());

        let analysis = parse(
            r#"{ "kind": "trend", "points": [ { "x": 1.0, "path": "a.bin", "field": "h" } ],
                 "binning": { "bins": 10, "lo": 0.0, "hi": 1.0 }, "summary_window": [0.0, 1.0] }"#,
        );
        assert!(matches!(
            analysis.validate(),
            Err(Error::InvalidConfig { .. })
        ));
    }

    #[test]
    fn selection_defaults_to_everything() {
        let selection: Selection = serde_json::from_str("{}").unwrap();
        assert_eq!(selection.frame, None);
        assert_eq!(selection.predicate().frame, Frame::AxisCentres);
        assert!(selection.regions.is_empty());
        assert!(selection.window.is_unbounded());
        assert!(selection.validate().is_ok());
    }

    #[test]
    fn geometric_regions_need_a_frame() {
        let json = r#"{ "regions": [
            { "shape": "threshold", "comparison": "above", "cut": 11.2 },
            { "shape": "cylinder", "plane": "yz", "radius": 240.0 }
        ] }"#;
        let selection: Selection = serde_json::from_str(json).unwrap();
        assert!(selection.validate().is_err());

        let selection = Selection {
            frame: Some(Frame::centred([30.0, 30.0, 30.0])),
            ..selection
        };
        assert!(selection.validate().is_ok());

        // value cuts alone do not depend on position
        let selection = Selection {
            frame: None,
            regions: vec![Region::Threshold {
                comparison: mutomo_region::Comparison::Above,
                cut: 11.2,
            }],
            ..Default::default()
        };
        assert!(selection.validate().is_ok());
    }
}
