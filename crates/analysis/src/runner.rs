//! Execution of configured analyses

// standard library
use std::fmt::Write;
use std::path::{Path, PathBuf};

// crate modules
use crate::config::{Analysis, AnalysisConfig, GridSource, Selection, Task};
use crate::error::{Error, Result};
use crate::output::{ensure_parent, output_path, write_distribution, write_grid, write_report};
use mutomo_grid::{read_grid, read_table, Container, VoxelGrid, VoxelRange};
use mutomo_reduce::{
    binary_map, difference, efficiency_purity, fill_distribution, neighbour_analysis,
    project_table, voxelize_table, write_cut_points, Binning, Distribution, LineFit, Summary,
    Trend,
};
use mutomo_region::CutExpr;
use mutomo_utils::f;

// external crates
use log::{debug, error, info, warn};
use serde::Serialize;

/// Outcome of running every analysis in a configuration
#[derive(Debug, Default)]
pub struct RunReport {
    /// Analysis names with the files each one wrote
    pub completed: Vec<(String, Vec<PathBuf>)>,
    /// Analysis names with the error that stopped them
    pub failed: Vec<(String, Error)>,
}

impl RunReport {
    pub fn total(&self) -> usize {
        self.completed.len() + self.failed.len()
    }

    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }

    /// `AnalysesFailed` if anything failed
    pub fn into_result(self) -> Result<()> {
        match self.is_success() {
            true => Ok(()),
            false => Err(Error::AnalysesFailed {
                failed: self.failed.len(),
                total: self.total(),
            }),
        }
    }
}

/// Run every analysis in order
///
/// A failing analysis is logged and recorded, and the rest still run.
pub fn run(config: &AnalysisConfig) -> RunReport {
    let mut report = RunReport::default();

    for analysis in &config.analyses {
        info!("Running \"{}\" ({})", analysis.name, analysis.task.kind());
        match run_analysis(analysis) {
            Ok(outputs) => report.completed.push((analysis.name.clone(), outputs)),
            Err(e) => {
                error!("Analysis \"{}\" failed: {e}", analysis.name);
                let mut source = std::error::Error::source(&e);
                while let Some(cause) = source {
                    error!("  caused by: {cause}");
                    source = std::error::Error::source(cause);
                }
                report.failed.push((analysis.name.clone(), e));
            }
        }
    }

    info!(
        "Finished {} analyses, {} failed",
        report.total(),
        report.failed.len()
    );
    report
}

/// Read a configuration file and run every analysis in it
///
/// Only an unreadable file fails as a whole. An invalid analysis is recorded
/// in the report like any other failure and the rest still run.
pub fn run_file<P: AsRef<Path>>(path: P) -> Result<RunReport> {
    let config = AnalysisConfig::from_file(path)?;
    Ok(run(&config))
}

/// Validate every analysis in a configuration file without running any
///
/// Returns the number of analyses.
pub fn check_file<P: AsRef<Path>>(path: P) -> Result<usize> {
    let config = AnalysisConfig::from_file(path)?;
    config.validate()?;
    Ok(config.analyses.len())
}

/// Run a single analysis, returning every file written
pub fn run_analysis(analysis: &Analysis) -> Result<Vec<PathBuf>> {
    analysis.validate()?;
    let stem = analysis.output.as_path();

    match &analysis.task {
        Task::Distribution {
            source,
            selection,
            binning,
            summary_window,
            cumulative,
        } => run_distribution(source, selection, *binning, *summary_window, *cumulative, stem),
        Task::Difference {
            a,
            b,
            selection,
            options,
        } => {
            let (a, b) = (load(a)?, load(b)?);
            let range = selection.range(&a);
            let result = difference(&a, &b, &range, &selection.predicate(), *options)?;
            if result.compared == 0 {
                warn!("No voxels measured in both \"{}\" and \"{}\"", a.name, b.name);
            }

            let mut outputs = vec![write_grid(&result.grid, stem, "grid")?];
            let mut summary = None;
            if let Some(distribution) = &result.distribution {
                outputs.extend(write_distribution(distribution, stem, "")?);
                summary = distribution.summary().ok();
            }

            #[derive(Serialize)]
            struct DifferenceReport {
                compared: usize,
                skipped: usize,
                summary: Option<Summary>,
            }
            let report = DifferenceReport {
                compared: result.compared,
                skipped: result.skipped,
                summary,
            };
            outputs.push(write_report(&report, stem, "report")?);
            Ok(outputs)
        }
        Task::Efficiency {
            signal,
            background,
            selection,
            background_selection,
            binning,
        } => {
            let signal = select(&load(signal)?, selection, *binning)?;
            let background = select(
                &load(background)?,
                background_selection.as_ref().unwrap_or(selection),
                *binning,
            )?;
            let points = efficiency_purity(&signal, &background)?;

            let path = output_path(stem, "", "csv");
            ensure_parent(&path)?;
            write_cut_points(&points, &path)?;

            let mut outputs = vec![path];
            outputs.extend(write_distribution(&signal, stem, "signal")?);
            outputs.extend(write_distribution(&background, stem, "background")?);
            Ok(outputs)
        }
        Task::Neighbours {
            source,
            selection,
            threshold,
        } => {
            let grid = load(source)?;
            let result = neighbour_analysis(
                &grid,
                &selection.range(&grid),
                &selection.predicate(),
                *threshold,
            )?;

            let mut outputs = write_distribution(&result.above, stem, "above")?;
            outputs.extend(write_distribution(&result.below, stem, "below")?);

            #[derive(Serialize)]
            struct NeighbourReport {
                threshold: f64,
                above: Option<Summary>,
                below: Option<Summary>,
            }
            let report = NeighbourReport {
                threshold: *threshold,
                above: result.above.summary().ok(),
                below: result.below.summary().ok(),
            };
            outputs.push(write_report(&report, stem, "report")?);
            Ok(outputs)
        }
        Task::BinaryMap {
            source,
            window,
            regions,
        } => {
            let grid = load(source)?;
            let map = binary_map(&grid, &VoxelRange::from_window(&grid, window), regions)?;
            Ok(vec![write_grid(&map, stem, "")?])
        }
        Task::Projection {
            source,
            column,
            cut,
            binning,
            summary_window,
        } => {
            let table = read_table(&source.path, &source.table)?;
            let cut = CutExpr::parse(cut)?;
            let distribution = project_table(&table, column, &cut, *binning)?;
            let mut outputs = write_distribution(&distribution, stem, "")?;
            if let Some(summary) = summarise(&distribution, *summary_window)? {
                outputs.push(write_report(&summary, stem, "summary")?);
            }
            Ok(outputs)
        }
        Task::Significance {
            signal,
            background,
            selection,
            binning,
            summary_window: [lo, hi],
        } => {
            let signal = select(&load(signal)?, selection, *binning)?.summary_in(*lo, *hi)?;
            let background =
                select(&load(background)?, selection, *binning)?.summary_in(*lo, *hi)?;
            let significance = signal.significance(&background)?;
            info!("Significance {significance:.3} ({signal} vs {background})");

            #[derive(Serialize)]
            struct SignificanceReport {
                signal: Summary,
                background: Summary,
                difference: Summary,
                significance: f64,
            }
            let report = SignificanceReport {
                signal,
                background,
                difference: signal.difference(&background),
                significance,
            };
            Ok(vec![write_report(&report, stem, "")?])
        }
        Task::Trend {
            points,
            reference,
            selection,
            binning,
            summary_window: [lo, hi],
        } => {
            let mut trend = Trend::new();
            for point in points {
                let summary =
                    select(&load(&point.source)?, selection, *binning)?.summary_in(*lo, *hi)?;
                debug!("Trend point x = {}: {summary}", point.x);
                trend.push(point.x, summary);
            }

            let reference = match reference {
                Some(source) => {
                    Some(select(&load(source)?, selection, *binning)?.summary_in(*lo, *hi)?)
                }
                None => None,
            };
            if let Some(reference) = &reference {
                trend = trend.relative_to(reference);
            }

            let fit = trend.fit()?;
            info!("Trend fit {fit}");

            let path = output_path(stem, "", "csv");
            ensure_parent(&path)?;
            trend.write_csv(&path)?;

            #[derive(Serialize)]
            struct TrendReport {
                reference: Option<Summary>,
                fit: LineFit,
            }
            let report = TrendReport { reference, fit };
            Ok(vec![path, write_report(&report, stem, "fit")?])
        }
        Task::Voxelize { source, options } => {
            let table = read_table(&source.path, &source.table)?;
            let grid = voxelize_table(&table, options)?;
            Ok(vec![write_grid(&grid, stem, "")?])
        }
    }
}

/// Plain text summary of every grid and table in a container
pub fn inspect<P: AsRef<Path>>(path: P) -> Result<String> {
    let path = path.as_ref();
    let container = Container::open(path)?;

    let mut text = f!(
        "{}: {} grids, {} tables\n",
        path.display(),
        container.grids.len(),
        container.tables.len()
    );
    // writing to a String cannot fail
    for grid in container.grids.values() {
        let _ = writeln!(text, "{grid}");
    }
    for table in container.tables.values() {
        let _ = writeln!(text, "{table}");
    }
    Ok(text)
}

fn load(source: &GridSource) -> Result<VoxelGrid> {
    Ok(read_grid(&source.path, &source.field)?)
}

/// Histogram the voxels of `grid` picked out by a selection
fn select(grid: &VoxelGrid, selection: &Selection, binning: Binning) -> Result<Distribution> {
    let distribution = fill_distribution(
        grid,
        &selection.range(grid),
        &selection.predicate(),
        binning,
    )?;
    if distribution.entries() == 0 {
        warn!("Selection on \"{}\" is empty", grid.name);
    }
    Ok(distribution)
}

fn summarise(distribution: &Distribution, window: Option<[f64; 2]>) -> Result<Option<Summary>> {
    match window {
        Some([lo, hi]) => {
            let summary = distribution.summary_in(lo, hi)?;
            info!("{}: {summary}", distribution.name);
            Ok(Some(summary))
        }
        None => Ok(None),
    }
}

fn run_distribution(
    source: &GridSource,
    selection: &Selection,
    binning: Binning,
    summary_window: Option<[f64; 2]>,
    cumulative: bool,
    stem: &Path,
) -> Result<Vec<PathBuf>> {
    let distribution = select(&load(source)?, selection, binning)?;
    let mut outputs = write_distribution(&distribution, stem, "")?;

    if cumulative {
        let total = distribution.integral();
        let mut percent = distribution.cumulative(false);
        match total > 0.0 {
            true => percent.scale(100.0 / total),
            false => warn!("Cumulative of empty \"{}\" left unscaled", distribution.name),
        }
        outputs.extend(write_distribution(&percent, stem, "cumulative")?);
    }

    if let Some(summary) = summarise(&distribution, summary_window)? {
        outputs.push(write_report(&summary, stem, "summary")?);
    }
    Ok(outputs)
}
