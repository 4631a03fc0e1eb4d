//! Declarative analyses and the `mutomo` command line tool
#![doc = include_str!("../readme.md")]

// Split into subfiles for development, but anything important is re-exported
mod config;
mod error;
mod output;
mod runner;

#[doc(inline)]
pub use config::{
    Analysis, AnalysisConfig, GridSource, Selection, TableSource, Task, TrendSource,
};

#[doc(inline)]
pub use output::{output_path, write_distribution, write_grid, write_report};

#[doc(inline)]
pub use runner::{check_file, inspect, run, run_analysis, run_file, RunReport};

#[doc(inline)]
pub use error::{Error, Result};
