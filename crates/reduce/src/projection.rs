// crate modules
use crate::distribution::{Binning, Distribution};
use crate::error::Result;
use mutomo_grid::Table;
use mutomo_region::CutExpr;
use mutomo_utils::f;

// external crates
use log::{debug, warn};

/// Histogram one table column for the rows passing a cut
///
/// The row-wise counterpart of [fill_distribution()](crate::fill_distribution).
///
/// ```rust
/// # use mutomo_grid::Table;
/// # use mutomo_region::CutExpr;
/// # use mutomo_reduce::{project_table, Binning};
/// let mut events = Table::new("T");
/// events.add_column("x", vec![-500.0, 0.0, 100.0]).unwrap();
/// events.add_column("discr", vec![9.0, 10.5, 12.5]).unwrap();
///
/// let cut = CutExpr::parse("(x>-480)&&(x<480)").unwrap();
/// let d = project_table(&events, "discr", &cut, Binning::new(200, 0.0, 140.0)).unwrap();
/// assert_eq!(d.entries(), 2);
/// ```
pub fn project_table(
    table: &Table,
    column: &str,
    cut: &CutExpr,
    binning: Binning,
) -> Result<Distribution> {
    let values = table.column(column)?;
    let selection = cut.select(table)?;

    let mut distribution =
        Distribution::new(&f!("{}_{column}", table.name), binning)?.with_title(cut.as_str());

    values
        .iter()
        .zip(selection)
        .filter(|(_, selected)| *selected)
        .for_each(|(value, _)| distribution.fill(*value));

    if distribution.entries() == 0 {
        warn!("No rows of \"{}\" pass \"{cut}\"", table.name);
    }
    debug!("Projected {distribution}");
    Ok(distribution)
}
