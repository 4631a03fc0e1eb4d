// standard library
use std::path::Path;

// crate modules
use crate::distribution::Distribution;
use crate::error::{Error, Result};
use mutomo_utils::f;

// external crates
use log::info;
use serde::{Deserialize, Serialize};

/// One point of an efficiency/purity sweep
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CutPoint {
    /// Centre of the signal bin the cut starts at
    pub cut: f64,
    /// Fraction of signal at or above the cut
    pub efficiency: f64,
    /// Signal fraction of everything at or above the cut
    pub purity: f64,
    /// Binomial error on the efficiency
    pub error: f64,
}

/// Sweep a cut over every bin, keeping everything from that bin upwards
///
/// At bin `i` the retained signal is the sum of signal bins `i..n`, and the
/// efficiency is that over the whole in-range signal. Purity is zero where
/// nothing at all is retained.
///
/// ```rust
/// # use mutomo_reduce::{efficiency_purity, Binning, Distribution};
/// let mut signal = Distribution::new("s", Binning::new(4, 0.0, 4.0)).unwrap();
/// let mut background = Distribution::new("b", Binning::new(4, 0.0, 4.0)).unwrap();
/// for v in [2.5, 3.5] { signal.fill(v) }
/// for v in [0.5, 1.5, 2.5] { background.fill(v) }
///
/// let points = efficiency_purity(&signal, &background).unwrap();
/// assert_eq!(points[0].efficiency, 1.0);
/// assert_eq!(points[0].purity, 0.4);
/// assert_eq!(points[3].purity, 1.0);
/// ```
pub fn efficiency_purity(signal: &Distribution, background: &Distribution) -> Result<Vec<CutPoint>> {
    signal.check_binning(background)?;

    let total = signal.integral();
    if total == 0.0 || !total.is_finite() {
        return Err(Error::InvalidInput(f!(
            "signal \"{}\" has integral {total}, efficiency is undefined",
            signal.name
        )));
    }

    let n = signal.n_bins();
    let points = (0..n)
        .map(|i| {
            let s = signal.integral_range(i, n - 1);
            let b = background.integral_range(i, n - 1);
            let efficiency = s / total;
            let purity = match s + b {
                retained if retained > 0.0 => s / retained,
                _ => 0.0,
            };
            CutPoint {
                cut: signal.bin_centre(i),
                efficiency,
                purity,
                error: (efficiency * (1.0 - efficiency) / total).max(0.0).sqrt(),
            }
        })
        .collect();

    Ok(points)
}

/// Write `cut,efficiency,purity,error` rows to a CSV file
pub fn write_cut_points<P: AsRef<Path>>(points: &[CutPoint], path: P) -> Result<()> {
    let path = path.as_ref();
    let mut writer = csv::Writer::from_path(path)?;
    for point in points {
        writer.serialize(point)?;
    }
    writer.flush()?;
    info!("Written {path:?}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::distribution::Binning;

    #[test]
    fn zero_signal_is_invalid() {
        let signal = Distribution::new("s", Binning::new(4, 0.0, 4.0)).unwrap();
        let mut background = signal.clone();
        background.fill(1.0);
        assert!(matches!(
            efficiency_purity(&signal, &background),
            Err(Error::InvalidInput(_))
        ));
    }

    #[test]
    fn error_vanishes_at_full_efficiency() {
        let mut signal = Distribution::new("s", Binning::new(2, 0.0, 2.0)).unwrap();
        signal.fill(0.5);
        signal.fill(1.5);
        let points = efficiency_purity(&signal, &signal).unwrap();
        assert_eq!(points[0].error, 0.0);
        assert_eq!(points[1].efficiency, 0.5);
        assert_eq!(points[1].error, (0.25_f64 / 2.0).sqrt());
        assert_eq!(points[1].cut, 1.5);
    }
}
