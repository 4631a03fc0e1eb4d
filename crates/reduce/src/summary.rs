// crate modules
use crate::distribution::Distribution;
use crate::error::{Error, Result};
use mutomo_utils::{f, ValueExt};

// external crates
use serde::{Deserialize, Serialize};

/// Mean and standard error of the mean of a [Distribution]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    pub mean: f64,
    /// Standard error of the mean
    pub error: f64,
    /// Sum of weights the summary was taken over
    pub entries: f64,
}

impl Summary {
    pub fn new(mean: f64, error: f64, entries: f64) -> Self {
        Self {
            mean,
            error,
            entries,
        }
    }

    /// Difference of means, errors added linearly
    ///
    /// ```rust
    /// # use mutomo_reduce::Summary;
    /// let signal = Summary::new(11.6, 0.02, 400.0);
    /// let background = Summary::new(11.2, 0.03, 400.0);
    /// let diff = signal.difference(&background);
    /// assert!((diff.mean - 0.4).abs() < 1e-12);
    /// assert!((diff.error - 0.05).abs() < 1e-12);
    /// ```
    pub fn difference(&self, other: &Summary) -> Summary {
        Summary {
            mean: self.mean - other.mean,
            error: self.error + other.error,
            entries: self.entries + other.entries,
        }
    }

    /// Separation of two means in units of their combined error
    ///
    /// Fails if both errors are zero.
    pub fn significance(&self, other: &Summary) -> Result<f64> {
        let combined = self.error + other.error;
        if combined == 0.0 || !combined.is_finite() {
            return Err(Error::InvalidInput(f!(
                "cannot compute significance with combined error {combined}"
            )));
        }
        Ok((self.mean - other.mean) / combined)
    }
}

impl std::fmt::Display for Summary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "mean {} +/- {} ({} entries)",
            self.mean.sci(5, 2),
            self.error.sci(2, 2),
            self.entries
        )
    }
}

impl Distribution {
    /// Mean and standard error over every in-range bin
    pub fn summary(&self) -> Result<Summary> {
        self.summarise(|_| true)
    }

    /// Mean and standard error over bins with centres in `[lo, hi]`
    ///
    /// Bins outside the window count for neither the mean nor the number of
    /// entries used for the error. The standard deviation is the population
    /// form over `(centre, weight)` pairs, and the error divides it by the
    /// square root of the effective number of entries.
    ///
    /// ```rust
    /// # use mutomo_reduce::{Binning, Distribution};
    /// let mut d = Distribution::new("d", Binning::new(10, 0.0, 10.0)).unwrap();
    /// d.fill(1.5);
    /// d.fill(5.5);
    /// d.fill(6.5);
    ///
    /// let s = d.summary_in(5.0, 7.0).unwrap();
    /// assert_eq!(s.mean, 6.0);
    /// assert_eq!(s.entries, 2.0);
    /// assert_eq!(s.error, 0.5 / 2.0_f64.sqrt());
    /// ```
    pub fn summary_in(&self, lo: f64, hi: f64) -> Result<Summary> {
        if !(lo <= hi) {
            return Err(Error::InvalidInput(f!("empty summary range [{lo}, {hi}]")));
        }
        self.summarise(|centre| centre >= lo && centre <= hi)
    }

    fn summarise(&self, in_window: impl Fn(f64) -> bool) -> Result<Summary> {
        let selected = self
            .points()
            .into_iter()
            .zip(self.sumw2())
            .filter(|((x, _), _)| in_window(*x))
            .map(|((x, w), w2)| (x, w, *w2))
            .collect::<Vec<(f64, f64, f64)>>();

        let sw = selected.iter().map(|(_, w, _)| w).sum::<f64>();
        let sw2 = selected.iter().map(|(_, _, w2)| w2).sum::<f64>();
        if sw == 0.0 {
            return Err(Error::InvalidInput(f!(
                "no entries to summarise in \"{}\"",
                self.name
            )));
        }

        let mean = selected.iter().map(|(x, w, _)| x * w).sum::<f64>() / sw;
        let variance = selected
            .iter()
            .map(|(x, w, _)| w * (x - mean) * (x - mean))
            .sum::<f64>()
            / sw;
        let effective = match sw2 > 0.0 {
            true => sw * sw / sw2,
            false => sw,
        };

        Ok(Summary {
            mean,
            error: variance.max(0.0).sqrt() / effective.sqrt(),
            entries: sw,
        })
    }
}
