// standard library
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

// crate modules
use crate::error::{Error, Result};
use mutomo_utils::f;

// external crates
use itertools::izip;
use log::info;
use serde::{Deserialize, Serialize};

/// Fixed width binning `(bins, lo, hi)` of a [Distribution]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Binning {
    pub bins: usize,
    pub lo: f64,
    pub hi: f64,
}

impl Binning {
    pub fn new(bins: usize, lo: f64, hi: f64) -> Self {
        Self { bins, lo, hi }
    }

    /// Integer-centred binning for counts `0..=max`, e.g. `(27, -0.5, 26.5)`
    pub fn counts(max: usize) -> Self {
        Self::new(max + 1, -0.5, max as f64 + 0.5)
    }

    /// Check for at least one bin over a finite, non-empty range
    pub fn validate(&self) -> Result<()> {
        if self.bins == 0 || !self.lo.is_finite() || !self.hi.is_finite() || self.lo >= self.hi {
            return Err(Error::InvalidInput(f!("invalid binning {self}")));
        }
        Ok(())
    }

    pub fn width(&self) -> f64 {
        (self.hi - self.lo) / self.bins as f64
    }

    /// Index of the bin containing `value`
    ///
    /// `Err(true)` for overflow, `Err(false)` for underflow. NaN is underflow.
    pub fn index(&self, value: f64) -> core::result::Result<usize, bool> {
        if value.is_nan() || value < self.lo {
            return Err(false);
        }
        if value >= self.hi {
            return Err(true);
        }
        let index = (self.bins as f64 * (value - self.lo) / (self.hi - self.lo)) as usize;
        Ok(index.min(self.bins - 1))
    }

    /// Centre of bin `index`
    pub fn centre(&self, index: usize) -> f64 {
        self.lo + (index as f64 + 0.5) * self.width()
    }

    /// Lower edge of bin `index`
    pub fn lower_edge(&self, index: usize) -> f64 {
        self.lo + index as f64 * self.width()
    }
}

impl std::fmt::Display for Binning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {}, {})", self.bins, self.lo, self.hi)
    }
}

/// One dimensional histogram of voxel or event values
///
/// Bins are indexed from `0` to `bins - 1`. Values outside `[lo, hi)` go to
/// the underflow and overflow counters, but every fill counts as an entry.
///
/// ```rust
/// # use mutomo_reduce::{Binning, Distribution};
/// let mut d = Distribution::new("discr", Binning::new(10, 0.0, 10.0)).unwrap();
/// d.fill(5.0);
/// d.fill(5.5);
/// d.fill(42.0);
///
/// assert_eq!(d.entries(), 3);
/// assert_eq!(d.count(5), 2.0);
/// assert_eq!(d.overflow(), 1.0);
/// assert_eq!(d.integral(), 2.0);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Distribution {
    pub name: String,
    pub title: String,
    binning: Binning,
    counts: Vec<f64>,
    sumw2: Vec<f64>,
    underflow: f64,
    overflow: f64,
    entries: u64,
}

impl Distribution {
    /// Empty distribution, fails for degenerate binning
    pub fn new(name: &str, binning: Binning) -> Result<Self> {
        binning.validate()?;
        Ok(Self {
            name: name.to_string(),
            title: String::new(),
            binning,
            counts: vec![0.0; binning.bins],
            sumw2: vec![0.0; binning.bins],
            underflow: 0.0,
            overflow: 0.0,
            entries: 0,
        })
    }

    /// Set the title
    pub fn with_title(mut self, title: &str) -> Self {
        self.title = title.to_string();
        self
    }

    /// Fill with unit weight
    pub fn fill(&mut self, value: f64) {
        self.fill_weighted(value, 1.0)
    }

    /// Fill with an arbitrary weight
    pub fn fill_weighted(&mut self, value: f64, weight: f64) {
        self.entries += 1;
        match self.binning.index(value) {
            Ok(i) => {
                self.counts[i] += weight;
                self.sumw2[i] += weight * weight;
            }
            Err(true) => self.overflow += weight,
            Err(false) => self.underflow += weight,
        }
    }

    pub fn binning(&self) -> Binning {
        self.binning
    }

    pub fn n_bins(&self) -> usize {
        self.binning.bins
    }

    /// Number of fills, including under/overflow
    pub fn entries(&self) -> u64 {
        self.entries
    }

    pub fn underflow(&self) -> f64 {
        self.underflow
    }

    pub fn overflow(&self) -> f64 {
        self.overflow
    }

    /// Content of bin `index`, `0.0` outside the range
    pub fn count(&self, index: usize) -> f64 {
        self.counts.get(index).copied().unwrap_or(0.0)
    }

    /// Bin contents in order
    pub fn counts(&self) -> &[f64] {
        &self.counts
    }

    /// Sum of squared weights per bin
    pub fn sumw2(&self) -> &[f64] {
        &self.sumw2
    }

    pub fn bin_centre(&self, index: usize) -> f64 {
        self.binning.centre(index)
    }

    /// `(centre, count)` for every bin
    pub fn points(&self) -> Vec<(f64, f64)> {
        self.counts
            .iter()
            .enumerate()
            .map(|(i, c)| (self.binning.centre(i), *c))
            .collect()
    }

    /// Sum of all in-range bins
    pub fn integral(&self) -> f64 {
        self.counts.iter().sum()
    }

    /// Sum of bins `from..=to`, clamped to the range
    pub fn integral_range(&self, from: usize, to: usize) -> f64 {
        if from >= self.counts.len() || from > to {
            return 0.0;
        }
        let to = to.min(self.counts.len() - 1);
        self.counts[from..=to].iter().sum()
    }

    /// Weighted mean of bin centres over all in-range bins
    pub fn mean(&self) -> f64 {
        let total = self.integral();
        if total == 0.0 {
            return 0.0;
        }
        self.points().iter().map(|(x, w)| x * w).sum::<f64>() / total
    }

    /// Population standard deviation of bin centres over in-range bins
    pub fn std_dev(&self) -> f64 {
        let total = self.integral();
        if total == 0.0 {
            return 0.0;
        }
        let mean = self.mean();
        let variance = self
            .points()
            .iter()
            .map(|(x, w)| w * (x - mean) * (x - mean))
            .sum::<f64>()
            / total;
        variance.max(0.0).sqrt()
    }

    /// Running sum of the bin contents
    ///
    /// Forward sums bin `i` as everything up to and including `i`, backward
    /// as everything from `i` to the last bin.
    pub fn cumulative(&self, forward: bool) -> Self {
        let mut result = self.clone();
        result.name = f!("{}_cumulative", self.name);
        let mut running = 0.0;
        let mut running_w2 = 0.0;

        let indices: Box<dyn Iterator<Item = usize>> = match forward {
            true => Box::new(0..self.counts.len()),
            false => Box::new((0..self.counts.len()).rev()),
        };

        for i in indices {
            running += self.counts[i];
            running_w2 += self.sumw2[i];
            result.counts[i] = running;
            result.sumw2[i] = running_w2;
        }
        result
    }

    /// Multiply every bin by `factor`
    pub fn scale(&mut self, factor: f64) {
        for (c, w2) in self.counts.iter_mut().zip(self.sumw2.iter_mut()) {
            *c *= factor;
            *w2 *= factor * factor;
        }
        self.underflow *= factor;
        self.overflow *= factor;
    }

    /// Bin-wise ratio, zero where the denominator is zero
    pub fn divide(&self, denominator: &Distribution) -> Result<Self> {
        self.check_binning(denominator)?;
        let mut result = self.clone();
        result.name = f!("{}_over_{}", self.name, denominator.name);

        for (r, w2, n, d, dw2) in izip!(
            result.counts.iter_mut(),
            result.sumw2.iter_mut(),
            &self.counts,
            &denominator.counts,
            &denominator.sumw2
        ) {
            if *d == 0.0 {
                *r = 0.0;
                *w2 = 0.0;
                continue;
            }
            let ratio = n / d;
            // uncorrelated propagation, relative errors in quadrature
            let rel2 = match *n == 0.0 {
                true => 0.0,
                false => *w2 / (n * n),
            } + dw2 / (d * d);
            *r = ratio;
            *w2 = ratio * ratio * rel2;
        }
        Ok(result)
    }

    /// Fail with `BinningMismatch` unless the binning is identical
    pub fn check_binning(&self, other: &Distribution) -> Result<()> {
        if self.binning != other.binning {
            return Err(Error::BinningMismatch {
                expected: self.binning.to_string(),
                found: other.binning.to_string(),
            });
        }
        Ok(())
    }

    /// Write `centre,count,error` rows to a CSV file
    pub fn write_csv<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let mut writer = csv::Writer::from_path(path)?;
        writer.write_record(["centre", "count", "error"])?;
        for (i, (centre, count)) in self.points().iter().enumerate() {
            writer.write_record(&[
                centre.to_string(),
                count.to_string(),
                self.sumw2[i].sqrt().to_string(),
            ])?;
        }
        writer.flush()?;
        info!("Written {path:?}");
        Ok(())
    }

    /// Write the whole distribution as JSON
    pub fn write_json<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let mut writer = BufWriter::new(File::create(path)?);
        serde_json::to_writer_pretty(&mut writer, self)?;
        writer.flush()?;
        info!("Written {path:?}");
        Ok(())
    }
}

impl std::fmt::Display for Distribution {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} {}: {} entries, integral {}, under/overflow {}/{}",
            self.name,
            self.binning,
            self.entries,
            self.integral(),
            self.underflow,
            self.overflow
        )
    }
}
