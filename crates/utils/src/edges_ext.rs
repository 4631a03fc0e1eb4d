use crate::error::{Error, Result};

/// Extends slices of bin edges with histogram-style lookups
///
/// Edges are the `n + 1` boundaries of `n` bins. Bin numbering follows the
/// usual histogram convention rather than slice indexing:
///
/// ```text
///     bin 0       underflow, value < edges[0]
///     bin 1..=n   edges[b-1] <= value < edges[b]
///     bin n+1     overflow, value >= edges[n]
/// ```
pub trait EdgesExt {
    /// Check there are at least two finite, strictly increasing edges
    ///
    /// ```rust
    /// # use mutomo_utils::{EdgesExt, Error};
    /// assert!([-30.0, 0.0, 30.0].check_edges().is_ok());
    /// assert!([0.0, 0.0, 30.0].check_edges().is_err());
    /// assert_eq!(
    ///     [0.0].check_edges(),
    ///     Err(Error::BelowMinimumSliceLength { length: 1, minimum_required: 2 })
    /// );
    /// ```
    fn check_edges(&self) -> Result<()>;

    /// Number of bins described by the edges, excluding under/overflow
    fn n_bins(&self) -> usize;

    /// Find the histogram bin number containing `value`
    ///
    /// Values on an edge belong to the bin above. NAN is treated as
    /// underflow.
    ///
    /// ```rust
    /// # use mutomo_utils::EdgesExt;
    /// let edges = [0.0, 10.0, 20.0, 30.0];
    /// assert_eq!(edges.find_bin(-1.0), 0);  // underflow
    /// assert_eq!(edges.find_bin(0.0), 1);
    /// assert_eq!(edges.find_bin(10.0), 2);  // on an edge, bin above
    /// assert_eq!(edges.find_bin(29.9), 3);
    /// assert_eq!(edges.find_bin(30.0), 4);  // overflow
    /// ```
    fn find_bin(&self, value: f64) -> usize;

    /// Centre of histogram bin `bin`, `None` for under/overflow
    ///
    /// ```rust
    /// # use mutomo_utils::EdgesExt;
    /// let edges = [0.0, 10.0, 20.0];
    /// assert_eq!(edges.bin_centre(1), Some(5.0));
    /// assert_eq!(edges.bin_centre(0), None);
    /// assert_eq!(edges.bin_centre(3), None);
    /// ```
    fn bin_centre(&self, bin: usize) -> Option<f64>;

    /// Width of histogram bin `bin`, `None` for under/overflow
    fn bin_width(&self, bin: usize) -> Option<f64>;
}

impl EdgesExt for [f64] {
    fn check_edges(&self) -> Result<()> {
        if self.len() < 2 {
            return Err(Error::BelowMinimumSliceLength {
                length: self.len(),
                minimum_required: 2,
            });
        }

        if self.iter().any(|v| !v.is_finite()) {
            return Err(Error::SliceContainsUndefinedValues);
        }

        match self
            .windows(2)
            .enumerate()
            .find(|(_, pair)| pair[0] >= pair[1])
        {
            Some((index, pair)) => Err(Error::EdgesNotIncreasing {
                index,
                lower: pair[0],
                upper: pair[1],
            }),
            None => Ok(()),
        }
    }

    fn n_bins(&self) -> usize {
        self.len().saturating_sub(1)
    }

    fn find_bin(&self, value: f64) -> usize {
        let n = self.n_bins();
        let (Some(low), Some(high)) = (self.first(), self.last()) else {
            return 0;
        };

        if value.is_nan() || value < *low {
            return 0;
        }

        if value >= *high {
            return n + 1;
        }

        // edges are sorted, so the partition point is the first edge > value
        self.partition_point(|edge| *edge <= value)
    }

    fn bin_centre(&self, bin: usize) -> Option<f64> {
        if bin == 0 || bin > self.n_bins() {
            return None;
        }
        Some(0.5 * (self[bin - 1] + self[bin]))
    }

    fn bin_width(&self, bin: usize) -> Option<f64> {
        if bin == 0 || bin > self.n_bins() {
            return None;
        }
        Some(self[bin] - self[bin - 1])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn find_bin_matches_histogram_convention() {
        let edges = [-45.0, -15.0, 15.0, 45.0];
        assert_eq!(edges.find_bin(-100.0), 0);
        assert_eq!(edges.find_bin(-45.0), 1);
        assert_eq!(edges.find_bin(-15.0), 2);
        assert_eq!(edges.find_bin(0.0), 2);
        assert_eq!(edges.find_bin(44.999), 3);
        assert_eq!(edges.find_bin(45.0), 4);
        assert_eq!(edges.find_bin(f64::NAN), 0);
    }

    #[test]
    fn degenerate_edges() {
        let empty: [f64; 0] = [];
        assert_eq!(empty.find_bin(1.0), 0);
        assert_eq!(empty.n_bins(), 0);
        assert_eq!(
            [0.0, f64::INFINITY].check_edges(),
            Err(Error::SliceContainsUndefinedValues)
        );
        assert_eq!(
            [0.0, 2.0, 1.0].check_edges(),
            Err(Error::EdgesNotIncreasing {
                index: 1,
                lower: 2.0,
                upper: 1.0
            })
        );
    }

    #[test]
    fn centres_and_widths() {
        let edges = [0.0, 1.0, 3.0];
        assert_eq!(edges.bin_centre(2), Some(2.0));
        assert_eq!(edges.bin_width(2), Some(2.0));
        assert_eq!(edges.bin_width(0), None);
    }
}
