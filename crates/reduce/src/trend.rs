// standard library
use std::path::Path;

// crate modules
use crate::error::{Error, Result};
use crate::summary::Summary;
use mutomo_utils::{f, ValueExt};

// external crates
use log::{debug, info};
use nalgebra::{Matrix2, Vector2};
use serde::{Deserialize, Serialize};

/// Summary statistic at some value of a control variable
///
/// e.g. the mean discriminator of a bubble against its volume in litres.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrendPoint {
    pub x: f64,
    pub summary: Summary,
}

/// A series of summaries against a control variable
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Trend {
    pub points: Vec<TrendPoint>,
}

impl Trend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, x: f64, summary: Summary) {
        self.points.push(TrendPoint { x, summary });
    }

    /// Every point differenced against a reference, e.g. a background drum
    pub fn relative_to(&self, reference: &Summary) -> Trend {
        Trend {
            points: self
                .points
                .iter()
                .map(|p| TrendPoint {
                    x: p.x,
                    summary: p.summary.difference(reference),
                })
                .collect(),
        }
    }

    /// Straight line through the means, weighted by their errors
    pub fn fit(&self) -> Result<LineFit> {
        let data = self
            .points
            .iter()
            .map(|p| (p.x, p.summary.mean, p.summary.error))
            .collect::<Vec<(f64, f64, f64)>>();
        linear_fit(&data)
    }

    /// Write `x,mean,error,entries` rows to a CSV file
    pub fn write_csv<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let mut writer = csv::Writer::from_path(path)?;
        writer.write_record(["x", "mean", "error", "entries"])?;
        for p in &self.points {
            writer.write_record(&[
                p.x.to_string(),
                p.summary.mean.to_string(),
                p.summary.error.to_string(),
                p.summary.entries.to_string(),
            ])?;
        }
        writer.flush()?;
        info!("Written {path:?}");
        Ok(())
    }
}

/// Result of a straight line fit `y = slope * x + intercept`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LineFit {
    pub slope: f64,
    pub intercept: f64,
    pub slope_error: f64,
    pub intercept_error: f64,
    pub chi2: f64,
    /// Degrees of freedom, number of points minus two
    pub ndf: usize,
}

impl LineFit {
    /// Evaluate the fitted line
    pub fn eval(&self, x: f64) -> f64 {
        self.slope * x + self.intercept
    }
}

impl std::fmt::Display for LineFit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "slope {} +/- {}, intercept {} +/- {}, chi2/ndf {}/{}",
            self.slope.sci(4, 2),
            self.slope_error.sci(2, 2),
            self.intercept.sci(4, 2),
            self.intercept_error.sci(2, 2),
            self.chi2.sci(3, 2),
            self.ndf
        )
    }
}

/// Weighted least squares straight line through `(x, y, error)` points
///
/// Weights are `1/error^2`. If every error is zero the fit is unweighted and
/// the parameter errors are scaled by `chi2/ndf` instead.
///
/// ```rust
/// # use mutomo_reduce::linear_fit;
/// let points = [(0.7, 0.10, 0.01), (2.0, 0.23, 0.01), (4.0, 0.43, 0.01)];
/// let fit = linear_fit(&points).unwrap();
/// assert!((fit.slope - 0.1).abs() < 1e-9);
/// assert!((fit.intercept - 0.03).abs() < 1e-9);
/// ```
pub fn linear_fit(points: &[(f64, f64, f64)]) -> Result<LineFit> {
    if points.len() < 2 {
        return Err(Error::InvalidInput(f!(
            "a line needs at least 2 points, found {}",
            points.len()
        )));
    }

    let weighted = points.iter().any(|(_, _, e)| *e != 0.0);
    if weighted && points.iter().any(|(_, _, e)| !(e.is_finite() && *e > 0.0)) {
        return Err(Error::InvalidInput(
            "errors must be all zero or all positive".to_string(),
        ));
    }

    let weight = |e: f64| match weighted {
        true => 1.0 / (e * e),
        false => 1.0,
    };

    // normal equations
    let mut normal = Matrix2::<f64>::zeros();
    let mut rhs = Vector2::<f64>::zeros();
    for &(x, y, e) in points {
        let w = weight(e);
        let basis = Vector2::new(x, 1.0);
        normal += w * basis * basis.transpose();
        rhs += w * y * basis;
    }

    let Some(mut covariance) = normal.try_inverse() else {
        return Err(Error::InvalidInput(
            "singular fit, all points share the same x".to_string(),
        ));
    };
    let params = covariance * rhs;
    let (slope, intercept) = (params[0], params[1]);

    let chi2 = points
        .iter()
        .map(|&(x, y, e)| weight(e) * (y - slope * x - intercept).powi(2))
        .sum::<f64>();
    let ndf = points.len() - 2;

    if !weighted && ndf > 0 {
        covariance *= chi2 / ndf as f64;
    }

    let fit = LineFit {
        slope,
        intercept,
        slope_error: covariance[(0, 0)].max(0.0).sqrt(),
        intercept_error: covariance[(1, 1)].max(0.0).sqrt(),
        chi2,
        ndf,
    };
    debug!("Line fit: {fit}");
    Ok(fit)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn degenerate_inputs() {
        assert!(linear_fit(&[(1.0, 1.0, 0.1)]).is_err());
        assert!(linear_fit(&[(1.0, 1.0, 0.1), (1.0, 2.0, 0.1)]).is_err());
        assert!(linear_fit(&[(1.0, 1.0, 0.1), (2.0, 2.0, 0.0)]).is_err());
    }

    #[test]
    fn unweighted_exact_line() {
        let fit = linear_fit(&[(0.0, 1.0, 0.0), (1.0, 3.0, 0.0), (2.0, 5.0, 0.0)]).unwrap();
        assert!((fit.slope - 2.0).abs() < 1e-12);
        assert!((fit.intercept - 1.0).abs() < 1e-12);
        assert!(fit.chi2 < 1e-20);
        assert_eq!(fit.ndf, 1);
        assert!((fit.eval(3.0) - 7.0).abs() < 1e-12);
    }

    #[test]
    fn trend_relative_to_background() {
        let mut trend = Trend::new();
        trend.push(1.0, Summary::new(11.3, 0.01, 100.0));
        trend.push(2.0, Summary::new(11.4, 0.01, 100.0));
        let background = Summary::new(11.2, 0.02, 100.0);

        let relative = trend.relative_to(&background);
        assert!((relative.points[1].summary.mean - 0.2).abs() < 1e-12);
        assert!((relative.points[1].summary.error - 0.03).abs() < 1e-12);

        let fit = relative.fit().unwrap();
        assert!((fit.slope - 0.1).abs() < 1e-9);
        assert_eq!(fit.ndf, 0);
    }
}
