use crate::f;

/// Extends primitives with more specific formatting options
pub trait ValueExt {
    /// Consistent scientific number formatting
    ///
    /// Exponents are always signed and padded so that columns of results line
    /// up in summaries and text outputs.
    ///
    /// ```rust
    /// # use mutomo_utils::ValueExt;
    /// assert_eq!((-1.0_f64).sci(5, 2), "-1.00000e+00".to_string());
    /// assert_eq!(11.17_f64.sci(3, 2), "1.117e+01".to_string());
    /// assert_eq!(0.0025_f64.sci(2, 3), "2.50e-003".to_string());
    /// ```
    fn sci(&self, precision: usize, exp_pad: usize) -> String;
}

impl<T: std::fmt::LowerExp> ValueExt for T {
    fn sci(&self, precision: usize, exp_pad: usize) -> String {
        let mantissa_and_exp = f!("{:.precision$e}", &self, precision = precision);

        // LowerExp always writes an 'e', but fall back on the raw string anyway
        let Some((mantissa, exp)) = mantissa_and_exp.split_once('e') else {
            return mantissa_and_exp;
        };

        let (sign, digits) = match exp.strip_prefix('-') {
            Some(digits) => ('-', digits),
            None => ('+', exp),
        };

        f!("{mantissa}e{sign}{digits:0>exp_pad$}")
    }
}

/// The "no data in this voxel" convention for voxel values
///
/// Voxels that were never measured hold exactly `0.0`, so a genuine
/// measurement of exactly zero is indistinguishable from no data.
pub trait VoxelValueExt {
    /// True for exactly `0.0`, no tolerance band
    ///
    /// ```rust
    /// # use mutomo_utils::VoxelValueExt;
    /// assert!(0.0_f64.is_unmeasured());
    /// assert!((-0.0_f64).is_unmeasured());
    /// assert!(!1e-300_f64.is_unmeasured());
    /// ```
    fn is_unmeasured(&self) -> bool;

    /// Opposite of [is_unmeasured()](VoxelValueExt::is_unmeasured)
    fn is_measured(&self) -> bool {
        !self.is_unmeasured()
    }
}

impl VoxelValueExt for f64 {
    #[inline]
    fn is_unmeasured(&self) -> bool {
        *self == 0.0
    }
}
