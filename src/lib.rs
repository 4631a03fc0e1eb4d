//! `mutomo` is a modular toolkit for reducing voxelised muon tomography
//! discriminator data
//!
#![doc = include_str!("../readme.md")]
#![deny(missing_docs, missing_debug_implementations)]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]

// Re-exports of toolkit crates.
#[doc(inline)]
pub use mutomo_utils as utils;

#[cfg(feature = "grid")]
#[cfg_attr(docsrs, doc(cfg(feature = "grid")))]
#[doc(inline)]
pub use mutomo_grid as grid;

#[cfg(feature = "region")]
#[cfg_attr(docsrs, doc(cfg(feature = "region")))]
#[doc(inline)]
pub use mutomo_region as region;

#[cfg(feature = "reduce")]
#[cfg_attr(docsrs, doc(cfg(feature = "reduce")))]
#[doc(inline)]
pub use mutomo_reduce as reduce;

#[cfg(feature = "analysis")]
#[cfg_attr(docsrs, doc(cfg(feature = "analysis")))]
#[doc(inline)]
pub use mutomo_analysis as analysis;
