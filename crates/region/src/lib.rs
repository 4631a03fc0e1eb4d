//! Region predicates and cut expressions
#![doc = include_str!("../readme.md")]

// Split into subfiles for development, but anything important is re-exported
mod cut;
mod error;
mod frame;
mod predicate;
mod region;

#[doc(inline)]
pub use cut::CutExpr;

#[doc(inline)]
pub use frame::Frame;

#[doc(inline)]
pub use predicate::{RegionPredicate, RegionPredicateBuilder, VoxelSample};

#[doc(inline)]
pub use region::{Comparison, Plane, Region, ZBand};

#[doc(inline)]
pub use error::{Error, Result};
