//! Common utility for extended `std` types
//!
//! These are left public for convenience.
//!
//! For example, consistent scientific formatting and bin edge searches are
//! useful everywhere in the toolkit.
#![doc = include_str!("../readme.md")]

// Alias for the format! macro
pub use std::format as f;

// Modules
mod edges_ext;
mod error;
mod value_ext;

// Flatten
pub use edges_ext::EdgesExt;
pub use error::{Error, Result};
pub use value_ext::{ValueExt, VoxelValueExt};
