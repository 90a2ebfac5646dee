// src/conversion/mod.rs

//! Unit conversions of materials
//!
//! - [`resolve_required_conversions`] tells which stored conversions a
//!   material's LCA processes need, which are unused, and which are missing.
//! - [`ConversionMatrix`] gives O(1) factor lookup in both directions.

mod material;
mod matrix;
mod resolver;

pub use material::{Conversion, LcaProcess, Material, load_material};
pub use matrix::ConversionMatrix;
pub use resolver::{ConversionResolution, required_units, resolve, resolve_required_conversions};
