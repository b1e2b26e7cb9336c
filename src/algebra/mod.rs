//! Numerical building blocks for the interface layer.
//!
//! This module provides the floating point traits used throughout the crate,
//! compensated extended precision sums, sparse lower triangular triplet
//! storage and the dense smallest-eigenpair routines used by the fast paths.

mod eigen;
mod error_types;
mod floats;
mod matrix;
mod quadprec;
mod triplets;

pub use eigen::*;
pub use error_types::*;
pub use floats::*;
pub use matrix::*;
pub use quadprec::*;
pub use triplets::*;
