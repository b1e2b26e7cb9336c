//! The SDP interface and its building blocks.
//!
//! [`Sdpi`] holds a mutable problem instance ([`SdpProblem`]) and solves it
//! through a pluggable [`SdpSolverBackend`].  Before the backend is called
//! every problem runs through [preprocessing](crate::solver::preprocess):
//! LP rows with a single nonzero become variable bounds, fixed variables
//! are folded into the constant matrices and empty rows and columns of the
//! blocks are flagged.  Problems settled by preprocessing, and problems with
//! a single free variable, are answered without the backend.  If the backend
//! fails, the penalty formulation is escalated by [`PenaltySchedule`].

pub(crate) const _INFINITY_DEFAULT: f64 = 1e20;

/// Smallest gap tolerance the penalty escalation tightens to.
pub const MIN_GAPTOL: f64 = 1e-10;

// internal module structure
pub mod backend;
mod error;
mod info;
#[cfg(feature = "serde")]
mod json;
pub mod onevar;
mod params;
mod penalty;
pub mod preprocess;
mod problem;
mod results;
mod sdpi;
mod settings;
mod slater;
mod status;
pub(crate) mod utils;

pub use backend::*;
pub use error::*;
pub use info::*;
pub use onevar::*;
pub use params::*;
pub use penalty::*;
pub use problem::*;
pub use sdpi::*;
pub use settings::*;
pub use status::*;

pub use crate::solver::utils::infbounds::*;
