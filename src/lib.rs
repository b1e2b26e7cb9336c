//! __sdpi__ is the interface layer between a branch-and-bound framework for
//! mixed-integer semidefinite programs and interior point SDP solvers.
//! It solves problems of the form
//!
//! $$
//! \begin{array}{rl}
//! \text{minimize} & c^T y\\\\\[2ex\]
//!  \text{subject to} & \sum_{i} A_i^{(k)} y_i - A_0^{(k)} \succeq 0 \quad k = 1,\dots,K \\\\\[1ex\]
//!         & \ell_r \le a_r^T y \le u_r \\\\\[1ex\]
//!         & l \le y \le u
//!  \end{array}
//! $$
//!
//! with symmetric data matrices $A_i^{(k)}$ given by their lower triangles.
//!
//! The problem is held by an [`Sdpi`](crate::solver::Sdpi) object that is
//! modified between solves by bound changes, side changes and row additions
//! or deletions, as happens in a branch-and-bound tree.  Every solve
//!
//! * turns LP rows with one nonzero into bounds and tightens row coefficients,
//! * folds fixed variables into the constant matrices,
//! * answers problems with all variables fixed or with a single free
//!   variable without calling an SDP solver,
//! * removes empty rows and columns of the blocks,
//! * recovers from solver failure through a penalty formulation with
//!   increasing penalty parameters.
//!
//! SDP solvers are attached through the
//! [`SdpSolverBackend`](crate::solver::SdpSolverBackend) trait.
//!
//! # License
//!
//! Licensed under Apache License, Version 2.0.

const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Version of the crate.
pub fn version() -> &'static str {
    VERSION
}

pub mod algebra;
pub mod io;
pub mod solver;
pub mod timers;
