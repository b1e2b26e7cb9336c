//! Preprocessing of an [`SdpProblem`] before every solve.
//!
//! All results live in a [`WorkingData`] that is rebuilt from the stored
//! problem on each solve, so the problem itself is never modified.  The
//! steps, in the order the solver applies them, are
//!
//! 1. [`prepare_lp`](WorkingData::prepare_lp), repeated by
//!    [`propagate_lp`](WorkingData::propagate_lp) while singleton rows fix
//!    further variables,
//! 2. [`check_fixed_feasibility`](WorkingData::check_fixed_feasibility)
//!    when no variable is left free,
//! 3. [`fold_constants`](WorkingData::fold_constants),
//! 4. [`find_empty_row_cols`](WorkingData::find_empty_row_cols).

use crate::algebra::*;
use crate::solver::utils::ensure_capacity;
use crate::solver::{SdpProblem, SdpiError, SdpiSettings};

mod emptyrows;
mod fixings;
mod lprows;
mod tighten;

pub use emptyrows::*;
pub use lprows::*;
pub use tighten::*;

/// Variable bounds after preprocessing.
#[derive(Debug, Clone, Default)]
pub struct WorkingBounds<T> {
    pub lb: Vec<T>,
    pub ub: Vec<T>,
    /// signed index+1 of the row that produced the lower bound: positive
    /// for its rhs, negative for its lhs, zero if the bound is original
    pub lbrowidx: Vec<isize>,
    /// as `lbrowidx`, for the upper bound
    pub ubrowidx: Vec<isize>,
}

impl<T> WorkingBounds<T>
where
    T: FloatT,
{
    pub fn is_fixed(&self, v: usize, epsilon: T) -> bool {
        is_fixed(&self.lb, &self.ub, v, epsilon)
    }

    /// Tighten the bounds of `var` from the singleton row
    /// `lhs <= coef * y_var <= rhs`, returning the number of bounds changed.
    pub fn tighten_from_row(
        &mut self,
        row: usize,
        var: usize,
        coef: T,
        (lhs, rhs): (T, T),
        epsilon: T,
    ) -> usize {
        let inf = crate::solver::infinity::<T>();
        let (lo, hi) = if coef > T::zero() {
            (lhs, rhs)
        } else {
            (rhs, lhs)
        };
        let lb = if lo.abs() < inf { lo / coef } else { -inf };
        let ub = if hi.abs() < inf { hi / coef } else { inf };

        let tag = (row + 1) as isize;
        let mut nchanged = 0;
        if lb > self.lb[var] + epsilon {
            tracing::debug!(component = "preprocess", row, var, old = %self.lb[var], new = %lb, "lower bound from singleton row");
            self.lb[var] = lb;
            self.lbrowidx[var] = if coef < T::zero() { tag } else { -tag };
            nchanged += 1;
        }
        if ub < self.ub[var] - epsilon {
            tracing::debug!(component = "preprocess", row, var, old = %self.ub[var], new = %ub, "upper bound from singleton row");
            self.ub[var] = ub;
            self.ubrowidx[var] = if coef > T::zero() { tag } else { -tag };
            nchanged += 1;
        }
        nchanged
    }
}

#[inline]
pub(crate) fn is_fixed<T: FloatT>(lb: &[T], ub: &[T], v: usize, epsilon: T) -> bool {
    ub[v] - lb[v] <= epsilon
}

/// Scratch data derived from an [`SdpProblem`] by preprocessing.  The
/// allocations are kept between solves.
#[derive(Debug, Clone)]
pub struct WorkingData<T> {
    pub(crate) epsilon: T,
    pub bounds: WorkingBounds<T>,
    pub lp: WorkingRows<T>,
    /// constant matrix of every block after folding the fixed variables
    pub constants: Vec<Triplets<T>>,
    pub blockchanges: BlockIndexChanges,
    /// smallest eigenvectors found by the all fixed check
    pub fixedvecs: Vec<Option<Vec<T>>>,
}

impl<T> Default for WorkingData<T>
where
    T: FloatT,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<T> WorkingData<T>
where
    T: FloatT,
{
    pub fn new() -> Self {
        Self {
            epsilon: T::zero(),
            bounds: WorkingBounds::default(),
            lp: WorkingRows::default(),
            constants: Vec::new(),
            blockchanges: BlockIndexChanges::default(),
            fixedvecs: Vec::new(),
        }
    }

    /// Start over from the bounds of `problem`.
    pub fn reset(
        &mut self,
        problem: &SdpProblem<T>,
        settings: &SdpiSettings<T>,
    ) -> Result<(), SdpiError> {
        let nvars = problem.nvars();
        let bounds = &mut self.bounds;
        ensure_capacity(&mut bounds.lb, nvars)?;
        ensure_capacity(&mut bounds.ub, nvars)?;
        ensure_capacity(&mut bounds.lbrowidx, nvars)?;
        ensure_capacity(&mut bounds.ubrowidx, nvars)?;

        bounds.lb.clear();
        bounds.lb.extend_from_slice(problem.lb());
        bounds.ub.clear();
        bounds.ub.extend_from_slice(problem.ub());
        bounds.lbrowidx.clear();
        bounds.lbrowidx.resize(nvars, 0);
        bounds.ubrowidx.clear();
        bounds.ubrowidx.resize(nvars, 0);

        self.epsilon = settings.epsilon;
        self.fixedvecs.clear();
        Ok(())
    }

    pub fn lb(&self) -> &[T] {
        &self.bounds.lb
    }

    pub fn ub(&self) -> &[T] {
        &self.bounds.ub
    }

    pub fn is_fixed(&self, v: usize) -> bool {
        self.bounds.is_fixed(v, self.epsilon)
    }

    /// Number of variables that are not fixed.
    pub fn nactive(&self) -> usize {
        (0..self.bounds.lb.len()).filter(|&v| !self.is_fixed(v)).count()
    }

    /// First variable that is not fixed.
    pub fn first_active(&self) -> Option<usize> {
        (0..self.bounds.lb.len()).find(|&v| !self.is_fixed(v))
    }

    /// Run [`prepare_lp`](WorkingData::prepare_lp) until it stops finding
    /// fixings or proves infeasibility.  The returned counts are summed
    /// over all passes.
    pub fn propagate_lp(
        &mut self,
        problem: &SdpProblem<T>,
        settings: &SdpiSettings<T>,
    ) -> Result<LpPass, SdpiError> {
        let mut total = LpPass::default();
        let mut npasses = 0;
        loop {
            let pass = self.prepare_lp(problem, settings)?;
            npasses += 1;
            total.infeasible = pass.infeasible;
            total.fixingsfound |= pass.fixingsfound;
            total.nchgcoefs += pass.nchgcoefs;
            total.nboundchgs += pass.nboundchgs;
            if pass.infeasible || !pass.fixingsfound {
                break;
            }
        }
        tracing::debug!(
            component = "preprocess",
            npasses,
            infeasible = total.infeasible,
            nchgcoefs = total.nchgcoefs,
            nboundchgs = total.nboundchgs,
            nrows = self.lp.nrows(),
            "LP propagation finished"
        );
        Ok(total)
    }
}
