//! Interface to the interior point SDP solvers behind [`Sdpi`](crate::solver::Sdpi).
//!
//! A backend receives the problem after preprocessing as a
//! [`PreparedProblem`]: fixed variables are folded into the constant
//! matrices, LP rows are replaced by the kept rows and empty rows and
//! columns of every block are flagged through index change maps.  Block
//! and variable indices are those of the stored problem, so a backend that
//! compacts the problem must apply the maps itself.

use crate::algebra::*;
use crate::solver::preprocess::WorkingData;
use crate::solver::{BackendError, LpRowsRef, SdpParam, SdpProblem, SolverSetting};

/// One SDP block handed to a backend.
#[derive(Debug, Clone)]
pub struct PreparedBlock<'a, T> {
    pub size: usize,
    /// variables with a coefficient matrix in this block
    pub vars: &'a [usize],
    /// coefficient matrix of every entry of `vars`
    pub entries: Vec<TripletsRef<'a, T>>,
    /// constant matrix with the fixed variables folded in
    pub constant: TripletsRef<'a, T>,
    /// per index: -1 if removed, otherwise the number of removed indices before it
    pub indchanges: &'a [isize],
    pub nremovedinds: usize,
}

/// Problem handed to a backend by a solve call.
#[derive(Debug, Clone)]
pub struct PreparedProblem<'a, T> {
    pub obj: &'a [T],
    /// working bounds; variables with `ub - lb <= epsilon` are fixed
    pub lb: &'a [T],
    pub ub: &'a [T],
    pub blocks: Vec<PreparedBlock<'a, T>>,
    /// per block: -1 if removed, otherwise the number of removed blocks before it
    pub blockindchanges: &'a [isize],
    pub nremovedblocks: usize,
    pub lp: LpRowsRef<'a, T>,
}

impl<'a, T> PreparedProblem<'a, T>
where
    T: FloatT,
{
    /// Combine the stored problem with the results of preprocessing.
    pub(crate) fn new(problem: &'a SdpProblem<T>, work: &'a WorkingData<T>) -> Self {
        let changes = &work.blockchanges;
        let blocks = (0..problem.nblocks())
            .map(|b| PreparedBlock {
                size: problem.block_size(b),
                vars: problem.block_vars(b),
                entries: (0..problem.block_vars(b).len())
                    .map(|k| problem.block_var_entries(b, k))
                    .collect(),
                constant: work.constants[b].as_ref(),
                indchanges: &changes.indchanges[b],
                nremovedinds: changes.nremovedinds[b],
            })
            .collect();

        Self {
            obj: problem.obj(),
            lb: work.lb(),
            ub: work.ub(),
            blocks,
            blockindchanges: &changes.blockindchanges,
            nremovedblocks: changes.nremovedblocks,
            lp: work.lp.as_ref(),
        }
    }

    pub fn nvars(&self) -> usize {
        self.obj.len()
    }

    pub fn nblocks(&self) -> usize {
        self.blocks.len()
    }
}

/// Starting point for a backend, also the shape of a preoptimal solution.
/// Matrices are given per block in the indexing of the stored problem,
/// with the LP block last.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WarmStart<T> {
    /// dual vector, one entry per variable
    pub y: Vec<T>,
    /// dual slack matrix `Z = Σ A_i y_i - A_0` per block
    pub z: Vec<Triplets<T>>,
    /// primal matrix per block
    pub x: Vec<Triplets<T>>,
}

/// Parameters of a solve of the penalty formulation
///
/// ```text
/// min  c'y + Γ r   s.t.  Σ A_i y_i - A_0 + r I ⪰ 0,  r >= 0
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PenaltyRequest<T> {
    /// `Γ`
    pub penalty_param: T,
    /// keep the objective `c'y`; without it only `r` is minimised
    pub with_obj: bool,
    /// add the bound `r >= 0`
    pub rbound: bool,
}

/// What a solve of the penalty formulation says about the original problem.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PenaltyOutcome {
    /// the solution is feasible for the unpenalized problem
    pub feasorig: bool,
    /// the penalty variable is at its bound, so a larger penalty may help
    pub penaltybound: bool,
}

/// An interior point SDP solver.
///
/// All result queries refer to the last successful `load_and_solve*` call.
pub trait SdpSolverBackend<T: FloatT>: Send {
    fn name(&self) -> &'static str;

    fn description(&self) -> &'static str;

    /// Number of penalty increases the solver is tuned for.
    fn default_npenalty_increases(&self) -> u32 {
        8
    }

    /// The solver needs a primal matrix to use a warm start.
    fn warmstart_needs_primal(&self) -> bool {
        false
    }

    /// Advance the problem counter used in diagnostic output.
    fn increase_counter(&mut self);

    fn reset_counter(&mut self);

    fn load_and_solve(
        &mut self,
        problem: &PreparedProblem<'_, T>,
        start: Option<&WarmStart<T>>,
        start_setting: SolverSetting,
        timelimit: f64,
    ) -> Result<(), BackendError>;

    fn load_and_solve_with_penalty(
        &mut self,
        problem: &PreparedProblem<'_, T>,
        request: PenaltyRequest<T>,
        start: Option<&WarmStart<T>>,
        start_setting: SolverSetting,
        timelimit: f64,
    ) -> Result<PenaltyOutcome, BackendError>;

    // ---------------------------------
    // status
    // ---------------------------------

    fn was_solved(&self) -> bool;
    fn feasibility_known(&self) -> bool;
    /// (primal feasible, dual feasible)
    fn sol_feasibility(&self) -> Result<(bool, bool), BackendError>;
    fn is_primal_unbounded(&self) -> bool;
    fn is_primal_infeasible(&self) -> bool;
    fn is_primal_feasible(&self) -> bool;
    fn is_dual_unbounded(&self) -> bool;
    fn is_dual_infeasible(&self) -> bool;
    fn is_dual_feasible(&self) -> bool;
    fn is_converged(&self) -> bool;
    fn is_objlim_exc(&self) -> bool;
    fn is_iterlim_exc(&self) -> bool;
    fn is_timelim_exc(&self) -> bool;
    /// Solver specific status code.
    fn internal_status(&self) -> i32;
    fn is_optimal(&self) -> bool;
    /// Solved to optimality, or infeasibility or unboundedness proven.
    fn is_acceptable(&self) -> bool;

    // ---------------------------------
    // solution
    // ---------------------------------

    fn objval(&self) -> Result<T, BackendError>;
    /// Objective value and dual vector.
    fn dual_sol(&self) -> Result<(T, Vec<T>), BackendError>;
    /// Last iterate that reached the warm start gap, if any.
    fn preoptimal_sol(&self) -> Result<Option<WarmStart<T>>, BackendError>;
    /// Multipliers of the lower and upper variable bounds.
    fn primal_bound_vars(&self) -> Result<(Vec<T>, Vec<T>), BackendError>;
    /// Multipliers of the left and right hand sides of the kept LP rows.
    fn primal_lp_sides(&self) -> Result<(Vec<T>, Vec<T>), BackendError>;
    /// Number of nonzeros of the primal matrix per block, LP block last.
    fn primal_nonzeros(&self) -> Result<Vec<usize>, BackendError>;
    /// Primal matrix per block, LP block last.
    fn primal_matrix(&self) -> Result<Vec<Triplets<T>>, BackendError>;
    /// Dense primal matrix per SDP block, zero on removed indices.
    fn primal_solution_matrix(&self) -> Result<Vec<Matrix<T>>, BackendError>;
    fn max_primal_entry(&self) -> T;

    // ---------------------------------
    // statistics
    // ---------------------------------

    /// Solver time of the last solve call in seconds.
    fn time(&self) -> f64;
    fn iterations(&self) -> u32;
    fn sdp_calls(&self) -> u32;
    fn settings_used(&self) -> SolverSetting;

    // ---------------------------------
    // parameters
    // ---------------------------------

    fn get_real_par(&self, param: SdpParam) -> Result<T, BackendError>;
    fn set_real_par(&mut self, param: SdpParam, value: T) -> Result<(), BackendError>;
    fn get_int_par(&self, param: SdpParam) -> Result<i32, BackendError>;
    fn set_int_par(&mut self, param: SdpParam, value: i32) -> Result<(), BackendError>;

    /// Guess for the initial scaling of the dual slack from the largest
    /// expected value of the variables.
    fn compute_lambdastar(&mut self, maxguess: T) -> Result<(), BackendError>;
    fn compute_penalty_param(&self, maxcoeff: T) -> Result<T, BackendError>;
    fn compute_max_penalty_param(&self, penaltyparam: T) -> Result<T, BackendError>;
}

/// Placeholder used when no SDP solver is attached.  Every solve fails with
/// [`BackendError::NotAvailable`], so only problems settled by
/// preprocessing or the fast paths can be solved.
#[derive(Debug, Clone, Default)]
pub struct NoBackend {
    counter: u64,
}

impl<T: FloatT> SdpSolverBackend<T> for NoBackend {
    fn name(&self) -> &'static str {
        "none"
    }

    fn description(&self) -> &'static str {
        "no SDP solver linked, only problems solved in preprocessing are handled"
    }

    fn increase_counter(&mut self) {
        self.counter += 1;
    }

    fn reset_counter(&mut self) {
        self.counter = 0;
    }

    fn load_and_solve(
        &mut self,
        _problem: &PreparedProblem<'_, T>,
        _start: Option<&WarmStart<T>>,
        _start_setting: SolverSetting,
        _timelimit: f64,
    ) -> Result<(), BackendError> {
        self.counter += 1;
        Err(BackendError::NotAvailable)
    }

    fn load_and_solve_with_penalty(
        &mut self,
        _problem: &PreparedProblem<'_, T>,
        _request: PenaltyRequest<T>,
        _start: Option<&WarmStart<T>>,
        _start_setting: SolverSetting,
        _timelimit: f64,
    ) -> Result<PenaltyOutcome, BackendError> {
        self.counter += 1;
        Err(BackendError::NotAvailable)
    }

    fn was_solved(&self) -> bool {
        false
    }
    fn feasibility_known(&self) -> bool {
        false
    }
    fn sol_feasibility(&self) -> Result<(bool, bool), BackendError> {
        Err(BackendError::NotAvailable)
    }
    fn is_primal_unbounded(&self) -> bool {
        false
    }
    fn is_primal_infeasible(&self) -> bool {
        false
    }
    fn is_primal_feasible(&self) -> bool {
        false
    }
    fn is_dual_unbounded(&self) -> bool {
        false
    }
    fn is_dual_infeasible(&self) -> bool {
        false
    }
    fn is_dual_feasible(&self) -> bool {
        false
    }
    fn is_converged(&self) -> bool {
        false
    }
    fn is_objlim_exc(&self) -> bool {
        false
    }
    fn is_iterlim_exc(&self) -> bool {
        false
    }
    fn is_timelim_exc(&self) -> bool {
        false
    }
    fn internal_status(&self) -> i32 {
        -1
    }
    fn is_optimal(&self) -> bool {
        false
    }
    fn is_acceptable(&self) -> bool {
        false
    }

    fn objval(&self) -> Result<T, BackendError> {
        Err(BackendError::NotAvailable)
    }
    fn dual_sol(&self) -> Result<(T, Vec<T>), BackendError> {
        Err(BackendError::NotAvailable)
    }
    fn preoptimal_sol(&self) -> Result<Option<WarmStart<T>>, BackendError> {
        Ok(None)
    }
    fn primal_bound_vars(&self) -> Result<(Vec<T>, Vec<T>), BackendError> {
        Err(BackendError::NotAvailable)
    }
    fn primal_lp_sides(&self) -> Result<(Vec<T>, Vec<T>), BackendError> {
        Err(BackendError::NotAvailable)
    }
    fn primal_nonzeros(&self) -> Result<Vec<usize>, BackendError> {
        Err(BackendError::NotAvailable)
    }
    fn primal_matrix(&self) -> Result<Vec<Triplets<T>>, BackendError> {
        Err(BackendError::NotAvailable)
    }
    fn primal_solution_matrix(&self) -> Result<Vec<Matrix<T>>, BackendError> {
        Err(BackendError::NotAvailable)
    }
    fn max_primal_entry(&self) -> T {
        T::zero()
    }

    fn time(&self) -> f64 {
        0.0
    }
    fn iterations(&self) -> u32 {
        0
    }
    fn sdp_calls(&self) -> u32 {
        0
    }
    fn settings_used(&self) -> SolverSetting {
        SolverSetting::Unsolved
    }

    fn get_real_par(&self, _param: SdpParam) -> Result<T, BackendError> {
        Err(BackendError::ParameterUnknown)
    }
    fn set_real_par(&mut self, _param: SdpParam, _value: T) -> Result<(), BackendError> {
        Err(BackendError::ParameterUnknown)
    }
    fn get_int_par(&self, _param: SdpParam) -> Result<i32, BackendError> {
        Err(BackendError::ParameterUnknown)
    }
    fn set_int_par(&mut self, _param: SdpParam, _value: i32) -> Result<(), BackendError> {
        Err(BackendError::ParameterUnknown)
    }

    fn compute_lambdastar(&mut self, _maxguess: T) -> Result<(), BackendError> {
        Err(BackendError::ParameterUnknown)
    }
    fn compute_penalty_param(&self, _maxcoeff: T) -> Result<T, BackendError> {
        Err(BackendError::ParameterUnknown)
    }
    fn compute_max_penalty_param(&self, _penaltyparam: T) -> Result<T, BackendError> {
        Err(BackendError::ParameterUnknown)
    }
}
