use super::backend::WarmStart;
use super::info::SdpiStatistics;
use super::sdpi::Sdpi;
use super::*;
use crate::algebra::*;

// how the last solve was decided, for solved problems only
enum Outcome<'a, T> {
    Infeasible { allfixed: bool },
    AllFixed,
    OneVar(&'a OneVarResult<T>),
    Backend,
}

impl<T> Sdpi<T>
where
    T: FloatT,
{
    fn outcome(&self) -> Option<Outcome<'_, T>> {
        match &self.state {
            SolveState::Unsolved | SolveState::Failed => None,
            SolveState::Infeasible { allfixed, .. } => Some(Outcome::Infeasible {
                allfixed: *allfixed,
            }),
            SolveState::AllFixed => Some(Outcome::AllFixed),
            SolveState::OneVar(result) => Some(Outcome::OneVar(result)),
            SolveState::Solved { .. } => Some(Outcome::Backend),
        }
    }

    // for boolean queries, which answer false on unsolved problems
    fn solved_outcome(&self, query: &str) -> Option<Outcome<'_, T>> {
        let outcome = self.outcome();
        if outcome.is_none() {
            tracing::error!(component = "sdpi", query, "problem has not been solved");
        }
        outcome
    }

    fn require_outcome(&self) -> Result<Outcome<'_, T>, SdpiError> {
        self.outcome().ok_or(SdpiError::NotSolved)
    }

    // ---------------------------------
    // status
    // ---------------------------------

    /// The last solve call produced a result, possibly through preprocessing
    /// or the penalty formulation.
    pub fn was_solved(&self) -> bool {
        self.state.is_solved()
    }

    /// Solved without the penalty formulation.
    pub fn solved_orig(&self) -> bool {
        self.state.is_solved() && !self.state.penalty()
    }

    pub fn feasibility_known(&self) -> bool {
        match self.solved_outcome("feasibility_known") {
            None => false,
            Some(Outcome::Backend) => self.backend.feasibility_known(),
            Some(_) => true,
        }
    }

    /// `(primal feasible, dual feasible)`.
    pub fn sol_feasibility(&self) -> Result<(bool, bool), SdpiError> {
        match self.require_outcome()? {
            Outcome::Infeasible { allfixed } => Ok((allfixed, false)),
            Outcome::AllFixed => Ok((true, true)),
            Outcome::OneVar(r) => Ok((true, r.status == OneVarStatus::Optimal)),
            Outcome::Backend => Ok(self.backend.sol_feasibility()?),
        }
    }

    pub fn is_primal_unbounded(&self) -> bool {
        match self.solved_outcome("is_primal_unbounded") {
            None | Some(Outcome::AllFixed) => false,
            Some(Outcome::Infeasible { allfixed }) => allfixed,
            Some(Outcome::OneVar(r)) => r.status == OneVarStatus::Infeasible,
            Some(Outcome::Backend) => self.backend.is_primal_unbounded(),
        }
    }

    pub fn is_primal_infeasible(&self) -> bool {
        match self.solved_outcome("is_primal_infeasible") {
            Some(Outcome::Backend) => self.backend.is_primal_infeasible(),
            _ => false,
        }
    }

    pub fn is_primal_feasible(&self) -> bool {
        match self.solved_outcome("is_primal_feasible") {
            None => false,
            Some(Outcome::Infeasible { allfixed }) => allfixed,
            Some(Outcome::AllFixed) | Some(Outcome::OneVar(_)) => true,
            Some(Outcome::Backend) => self.backend.is_primal_feasible(),
        }
    }

    pub fn is_dual_unbounded(&self) -> bool {
        match self.solved_outcome("is_dual_unbounded") {
            Some(Outcome::Backend) => self.backend.is_dual_unbounded(),
            _ => false,
        }
    }

    pub fn is_dual_infeasible(&self) -> bool {
        match self.solved_outcome("is_dual_infeasible") {
            None | Some(Outcome::AllFixed) => false,
            Some(Outcome::Infeasible { .. }) => true,
            Some(Outcome::OneVar(r)) => r.status == OneVarStatus::Infeasible,
            Some(Outcome::Backend) => self.backend.is_dual_infeasible(),
        }
    }

    pub fn is_dual_feasible(&self) -> bool {
        match self.solved_outcome("is_dual_feasible") {
            None => false,
            Some(Outcome::Infeasible { .. }) => false,
            Some(Outcome::AllFixed) => true,
            Some(Outcome::OneVar(r)) => r.status == OneVarStatus::Optimal,
            Some(Outcome::Backend) => self.backend.is_dual_feasible(),
        }
    }

    pub fn is_converged(&self) -> bool {
        match self.solved_outcome("is_converged") {
            None => false,
            Some(Outcome::Backend) => self.backend.is_converged(),
            Some(_) => true,
        }
    }

    pub fn is_objlim_exc(&self) -> bool {
        match self.solved_outcome("is_objlim_exc") {
            Some(Outcome::Backend) => self.backend.is_objlim_exc(),
            _ => false,
        }
    }

    pub fn is_iterlim_exc(&self) -> bool {
        match self.solved_outcome("is_iterlim_exc") {
            Some(Outcome::Backend) => self.backend.is_iterlim_exc(),
            _ => false,
        }
    }

    pub fn is_timelim_exc(&self) -> bool {
        match self.solved_outcome("is_timelim_exc") {
            Some(Outcome::Backend) => self.backend.is_timelim_exc(),
            _ => false,
        }
    }

    /// Backend status code; 0 for problems decided without the backend and
    /// -1 for unsolved ones.
    pub fn internal_status(&self) -> i32 {
        match self.outcome() {
            None => -1,
            Some(Outcome::Backend) => self.backend.internal_status(),
            Some(_) => 0,
        }
    }

    pub fn is_optimal(&self) -> bool {
        match self.solved_outcome("is_optimal") {
            None | Some(Outcome::Infeasible { .. }) => false,
            Some(Outcome::AllFixed) => true,
            Some(Outcome::OneVar(r)) => r.status == OneVarStatus::Optimal,
            Some(Outcome::Backend) => self.backend.is_optimal(),
        }
    }

    /// Solved to optimality, or infeasibility proven.
    pub fn is_acceptable(&self) -> bool {
        match self.solved_outcome("is_acceptable") {
            None => false,
            Some(Outcome::Backend) => self.backend.is_acceptable(),
            Some(_) => true,
        }
    }

    // ---------------------------------
    // solution
    // ---------------------------------

    /// Objective value including the contribution of fixed variables;
    /// infinite for infeasible problems.
    pub fn objval(&self) -> Result<T, SdpiError> {
        match self.require_outcome()? {
            Outcome::Infeasible { .. } => Ok(infinity()),
            Outcome::AllFixed => Ok(self.work.fixed_objective(&self.problem)),
            Outcome::OneVar(r) => Ok(r.objval),
            Outcome::Backend => Ok(self.backend.objval()?),
        }
    }

    /// A valid lower bound on the optimal value: the objective value of
    /// solved problems, the best penalty bound of failed ones and `-∞`
    /// otherwise.
    pub fn lower_objbound(&self) -> Result<T, SdpiError> {
        if self.state.is_solved() {
            self.objval()
        } else if self.state.penalty() {
            Ok(self.bestbound)
        } else {
            Ok(-infinity::<T>())
        }
    }

    /// Objective value and values of all variables.
    pub fn dual_sol(&self) -> Result<(T, Vec<T>), SdpiError> {
        let objval = self.objval()?;
        match self.require_outcome()? {
            Outcome::Infeasible { .. } | Outcome::AllFixed => Ok((objval, self.work.lb().to_vec())),
            Outcome::OneVar(r) => {
                let mut y = self.work.lb().to_vec();
                y[r.idx] = r.optval;
                Ok((objval, y))
            }
            Outcome::Backend => Ok(self.backend.dual_sol()?),
        }
    }

    /// The last backend iterate that could serve as a warm start.
    pub fn preoptimal_sol(&self) -> Result<Option<WarmStart<T>>, SdpiError> {
        match self.require_outcome()? {
            Outcome::Backend => Ok(self.backend.preoptimal_sol()?),
            _ => Ok(None),
        }
    }

    /// Multipliers of the lower and upper variable bounds, `None` if the
    /// problem is infeasible.
    pub fn primal_bound_vars(&self) -> Result<Option<(Vec<T>, Vec<T>)>, SdpiError> {
        let nvars = self.problem.nvars();
        let feastol = self.settings.feastol;
        match self.require_outcome()? {
            Outcome::Infeasible { .. } => Ok(None),
            Outcome::AllFixed => Ok(Some((vec![T::zero(); nvars], vec![T::zero(); nvars]))),
            Outcome::OneVar(r) => {
                let mut lbvals = vec![T::zero(); nvars];
                let mut ubvals = vec![T::zero(); nvars];
                let obj = self.problem.obj()[r.idx];
                let (lb, ub) = (self.work.lb()[r.idx], self.work.ub()[r.idx]);
                match r.status {
                    OneVarStatus::Infeasible => {
                        if r.certval > feastol {
                            ubvals[r.idx] = r.certval;
                        } else if r.certval < -feastol {
                            lbvals[r.idx] = -r.certval;
                        }
                    }
                    OneVarStatus::Optimal => {
                        if obj >= T::zero() && T::abs(r.optval - lb) < feastol {
                            lbvals[r.idx] = obj;
                        } else if obj < T::zero() && T::abs(r.optval - ub) < feastol {
                            ubvals[r.idx] = -obj;
                        }
                    }
                }
                Ok(Some((lbvals, ubvals)))
            }
            Outcome::Backend if self.backend.is_primal_infeasible() => Ok(None),
            Outcome::Backend => Ok(Some(self.backend.primal_bound_vars()?)),
        }
    }

    /// Primal values of the left and right hand sides of all stored LP
    /// rows.  Rows removed by preprocessing take the bound multipliers of
    /// the variable bounds they were turned into, or zero.
    pub fn primal_lp_sides(&self) -> Result<Option<(Vec<T>, Vec<T>)>, SdpiError> {
        let nrows = self.problem.nlprows();
        match self.require_outcome()? {
            Outcome::Infeasible { .. } => return Ok(None),
            Outcome::AllFixed | Outcome::OneVar(_) => {
                return Ok(Some((vec![T::zero(); nrows], vec![T::zero(); nrows])))
            }
            Outcome::Backend if self.backend.is_primal_infeasible() => return Ok(None),
            Outcome::Backend => {}
        }

        let (keptlhs, keptrhs) = self.backend.primal_lp_sides()?;
        let (lbvals, ubvals) = self.backend.primal_bound_vars()?;
        let mut lhs = vec![T::zero(); nrows];
        let mut rhs = vec![T::zero(); nrows];

        // row idx > 0 became a bound through its right hand side,
        // idx < 0 through its left hand side
        let bounds = &self.work.bounds;
        let provenance = bounds
            .lbrowidx
            .iter()
            .zip(lbvals.iter())
            .chain(bounds.ubrowidx.iter().zip(ubvals.iter()));
        for (&idx, &val) in provenance {
            if idx > 0 {
                rhs[idx as usize - 1] = val;
            } else if idx < 0 {
                lhs[(-idx) as usize - 1] = val;
            }
        }

        for (i, &kept) in self.work.lp.rowmap.iter().enumerate() {
            if kept >= 0 {
                lhs[i] = keptlhs[kept as usize];
                rhs[i] = keptrhs[kept as usize];
            }
        }
        Ok(Some((lhs, rhs)))
    }

    /// Number of nonzeros of the primal matrix per block, LP block last.
    pub fn primal_nonzeros(&self) -> Result<Option<Vec<usize>>, SdpiError> {
        match self.require_outcome()? {
            Outcome::Backend => Ok(Some(self.backend.primal_nonzeros()?)),
            _ => Ok(None),
        }
    }

    /// Primal matrix per block, LP block last.
    pub fn primal_matrix(&self) -> Result<Option<Vec<Triplets<T>>>, SdpiError> {
        match self.require_outcome()? {
            Outcome::Backend => Ok(Some(self.backend.primal_matrix()?)),
            _ => Ok(None),
        }
    }

    /// Dense primal matrix per SDP block.
    ///
    /// For infeasible problems with all variables fixed this is the ray
    /// `v vᵀ` of the smallest eigenvector of the violated block, available
    /// only with `allfixed_primal_ray`.  For a single free variable it is
    /// the eigenvector certificate, scaled to match the objective.
    pub fn primal_solution_matrix(&self) -> Result<Option<Vec<Matrix<T>>>, SdpiError> {
        let feastol = self.settings.feastol;
        match self.require_outcome()? {
            Outcome::Infeasible { allfixed: false } => Ok(None),
            Outcome::Infeasible { allfixed: true } | Outcome::AllFixed => {
                let infeasible = self.state.is_infeasible();
                let fixedvecs = &self.work.fixedvecs;
                if !fixedvecs.iter().any(Option::is_some) {
                    return Ok(None);
                }
                let matrices = (0..self.problem.nblocks())
                    .map(|b| {
                        let size = self.problem.block_size(b);
                        match fixedvecs.get(b) {
                            Some(Some(v)) if infeasible => Matrix::rank_one(v, T::one()),
                            _ => Matrix::zeros(size),
                        }
                    })
                    .collect();
                Ok(Some(matrices))
            }
            Outcome::OneVar(r) => {
                let certvec = match &r.certvec {
                    Some(v) => v,
                    None => return Ok(Some(Vec::new())),
                };
                let obj = self.problem.obj()[r.idx];
                let scale = if r.status == OneVarStatus::Optimal && r.certval > feastol {
                    obj / r.certval
                } else {
                    T::one()
                };
                Ok(Some(vec![Matrix::rank_one(certvec, scale)]))
            }
            Outcome::Backend if self.backend.is_primal_infeasible() => Ok(None),
            Outcome::Backend => Ok(Some(self.backend.primal_solution_matrix()?)),
        }
    }

    pub fn max_primal_entry(&self) -> T {
        self.backend.max_primal_entry()
    }

    // ---------------------------------
    // statistics
    // ---------------------------------

    /// SDP solver time of the last solve call, in seconds.
    pub fn time(&self) -> f64 {
        self.info.time
    }

    pub fn iterations(&self) -> u32 {
        self.info.iterations
    }

    /// Number of SDP solver calls of the last solve call, including the
    /// penalty formulation.
    pub fn sdp_calls(&self) -> u32 {
        self.info.sdp_calls
    }

    pub fn statistics(&self) -> SdpiStatistics {
        self.info.statistics
    }
}
