use super::backend::*;
use super::info::SdpiInfo;
use super::onevar::*;
use super::penalty::*;
use super::preprocess::WorkingData;
use super::*;
use crate::algebra::*;
use crate::io::{ConfigurablePrintTarget, PrintTarget};
use crate::timers::*;
use std::io::Write;

/// The SDP interface: a mutable problem instance together with the
/// machinery to preprocess and solve it.
///
/// Every solve rebuilds the preprocessed problem from the stored one.
/// Problems decided by preprocessing (infeasible bounds or rows, all
/// variables fixed, a single free variable) never reach the backend.
/// When the backend fails on the remaining problems, the penalty
/// formulation is tried with growing penalty parameters and shrinking gap
/// tolerances.
///
/// ```
/// use sdpi::algebra::*;
/// use sdpi::solver::*;
///
/// // min y  s.t.  y I ⪰ 0,  0 <= y <= 5
/// let data = ProblemData {
///     obj: vec![1.0],
///     lb: vec![0.0],
///     ub: vec![5.0],
///     isintegral: None,
///     blocks: vec![SdpBlock {
///         size: 2,
///         vars: vec![BlockVar {
///             var: 0,
///             entries: Triplets::from_parts(vec![0, 1], vec![0, 1], vec![1.0, 1.0]).unwrap(),
///         }],
///         constant: Triplets::new(),
///     }],
///     rows: vec![],
/// };
///
/// let mut sdpi = Sdpi::<f64>::default();
/// sdpi.load(&data).unwrap();
/// sdpi.solve(None, SolverSetting::Unsolved, false, 10.0).unwrap();
/// assert!(sdpi.is_optimal());
/// assert_eq!(sdpi.objval().unwrap(), 0.0);
/// ```
pub struct Sdpi<T: FloatT = f64> {
    pub(crate) problem: SdpProblem<T>,
    pub(crate) work: WorkingData<T>,
    pub(crate) settings: SdpiSettings<T>,
    pub(crate) backend: Box<dyn SdpSolverBackend<T>>,
    onevar: Box<dyn OneVarSolver<T>>,
    clock: SdpiClock,
    timers: Timers,
    pub(crate) info: SdpiInfo,
    pub(crate) state: SolveState<T>,
    /// best lower bound found by penalty solves of the last call
    pub(crate) bestbound: T,
    pub(crate) primalslater: SlaterStatus,
    pub(crate) dualslater: SlaterStatus,
}

// result of preprocessing a problem for one solve
enum Preprocessed<T> {
    Infeasible,
    AllFixed { feasible: bool },
    Ready { fixedcontr: T },
}

impl<T> Default for Sdpi<T>
where
    T: FloatT,
{
    /// An interface without SDP solver, using default settings.
    fn default() -> Self {
        Self::assemble(SdpiSettings::default(), Box::<NoBackend>::default())
    }
}

impl<T> Sdpi<T>
where
    T: FloatT,
{
    /// Create an interface around `backend`.  The tolerances and the
    /// penalty parameter of `settings` are passed on to the backend.
    pub fn new(
        settings: SdpiSettings<T>,
        backend: Box<dyn SdpSolverBackend<T>>,
    ) -> Result<Self, SdpiError> {
        settings.validate()?;
        let mut sdpi = Self::assemble(settings, backend);
        sdpi.forward_settings()?;
        tracing::debug!(component = "sdpi", solver = sdpi.backend.name(), "created interface");
        Ok(sdpi)
    }

    /// Replace the solver used for problems with a single free variable.
    pub fn with_onevar_solver(mut self, onevar: Box<dyn OneVarSolver<T>>) -> Self {
        self.onevar = onevar;
        self
    }

    fn assemble(settings: SdpiSettings<T>, backend: Box<dyn SdpSolverBackend<T>>) -> Self {
        Self {
            problem: SdpProblem::new(),
            work: WorkingData::new(),
            clock: SdpiClock::new(settings.clock_type),
            settings,
            backend,
            onevar: Box::<NewtonOneVar>::default(),
            timers: Timers::default(),
            info: SdpiInfo::new(),
            state: SolveState::Unsolved,
            bestbound: -infinity::<T>(),
            primalslater: SlaterStatus::NoInfo,
            dualslater: SlaterStatus::NoInfo,
        }
    }

    /// Deep copy of the stored problem and settings around a new backend.
    /// The copy starts unsolved and uses the default one variable solver.
    pub fn clone_with_backend(
        &self,
        backend: Box<dyn SdpSolverBackend<T>>,
    ) -> Result<Self, SdpiError> {
        let mut sdpi = Self::new(self.settings.clone(), backend)?;
        sdpi.problem = self.problem.clone();
        // marks the copy in diagnostic output
        sdpi.info.sdpid = 1_000_000 + self.info.sdpid;
        Ok(sdpi)
    }

    // ---------------------------------
    // solver identity
    // ---------------------------------

    pub fn solver_name(&self) -> &'static str {
        self.backend.name()
    }

    pub fn solver_desc(&self) -> &'static str {
        self.backend.description()
    }

    pub fn default_npenalty_increases(&self) -> u32 {
        self.backend.default_npenalty_increases()
    }

    pub fn warmstart_needs_primal(&self) -> bool {
        self.backend.warmstart_needs_primal()
    }

    // ---------------------------------
    // problem data
    // ---------------------------------

    pub fn problem(&self) -> &SdpProblem<T> {
        &self.problem
    }

    pub fn settings(&self) -> &SdpiSettings<T> {
        &self.settings
    }

    pub fn n_vars(&self) -> usize {
        self.problem.nvars()
    }

    pub fn n_sdp_blocks(&self) -> usize {
        self.problem.nblocks()
    }

    pub fn n_lp_rows(&self) -> usize {
        self.problem.nlprows()
    }

    pub fn sdp_nnonz(&self) -> usize {
        self.problem.sdp_nnonz()
    }

    pub fn const_nnonz(&self) -> usize {
        self.problem.const_nnonz()
    }

    pub fn lp_nnonz(&self) -> usize {
        self.problem.lp_nnonz()
    }

    pub fn obj(&self) -> &[T] {
        self.problem.obj()
    }

    pub fn bounds(&self) -> (&[T], &[T]) {
        (self.problem.lb(), self.problem.ub())
    }

    pub fn lhs(&self) -> &[T] {
        self.problem.lhs()
    }

    pub fn rhs(&self) -> &[T] {
        self.problem.rhs()
    }

    // ---------------------------------
    // mutation
    // ---------------------------------

    /// Replace the stored problem.
    pub fn load(&mut self, data: &ProblemData<T>) -> Result<(), SdpiError> {
        self.invalidate();
        self.problem.load(data)
    }

    pub fn add_lp_rows(&mut self, rows: &[LpRow<T>]) -> Result<(), SdpiError> {
        self.invalidate();
        self.problem.add_lp_rows(rows)
    }

    /// Delete the LP rows `first..=last`.
    pub fn del_lp_rows(&mut self, first: usize, last: usize) -> Result<(), SdpiError> {
        self.invalidate();
        self.problem.del_lp_rows(first, last)
    }

    /// Delete the LP rows flagged in `mask`, returning the new position of
    /// every row or -1 for deleted ones.
    pub fn del_lp_rowset(&mut self, mask: &[bool]) -> Result<Vec<isize>, SdpiError> {
        self.invalidate();
        self.problem.del_lp_rowset(mask)
    }

    /// Drop all problem data.
    pub fn clear(&mut self) {
        self.invalidate();
        self.problem.clear();
        self.info.sdpid = 1;
        self.backend.reset_counter();
    }

    /// Changing the objective keeps the Slater verdicts, which do not
    /// depend on it.
    pub fn chg_obj(&mut self, ind: &[usize], obj: &[T]) -> Result<(), SdpiError> {
        self.invalidate_solution();
        self.problem.chg_obj(ind, obj)
    }

    pub fn chg_bounds(&mut self, ind: &[usize], lb: &[T], ub: &[T]) -> Result<(), SdpiError> {
        self.invalidate();
        self.problem.chg_bounds(ind, lb, ub)
    }

    pub fn chg_lp_sides(&mut self, ind: &[usize], lhs: &[T], rhs: &[T]) -> Result<(), SdpiError> {
        self.invalidate();
        self.problem.chg_lp_sides(ind, lhs, rhs)
    }

    fn invalidate_solution(&mut self) {
        self.state = SolveState::Unsolved;
        self.info.reset_solve_stats();
    }

    fn invalidate(&mut self) {
        self.invalidate_solution();
        self.bestbound = -infinity::<T>();
        self.primalslater = SlaterStatus::NoInfo;
        self.dualslater = SlaterStatus::NoInfo;
    }

    // ---------------------------------
    // settings and parameters
    // ---------------------------------

    /// Replace all settings at once.
    pub fn update_settings(&mut self, settings: SdpiSettings<T>) -> Result<(), SdpiError> {
        settings.validate()?;
        self.settings = settings;
        self.forward_settings()
    }

    pub fn get_real_par(&self, param: SdpParam) -> Result<T, SdpiError> {
        use SdpParam::*;
        let s = &self.settings;
        match param {
            Epsilon => Ok(s.epsilon),
            GapTol => Ok(s.gaptol),
            FeasTol => Ok(s.feastol),
            PenaltyParam => Ok(s.penaltyparam),
            MaxPenaltyParam => Ok(s.maxpenaltyparam),
            PenInfeasAdjust => Ok(s.peninfeasadjust),
            _ if param.is_real() => self.backend.get_real_par(param).map_err(param_error(param)),
            _ => Err(SdpiError::ParameterUnknown(param)),
        }
    }

    pub fn set_real_par(&mut self, param: SdpParam, value: T) -> Result<(), SdpiError> {
        use SdpParam::*;
        if !param.is_real() {
            return Err(SdpiError::ParameterUnknown(param));
        }
        if param.scope() == ParamScope::Backend {
            return self
                .backend
                .set_real_par(param, value)
                .map_err(param_error(param));
        }

        let mut s = self.settings.clone();
        match param {
            Epsilon => s.epsilon = value,
            GapTol => s.gaptol = value,
            FeasTol => s.feastol = value,
            PenaltyParam => s.penaltyparam = value,
            MaxPenaltyParam => {
                s.maxpenaltyparam = value;
                s.penaltyparam = T::min(s.penaltyparam, value);
            }
            PenInfeasAdjust => s.peninfeasadjust = value,
            _ => unreachable!(),
        }
        s.validate()?;

        let penaltychanged = s.penaltyparam != self.settings.penaltyparam;
        self.settings = s;
        match param.scope() {
            ParamScope::Shared => self.forward_real(param, value),
            _ if penaltychanged => self.forward_real(PenaltyParam, self.settings.penaltyparam),
            _ => Ok(()),
        }
    }

    pub fn get_int_par(&self, param: SdpParam) -> Result<i32, SdpiError> {
        match param {
            SdpParam::SlaterCheck => Ok(self.settings.slatercheck as i32),
            SdpParam::NPenaltyIncr => Ok(self.settings.npenaltyincr as i32),
            _ if param.is_int() => self.backend.get_int_par(param).map_err(param_error(param)),
            _ => Err(SdpiError::ParameterUnknown(param)),
        }
    }

    pub fn set_int_par(&mut self, param: SdpParam, value: i32) -> Result<(), SdpiError> {
        match param {
            SdpParam::SlaterCheck => {
                self.settings.slatercheck = SlaterCheck::from_int(value).ok_or_else(|| {
                    SdpiError::BadInput(format!("invalid Slater check setting {}", value))
                })?;
                Ok(())
            }
            SdpParam::NPenaltyIncr => {
                self.settings.npenaltyincr = u32::try_from(value).map_err(|_| {
                    SdpiError::BadInput(format!("invalid number of penalty increases {}", value))
                })?;
                Ok(())
            }
            _ if param.is_int() => self
                .backend
                .set_int_par(param, value)
                .map_err(param_error(param)),
            _ => Err(SdpiError::ParameterUnknown(param)),
        }
    }

    /// Let the backend guess its initial dual slack scaling.
    pub fn compute_lambdastar(&mut self, maxguess: T) -> Result<(), SdpiError> {
        self.backend.compute_lambdastar(maxguess)?;
        Ok(())
    }

    /// Compute and store the penalty parameter for the largest objective
    /// coefficient `maxcoeff`, capped at the maximum penalty parameter.
    pub fn compute_penalty_param(&mut self, maxcoeff: T) -> Result<T, SdpiError> {
        let penaltyparam = self.backend.compute_penalty_param(maxcoeff)?;
        self.settings.penaltyparam = T::min(penaltyparam, self.settings.maxpenaltyparam);
        self.forward_real(SdpParam::PenaltyParam, self.settings.penaltyparam)?;
        Ok(self.settings.penaltyparam)
    }

    /// Compute and store the maximum penalty parameter, lowering the
    /// penalty parameter to it if necessary.
    pub fn compute_max_penalty_param(&mut self, penaltyparam: T) -> Result<T, SdpiError> {
        let maxpenaltyparam = self.backend.compute_max_penalty_param(penaltyparam)?;
        self.settings.maxpenaltyparam = maxpenaltyparam;
        if self.settings.penaltyparam > maxpenaltyparam {
            tracing::debug!(
                component = "sdpi",
                old = %self.settings.penaltyparam,
                new = %maxpenaltyparam,
                "lowering penalty parameter to its maximum"
            );
            self.settings.penaltyparam = maxpenaltyparam;
            self.forward_real(SdpParam::PenaltyParam, maxpenaltyparam)?;
        }
        Ok(maxpenaltyparam)
    }

    fn forward_settings(&mut self) -> Result<(), SdpiError> {
        let s = &self.settings;
        let values = [
            (SdpParam::Epsilon, s.epsilon),
            (SdpParam::GapTol, s.gaptol),
            (SdpParam::FeasTol, s.feastol),
            (SdpParam::PenaltyParam, s.penaltyparam),
        ];
        for (param, value) in values {
            self.forward_real(param, value)?;
        }
        Ok(())
    }

    // backends without the parameter simply do not use it
    fn forward_real(&mut self, param: SdpParam, value: T) -> Result<(), SdpiError> {
        match self.backend.set_real_par(param, value) {
            Ok(()) | Err(BackendError::ParameterUnknown) => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    // ---------------------------------
    // solving
    // ---------------------------------

    /// Solve the stored problem.
    ///
    /// `start` is an optional starting point in the indexing of the stored
    /// problem and `start_setting` the numerical setting the backend should
    /// begin with.  With `enforce_slater_check` the Slater condition is
    /// diagnosed whenever the penalty escalation fails.  The time limit is
    /// checked between backend calls.
    ///
    /// Failure to solve is not an error; it is reported through the
    /// result queries.  Errors signal allocation failure, numerical errors
    /// of the eigen solvers, or a backend that cannot solve at all.
    pub fn solve(
        &mut self,
        start: Option<&WarmStart<T>>,
        start_setting: SolverSetting,
        enforce_slater_check: bool,
        timelimit: f64,
    ) -> Result<(), SdpiError> {
        self.invalidate();

        if timelimit <= 0.0 {
            tracing::debug!(component = "sdpi", sdpid = self.info.sdpid, "no time left, problem not solved");
            return Ok(());
        }

        self.clock.set_type(self.settings.clock_type)?;
        self.clock.start()?;

        //timers are taken out of self to avoid borrow
        //conflicts with the solve internals
        let mut timers = std::mem::take(&mut self.timers);
        timers.reset();
        let result;
        timeit! {timers => "solve"; {
            result = self.solve_inner(start, start_setting, enforce_slater_check, timelimit, &mut timers);
        }}
        self.timers = timers;
        self.clock.stop()?;
        result?;

        tracing::debug!(
            component = "sdpi",
            sdpid = self.info.sdpid,
            outcome = self.state.describe(),
            time = self.clock.elapsed_seconds(),
            "solve finished"
        );
        self.print_summary()?;
        self.info.sdpid += 1;
        Ok(())
    }

    fn solve_inner(
        &mut self,
        start: Option<&WarmStart<T>>,
        start_setting: SolverSetting,
        enforce_slater_check: bool,
        timelimit: f64,
        timers: &mut Timers,
    ) -> Result<(), SdpiError> {
        let sdpid = self.info.sdpid;

        if let Some(v) = self.contradictory_bound() {
            tracing::debug!(component = "sdpi", sdpid, var = v, "variable bounds are contradictory");
            self.info.statistics.ninfeasible += 1;
            self.backend.increase_counter();
            self.state = SolveState::Infeasible {
                allfixed: false,
                penalty: false,
            };
            return Ok(());
        }

        let preprocessed;
        timeit! {timers => "preprocess"; {
            preprocessed = self.preprocess();
        }}

        let fixedcontr = match preprocessed? {
            Preprocessed::Infeasible => {
                tracing::debug!(component = "sdpi", sdpid, "preprocessing detected infeasibility");
                self.info.statistics.ninfeasible += 1;
                self.backend.increase_counter();
                self.state = SolveState::Infeasible {
                    allfixed: false,
                    penalty: false,
                };
                return Ok(());
            }
            Preprocessed::AllFixed { feasible } => {
                tracing::debug!(component = "sdpi", sdpid, feasible, "all variables fixed");
                self.info.statistics.nallfixed += 1;
                self.backend.increase_counter();
                self.state = if feasible {
                    SolveState::AllFixed
                } else {
                    SolveState::Infeasible {
                        allfixed: true,
                        penalty: false,
                    }
                };
                return Ok(());
            }
            Preprocessed::Ready { fixedcontr } => fixedcontr,
        };

        let onevar;
        timeit! {timers => "onevar"; {
            onevar = self.solve_onevar(fixedcontr);
        }}
        if let Some(result) = onevar? {
            tracing::debug!(
                component = "sdpi",
                sdpid,
                var = result.idx,
                status = %result.status,
                objval = %result.objval,
                "solved problem with one free variable"
            );
            self.info.statistics.nonevarsdp += 1;
            self.backend.increase_counter();
            self.state = SolveState::OneVar(result);
            return Ok(());
        }

        let found;
        timeit! {timers => "preprocess"; {
            found = self.work.find_empty_row_cols(&self.problem);
        }}
        found?;

        if self.settings.slatercheck != SlaterCheck::Off {
            let checked;
            timeit! {timers => "slater"; {
                checked = self.check_slater(false, timelimit);
            }}
            checked?;
        }

        let solved;
        timeit! {timers => "backend"; {
            solved = self.backend_solve(start, start_setting, timelimit);
        }}
        solved?;
        self.state = SolveState::Solved { penalty: false };

        if self.backend.is_acceptable() || self.timelimit_exceeded(timelimit) {
            return Ok(());
        }

        let recovered;
        timeit! {timers => "penalty"; {
            recovered = self.penalty_recovery(start, start_setting, enforce_slater_check, timelimit);
        }}
        recovered
    }

    // index of a variable with ub < lb - feastol
    fn contradictory_bound(&self) -> Option<usize> {
        let (lb, ub) = (self.problem.lb(), self.problem.ub());
        let feastol = self.settings.feastol;
        (0..lb.len()).find(|&v| ub[v] < lb[v] - feastol)
    }

    fn preprocess(&mut self) -> Result<Preprocessed<T>, SdpiError> {
        self.work.reset(&self.problem, &self.settings)?;
        let pass = self.work.propagate_lp(&self.problem, &self.settings)?;
        if pass.infeasible {
            return Ok(Preprocessed::Infeasible);
        }

        let fixedcontr = self.work.fixed_objective(&self.problem);
        if self.work.nactive() == 0 {
            let feasible = self.work.check_fixed_feasibility(&self.problem, &self.settings)?;
            return Ok(Preprocessed::AllFixed { feasible });
        }

        self.work.fold_constants(&self.problem)?;
        Ok(Preprocessed::Ready { fixedcontr })
    }

    /// The fast path for a single free variable and at most one block.
    /// `None` if it does not apply or the one variable solver gives up.
    fn solve_onevar(&mut self, fixedcontr: T) -> Result<Option<OneVarResult<T>>, SdpiError> {
        if self.work.nactive() != 1 || self.problem.nblocks() > 1 {
            return Ok(None);
        }
        let idx = match self.work.first_active() {
            Some(idx) => idx,
            None => return Ok(None),
        };
        let obj = self.problem.obj()[idx];
        let (lb, ub) = (self.work.lb()[idx], self.work.ub()[idx]);

        if self.problem.nblocks() == 0 {
            // a bounded LP in one variable
            if is_infinity(lb) || is_infinity(ub) {
                return Ok(None);
            }
            let optval = if obj >= T::zero() { lb } else { ub };
            return Ok(Some(OneVarResult {
                status: OneVarStatus::Optimal,
                idx,
                objval: obj * optval + fixedcontr,
                optval,
                certvec: None,
                certval: T::zero(),
            }));
        }

        let empty = Triplets::new();
        let matrix = match self.problem.block_vars(0).iter().position(|&v| v == idx) {
            Some(k) => self.problem.block_var_entries(0, k),
            None => empty.as_ref(),
        };
        let problem = OneVarProblem {
            obj,
            lb,
            ub,
            blocksize: self.problem.block_size(0),
            constant: self.work.constants[0].as_ref(),
            matrix,
            feastol: self.settings.feastol,
            epsilon: self.settings.epsilon,
        };

        let solution = match self.onevar.solve(&problem)? {
            Some(solution) => solution,
            None => return Ok(None),
        };
        let (status, objval) = if solution.is_infeasible() {
            (OneVarStatus::Infeasible, infinity())
        } else {
            (OneVarStatus::Optimal, solution.objval + fixedcontr)
        };
        Ok(Some(OneVarResult {
            status,
            idx,
            objval,
            optval: solution.optval,
            certvec: Some(solution.certvec),
            certval: solution.certval,
        }))
    }

    fn backend_solve(
        &mut self,
        start: Option<&WarmStart<T>>,
        start_setting: SolverSetting,
        timelimit: f64,
    ) -> Result<(), SdpiError> {
        let remaining = self.remaining_time(timelimit);
        tracing::debug!(component = "sdpi", sdpid = self.info.sdpid, solver = self.backend.name(), "calling SDP solver");

        let problem = PreparedProblem::new(&self.problem, &self.work);
        self.backend
            .load_and_solve(&problem, start, start_setting, remaining)?;
        self.accumulate_backend_stats();
        Ok(())
    }

    pub(crate) fn penalty_solve(
        &mut self,
        request: PenaltyRequest<T>,
        start: Option<&WarmStart<T>>,
        start_setting: SolverSetting,
        timelimit: f64,
    ) -> Result<PenaltyOutcome, SdpiError> {
        let remaining = self.remaining_time(timelimit);
        let problem = PreparedProblem::new(&self.problem, &self.work);
        let outcome = self.backend.load_and_solve_with_penalty(
            &problem,
            request,
            start,
            start_setting,
            remaining,
        )?;
        Ok(outcome)
    }

    /// The backend did not solve the problem.  Decide feasibility with the
    /// pure penalty formulation, then escalate the penalty parameter and
    /// the gap tolerance until a solution of the original problem is found.
    fn penalty_recovery(
        &mut self,
        start: Option<&WarmStart<T>>,
        start_setting: SolverSetting,
        enforce_slater_check: bool,
        timelimit: f64,
    ) -> Result<(), SdpiError> {
        let sdpid = self.info.sdpid;
        let s = &self.settings;
        let threshold = s.peninfeasadjust * T::max(s.feastol, s.gaptol);

        tracing::info!(component = "sdpi", sdpid, "SDP solver failed, checking feasibility with the penalty formulation");
        let feasibility = PenaltyRequest {
            penalty_param: T::one(),
            with_obj: false,
            rbound: false,
        };
        self.penalty_solve(feasibility, start, start_setting, timelimit)?;
        self.accumulate_backend_stats();

        let backend = &self.backend;
        let objval = if backend.was_solved() {
            backend.objval().unwrap_or_else(|_| -infinity::<T>())
        } else {
            -infinity::<T>()
        };
        if (backend.is_optimal() && objval > threshold)
            || (backend.was_solved() && backend.is_dual_infeasible())
        {
            tracing::info!(component = "sdpi", sdpid, objval = %objval, "penalty formulation proves infeasibility");
            self.state = SolveState::Infeasible {
                allfixed: false,
                penalty: true,
            };
            return Ok(());
        }

        let s = &self.settings;
        let mut schedule = PenaltySchedule::new(
            s.penaltyparam,
            s.maxpenaltyparam,
            s.gaptol,
            s.npenaltyincr,
            s.epsilon,
        );
        let mut obs = PenaltyObservation::default();
        let mut gapchanged = false;

        while !(obs.acceptable && obs.feasorig)
            && schedule.can_continue()
            && !self.timelimit_exceeded(timelimit)
        {
            tracing::debug!(
                component = "sdpi",
                sdpid,
                penaltyparam = %schedule.penaltyparam,
                gaptol = %schedule.gaptol,
                "solving penalty formulation"
            );
            let request = PenaltyRequest {
                penalty_param: schedule.penaltyparam,
                with_obj: true,
                rbound: true,
            };
            let outcome = self.penalty_solve(request, start, start_setting, timelimit)?;
            self.accumulate_backend_stats();

            obs = PenaltyObservation {
                acceptable: self.backend.is_acceptable(),
                feasorig: outcome.feasorig,
                penaltybound: outcome.penaltybound,
            };
            if obs.acceptable {
                if let Ok(objval) = self.backend.objval() {
                    if objval > self.bestbound + self.settings.gaptol {
                        self.bestbound = objval;
                    }
                }
            }

            match schedule.step(obs) {
                PenaltyStep::Done => {}
                PenaltyStep::IncreasePenalty => {
                    tracing::debug!(component = "sdpi", sdpid, penaltyparam = %schedule.penaltyparam, "increasing penalty parameter");
                }
                PenaltyStep::TightenGap => {
                    tracing::debug!(component = "sdpi", sdpid, gaptol = %schedule.gaptol, "decreasing gap tolerance");
                    self.forward_real(SdpParam::GapTol, schedule.gaptol)?;
                    gapchanged = true;
                }
            }
        }

        if gapchanged {
            self.forward_real(SdpParam::GapTol, self.settings.gaptol)?;
        }

        if obs.acceptable && obs.feasorig {
            self.state = SolveState::Solved { penalty: true };
            return Ok(());
        }

        tracing::warn!(
            component = "sdpi",
            sdpid,
            penaltyparam = %schedule.penaltyparam,
            gaptol = %schedule.gaptol,
            bestbound = %self.bestbound,
            "penalty formulation could not be solved"
        );
        self.state = SolveState::Failed;
        if enforce_slater_check {
            self.check_slater(true, timelimit)?;
        }
        Ok(())
    }

    fn accumulate_backend_stats(&mut self) {
        self.info.time += self.backend.time();
        self.info.iterations += self.backend.iterations();
        self.info.sdp_calls += self.backend.sdp_calls();
    }

    pub(crate) fn remaining_time(&self, timelimit: f64) -> f64 {
        timelimit - self.clock.elapsed_seconds()
    }

    fn timelimit_exceeded(&self, timelimit: f64) -> bool {
        let exceeded = self.remaining_time(timelimit) <= 0.0;
        if exceeded {
            tracing::debug!(component = "sdpi", sdpid = self.info.sdpid, "time limit reached");
        }
        exceeded
    }

    // ---------------------------------
    // output
    // ---------------------------------

    /// Seconds spent in the last solve call, including preprocessing.
    pub fn solve_time(&self) -> f64 {
        self.clock.elapsed_seconds()
    }

    /// Phase timings of the last solve call.
    pub fn timers(&self) -> &Timers {
        &self.timers
    }

    fn print_summary(&mut self) -> Result<(), SdpiError> {
        if !self.settings.verbose {
            return Ok(());
        }
        let objval = if self.state.is_solved() {
            self.objval().ok()
        } else {
            None
        };
        let elapsed = self.clock.elapsed_seconds();
        self.info
            .print_summary(&self.state, objval, elapsed, &self.timers)?;
        Ok(())
    }

    pub(crate) fn print_target(&mut self) -> &mut dyn Write {
        &mut self.info.stream
    }
}

fn param_error(param: SdpParam) -> impl Fn(BackendError) -> SdpiError {
    move |e| match e {
        BackendError::ParameterUnknown => SdpiError::ParameterUnknown(param),
        e => e.into(),
    }
}

impl<T> ConfigurablePrintTarget for Sdpi<T>
where
    T: FloatT,
{
    fn print_target_mut(&mut self) -> &mut PrintTarget {
        &mut self.info.stream
    }
}
