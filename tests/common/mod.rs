#![allow(dead_code)]

// A scripted SDP solver.  Each load_and_solve* call consumes the next
// scripted response, or repeats the fallback once the script is empty,
// and records what it was asked to solve.

use sdpi::{algebra::*, solver::*};
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone, Default)]
pub struct Response {
    pub optimal: bool,
    pub acceptable: bool,
    pub objval: f64,
    pub primal_infeasible: bool,
    pub primal_unbounded: bool,
    pub dual_infeasible: bool,
    pub dual_unbounded: bool,
    pub feasorig: bool,
    pub penaltybound: bool,
    pub y: Vec<f64>,
    pub bound_vars: (Vec<f64>, Vec<f64>),
    pub lp_sides: (Vec<f64>, Vec<f64>),
    pub setting: SolverSetting,
}

impl Response {
    pub fn optimal(objval: f64) -> Self {
        Self {
            optimal: true,
            acceptable: true,
            objval,
            feasorig: true,
            setting: SolverSetting::Fast,
            ..Default::default()
        }
    }

    pub fn failed() -> Self {
        Self::default()
    }

    pub fn dual_infeasible() -> Self {
        Self {
            acceptable: true,
            dual_infeasible: true,
            primal_unbounded: true,
            ..Default::default()
        }
    }
}

/// What the backend was asked to solve.
#[derive(Debug, Clone)]
pub struct Call {
    pub penalty: Option<PenaltyRequest<f64>>,
    pub lb: Vec<f64>,
    pub ub: Vec<f64>,
    pub lhs: Vec<f64>,
    pub rhs: Vec<f64>,
    pub rows: Vec<Vec<(usize, f64)>>,
    pub constants: Vec<Vec<(usize, usize, f64)>>,
    pub indchanges: Vec<Vec<isize>>,
    pub nremovedblocks: usize,
    pub timelimit: f64,
    /// dual values of the warm start, if one was given
    pub start: Option<Vec<f64>>,
    pub start_setting: SolverSetting,
}

#[derive(Debug, Default)]
pub struct Log {
    pub calls: Vec<Call>,
    pub params: Vec<(SdpParam, f64)>,
    pub counter: u64,
}

pub struct MockBackend {
    script: VecDeque<Response>,
    fallback: Response,
    current: Option<Response>,
    real: HashMap<SdpParam, f64>,
    log: Arc<Mutex<Log>>,
}

impl MockBackend {
    pub fn new(script: Vec<Response>) -> (Box<Self>, Arc<Mutex<Log>>) {
        Self::with_fallback(script, Response::failed())
    }

    pub fn with_fallback(script: Vec<Response>, fallback: Response) -> (Box<Self>, Arc<Mutex<Log>>) {
        let log = Arc::new(Mutex::new(Log::default()));
        let backend = Self {
            script: script.into(),
            fallback,
            current: None,
            real: HashMap::new(),
            log: log.clone(),
        };
        (Box::new(backend), log)
    }

    fn record(
        &mut self,
        problem: &PreparedProblem<'_, f64>,
        penalty: Option<PenaltyRequest<f64>>,
        start: Option<&WarmStart<f64>>,
        start_setting: SolverSetting,
        timelimit: f64,
    ) {
        let rows = (0..problem.lp.nrows())
            .map(|i| {
                let (ind, val) = problem.lp.row(i);
                ind.iter().copied().zip(val.iter().copied()).collect()
            })
            .collect();
        let call = Call {
            penalty,
            lb: problem.lb.to_vec(),
            ub: problem.ub.to_vec(),
            lhs: problem.lp.lhs.to_vec(),
            rhs: problem.lp.rhs.to_vec(),
            rows,
            constants: problem.blocks.iter().map(|b| b.constant.iter().collect()).collect(),
            indchanges: problem.blocks.iter().map(|b| b.indchanges.to_vec()).collect(),
            nremovedblocks: problem.nremovedblocks,
            timelimit,
            start: start.map(|ws| ws.y.clone()),
            start_setting,
        };
        self.log.lock().unwrap().calls.push(call);
        self.current = Some(self.script.pop_front().unwrap_or_else(|| self.fallback.clone()));
    }

    fn response(&self) -> Result<&Response, BackendError> {
        self.current
            .as_ref()
            .ok_or_else(|| BackendError::Failed("nothing solved".to_string()))
    }

    fn flag(&self, f: impl Fn(&Response) -> bool) -> bool {
        self.current.as_ref().map_or(false, f)
    }
}

impl SdpSolverBackend<f64> for MockBackend {
    fn name(&self) -> &'static str {
        "mock"
    }

    fn description(&self) -> &'static str {
        "scripted test solver"
    }

    fn default_npenalty_increases(&self) -> u32 {
        4
    }

    fn increase_counter(&mut self) {
        self.log.lock().unwrap().counter += 1;
    }

    fn reset_counter(&mut self) {
        self.log.lock().unwrap().counter = 0;
    }

    fn load_and_solve(
        &mut self,
        problem: &PreparedProblem<'_, f64>,
        start: Option<&WarmStart<f64>>,
        start_setting: SolverSetting,
        timelimit: f64,
    ) -> Result<(), BackendError> {
        self.record(problem, None, start, start_setting, timelimit);
        Ok(())
    }

    fn load_and_solve_with_penalty(
        &mut self,
        problem: &PreparedProblem<'_, f64>,
        request: PenaltyRequest<f64>,
        start: Option<&WarmStart<f64>>,
        start_setting: SolverSetting,
        timelimit: f64,
    ) -> Result<PenaltyOutcome, BackendError> {
        self.record(problem, Some(request), start, start_setting, timelimit);
        let r = self.response()?;
        Ok(PenaltyOutcome {
            feasorig: r.feasorig,
            penaltybound: r.penaltybound,
        })
    }

    fn was_solved(&self) -> bool {
        self.flag(|r| r.acceptable)
    }
    fn feasibility_known(&self) -> bool {
        self.flag(|r| r.acceptable)
    }
    fn sol_feasibility(&self) -> Result<(bool, bool), BackendError> {
        let r = self.response()?;
        Ok((!r.primal_infeasible, !r.dual_infeasible))
    }
    fn is_primal_unbounded(&self) -> bool {
        self.flag(|r| r.primal_unbounded)
    }
    fn is_primal_infeasible(&self) -> bool {
        self.flag(|r| r.primal_infeasible)
    }
    fn is_primal_feasible(&self) -> bool {
        self.flag(|r| r.acceptable && !r.primal_infeasible)
    }
    fn is_dual_unbounded(&self) -> bool {
        self.flag(|r| r.dual_unbounded)
    }
    fn is_dual_infeasible(&self) -> bool {
        self.flag(|r| r.dual_infeasible)
    }
    fn is_dual_feasible(&self) -> bool {
        self.flag(|r| r.acceptable && !r.dual_infeasible)
    }
    fn is_converged(&self) -> bool {
        self.flag(|r| r.optimal)
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
        if self.flag(|r| r.optimal) {
            1
        } else {
            2
        }
    }
    fn is_optimal(&self) -> bool {
        self.flag(|r| r.optimal)
    }
    fn is_acceptable(&self) -> bool {
        self.flag(|r| r.acceptable)
    }

    fn objval(&self) -> Result<f64, BackendError> {
        Ok(self.response()?.objval)
    }
    fn dual_sol(&self) -> Result<(f64, Vec<f64>), BackendError> {
        let r = self.response()?;
        Ok((r.objval, r.y.clone()))
    }
    fn preoptimal_sol(&self) -> Result<Option<WarmStart<f64>>, BackendError> {
        let r = self.response()?;
        Ok(Some(WarmStart {
            y: r.y.clone(),
            ..Default::default()
        }))
    }
    fn primal_bound_vars(&self) -> Result<(Vec<f64>, Vec<f64>), BackendError> {
        Ok(self.response()?.bound_vars.clone())
    }
    fn primal_lp_sides(&self) -> Result<(Vec<f64>, Vec<f64>), BackendError> {
        Ok(self.response()?.lp_sides.clone())
    }
    fn primal_nonzeros(&self) -> Result<Vec<usize>, BackendError> {
        Ok(vec![0])
    }
    fn primal_matrix(&self) -> Result<Vec<Triplets<f64>>, BackendError> {
        Ok(vec![Triplets::new()])
    }
    fn primal_solution_matrix(&self) -> Result<Vec<Matrix<f64>>, BackendError> {
        Ok(vec![Matrix::zeros(1)])
    }
    fn max_primal_entry(&self) -> f64 {
        1.0
    }

    fn time(&self) -> f64 {
        0.5
    }
    fn iterations(&self) -> u32 {
        7
    }
    fn sdp_calls(&self) -> u32 {
        1
    }
    fn settings_used(&self) -> SolverSetting {
        self.current.as_ref().map_or(SolverSetting::Unsolved, |r| r.setting)
    }

    fn get_real_par(&self, param: SdpParam) -> Result<f64, BackendError> {
        self.real.get(&param).copied().ok_or(BackendError::ParameterUnknown)
    }
    fn set_real_par(&mut self, param: SdpParam, value: f64) -> Result<(), BackendError> {
        match param {
            SdpParam::Epsilon
            | SdpParam::GapTol
            | SdpParam::FeasTol
            | SdpParam::PenaltyParam
            | SdpParam::LambdaStar
            | SdpParam::ObjLimit => {
                self.real.insert(param, value);
                self.log.lock().unwrap().params.push((param, value));
                Ok(())
            }
            _ => Err(BackendError::ParameterUnknown),
        }
    }
    fn get_int_par(&self, param: SdpParam) -> Result<i32, BackendError> {
        match param {
            SdpParam::NThreads => Ok(1),
            _ => Err(BackendError::ParameterUnknown),
        }
    }
    fn set_int_par(&mut self, param: SdpParam, _value: i32) -> Result<(), BackendError> {
        match param {
            SdpParam::NThreads => Ok(()),
            _ => Err(BackendError::ParameterUnknown),
        }
    }

    fn compute_lambdastar(&mut self, maxguess: f64) -> Result<(), BackendError> {
        self.real.insert(SdpParam::LambdaStar, maxguess);
        Ok(())
    }
    fn compute_penalty_param(&self, maxcoeff: f64) -> Result<f64, BackendError> {
        Ok(10.0 * maxcoeff)
    }
    fn compute_max_penalty_param(&self, penaltyparam: f64) -> Result<f64, BackendError> {
        Ok(1000.0 * penaltyparam)
    }
}

/// A diagonal block entry `(i, i, v)` for each `(i, v)`.
pub fn diag(entries: &[(usize, f64)]) -> Triplets<f64> {
    let mut t = Triplets::new();
    for &(i, v) in entries {
        t.push(i, i, v);
    }
    t
}

/// A problem with a single block of dimension `size` and no LP rows.
pub fn block_problem(
    obj: Vec<f64>,
    lb: Vec<f64>,
    ub: Vec<f64>,
    vars: Vec<(usize, Triplets<f64>)>,
    constant: Triplets<f64>,
    size: usize,
) -> ProblemData<f64> {
    ProblemData {
        obj,
        lb,
        ub,
        isintegral: None,
        blocks: vec![SdpBlock {
            size,
            vars: vars
                .into_iter()
                .map(|(var, entries)| BlockVar { var, entries })
                .collect(),
            constant,
        }],
        rows: vec![],
    }
}

pub fn mock_sdpi(script: Vec<Response>) -> (Sdpi<f64>, Arc<Mutex<Log>>) {
    let (backend, log) = MockBackend::new(script);
    let sdpi = Sdpi::new(SdpiSettings::default(), backend).unwrap();
    (sdpi, log)
}
