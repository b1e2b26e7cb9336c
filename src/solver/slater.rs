use super::backend::*;
use super::sdpi::Sdpi;
use super::*;
use crate::algebra::*;

impl<T> Sdpi<T>
where
    T: FloatT,
{
    /// Diagnose the Slater condition of the preprocessed problem for both
    /// the dual and the primal side.
    ///
    /// With `rootnodefailed` the verdicts explain why a solve could not be
    /// completed and are always printed.  Otherwise they are printed for
    /// [`SlaterCheck::Print`] unless the condition holds.
    pub(crate) fn check_slater(&mut self, rootnodefailed: bool, timelimit: f64) -> Result<(), SdpiError> {
        let (status, msg) = self.check_dual_slater(timelimit);
        self.dualslater = status;
        self.report_slater(rootnodefailed, status, &msg)?;

        let (status, msg) = self.check_primal_slater(timelimit);
        self.primalslater = status;
        self.report_slater(rootnodefailed, status, &msg)?;
        Ok(())
    }

    // min r  s.t.  Σ A_i y_i - A_0 + r I ⪰ 0 has a negative optimum iff
    // the dual problem has a strictly feasible point
    fn check_dual_slater(&mut self, timelimit: f64) -> (SlaterStatus, String) {
        let request = PenaltyRequest {
            penalty_param: T::one(),
            with_obj: false,
            rbound: false,
        };
        if let Err(e) = self.penalty_solve(request, None, SolverSetting::Unsolved, timelimit) {
            tracing::warn!(component = "slater", sdpid = self.info.sdpid, error = %e, "dual Slater check failed");
            return (SlaterStatus::NoInfo, "dual Slater condition could not be checked".into());
        }

        let backend = &self.backend;
        let feastol = self.settings.feastol;
        if backend.is_optimal() {
            match backend.objval() {
                Ok(objval) if objval < -feastol => (
                    SlaterStatus::Holds,
                    format!("dual Slater condition holds (smallest eigenvalue {:e})", -objval),
                ),
                Ok(objval) if objval < feastol => (
                    SlaterStatus::Not,
                    format!(
                        "dual Slater condition does not hold (smallest eigenvalue {:e}), expecting numerical trouble",
                        -objval
                    ),
                ),
                Ok(objval) => (
                    SlaterStatus::Infeasible,
                    format!(
                        "dual Slater condition does not hold (smallest eigenvalue {:e}; problem infeasible)",
                        -objval
                    ),
                ),
                Err(_) => (SlaterStatus::NoInfo, "dual Slater condition could not be checked".into()),
            }
        } else if backend.is_dual_unbounded() {
            (
                SlaterStatus::Holds,
                "dual Slater condition holds (problem unbounded)".into(),
            )
        } else if backend.is_dual_infeasible() {
            (
                SlaterStatus::Not,
                "dual Slater condition does not hold (problem infeasible)".into(),
            )
        } else {
            (SlaterStatus::NoInfo, "dual Slater condition could not be checked".into())
        }
    }

    // The primal problem has a strictly feasible point iff there is no
    // nonzero y with Σ A_i y_i ⪰ 0 on the recession cone of the dual.  We
    // look for one with trace normalised to one.
    fn check_primal_slater(&mut self, timelimit: f64) -> (SlaterStatus, String) {
        let nvars = self.problem.nvars();
        let (lb, ub) = (self.work.lb(), self.work.ub());
        if (0..nvars).all(|v| !is_infinity(lb[v]) && !is_infinity(ub[v])) {
            return (
                SlaterStatus::Holds,
                "primal Slater condition holds (all variables bounded)".into(),
            );
        }

        let epsilon = self.settings.epsilon;
        let zero_finite = |x: T| if is_infinity(x) { x } else { T::zero() };
        let slb: Vec<T> = lb.iter().map(|&x| zero_finite(x)).collect();
        let sub: Vec<T> = ub.iter().map(|&x| zero_finite(x)).collect();

        // kept rows with homogenised sides
        let rows = self.work.lp.as_ref();
        let mut lhs: Vec<T> = rows.lhs.iter().map(|&x| zero_finite(x)).collect();
        let mut rhs: Vec<T> = rows.rhs.iter().map(|&x| zero_finite(x)).collect();
        let mut beg = rows.beg.to_vec();
        let mut ind = rows.ind.to_vec();
        let mut val = rows.val.to_vec();

        // Σ_v trace(A_v) y_v >= 1
        let mut trace = vec![T::zero(); nvars];
        for b in 0..self.problem.nblocks() {
            for (k, &v) in self.problem.block_vars(b).iter().enumerate() {
                for (r, c, x) in self.problem.block_var_entries(b, k).iter() {
                    if r == c {
                        trace[v] += x;
                    }
                }
            }
        }
        let nbefore = ind.len();
        for (v, &coef) in trace.iter().enumerate() {
            if !self.work.is_fixed(v) && coef.abs() > epsilon {
                ind.push(v);
                val.push(coef);
            }
        }
        if ind.len() > nbefore {
            if beg.is_empty() {
                beg.push(0);
            }
            beg.push(ind.len());
            lhs.push(T::one());
            rhs.push(infinity());
        }

        let empty = Triplets::<T>::new();
        let mut problem = PreparedProblem::new(&self.problem, &self.work);
        problem.lb = &slb;
        problem.ub = &sub;
        problem.lp = LpRowsRef {
            lhs: &lhs,
            rhs: &rhs,
            beg: &beg,
            ind: &ind,
            val: &val,
        };
        for block in problem.blocks.iter_mut() {
            block.constant = empty.as_ref();
        }

        let remaining = timelimit - self.solve_time();
        if let Err(e) = self
            .backend
            .load_and_solve(&problem, None, SolverSetting::Unsolved, remaining)
        {
            tracing::warn!(component = "slater", sdpid = self.info.sdpid, error = %e, "primal Slater check failed");
            return (SlaterStatus::NoInfo, "primal Slater condition could not be checked".into());
        }

        let backend = &self.backend;
        if backend.is_optimal() {
            match backend.objval() {
                Ok(objval) if objval > -self.settings.feastol => (
                    SlaterStatus::Not,
                    "primal Slater condition does not hold".into(),
                ),
                Ok(_) => (SlaterStatus::Holds, "primal Slater condition holds".into()),
                Err(_) => (SlaterStatus::NoInfo, "primal Slater condition could not be checked".into()),
            }
        } else if backend.is_dual_unbounded() {
            (
                SlaterStatus::Not,
                "primal Slater condition does not hold (problem unbounded)".into(),
            )
        } else if backend.is_primal_unbounded() {
            (
                SlaterStatus::Holds,
                "primal Slater condition holds (auxiliary problem infeasible)".into(),
            )
        } else {
            (SlaterStatus::NoInfo, "primal Slater condition could not be checked".into())
        }
    }

    fn report_slater(&mut self, rootnodefailed: bool, status: SlaterStatus, msg: &str) -> Result<(), SdpiError> {
        let sdpid = self.info.sdpid;
        tracing::debug!(component = "slater", sdpid, %status, "{}", msg);
        if rootnodefailed {
            writeln!(self.print_target(), "Aborting: Failed to solve root node relaxation; {}.", msg)?;
        } else if self.settings.slatercheck == SlaterCheck::Print && status != SlaterStatus::Holds {
            writeln!(self.print_target(), "SDP {}: {}", sdpid, msg)?;
        }
        Ok(())
    }

    /// The verdicts of the last Slater check as `(primal, dual)`.
    pub fn slater(&self) -> (SlaterStatus, SlaterStatus) {
        (self.primalslater, self.dualslater)
    }

    /// Classify the last solve by the path that solved it and the Slater
    /// verdicts.
    pub fn slater_settings(&self) -> SlaterSetting {
        use SolveState::*;
        let (primal, dual) = (self.primalslater, self.dualslater);

        let family = match &self.state {
            Unsolved | Failed => {
                let family = if self.bestbound > -infinity::<T>() {
                    SlaterFamily::Bounded
                } else {
                    SlaterFamily::Unsolved
                };
                return slater_outcome(primal, dual, true)
                    .map_or(SlaterSetting::NoInfo, |o| SlaterSetting::from_family(family, o));
            }
            Infeasible { penalty: false, .. } | AllFixed | OneVar(_) => return SlaterSetting::NoInfo,
            Infeasible { penalty: true, .. } | Solved { penalty: true } => SlaterFamily::Penalty,
            Solved { penalty: false } => match self.backend.settings_used() {
                SolverSetting::Fast => SlaterFamily::Stable,
                SolverSetting::Medium | SolverSetting::Stable => SlaterFamily::Unstable,
                _ => return SlaterSetting::NoInfo,
            },
        };
        slater_outcome(primal, dual, false)
            .map_or(SlaterSetting::NoInfo, |o| SlaterSetting::from_family(family, o))
    }

    /// The numerical setting that solved the last problem.
    pub fn settings_used(&self) -> SolverSetting {
        match &self.state {
            SolveState::Solved { penalty: false } => self.backend.settings_used(),
            s if s.penalty() && s.is_solved() => SolverSetting::Penalty,
            _ => SolverSetting::Unsolved,
        }
    }
}

/// Combine the two Slater verdicts.  An infeasible dual side decides the
/// outcome on its own for unsolved problems, but only together with a
/// primal verdict for solved ones.
fn slater_outcome(primal: SlaterStatus, dual: SlaterStatus, unsolved: bool) -> Option<SlaterOutcome> {
    use SlaterOutcome as O;
    use SlaterStatus::*;
    if unsolved && dual == Infeasible {
        return Some(O::Infeasible);
    }
    match (primal, dual) {
        (Infeasible, _) => None,
        (NoInfo, Not) | (Holds, Not) => Some(O::NoSlater),
        (Not, Infeasible) | (NoInfo, Infeasible) | (Holds, Infeasible) => Some(O::Infeasible),
        (Not, _) => Some(O::NoSlater),
        (Holds, Holds) => Some(O::WSlater),
        _ => None,
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use SlaterStatus::*;

    #[test]
    fn test_slater_outcome_table() {
        use SlaterOutcome as O;
        assert_eq!(slater_outcome(NoInfo, Not, false), Some(O::NoSlater));
        assert_eq!(slater_outcome(NoInfo, Infeasible, false), Some(O::Infeasible));
        assert_eq!(slater_outcome(NoInfo, Holds, false), None);
        assert_eq!(slater_outcome(Not, Holds, false), Some(O::NoSlater));
        assert_eq!(slater_outcome(Not, Infeasible, false), Some(O::Infeasible));
        assert_eq!(slater_outcome(Holds, Holds, false), Some(O::WSlater));
        assert_eq!(slater_outcome(Holds, NoInfo, false), None);
        assert_eq!(slater_outcome(Infeasible, Infeasible, false), None);

        // unsolved problems
        assert_eq!(slater_outcome(Infeasible, Infeasible, true), Some(O::Infeasible));
        assert_eq!(slater_outcome(Holds, Holds, true), Some(O::WSlater));
        assert_eq!(slater_outcome(NoInfo, NoInfo, true), None);
    }

    #[test]
    fn test_slater_settings_unsolved() {
        let mut sdpi = Sdpi::<f64>::default();
        assert_eq!(sdpi.slater_settings(), SlaterSetting::NoInfo);

        sdpi.primalslater = Holds;
        sdpi.dualslater = Holds;
        assert_eq!(sdpi.slater_settings(), SlaterSetting::UnsolvedWSlater);

        sdpi.bestbound = -3.0;
        sdpi.state = SolveState::Failed;
        assert_eq!(sdpi.slater_settings(), SlaterSetting::BoundedWSlater);

        sdpi.state = SolveState::Solved { penalty: true };
        sdpi.dualslater = Infeasible;
        assert_eq!(sdpi.slater_settings(), SlaterSetting::PenaltyInfeasible);
        assert_eq!(sdpi.settings_used(), SolverSetting::Penalty);

        sdpi.state = SolveState::AllFixed;
        assert_eq!(sdpi.slater_settings(), SlaterSetting::NoInfo);
        assert_eq!(sdpi.settings_used(), SolverSetting::Unsolved);
    }
}
