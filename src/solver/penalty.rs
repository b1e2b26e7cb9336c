use crate::algebra::*;
use crate::solver::MIN_GAPTOL;

/// What one solve of the penalty formulation reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PenaltyObservation {
    pub acceptable: bool,
    pub feasorig: bool,
    pub penaltybound: bool,
}

/// Next move of a [`PenaltySchedule`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PenaltyStep {
    /// solution is acceptable and feasible for the original problem
    Done,
    IncreasePenalty,
    TightenGap,
}

/// Escalation of the penalty parameter and the gap tolerance, independent
/// of any solver.
///
/// Both quantities move geometrically, so that `npenaltyincr` steps take
/// the penalty parameter from its start value to `maxpenaltyparam` and the
/// gap tolerance from its start value to [`MIN_GAPTOL`].  Every step moves
/// one of them by a fixed factor towards its limit, hence the schedule is
/// exhausted after at most `2 * npenaltyincr + 4` steps.
#[derive(Debug, Clone)]
pub struct PenaltySchedule<T> {
    pub penaltyparam: T,
    pub gaptol: T,
    maxpenaltyparam: T,
    penfact: T,
    gapfact: T,
    epsilon: T,
}

impl<T> PenaltySchedule<T>
where
    T: FloatT,
{
    pub fn new(penaltyparam: T, maxpenaltyparam: T, gaptol: T, npenaltyincr: u32, epsilon: T) -> Self {
        let two = (2.0).as_T();
        let mingaptol: T = MIN_GAPTOL.as_T();

        let (mut penfact, mut gapfact) = if npenaltyincr > 0 {
            let root = T::recip(npenaltyincr.as_T());
            (
                T::powf(maxpenaltyparam / penaltyparam, root),
                T::powf(mingaptol / gaptol, root),
            )
        } else {
            (
                two * maxpenaltyparam / penaltyparam,
                AsFloatT::<T>::as_T(&0.5) * mingaptol / gaptol,
            )
        };

        // start values at or beyond their limits would never move
        if !(penfact > T::one()) {
            penfact = two;
        }
        if !(gapfact < T::one()) {
            gapfact = (0.5).as_T();
        }

        Self {
            penaltyparam,
            gaptol,
            maxpenaltyparam,
            penfact,
            gapfact,
            epsilon,
        }
    }

    /// Neither the penalty parameter nor the gap tolerance passed its limit.
    pub fn can_continue(&self) -> bool {
        self.penaltyparam < self.maxpenaltyparam + self.epsilon
            && self.gaptol > (0.99 * MIN_GAPTOL).as_T()
    }

    /// Decide on the next move after a penalty solve and apply it.
    ///
    /// Failure to converge raises the penalty parameter.  A converged
    /// solution that is infeasible for the original problem raises the
    /// penalty parameter if the penalty variable sits at its bound, and
    /// tightens the gap tolerance otherwise.
    pub fn step(&mut self, obs: PenaltyObservation) -> PenaltyStep {
        let step = if !obs.acceptable {
            PenaltyStep::IncreasePenalty
        } else if obs.feasorig {
            PenaltyStep::Done
        } else if obs.penaltybound {
            PenaltyStep::IncreasePenalty
        } else {
            PenaltyStep::TightenGap
        };

        match step {
            PenaltyStep::IncreasePenalty => self.penaltyparam *= self.penfact,
            PenaltyStep::TightenGap => self.gaptol *= self.gapfact,
            PenaltyStep::Done => {}
        }
        step
    }
}
