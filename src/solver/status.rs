use crate::algebra::*;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Verdict of a Slater condition check for one side of the problem.
#[repr(u32)]
#[derive(PartialEq, Eq, Clone, Debug, Copy, Default)]
pub enum SlaterStatus {
    /// not checked, or the check was inconclusive
    #[default]
    NoInfo,
    /// a strictly interior point exists
    Holds,
    /// no strictly interior point exists
    Not,
    /// this side of the problem is infeasible
    Infeasible,
}

/// Numerical setting the backend needed to solve a problem.
#[repr(u32)]
#[derive(PartialEq, Eq, Clone, Debug, Copy, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum SolverSetting {
    #[default]
    Unsolved,
    Fast,
    Medium,
    Stable,
    Penalty,
}

/// Combination of solver setting and Slater verdicts for statistics.
#[repr(u32)]
#[derive(PartialEq, Eq, Clone, Debug, Copy, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum SlaterSetting {
    #[default]
    NoInfo,
    StableWSlater,
    UnstableWSlater,
    PenaltyWSlater,
    BoundedWSlater,
    UnsolvedWSlater,
    StableNoSlater,
    UnstableNoSlater,
    PenaltyNoSlater,
    BoundedNoSlater,
    UnsolvedNoSlater,
    StableInfeasible,
    UnstableInfeasible,
    PenaltyInfeasible,
    BoundedInfeasible,
    UnsolvedInfeasible,
}

/// The three outcomes a Slater-diagnosed run can be summarised with.
#[derive(PartialEq, Eq, Clone, Debug, Copy)]
pub(crate) enum SlaterOutcome {
    WSlater,
    NoSlater,
    Infeasible,
}

/// Families of [`SlaterSetting`], one per solve path.
#[derive(PartialEq, Eq, Clone, Debug, Copy)]
pub(crate) enum SlaterFamily {
    Stable,
    Unstable,
    Penalty,
    Bounded,
    Unsolved,
}

impl SlaterSetting {
    pub(crate) fn from_family(family: SlaterFamily, outcome: SlaterOutcome) -> Self {
        use SlaterFamily as F;
        use SlaterOutcome as O;
        use SlaterSetting::*;
        match (family, outcome) {
            (F::Stable, O::WSlater) => StableWSlater,
            (F::Stable, O::NoSlater) => StableNoSlater,
            (F::Stable, O::Infeasible) => StableInfeasible,
            (F::Unstable, O::WSlater) => UnstableWSlater,
            (F::Unstable, O::NoSlater) => UnstableNoSlater,
            (F::Unstable, O::Infeasible) => UnstableInfeasible,
            (F::Penalty, O::WSlater) => PenaltyWSlater,
            (F::Penalty, O::NoSlater) => PenaltyNoSlater,
            (F::Penalty, O::Infeasible) => PenaltyInfeasible,
            (F::Bounded, O::WSlater) => BoundedWSlater,
            (F::Bounded, O::NoSlater) => BoundedNoSlater,
            (F::Bounded, O::Infeasible) => BoundedInfeasible,
            (F::Unsolved, O::WSlater) => UnsolvedWSlater,
            (F::Unsolved, O::NoSlater) => UnsolvedNoSlater,
            (F::Unsolved, O::Infeasible) => UnsolvedInfeasible,
        }
    }
}

/// Result of the single free variable fast path.
#[derive(PartialEq, Eq, Clone, Debug, Copy)]
pub enum OneVarStatus {
    Optimal,
    Infeasible,
}

#[derive(Debug, Clone)]
pub(crate) struct OneVarResult<T> {
    pub status: OneVarStatus,
    /// index of the free variable
    pub idx: usize,
    /// objective value including fixed variables
    pub objval: T,
    pub optval: T,
    pub certvec: Option<Vec<T>>,
    pub certval: T,
}

/// Outcome of the last solve call.  Replaced as a whole at the end of
/// every solve and reset by every mutation.
#[derive(Debug, Clone, Default)]
pub(crate) enum SolveState<T> {
    #[default]
    Unsolved,
    /// penalty escalation ran out of parameters or time
    Failed,
    /// infeasibility proven by preprocessing, the all fixed check
    /// or the penalty formulation
    Infeasible { allfixed: bool, penalty: bool },
    /// every variable fixed and the fixed point is feasible
    AllFixed,
    OneVar(OneVarResult<T>),
    /// backend solve, possibly through the penalty formulation
    Solved { penalty: bool },
}

impl<T> SolveState<T>
where
    T: FloatT,
{
    pub fn is_solved(&self) -> bool {
        !matches!(self, SolveState::Unsolved | SolveState::Failed)
    }

    pub fn is_infeasible(&self) -> bool {
        matches!(self, SolveState::Infeasible { .. })
    }

    pub fn is_all_fixed(&self) -> bool {
        matches!(
            self,
            SolveState::AllFixed | SolveState::Infeasible { allfixed: true, .. }
        )
    }

    pub fn penalty(&self) -> bool {
        matches!(
            self,
            SolveState::Failed
                | SolveState::Infeasible { penalty: true, .. }
                | SolveState::Solved { penalty: true }
        )
    }

    pub fn onevar(&self) -> Option<&OneVarResult<T>> {
        match self {
            SolveState::OneVar(result) => Some(result),
            _ => None,
        }
    }

    /// Solved by the backend, without a special outcome to report.
    pub fn is_backend(&self) -> bool {
        matches!(self, SolveState::Solved { .. })
    }

    /// Short name of the solve path, for output.
    pub fn describe(&self) -> &'static str {
        match self {
            SolveState::Unsolved => "not solved",
            SolveState::Failed => "failed",
            SolveState::Infeasible { allfixed: true, .. } => "infeasible (all variables fixed)",
            SolveState::Infeasible { penalty: true, .. } => "infeasible (penalty formulation)",
            SolveState::Infeasible { .. } => "infeasible (preprocessing)",
            SolveState::AllFixed => "all variables fixed",
            SolveState::OneVar(_) => "one free variable",
            SolveState::Solved { penalty: true } => "solved (penalty formulation)",
            SolveState::Solved { penalty: false } => "solved",
        }
    }
}

macro_rules! impl_display_as_debug {
    ($($ty:ty),+) => {
        $(
        impl std::fmt::Display for $ty {
            fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
                write!(f, "{:?}", self)
            }
        }
        )+
    };
}
impl_display_as_debug!(SlaterStatus, SolverSetting, SlaterSetting, OneVarStatus);

#[test]
fn test_solve_state_flags() {
    let s = SolveState::<f64>::Infeasible {
        allfixed: true,
        penalty: false,
    };
    assert!(s.is_solved() && s.is_infeasible() && s.is_all_fixed() && !s.penalty());

    let s = SolveState::<f64>::Failed;
    assert!(!s.is_solved() && s.penalty());

    let s = SolveState::<f64>::Solved { penalty: true };
    assert!(s.is_solved() && s.is_backend() && s.penalty() && !s.is_infeasible());

    assert_eq!(
        SlaterSetting::from_family(SlaterFamily::Bounded, SlaterOutcome::NoSlater),
        SlaterSetting::BoundedNoSlater
    );
}
