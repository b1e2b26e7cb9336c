#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Parameters reachable through `get_real_par` / `set_real_par` and
/// `get_int_par` / `set_int_par` of [`Sdpi`](crate::solver::Sdpi).
///
/// Some are stored by the interface, some only by the backend and some
/// by both.
#[repr(u32)]
#[derive(PartialEq, Eq, Clone, Debug, Copy, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum SdpParam {
    // real parameters
    Epsilon,
    GapTol,
    FeasTol,
    SdpSolverFeasTol,
    ObjLimit,
    PenaltyParam,
    MaxPenaltyParam,
    LambdaStar,
    WarmstartPoGap,
    PenInfeasAdjust,
    // integer parameters
    SdpInfo,
    NThreads,
    UsePresolving,
    UseScaling,
    ScaleObj,
    SlaterCheck,
    NPenaltyIncr,
}

/// Who stores a parameter.
#[derive(PartialEq, Eq, Clone, Debug, Copy)]
pub(crate) enum ParamScope {
    /// the interface only
    Local,
    /// the interface, mirrored to the backend
    Shared,
    /// the backend only
    Backend,
}

impl SdpParam {
    pub fn is_real(&self) -> bool {
        use SdpParam::*;
        matches!(
            self,
            Epsilon
                | GapTol
                | FeasTol
                | SdpSolverFeasTol
                | ObjLimit
                | PenaltyParam
                | MaxPenaltyParam
                | LambdaStar
                | WarmstartPoGap
                | PenInfeasAdjust
        )
    }

    pub fn is_int(&self) -> bool {
        !self.is_real()
    }

    pub(crate) fn scope(&self) -> ParamScope {
        use SdpParam::*;
        match self {
            Epsilon | GapTol | FeasTol | PenaltyParam => ParamScope::Shared,
            MaxPenaltyParam | PenInfeasAdjust | SlaterCheck | NPenaltyIncr => ParamScope::Local,
            _ => ParamScope::Backend,
        }
    }
}

impl std::fmt::Display for SdpParam {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

#[test]
fn test_param_kinds() {
    assert!(SdpParam::GapTol.is_real());
    assert!(SdpParam::NThreads.is_int());
    assert_eq!(SdpParam::PenaltyParam.scope(), ParamScope::Shared);
    assert_eq!(SdpParam::NPenaltyIncr.scope(), ParamScope::Local);
    assert_eq!(SdpParam::LambdaStar.scope(), ParamScope::Backend);
    assert_eq!(SdpParam::ScaleObj.to_string(), "ScaleObj");
}
