use super::SolveState;
use crate::algebra::*;
use crate::io::PrintTarget;
use crate::timers::Timers;
use std::io::Write;
use std::time::Duration;

/// Counters of problems decided without calling the SDP solver, summed
/// over the lifetime of an interface.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SdpiStatistics {
    /// infeasible through bounds or LP rows
    pub ninfeasible: u64,
    /// all variables fixed
    pub nallfixed: u64,
    /// one free variable
    pub nonevarsdp: u64,
}

/// Bookkeeping of an interface: problem counter, per-solve solver
/// statistics, lifetime counters and the print stream.
#[derive(Debug, Default)]
pub struct SdpiInfo {
    /// number of the next problem, for diagnostic output
    pub sdpid: u64,
    /// SDP solver time of the last solve call
    pub time: f64,
    pub iterations: u32,
    pub sdp_calls: u32,
    pub statistics: SdpiStatistics,
    pub(crate) stream: PrintTarget,
}

impl SdpiInfo {
    pub(crate) fn new() -> Self {
        Self {
            sdpid: 1,
            ..Default::default()
        }
    }

    pub(crate) fn reset_solve_stats(&mut self) {
        self.time = 0.0;
        self.iterations = 0;
        self.sdp_calls = 0;
    }

    pub(crate) fn print_summary<T: FloatT>(
        &mut self,
        state: &SolveState<T>,
        objval: Option<T>,
        solve_time: f64,
        timers: &Timers,
    ) -> std::io::Result<()> {
        let out = &mut self.stream;

        writeln!(out, "SDP {}: {}", self.sdpid, state.describe())?;
        if let Some(objval) = objval {
            writeln!(out, "  objective value = {:+.8e}", objval)?;
        }
        writeln!(out, "  solver calls    = {}", self.sdp_calls)?;
        writeln!(out, "  iterations      = {}", self.iterations)?;
        writeln!(
            out,
            "  solver time     = {:?}",
            Duration::from_secs_f64(self.time.max(0.0))
        )?;
        writeln!(
            out,
            "  total time      = {:?}",
            Duration::from_secs_f64(solve_time.max(0.0))
        )?;
        writeln!(out, "timings:")?;
        timers.print(out)?;
        out.flush()?;
        Ok(())
    }
}

#[test]
fn test_summary_output() {
    use crate::io::ConfigurablePrintTarget;
    let mut info = SdpiInfo::new();
    info.stream.print_to_buffer();
    info.sdp_calls = 2;

    let state = SolveState::<f64>::Solved { penalty: true };
    info.print_summary(&state, Some(1.5), 0.25, &Timers::default())
        .unwrap();

    let text = info.stream.get_print_buffer().unwrap();
    assert!(text.starts_with("SDP 1: solved (penalty formulation)"));
    assert!(text.contains("objective value = +1.50000000e0"));
    assert!(text.contains("solver calls    = 2"));
}
