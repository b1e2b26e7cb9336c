use super::{Duration, Instant};
use thiserror::Error;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Time source used by an [`SdpiClock`].
#[derive(PartialEq, Eq, Clone, Debug, Copy, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ClockType {
    /// process CPU time (falls back to wall time where unavailable)
    Cpu,
    /// wall clock time
    #[default]
    Wall,
}

impl std::fmt::Display for ClockType {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ClockError {
    #[error("clock is already running")]
    Running,
    #[error("clock is not running")]
    NotRunning,
}

#[derive(Debug, Clone, Copy)]
enum Stamp {
    Wall(Instant),
    Cpu(Duration),
}

/// Start/stop timer measuring either wall or process CPU time.
///
/// Starting the clock discards the previous measurement.  The clock type
/// may only be changed while the clock is stopped.
#[derive(Debug, Clone, Default)]
pub struct SdpiClock {
    clock_type: ClockType,
    start: Option<Stamp>,
    elapsed: Duration,
}

impl SdpiClock {
    pub fn new(clock_type: ClockType) -> Self {
        Self {
            clock_type,
            start: None,
            elapsed: Duration::ZERO,
        }
    }

    pub fn clock_type(&self) -> ClockType {
        self.clock_type
    }

    pub fn is_running(&self) -> bool {
        self.start.is_some()
    }

    pub fn set_type(&mut self, clock_type: ClockType) -> Result<(), ClockError> {
        if self.is_running() {
            return Err(ClockError::Running);
        }
        tracing::debug!(component = "clock", ?clock_type, "setting clock type");
        self.clock_type = clock_type;
        Ok(())
    }

    pub fn start(&mut self) -> Result<(), ClockError> {
        if self.is_running() {
            return Err(ClockError::Running);
        }
        self.elapsed = Duration::ZERO;
        self.start = Some(self.stamp());
        Ok(())
    }

    pub fn stop(&mut self) -> Result<(), ClockError> {
        let start = self.start.take().ok_or(ClockError::NotRunning)?;
        self.elapsed = self.since(start);
        Ok(())
    }

    /// Elapsed seconds of the current or last completed run.
    pub fn elapsed_seconds(&self) -> f64 {
        match self.start {
            Some(start) => self.since(start).as_secs_f64(),
            None => self.elapsed.as_secs_f64(),
        }
    }

    fn stamp(&self) -> Stamp {
        match (self.clock_type, process_cpu_time()) {
            (ClockType::Cpu, Some(t)) => Stamp::Cpu(t),
            _ => Stamp::Wall(Instant::now()),
        }
    }

    fn since(&self, start: Stamp) -> Duration {
        match start {
            Stamp::Wall(t) => t.elapsed(),
            Stamp::Cpu(t) => process_cpu_time()
                .map(|now| now.saturating_sub(t))
                .unwrap_or(Duration::ZERO),
        }
    }
}

cfg_if::cfg_if! {
    if #[cfg(unix)] {
        fn process_cpu_time() -> Option<Duration> {
            let mut ts = libc::timespec { tv_sec: 0, tv_nsec: 0 };
            let rc = unsafe { libc::clock_gettime(libc::CLOCK_PROCESS_CPUTIME_ID, &mut ts) };
            if rc != 0 {
                return None;
            }
            Some(Duration::new(ts.tv_sec as u64, ts.tv_nsec as u32))
        }
    } else {
        fn process_cpu_time() -> Option<Duration> {
            None
        }
    }
}
