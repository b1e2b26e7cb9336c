use super::{Duration, Instant};
use std::collections::HashMap;
use std::io::Write;
use std::ops::{Deref, DerefMut};

#[derive(Debug, Default)]
struct InnerTimer {
    start: Option<Instant>,
    elapsed: Duration,
    ncalls: usize,
    subtimers: SubTimersMap,
}

impl InnerTimer {
    fn reset(&mut self) {
        self.start = None;
        self.elapsed = Duration::ZERO;
        self.ncalls = 0;
        self.subtimers.clear();
    }

    fn start(&mut self) {
        self.start = Some(Instant::now());
        self.ncalls += 1;
    }

    fn stop(&mut self) {
        if let Some(start) = self.start.take() {
            self.elapsed += start.elapsed();
        }
    }
}

#[derive(Debug, Default)]
struct SubTimersMap(HashMap<&'static str, InnerTimer>);

impl Deref for SubTimersMap {
    type Target = HashMap<&'static str, InnerTimer>;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}
impl DerefMut for SubTimersMap {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

impl SubTimersMap {
    fn start_subtimer(&mut self, key: &'static str) {
        self.entry(key).or_default().start();
    }

    fn total_time(&self) -> Duration {
        self.values().fold(Duration::ZERO, |acc, t| acc + t.elapsed)
    }

    fn print(&self, out: &mut dyn Write, depth: usize) -> std::io::Result<()> {
        // stable output order
        let mut keys: Vec<_> = self.keys().collect();
        keys.sort();
        for key in keys {
            let val = &self[key];
            let tabs = format!("{: <1$}", "", 4 * depth);
            writeln!(
                out,
                "{}{:} : {:?} ({} calls)",
                tabs, *key, val.elapsed, val.ncalls
            )?;
            val.subtimers.print(out, depth + 1)?;
        }
        Ok(())
    }
}

/// Nested phase timers.  Starting a timer while another is active
/// makes it a child of the active one.
#[derive(Default, Debug)]
pub struct Timers {
    stack: Vec<&'static str>,
    subtimers: SubTimersMap,
}

impl Timers {
    fn mut_active_timer(&mut self) -> Option<&mut InnerTimer> {
        let (first, rest) = self.stack.split_first()?;

        //first one gets special treatment since self is not
        //an InnerTimer and a common trait would be overkill
        let mut active_timer = self.subtimers.get_mut(first)?;
        for key in rest {
            active_timer = active_timer.subtimers.get_mut(key)?;
        }
        Some(active_timer)
    }

    pub fn reset(&mut self) {
        self.stack.clear();
        self.subtimers.values_mut().for_each(|t| t.reset());
        self.subtimers.clear();
    }

    pub fn start_as_current(&mut self, key: &'static str) {
        if let Some(active) = self.mut_active_timer() {
            // child of current active timer
            active.subtimers.start_subtimer(key);
        } else {
            // nothing active, create one at root
            self.subtimers.start_subtimer(key);
        }
        self.stack.push(key);
    }

    pub fn stop_current(&mut self) {
        if let Some(active) = self.mut_active_timer() {
            active.stop();
        }
        self.stack.pop();
    }

    pub fn total_time(&self) -> Duration {
        self.subtimers.total_time()
    }

    /// Elapsed time of a root level timer.
    pub fn elapsed(&self, key: &'static str) -> Duration {
        self.subtimers
            .get(key)
            .map_or(Duration::ZERO, |t| t.elapsed)
    }

    pub fn print(&self, out: &mut dyn Write) -> std::io::Result<()> {
        self.subtimers.print(out, 0)
    }
}

macro_rules! timeit {
    ($timer:expr => $key:literal; $($tt:tt)+) => {
        $timer.start_as_current($key);
        $(
            $tt
        )+
        $timer.stop_current();
    }
}
pub(crate) use timeit;

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_nested_timers() {
        let mut timers = Timers::default();
        timers.start_as_current("solve");
        timers.start_as_current("preprocess");
        timers.stop_current();
        timers.start_as_current("backend");
        timers.stop_current();
        timers.stop_current();

        timers.start_as_current("solve");
        timers.stop_current();

        let mut buf = Vec::new();
        timers.print(&mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert!(text.contains("solve"));
        assert!(text.contains("(2 calls)"));
        assert!(text.contains("    backend"));
        assert!(timers.total_time() >= timers.elapsed("solve"));

        timers.reset();
        assert_eq!(timers.total_time(), Duration::ZERO);
    }
}
