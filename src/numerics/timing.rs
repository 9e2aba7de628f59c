#![allow(unused)]
use std::cell::RefCell;
use std::time::Duration;

#[derive(Default, Clone)]
pub struct TimingStats {
    pub assembly_times: Vec<Duration>,
    pub solve_times: Vec<Duration>,
}

impl TimingStats {
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(feature = "timing")]
    pub fn log_summary(&self) {
        if self.assembly_times.is_empty() && self.solve_times.is_empty() {
            return;
        }

        let total_assembly: Duration = self.assembly_times.iter().sum();
        let total_solve: Duration = self.solve_times.iter().sum();

        log::info!(
            "mass assembly: {} calls, {:.3}ms total (avg {:.3}ms)",
            self.assembly_times.len(),
            total_assembly.as_secs_f64() * 1000.0,
            total_assembly.as_secs_f64() * 1000.0 / self.assembly_times.len().max(1) as f64
        );
        log::info!(
            "factorisation/solve: {} calls, {:.3}ms total (avg {:.3}ms)",
            self.solve_times.len(),
            total_solve.as_secs_f64() * 1000.0,
            total_solve.as_secs_f64() * 1000.0 / self.solve_times.len().max(1) as f64
        );
    }

    #[cfg(not(feature = "timing"))]
    pub fn log_summary(&self) {}
}

#[cfg(feature = "timing")]
thread_local! {
    static TIMING_STATS: RefCell<TimingStats> = RefCell::new(TimingStats::new());
}

#[cfg(feature = "timing")]
pub fn reset_timing() {
    TIMING_STATS.with(|stats| {
        *stats.borrow_mut() = TimingStats::new();
    });
}

#[cfg(not(feature = "timing"))]
pub fn reset_timing() {}

#[cfg(feature = "timing")]
pub fn record_assembly<F, R>(f: F) -> R
where
    F: FnOnce() -> R,
{
    let start = std::time::Instant::now();
    let result = f();
    let elapsed = start.elapsed();
    TIMING_STATS.with(|stats| {
        stats.borrow_mut().assembly_times.push(elapsed);
    });
    result
}

#[cfg(not(feature = "timing"))]
pub fn record_assembly<F, R>(f: F) -> R
where
    F: FnOnce() -> R,
{
    f()
}

#[cfg(feature = "timing")]
pub fn record_solve<F, R>(f: F) -> R
where
    F: FnOnce() -> R,
{
    let start = std::time::Instant::now();
    let result = f();
    let elapsed = start.elapsed();
    TIMING_STATS.with(|stats| {
        stats.borrow_mut().solve_times.push(elapsed);
    });
    result
}

#[cfg(not(feature = "timing"))]
pub fn record_solve<F, R>(f: F) -> R
where
    F: FnOnce() -> R,
{
    f()
}

#[cfg(feature = "timing")]
pub fn finalize_timing() -> TimingStats {
    TIMING_STATS.with(|stats| stats.borrow().clone())
}

#[cfg(not(feature = "timing"))]
pub fn finalize_timing() -> TimingStats {
    TimingStats::new()
}

pub fn finalize_and_log() {
    finalize_timing().log_summary();
}
