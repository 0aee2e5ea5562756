//! Per-thread and overall time spent in each activity state.

use std::collections::BTreeMap;

use serde::Serialize;

use super::event::{StateInterval, ThreadActivityState, ThreadId};

/// Summed durations (ms) per state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct StateTotals {
    pub active: f64,
    pub idle_barrier: f64,
    pub idle_sequential: f64,
}

impl StateTotals {
    pub fn get(&self, state: ThreadActivityState) -> f64 {
        match state {
            ThreadActivityState::Active => self.active,
            ThreadActivityState::IdleBarrier => self.idle_barrier,
            ThreadActivityState::IdleSequential => self.idle_sequential,
        }
    }

    fn add(&mut self, state: ThreadActivityState, duration: f64) {
        let slot = match state {
            ThreadActivityState::Active => &mut self.active,
            ThreadActivityState::IdleBarrier => &mut self.idle_barrier,
            ThreadActivityState::IdleSequential => &mut self.idle_sequential,
        };
        *slot += duration;
    }

    pub fn total(&self) -> f64 {
        self.active + self.idle_barrier + self.idle_sequential
    }

    /// Share of `state` in percent; 0 when nothing was recorded.
    pub fn percent(&self, state: ThreadActivityState) -> f64 {
        let total = self.total();
        if total > 0.0 {
            self.get(state) / total * 100.0
        } else {
            0.0
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TimelineStats {
    pub per_thread: BTreeMap<ThreadId, StateTotals>,
    pub overall: StateTotals,
}

/// Sum interval durations by state, per thread and across all threads.
pub fn aggregate(intervals: &BTreeMap<ThreadId, Vec<StateInterval>>) -> TimelineStats {
    let mut stats = TimelineStats::default();

    for (&thread, thread_intervals) in intervals {
        let totals = stats.per_thread.entry(thread).or_default();
        for interval in thread_intervals {
            totals.add(interval.state, interval.duration());
            stats.overall.add(interval.state, interval.duration());
        }
    }

    stats
}
