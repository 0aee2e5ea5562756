//! Turn an interleaved event stream into per-thread state intervals.
//!
//! Each thread carries one open span (`state` since `since`). Processing an
//! event closes that span, appending it to the thread's interval list when it
//! is longer than the applicable drop threshold, and opens the next one at the
//! event's own timestamp. Dropped spans therefore never shift later
//! boundaries.
//!
//! The controlling thread starts active; workers start idle-sequential. Both
//! start at t = 0, so callers should pass rebased timestamps (see
//! [`ParsedTrace::rebased`](super::parse::ParsedTrace::rebased)).
//!
//! Worker barrier exits and task finishes can be logged after the controlling
//! thread has already ended their region. Such events are recognized by
//! comparing against recorded `PARALLEL_END` times and ignored, so they can't
//! reopen a worker's idle-sequential span.

use std::collections::BTreeMap;

use serde::Serialize;

use super::event::{EventKind, StateInterval, ThreadActivityState, ThreadId, TraceEvent};
use super::stats::{TimelineStats, aggregate};
use crate::config::{ReconstructConfig, WorkEndPolicy};

use ThreadActivityState::{Active, IdleBarrier, IdleSequential};

/// A PARALLEL_BEGIN paired with its PARALLEL_END on the controlling thread.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ParallelRegion {
    pub begin: f64,
    pub end: f64,
}

impl ParallelRegion {
    pub fn duration(&self) -> f64 {
        self.end - self.begin
    }
}

/// Result of one reconstruction.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Timeline {
    /// Chronological, non-overlapping intervals per thread
    pub intervals: BTreeMap<ThreadId, Vec<StateInterval>>,
    /// Parallel regions, in order
    pub regions: Vec<ParallelRegion>,
    /// Largest event timestamp, `None` for an empty trace
    pub end_time: Option<f64>,
}

impl Timeline {
    pub fn threads(&self) -> impl Iterator<Item = ThreadId> + '_ {
        self.intervals.keys().copied()
    }

    pub fn intervals_for(&self, thread: ThreadId) -> &[StateInterval] {
        self.intervals.get(&thread).map_or(&[], Vec::as_slice)
    }

    pub fn stats(&self) -> TimelineStats {
        aggregate(&self.intervals)
    }
}

/// Open span of one thread.
#[derive(Debug, Clone, Copy)]
struct ThreadState {
    current: ThreadActivityState,
    since: f64,
}

/// Which drop threshold a transition applies when closing the open span.
#[derive(Debug, Clone, Copy)]
enum Threshold {
    Fine,
    Coarse,
    /// Always record, even zero-length spans
    None,
}

/// Mutable state of a single reconstruction call.
struct Reconstruction<'a> {
    config: &'a ReconstructConfig,
    states: BTreeMap<ThreadId, ThreadState>,
    intervals: BTreeMap<ThreadId, Vec<StateInterval>>,
    region_begins: Vec<f64>,
    region_ends: Vec<f64>,
    /// Earliest PARALLEL_END seen so far
    first_region_end: Option<f64>,
}

impl<'a> Reconstruction<'a> {
    fn new(config: &'a ReconstructConfig, threads: impl IntoIterator<Item = ThreadId>) -> Self {
        let mut this = Self {
            config,
            states: BTreeMap::new(),
            intervals: BTreeMap::new(),
            region_begins: Vec::new(),
            region_ends: Vec::new(),
            first_region_end: None,
        };
        for thread in threads {
            this.ensure_thread(thread);
        }
        this
    }

    fn initial_state(&self, thread: ThreadId) -> ThreadState {
        let current = if self.config.is_controlling(thread) {
            Active
        } else {
            IdleSequential
        };
        ThreadState { current, since: 0.0 }
    }

    /// Seed a thread the first time it is referenced.
    fn ensure_thread(&mut self, thread: ThreadId) -> ThreadState {
        if let Some(state) = self.states.get(&thread) {
            return *state;
        }
        let state = self.initial_state(thread);
        self.states.insert(thread, state);
        self.intervals.entry(thread).or_default();
        state
    }

    fn threshold_ms(&self, threshold: Threshold) -> Option<f64> {
        match threshold {
            Threshold::Fine => Some(self.config.fine_threshold_ms),
            Threshold::Coarse => Some(self.config.coarse_threshold_ms),
            Threshold::None => None,
        }
    }

    /// Append `[since, now)` as `state` if it clears `threshold`.
    fn record(
        &mut self,
        thread: ThreadId,
        since: f64,
        now: f64,
        state: ThreadActivityState,
        threshold: Threshold,
    ) {
        if now < since {
            log::trace!(
                "thread {thread}: dropping {state} span [{since:.3}, {now:.3}) ending before it starts"
            );
            return;
        }
        if let Some(min) = self.threshold_ms(threshold)
            && now - since <= min
        {
            log::trace!(
                "thread {thread}: dropping {state} span [{since:.3}, {now:.3}) below {min} ms"
            );
            return;
        }
        self.intervals
            .entry(thread)
            .or_default()
            .push(StateInterval::new(since, now, state));
    }

    fn open(&mut self, thread: ThreadId, current: ThreadActivityState, since: f64) {
        self.states.insert(thread, ThreadState { current, since });
    }

    /// Close the open span keeping its state, then open `next`.
    fn transition(
        &mut self,
        thread: ThreadId,
        now: f64,
        threshold: Threshold,
        next: ThreadActivityState,
    ) {
        let state = self.ensure_thread(thread);
        self.record(thread, state.since, now, state.current, threshold);
        self.open(thread, next, now);
    }

    /// A worker event logged after some region already ended belongs to that region.
    fn is_stale(&self, event: &TraceEvent) -> bool {
        !self.config.is_controlling(event.thread)
            && self.first_region_end.is_some_and(|end| end < event.time)
    }

    fn process(&mut self, event: &TraceEvent) {
        let thread = event.thread;
        let now = event.time;
        let controlling = self.config.is_controlling(thread);
        self.ensure_thread(thread);

        if event.kind.is_region_boundary() && !controlling {
            log::debug!("thread {thread}: ignoring {} from a worker", event.kind);
            return;
        }

        match event.kind {
            EventKind::ParallelBegin => self.region_begins.push(now),
            EventKind::ParallelEnd => self.end_region(now),
            EventKind::TaskStart | EventKind::WorkStart => {
                self.transition(thread, now, Threshold::Fine, Active);
            }
            EventKind::WorkEnd => self.work_end(thread, now),
            EventKind::BarrierEnter => {
                self.transition(thread, now, Threshold::Coarse, IdleBarrier);
            }
            EventKind::BarrierExit => {
                if self.is_stale(event) {
                    log::debug!("thread {thread}: ignoring stale barrier exit at {now:.3} ms");
                    return;
                }
                let state = self.states[&thread];
                if state.current == IdleBarrier {
                    self.record(thread, state.since, now, IdleBarrier, Threshold::None);
                }
                self.open(thread, Active, now);
            }
            EventKind::TaskFinish => {
                if self.is_stale(event) {
                    log::debug!("thread {thread}: ignoring stale task finish at {now:.3} ms");
                    return;
                }
                let next = if controlling { Active } else { IdleSequential };
                self.transition(thread, now, Threshold::Coarse, next);
            }
        }
    }

    fn end_region(&mut self, now: f64) {
        self.region_ends.push(now);
        if self.first_region_end.is_none() {
            self.first_region_end = Some(now);
        }

        let threads: Vec<ThreadId> = self.states.keys().copied().collect();
        for thread in threads {
            let state = self.states[&thread];
            if self.config.is_controlling(thread) {
                // Continuously active through a region it ends
                self.record(thread, state.since, now, Active, Threshold::Fine);
                self.open(thread, Active, now);
            } else {
                self.record(thread, state.since, now, state.current, Threshold::Fine);
                self.open(thread, IdleSequential, now);
            }
        }
    }

    fn work_end(&mut self, thread: ThreadId, now: f64) {
        let state = self.states[&thread];
        if state.current == Active {
            self.record(thread, state.since, now, Active, Threshold::None);
        } else {
            match self.config.work_end {
                WorkEndPolicy::Compatible => {
                    log::debug!(
                        "thread {thread}: WORK_END while {}; dropping span from {:.3} ms",
                        state.current,
                        state.since
                    );
                }
                WorkEndPolicy::Strict => {
                    self.record(thread, state.since, now, state.current, Threshold::Fine);
                }
            }
        }
        self.open(thread, IdleBarrier, now);
    }

    fn finish(mut self, end_time: Option<f64>) -> Timeline {
        if let Some(max) = end_time {
            let open: Vec<(ThreadId, ThreadState)> =
                self.states.iter().map(|(t, s)| (*t, *s)).collect();
            for (thread, state) in open {
                self.record(thread, state.since, max, state.current, Threshold::Coarse);
            }
        }

        let regions = self
            .region_begins
            .iter()
            .zip(&self.region_ends)
            .map(|(&begin, &end)| ParallelRegion { begin, end })
            .collect();

        Timeline {
            intervals: self.intervals,
            regions,
            end_time,
        }
    }
}

/// Reconstruct per-thread intervals from events in any order.
///
/// Every thread referenced by an event gets an entry, possibly empty.
pub fn reconstruct(events: &[TraceEvent], config: &ReconstructConfig) -> Timeline {
    reconstruct_with_threads(events, std::iter::empty(), config)
}

/// Like [`reconstruct`], additionally seeding `threads` at t = 0 so threads
/// known only from annotations still get a timeline.
pub fn reconstruct_with_threads(
    events: &[TraceEvent],
    threads: impl IntoIterator<Item = ThreadId>,
    config: &ReconstructConfig,
) -> Timeline {
    // Stable: ties keep input order
    let mut sorted: Vec<&TraceEvent> = events.iter().collect();
    sorted.sort_by(|a, b| a.time.total_cmp(&b.time));

    let seeded = threads.into_iter().chain(sorted.iter().map(|e| e.thread));
    let mut reconstruction = Reconstruction::new(config, seeded);

    for event in &sorted {
        reconstruction.process(event);
    }

    let end_time = sorted.iter().map(|e| e.time).max_by(f64::total_cmp);
    reconstruction.finish(end_time)
}
