//! Event-level summary per thread, independent of the reconstructed states.

use std::collections::BTreeMap;

use serde::Serialize;

use super::event::{EventKind, ThreadId, TraceEvent};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ThreadActivity {
    pub thread: ThreadId,
    pub event_count: usize,
    pub first_task_start: Option<f64>,
    /// Sum of i-th WORK_END minus i-th WORK_START
    pub total_work_time: Option<f64>,
    /// Sum of i-th BARRIER_EXIT minus i-th BARRIER_ENTER
    pub total_barrier_time: Option<f64>,
    pub last_task_finish: Option<f64>,
}

/// Pair starts with ends by position and sum the gaps. `None` when either side is empty.
fn paired_total(starts: &[f64], ends: &[f64]) -> Option<f64> {
    if starts.is_empty() || ends.is_empty() {
        return None;
    }
    Some(starts.iter().zip(ends).map(|(start, end)| end - start).sum())
}

/// Summarize events per thread; `threads` lists every thread to report, in order.
pub fn summarize(events: &[TraceEvent], threads: &[ThreadId]) -> Vec<ThreadActivity> {
    let mut sorted: Vec<&TraceEvent> = events.iter().collect();
    sorted.sort_by(|a, b| a.time.total_cmp(&b.time));

    let mut by_thread: BTreeMap<ThreadId, Vec<&TraceEvent>> = BTreeMap::new();
    for event in sorted {
        by_thread.entry(event.thread).or_default().push(event);
    }

    threads
        .iter()
        .map(|&thread| {
            let events = by_thread.get(&thread).map_or(&[][..], Vec::as_slice);
            let times = |kind: EventKind| -> Vec<f64> {
                events
                    .iter()
                    .filter(|e| e.kind == kind)
                    .map(|e| e.time)
                    .collect()
            };

            ThreadActivity {
                thread,
                event_count: events.len(),
                first_task_start: times(EventKind::TaskStart).first().copied(),
                total_work_time: paired_total(
                    &times(EventKind::WorkStart),
                    &times(EventKind::WorkEnd),
                ),
                total_barrier_time: paired_total(
                    &times(EventKind::BarrierEnter),
                    &times(EventKind::BarrierExit),
                ),
                last_task_finish: times(EventKind::TaskFinish).last().copied(),
            }
        })
        .collect()
}
