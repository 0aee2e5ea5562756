//! Run the whole pipeline for one trace: rebase, reconstruct, aggregate, summarize.

use serde::Serialize;

use super::activity::{ThreadActivity, summarize};
use super::event::{Annotation, ThreadId, TraceEvent};
use super::parse::ParsedTrace;
use super::reconstruct::{Timeline, reconstruct_with_threads};
use super::stats::TimelineStats;
use crate::config::ReconstructConfig;

/// Complete analysis of one trace.
#[derive(Debug, Clone, Serialize)]
pub struct TraceAnalysis {
    /// File name or `<stdin>`
    pub source: String,
    pub threads: Vec<ThreadId>,
    /// Rebased events in input order
    #[serde(skip)]
    pub events: Vec<TraceEvent>,
    pub annotations: Vec<Annotation>,
    pub skipped_lines: usize,
    pub timeline: Timeline,
    pub stats: TimelineStats,
    pub activity: Vec<ThreadActivity>,
}

/// Analyze a parsed trace. Timestamps are rebased to the earliest record first.
pub fn analyze(
    source: impl Into<String>,
    parsed: ParsedTrace,
    config: &ReconstructConfig,
) -> TraceAnalysis {
    let parsed = parsed.rebased();
    let threads = parsed.threads();

    let timeline = reconstruct_with_threads(&parsed.events, threads.iter().copied(), config);
    let stats = timeline.stats();
    let activity = summarize(&parsed.events, &threads);

    TraceAnalysis {
        source: source.into(),
        threads,
        events: parsed.events,
        annotations: parsed.annotations,
        skipped_lines: parsed.skipped,
        timeline,
        stats,
        activity,
    }
}
