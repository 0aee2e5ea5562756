//! Parse OMPT tool output into events and annotations.
//!
//! The tool prints one line per callback:
//!
//! ```text
//! [OMPT] Thread 1 WORK START at 1234.567 ms (type: loop, count: 8)
//! [OMPT] Thread 1 ENTER implicit_barrier at 1235.002 ms
//! [OMPT_annotation] Thread 0 Annotation at 1230.000 ms: ROI_START
//! ```
//!
//! Anything else in the stream (program output, tool banners) is ignored.

use std::collections::BTreeSet;
use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;

use super::event::{Annotation, EventKind, ThreadId, TraceEvent};
use crate::error::TraceError;

const EVENT_PREFIX: &str = "[OMPT]";
const ANNOTATION_PREFIX: &str = "[OMPT_annotation]";

static EVENT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\[OMPT\] Thread (\d+) (.+?) at ([\d.]+) ms(?:\s+\((.+?)\))?").unwrap()
});

static ANNOTATION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\[OMPT_annotation\] Thread (\d+) Annotation at ([\d.]+) ms: (.+)").unwrap()
});

/// A successfully parsed line.
#[derive(Debug, Clone, PartialEq)]
pub enum TraceRecord {
    Event(TraceEvent),
    Annotation(Annotation),
}

/// Everything recovered from one trace.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedTrace {
    pub events: Vec<TraceEvent>,
    pub annotations: Vec<Annotation>,
    /// OMPT lines that were malformed or described callbacks we don't model
    pub skipped: usize,
}

impl ParsedTrace {
    /// Sorted ids of every thread seen in events or annotations.
    pub fn threads(&self) -> Vec<ThreadId> {
        let ids: BTreeSet<ThreadId> = self
            .events
            .iter()
            .map(|e| e.thread)
            .chain(self.annotations.iter().map(|a| a.thread))
            .collect();
        ids.into_iter().collect()
    }

    /// Earliest timestamp across events and annotations.
    pub fn base_time(&self) -> Option<f64> {
        self.events
            .iter()
            .map(|e| e.time)
            .chain(self.annotations.iter().map(|a| a.time))
            .min_by(f64::total_cmp)
    }

    /// Shift all timestamps so the earliest record sits at 0 ms.
    ///
    /// Raw timestamps come from a monotonic clock with an arbitrary origin,
    /// while reconstruction starts every thread at t = 0.
    pub fn rebased(mut self) -> Self {
        if let Some(base) = self.base_time() {
            for event in &mut self.events {
                event.time -= base;
            }
            for annotation in &mut self.annotations {
                annotation.time -= base;
            }
        }
        self
    }
}

/// Map the label printed between the thread id and `at` onto an event kind.
///
/// Sync regions count as barriers only when their kind names one
/// (`barrier`, `implicit_barrier`, ...); taskwait/taskgroup/reduction return `None`.
pub fn classify(label: &str) -> Option<EventKind> {
    let kind = match label {
        "PARALLEL BEGIN" => EventKind::ParallelBegin,
        "PARALLEL END" => EventKind::ParallelEnd,
        "TASK START" => EventKind::TaskStart,
        "TASK FINISH" => EventKind::TaskFinish,
        "WORK START" => EventKind::WorkStart,
        "WORK END" => EventKind::WorkEnd,
        _ => {
            let (endpoint, sync_kind) = label.split_once(' ')?;
            if !sync_kind.contains("barrier") {
                return None;
            }
            match endpoint {
                "ENTER" => EventKind::BarrierEnter,
                "EXIT" => EventKind::BarrierExit,
                _ => return None,
            }
        }
    };
    Some(kind)
}

fn parse_time(text: &str) -> Option<f64> {
    text.parse::<f64>()
        .ok()
        .filter(|t| t.is_finite() && *t >= 0.0)
}

/// Parse a single line. Returns `None` for lines that are not OMPT records
/// and for OMPT records that can't be used.
pub fn parse_line(line: &str) -> Option<TraceRecord> {
    let line = line.trim();

    if line.starts_with(ANNOTATION_PREFIX) {
        let caps = ANNOTATION_RE.captures(line)?;
        let thread = caps[1].parse().ok()?;
        let time = parse_time(&caps[2])?;
        let label = caps[3].trim();
        return Some(TraceRecord::Annotation(Annotation::new(time, thread, label)));
    }

    if !line.starts_with(EVENT_PREFIX) {
        return None;
    }

    let caps = EVENT_RE.captures(line)?;
    let thread = caps[1].parse().ok()?;
    let kind = classify(caps[2].trim())?;
    let time = parse_time(&caps[3])?;

    let mut event = TraceEvent::new(time, thread, kind);
    if let Some(details) = caps.get(4) {
        event = event.with_details(details.as_str());
    }
    Some(TraceRecord::Event(event))
}

/// Parse a whole trace, in input order.
pub fn parse_lines(input: &str) -> ParsedTrace {
    let mut parsed = ParsedTrace::default();

    for (index, line) in input.lines().enumerate() {
        let trimmed = line.trim();
        let is_ompt = trimmed.starts_with(EVENT_PREFIX) || trimmed.starts_with(ANNOTATION_PREFIX);
        if !is_ompt {
            continue;
        }

        match parse_line(trimmed) {
            Some(TraceRecord::Event(event)) => parsed.events.push(event),
            Some(TraceRecord::Annotation(annotation)) => parsed.annotations.push(annotation),
            None => {
                log::debug!("Skipping OMPT line {}: {}", index + 1, trimmed);
                parsed.skipped += 1;
            }
        }
    }

    log::debug!(
        "Parsed {} events and {} annotations ({} skipped)",
        parsed.events.len(),
        parsed.annotations.len(),
        parsed.skipped
    );
    parsed
}

/// Read and parse a trace file.
pub fn read_trace(path: &Path) -> Result<ParsedTrace, TraceError> {
    let contents = std::fs::read_to_string(path).map_err(|source| TraceError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(parse_lines(&contents))
}
