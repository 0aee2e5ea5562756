//! Value types shared by the parser, the reconstructor and the renderers.

use serde::{Deserialize, Serialize};

/// Runtime thread number as reported by the instrumentation (`omp_get_thread_num`).
pub type ThreadId = u32;

/// Thread that owns parallel regions unless configured otherwise.
pub const CONTROLLING_THREAD: ThreadId = 0;

/// Kind of an instrumentation event.
///
/// Decided once when a trace line is ingested; everything downstream
/// dispatches on this enum rather than on label text.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumIter,
    strum::IntoStaticStr,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum EventKind {
    ParallelBegin,
    ParallelEnd,
    TaskStart,
    TaskFinish,
    WorkStart,
    WorkEnd,
    BarrierEnter,
    BarrierExit,
}

impl EventKind {
    /// Whether only the controlling thread is expected to emit this kind.
    pub fn is_region_boundary(self) -> bool {
        matches!(self, Self::ParallelBegin | Self::ParallelEnd)
    }
}

/// One instrumentation callback, timestamped in milliseconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TraceEvent {
    pub time: f64,
    pub thread: ThreadId,
    pub kind: EventKind,
    /// Free-form trailer printed by the tool, e.g. `type: loop, count: 8`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl TraceEvent {
    pub fn new(time: f64, thread: ThreadId, kind: EventKind) -> Self {
        Self {
            time,
            thread,
            kind,
            details: None,
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }
}

/// User-placed marker (e.g. `ROI_START`). Never affects reconstruction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Annotation {
    pub time: f64,
    pub thread: ThreadId,
    pub label: String,
}

impl Annotation {
    pub fn new(time: f64, thread: ThreadId, label: impl Into<String>) -> Self {
        Self {
            time,
            thread,
            label: label.into(),
        }
    }
}

/// What a thread is doing during an interval.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumIter,
    strum::AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ThreadActivityState {
    /// Executing work inside or outside a parallel region
    Active,
    /// Waiting at a barrier inside a parallel region
    IdleBarrier,
    /// Parked between parallel regions
    IdleSequential,
}

impl ThreadActivityState {
    /// Label used in report tables.
    pub fn title(self) -> &'static str {
        match self {
            Self::Active => "Active",
            Self::IdleBarrier => "Idle-Barrier",
            Self::IdleSequential => "Idle-Sequential",
        }
    }
}

/// A span `[start, end)` during which a thread stayed in one state.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StateInterval {
    pub start: f64,
    pub end: f64,
    pub state: ThreadActivityState,
}

impl StateInterval {
    pub fn new(start: f64, end: f64, state: ThreadActivityState) -> Self {
        Self { start, end, state }
    }

    pub fn duration(&self) -> f64 {
        self.end - self.start
    }
}
