//! OMPT trace parsing, timeline reconstruction and reporting.
//!
//! The pipeline turns raw tool output into a per-thread activity timeline:
//!
//! 1. [`parse`] reads `[OMPT]` / `[OMPT_annotation]` lines into typed events.
//! 2. [`reconstruct`] replays the events as a per-thread state machine and
//!    emits non-overlapping [`StateInterval`]s.
//! 3. [`stats`] sums time per state; [`activity`] summarizes raw events.
//! 4. [`display`] and [`svg`] render the result.
//!
//! # Usage
//!
//! ```
//! use ompt_timeline::config::ReconstructConfig;
//! use ompt_timeline::trace::{RenderOptions, analyze, parse_lines, render};
//!
//! let log = "[OMPT] Thread 0 PARALLEL BEGIN at 10.000 ms (requested threads: 2)\n\
//!            [OMPT] Thread 1 ENTER implicit_barrier at 12.000 ms\n\
//!            [OMPT] Thread 0 PARALLEL END at 15.000 ms\n";
//! let analysis = analyze("example", parse_lines(log), &ReconstructConfig::default());
//! assert_eq!(analysis.timeline.regions.len(), 1);
//! println!("{}", render(&analysis, RenderOptions::default()));
//! ```

pub mod activity;
pub mod analyze;
pub mod display;
pub mod event;
pub mod parse;
pub mod reconstruct;
pub mod stats;
pub mod svg;

// Re-export main types for convenience
pub use analyze::{TraceAnalysis, analyze};
pub use display::{RenderOptions, render};
pub use event::{
    Annotation, CONTROLLING_THREAD, EventKind, StateInterval, ThreadActivityState, ThreadId,
    TraceEvent,
};
pub use parse::{ParsedTrace, TraceRecord, parse_line, parse_lines, read_trace};
pub use reconstruct::{ParallelRegion, Timeline, reconstruct, reconstruct_with_threads};
pub use stats::{StateTotals, TimelineStats, aggregate};
pub use svg::{ChartOptions, render_svg};
