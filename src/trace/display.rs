//! Display formatting for trace analysis output.

use super::analyze::TraceAnalysis;
use super::event::ThreadActivityState;
use super::stats::{StateTotals, TimelineStats};
use std::fmt::Write as _;
use strum::IntoEnumIterator;

const RULE: &str = "============================================================";

/// Which optional sections to include.
#[derive(Debug, Clone, Copy, Default)]
pub struct RenderOptions {
    /// Chronological listing of every event and annotation
    pub events: bool,
}

/// Render the complete analysis to a string.
pub fn render(analysis: &TraceAnalysis, options: RenderOptions) -> String {
    let mut out = String::new();

    render_header(&mut out, analysis);
    if options.events {
        render_event_listing(&mut out, analysis);
    }
    render_annotations(&mut out, analysis);
    render_thread_activity(&mut out, analysis);
    render_regions(&mut out, analysis);
    out.push('\n');
    out.push_str(&render_statistics(&analysis.stats));

    out
}

fn render_header(out: &mut String, analysis: &TraceAnalysis) {
    writeln!(out, "{RULE}").unwrap();
    out.push_str("                 OMPT TIMELINE ANALYSIS\n");
    writeln!(out, "{RULE}").unwrap();
    writeln!(
        out,
        "Source: {} ({} events, {} annotations, {} threads)",
        analysis.source,
        analysis.events.len(),
        analysis.annotations.len(),
        analysis.threads.len()
    )
    .unwrap();
    if analysis.skipped_lines > 0 {
        writeln!(out, "Skipped {} unrecognized OMPT lines", analysis.skipped_lines).unwrap();
    }
}

fn render_event_listing(out: &mut String, analysis: &TraceAnalysis) {
    enum Item<'a> {
        Event(&'a super::event::TraceEvent),
        Annotation(&'a super::event::Annotation),
    }

    let mut items: Vec<(f64, Item<'_>)> = analysis
        .events
        .iter()
        .map(|e| (e.time, Item::Event(e)))
        .chain(
            analysis
                .annotations
                .iter()
                .map(|a| (a.time, Item::Annotation(a))),
        )
        .collect();
    items.sort_by(|a, b| a.0.total_cmp(&b.0));

    out.push_str("\nTIMELINE OF EVENTS AND ANNOTATIONS\n");
    out.push_str("----------------------------------\n");
    for (i, (time, item)) in items.iter().enumerate() {
        match item {
            Item::Event(event) => {
                writeln!(
                    out,
                    "{:>4}. {:>9.2}ms | Thread {} | {}",
                    i + 1,
                    time,
                    event.thread,
                    event.kind
                )
                .unwrap();
                if let Some(details) = &event.details {
                    writeln!(out, "{:17}| Details: {}", "", details).unwrap();
                }
            }
            Item::Annotation(annotation) => {
                writeln!(
                    out,
                    "{:>4}. {:>9.2}ms | Thread {} | ANNOTATION: {}",
                    i + 1,
                    time,
                    annotation.thread,
                    annotation.label
                )
                .unwrap();
            }
        }
    }
}

fn render_annotations(out: &mut String, analysis: &TraceAnalysis) {
    if analysis.annotations.is_empty() {
        return;
    }

    let mut annotations: Vec<_> = analysis.annotations.iter().collect();
    annotations.sort_by(|a, b| a.time.total_cmp(&b.time));

    out.push_str("\nANNOTATIONS\n");
    out.push_str("-----------\n");
    for annotation in annotations {
        writeln!(
            out,
            "{:>9.2}ms | Thread {} | {}",
            annotation.time, annotation.thread, annotation.label
        )
        .unwrap();
    }
}

fn render_thread_activity(out: &mut String, analysis: &TraceAnalysis) {
    out.push_str("\nTHREAD ACTIVITY\n");
    out.push_str("---------------\n");
    writeln!(
        out,
        "{:<8} {:>7} {:>12} {:>10} {:>12} {:>12}",
        "Thread", "Events", "First start", "Work(ms)", "Barrier(ms)", "Last finish"
    )
    .unwrap();

    for activity in &analysis.activity {
        writeln!(
            out,
            "{:<8} {:>7} {:>12} {:>10} {:>12} {:>12}",
            activity.thread,
            activity.event_count,
            format_ms(activity.first_task_start),
            format_ms(activity.total_work_time),
            format_ms(activity.total_barrier_time),
            format_ms(activity.last_task_finish),
        )
        .unwrap();
    }
}

fn render_regions(out: &mut String, analysis: &TraceAnalysis) {
    let regions = &analysis.timeline.regions;

    out.push_str("\nPARALLEL REGIONS\n");
    out.push_str("----------------\n");
    writeln!(out, "Number of parallel regions: {}", regions.len()).unwrap();
    for (i, region) in regions.iter().enumerate() {
        writeln!(
            out,
            "  Region {}: {:.2}ms -> {:.2}ms (duration: {:.2}ms)",
            i + 1,
            region.begin,
            region.end,
            region.duration()
        )
        .unwrap();
    }
}

/// Per-thread and overall time per state. Threads with nothing recorded are omitted.
pub fn render_statistics(stats: &TimelineStats) -> String {
    let mut out = String::new();
    out.push_str("TIMELINE STATISTICS\n");
    out.push_str("-------------------\n");

    let mut first = true;
    let sections = stats
        .per_thread
        .iter()
        .map(|(thread, totals)| (format!("Thread {thread}:"), totals))
        .chain(std::iter::once((
            "Overall (all threads combined):".to_string(),
            &stats.overall,
        )));

    for (title, totals) in sections {
        if totals.total() <= 0.0 {
            continue;
        }
        if !first {
            out.push('\n');
        }
        first = false;
        out.push_str(&title);
        out.push('\n');
        render_totals(&mut out, totals);
    }

    out
}

fn render_totals(out: &mut String, totals: &StateTotals) {
    for state in ThreadActivityState::iter() {
        writeln!(
            out,
            "  {:<17}{:>8.2} ms ({:>5.1}%)",
            format!("{}:", state.title()),
            totals.get(state),
            totals.percent(state)
        )
        .unwrap();
    }
    writeln!(out, "  {:<17}{:>8.2} ms", "Total:", totals.total()).unwrap();
}

fn format_ms(value: Option<f64>) -> String {
    value.map_or_else(|| "-".to_string(), |v| format!("{v:.2}"))
}
