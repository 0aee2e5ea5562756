//! SVG chart of a reconstructed timeline.
//!
//! One lane per thread, colored spans per state, dashed markers for
//! annotations. The chart only reads the timeline.

use std::fmt::Write as _;

use super::event::{Annotation, ThreadActivityState, ThreadId};
use super::reconstruct::Timeline;

/// Lane color for a state.
pub fn state_color(state: ThreadActivityState) -> &'static str {
    match state {
        ThreadActivityState::Active => "#14B773",
        ThreadActivityState::IdleBarrier => "#FFC504",
        ThreadActivityState::IdleSequential => "#B70000",
    }
}

const BACKGROUND: &str = "#ECEFF1";
const MARKER: &str = "#2C3E50";

/// Ranges longer than this are labeled in seconds.
const SECONDS_AXIS_THRESHOLD_MS: f64 = 10_000.0;

#[derive(Debug, Clone, Copy)]
pub struct ChartOptions {
    pub width: u32,
    pub lane_height: u32,
}

impl Default for ChartOptions {
    fn default() -> Self {
        Self {
            width: 1400,
            lane_height: 36,
        }
    }
}

const MARGIN_LEFT: f64 = 90.0;
const MARGIN_RIGHT: f64 = 30.0;
const MARGIN_TOP: f64 = 110.0;
const MARGIN_BOTTOM: f64 = 50.0;
const TICKS: usize = 10;

/// Escape text for use in SVG element content and attributes.
fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}

/// Maps trace time onto horizontal pixels.
struct TimeScale {
    min: f64,
    span: f64,
    left: f64,
    width: f64,
}

impl TimeScale {
    fn x(&self, time: f64) -> f64 {
        self.left + (time - self.min) / self.span * self.width
    }
}

/// Render `threads` (top to bottom) with their intervals and `annotations`.
///
/// Threads missing from the timeline get an empty lane.
pub fn render_svg(
    timeline: &Timeline,
    annotations: &[Annotation],
    threads: &[ThreadId],
    options: &ChartOptions,
) -> String {
    let width = f64::from(options.width);
    let lane = f64::from(options.lane_height);
    let plot_height = lane * threads.len().max(1) as f64;
    let height = MARGIN_TOP + plot_height + MARGIN_BOTTOM;

    let min_time = 0.0;
    let max_time = timeline.end_time.unwrap_or(0.0);
    // Pad the range slightly so edge markers stay visible
    let padding = (max_time - min_time) * 0.02;
    let scale = TimeScale {
        min: min_time - padding,
        span: (max_time - min_time + 2.0 * padding).max(f64::EPSILON),
        left: MARGIN_LEFT,
        width: width - MARGIN_LEFT - MARGIN_RIGHT,
    };

    let mut out = String::new();
    writeln!(
        out,
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{}" height="{height}" viewBox="0 0 {} {height}">"#,
        options.width, options.width
    )
    .unwrap();
    out.push_str(r#"<rect width="100%" height="100%" fill="white"/>"#);
    out.push('\n');

    render_legend(&mut out, !annotations.is_empty());

    for (i, &thread) in threads.iter().enumerate() {
        let y = MARGIN_TOP + lane * i as f64;
        let bar_y = y + lane * 0.15;
        let bar_height = lane * 0.7;

        writeln!(
            out,
            r#"<text x="{:.1}" y="{:.1}" font-size="12" text-anchor="end" dominant-baseline="middle">Thread {thread}</text>"#,
            MARGIN_LEFT - 8.0,
            y + lane / 2.0
        )
        .unwrap();
        writeln!(
            out,
            r#"<rect x="{:.2}" y="{bar_y:.2}" width="{:.2}" height="{bar_height:.2}" fill="{BACKGROUND}" fill-opacity="0.3"/>"#,
            scale.x(min_time),
            scale.x(max_time) - scale.x(min_time)
        )
        .unwrap();

        for interval in timeline.intervals_for(thread) {
            if interval.duration() <= 0.0 {
                continue;
            }
            let x = scale.x(interval.start);
            writeln!(
                out,
                r#"<rect x="{x:.2}" y="{bar_y:.2}" width="{:.2}" height="{bar_height:.2}" fill="{}" fill-opacity="0.9"><title>{} {:.3}-{:.3} ms</title></rect>"#,
                scale.x(interval.end) - x,
                state_color(interval.state),
                interval.state,
                interval.start,
                interval.end
            )
            .unwrap();
        }
    }

    render_axis(&mut out, &scale, min_time, max_time, MARGIN_TOP + plot_height);

    for annotation in annotations {
        let x = scale.x(annotation.time);
        writeln!(
            out,
            r#"<line x1="{x:.2}" y1="{:.2}" x2="{x:.2}" y2="{:.2}" stroke="{MARKER}" stroke-width="0.5" stroke-dasharray="4 3" stroke-opacity="0.8"/>"#,
            MARGIN_TOP - 10.0,
            MARGIN_TOP + plot_height
        )
        .unwrap();
        writeln!(
            out,
            r#"<text x="{x:.2}" y="{:.2}" font-size="10" fill="{MARKER}" transform="rotate(-90 {x:.2} {:.2})">{}</text>"#,
            MARGIN_TOP - 12.0,
            MARGIN_TOP - 12.0,
            escape(&annotation.label)
        )
        .unwrap();
    }

    out.push_str("</svg>\n");
    out
}

fn render_legend(out: &mut String, with_annotations: bool) {
    let entries = [
        (ThreadActivityState::Active, "Active (Working)"),
        (ThreadActivityState::IdleBarrier, "Idle - Sync Wait"),
        (ThreadActivityState::IdleSequential, "Idle - Sequential Region"),
    ];

    let mut x = 10.0;
    for (state, label) in entries {
        writeln!(
            out,
            r#"<rect x="{x:.1}" y="10" width="14" height="14" fill="{}"/><text x="{:.1}" y="21" font-size="12">{label}</text>"#,
            state_color(state),
            x + 20.0
        )
        .unwrap();
        x += 190.0;
    }
    if with_annotations {
        writeln!(
            out,
            r#"<line x1="{x:.1}" y1="17" x2="{:.1}" y2="17" stroke="{MARKER}" stroke-dasharray="4 3"/><text x="{:.1}" y="21" font-size="12">Annotations</text>"#,
            x + 14.0,
            x + 20.0
        )
        .unwrap();
    }
}

fn render_axis(out: &mut String, scale: &TimeScale, min_time: f64, max_time: f64, y: f64) {
    let seconds = max_time > SECONDS_AXIS_THRESHOLD_MS;
    let label = if seconds { "Time (s)" } else { "Time (ms)" };

    writeln!(
        out,
        r#"<line x1="{:.2}" y1="{y:.2}" x2="{:.2}" y2="{y:.2}" stroke="black" stroke-width="1"/>"#,
        scale.left,
        scale.left + scale.width
    )
    .unwrap();

    for i in 0..=TICKS {
        let time = min_time + (max_time - min_time) * i as f64 / TICKS as f64;
        let x = scale.x(time);
        let text = if seconds {
            format!("{:.1}", time / 1000.0)
        } else {
            format!("{time:.1}")
        };
        writeln!(
            out,
            r#"<line x1="{x:.2}" y1="{y:.2}" x2="{x:.2}" y2="{:.2}" stroke="black"/><text x="{x:.2}" y="{:.2}" font-size="10" text-anchor="middle">{text}</text>"#,
            y + 5.0,
            y + 18.0
        )
        .unwrap();
    }

    writeln!(
        out,
        r#"<text x="{:.2}" y="{:.2}" font-size="12" text-anchor="middle">{label}</text>"#,
        scale.left + scale.width / 2.0,
        y + 38.0
    )
    .unwrap();
}
