//! Library-level checks of reconstruction over a real trace.

use ompt_timeline::config::{ReconstructConfig, WorkEndPolicy};
use ompt_timeline::trace::{
    EventKind, ThreadActivityState, TraceEvent, analyze, parse_lines, reconstruct,
};
use rstest::rstest;

use crate::common::sample_log;

fn sample_events() -> Vec<TraceEvent> {
    parse_lines(&sample_log()).rebased().events
}

#[rstest]
#[case::compatible(WorkEndPolicy::Compatible)]
#[case::strict(WorkEndPolicy::Strict)]
fn test_intervals_sorted_and_disjoint(#[case] work_end: WorkEndPolicy) {
    let config = ReconstructConfig {
        work_end,
        ..Default::default()
    };
    let timeline = reconstruct(&sample_events(), &config);
    let end = timeline.end_time.unwrap();

    for (thread, intervals) in &timeline.intervals {
        for interval in intervals {
            assert!(interval.start <= interval.end, "thread {thread}: {interval:?}");
            assert!(interval.start >= 0.0 && interval.end <= end);
        }
        for pair in intervals.windows(2) {
            assert!(
                pair[0].end <= pair[1].start,
                "thread {thread} overlaps: {pair:?}"
            );
        }
    }
}

#[test]
fn test_stats_match_interval_durations() {
    let timeline = reconstruct(&sample_events(), &ReconstructConfig::default());
    let stats = timeline.stats();

    let mut overall = 0.0;
    for (thread, intervals) in &timeline.intervals {
        let sum: f64 = intervals.iter().map(|i| i.duration()).sum();
        let totals = stats.per_thread[thread];
        assert!((totals.total() - sum).abs() < 1e-9, "thread {thread}");
        overall += sum;
    }
    assert!((stats.overall.total() - overall).abs() < 1e-9);
}

#[test]
fn test_reconstruction_is_repeatable_and_order_insensitive() {
    let events = sample_events();
    let config = ReconstructConfig::default();
    let first = reconstruct(&events, &config);

    assert_eq!(reconstruct(&events, &config), first);

    // Sample timestamps are distinct, so any input order yields the same timeline
    let mut reversed = events.clone();
    reversed.reverse();
    assert_eq!(reconstruct(&reversed, &config), first);
}

#[test]
fn test_sample_regions_and_controlling_thread() {
    let timeline = reconstruct(&sample_events(), &ReconstructConfig::default());

    assert_eq!(timeline.regions.len(), 2);
    for region in &timeline.regions {
        assert!(region.duration() > 0.0);
    }
    // Controlling thread never waits in a sequential region
    assert!(
        timeline
            .intervals_for(0)
            .iter()
            .all(|i| i.state != ThreadActivityState::IdleSequential)
    );
    // Workers are idle-sequential right after each region ends
    for region in &timeline.regions {
        for worker in 1..4 {
            let after = timeline
                .intervals_for(worker)
                .iter()
                .find(|i| i.start == region.end);
            if let Some(interval) = after {
                assert_eq!(interval.state, ThreadActivityState::IdleSequential);
            }
        }
    }
}

#[test]
fn test_late_worker_events_ignored() {
    let events = vec![
        TraceEvent::new(0.0, 0, EventKind::ParallelBegin),
        TraceEvent::new(1.0, 1, EventKind::TaskStart),
        TraceEvent::new(5.0, 1, EventKind::BarrierEnter),
        TraceEvent::new(10.0, 0, EventKind::ParallelEnd),
        TraceEvent::new(10.5, 1, EventKind::BarrierExit),
        TraceEvent::new(11.0, 1, EventKind::TaskFinish),
        TraceEvent::new(20.0, 0, EventKind::TaskFinish),
    ];
    let timeline = reconstruct(&events, &ReconstructConfig::default());

    let states: Vec<_> = timeline
        .intervals_for(1)
        .iter()
        .map(|i| (i.start, i.end, i.state))
        .collect();
    assert_eq!(
        states,
        vec![
            (0.0, 1.0, ThreadActivityState::IdleSequential),
            (1.0, 5.0, ThreadActivityState::Active),
            (5.0, 10.0, ThreadActivityState::IdleBarrier),
            (10.0, 20.0, ThreadActivityState::IdleSequential),
        ]
    );
}

#[test]
fn test_empty_trace() {
    let timeline = reconstruct(&[], &ReconstructConfig::default());
    assert!(timeline.intervals.is_empty());
    assert!(timeline.regions.is_empty());
    assert_eq!(timeline.end_time, None);
    assert_eq!(timeline.stats().overall.total(), 0.0);
}

#[test]
fn test_analyze_sample() {
    let analysis = analyze(
        "sample.log".to_string(),
        parse_lines(&sample_log()),
        &ReconstructConfig::default(),
    );

    assert_eq!(analysis.threads, vec![0, 1, 2, 3]);
    assert_eq!(analysis.annotations.len(), 2);
    assert_eq!(analysis.annotations[0].time, 0.0);
    assert_eq!(analysis.skipped_lines, 2);
    assert_eq!(analysis.activity.len(), 4);
    assert!(analysis.stats.overall.get(ThreadActivityState::Active) > 0.0);
}
