// tests/scenarios.rs
use std::ops::RangeInclusive;

use anyhow::{Result, anyhow};
use matchdex_core::{
    CharacterId, ConfigError, Flow, FlushPolicy, FrameAnalyzer, FrameSource, IndexSummary, Indexer,
    MatchRecord, Reporter, Roster, RunEnd, RunSettings, SampleStatus, Side, VideoInfo,
};

const RYU: usize = 0;
const KEN: usize = 1;

struct Frames {
    next: u64,
    total: u64,
    fps: f64,
    fail_at: Option<u64>,
}

impl Frames {
    fn new(total: u64, fps: f64) -> Self {
        Self {
            next: 0,
            total,
            fps,
            fail_at: None,
        }
    }
}

impl FrameSource for Frames {
    type Frame = u64;

    fn info(&self) -> VideoInfo {
        VideoInfo {
            fps: self.fps,
            frame_count: self.total,
            width: 1280,
            height: 720,
        }
    }

    fn next_frame(&mut self) -> Result<Option<u64>> {
        if self.fail_at == Some(self.next + 1) {
            return Err(anyhow!("corrupt frame"));
        }
        if self.next >= self.total {
            return Ok(None);
        }
        self.next += 1;
        Ok(Some(self.next))
    }
}

/// Template hits by frame number.
#[derive(Default)]
struct Script {
    p1: Vec<(usize, RangeInclusive<u64>)>,
    p2: Vec<(usize, RangeInclusive<u64>)>,
    clock: Vec<RangeInclusive<u64>>,
    quit_at: Option<u64>,
    sampled: Vec<u64>,
    /// Templates offered beyond the two roster characters.
    extra_candidates: usize,
}

impl Script {
    fn both(mut self, range: RangeInclusive<u64>) -> Self {
        self.p1.push((RYU, range.clone()));
        self.p2.push((KEN, range));
        self
    }
}

impl FrameAnalyzer for Script {
    type Frame = u64;

    fn candidates(&self, _side: Side) -> usize {
        2 + self.extra_candidates
    }

    fn begin_frame(&mut self, frame: &u64) {
        self.sampled.push(*frame);
    }

    fn player_matches(&mut self, frame: &u64, side: Side, id: CharacterId) -> bool {
        let windows = match side {
            Side::Player1 => &self.p1,
            Side::Player2 => &self.p2,
        };
        windows
            .iter()
            .any(|(who, range)| *who == id.0 && range.contains(frame))
    }

    fn clock_matches(&mut self, frame: &u64) -> bool {
        self.clock.iter().any(|range| range.contains(frame))
    }

    fn end_frame(&mut self, _frame: u64, status: &SampleStatus) -> Result<Flow> {
        Ok(if self.quit_at == Some(status.frame) {
            Flow::Quit
        } else {
            Flow::Continue
        })
    }
}

#[derive(Default)]
struct Collect {
    records: Vec<MatchRecord>,
    lines: Vec<String>,
}

impl Reporter for Collect {
    fn match_completed(&mut self, record: &MatchRecord, roster: &Roster) -> Result<()> {
        let (p1, p2) = record.names(roster);
        self.lines.push(format!(
            "{}. {} - {} vs {} ({})",
            record.number,
            record.start_timestamp(),
            p1,
            p2,
            record.duration_timestamp()
        ));
        self.records.push(record.clone());
        Ok(())
    }

    fn finish(&mut self, _summary: &IndexSummary, _roster: &Roster) -> Result<()> {
        Ok(())
    }
}

fn settings(frame_skip: u32) -> RunSettings {
    RunSettings {
        frame_skip,
        detect_threshold_sec: 6.0,
        ..Default::default()
    }
}

fn run(settings: RunSettings, frames: &mut Frames, script: &mut Script) -> (IndexSummary, Collect) {
    let roster: Roster = ["Ryu", "Ken"].into_iter().collect();
    let indexer = Indexer::new(roster, settings).unwrap();
    let mut reporter = Collect::default();
    let summary = indexer.run(frames, script, &mut reporter).unwrap();
    (summary, reporter)
}

fn approx(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

#[test]
fn test_single_match_with_hysteresis_compensation() {
    let mut frames = Frames::new(1000, 60.0);
    let mut script = Script::default().both(100..=400);
    let (summary, reporter) = run(settings(0), &mut frames, &mut script);

    assert_eq!(summary.matches.len(), 1);
    let record = &summary.matches[0];
    assert_eq!(record.number, 1);
    assert!(approx(record.start_time, 100.0 / 60.0));
    // both locks drop at frame 762, the first miss with the counter past 360
    assert!(approx(record.end_time, 762.0 / 60.0 - 6.0));
    assert!(approx(record.duration, record.end_time - record.start_time));
    assert!(!record.flushed);

    assert_eq!(reporter.lines, vec!["1. 0:00:01 - Ryu vs Ken (0:00:05)"]);

    let roster: Roster = ["Ryu", "Ken"].into_iter().collect();
    let usage: Vec<_> = summary
        .usage
        .rows(&roster)
        .into_iter()
        .map(|row| (row.name, row.count))
        .collect();
    assert_eq!(usage, vec![("Ryu".to_string(), 1), ("Ken".to_string(), 1)]);
    assert_eq!(summary.end, RunEnd::EndOfStream);
    assert_eq!(summary.frames_read, 1000);
}

#[test]
fn test_tracked_clock_always_on_behaves_like_disabled_clock() {
    let mut frames = Frames::new(1000, 60.0);
    let mut script = Script {
        clock: vec![1..=1000],
        ..Default::default()
    }
    .both(100..=400);
    let settings = RunSettings {
        include_clock: true,
        ..settings(0)
    };
    let (summary, _) = run(settings, &mut frames, &mut script);

    assert_eq!(summary.matches.len(), 1);
    assert!(approx(summary.matches[0].start_time, 100.0 / 60.0));
}

#[test]
fn test_two_matches_separated_by_long_gap() {
    let mut frames = Frames::new(2000, 60.0);
    let mut script = Script::default().both(100..=400).both(1000..=1300);
    let (summary, reporter) = run(settings(0), &mut frames, &mut script);

    let numbers: Vec<u32> = summary.matches.iter().map(|m| m.number).collect();
    assert_eq!(numbers, vec![1, 2]);
    assert!(approx(summary.matches[1].start_time, 1000.0 / 60.0));
    assert_eq!(reporter.records.len(), 2);
    assert_eq!(summary.usage.total(), 2 * summary.matches.len() as u32);
}

#[test]
fn test_short_gap_is_bridged() {
    let mut frames = Frames::new(2000, 60.0);
    // 200 frames of absence is well inside the 360 frame grace period
    let mut script = Script::default().both(100..=400).both(601..=900);
    let (summary, _) = run(settings(0), &mut frames, &mut script);

    assert_eq!(summary.matches.len(), 1);
    assert!(approx(summary.matches[0].start_time, 100.0 / 60.0));
}

#[test]
fn test_single_frame_flicker_does_not_end_match() {
    let mut frames = Frames::new(1000, 60.0);
    let mut script = Script::default().both(100..=249).both(251..=400);
    let (summary, _) = run(settings(0), &mut frames, &mut script);

    assert_eq!(summary.matches.len(), 1);
}

#[test]
fn test_match_open_at_end_of_stream_is_flushed() {
    let mut frames = Frames::new(500, 60.0);
    let mut script = Script::default().both(100..=500);
    let (summary, _) = run(settings(0), &mut frames, &mut script);

    assert_eq!(summary.matches.len(), 1);
    let record = &summary.matches[0];
    assert!(record.flushed);
    assert!(approx(record.end_time, 500.0 / 60.0));
    assert!(approx(record.duration, 400.0 / 60.0));
    assert_eq!(summary.usage.total(), 2);
}

#[test]
fn test_clock_gates_match_start() {
    let mut frames = Frames::new(1000, 60.0);
    let mut script = Script::default().both(1..=1000);
    let settings = RunSettings {
        include_clock: true,
        flush_policy: FlushPolicy::AnyOpenSession,
        ..settings(0)
    };
    let (summary, reporter) = run(settings, &mut frames, &mut script);

    assert!(summary.matches.is_empty());
    assert!(reporter.records.is_empty());
    assert_eq!(summary.usage.total(), 0);
}

#[test]
fn test_frame_skip_keeps_timing() {
    let mut frames = Frames::new(2000, 30.0);
    let mut script = Script::default().both(300..=900);
    let (summary, _) = run(settings(30), &mut frames, &mut script);

    assert_eq!(summary.frames_sampled, 66);
    assert!(script.sampled.iter().all(|f| f % 30 == 0));

    assert_eq!(summary.matches.len(), 1);
    let record = &summary.matches[0];
    assert!(approx(record.start_time, 10.0));
    // the seventh empty sample (frame 1110) drops the lock
    assert!(approx(record.end_time, 1110.0 / 30.0 - 6.0));
    assert!(approx(record.duration, 21.0));
}

#[test]
fn test_quit_discards_match_in_progress() {
    let mut frames = Frames::new(1000, 60.0);
    let mut script = Script {
        quit_at: Some(300),
        ..Default::default()
    }
    .both(100..=1000);
    let (summary, _) = run(settings(0), &mut frames, &mut script);

    assert_eq!(summary.end, RunEnd::Quit);
    assert!(summary.matches.is_empty());
    assert_eq!(summary.frames_read, 300);
}

#[test]
fn test_read_error_flushes_like_end_of_stream() {
    let mut frames = Frames::new(1000, 60.0);
    frames.fail_at = Some(501);
    let mut script = Script::default().both(100..=1000);
    let (summary, _) = run(settings(0), &mut frames, &mut script);

    assert_eq!(summary.end, RunEnd::ReadError);
    assert_eq!(summary.matches.len(), 1);
    assert!(approx(summary.matches[0].end_time, 500.0 / 60.0));
}

#[test]
fn test_durations_never_negative() {
    let mut frames = Frames::new(5000, 60.0);
    let mut script = Script::default()
        .both(10..=20)
        .both(900..=905)
        .both(2000..=2600)
        .both(4000..=5000);
    let (summary, _) = run(settings(0), &mut frames, &mut script);

    assert_eq!(summary.matches.len(), 4);
    assert!(summary.matches.iter().all(|m| m.duration >= 0.0));
    assert_eq!(summary.usage.total(), 8);
}

#[test]
fn test_more_candidates_than_characters_is_rejected() {
    let mut frames = Frames::new(1000, 60.0);
    let mut script = Script {
        extra_candidates: 1,
        ..Script::default()
    };
    script.p1.push((2, 100..=500));
    script.p2.push((KEN, 100..=500));

    let roster: Roster = ["Ryu", "Ken"].into_iter().collect();
    let indexer = Indexer::new(roster, settings(0)).unwrap();
    let err = indexer
        .run(&mut frames, &mut script, &mut Collect::default())
        .unwrap_err();

    assert!(matches!(
        err.downcast_ref::<ConfigError>(),
        Some(ConfigError::CandidateCountMismatch {
            side: Side::Player1,
            candidates: 3,
            characters: 2,
        })
    ));
    assert!(script.sampled.is_empty());
}
