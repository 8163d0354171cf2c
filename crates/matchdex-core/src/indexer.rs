//! Frame loop
//!
//! [`Indexer::run`] pulls frames from a [`FrameSource`], asks a
//! [`FrameAnalyzer`] whether templates match on every sampled frame, feeds
//! the answers through the presence trackers and the session controller, and
//! hands completed matches to a [`Reporter`]. Everything runs on the calling
//! thread, one frame at a time.

use crate::error::ConfigError;
use crate::roster::{CharacterId, Roster, Side, UsageTable};
use crate::session::{MatchRecord, Presence, SessionController, SessionEvent};
use crate::settings::{normalize_fps, RunSettings};
use crate::timecode::hms;
use crate::tracker::{ClockEvent, ClockSignal, ClockTracker, PlayerEvent, PlayerTracker};
use anyhow::Result;
use tracing::{debug, info, trace, warn};

/// Stream properties reported by the video source.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VideoInfo {
    pub fps: f64,
    pub frame_count: u64,
    pub width: i32,
    pub height: i32,
}

impl VideoInfo {
    pub fn length_secs(&self) -> f64 {
        if self.fps > 0.0 {
            self.frame_count as f64 / self.fps
        } else {
            0.0
        }
    }
}

/// Sequential frame supplier.
pub trait FrameSource {
    type Frame;

    fn info(&self) -> VideoInfo;

    /// Next decoded frame, `Ok(None)` at end of stream.
    fn next_frame(&mut self) -> Result<Option<Self::Frame>>;
}

/// Whether the frame loop should keep going.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

/// Tracker state after a sampled frame has been processed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SampleStatus {
    /// 1-based frame number.
    pub frame: u64,
    pub time: f64,
    pub clock: bool,
    pub p1: Option<CharacterId>,
    pub p2: Option<CharacterId>,
    pub in_match: bool,
}

/// Per-frame template detection.
///
/// A failed match is reported as `false`; it is never an error.
pub trait FrameAnalyzer {
    type Frame;

    /// Number of templates available for `side`.
    fn candidates(&self, side: Side) -> usize;

    /// Called once per sampled frame before any match query.
    fn begin_frame(&mut self, _frame: &Self::Frame) {}

    fn player_matches(&mut self, frame: &Self::Frame, side: Side, id: CharacterId) -> bool;

    fn clock_matches(&mut self, frame: &Self::Frame) -> bool;

    /// Called once per sampled frame after all state has been updated.
    fn end_frame(&mut self, _frame: Self::Frame, _status: &SampleStatus) -> Result<Flow> {
        Ok(Flow::Continue)
    }
}

/// Receives completed matches as they are found, and the final summary.
pub trait Reporter {
    fn match_completed(&mut self, record: &MatchRecord, roster: &Roster) -> Result<()>;

    fn finish(&mut self, summary: &IndexSummary, roster: &Roster) -> Result<()>;
}

/// Decides which frame numbers are analyzed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sampler {
    frame_skip: u32,
}

impl Sampler {
    pub fn new(frame_skip: u32) -> Self {
        Self { frame_skip }
    }

    /// `frame` is 1-based.
    pub fn is_sampled(&self, frame: u64) -> bool {
        self.frame_skip == 0 || frame % u64::from(self.frame_skip) == 0
    }
}

/// How the frame loop stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunEnd {
    EndOfStream,
    /// A frame failed to decode; handled like end of stream.
    ReadError,
    /// The preview asked to stop. Any open session was discarded.
    Quit,
}

#[derive(Debug, Clone)]
pub struct IndexSummary {
    pub matches: Vec<MatchRecord>,
    pub usage: UsageTable,
    pub frames_read: u64,
    pub frames_sampled: u64,
    pub end: RunEnd,
}

pub struct Indexer {
    roster: Roster,
    settings: RunSettings,
    sampler: Sampler,
}

impl Indexer {
    pub fn new(roster: Roster, settings: RunSettings) -> Result<Self, ConfigError> {
        settings.validate()?;
        let sampler = Sampler::new(settings.frame_skip);
        Ok(Self {
            roster,
            settings,
            sampler,
        })
    }

    pub fn roster(&self) -> &Roster {
        &self.roster
    }

    pub fn settings(&self) -> &RunSettings {
        &self.settings
    }

    /// Index one video from start to end of stream.
    pub fn run<S, A, R>(
        &self,
        source: &mut S,
        analyzer: &mut A,
        reporter: &mut R,
    ) -> Result<IndexSummary>
    where
        S: FrameSource,
        A: FrameAnalyzer<Frame = S::Frame>,
        R: Reporter + ?Sized,
    {
        let fps = normalize_fps(source.info().fps)?;
        for side in [Side::Player1, Side::Player2] {
            let candidates = analyzer.candidates(side);
            if candidates > self.roster.len() {
                return Err(ConfigError::CandidateCountMismatch {
                    side,
                    candidates,
                    characters: self.roster.len(),
                }
                .into());
            }
        }
        let thresholds = self.settings.thresholds(fps);
        debug!(?thresholds, fps, "hysteresis thresholds in frames");

        let mut p1 = PlayerTracker::new(Side::Player1, thresholds.detect, thresholds.step);
        let mut p2 = PlayerTracker::new(Side::Player2, thresholds.detect, thresholds.step);
        let mut clock = if self.settings.include_clock {
            ClockSignal::Tracked(ClockTracker::new(thresholds.clock, thresholds.step))
        } else {
            ClockSignal::Disabled
        };
        let mut controller = SessionController::new(
            self.roster.len(),
            self.settings.detect_threshold_sec,
            self.settings.flush_policy,
        );

        let mut matches = Vec::new();
        let mut frame_count = 0_u64;
        let mut sampled = 0_u64;

        let end = loop {
            let frame = match source.next_frame() {
                Ok(Some(frame)) => frame,
                Ok(None) => break RunEnd::EndOfStream,
                Err(err) => {
                    warn!(frame = frame_count + 1, "failed to read frame, stopping: {err:#}");
                    break RunEnd::ReadError;
                }
            };
            frame_count += 1;

            if !self.sampler.is_sampled(frame_count) {
                continue;
            }
            sampled += 1;
            let time = frame_count as f64 / fps;
            analyzer.begin_frame(&frame);

            if let ClockSignal::Tracked(tracker) = &mut clock {
                let matched = analyzer.clock_matches(&frame);
                match tracker.update(matched) {
                    ClockEvent::On => debug!(at = %hms(time), "clock on"),
                    ClockEvent::Off => debug!(at = %hms(time), "clock off"),
                    ClockEvent::Unchanged => {}
                }
            }

            for tracker in [&mut p1, &mut p2] {
                let side = tracker.side();
                let candidates = analyzer.candidates(side);
                let event = tracker.update(candidates, |id| analyzer.player_matches(&frame, side, id));
                match event {
                    PlayerEvent::Acquired(id) => {
                        debug!(%side, character = self.roster.name(id), at = %hms(time), "character acquired")
                    }
                    PlayerEvent::Lost(id) => {
                        debug!(%side, character = self.roster.name(id), at = %hms(time), "character lost");
                        controller.rearm();
                    }
                    PlayerEvent::Missed { id, counter } => {
                        trace!(%side, character = self.roster.name(id), counter, "locked template missed")
                    }
                    PlayerEvent::Searching | PlayerEvent::Confirmed(_) => {}
                }
            }

            let presence = Presence {
                clock: clock.is_present(),
                p1: p1.locked(),
                p2: p2.locked(),
            };
            match controller.step(&presence, time) {
                Some(SessionEvent::Started(session)) => info!(
                    at = %hms(session.start_time),
                    p1 = self.roster.name(session.p1),
                    p2 = self.roster.name(session.p2),
                    "match started"
                ),
                Some(SessionEvent::Restarted(session)) => info!(
                    at = %hms(session.start_time),
                    p1 = self.roster.name(session.p1),
                    p2 = self.roster.name(session.p2),
                    "match restarted"
                ),
                Some(SessionEvent::Ended(record)) => {
                    self.complete(record, reporter, &mut matches)?;
                }
                None => {}
            }

            let status = SampleStatus {
                frame: frame_count,
                time,
                clock: presence.clock,
                p1: presence.p1,
                p2: presence.p2,
                in_match: controller.is_open(),
            };
            if analyzer.end_frame(frame, &status)? == Flow::Quit {
                if let Some(session) = controller.abandon() {
                    info!(started = %hms(session.start_time), "quit requested, discarding match in progress");
                }
                break RunEnd::Quit;
            }
        };

        if end != RunEnd::Quit {
            let presence = Presence {
                clock: clock.is_present(),
                p1: p1.locked(),
                p2: p2.locked(),
            };
            if let Some(record) = controller.finish(&presence, frame_count as f64 / fps) {
                self.complete(record, reporter, &mut matches)?;
            }
        }

        Ok(IndexSummary {
            matches,
            usage: controller.into_usage(),
            frames_read: frame_count,
            frames_sampled: sampled,
            end,
        })
    }

    fn complete<R: Reporter + ?Sized>(
        &self,
        record: MatchRecord,
        reporter: &mut R,
        matches: &mut Vec<MatchRecord>,
    ) -> Result<()> {
        let (p1, p2) = record.names(&self.roster);
        info!(
            number = record.number,
            start = %record.start_timestamp(),
            duration = %record.duration_timestamp(),
            flushed = record.flushed,
            "{p1} vs {p2}"
        );
        reporter.match_completed(&record, &self.roster)?;
        matches.push(record);
        Ok(())
    }
}
