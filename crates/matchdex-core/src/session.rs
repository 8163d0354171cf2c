//! Match session controller
//!
//! Combines the debounced clock and player signals into match start and end
//! events, numbers completed matches and keeps the usage table.

use crate::roster::{CharacterId, Roster, UsageTable};
use crate::settings::FlushPolicy;
use crate::timecode;
use tracing::warn;

/// Debounced signals for one sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Presence {
    pub clock: bool,
    pub p1: Option<CharacterId>,
    pub p2: Option<CharacterId>,
}

impl Presence {
    pub fn players(&self) -> bool {
        self.p1.is_some() && self.p2.is_some()
    }

    pub fn all(&self) -> bool {
        self.clock && self.players()
    }
}

/// An open match: start time and the combatants seen at start.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MatchSession {
    pub start_time: f64,
    pub p1: CharacterId,
    pub p2: CharacterId,
}

/// A completed match.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchRecord {
    pub number: u32,
    pub start_time: f64,
    pub end_time: f64,
    pub duration: f64,
    pub p1: CharacterId,
    pub p2: CharacterId,
    /// Closed by end of stream rather than by both players leaving.
    pub flushed: bool,
}

impl MatchRecord {
    pub fn start_timestamp(&self) -> String {
        timecode::hms(self.start_time)
    }

    pub fn duration_timestamp(&self) -> String {
        timecode::hms(self.duration)
    }

    pub fn names<'a>(&self, roster: &'a Roster) -> (&'a str, &'a str) {
        (roster.name(self.p1), roster.name(self.p2))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    Started(MatchSession),
    /// A player was lost and re-acquired while the session stayed open; the
    /// start time and combatants were replaced.
    Restarted(MatchSession),
    Ended(MatchRecord),
}

#[derive(Debug, Clone)]
pub struct SessionController {
    first_pass: bool,
    session: Option<MatchSession>,
    match_count: u32,
    usage: UsageTable,
    detect_threshold_sec: f64,
    flush_policy: FlushPolicy,
}

impl SessionController {
    pub fn new(characters: usize, detect_threshold_sec: f64, flush_policy: FlushPolicy) -> Self {
        Self {
            first_pass: true,
            session: None,
            match_count: 0,
            usage: UsageTable::new(characters),
            detect_threshold_sec,
            flush_policy,
        }
    }

    /// Allow the start condition to fire again. Called when a player
    /// tracker drops its lock.
    pub fn rearm(&mut self) {
        self.first_pass = true;
    }

    /// Evaluate start and end conditions for one sample taken at `time`
    /// seconds into the video.
    pub fn step(&mut self, presence: &Presence, time: f64) -> Option<SessionEvent> {
        if let (true, true, Some(p1), Some(p2)) =
            (presence.clock, self.first_pass, presence.p1, presence.p2)
        {
            self.first_pass = false;
            let session = MatchSession {
                start_time: time,
                p1,
                p2,
            };
            let restarted = self.session.replace(session).is_some();
            return Some(if restarted {
                SessionEvent::Restarted(session)
            } else {
                SessionEvent::Started(session)
            });
        }

        if presence.p1.is_none() && presence.p2.is_none() {
            // presence is only dropped after the grace period expired, so the
            // last visible frame was roughly that long ago
            let end_time = time - self.detect_threshold_sec;
            return self.close(end_time, false).map(SessionEvent::Ended);
        }

        None
    }

    /// Close the open session at end of stream, if the flush policy allows.
    pub fn finish(&mut self, presence: &Presence, time: f64) -> Option<MatchRecord> {
        let allowed = match self.flush_policy {
            FlushPolicy::PlayersPresent => presence.players(),
            FlushPolicy::AllSignalsPresent => presence.all(),
            FlushPolicy::AnyOpenSession => true,
        };
        if !allowed {
            return None;
        }
        self.close(time, true)
    }

    /// Drop the open session without recording it.
    pub fn abandon(&mut self) -> Option<MatchSession> {
        self.first_pass = true;
        self.session.take()
    }

    fn close(&mut self, end_time: f64, flushed: bool) -> Option<MatchRecord> {
        let session = self.session.take()?;
        self.first_pass = true;
        self.match_count += 1;

        let mut duration = end_time - session.start_time;
        if duration < 0.0 {
            warn!(
                number = self.match_count,
                start = session.start_time,
                end = end_time,
                "negative match duration, clamping to zero"
            );
            duration = 0.0;
        }

        self.usage.record_match(session.p1, session.p2);

        Some(MatchRecord {
            number: self.match_count,
            start_time: session.start_time,
            end_time,
            duration,
            p1: session.p1,
            p2: session.p2,
            flushed,
        })
    }

    pub fn session(&self) -> Option<&MatchSession> {
        self.session.as_ref()
    }

    pub fn is_open(&self) -> bool {
        self.session.is_some()
    }

    pub fn first_pass(&self) -> bool {
        self.first_pass
    }

    pub fn match_count(&self) -> u32 {
        self.match_count
    }

    pub fn usage(&self) -> &UsageTable {
        &self.usage
    }

    pub fn into_usage(self) -> UsageTable {
        self.usage
    }
}
