//! Presence trackers
//!
//! Each tracker turns a noisy per-sample "did the template match" signal into
//! a debounced presence state. Counters are measured in frames and advance by
//! `step` (one plus the frame skip) on every sample that does not cause a
//! transition, so the same threshold holds whatever the sampling stride.

use crate::roster::{CharacterId, Side};

/// Lock state of a player tracker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lock {
    Unlocked,
    Locked(CharacterId),
}

/// Outcome of one player tracker update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerEvent {
    /// Unlocked and no candidate matched.
    Searching,
    /// Unlocked and this candidate was the first to match.
    Acquired(CharacterId),
    /// Locked template matched again.
    Confirmed(CharacterId),
    /// Locked template missed but the grace period is still running.
    Missed { id: CharacterId, counter: u64 },
    /// Locked template missed for longer than the threshold.
    Lost(CharacterId),
}

/// Debounced presence of one player's character portrait.
#[derive(Debug, Clone)]
pub struct PlayerTracker {
    side: Side,
    lock: Lock,
    counter: u64,
    threshold: f64,
    step: u64,
}

impl PlayerTracker {
    /// `threshold` is the number of frames a locked template may go
    /// unmatched before presence is dropped.
    pub fn new(side: Side, threshold: f64, step: u64) -> Self {
        Self {
            side,
            lock: Lock::Unlocked,
            counter: 0,
            threshold,
            step,
        }
    }

    /// Advance by one sample.
    ///
    /// While unlocked, candidates `0..candidates` are tried in order through
    /// `matches` and the first hit wins. While locked only the locked
    /// template is tried.
    pub fn update<F>(&mut self, candidates: usize, mut matches: F) -> PlayerEvent
    where
        F: FnMut(CharacterId) -> bool,
    {
        match self.lock {
            Lock::Unlocked => match (0..candidates).map(CharacterId).find(|&id| matches(id)) {
                Some(id) => {
                    self.lock = Lock::Locked(id);
                    self.counter = 0;
                    PlayerEvent::Acquired(id)
                }
                None => PlayerEvent::Searching,
            },
            Lock::Locked(id) => {
                if matches(id) {
                    self.counter = 0;
                    PlayerEvent::Confirmed(id)
                } else if self.counter as f64 > self.threshold {
                    self.lock = Lock::Unlocked;
                    self.counter = 0;
                    PlayerEvent::Lost(id)
                } else {
                    self.counter += self.step;
                    PlayerEvent::Missed {
                        id,
                        counter: self.counter,
                    }
                }
            }
        }
    }

    pub fn side(&self) -> Side {
        self.side
    }

    pub fn lock(&self) -> Lock {
        self.lock
    }

    /// Locked identity; `Some` exactly when the player is present.
    pub fn locked(&self) -> Option<CharacterId> {
        match self.lock {
            Lock::Locked(id) => Some(id),
            Lock::Unlocked => None,
        }
    }

    pub fn is_present(&self) -> bool {
        self.locked().is_some()
    }

    pub fn counter(&self) -> u64 {
        self.counter
    }
}

/// Outcome of one clock tracker update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClockEvent {
    Unchanged,
    /// Debounced state flipped to present.
    On,
    /// Debounced state flipped to absent.
    Off,
}

/// Debounced presence of the match clock.
///
/// The counter runs on every sample that does not flip the state, including
/// samples that agree with it; a disagreeing sample flips the state only once
/// the counter is past the threshold.
#[derive(Debug, Clone)]
pub struct ClockTracker {
    present: bool,
    counter: u64,
    threshold: f64,
    step: u64,
    first_pass: bool,
    previously_on: bool,
}

impl ClockTracker {
    pub fn new(threshold: f64, step: u64) -> Self {
        Self {
            present: false,
            counter: 0,
            threshold,
            step,
            first_pass: true,
            previously_on: false,
        }
    }

    pub fn update(&mut self, matched: bool) -> ClockEvent {
        if matched != self.present && self.counter as f64 > self.threshold {
            self.present = matched;
            self.counter = 0;
        } else {
            self.counter += self.step;
        }

        if self.present && self.first_pass {
            self.first_pass = false;
            self.previously_on = true;
            ClockEvent::On
        } else if !self.present && self.previously_on {
            self.first_pass = true;
            self.previously_on = false;
            ClockEvent::Off
        } else {
            ClockEvent::Unchanged
        }
    }

    pub fn is_present(&self) -> bool {
        self.present
    }

    pub fn counter(&self) -> u64 {
        self.counter
    }
}

/// Clock presence as seen by the session controller.
#[derive(Debug, Clone)]
pub enum ClockSignal {
    /// Clock detection turned off; always reads as present.
    Disabled,
    Tracked(ClockTracker),
}

impl ClockSignal {
    pub fn is_present(&self) -> bool {
        match self {
            ClockSignal::Disabled => true,
            ClockSignal::Tracked(tracker) => tracker.is_present(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tracker(threshold: f64, step: u64) -> PlayerTracker {
        PlayerTracker::new(Side::Player1, threshold, step)
    }

    #[test]
    fn test_first_matching_candidate_wins() {
        let mut p1 = tracker(10.0, 1);
        let mut tried = Vec::new();
        let event = p1.update(4, |id| {
            tried.push(id.0);
            id.0 >= 1
        });

        assert_eq!(event, PlayerEvent::Acquired(CharacterId(1)));
        assert_eq!(tried, vec![0, 1]);
        assert_eq!(p1.locked(), Some(CharacterId(1)));
        assert_eq!(p1.counter(), 0);
    }

    #[test]
    fn test_locked_only_retests_locked_template() {
        let mut p1 = tracker(10.0, 1);
        p1.update(3, |id| id.0 == 2);

        let mut tried = Vec::new();
        let event = p1.update(3, |id| {
            tried.push(id.0);
            true
        });
        assert_eq!(event, PlayerEvent::Confirmed(CharacterId(2)));
        assert_eq!(tried, vec![2]);
    }

    #[test]
    fn test_no_candidates_stays_unlocked() {
        let mut p1 = tracker(10.0, 1);
        assert_eq!(p1.update(3, |_| false), PlayerEvent::Searching);
        assert_eq!(p1.update(0, |_| true), PlayerEvent::Searching);
        assert!(!p1.is_present());
    }

    #[test]
    fn test_isolated_miss_keeps_presence() {
        let mut p1 = tracker(360.0, 1);
        p1.update(1, |_| true);

        let event = p1.update(1, |_| false);
        assert_eq!(event, PlayerEvent::Missed { id: CharacterId(0), counter: 1 });
        assert!(p1.is_present());

        // a hit resets the grace period
        assert_eq!(p1.update(1, |_| true), PlayerEvent::Confirmed(CharacterId(0)));
        assert_eq!(p1.counter(), 0);
    }

    #[test]
    fn test_presence_lost_after_threshold_exceeded() {
        // 4 frames of grace at a stride of 1
        let mut p1 = tracker(4.0, 1);
        p1.update(1, |_| true);

        for expected in 1..=5 {
            assert_eq!(
                p1.update(1, |_| false),
                PlayerEvent::Missed { id: CharacterId(0), counter: expected }
            );
        }
        assert_eq!(p1.update(1, |_| false), PlayerEvent::Lost(CharacterId(0)));
        assert!(!p1.is_present());
        assert_eq!(p1.counter(), 0);
    }

    #[test]
    fn test_counter_advances_by_stride() {
        // 180 frames of grace sampled every 31 frames
        let mut p2 = PlayerTracker::new(Side::Player2, 180.0, 31);
        p2.update(1, |_| true);

        let mut misses = 0;
        loop {
            match p2.update(1, |_| false) {
                PlayerEvent::Missed { .. } => misses += 1,
                PlayerEvent::Lost(_) => break,
                other => panic!("unexpected {other:?}"),
            }
        }
        // 31 * 6 = 186 > 180 after the sixth miss
        assert_eq!(misses, 6);
    }

    #[test]
    fn test_reacquires_different_character_after_loss() {
        let mut p1 = tracker(0.0, 1);
        p1.update(2, |id| id.0 == 0);
        p1.update(2, |_| false);
        assert_eq!(p1.update(2, |_| false), PlayerEvent::Lost(CharacterId(0)));
        assert_eq!(p1.update(2, |id| id.0 == 1), PlayerEvent::Acquired(CharacterId(1)));
    }

    #[test]
    fn test_clock_needs_counter_past_threshold_to_flip() {
        let mut clock = ClockTracker::new(2.0, 1);

        // counter 0, 1, 2 are not past the threshold
        assert_eq!(clock.update(true), ClockEvent::Unchanged);
        assert_eq!(clock.update(true), ClockEvent::Unchanged);
        assert_eq!(clock.update(true), ClockEvent::Unchanged);
        assert!(!clock.is_present());

        assert_eq!(clock.update(true), ClockEvent::On);
        assert!(clock.is_present());
        assert_eq!(clock.counter(), 0);

        // a single miss right after the flip is absorbed
        assert_eq!(clock.update(false), ClockEvent::Unchanged);
        assert!(clock.is_present());
    }

    #[test]
    fn test_clock_turns_off_and_on_again() {
        let mut clock = ClockTracker::new(0.0, 1);
        assert_eq!(clock.update(true), ClockEvent::Unchanged);
        assert_eq!(clock.update(true), ClockEvent::On);
        assert_eq!(clock.update(false), ClockEvent::Unchanged);
        assert_eq!(clock.update(false), ClockEvent::Off);
        assert!(!clock.is_present());
        assert_eq!(clock.update(true), ClockEvent::Unchanged);
        assert_eq!(clock.update(true), ClockEvent::On);
    }

    #[test]
    fn test_disabled_clock_reads_present() {
        assert!(ClockSignal::Disabled.is_present());
        assert!(!ClockSignal::Tracked(ClockTracker::new(1.0, 1)).is_present());
    }
}
