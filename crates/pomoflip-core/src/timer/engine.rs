//! Timer engine implementation.
//!
//! The engine is a wall-clock-based state machine. It does not use internal
//! threads - the caller is responsible for calling `tick()` periodically.
//!
//! ## State Transitions
//!
//! ```text
//! Idle -> Running -> Paused -> Running -> ... -> Idle (session complete)
//! ```
//!
//! ## Usage
//!
//! ```ignore
//! let mut engine = TimerEngine::new(SessionDuration::Long);
//! engine.start();
//! // In a loop:
//! engine.tick(); // Returns Some(Event::SessionCompleted) at zero
//! ```
//!
//! Every command also has a `_at(now_ms)` variant taking an explicit
//! epoch-millisecond clock, so whole sessions can be simulated in tests.

use chrono::Utc;
use serde::{Deserialize, Serialize};

use super::duration::SessionDuration;
use crate::clock;
use crate::events::Event;

/// Sessions per display cycle ("n of 4 sessions" in the clock face).
pub const SESSIONS_PER_CYCLE: u32 = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimerState {
    Idle,
    Running,
    Paused,
}

/// Read-only view of the complete engine state at an instant.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineSnapshot {
    pub state: TimerState,
    pub duration_min: u64,
    pub remaining_ms: u64,
    /// Total of the session the countdown was filled from. Differs from
    /// `duration_min` only when the duration was changed mid-session.
    pub total_ms: u64,
    pub completed_sessions: u32,
    /// 0.0 .. 1.0 elapsed fraction of the current session.
    pub progress: f64,
}

/// Core timer engine.
///
/// Operates on wall-clock deltas -- no internal thread. The caller is
/// responsible for calling `tick()` periodically while running.
///
/// Serializable so a host can carry a countdown across process
/// invocations; timestamps are epoch milliseconds, so a rehydrated
/// running engine picks up exactly where the wall clock says it should.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimerEngine {
    duration: SessionDuration,
    state: TimerState,
    /// Remaining time in milliseconds for the current session.
    remaining_ms: u64,
    /// Total milliseconds of the session `remaining_ms` was filled from.
    total_ms: u64,
    completed_sessions: u32,
    /// Timestamp (ms since epoch) of the last tick while running.
    /// Used to compute elapsed time between ticks.
    #[serde(default)]
    last_tick_epoch_ms: Option<u64>,
}

impl TimerEngine {
    /// Create a new engine in `Idle` with a full countdown.
    pub fn new(duration: SessionDuration) -> Self {
        Self {
            duration,
            state: TimerState::Idle,
            remaining_ms: duration.as_ms(),
            total_ms: duration.as_ms(),
            completed_sessions: 0,
            last_tick_epoch_ms: None,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn state(&self) -> TimerState {
        self.state
    }

    pub fn duration(&self) -> SessionDuration {
        self.duration
    }

    pub fn remaining_ms(&self) -> u64 {
        self.remaining_ms
    }

    pub fn total_ms(&self) -> u64 {
        self.total_ms
    }

    pub fn completed_sessions(&self) -> u32 {
        self.completed_sessions
    }

    /// Position within the 4-session display cycle.
    pub fn completed_in_cycle(&self) -> u32 {
        self.completed_sessions % SESSIONS_PER_CYCLE
    }

    /// 0.0 .. 1.0 elapsed fraction of the current session.
    pub fn progress(&self) -> f64 {
        clock::progress_fraction(self.total_ms, self.remaining_ms)
    }

    pub fn snapshot(&self) -> EngineSnapshot {
        EngineSnapshot {
            state: self.state,
            duration_min: self.duration.minutes(),
            remaining_ms: self.remaining_ms,
            total_ms: self.total_ms,
            completed_sessions: self.completed_sessions,
            progress: self.progress(),
        }
    }

    /// Build a full state snapshot event.
    pub fn snapshot_event(&self) -> Event {
        Event::StateSnapshot {
            snapshot: self.snapshot(),
            at: Utc::now(),
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    pub fn start(&mut self) -> Option<Event> {
        self.start_at(now_ms())
    }

    /// Begin (or resume) the countdown.
    ///
    /// Re-stamps the tick timestamp so time spent idle or paused is never
    /// counted as elapsed. No-op while already running.
    pub fn start_at(&mut self, now_ms: u64) -> Option<Event> {
        match self.state {
            TimerState::Idle | TimerState::Paused => {
                self.state = TimerState::Running;
                self.last_tick_epoch_ms = Some(now_ms);
                Some(Event::TimerStarted {
                    duration_min: self.duration.minutes(),
                    remaining_ms: self.remaining_ms,
                    at: Utc::now(),
                })
            }
            TimerState::Running => None, // Already running.
        }
    }

    pub fn pause(&mut self) -> Option<Event> {
        self.pause_at(now_ms())
    }

    /// Suspend the countdown. No-op unless running.
    pub fn pause_at(&mut self, now_ms: u64) -> Option<Event> {
        if self.state != TimerState::Running {
            return None;
        }
        // Flush elapsed time first.
        self.flush_elapsed(now_ms);
        self.state = TimerState::Paused;
        self.last_tick_epoch_ms = None;
        Some(Event::TimerPaused {
            remaining_ms: self.remaining_ms,
            at: Utc::now(),
        })
    }

    /// Return to `Idle` with a full countdown, from any state.
    ///
    /// The display layer arms its 600ms acknowledgment window off the
    /// emitted event.
    pub fn reset(&mut self) -> Option<Event> {
        self.state = TimerState::Idle;
        self.last_tick_epoch_ms = None;
        self.remaining_ms = self.duration.as_ms();
        self.total_ms = self.duration.as_ms();
        Some(Event::TimerReset { at: Utc::now() })
    }

    /// Change the selected duration.
    ///
    /// While `Idle` the countdown refills immediately so the display
    /// reflects the new choice. While running or paused the in-progress
    /// countdown is left untouched; the new duration takes effect when the
    /// session completes or is reset.
    pub fn select_duration(&mut self, duration: SessionDuration) -> Option<Event> {
        self.duration = duration;
        if self.state == TimerState::Idle {
            self.remaining_ms = duration.as_ms();
            self.total_ms = duration.as_ms();
        }
        Some(Event::DurationSelected {
            duration_min: duration.minutes(),
            remaining_ms: self.remaining_ms,
            at: Utc::now(),
        })
    }

    /// Advance the lever one position (5 -> 15 -> 25 -> 5).
    pub fn cycle_duration(&mut self) -> Option<Event> {
        self.select_duration(self.duration.next())
    }

    pub fn tick(&mut self) -> Option<Event> {
        self.tick_at(now_ms())
    }

    /// Call periodically while running. Returns `Some(Event::SessionCompleted)`
    /// when the countdown reaches zero.
    ///
    /// Drift-corrected: subtracts the actual wall-clock delta since the
    /// previous tick, never a nominal step, so accuracy does not depend on
    /// the host's polling granularity.
    pub fn tick_at(&mut self, now_ms: u64) -> Option<Event> {
        if self.state != TimerState::Running {
            return None;
        }
        self.flush_elapsed(now_ms);
        if self.remaining_ms == 0 {
            self.completed_sessions += 1;
            self.state = TimerState::Idle;
            self.last_tick_epoch_ms = None;
            self.remaining_ms = self.duration.as_ms();
            self.total_ms = self.duration.as_ms();
            return Some(Event::SessionCompleted {
                completed_sessions: self.completed_sessions,
                duration_min: self.duration.minutes(),
                at: Utc::now(),
            });
        }
        None
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn flush_elapsed(&mut self, now_ms: u64) {
        if let Some(last) = self.last_tick_epoch_ms {
            let elapsed = now_ms.saturating_sub(last);
            self.remaining_ms = self.remaining_ms.saturating_sub(elapsed);
            self.last_tick_epoch_ms = Some(now_ms);
        }
    }
}

impl Default for TimerEngine {
    fn default() -> Self {
        Self::new(SessionDuration::DEFAULT)
    }
}

fn now_ms() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_idle_with_full_countdown() {
        let engine = TimerEngine::default();
        assert_eq!(engine.state(), TimerState::Idle);
        assert_eq!(engine.remaining_ms(), 25 * 60 * 1000);
        assert_eq!(engine.completed_sessions(), 0);
    }

    #[test]
    fn start_pause_start() {
        let mut engine = TimerEngine::default();
        assert!(engine.start_at(1_000).is_some());
        assert_eq!(engine.state(), TimerState::Running);

        // Second start is a no-op.
        assert!(engine.start_at(1_000).is_none());

        assert!(engine.pause_at(2_000).is_some());
        assert_eq!(engine.state(), TimerState::Paused);

        // Pause while paused is a no-op.
        assert!(engine.pause_at(2_000).is_none());

        assert!(engine.start_at(3_000).is_some());
        assert_eq!(engine.state(), TimerState::Running);
    }

    #[test]
    fn ticks_subtract_wall_clock_delta() {
        let mut engine = TimerEngine::new(SessionDuration::Long);
        engine.start_at(0);
        engine.tick_at(10);
        engine.tick_at(35); // Jittery schedule: deltas 10ms then 25ms.
        assert_eq!(engine.remaining_ms(), 1_500_000 - 35);
    }

    #[test]
    fn paused_interval_is_not_counted() {
        let mut engine = TimerEngine::new(SessionDuration::Short);
        engine.start_at(0);
        engine.tick_at(1_000);
        assert_eq!(engine.remaining_ms(), 299_000);

        engine.pause_at(2_000);
        assert_eq!(engine.remaining_ms(), 298_000);

        // A long pause, then resume: remaining unchanged across the gap.
        engine.start_at(60_000);
        engine.tick_at(61_000);
        assert_eq!(engine.remaining_ms(), 297_000);
    }

    #[test]
    fn full_session_completes_and_refills() {
        let mut engine = TimerEngine::new(SessionDuration::Short);
        engine.start_at(0);

        let mut completed = None;
        let mut now = 0;
        while completed.is_none() {
            now += 10;
            completed = engine.tick_at(now);
            assert!(now <= 300_010, "session never completed");
        }

        match completed {
            Some(Event::SessionCompleted {
                completed_sessions, ..
            }) => assert_eq!(completed_sessions, 1),
            other => panic!("expected SessionCompleted, got {other:?}"),
        }
        assert_eq!(engine.state(), TimerState::Idle);
        assert_eq!(engine.remaining_ms(), 300_000);
        assert_eq!(engine.completed_sessions(), 1);
    }

    #[test]
    fn overshooting_tick_clamps_at_zero_then_completes() {
        let mut engine = TimerEngine::new(SessionDuration::Short);
        engine.start_at(0);
        // Single huge delta past the end of the session.
        let event = engine.tick_at(400_000);
        assert!(matches!(event, Some(Event::SessionCompleted { .. })));
        assert_eq!(engine.remaining_ms(), 300_000);
    }

    #[test]
    fn select_while_idle_refills_immediately() {
        let mut engine = TimerEngine::default();
        for d in [
            SessionDuration::Short,
            SessionDuration::Medium,
            SessionDuration::Long,
        ] {
            engine.select_duration(d);
            assert_eq!(engine.remaining_ms(), d.as_ms());
            assert_eq!(engine.total_ms(), d.as_ms());
        }
    }

    #[test]
    fn select_while_running_leaves_countdown_untouched() {
        let mut engine = TimerEngine::new(SessionDuration::Long);
        engine.start_at(0);
        engine.tick_at(5_000);
        let before = engine.remaining_ms();

        engine.select_duration(SessionDuration::Short);
        assert_eq!(engine.remaining_ms(), before);
        assert_eq!(engine.total_ms(), SessionDuration::Long.as_ms());

        // The new choice applies once the session is reset.
        engine.reset();
        assert_eq!(engine.remaining_ms(), SessionDuration::Short.as_ms());
    }

    #[test]
    fn reset_from_any_state_goes_idle_and_refills() {
        let mut engine = TimerEngine::new(SessionDuration::Medium);
        engine.start_at(0);
        engine.tick_at(30_000);
        engine.reset();
        assert_eq!(engine.state(), TimerState::Idle);
        assert_eq!(engine.remaining_ms(), 900_000);

        engine.start_at(40_000);
        engine.pause_at(41_000);
        engine.reset();
        assert_eq!(engine.state(), TimerState::Idle);
        assert_eq!(engine.remaining_ms(), 900_000);
    }

    #[test]
    fn cycle_duration_follows_lever_order() {
        let mut engine = TimerEngine::new(SessionDuration::Short);
        engine.cycle_duration();
        assert_eq!(engine.duration(), SessionDuration::Medium);
        engine.cycle_duration();
        assert_eq!(engine.duration(), SessionDuration::Long);
        engine.cycle_duration();
        assert_eq!(engine.duration(), SessionDuration::Short);
    }

    #[test]
    fn completed_in_cycle_wraps_at_four() {
        let mut engine = TimerEngine::new(SessionDuration::Short);
        for i in 1..=5u32 {
            engine.start_at(0);
            engine.tick_at(300_000 * u64::from(i));
            assert_eq!(engine.completed_sessions(), i);
        }
        assert_eq!(engine.completed_in_cycle(), 1);
    }

    #[test]
    fn snapshot_reflects_progress() {
        let mut engine = TimerEngine::new(SessionDuration::Short);
        engine.start_at(0);
        engine.tick_at(150_000);
        let snap = engine.snapshot();
        assert_eq!(snap.state, TimerState::Running);
        assert_eq!(snap.remaining_ms, 150_000);
        assert!((snap.progress - 0.5).abs() < 1e-9);
    }

    #[test]
    fn engine_survives_serde_round_trip() {
        let mut engine = TimerEngine::new(SessionDuration::Medium);
        engine.start_at(0);
        engine.tick_at(1_000);

        let json = serde_json::to_string(&engine).unwrap();
        let mut back: TimerEngine = serde_json::from_str(&json).unwrap();
        assert_eq!(back.state(), TimerState::Running);
        assert_eq!(back.remaining_ms(), 899_000);

        back.tick_at(2_000);
        assert_eq!(back.remaining_ms(), 898_000);
    }
}
