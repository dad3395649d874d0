//! Display timing policy.
//!
//! The flip-clock face has two timing contracts the renderer must honor:
//!
//! - **Digit stagger**: when a two-digit value changes, the upper half of
//!   the flip card updates immediately and the lower half follows 300ms
//!   later, like a mechanical flip display.
//! - **Reset acknowledgment**: a reset lights the reset control for
//!   exactly 600ms, independent of whatever the engine does next.
//!
//! Both are single-slot cancelable deadlines polled by the host with the
//! current time - no internal threads, same caller-driven model as the
//! engine's `tick()`. Re-arming a slot replaces the pending deadline, so a
//! stale callback can never flip a digit that has since changed again.

use crate::clock::{self, BarWidthTier};
use crate::events::Event;
use crate::timer::EngineSnapshot;

/// Delay before the lower half of a digit follows the upper half.
pub const DIGIT_STAGGER_MS: u64 = 300;

/// How long the reset control stays visually active after a reset.
pub const RESET_ACK_MS: u64 = 600;

#[derive(Debug, Clone, Copy)]
struct PendingFlip {
    value: u64,
    due_ms: u64,
}

/// A two-digit flip card with a staggered lower half.
#[derive(Debug, Clone)]
pub struct StaggeredDigit {
    upper: u64,
    lower: u64,
    pending: Option<PendingFlip>,
}

impl StaggeredDigit {
    pub fn new(value: u64) -> Self {
        Self {
            upper: value,
            lower: value,
            pending: None,
        }
    }

    /// Value shown on the upper half (always current).
    pub fn upper(&self) -> u64 {
        self.upper
    }

    /// Value shown on the lower half (lags by up to 300ms).
    pub fn lower(&self) -> u64 {
        self.lower
    }

    /// Feed the current value. A change updates the upper half immediately
    /// and schedules the lower half, canceling any pending flip from a
    /// previous change.
    pub fn set(&mut self, value: u64, now_ms: u64) {
        if value == self.upper {
            return;
        }
        self.upper = value;
        self.pending = Some(PendingFlip {
            value,
            due_ms: now_ms.saturating_add(DIGIT_STAGGER_MS),
        });
    }

    /// Fire the pending lower-half flip if its deadline has passed.
    /// Returns true if the lower half changed.
    pub fn poll(&mut self, now_ms: u64) -> bool {
        match self.pending {
            Some(flip) if now_ms >= flip.due_ms => {
                self.lower = flip.value;
                self.pending = None;
                true
            }
            _ => false,
        }
    }

    /// Both halves show the same value and nothing is pending.
    pub fn settled(&self) -> bool {
        self.pending.is_none()
    }
}

/// Transient "reset acknowledged" flag, auto-clearing after 600ms.
#[derive(Debug, Clone, Default)]
pub struct ResetAck {
    active_until_ms: Option<u64>,
}

impl ResetAck {
    /// Arm (or re-arm) the window. A new reset while one is pending
    /// replaces the deadline.
    pub fn arm(&mut self, now_ms: u64) {
        self.active_until_ms = Some(now_ms.saturating_add(RESET_ACK_MS));
    }

    /// Active strictly before the deadline, inactive at and after it,
    /// regardless of engine state changes in between.
    pub fn is_active(&self, now_ms: u64) -> bool {
        matches!(self.active_until_ms, Some(until) if now_ms < until)
    }

    /// Drop an expired deadline.
    pub fn poll(&mut self, now_ms: u64) {
        if let Some(until) = self.active_until_ms {
            if now_ms >= until {
                self.active_until_ms = None;
            }
        }
    }
}

/// Everything a renderer needs for one frame of the clock face.
#[derive(Debug, Clone)]
pub struct FlipClockDisplay {
    minutes: StaggeredDigit,
    seconds: StaggeredDigit,
    centis: u64,
    progress: f64,
    bar_tier: BarWidthTier,
    reset_ack: ResetAck,
}

impl FlipClockDisplay {
    pub fn new(snapshot: &EngineSnapshot) -> Self {
        let parts = clock::breakdown(snapshot.remaining_ms);
        Self {
            minutes: StaggeredDigit::new(parts.minutes),
            seconds: StaggeredDigit::new(parts.seconds),
            centis: parts.centis(),
            progress: snapshot.progress,
            bar_tier: BarWidthTier::from_duration_secs(snapshot.duration_min * 60),
            reset_ack: ResetAck::default(),
        }
    }

    /// Fold an engine snapshot into the display and fire due deadlines.
    pub fn observe(&mut self, snapshot: &EngineSnapshot, now_ms: u64) {
        let parts = clock::breakdown(snapshot.remaining_ms);
        self.minutes.set(parts.minutes, now_ms);
        self.seconds.set(parts.seconds, now_ms);
        self.minutes.poll(now_ms);
        self.seconds.poll(now_ms);
        self.centis = parts.centis();
        self.progress = snapshot.progress;
        self.bar_tier = BarWidthTier::from_duration_secs(snapshot.duration_min * 60);
        self.reset_ack.poll(now_ms);
    }

    /// React to a discrete engine event.
    pub fn handle_event(&mut self, event: &Event, now_ms: u64) {
        if let Event::TimerReset { .. } = event {
            self.reset_ack.arm(now_ms);
        }
    }

    pub fn minutes(&self) -> &StaggeredDigit {
        &self.minutes
    }

    pub fn seconds(&self) -> &StaggeredDigit {
        &self.seconds
    }

    pub fn centis(&self) -> u64 {
        self.centis
    }

    pub fn progress(&self) -> f64 {
        self.progress
    }

    pub fn bar_tier(&self) -> BarWidthTier {
        self.bar_tier
    }

    pub fn reset_active(&self, now_ms: u64) -> bool {
        self.reset_ack.is_active(now_ms)
    }

    /// Filled width of the progress bar in pixels.
    pub fn bar_filled_px(&self) -> f64 {
        f64::from(self.bar_tier.width_px()) * self.progress.min(1.0)
    }
}
