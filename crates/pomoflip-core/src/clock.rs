//! Pure time arithmetic for the clock face.
//!
//! No side effects here: the engine owns the countdown, this module only
//! converts remaining milliseconds into display values.

use serde::{Deserialize, Serialize};

/// Remaining time broken into display components.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClockParts {
    pub minutes: u64,
    pub seconds: u64,
    pub milliseconds: u64,
}

impl ClockParts {
    /// Two-digit millisecond readout (".99" .. ".00" under the clock face).
    pub fn centis(&self) -> u64 {
        self.milliseconds / 10
    }
}

/// Split remaining milliseconds into minutes / seconds / milliseconds.
pub fn breakdown(remaining_ms: u64) -> ClockParts {
    ClockParts {
        minutes: remaining_ms / 60_000,
        seconds: (remaining_ms % 60_000) / 1_000,
        milliseconds: remaining_ms % 1_000,
    }
}

/// Elapsed fraction of a session, clamped into `[0, 1]`.
///
/// Returns 0.0 for a zero-length total.
pub fn progress_fraction(total_ms: u64, remaining_ms: u64) -> f64 {
    if total_ms == 0 {
        return 0.0;
    }
    let elapsed = total_ms.saturating_sub(remaining_ms) as f64;
    (elapsed / total_ms as f64).clamp(0.0, 1.0)
}

/// Progress-bar width category.
///
/// A step function keyed by duration, not continuous scaling: three fixed
/// visual widths (5 min = 50px, 15 min = 100px, 25 min = 150px).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BarWidthTier {
    Short,
    Medium,
    Long,
}

impl BarWidthTier {
    pub fn from_duration_secs(total_secs: u64) -> BarWidthTier {
        let minutes = total_secs / 60;
        if minutes <= 5 {
            BarWidthTier::Short
        } else if minutes <= 15 {
            BarWidthTier::Medium
        } else {
            BarWidthTier::Long
        }
    }

    pub fn width_px(self) -> u32 {
        match self {
            BarWidthTier::Short => 50,
            BarWidthTier::Medium => 100,
            BarWidthTier::Long => 150,
        }
    }
}
