use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::timer::EngineSnapshot;

/// Every state change in the engine produces an Event.
/// The host polls or subscribes; sound/visual cues are derived from these.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    TimerStarted {
        duration_min: u64,
        remaining_ms: u64,
        at: DateTime<Utc>,
    },
    TimerPaused {
        remaining_ms: u64,
        at: DateTime<Utc>,
    },
    /// Countdown returned to the full selected duration. The display layer
    /// arms its transient acknowledgment window off this event.
    TimerReset {
        at: DateTime<Utc>,
    },
    DurationSelected {
        duration_min: u64,
        remaining_ms: u64,
        at: DateTime<Utc>,
    },
    /// A session ran to zero: the engine is back in `Idle` with a full
    /// countdown and the session counter bumped.
    SessionCompleted {
        completed_sessions: u32,
        duration_min: u64,
        at: DateTime<Utc>,
    },
    StateSnapshot {
        #[serde(flatten)]
        snapshot: EngineSnapshot,
        at: DateTime<Utc>,
    },
}

/// Sound cue the host should play for an event.
///
/// Playback is a host responsibility; the engine only signals which cue
/// applies (the source UI clicks on every control press and plays a
/// completion alert when a session finishes).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Cue {
    Click,
    Completion,
}

impl Event {
    pub fn cue(&self) -> Option<Cue> {
        match self {
            Event::TimerStarted { .. }
            | Event::TimerPaused { .. }
            | Event::TimerReset { .. }
            | Event::DurationSelected { .. } => Some(Cue::Click),
            Event::SessionCompleted { .. } => Some(Cue::Completion),
            Event::StateSnapshot { .. } => None,
        }
    }
}
