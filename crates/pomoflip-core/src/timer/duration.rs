use serde::{Deserialize, Serialize};

use super::engine::TimerState;

/// The fixed catalog of session lengths.
///
/// The lever control cycles through these three positions; no other
/// durations exist. Serialized as the minute count so config files and
/// JSON snapshots read as `5` / `15` / `25`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "u64", try_from = "u64")]
pub enum SessionDuration {
    /// 5 minutes.
    Short,
    /// 15 minutes.
    Medium,
    /// 25 minutes.
    Long,
}

impl SessionDuration {
    pub const DEFAULT: SessionDuration = SessionDuration::Long;

    pub fn minutes(self) -> u64 {
        match self {
            SessionDuration::Short => 5,
            SessionDuration::Medium => 15,
            SessionDuration::Long => 25,
        }
    }

    pub fn as_secs(self) -> u64 {
        self.minutes().saturating_mul(60)
    }

    pub fn as_ms(self) -> u64 {
        self.as_secs().saturating_mul(1000)
    }

    /// Next lever position: 5 -> 15 -> 25 -> 5.
    pub fn next(self) -> SessionDuration {
        match self {
            SessionDuration::Short => SessionDuration::Medium,
            SessionDuration::Medium => SessionDuration::Long,
            SessionDuration::Long => SessionDuration::Short,
        }
    }

    pub fn from_minutes(minutes: u64) -> Option<SessionDuration> {
        match minutes {
            5 => Some(SessionDuration::Short),
            15 => Some(SessionDuration::Medium),
            25 => Some(SessionDuration::Long),
            _ => None,
        }
    }

    /// Host policy for the duration selector: disabled while running.
    ///
    /// The engine itself never interrupts an active session on a duration
    /// change, so this only governs whether the control is offered.
    pub fn selection_allowed(state: TimerState) -> bool {
        state != TimerState::Running
    }
}

impl Default for SessionDuration {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl From<SessionDuration> for u64 {
    fn from(d: SessionDuration) -> u64 {
        d.minutes()
    }
}

impl TryFrom<u64> for SessionDuration {
    type Error = String;

    fn try_from(minutes: u64) -> Result<Self, Self::Error> {
        SessionDuration::from_minutes(minutes)
            .ok_or_else(|| format!("invalid session duration: {minutes} minutes (allowed: 5, 15, 25)"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lever_cycles_through_all_positions() {
        let d = SessionDuration::Short;
        assert_eq!(d.next(), SessionDuration::Medium);
        assert_eq!(d.next().next(), SessionDuration::Long);
        assert_eq!(d.next().next().next(), SessionDuration::Short);
    }

    #[test]
    fn millisecond_conversion() {
        assert_eq!(SessionDuration::Short.as_ms(), 300_000);
        assert_eq!(SessionDuration::Medium.as_ms(), 900_000);
        assert_eq!(SessionDuration::Long.as_ms(), 1_500_000);
    }

    #[test]
    fn from_minutes_rejects_off_catalog_values() {
        assert_eq!(SessionDuration::from_minutes(25), Some(SessionDuration::Long));
        assert_eq!(SessionDuration::from_minutes(10), None);
        assert_eq!(SessionDuration::from_minutes(0), None);
    }

    #[test]
    fn selector_disabled_only_while_running() {
        assert!(SessionDuration::selection_allowed(TimerState::Idle));
        assert!(SessionDuration::selection_allowed(TimerState::Paused));
        assert!(!SessionDuration::selection_allowed(TimerState::Running));
    }

    #[test]
    fn serializes_as_minutes() {
        let json = serde_json::to_string(&SessionDuration::Medium).unwrap();
        assert_eq!(json, "15");
        let back: SessionDuration = serde_json::from_str("5").unwrap();
        assert_eq!(back, SessionDuration::Short);
        assert!(serde_json::from_str::<SessionDuration>("30").is_err());
    }
}
