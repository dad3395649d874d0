//! # Pomoflip Core Library
//!
//! Core logic for Pomoflip, a flip-clock Pomodoro timer. All operations
//! are available through a standalone CLI binary; any GUI shell is a thin
//! rendering layer over this same library.
//!
//! ## Architecture
//!
//! - **Timer Engine**: A wall-clock-based state machine that requires the
//!   caller to periodically invoke `tick()` for progress updates
//! - **Clock Model**: Pure arithmetic turning remaining milliseconds into
//!   display values (digits, progress fraction, bar-width tier)
//! - **Display Timing**: Deadline-based contracts the renderer must honor
//!   (300ms digit stagger, 600ms reset acknowledgment)
//! - **Driver**: Cooperative tokio task that owns an engine and polls it
//!
//! ## Key Components
//!
//! - [`TimerEngine`]: Core timer state machine
//! - [`SessionDuration`]: The fixed 5/15/25-minute catalog
//! - [`FlipClockDisplay`]: Per-frame view for a rendering host
//! - [`TimerDriver`]: Async tick loop with deterministic cancellation
//! - [`Config`]: Application configuration management

pub mod clock;
pub mod config;
pub mod display;
pub mod error;
pub mod events;
pub mod timer;

pub use clock::{BarWidthTier, ClockParts};
pub use config::Config;
pub use display::{FlipClockDisplay, ResetAck, StaggeredDigit, DIGIT_STAGGER_MS, RESET_ACK_MS};
pub use error::{ConfigError, CoreError};
pub use events::{Cue, Event};
pub use timer::{
    Command, EngineSnapshot, SessionDuration, TimerDriver, TimerEngine, TimerState,
    DEFAULT_POLL_INTERVAL_MS, SESSIONS_PER_CYCLE,
};
