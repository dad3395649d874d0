mod driver;
mod duration;
mod engine;

pub use driver::{Command, TimerDriver, DEFAULT_POLL_INTERVAL_MS};
pub use duration::SessionDuration;
pub use engine::{EngineSnapshot, TimerEngine, TimerState, SESSIONS_PER_CYCLE};
