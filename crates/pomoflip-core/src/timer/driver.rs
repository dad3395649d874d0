//! Async tick driver.
//!
//! The engine itself is caller-driven; this driver is the cooperative task
//! that does the calling. It owns an engine and loops over a `select!` of
//! the command channel and a poll interval, so commands and ticks are
//! handled one at a time in the same task - never interleaved mid-update.
//!
//! Cancellation is deterministic: dropping the command sender ends the
//! loop, and no tick runs after `run()` returns. The engine is handed back
//! to the caller so it can be persisted.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::{self, MissedTickBehavior};

use super::duration::SessionDuration;
use super::engine::{TimerEngine, TimerState};
use crate::events::Event;

/// Poll granularity of the source UI (10ms, for a smooth millisecond
/// readout). Drift correction in the engine makes any value accurate.
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Start,
    Pause,
    Reset,
    SelectDuration(SessionDuration),
    CycleDuration,
}

/// Task owning a [`TimerEngine`], driving it at a fixed poll interval.
pub struct TimerDriver {
    engine: TimerEngine,
    commands: mpsc::Receiver<Command>,
    events: mpsc::Sender<Event>,
    poll_interval: Duration,
}

impl TimerDriver {
    /// Build a driver plus its command/event endpoints.
    pub fn new(
        engine: TimerEngine,
        poll_interval_ms: u64,
    ) -> (TimerDriver, mpsc::Sender<Command>, mpsc::Receiver<Event>) {
        let (cmd_tx, cmd_rx) = mpsc::channel(16);
        let (event_tx, event_rx) = mpsc::channel(64);
        let driver = TimerDriver {
            engine,
            commands: cmd_rx,
            events: event_tx,
            poll_interval: Duration::from_millis(poll_interval_ms.max(1)),
        };
        (driver, cmd_tx, event_rx)
    }

    /// Run until the command sender is dropped or the event receiver goes
    /// away. Returns the engine for the caller to keep or persist.
    pub async fn run(mut self) -> TimerEngine {
        let mut interval = time::interval(self.poll_interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                cmd = self.commands.recv() => {
                    let Some(cmd) = cmd else { break };
                    if let Some(event) = self.apply(cmd) {
                        if self.events.send(event).await.is_err() {
                            break;
                        }
                    }
                }
                _ = interval.tick() => {
                    if let Some(event) = self.engine.tick() {
                        if self.events.send(event).await.is_err() {
                            break;
                        }
                    }
                    // Stream snapshots only while counting down.
                    if self.engine.state() == TimerState::Running
                        && self.events.send(self.engine.snapshot_event()).await.is_err()
                    {
                        break;
                    }
                }
            }
        }

        self.engine
    }

    fn apply(&mut self, cmd: Command) -> Option<Event> {
        match cmd {
            Command::Start => self.engine.start(),
            Command::Pause => self.engine.pause(),
            Command::Reset => self.engine.reset(),
            Command::SelectDuration(d) => self.engine.select_duration(d),
            Command::CycleDuration => self.engine.cycle_duration(),
        }
    }
}
