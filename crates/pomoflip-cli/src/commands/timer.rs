use std::io::Write as _;
use std::path::PathBuf;

use clap::Subcommand;
use pomoflip_core::{
    config, Command, Config, Cue, EngineSnapshot, Event, FlipClockDisplay, SessionDuration,
    TimerDriver, TimerEngine, SESSIONS_PER_CYCLE,
};

const STATE_FILE: &str = "state.json";

#[derive(Subcommand)]
pub enum TimerAction {
    /// Start or resume the countdown
    Start,
    /// Pause the countdown
    Pause,
    /// Reset to idle with a full countdown
    Reset,
    /// Select a session duration, or cycle the lever when omitted
    Select {
        /// Duration in minutes (5, 15 or 25)
        minutes: Option<u64>,
    },
    /// Print current timer state as JSON
    Status,
    /// Run a session in the foreground with a live flip display
    Run {
        /// Session duration in minutes (5, 15 or 25)
        #[arg(long)]
        minutes: Option<u64>,
    },
}

pub fn run(action: TimerAction) -> Result<(), Box<dyn std::error::Error>> {
    let cfg = Config::load_or_default();
    match action {
        TimerAction::Run { minutes } => run_live(minutes, &cfg),
        action => run_persisted(action, &cfg),
    }
}

fn state_path() -> Result<PathBuf, Box<dyn std::error::Error>> {
    Ok(config::data_dir()?.join(STATE_FILE))
}

fn load_engine(cfg: &Config) -> TimerEngine {
    if let Ok(path) = state_path() {
        if let Ok(json) = std::fs::read_to_string(path) {
            if let Ok(engine) = serde_json::from_str::<TimerEngine>(&json) {
                return engine;
            }
        }
    }
    TimerEngine::new(cfg.default_duration())
}

fn save_engine(engine: &TimerEngine) -> Result<(), Box<dyn std::error::Error>> {
    let json = serde_json::to_string(engine)?;
    std::fs::write(state_path()?, json)?;
    Ok(())
}

fn parse_duration(minutes: u64) -> Result<SessionDuration, Box<dyn std::error::Error>> {
    SessionDuration::from_minutes(minutes)
        .ok_or_else(|| format!("invalid duration: {minutes} minutes (allowed: 5, 15, 25)").into())
}

fn print_event(event: Option<Event>) -> Result<(), Box<dyn std::error::Error>> {
    if let Some(event) = event {
        println!("{}", serde_json::to_string_pretty(&event)?);
    }
    Ok(())
}

/// One-shot commands: rehydrate the engine from the state file, apply,
/// print, persist.
fn run_persisted(action: TimerAction, cfg: &Config) -> Result<(), Box<dyn std::error::Error>> {
    let mut engine = load_engine(cfg);
    match action {
        TimerAction::Start => {
            match engine.start() {
                Some(event) => print_event(Some(event))?,
                // Already running: just show where the countdown stands.
                None => println!("{}", serde_json::to_string_pretty(&engine.snapshot())?),
            }
        }
        TimerAction::Pause => match engine.pause() {
            Some(event) => print_event(Some(event))?,
            None => println!("{}", serde_json::to_string_pretty(&engine.snapshot())?),
        },
        TimerAction::Reset => print_event(engine.reset())?,
        TimerAction::Select { minutes } => {
            let event = match minutes {
                Some(m) => engine.select_duration(parse_duration(m)?),
                None => engine.cycle_duration(),
            };
            print_event(event)?;
        }
        TimerAction::Status => {
            // Tick to flush elapsed time before reporting.
            let completed = engine.tick();
            println!("{}", serde_json::to_string_pretty(&engine.snapshot())?);
            print_event(completed)?;
        }
        TimerAction::Run { .. } => unreachable!("handled by run()"),
    }

    save_engine(&engine)?;
    Ok(())
}

/// Drive a whole session through the async driver, rendering the flip
/// display to the terminal until the session completes.
fn run_live(minutes: Option<u64>, cfg: &Config) -> Result<(), Box<dyn std::error::Error>> {
    let duration = match minutes {
        Some(m) => parse_duration(m)?,
        None => cfg.default_duration(),
    };
    let engine = TimerEngine::new(duration);
    let mut display = FlipClockDisplay::new(&engine.snapshot());
    let sounds = cfg.sounds.enabled;
    let poll_ms = cfg.timer.tick_interval_ms;

    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(async move {
        let (driver, cmd_tx, mut events) = TimerDriver::new(engine, poll_ms);
        let task = tokio::spawn(driver.run());
        cmd_tx.send(Command::Start).await?;

        while let Some(event) = events.recv().await {
            if sounds && event.cue() == Some(Cue::Completion) {
                print!("\x07"); // Terminal bell stands in for the completion cue.
            }
            match &event {
                Event::StateSnapshot { snapshot, .. } => {
                    display.observe(snapshot, epoch_ms());
                    render(&display, snapshot)?;
                }
                Event::SessionCompleted {
                    completed_sessions, ..
                } => {
                    println!("\nsession complete ({completed_sessions} total)");
                    break;
                }
                _ => {}
            }
        }

        // Dropping the sender stops the driver; no tick fires afterwards.
        drop(cmd_tx);
        let engine = task.await?;
        save_engine(&engine)?;
        Ok::<(), Box<dyn std::error::Error>>(())
    })
}

fn render(
    display: &FlipClockDisplay,
    snapshot: &EngineSnapshot,
) -> Result<(), Box<dyn std::error::Error>> {
    // One terminal cell per 10px of bar width: 5 / 10 / 15 cells.
    let bar_cells = (display.bar_tier().width_px() / 10) as usize;
    let filled = ((display.bar_filled_px() / 10.0).round() as usize).min(bar_cells);
    let bar: String = "#".repeat(filled) + &"-".repeat(bar_cells - filled);

    let mut out = std::io::stdout().lock();
    write!(
        out,
        "\r{:02}:{:02}.{:02} [{bar}] {} of {} sessions",
        display.minutes().upper(),
        display.seconds().upper(),
        display.centis(),
        snapshot.completed_sessions % SESSIONS_PER_CYCLE,
        SESSIONS_PER_CYCLE,
    )?;
    out.flush()?;
    Ok(())
}

fn epoch_ms() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}
