//! Sky Ace headless host
//!
//! Runs one seeded session with the autopilot at the controls, then prints
//! the final HUD and the leaderboard as JSON.
//!
//! Usage: sky-ace [--seed N] [--ticks N] [--quality low|medium|high]
//!                [--tuning FILE] [--settings FILE]

use std::cell::{Cell, RefCell};
use std::process::ExitCode;
use std::rc::Rc;

use sky_ace::audio::LogSink;
use sky_ace::consts::SIM_DT;
use sky_ace::highscores::HighScoreEntry;
use sky_ace::sim::{GameEvent, TickInput, hud};
use sky_ace::{Clock, HighScores, QualityPreset, Session, Settings, SimResult, Tuning};

/// Simulated wall clock: advances one frame per tick so weapon timers
/// behave as they would at 60 Hz
#[derive(Clone, Default)]
struct FrameClock(Rc<Cell<u64>>);

impl FrameClock {
    fn step(&self) {
        self.0.set(self.0.get() + (SIM_DT * 1000.0) as u64);
    }
}

impl Clock for FrameClock {
    fn now_ms(&self) -> u64 {
        self.0.get()
    }
}

struct Args {
    seed: u64,
    ticks: u64,
    quality: Option<QualityPreset>,
    tuning: Option<String>,
    settings: Option<String>,
}

fn parse_args() -> Result<Args, String> {
    let mut args = Args {
        seed: 0x5EED,
        ticks: 60 * 60 * 5,
        quality: None,
        tuning: None,
        settings: None,
    };
    let mut it = std::env::args().skip(1);
    while let Some(flag) = it.next() {
        let mut value = || it.next().ok_or_else(|| format!("{} needs a value", flag));
        match flag.as_str() {
            "--seed" => args.seed = value()?.parse().map_err(|e| format!("--seed: {}", e))?,
            "--ticks" => args.ticks = value()?.parse().map_err(|e| format!("--ticks: {}", e))?,
            "--quality" => args.quality = Some(value()?.parse()?),
            "--tuning" => args.tuning = Some(value()?),
            "--settings" => args.settings = Some(value()?),
            other => return Err(format!("unknown argument '{}'", other)),
        }
    }
    Ok(args)
}

fn load_config(args: &Args) -> SimResult<(Tuning, Settings)> {
    let tuning = match args.tuning.as_deref().map(std::fs::read_to_string) {
        Some(Ok(text)) => Tuning::from_json(&text)?,
        Some(Err(err)) => {
            log::warn!("Could not read tuning file ({}), using defaults", err);
            Tuning::default()
        }
        None => Tuning::default(),
    };
    let mut settings = match args.settings.as_deref().map(std::fs::read_to_string) {
        Some(Ok(text)) => Settings::from_json(&text)?,
        Some(Err(err)) => {
            log::warn!("Could not read settings file ({}), using defaults", err);
            Settings::default()
        }
        None => Settings::default(),
    };
    if let Some(quality) = args.quality {
        settings.quality = quality;
    }
    Ok((tuning, settings))
}

fn run(args: Args) -> SimResult<()> {
    let (tuning, settings) = load_config(&args)?;
    let clock = FrameClock::default();
    let scores = Rc::new(RefCell::new(HighScores::new()));

    let mut session = Session::new(args.seed, tuning, settings)
        .with_clock(clock.clone())
        .with_audio_sink(LogSink);
    let table = scores.clone();
    session.on_game_over(move |report| {
        table.borrow_mut().record(HighScoreEntry {
            score: report.score,
            kills: report.kills,
            difficulty: report.difficulty,
            timestamp: report.ticks * (SIM_DT * 1000.0) as u64,
        });
    });
    session.start()?;

    let input = TickInput {
        autopilot: true,
        ..TickInput::default()
    };
    for _ in 0..args.ticks {
        clock.step();
        if !session.tick(&input) {
            break;
        }
        for event in session.drain_events() {
            match event {
                GameEvent::BossSpawned { tier } => log::info!("Boss tier {} on screen", tier),
                GameEvent::LevelUp { level } => log::info!("Pilot level {}", level),
                _ => {}
            }
        }
    }

    if let Some(state) = session.state() {
        println!("{}", serde_json::to_string_pretty(&hud(state)).unwrap_or_default());
    }
    println!("{}", scores.borrow().to_json());
    Ok(())
}

fn main() -> ExitCode {
    env_logger::init();
    log::info!("Sky Ace (headless) starting...");

    let args = match parse_args() {
        Ok(args) => args,
        Err(msg) => {
            eprintln!("{}", msg);
            eprintln!(
                "usage: sky-ace [--seed N] [--ticks N] [--quality low|medium|high] \
                 [--tuning FILE] [--settings FILE]"
            );
            return ExitCode::from(2);
        }
    };

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            log::error!("{}", err);
            ExitCode::FAILURE
        }
    }
}
