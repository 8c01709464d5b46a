//! Host-facing session lifecycle
//!
//! A session owns the game state and the audio facade, and exposes the only
//! entry points a shell needs: `start`, `reset`, `tick` (or the fixed-step
//! `advance`), and a game-over callback.

use std::fmt;
use std::time::Instant;

use serde::Serialize;

use crate::audio::{AudioManager, AudioSink, MusicTrack};
use crate::consts::{MAX_SUBSTEPS, SIM_DT};
use crate::error::{SimError, SimResult};
use crate::settings::Settings;
use crate::sim::{GameEvent, GameState, TickInput, tick};
use crate::tuning::Tuning;

/// Wall clock in milliseconds; only weapon pickup expiry reads it
pub trait Clock {
    fn now_ms(&self) -> u64;
}

/// Milliseconds since construction
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now_ms(&self) -> u64 {
        self.origin.elapsed().as_millis() as u64
    }
}

/// Final numbers of a finished run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct GameOverReport {
    pub score: u64,
    pub kills: u32,
    pub difficulty: u32,
    pub ticks: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    Idle,
    Running,
    Over,
}

type GameOverHook = Box<dyn FnMut(&GameOverReport)>;

pub struct Session {
    seed: u64,
    tuning: Tuning,
    settings: Settings,
    clock: Box<dyn Clock>,
    audio: AudioManager,
    state: Option<GameState>,
    phase: SessionPhase,
    accumulator: f32,
    on_game_over: Option<GameOverHook>,
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("seed", &self.seed)
            .field("phase", &self.phase)
            .field("audio", &self.audio)
            .finish_non_exhaustive()
    }
}

impl Session {
    pub fn new(seed: u64, tuning: Tuning, settings: Settings) -> Self {
        Self {
            seed,
            tuning,
            settings,
            clock: Box::new(SystemClock::new()),
            audio: AudioManager::default(),
            state: None,
            phase: SessionPhase::Idle,
            accumulator: 0.0,
            on_game_over: None,
        }
    }

    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    pub fn with_audio_sink(mut self, sink: impl AudioSink + 'static) -> Self {
        self.audio = AudioManager::new(Box::new(sink));
        self
    }

    /// Register the callback fired once per run when the player dies
    pub fn on_game_over(&mut self, hook: impl FnMut(&GameOverReport) + 'static) {
        self.on_game_over = Some(Box::new(hook));
    }

    /// Validate configuration and begin a run
    pub fn start(&mut self) -> SimResult<()> {
        if self.phase == SessionPhase::Running {
            return Err(SimError::Lifecycle {
                context: "start called while a run is in progress",
            });
        }
        self.settings.validate()?;
        let mut state = GameState::new(self.seed, self.tuning.clone())?;
        state.apply_settings(&self.settings);
        self.audio.apply_settings(&self.settings);
        self.audio.play_music(MusicTrack::Battle);

        self.state = Some(state);
        self.phase = SessionPhase::Running;
        self.accumulator = 0.0;
        log::info!("Session started (seed {})", self.seed);
        Ok(())
    }

    /// Discard the run and cancel any pending music loop
    pub fn reset(&mut self) {
        self.audio.stop_music();
        self.state = None;
        self.phase = SessionPhase::Idle;
        self.accumulator = 0.0;
        log::debug!("Session reset");
    }

    /// Run exactly one simulation tick. Returns false if no run is active.
    pub fn tick(&mut self, input: &TickInput) -> bool {
        if self.phase != SessionPhase::Running {
            return false;
        }
        let now = self.clock.now_ms();
        let Some(state) = self.state.as_mut() else {
            return false;
        };
        tick(state, input, &mut self.audio, now);

        if state.is_over() {
            let report = GameOverReport {
                score: state.score,
                kills: state.kills,
                difficulty: state.difficulty.level,
                ticks: state.time_ticks,
            };
            self.phase = SessionPhase::Over;
            if let Some(hook) = self.on_game_over.as_mut() {
                hook(&report);
            }
        }
        true
    }

    /// Fixed-step driver for variable frame times
    ///
    /// Accumulates `dt` seconds and runs up to `MAX_SUBSTEPS` ticks. The
    /// one-shot special input is consumed by the first substep. Returns the
    /// number of ticks run.
    pub fn advance(&mut self, dt: f32, input: &TickInput) -> u32 {
        self.accumulator += dt.min(0.1);
        let mut input = input.clone();
        let mut substeps = 0;
        while self.accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
            if !self.tick(&input) {
                self.accumulator = 0.0;
                break;
            }
            self.accumulator -= SIM_DT;
            substeps += 1;
            input.special = false;
        }
        substeps
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn state(&self) -> Option<&GameState> {
        self.state.as_ref()
    }

    pub fn state_mut(&mut self) -> Option<&mut GameState> {
        self.state.as_mut()
    }

    pub fn audio(&self) -> &AudioManager {
        &self.audio
    }

    /// Take gameplay events produced since the last call
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        self.state
            .as_mut()
            .map(GameState::drain_events)
            .unwrap_or_default()
    }
}
