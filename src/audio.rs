//! Audio trigger facade
//!
//! The simulation never synthesizes sound. It asks the [`AudioManager`] to
//! play named effects, and the manager forwards volume-scaled cues to whatever
//! [`AudioSink`] the host plugged in. Each cue carries a small voice
//! description (base frequency, waveform, length) so a synth backend can
//! render it without a lookup table of its own.
//!
//! Background music is a frame-counted loop: the manager re-issues a `Loop`
//! cue whenever the current track's length has elapsed, and `stop_music`
//! cancels that pending loop synchronously.

use serde::Serialize;

/// Sound effect types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SoundEffect {
    /// Player fires a regular volley
    Shoot,
    /// Charge shot started accumulating
    ChargeStart,
    /// Charge shot released at full charge
    ChargedShot,
    /// Something blew up (enemy, boss, bomb impact)
    Explosion,
    /// Enemy or boss hit without being destroyed
    Hit,
    /// Player took damage
    PlayerHit,
    /// Pickup collected or augment level raised
    PowerUp,
    /// Boss incoming
    BossWarning,
    /// Player experience level up
    LevelUp,
    /// Screen-clearing special
    Lightning,
    GameOver,
}

/// Oscillator shape
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Waveform {
    Sine,
    Square,
    Sawtooth,
    Triangle,
}

/// Minimal synth description of an effect
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Voice {
    /// Starting frequency in Hz
    pub freq: f32,
    pub waveform: Waveform,
    /// Relative loudness before volume scaling
    pub gain: f32,
    /// Length in seconds
    pub duration: f32,
}

impl SoundEffect {
    /// Trigger name used by hosts and logs
    pub fn name(&self) -> &'static str {
        match self {
            SoundEffect::Shoot => "shoot",
            SoundEffect::ChargeStart => "charge",
            SoundEffect::ChargedShot => "charged-shot",
            SoundEffect::Explosion => "explosion",
            SoundEffect::Hit => "hit",
            SoundEffect::PlayerHit => "player-hit",
            SoundEffect::PowerUp => "power-up",
            SoundEffect::BossWarning => "boss-warning",
            SoundEffect::LevelUp => "level-up",
            SoundEffect::Lightning => "lightning",
            SoundEffect::GameOver => "game-over",
        }
    }

    pub fn voice(&self) -> Voice {
        let (freq, waveform, gain, duration) = match self {
            SoundEffect::Shoot => (800.0, Waveform::Square, 0.1, 0.1),
            SoundEffect::ChargeStart => (200.0, Waveform::Sine, 0.15, 1.5),
            SoundEffect::ChargedShot => (1200.0, Waveform::Sawtooth, 0.3, 0.3),
            SoundEffect::Explosion => (120.0, Waveform::Sawtooth, 0.5, 0.5),
            SoundEffect::Hit => (200.0, Waveform::Sawtooth, 0.2, 0.1),
            SoundEffect::PlayerHit => (300.0, Waveform::Triangle, 0.4, 0.3),
            SoundEffect::PowerUp => (523.0, Waveform::Sine, 0.2, 0.3),
            SoundEffect::BossWarning => (60.0, Waveform::Sawtooth, 0.4, 2.0),
            SoundEffect::LevelUp => (659.0, Waveform::Sine, 0.25, 0.4),
            SoundEffect::Lightning => (80.0, Waveform::Sawtooth, 0.6, 0.8),
            SoundEffect::GameOver => (392.0, Waveform::Square, 0.3, 0.8),
        };
        Voice {
            freq,
            waveform,
            gain,
            duration,
        }
    }
}

/// Looping background tracks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum MusicTrack {
    Battle,
    Boss,
}

impl MusicTrack {
    /// Loop length in simulation ticks
    pub fn loop_ticks(&self) -> u32 {
        match self {
            // 10.1 s melody
            MusicTrack::Battle => 606,
            // 6.4 s ostinato
            MusicTrack::Boss => 384,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum MusicCue {
    Start,
    /// Restart the current track from the top
    Loop,
    Stop,
}

/// One instruction to the audio backend
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum AudioCue {
    Effect {
        effect: SoundEffect,
        volume: f32,
        voice: Voice,
    },
    Music {
        track: MusicTrack,
        cue: MusicCue,
        volume: f32,
    },
}

/// Audio backend plugged in by the host
pub trait AudioSink {
    fn cue(&mut self, cue: &AudioCue);
}

/// Discards everything (headless runs, tests)
#[derive(Debug, Default)]
pub struct NullSink;

impl AudioSink for NullSink {
    fn cue(&mut self, _cue: &AudioCue) {}
}

/// Writes cues to the log at debug level
#[derive(Debug, Default)]
pub struct LogSink;

impl AudioSink for LogSink {
    fn cue(&mut self, cue: &AudioCue) {
        match cue {
            AudioCue::Effect { effect, volume, .. } => {
                log::debug!("sfx {} @ {:.2}", effect.name(), volume)
            }
            AudioCue::Music { track, cue, .. } => log::debug!("music {:?} {:?}", track, cue),
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct MusicLoop {
    track: MusicTrack,
    ticks_left: u32,
}

/// Audio manager for the game
pub struct AudioManager {
    sink: Box<dyn AudioSink>,
    master_volume: f32,
    sfx_volume: f32,
    music_volume: f32,
    muted: bool,
    music: Option<MusicLoop>,
    /// Cues issued since the last `begin_frame`
    frame: Vec<AudioCue>,
}

impl Default for AudioManager {
    fn default() -> Self {
        Self::new(Box::new(NullSink))
    }
}

impl std::fmt::Debug for AudioManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AudioManager")
            .field("muted", &self.muted)
            .field("music", &self.music)
            .finish()
    }
}

impl AudioManager {
    pub fn new(sink: Box<dyn AudioSink>) -> Self {
        Self {
            sink,
            master_volume: 0.8,
            sfx_volume: 1.0,
            music_volume: 0.5,
            muted: false,
            music: None,
            frame: Vec::new(),
        }
    }

    /// Apply volumes and mute state from player settings
    pub fn apply_settings(&mut self, settings: &crate::Settings) {
        self.set_master_volume(settings.master_volume);
        self.set_sfx_volume(settings.sfx_volume);
        self.set_music_volume(settings.music_volume);
        self.set_muted(settings.muted);
    }

    /// Set master volume (0.0 - 1.0)
    pub fn set_master_volume(&mut self, vol: f32) {
        self.master_volume = vol.clamp(0.0, 1.0);
    }

    /// Set SFX volume (0.0 - 1.0)
    pub fn set_sfx_volume(&mut self, vol: f32) {
        self.sfx_volume = vol.clamp(0.0, 1.0);
    }

    /// Set music volume (0.0 - 1.0)
    pub fn set_music_volume(&mut self, vol: f32) {
        self.music_volume = vol.clamp(0.0, 1.0);
    }

    /// Mute/unmute all audio
    pub fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
    }

    pub fn toggle_mute(&mut self) -> bool {
        self.muted = !self.muted;
        self.muted
    }

    /// Get effective volume
    fn effective_volume(&self) -> f32 {
        if self.muted {
            0.0
        } else {
            self.master_volume * self.sfx_volume
        }
    }

    fn effective_music_volume(&self) -> f32 {
        if self.muted {
            0.0
        } else {
            self.master_volume * self.music_volume
        }
    }

    /// Issue a cue: always recorded, only forwarded when audible
    fn emit(&mut self, cue: AudioCue, volume: f32) {
        self.frame.push(cue);
        if volume > 0.0 {
            self.sink.cue(&cue);
        }
    }

    /// Play a sound effect
    pub fn play(&mut self, effect: SoundEffect) {
        let volume = self.effective_volume();
        let voice = effect.voice();
        self.emit(
            AudioCue::Effect {
                effect,
                volume: volume * voice.gain,
                voice,
            },
            volume,
        );
    }

    /// Switch background music to `track` (no-op if already playing)
    pub fn play_music(&mut self, track: MusicTrack) {
        if self.music.map(|m| m.track) == Some(track) {
            return;
        }
        self.stop_music();
        let volume = self.effective_music_volume();
        self.emit(
            AudioCue::Music {
                track,
                cue: MusicCue::Start,
                volume,
            },
            volume,
        );
        self.music = Some(MusicLoop {
            track,
            ticks_left: track.loop_ticks(),
        });
    }

    /// Stop music and cancel the pending loop restart
    pub fn stop_music(&mut self) {
        if let Some(current) = self.music.take() {
            let volume = self.effective_music_volume();
            self.emit(
                AudioCue::Music {
                    track: current.track,
                    cue: MusicCue::Stop,
                    volume,
                },
                volume,
            );
        }
    }

    pub fn current_track(&self) -> Option<MusicTrack> {
        self.music.map(|m| m.track)
    }

    /// Advance the music loop by one tick
    pub fn update(&mut self) {
        let Some(mut current) = self.music else {
            return;
        };
        current.ticks_left = current.ticks_left.saturating_sub(1);
        if current.ticks_left == 0 {
            current.ticks_left = current.track.loop_ticks();
            let volume = self.effective_music_volume();
            self.emit(
                AudioCue::Music {
                    track: current.track,
                    cue: MusicCue::Loop,
                    volume,
                },
                volume,
            );
        }
        self.music = Some(current);
    }

    /// Start a new frame of cue recording
    pub fn begin_frame(&mut self) {
        self.frame.clear();
    }

    /// Cues issued since the last `begin_frame`
    pub fn frame_events(&self) -> &[AudioCue] {
        &self.frame
    }

    /// How many times `effect` was triggered this frame
    pub fn count(&self, effect: SoundEffect) -> usize {
        self.frame
            .iter()
            .filter(|c| matches!(c, AudioCue::Effect { effect: e, .. } if *e == effect))
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    struct Recorder(Rc<RefCell<Vec<AudioCue>>>);

    impl AudioSink for Recorder {
        fn cue(&mut self, cue: &AudioCue) {
            self.0.borrow_mut().push(*cue);
        }
    }

    #[test]
    fn test_play_forwards_to_sink() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut audio = AudioManager::new(Box::new(Recorder(log.clone())));
        audio.play(SoundEffect::Shoot);
        assert_eq!(log.borrow().len(), 1);
        assert_eq!(audio.count(SoundEffect::Shoot), 1);
    }

    #[test]
    fn test_muted_records_but_stays_silent() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut audio = AudioManager::new(Box::new(Recorder(log.clone())));
        audio.set_muted(true);
        audio.play(SoundEffect::Explosion);
        assert!(log.borrow().is_empty());
        assert_eq!(audio.count(SoundEffect::Explosion), 1);
        assert!(!audio.toggle_mute());
    }

    #[test]
    fn test_music_loops_on_schedule() {
        let mut audio = AudioManager::default();
        audio.play_music(MusicTrack::Boss);
        audio.begin_frame();
        for _ in 0..MusicTrack::Boss.loop_ticks() - 1 {
            audio.update();
        }
        assert!(audio.frame_events().is_empty());
        audio.update();
        assert!(matches!(
            audio.frame_events(),
            [AudioCue::Music {
                cue: MusicCue::Loop,
                ..
            }]
        ));
    }

    #[test]
    fn test_stop_cancels_pending_loop() {
        let mut audio = AudioManager::default();
        audio.play_music(MusicTrack::Battle);
        audio.stop_music();
        audio.begin_frame();
        for _ in 0..2000 {
            audio.update();
        }
        assert!(audio.frame_events().is_empty());
        assert_eq!(audio.current_track(), None);
    }

    #[test]
    fn test_switching_tracks_stops_previous() {
        let mut audio = AudioManager::default();
        audio.play_music(MusicTrack::Battle);
        audio.begin_frame();
        audio.play_music(MusicTrack::Boss);
        let cues: Vec<MusicCue> = audio
            .frame_events()
            .iter()
            .filter_map(|c| match c {
                AudioCue::Music { cue, .. } => Some(*cue),
                _ => None,
            })
            .collect();
        assert_eq!(cues, vec![MusicCue::Stop, MusicCue::Start]);
        // Same track again is a no-op
        audio.begin_frame();
        audio.play_music(MusicTrack::Boss);
        assert!(audio.frame_events().is_empty());
    }
}
