//! Audio: sound cues and the tempo-driven beat track
//!
//! Sounds are synthesized with Web Audio oscillators, no asset files. The
//! beat scheduling (`BeatClock`) is plain arithmetic so it runs and tests
//! natively; only `AudioManager` touches the browser.

use crate::sim::level::MusicTheme;
use crate::sim::state::GameEvent;

/// Sound effect types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoundEffect {
    /// Target destroyed
    Slice,
    /// Target captured
    Collect,
    /// Hazard hit
    Bomb,
    /// Target launched
    Throw,
}

impl SoundEffect {
    /// Cue for a simulation event, if it has one
    pub fn for_event(event: &GameEvent) -> Option<Self> {
        use crate::sim::level::InteractionMode;

        match event {
            GameEvent::Resolved { mode, .. } => Some(match mode {
                InteractionMode::Destroy => SoundEffect::Slice,
                InteractionMode::Capture => SoundEffect::Collect,
            }),
            GameEvent::HazardHit { .. } => Some(SoundEffect::Bomb),
            GameEvent::Spawned { .. } => Some(SoundEffect::Throw),
            _ => None,
        }
    }
}

/// Beat scheduler for the level's tempo
///
/// Fires at most one beat per `due` call, so a stalled tab resumes on the
/// grid instead of bursting every missed beat.
#[derive(Debug, Clone)]
pub struct BeatClock {
    interval_ms: f64,
    next_ms: Option<f64>,
    beat: u32,
    theme: MusicTheme,
}

impl BeatClock {
    pub fn new(bpm: u32, theme: MusicTheme) -> Self {
        Self {
            interval_ms: 60_000.0 / bpm.max(1) as f64,
            next_ms: None,
            beat: 0,
            theme,
        }
    }

    /// Index of the beat due at `now_ms`, if any. The first call starts the
    /// track and fires immediately.
    pub fn due(&mut self, now_ms: f64) -> Option<u32> {
        let next = *self.next_ms.get_or_insert(now_ms);
        if now_ms < next {
            return None;
        }
        // Skip ahead over missed beats
        let missed = ((now_ms - next) / self.interval_ms).floor();
        self.next_ms = Some(next + (missed + 1.0) * self.interval_ms);

        let beat = self.beat;
        self.beat += 1;
        Some(beat)
    }

    /// Whether this beat carries a kick drum
    pub fn is_kick(&self, beat: u32) -> bool {
        match self.theme {
            MusicTheme::HeavyMetal => true,
            _ => beat % 2 == 0,
        }
    }

    pub fn theme(&self) -> MusicTheme {
        self.theme
    }

    /// Cancel pending beats and rewind
    pub fn stop(&mut self) {
        self.next_ms = None;
        self.beat = 0;
    }
}

#[cfg(target_arch = "wasm32")]
pub use web::AudioManager;

#[cfg(target_arch = "wasm32")]
mod web {
    use web_sys::{AudioContext, AudioNode, GainNode, OscillatorNode, OscillatorType};

    use super::SoundEffect;
    use crate::sim::level::MusicTheme;

    /// Audio manager for the game
    pub struct AudioManager {
        ctx: Option<AudioContext>,
        master_volume: f32,
        sfx_volume: f32,
        music_volume: f32,
        muted: bool,
    }

    impl Default for AudioManager {
        fn default() -> Self {
            Self::new()
        }
    }

    impl AudioManager {
        pub fn new() -> Self {
            // May fail outside a secure context
            let ctx = AudioContext::new().ok();
            if ctx.is_none() {
                log::warn!("Failed to create AudioContext - audio disabled");
            }
            Self {
                ctx,
                master_volume: 0.8,
                sfx_volume: 1.0,
                music_volume: 0.7,
                muted: false,
            }
        }

        /// Resume audio context (required after user gesture)
        pub fn resume(&self) {
            if let Some(ctx) = &self.ctx {
                let _ = ctx.resume();
            }
        }

        pub fn set_volumes(&mut self, master: f32, sfx: f32, music: f32) {
            self.master_volume = master.clamp(0.0, 1.0);
            self.sfx_volume = sfx.clamp(0.0, 1.0);
            self.music_volume = music.clamp(0.0, 1.0);
        }

        pub fn set_muted(&mut self, muted: bool) {
            self.muted = muted;
        }

        fn volume(&self, channel: f32) -> f32 {
            if self.muted {
                0.0
            } else {
                self.master_volume * channel
            }
        }

        fn context(&self, vol: f32) -> Option<&AudioContext> {
            if vol <= 0.0 {
                return None;
            }
            let ctx = self.ctx.as_ref()?;
            if ctx.state() == web_sys::AudioContextState::Suspended {
                let _ = ctx.resume();
            }
            Some(ctx)
        }

        /// Play a sound effect
        pub fn play(&self, effect: SoundEffect) {
            let vol = self.volume(self.sfx_volume);
            let Some(ctx) = self.context(vol) else { return };
            let Some((osc, gain)) = create_osc(ctx, ctx.destination().as_ref()) else {
                return;
            };
            let t = ctx.current_time();
            let freq = osc.frequency();
            let amp = gain.gain();

            let stop = match effect {
                SoundEffect::Slice => {
                    osc.set_type(OscillatorType::Sawtooth);
                    freq.set_value_at_time(800.0, t).ok();
                    freq.exponential_ramp_to_value_at_time(100.0, t + 0.1).ok();
                    amp.set_value_at_time(vol * 0.1, t).ok();
                    amp.exponential_ramp_to_value_at_time(0.001, t + 0.1).ok();
                    0.1
                }
                SoundEffect::Collect => {
                    osc.set_type(OscillatorType::Sine);
                    freq.set_value_at_time(500.0, t).ok();
                    freq.linear_ramp_to_value_at_time(1000.0, t + 0.1).ok();
                    amp.set_value_at_time(vol * 0.1, t).ok();
                    amp.linear_ramp_to_value_at_time(0.0, t + 0.2).ok();
                    0.2
                }
                SoundEffect::Bomb => {
                    osc.set_type(OscillatorType::Square);
                    freq.set_value_at_time(150.0, t).ok();
                    freq.exponential_ramp_to_value_at_time(50.0, t + 0.3).ok();
                    amp.set_value_at_time(vol * 0.3, t).ok();
                    amp.exponential_ramp_to_value_at_time(0.001, t + 0.3).ok();
                    0.3
                }
                SoundEffect::Throw => {
                    osc.set_type(OscillatorType::Triangle);
                    freq.set_value_at_time(400.0, t).ok();
                    freq.linear_ramp_to_value_at_time(300.0, t + 0.05).ok();
                    amp.set_value_at_time(vol * 0.05, t).ok();
                    amp.linear_ramp_to_value_at_time(0.0, t + 0.05).ok();
                    0.05
                }
            };

            osc.start_with_when(t).ok();
            osc.stop_with_when(t + stop).ok();
        }

        /// Kick drum for the beat track
        pub fn kick(&self, theme: MusicTheme) {
            let vol = self.volume(self.music_volume);
            let Some(ctx) = self.context(vol) else { return };
            let Ok(master) = ctx.create_gain() else { return };
            master.gain().set_value(vol * 0.2);
            if master.connect_with_audio_node(&ctx.destination()).is_err() {
                return;
            }
            let Some((osc, gain)) = create_osc(ctx, master.as_ref()) else {
                return;
            };
            let t = ctx.current_time();

            let (pitch, level) = match theme {
                MusicTheme::HeavyMetal => (150.0, 0.8),
                _ => {
                    osc.set_type(OscillatorType::Sine);
                    (100.0, 0.5)
                }
            };
            osc.frequency().set_value_at_time(pitch, t).ok();
            osc.frequency()
                .exponential_ramp_to_value_at_time(0.01, t + 0.2)
                .ok();
            gain.gain().set_value_at_time(level, t).ok();
            gain.gain()
                .exponential_ramp_to_value_at_time(0.001, t + 0.2)
                .ok();

            osc.start_with_when(t).ok();
            osc.stop_with_when(t + 0.2).ok();
        }
    }

    /// Oscillator → gain → `out`
    fn create_osc(ctx: &AudioContext, out: &AudioNode) -> Option<(OscillatorNode, GainNode)> {
        let osc = ctx.create_oscillator().ok()?;
        let gain = ctx.create_gain().ok()?;
        osc.connect_with_audio_node(&gain).ok()?;
        gain.connect_with_audio_node(out).ok()?;
        Some((osc, gain))
    }
}
