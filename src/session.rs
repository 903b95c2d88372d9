//! Per-frame session driver
//!
//! Owns every piece of per-run state and runs one display frame at a time:
//! clock → motion sampling → entity simulation → effects. The host feeds
//! pointer positions and camera frames in, and gets `GameEvent`s back.

use glam::Vec2;

use crate::audio::BeatClock;
use crate::consts::*;
use crate::settings::Settings;
use crate::sim::clock::{SimClock, Step};
use crate::sim::effects::Effects;
use crate::sim::level::{
    CustomItem, InteractionMode, Language, LevelDescriptor, SpawnPool, VisualTheme, session_words,
};
use crate::sim::motion::{CameraStatus, Frame, InputError, InputMode, MotionSampler, MotionSource, Trail};
use crate::sim::state::{GameEvent, GamePhase, GameState, RunState, Target};
use crate::sim::tick::{LevelRules, TickInput, tick};

/// Everything fixed for the duration of a session
#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub level: LevelDescriptor,
    /// Empty → filler items spawn
    pub custom_items: Vec<CustomItem>,
    pub input_mode: InputMode,
    pub sensitivity: u32,
    pub language: Language,
    pub seed: u64,
    pub particle_cap: usize,
    pub damage_flash: bool,
}

impl SessionConfig {
    pub fn new(level: LevelDescriptor, custom_items: Vec<CustomItem>) -> Self {
        Self {
            level,
            custom_items,
            input_mode: InputMode::Pointer,
            sensitivity: DEFAULT_SENSITIVITY,
            language: Language::En,
            seed: 0,
            particle_cap: DEFAULT_PARTICLE_CAP,
            damage_flash: true,
        }
    }

    /// Apply the player's preferences
    pub fn with_settings(mut self, settings: &Settings) -> Self {
        self.input_mode = settings.input_mode;
        self.sensitivity = settings.sensitivity.clamp(MIN_SENSITIVITY, MAX_SENSITIVITY);
        self.language = settings.language;
        self.particle_cap = settings.max_particles();
        self.damage_flash = settings.effective_damage_flash();
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_input_mode(mut self, mode: InputMode) -> Self {
        self.input_mode = mode;
        self
    }
}

/// Host input for one display frame
#[derive(Debug, Clone, Default)]
pub struct FrameInput {
    /// Time since the previous frame
    pub frame_ms: f64,
    /// Latest downsampled camera frame, if a new one is ready
    pub camera_frame: Option<Frame>,
}

impl FrameInput {
    pub fn new(frame_ms: f64) -> Self {
        Self {
            frame_ms,
            camera_frame: None,
        }
    }
}

/// Read-only view handed to the presenter after the frame's mutation
#[derive(Debug, Clone, Copy)]
pub struct SessionView<'a> {
    pub targets: &'a [Target],
    pub run: &'a RunState,
    pub effects: &'a Effects,
    pub trail: &'a Trail,
    pub theme: VisualTheme,
    pub mode: InteractionMode,
    pub bg_timer: f32,
    pub phase: GamePhase,
    pub camera: Option<&'a CameraStatus>,
}

pub struct Session {
    config: SessionConfig,
    rules: LevelRules,
    words: Vec<String>,
    state: GameState,
    clock: SimClock,
    sampler: MotionSampler,
    effects: Effects,
    beat: BeatClock,
}

impl Session {
    /// Start a fresh run
    pub fn start(config: SessionConfig) -> Self {
        log::info!(
            "Session start: level '{}' ({:?}, {:?}), {} custom items, seed {}",
            config.level.label,
            config.level.interaction,
            config.input_mode,
            config.custom_items.len(),
            config.seed
        );
        let rules = LevelRules {
            pool: SpawnPool::new(&config.level, &config.custom_items),
            mode: config.level.interaction,
        };
        let words = session_words(&config.level, config.language);
        Self {
            rules,
            words,
            state: GameState::new(config.seed),
            clock: SimClock::new(),
            sampler: MotionSampler::new(config.input_mode, config.sensitivity),
            effects: Self::fresh_effects(&config),
            beat: BeatClock::new(config.level.tempo_bpm, config.level.music),
            config,
        }
    }

    fn fresh_effects(config: &SessionConfig) -> Effects {
        // Cosmetic stream is independent of the gameplay stream
        Effects::new(config.seed ^ 0x9E37_79B9_7F4A_7C15, config.particle_cap)
            .with_flash(config.damage_flash)
    }

    /// Throw away all per-run state and start over with the same config
    pub fn reset(&mut self) {
        log::info!("Session reset");
        let camera_failure = match self.sampler.source() {
            MotionSource::Camera(c) => match c.status() {
                CameraStatus::Failed(err) => Some(err.clone()),
                _ => None,
            },
            MotionSource::Pointer(_) => None,
        };

        self.state = GameState::new(self.config.seed);
        self.clock = SimClock::new();
        self.sampler = MotionSampler::new(self.config.input_mode, self.config.sensitivity);
        self.effects = Self::fresh_effects(&self.config);
        self.beat.stop();

        // A dead camera stays dead until the host reloads
        if let Some(err) = camera_failure {
            self.sampler.camera_failed(err);
        }
    }

    /// End the session (game over or back to menu)
    pub fn end(&mut self) {
        log::info!("Session end: score {}", self.state.run.score);
        self.beat.stop();
    }

    /// Pointer/touch position in game-space
    pub fn pointer_moved(&mut self, pos: Vec2) {
        self.sampler.pointer_moved(pos);
    }

    pub fn camera_failed(&mut self, err: InputError) {
        self.sampler.camera_failed(err);
    }

    /// Run one display frame. Returns the events raised by the simulation;
    /// empty while frozen.
    pub fn tick(&mut self, input: FrameInput) -> Vec<GameEvent> {
        let step = self.clock.tick(input.frame_ms);
        self.effects.decay_flash();

        if self.state.phase == GamePhase::GameOver {
            if step == Step::Run {
                // Let the last effects play out
                self.effects.update();
                self.sampler.trail_mut().decay();
            }
            return Vec::new();
        }

        // Movement keeps charging energy through hit-stop
        let sample = self.sampler.sample(input.camera_frame);
        self.state.run.add_energy(sample.motion_volume);
        if step == Step::Frozen {
            return Vec::new();
        }

        let tick_input = TickInput {
            contacts: self.sampler.contacts(),
            now_ms: self.clock.elapsed_ms(),
        };
        tick(&mut self.state, &self.rules, &tick_input);

        let events = self.state.drain_events();
        for event in &events {
            self.effects.apply(event, &self.words);
            match event {
                GameEvent::Resolved {
                    mode: InteractionMode::Destroy,
                    ..
                } => self.clock.freeze_for(HIT_STOP_DESTROY),
                GameEvent::HazardHit { .. } => self.clock.freeze_for(HIT_STOP_HAZARD),
                GameEvent::RunTerminated => self.end(),
                _ => {}
            }
        }

        self.effects.update();
        self.sampler.trail_mut().decay();
        events
    }

    /// Beat index if a kick drum is due now
    pub fn due_kick(&mut self) -> Option<u32> {
        if self.is_over() {
            return None;
        }
        let beat = self.beat.due(self.clock.elapsed_ms())?;
        self.beat.is_kick(beat).then_some(beat)
    }

    pub fn view(&self) -> SessionView<'_> {
        let camera = match self.sampler.source() {
            MotionSource::Camera(c) => Some(c.status()),
            MotionSource::Pointer(_) => None,
        };
        SessionView {
            targets: &self.state.targets,
            run: &self.state.run,
            effects: &self.effects,
            trail: self.sampler.trail(),
            theme: self.config.level.theme,
            mode: self.rules.mode,
            bg_timer: self.clock.bg_timer(),
            phase: self.state.phase,
            camera,
        }
    }

    pub fn run(&self) -> &RunState {
        &self.state.run
    }

    pub fn phase(&self) -> GamePhase {
        self.state.phase
    }

    pub fn is_over(&self) -> bool {
        self.state.phase == GamePhase::GameOver
    }

    pub fn beat_clock(&self) -> &BeatClock {
        &self.beat
    }
}
