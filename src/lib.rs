//! Mood Slicer - motion-controlled slicing game core
//!
//! Core modules:
//! - `sim`: Deterministic simulation (motion sampling, targets, collisions, effects)
//! - `session`: Per-frame driver that owns all per-run state
//! - `renderer`: Presentation adapter and WebGPU vertex pipeline
//! - `content`: Static keyword-to-icon lookup for custom items
//! - `settings`: Player preferences
//! - `audio`: Sound cues and tempo-driven beat clock

pub mod audio;
pub mod content;
pub mod renderer;
pub mod session;
pub mod settings;
pub mod sim;

pub use session::{FrameInput, Session, SessionConfig};
pub use settings::{QualityPreset, Settings};

use glam::Vec2;

/// Game configuration constants
///
/// All per-tick quantities assume one logical tick per display frame.
pub mod consts {
    /// Play-field size in game-space units
    pub const FIELD_WIDTH: f32 = 1024.0;
    pub const FIELD_HEIGHT: f32 = 768.0;

    /// Downward acceleration added to vy each tick
    pub const GRAVITY: f32 = 0.35;
    /// Nominal frame duration, used when the host has no timestamp
    pub const FRAME_MS: f64 = 1000.0 / 60.0;
    /// Background animation timer advance per unfrozen tick
    pub const BG_TIMER_STEP: f32 = 16.0;

    /// Lives at the start of a run
    pub const START_LIVES: u8 = 3;

    /// Contact-to-target hit radius
    pub const HIT_RADIUS: f32 = 60.0;
    /// Targets are only hit while inside (COLLISION_TOP, FIELD_HEIGHT)
    pub const COLLISION_TOP: f32 = -50.0;

    /// Pointer: interpolate an extra contact every this many units
    pub const POINTER_STEP: f32 = 20.0;
    /// Camera: downsample factor applied to the field size
    pub const CAMERA_DOWNSAMPLE: f32 = 0.1;
    /// Camera: changed pixels needed before any contact is emitted
    pub const MIN_MOTION_CLUSTER: usize = 6;
    /// Camera: centroid must move this far (squared) to lay a trail sample
    pub const CENTROID_MIN_DIST_SQ: f32 = 50.0;
    /// Camera: energy gained per changed pixel
    pub const ENERGY_PER_PIXEL: f32 = 0.05 / 1000.0;
    /// Default sensitivity slider value
    pub const DEFAULT_SENSITIVITY: u32 = 25;
    /// Sensitivity slider range
    pub const MIN_SENSITIVITY: u32 = 1;
    pub const MAX_SENSITIVITY: u32 = 100;

    /// Trail samples start at this life and lose TRAIL_DECAY per unfrozen tick
    pub const TRAIL_LIFE: f32 = 0.5;
    pub const TRAIL_DECAY: f32 = 0.1;
    pub const MAX_TRAIL: usize = 64;

    /// Spawn policy
    pub const SPAWN_INTERVAL: u32 = 40;
    pub const SPAWN_INTERVAL_FAST: u32 = 25;
    pub const SPAWN_SPEEDUP_SCORE: u64 = 300;
    /// Chance a due spawn actually happens
    pub const SPAWN_CHANCE: f32 = 0.8;
    pub const HAZARD_CHANCE: f32 = 0.12;
    pub const MAX_LIVE_TARGETS: usize = 6;
    pub const SPAWN_INSET: f32 = 150.0;
    pub const SPAWN_DEPTH: f32 = 120.0;
    /// Targets below FIELD_HEIGHT + CULL_MARGIN are removed
    pub const CULL_MARGIN: f32 = 150.0;
    /// Base points for custom items
    pub const CUSTOM_ITEM_POINTS: i32 = 50;

    /// Scoring
    pub const COMBO_BONUS: u64 = 5;
    pub const VENT_COMBO_THRESHOLD: u32 = 5;
    pub const VENT_MULTIPLIER: f32 = 1.5;
    pub const HAZARD_MOOD_PENALTY: i64 = 10;
    pub const HAZARD_COOLDOWN_MS: f64 = 1000.0;

    /// Hit-stop (frozen ticks)
    pub const HIT_STOP_HAZARD: u32 = 8;
    pub const HIT_STOP_DESTROY: u32 = 3;

    /// Screen shake amplitudes
    pub const SHAKE_HAZARD: f32 = 25.0;
    pub const SHAKE_DESTROY: f32 = 8.0;
    pub const SHAKE_CAPTURE: f32 = 3.0;
    pub const SHAKE_DECAY: f32 = 0.9;
    pub const SHAKE_CUTOFF: f32 = 0.5;

    /// Capture ascension
    pub const CAPTURE_RISE: f32 = -3.0;
    pub const CAPTURE_DRIFT: f32 = 7.0;
    pub const CAPTURE_GROWTH: f32 = 0.1;
    pub const CAPTURE_FADE: f32 = 0.1;

    /// Damage flash
    pub const FLASH_ALPHA: f32 = 0.6;
    pub const FLASH_DECAY: f32 = 0.05;

    /// Effects
    pub const DEFAULT_PARTICLE_CAP: usize = 150;
    pub const MAX_FLOATING_TEXTS: usize = 32;
    pub const MAX_DEBRIS: usize = 32;
    pub const DEBRIS_CULL_MARGIN: f32 = 200.0;
}

/// Center of the play field
#[inline]
pub fn field_center() -> Vec2 {
    Vec2::new(consts::FIELD_WIDTH / 2.0, consts::FIELD_HEIGHT / 2.0)
}

/// Map a screen-space coordinate on a display of `display` size into game-space
#[inline]
pub fn screen_to_field(screen: Vec2, display: Vec2) -> Vec2 {
    if display.x <= 0.0 || display.y <= 0.0 {
        return screen;
    }
    Vec2::new(
        screen.x * consts::FIELD_WIDTH / display.x,
        screen.y * consts::FIELD_HEIGHT / display.y,
    )
}
