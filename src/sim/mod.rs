//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must stay pure:
//! - One logical step per display frame, no wall-clock reads
//! - Seeded RNG only (gameplay and cosmetics use separate streams)
//! - Stable iteration order (spawn order)
//! - No rendering or platform dependencies

pub mod clock;
pub mod collision;
pub mod effects;
pub mod level;
pub mod motion;
pub mod state;
pub mod tick;

pub use clock::{SimClock, Step};
pub use collision::{Resolution, first_contact, resolve};
pub use effects::{Debris, Effects, FloatingText, Half, Particle};
pub use level::{
    Color, CustomItem, InteractionMode, ItemDef, ItemFace, Language, LevelDescriptor, Mood,
    MusicTheme, SpawnPool, VisualTheme,
};
pub use motion::{CameraStatus, Frame, InputError, InputMode, MotionSampler, Trail, TrailSample};
pub use state::{
    GameEvent, GamePhase, GameState, RunState, StatsSnapshot, TallyEntry, Target, TargetKind,
    TargetStatus,
};
pub use tick::{LevelRules, TickInput, tick};
