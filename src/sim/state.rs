//! Game state and core simulation types
//!
//! Everything a run mutates lives here and is rebuilt from scratch on every
//! session start.

use std::collections::BTreeMap;

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::level::{Color, InteractionMode, ItemFace};
use crate::consts::*;

/// Current phase of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Targets are spawning and contacts resolve
    Playing,
    /// Lives exhausted
    GameOver,
}

/// What a target is; hazards penalize instead of reward
#[derive(Debug, Clone, PartialEq)]
pub enum TargetKind {
    Ordinary(ItemFace),
    Hazard(ItemFace),
}

impl TargetKind {
    pub fn face(&self) -> &ItemFace {
        match self {
            TargetKind::Ordinary(face) | TargetKind::Hazard(face) => face,
        }
    }

    pub fn is_hazard(&self) -> bool {
        matches!(self, TargetKind::Hazard(_))
    }
}

/// Lifecycle of a target. A target leaves `Active` at most once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TargetStatus {
    #[default]
    Active,
    Destroyed,
    Captured,
}

/// A falling item
#[derive(Debug, Clone)]
pub struct Target {
    pub id: u32,
    pub pos: Vec2,
    pub vel: Vec2,
    pub rotation: f32,
    /// Angular velocity (radians per tick)
    pub spin: f32,
    pub kind: TargetKind,
    pub status: TargetStatus,
    /// Only animated while captured
    pub scale: f32,
    pub opacity: f32,
}

impl Target {
    pub fn new(id: u32, kind: TargetKind, pos: Vec2, vel: Vec2, spin: f32) -> Self {
        Self {
            id,
            pos,
            vel,
            rotation: 0.0,
            spin,
            kind,
            status: TargetStatus::Active,
            scale: 1.0,
            opacity: 1.0,
        }
    }

    pub fn is_active(&self) -> bool {
        self.status == TargetStatus::Active
    }

    pub fn mark_destroyed(&mut self) {
        debug_assert!(self.is_active(), "target {} resolved twice", self.id);
        self.status = TargetStatus::Destroyed;
    }

    /// Capture: drop horizontal motion and start floating up
    pub fn mark_captured(&mut self) {
        debug_assert!(self.is_active(), "target {} resolved twice", self.id);
        self.status = TargetStatus::Captured;
        self.vel = Vec2::new(0.0, CAPTURE_RISE);
    }

    /// One tick of the capture ascension. Returns false once fully faded.
    pub fn ascend(&mut self) -> bool {
        self.pos += self.vel;
        self.pos.y -= CAPTURE_DRIFT;
        self.scale += CAPTURE_GROWTH;
        self.opacity -= CAPTURE_FADE;
        self.opacity > 0.0
    }

    /// Ballistic step: gravity, position, rotation
    pub fn integrate(&mut self) {
        self.pos += self.vel;
        self.vel.y += GRAVITY;
        self.rotation += self.spin;
    }

    /// Inside the band where contacts can hit
    pub fn in_hit_band(&self) -> bool {
        self.pos.y > COLLISION_TOP && self.pos.y < FIELD_HEIGHT
    }

    pub fn below_field(&self) -> bool {
        self.pos.y > FIELD_HEIGHT + CULL_MARGIN
    }
}

/// Per-kind resolution tally entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TallyEntry {
    pub count: u32,
    pub icon: String,
}

/// Counters for the current run
#[derive(Debug, Clone)]
pub struct RunState {
    /// Never decreases
    pub score: u64,
    pub combo: u32,
    pub max_combo: u32,
    pub lives: u8,
    /// Camera motion volume, scaled
    pub energy: f32,
    pub vent: u64,
    /// Happiness accumulator; hazards push it negative
    pub mood: i64,
    pub tally: BTreeMap<String, TallyEntry>,
    /// Run clock of the last hazard contact that counted
    pub last_hazard_ms: Option<f64>,
    pub terminated: bool,
}

impl Default for RunState {
    fn default() -> Self {
        Self {
            score: 0,
            combo: 0,
            max_combo: 0,
            lives: START_LIVES,
            energy: 0.0,
            vent: 0,
            mood: 0,
            tally: BTreeMap::new(),
            last_hazard_ms: None,
            terminated: false,
        }
    }
}

impl RunState {
    pub fn add_energy(&mut self, motion_volume: u32) {
        self.energy += motion_volume as f32 * ENERGY_PER_PIXEL;
    }

    pub fn record(&mut self, face: &ItemFace) {
        self.tally
            .entry(face.label.clone())
            .and_modify(|e| e.count += 1)
            .or_insert_with(|| TallyEntry {
                count: 1,
                icon: face.icon.clone(),
            });
    }

    /// Tally entries sorted by count, highest first
    pub fn top_tally(&self, n: usize) -> Vec<(&str, &TallyEntry)> {
        let mut entries: Vec<_> = self.tally.iter().map(|(k, v)| (k.as_str(), v)).collect();
        entries.sort_by(|a, b| b.1.count.cmp(&a.1.count));
        entries.truncate(n);
        entries
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            score: self.score,
            max_combo: self.max_combo,
            energy: self.energy.floor() as u64,
            vent_value: self.vent,
            mood_delta: self.mood,
            tally: self.tally.clone(),
        }
    }
}

/// Stats pushed to the host after every scoring contact
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsSnapshot {
    pub score: u64,
    pub max_combo: u32,
    pub energy: u64,
    pub vent_value: u64,
    pub mood_delta: i64,
    pub tally: BTreeMap<String, TallyEntry>,
}

/// Events produced by a tick, consumed by effects, audio and the host
#[derive(Debug, Clone, PartialEq)]
pub enum GameEvent {
    Spawned {
        id: u32,
        hazard: bool,
    },
    /// Ordinary target destroyed or captured
    Resolved {
        id: u32,
        pos: Vec2,
        vel: Vec2,
        rotation: f32,
        icon: String,
        color: Color,
        combo: u32,
        points: u64,
        mode: InteractionMode,
    },
    HazardHit {
        pos: Vec2,
    },
    ComboBroken,
    StatsUpdated(StatsSnapshot),
    /// Lives reached zero; raised once per run
    RunTerminated,
}

/// Complete simulation state for one run
#[derive(Debug, Clone)]
pub struct GameState {
    /// Run seed for reproducibility
    pub seed: u64,
    /// Gameplay RNG (spawning only)
    pub rng: Pcg32,
    pub run: RunState,
    /// Live targets in spawn order
    pub targets: Vec<Target>,
    pub spawn_timer: u32,
    /// Unfrozen ticks simulated
    pub time_ticks: u64,
    pub phase: GamePhase,
    /// Events raised since the last drain
    pub events: Vec<GameEvent>,
    next_id: u32,
}

impl GameState {
    /// Create a fresh run with the given seed
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            rng: Pcg32::seed_from_u64(seed),
            run: RunState::default(),
            targets: Vec::new(),
            spawn_timer: 0,
            time_ticks: 0,
            phase: GamePhase::Playing,
            events: Vec::new(),
            next_id: 1,
        }
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    pub fn spawn_target(&mut self, kind: TargetKind, pos: Vec2, vel: Vec2, spin: f32) -> u32 {
        let id = self.next_entity_id();
        let hazard = kind.is_hazard();
        self.targets.push(Target::new(id, kind, pos, vel, spin));
        self.events.push(GameEvent::Spawned { id, hazard });
        id
    }

    /// Targets that have not been resolved yet
    pub fn active_count(&self) -> usize {
        self.targets.iter().filter(|t| t.is_active()).count()
    }

    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn face(label: &str) -> ItemFace {
        ItemFace {
            label: label.to_string(),
            icon: "🧪".to_string(),
            color: Color::WHITE,
            points: 50,
        }
    }

    #[test]
    fn test_new_state_is_empty() {
        let state = GameState::new(7);
        assert!(state.targets.is_empty());
        assert_eq!(state.run.lives, START_LIVES);
        assert_eq!(state.run.score, 0);
        assert_eq!(state.phase, GamePhase::Playing);
    }

    #[test]
    fn test_entity_ids_increase() {
        let mut state = GameState::new(0);
        let a = state.next_entity_id();
        let b = state.next_entity_id();
        assert!(b > a);
    }

    #[test]
    fn test_capture_sets_upward_velocity() {
        let mut t = Target::new(
            1,
            TargetKind::Ordinary(face("a")),
            Vec2::new(100.0, 100.0),
            Vec2::new(-4.0, 12.0),
            0.05,
        );
        t.mark_captured();
        assert_eq!(t.vel, Vec2::new(0.0, CAPTURE_RISE));
        assert_eq!(t.status, TargetStatus::Captured);
    }

    #[test]
    fn test_ascension_fades_out() {
        let mut t = Target::new(
            1,
            TargetKind::Ordinary(face("a")),
            Vec2::new(100.0, 400.0),
            Vec2::ZERO,
            0.0,
        );
        t.mark_captured();
        let mut ticks = 0;
        while t.ascend() {
            ticks += 1;
            assert!(ticks < 20);
        }
        assert!(t.opacity <= 0.0);
        assert!(t.scale > 1.0);
        assert!(t.pos.y < 400.0);
    }

    #[test]
    fn test_tally_counts_by_label() {
        let mut run = RunState::default();
        run.record(&face("boss"));
        run.record(&face("boss"));
        run.record(&face("rent"));
        assert_eq!(run.tally["boss"].count, 2);
        let top = run.top_tally(1);
        assert_eq!(top[0].0, "boss");
    }

    #[test]
    fn test_snapshot_serializes_camel_case() {
        let mut run = RunState::default();
        run.score = 70;
        run.max_combo = 4;
        run.energy = 2.7;
        let json = serde_json::to_string(&run.snapshot()).unwrap();
        assert!(json.contains("\"maxCombo\":4"));
        assert!(json.contains("\"ventValue\":0"));
        assert!(json.contains("\"energy\":2"));
    }
}
