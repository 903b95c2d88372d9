//! Entity simulator
//!
//! One call per unfrozen tick: spawn policy, integration, capture ascension,
//! culling and collision dispatch. Events are queued on the state.

use glam::Vec2;
use rand::Rng;

use super::collision::{Resolution, first_contact, resolve};
use super::level::{InteractionMode, SpawnPool};
use super::state::{GameEvent, GamePhase, GameState, TargetKind, TargetStatus};
use crate::consts::*;

/// Level-derived rules, fixed for a session
#[derive(Debug, Clone)]
pub struct LevelRules {
    pub pool: SpawnPool,
    pub mode: InteractionMode,
}

/// Input for a single tick
#[derive(Debug, Clone, Copy, Default)]
pub struct TickInput<'a> {
    /// This tick's contact points in game-space
    pub contacts: &'a [Vec2],
    /// Run clock, for the hazard cooldown
    pub now_ms: f64,
}

/// Advance the simulation by one tick
pub fn tick(state: &mut GameState, rules: &LevelRules, input: &TickInput) {
    if state.phase == GamePhase::GameOver {
        return;
    }
    state.time_ticks += 1;

    spawn(state, &rules.pool);

    // Reverse so removals don't disturb unvisited indices
    for i in (0..state.targets.len()).rev() {
        let target = &mut state.targets[i];
        match target.status {
            TargetStatus::Captured => {
                if !target.ascend() {
                    state.targets.remove(i);
                }
                continue;
            }
            TargetStatus::Destroyed => {
                state.targets.remove(i);
                continue;
            }
            TargetStatus::Active => {}
        }

        target.integrate();

        if target.below_field() {
            if matches!(target.kind, TargetKind::Ordinary(_)) {
                state.run.combo = 0;
                state.events.push(GameEvent::ComboBroken);
            }
            state.targets.remove(i);
            continue;
        }

        if !target.in_hit_band() || first_contact(target.pos, input.contacts).is_none() {
            continue;
        }
        let resolution = resolve(
            target,
            &mut state.run,
            rules.mode,
            input.now_ms,
            &mut state.events,
        );
        if resolution == Resolution::Remove {
            state.targets.remove(i);
        }
    }

    if state.run.terminated {
        state.phase = GamePhase::GameOver;
    }
}

/// Spawn policy: timer, live cap, then a probability roll
fn spawn(state: &mut GameState, pool: &SpawnPool) {
    state.spawn_timer += 1;
    let interval = if state.run.score > SPAWN_SPEEDUP_SCORE {
        SPAWN_INTERVAL_FAST
    } else {
        SPAWN_INTERVAL
    };
    if state.spawn_timer <= interval
        || state.targets.len() >= MAX_LIVE_TARGETS
        || state.rng.random::<f32>() >= SPAWN_CHANCE
    {
        return;
    }
    state.spawn_timer = 0;

    let rng = &mut state.rng;
    let kind = if rng.random::<f32>() < HAZARD_CHANCE {
        TargetKind::Hazard(pool.hazard().clone())
    } else {
        TargetKind::Ordinary(pool.pick_ordinary(rng))
    };

    let mult = pool.speed_multiplier();
    let x = rng.random_range(SPAWN_INSET..FIELD_WIDTH - SPAWN_INSET);
    let pos = Vec2::new(x, FIELD_HEIGHT + SPAWN_DEPTH);
    // Launch away from center so the arc crosses it
    let dir = if x < FIELD_WIDTH / 2.0 { 1.0 } else { -1.0 };
    let vel = Vec2::new(
        (rng.random::<f32>() * 3.0 + 1.5) * dir * mult,
        -(rng.random::<f32>() * 6.0 + 19.0) * mult,
    );
    let spin = (rng.random::<f32>() - 0.5) * 0.1;

    state.spawn_target(kind, pos, vel, spin);
}
