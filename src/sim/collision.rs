//! Contact testing and interaction resolution
//!
//! Contacts are tested against a target with a squared-distance check; the
//! first contact inside the hit radius triggers `resolve`, which applies the
//! kind- and mode-specific outcome to the run and raises events for effects.

use glam::Vec2;

use super::level::InteractionMode;
use super::state::{GameEvent, RunState, Target};
use crate::consts::*;

/// What the simulator should do with the target after resolution
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// Hazard still cooling down; target stays live and active
    Ignored,
    /// Drop it from the live set now
    Remove,
    /// Keep it for the capture ascension
    Keep,
}

/// First contact within the hit radius of `pos`
pub fn first_contact(pos: Vec2, contacts: &[Vec2]) -> Option<Vec2> {
    let r2 = HIT_RADIUS * HIT_RADIUS;
    contacts
        .iter()
        .copied()
        .find(|c| c.distance_squared(pos) < r2)
}

/// Apply a contact to an active target
pub fn resolve(
    target: &mut Target,
    run: &mut RunState,
    mode: InteractionMode,
    now_ms: f64,
    events: &mut Vec<GameEvent>,
) -> Resolution {
    debug_assert!(target.is_active(), "resolving target {} twice", target.id);

    if target.kind.is_hazard() {
        resolve_hazard(target, run, now_ms, events)
    } else {
        resolve_ordinary(target, run, mode, events)
    }
}

fn resolve_hazard(
    target: &mut Target,
    run: &mut RunState,
    now_ms: f64,
    events: &mut Vec<GameEvent>,
) -> Resolution {
    if let Some(last) = run.last_hazard_ms
        && now_ms - last < HAZARD_COOLDOWN_MS
    {
        log::debug!("Hazard {} ignored, cooling down", target.id);
        return Resolution::Ignored;
    }

    run.last_hazard_ms = Some(now_ms);
    run.lives = run.lives.saturating_sub(1);
    run.combo = 0;
    run.mood -= HAZARD_MOOD_PENALTY;
    target.mark_destroyed();
    log::debug!("Hazard hit, {} lives left", run.lives);

    events.push(GameEvent::HazardHit { pos: target.pos });
    if run.lives == 0 && !run.terminated {
        run.terminated = true;
        log::info!("Run terminated with score {}", run.score);
        events.push(GameEvent::RunTerminated);
    }
    Resolution::Remove
}

fn resolve_ordinary(
    target: &mut Target,
    run: &mut RunState,
    mode: InteractionMode,
    events: &mut Vec<GameEvent>,
) -> Resolution {
    let face = target.kind.face().clone();

    run.combo += 1;
    run.max_combo = run.max_combo.max(run.combo);

    let points = (face.points as i64 + run.combo as i64 * COMBO_BONUS as i64).max(0) as u64;
    run.score += points;

    let multiplier = if run.combo > VENT_COMBO_THRESHOLD {
        VENT_MULTIPLIER
    } else {
        1.0
    };
    run.vent += (points as f32 * multiplier).floor() as u64;
    run.mood += (run.combo / 2) as i64;
    run.record(&face);

    let vel = target.vel;
    let resolution = match mode {
        InteractionMode::Destroy => {
            target.mark_destroyed();
            Resolution::Remove
        }
        InteractionMode::Capture => {
            target.mark_captured();
            Resolution::Keep
        }
    };

    events.push(GameEvent::Resolved {
        id: target.id,
        pos: target.pos,
        vel,
        rotation: target.rotation,
        icon: face.icon,
        color: face.color,
        combo: run.combo,
        points,
        mode,
    });
    events.push(GameEvent::StatsUpdated(run.snapshot()));
    resolution
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::level::{Color, ItemFace};
    use crate::sim::state::{TargetKind, TargetStatus};

    fn face(points: i32) -> ItemFace {
        ItemFace {
            label: "boss".into(),
            icon: "👔".into(),
            color: Color::WHITE,
            points,
        }
    }

    fn ordinary(points: i32) -> Target {
        Target::new(
            1,
            TargetKind::Ordinary(face(points)),
            Vec2::new(500.0, 400.0),
            Vec2::new(3.0, -10.0),
            0.02,
        )
    }

    fn hazard() -> Target {
        Target::new(
            2,
            TargetKind::Hazard(face(-50)),
            Vec2::new(500.0, 400.0),
            Vec2::ZERO,
            0.0,
        )
    }

    #[test]
    fn test_first_contact_inside_radius() {
        let contacts = [Vec2::new(0.0, 0.0), Vec2::new(510.0, 400.0), Vec2::new(505.0, 400.0)];
        assert_eq!(
            first_contact(Vec2::new(500.0, 400.0), &contacts),
            Some(Vec2::new(510.0, 400.0))
        );
        assert_eq!(first_contact(Vec2::new(500.0, 460.0), &[Vec2::new(500.0, 400.0)]), None);
    }

    #[test]
    fn test_destroy_scoring_scenario() {
        let mut run = RunState {
            combo: 3,
            ..Default::default()
        };
        let mut events = Vec::new();
        let mut t = ordinary(50);
        let res = resolve(&mut t, &mut run, InteractionMode::Destroy, 0.0, &mut events);

        assert_eq!(res, Resolution::Remove);
        assert_eq!(t.status, TargetStatus::Destroyed);
        assert_eq!(run.combo, 4);
        assert_eq!(run.score, 70);
        assert_eq!(run.vent, 70);
        assert_eq!(run.mood, 2);
        assert!(matches!(events[0], GameEvent::Resolved { points: 70, .. }));
        assert!(matches!(&events[1], GameEvent::StatsUpdated(s) if s.score == 70));
    }

    #[test]
    fn test_vent_amplified_above_combo_threshold() {
        let mut run = RunState {
            combo: 5,
            ..Default::default()
        };
        let mut t = ordinary(50);
        resolve(&mut t, &mut run, InteractionMode::Destroy, 0.0, &mut Vec::new());
        // combo 6: 50 + 30 = 80 points, vent 80 * 1.5
        assert_eq!(run.score, 80);
        assert_eq!(run.vent, 120);
    }

    #[test]
    fn test_capture_mode_physics() {
        let mut run = RunState::default();
        let mut t = ordinary(50);
        let res = resolve(&mut t, &mut run, InteractionMode::Capture, 0.0, &mut Vec::new());
        assert_eq!(res, Resolution::Keep);
        assert_eq!(t.status, TargetStatus::Captured);
        assert_eq!(t.vel.x, 0.0);
        assert!(t.vel.y < 0.0);
        assert_eq!(run.score, 55);
    }

    #[test]
    fn test_hazard_penalties() {
        let mut run = RunState {
            combo: 7,
            score: 400,
            ..Default::default()
        };
        let mut events = Vec::new();
        let res = resolve(&mut hazard(), &mut run, InteractionMode::Destroy, 0.0, &mut events);
        assert_eq!(res, Resolution::Remove);
        assert_eq!(run.lives, START_LIVES - 1);
        assert_eq!(run.combo, 0);
        assert_eq!(run.score, 400);
        assert_eq!(run.mood, -HAZARD_MOOD_PENALTY);
        assert_eq!(events, vec![GameEvent::HazardHit { pos: Vec2::new(500.0, 400.0) }]);
    }

    #[test]
    fn test_hazard_debounce() {
        let mut run = RunState::default();
        let mut events = Vec::new();
        resolve(&mut hazard(), &mut run, InteractionMode::Destroy, 0.0, &mut events);
        let mut second = hazard();
        let res = resolve(&mut second, &mut run, InteractionMode::Destroy, 200.0, &mut events);

        assert_eq!(res, Resolution::Ignored);
        assert!(second.is_active());
        assert_eq!(run.lives, START_LIVES - 1);

        // After the cooldown it counts again
        resolve(&mut hazard(), &mut run, InteractionMode::Destroy, 1200.0, &mut events);
        assert_eq!(run.lives, START_LIVES - 2);
    }

    #[test]
    fn test_run_terminates_once() {
        let mut run = RunState {
            lives: 1,
            ..Default::default()
        };
        let mut events = Vec::new();
        resolve(&mut hazard(), &mut run, InteractionMode::Destroy, 0.0, &mut events);
        resolve(&mut hazard(), &mut run, InteractionMode::Destroy, 5000.0, &mut events);
        let terminations = events
            .iter()
            .filter(|e| matches!(e, GameEvent::RunTerminated))
            .count();
        assert_eq!(terminations, 1);
        assert_eq!(run.lives, 0);
        assert!(run.terminated);
    }

    #[test]
    fn test_negative_base_never_lowers_score() {
        let mut run = RunState {
            score: 10,
            ..Default::default()
        };
        resolve(&mut ordinary(-100), &mut run, InteractionMode::Destroy, 0.0, &mut Vec::new());
        assert_eq!(run.score, 10);
    }

    #[test]
    fn test_resolution_records_tally() {
        let mut run = RunState::default();
        resolve(&mut ordinary(50), &mut run, InteractionMode::Destroy, 0.0, &mut Vec::new());
        resolve(&mut ordinary(50), &mut run, InteractionMode::Destroy, 0.0, &mut Vec::new());
        assert_eq!(run.tally["boss"].count, 2);
        assert_eq!(run.tally["boss"].icon, "👔");
        assert_eq!(run.max_combo, 2);
    }
}
