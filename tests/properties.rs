//! Property tests for the scoring and simulation invariants

use std::collections::HashSet;

use glam::Vec2;
use proptest::prelude::*;

use mood_slicer::consts::*;
use mood_slicer::sim::level::{Color, InteractionMode, ItemFace, LevelDescriptor, Mood, SpawnPool};
use mood_slicer::sim::state::{GameEvent, GamePhase, GameState, RunState, Target, TargetKind};
use mood_slicer::sim::{LevelRules, Resolution, TickInput, resolve, tick};

fn face(points: i32) -> ItemFace {
    ItemFace {
        label: format!("item{points}"),
        icon: "🎯".into(),
        color: Color::WHITE,
        points,
    }
}

fn rules(mood: Mood) -> LevelRules {
    let level = LevelDescriptor::preset(mood);
    let items = level.default_custom_items("prop");
    LevelRules {
        pool: SpawnPool::new(&level, &items),
        mode: level.interaction,
    }
}

proptest! {
    #[test]
    fn combo_grows_by_one_and_score_never_drops(
        bases in prop::collection::vec(-200i32..200, 1..40),
        capture in any::<bool>(),
    ) {
        let mode = if capture { InteractionMode::Capture } else { InteractionMode::Destroy };
        let mut run = RunState::default();
        let mut events = Vec::new();
        for (i, base) in bases.iter().enumerate() {
            let mut target = Target::new(i as u32, TargetKind::Ordinary(face(*base)), Vec2::ZERO, Vec2::ZERO, 0.0);
            let score_before = run.score;
            let combo_before = run.combo;
            resolve(&mut target, &mut run, mode, 0.0, &mut events);
            prop_assert_eq!(run.combo, combo_before + 1);
            prop_assert!(run.score >= score_before);
            prop_assert!(run.max_combo >= run.combo);
            prop_assert!(!target.is_active());
        }
        prop_assert_eq!(run.max_combo as usize, bases.len());
    }

    #[test]
    fn lives_stay_bounded_and_termination_fires_once(
        gaps in prop::collection::vec(0.0f64..2500.0, 1..30),
    ) {
        let mut run = RunState::default();
        let mut events = Vec::new();
        let mut now = 0.0;
        let mut counted = 0u32;
        for (i, gap) in gaps.iter().enumerate() {
            now += gap;
            let mut target = Target::new(i as u32, TargetKind::Hazard(face(-50)), Vec2::ZERO, Vec2::ZERO, 0.0);
            let lives_before = run.lives;
            match resolve(&mut target, &mut run, InteractionMode::Destroy, now, &mut events) {
                Resolution::Remove => {
                    counted += 1;
                    prop_assert_eq!(run.lives, lives_before.saturating_sub(1));
                    prop_assert_eq!(run.combo, 0);
                }
                Resolution::Ignored => {
                    prop_assert_eq!(run.lives, lives_before);
                    prop_assert!(target.is_active());
                }
                Resolution::Keep => prop_assert!(false, "hazards are never kept"),
            }
            prop_assert!(run.lives <= START_LIVES);
        }

        let terminations = events.iter().filter(|e| matches!(e, GameEvent::RunTerminated)).count();
        if counted >= START_LIVES as u32 {
            prop_assert_eq!(terminations, 1);
            prop_assert!(run.terminated);
        } else {
            prop_assert_eq!(terminations, 0);
        }
    }

    #[test]
    fn simulation_respects_spawn_cap_and_resolves_each_target_once(
        seed in any::<u64>(),
        sweeps in prop::collection::vec((0.0f32..FIELD_WIDTH, 0.0f32..FIELD_HEIGHT), 1..8),
        happy in any::<bool>(),
    ) {
        let rules = rules(if happy { Mood::Happy } else { Mood::Angry });
        let mut state = GameState::new(seed);
        let mut resolved = HashSet::new();
        let mut last_score = 0;

        for step in 0..1500u32 {
            let (x, y) = sweeps[step as usize % sweeps.len()];
            let contacts = [Vec2::new(x, y)];
            let input = TickInput { contacts: &contacts, now_ms: step as f64 * FRAME_MS };
            tick(&mut state, &rules, &input);

            prop_assert!(state.targets.len() <= MAX_LIVE_TARGETS);
            prop_assert!(state.run.score >= last_score);
            last_score = state.run.score;

            for event in state.drain_events() {
                if let GameEvent::Resolved { id, .. } = event {
                    prop_assert!(resolved.insert(id), "target {} resolved twice", id);
                }
            }
            if state.phase == GamePhase::GameOver {
                prop_assert_eq!(state.run.lives, 0);
                break;
            }
        }
    }
}
