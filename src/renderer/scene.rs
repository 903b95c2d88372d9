//! Presentation: draws a `SessionView` onto a `Surface`
//!
//! Reads everything and mutates nothing but its own shake amplitude.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use std::f32::consts::PI;

use super::shapes;
use super::surface::{Surface, TextAlign, TextCommand};
use super::vertex::colors;
use crate::consts::*;
use crate::session::SessionView;
use crate::sim::effects::{Debris, Half, palette};
use crate::sim::level::{InteractionMode, VisualTheme};
use crate::sim::motion::CameraStatus;
use crate::sim::state::{GameEvent, GamePhase, Target, TargetKind, TargetStatus};

/// Drawn radius of a target body at scale 1
const TARGET_RADIUS: f32 = 42.0;
const TRAIL_WIDTH: f32 = 14.0;
const HAZARD_SPIKES: usize = 8;
const HUD_TALLY_ROWS: usize = 5;

pub struct Presenter {
    shake: f32,
    shake_enabled: bool,
    /// Number of decorative background elements
    background_detail: usize,
    rng: Pcg32,
}

impl Presenter {
    pub fn new(shake_enabled: bool, background_detail: usize) -> Self {
        Self {
            shake: 0.0,
            shake_enabled,
            background_detail,
            rng: Pcg32::seed_from_u64(0x5EED),
        }
    }

    /// Kick the shake amplitude from this frame's events
    pub fn observe(&mut self, events: &[GameEvent]) {
        if !self.shake_enabled {
            return;
        }
        for event in events {
            let kick = match event {
                GameEvent::HazardHit { .. } => SHAKE_HAZARD,
                GameEvent::Resolved {
                    mode: InteractionMode::Destroy,
                    ..
                } => SHAKE_DESTROY,
                GameEvent::Resolved {
                    mode: InteractionMode::Capture,
                    ..
                } => SHAKE_CAPTURE,
                _ => continue,
            };
            self.shake = self.shake.max(kick);
        }
    }

    pub fn shake(&self) -> f32 {
        self.shake
    }

    /// Draw one frame. Called every display frame, frozen or not.
    pub fn draw(&mut self, view: &SessionView<'_>, surface: &mut impl Surface) {
        surface.clear(background_color(view.theme));

        // Everything inside the field shakes, background included
        let offset = self.take_shake_offset();
        surface.set_offset(offset);
        self.draw_background(view, surface);

        draw_trail(view, surface);
        for target in view.targets {
            draw_target(target, surface);
        }
        for debris in &view.effects.debris {
            draw_debris(debris, surface);
        }
        for p in &view.effects.particles {
            surface.fill_circle(p.pos, p.size * 0.5 * p.life.max(0.0), p.color.with_alpha(p.life));
        }
        for t in &view.effects.texts {
            surface.text(
                TextCommand::new(t.text.clone(), t.pos, 32.0 * t.scale, t.color.with_alpha(t.life))
                    .bold(),
            );
        }

        surface.set_offset(Vec2::ZERO);
        if view.effects.flash > 0.0 {
            surface.fill_rect(
                Vec2::ZERO,
                Vec2::new(FIELD_WIDTH, FIELD_HEIGHT),
                palette::FLASH.with_alpha(view.effects.flash),
            );
        }
        draw_hud(view, surface);
    }

    /// Random jitter scaled by the current amplitude, then decay it
    fn take_shake_offset(&mut self) -> Vec2 {
        if self.shake <= 0.0 {
            return Vec2::ZERO;
        }
        let offset = Vec2::new(
            (self.rng.random::<f32>() - 0.5) * self.shake,
            (self.rng.random::<f32>() - 0.5) * self.shake,
        );
        self.shake *= SHAKE_DECAY;
        if self.shake < SHAKE_CUTOFF {
            self.shake = 0.0;
        }
        offset
    }

    fn draw_background(&self, view: &SessionView<'_>, surface: &mut impl Surface) {
        let t = view.bg_timer / 1000.0;
        let count = self.background_detail;
        match view.theme {
            VisualTheme::Destruction => {
                // Embers rise and flicker
                for i in 0..count {
                    let x = scatter(i, 0) * FIELD_WIDTH + (t * 0.7 + i as f32).sin() * 20.0;
                    let speed = 40.0 + scatter(i, 1) * 80.0;
                    let y = FIELD_HEIGHT - wrap(scatter(i, 2) * FIELD_HEIGHT + t * speed, FIELD_HEIGHT);
                    let flicker = 0.4 + 0.4 * (t * 6.0 + i as f32).sin().abs();
                    surface.fill_circle(Vec2::new(x, y), 2.0 + scatter(i, 3) * 3.0, with_alpha(colors::EMBER, flicker));
                }
            }
            VisualTheme::SadRain => {
                for i in 0..count {
                    let x = scatter(i, 0) * FIELD_WIDTH;
                    let speed = 300.0 + scatter(i, 1) * 200.0;
                    let y = wrap(scatter(i, 2) * FIELD_HEIGHT + t * speed, FIELD_HEIGHT);
                    let len = 12.0 + scatter(i, 3) * 10.0;
                    surface.fill_rect(Vec2::new(x, y), Vec2::new(1.5, len), with_alpha(colors::RAIN, 0.35));
                }
            }
            VisualTheme::Underwater => {
                for i in 0..count {
                    let speed = 30.0 + scatter(i, 1) * 50.0;
                    let y = FIELD_HEIGHT - wrap(scatter(i, 2) * FIELD_HEIGHT + t * speed, FIELD_HEIGHT);
                    let x = scatter(i, 0) * FIELD_WIDTH + (t + i as f32).sin() * 15.0;
                    let r = 3.0 + scatter(i, 3) * 8.0;
                    surface.ring(Vec2::new(x, y), r, 1.5, with_alpha(colors::BUBBLE, 0.4));
                }
            }
            VisualTheme::Default => {}
        }
    }
}

fn background_color(theme: VisualTheme) -> [f32; 4] {
    match theme {
        VisualTheme::Destruction => colors::BG_DESTRUCTION,
        VisualTheme::SadRain => colors::BG_SAD_RAIN,
        VisualTheme::Underwater => colors::BG_UNDERWATER,
        VisualTheme::Default => colors::BG_DEFAULT,
    }
}

/// Stable pseudo-random value in [0, 1) for background element `i`
fn scatter(i: usize, salt: u32) -> f32 {
    let mut h = (i as u32).wrapping_mul(0x9E37_79B9) ^ salt.wrapping_mul(0x85EB_CA6B);
    h ^= h >> 15;
    h = h.wrapping_mul(0x2C1B_3C6D);
    h ^= h >> 12;
    (h & 0xFFFF) as f32 / 65536.0
}

fn wrap(v: f32, max: f32) -> f32 {
    v.rem_euclid(max)
}

fn with_alpha(color: [f32; 4], alpha: f32) -> [f32; 4] {
    [color[0], color[1], color[2], color[3] * alpha]
}

fn draw_trail(view: &SessionView<'_>, surface: &mut impl Surface) {
    let points: Vec<Vec2> = view.trail.samples().iter().map(|s| s.pos).collect();
    let smoothed = shapes::smooth(&points);
    surface.stroke_path(&smoothed, TRAIL_WIDTH, colors::TRAIL);
}

fn draw_target(target: &Target, surface: &mut impl Surface) {
    if target.status == TargetStatus::Destroyed {
        return;
    }
    let radius = TARGET_RADIUS * target.scale;
    let alpha = target.opacity;
    let face = target.kind.face();

    match &target.kind {
        TargetKind::Hazard(_) => {
            for k in 0..HAZARD_SPIKES {
                let angle = target.rotation + k as f32 * (2.0 * PI / HAZARD_SPIKES as f32);
                let dir = Vec2::from_angle(angle);
                let side = Vec2::new(-dir.y, dir.x) * radius * 0.25;
                let base = target.pos + dir * radius * 0.85;
                surface.triangle(
                    base + side,
                    base - side,
                    target.pos + dir * radius * 1.3,
                    with_alpha(colors::HAZARD_RIM, alpha),
                );
            }
            surface.fill_circle(target.pos, radius, with_alpha(colors::HAZARD_BODY, alpha));
            surface.ring(target.pos, radius, 4.0, with_alpha(colors::HAZARD_RIM, alpha));
        }
        TargetKind::Ordinary(_) => {
            surface.fill_circle(target.pos, radius, face.color.with_alpha(alpha * 0.85));
            surface.ring(target.pos, radius, 3.0, with_alpha(colors::TARGET_RIM, alpha));
        }
    }

    surface.text(
        TextCommand::new(face.icon.clone(), target.pos, 44.0 * target.scale, with_alpha(colors::LABEL, alpha))
            .rotated(target.rotation),
    );
    surface.text(
        TextCommand::new(
            face.label.clone(),
            target.pos + Vec2::new(0.0, radius + 16.0),
            16.0 * target.scale,
            with_alpha(colors::LABEL, alpha),
        )
        .bold(),
    );
}

fn draw_debris(debris: &Debris, surface: &mut impl Surface) {
    let start = match debris.half {
        Half::Left => debris.rotation + PI / 2.0,
        Half::Right => debris.rotation - PI / 2.0,
    };
    surface.half_disc(debris.pos, TARGET_RADIUS, start, debris.color.with_alpha(0.9));
}

fn draw_hud(view: &SessionView<'_>, surface: &mut impl Surface) {
    let run = view.run;

    // Tally of resolved kinds, most frequent first
    let tally = run.top_tally(HUD_TALLY_ROWS);
    if !tally.is_empty() {
        surface.fill_rect(
            Vec2::new(12.0, 12.0),
            Vec2::new(150.0, 12.0 + tally.len() as f32 * 30.0),
            colors::HUD_PANEL,
        );
        for (row, (_, entry)) in tally.iter().enumerate() {
            let y = 32.0 + row as f32 * 30.0;
            surface.text(TextCommand::new(entry.icon.clone(), Vec2::new(40.0, y), 22.0, colors::HUD_TEXT));
            surface.text(
                TextCommand::new(format!("×{}", entry.count), Vec2::new(70.0, y), 20.0, colors::HUD_TEXT)
                    .align(TextAlign::Left)
                    .bold(),
            );
        }
    }

    for i in 0..START_LIVES {
        let color = if i < run.lives {
            colors::HEART
        } else {
            colors::HEART_EMPTY
        };
        let pos = Vec2::new(FIELD_WIDTH - 40.0 - i as f32 * 36.0, 36.0);
        surface.text(TextCommand::new("❤", pos, 28.0, color));
    }

    surface.text(
        TextCommand::new(run.score.to_string(), Vec2::new(FIELD_WIDTH / 2.0, 40.0), 36.0, colors::HUD_TEXT).bold(),
    );
    if run.combo > 1 {
        surface.text(
            TextCommand::new(
                format!("x{} COMBO", run.combo),
                Vec2::new(FIELD_WIDTH / 2.0, 78.0),
                22.0,
                colors::WARNING,
            )
            .bold(),
        );
    }

    match view.camera {
        Some(CameraStatus::Failed(err)) => surface.text(TextCommand::new(
            format!("Camera unavailable: {err}"),
            Vec2::new(FIELD_WIDTH / 2.0, FIELD_HEIGHT - 30.0),
            18.0,
            colors::WARNING,
        )),
        Some(CameraStatus::Pending) => surface.text(TextCommand::new(
            "Waiting for camera...",
            Vec2::new(FIELD_WIDTH / 2.0, FIELD_HEIGHT - 30.0),
            18.0,
            colors::HUD_TEXT,
        )),
        _ => {}
    }

    if view.phase == GamePhase::GameOver {
        surface.text(
            TextCommand::new("GAME OVER", Vec2::new(FIELD_WIDTH / 2.0, FIELD_HEIGHT / 2.0), 64.0, colors::HUD_TEXT)
                .bold(),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::surface::ShapeBatch;
    use crate::sim::effects::Effects;
    use crate::sim::level::{Color, ItemFace};
    use crate::sim::motion::{InputError, Trail};
    use crate::sim::state::RunState;

    fn resolved(mode: InteractionMode) -> GameEvent {
        GameEvent::Resolved {
            id: 1,
            pos: Vec2::ZERO,
            vel: Vec2::ZERO,
            rotation: 0.0,
            icon: "🍕".into(),
            color: Color::WHITE,
            combo: 1,
            points: 55,
            mode,
        }
    }

    struct Fixture {
        targets: Vec<Target>,
        run: RunState,
        effects: Effects,
        trail: Trail,
        camera: Option<CameraStatus>,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                targets: Vec::new(),
                run: RunState::default(),
                effects: Effects::new(1, DEFAULT_PARTICLE_CAP),
                trail: Trail::default(),
                camera: None,
            }
        }

        fn view(&self) -> SessionView<'_> {
            SessionView {
                targets: &self.targets,
                run: &self.run,
                effects: &self.effects,
                trail: &self.trail,
                theme: VisualTheme::Default,
                mode: InteractionMode::Destroy,
                bg_timer: 0.0,
                phase: GamePhase::Playing,
                camera: self.camera.as_ref(),
            }
        }
    }

    fn hearts(batch: &ShapeBatch, color: [f32; 4]) -> usize {
        batch
            .texts
            .iter()
            .filter(|t| t.text == "❤" && t.color == color)
            .count()
    }

    #[test]
    fn test_shake_takes_the_larger_kick() {
        let mut p = Presenter::new(true, 0);
        p.observe(&[resolved(InteractionMode::Destroy)]);
        assert_eq!(p.shake(), SHAKE_DESTROY);
        p.observe(&[GameEvent::HazardHit { pos: Vec2::ZERO }]);
        assert_eq!(p.shake(), SHAKE_HAZARD);
        p.observe(&[resolved(InteractionMode::Capture)]);
        assert_eq!(p.shake(), SHAKE_HAZARD);
    }

    #[test]
    fn test_shake_decays_to_zero_while_drawing() {
        let fixture = Fixture::new();
        let mut p = Presenter::new(true, 0);
        let mut batch = ShapeBatch::new();
        p.observe(&[GameEvent::HazardHit { pos: Vec2::ZERO }]);
        p.draw(&fixture.view(), &mut batch);
        assert!((p.shake() - SHAKE_HAZARD * SHAKE_DECAY).abs() < 1e-4);
        for _ in 0..100 {
            p.draw(&fixture.view(), &mut batch);
        }
        assert_eq!(p.shake(), 0.0);
    }

    #[test]
    fn test_shake_disabled_ignores_events() {
        let mut p = Presenter::new(false, 0);
        p.observe(&[GameEvent::HazardHit { pos: Vec2::ZERO }]);
        assert_eq!(p.shake(), 0.0);
    }

    #[test]
    fn test_hud_hearts_follow_lives() {
        let mut fixture = Fixture::new();
        fixture.run.lives = 1;
        let mut batch = ShapeBatch::new();
        Presenter::new(true, 0).draw(&fixture.view(), &mut batch);
        assert_eq!(hearts(&batch, colors::HEART), 1);
        assert_eq!(hearts(&batch, colors::HEART_EMPTY), 2);
    }

    #[test]
    fn test_targets_draw_icon_and_label() {
        let mut fixture = Fixture::new();
        let face = ItemFace {
            label: "Taxes".into(),
            icon: "💸".into(),
            color: Color::WHITE,
            points: 50,
        };
        fixture
            .targets
            .push(Target::new(1, TargetKind::Ordinary(face), Vec2::new(300.0, 300.0), Vec2::ZERO, 0.0));
        let mut batch = ShapeBatch::new();
        Presenter::new(true, 0).draw(&fixture.view(), &mut batch);
        assert!(batch.texts.iter().any(|t| t.text == "💸" && t.pos == Vec2::new(300.0, 300.0)));
        assert!(batch.texts.iter().any(|t| t.text == "Taxes"));
    }

    #[test]
    fn test_camera_failure_is_shown() {
        let mut fixture = Fixture::new();
        fixture.camera = Some(CameraStatus::Failed(InputError::PermissionDenied));
        let mut batch = ShapeBatch::new();
        Presenter::new(true, 0).draw(&fixture.view(), &mut batch);
        assert!(batch.texts.iter().any(|t| t.text.starts_with("Camera unavailable")));
    }

    #[test]
    fn test_flash_covers_field_without_shake() {
        let mut fixture = Fixture::new();
        fixture.effects.apply(&GameEvent::HazardHit { pos: Vec2::ZERO }, &[]);
        let mut batch = ShapeBatch::new();
        let mut p = Presenter::new(true, 0);
        p.observe(&[GameEvent::HazardHit { pos: Vec2::ZERO }]);
        p.draw(&fixture.view(), &mut batch);
        let flash = palette::FLASH.with_alpha(fixture.effects.flash);
        let corner = batch
            .vertices
            .iter()
            .find(|v| v.color == flash)
            .map(|v| v.position);
        assert_eq!(corner, Some([0.0, 0.0]));
    }

    #[test]
    fn test_background_uses_theme_color() {
        let fixture = Fixture::new();
        let mut view = fixture.view();
        view.theme = VisualTheme::Underwater;
        let mut batch = ShapeBatch::new();
        Presenter::new(true, 20).draw(&view, &mut batch);
        assert_eq!(batch.clear_color, colors::BG_UNDERWATER);
        assert!(!batch.vertices.is_empty());
    }

    #[test]
    fn test_background_shakes_with_the_field() {
        let fixture = Fixture::new();
        let mut view = fixture.view();
        view.theme = VisualTheme::SadRain;

        let mut still = ShapeBatch::new();
        Presenter::new(true, 20).draw(&view, &mut still);

        let mut shaken = ShapeBatch::new();
        let mut p = Presenter::new(true, 20);
        p.observe(&[GameEvent::HazardHit { pos: Vec2::ZERO }]);
        p.draw(&view, &mut shaken);

        assert_eq!(shaken.clear_color, colors::BG_SAD_RAIN);
        // The first rain drop moves by the same offset as its second vertex
        let delta = |i: usize| {
            Vec2::from(shaken.vertices[i].position) - Vec2::from(still.vertices[i].position)
        };
        assert!(delta(0).length() > 0.0);
        assert!((delta(0) - delta(1)).length() < 1e-3);
        assert!(delta(0).abs().max_element() <= SHAKE_HAZARD / 2.0);
    }
}
