//! Cosmetic effects: particles, debris halves, floating texts, damage flash
//!
//! Driven only by `GameEvent`s and never read back by the simulation. Pools
//! are capped and requests past the cap are dropped.

use glam::Vec2;
use rand::seq::IndexedRandom;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::level::{Color, InteractionMode};
use super::state::GameEvent;
use crate::consts::*;

/// Particle life lost per tick
const PARTICLE_DECAY: f32 = 0.04;
/// Floating text life lost and scale gained per tick
const TEXT_DECAY: f32 = 0.02;
const TEXT_GROWTH: f32 = 0.01;

const DESTROY_PARTICLES: usize = 12;
const DESTROY_SPREAD: f32 = 25.0;
const HAZARD_PARTICLES: usize = 20;
const HAZARD_SPREAD: f32 = 30.0;

const DEBRIS_SPLIT: f32 = 5.0;
const DEBRIS_LIFT: f32 = 2.0;
const DEBRIS_SPIN: f32 = 0.2;

pub mod palette {
    use super::Color;

    pub const HAZARD_RED: Color = Color([0.937, 0.267, 0.267, 1.0]);
    /// amber-600
    pub const DESTROY_TEXT: Color = Color([0.851, 0.467, 0.024, 1.0]);
    /// green-700
    pub const CAPTURE_TEXT: Color = Color([0.082, 0.502, 0.239, 1.0]);
    pub const FLASH: Color = Color([1.0, 0.0, 0.0, 1.0]);
}

#[derive(Debug, Clone)]
pub struct Particle {
    pub pos: Vec2,
    pub vel: Vec2,
    pub color: Color,
    pub size: f32,
    /// 1 → 0
    pub life: f32,
}

/// Which half of a sliced target
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Half {
    Left,
    Right,
}

#[derive(Debug, Clone)]
pub struct Debris {
    pub pos: Vec2,
    pub vel: Vec2,
    pub rotation: f32,
    pub spin: f32,
    pub icon: String,
    pub color: Color,
    pub half: Half,
}

#[derive(Debug, Clone)]
pub struct FloatingText {
    pub pos: Vec2,
    pub vel: Vec2,
    pub text: String,
    pub color: Color,
    pub scale: f32,
    pub life: f32,
}

#[derive(Debug, Clone)]
pub struct Effects {
    rng: Pcg32,
    particle_cap: usize,
    flash_enabled: bool,
    pub particles: Vec<Particle>,
    pub debris: Vec<Debris>,
    pub texts: Vec<FloatingText>,
    /// Damage flash alpha
    pub flash: f32,
}

impl Effects {
    pub fn new(seed: u64, particle_cap: usize) -> Self {
        Self {
            rng: Pcg32::seed_from_u64(seed),
            particle_cap,
            flash_enabled: true,
            particles: Vec::new(),
            debris: Vec::new(),
            texts: Vec::new(),
            flash: 0.0,
        }
    }

    pub fn with_flash(mut self, enabled: bool) -> Self {
        self.flash_enabled = enabled;
        self
    }

    /// React to a simulation event. `words` feeds the floating text.
    pub fn apply(&mut self, event: &GameEvent, words: &[String]) {
        match event {
            GameEvent::Resolved {
                pos,
                vel,
                rotation,
                icon,
                color,
                combo,
                mode,
                ..
            } => {
                if *mode == InteractionMode::Destroy {
                    self.split(*pos, *vel, *rotation, icon, *color);
                }
                self.burst(*pos, *color, DESTROY_PARTICLES, DESTROY_SPREAD);

                if let Some(word) = words.choose(&mut self.rng) {
                    let text_color = match mode {
                        InteractionMode::Destroy => palette::DESTROY_TEXT,
                        InteractionMode::Capture => palette::CAPTURE_TEXT,
                    };
                    let vel = Vec2::new((self.rng.random::<f32>() - 0.5) * 2.0, -5.0);
                    let scale = 1.0 + (*combo).min(10) as f32 * 0.1;
                    self.push_text(*pos, vel, word, text_color, scale);
                }
            }
            GameEvent::HazardHit { pos } => {
                self.burst(*pos, palette::HAZARD_RED, HAZARD_PARTICLES, HAZARD_SPREAD);
                self.push_text(
                    *pos - Vec2::new(0.0, 50.0),
                    Vec2::new(0.0, -2.0),
                    "BOOM!",
                    palette::HAZARD_RED,
                    2.0,
                );
                if self.flash_enabled {
                    self.flash = FLASH_ALPHA;
                }
            }
            _ => {}
        }
    }

    /// Spawn up to `count` particles, dropping those past the cap
    pub fn burst(&mut self, pos: Vec2, color: Color, count: usize, spread: f32) {
        let room = self.particle_cap.saturating_sub(self.particles.len());
        for _ in 0..count.min(room) {
            let vel = Vec2::new(
                (self.rng.random::<f32>() - 0.5) * spread,
                (self.rng.random::<f32>() - 0.5) * spread,
            );
            let size = self.rng.random::<f32>() * 10.0 + 5.0;
            self.particles.push(Particle {
                pos,
                vel,
                color,
                size,
                life: 1.0,
            });
        }
    }

    fn split(&mut self, pos: Vec2, vel: Vec2, rotation: f32, icon: &str, color: Color) {
        for (half, dir) in [(Half::Left, -1.0), (Half::Right, 1.0)] {
            if self.debris.len() >= MAX_DEBRIS {
                return;
            }
            self.debris.push(Debris {
                pos,
                vel: Vec2::new(vel.x + dir * DEBRIS_SPLIT, vel.y - DEBRIS_LIFT),
                rotation,
                spin: dir * DEBRIS_SPIN,
                icon: icon.to_string(),
                color,
                half,
            });
        }
    }

    fn push_text(&mut self, pos: Vec2, vel: Vec2, text: &str, color: Color, scale: f32) {
        if self.texts.len() >= MAX_FLOATING_TEXTS {
            return;
        }
        self.texts.push(FloatingText {
            pos,
            vel,
            text: text.to_string(),
            color,
            scale,
            life: 1.0,
        });
    }

    /// Advance every pool by one unfrozen tick
    pub fn update(&mut self) {
        for p in &mut self.particles {
            p.pos += p.vel;
            p.vel.y += GRAVITY * 0.5;
            p.life -= PARTICLE_DECAY;
        }
        self.particles.retain(|p| p.life > 0.0);

        for d in &mut self.debris {
            d.pos += d.vel;
            d.vel.y += GRAVITY;
            d.rotation += d.spin;
        }
        self.debris
            .retain(|d| d.pos.y <= FIELD_HEIGHT + DEBRIS_CULL_MARGIN);

        for t in &mut self.texts {
            t.pos += t.vel;
            t.life -= TEXT_DECAY;
            t.scale += TEXT_GROWTH;
        }
        self.texts.retain(|t| t.life > 0.0);
    }

    /// The flash fades every frame, frozen or not
    pub fn decay_flash(&mut self) {
        if self.flash > 0.0 {
            self.flash = (self.flash - FLASH_DECAY).max(0.0);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty() && self.debris.is_empty() && self.texts.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolved(mode: InteractionMode, combo: u32) -> GameEvent {
        GameEvent::Resolved {
            id: 1,
            pos: Vec2::new(300.0, 300.0),
            vel: Vec2::new(2.0, -8.0),
            rotation: 0.3,
            icon: "🍕".into(),
            color: Color::WHITE,
            combo,
            points: 55,
            mode,
        }
    }

    fn words() -> Vec<String> {
        vec!["SMASH".to_string()]
    }

    #[test]
    fn test_destroy_spawns_two_halves_and_burst() {
        let mut fx = Effects::new(1, DEFAULT_PARTICLE_CAP);
        fx.apply(&resolved(InteractionMode::Destroy, 1), &words());
        assert_eq!(fx.debris.len(), 2);
        assert_eq!(fx.debris[0].half, Half::Left);
        assert_eq!(fx.debris[0].vel.x, 2.0 - DEBRIS_SPLIT);
        assert_eq!(fx.debris[1].vel.x, 2.0 + DEBRIS_SPLIT);
        assert_eq!(fx.debris[0].vel.y, -10.0);
        assert_eq!(fx.particles.len(), DESTROY_PARTICLES);
        assert_eq!(fx.texts[0].text, "SMASH");
    }

    #[test]
    fn test_capture_has_no_debris() {
        let mut fx = Effects::new(1, DEFAULT_PARTICLE_CAP);
        fx.apply(&resolved(InteractionMode::Capture, 1), &words());
        assert!(fx.debris.is_empty());
        assert_eq!(fx.particles.len(), DESTROY_PARTICLES);
        assert_eq!(fx.texts[0].color, palette::CAPTURE_TEXT);
    }

    #[test]
    fn test_combo_grows_text_scale() {
        let mut fx = Effects::new(1, DEFAULT_PARTICLE_CAP);
        fx.apply(&resolved(InteractionMode::Destroy, 4), &words());
        fx.apply(&resolved(InteractionMode::Destroy, 40), &words());
        assert!((fx.texts[0].scale - 1.4).abs() < 1e-5);
        assert!((fx.texts[1].scale - 2.0).abs() < 1e-5);
    }

    #[test]
    fn test_hazard_flash_and_boom_text() {
        let mut fx = Effects::new(1, DEFAULT_PARTICLE_CAP);
        fx.apply(&GameEvent::HazardHit { pos: Vec2::new(100.0, 200.0) }, &words());
        assert_eq!(fx.flash, FLASH_ALPHA);
        assert_eq!(fx.texts[0].text, "BOOM!");
        assert_eq!(fx.texts[0].pos, Vec2::new(100.0, 150.0));
        assert_eq!(fx.particles.len(), HAZARD_PARTICLES);
        assert!(fx.debris.is_empty());
    }

    #[test]
    fn test_flash_can_be_disabled() {
        let mut fx = Effects::new(1, DEFAULT_PARTICLE_CAP).with_flash(false);
        fx.apply(&GameEvent::HazardHit { pos: Vec2::ZERO }, &words());
        assert_eq!(fx.flash, 0.0);
    }

    #[test]
    fn test_particle_cap_drops_overflow() {
        let mut fx = Effects::new(1, 15);
        fx.burst(Vec2::ZERO, Color::WHITE, 12, 10.0);
        fx.burst(Vec2::ZERO, Color::WHITE, 12, 10.0);
        assert_eq!(fx.particles.len(), 15);
    }

    #[test]
    fn test_pools_drain_over_time() {
        let mut fx = Effects::new(3, DEFAULT_PARTICLE_CAP);
        fx.apply(&resolved(InteractionMode::Destroy, 2), &words());
        fx.apply(&GameEvent::HazardHit { pos: Vec2::new(500.0, 500.0) }, &words());
        for _ in 0..200 {
            fx.update();
            fx.decay_flash();
        }
        assert!(fx.is_empty());
        assert_eq!(fx.flash, 0.0);
    }

    #[test]
    fn test_no_words_no_text() {
        let mut fx = Effects::new(1, DEFAULT_PARTICLE_CAP);
        fx.apply(&resolved(InteractionMode::Destroy, 1), &[]);
        assert!(fx.texts.is_empty());
    }
}
