//! Player settings and preferences
//!
//! Persisted in LocalStorage; read once when a session starts.

use serde::{Deserialize, Serialize};

use crate::consts::{DEFAULT_SENSITIVITY, MAX_SENSITIVITY, MIN_SENSITIVITY};
use crate::sim::level::Language;
use crate::sim::motion::InputMode;

/// Quality preset levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum QualityPreset {
    Low,
    #[default]
    Medium,
    High,
}

impl QualityPreset {
    pub fn as_str(&self) -> &'static str {
        match self {
            QualityPreset::Low => "Low",
            QualityPreset::Medium => "Medium",
            QualityPreset::High => "High",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "low" => Some(QualityPreset::Low),
            "medium" | "med" => Some(QualityPreset::Medium),
            "high" => Some(QualityPreset::High),
            _ => None,
        }
    }

    /// Maximum live particles for this preset
    pub fn max_particles(&self) -> usize {
        match self {
            QualityPreset::Low => 60,
            QualityPreset::Medium => 150,
            QualityPreset::High => 300,
        }
    }

    /// Whether to draw the animated theme background (rain, bubbles)
    pub fn background_detail(&self) -> bool {
        !matches!(self, QualityPreset::Low)
    }
}

/// Game settings/preferences
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Graphics quality preset
    pub quality: QualityPreset,

    // === Input ===
    pub input_mode: InputMode,
    /// Camera sensitivity slider (1-100)
    pub sensitivity: u32,
    pub language: Language,

    // === Visual Effects ===
    /// Screen shake on impacts
    pub screen_shake: bool,
    /// Red flash on hazard hits
    pub damage_flash: bool,
    /// Particle bursts
    pub particles: bool,

    // === Audio ===
    /// Master volume (0.0 - 1.0)
    pub master_volume: f32,
    /// Sound effects volume (0.0 - 1.0)
    pub sfx_volume: f32,
    /// Beat track volume (0.0 - 1.0)
    pub music_volume: f32,
    /// Pointer play is silent
    pub mute_in_pointer_mode: bool,

    // === Accessibility ===
    /// Reduced motion (no shake, no flashes)
    pub reduced_motion: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            quality: QualityPreset::Medium,

            input_mode: InputMode::Pointer,
            sensitivity: DEFAULT_SENSITIVITY,
            language: Language::En,

            screen_shake: true,
            damage_flash: true,
            particles: true,

            master_volume: 0.8,
            sfx_volume: 1.0,
            music_volume: 0.7,
            mute_in_pointer_mode: true,

            reduced_motion: false,
        }
    }
}

impl Settings {
    /// Set sensitivity, clamped to the slider range
    pub fn set_sensitivity(&mut self, value: u32) {
        self.sensitivity = value.clamp(MIN_SENSITIVITY, MAX_SENSITIVITY);
    }

    /// Effective screen shake (respects reduced_motion)
    pub fn effective_screen_shake(&self) -> bool {
        self.screen_shake && !self.reduced_motion
    }

    /// Effective damage flash (respects reduced_motion)
    pub fn effective_damage_flash(&self) -> bool {
        self.damage_flash && !self.reduced_motion
    }

    /// Effective particle count cap
    pub fn max_particles(&self) -> usize {
        if !self.particles {
            0
        } else {
            self.quality.max_particles()
        }
    }

    /// Whether any sound should play for this input mode
    pub fn audio_enabled(&self) -> bool {
        !(self.mute_in_pointer_mode && self.input_mode == InputMode::Pointer)
    }

    /// LocalStorage key
    const STORAGE_KEY: &'static str = "mood_slicer_settings";

    /// Load settings from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage
            && let Ok(Some(json)) = storage.get_item(Self::STORAGE_KEY)
        {
            match serde_json::from_str(&json) {
                Ok(settings) => {
                    log::info!("Loaded settings from LocalStorage");
                    return settings;
                }
                Err(e) => log::warn!("Ignoring stored settings: {}", e),
            }
        }

        log::info!("Using default settings");
        Self::default()
    }

    /// Save settings to LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn save(&self) {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage
            && let Ok(json) = serde_json::to_string(self)
        {
            let _ = storage.set_item(Self::STORAGE_KEY, &json);
            log::info!("Settings saved");
        }
    }

    /// Native stubs
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        Self::default()
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn save(&self) {
        // No-op for native
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preset_particle_caps() {
        assert_eq!(QualityPreset::Low.max_particles(), 60);
        assert_eq!(QualityPreset::Medium.max_particles(), 150);
        assert_eq!(QualityPreset::High.max_particles(), 300);
    }

    #[test]
    fn test_preset_names_round_trip() {
        for preset in [QualityPreset::Low, QualityPreset::Medium, QualityPreset::High] {
            assert_eq!(QualityPreset::from_str(preset.as_str()), Some(preset));
        }
        assert_eq!(QualityPreset::from_str("HIGH"), Some(QualityPreset::High));
        assert_eq!(QualityPreset::from_str("ultra"), None);
    }

    #[test]
    fn test_sensitivity_clamps_to_slider() {
        let mut s = Settings::default();
        s.set_sensitivity(40);
        assert_eq!(s.sensitivity, 40);
        s.set_sensitivity(0);
        assert_eq!(s.sensitivity, MIN_SENSITIVITY);
        s.set_sensitivity(5000);
        assert_eq!(s.sensitivity, MAX_SENSITIVITY);
    }

    #[test]
    fn test_reduced_motion_disables_shake_and_flash() {
        let s = Settings {
            reduced_motion: true,
            ..Settings::default()
        };
        assert!(!s.effective_screen_shake());
        assert!(!s.effective_damage_flash());
    }

    #[test]
    fn test_pointer_mode_is_silent_by_default() {
        let mut s = Settings::default();
        assert!(!s.audio_enabled());
        s.input_mode = InputMode::Camera;
        assert!(s.audio_enabled());
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let s: Settings = serde_json::from_str(r#"{"input_mode":"CAMERA","sensitivity":50}"#).unwrap();
        assert_eq!(s.input_mode, InputMode::Camera);
        assert_eq!(s.sensitivity, 50);
        assert_eq!(s.quality, QualityPreset::Medium);
    }
}
