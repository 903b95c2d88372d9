//! Level descriptors, item definitions and spawn pools
//!
//! A level is read-only configuration for the duration of a session.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::consts::CUSTOM_ITEM_POINTS;

/// RGBA color, serialized as a `#RRGGBB` hex string
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color(pub [f32; 4]);

impl Color {
    pub const BLACK: Color = Color([0.0, 0.0, 0.0, 1.0]);
    pub const WHITE: Color = Color([1.0, 1.0, 1.0, 1.0]);

    /// Parse `#RRGGBB` or `#RGB`
    pub fn from_hex(hex: &str) -> Option<Self> {
        let digits = hex.trim().strip_prefix('#')?;
        let channel = |s: &str| u8::from_str_radix(s, 16).ok().map(|v| v as f32 / 255.0);
        match digits.len() {
            6 => Some(Color([
                channel(digits.get(0..2)?)?,
                channel(digits.get(2..4)?)?,
                channel(digits.get(4..6)?)?,
                1.0,
            ])),
            3 => {
                let expand = |i: usize| {
                    let c = digits.get(i..i + 1)?;
                    channel(&format!("{c}{c}"))
                };
                Some(Color([expand(0)?, expand(1)?, expand(2)?, 1.0]))
            }
            _ => None,
        }
    }

    pub fn to_hex(self) -> String {
        let [r, g, b, _] = self.0;
        let byte = |v: f32| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
        format!("#{:02X}{:02X}{:02X}", byte(r), byte(g), byte(b))
    }

    /// Same color with alpha multiplied by `alpha`
    pub fn with_alpha(self, alpha: f32) -> [f32; 4] {
        let [r, g, b, a] = self.0;
        [r, g, b, a * alpha.clamp(0.0, 1.0)]
    }
}

impl TryFrom<String> for Color {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Color::from_hex(&value).ok_or_else(|| format!("invalid hex color: {value:?}"))
    }
}

impl From<Color> for String {
    fn from(color: Color) -> Self {
        color.to_hex()
    }
}

/// What happens to an ordinary target on contact
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InteractionMode {
    /// Shattered in place
    #[default]
    #[serde(alias = "SLICE")]
    Destroy,
    /// Carried off-screen intact
    #[serde(alias = "COLLECT")]
    Capture,
}

/// Cosmetic theme id
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VisualTheme {
    Destruction,
    SadRain,
    Underwater,
    #[default]
    Default,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MusicTheme {
    HeavyMetal,
    LoFi,
    Arcade,
    #[default]
    Default,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    En,
    Zh,
}

impl Language {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "en" | "english" => Some(Language::En),
            "zh" | "chinese" => Some(Language::Zh),
            _ => None,
        }
    }
}

/// One entry in a level's item pool
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemDef {
    #[serde(alias = "name")]
    pub label: String,
    #[serde(alias = "emoji")]
    pub icon: String,
    pub color: Color,
    pub points: i32,
    #[serde(default, alias = "isBomb")]
    pub is_hazard: bool,
}

impl ItemDef {
    pub fn new(label: &str, icon: &str, color: &str, points: i32, is_hazard: bool) -> Self {
        Self {
            label: label.to_string(),
            icon: icon.to_string(),
            color: Color::from_hex(color).unwrap_or(Color::BLACK),
            points,
            is_hazard,
        }
    }
}

/// A player-authored item; spawns as an ordinary target
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomItem {
    pub id: String,
    #[serde(alias = "text")]
    pub label: String,
    #[serde(alias = "emoji")]
    pub icon: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<Color>,
}

impl CustomItem {
    pub fn new(id: impl Into<String>, label: impl Into<String>, icon: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            icon: icon.into(),
            color: None,
        }
    }

    pub fn with_color(mut self, color: Color) -> Self {
        self.color = Some(color);
        self
    }
}

/// Colors handed out to custom items that don't carry one
pub const CUSTOM_ITEM_COLORS: [&str; 6] = [
    "#F43F5E", // Rose
    "#0D6E6E", // Teal
    "#FFC107", // Amber
    "#8B5CF6", // Violet
    "#06B6D4", // Cyan
    "#F97316", // Orange
];

/// Built-in moods
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Mood {
    Angry,
    Sad,
    Happy,
}

/// Session configuration supplied by level/content selection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LevelDescriptor {
    pub label: String,
    #[serde(alias = "interactionType")]
    pub interaction: InteractionMode,
    #[serde(alias = "visualTheme")]
    pub theme: VisualTheme,
    #[serde(alias = "musicBpm")]
    pub tempo_bpm: u32,
    #[serde(default, alias = "musicTheme")]
    pub music: MusicTheme,
    #[serde(default)]
    pub impact_words: Vec<String>,
    #[serde(default)]
    pub items: Vec<ItemDef>,
}

impl LevelDescriptor {
    /// Parse a descriptor from JSON
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// First hazard definition in the pool
    pub fn hazard(&self) -> Option<&ItemDef> {
        self.items.iter().find(|i| i.is_hazard)
    }

    /// Launch speed multiplier derived from the music tempo
    pub fn speed_multiplier(&self) -> f32 {
        if self.tempo_bpm > 140 {
            1.3
        } else if self.tempo_bpm < 100 {
            0.8
        } else {
            1.0
        }
    }

    /// Custom list seeded from this level's ordinary items
    pub fn default_custom_items(&self, mood_key: &str) -> Vec<CustomItem> {
        self.items
            .iter()
            .filter(|i| !i.is_hazard)
            .map(|i| {
                CustomItem::new(format!("default-{mood_key}-{}", i.label), &i.label, &i.icon)
                    .with_color(i.color)
            })
            .collect()
    }

    /// Built-in level for a mood
    pub fn preset(mood: Mood) -> Self {
        match mood {
            Mood::Angry => Self {
                label: "RAGE MODE".into(),
                interaction: InteractionMode::Destroy,
                theme: VisualTheme::Destruction,
                tempo_bpm: 170,
                music: MusicTheme::HeavyMetal,
                impact_words: Vec::new(),
                items: vec![
                    ItemDef::new("BAD BOSS/PROF", "👹", "#EF4444", 50, false),
                    ItemDef::new("BUGS/ERRORS", "🪲", "#F97316", 40, false),
                    ItemDef::new("CRASH", "💻", "#64748B", 30, false),
                    ItemDef::new("TROLLS", "😤", "#EA580C", 35, false),
                    ItemDef::new("LIES", "🤥", "#EAB308", 25, false),
                    ItemDef::new("MEETING/CLASS", "📢", "#475569", 30, false),
                    ItemDef::new("SPAM/ESSAY", "📧", "#7C3AED", 20, false),
                    ItemDef::new("TRAFFIC", "🚗", "#1E293B", 60, false),
                    ItemDef::new("FIRED/FAIL", "💣", "#000000", -100, true),
                    ItemDef::new("DEADLINE", "⏰", "#000000", -100, true),
                ],
            },
            Mood::Sad => Self {
                label: "GLOOM MODE".into(),
                interaction: InteractionMode::Destroy,
                theme: VisualTheme::SadRain,
                tempo_bpm: 85,
                music: MusicTheme::LoFi,
                impact_words: Vec::new(),
                items: vec![
                    ItemDef::new("OVERTIME/STUDY", "🌚", "#475569", 20, false),
                    ItemDef::new("COMMUTE", "🚌", "#64748B", 15, false),
                    ItemDef::new("POOR", "💸", "#94A3B8", 25, false),
                    ItemDef::new("INSOMNIA", "💤", "#6366F1", 10, false),
                    ItemDef::new("STRESS", "🌀", "#3B82F6", 30, false),
                    ItemDef::new("MONDAY", "📅", "#1E293B", 40, false),
                    ItemDef::new("TIRED", "😫", "#64748B", 20, false),
                    ItemDef::new("LONELY", "🍂", "#B45309", 20, false),
                    ItemDef::new("GHOSTED", "🕊️", "#F1F5F9", 15, false),
                    ItemDef::new("HR/ADVISOR", "💣", "#000000", -50, true),
                ],
            },
            Mood::Happy => Self {
                label: "CHILL MODE".into(),
                interaction: InteractionMode::Capture,
                theme: VisualTheme::Underwater,
                tempo_bpm: 110,
                music: MusicTheme::Arcade,
                impact_words: Vec::new(),
                items: vec![
                    ItemDef::new("SNACKS", "🧋", "#F97316", 10, false),
                    ItemDef::new("FISH", "🐟", "#0EA5E9", 50, false),
                    ItemDef::new("GOSSIP", "🍉", "#22C55E", 20, false),
                    ItemDef::new("PHONE", "📱", "#A855F7", 30, false),
                    ItemDef::new("FRIDAY", "🎉", "#EAB308", 40, false),
                    ItemDef::new("BREAK", "🚽", "#F1F5F9", 15, false),
                    ItemDef::new("LEAVE", "🏃", "#F59E0B", 25, false),
                    ItemDef::new("BONUS/A+", "💰", "#FACC15", 100, false),
                    ItemDef::new("BOSS/PROF", "🦈", "#000000", -80, true),
                    ItemDef::new("POP QUIZ", "💣", "#171717", -80, true),
                ],
            },
        }
    }
}

/// Feedback words shown on a successful contact
pub fn impact_words(language: Language, theme: VisualTheme) -> &'static [&'static str] {
    match (language, theme) {
        (Language::En, VisualTheme::SadRain) => &["Sigh...", "Bye...", "Tears", "Gone", "Oh no"],
        (Language::En, VisualTheme::Underwater) => {
            &["MINE!", "YAY!", "WOOHOO", "YUMMY", "NICE!", "COOL"]
        }
        (Language::En, _) => &["NOPE!", "BYE!", "SHUT UP", "GO AWAY", "BOOM", "K.O.", "GONE"],
        (Language::Zh, VisualTheme::SadRain) => &["呜呜", "走好", "拜拜", "叹气", "唉..."],
        (Language::Zh, VisualTheme::Underwater) => {
            &["拿来!", "我的!", "好耶!", "真香!", "加薪!", "Nice!"]
        }
        (Language::Zh, _) => &["滚!", "驳回!", "闭嘴!", "走开!", "再见!", "K.O.", "爽!"],
    }
}

/// Resolved word list for a session: level words win when present
pub fn session_words(level: &LevelDescriptor, language: Language) -> Vec<String> {
    if !level.impact_words.is_empty() {
        return level.impact_words.clone();
    }
    impact_words(language, level.theme)
        .iter()
        .map(|w| w.to_string())
        .collect()
}

/// Appearance and value of a spawned target
#[derive(Debug, Clone, PartialEq)]
pub struct ItemFace {
    pub label: String,
    pub icon: String,
    pub color: Color,
    pub points: i32,
}

impl From<&ItemDef> for ItemFace {
    fn from(def: &ItemDef) -> Self {
        Self {
            label: def.label.clone(),
            icon: def.icon.clone(),
            color: def.color,
            points: def.points,
        }
    }
}

/// What a session may spawn
#[derive(Debug, Clone)]
pub struct SpawnPool {
    ordinary: Vec<CustomItem>,
    hazard: ItemFace,
    speed_multiplier: f32,
}

impl SpawnPool {
    pub fn new(level: &LevelDescriptor, custom_items: &[CustomItem]) -> Self {
        let hazard = level.hazard().map(ItemFace::from).unwrap_or_else(|| ItemFace {
            label: "BOOM".into(),
            icon: "💣".into(),
            color: Color::BLACK,
            points: -50,
        });
        Self {
            ordinary: custom_items.to_vec(),
            hazard,
            speed_multiplier: level.speed_multiplier(),
        }
    }

    pub fn hazard(&self) -> &ItemFace {
        &self.hazard
    }

    pub fn speed_multiplier(&self) -> f32 {
        self.speed_multiplier
    }

    /// Pick an ordinary face; a filler when the pool is empty
    pub fn pick_ordinary<R: Rng>(&self, rng: &mut R) -> ItemFace {
        if self.ordinary.is_empty() {
            return ItemFace {
                label: "Air".into(),
                icon: "💨".into(),
                color: Color::from_hex("#CCCCCC").unwrap_or(Color::WHITE),
                points: 1,
            };
        }
        let item = &self.ordinary[rng.random_range(0..self.ordinary.len())];
        let color = item.color.unwrap_or_else(|| {
            let hex = CUSTOM_ITEM_COLORS[rng.random_range(0..CUSTOM_ITEM_COLORS.len())];
            Color::from_hex(hex).unwrap_or(Color::WHITE)
        });
        ItemFace {
            label: item.label.clone(),
            icon: item.icon.clone(),
            color,
            points: CUSTOM_ITEM_POINTS,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    #[test]
    fn test_color_hex_parsing() {
        let c = Color::from_hex("#FF0000").unwrap();
        assert_eq!(c.0, [1.0, 0.0, 0.0, 1.0]);
        let short = Color::from_hex("#fff").unwrap();
        assert_eq!(short.0, [1.0, 1.0, 1.0, 1.0]);
        assert!(Color::from_hex("FF0000").is_none());
        assert!(Color::from_hex("#GG0000").is_none());
        assert_eq!(Color::from_hex("#0D6E6E").unwrap().to_hex(), "#0D6E6E");
    }

    #[test]
    fn test_level_from_product_json() {
        let json = r##"{
            "label": "Vision Analysis Level",
            "interactionType": "SLICE",
            "visualTheme": "DESTRUCTION",
            "musicBpm": 150,
            "musicTheme": "LO_FI",
            "impactWords": ["Glitch", "Delete"],
            "items": [
                { "label": "Pixel", "icon": "👾", "color": "#d946ef", "points": 20 },
                { "label": "Void", "icon": "🕳️", "color": "#000000", "points": -100, "isHazard": true }
            ]
        }"##;
        let level = LevelDescriptor::from_json(json).unwrap();
        assert_eq!(level.interaction, InteractionMode::Destroy);
        assert_eq!(level.theme, VisualTheme::Destruction);
        assert_eq!(level.music, MusicTheme::LoFi);
        assert_eq!(level.hazard().unwrap().label, "Void");
        assert!((level.speed_multiplier() - 1.3).abs() < f32::EPSILON);
    }

    #[test]
    fn test_invalid_color_rejected() {
        let json = r#"{ "label": "x", "icon": "x", "color": "red", "points": 1 }"#;
        assert!(serde_json::from_str::<ItemDef>(json).is_err());
    }

    #[test]
    fn test_language_codes() {
        assert_eq!(Language::from_str("EN"), Some(Language::En));
        assert_eq!(Language::from_str("chinese"), Some(Language::Zh));
        assert_eq!(Language::from_str("fr"), None);
    }

    #[test]
    fn test_tempo_tiers() {
        let mut level = LevelDescriptor::preset(Mood::Sad);
        assert!((level.speed_multiplier() - 0.8).abs() < f32::EPSILON);
        level.tempo_bpm = 120;
        assert!((level.speed_multiplier() - 1.0).abs() < f32::EPSILON);
        level.tempo_bpm = 140;
        assert!((level.speed_multiplier() - 1.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_level_words_take_priority() {
        let mut level = LevelDescriptor::preset(Mood::Happy);
        let words = session_words(&level, Language::En);
        assert!(words.contains(&"YAY!".to_string()));

        level.impact_words = vec!["GONE".into()];
        assert_eq!(session_words(&level, Language::Zh), vec!["GONE".to_string()]);
    }

    #[test]
    fn test_default_custom_items_skip_hazards() {
        let level = LevelDescriptor::preset(Mood::Angry);
        let items = level.default_custom_items("ANGRY");
        assert_eq!(items.len(), 8);
        assert!(items.iter().all(|i| i.color.is_some()));
        assert_eq!(items[0].id, "default-ANGRY-BAD BOSS/PROF");
    }

    #[test]
    fn test_empty_pool_spawns_filler() {
        let level = LevelDescriptor::preset(Mood::Angry);
        let pool = SpawnPool::new(&level, &[]);
        let mut rng = Pcg32::seed_from_u64(1);
        let face = pool.pick_ordinary(&mut rng);
        assert_eq!(face.label, "Air");
        assert_eq!(face.points, 1);
        assert_eq!(pool.hazard().label, "FIRED/FAIL");
    }

    #[test]
    fn test_custom_items_score_fixed_points() {
        let level = LevelDescriptor::preset(Mood::Happy);
        let pool = SpawnPool::new(&level, &[CustomItem::new("a", "Tea", "🧋")]);
        let mut rng = Pcg32::seed_from_u64(7);
        let face = pool.pick_ordinary(&mut rng);
        assert_eq!(face.label, "Tea");
        assert_eq!(face.points, CUSTOM_ITEM_POINTS);
        let palette: Vec<Color> = CUSTOM_ITEM_COLORS
            .iter()
            .filter_map(|h| Color::from_hex(h))
            .collect();
        assert!(palette.contains(&face.color));
    }

    #[test]
    fn test_default_hazard_when_level_has_none() {
        let mut level = LevelDescriptor::preset(Mood::Happy);
        level.items.retain(|i| !i.is_hazard);
        let pool = SpawnPool::new(&level, &[]);
        assert_eq!(pool.hazard().label, "BOOM");
        assert_eq!(pool.hazard().points, -50);
    }
}
