//! HUD text output
//!
//! The session hands a `HudSnapshot` to whatever implements `HudSink`. In the
//! browser that is a table of DOM elements resolved once at startup; a missing
//! element simply never gets written.

use serde::Serialize;

use crate::sim::GameState;

/// One HUD text slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum HudField {
    Score,
    Wave,
    Health,
    Enemies,
    Kills,
    HealthPacks,
    SurvivalTime,
}

impl HudField {
    pub const ALL: [HudField; 7] = [
        HudField::Score,
        HudField::Wave,
        HudField::Health,
        HudField::Enemies,
        HudField::Kills,
        HudField::HealthPacks,
        HudField::SurvivalTime,
    ];

    /// DOM id of the element showing this field
    pub fn element_id(self) -> &'static str {
        match self {
            HudField::Score => "hud-score",
            HudField::Wave => "hud-wave",
            HudField::Health => "hud-health",
            HudField::Enemies => "hud-enemies",
            HudField::Kills => "hud-kills",
            HudField::HealthPacks => "hud-health-packs",
            HudField::SurvivalTime => "hud-time",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            HudField::Score => "Score",
            HudField::Wave => "Wave",
            HudField::Health => "Health",
            HudField::Enemies => "Enemies",
            HudField::Kills => "Kills",
            HudField::HealthPacks => "Health packs",
            HudField::SurvivalTime => "Time",
        }
    }
}

/// Destination for HUD text
pub trait HudSink {
    fn set_text(&mut self, field: HudField, text: &str);
}

/// Plain in-memory sink, used by the headless demo and tests
impl HudSink for std::collections::HashMap<HudField, String> {
    fn set_text(&mut self, field: HudField, text: &str) {
        self.insert(field, text.to_string());
    }
}

/// HUD values captured from one frame
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HudSnapshot {
    pub score: u64,
    pub wave: u32,
    pub health: u32,
    pub enemies: usize,
    pub kills: u32,
    pub health_packs: u32,
    pub survival_ms: f32,
}

impl HudSnapshot {
    pub fn from_state(state: &GameState) -> Self {
        Self {
            score: state.score,
            wave: state.wave.number,
            health: state.player.health.max(0.0).ceil() as u32,
            enemies: state.enemies.len(),
            kills: state.kills,
            health_packs: state.health_packs_collected,
            survival_ms: state.elapsed_ms,
        }
    }

    pub fn text(&self, field: HudField) -> String {
        match field {
            HudField::Score => self.score.to_string(),
            HudField::Wave => self.wave.to_string(),
            HudField::Health => self.health.to_string(),
            HudField::Enemies => self.enemies.to_string(),
            HudField::Kills => self.kills.to_string(),
            HudField::HealthPacks => self.health_packs.to_string(),
            HudField::SurvivalTime => format_survival_time(self.survival_ms),
        }
    }

    /// Write every field whose text differs from `previous`
    pub fn write_to(&self, sink: &mut dyn HudSink, previous: Option<&HudSnapshot>) {
        for field in HudField::ALL {
            let text = self.text(field);
            if previous.is_some_and(|prev| prev.text(field) == text) {
                continue;
            }
            sink.set_text(field, &text);
        }
    }
}

/// `m:ss` from milliseconds
pub fn format_survival_time(ms: f32) -> String {
    let total = (ms.max(0.0) / 1000.0).floor() as u64;
    format!("{}:{:02}", total / 60, total % 60)
}
