//! Runtime settings and debug toggles
//!
//! Nothing here is persisted. The browser shell may pass a JSON override on
//! the canvas's `data-settings` attribute; unknown or missing keys fall back
//! to defaults.

use serde::{Deserialize, Serialize};

/// Quality preset levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
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

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "low" => Some(QualityPreset::Low),
            "medium" | "med" => Some(QualityPreset::Medium),
            "high" => Some(QualityPreset::High),
            _ => None,
        }
    }

    /// Maximum burst particles alive at once
    pub fn max_particles(&self) -> usize {
        match self {
            QualityPreset::Low => 100,
            QualityPreset::Medium => 500,
            QualityPreset::High => 2000,
        }
    }

    /// Whether to draw the background grid
    pub fn grid_enabled(&self) -> bool {
        !matches!(self, QualityPreset::Low)
    }
}

/// Game settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub quality: QualityPreset,
    /// Particle bursts on hits and kills
    pub particles: bool,
    /// Debug telemetry overlay
    pub show_debug: bool,
    /// Off-screen enemy markers
    pub show_indicators: bool,
    /// Debug: no player shot cooldown
    pub rapid_fire: bool,
    /// Fixed seed for reproducible runs; time-based when absent
    pub seed: Option<u64>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            quality: QualityPreset::Medium,
            particles: true,
            show_debug: false,
            show_indicators: true,
            rapid_fire: false,
            seed: None,
        }
    }
}

impl Settings {
    pub fn from_preset(preset: QualityPreset) -> Self {
        Self {
            quality: preset,
            ..Self::default()
        }
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Parse an optional override, logging and falling back to defaults on
    /// malformed input
    pub fn from_json_or_default(json: Option<&str>) -> Self {
        let Some(json) = json.filter(|s| !s.trim().is_empty()) else {
            return Self::default();
        };
        match Self::from_json(json) {
            Ok(settings) => {
                log::info!("Loaded settings override ({} quality)", settings.quality.as_str());
                settings
            }
            Err(e) => {
                log::warn!("Ignoring malformed settings override: {}", e);
                Self::default()
            }
        }
    }

    /// Effective particle cap
    pub fn max_particles(&self) -> usize {
        if self.particles {
            self.quality.max_particles()
        } else {
            0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_keeps_defaults() {
        let settings = Settings::from_json(r#"{"quality":"high","show_debug":true}"#);
        let settings = settings.unwrap_or_default();
        assert_eq!(settings.quality, QualityPreset::High);
        assert!(settings.show_debug);
        assert!(settings.show_indicators);
        assert_eq!(settings.max_particles(), 2000);
    }

    #[test]
    fn test_malformed_json_falls_back() {
        assert!(Settings::from_json("{nope").is_err());
        assert_eq!(Settings::from_json_or_default(Some("{nope")), Settings::default());
        assert_eq!(Settings::from_json_or_default(None), Settings::default());
        assert_eq!(Settings::from_json_or_default(Some("  ")), Settings::default());
    }

    #[test]
    fn test_particles_off_zeroes_cap() {
        let settings = Settings {
            particles: false,
            ..Settings::default()
        };
        assert_eq!(settings.max_particles(), 0);
    }

    #[test]
    fn test_preset_parse() {
        assert_eq!(QualityPreset::parse("MED"), Some(QualityPreset::Medium));
        assert_eq!(QualityPreset::parse("ultra"), None);
        assert!(!QualityPreset::Low.grid_enabled());
        assert_eq!(Settings::from_preset(QualityPreset::Low).quality, QualityPreset::Low);
    }
}
