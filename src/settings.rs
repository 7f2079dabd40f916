//! Game settings and preferences
//!
//! Persisted as JSON next to the executable's working directory.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

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

    /// Shadow map resolution (square) for this preset
    pub fn shadow_map_size(&self) -> u32 {
        match self {
            QualityPreset::Low => 1024,
            QualityPreset::Medium => 2048,
            QualityPreset::High => 4096,
        }
    }

    /// Whether the shaded pass runs the 3x3 PCF kernel or a single tap
    pub fn pcf_enabled(&self) -> bool {
        !matches!(self, QualityPreset::Low)
    }
}

/// Game settings/preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Graphics quality preset
    pub quality: QualityPreset,
    /// Show frame timing in the log once per second
    pub show_fps: bool,
    /// Fixed RNG seed for obstacle patterns; None draws one from entropy
    pub seed: Option<u64>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            quality: QualityPreset::Medium,
            show_fps: false,
            seed: None,
        }
    }
}

impl Settings {
    const FILE_NAME: &'static str = "voidlane_settings.json";

    pub fn shadow_map_size(&self) -> u32 {
        self.quality.shadow_map_size()
    }

    pub fn pcf_enabled(&self) -> bool {
        self.quality.pcf_enabled()
    }

    fn default_path() -> PathBuf {
        PathBuf::from(Self::FILE_NAME)
    }

    /// Load settings from disk, falling back to defaults on any failure
    pub fn load() -> Self {
        Self::load_from(&Self::default_path())
    }

    pub fn load_from(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(json) => match serde_json::from_str(&json) {
                Ok(settings) => {
                    log::info!("loaded settings from {}", path.display());
                    settings
                }
                Err(e) => {
                    log::warn!("settings file unreadable ({e}), using defaults");
                    Self::default()
                }
            },
            Err(_) => {
                log::info!("no settings file, using defaults");
                Self::default()
            }
        }
    }

    pub fn save(&self) {
        self.save_to(&Self::default_path());
    }

    pub fn save_to(&self, path: &Path) {
        match serde_json::to_string_pretty(self) {
            Ok(json) => {
                if let Err(e) = std::fs::write(path, json) {
                    log::warn!("failed to save settings: {e}");
                } else {
                    log::info!("settings saved to {}", path.display());
                }
            }
            Err(e) => log::warn!("failed to serialize settings: {e}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preset_scales_the_shadow_map() {
        assert!(QualityPreset::Low.shadow_map_size() < QualityPreset::High.shadow_map_size());
        assert!(!QualityPreset::Low.pcf_enabled());
        assert!(QualityPreset::High.pcf_enabled());
    }

    #[test]
    fn preset_parses_case_insensitively() {
        assert_eq!(QualityPreset::from_str("HIGH"), Some(QualityPreset::High));
        assert_eq!(QualityPreset::from_str("med"), Some(QualityPreset::Medium));
        assert_eq!(QualityPreset::from_str("ultra"), None);
    }

    #[test]
    fn settings_round_trip_through_json() {
        let settings = Settings {
            quality: QualityPreset::High,
            show_fps: true,
            seed: Some(42),
        };
        let json = serde_json::to_string(&settings).unwrap();
        let back: Settings = serde_json::from_str(&json).unwrap();
        assert_eq!(back, settings);
    }

    #[test]
    fn unknown_fields_fall_back_to_defaults() {
        let back: Settings = serde_json::from_str("{}").unwrap();
        assert_eq!(back, Settings::default());
    }
}
