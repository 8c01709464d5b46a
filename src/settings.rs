//! Player preferences
//!
//! Host-owned knobs that shape presentation only: the cosmetic particle
//! budget, volumes and accessibility. Gameplay never reads them.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{SimError, SimResult, require_fraction};

/// Visual quality tier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum QualityPreset {
    Low,
    #[default]
    Medium,
    High,
}

/// How many cosmetic particles may exist, and how full each burst is
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParticleBudget {
    pub cap: usize,
    /// Fraction of a full-quality burst actually emitted
    pub density: f32,
}

impl QualityPreset {
    pub fn label(self) -> &'static str {
        match self {
            QualityPreset::Low => "low",
            QualityPreset::Medium => "medium",
            QualityPreset::High => "high",
        }
    }

    fn budget(self) -> ParticleBudget {
        let (cap, density) = match self {
            QualityPreset::Low => (100, 0.25),
            QualityPreset::Medium => (500, 0.6),
            QualityPreset::High => (2000, 1.0),
        };
        ParticleBudget { cap, density }
    }
}

impl FromStr for QualityPreset {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "low" => Ok(QualityPreset::Low),
            "medium" | "med" => Ok(QualityPreset::Medium),
            "high" => Ok(QualityPreset::High),
            other => Err(format!("unknown quality preset '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub quality: QualityPreset,
    /// Cosmetic particles at all
    pub particles: bool,

    // Volumes in [0, 1]
    pub master_volume: f32,
    pub sfx_volume: f32,
    pub music_volume: f32,
    pub muted: bool,

    /// Quarter particle budget
    pub reduced_motion: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            quality: QualityPreset::Medium,
            particles: true,
            master_volume: 0.3,
            sfx_volume: 0.6,
            music_volume: 0.4,
            muted: false,
            reduced_motion: false,
        }
    }
}

impl Settings {
    pub fn from_preset(quality: QualityPreset) -> Self {
        Self {
            quality,
            ..Self::default()
        }
    }

    /// Effective particle budget after the toggles
    pub fn particle_budget(&self) -> ParticleBudget {
        let mut budget = self.quality.budget();
        if !self.particles {
            budget.cap = 0;
        } else if self.reduced_motion {
            budget.cap /= 4;
        }
        budget
    }

    pub fn from_json(json: &str) -> SimResult<Self> {
        let settings: Settings = serde_json::from_str(json)
            .map_err(|source| SimError::Parse { what: "settings", source })?;
        settings.validate()?;
        log::info!("Loaded settings ({} quality)", settings.quality.label());
        Ok(settings)
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }

    pub fn validate(&self) -> SimResult<()> {
        require_fraction("master_volume", self.master_volume)?;
        require_fraction("sfx_volume", self.sfx_volume)?;
        require_fraction("music_volume", self.music_volume)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preset_parse() {
        assert_eq!("HIGH".parse::<QualityPreset>(), Ok(QualityPreset::High));
        assert_eq!("med".parse::<QualityPreset>(), Ok(QualityPreset::Medium));
        assert!("ultra".parse::<QualityPreset>().is_err());
    }

    #[test]
    fn test_particle_budget_toggles() {
        let mut settings = Settings::from_preset(QualityPreset::Low);
        assert_eq!(settings.particle_budget().cap, 100);
        settings.reduced_motion = true;
        assert_eq!(settings.particle_budget().cap, 25);
        settings.particles = false;
        assert_eq!(settings.particle_budget().cap, 0);
        assert_eq!(settings.particle_budget().density, 0.25);
    }

    #[test]
    fn test_json_round_trip() {
        let settings = Settings::from_preset(QualityPreset::High);
        let restored = Settings::from_json(&settings.to_json()).unwrap();
        assert_eq!(restored.quality, QualityPreset::High);
    }

    #[test]
    fn test_rejects_loud_volume() {
        assert!(Settings::from_json(r#"{ "master_volume": 3.0 }"#).is_err());
    }
}
