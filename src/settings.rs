//! Game settings and preferences
//!
//! Persisted in its own file and never encrypted, so players can edit it by
//! hand.

use serde::{Deserialize, Serialize};

use crate::record::{FieldDescriptor, FieldKind, Record, RecordKind};

/// Quality preset levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum QualityPreset {
    Low,
    #[default]
    Medium,
    High,
}

impl QualityPreset {
    pub const NAMES: &'static [&'static str] = &["Low", "Medium", "High"];

    pub fn as_str(&self) -> &'static str {
        match self {
            QualityPreset::Low => "Low",
            QualityPreset::Medium => "Medium",
            QualityPreset::High => "High",
        }
    }
}

/// Game settings/preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SettingsData {
    /// Graphics quality preset
    pub quality: QualityPreset,

    // === Visual Effects ===
    /// Screen shake on explosions/impacts
    pub screen_shake: bool,
    /// Ball trails
    pub trails: bool,
    /// Particle effects (explosions, sparks, etc.)
    pub particles: bool,

    // === HUD ===
    /// Show FPS counter
    pub show_fps: bool,

    // === Audio ===
    /// Master volume (0.0 - 1.0)
    pub master_volume: f32,
    /// Sound effects volume (0.0 - 1.0)
    pub sfx_volume: f32,
    /// Music volume (0.0 - 1.0)
    pub music_volume: f32,

    // === Accessibility ===
    /// Reduced motion (minimize shake, flashes)
    pub reduced_motion: bool,
    /// High contrast mode
    pub high_contrast: bool,
}

impl Default for SettingsData {
    fn default() -> Self {
        Self {
            quality: QualityPreset::Medium,

            screen_shake: true,
            trails: true,
            particles: true,

            show_fps: false,

            master_volume: 0.8,
            sfx_volume: 1.0,
            music_volume: 0.7,

            reduced_motion: false,
            high_contrast: false,
        }
    }
}

impl Record for SettingsData {
    const KIND: RecordKind = RecordKind::Settings;

    fn fields() -> &'static [FieldDescriptor] {
        const FIELDS: &[FieldDescriptor] = &[
            FieldDescriptor::new("quality", FieldKind::Choice(QualityPreset::NAMES), "Graphics"),
            FieldDescriptor::new("screen_shake", FieldKind::Bool, "Visual Effects"),
            FieldDescriptor::new("trails", FieldKind::Bool, "Visual Effects"),
            FieldDescriptor::new("particles", FieldKind::Bool, "Visual Effects"),
            FieldDescriptor::new("show_fps", FieldKind::Bool, "HUD"),
            FieldDescriptor::new("master_volume", FieldKind::Float, "Audio").with_range(0.0, 1.0),
            FieldDescriptor::new("sfx_volume", FieldKind::Float, "Audio").with_range(0.0, 1.0),
            FieldDescriptor::new("music_volume", FieldKind::Float, "Audio").with_range(0.0, 1.0),
            FieldDescriptor::new("reduced_motion", FieldKind::Bool, "Accessibility"),
            FieldDescriptor::new("high_contrast", FieldKind::Bool, "Accessibility"),
        ];
        FIELDS
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{get_field, set_field};

    #[test]
    fn test_quality_choice_names_match_serde() {
        for name in QualityPreset::NAMES {
            let preset: QualityPreset = serde_json::from_value(serde_json::json!(name)).unwrap();
            assert_eq!(preset.as_str(), *name);
        }
    }

    #[test]
    fn test_set_quality_and_volume() {
        let mut settings = SettingsData::default();
        set_field(&mut settings, "quality", "low").unwrap();
        set_field(&mut settings, "master_volume", "0.25").unwrap();
        set_field(&mut settings, "show_fps", "on").unwrap();
        assert_eq!(settings.quality, QualityPreset::Low);
        assert_eq!(settings.master_volume, 0.25);
        assert!(settings.show_fps);
        assert_eq!(get_field(&settings, "quality"), Some(serde_json::json!("Low")));
    }

    #[test]
    fn test_volume_out_of_range_rejected() {
        let mut settings = SettingsData::default();
        assert!(set_field(&mut settings, "sfx_volume", "1.5").is_err());
        assert_eq!(settings.sfx_volume, 1.0);
    }
}
