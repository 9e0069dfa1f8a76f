//! Data-driven game balance
//!
//! Values that used to be compile-time constants, persisted so they can be
//! tweaked between runs without a rebuild.

use serde::{Deserialize, Serialize};

use crate::record::{FieldDescriptor, FieldKind, Record, RecordKind};

/// Game tuning record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameData {
    /// Ball launch speed (pixels/s)
    pub ball_start_speed: f32,
    /// Gravity can't slow the ball below this
    pub ball_min_speed: f32,
    pub ball_max_speed: f32,
    /// Acceleration toward the arena center (pixels/s²)
    pub black_hole_gravity: f32,
    /// Multiplicative speed boost on paddle hit
    pub paddle_boost: f32,
    /// Paddle arc width in radians
    pub paddle_arc_width: f32,
    /// Maximum simulation substeps per frame
    pub max_substeps: u32,
    /// Rest period between waves
    pub breather_seconds: f32,
}

impl Default for GameData {
    fn default() -> Self {
        Self {
            ball_start_speed: 200.0,
            ball_min_speed: 150.0,
            ball_max_speed: 400.0,
            black_hole_gravity: 120.0,
            paddle_boost: 1.15,
            paddle_arc_width: 1.21,
            max_substeps: 8,
            breather_seconds: 5.0,
        }
    }
}

impl Record for GameData {
    const KIND: RecordKind = RecordKind::Game;

    fn fields() -> &'static [FieldDescriptor] {
        const FIELDS: &[FieldDescriptor] = &[
            FieldDescriptor::new("ball_start_speed", FieldKind::Float, "Ball")
                .with_range(0.0, 2000.0),
            FieldDescriptor::new("ball_min_speed", FieldKind::Float, "Ball")
                .with_range(0.0, 2000.0),
            FieldDescriptor::new("ball_max_speed", FieldKind::Float, "Ball")
                .with_range(0.0, 2000.0),
            FieldDescriptor::new("black_hole_gravity", FieldKind::Float, "Arena")
                .with_range(0.0, 1000.0),
            FieldDescriptor::new("paddle_boost", FieldKind::Float, "Paddle").with_range(1.0, 3.0),
            FieldDescriptor::new("paddle_arc_width", FieldKind::Float, "Paddle")
                .with_range(0.1, 6.28),
            FieldDescriptor::new("max_substeps", FieldKind::Int, "Simulation")
                .with_range(1.0, 64.0),
            FieldDescriptor::new("breather_seconds", FieldKind::Float, "Waves")
                .with_range(0.0, 60.0),
        ];
        FIELDS
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{set_field, to_text};

    #[test]
    fn test_float_text_is_stable() {
        let text = to_text(&GameData::default()).unwrap();
        assert!(text.contains(r#""paddle_boost":1.15"#), "{text}");
        assert_eq!(text, to_text(&GameData::default()).unwrap());
    }

    #[test]
    fn test_set_tuning_fields() {
        let mut tuning = GameData::default();
        set_field(&mut tuning, "paddle_boost", "1.5").unwrap();
        set_field(&mut tuning, "max_substeps", "4").unwrap();
        assert_eq!(tuning.paddle_boost, 1.5);
        assert_eq!(tuning.max_substeps, 4);
        assert!(set_field(&mut tuning, "max_substeps", "0").is_err());
        assert_eq!(tuning.max_substeps, 4);
    }

    #[test]
    fn test_every_field_has_a_descriptor() {
        let value = serde_json::to_value(GameData::default()).unwrap();
        let object = value.as_object().unwrap();
        assert_eq!(object.len(), GameData::fields().len());
        for field in GameData::fields() {
            assert!(object.contains_key(field.name), "{}", field.name);
        }
    }
}
