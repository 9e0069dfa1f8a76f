//! Player progression record
//!
//! Loaded eagerly at startup and encrypted whenever encryption is enabled.

use serde::{Deserialize, Serialize};

use crate::record::{FieldDescriptor, FieldKind, Record, RecordKind};

/// Player progression
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct PlayerData {
    /// Current level (1-based once a profile exists)
    pub level: i32,
    /// Accumulated score
    pub score: i32,
}

impl PlayerData {
    /// Template applied on first run and on reset
    pub fn initial() -> Self {
        Self { level: 1, score: 0 }
    }
}

impl Record for PlayerData {
    const KIND: RecordKind = RecordKind::Player;

    fn fields() -> &'static [FieldDescriptor] {
        const FIELDS: &[FieldDescriptor] = &[
            FieldDescriptor::new("level", FieldKind::Int, "Player Data")
                .with_range(0.0, i32::MAX as f64),
            FieldDescriptor::new("score", FieldKind::Int, "Player Data")
                .with_range(0.0, i32::MAX as f64),
        ];
        FIELDS
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{merge_text, to_text};

    #[test]
    fn test_initial_template() {
        let initial = PlayerData::initial();
        assert_eq!(initial.level, 1);
        assert_eq!(initial.score, 0);
        assert_ne!(initial, PlayerData::default());
    }

    #[test]
    fn test_canonical_text() {
        let player = PlayerData { level: 3, score: 90 };
        assert_eq!(to_text(&player).unwrap(), r#"{"level":3,"score":90}"#);
    }

    #[test]
    fn test_merge_keeps_absent_fields() {
        let mut player = PlayerData { level: 1, score: 2 };
        merge_text(&mut player, r#"{"level":9}"#).unwrap();
        assert_eq!(player, PlayerData { level: 9, score: 2 });
    }

    #[test]
    fn test_descriptors_match_serialized_fields() {
        let names: Vec<_> = PlayerData::fields().iter().map(|f| f.name).collect();
        assert_eq!(names, ["level", "score"]);
        assert_eq!(PlayerData::fields()[0].display_name(), "Level");
    }
}
