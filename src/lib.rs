//! Gamedata Store - typed game record persistence
//!
//! Core modules:
//! - `persistence`: Load/save/reset pipeline with pluggable encodings and encryption
//! - `record`: Record identity, field descriptors and name-keyed merging
//! - `config`: Where and how records are persisted
//! - `player`, `tuning`, `settings`: The persisted records

pub mod config;
pub mod persistence;
pub mod player;
pub mod record;
pub mod settings;
pub mod tuning;

pub use config::{ConfigOverrides, PersistenceConfig};
pub use persistence::{LoadOutcome, PersistenceError, PersistenceService, SerializationFormat};
pub use player::PlayerData;
pub use record::{FieldDescriptor, FieldKind, Record, RecordKind};
pub use settings::{QualityPreset, SettingsData};
pub use tuning::GameData;
