//! Persistence configuration (`gamedata.toml`)
//!
//! Every field has a serde default so a partial or missing file is valid.
//! An unrecognised format name is a parse error rather than a fallback.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::persistence::SerializationFormat;
use crate::record::RecordKind;

/// Name of the configuration file inside [`config_dir`]
pub const CONFIG_FILE_NAME: &str = "gamedata.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to access config file {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
}

/// How and where records are persisted
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersistenceConfig {
    /// Root directory for record files
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
    /// On-disk envelope for every record
    #[serde(default)]
    pub format: SerializationFormat,
    /// Encrypt records (Settings is always exempt)
    #[serde(default)]
    pub encryption_enabled: bool,
    /// Empty disables encryption even when enabled
    #[serde(default)]
    pub passphrase: String,
    /// Write through `<file>.tmp` and rename into place
    #[serde(default)]
    pub atomic_writes: bool,
    /// Records loaded by `PersistenceService::load_eager`
    #[serde(default = "default_eager_load")]
    pub eager_load: Vec<RecordKind>,
    /// File names relative to `data_dir`
    #[serde(default)]
    pub files: FileNames,
}

/// One file name per record kind
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileNames {
    #[serde(default = "default_player_file")]
    pub player: String,
    #[serde(default = "default_game_file")]
    pub game: String,
    #[serde(default = "default_settings_file")]
    pub settings: String,
}

fn default_data_dir() -> PathBuf {
    data_dir().unwrap_or_else(|| PathBuf::from("data"))
}
fn default_eager_load() -> Vec<RecordKind> {
    vec![RecordKind::Player]
}
fn default_player_file() -> String {
    "player.dat".to_string()
}
fn default_game_file() -> String {
    "game.dat".to_string()
}
fn default_settings_file() -> String {
    "settings.dat".to_string()
}

impl Default for FileNames {
    fn default() -> Self {
        Self {
            player: default_player_file(),
            game: default_game_file(),
            settings: default_settings_file(),
        }
    }
}

impl Default for PersistenceConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            format: SerializationFormat::default(),
            encryption_enabled: false,
            passphrase: String::new(),
            atomic_writes: false,
            eager_load: default_eager_load(),
            files: FileNames::default(),
        }
    }
}

impl PersistenceConfig {
    /// Defaults rooted at `data_dir`
    pub fn with_data_dir(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            ..Self::default()
        }
    }

    /// Stable file path for a record kind
    pub fn path_for(&self, kind: RecordKind) -> PathBuf {
        let name = match kind {
            RecordKind::Player => &self.files.player,
            RecordKind::Game => &self.files.game,
            RecordKind::Settings => &self.files.settings,
        };
        self.data_dir.join(name)
    }

    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Load from `path`, returning defaults if the file doesn't exist
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => {
                let config = Self::from_toml(&content)?;
                log::info!("Loaded persistence config from {}", path.display());
                Ok(config)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                log::info!("No config at {}, using defaults", path.display());
                Ok(Self::default())
            }
            Err(source) => Err(ConfigError::Io {
                path: path.to_path_buf(),
                source,
            }),
        }
    }

    /// Write to `path`, creating parent directories
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let io_err = |source: std::io::Error| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        };
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(io_err)?;
        }
        std::fs::write(path, self.to_toml()?).map_err(io_err)?;
        Ok(())
    }

    /// Load from the platform config directory
    pub fn load() -> Result<Self, ConfigError> {
        match config_dir() {
            Some(dir) => Self::load_from(&dir.join(CONFIG_FILE_NAME)),
            None => Ok(Self::default()),
        }
    }
}

/// Values given on the command line, layered over a loaded config
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigOverrides {
    pub data_dir: Option<PathBuf>,
    pub format: Option<SerializationFormat>,
    /// Only ever switches encryption on
    pub encrypt: bool,
    pub passphrase: Option<String>,
}

impl ConfigOverrides {
    pub fn apply(&self, config: &mut PersistenceConfig) {
        if let Some(dir) = &self.data_dir {
            config.data_dir = dir.clone();
        }
        if let Some(format) = self.format {
            config.format = format;
        }
        if self.encrypt {
            config.encryption_enabled = true;
        }
        if let Some(passphrase) = &self.passphrase {
            config.passphrase = passphrase.clone();
        }
    }
}

/// Returns the platform-specific configuration directory.
///
/// Returns `None` if the home directory cannot be determined.
pub fn config_dir() -> Option<PathBuf> {
    directories::ProjectDirs::from("com", "paulrobello", "gamedata-store")
        .map(|dirs| dirs.config_dir().to_path_buf())
}

/// Returns the platform-specific data directory where record files live.
pub fn data_dir() -> Option<PathBuf> {
    directories::ProjectDirs::from("com", "paulrobello", "gamedata-store")
        .map(|dirs| dirs.data_dir().to_path_buf())
}
