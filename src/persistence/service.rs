//! Load / save / reset protocol for the persisted records
//!
//! Save: record → JSON text → format envelope → (AES) → file.
//! Load runs the same chain backwards and merges the text into the
//! in-memory record by field name.

use std::ffi::OsString;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

use super::cipher::{self, CipherError};
use super::codec::{CodecError, SerializationFormat};
use crate::config::PersistenceConfig;
use crate::player::PlayerData;
use crate::record::{self, Record, RecordError, RecordKind};
use crate::settings::SettingsData;
use crate::tuning::GameData;

#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("{0} record is not set")]
    RecordUnset(RecordKind),

    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to decrypt {kind} record: {source}")]
    Decrypt {
        kind: RecordKind,
        #[source]
        source: CipherError,
    },

    #[error("failed to encode {kind} record: {source}")]
    Encode {
        kind: RecordKind,
        #[source]
        source: CodecError,
    },

    #[error("failed to decode {kind} record: {source}")]
    Decode {
        kind: RecordKind,
        #[source]
        source: CodecError,
    },

    #[error(transparent)]
    Record(#[from] RecordError),
}

impl PersistenceError {
    fn io(path: &Path, source: io::Error) -> Self {
        PersistenceError::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// What a successful `load` did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// No file existed; the record was seeded and written
    Bootstrapped,
    /// The file was read and merged into the record
    Loaded,
    /// The file exists but is empty; the record was left alone
    SkippedEmpty,
}

/// An in-memory record plus its optional default template
#[derive(Debug, Clone)]
pub struct RecordSlot<R> {
    record: Option<R>,
    template: Option<R>,
}

impl<R: Record> RecordSlot<R> {
    pub fn new(record: Option<R>, template: Option<R>) -> Self {
        Self { record, template }
    }

    pub fn record(&self) -> Option<&R> {
        self.record.as_ref()
    }

    pub fn record_mut(&mut self) -> Option<&mut R> {
        self.record.as_mut()
    }

    /// `None` leaves the slot unset; load and save then refuse to run
    pub fn set_record(&mut self, record: Option<R>) {
        self.record = record;
    }

    pub fn set_template(&mut self, template: Option<R>) {
        self.template = template;
    }

    /// Merge the template into the record, if both are present
    fn apply_template(&mut self) -> Result<bool, RecordError> {
        match (&mut self.record, &self.template) {
            (Some(record), Some(template)) => {
                record::apply_template(record, template)?;
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}

impl<R: Record> Default for RecordSlot<R> {
    fn default() -> Self {
        Self::new(Some(R::default()), None)
    }
}

/// Whether records of `kind` are encrypted under `config`
///
/// Settings stays plaintext regardless of the global flag.
pub fn encryption_applies(config: &PersistenceConfig, kind: RecordKind) -> bool {
    config.encryption_enabled && kind != RecordKind::Settings
}

/// Per-kind byte pipeline resolved from the config
struct Pipeline<'a> {
    kind: RecordKind,
    path: PathBuf,
    format: SerializationFormat,
    passphrase: Option<&'a str>,
    atomic: bool,
}

impl<'a> Pipeline<'a> {
    fn new(config: &'a PersistenceConfig, kind: RecordKind) -> Self {
        Self {
            kind,
            path: config.path_for(kind),
            format: config.format,
            passphrase: encryption_applies(config, kind).then_some(config.passphrase.as_str()),
            atomic: config.atomic_writes,
        }
    }

    fn seal(&self, text: &str) -> Result<Vec<u8>, PersistenceError> {
        let encoded = self
            .format
            .encode(text)
            .map_err(|source| PersistenceError::Encode {
                kind: self.kind,
                source,
            })?;
        Ok(match self.passphrase {
            Some(passphrase) => cipher::encrypt(&encoded, passphrase),
            None => encoded,
        })
    }

    fn open(&self, bytes: Vec<u8>) -> Result<String, PersistenceError> {
        let plain = match self.passphrase {
            Some(passphrase) => {
                cipher::decrypt(&bytes, passphrase).map_err(|source| PersistenceError::Decrypt {
                    kind: self.kind,
                    source,
                })?
            }
            None => bytes,
        };
        self.format
            .decode(&plain)
            .map_err(|source| PersistenceError::Decode {
                kind: self.kind,
                source,
            })
    }

    fn write(&self, bytes: &[u8]) -> Result<(), PersistenceError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent).map_err(|e| PersistenceError::io(parent, e))?;
                log::info!("Created data directory {}", parent.display());
            }
        }

        if !self.atomic {
            return fs::write(&self.path, bytes).map_err(|e| PersistenceError::io(&self.path, e));
        }

        let tmp_path = self.tmp_path();
        fs::write(&tmp_path, bytes).map_err(|e| PersistenceError::io(&tmp_path, e))?;

        if let Err(e) = self.replace_with(&tmp_path) {
            if let Err(cleanup) = fs::remove_file(&tmp_path) {
                log::warn!("Failed to remove {}: {}", tmp_path.display(), cleanup);
            }
            return Err(e);
        }
        Ok(())
    }

    fn replace_with(&self, tmp_path: &Path) -> Result<(), PersistenceError> {
        #[cfg(windows)]
        {
            if self.path.exists() {
                // Windows rename fails if destination exists.
                fs::remove_file(&self.path).map_err(|e| PersistenceError::io(&self.path, e))?;
            }
        }

        fs::rename(tmp_path, &self.path).map_err(|e| PersistenceError::io(&self.path, e))
    }

    fn tmp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(OsString::from)
            .unwrap_or_else(|| OsString::from(self.kind.as_str()));
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

fn save_slot<R: Record>(
    pipeline: &Pipeline<'_>,
    slot: &RecordSlot<R>,
) -> Result<(), PersistenceError> {
    let Some(record) = slot.record() else {
        log::error!("Cannot save {} data: record is not set", R::KIND);
        return Err(PersistenceError::RecordUnset(R::KIND));
    };

    let result = record::to_text(record)
        .map_err(PersistenceError::from)
        .and_then(|text| pipeline.seal(&text))
        .and_then(|bytes| pipeline.write(&bytes).map(|()| bytes.len()));

    match result {
        Ok(len) => {
            log::info!(
                "{} data saved to {} ({} bytes)",
                R::KIND,
                pipeline.path.display(),
                len
            );
            Ok(())
        }
        Err(e) => {
            log::error!("Failed to save {} data: {}", R::KIND, e);
            Err(e)
        }
    }
}

fn load_slot<R: Record>(
    pipeline: &Pipeline<'_>,
    slot: &mut RecordSlot<R>,
) -> Result<LoadOutcome, PersistenceError> {
    if !pipeline.path.exists() {
        log::info!(
            "No {} data at {}, bootstrapping from defaults",
            R::KIND,
            pipeline.path.display()
        );
        match slot.apply_template() {
            Ok(true) => log::info!("Applied default {} template", R::KIND),
            Ok(false) => {}
            Err(e) => {
                log::error!("Failed to apply default {} template: {}", R::KIND, e);
                return Err(e.into());
            }
        }
        save_slot(pipeline, slot)?;
        return Ok(LoadOutcome::Bootstrapped);
    }

    let Some(record) = slot.record.as_mut() else {
        log::error!("Cannot load {} data: record is not set", R::KIND);
        return Err(PersistenceError::RecordUnset(R::KIND));
    };

    let bytes = match fs::read(&pipeline.path) {
        Ok(bytes) => bytes,
        Err(e) => {
            log::error!("Failed to read {}: {}", pipeline.path.display(), e);
            return Err(PersistenceError::io(&pipeline.path, e));
        }
    };

    if bytes.is_empty() {
        log::warn!(
            "{} data file {} is empty, nothing to load",
            R::KIND,
            pipeline.path.display()
        );
        return Ok(LoadOutcome::SkippedEmpty);
    }

    let result = pipeline
        .open(bytes)
        .and_then(|text| record::merge_text(record, &text).map_err(PersistenceError::from));

    match result {
        Ok(()) => {
            log::info!("{} data loaded from {}", R::KIND, pipeline.path.display());
            Ok(LoadOutcome::Loaded)
        }
        Err(e) => {
            log::error!("Failed to load {} data, keeping current values: {}", R::KIND, e);
            Err(e)
        }
    }
}

fn reset_slot<R: Record>(
    pipeline: &Pipeline<'_>,
    slot: &mut RecordSlot<R>,
) -> Result<(), PersistenceError> {
    match slot.apply_template() {
        Ok(true) => log::info!("{} data reset to defaults", R::KIND),
        Ok(false) => log::info!("No default {} template, saving current values", R::KIND),
        Err(e) => {
            log::error!("Failed to reset {} data: {}", R::KIND, e);
            return Err(e.into());
        }
    }
    save_slot(pipeline, slot)
}

fn set_slot_field<R: Record>(
    slot: &mut RecordSlot<R>,
    field: &str,
    raw: &str,
) -> Result<(), PersistenceError> {
    let Some(record) = slot.record_mut() else {
        log::error!("Cannot set {}.{}: record is not set", R::KIND, field);
        return Err(PersistenceError::RecordUnset(R::KIND));
    };
    record::set_field(record, field, raw)?;
    log::debug!("{}.{} set to {}", R::KIND, field, raw);
    Ok(())
}

/// Owns the persisted records and runs the load/save/reset protocol
///
/// Pass it explicitly to whatever needs the records; it is not a global.
#[derive(Debug, Clone)]
pub struct PersistenceService {
    config: PersistenceConfig,
    player: RecordSlot<PlayerData>,
    game: RecordSlot<GameData>,
    settings: RecordSlot<SettingsData>,
}

impl PersistenceService {
    /// Records start at their `Default` values with no templates
    pub fn new(config: PersistenceConfig) -> Self {
        Self {
            config,
            player: RecordSlot::default(),
            game: RecordSlot::default(),
            settings: RecordSlot::default(),
        }
    }

    pub fn with_player_template(mut self, template: PlayerData) -> Self {
        self.player.set_template(Some(template));
        self
    }

    pub fn with_game_template(mut self, template: GameData) -> Self {
        self.game.set_template(Some(template));
        self
    }

    pub fn with_settings_template(mut self, template: SettingsData) -> Self {
        self.settings.set_template(Some(template));
        self
    }

    pub fn config(&self) -> &PersistenceConfig {
        &self.config
    }

    pub fn path_for(&self, kind: RecordKind) -> PathBuf {
        self.config.path_for(kind)
    }

    pub fn player(&self) -> Option<&PlayerData> {
        self.player.record()
    }

    pub fn game(&self) -> Option<&GameData> {
        self.game.record()
    }

    pub fn settings(&self) -> Option<&SettingsData> {
        self.settings.record()
    }

    pub fn player_slot(&mut self) -> &mut RecordSlot<PlayerData> {
        &mut self.player
    }

    pub fn game_slot(&mut self) -> &mut RecordSlot<GameData> {
        &mut self.game
    }

    pub fn settings_slot(&mut self) -> &mut RecordSlot<SettingsData> {
        &mut self.settings
    }

    /// Read a record from disk, bootstrapping the file if it is missing
    pub fn load(&mut self, kind: RecordKind) -> Result<LoadOutcome, PersistenceError> {
        let pipeline = Pipeline::new(&self.config, kind);
        match kind {
            RecordKind::Player => load_slot(&pipeline, &mut self.player),
            RecordKind::Game => load_slot(&pipeline, &mut self.game),
            RecordKind::Settings => load_slot(&pipeline, &mut self.settings),
        }
    }

    /// Write a record to disk, replacing any existing file
    pub fn save(&self, kind: RecordKind) -> Result<(), PersistenceError> {
        let pipeline = Pipeline::new(&self.config, kind);
        match kind {
            RecordKind::Player => save_slot(&pipeline, &self.player),
            RecordKind::Game => save_slot(&pipeline, &self.game),
            RecordKind::Settings => save_slot(&pipeline, &self.settings),
        }
    }

    /// Re-apply the default template and save
    pub fn reset(&mut self, kind: RecordKind) -> Result<(), PersistenceError> {
        let pipeline = Pipeline::new(&self.config, kind);
        match kind {
            RecordKind::Player => reset_slot(&pipeline, &mut self.player),
            RecordKind::Game => reset_slot(&pipeline, &mut self.game),
            RecordKind::Settings => reset_slot(&pipeline, &mut self.settings),
        }
    }

    /// Parse `raw` for one field of a record and assign it in memory
    pub fn set_field(
        &mut self,
        kind: RecordKind,
        field: &str,
        raw: &str,
    ) -> Result<(), PersistenceError> {
        match kind {
            RecordKind::Player => set_slot_field(&mut self.player, field, raw),
            RecordKind::Game => set_slot_field(&mut self.game, field, raw),
            RecordKind::Settings => set_slot_field(&mut self.settings, field, raw),
        }
    }

    /// Load every kind listed in `eager_load`
    ///
    /// A failure for one kind is logged and does not stop the rest.
    pub fn load_eager(&mut self) -> Vec<(RecordKind, Result<LoadOutcome, PersistenceError>)> {
        let kinds = self.config.eager_load.clone();
        kinds.into_iter().map(|kind| (kind, self.load(kind))).collect()
    }
}
