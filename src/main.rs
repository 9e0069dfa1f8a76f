//! Gamedata command-line entry point
//!
//! Inspect, reset and edit the persisted records from a terminal.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use gamedata_store::persistence::LoadOutcome;
use gamedata_store::record::{self, Record};
use gamedata_store::{
    ConfigOverrides, GameData, PersistenceConfig, PersistenceService, PlayerData, RecordKind,
    SerializationFormat, SettingsData,
};

#[derive(Parser, Debug)]
#[command(name = "gamedata", version, about = "Manage persisted game records")]
struct Cli {
    /// Config file (defaults to the platform config directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Override the data directory
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Override the on-disk format (json, length_prefixed_text)
    #[arg(long, global = true)]
    format: Option<SerializationFormat>,

    /// Enable encryption for non-settings records
    #[arg(long, global = true)]
    encrypt: bool,

    /// Encryption passphrase
    #[arg(long, global = true, env = "GAMEDATA_PASSPHRASE")]
    passphrase: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Load and print records (all kinds when omitted)
    Show { kind: Option<RecordKind> },
    /// Load a record, bootstrapping its file if missing
    Load { kind: RecordKind },
    /// Load then rewrite a record with the current settings
    Save { kind: RecordKind },
    /// Reset a record to its defaults and save it
    Reset { kind: RecordKind },
    /// Set one field and save
    Set {
        kind: RecordKind,
        field: String,
        value: String,
    },
    /// Print the data directory and record file paths
    Path,
}

impl Cli {
    fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            data_dir: self.data_dir.clone(),
            format: self.format,
            encrypt: self.encrypt,
            passphrase: self.passphrase.clone(),
        }
    }
}

fn resolve_config(cli: &Cli) -> Result<PersistenceConfig> {
    let mut config = match &cli.config {
        Some(path) => PersistenceConfig::load_from(path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => PersistenceConfig::load()?,
    };
    cli.overrides().apply(&mut config);
    Ok(config)
}

fn print_record<R: Record>(record: Option<&R>) {
    println!("[{}]", R::KIND);
    let Some(record) = record else {
        println!("  <unset>");
        return;
    };

    let mut category = "";
    for field in R::fields() {
        if field.category != category {
            category = field.category;
            println!("  # {category}");
        }
        let value = record::get_field(record, field.name)
            .map(|v| v.to_string())
            .unwrap_or_default();
        println!("  {:<20} = {}", field.display_name(), value);
    }
}

fn print_kind(service: &PersistenceService, kind: RecordKind) {
    match kind {
        RecordKind::Player => print_record(service.player()),
        RecordKind::Game => print_record(service.game()),
        RecordKind::Settings => print_record(service.settings()),
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let config = resolve_config(&cli)?;

    let mut service = PersistenceService::new(config)
        .with_player_template(PlayerData::initial())
        .with_game_template(GameData::default())
        .with_settings_template(SettingsData::default());

    match cli.command {
        Command::Show { kind } => {
            let kinds = kind.map(|k| vec![k]).unwrap_or_else(|| RecordKind::ALL.to_vec());
            for kind in kinds {
                service.load(kind)?;
                print_kind(&service, kind);
            }
        }
        Command::Load { kind } => {
            let outcome = service.load(kind)?;
            let verb = match outcome {
                LoadOutcome::Bootstrapped => "bootstrapped",
                LoadOutcome::Loaded => "loaded",
                LoadOutcome::SkippedEmpty => "skipped (empty file)",
            };
            println!("{kind}: {verb}");
        }
        Command::Save { kind } => {
            service.load(kind)?;
            service.save(kind)?;
        }
        Command::Reset { kind } => {
            service.reset(kind)?;
            print_kind(&service, kind);
        }
        Command::Set { kind, field, value } => {
            service.load(kind)?;
            service.set_field(kind, &field, &value)?;
            service.save(kind)?;
            print_kind(&service, kind);
        }
        Command::Path => {
            println!("{}", service.config().data_dir.display());
            for kind in RecordKind::ALL {
                println!("  {:<8} {}", kind, service.path_for(kind).display());
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("gamedata").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_flags_override_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let config_path = dir.path().join("gamedata.toml");
        std::fs::write(
            &config_path,
            "format = \"length_prefixed_text\"\npassphrase = \"from-file\"\n",
        )
        .unwrap();
        let config_arg = config_path.to_str().unwrap();
        let data_arg = dir.path().join("saves");
        let data_arg = data_arg.to_str().unwrap();

        let cli = parse(&["--config", config_arg, "--data-dir", data_arg, "--encrypt", "path"]);
        let config = resolve_config(&cli).unwrap();
        assert_eq!(config.data_dir, dir.path().join("saves"));
        assert_eq!(config.format, SerializationFormat::LengthPrefixedText);
        assert!(config.encryption_enabled);

        let cli = parse(&[
            "--config",
            config_arg,
            "--format",
            "json",
            "--passphrase",
            "from-cli",
            "path",
        ]);
        let config = resolve_config(&cli).unwrap();
        assert_eq!(config.format, SerializationFormat::Json);
        assert_eq!(config.passphrase, "from-cli");
        assert!(!config.encryption_enabled);
    }

    #[test]
    fn test_unknown_format_flag_rejected() {
        let result = Cli::try_parse_from(["gamedata", "--format", "binary", "path"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_set_subcommand_parses() {
        let cli = parse(&["set", "settings", "master_volume", "0.5"]);
        match cli.command {
            Command::Set { kind, field, value } => {
                assert_eq!(kind, RecordKind::Settings);
                assert_eq!(field, "master_volume");
                assert_eq!(value, "0.5");
            }
            other => panic!("unexpected command {other:?}"),
        }
    }
}
