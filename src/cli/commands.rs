//! CLI commands and argument parsing
//!
//! `cv` is a thin collaborator over the library: it loads [`Settings`],
//! applies the global flags on top, opens the backend and runs one command
//! through the [`Config`] facade.

use crate::backend::Backend;
use crate::config::{BackendKind, Config, OptionSpec, Settings, TimestampCodec, DEFAULT_RETRIES};
use crate::error::{ConfVaultError, Result};
use crate::signing::{Signer, TimestampSigner};
use crate::utils::datetime::format_timestamp;
use crate::utils::format::{format_table, EntryRow, OutputFormat, SettingRow};
use crate::value::{Value, ValueKind};
use clap::{Parser, Subcommand};
use std::collections::BTreeMap;
use std::path::PathBuf;
use tracing::debug;

#[derive(Parser)]
#[command(name = "cv")]
#[command(about = "Read, write and prompt for configuration values")]
#[command(version, author)]
pub struct Cli {
    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    /// Storage backend (overrides settings)
    #[arg(long, global = true, value_enum)]
    pub backend: Option<BackendKind>,

    /// Store file (overrides settings)
    #[arg(long, global = true, value_name = "PATH")]
    pub file: Option<PathBuf>,

    /// Flat file section (overrides settings)
    #[arg(long, global = true)]
    pub section: Option<String>,

    /// Sign structured entries
    #[arg(long, global = true)]
    pub signing: bool,

    /// Never prompt; use option defaults or fail
    #[arg(long, global = true)]
    pub batch: bool,

    /// Store values as `value::seconds` and report when they were set
    #[arg(long, global = true)]
    pub timestamped: bool,

    /// Output format
    #[arg(long, global = true, value_enum, default_value = "table")]
    pub format: OutputFormat,

    /// Disable colored table headers
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Print a stored value
    Get {
        key: String,
        /// Printed instead of failing when the key is missing
        #[arg(long)]
        default: Option<String>,
    },
    /// Store a value
    Set {
        key: String,
        value: String,
        /// Convert the value before storing (int, float, str, bool, list, bytes)
        #[arg(long = "type", value_name = "TYPE")]
        kind: Option<String>,
    },
    /// Remove a value
    #[command(alias = "rm")]
    Delete { key: String },
    /// List stored values (alias: ls)
    #[command(alias = "ls")]
    List,
    /// Print when a value was last modified
    LastModified { key: String },
    /// Resolve a value, prompting for it when missing
    Ask {
        key: String,
        /// Option type (int, float, str, bool, list, bytes)
        #[arg(long = "type", value_name = "TYPE", default_value = "str")]
        kind: String,
        /// Allowed answers, comma-separated
        #[arg(long, value_delimiter = ',')]
        choices: Vec<String>,
        /// Used for an empty answer and in batch mode
        #[arg(long)]
        default: Option<String>,
        /// Shown for an empty answer or `?`
        #[arg(long)]
        help_text: Option<String>,
        /// Prompt text; defaults to the key
        #[arg(long)]
        prefix: Option<String>,
        #[arg(long, default_value_t = DEFAULT_RETRIES)]
        retries: u32,
    },
    /// Sign a value
    Sign {
        value: String,
        /// Embed the current time
        #[arg(long)]
        timestamp: bool,
        /// Signing key
        #[arg(long, env = "CONFVAULT_SIGNING_KEY", hide_env_values = true)]
        key: Option<String>,
    },
    /// Verify a signed value and print the original
    Unsign {
        token: String,
        /// The token carries a timestamp
        #[arg(long)]
        timestamp: bool,
        /// Signing key
        #[arg(long, env = "CONFVAULT_SIGNING_KEY", hide_env_values = true)]
        key: Option<String>,
    },
    /// Show the effective settings
    Settings,
}

impl Cli {
    /// Apply global flags on top of loaded settings
    pub fn apply(&self, mut settings: Settings) -> Settings {
        if let Some(backend) = self.backend {
            settings.backend = backend;
        }
        if let Some(file) = &self.file {
            settings.path = Some(file.clone());
        }
        if let Some(section) = &self.section {
            settings.section = section.clone();
        }
        settings.signing |= self.signing;
        settings.batch |= self.batch;
        settings
    }

    pub fn execute(self, settings: Settings) -> Result<()> {
        let settings = self.apply(settings);
        debug!("Effective settings: {:?}", settings);

        match self.command {
            Commands::Sign {
                value,
                timestamp,
                key,
            } => execute_sign(&value, timestamp, key.as_deref()),
            Commands::Unsign {
                token,
                timestamp,
                key,
            } => execute_unsign(&token, timestamp, key.as_deref()),
            Commands::Settings => execute_settings(&settings, self.format, self.no_color),
            command => {
                let backend = settings.open_backend()?;
                let mut config = Config::new(backend).with_batch(settings.batch);
                if self.timestamped {
                    config = config.with_codec(TimestampCodec::new());
                }

                let outcome =
                    execute_store_command(command, &mut config, self.format, self.no_color);
                let closed = config.close();
                outcome?;
                closed.map(|_| ())
            }
        }
    }
}

fn execute_store_command(
    command: Commands,
    config: &mut Config<Box<dyn Backend>>,
    format: OutputFormat,
    no_color: bool,
) -> Result<()> {
    match command {
        Commands::Get { key, default } => execute_get(config, &key, default),
        Commands::Set { key, value, kind } => execute_set(config, &key, &value, kind.as_deref()),
        Commands::Delete { key } => {
            config.delete(&key)?;
            println!("✅ Deleted '{key}'");
            Ok(())
        }
        Commands::List => execute_list(config, format, no_color),
        Commands::LastModified { key } => execute_last_modified(config, &key),
        Commands::Ask {
            key,
            kind,
            choices,
            default,
            help_text,
            prefix,
            retries,
        } => {
            let spec =
                build_option_spec(&key, &kind, choices, default, help_text, prefix, retries)?;
            config.add_option(spec)?;
            let value = config.get(&key)?;
            println!("{value}");
            Ok(())
        }
        Commands::Sign { .. } | Commands::Unsign { .. } | Commands::Settings => Err(
            ConfVaultError::invalid_state("command does not use a backend"),
        ),
    }
}

fn execute_get(
    config: &mut Config<Box<dyn Backend>>,
    key: &str,
    default: Option<String>,
) -> Result<()> {
    let value = match default {
        Some(default) => config.get_or(key, default)?,
        None => config.get(key)?,
    };
    println!("{value}");
    Ok(())
}

fn execute_set(
    config: &mut Config<Box<dyn Backend>>,
    key: &str,
    value: &str,
    kind: Option<&str>,
) -> Result<()> {
    let value = match kind {
        Some(kind) => {
            let kind: ValueKind = kind.parse()?;
            kind.parse(value).map_err(ConfVaultError::illegal_argument)?
        }
        None => Value::from(value),
    };
    config.set(key, value)?;
    println!("✅ Stored '{key}'");
    Ok(())
}

fn execute_list(
    config: &Config<Box<dyn Backend>>,
    format: OutputFormat,
    no_color: bool,
) -> Result<()> {
    let mut items = config.items()?;
    items.sort_by(|a, b| a.0.cmp(&b.0));

    match format {
        OutputFormat::Json => {
            let map: BTreeMap<String, String> = items
                .into_iter()
                .map(|(key, value)| (key, value.to_text()))
                .collect();
            let json_output = serde_json::to_string_pretty(&map).map_err(|e| {
                ConfVaultError::serialization(format!("Failed to serialize values: {e}"))
            })?;
            println!("{json_output}");
        }
        OutputFormat::Table => {
            if items.is_empty() {
                println!("No values stored.");
                return Ok(());
            }
            let mut rows = Vec::with_capacity(items.len());
            for (key, value) in items {
                let modified = format_timestamp(config.last_modified(&key)?);
                rows.push(EntryRow {
                    kind: value.type_name().to_string(),
                    value: value.to_text(),
                    key,
                    modified,
                });
            }
            println!("{}", format_table(&rows, no_color));
        }
    }
    Ok(())
}

fn execute_last_modified(config: &Config<Box<dyn Backend>>, key: &str) -> Result<()> {
    match config.last_modified(key)? {
        Some(timestamp) => println!("{} ({})", format_timestamp(Some(timestamp)), timestamp),
        None => {
            eprintln!(
                "'{key}' has no recorded timestamp; store it with --timestamped or --signing"
            );
            return Err(ConfVaultError::unsupported("last_modified"));
        }
    }
    Ok(())
}

fn build_option_spec(
    key: &str,
    kind: &str,
    choices: Vec<String>,
    default: Option<String>,
    help_text: Option<String>,
    prefix: Option<String>,
    retries: u32,
) -> Result<OptionSpec> {
    let value_kind: ValueKind = kind.parse()?;
    let convert = |text: &str| {
        value_kind
            .parse(text)
            .map_err(|e| ConfVaultError::illegal_argument(format!("'{text}': {e}")))
    };

    let mut spec = OptionSpec::new(key).kind(value_kind).retries(retries);
    if !choices.is_empty() {
        let choices = choices
            .iter()
            .map(|choice| convert(choice.trim()))
            .collect::<Result<Vec<Value>>>()?;
        spec = spec.choices(choices);
    }
    if let Some(default) = default {
        spec = spec.default(convert(&default)?);
    }
    if let Some(help) = help_text {
        spec = spec.help(help);
    }
    if let Some(prefix) = prefix {
        spec = spec.prefix(prefix);
    }
    Ok(spec)
}

fn execute_sign(value: &str, timestamp: bool, key: Option<&str>) -> Result<()> {
    let key = key.unwrap_or_default();
    let token = if timestamp {
        TimestampSigner::with_key(key, None).sign(value)?
    } else {
        Signer::with_key(key, None).sign(value)?
    };
    println!("{token}");
    Ok(())
}

fn execute_unsign(token: &str, timestamp: bool, key: Option<&str>) -> Result<()> {
    let key = key.unwrap_or_default();
    if timestamp {
        let (value, signed_at) = TimestampSigner::with_key(key, None).unsign(token)?;
        println!("{value}");
        println!("signed at {}", format_timestamp(Some(signed_at)));
    } else {
        println!("{}", Signer::with_key(key, None).unsign(token)?);
    }
    Ok(())
}

fn execute_settings(settings: &Settings, format: OutputFormat, no_color: bool) -> Result<()> {
    match format {
        OutputFormat::Json => {
            let json_output = serde_json::to_string_pretty(settings).map_err(|e| {
                ConfVaultError::serialization(format!("Failed to serialize settings: {e}"))
            })?;
            println!("{json_output}");
        }
        OutputFormat::Table => {
            let store = settings
                .store_path()?
                .map(|p| p.display().to_string())
                .unwrap_or_else(|| "<in memory>".to_string());
            let rows = vec![
                SettingRow {
                    key: "settings file".to_string(),
                    value: Settings::settings_path()?.display().to_string(),
                },
                SettingRow {
                    key: "backend".to_string(),
                    value: settings.backend.to_string(),
                },
                SettingRow {
                    key: "path".to_string(),
                    value: store,
                },
                SettingRow {
                    key: "section".to_string(),
                    value: settings.section.clone(),
                },
                SettingRow {
                    key: "signing".to_string(),
                    value: settings.signing.to_string(),
                },
                SettingRow {
                    key: "batch".to_string(),
                    value: settings.batch.to_string(),
                },
            ];
            println!("{}", format_table(&rows, no_color));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_override_settings() {
        let cli = Cli::parse_from([
            "cv",
            "--backend",
            "structured",
            "--file",
            "/tmp/x.json",
            "--signing",
            "list",
        ]);
        let settings = cli.apply(Settings::default());
        assert_eq!(settings.backend, BackendKind::Structured);
        assert_eq!(settings.path, Some(PathBuf::from("/tmp/x.json")));
        assert!(settings.signing);
        assert!(!settings.batch);
    }

    #[test]
    fn test_flags_keep_loaded_values() {
        let cli = Cli::parse_from(["cv", "get", "k"]);
        let loaded = Settings {
            backend: BackendKind::OrderedFile,
            batch: true,
            ..Settings::default()
        };
        assert_eq!(cli.apply(loaded.clone()), loaded);
    }

    #[test]
    fn test_ask_arguments_become_option() {
        let spec = build_option_spec(
            "port",
            "int",
            vec!["80".to_string(), " 8080".to_string()],
            Some("80".to_string()),
            None,
            None,
            2,
        )
        .unwrap();
        let option = spec.validate().unwrap();
        assert_eq!(option.choices, vec!["80".to_string(), "8080".to_string()]);
        assert_eq!(option.default, Some(Value::Int(80)));
        assert_eq!(option.retries, 2);
    }

    #[test]
    fn test_ask_rejects_unparsable_default() {
        let err = build_option_spec(
            "port",
            "int",
            vec![],
            Some("eighty".to_string()),
            None,
            None,
            3,
        )
        .unwrap_err();
        assert!(matches!(err, ConfVaultError::IllegalArgument(_)));
    }

    #[test]
    fn test_run_against_ordered_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let file = dir.path().join("store.json");
        let file_arg = file.to_str().unwrap();

        let base = ["cv", "--backend", "ordered-file", "--file", file_arg];
        Cli::parse_from(base.iter().chain(&["set", "a", "1"]))
            .execute(Settings::default())
            .unwrap();
        Cli::parse_from(base.iter().chain(&["get", "a"]))
            .execute(Settings::default())
            .unwrap();

        let contents = std::fs::read_to_string(&file).unwrap();
        assert!(contents.contains("\"a\": \"1\""));
    }
}
