//! Configuration loading: a `clap`-derived CLI layer over a serde/TOML file
//! layer, merged into a validated [`GameConfig`]. Mirrors the reference
//! binary's pattern of `clap::Parser` fields with `Option` so an unset flag
//! falls through to the file or the built-in default.

use clap::Parser;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Command-line arguments for the demo binary. Every field is optional so a
/// `--config` file (or the built-in defaults) can supply it instead.
#[derive(Debug, Parser)]
#[command(name = "set_table_cli")]
#[command(about = "Run the Set game concurrency core end to end", long_about = None)]
pub struct CliArgs {
    /// Path to a TOML file providing any subset of the fields below.
    #[arg(long)]
    pub config: Option<std::path::PathBuf>,

    #[arg(long)]
    pub deck_size: Option<usize>,
    #[arg(long)]
    pub table_size: Option<usize>,
    #[arg(long)]
    pub rows: Option<usize>,
    #[arg(long)]
    pub columns: Option<usize>,
    #[arg(long)]
    pub feature_size: Option<usize>,
    #[arg(long)]
    pub players: Option<usize>,
    #[arg(long)]
    pub human_players: Option<usize>,
    #[arg(long)]
    pub turn_timeout_millis: Option<u64>,
    #[arg(long)]
    pub turn_timeout_warning_millis: Option<u64>,
    #[arg(long)]
    pub point_freeze_millis: Option<u64>,
    #[arg(long)]
    pub penalty_freeze_millis: Option<u64>,
    #[arg(long)]
    pub table_delay_millis: Option<u64>,
    #[arg(long)]
    pub hints: Option<bool>,

    /// Seed the deck shuffle for reproducible demo runs.
    #[arg(long)]
    pub rng_seed: Option<u64>,

    /// Emit structured JSON logs instead of human-readable ones.
    #[arg(long)]
    pub json: bool,
}

/// The same fields as [`GameConfig`], all optional, as loaded from a TOML file.
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct FileConfig {
    pub deck_size: Option<usize>,
    pub table_size: Option<usize>,
    pub rows: Option<usize>,
    pub columns: Option<usize>,
    pub feature_size: Option<usize>,
    pub players: Option<usize>,
    pub human_players: Option<usize>,
    pub turn_timeout_millis: Option<u64>,
    pub turn_timeout_warning_millis: Option<u64>,
    pub point_freeze_millis: Option<u64>,
    pub penalty_freeze_millis: Option<u64>,
    pub table_delay_millis: Option<u64>,
    pub hints: Option<bool>,
    pub rng_seed: Option<u64>,
}

impl FileConfig {
    pub fn load(path: &std::path::Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::ReadFile {
            path: path.display().to_string(),
            source,
        })?;
        toml::from_str(&raw).map_err(|source| ConfigError::ParseFile {
            path: path.display().to_string(),
            source,
        })
    }
}

/// Fully-resolved, validated configuration driving a single game.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameConfig {
    pub deck_size: usize,
    pub table_size: usize,
    pub rows: usize,
    pub columns: usize,
    pub feature_size: usize,
    pub players: usize,
    pub human_players: usize,
    pub turn_timeout_millis: u64,
    pub turn_timeout_warning_millis: u64,
    pub point_freeze_millis: u64,
    pub penalty_freeze_millis: u64,
    pub table_delay_millis: u64,
    pub hints: bool,
    pub rng_seed: Option<u64>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            deck_size: 81,
            table_size: 12,
            rows: 3,
            columns: 4,
            feature_size: 3,
            players: 2,
            human_players: 1,
            turn_timeout_millis: 60_000,
            turn_timeout_warning_millis: 5_000,
            point_freeze_millis: 1_000,
            penalty_freeze_millis: 3_000,
            table_delay_millis: 0,
            hints: false,
            rng_seed: None,
        }
    }
}

macro_rules! layer {
    ($base:expr, $file:expr, $cli:expr, $field:ident) => {
        if let Some(v) = $cli.$field.clone() {
            $base.$field = v;
        } else if let Some(v) = $file.$field.clone() {
            $base.$field = v;
        }
    };
}

impl GameConfig {
    /// Merges built-in defaults, an optional file layer, and CLI flags (CLI wins),
    /// then validates the result.
    pub fn resolve(cli: &CliArgs) -> Result<Self, ConfigError> {
        let file = match &cli.config {
            Some(path) => FileConfig::load(path)?,
            None => FileConfig::default(),
        };

        let mut cfg = GameConfig::default();
        layer!(cfg, file, cli, deck_size);
        layer!(cfg, file, cli, table_size);
        layer!(cfg, file, cli, rows);
        layer!(cfg, file, cli, columns);
        layer!(cfg, file, cli, feature_size);
        layer!(cfg, file, cli, players);
        layer!(cfg, file, cli, human_players);
        layer!(cfg, file, cli, turn_timeout_millis);
        layer!(cfg, file, cli, turn_timeout_warning_millis);
        layer!(cfg, file, cli, point_freeze_millis);
        layer!(cfg, file, cli, penalty_freeze_millis);
        layer!(cfg, file, cli, table_delay_millis);
        layer!(cfg, file, cli, hints);
        layer!(cfg, file, cli, rng_seed);

        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.rows * self.columns != self.table_size {
            return Err(ConfigError::GridMismatch {
                rows: self.rows,
                columns: self.columns,
                table_size: self.table_size,
            });
        }
        if self.feature_size == 0 || self.feature_size > self.table_size {
            return Err(ConfigError::FeatureSizeOutOfRange {
                feature_size: self.feature_size,
                table_size: self.table_size,
            });
        }
        if self.deck_size < self.table_size {
            return Err(ConfigError::DeckTooSmall {
                deck_size: self.deck_size,
                table_size: self.table_size,
            });
        }
        if self.players == 0 {
            return Err(ConfigError::NoPlayers {
                players: self.players,
            });
        }
        if self.human_players > self.players {
            return Err(ConfigError::TooManyHumans {
                human_players: self.human_players,
                players: self.players,
            });
        }
        if self.turn_timeout_warning_millis > self.turn_timeout_millis {
            return Err(ConfigError::WarningExceedsTimeout {
                warning: self.turn_timeout_warning_millis,
                timeout: self.turn_timeout_millis,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cli_with_config(path: Option<std::path::PathBuf>) -> CliArgs {
        CliArgs {
            config: path,
            deck_size: None,
            table_size: None,
            rows: None,
            columns: None,
            feature_size: None,
            players: None,
            human_players: None,
            turn_timeout_millis: None,
            turn_timeout_warning_millis: None,
            point_freeze_millis: None,
            penalty_freeze_millis: None,
            table_delay_millis: None,
            hints: None,
            rng_seed: None,
            json: false,
        }
    }

    #[test]
    fn defaults_validate() {
        let cfg = GameConfig::default();
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn resolve_with_no_file_or_flags_uses_defaults() {
        let cli = cli_with_config(None);
        let cfg = GameConfig::resolve(&cli).unwrap();
        assert_eq!(cfg, GameConfig::default());
    }

    #[test]
    fn grid_mismatch_is_rejected() {
        let mut cfg = GameConfig::default();
        cfg.rows = 5;
        assert!(matches!(
            cfg.validate(),
            Err(ConfigError::GridMismatch { .. })
        ));
    }

    #[test]
    fn feature_size_over_table_size_is_rejected() {
        let mut cfg = GameConfig::default();
        cfg.feature_size = cfg.table_size + 1;
        assert!(matches!(
            cfg.validate(),
            Err(ConfigError::FeatureSizeOutOfRange { .. })
        ));
    }

    #[test]
    fn too_many_humans_is_rejected() {
        let mut cfg = GameConfig::default();
        cfg.human_players = cfg.players + 1;
        assert!(matches!(
            cfg.validate(),
            Err(ConfigError::TooManyHumans { .. })
        ));
    }

    #[test]
    fn cli_overrides_file_layer() {
        let dir = std::env::temp_dir();
        let path = dir.join(format!("set_table_test_{}.toml", std::process::id()));
        std::fs::write(&path, "table_size = 9\nrows = 3\ncolumns = 3\n").unwrap();

        let mut cli = cli_with_config(Some(path.clone()));
        cli.table_size = Some(16);
        cli.rows = Some(4);
        cli.columns = Some(4);
        let cfg = GameConfig::resolve(&cli).unwrap();
        assert_eq!(cfg.table_size, 16);

        std::fs::remove_file(&path).ok();
    }
}
