//! Crate-wide typed errors. Only configuration/startup failures are modeled as
//! `Result` at all — once the dealer's loop is running, transient conditions
//! are recovered locally by the owning worker (see the error handling section
//! of the design docs) and the cancellation token is the sole cross-worker
//! failure signal.

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("rows ({rows}) * columns ({columns}) must equal table_size ({table_size})")]
    GridMismatch {
        rows: usize,
        columns: usize,
        table_size: usize,
    },

    #[error("feature_size ({feature_size}) must be greater than zero and at most table_size ({table_size})")]
    FeatureSizeOutOfRange {
        feature_size: usize,
        table_size: usize,
    },

    #[error("deck_size ({deck_size}) must be at least table_size ({table_size})")]
    DeckTooSmall { deck_size: usize, table_size: usize },

    #[error("humanPlayers ({human_players}) must be at most players ({players})")]
    TooManyHumans { human_players: usize, players: usize },

    #[error("players ({players}) must be greater than zero")]
    NoPlayers { players: usize },

    #[error("turn_timeout_warning_millis ({warning}) must be at most turn_timeout_millis ({timeout})")]
    WarningExceedsTimeout { warning: u64, timeout: u64 },

    #[error("failed to read config file {path}: {source}")]
    ReadFile {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    ParseFile {
        path: String,
        #[source]
        source: toml::de::Error,
    },
}
