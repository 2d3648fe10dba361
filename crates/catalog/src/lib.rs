//! Viewer configuration: the building catalog, icon table, camera and scene settings.
//!
//! Configuration is JSON. Parsing goes through raw serde structs and is then
//! validated into the types below, so every value a component sees has already
//! been checked (icon kinds resolve, sizes and scales are positive, ...).

mod building;
mod config;
mod icons;

pub use building::*;
pub use config::*;
pub use icons::*;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    Parse(String),
    Io(String),
    MissingAccessToken,
    UnknownIconKind { building: String, kind: String },
    IconPlacement { building: String, index: usize },
    InvalidDimensions { building: String },
    InvalidPosition { building: String },
    InvalidParallelism,
    InvalidAlpha(String),
    /// A size or scale that must be finite and positive.
    InvalidSize(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Parse(msg) => write!(f, "config parse error: {msg}"),
            ConfigError::Io(msg) => write!(f, "config read error: {msg}"),
            ConfigError::MissingAccessToken => {
                write!(f, "no access token (set {ACCESS_TOKEN_ENV} or access_token)")
            }
            ConfigError::UnknownIconKind { building, kind } => {
                write!(f, "{building}: icon kind {kind:?} is not in the icon table")
            }
            ConfigError::IconPlacement { building, index } => write!(
                f,
                "{building}: icon #{index} needs exactly one of `offset` or `position`"
            ),
            ConfigError::InvalidDimensions { building } => {
                write!(f, "{building}: dimensions must be finite and positive")
            }
            ConfigError::InvalidPosition { building } => {
                write!(f, "{building}: position must be finite")
            }
            ConfigError::InvalidParallelism => write!(f, "parallelism must be at least 1"),
            ConfigError::InvalidAlpha(field) => write!(f, "{field} must be within [0, 1]"),
            ConfigError::InvalidSize(field) => write!(f, "{field} must be finite and positive"),
        }
    }
}

impl std::error::Error for ConfigError {}
