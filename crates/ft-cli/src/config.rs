//! Configuration: where the session database and timer cache live.

use std::path::{Path, PathBuf};

use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use serde::{Deserialize, Serialize};

/// Application configuration.
///
/// Values are layered: built-in defaults, then `config.toml` in the platform
/// config directory, then an explicit `--config` file, then `FT_*`
/// environment variables.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Path to the session database.
    pub database_path: PathBuf,
    /// Path to the timer runtime-state cache.
    pub state_path: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_path: data_dir().join("ft.db"),
            state_path: state_dir().join("timer.json"),
        }
    }
}

impl Config {
    /// Loads configuration, optionally merging a specific file on top of the
    /// default locations.
    #[expect(
        clippy::result_large_err,
        reason = "figment::Error is large but only returned at startup"
    )]
    pub fn load_from(config_path: Option<&Path>) -> Result<Self, figment::Error> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));
        if let Some(dir) = dirs::config_dir() {
            figment = figment.merge(Toml::file(dir.join("ft").join("config.toml")));
        }
        if let Some(path) = config_path {
            figment = figment.merge(Toml::file(path));
        }
        figment.merge(Env::prefixed("FT_")).extract()
    }
}

/// Data directory for the session database, `~/.local/share/ft` on Linux.
fn data_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("ft")
}

/// State directory for the timer cache, `~/.local/state/ft` on Linux.
/// Platforms without a state directory fall back to the data directory.
fn state_dir() -> PathBuf {
    dirs::state_dir().map_or_else(data_dir, |p| p.join("ft"))
}
