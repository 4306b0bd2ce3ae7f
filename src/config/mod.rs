mod basic;
mod google;
mod notifier;

pub use basic::BasicConfig;
pub use google::GoogleConfig;
pub use notifier::NotifierConfig;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::{path::PathBuf, sync::LazyLock};

/// Application configuration managed by Figment.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct Config {
    /// Core server configuration (see `basic` table in config.toml).
    #[serde(default)]
    pub basic: BasicConfig,

    /// Google OAuth and Gmail API settings (see `google` table in config.toml).
    #[serde(default)]
    pub google: GoogleConfig,

    /// Daily notifier and scheduler settings (see `notifier` table in config.toml).
    #[serde(default)]
    pub notifier: NotifierConfig,
}

const DEFAULT_CONFIG_FILE: &str = "config.toml";
const ENV_PREFIX: &str = "DAILYNUDGE_";

impl Config {
    /// Builds a Figment merging struct defaults, an optional config TOML file
    /// and `DAILYNUDGE_`-prefixed environment variables (highest precedence,
    /// nested with `__`, e.g. `DAILYNUDGE_GOOGLE__CLIENT_ID`).
    pub fn figment() -> Figment {
        let mut figment = Figment::new().merge(Serialized::defaults(Config::default()));
        if PathBuf::from(DEFAULT_CONFIG_FILE).is_file() {
            figment = figment.merge(Toml::file(DEFAULT_CONFIG_FILE));
        }
        figment.merge(Env::prefixed(ENV_PREFIX).split("__"))
    }

    /// Loads configuration from defaults, `config.toml` (if present) and the
    /// environment. Does not validate the Google client credentials; the OAuth
    /// routes surface their own errors when those are missing.
    pub fn load() -> Self {
        Self::figment().extract().unwrap_or_else(|err| {
            panic!("failed to extract configuration (defaults + config.toml + env): {err}")
        })
    }
}

/// Global, lazily-initialized configuration instance.
pub static CONFIG: LazyLock<Config> = LazyLock::new(Config::load);
