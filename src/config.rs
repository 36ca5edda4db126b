//! Process configuration, loaded once at startup.

use figment::providers::{Env, Serialized};
use figment::Figment;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// SQLite connection string, e.g. `sqlite:guildhall.sqlite`.
    pub database_url: String,
    pub listen_addr: String,
    pub loglevel: String,
    /// Drop the `Secure` attribute on session cookies for plain-HTTP
    /// deployments behind a trusted proxy.
    pub insecure_cookie: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_url: "sqlite:guildhall.sqlite".to_string(),
            listen_addr: "0.0.0.0:8000".to_string(),
            loglevel: "info".to_string(),
            insecure_cookie: false,
        }
    }
}

impl Config {
    /// Defaults overlaid with `GUILDHALL_*` environment variables.
    pub fn load() -> Result<Self, figment::Error> {
        Figment::from(Serialized::defaults(Config::default()))
            .merge(Env::prefixed("GUILDHALL_"))
            .extract()
    }
}

pub static CONFIG: LazyLock<Config> =
    LazyLock::new(|| Config::load().expect("invalid GUILDHALL_* environment configuration"));
