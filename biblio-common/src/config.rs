//! Configuration loading
//!
//! Each setting is resolved in priority order:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable
//! 3. TOML config file
//! 4. Compiled default (fallback)
//!
//! Command-line and environment values arrive together through
//! [`ConfigOverrides`] (clap reads both). The admin password is the
//! exception: it is never accepted on the command line, only from
//! `ADMIN_PASSWORD` or the config file.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::auth::DEFAULT_SESSION_TTL_HOURS;
use crate::{Error, Result};

/// Default HTTP port
pub const DEFAULT_PORT: u16 = 5780;
/// Default bind address
pub const DEFAULT_BIND: &str = "127.0.0.1";
/// Default name of the fallback catalog file
pub const DEFAULT_LIVRES_FILE: &str = "livres.json";

/// Environment variable holding the admin password
pub const ADMIN_PASSWORD_ENV: &str = "ADMIN_PASSWORD";
/// Environment variable holding the session lifetime in hours
pub const SESSION_TTL_ENV: &str = "BIBLIO_SESSION_TTL_HOURS";

/// Contents of `config.toml`; every key is optional
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TomlConfig {
    pub port: Option<u16>,
    pub bind: Option<String>,
    /// SQLite database path; unset means JSON file fallback
    pub database: Option<PathBuf>,
    pub livres_file: Option<PathBuf>,
    pub admin_password: Option<String>,
    pub session_ttl_hours: Option<i64>,
}

/// Values supplied on the command line or through environment variables
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub port: Option<u16>,
    pub bind: Option<String>,
    pub database: Option<PathBuf>,
    pub livres_file: Option<PathBuf>,
    pub admin_password: Option<String>,
    pub session_ttl_hours: Option<i64>,
}

impl ConfigOverrides {
    /// Fill the environment-only settings from the process environment
    pub fn with_env(mut self) -> Self {
        if self.admin_password.is_none() {
            self.admin_password = std::env::var(ADMIN_PASSWORD_ENV)
                .ok()
                .filter(|p| !p.is_empty());
        }
        if self.session_ttl_hours.is_none() {
            self.session_ttl_hours = std::env::var(SESSION_TTL_ENV)
                .ok()
                .and_then(|v| v.trim().parse().ok());
        }
        self
    }
}

/// Resolved service configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub bind: String,
    pub database: Option<PathBuf>,
    pub livres_file: PathBuf,
    pub admin_password: Option<String>,
    pub session_ttl_hours: i64,
}

impl Default for Config {
    fn default() -> Self {
        Self::resolve(ConfigOverrides::default(), TomlConfig::default())
    }
}

impl Config {
    /// Merge overrides over the config file over compiled defaults
    pub fn resolve(overrides: ConfigOverrides, toml: TomlConfig) -> Self {
        Self {
            port: overrides.port.or(toml.port).unwrap_or(DEFAULT_PORT),
            bind: overrides
                .bind
                .or(toml.bind)
                .unwrap_or_else(|| DEFAULT_BIND.to_string()),
            database: overrides.database.or(toml.database),
            livres_file: overrides
                .livres_file
                .or(toml.livres_file)
                .unwrap_or_else(|| default_data_folder().join(DEFAULT_LIVRES_FILE)),
            admin_password: overrides
                .admin_password
                .or(toml.admin_password)
                .filter(|p| !p.is_empty()),
            session_ttl_hours: overrides
                .session_ttl_hours
                .or(toml.session_ttl_hours)
                .filter(|h| *h > 0)
                .unwrap_or(DEFAULT_SESSION_TTL_HOURS),
        }
    }

    /// Resolve using the first config file found on this machine
    ///
    /// A missing or unreadable config file is not fatal: a warning is logged
    /// and defaults apply.
    pub fn load(overrides: ConfigOverrides) -> Self {
        let toml = match find_config_file() {
            Some(path) => match load_toml_config(&path) {
                Ok(config) => {
                    info!("Loaded config file: {}", path.display());
                    config
                }
                Err(e) => {
                    warn!("Ignoring config file {}: {}", path.display(), e);
                    TomlConfig::default()
                }
            },
            None => {
                info!("No config file found, using defaults");
                TomlConfig::default()
            }
        };

        Self::resolve(overrides, toml)
    }

    /// Socket address string for the listener
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.bind, self.port)
    }

    /// Whether a relational backend is configured
    pub fn backend_configured(&self) -> bool {
        self.database.is_some()
    }
}

/// Parse a TOML config file
pub fn load_toml_config(path: &Path) -> Result<TomlConfig> {
    let contents = std::fs::read_to_string(path)?;
    toml::from_str(&contents).map_err(|e| Error::Config(e.to_string()))
}

/// First existing config file: user config dir, then system-wide
fn find_config_file() -> Option<PathBuf> {
    let user_config = dirs::config_dir().map(|d| d.join("biblio").join("config.toml"));
    let system_config = if cfg!(unix) {
        Some(PathBuf::from("/etc/biblio/config.toml"))
    } else {
        None
    };

    [user_config, system_config]
        .into_iter()
        .flatten()
        .find(|p| p.exists())
}

/// OS-dependent data folder holding the fallback catalog file
pub fn default_data_folder() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join("biblio"))
        .unwrap_or_else(|| PathBuf::from("./biblio_data"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.port, DEFAULT_PORT);
        assert_eq!(config.bind, DEFAULT_BIND);
        assert!(config.database.is_none());
        assert!(!config.backend_configured());
        assert!(config.livres_file.ends_with(DEFAULT_LIVRES_FILE));
        assert_eq!(config.session_ttl_hours, DEFAULT_SESSION_TTL_HOURS);
    }

    #[test]
    fn test_overrides_beat_toml() {
        let toml = TomlConfig {
            port: Some(9000),
            bind: Some("0.0.0.0".to_string()),
            database: Some(PathBuf::from("/srv/toml.db")),
            admin_password: Some("from-file".to_string()),
            ..TomlConfig::default()
        };
        let overrides = ConfigOverrides {
            port: Some(9100),
            admin_password: Some("from-env".to_string()),
            ..ConfigOverrides::default()
        };

        let config = Config::resolve(overrides, toml);
        assert_eq!(config.port, 9100);
        assert_eq!(config.bind, "0.0.0.0");
        assert_eq!(config.database, Some(PathBuf::from("/srv/toml.db")));
        assert_eq!(config.admin_password.as_deref(), Some("from-env"));
        assert_eq!(config.bind_addr(), "0.0.0.0:9100");
    }

    #[test]
    fn test_empty_password_is_unset() {
        let overrides = ConfigOverrides {
            admin_password: Some(String::new()),
            ..ConfigOverrides::default()
        };
        let config = Config::resolve(overrides, TomlConfig::default());
        assert!(config.admin_password.is_none());
    }

    #[test]
    fn test_invalid_ttl_falls_back() {
        let toml = TomlConfig {
            session_ttl_hours: Some(-3),
            ..TomlConfig::default()
        };
        let config = Config::resolve(ConfigOverrides::default(), toml);
        assert_eq!(config.session_ttl_hours, DEFAULT_SESSION_TTL_HOURS);
    }

    #[test]
    fn test_parse_toml_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "port = 8080\ndatabase = \"/var/lib/biblio/livres.db\"\nsession_ttl_hours = 2\n",
        )
        .unwrap();

        let toml = load_toml_config(&path).unwrap();
        assert_eq!(toml.port, Some(8080));
        assert_eq!(toml.database, Some(PathBuf::from("/var/lib/biblio/livres.db")));
        assert_eq!(toml.session_ttl_hours, Some(2));
        assert!(toml.admin_password.is_none());
    }

    #[test]
    fn test_malformed_toml_is_config_error() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "port = \"not a number\"").unwrap();

        assert!(matches!(load_toml_config(&path), Err(Error::Config(_))));
    }
}
