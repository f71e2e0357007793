//! Environment-driven configuration tests
//!
//! Uses serial_test: these tests mutate process-wide environment variables
//! and must not run in parallel with each other.

use biblio_common::config::{
    Config, ConfigOverrides, TomlConfig, ADMIN_PASSWORD_ENV, SESSION_TTL_ENV,
};
use serial_test::serial;
use std::env;

#[test]
#[serial]
fn test_admin_password_from_env() {
    env::set_var(ADMIN_PASSWORD_ENV, "motdepasse");
    env::remove_var(SESSION_TTL_ENV);

    let config = Config::resolve(ConfigOverrides::default().with_env(), TomlConfig::default());
    assert_eq!(config.admin_password.as_deref(), Some("motdepasse"));

    env::remove_var(ADMIN_PASSWORD_ENV);
}

#[test]
#[serial]
fn test_env_password_beats_config_file() {
    env::set_var(ADMIN_PASSWORD_ENV, "env");

    let toml = TomlConfig {
        admin_password: Some("fichier".to_string()),
        ..TomlConfig::default()
    };
    let config = Config::resolve(ConfigOverrides::default().with_env(), toml);
    assert_eq!(config.admin_password.as_deref(), Some("env"));

    env::remove_var(ADMIN_PASSWORD_ENV);
}

#[test]
#[serial]
fn test_missing_env_password_falls_back_to_file() {
    env::remove_var(ADMIN_PASSWORD_ENV);

    let toml = TomlConfig {
        admin_password: Some("fichier".to_string()),
        ..TomlConfig::default()
    };
    let config = Config::resolve(ConfigOverrides::default().with_env(), toml);
    assert_eq!(config.admin_password.as_deref(), Some("fichier"));
}

#[test]
#[serial]
fn test_session_ttl_from_env() {
    env::set_var(SESSION_TTL_ENV, "3");

    let config = Config::resolve(ConfigOverrides::default().with_env(), TomlConfig::default());
    assert_eq!(config.session_ttl_hours, 3);

    env::set_var(SESSION_TTL_ENV, "beaucoup");
    let config = Config::resolve(ConfigOverrides::default().with_env(), TomlConfig::default());
    assert_eq!(config.session_ttl_hours, 12);

    env::remove_var(SESSION_TTL_ENV);
}

#[test]
#[serial]
fn test_explicit_override_not_replaced_by_env() {
    env::set_var(ADMIN_PASSWORD_ENV, "env");

    let overrides = ConfigOverrides {
        admin_password: Some("explicite".to_string()),
        ..ConfigOverrides::default()
    }
    .with_env();
    assert_eq!(overrides.admin_password.as_deref(), Some("explicite"));

    env::remove_var(ADMIN_PASSWORD_ENV);
}
