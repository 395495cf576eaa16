//! Unit tests for configuration loading and data directory resolution
//!
//! Note: Uses serial_test to prevent ENV variable race conditions. Tests
//! that manipulate SCANPLANT_DATA_DIR or SCANPLANT_PLANT_ID_API_KEY are
//! marked with #[serial] so they run sequentially.

use scanplant_common::config::{
    ensure_data_dir, database_path, get_user_agent, resolve_data_dir, TomlConfig, DATA_DIR_ENV,
    PLANT_ID_API_KEY_ENV,
};
use serial_test::serial;
use std::env;
use std::path::PathBuf;

#[test]
#[serial]
fn resolver_with_no_overrides_uses_default() {
    env::remove_var(DATA_DIR_ENV);

    let config = TomlConfig::default();
    let data_dir = resolve_data_dir(None, &config);

    assert!(!data_dir.as_os_str().is_empty());
    assert!(data_dir.to_string_lossy().contains("scanplant"));
}

#[test]
#[serial]
fn cli_argument_beats_env_and_config() {
    env::set_var(DATA_DIR_ENV, "/tmp/from-env");

    let config = TomlConfig {
        data_dir: Some("/tmp/from-toml".to_string()),
        ..Default::default()
    };

    let data_dir = resolve_data_dir(Some("/tmp/from-cli"), &config);
    assert_eq!(data_dir, PathBuf::from("/tmp/from-cli"));

    env::remove_var(DATA_DIR_ENV);
}

#[test]
#[serial]
fn env_beats_config_file() {
    env::set_var(DATA_DIR_ENV, "/tmp/from-env");

    let config = TomlConfig {
        data_dir: Some("/tmp/from-toml".to_string()),
        ..Default::default()
    };

    let data_dir = resolve_data_dir(None, &config);
    assert_eq!(data_dir, PathBuf::from("/tmp/from-env"));

    env::remove_var(DATA_DIR_ENV);
}

#[test]
#[serial]
fn config_file_beats_default() {
    env::remove_var(DATA_DIR_ENV);

    let config = TomlConfig {
        data_dir: Some("/tmp/from-toml".to_string()),
        ..Default::default()
    };

    let data_dir = resolve_data_dir(None, &config);
    assert_eq!(data_dir, PathBuf::from("/tmp/from-toml"));
}

#[test]
fn parse_full_toml_config() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(
        &path,
        r#"
data_dir = "/srv/scanplant"
port = 5731
plant_id_api_key = "k-123"

[logging]
level = "debug"

[moderation]
denylist = ["ruim", "feio"]

[[knowledge_base]]
key = "Rosa"
common_name = "Rosa"
enhanced_description = "Planta ornamental."
care_instructions = "Regar 2x por semana."
"#,
    )
    .unwrap();

    let config = TomlConfig::load_from(&path).unwrap();
    assert_eq!(config.data_dir.as_deref(), Some("/srv/scanplant"));
    assert_eq!(config.port, Some(5731));
    assert_eq!(config.plant_id_api_key.as_deref(), Some("k-123"));
    assert_eq!(config.logging.level, "debug");
    assert_eq!(
        config.moderation.as_ref().unwrap().denylist,
        vec!["ruim".to_string(), "feio".to_string()]
    );
    assert_eq!(config.knowledge_base.len(), 1);
    assert_eq!(config.knowledge_base[0].key, "Rosa");
}

#[test]
fn parse_empty_toml_config_applies_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "").unwrap();

    let config = TomlConfig::load_from(&path).unwrap();
    assert!(config.data_dir.is_none());
    assert!(config.port.is_none());
    assert_eq!(config.logging.level, "info");
    assert!(config.moderation.is_none());
    assert!(config.knowledge_base.is_empty());
}

#[test]
#[serial]
fn api_key_env_beats_toml() {
    env::set_var(PLANT_ID_API_KEY_ENV, "env-key");

    let config = TomlConfig {
        plant_id_api_key: Some("toml-key".to_string()),
        ..Default::default()
    };
    assert_eq!(config.resolve_plant_id_api_key().as_deref(), Some("env-key"));

    env::remove_var(PLANT_ID_API_KEY_ENV);
    assert_eq!(
        config.resolve_plant_id_api_key().as_deref(),
        Some("toml-key")
    );
}

#[test]
fn data_dir_creation_and_database_path() {
    let dir = tempfile::tempdir().unwrap();
    let data_dir = dir.path().join("nested").join("scanplant");

    ensure_data_dir(&data_dir).unwrap();
    assert!(data_dir.is_dir());

    let db = database_path(&data_dir);
    assert_eq!(db, data_dir.join("scanplant.db"));
}

#[test]
fn user_agent_identifies_service() {
    let ua = get_user_agent();
    assert!(ua.starts_with("ScanPlant/"));
    assert!(ua.contains("github.com"));
}
