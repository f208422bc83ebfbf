use bakery_config::{Config, ConfigError, ConfigManager};
use bakery_domain::TransitionPolicy;
use tempfile::tempdir;

#[test]
fn default_config_has_non_empty_fields() {
    let cfg = Config::default();

    assert!(!cfg.currency_label.is_empty());
    assert!(!cfg.log_filter.is_empty());
    assert_eq!(cfg.transition_policy, TransitionPolicy::Strict);
}

#[test]
fn missing_file_loads_defaults() {
    let dir = tempdir().expect("tempdir");
    let manager = ConfigManager::with_base_dir(dir.path().to_path_buf()).expect("manager");

    assert_eq!(manager.load().expect("load config"), Config::default());
    assert!(manager.config_path().starts_with(dir.path()));
}

#[test]
fn config_manager_persists_and_loads_config() {
    let dir = tempdir().expect("tempdir");
    let manager = ConfigManager::new(dir.path().join("config.json"));

    let cfg = Config {
        currency_label: "LKR".to_string(),
        transition_policy: TransitionPolicy::Permissive,
        trailing_months: 6,
        data_dir: Some(dir.path().join("records")),
        ..Config::default()
    };

    manager.save(&cfg).expect("save config");
    let loaded = manager.load().expect("load config");

    assert_eq!(loaded, cfg);
    assert!(!dir.path().join("config.json.tmp").exists());
}

#[test]
fn corrupt_file_is_a_serde_error() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("config.json");
    std::fs::write(&path, "{ not json").expect("write");

    let err = ConfigManager::new(path).load().unwrap_err();
    assert!(matches!(err, ConfigError::Serde(_)));
}

#[test]
fn load_or_init_writes_defaults_once() {
    let dir = tempdir().expect("tempdir");
    let manager = ConfigManager::with_base_dir(dir.path().to_path_buf()).expect("manager");

    assert!(!manager.config_path().exists());
    let cfg = manager.load_or_init().expect("init config");
    assert_eq!(cfg, Config::default());
    assert!(manager.config_path().exists());

    let edited = Config {
        top_products_limit: 3,
        ..cfg
    };
    manager.save(&edited).expect("save");
    assert_eq!(manager.load_or_init().expect("reload").top_products_limit, 3);
}

#[test]
fn invalid_values_are_rejected_on_save_and_load() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("config.json");
    let manager = ConfigManager::new(path.clone());

    let bad = Config {
        trailing_months: 0,
        ..Config::default()
    };
    assert!(matches!(manager.save(&bad), Err(ConfigError::Invalid(_))));
    assert!(!path.exists());

    std::fs::write(&path, r#"{"topProductsLimit": 0}"#).expect("write");
    assert!(matches!(manager.load(), Err(ConfigError::Invalid(_))));
}
