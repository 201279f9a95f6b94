//! Loading configuration files and opening the configured backends

use selj::config::{AppConfig, StoreBackend};
use selj::core::error::ConfigError;
use selj::core::service::ListingRepository;
use std::io::Write;
use tempfile::NamedTempFile;

fn config_error(err: anyhow::Error) -> ConfigError {
    err.downcast::<ConfigError>()
        .expect("error should be a ConfigError")
}

#[test]
fn test_load_yaml_file() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(
        file,
        "server:\n  host: 127.0.0.1\n  port: 8081\nstore:\n  backend: file\n  data_dir: /var/lib/selj\nsearch:\n  provider: typesense\n  typesense:\n    host: http://search:8108\n    api_key: xyz\n"
    )
    .unwrap();

    let config = AppConfig::from_yaml_file(file.path().to_str().unwrap()).unwrap();
    assert_eq!(config.bind_address(), "127.0.0.1:8081");
    assert_eq!(config.store.backend, StoreBackend::File);
    assert_eq!(config.store.data_dir.to_str(), Some("/var/lib/selj"));
    assert!(config.search.use_typesense());
    assert_eq!(config.search.typesense.collection, "listings");
}

#[test]
fn test_missing_file() {
    let err = AppConfig::from_yaml_file("/nonexistent/selj.yaml").unwrap_err();
    assert!(matches!(
        config_error(err),
        ConfigError::FileNotFound { path } if path == "/nonexistent/selj.yaml"
    ));
}

#[test]
fn test_invalid_yaml_names_the_file() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "server:\n  port: [not a number").unwrap();
    let path = file.path().to_str().unwrap().to_string();

    let err = AppConfig::from_yaml_file(&path).unwrap_err();
    match config_error(err) {
        ConfigError::ParseError { file, .. } => assert_eq!(file, Some(path)),
        other => panic!("expected parse error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_open_memory_repository_is_seeded() {
    let config = AppConfig::from_yaml_str("store:\n  backend: memory\n").unwrap();
    let repo = config.open_repository().await.unwrap();
    assert_eq!(repo.backend_name(), "memory");
    assert!(!repo.get_categories().await.unwrap().is_empty());
    assert!(config.open_search_index().await.unwrap().is_none());
}

#[cfg(feature = "file")]
#[tokio::test]
async fn test_open_file_repository_in_data_dir() {
    let dir = tempfile::TempDir::new().unwrap();
    let mut config = AppConfig::default();
    config.store.data_dir = dir.path().to_path_buf();

    let repo = config.open_repository().await.unwrap();
    assert_eq!(repo.backend_name(), "file");
    assert!(dir.path().join("db.json").exists());
}

#[test]
fn test_postgres_without_url_is_rejected() {
    let mut config = AppConfig::from_yaml_str("store:\n  backend: postgres\n").unwrap();
    let err = config.apply_overrides(|_| None).unwrap_err();
    assert!(matches!(config_error(err), ConfigError::InvalidValue { .. }));
}
