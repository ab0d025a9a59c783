use path_proxy::routing::{FallbackTarget, RegistryError, ServiceRegistry};
use path_proxy::settings::RegistrySettings;
use std::path::PathBuf;
use tempfile::TempDir;

// 테스트용 임시 포트 맵 파일 생성 헬퍼
fn create_port_map(content: &str) -> (PathBuf, TempDir) {
    let dir = tempfile::tempdir().unwrap();
    let file_path = dir.path().join("port_map.json");
    std::fs::write(&file_path, content).unwrap();
    (file_path, dir)
}

#[test]
fn test_load_port_map_file() {
    let (path, _dir) = create_port_map(
        r#"{
            "nginx": 80,
            "apachehttpserver": 8080,
            "tmpserver": 8001
        }"#,
    );

    let registry = ServiceRegistry::from_json_file(&path).unwrap();
    assert_eq!(registry.len(), 3);
    assert_eq!(registry.port("apachehttpserver"), Some(8080));
    assert_eq!(registry.service_names(), vec!["apachehttpserver", "nginx", "tmpserver"]);
}

#[test]
fn test_missing_file_is_an_error_but_load_continues() {
    let err = ServiceRegistry::from_json_file("/nonexistent/port_map.json").unwrap_err();
    assert!(matches!(err, RegistryError::FileError { .. }));

    let registry = ServiceRegistry::load_or_empty("/nonexistent/port_map.json");
    assert!(registry.is_empty());
}

#[test]
fn test_malformed_file_yields_empty_registry() {
    let (path, _dir) = create_port_map(r#"{"nginx": 80,"#);

    assert!(matches!(
        ServiceRegistry::from_json_file(&path),
        Err(RegistryError::ParseError { .. })
    ));
    assert!(ServiceRegistry::load_or_empty(&path).is_empty());
}

#[test]
fn test_registry_settings_resolve_fallback_from_port_map() {
    let (path, _dir) = create_port_map(r#"{"nginx": 80, "tmpserver": 8001}"#);
    let settings = RegistrySettings {
        port_map_path: path,
        ..RegistrySettings::default()
    };

    let (registry, fallback) = settings.load();
    assert_eq!(registry.port("nginx"), Some(80));
    assert_eq!(
        fallback,
        FallbackTarget {
            service: "tmpserver".to_string(),
            port: 8001,
        }
    );
}

#[test]
fn test_registry_settings_default_fallback_port() {
    let (path, _dir) = create_port_map(r#"{"nginx": 80, "tmpserver": 0}"#);
    let settings = RegistrySettings {
        port_map_path: path,
        ..RegistrySettings::default()
    };

    let (registry, fallback) = settings.load();
    assert!(!registry.contains("tmpserver"));
    assert_eq!(fallback.port, 8000);

    // 포트 맵이 없어도 fallback 대상은 항상 존재
    let settings = RegistrySettings {
        port_map_path: PathBuf::from("/nonexistent/port_map.json"),
        fallback_service: "catchall".to_string(),
        fallback_port: 9999,
    };
    let (registry, fallback) = settings.load();
    assert!(registry.is_empty());
    assert_eq!(fallback.service, "catchall");
    assert_eq!(fallback.port, 9999);
}
