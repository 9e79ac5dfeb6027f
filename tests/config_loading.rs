//! Loading SDK configuration from files

use mini_apps_guard::{
    CallSite, Environment, Error, GuardContext, GuardErrorKind, Scope, SdkConfig, Version,
};
use std::path::PathBuf;

fn temp_file(name: &str, content: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("mini-apps-guard-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join(name);
    std::fs::write(&path, content).unwrap();
    path
}

#[test]
fn test_load_yaml_file() {
    let path = temp_file("sdk.yaml", "environment: mini_app\nversion: \"7.10\"\n");
    let config = SdkConfig::from_path(&path).unwrap();
    assert_eq!(config.environment, Some(Environment::MiniApp));
    assert_eq!(config.version.as_ref().map(Version::to_string).as_deref(), Some("7.10"));

    let scope = Scope::from_config(&config);
    assert!(scope.evaluate(&GuardContext::basic(CallSite::function("init"))).is_ok());
}

#[test]
fn test_load_json_file() {
    let path = temp_file("sdk.json", r#"{ "environment": "server" }"#);
    let config = SdkConfig::from_path(&path).unwrap();
    let scope = Scope::from_config(&config);
    assert!(!scope.is_initialized());
    assert_eq!(
        scope
            .evaluate(&GuardContext::basic(CallSite::function("init")))
            .unwrap_err()
            .kind(),
        GuardErrorKind::UnknownEnv
    );
}

#[test]
fn test_unquoted_yaml_integer_version() {
    let path = temp_file("int.yml", "version: 10\n");
    let config = SdkConfig::from_path(&path).unwrap();
    assert_eq!(config.version, Some(Version::new(10, 0)));
}

#[test]
fn test_unquoted_yaml_float_version_is_rejected() {
    let err = SdkConfig::from_yaml_str("environment: mini_app\nversion: 7.10\n").unwrap_err();
    assert!(err.to_string().contains("quoted"), "{err}");

    let path = temp_file("float.yaml", "version: 6.1\n");
    assert!(matches!(
        SdkConfig::from_path(&path),
        Err(Error::Configuration { .. })
    ));
}

#[test]
fn test_invalid_file_reports_path() {
    let path = temp_file("broken.yaml", "environment: desktop\n");
    let err = SdkConfig::from_path(&path).unwrap_err();
    match &err {
        Error::Configuration { context, .. } => {
            assert_eq!(context.source.as_deref(), Some("config_file"));
            assert!(context.field_path.as_deref().unwrap().ends_with("broken.yaml"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn test_missing_file_is_io_error() {
    let path = std::env::temp_dir().join("mini-apps-guard-definitely-missing.yaml");
    assert!(matches!(SdkConfig::from_path(&path), Err(Error::Io(_))));
}
