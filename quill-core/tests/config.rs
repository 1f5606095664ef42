use quill_core::config::{ConfigError, ConfigProperties, ConfigValue, QuillConfig, ServerConfig};
use serial_test::serial;

#[test]
fn test_empty_config() {
    let config = QuillConfig::empty();
    assert!(matches!(
        config.get::<String>("nonexistent"),
        Err(ConfigError::NotFound(_))
    ));
}

#[test]
fn test_set_and_get() {
    let mut config = QuillConfig::empty();
    config.set("session.secret", ConfigValue::String("Awesome".into()));
    assert_eq!(config.get::<String>("session.secret").unwrap(), "Awesome");
    assert_eq!(config.get_or("db.port", 3306u16), 3306);
}

#[test]
fn test_type_conversions() {
    let mut config = QuillConfig::empty();
    config.set("int_val", ConfigValue::Integer(42));
    config.set("float_val", ConfigValue::Float(2.5));
    config.set("bool_val", ConfigValue::Bool(true));
    config.set("env_bool", ConfigValue::String("false".into()));
    config.set("env_port", ConfigValue::String("3307".into()));
    config.set("null_val", ConfigValue::Null);

    assert_eq!(config.get::<i64>("int_val").unwrap(), 42);
    assert_eq!(config.get::<f64>("float_val").unwrap(), 2.5);
    assert!(config.get::<bool>("bool_val").unwrap());
    assert!(!config.get::<bool>("env_bool").unwrap());
    assert_eq!(config.get::<u16>("env_port").unwrap(), 3307);
    assert_eq!(config.get::<String>("int_val").unwrap(), "42");
    assert!(config.get::<Option<String>>("null_val").unwrap().is_none());
    assert!(matches!(
        config.get::<i64>("bool_val"),
        Err(ConfigError::TypeMismatch { .. })
    ));
}

#[test]
fn test_flatten_yaml() {
    let yaml = r#"
db:
  host: 127.0.0.1
  port: 3306
  user: www-data
session:
  secret: Awesome
"#;
    let config = QuillConfig::from_yaml_str(yaml, "test").unwrap();
    assert_eq!(config.get::<String>("db.host").unwrap(), "127.0.0.1");
    assert_eq!(config.get::<i64>("db.port").unwrap(), 3306);
    assert_eq!(config.get::<String>("session.secret").unwrap(), "Awesome");
}

#[test]
fn test_overlay_merges_per_leaf() {
    let base = r#"
db:
  host: 127.0.0.1
  port: 3306
  user: www-data
  password: www-data
session:
  secret: Awesome
"#;
    let overlay = r#"
db:
  host: 192.168.0.100
"#;
    let config = QuillConfig::from_yaml_str(base, "test")
        .unwrap()
        .overlay_yaml_str(overlay)
        .unwrap();
    assert_eq!(config.get::<String>("db.host").unwrap(), "192.168.0.100");
    assert_eq!(config.get::<i64>("db.port").unwrap(), 3306);
    assert_eq!(config.get::<String>("db.user").unwrap(), "www-data");
    assert_eq!(config.get::<String>("session.secret").unwrap(), "Awesome");
}

#[test]
fn test_list_config() {
    let yaml = r#"
server:
  origins:
    - "http://localhost"
    - "https://blog.example.com"
"#;
    let config = QuillConfig::from_yaml_str(yaml, "test").unwrap();
    let origins: Vec<String> = config.get("server.origins").unwrap();
    assert_eq!(origins, vec!["http://localhost", "https://blog.example.com"]);
    assert_eq!(
        config.get::<String>("server.origins.1").unwrap(),
        "https://blog.example.com"
    );
}

#[test]
fn test_invalid_yaml_is_a_load_error() {
    let result = QuillConfig::from_yaml_str("db: [unclosed", "test");
    assert!(matches!(result, Err(ConfigError::Load(_))));
}

#[test]
fn test_server_section_defaults_and_overrides() {
    let config = QuillConfig::empty();
    let server: ServerConfig = config.section().unwrap();
    assert_eq!(server, ServerConfig::default());
    assert_eq!(server.addr(), "127.0.0.1:9000");

    let config = QuillConfig::from_yaml_str("server:\n  port: 8080\n", "test").unwrap();
    let server = ServerConfig::from_config(&config).unwrap();
    assert_eq!(server.port, 8080);
    assert_eq!(server.host, "127.0.0.1");
}

#[test]
#[serial]
fn test_load_from_dir_with_profile() {
    std::env::remove_var("QUILL_PROFILE");
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("application.yaml"),
        "db:\n  host: 127.0.0.1\n  user: www-data\nsession:\n  secret: Awesome\n",
    )
    .unwrap();
    std::fs::write(
        dir.path().join("application-prod.yaml"),
        "db:\n  host: 192.168.0.100\n",
    )
    .unwrap();

    let config = QuillConfig::load_from(dir.path(), "prod").unwrap();
    assert_eq!(config.profile(), "prod");
    assert_eq!(config.get::<String>("db.host").unwrap(), "192.168.0.100");
    assert_eq!(config.get::<String>("db.user").unwrap(), "www-data");

    let config = QuillConfig::load_from(dir.path(), "dev").unwrap();
    assert_eq!(config.get::<String>("db.host").unwrap(), "127.0.0.1");
}

#[test]
#[serial]
fn test_env_overlay_and_placeholders() {
    std::env::remove_var("QUILL_PROFILE");
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("application.yaml"),
        "db:\n  host: 127.0.0.1\nsession:\n  secret: \"${QUILL_TEST_SECRET}\"\n",
    )
    .unwrap();
    std::env::set_var("QUILL_TEST_SECRET", "from-env");
    std::env::set_var("DB_HOST", "db.internal");

    let config = QuillConfig::load_from(dir.path(), "dev").unwrap();
    assert_eq!(config.get::<String>("session.secret").unwrap(), "from-env");
    assert_eq!(config.get::<String>("db.host").unwrap(), "db.internal");

    std::env::remove_var("QUILL_TEST_SECRET");
    std::env::remove_var("DB_HOST");
}

#[test]
#[serial]
fn test_profile_env_var_wins_over_argument() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("application-test.yaml"), "a: 1\n").unwrap();
    std::env::set_var("QUILL_PROFILE", "test");
    let config = QuillConfig::load_from(dir.path(), "dev").unwrap();
    std::env::remove_var("QUILL_PROFILE");
    assert_eq!(config.profile(), "test");
    assert_eq!(config.get::<i64>("a").unwrap(), 1);
}
