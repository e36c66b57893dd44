use std::{env, fs};

use libris_server::config::loader::load_config;

#[test]
fn config_parsing_and_env_overrides_and_validation() {
    let dir = tempfile::tempdir().expect("tmp dir");
    let path = dir.path().join("libris.toml");

    let toml_content = r#"
[server]
host = "127.0.0.1"
port = 8081
request_timeout_ms = 1000
body_limit_bytes = 2048

[logging]
level = "debug"

[cache]
capacity = 25

[reports]
source_dir = "/var/log/libris"
source_prefix = "library"
output_dir = "/var/log/libris/reports"
max_concurrent_jobs = 2
"#;
    fs::write(&path, toml_content).expect("write toml");

    // 1) Valid config parses
    let cfg = load_config(path.to_str()).expect("should parse config");
    assert_eq!(cfg.server.port, 8081);
    assert_eq!(cfg.server.body_limit_bytes, 2048);
    assert_eq!(cfg.logging.level, "debug");
    assert_eq!(cfg.cache.capacity, 25);
    assert_eq!(cfg.reports.max_concurrent_jobs, 2);
    assert_eq!(
        cfg.reports.output_dir,
        std::path::PathBuf::from("/var/log/libris/reports")
    );

    // 2) Env override should win over file
    unsafe {
        env::set_var("LIBRIS__CACHE__CAPACITY", "7");
    }
    let cfg_env = load_config(path.to_str()).expect("should parse config with env overrides");
    assert_eq!(cfg_env.cache.capacity, 7);
    unsafe {
        env::remove_var("LIBRIS__CACHE__CAPACITY");
    }

    // 3) Invalid config (zero worker pool) should error
    let invalid_path = dir.path().join("invalid.toml");
    let invalid_toml = r#"
[reports]
max_concurrent_jobs = 0
"#;
    fs::write(&invalid_path, invalid_toml).expect("write invalid toml");
    let err = load_config(invalid_path.to_str()).expect_err("expected validation error");
    assert!(err.contains("max_concurrent_jobs"));

    // 4) Missing file falls back to defaults
    let missing = dir.path().join("absent.toml");
    let cfg_default = load_config(missing.to_str()).expect("defaults should load");
    assert_eq!(cfg_default.cache.capacity, 100);
    assert_eq!(cfg_default.server.port, 8080);
}
