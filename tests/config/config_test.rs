//! Coverage for config parsing and validation.

use std::path::{Path, PathBuf};

use lobby_info::config::{load_config, runtime_paths, Config};

fn temp_dir() -> tempfile::TempDir {
    match tempfile::tempdir() {
        Ok(dir) => dir,
        Err(err) => panic!("tempdir should be created: {err}"),
    }
}

fn write_config(dir: &Path, contents: &str) -> PathBuf {
    let path = dir.join("config.toml");
    if let Err(err) = std::fs::write(&path, contents) {
        panic!("config should be written: {err}");
    }
    path
}

#[test]
fn parses_minimal_config() {
    let dir = temp_dir();
    let path = write_config(
        dir.path(),
        r#"
[log]
directory = "/tmp/dbd-logs"

[api]
session_base_url = "http://127.0.0.1:8080"
"#,
    );

    let config = match load_config(&path) {
        Ok(config) => config,
        Err(err) => panic!("config should load: {err:#}"),
    };

    assert_eq!(config.log.directory, Some(PathBuf::from("/tmp/dbd-logs")));
    assert_eq!(config.log.file_name, "DeadByDaylight.log");
    assert_eq!(config.api.session_base_url, "http://127.0.0.1:8080");
    assert_eq!(config.api.metadata_base_url, "https://dbd-stats.info");

    match config.log.resolve_directory() {
        Ok(resolved) => assert_eq!(resolved, PathBuf::from("/tmp/dbd-logs")),
        Err(err) => panic!("override should resolve: {err}"),
    }
}

#[test]
fn empty_file_yields_defaults() {
    let dir = temp_dir();
    let path = write_config(dir.path(), "");

    let config = match load_config(&path) {
        Ok(config) => config,
        Err(err) => panic!("empty config should load: {err:#}"),
    };
    let defaults = Config::default();
    assert_eq!(config.log.file_name, defaults.log.file_name);
    assert_eq!(config.api.session_base_url, defaults.api.session_base_url);
}

#[test]
fn missing_file_yields_defaults() {
    let dir = temp_dir();
    let config = match load_config(&dir.path().join("absent.toml")) {
        Ok(config) => config,
        Err(err) => panic!("missing config should default: {err:#}"),
    };
    assert!(config.log.directory.is_none());
}

#[test]
fn invalid_base_url_is_rejected() {
    let dir = temp_dir();
    let path = write_config(dir.path(), "[api]\nmetadata_base_url = \"not a url\"\n");

    let err = match load_config(&path) {
        Ok(_) => panic!("invalid url should be rejected"),
        Err(err) => err,
    };
    assert!(format!("{err:#}").contains("metadata_base_url"));
}

#[test]
fn file_name_must_be_bare() {
    let dir = temp_dir();
    let path = write_config(dir.path(), "[log]\nfile_name = \"sub/DeadByDaylight.log\"\n");
    assert!(load_config(&path).is_err());

    let empty = write_config(dir.path(), "[log]\nfile_name = \"\"\n");
    assert!(load_config(&empty).is_err());
}

#[test]
fn malformed_toml_is_rejected() {
    let dir = temp_dir();
    let path = write_config(dir.path(), "[log\n");
    assert!(load_config(&path).is_err());
}

#[test]
fn runtime_paths_share_root() {
    let paths = match runtime_paths() {
        Ok(paths) => paths,
        Err(err) => panic!("runtime paths should resolve: {err}"),
    };
    assert!(paths.config_toml.starts_with(&paths.root));
    assert!(paths.logs_dir.starts_with(&paths.root));
    assert!(paths.root.ends_with("lobby-info"));
}
