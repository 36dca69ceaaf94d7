//! # Client Settings Tests

use ragfile::settings::{ClientSettings, DEFAULT_SERVER_URL};
use ragfile::SettingsError;
use std::collections::HashMap;
use std::io::Write;
use tempfile::NamedTempFile;

#[test]
fn test_defaults_without_file_or_env() {
    let settings = ClientSettings::load_with_env(None, HashMap::new()).unwrap();
    assert_eq!(settings.server_url, DEFAULT_SERVER_URL);
    assert_eq!(settings.request_timeout_secs, 120);
    assert_eq!(settings.log_file, "ragfile.log");
}

#[test]
fn test_yaml_file_overrides_defaults() -> anyhow::Result<()> {
    let mut file = NamedTempFile::with_suffix(".yml")?;
    writeln!(file, "server_url: http://rag.internal:9000")?;
    writeln!(file, "request_timeout_secs: 30")?;

    let settings = ClientSettings::load_with_env(Some(file.path()), HashMap::new())?;
    assert_eq!(settings.server_url, "http://rag.internal:9000");
    assert_eq!(settings.request_timeout_secs, 30);
    assert_eq!(settings.log_file, "ragfile.log");
    Ok(())
}

#[test]
fn test_env_overrides_file() -> anyhow::Result<()> {
    let mut file = NamedTempFile::with_suffix(".yml")?;
    writeln!(file, "server_url: http://from-file:1")?;

    let env = HashMap::from([
        ("RAGFILE_SERVER_URL".to_string(), "http://from-env:2".to_string()),
        ("RAGFILE_REQUEST_TIMEOUT_SECS".to_string(), "5".to_string()),
    ]);
    let settings = ClientSettings::load_with_env(Some(file.path()), env)?;
    assert_eq!(settings.server_url, "http://from-env:2");
    assert_eq!(settings.request_timeout_secs, 5);
    Ok(())
}

#[test]
fn test_missing_explicit_file_is_an_error() {
    let result = ClientSettings::load_with_env(
        Some(std::path::Path::new("/definitely/not/here.yml")),
        HashMap::new(),
    );
    assert!(matches!(result, Err(SettingsError::NotFound(_))));
}
