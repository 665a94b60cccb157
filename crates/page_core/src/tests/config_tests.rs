use super::*;

use std::{collections::HashMap, io::Write};

fn write_settings(contents: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().expect("temp file");
    file.write_all(contents.as_bytes()).expect("write settings");
    file
}

#[test]
fn defaults_match_page_behavior_constants() {
    let settings = ControllerSettings::default();
    assert_eq!(settings.header_hide_threshold, 100);
    assert_eq!(settings.scrolled_threshold, 50);
    assert_eq!(settings.back_to_top_threshold, 300);
    assert_eq!(settings.fade_duration, Duration::from_millis(300));
    assert_eq!(settings.search_latency, Duration::from_millis(1000));
    assert_eq!(settings.locale, Locale::Ja);
    assert!(settings.search_endpoint.is_none());
}

#[test]
fn file_values_override_defaults() {
    let file = write_settings(
        r#"
header_hide_threshold = 120
fade_ms = "150"
search_endpoint = "http://localhost:9000/api"
locale = "en"
unknown_key = 1
"#,
    );
    let mut settings = ControllerSettings::default();
    let table: toml::Table = fs::read_to_string(file.path())
        .expect("read")
        .parse()
        .expect("parse");
    apply_file(&mut settings, &table);

    assert_eq!(settings.header_hide_threshold, 120);
    assert_eq!(settings.fade_duration, Duration::from_millis(150));
    assert_eq!(
        settings.search_endpoint.as_deref(),
        Some("http://localhost:9000/api")
    );
    assert_eq!(settings.locale, Locale::En);
}

#[test]
fn invalid_values_keep_previous_setting() {
    let mut settings = ControllerSettings::default();
    let env: HashMap<&str, &str> = HashMap::from([
        ("PAGE__SCROLLED_THRESHOLD", "lots"),
        ("PAGE__LOCALE", "klingon"),
        ("PAGE__SEARCH_TIMEOUT_SECS", "3"),
        ("PAGE__SEARCH_ENDPOINT", "  "),
    ]);
    apply_overrides(&mut settings, |key| env.get(key).map(|v| v.to_string()));

    assert_eq!(settings.scrolled_threshold, 50);
    assert_eq!(settings.locale, Locale::Ja);
    assert_eq!(settings.search_timeout, Duration::from_secs(3));
    assert_eq!(settings.search_endpoint, None);
}

#[test]
fn missing_file_is_a_read_error() {
    let dir = tempfile::tempdir().expect("temp dir");
    let err = load_settings(Some(dir.path().join("page.toml").as_path())).expect_err("should fail");
    assert!(matches!(err, ConfigError::Read { .. }));
}

#[test]
fn broken_toml_is_a_parse_error() {
    let file = write_settings("header_hide_threshold = ");
    let err = load_settings(Some(file.path())).expect_err("should fail");
    assert!(matches!(err, ConfigError::Parse { .. }));
}
