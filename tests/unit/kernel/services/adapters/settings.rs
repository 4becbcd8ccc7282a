use super::*;
use tempfile::tempdir;

#[test]
fn settings_path_ends_with_file_name() {
    let path = get_settings_path().unwrap();
    assert!(path.ends_with(SETTINGS_FILE));
}

#[test]
fn default_settings_are_written_once() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("nested").join("settings.json");

    write_default_settings(&path).unwrap();
    assert_eq!(load_settings_from(&path), Some(Settings::default()));

    std::fs::write(&path, r#"{"debounce_ms": 10}"#).unwrap();
    write_default_settings(&path).unwrap();
    assert_eq!(load_settings_from(&path).unwrap().debounce_ms, 10);
}

#[test]
fn invalid_or_missing_settings_load_as_none() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("settings.json");
    assert!(load_settings_from(&path).is_none());

    std::fs::write(&path, "{ not json").unwrap();
    assert!(load_settings_from(&path).is_none());
}

#[test]
fn log_filter_round_trips() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("settings.json");
    std::fs::write(
        &path,
        r#"{"log_filter": "tilelayers=debug", "sidecar_suffix": "layers.xml"}"#,
    )
    .unwrap();

    let settings = load_settings_from(&path).unwrap();
    assert_eq!(settings.log_filter.as_deref(), Some("tilelayers=debug"));
    assert_eq!(settings.sidecar_suffix, "layers.xml");
    assert!(settings.watch_files);
}
