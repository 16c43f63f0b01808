use aqualens_core::pipeline::config::PipelineConfig;
use aqualens_core::pipeline::persist;
use aqualens_core::stages::white_balance::WbMethod;
use aqualens_core::stages::StageId;

#[test]
fn test_round_trip_preserves_config() {
    let mut config = PipelineConfig::default();
    config.set_enabled(StageId::Udcp, false);
    config.white_balance.params.method = WbMethod::WhitePatch;
    config.white_balance.params.max_gain = 2.2;
    config.clahe.auto_tune = false;

    let json = persist::to_json(&config).unwrap();
    let loaded = persist::from_json(&json).unwrap();
    assert_eq!(loaded, config);
}

#[test]
fn test_compact_form_round_trips() {
    let mut config = PipelineConfig::default();
    config.udcp.params.omega = 0.85;

    let json = persist::to_json_compact(&config).unwrap();
    assert!(!json.contains('\n'), "compact form is single-line");
    assert_eq!(persist::from_json(&json).unwrap(), config);
}

#[test]
fn test_fingerprint_tracks_params_not_auto_tune() {
    let config = PipelineConfig::default();
    let base = config.fingerprint();

    let mut flagged = config.clone();
    flagged.set_auto_tune_flag(StageId::Udcp, false);
    assert_eq!(base, flagged.fingerprint(), "auto-tune flags are not cached state");

    let mut changed = config.clone();
    changed.udcp.params.omega = 0.8;
    assert_ne!(base, changed.fingerprint());

    let mut disabled = config.clone();
    disabled.set_enabled(StageId::Clahe, false);
    assert_ne!(base, disabled.fingerprint());
}

#[test]
fn test_unknown_keys_ignored() {
    let json = r#"{
        "version": 1,
        "future_field": true,
        "stages": {
            "white_balance": {
                "enabled": false,
                "auto_tune": true,
                "params": {"method": "white_patch", "max_gain": 2.2, "mystery": 7}
            }
        }
    }"#;
    let config = persist::from_json(json).unwrap();
    assert!(!config.white_balance.enabled);
    assert_eq!(config.white_balance.params.method, WbMethod::WhitePatch);
    // Stages absent from the file keep their defaults.
    assert!(config.udcp.enabled);
    assert_eq!(config.udcp.params, PipelineConfig::default().udcp.params);
}

#[test]
fn test_version_mismatch_is_non_fatal() {
    let json = r#"{"version": 99, "stages": {}}"#;
    let config = persist::from_json(json).unwrap();
    assert_eq!(config, PipelineConfig::default());
}

#[test]
fn test_out_of_range_values_clamped_on_load() {
    let json = r#"{
        "version": 1,
        "stages": {
            "udcp": {"params": {"omega": 5.0, "window": 4}},
            "white_balance": {"params": {"max_gain": 0.1}}
        }
    }"#;
    let config = persist::from_json(json).unwrap();
    assert!((config.udcp.params.omega - 0.99).abs() < 1e-6);
    assert_eq!(config.udcp.params.window, 5);
    assert!((config.white_balance.params.max_gain - 1.0).abs() < 1e-6);
}

#[test]
fn test_save_and_load_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("preset.json");

    let mut config = PipelineConfig::default();
    config.beer_lambert.params.depth_factor = 0.9;
    persist::save_preset(&config, &path).unwrap();

    let loaded = persist::load_preset(&path).unwrap();
    assert_eq!(loaded, config);
    // No temp file left behind.
    assert!(!path.with_extension("json.tmp").exists());
}
