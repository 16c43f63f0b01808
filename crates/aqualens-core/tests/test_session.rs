mod common;

use aqualens_core::error::AqualensError;
use aqualens_core::pipeline::params::ParameterValue;
use aqualens_core::pipeline::types::{CancelToken, Context};
use aqualens_core::session::EnhanceSession;
use aqualens_core::stages::white_balance::WbMethod;
use aqualens_core::stages::StageId;

use common::{make_underwater_image, mean_abs_diff};

#[test]
fn test_no_source_is_an_error() {
    let mut session = EnhanceSession::new();
    let err = session.process_preview(&Context::default()).unwrap_err();
    assert!(matches!(err, AqualensError::NoSource));
}

#[test]
fn test_load_source_tunes_and_classifies() {
    let mut session = EnhanceSession::new();
    session.load_source(make_underwater_image(64, 64)).unwrap();
    assert!(session.signature().is_some());
    assert!(session.water_type().is_some());
    // The blue-green scene moves Beer-Lambert away from its defaults.
    assert!(session.config().beer_lambert.params.depth_factor > 0.3);
}

#[test]
fn test_set_parameter_invalidates_full_cache_too() {
    // The classic stale-cache bug: preview recomputed but a full-res save
    // returning the pre-change image. Both must change after a write.
    let mut session = EnhanceSession::new();
    session.load_source(make_underwater_image(64, 64)).unwrap();
    let ctx = Context::default();

    let full_a = session.process_full(&ctx).unwrap();
    session
        .set_parameter(
            StageId::BeerLambert,
            "depth_factor",
            &ParameterValue::Float(1.2),
        )
        .unwrap();
    let full_b = session.process_full(&ctx).unwrap();
    assert!(mean_abs_diff(&full_a, &full_b) > 1e-4);
}

#[test]
fn test_set_parameter_unknown_stage_param_fails() {
    let mut session = EnhanceSession::new();
    session.load_source(make_underwater_image(32, 32)).unwrap();
    let err = session
        .set_parameter(StageId::Clahe, "omega", &ParameterValue::Float(0.5))
        .unwrap_err();
    assert!(matches!(err, AqualensError::InvalidParameter { .. }));
}

#[test]
fn test_set_auto_tune_retunes_stage_immediately() {
    let mut session = EnhanceSession::new();
    // Green-dominant source: the white-balance tuner picks the lake method.
    let mut img = make_underwater_image(64, 64);
    img.data.indexed_iter_mut().for_each(|((_, _, c), v)| {
        if c == 1 {
            *v = (*v + 0.35).clamp(0.0, 1.0);
        }
    });
    session.load_source(img).unwrap();

    // Overwrite the method by hand, then flip the flag back on.
    session
        .set_parameter(
            StageId::WhiteBalance,
            "method",
            &ParameterValue::Choice("white_patch".to_string()),
        )
        .unwrap();
    assert_eq!(
        session.config().white_balance.params.method,
        WbMethod::WhitePatch
    );

    session.set_auto_tune(StageId::WhiteBalance, true);
    assert_eq!(
        session.config().white_balance.params.method,
        WbMethod::LakeGreenWater,
        "flag flip must re-run the stage tuner"
    );
}

#[test]
fn test_parameter_writes_do_not_retune() {
    let mut session = EnhanceSession::new();
    session.load_source(make_underwater_image(64, 64)).unwrap();
    let before = session.config().udcp.params.clone();
    session
        .set_parameter(StageId::Clahe, "clip_limit", &ParameterValue::Float(3.0))
        .unwrap();
    assert_eq!(session.config().udcp.params, before);
}

#[test]
fn test_analyze_quality_runs() {
    let mut session = EnhanceSession::new();
    session.load_source(make_underwater_image(64, 64)).unwrap();
    let report = session.analyze_quality(&CancelToken::new()).unwrap();
    assert_eq!(report.checks.len(), 7);
    assert!((0.0..=10.0).contains(&report.overall_score));
}
