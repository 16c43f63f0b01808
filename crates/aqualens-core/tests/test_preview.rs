mod common;

use aqualens_core::pipeline::config::PipelineConfig;
use aqualens_core::pipeline::params::ParameterValue;
use aqualens_core::pipeline::types::Context;
use aqualens_core::preview::PreviewState;
use aqualens_core::stages::StageId;

use common::{make_underwater_image, mean_abs_diff};

#[test]
fn test_small_source_preview_is_identity() {
    let img = make_underwater_image(100, 200);
    let state = PreviewState::new(img.clone());
    assert_eq!(state.source_preview().data.dim(), img.data.dim());
    assert!((state.scale_factor() - 1.0).abs() < 1e-9);
}

#[test]
fn test_large_source_preview_bounded() {
    let img = make_underwater_image(300, 2048);
    let state = PreviewState::new(img);
    let preview = state.source_preview();
    assert!(preview.width().max(preview.height()) <= 1024);
    assert_eq!(preview.width(), 1024);
    assert_eq!(preview.height(), 150);
    assert!((state.scale_factor() - 0.5).abs() < 1e-9);
}

#[test]
fn test_preview_cache_returns_same_result() {
    let mut state = PreviewState::new(make_underwater_image(64, 64));
    let config = PipelineConfig::default();
    let ctx = Context::default();
    let first = state.get_processed_preview(&config, &ctx).unwrap();
    let second = state.get_processed_preview(&config, &ctx).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_parameter_change_recomputes_both_resolutions() {
    let mut state = PreviewState::new(make_underwater_image(64, 64));
    let mut config = PipelineConfig::default();
    let ctx = Context::default();

    let preview_a = state.get_processed_preview(&config, &ctx).unwrap();
    let full_a = state.get_processed_full(&config, &ctx).unwrap();

    config
        .set_parameter(
            StageId::BeerLambert,
            "depth_factor",
            &ParameterValue::Float(1.2),
        )
        .unwrap();

    let preview_b = state.get_processed_preview(&config, &ctx).unwrap();
    let full_b = state.get_processed_full(&config, &ctx).unwrap();

    assert!(mean_abs_diff(&preview_a, &preview_b) > 1e-4);
    assert!(mean_abs_diff(&full_a, &full_b) > 1e-4);
}

#[test]
fn test_set_source_resets_caches() {
    let mut state = PreviewState::new(make_underwater_image(64, 64));
    let config = PipelineConfig::default();
    let ctx = Context::default();
    let first = state.get_processed_preview(&config, &ctx).unwrap();

    let brighter = {
        let mut img = make_underwater_image(64, 64);
        img.data.mapv_inplace(|v| (v + 0.2).clamp(0.0, 1.0));
        img
    };
    state.set_source(brighter);
    let second = state.get_processed_preview(&config, &ctx).unwrap();
    assert!(mean_abs_diff(&first, &second) > 1e-4);
}

#[test]
fn test_invalidate_then_recompute_is_consistent() {
    let mut state = PreviewState::new(make_underwater_image(64, 64));
    let config = PipelineConfig::default();
    let ctx = Context::default();
    let first = state.get_processed_preview(&config, &ctx).unwrap();
    state.invalidate();
    let second = state.get_processed_preview(&config, &ctx).unwrap();
    assert_eq!(first, second, "recomputation must be deterministic");
}
