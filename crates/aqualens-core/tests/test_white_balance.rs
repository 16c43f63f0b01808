mod common;

use aqualens_core::autotune::{classify_water, compute_signature, WaterType};
use aqualens_core::ops::stats::channel_means;
use aqualens_core::pipeline::params::{ParameterValue, StageParams};
use aqualens_core::stages::white_balance::{self, WbMethod, WhiteBalanceParams};

use common::{in_range, make_image, make_underwater_image};

// ---------------------------------------------------------------------------
// gray-world
// ---------------------------------------------------------------------------

#[test]
fn test_gray_world_flat_green() {
    // Constant (0.3, 0.9, 0.2): gains pull every channel to the mean 0.4667.
    let img = make_image(16, 16, [0.3, 0.9, 0.2]);
    let params = WhiteBalanceParams {
        method: WbMethod::GrayWorld,
        percentile: 50.0,
        max_gain: 5.0,
    };
    let out = white_balance::apply(&img, &params).unwrap();
    let means = channel_means(&out);
    let expected = (0.3 + 0.9 + 0.2) / 3.0;
    for c in 0..3 {
        assert!(
            (means[c] - expected).abs() < 1e-3,
            "channel {c}: {} vs {expected}",
            means[c]
        );
    }
}

#[test]
fn test_gray_world_respects_max_gain() {
    // Red needs a ~4.7x gain to reach the mean; max_gain 1.5 caps it.
    let img = make_image(16, 16, [0.1, 0.9, 0.4]);
    let params = WhiteBalanceParams {
        method: WbMethod::GrayWorld,
        percentile: 50.0,
        max_gain: 1.5,
    };
    let out = white_balance::apply(&img, &params).unwrap();
    let means = channel_means(&out);
    assert!((means[0] - 0.15).abs() < 1e-4, "red gain capped at 1.5");
}

#[test]
fn test_gray_world_neutral_image_unchanged() {
    let img = make_image(16, 16, [0.5, 0.5, 0.5]);
    let params = WhiteBalanceParams::default();
    let out = white_balance::apply(&img, &params).unwrap();
    assert!(common::mean_abs_diff(&img, &out) < 1e-5);
}

// ---------------------------------------------------------------------------
// other methods
// ---------------------------------------------------------------------------

#[test]
fn test_white_patch_equalizes_highlights() {
    let img = make_image(16, 16, [0.4, 0.8, 0.6]);
    let params = WhiteBalanceParams {
        method: WbMethod::WhitePatch,
        percentile: 15.0,
        max_gain: 5.0,
    };
    let out = white_balance::apply(&img, &params).unwrap();
    let means = channel_means(&out);
    // All P99s map to the brightest channel's P99 = 0.8.
    for c in 0..3 {
        assert!((means[c] - 0.8).abs() < 1e-3, "channel {c}: {}", means[c]);
    }
}

#[test]
fn test_shades_of_gray_balances_constant() {
    let img = make_image(16, 16, [0.2, 0.6, 0.4]);
    let params = WhiteBalanceParams {
        method: WbMethod::ShadesOfGray,
        percentile: 15.0,
        max_gain: 5.0,
    };
    let out = white_balance::apply(&img, &params).unwrap();
    let means = channel_means(&out);
    let target = (0.2 + 0.6 + 0.4) / 3.0;
    for c in 0..3 {
        assert!((means[c] - target).abs() < 1e-3);
    }
}

#[test]
fn test_grey_edge_stays_in_range() {
    let img = make_underwater_image(64, 80);
    let params = WhiteBalanceParams {
        method: WbMethod::GreyEdge,
        percentile: 10.0,
        max_gain: 3.0,
    };
    let out = white_balance::apply(&img, &params).unwrap();
    assert!(in_range(&out));
    assert_eq!(out.data.dim(), img.data.dim());
}

#[test]
fn test_lake_green_water_suppresses_green() {
    // Heavily green-dominant scene.
    let img = make_image(32, 32, [0.2, 0.6, 0.2]);
    let params = WhiteBalanceParams {
        method: WbMethod::LakeGreenWater,
        percentile: 50.0,
        max_gain: 5.0,
    };
    let out = white_balance::apply(&img, &params).unwrap();
    let means = channel_means(&out);
    let g_over_r = means[1] / means[0];
    assert!(
        (g_over_r - 1.05).abs() < 0.1,
        "post G/R should approach 1.05, got {g_over_r}"
    );
    // Red never loses energy.
    assert!(means[0] >= 0.2);
}

// ---------------------------------------------------------------------------
// parameter record
// ---------------------------------------------------------------------------

#[test]
fn test_set_clamps_out_of_range() {
    let mut params = WhiteBalanceParams::default();
    params
        .set("max_gain", &ParameterValue::Float(99.0))
        .unwrap();
    assert!((params.max_gain - 5.0).abs() < 1e-6);
}

#[test]
fn test_set_unknown_name_fails() {
    let mut params = WhiteBalanceParams::default();
    assert!(params.set("gamma", &ParameterValue::Float(1.0)).is_err());
}

#[test]
fn test_set_wrong_type_fails() {
    let mut params = WhiteBalanceParams::default();
    assert!(params
        .set("max_gain", &ParameterValue::Bool(true))
        .is_err());
}

#[test]
fn test_set_method_by_name() {
    let mut params = WhiteBalanceParams::default();
    params
        .set(
            "method",
            &ParameterValue::Choice("lake_green_water".to_string()),
        )
        .unwrap();
    assert_eq!(params.method, WbMethod::LakeGreenWater);
}

// ---------------------------------------------------------------------------
// auto-tune
// ---------------------------------------------------------------------------

#[test]
fn test_auto_tune_green_dominant_selects_lake_mode() {
    // Scenario: R=0.2, G=0.6, B=0.2 — a lake scene.
    let img = make_image(64, 64, [0.2, 0.6, 0.2]);
    let sig = compute_signature(&img);
    assert_eq!(classify_water(&sig), WaterType::Lake);

    let tuned = white_balance::auto_tune(&sig, &WhiteBalanceParams::default());
    assert_eq!(tuned.method, WbMethod::LakeGreenWater);
}

#[test]
fn test_auto_tune_saturated_scene_reduces_gain() {
    // More than 5% of pixels saturated: max_gain comes down 20%.
    let mut img = make_image(32, 32, [0.4, 0.5, 0.45]);
    for y in 0..8 {
        for x in 0..32 {
            img.data[[y, x, 0]] = 0.99;
        }
    }
    let sig = compute_signature(&img);
    assert!(sig.saturated_fraction > 0.05);

    let base = white_balance::auto_tune(
        &compute_signature(&make_image(32, 32, [0.4, 0.5, 0.45])),
        &WhiteBalanceParams::default(),
    );
    let tuned = white_balance::auto_tune(&sig, &WhiteBalanceParams::default());
    assert!(tuned.max_gain < base.max_gain);
}
