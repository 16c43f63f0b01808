mod common;

use ndarray::Array3;

use aqualens_core::frame::Image;
use aqualens_core::ops::stats::channel_means;
use aqualens_core::pipeline::params::StageParams;
use aqualens_core::pipeline::types::CancelToken;
use aqualens_core::stages::beer_lambert::{self, BeerLambertParams};
use aqualens_core::stages::clahe::{self, ClaheParams};
use aqualens_core::stages::color_rebalance::{self, ColorRebalanceParams};
use aqualens_core::stages::fusion::{self, FusionParams};
use aqualens_core::stages::udcp::{self, UdcpParams};

use common::{in_range, make_image, make_underwater_image, mean_abs_diff, psnr};

// ---------------------------------------------------------------------------
// UDCP
// ---------------------------------------------------------------------------

/// Ground-truth scene for the haze test: gray content with a regular grid
/// of black dots (so every dark-channel window sees a true zero) and a
/// bright patch in one corner (so the airlight estimate finds white).
fn haze_ground_truth(h: usize, w: usize) -> Image {
    Image {
        data: Array3::from_shape_fn((h, w, 3), |(y, x, _)| {
            if y < 32 && x < 32 {
                0.95
            } else if y % 8 == 0 && x % 8 == 0 {
                0.0
            } else {
                0.3 + 0.4 * (x as f32 / w as f32)
            }
        }),
    }
}

#[test]
fn test_udcp_recovers_synthetic_haze() {
    let truth = haze_ground_truth(120, 160);
    // Uniform haze: 0.7 * J + 0.3 * airlight(1,1,1).
    let hazed = Image {
        data: truth.data.mapv(|v| 0.7 * v + 0.3),
    };

    let params = UdcpParams {
        omega: 0.95,
        t0: 0.1,
        guided_radius: 10,
        ..UdcpParams::default()
    };
    let out = udcp::apply(&hazed, &params).unwrap();

    assert!(in_range(&out));
    let db = psnr(&truth, &out);
    assert!(db >= 22.0, "PSNR vs ground truth should be >= 22 dB, got {db:.1}");
}

#[test]
fn test_udcp_shape_and_range() {
    let img = make_underwater_image(48, 64);
    let out = udcp::apply(&img, &UdcpParams::default()).unwrap();
    assert_eq!(out.data.dim(), img.data.dim());
    assert!(in_range(&out));
}

#[test]
fn test_udcp_post_contrast_gain_stretches() {
    let img = make_image(32, 32, [0.45, 0.55, 0.5]);
    let flat = udcp::apply(&img, &UdcpParams::default()).unwrap();
    let stretched = udcp::apply(
        &img,
        &UdcpParams {
            post_contrast_gain: 1.5,
            ..UdcpParams::default()
        },
    )
    .unwrap();
    // Stretch around 0.5 pushes values away from the midpoint.
    let spread = |i: &Image| {
        i.data
            .iter()
            .map(|v| (v - 0.5).abs() as f64)
            .sum::<f64>()
            / i.data.len() as f64
    };
    assert!(spread(&stretched) >= spread(&flat) - 1e-9);
}

#[test]
fn test_udcp_window_clamped_odd() {
    let mut params = UdcpParams {
        window: 12,
        ..UdcpParams::default()
    };
    params.clamp();
    assert_eq!(params.window, 13);
}

// ---------------------------------------------------------------------------
// Beer-Lambert
// ---------------------------------------------------------------------------

#[test]
fn test_beer_lambert_boosts_red_most() {
    let img = make_image(16, 16, [0.3, 0.3, 0.3]);
    let out = beer_lambert::apply(&img, &BeerLambertParams::default()).unwrap();
    let means = channel_means(&out);
    assert!(means[0] > means[1], "red gets the largest compensation");
    assert!(means[1] > means[2], "green more than blue");
    assert!(in_range(&out));
}

#[test]
fn test_beer_lambert_zero_depth_is_near_identity() {
    let img = make_underwater_image(32, 32);
    let mut params = BeerLambertParams::default();
    params.depth_factor = 0.01;
    let out = beer_lambert::apply(&img, &params).unwrap();
    assert!(mean_abs_diff(&img, &out) < 0.02);
}

#[test]
fn test_beer_lambert_clamps_to_one() {
    let img = make_image(8, 8, [0.9, 0.9, 0.9]);
    let params = BeerLambertParams {
        depth_factor: 1.2,
        enhancement: 3.0,
        ..BeerLambertParams::default()
    };
    let out = beer_lambert::apply(&img, &params).unwrap();
    assert!(in_range(&out));
    assert!((channel_means(&out)[0] - 1.0).abs() < 1e-6);
}

// ---------------------------------------------------------------------------
// Color rebalance
// ---------------------------------------------------------------------------

#[test]
fn test_rebalance_identity_matrix_no_guard_hit() {
    // Neutral grays never fall into the magenta band; identity matrix with
    // luminance preservation must round-trip closely.
    let img = make_image(16, 16, [0.4, 0.4, 0.4]);
    let out = color_rebalance::apply(&img, &ColorRebalanceParams::default()).unwrap();
    assert!(mean_abs_diff(&img, &out) < 5e-3);
}

#[test]
fn test_rebalance_matrix_swaps_channels() {
    let img = make_image(8, 8, [0.8, 0.2, 0.2]);
    let params = ColorRebalanceParams {
        // Swap red and green.
        matrix: [[0.0, 1.0, 0.0], [1.0, 0.0, 0.0], [0.0, 0.0, 1.0]],
        preserve_luminance: false,
        ..ColorRebalanceParams::default()
    };
    let out = color_rebalance::apply(&img, &params).unwrap();
    let means = channel_means(&out);
    assert!((means[0] - 0.2).abs() < 1e-3);
    assert!((means[1] - 0.8).abs() < 1e-3);
}

#[test]
fn test_rebalance_magenta_guard_caps_saturation() {
    // Hue 300 (pure magenta), saturation 1.0.
    let img = make_image(8, 8, [1.0, 0.0, 1.0]);
    let params = ColorRebalanceParams {
        saturation_limit: 0.5,
        preserve_luminance: false,
        ..ColorRebalanceParams::default()
    };
    let out = color_rebalance::apply(&img, &params).unwrap();
    // s = 0.5 at v = 1.0: min channel rises to 0.5.
    assert!((out.data[[0, 0, 1]] - 0.5).abs() < 1e-3, "got {}", out.data[[0, 0, 1]]);
}

#[test]
fn test_rebalance_guard_ignores_other_hues() {
    // Pure saturated green is far from the magenta band.
    let img = make_image(8, 8, [0.0, 1.0, 0.0]);
    let params = ColorRebalanceParams {
        saturation_limit: 0.5,
        preserve_luminance: false,
        ..ColorRebalanceParams::default()
    };
    let out = color_rebalance::apply(&img, &params).unwrap();
    assert!(mean_abs_diff(&img, &out) < 1e-5);
}

#[test]
fn test_rebalance_matrix_param_names() {
    let mut params = ColorRebalanceParams::default();
    params
        .set("rg", &aqualens_core::pipeline::params::ParameterValue::Float(0.25))
        .unwrap();
    assert!((params.matrix[0][1] - 0.25).abs() < 1e-6);
}

// ---------------------------------------------------------------------------
// CLAHE
// ---------------------------------------------------------------------------

#[test]
fn test_clahe_shape_and_range() {
    let img = make_underwater_image(64, 64);
    let out = clahe::apply(&img, &ClaheParams::default()).unwrap();
    assert_eq!(out.data.dim(), img.data.dim());
    assert!(in_range(&out));
}

#[test]
fn test_clahe_raises_contrast_on_low_contrast_input() {
    // Narrow luminance band input; equalization must widen it.
    let img = Image {
        data: Array3::from_shape_fn((64, 64, 3), |(y, x, _)| {
            0.45 + 0.1 * ((y * 64 + x) as f32 / 4096.0)
        }),
    };
    let out = clahe::apply(
        &img,
        &ClaheParams {
            clip_limit: 4.0,
            tile_grid: 4,
        },
    )
    .unwrap();

    let spread = |i: &Image| {
        let lum = i.luminance();
        let mut v: Vec<f32> = lum.iter().copied().collect();
        v.sort_by(|a, b| a.total_cmp(b));
        v[v.len() - 1 - v.len() / 20] - v[v.len() / 20]
    };
    assert!(
        spread(&out) > spread(&img) * 1.5,
        "contrast should increase: {} -> {}",
        spread(&img),
        spread(&out)
    );
}

#[test]
fn test_clahe_uniform_image_stable() {
    let img = make_image(32, 32, [0.5, 0.5, 0.5]);
    let out = clahe::apply(&img, &ClaheParams::default()).unwrap();
    assert!(in_range(&out));
    // A constant plane has a single occupied bin; output stays constant.
    let first = out.data[[0, 0, 0]];
    for v in out.data.iter().step_by(3) {
        assert!((*v - first).abs() < 1e-4);
    }
}

// ---------------------------------------------------------------------------
// Fusion
// ---------------------------------------------------------------------------

#[test]
fn test_fusion_shape_and_range() {
    let img = make_underwater_image(64, 96);
    let out = fusion::apply(&img, &FusionParams::default(), &CancelToken::new()).unwrap();
    assert_eq!(out.data.dim(), img.data.dim());
    assert!(in_range(&out));
}

#[test]
fn test_fusion_tracks_input() {
    // Fusion of variants of X must stay close to X, and fusing a different
    // input must give a different output (it never reaches past its input).
    let a = make_underwater_image(64, 64);
    let b = Image {
        data: a.data.mapv(|v| (v * 0.5).clamp(0.0, 1.0)),
    };
    let params = FusionParams::default();
    let token = CancelToken::new();
    let fa = fusion::apply(&a, &params, &token).unwrap();
    let fb = fusion::apply(&b, &params, &token).unwrap();
    assert!(mean_abs_diff(&fa, &fb) > 0.01);
    assert!(mean_abs_diff(&a, &fa) < 0.2);
}

#[test]
fn test_fusion_cancellation() {
    let img = make_underwater_image(64, 64);
    let token = CancelToken::new();
    token.cancel();
    let err = fusion::apply(&img, &FusionParams::default(), &token).unwrap_err();
    assert!(matches!(err, aqualens_core::error::AqualensError::Cancelled));
}
