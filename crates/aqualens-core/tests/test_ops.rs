mod common;

use approx::assert_abs_diff_eq;
use ndarray::Array2;

use aqualens_core::ops::blur::{box_filter, gaussian_blur_plane};
use aqualens_core::ops::gradient::{
    laplacian_variance, sobel_gradients, sobel_magnitude, sobel_mean,
};
use aqualens_core::ops::guided::guided_filter;
use aqualens_core::ops::resize::{area_resize, bilinear_resize};
use aqualens_core::ops::stats::{
    channel_means, entropy, histogram256, percentile_sorted, sorted_plane, trimmed_mean_sorted,
};
use aqualens_core::ops::window::min_filter;

use common::make_image;

fn ramp_plane(h: usize, w: usize) -> Array2<f32> {
    Array2::from_shape_fn((h, w), |(y, x)| (y * w + x) as f32 / (h * w) as f32)
}

// ---------------------------------------------------------------------------
// stats
// ---------------------------------------------------------------------------

#[test]
fn test_channel_means_constant() {
    let img = make_image(8, 8, [0.2, 0.5, 0.9]);
    let means = channel_means(&img);
    assert_abs_diff_eq!(means[0], 0.2, epsilon = 1e-6);
    assert_abs_diff_eq!(means[1], 0.5, epsilon = 1e-6);
    assert_abs_diff_eq!(means[2], 0.9, epsilon = 1e-6);
}

#[test]
fn test_percentile_sorted_endpoints() {
    let sorted: Vec<f32> = (0..101).map(|v| v as f32 / 100.0).collect();
    assert_abs_diff_eq!(percentile_sorted(&sorted, 0.0), 0.0, epsilon = 1e-6);
    assert_abs_diff_eq!(percentile_sorted(&sorted, 50.0), 0.5, epsilon = 1e-6);
    assert_abs_diff_eq!(percentile_sorted(&sorted, 100.0), 1.0, epsilon = 1e-6);
}

#[test]
fn test_trimmed_mean_excludes_tails() {
    // One huge outlier among uniform values; trimming should remove it.
    let mut values = vec![0.5f32; 99];
    values.push(100.0);
    values.sort_by(|a, b| a.total_cmp(b));
    let trimmed = trimmed_mean_sorted(&values, 5.0);
    assert!((trimmed - 0.5).abs() < 1e-4, "got {trimmed}");
}

#[test]
fn test_entropy_flat_is_zero() {
    let plane = Array2::from_elem((16, 16), 0.5f32);
    let e = entropy(&histogram256(&plane));
    assert!(e.abs() < 1e-9);
}

#[test]
fn test_entropy_ramp_is_positive() {
    let plane = ramp_plane(16, 16);
    let e = entropy(&histogram256(&plane));
    assert!(e > 4.0, "ramp entropy should be high, got {e}");
}

// ---------------------------------------------------------------------------
// blur / box filter
// ---------------------------------------------------------------------------

#[test]
fn test_gaussian_blur_uniform_unchanged() {
    let plane = Array2::from_elem((64, 64), 0.6f32);
    let blurred = gaussian_blur_plane(&plane, 2.0);
    for v in blurred.iter() {
        assert!((*v - 0.6).abs() < 1e-5);
    }
}

#[test]
fn test_gaussian_blur_large_uses_parallel_path() {
    // 512x512 crosses the parallel threshold; result must stay uniform.
    let plane = Array2::from_elem((512, 512), 0.4f32);
    let blurred = gaussian_blur_plane(&plane, 2.0);
    for v in blurred.iter() {
        assert!((*v - 0.4).abs() < 1e-4);
    }
}

#[test]
fn test_box_filter_uniform_unchanged() {
    let plane = Array2::from_elem((32, 32), 0.3f32);
    let out = box_filter(&plane, 5);
    for v in out.iter() {
        assert!((*v - 0.3).abs() < 1e-5, "got {v}");
    }
}

#[test]
fn test_box_filter_is_local_mean() {
    // Single bright pixel: interior output = 1 / window_area.
    let mut plane = Array2::from_elem((21, 21), 0.0f32);
    plane[[10, 10]] = 1.0;
    let out = box_filter(&plane, 2);
    let expected = 1.0 / 25.0;
    assert!((out[[10, 10]] - expected).abs() < 1e-6);
    assert!((out[[8, 10]] - expected).abs() < 1e-6);
    assert!(out[[0, 0]].abs() < 1e-6);
}

// ---------------------------------------------------------------------------
// min filter
// ---------------------------------------------------------------------------

#[test]
fn test_min_filter_spreads_minimum() {
    let mut plane = Array2::from_elem((16, 16), 0.8f32);
    plane[[8, 8]] = 0.1;
    let out = min_filter(&plane, 5);
    // Everything within the 5x5 window of the dark pixel takes its value.
    assert!((out[[8, 8]] - 0.1).abs() < 1e-6);
    assert!((out[[6, 6]] - 0.1).abs() < 1e-6);
    assert!((out[[10, 10]] - 0.1).abs() < 1e-6);
    // Far away stays untouched.
    assert!((out[[0, 0]] - 0.8).abs() < 1e-6);
}

// ---------------------------------------------------------------------------
// gradient
// ---------------------------------------------------------------------------

#[test]
fn test_sobel_zero_on_uniform() {
    let plane = Array2::from_elem((32, 32), 0.5f32);
    assert!(sobel_mean(&plane) < 1e-9);
}

#[test]
fn test_sobel_detects_vertical_edge() {
    let mut plane = Array2::from_elem((32, 32), 0.0f32);
    for y in 0..32 {
        for x in 16..32 {
            plane[[y, x]] = 1.0;
        }
    }
    let mag = sobel_magnitude(&plane);
    assert!(mag[[16, 16]] > 1.0, "edge response expected");
    assert!(mag[[16, 4]] < 1e-6, "flat region should be zero");
}

#[test]
fn test_sobel_gradients_split_by_direction() {
    // Vertical edge: all response lands in gx, none in gy.
    let mut plane = Array2::from_elem((16, 16), 0.0f32);
    for y in 0..16 {
        for x in 8..16 {
            plane[[y, x]] = 1.0;
        }
    }
    let (gx, gy) = sobel_gradients(&plane);
    assert!(gx[[8, 8]] > 1.0, "gx should carry the edge, got {}", gx[[8, 8]]);
    assert!(gy[[8, 8]].abs() < 1e-6, "gy should be zero, got {}", gy[[8, 8]]);
}

#[test]
fn test_laplacian_variance_orders_sharpness() {
    let sharp = {
        let mut p = Array2::from_elem((32, 32), 0.0f32);
        for v in p.iter_mut().step_by(2) {
            *v = 1.0;
        }
        p
    };
    let blurred = gaussian_blur_plane(&sharp, 2.0);
    assert!(laplacian_variance(&sharp) > laplacian_variance(&blurred));
}

// ---------------------------------------------------------------------------
// resize
// ---------------------------------------------------------------------------

#[test]
fn test_area_resize_preserves_mean() {
    let plane = ramp_plane(40, 40);
    let small = area_resize(&plane, 10, 10);
    let mean_full: f32 = plane.iter().sum::<f32>() / plane.len() as f32;
    let mean_small: f32 = small.iter().sum::<f32>() / small.len() as f32;
    assert!((mean_full - mean_small).abs() < 1e-3);
}

#[test]
fn test_area_resize_identity_dims() {
    let plane = ramp_plane(12, 9);
    let same = area_resize(&plane, 12, 9);
    assert_eq!(plane, same);
}

#[test]
fn test_bilinear_resize_endpoints() {
    let plane = ramp_plane(8, 8);
    let up = bilinear_resize(&plane, 16, 16);
    assert!((up[[0, 0]] - plane[[0, 0]]).abs() < 1e-6);
    assert!((up[[15, 15]] - plane[[7, 7]]).abs() < 1e-6);
}

// ---------------------------------------------------------------------------
// guided filter
// ---------------------------------------------------------------------------

#[test]
fn test_guided_filter_smooths_noise_on_flat_guide() {
    // Flat guide: the filter degenerates to heavy smoothing of the input.
    let guide = Array2::from_elem((32, 32), 0.5f32);
    let mut input = Array2::from_elem((32, 32), 0.5f32);
    input[[16, 16]] = 1.0;
    let out = guided_filter(&guide, &input, 8, 1e-3);
    assert!(out[[16, 16]] < 0.6, "spike should be smoothed, got {}", out[[16, 16]]);
}

#[test]
fn test_guided_filter_preserves_edge() {
    // Step in both guide and input survives filtering far better than a
    // plain box mean would allow.
    let mut guide = Array2::from_elem((32, 32), 0.1f32);
    let mut input = Array2::from_elem((32, 32), 0.1f32);
    for y in 0..32 {
        for x in 16..32 {
            guide[[y, x]] = 0.9;
            input[[y, x]] = 0.9;
        }
    }
    let out = guided_filter(&guide, &input, 6, 1e-4);
    assert!(out[[16, 4]] < 0.25, "left side stays low, got {}", out[[16, 4]]);
    assert!(out[[16, 28]] > 0.75, "right side stays high, got {}", out[[16, 28]]);
}
