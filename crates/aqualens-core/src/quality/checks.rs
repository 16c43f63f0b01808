//! The seven quality checks. Each compares original vs. processed at
//! preview resolution and returns a score in [0, 10] with its raw
//! measurements and any triggered recommendations.

use ndarray::Array2;

use crate::consts::EPSILON;
use crate::error::Result;
use crate::frame::Image;
use crate::ops::blur::gaussian_blur_plane;
use crate::ops::color::{rgb_to_hsv, rgb_to_lab};
use crate::ops::gradient::{laplacian, sobel_gradients};
use crate::ops::stats::{entropy, histogram256, percentile_sorted, sorted_plane};

use super::components::largest_component_area;
use super::{recommendation, CheckResult};

/// Gaussian pre-smoothing sigma for Canny edge detection.
const CANNY_SIGMA: f32 = 1.0;

/// Canny hysteresis thresholds on the thinned gradient magnitude.
const EDGE_HIGH: f32 = 0.2;
const EDGE_LOW: f32 = 0.08;

/// Mean 5x5 luminance variance at edges above which halos are assumed.
const HALO_VARIANCE_THRESHOLD: f64 = 0.015;

fn saturation_plane(image: &Image) -> Array2<f32> {
    let (h, w, _) = image.data.dim();
    Array2::from_shape_fn((h, w), |(y, x)| {
        rgb_to_hsv(
            image.data[[y, x, 0]],
            image.data[[y, x, 1]],
            image.data[[y, x, 2]],
        )
        .1
    })
}

fn lab_l_plane(image: &Image) -> Array2<f32> {
    let (h, w, _) = image.data.dim();
    Array2::from_shape_fn((h, w), |(y, x)| {
        rgb_to_lab(
            image.data[[y, x, 0]],
            image.data[[y, x, 1]],
            image.data[[y, x, 2]],
        )
        .0 / 100.0
    })
}

/// 1. Neon reds, oversaturated magentas, red dominance.
pub fn unrealistic_colors(_original: &Image, processed: &Image) -> Result<CheckResult> {
    let (h, w, _) = processed.data.dim();
    let n = (h * w) as f64;

    let mut neon = 0usize;
    let mut magenta = 0usize;
    let mut sums = [0.0f64; 3];
    for y in 0..h {
        for x in 0..w {
            let r = processed.data[[y, x, 0]];
            let g = processed.data[[y, x, 1]];
            let b = processed.data[[y, x, 2]];
            if r > 0.95 && g < 0.3 && b < 0.3 {
                neon += 1;
            }
            let (hue, sat, _) = rgb_to_hsv(r, g, b);
            if (290.0..=340.0).contains(&hue) && sat > 0.8 {
                magenta += 1;
            }
            sums[0] += r as f64;
            sums[1] += g as f64;
            sums[2] += b as f64;
        }
    }

    let neon_fraction = neon as f64 / n;
    let magenta_fraction = magenta as f64 / n;
    let red_dominance = sums[0] / ((sums[1] + sums[2]) / 2.0).max(EPSILON as f64);

    let mut result = CheckResult::new("unrealistic_colors");
    result.details.insert("neon_red_fraction", neon_fraction);
    result.details.insert("magenta_fraction", magenta_fraction);
    result.details.insert("red_dominance", red_dominance);

    result.score = 10.0
        - neon_fraction * 300.0
        - magenta_fraction * 150.0
        - (red_dominance - 1.5).max(0.0) * 2.0;

    if neon_fraction > 0.005 {
        result.recommendations.push(recommendation::REDUCE_RED_GAIN);
    }
    if magenta_fraction > 0.01 {
        result.recommendations.push(recommendation::REDUCE_MAGENTA);
    }
    Ok(result.clamp_score())
}

/// 2. Red-channel balance against the original.
pub fn red_balance(original: &Image, processed: &Image) -> Result<CheckResult> {
    let (h, w, _) = processed.data.dim();
    let n = (h * w) as f64;

    let mut pre = [0.0f64; 3];
    let mut post = [0.0f64; 3];
    let mut red_dominant = 0usize;
    for y in 0..h {
        for x in 0..w {
            for c in 0..3 {
                pre[c] += original.data[[y, x, c]] as f64;
                post[c] += processed.data[[y, x, c]] as f64;
            }
            let r = processed.data[[y, x, 0]];
            if r > processed.data[[y, x, 1]] && r > processed.data[[y, x, 2]] {
                red_dominant += 1;
            }
        }
    }

    let red_gain = (post[0] / n) / (pre[0] / n).max(EPSILON as f64);
    let rb_post = post[0] / post[2].max(EPSILON as f64);
    let red_dominant_fraction = red_dominant as f64 / n;

    let mut result = CheckResult::new("red_balance");
    result.details.insert("red_gain", red_gain);
    result.details.insert("red_blue_ratio", rb_post);
    result
        .details
        .insert("red_dominant_fraction", red_dominant_fraction);

    // Over-compensation: red mean blown past 1.8x original while R/B runs hot.
    if red_gain > 1.8 && rb_post > 1.3 {
        result.score = 10.0 - 4.0 - (red_gain - 1.8) * 2.0;
        result
            .recommendations
            .push(recommendation::RED_OVERCOMPENSATED);
    } else if red_dominant_fraction > 0.7 {
        result.score = 8.0;
    }
    Ok(result.clamp_score())
}

/// 3. Saturation clipping: exact hits, near hits, largest saturated blob.
pub fn saturation_clipping(_original: &Image, processed: &Image) -> Result<CheckResult> {
    let sat = saturation_plane(processed);
    let n = sat.len() as f64;

    let fully = sat.iter().filter(|&&s| s >= 1.0).count() as f64 / n;
    let near = sat.iter().filter(|&&s| s > 0.95).count() as f64 / n;
    let mask = sat.mapv(|s| s > 0.99);
    let largest = largest_component_area(&mask) as f64 / n;

    let mut result = CheckResult::new("saturation_clipping");
    result.details.insert("fully_saturated_fraction", fully);
    result.details.insert("near_saturated_fraction", near);
    result.details.insert("largest_region_fraction", largest);

    if fully > 0.02 {
        result.score -= 3.0 + (fully - 0.02) * 100.0;
    }
    if largest > 0.01 {
        result.score -= 3.0;
    }
    if result.score < 10.0 {
        result
            .recommendations
            .push(recommendation::REDUCE_SATURATION);
    }
    Ok(result.clamp_score())
}

/// Variance of a plane restricted to masked pixels.
fn masked_variance(plane: &Array2<f32>, mask: &Array2<bool>) -> f64 {
    let mut sum = 0.0f64;
    let mut sum_sq = 0.0f64;
    let mut count = 0usize;
    for (v, m) in plane.iter().zip(mask.iter()) {
        if *m {
            sum += *v as f64;
            sum_sq += (*v as f64) * (*v as f64);
            count += 1;
        }
    }
    if count == 0 {
        return 0.0;
    }
    let mean = sum / count as f64;
    (sum_sq / count as f64 - mean * mean).max(0.0)
}

/// 4. Chroma noise amplification in the darkest 20% of the original.
pub fn color_noise(original: &Image, processed: &Image) -> Result<CheckResult> {
    let lum = original.luminance();
    let sorted = sorted_plane(&lum);
    let threshold = percentile_sorted(&sorted, 20.0);
    let mask = lum.mapv(|v| v <= threshold);

    let mut ratio_sum = 0.0f64;
    for c in 0..3 {
        let pre = masked_variance(&laplacian(&original.plane(c)), &mask);
        let post = masked_variance(&laplacian(&processed.plane(c)), &mask);
        ratio_sum += post / pre.max(1e-12);
    }
    let noise_ratio = ratio_sum / 3.0;

    let mut result = CheckResult::new("color_noise");
    result.details.insert("shadow_noise_ratio", noise_ratio);
    if noise_ratio > 1.5 {
        result.score = 10.0 - (noise_ratio - 1.5) * 4.0;
    }
    if noise_ratio > 2.0 {
        result
            .recommendations
            .push(recommendation::REDUCE_NOISE_AMPLIFICATION);
    }
    Ok(result.clamp_score())
}

/// Canny edge detection: Gaussian pre-smoothing, Sobel gradients,
/// orientation-binned non-maximum suppression, then hysteresis linking.
fn canny_edges(lum: &Array2<f32>) -> Array2<bool> {
    let smoothed = gaussian_blur_plane(lum, CANNY_SIGMA);
    let (gx, gy) = sobel_gradients(&smoothed);
    let mag = ndarray::Zip::from(&gx)
        .and(&gy)
        .map_collect(|&x, &y| (x * x + y * y).sqrt());
    let thinned = non_max_suppress(&mag, &gx, &gy);
    hysteresis(&thinned)
}

/// Keep only ridge pixels: a pixel survives if its magnitude is at least
/// that of both neighbors along the gradient direction, binned to the
/// nearest 45 degrees.
fn non_max_suppress(mag: &Array2<f32>, gx: &Array2<f32>, gy: &Array2<f32>) -> Array2<f32> {
    let (h, w) = mag.dim();
    let mut thinned = Array2::<f32>::zeros((h, w));
    if h < 3 || w < 3 {
        return thinned;
    }

    for y in 1..h - 1 {
        for x in 1..w - 1 {
            let m = mag[[y, x]];
            if m <= 0.0 {
                continue;
            }
            // Gradient angle folded into [0, 180).
            let mut angle = gy[[y, x]].atan2(gx[[y, x]]).to_degrees();
            if angle < 0.0 {
                angle += 180.0;
            }
            let (a, b) = if !(22.5..157.5).contains(&angle) {
                (mag[[y, x - 1]], mag[[y, x + 1]])
            } else if angle < 67.5 {
                (mag[[y - 1, x - 1]], mag[[y + 1, x + 1]])
            } else if angle < 112.5 {
                (mag[[y - 1, x]], mag[[y + 1, x]])
            } else {
                (mag[[y - 1, x + 1]], mag[[y + 1, x - 1]])
            };
            if m >= a && m >= b {
                thinned[[y, x]] = m;
            }
        }
    }
    thinned
}

/// Hysteresis linking: strong seeds grow through weak pixels.
fn hysteresis(mag: &Array2<f32>) -> Array2<bool> {
    let (h, w) = mag.dim();
    let mut edges = Array2::from_elem((h, w), false);
    let mut queue = Vec::new();
    for y in 0..h {
        for x in 0..w {
            if mag[[y, x]] > EDGE_HIGH {
                edges[[y, x]] = true;
                queue.push((y, x));
            }
        }
    }
    // 8-connected growth so thinned diagonal ridges stay linked.
    while let Some((y, x)) = queue.pop() {
        for (dy, dx) in [
            (-1i64, -1i64),
            (-1, 0),
            (-1, 1),
            (0, -1),
            (0, 1),
            (1, -1),
            (1, 0),
            (1, 1),
        ] {
            let ny = y as i64 + dy;
            let nx = x as i64 + dx;
            if ny < 0 || ny >= h as i64 || nx < 0 || nx >= w as i64 {
                continue;
            }
            let (ny, nx) = (ny as usize, nx as usize);
            if !edges[[ny, nx]] && mag[[ny, nx]] > EDGE_LOW {
                edges[[ny, nx]] = true;
                queue.push((ny, nx));
            }
        }
    }
    edges
}

/// 5. Halo artifacts: luminance overshoot in 5x5 neighborhoods of Canny
/// edges of the processed image.
pub fn halo_artifacts(_original: &Image, processed: &Image) -> Result<CheckResult> {
    let lum = processed.luminance();
    let (h, w) = lum.dim();
    let edges = canny_edges(&lum);

    let mut var_sum = 0.0f64;
    let mut edge_count = 0usize;
    for y in 0..h {
        for x in 0..w {
            if !edges[[y, x]] {
                continue;
            }
            let y0 = y.saturating_sub(2);
            let y1 = (y + 2).min(h - 1);
            let x0 = x.saturating_sub(2);
            let x1 = (x + 2).min(w - 1);

            let mut sum = 0.0f64;
            let mut sum_sq = 0.0f64;
            let mut count = 0usize;
            for ny in y0..=y1 {
                for nx in x0..=x1 {
                    let v = lum[[ny, nx]] as f64;
                    sum += v;
                    sum_sq += v * v;
                    count += 1;
                }
            }
            let mean = sum / count as f64;
            var_sum += (sum_sq / count as f64 - mean * mean).max(0.0);
            edge_count += 1;
        }
    }

    let mean_variance = if edge_count > 0 {
        var_sum / edge_count as f64
    } else {
        0.0
    };

    let mut result = CheckResult::new("halo_artifacts");
    result.details.insert("edge_count", edge_count as f64);
    result.details.insert("mean_edge_variance", mean_variance);

    if mean_variance > HALO_VARIANCE_THRESHOLD {
        result.score = 10.0 - (mean_variance - HALO_VARIANCE_THRESHOLD) * 400.0;
        result
            .recommendations
            .push(recommendation::REDUCE_SHARPENING);
    }
    Ok(result.clamp_score())
}

/// 6. Shadow / midtone / highlight distribution of the processed image.
pub fn midtone_balance(_original: &Image, processed: &Image) -> Result<CheckResult> {
    let l = lab_l_plane(processed);
    let n = l.len() as f64;

    let shadows = l.iter().filter(|&&v| v < 0.25).count() as f64 / n;
    let highlights = l.iter().filter(|&&v| v > 0.75).count() as f64 / n;
    let midtones = 1.0 - shadows - highlights;

    let mut result = CheckResult::new("midtone_balance");
    result.details.insert("shadow_fraction", shadows);
    result.details.insert("midtone_fraction", midtones);
    result.details.insert("highlight_fraction", highlights);

    if shadows < 0.05 {
        result.score -= 3.0;
        result.recommendations.push(recommendation::REDUCE_CONTRAST);
    } else if shadows > 0.6 {
        result.score -= 4.0;
        result.recommendations.push(recommendation::LIFT_SHADOWS);
    }
    Ok(result.clamp_score())
}

/// 7. Rewards actual improvements: contrast, entropy, and saturation gains.
pub fn improvements(original: &Image, processed: &Image) -> Result<CheckResult> {
    let l_pre = lab_l_plane(original);
    let l_post = lab_l_plane(processed);
    let sorted_pre = sorted_plane(&l_pre);
    let sorted_post = sorted_plane(&l_post);
    let contrast_delta = (percentile_sorted(&sorted_post, 95.0)
        - percentile_sorted(&sorted_post, 5.0)
        - (percentile_sorted(&sorted_pre, 95.0) - percentile_sorted(&sorted_pre, 5.0)))
        as f64;

    let mut entropy_pre = 0.0f64;
    let mut entropy_post = 0.0f64;
    for c in 0..3 {
        entropy_pre += entropy(&histogram256(&original.plane(c)));
        entropy_post += entropy(&histogram256(&processed.plane(c)));
    }
    let entropy_delta = (entropy_post - entropy_pre) / 3.0;

    let sat_pre = saturation_plane(original);
    let sat_post = saturation_plane(processed);
    let n = sat_pre.len() as f64;
    let saturation_delta = (sat_post.iter().map(|&v| v as f64).sum::<f64>()
        - sat_pre.iter().map(|&v| v as f64).sum::<f64>())
        / n;

    let mut result = CheckResult::new("improvements");
    result.details.insert("contrast_delta", contrast_delta);
    result.details.insert("entropy_delta", entropy_delta);
    result.details.insert("saturation_delta", saturation_delta);

    result.score = 5.0 + 10.0 * contrast_delta + 1.5 * entropy_delta + 8.0 * saturation_delta;
    Ok(result.clamp_score())
}
