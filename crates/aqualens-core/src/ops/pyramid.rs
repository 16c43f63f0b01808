use ndarray::Array2;

use super::blur::gaussian_blur_plane;
use super::resize::{area_resize, bilinear_resize};

/// Dimensions of pyramid level `k` given a base size and scale ratio.
fn level_dims(h: usize, w: usize, k: usize, scale_factor: f32) -> (usize, usize) {
    let factor = (scale_factor as f64).powi(k as i32);
    (
        ((h as f64 / factor).round() as usize).max(1),
        ((w as f64 / factor).round() as usize).max(1),
    )
}

/// Build a Gaussian pyramid with `levels` levels (index 0 is the original).
///
/// Each level is blurred with `sigma` before being resampled by
/// `scale_factor` via area averaging.
pub fn gaussian_pyramid(
    base: &Array2<f32>,
    levels: usize,
    sigma: f32,
    scale_factor: f32,
) -> Vec<Array2<f32>> {
    let (h, w) = base.dim();
    let mut pyramid = Vec::with_capacity(levels);
    pyramid.push(base.clone());

    for k in 1..levels {
        let blurred = gaussian_blur_plane(&pyramid[k - 1], sigma);
        let (nh, nw) = level_dims(h, w, k, scale_factor);
        pyramid.push(area_resize(&blurred, nh, nw));
    }
    pyramid
}

/// Build a Laplacian pyramid with `levels` levels.
///
/// Levels 0..levels-1 hold band-pass differences; the last level holds the
/// low-pass residual. [`collapse`] inverts the decomposition.
pub fn laplacian_pyramid(
    base: &Array2<f32>,
    levels: usize,
    sigma: f32,
    scale_factor: f32,
) -> Vec<Array2<f32>> {
    let gp = gaussian_pyramid(base, levels, sigma, scale_factor);
    let mut lp = Vec::with_capacity(levels);
    for k in 0..levels {
        if k + 1 < levels {
            let (h, w) = gp[k].dim();
            let up = bilinear_resize(&gp[k + 1], h, w);
            lp.push(&gp[k] - &up);
        } else {
            lp.push(gp[k].clone());
        }
    }
    lp
}

/// Reconstruct the full-resolution plane from a Laplacian pyramid.
pub fn collapse(pyramid: &[Array2<f32>]) -> Array2<f32> {
    assert!(!pyramid.is_empty());
    let mut current = pyramid[pyramid.len() - 1].clone();
    for level in pyramid.iter().rev().skip(1) {
        let (h, w) = level.dim();
        current = &bilinear_resize(&current, h, w) + level;
    }
    current
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collapse_inverts_single_level() {
        let base = Array2::from_shape_fn((16, 16), |(y, x)| (y * 16 + x) as f32 / 256.0);
        let lp = laplacian_pyramid(&base, 1, 1.0, 2.0);
        let rebuilt = collapse(&lp);
        for (a, b) in base.iter().zip(rebuilt.iter()) {
            assert!((a - b).abs() < 1e-6);
        }
    }

    #[test]
    fn pyramid_levels_shrink() {
        let base = Array2::zeros((64, 48));
        let gp = gaussian_pyramid(&base, 4, 1.0, 2.0);
        assert_eq!(gp.len(), 4);
        assert_eq!(gp[0].dim(), (64, 48));
        assert_eq!(gp[1].dim(), (32, 24));
        assert_eq!(gp[2].dim(), (16, 12));
        assert_eq!(gp[3].dim(), (8, 6));
    }
}
