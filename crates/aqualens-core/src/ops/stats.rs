use ndarray::Array2;

use crate::frame::Image;

/// Per-channel arithmetic means.
pub fn channel_means(image: &Image) -> [f32; 3] {
    let n = image.pixel_count() as f64;
    let mut sums = [0.0f64; 3];
    for ((_, _, c), v) in image.data.indexed_iter() {
        sums[c] += *v as f64;
    }
    [
        (sums[0] / n) as f32,
        (sums[1] / n) as f32,
        (sums[2] / n) as f32,
    ]
}

/// Sorted copy of one channel, ascending. Basis for percentile lookups.
pub fn sorted_channel(image: &Image, channel: usize) -> Vec<f32> {
    let mut values: Vec<f32> = image
        .data
        .indexed_iter()
        .filter(|((_, _, c), _)| *c == channel)
        .map(|(_, v)| *v)
        .collect();
    values.sort_by(|a, b| a.total_cmp(b));
    values
}

/// Sorted copy of a plane, ascending.
pub fn sorted_plane(plane: &Array2<f32>) -> Vec<f32> {
    let mut values: Vec<f32> = plane.iter().copied().collect();
    values.sort_by(|a, b| a.total_cmp(b));
    values
}

/// Percentile lookup on pre-sorted values. `p` is in [0, 100].
pub fn percentile_sorted(sorted: &[f32], p: f32) -> f32 {
    if sorted.is_empty() {
        return 0.0;
    }
    let idx = ((sorted.len() as f32 - 1.0) * (p / 100.0).clamp(0.0, 1.0)).round() as usize;
    sorted[idx.min(sorted.len() - 1)]
}

/// Mean of the values lying between the `p` and `100 - p` percentile bounds.
///
/// This is the percentile-based mean used by the white-balance methods:
/// the tails on both sides are excluded before averaging.
pub fn trimmed_mean_sorted(sorted: &[f32], p: f32) -> f32 {
    if sorted.is_empty() {
        return 0.0;
    }
    let p = p.clamp(0.0, 49.0);
    let lo = percentile_sorted(sorted, p);
    let hi = percentile_sorted(sorted, 100.0 - p);
    let mut sum = 0.0f64;
    let mut count = 0usize;
    for &v in sorted {
        if v >= lo && v <= hi {
            sum += v as f64;
            count += 1;
        }
    }
    if count == 0 {
        percentile_sorted(sorted, 50.0)
    } else {
        (sum / count as f64) as f32
    }
}

/// 256-bin histogram of a plane assumed to lie in [0, 1].
pub fn histogram256(plane: &Array2<f32>) -> [u32; 256] {
    let mut hist = [0u32; 256];
    for &v in plane.iter() {
        let bin = (v.clamp(0.0, 1.0) * 255.0) as usize;
        hist[bin.min(255)] += 1;
    }
    hist
}

/// Shannon entropy of a histogram, in bits.
pub fn entropy(hist: &[u32]) -> f64 {
    let total: u64 = hist.iter().map(|&c| c as u64).sum();
    if total == 0 {
        return 0.0;
    }
    let mut e = 0.0f64;
    for &count in hist {
        if count > 0 {
            let p = count as f64 / total as f64;
            e -= p * p.log2();
        }
    }
    e
}

/// Histogram spread of sorted values: the P95 - P5 distance.
pub fn hist_spread(sorted: &[f32]) -> f32 {
    percentile_sorted(sorted, 95.0) - percentile_sorted(sorted, 5.0)
}

/// Fraction of pixels with any channel at or above `level`.
pub fn saturated_fraction(image: &Image, level: f32) -> f32 {
    let (h, w, _) = image.data.dim();
    let mut count = 0usize;
    for y in 0..h {
        for x in 0..w {
            if image.data[[y, x, 0]] >= level
                || image.data[[y, x, 1]] >= level
                || image.data[[y, x, 2]] >= level
            {
                count += 1;
            }
        }
    }
    count as f32 / (h * w) as f32
}

/// Mean of a plane.
pub fn plane_mean(plane: &Array2<f32>) -> f64 {
    let n = plane.len() as f64;
    plane.iter().map(|&v| v as f64).sum::<f64>() / n.max(1.0)
}

/// Population variance of a plane.
pub fn plane_variance(plane: &Array2<f32>) -> f64 {
    let n = plane.len() as f64;
    if n < 1.0 {
        return 0.0;
    }
    let mean = plane_mean(plane);
    plane
        .iter()
        .map(|&v| {
            let d = v as f64 - mean;
            d * d
        })
        .sum::<f64>()
        / n
}
