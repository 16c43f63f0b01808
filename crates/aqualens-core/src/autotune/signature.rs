use serde::{Deserialize, Serialize};

use crate::consts::{EPSILON, PERCENTILE_GRID, SATURATION_LEVEL};
use crate::frame::Image;
use crate::ops::gradient::{laplacian_variance, sobel_mean};
use crate::ops::stats::{
    channel_means, hist_spread, percentile_sorted, saturated_fraction, sorted_channel,
    sorted_plane,
};
use crate::ops::window::min_filter;

/// Window used for the signature's dark-channel statistics.
const DARK_WINDOW: usize = 15;

/// Histogram spread above which a scene counts as wide / high contrast.
pub const WIDE_SPREAD: f32 = 0.5;

/// Stage-agnostic statistics of a source image, computed once per image
/// and reused by every auto-tune routine. Never derived from a processed
/// image.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SceneSignature {
    pub width: usize,
    pub height: usize,
    /// Per-channel arithmetic means (R, G, B).
    pub means: [f32; 3],
    /// Per-channel percentiles sampled at [`PERCENTILE_GRID`].
    pub percentiles: [[f32; 9]; 3],
    pub r_b_ratio: f32,
    pub r_g_ratio: f32,
    pub b_r_ratio: f32,
    /// Euclidean distance between the channel means.
    pub channel_mean_distance: f32,
    /// Laplacian variance of luminance — noise/detail proxy.
    pub laplacian_variance: f64,
    /// Mean Sobel magnitude of luminance — edge strength.
    pub sobel_mean: f64,
    pub dark_channel_mean: f32,
    pub dark_channel_p95: f32,
    /// P95 - P5 of luminance.
    pub hist_spread: f32,
    /// Fraction of pixels saturated in any channel.
    pub saturated_fraction: f32,
}

impl SceneSignature {
    /// Percentile lookup for one channel at a grid point of
    /// [`PERCENTILE_GRID`]. Panics on off-grid percentiles.
    pub fn percentile(&self, channel: usize, p: f32) -> f32 {
        let idx = PERCENTILE_GRID
            .iter()
            .position(|&g| (g - p).abs() < 1e-6)
            .expect("percentile must be on the signature grid");
        self.percentiles[channel][idx]
    }

    /// Share of a channel in the total mean intensity.
    pub fn channel_ratio(&self, channel: usize) -> f32 {
        let total = self.means[0] + self.means[1] + self.means[2];
        self.means[channel] / total.max(EPSILON)
    }
}

/// Coarse scene classification driving method selection in white balance.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WaterType {
    Lake,
    OceanDeep,
    Tropical,
    ClearHighContrast,
    Standard,
}

impl std::fmt::Display for WaterType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            WaterType::Lake => "lake",
            WaterType::OceanDeep => "ocean_deep",
            WaterType::Tropical => "tropical",
            WaterType::ClearHighContrast => "clear_high_contrast",
            WaterType::Standard => "standard",
        };
        f.write_str(s)
    }
}

/// Compute the scene signature. Deterministic and side-effect-free.
pub fn compute_signature(image: &Image) -> SceneSignature {
    let means = channel_means(image);

    let mut percentiles = [[0.0f32; 9]; 3];
    for c in 0..3 {
        let sorted = sorted_channel(image, c);
        for (i, &p) in PERCENTILE_GRID.iter().enumerate() {
            percentiles[c][i] = percentile_sorted(&sorted, p);
        }
    }

    let lum = image.luminance();
    let lum_sorted = sorted_plane(&lum);

    let (h, w, _) = image.data.dim();
    let min_rgb = ndarray::Array2::from_shape_fn((h, w), |(y, x)| {
        image.data[[y, x, 0]]
            .min(image.data[[y, x, 1]])
            .min(image.data[[y, x, 2]])
    });
    let dark = min_filter(&min_rgb, DARK_WINDOW);
    let dark_sorted = sorted_plane(&dark);

    let d_r = means[0] - means[1];
    let d_g = means[1] - means[2];
    let d_b = means[2] - means[0];

    SceneSignature {
        width: w,
        height: h,
        means,
        percentiles,
        r_b_ratio: means[0] / means[2].max(EPSILON),
        r_g_ratio: means[0] / means[1].max(EPSILON),
        b_r_ratio: means[2] / means[0].max(EPSILON),
        channel_mean_distance: (d_r * d_r + d_g * d_g + d_b * d_b).sqrt(),
        laplacian_variance: laplacian_variance(&lum),
        sobel_mean: sobel_mean(&lum),
        dark_channel_mean: (dark_sorted.iter().map(|&v| v as f64).sum::<f64>()
            / dark_sorted.len().max(1) as f64) as f32,
        dark_channel_p95: percentile_sorted(&dark_sorted, 95.0),
        hist_spread: hist_spread(&lum_sorted),
        saturated_fraction: saturated_fraction(image, SATURATION_LEVEL),
    }
}

/// Classify the water type from a signature. Rules are checked in order;
/// the first match wins.
pub fn classify_water(sig: &SceneSignature) -> WaterType {
    if sig.channel_ratio(1) > 0.4 {
        WaterType::Lake
    } else if sig.channel_ratio(2) < 0.25 {
        WaterType::OceanDeep
    } else if sig.channel_ratio(0) < 0.2 {
        WaterType::Tropical
    } else if sig.sobel_mean > 0.1 && sig.hist_spread > WIDE_SPREAD {
        WaterType::ClearHighContrast
    } else {
        WaterType::Standard
    }
}
