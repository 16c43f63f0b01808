use serde::{Deserialize, Serialize};

use crate::autotune::signature::{SceneSignature, WIDE_SPREAD};
use crate::consts::EPSILON;
use crate::error::Result;
use crate::frame::Image;
use crate::ops::gradient::sobel_magnitude;
use crate::ops::stats::{percentile_sorted, sorted_channel, sorted_plane, trimmed_mean_sorted};
use crate::pipeline::params::{ParamDescriptor, ParamKind, ParameterValue, StageParams};

/// Minkowski norm order for the shades-of-gray method.
const MINKOWSKI_P: f32 = 6.0;

/// Post-correction G/R ratio targeted by the lake-green-water mode.
const LAKE_TARGET_G_OVER_R: f32 = 1.05;

/// Minimum red gain in lake-green-water mode. Red must never lose energy
/// in green-dominant freshwater scenes.
const LAKE_RED_FLOOR: f32 = 1.02;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WbMethod {
    #[default]
    GrayWorld,
    WhitePatch,
    ShadesOfGray,
    GreyEdge,
    LakeGreenWater,
}

impl WbMethod {
    pub const OPTIONS: [&'static str; 5] = [
        "gray_world",
        "white_patch",
        "shades_of_gray",
        "grey_edge",
        "lake_green_water",
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            WbMethod::GrayWorld => "gray_world",
            WbMethod::WhitePatch => "white_patch",
            WbMethod::ShadesOfGray => "shades_of_gray",
            WbMethod::GreyEdge => "grey_edge",
            WbMethod::LakeGreenWater => "lake_green_water",
        }
    }

    pub fn from_str(s: &str) -> Option<WbMethod> {
        match s {
            "gray_world" => Some(WbMethod::GrayWorld),
            "white_patch" => Some(WbMethod::WhitePatch),
            "shades_of_gray" => Some(WbMethod::ShadesOfGray),
            "grey_edge" => Some(WbMethod::GreyEdge),
            "lake_green_water" => Some(WbMethod::LakeGreenWater),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WhiteBalanceParams {
    pub method: WbMethod,
    /// Tail exclusion for percentile-based means, in [1, 99].
    pub percentile: f32,
    /// Per-channel gains are clamped into [1/max_gain, max_gain].
    pub max_gain: f32,
}

impl Default for WhiteBalanceParams {
    fn default() -> Self {
        Self {
            method: WbMethod::GrayWorld,
            percentile: 15.0,
            max_gain: 2.0,
        }
    }
}

const DESCRIPTORS: [ParamDescriptor; 3] = [
    ParamDescriptor {
        name: "method",
        kind: ParamKind::Choice {
            options: &WbMethod::OPTIONS,
            default: "gray_world",
        },
    },
    ParamDescriptor {
        name: "percentile",
        kind: ParamKind::Float {
            min: 1.0,
            max: 99.0,
            default: 15.0,
        },
    },
    ParamDescriptor {
        name: "max_gain",
        kind: ParamKind::Float {
            min: 1.0,
            max: 5.0,
            default: 2.0,
        },
    },
];

impl StageParams for WhiteBalanceParams {
    fn descriptors() -> &'static [ParamDescriptor] {
        &DESCRIPTORS
    }

    fn get(&self, name: &str) -> Option<ParameterValue> {
        match name {
            "method" => Some(ParameterValue::Choice(self.method.as_str().to_string())),
            "percentile" => Some(ParameterValue::Float(self.percentile as f64)),
            "max_gain" => Some(ParameterValue::Float(self.max_gain as f64)),
            _ => None,
        }
    }

    fn set(&mut self, name: &str, value: &ParameterValue) -> std::result::Result<(), String> {
        match name {
            "method" => {
                let s = value.as_str().ok_or("expected a method name")?;
                self.method =
                    WbMethod::from_str(s).ok_or_else(|| format!("unknown method `{s}`"))?;
            }
            "percentile" => {
                self.percentile = value.as_f64().ok_or("expected a number")? as f32;
            }
            "max_gain" => {
                self.max_gain = value.as_f64().ok_or("expected a number")? as f32;
            }
            _ => return Err(format!("unknown parameter `{name}`")),
        }
        self.clamp();
        Ok(())
    }

    fn clamp(&mut self) {
        self.percentile = self.percentile.clamp(1.0, 99.0);
        self.max_gain = self.max_gain.clamp(1.0, 5.0);
    }
}

/// Apply the selected white-balance method.
pub fn apply(image: &Image, params: &WhiteBalanceParams) -> Result<Image> {
    let gains = match params.method {
        WbMethod::GrayWorld => gray_world_gains(image, params),
        WbMethod::WhitePatch => white_patch_gains(image, params),
        WbMethod::ShadesOfGray => shades_of_gray_gains(image, params),
        WbMethod::GreyEdge => grey_edge_gains(image, params),
        WbMethod::LakeGreenWater => lake_green_water_gains(image, params),
    };

    let mut out = image.clone();
    for ((_, _, c), v) in out.data.indexed_iter_mut() {
        *v = (*v * gains[c]).clamp(0.0, 1.0);
    }
    Ok(out)
}

fn clamp_gains(gains: [f32; 3], max_gain: f32) -> [f32; 3] {
    let lo = 1.0 / max_gain;
    [
        gains[0].clamp(lo, max_gain),
        gains[1].clamp(lo, max_gain),
        gains[2].clamp(lo, max_gain),
    ]
}

fn gains_toward(target: f32, refs: [f32; 3], max_gain: f32) -> [f32; 3] {
    clamp_gains(
        [
            target / refs[0].max(EPSILON),
            target / refs[1].max(EPSILON),
            target / refs[2].max(EPSILON),
        ],
        max_gain,
    )
}

fn gray_world_gains(image: &Image, params: &WhiteBalanceParams) -> [f32; 3] {
    let refs = trimmed_channel_means(image, params.percentile);
    let target = (refs[0] + refs[1] + refs[2]) / 3.0;
    gains_toward(target, refs, params.max_gain)
}

fn trimmed_channel_means(image: &Image, percentile: f32) -> [f32; 3] {
    let mut refs = [0.0f32; 3];
    for (c, r) in refs.iter_mut().enumerate() {
        let sorted = sorted_channel(image, c);
        *r = trimmed_mean_sorted(&sorted, percentile);
    }
    refs
}

fn white_patch_gains(image: &Image, params: &WhiteBalanceParams) -> [f32; 3] {
    let mut p99 = [0.0f32; 3];
    for (c, r) in p99.iter_mut().enumerate() {
        let sorted = sorted_channel(image, c);
        *r = percentile_sorted(&sorted, 99.0);
    }
    let target = p99[0].max(p99[1]).max(p99[2]);
    gains_toward(target, p99, params.max_gain)
}

fn shades_of_gray_gains(image: &Image, params: &WhiteBalanceParams) -> [f32; 3] {
    let n = image.pixel_count() as f64;
    let mut norms = [0.0f32; 3];
    let mut sums = [0.0f64; 3];
    for ((_, _, c), v) in image.data.indexed_iter() {
        sums[c] += (*v as f64).powf(MINKOWSKI_P as f64);
    }
    for c in 0..3 {
        norms[c] = ((sums[c] / n).powf(1.0 / MINKOWSKI_P as f64)) as f32;
    }
    let target = (norms[0] + norms[1] + norms[2]) / 3.0;
    gains_toward(target, norms, params.max_gain)
}

fn grey_edge_gains(image: &Image, params: &WhiteBalanceParams) -> [f32; 3] {
    let mut refs = [0.0f32; 3];
    for (c, r) in refs.iter_mut().enumerate() {
        let mag = sobel_magnitude(&image.plane(c));
        let sorted = sorted_plane(&mag);
        *r = trimmed_mean_sorted(&sorted, params.percentile);
    }
    let target = (refs[0] + refs[1] + refs[2]) / 3.0;
    gains_toward(target, refs, params.max_gain)
}

/// Gray-world gains plus a green-suppression factor chosen so the
/// post-correction G/R mean ratio lands near [`LAKE_TARGET_G_OVER_R`],
/// with the red gain floored at [`LAKE_RED_FLOOR`].
fn lake_green_water_gains(image: &Image, params: &WhiteBalanceParams) -> [f32; 3] {
    let refs = trimmed_channel_means(image, params.percentile);
    let mut gains = gray_world_gains(image, params);

    let post_r = gains[0] * refs[0];
    let post_g = gains[1] * refs[1];
    if post_g > EPSILON {
        let suppression = (LAKE_TARGET_G_OVER_R * post_r / post_g).clamp(0.6, 1.0);
        gains[1] *= suppression;
    }
    gains[0] = gains[0].max(LAKE_RED_FLOOR);
    gains
}

/// Choose method and gains from the scene signature.
pub fn auto_tune(sig: &SceneSignature, current: &WhiteBalanceParams) -> WhiteBalanceParams {
    let mut params = current.clone();

    let green_dominant = sig.means[1] > 1.15 * sig.means[0].max(sig.means[2]);
    let balanced = sig.channel_mean_distance < 0.15;
    let bright_peak = (0..3).any(|c| sig.percentile(c, 99.0) - sig.percentile(c, 95.0) > 0.1);

    if green_dominant {
        params.method = WbMethod::LakeGreenWater;
    } else if sig.hist_spread > WIDE_SPREAD && balanced {
        params.method = WbMethod::GrayWorld;
        params.percentile = 20.0;
        params.max_gain = 1.8;
    } else if bright_peak {
        params.method = WbMethod::WhitePatch;
        params.max_gain = 2.2;
    } else {
        params.method = WbMethod::ShadesOfGray;
        params.max_gain = 2.0;
    }

    // Saturated scenes get less aggressive gains.
    if sig.saturated_fraction > 0.05 {
        params.max_gain *= 0.8;
    }

    params.clamp();
    params
}
