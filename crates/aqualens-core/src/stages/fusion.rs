use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::autotune::signature::SceneSignature;
use crate::error::Result;
use crate::frame::Image;
use crate::ops::blur::gaussian_blur_plane;
use crate::ops::gradient::laplacian;
use crate::ops::pyramid::{collapse, gaussian_pyramid, laplacian_pyramid};
use crate::pipeline::params::{ParamDescriptor, ParamKind, ParameterValue, StageParams};
use crate::pipeline::types::CancelToken;

/// Sigmoid steepness of the gentle-contrast variant.
const CONTRAST_STEEPNESS: f32 = 8.0;

/// Spread of the well-exposedness Gaussian around 0.5.
const EXPOSEDNESS_SIGMA: f32 = 0.2;

/// Floor keeping the per-pixel weight normalization finite.
const WEIGHT_FLOOR: f32 = 1e-12;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FusionParams {
    pub levels: u32,
    pub base_sigma: f32,
    pub scale_factor: f32,
    /// Exponent on the contrast weight map.
    pub contrast_weight: f32,
    /// Exponent on the saturation weight map.
    pub saturation_weight: f32,
    /// Exponent on the exposedness weight map.
    pub exposedness_weight: f32,
    pub sharpen_amount: f32,
}

impl Default for FusionParams {
    fn default() -> Self {
        Self {
            levels: 3,
            base_sigma: 1.0,
            scale_factor: 2.0,
            contrast_weight: 1.0,
            saturation_weight: 1.0,
            exposedness_weight: 1.0,
            sharpen_amount: 0.3,
        }
    }
}

const DESCRIPTORS: [ParamDescriptor; 7] = [
    ParamDescriptor {
        name: "levels",
        kind: ParamKind::Int { min: 2, max: 6, default: 3 },
    },
    ParamDescriptor {
        name: "base_sigma",
        kind: ParamKind::Float { min: 0.3, max: 2.0, default: 1.0 },
    },
    ParamDescriptor {
        name: "scale_factor",
        kind: ParamKind::Float { min: 1.2, max: 3.0, default: 2.0 },
    },
    ParamDescriptor {
        name: "contrast_weight",
        kind: ParamKind::Float { min: 0.0, max: 4.0, default: 1.0 },
    },
    ParamDescriptor {
        name: "saturation_weight",
        kind: ParamKind::Float { min: 0.0, max: 4.0, default: 1.0 },
    },
    ParamDescriptor {
        name: "exposedness_weight",
        kind: ParamKind::Float { min: 0.0, max: 4.0, default: 1.0 },
    },
    ParamDescriptor {
        name: "sharpen_amount",
        kind: ParamKind::Float { min: 0.0, max: 1.0, default: 0.3 },
    },
];

impl StageParams for FusionParams {
    fn descriptors() -> &'static [ParamDescriptor] {
        &DESCRIPTORS
    }

    fn get(&self, name: &str) -> Option<ParameterValue> {
        match name {
            "levels" => Some(ParameterValue::Int(self.levels as i64)),
            "base_sigma" => Some(ParameterValue::Float(self.base_sigma as f64)),
            "scale_factor" => Some(ParameterValue::Float(self.scale_factor as f64)),
            "contrast_weight" => Some(ParameterValue::Float(self.contrast_weight as f64)),
            "saturation_weight" => Some(ParameterValue::Float(self.saturation_weight as f64)),
            "exposedness_weight" => Some(ParameterValue::Float(self.exposedness_weight as f64)),
            "sharpen_amount" => Some(ParameterValue::Float(self.sharpen_amount as f64)),
            _ => None,
        }
    }

    fn set(&mut self, name: &str, value: &ParameterValue) -> std::result::Result<(), String> {
        match name {
            "levels" => self.levels = value.as_i64().ok_or("expected an integer")? as u32,
            "base_sigma" => self.base_sigma = value.as_f64().ok_or("expected a number")? as f32,
            "scale_factor" => {
                self.scale_factor = value.as_f64().ok_or("expected a number")? as f32
            }
            "contrast_weight" => {
                self.contrast_weight = value.as_f64().ok_or("expected a number")? as f32
            }
            "saturation_weight" => {
                self.saturation_weight = value.as_f64().ok_or("expected a number")? as f32
            }
            "exposedness_weight" => {
                self.exposedness_weight = value.as_f64().ok_or("expected a number")? as f32
            }
            "sharpen_amount" => {
                self.sharpen_amount = value.as_f64().ok_or("expected a number")? as f32
            }
            _ => return Err(format!("unknown parameter `{name}`")),
        }
        self.clamp();
        Ok(())
    }

    fn clamp(&mut self) {
        self.levels = self.levels.clamp(2, 6);
        self.base_sigma = self.base_sigma.clamp(0.3, 2.0);
        self.scale_factor = self.scale_factor.clamp(1.2, 3.0);
        self.contrast_weight = self.contrast_weight.clamp(0.0, 4.0);
        self.saturation_weight = self.saturation_weight.clamp(0.0, 4.0);
        self.exposedness_weight = self.exposedness_weight.clamp(0.0, 4.0);
        self.sharpen_amount = self.sharpen_amount.clamp(0.0, 1.0);
    }
}

/// Soft sigmoid contrast boost around 0.5, normalized to keep the
/// endpoints fixed at 0 and 1.
fn gentle_contrast(image: &Image) -> Image {
    let s = |v: f32| 1.0 / (1.0 + (-CONTRAST_STEEPNESS * (v - 0.5)).exp());
    let s0 = s(0.0);
    let s1 = s(1.0);
    let mut out = image.clone();
    out.data
        .mapv_inplace(|v| ((s(v) - s0) / (s1 - s0)).clamp(0.0, 1.0));
    out
}

/// Unsharp-mask sharpening of every channel.
fn gentle_sharpen(image: &Image, sigma: f32, amount: f32) -> Image {
    let planes: Vec<Array2<f32>> = (0..3)
        .map(|c| {
            let plane = image.plane(c);
            let blurred = gaussian_blur_plane(&plane, sigma);
            ndarray::Zip::from(&plane)
                .and(&blurred)
                .map_collect(|&orig, &blur| (orig + (orig - blur) * amount).clamp(0.0, 1.0))
        })
        .collect();
    Image::from_planes([&planes[0], &planes[1], &planes[2]])
}

/// Per-pixel quality weight for one variant.
fn weight_map(variant: &Image, params: &FusionParams) -> Array2<f32> {
    let (h, w, _) = variant.data.dim();
    let contrast = laplacian(&variant.luminance()).mapv(f32::abs);

    Array2::from_shape_fn((h, w), |(y, x)| {
        let r = variant.data[[y, x, 0]];
        let g = variant.data[[y, x, 1]];
        let b = variant.data[[y, x, 2]];

        let mean = (r + g + b) / 3.0;
        let saturation =
            (((r - mean).powi(2) + (g - mean).powi(2) + (b - mean).powi(2)) / 3.0).sqrt();

        let denom = 2.0 * EXPOSEDNESS_SIGMA * EXPOSEDNESS_SIGMA;
        let exposedness = (-(r - 0.5).powi(2) / denom).exp()
            * (-(g - 0.5).powi(2) / denom).exp()
            * (-(b - 0.5).powi(2) / denom).exp();

        contrast[[y, x]].powf(params.contrast_weight)
            * saturation.powf(params.saturation_weight)
            * exposedness.powf(params.exposedness_weight)
            + WEIGHT_FLOOR
    })
}

/// Multi-scale exposure fusion of three variants of the processed image.
///
/// The variants are derived from the pipeline output it receives, never
/// from the original source, so every upstream correction is respected.
pub fn apply(processed: &Image, params: &FusionParams, cancel: &CancelToken) -> Result<Image> {
    let levels = params.levels as usize;
    let sigma = params.base_sigma;
    let scale = params.scale_factor;

    let variants = [
        processed.clone(),
        gentle_contrast(processed),
        gentle_sharpen(processed, sigma, params.sharpen_amount),
    ];
    cancel.check()?;

    // Normalized per-pixel weights.
    let mut weights: Vec<Array2<f32>> =
        variants.iter().map(|v| weight_map(v, params)).collect();
    let total = weights
        .iter()
        .skip(1)
        .fold(weights[0].clone(), |acc, w| acc + w);
    for w in &mut weights {
        *w = &*w / &total;
    }
    cancel.check()?;

    // Gaussian pyramids of the weights, Laplacian pyramids of the variants.
    let weight_pyramids: Vec<Vec<Array2<f32>>> = weights
        .iter()
        .map(|w| gaussian_pyramid(w, levels, sigma, scale))
        .collect();

    let mut blended: Vec<Vec<Array2<f32>>> = Vec::with_capacity(3);
    for channel in 0..3 {
        let variant_pyramids: Vec<Vec<Array2<f32>>> = variants
            .iter()
            .map(|v| laplacian_pyramid(&v.plane(channel), levels, sigma, scale))
            .collect();

        let mut channel_levels = Vec::with_capacity(levels);
        for level in 0..levels {
            cancel.check()?;
            let mut acc = &weight_pyramids[0][level] * &variant_pyramids[0][level];
            for i in 1..variants.len() {
                acc = acc + &weight_pyramids[i][level] * &variant_pyramids[i][level];
            }
            channel_levels.push(acc);
        }
        blended.push(channel_levels);
    }

    let planes: Vec<Array2<f32>> = blended.iter().map(|lp| collapse(lp)).collect();
    let mut out = Image::from_planes([&planes[0], &planes[1], &planes[2]]);
    out.clamp01();
    Ok(out)
}

/// Fusion keeps the default preset; scene statistics do not change it.
pub fn auto_tune(_sig: &SceneSignature, _current: &FusionParams) -> FusionParams {
    FusionParams::default()
}
