use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::autotune::signature::SceneSignature;
use crate::error::Result;
use crate::frame::Image;
use crate::ops::guided::guided_filter;
use crate::ops::window::min_filter;
use crate::pipeline::params::{ParamDescriptor, ParamKind, ParameterValue, StageParams};

/// Fraction of dark-channel pixels averaged into the atmospheric light.
const AIRLIGHT_FRACTION: f64 = 0.001;

/// Floor on the atmospheric light, keeps the transmission ratio finite.
const AIRLIGHT_FLOOR: f32 = 0.05;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UdcpParams {
    /// Haze removal strength.
    pub omega: f32,
    /// Transmission floor.
    pub t0: f32,
    /// Dark-channel window side, odd.
    pub window: u32,
    pub guided_radius: u32,
    pub guided_eps: f32,
    /// Linear stretch around 0.5 applied after recovery when > 1.
    pub post_contrast_gain: f32,
}

impl Default for UdcpParams {
    fn default() -> Self {
        Self {
            omega: 0.95,
            t0: 0.1,
            window: 15,
            guided_radius: 40,
            guided_eps: 1e-3,
            post_contrast_gain: 1.0,
        }
    }
}

const DESCRIPTORS: [ParamDescriptor; 6] = [
    ParamDescriptor {
        name: "omega",
        kind: ParamKind::Float { min: 0.5, max: 0.99, default: 0.95 },
    },
    ParamDescriptor {
        name: "t0",
        kind: ParamKind::Float { min: 0.05, max: 0.3, default: 0.1 },
    },
    ParamDescriptor {
        name: "window",
        kind: ParamKind::Int { min: 5, max: 31, default: 15 },
    },
    ParamDescriptor {
        name: "guided_radius",
        kind: ParamKind::Int { min: 10, max: 200, default: 40 },
    },
    ParamDescriptor {
        name: "guided_eps",
        kind: ParamKind::Float { min: 1e-4, max: 1e-2, default: 1e-3 },
    },
    ParamDescriptor {
        name: "post_contrast_gain",
        kind: ParamKind::Float { min: 1.0, max: 2.0, default: 1.0 },
    },
];

impl StageParams for UdcpParams {
    fn descriptors() -> &'static [ParamDescriptor] {
        &DESCRIPTORS
    }

    fn get(&self, name: &str) -> Option<ParameterValue> {
        match name {
            "omega" => Some(ParameterValue::Float(self.omega as f64)),
            "t0" => Some(ParameterValue::Float(self.t0 as f64)),
            "window" => Some(ParameterValue::Int(self.window as i64)),
            "guided_radius" => Some(ParameterValue::Int(self.guided_radius as i64)),
            "guided_eps" => Some(ParameterValue::Float(self.guided_eps as f64)),
            "post_contrast_gain" => Some(ParameterValue::Float(self.post_contrast_gain as f64)),
            _ => None,
        }
    }

    fn set(&mut self, name: &str, value: &ParameterValue) -> std::result::Result<(), String> {
        match name {
            "omega" => self.omega = value.as_f64().ok_or("expected a number")? as f32,
            "t0" => self.t0 = value.as_f64().ok_or("expected a number")? as f32,
            "window" => self.window = value.as_i64().ok_or("expected an integer")? as u32,
            "guided_radius" => {
                self.guided_radius = value.as_i64().ok_or("expected an integer")? as u32
            }
            "guided_eps" => self.guided_eps = value.as_f64().ok_or("expected a number")? as f32,
            "post_contrast_gain" => {
                self.post_contrast_gain = value.as_f64().ok_or("expected a number")? as f32
            }
            _ => return Err(format!("unknown parameter `{name}`")),
        }
        self.clamp();
        Ok(())
    }

    fn clamp(&mut self) {
        self.omega = self.omega.clamp(0.5, 0.99);
        self.t0 = self.t0.clamp(0.05, 0.3);
        self.window = self.window.clamp(5, 31);
        if self.window % 2 == 0 {
            self.window = (self.window + 1).min(31);
        }
        self.guided_radius = self.guided_radius.clamp(10, 200);
        self.guided_eps = self.guided_eps.clamp(1e-4, 1e-2);
        self.post_contrast_gain = self.post_contrast_gain.clamp(1.0, 2.0);
    }
}

/// Per-pixel minimum over the three channels.
fn min_over_channels(image: &Image) -> Array2<f32> {
    let (h, w, _) = image.data.dim();
    Array2::from_shape_fn((h, w), |(y, x)| {
        image.data[[y, x, 0]]
            .min(image.data[[y, x, 1]])
            .min(image.data[[y, x, 2]])
    })
}

/// Estimate the atmospheric light from the brightest dark-channel pixels.
fn atmospheric_light(image: &Image, dark: &Array2<f32>) -> [f32; 3] {
    let (h, w) = dark.dim();
    let take = (((h * w) as f64 * AIRLIGHT_FRACTION).ceil() as usize).max(1);

    let mut ranked: Vec<(f32, usize, usize)> = Vec::with_capacity(h * w);
    for y in 0..h {
        for x in 0..w {
            ranked.push((dark[[y, x]], y, x));
        }
    }
    ranked.sort_by(|a, b| b.0.total_cmp(&a.0));

    let mut sums = [0.0f64; 3];
    for &(_, y, x) in ranked.iter().take(take) {
        for c in 0..3 {
            sums[c] += image.data[[y, x, c]] as f64;
        }
    }
    let mut a = [0.0f32; 3];
    for c in 0..3 {
        a[c] = ((sums[c] / take as f64) as f32).clamp(AIRLIGHT_FLOOR, 1.0);
    }
    a
}

/// Dark-channel-prior dehazing adapted to underwater scenes.
pub fn apply(image: &Image, params: &UdcpParams) -> Result<Image> {
    let window = params.window as usize;

    let dark = min_filter(&min_over_channels(image), window);
    let a = atmospheric_light(image, &dark);

    // Transmission estimate from the normalized dark channel.
    let (h, w, _) = image.data.dim();
    let normalized_min = Array2::from_shape_fn((h, w), |(y, x)| {
        (image.data[[y, x, 0]] / a[0])
            .min(image.data[[y, x, 1]] / a[1])
            .min(image.data[[y, x, 2]] / a[2])
    });
    let t_coarse = min_filter(&normalized_min, window)
        .mapv(|v| (1.0 - params.omega * v).clamp(0.0, 1.0));

    // Refine against luminance so the map hugs edges without halos.
    let refined = guided_filter(
        &image.luminance(),
        &t_coarse,
        params.guided_radius as usize,
        params.guided_eps,
    );

    let mut out = Image::zeros(h, w);
    for y in 0..h {
        for x in 0..w {
            let t = refined[[y, x]].clamp(params.t0, 1.0);
            for c in 0..3 {
                let j = (image.data[[y, x, c]] - a[c]) / t + a[c];
                out.data[[y, x, c]] = j.clamp(0.0, 1.0);
            }
        }
    }

    if params.post_contrast_gain > 1.0 {
        let gain = params.post_contrast_gain;
        out.data
            .mapv_inplace(|v| ((v - 0.5) * gain + 0.5).clamp(0.0, 1.0));
    }
    Ok(out)
}

/// Tune haze strength, smoothing, and window from the scene statistics.
pub fn auto_tune(sig: &SceneSignature, current: &UdcpParams) -> UdcpParams {
    let mut params = current.clone();

    // Hazier scenes (bright dark channel) get a gentler omega.
    params.omega = (0.95 - 0.6 * sig.dark_channel_mean).clamp(0.7, 0.95);

    // Noisier scenes get a larger guided-filter epsilon.
    params.guided_eps =
        ((1e-3) * (1.0 + 400.0 * sig.laplacian_variance as f32)).clamp(1e-4, 5e-3);

    // Textured scenes get a smaller dark-channel window.
    params.window = if sig.sobel_mean > 0.08 {
        7
    } else if sig.sobel_mean > 0.04 {
        11
    } else {
        15
    };

    params.clamp();
    params
}
