use serde::{Deserialize, Serialize};

use crate::autotune::signature::SceneSignature;
use crate::consts::EPSILON;
use crate::error::Result;
use crate::frame::Image;
use crate::pipeline::params::{ParamDescriptor, ParamKind, ParameterValue, StageParams};

/// Reference absorption coefficients for clear water. Red attenuates
/// fastest, so it receives the most compensation.
const K_BASE: [f32; 3] = [0.6, 0.25, 0.1];

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BeerLambertParams {
    /// Distance proxy scaling the whole compensation.
    pub depth_factor: f32,
    pub k_red: f32,
    pub k_green: f32,
    pub k_blue: f32,
    /// Global strength multiplier.
    pub enhancement: f32,
}

impl Default for BeerLambertParams {
    fn default() -> Self {
        Self {
            depth_factor: 0.4,
            k_red: K_BASE[0],
            k_green: K_BASE[1],
            k_blue: K_BASE[2],
            enhancement: 1.5,
        }
    }
}

const DESCRIPTORS: [ParamDescriptor; 5] = [
    ParamDescriptor {
        name: "depth_factor",
        kind: ParamKind::Float { min: 0.01, max: 1.2, default: 0.4 },
    },
    ParamDescriptor {
        name: "k_red",
        kind: ParamKind::Float { min: 0.05, max: 2.0, default: 0.6 },
    },
    ParamDescriptor {
        name: "k_green",
        kind: ParamKind::Float { min: 0.05, max: 1.5, default: 0.25 },
    },
    ParamDescriptor {
        name: "k_blue",
        kind: ParamKind::Float { min: 0.05, max: 1.0, default: 0.1 },
    },
    ParamDescriptor {
        name: "enhancement",
        kind: ParamKind::Float { min: 1.0, max: 3.0, default: 1.5 },
    },
];

impl StageParams for BeerLambertParams {
    fn descriptors() -> &'static [ParamDescriptor] {
        &DESCRIPTORS
    }

    fn get(&self, name: &str) -> Option<ParameterValue> {
        match name {
            "depth_factor" => Some(ParameterValue::Float(self.depth_factor as f64)),
            "k_red" => Some(ParameterValue::Float(self.k_red as f64)),
            "k_green" => Some(ParameterValue::Float(self.k_green as f64)),
            "k_blue" => Some(ParameterValue::Float(self.k_blue as f64)),
            "enhancement" => Some(ParameterValue::Float(self.enhancement as f64)),
            _ => None,
        }
    }

    fn set(&mut self, name: &str, value: &ParameterValue) -> std::result::Result<(), String> {
        let v = value.as_f64().ok_or("expected a number")? as f32;
        match name {
            "depth_factor" => self.depth_factor = v,
            "k_red" => self.k_red = v,
            "k_green" => self.k_green = v,
            "k_blue" => self.k_blue = v,
            "enhancement" => self.enhancement = v,
            _ => return Err(format!("unknown parameter `{name}`")),
        }
        self.clamp();
        Ok(())
    }

    fn clamp(&mut self) {
        self.depth_factor = self.depth_factor.clamp(0.01, 1.2);
        self.k_red = self.k_red.clamp(0.05, 2.0);
        self.k_green = self.k_green.clamp(0.05, 1.5);
        self.k_blue = self.k_blue.clamp(0.05, 1.0);
        self.enhancement = self.enhancement.clamp(1.0, 3.0);
    }
}

/// Exponential attenuation compensation per channel.
pub fn apply(image: &Image, params: &BeerLambertParams) -> Result<Image> {
    let scale = params.depth_factor * params.enhancement;
    let factors = [
        (params.k_red * scale).exp(),
        (params.k_green * scale).exp(),
        (params.k_blue * scale).exp(),
    ];

    let mut out = image.clone();
    for ((_, _, c), v) in out.data.indexed_iter_mut() {
        *v = (*v * factors[c]).clamp(0.0, 1.0);
    }
    Ok(out)
}

/// Estimate shooting distance from the blue/red spectral ratio and derive
/// depth factor and absorption coefficients.
pub fn auto_tune(sig: &SceneSignature, current: &BeerLambertParams) -> BeerLambertParams {
    let mut params = current.clone();

    let d = (sig.means[2] / sig.means[0].max(EPSILON)).ln().clamp(0.0, 1.5);
    let dnorm = d / 1.5;

    params.depth_factor = (0.3 + 0.9 * dnorm).clamp(0.3, 1.2);

    let mut ks = [
        K_BASE[0] * (0.7 + 0.6 * dnorm),
        K_BASE[1] * (0.7 + 0.6 * dnorm),
        K_BASE[2] * (0.7 + 0.6 * dnorm),
    ];

    // With little red headroom, back off to avoid clipping highlights.
    let headroom = 1.0 - sig.percentile(0, 99.0);
    if headroom < 0.1 {
        for k in &mut ks {
            *k *= 0.7;
        }
    }

    params.k_red = ks[0];
    params.k_green = ks[1];
    params.k_blue = ks[2];

    params.clamp();
    params
}
