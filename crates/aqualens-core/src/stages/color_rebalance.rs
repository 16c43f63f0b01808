use serde::{Deserialize, Serialize};

use crate::autotune::signature::SceneSignature;
use crate::error::Result;
use crate::frame::Image;
use crate::ops::color::{hsv_to_rgb, lab_to_rgb, rgb_to_hsv, rgb_to_lab};
use crate::pipeline::params::{ParamDescriptor, ParamKind, ParameterValue, StageParams};

/// Hue band treated as magenta by the guard, in degrees.
/// Source revisions disagree on the exact bounds; 290-340 is used here.
const MAGENTA_HUE_LO: f32 = 290.0;
const MAGENTA_HUE_HI: f32 = 340.0;

/// Names of the nine matrix entries, row-major (output channel, input channel).
const MATRIX_NAMES: [&str; 9] = ["rr", "rg", "rb", "gr", "gg", "gb", "br", "bg", "bb"];

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColorRebalanceParams {
    /// Row-major 3x3 channel mixing matrix; output = M * input.
    pub matrix: [[f32; 3]; 3],
    /// Saturation cap inside the magenta hue band.
    pub saturation_limit: f32,
    /// Restore the input's LAB L* after mixing.
    pub preserve_luminance: bool,
}

impl Default for ColorRebalanceParams {
    fn default() -> Self {
        Self {
            matrix: [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]],
            saturation_limit: 0.8,
            preserve_luminance: true,
        }
    }
}

const DESCRIPTORS: [ParamDescriptor; 11] = [
    ParamDescriptor { name: "rr", kind: ParamKind::Float { min: -2.0, max: 2.0, default: 1.0 } },
    ParamDescriptor { name: "rg", kind: ParamKind::Float { min: -2.0, max: 2.0, default: 0.0 } },
    ParamDescriptor { name: "rb", kind: ParamKind::Float { min: -2.0, max: 2.0, default: 0.0 } },
    ParamDescriptor { name: "gr", kind: ParamKind::Float { min: -2.0, max: 2.0, default: 0.0 } },
    ParamDescriptor { name: "gg", kind: ParamKind::Float { min: -2.0, max: 2.0, default: 1.0 } },
    ParamDescriptor { name: "gb", kind: ParamKind::Float { min: -2.0, max: 2.0, default: 0.0 } },
    ParamDescriptor { name: "br", kind: ParamKind::Float { min: -2.0, max: 2.0, default: 0.0 } },
    ParamDescriptor { name: "bg", kind: ParamKind::Float { min: -2.0, max: 2.0, default: 0.0 } },
    ParamDescriptor { name: "bb", kind: ParamKind::Float { min: -2.0, max: 2.0, default: 1.0 } },
    ParamDescriptor {
        name: "saturation_limit",
        kind: ParamKind::Float { min: 0.3, max: 1.0, default: 0.8 },
    },
    ParamDescriptor {
        name: "preserve_luminance",
        kind: ParamKind::Bool { default: true },
    },
];

fn matrix_index(name: &str) -> Option<(usize, usize)> {
    MATRIX_NAMES
        .iter()
        .position(|&n| n == name)
        .map(|i| (i / 3, i % 3))
}

impl StageParams for ColorRebalanceParams {
    fn descriptors() -> &'static [ParamDescriptor] {
        &DESCRIPTORS
    }

    fn get(&self, name: &str) -> Option<ParameterValue> {
        if let Some((r, c)) = matrix_index(name) {
            return Some(ParameterValue::Float(self.matrix[r][c] as f64));
        }
        match name {
            "saturation_limit" => Some(ParameterValue::Float(self.saturation_limit as f64)),
            "preserve_luminance" => Some(ParameterValue::Bool(self.preserve_luminance)),
            _ => None,
        }
    }

    fn set(&mut self, name: &str, value: &ParameterValue) -> std::result::Result<(), String> {
        if let Some((r, c)) = matrix_index(name) {
            self.matrix[r][c] = value.as_f64().ok_or("expected a number")? as f32;
            self.clamp();
            return Ok(());
        }
        match name {
            "saturation_limit" => {
                self.saturation_limit = value.as_f64().ok_or("expected a number")? as f32;
            }
            "preserve_luminance" => {
                self.preserve_luminance = value.as_bool().ok_or("expected a boolean")?;
            }
            _ => return Err(format!("unknown parameter `{name}`")),
        }
        self.clamp();
        Ok(())
    }

    fn clamp(&mut self) {
        for row in &mut self.matrix {
            for v in row {
                *v = v.clamp(-2.0, 2.0);
            }
        }
        self.saturation_limit = self.saturation_limit.clamp(0.3, 1.0);
    }
}

/// Channel mix, magenta guard, optional luminance restoration.
pub fn apply(image: &Image, params: &ColorRebalanceParams) -> Result<Image> {
    let (h, w, _) = image.data.dim();
    let m = &params.matrix;
    let mut out = Image::zeros(h, w);

    for y in 0..h {
        for x in 0..w {
            let r = image.data[[y, x, 0]];
            let g = image.data[[y, x, 1]];
            let b = image.data[[y, x, 2]];

            let mut rr = (m[0][0] * r + m[0][1] * g + m[0][2] * b).clamp(0.0, 1.0);
            let mut gg = (m[1][0] * r + m[1][1] * g + m[1][2] * b).clamp(0.0, 1.0);
            let mut bb = (m[2][0] * r + m[2][1] * g + m[2][2] * b).clamp(0.0, 1.0);

            let (hue, sat, val) = rgb_to_hsv(rr, gg, bb);
            if (MAGENTA_HUE_LO..=MAGENTA_HUE_HI).contains(&hue) && sat > params.saturation_limit {
                let (r2, g2, b2) = hsv_to_rgb(hue, params.saturation_limit, val);
                rr = r2;
                gg = g2;
                bb = b2;
            }

            if params.preserve_luminance {
                let (l_in, _, _) = rgb_to_lab(r, g, b);
                let (_, a_out, b_out) = rgb_to_lab(rr, gg, bb);
                let (r3, g3, b3) = lab_to_rgb(l_in, a_out, b_out);
                rr = r3;
                gg = g3;
                bb = b3;
            }

            out.data[[y, x, 0]] = rr.clamp(0.0, 1.0);
            out.data[[y, x, 1]] = gg.clamp(0.0, 1.0);
            out.data[[y, x, 2]] = bb.clamp(0.0, 1.0);
        }
    }
    Ok(out)
}

/// The matrix stays at identity; only the magenta guard is tuned, from the
/// red bias the attenuation compensation is expected to introduce.
pub fn auto_tune(sig: &SceneSignature, current: &ColorRebalanceParams) -> ColorRebalanceParams {
    let mut params = current.clone();
    let red_bias = (sig.r_b_ratio - 1.0).max(0.0);
    params.saturation_limit = (0.9 - 0.3 * red_bias).clamp(0.3, 1.0);
    params.clamp();
    params
}
