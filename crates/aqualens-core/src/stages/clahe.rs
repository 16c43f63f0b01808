use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::autotune::signature::SceneSignature;
use crate::error::Result;
use crate::frame::Image;
use crate::ops::color::{lab_to_rgb, rgb_to_lab};
use crate::pipeline::params::{ParamDescriptor, ParamKind, ParameterValue, StageParams};

const BINS: usize = 256;

/// Laplacian variance above which a scene counts as noisy for tuning.
const NOISY_LAPLACIAN_VARIANCE: f64 = 2e-3;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClaheParams {
    /// Histogram clip multiplier relative to the uniform bin count.
    pub clip_limit: f32,
    /// Square tiling of tile_grid x tile_grid regions.
    pub tile_grid: u32,
}

impl Default for ClaheParams {
    fn default() -> Self {
        Self {
            clip_limit: 2.0,
            tile_grid: 8,
        }
    }
}

const DESCRIPTORS: [ParamDescriptor; 2] = [
    ParamDescriptor {
        name: "clip_limit",
        kind: ParamKind::Float { min: 1.0, max: 10.0, default: 2.0 },
    },
    ParamDescriptor {
        name: "tile_grid",
        kind: ParamKind::Int { min: 4, max: 16, default: 8 },
    },
];

impl StageParams for ClaheParams {
    fn descriptors() -> &'static [ParamDescriptor] {
        &DESCRIPTORS
    }

    fn get(&self, name: &str) -> Option<ParameterValue> {
        match name {
            "clip_limit" => Some(ParameterValue::Float(self.clip_limit as f64)),
            "tile_grid" => Some(ParameterValue::Int(self.tile_grid as i64)),
            _ => None,
        }
    }

    fn set(&mut self, name: &str, value: &ParameterValue) -> std::result::Result<(), String> {
        match name {
            "clip_limit" => self.clip_limit = value.as_f64().ok_or("expected a number")? as f32,
            "tile_grid" => self.tile_grid = value.as_i64().ok_or("expected an integer")? as u32,
            _ => return Err(format!("unknown parameter `{name}`")),
        }
        self.clamp();
        Ok(())
    }

    fn clamp(&mut self) {
        self.clip_limit = self.clip_limit.clamp(1.0, 10.0);
        self.tile_grid = self.tile_grid.clamp(4, 16);
    }
}

/// Contrast-limited adaptive histogram equalization on the LAB L channel.
pub fn apply(image: &Image, params: &ClaheParams) -> Result<Image> {
    let (h, w, _) = image.data.dim();

    let mut l = Array2::<f32>::zeros((h, w));
    let mut a = Array2::<f32>::zeros((h, w));
    let mut b = Array2::<f32>::zeros((h, w));
    for y in 0..h {
        for x in 0..w {
            let (ll, aa, bb) = rgb_to_lab(
                image.data[[y, x, 0]],
                image.data[[y, x, 1]],
                image.data[[y, x, 2]],
            );
            l[[y, x]] = (ll / 100.0).clamp(0.0, 1.0);
            a[[y, x]] = aa;
            b[[y, x]] = bb;
        }
    }

    let l_eq = equalize_plane(&l, params.clip_limit, params.tile_grid as usize);

    let mut out = Image::zeros(h, w);
    for y in 0..h {
        for x in 0..w {
            let (r, g, bb2) = lab_to_rgb(l_eq[[y, x]] * 100.0, a[[y, x]], b[[y, x]]);
            out.data[[y, x, 0]] = r;
            out.data[[y, x, 1]] = g;
            out.data[[y, x, 2]] = bb2;
        }
    }
    out.clamp01();
    Ok(out)
}

/// CLAHE on a single [0,1] plane.
fn equalize_plane(plane: &Array2<f32>, clip_limit: f32, grid: usize) -> Array2<f32> {
    let (h, w) = plane.dim();
    let grid = grid.clamp(1, h.min(w).max(1));
    let tile_h = h.div_ceil(grid);
    let tile_w = w.div_ceil(grid);

    // Per-tile equalization LUTs.
    let mut luts: Vec<Vec<f32>> = Vec::with_capacity(grid * grid);
    for ti in 0..grid {
        for tj in 0..grid {
            let y0 = ti * tile_h;
            let y1 = ((ti + 1) * tile_h).min(h);
            let x0 = tj * tile_w;
            let x1 = ((tj + 1) * tile_w).min(w);
            luts.push(tile_lut(plane, y0, y1, x0, x1, clip_limit));
        }
    }

    // Bilinear blend between the four surrounding tile mappings.
    Array2::from_shape_fn((h, w), |(y, x)| {
        let fy = ((y as f32 + 0.5) / tile_h as f32 - 0.5).clamp(0.0, (grid - 1) as f32);
        let fx = ((x as f32 + 0.5) / tile_w as f32 - 0.5).clamp(0.0, (grid - 1) as f32);
        let ty0 = fy.floor() as usize;
        let tx0 = fx.floor() as usize;
        let ty1 = (ty0 + 1).min(grid - 1);
        let tx1 = (tx0 + 1).min(grid - 1);
        let wy = fy - ty0 as f32;
        let wx = fx - tx0 as f32;

        let bin = ((plane[[y, x]] * (BINS - 1) as f32) as usize).min(BINS - 1);
        let v00 = luts[ty0 * grid + tx0][bin];
        let v01 = luts[ty0 * grid + tx1][bin];
        let v10 = luts[ty1 * grid + tx0][bin];
        let v11 = luts[ty1 * grid + tx1][bin];

        let top = v00 * (1.0 - wx) + v01 * wx;
        let bot = v10 * (1.0 - wx) + v11 * wx;
        (top * (1.0 - wy) + bot * wy).clamp(0.0, 1.0)
    })
}

/// Clipped-histogram CDF mapping for one tile.
fn tile_lut(
    plane: &Array2<f32>,
    y0: usize,
    y1: usize,
    x0: usize,
    x1: usize,
    clip_limit: f32,
) -> Vec<f32> {
    let npix = ((y1 - y0) * (x1 - x0)).max(1);

    let mut hist = vec![0.0f32; BINS];
    for y in y0..y1 {
        for x in x0..x1 {
            let bin = ((plane[[y, x]] * (BINS - 1) as f32) as usize).min(BINS - 1);
            hist[bin] += 1.0;
        }
    }

    // Clip and redistribute the excess uniformly.
    let limit = (clip_limit * npix as f32 / BINS as f32).max(1.0);
    let mut excess = 0.0f32;
    for count in &mut hist {
        if *count > limit {
            excess += *count - limit;
            *count = limit;
        }
    }
    let bonus = excess / BINS as f32;
    for count in &mut hist {
        *count += bonus;
    }

    // CDF normalized to [0, 1].
    let mut lut = vec![0.0f32; BINS];
    let mut cdf = 0.0f32;
    let mut cdf_min = f32::NAN;
    for (i, &count) in hist.iter().enumerate() {
        cdf += count;
        if cdf_min.is_nan() && count > 0.0 {
            cdf_min = cdf;
        }
        lut[i] = cdf;
    }
    let cdf_min = if cdf_min.is_nan() { 0.0 } else { cdf_min };
    let denom = (npix as f32 - cdf_min).max(1.0);
    for v in &mut lut {
        *v = ((*v - cdf_min) / denom).clamp(0.0, 1.0);
    }
    lut
}

/// Tune clip limit from noise/contrast, tile grid from image area.
pub fn auto_tune(sig: &SceneSignature, current: &ClaheParams) -> ClaheParams {
    let mut params = current.clone();

    params.clip_limit = if sig.hist_spread < 0.4 { 4.0 } else { 2.0 };
    if sig.laplacian_variance > NOISY_LAPLACIAN_VARIANCE {
        params.clip_limit = (params.clip_limit * 0.6).max(1.5);
    }

    let megapixels = (sig.width * sig.height) as f64 / 1e6;
    params.tile_grid = if megapixels <= 1.0 {
        6
    } else if megapixels <= 4.0 {
        8
    } else {
        10
    };

    params.clamp();
    params
}
