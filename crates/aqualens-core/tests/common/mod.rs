use ndarray::Array3;

use aqualens_core::frame::Image;

/// Constant-color image.
pub fn make_image(h: usize, w: usize, rgb: [f32; 3]) -> Image {
    Image::constant(h, w, rgb)
}

/// Grayscale ramp covering [0, 1] row by row.
pub fn make_ramp_image(h: usize, w: usize) -> Image {
    let n = (h * w) as f32;
    Image {
        data: Array3::from_shape_fn((h, w, 3), |(y, x, _)| (y * w + x) as f32 / n),
    }
}

/// Synthetic underwater-looking scene: blue-green cast, a textured floor,
/// some dark structure and a bright sand patch.
pub fn make_underwater_image(h: usize, w: usize) -> Image {
    Image {
        data: Array3::from_shape_fn((h, w, 3), |(y, x, c)| {
            let fy = y as f32 / h as f32;
            let fx = x as f32 / w as f32;
            let texture = 0.08 * ((x / 3 + y / 5) % 2) as f32;
            let base = match c {
                0 => 0.12 + 0.1 * fy,
                1 => 0.45 + 0.2 * fx,
                _ => 0.5 + 0.25 * fy,
            };
            let rock = if (8..20).contains(&(y % 32)) && (10..22).contains(&(x % 40)) {
                -0.25
            } else {
                0.0
            };
            let sand = if y < h / 6 && x < w / 6 { 0.3 } else { 0.0 };
            (base + texture + rock + sand).clamp(0.0, 1.0)
        }),
    }
}

/// Mean absolute per-sample difference between two images.
pub fn mean_abs_diff(a: &Image, b: &Image) -> f64 {
    assert_eq!(a.data.dim(), b.data.dim());
    let n = a.data.len() as f64;
    a.data
        .iter()
        .zip(b.data.iter())
        .map(|(x, y)| (x - y).abs() as f64)
        .sum::<f64>()
        / n
}

/// Peak signal-to-noise ratio in dB between two images in [0, 1].
pub fn psnr(reference: &Image, test: &Image) -> f64 {
    assert_eq!(reference.data.dim(), test.data.dim());
    let n = reference.data.len() as f64;
    let mse = reference
        .data
        .iter()
        .zip(test.data.iter())
        .map(|(a, b)| {
            let d = (a - b) as f64;
            d * d
        })
        .sum::<f64>()
        / n;
    if mse <= 0.0 {
        return f64::INFINITY;
    }
    -10.0 * mse.log10()
}

/// True when every sample lies in [0, 1].
pub fn in_range(image: &Image) -> bool {
    image.data.iter().all(|&v| (0.0..=1.0).contains(&v))
}
