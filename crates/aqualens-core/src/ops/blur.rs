use ndarray::Array2;
use rayon::prelude::*;

use crate::consts::PARALLEL_PIXEL_THRESHOLD;
use crate::frame::Image;

/// Apply Gaussian blur to a plane using separable 1D convolution.
pub fn gaussian_blur_plane(data: &Array2<f32>, sigma: f32) -> Array2<f32> {
    if sigma <= 0.0 {
        return data.clone();
    }
    let kernel = make_gaussian_kernel(sigma);
    let row_pass = convolve_rows(data, &kernel);
    convolve_cols(&row_pass, &kernel)
}

/// Apply Gaussian blur to every channel of an image.
pub fn gaussian_blur_image(image: &Image, sigma: f32) -> Image {
    let planes: Vec<Array2<f32>> = (0..3)
        .map(|c| gaussian_blur_plane(&image.plane(c), sigma))
        .collect();
    Image::from_planes([&planes[0], &planes[1], &planes[2]])
}

fn make_gaussian_kernel(sigma: f32) -> Vec<f32> {
    let radius = (sigma * 3.0).ceil() as usize;
    let size = 2 * radius + 1;
    let mut kernel = vec![0.0f32; size];
    let s2 = 2.0 * sigma * sigma;
    let mut sum = 0.0f32;

    for (i, k) in kernel.iter_mut().enumerate() {
        let x = i as f32 - radius as f32;
        *k = (-x * x / s2).exp();
        sum += *k;
    }

    for v in &mut kernel {
        *v /= sum;
    }

    kernel
}

fn convolve_rows(data: &Array2<f32>, kernel: &[f32]) -> Array2<f32> {
    let (h, w) = data.dim();
    let radius = kernel.len() / 2;

    let one_row = |row: usize| -> Vec<f32> {
        (0..w)
            .map(|col| {
                let mut sum = 0.0f32;
                for (ki, &kv) in kernel.iter().enumerate() {
                    let src_col = (col as isize + ki as isize - radius as isize)
                        .clamp(0, w as isize - 1) as usize;
                    sum += data[[row, src_col]] * kv;
                }
                sum
            })
            .collect()
    };

    assemble(h, w, one_row)
}

fn convolve_cols(data: &Array2<f32>, kernel: &[f32]) -> Array2<f32> {
    let (h, w) = data.dim();
    let radius = kernel.len() / 2;

    let one_row = |row: usize| -> Vec<f32> {
        (0..w)
            .map(|col| {
                let mut sum = 0.0f32;
                for (ki, &kv) in kernel.iter().enumerate() {
                    let src_row = (row as isize + ki as isize - radius as isize)
                        .clamp(0, h as isize - 1) as usize;
                    sum += data[[src_row, col]] * kv;
                }
                sum
            })
            .collect()
    };

    assemble(h, w, one_row)
}

fn assemble(h: usize, w: usize, one_row: impl Fn(usize) -> Vec<f32> + Sync) -> Array2<f32> {
    let mut result = Array2::<f32>::zeros((h, w));
    if h * w >= PARALLEL_PIXEL_THRESHOLD {
        let rows: Vec<Vec<f32>> = (0..h).into_par_iter().map(&one_row).collect();
        for (row, row_data) in rows.into_iter().enumerate() {
            for (col, val) in row_data.into_iter().enumerate() {
                result[[row, col]] = val;
            }
        }
    } else {
        for row in 0..h {
            for (col, val) in one_row(row).into_iter().enumerate() {
                result[[row, col]] = val;
            }
        }
    }
    result
}

/// Box-filter mean over a (2*radius+1) square window.
///
/// Uses running sums per row and per column; windows are truncated at the
/// borders and normalized by the actual pixel count, so the output is an
/// unbiased local mean everywhere.
pub fn box_filter(data: &Array2<f32>, radius: usize) -> Array2<f32> {
    let (h, w) = data.dim();
    let r = radius as isize;

    // Horizontal pass: windowed sums and counts along each row.
    let mut row_sum = Array2::<f32>::zeros((h, w));
    let mut row_cnt = Array2::<f32>::zeros((h, w));
    for y in 0..h {
        let mut acc = 0.0f32;
        let mut cnt = 0isize;
        // Prime the window for x = 0.
        for x in 0..=(r.min(w as isize - 1)) {
            acc += data[[y, x as usize]];
            cnt += 1;
        }
        row_sum[[y, 0]] = acc;
        row_cnt[[y, 0]] = cnt as f32;
        for x in 1..w {
            let enter = x as isize + r;
            if enter < w as isize {
                acc += data[[y, enter as usize]];
                cnt += 1;
            }
            let leave = x as isize - r - 1;
            if leave >= 0 {
                acc -= data[[y, leave as usize]];
                cnt -= 1;
            }
            row_sum[[y, x]] = acc;
            row_cnt[[y, x]] = cnt as f32;
        }
    }

    // Vertical pass over the horizontal sums, then normalize.
    let mut result = Array2::<f32>::zeros((h, w));
    for x in 0..w {
        let mut acc = 0.0f32;
        let mut cnt_acc = 0.0f32;
        for y in 0..=(r.min(h as isize - 1)) {
            acc += row_sum[[y as usize, x]];
            cnt_acc += row_cnt[[y as usize, x]];
        }
        result[[0, x]] = acc / cnt_acc.max(1.0);
        for y in 1..h {
            let enter = y as isize + r;
            if enter < h as isize {
                acc += row_sum[[enter as usize, x]];
                cnt_acc += row_cnt[[enter as usize, x]];
            }
            let leave = y as isize - r - 1;
            if leave >= 0 {
                acc -= row_sum[[leave as usize, x]];
                cnt_acc -= row_cnt[[leave as usize, x]];
            }
            result[[y, x]] = acc / cnt_acc.max(1.0);
        }
    }
    result
}
