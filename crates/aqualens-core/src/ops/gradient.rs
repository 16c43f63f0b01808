use ndarray::Array2;
use rayon::prelude::*;

use crate::consts::PARALLEL_PIXEL_THRESHOLD;

/// Sobel gradient magnitude of a plane.
///
/// Kernels:
///   Gx = [[-1, 0, 1], [-2, 0, 2], [-1, 0, 1]]
///   Gy = [[-1, -2, -1], [0, 0, 0], [1, 2, 1]]
///
/// Border pixels are left at zero.
pub fn sobel_magnitude(data: &Array2<f32>) -> Array2<f32> {
    let (h, w) = data.dim();
    let mut result = Array2::<f32>::zeros((h, w));
    if h < 3 || w < 3 {
        return result;
    }

    let row_mag = |row: usize| -> Vec<f32> {
        let mut out = vec![0.0f32; w];
        for col in 1..w - 1 {
            let gx = -data[[row - 1, col - 1]] + data[[row - 1, col + 1]]
                - 2.0 * data[[row, col - 1]]
                + 2.0 * data[[row, col + 1]]
                - data[[row + 1, col - 1]]
                + data[[row + 1, col + 1]];
            let gy = -data[[row - 1, col - 1]] - 2.0 * data[[row - 1, col]]
                - data[[row - 1, col + 1]]
                + data[[row + 1, col - 1]]
                + 2.0 * data[[row + 1, col]]
                + data[[row + 1, col + 1]];
            out[col] = (gx * gx + gy * gy).sqrt();
        }
        out
    };

    if h * w >= PARALLEL_PIXEL_THRESHOLD {
        let rows: Vec<Vec<f32>> = (1..h - 1).into_par_iter().map(row_mag).collect();
        for (i, row_data) in rows.into_iter().enumerate() {
            for (col, val) in row_data.into_iter().enumerate() {
                result[[i + 1, col]] = val;
            }
        }
    } else {
        for row in 1..h - 1 {
            for (col, val) in row_mag(row).into_iter().enumerate() {
                result[[row, col]] = val;
            }
        }
    }
    result
}

/// Sobel gradient components (gx, gy) of a plane, needed where the
/// gradient direction matters (e.g. non-maximum suppression).
/// Border pixels are left at zero.
pub fn sobel_gradients(data: &Array2<f32>) -> (Array2<f32>, Array2<f32>) {
    let (h, w) = data.dim();
    let mut gx = Array2::<f32>::zeros((h, w));
    let mut gy = Array2::<f32>::zeros((h, w));
    if h < 3 || w < 3 {
        return (gx, gy);
    }

    for row in 1..h - 1 {
        for col in 1..w - 1 {
            gx[[row, col]] = -data[[row - 1, col - 1]] + data[[row - 1, col + 1]]
                - 2.0 * data[[row, col - 1]]
                + 2.0 * data[[row, col + 1]]
                - data[[row + 1, col - 1]]
                + data[[row + 1, col + 1]];
            gy[[row, col]] = -data[[row - 1, col - 1]] - 2.0 * data[[row - 1, col]]
                - data[[row - 1, col + 1]]
                + data[[row + 1, col - 1]]
                + 2.0 * data[[row + 1, col]]
                + data[[row + 1, col + 1]];
        }
    }
    (gx, gy)
}

/// Mean Sobel magnitude over the interior — an edge-strength proxy.
pub fn sobel_mean(data: &Array2<f32>) -> f64 {
    let (h, w) = data.dim();
    if h < 3 || w < 3 {
        return 0.0;
    }
    let mag = sobel_magnitude(data);
    let mut sum = 0.0f64;
    for row in 1..h - 1 {
        for col in 1..w - 1 {
            sum += mag[[row, col]] as f64;
        }
    }
    sum / ((h - 2) * (w - 2)) as f64
}

/// 3x3 Laplacian response of a plane:
///   0  1  0
///   1 -4  1
///   0  1  0
/// Border pixels are left at zero.
pub fn laplacian(data: &Array2<f32>) -> Array2<f32> {
    let (h, w) = data.dim();
    let mut result = Array2::<f32>::zeros((h, w));
    if h < 3 || w < 3 {
        return result;
    }
    for row in 1..h - 1 {
        for col in 1..w - 1 {
            result[[row, col]] = -4.0 * data[[row, col]]
                + data[[row - 1, col]]
                + data[[row + 1, col]]
                + data[[row, col - 1]]
                + data[[row, col + 1]];
        }
    }
    result
}

/// Variance of the Laplacian response — higher means more detail (or noise).
pub fn laplacian_variance(data: &Array2<f32>) -> f64 {
    let (h, w) = data.dim();
    if h < 3 || w < 3 {
        return 0.0;
    }

    let mut sum = 0.0f64;
    let mut sum_sq = 0.0f64;
    let count = ((h - 2) * (w - 2)) as f64;

    for row in 1..h - 1 {
        for col in 1..w - 1 {
            let lap = -4.0 * data[[row, col]] as f64
                + data[[row - 1, col]] as f64
                + data[[row + 1, col]] as f64
                + data[[row, col - 1]] as f64
                + data[[row, col + 1]] as f64;
            sum += lap;
            sum_sq += lap * lap;
        }
    }

    let mean = sum / count;
    sum_sq / count - mean * mean
}
