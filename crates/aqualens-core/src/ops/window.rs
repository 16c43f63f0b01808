use ndarray::Array2;
use rayon::prelude::*;

use crate::consts::PARALLEL_PIXEL_THRESHOLD;

/// Grayscale erosion: per-pixel minimum over a square window of odd side.
///
/// Runs as two separable passes (rows then columns), which is exact for the
/// min operator and keeps large dark-channel windows cheap.
pub fn min_filter(data: &Array2<f32>, window: usize) -> Array2<f32> {
    let radius = window.max(1) / 2;
    let row_pass = min_rows(data, radius);
    min_cols(&row_pass, radius)
}

fn min_rows(data: &Array2<f32>, radius: usize) -> Array2<f32> {
    let (h, w) = data.dim();
    let one_row = |row: usize| -> Vec<f32> {
        (0..w)
            .map(|col| {
                let lo = col.saturating_sub(radius);
                let hi = (col + radius).min(w - 1);
                let mut m = f32::INFINITY;
                for x in lo..=hi {
                    m = m.min(data[[row, x]]);
                }
                m
            })
            .collect()
    };
    assemble(h, w, one_row)
}

fn min_cols(data: &Array2<f32>, radius: usize) -> Array2<f32> {
    let (h, w) = data.dim();
    let one_row = |row: usize| -> Vec<f32> {
        let lo = row.saturating_sub(radius);
        let hi = (row + radius).min(h - 1);
        (0..w)
            .map(|col| {
                let mut m = f32::INFINITY;
                for y in lo..=hi {
                    m = m.min(data[[y, col]]);
                }
                m
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
