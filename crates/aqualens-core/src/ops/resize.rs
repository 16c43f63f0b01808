use ndarray::Array2;

use crate::frame::Image;

/// Area-average resample of a plane to the given target size.
///
/// Each destination pixel averages the source rectangle it covers, with
/// fractional coverage at the rectangle edges. Intended for downsampling;
/// upsampling degenerates to near-nearest and should use [`bilinear_resize`].
pub fn area_resize(data: &Array2<f32>, new_h: usize, new_w: usize) -> Array2<f32> {
    let (h, w) = data.dim();
    if (new_h, new_w) == (h, w) {
        return data.clone();
    }
    let sy = h as f64 / new_h as f64;
    let sx = w as f64 / new_w as f64;

    Array2::from_shape_fn((new_h, new_w), |(dy, dx)| {
        let y0 = dy as f64 * sy;
        let y1 = ((dy + 1) as f64 * sy).min(h as f64);
        let x0 = dx as f64 * sx;
        let x1 = ((dx + 1) as f64 * sx).min(w as f64);

        let mut sum = 0.0f64;
        let mut area = 0.0f64;
        let mut y = y0;
        while y < y1 {
            let yi = y.floor() as usize;
            let y_next = (yi as f64 + 1.0).min(y1);
            let hgt = y_next - y;
            let mut x = x0;
            while x < x1 {
                let xi = x.floor() as usize;
                let x_next = (xi as f64 + 1.0).min(x1);
                let wid = x_next - x;
                sum += data[[yi.min(h - 1), xi.min(w - 1)]] as f64 * hgt * wid;
                area += hgt * wid;
                x = x_next;
            }
            y = y_next;
        }
        if area > 0.0 {
            (sum / area) as f32
        } else {
            data[[(y0 as usize).min(h - 1), (x0 as usize).min(w - 1)]]
        }
    })
}

/// Bilinear resample of a plane to the given target size.
pub fn bilinear_resize(data: &Array2<f32>, new_h: usize, new_w: usize) -> Array2<f32> {
    let (h, w) = data.dim();
    if (new_h, new_w) == (h, w) {
        return data.clone();
    }

    Array2::from_shape_fn((new_h, new_w), |(dy, dx)| {
        let sy = if new_h > 1 {
            dy as f32 * (h - 1) as f32 / (new_h - 1) as f32
        } else {
            0.0
        };
        let sx = if new_w > 1 {
            dx as f32 * (w - 1) as f32 / (new_w - 1) as f32
        } else {
            0.0
        };
        let y0 = sy.floor() as usize;
        let x0 = sx.floor() as usize;
        let y1 = (y0 + 1).min(h - 1);
        let x1 = (x0 + 1).min(w - 1);
        let fy = sy - y0 as f32;
        let fx = sx - x0 as f32;

        let top = data[[y0, x0]] * (1.0 - fx) + data[[y0, x1]] * fx;
        let bot = data[[y1, x0]] * (1.0 - fx) + data[[y1, x1]] * fx;
        top * (1.0 - fy) + bot * fy
    })
}

/// Area-average resample of an image, channel by channel.
pub fn area_resize_image(image: &Image, new_h: usize, new_w: usize) -> Image {
    let planes: Vec<Array2<f32>> = (0..3)
        .map(|c| area_resize(&image.plane(c), new_h, new_w))
        .collect();
    Image::from_planes([&planes[0], &planes[1], &planes[2]])
}
