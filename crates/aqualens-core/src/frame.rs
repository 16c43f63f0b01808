use ndarray::{Array2, Array3};

use crate::error::{AqualensError, Result};

/// A single RGB still image or video frame.
/// Pixel values are f32 in [0.0, 1.0], channel order R, G, B.
#[derive(Clone, Debug, PartialEq)]
pub struct Image {
    /// Pixel data, row-major, shape = (height, width, 3)
    pub data: Array3<f32>,
}

impl Image {
    /// Wrap an existing tensor, validating shape and finiteness.
    pub fn new(data: Array3<f32>) -> Result<Self> {
        let (h, w, c) = data.dim();
        if h == 0 || w == 0 {
            return Err(AqualensError::InvalidInput(format!(
                "zero-sized image ({h}x{w})"
            )));
        }
        if c != 3 {
            return Err(AqualensError::InvalidInput(format!(
                "expected 3 channels, got {c}"
            )));
        }
        if data.iter().any(|v| !v.is_finite()) {
            return Err(AqualensError::InvalidInput(
                "image contains non-finite values".into(),
            ));
        }
        Ok(Self { data })
    }

    /// All-zeros image of the given size.
    pub fn zeros(height: usize, width: usize) -> Self {
        Self {
            data: Array3::zeros((height, width, 3)),
        }
    }

    /// Constant-color image, useful for synthetic test inputs.
    pub fn constant(height: usize, width: usize, rgb: [f32; 3]) -> Self {
        Self {
            data: Array3::from_shape_fn((height, width, 3), |(_, _, c)| rgb[c]),
        }
    }

    pub fn width(&self) -> usize {
        self.data.dim().1
    }

    pub fn height(&self) -> usize {
        self.data.dim().0
    }

    pub fn pixel_count(&self) -> usize {
        self.height() * self.width()
    }

    /// Extract one channel as a standalone plane.
    pub fn plane(&self, channel: usize) -> Array2<f32> {
        let (h, w, _) = self.data.dim();
        Array2::from_shape_fn((h, w), |(y, x)| self.data[[y, x, channel]])
    }

    /// Rec. 601 luminance plane.
    pub fn luminance(&self) -> Array2<f32> {
        let (h, w, _) = self.data.dim();
        Array2::from_shape_fn((h, w), |(y, x)| {
            0.299 * self.data[[y, x, 0]] + 0.587 * self.data[[y, x, 1]] + 0.114 * self.data[[y, x, 2]]
        })
    }

    /// Rebuild an image from three channel planes. Panics if shapes differ.
    pub fn from_planes(planes: [&Array2<f32>; 3]) -> Self {
        let (h, w) = planes[0].dim();
        assert_eq!(planes[1].dim(), (h, w));
        assert_eq!(planes[2].dim(), (h, w));
        Self {
            data: Array3::from_shape_fn((h, w, 3), |(y, x, c)| planes[c][[y, x]]),
        }
    }

    /// Clamp all values into [0, 1] in place.
    pub fn clamp01(&mut self) {
        self.data.mapv_inplace(|v| v.clamp(0.0, 1.0));
    }

    /// Decode interleaved 8-bit RGB bytes.
    pub fn from_rgb8(bytes: &[u8], width: usize, height: usize) -> Result<Self> {
        if bytes.len() != width * height * 3 {
            return Err(AqualensError::InvalidInput(format!(
                "byte length {} does not match {width}x{height}x3",
                bytes.len()
            )));
        }
        let data = Array3::from_shape_fn((height, width, 3), |(y, x, c)| {
            bytes[(y * width + x) * 3 + c] as f32 / 255.0
        });
        Ok(Self { data })
    }

    /// Decode interleaved 16-bit RGB samples.
    pub fn from_rgb16(samples: &[u16], width: usize, height: usize) -> Result<Self> {
        if samples.len() != width * height * 3 {
            return Err(AqualensError::InvalidInput(format!(
                "sample length {} does not match {width}x{height}x3",
                samples.len()
            )));
        }
        let data = Array3::from_shape_fn((height, width, 3), |(y, x, c)| {
            samples[(y * width + x) * 3 + c] as f32 / 65535.0
        });
        Ok(Self { data })
    }

    /// Encode to interleaved 8-bit RGB bytes, clamping to range.
    pub fn to_rgb8(&self) -> Vec<u8> {
        let (h, w, _) = self.data.dim();
        let mut out = Vec::with_capacity(h * w * 3);
        for y in 0..h {
            for x in 0..w {
                for c in 0..3 {
                    out.push((self.data[[y, x, c]].clamp(0.0, 1.0) * 255.0).round() as u8);
                }
            }
        }
        out
    }

    /// Encode to interleaved 16-bit RGB samples, clamping to range.
    pub fn to_rgb16(&self) -> Vec<u16> {
        let (h, w, _) = self.data.dim();
        let mut out = Vec::with_capacity(h * w * 3);
        for y in 0..h {
            for x in 0..w {
                for c in 0..3 {
                    out.push((self.data[[y, x, c]].clamp(0.0, 1.0) * 65535.0).round() as u16);
                }
            }
        }
        out
    }
}
