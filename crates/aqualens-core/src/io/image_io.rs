use std::path::Path;

use image::{DynamicImage, GenericImageView, ImageFormat, ImageReader, Rgb};

use crate::error::Result;
use crate::frame::Image;

/// Load any supported image file as RGB float. 16-bit sources keep their
/// precision; everything else goes through 8-bit.
pub fn load_image(path: &Path) -> Result<Image> {
    let decoded = ImageReader::open(path)?.decode()?;
    let (width, height) = decoded.dimensions();
    let (width, height) = (width as usize, height as usize);

    match &decoded {
        DynamicImage::ImageRgb16(buf) => Image::from_rgb16(buf.as_raw(), width, height),
        DynamicImage::ImageRgba16(_) | DynamicImage::ImageLuma16(_)
        | DynamicImage::ImageLumaA16(_) => {
            let buf = decoded.to_rgb16();
            Image::from_rgb16(buf.as_raw(), width, height)
        }
        _ => {
            let buf = decoded.to_rgb8();
            Image::from_rgb8(buf.as_raw(), width, height)
        }
    }
}

/// Save as 8-bit RGB PNG.
pub fn save_png(img: &Image, path: &Path) -> Result<()> {
    let buf = image::ImageBuffer::<Rgb<u8>, Vec<u8>>::from_raw(
        img.width() as u32,
        img.height() as u32,
        img.to_rgb8(),
    )
    .expect("buffer size matches dimensions");
    buf.save_with_format(path, ImageFormat::Png)?;
    Ok(())
}

/// Save as 16-bit RGB TIFF.
pub fn save_tiff(img: &Image, path: &Path) -> Result<()> {
    let buf = image::ImageBuffer::<Rgb<u16>, Vec<u16>>::from_raw(
        img.width() as u32,
        img.height() as u32,
        img.to_rgb16(),
    )
    .expect("buffer size matches dimensions");
    buf.save(path)?;
    Ok(())
}

/// Save as 8-bit JPEG.
pub fn save_jpeg(img: &Image, path: &Path) -> Result<()> {
    let buf = image::ImageBuffer::<Rgb<u8>, Vec<u8>>::from_raw(
        img.width() as u32,
        img.height() as u32,
        img.to_rgb8(),
    )
    .expect("buffer size matches dimensions");
    buf.save_with_format(path, ImageFormat::Jpeg)?;
    Ok(())
}

/// Save, choosing format from the file extension. PNG is the fallback.
pub fn save_image(img: &Image, path: &Path) -> Result<()> {
    match path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .as_deref()
    {
        Some("tiff" | "tif") => save_tiff(img, path),
        Some("jpg" | "jpeg") => save_jpeg(img, path),
        _ => save_png(img, path),
    }
}
