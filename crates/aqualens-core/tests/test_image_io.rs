mod common;

use ndarray::Array3;

use aqualens_core::frame::Image;
use aqualens_core::io::image_io::{load_image, save_image, save_tiff};

use common::make_underwater_image;

#[test]
fn test_invalid_shapes_rejected() {
    assert!(Image::new(Array3::zeros((0, 4, 3))).is_err());
    assert!(Image::new(Array3::zeros((4, 0, 3))).is_err());
    assert!(Image::new(Array3::zeros((4, 4, 4))).is_err());
}

#[test]
fn test_non_finite_rejected() {
    let mut data = Array3::zeros((4, 4, 3));
    data[[1, 2, 0]] = f32::NAN;
    assert!(Image::new(data).is_err());
}

#[test]
fn test_rgb8_round_trip() {
    let bytes: Vec<u8> = (0..4 * 3 * 3).map(|v| (v * 7 % 256) as u8).collect();
    let img = Image::from_rgb8(&bytes, 3, 4).unwrap();
    assert_eq!(img.to_rgb8(), bytes);
}

#[test]
fn test_png_save_load_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("out.png");

    let img = make_underwater_image(24, 32);
    save_image(&img, &path).unwrap();
    let loaded = load_image(&path).unwrap();

    assert_eq!(loaded.data.dim(), img.data.dim());
    // 8-bit quantization: half an LSB of error at most.
    assert!(common::mean_abs_diff(&img, &loaded) < 1.0 / 255.0);
}

#[test]
fn test_tiff_keeps_16_bit_precision() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("out.tiff");

    let img = make_underwater_image(16, 16);
    save_tiff(&img, &path).unwrap();
    let loaded = load_image(&path).unwrap();
    assert!(common::mean_abs_diff(&img, &loaded) < 1.0 / 32768.0);
}
