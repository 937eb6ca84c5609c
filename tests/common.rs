#![allow(dead_code)]

use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use std::fs;
use std::io::Cursor;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Deterministic noisy RGB image; noise keeps encoders from shrinking it to nothing.
pub fn noisy_image(width: u32, height: u32) -> RgbImage {
    let mut state: u32 = 0x1234_5678;
    RgbImage::from_fn(width, height, |x, y| {
        state ^= state << 13;
        state ^= state >> 17;
        state ^= state << 5;
        let noise = (state & 0x3F) as u8;
        Rgb([
            ((x * 255 / width.max(1)) as u8).wrapping_add(noise),
            ((y * 255 / height.max(1)) as u8).wrapping_add(noise / 2),
            128u8.wrapping_add(noise),
        ])
    })
}

pub fn jpeg_bytes(width: u32, height: u32, quality: u8) -> Vec<u8> {
    let mut buffer = Vec::new();
    JpegEncoder::new_with_quality(&mut buffer, quality)
        .encode_image(&noisy_image(width, height))
        .unwrap();
    buffer
}

pub fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    let mut buffer = Cursor::new(Vec::new());
    DynamicImage::ImageRgb8(noisy_image(width, height))
        .write_to(&mut buffer, ImageFormat::Png)
        .unwrap();
    buffer.into_inner()
}

pub fn write_file(dir: &Path, name: &str, data: &[u8]) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, data).unwrap();
    path
}

/// A directory with two real images, one corrupt ".jpg" and a text file.
pub fn create_test_image_files(dir: &Path) -> Vec<PathBuf> {
    vec![
        write_file(dir, "photo.jpg", &jpeg_bytes(256, 192, 100)),
        write_file(dir, "drawing.png", &png_bytes(200, 150)),
        write_file(dir, "broken.jpg", b"this is not a jpeg"),
        write_file(dir, "notes.txt", b"not an image"),
    ]
}

pub fn create_temp_directory() -> TempDir {
    TempDir::new().unwrap()
}
