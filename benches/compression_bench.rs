use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use img_shrink::{
    target_dimensions, CompressionOptions, Dimensions, EncodeResult, Encoder, EncodeKind,
    Packager, SourceImage,
};
use std::io::Cursor;

fn gradient(width: u32, height: u32) -> RgbImage {
    RgbImage::from_fn(width, height, |x, y| {
        Rgb([(x % 256) as u8, (y % 256) as u8, ((x ^ y) % 256) as u8])
    })
}

fn jpeg_source(width: u32, height: u32) -> SourceImage {
    let mut buffer = Vec::new();
    JpegEncoder::new_with_quality(&mut buffer, 100)
        .encode_image(&gradient(width, height))
        .unwrap();
    SourceImage::new("bench.jpg", "image/jpeg", buffer)
}

fn png_source(width: u32, height: u32) -> SourceImage {
    let mut buffer = Cursor::new(Vec::new());
    DynamicImage::ImageRgb8(gradient(width, height))
        .write_to(&mut buffer, ImageFormat::Png)
        .unwrap();
    SourceImage::new("bench.png", "image/png", buffer.into_inner())
}

fn bench_target_dimensions(c: &mut Criterion) {
    c.bench_function("target_dimensions", |b| {
        b.iter(|| target_dimensions(black_box(Dimensions::new(6000, 3000)), black_box(4096)))
    });
}

fn bench_encode(c: &mut Criterion) {
    let mut group = c.benchmark_group("encode");
    group.sample_size(10);
    let encoder = Encoder::default();

    for size in [256u32, 1024] {
        let jpeg = jpeg_source(size, size);
        group.bench_with_input(BenchmarkId::new("jpeg", size), &jpeg, |b, source| {
            b.iter(|| encoder.encode(black_box(source)).unwrap())
        });

        let png = png_source(size, size);
        group.bench_with_input(BenchmarkId::new("png_to_jpeg", size), &png, |b, source| {
            b.iter(|| encoder.encode(black_box(source)).unwrap())
        });
    }

    let downscaling = Encoder::with_options(CompressionOptions::new(Some(512), None, None).unwrap());
    let large = png_source(2048, 1024);
    group.bench_function("png_downscale_2048_to_512", |b| {
        b.iter(|| downscaling.encode(black_box(&large)).unwrap())
    });

    group.finish();
}

fn bench_package(c: &mut Criterion) {
    let results: Vec<EncodeResult> = (0..10)
        .map(|i| EncodeResult {
            name: format!("image-{}.jpg", i),
            mime_type: "image/jpeg".to_string(),
            data: vec![i as u8; 64 * 1024],
            original_size: 128 * 1024,
            compressed_size: 64 * 1024,
            kind: EncodeKind::Original,
        })
        .collect();
    let packager = Packager::default();

    c.bench_function("package_zip_10x64k", |b| {
        b.iter(|| packager.package(black_box(&results)).unwrap())
    });
}

criterion_group!(benches, bench_target_dimensions, bench_encode, bench_package);
criterion_main!(benches);
