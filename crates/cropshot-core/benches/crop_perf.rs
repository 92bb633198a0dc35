//! Crop and preview performance benchmarks
//!
//! Measures the per-frame work on the preview path (fit + downscale) and
//! the crop applied before OCR, on 4K (3840x2160) buffers.

use criterion::{Criterion, criterion_group, criterion_main};
use cropshot_core::{
    capture::CapturedImage,
    crop::apply_crop,
    model::{CropBox, ImageSize, ViewportPoint},
    preview::PreviewTransform,
};
use std::hint::black_box;

fn create_4k_test_image() -> CapturedImage {
    CapturedImage::from_test_pattern(3840, 2160)
}

fn bench_crop_half(c: &mut Criterion) {
    let img = create_4k_test_image();
    let crop = CropBox {
        left:   960,
        top:    540,
        right:  2880,
        bottom: 1620,
    };

    c.bench_function("crop_half_4k", |b| {
        b.iter(|| {
            apply_crop(black_box(&img), black_box(Some(crop))).unwrap();
        });
    });
}

fn bench_crop_none(c: &mut Criterion) {
    let img = create_4k_test_image();

    c.bench_function("crop_none_4k", |b| {
        b.iter(|| {
            apply_crop(black_box(&img), black_box(None)).unwrap();
        });
    });
}

fn bench_preview_downscale(c: &mut Criterion) {
    let img = create_4k_test_image();
    let t = PreviewTransform::compute(img.size(), ImageSize::new(1280, 800)).unwrap();
    let d = t.displayed();

    c.bench_function("preview_downscale_4k_to_720p", |b| {
        b.iter(|| {
            black_box(&img).resize_to(d.width as u32, d.height as u32);
        });
    });
}

fn bench_transform_mapping(c: &mut Criterion) {
    let image = ImageSize::new(3840, 2160);

    c.bench_function("transform_compute_and_map", |b| {
        b.iter(|| {
            let t = PreviewTransform::compute(black_box(image), black_box(ImageSize::new(1280, 800)))
                .unwrap();
            t.to_image_clamped(black_box(ViewportPoint::new(640, 400)))
        });
    });
}

criterion_group!(
    benches,
    bench_crop_half,
    bench_crop_none,
    bench_preview_downscale,
    bench_transform_mapping
);
criterion_main!(benches);
