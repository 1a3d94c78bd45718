use criterion::{black_box, criterion_group, Criterion};
use image::{DynamicImage, RgbImage};
use soilnet::service::prepare::preprocessing;

fn bench_with_camera_sized_photo(c: &mut Criterion) {
    let photo = synthetic_photo(1024, 768);

    let mut group = c.benchmark_group("Preprocessing");
    group.bench_function("1024x768 photo", move |b| {
        b.iter(|| preprocessing(black_box(&photo)))
    });
    group.finish();
}

fn synthetic_photo(width: u32, height: u32) -> DynamicImage {
    DynamicImage::ImageRgb8(RgbImage::from_fn(width, height, |x, y| {
        image::Rgb([(x % 256) as u8, (y % 256) as u8, ((x + y) % 256) as u8])
    }))
}

criterion_group!(preprocessing_benches, bench_with_camera_sized_photo);
