use criterion::{criterion_group, criterion_main, Criterion};
use math_canvas::draw::{scan_ink, DrawingSurface};

fn sketch(width: u32, height: u32) -> DrawingSurface {
    let mut surface = DrawingSurface::new(width, height);
    for row in 0..20 {
        let y = 40.0 + row as f32 * 30.0;
        surface.begin_stroke(60.0, y);
        for step in 1..=60 {
            surface.extend_stroke(60.0 + step as f32 * 15.0, y + (step % 7) as f32 * 3.0);
        }
        surface.end_stroke();
    }
    surface
}

fn bench_scan(c: &mut Criterion) {
    let surface = sketch(1920, 1080);
    c.bench_function("scan_ink_1080p", |b| b.iter(|| scan_ink(surface.raster())));

    let blank = DrawingSurface::new(1920, 1080);
    c.bench_function("scan_ink_1080p_blank", |b| b.iter(|| scan_ink(blank.raster())));
}

fn bench_encode(c: &mut Criterion) {
    let surface = sketch(1920, 1080);
    c.bench_function("to_data_url_1080p", |b| b.iter(|| surface.to_data_url()));
}

criterion_group!(benches, bench_scan, bench_encode);
criterion_main!(benches);
