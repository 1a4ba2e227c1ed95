//! Benchmarks for the renderer crate - image rendering, resampling and color mapping.
//!
//! Run with: cargo bench --package renderer -- render_image
//! Or: cargo bench --package renderer --bench render_benchmarks

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use rand::Rng;
use raster_common::{Axis, Color, Interval, RectF, Size};
use renderer::{
    CachePolicy, ColorFormat, ColorMap, LinearColorMap, MatrixRasterData, RasterData,
    ResampleMode, ScaleMap, Spectrogram,
};

/// Generate a spectrogram-like field: a few harmonic ridges plus noise.
fn generate_spectrum_grid(width: usize, height: usize) -> Vec<f64> {
    let mut rng = rand::thread_rng();
    let mut data = vec![0.0; width * height];

    for y in 0..height {
        let fy = y as f64 / height as f64;
        for x in 0..width {
            let fx = x as f64 / width as f64;

            // Ridges drifting over time (x) at harmonic frequencies (y)
            let mut v = 0.0;
            for harmonic in 1..=4 {
                let center = harmonic as f64 * (0.15 + 0.05 * (fx * std::f64::consts::TAU).sin());
                let d = (fy - center) * 40.0;
                v += (-d * d).exp() / harmonic as f64;
            }
            let noise = rng.gen_range(-0.05..0.05);

            data[y * width + x] = v + noise;
        }
    }
    data
}

fn spectrum_data(width: usize, height: usize, mode: ResampleMode) -> MatrixRasterData {
    let mut data = MatrixRasterData::from_matrix(
        generate_spectrum_grid(width, height),
        width,
        Interval::new(0.0, width as f64),
        Interval::new(0.0, height as f64),
        Interval::new(-0.1, 1.2),
    );
    data.set_resample_mode(mode);
    data
}

fn spectrogram_color_map() -> LinearColorMap {
    let mut map = LinearColorMap::new(Color::DARK_BLUE, Color::DARK_RED);
    map.add_color_stop(0.2, Color::BLUE);
    map.add_color_stop(0.4, Color::CYAN);
    map.add_color_stop(0.6, Color::GREEN);
    map.add_color_stop(0.8, Color::YELLOW);
    map
}

/// Maps for an image of `size` pixels showing the whole data, Y pointing up.
fn maps_for(data: &MatrixRasterData, size: Size) -> (ScaleMap, ScaleMap) {
    let x = data.interval(Axis::X);
    let y = data.interval(Axis::Y);
    (
        ScaleMap::new(x.min_value(), x.max_value(), 0.0, size.width as f64),
        ScaleMap::new(y.min_value(), y.max_value(), size.height as f64, 0.0),
    )
}

// =============================================================================
// RESAMPLING BENCHMARKS
// =============================================================================

fn bench_resample_modes(c: &mut Criterion) {
    let mut group = c.benchmark_group("resample");

    let modes = [
        ("nearest", ResampleMode::NearestNeighbour),
        ("bilinear", ResampleMode::BilinearInterpolation),
        ("bicubic", ResampleMode::BicubicInterpolation),
    ];

    let samples: Vec<(f64, f64)> = {
        let mut rng = rand::thread_rng();
        (0..10_000)
            .map(|_| (rng.gen_range(0.0..256.0), rng.gen_range(0.0..256.0)))
            .collect()
    };

    group.throughput(Throughput::Elements(samples.len() as u64));

    for (name, mode) in modes {
        let data = spectrum_data(256, 256, mode);

        group.bench_with_input(BenchmarkId::new(name, "10k"), &samples, |b, samples| {
            b.iter(|| {
                let mut sum = 0.0;
                for &(x, y) in samples {
                    sum += data.value(black_box(x), black_box(y));
                }
                sum
            });
        });
    }

    group.finish();
}

// =============================================================================
// IMAGE RENDERING BENCHMARKS
// =============================================================================

fn bench_render_image(c: &mut Criterion) {
    let mut group = c.benchmark_group("render_image");

    let sizes = [(256, 256), (512, 512), (1024, 1024)];

    for (width, height) in sizes {
        let size = Size::new(width, height);
        let data = spectrum_data(512, 256, ResampleMode::BilinearInterpolation);
        let (x_map, y_map) = maps_for(&data, size);
        let area = RectF::new(0.0, 0.0, 512.0, 256.0);

        let mut spectrogram = Spectrogram::new();
        spectrogram.set_color_map(Box::new(spectrogram_color_map()));
        spectrogram.set_data(Box::new(data));

        group.throughput(Throughput::Elements((width * height) as u64));

        // Every pixel through the color map
        group.bench_function(BenchmarkId::new("rgb", format!("{}x{}", width, height)), |b| {
            b.iter(|| spectrogram.render_image(&x_map, &y_map, &area, black_box(size)));
        });

        // Precomputed color table
        spectrogram.set_color_table_size(256);
        group.bench_function(
            BenchmarkId::new("rgb_table", format!("{}x{}", width, height)),
            |b| {
                b.iter(|| spectrogram.render_image(&x_map, &y_map, &area, black_box(size)));
            },
        );

        // 8 bit indexes
        let mut indexed = spectrogram_color_map();
        indexed.set_format(ColorFormat::Indexed);
        spectrogram.set_color_map(Box::new(indexed));
        group.bench_function(
            BenchmarkId::new("indexed", format!("{}x{}", width, height)),
            |b| {
                b.iter(|| spectrogram.render_image(&x_map, &y_map, &area, black_box(size)));
            },
        );
    }

    group.finish();
}

fn bench_render_threads(c: &mut Criterion) {
    let mut group = c.benchmark_group("render_threads");

    let size = Size::new(1024, 768);
    let data = spectrum_data(512, 256, ResampleMode::BicubicInterpolation);
    let (x_map, y_map) = maps_for(&data, size);
    let area = RectF::new(0.0, 0.0, 512.0, 256.0);

    let mut spectrogram = Spectrogram::new();
    spectrogram.set_data(Box::new(data));

    group.throughput(Throughput::Elements(size.area() as u64));

    for threads in [1, 2, 4, 8, 0] {
        spectrogram.set_render_thread_count(threads);
        let label = if threads == 0 {
            "pool".to_string()
        } else {
            threads.to_string()
        };

        group.bench_function(BenchmarkId::new("bicubic_1024x768", label), |b| {
            b.iter(|| spectrogram.render_image(&x_map, &y_map, &area, black_box(size)));
        });
    }

    group.finish();
}

// =============================================================================
// COLOR MAP BENCHMARKS
// =============================================================================

fn bench_color_map(c: &mut Criterion) {
    let mut group = c.benchmark_group("color_map");

    let map = spectrogram_color_map();
    let interval = Interval::new(-0.1, 1.2);
    let values: Vec<f64> = {
        let mut rng = rand::thread_rng();
        (0..10_000).map(|_| rng.gen_range(-0.2..1.3)).collect()
    };

    group.throughput(Throughput::Elements(values.len() as u64));

    group.bench_with_input(BenchmarkId::new("rgb", "10k"), &values, |b, values| {
        b.iter(|| {
            values
                .iter()
                .map(|&v| map.rgb(&interval, black_box(v)).to_argb())
                .fold(0u32, u32::wrapping_add)
        });
    });

    group.bench_with_input(BenchmarkId::new("color_index", "10k"), &values, |b, values| {
        b.iter(|| {
            values
                .iter()
                .map(|&v| map.color_index(256, &interval, black_box(v)))
                .sum::<usize>()
        });
    });

    group.bench_function("color_table_256", |b| {
        b.iter(|| black_box(&map).color_table_256());
    });

    group.finish();
}

// =============================================================================
// FULL PIPELINE BENCHMARKS
// =============================================================================

fn bench_draw(c: &mut Criterion) {
    let mut group = c.benchmark_group("draw");

    let canvas = RectF::new(0.0, 0.0, 800.0, 600.0);
    let data = spectrum_data(512, 256, ResampleMode::BilinearInterpolation);
    let (x_map, y_map) = maps_for(&data, canvas.to_size());

    let mut spectrogram = Spectrogram::new();
    spectrogram.set_color_map(Box::new(spectrogram_color_map()));
    spectrogram.set_data(Box::new(data));

    group.bench_function("draw_800x600", |b| {
        b.iter(|| spectrogram.draw(&x_map, &y_map, black_box(&canvas)));
    });

    // Repeated draws of an unchanged view
    spectrogram.set_cache_policy(CachePolicy::PaintCache);
    group.bench_function("draw_cached_800x600", |b| {
        b.iter(|| spectrogram.draw(&x_map, &y_map, black_box(&canvas)));
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_resample_modes,
    bench_render_image,
    bench_render_threads,
    bench_color_map,
    bench_draw,
);
criterion_main!(benches);
