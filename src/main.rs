//! Headless render of the heatmap overlay figure
//!
//! Builds a synthetic log-mel spectrogram from OpenSimplex noise plus a
//! signed attribution blob, and writes the figure to PNG for visual checks.

use std::time::Instant;

use ndarray::Array2;
use noise::{NoiseFn, OpenSimplex};
use spec_heatmap::{plot_spec_heatmap, HeatmapOptions};

const N_MELS: usize = 64;
const N_FRAMES: usize = 100;
const SAMPLE_RATE_HZ: f32 = 22050.0;
const NOISE_SEED: u32 = 42;
const NOISE_FREQUENCY: f64 = 0.08;
const DPI: f32 = 100.0;
const OUTPUT: &str = "screenshots/spec_heatmap.png";

/// Log-mel-like texture in [-80, 0] dB, louder toward low bands
fn synthetic_spectrogram(simplex: &OpenSimplex) -> Array2<f32> {
    Array2::from_shape_fn((N_MELS, N_FRAMES), |(f, t)| {
        let n = simplex.get([f as f64 * NOISE_FREQUENCY, t as f64 * NOISE_FREQUENCY]) as f32;
        let tilt = -40.0 * f as f32 / N_MELS as f32;
        (tilt + 20.0 * n - 20.0).clamp(-80.0, 0.0)
    })
}

/// Positive blob on the low bands, negative blob higher up
fn synthetic_attribution() -> Array2<f32> {
    let blob = |f: f32, t: f32, cf: f32, ct: f32| {
        (-((f - cf).powi(2) / 40.0 + (t - ct).powi(2) / 120.0)).exp()
    };
    Array2::from_shape_fn((N_MELS, N_FRAMES), |(f, t)| {
        let (f, t) = (f as f32, t as f32);
        0.02 * blob(f, t, 12.0, 30.0) - 0.015 * blob(f, t, 44.0, 70.0)
    })
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let start = Instant::now();

    let simplex = OpenSimplex::new(NOISE_SEED);
    let spec = synthetic_spectrogram(&simplex).into_dyn();
    let heatmap = synthetic_attribution();

    let fig = plot_spec_heatmap(
        heatmap.view(),
        spec.view(),
        SAMPLE_RATE_HZ,
        2,
        3,
        &HeatmapOptions::new(),
    )?;

    std::fs::create_dir_all("screenshots")?;
    fig.save(OUTPUT, DPI)?;

    log::info!(
        "{} / {} -> {} in {:.2}ms",
        fig.axes()[0].title(),
        fig.axes()[1].title(),
        OUTPUT,
        start.elapsed().as_secs_f64() * 1000.0
    );

    Ok(())
}
