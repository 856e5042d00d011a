//! Spectrogram display: maps a (frequency bin, frame) grid onto time and
//! mel-frequency axes and attaches it to an [`Axes`] as an image layer.

use ndarray::{ArrayView2, ArrayViewD, Axis, Ix2};

use crate::colormap::{Colormap, Normalize};
use crate::error::PlotError;
use crate::figure::{Axes, AxisScale, ImageLayer};
use crate::params::DisplayConfig;

// Slaney mel scale: linear below 1 kHz, logarithmic above
const MEL_LINEAR_HZ_PER_MEL: f32 = 200.0 / 3.0;
const MEL_LOG_START_HZ: f32 = 1000.0;
const MEL_LOG_START_MEL: f32 = MEL_LOG_START_HZ / MEL_LINEAR_HZ_PER_MEL;

/// Lowest power-of-two mel tick (Hz)
const MEL_TICK_BASE_HZ: f32 = 512.0;

fn mel_log_step() -> f32 {
    6.4f32.ln() / 27.0
}

/// Convert frequency (Hz) to Slaney mels
pub fn hz_to_mel(hz: f32) -> f32 {
    if hz >= MEL_LOG_START_HZ {
        MEL_LOG_START_MEL + (hz / MEL_LOG_START_HZ).ln() / mel_log_step()
    } else {
        hz / MEL_LINEAR_HZ_PER_MEL
    }
}

/// Convert Slaney mels to frequency (Hz)
pub fn mel_to_hz(mel: f32) -> f32 {
    if mel >= MEL_LOG_START_MEL {
        MEL_LOG_START_HZ * (mel_log_step() * (mel - MEL_LOG_START_MEL)).exp()
    } else {
        mel * MEL_LINEAR_HZ_PER_MEL
    }
}

/// Band edges (Hz) for `n_bins` mel bands spread evenly in mel between fmin and fmax
pub fn mel_edges(n_bins: usize, fmin_hz: f32, fmax_hz: f32) -> Vec<f32> {
    let lo = hz_to_mel(fmin_hz);
    let hi = hz_to_mel(fmax_hz);
    (0..=n_bins)
        .map(|i| {
            if i == 0 {
                fmin_hz
            } else if i == n_bins {
                fmax_hz
            } else {
                mel_to_hz(lo + (hi - lo) * i as f32 / n_bins as f32)
            }
        })
        .collect()
}

/// Frame edges (seconds) for `n_frames` frames
pub fn time_edges(n_frames: usize, sr: f32, hop_length: usize) -> Vec<f32> {
    (0..=n_frames)
        .map(|k| (k * hop_length) as f32 / sr)
        .collect()
}

/// Evenly spaced time ticks on a 1-2-5 step, roughly `target` of them
pub fn time_ticks(duration_s: f32, target: usize) -> Vec<f32> {
    if duration_s.is_nan() || duration_s <= 0.0 || target == 0 {
        return vec![0.0];
    }
    let raw = duration_s / target as f32;
    let magnitude = 10f32.powf(raw.log10().floor());
    let step = [1.0, 2.0, 5.0, 10.0]
        .iter()
        .map(|m| m * magnitude)
        .find(|&s| s >= raw)
        .unwrap_or(10.0 * magnitude);

    let count = (duration_s / step).floor() as usize;
    (0..=count).map(|i| i as f32 * step).collect()
}

/// Mel-axis ticks: 0 Hz plus powers of two from 512 Hz, within [fmin, fmax]
pub fn mel_ticks(fmin_hz: f32, fmax_hz: f32) -> Vec<f32> {
    let mut ticks = Vec::new();
    if fmin_hz <= 0.0 {
        ticks.push(0.0);
    }
    let mut hz = MEL_TICK_BASE_HZ;
    while hz <= fmax_hz {
        if hz >= fmin_hz {
            ticks.push(hz);
        }
        hz *= 2.0;
    }
    ticks
}

/// Drop every length-1 axis; the result must be two-dimensional
pub fn squeeze(spec: ArrayViewD<'_, f32>) -> Result<ArrayView2<'_, f32>, PlotError> {
    let shape: Vec<usize> = spec.shape().to_vec();
    let mut view = spec;
    for axis in (0..view.ndim()).rev() {
        if view.len_of(Axis(axis)) == 1 {
            view = view.index_axis_move(Axis(axis), 0);
        }
    }
    view.into_dimensionality::<Ix2>()
        .map_err(|_| PlotError::NotTwoDimensional { shape })
}

/// Draw a (frequency bin, frame) grid on `axes` with a time x-axis and mel y-axis
///
/// Layers stack in call order. A layer drawn over an existing one must have
/// the same grid shape. Without `norm` the layer scales to the data's finite
/// min/max.
pub fn specshow(
    axes: &mut Axes,
    data: ArrayView2<'_, f32>,
    sr: f32,
    cmap: Colormap,
    norm: Option<Normalize>,
    alpha: f32,
    config: &DisplayConfig,
) -> Result<(), PlotError> {
    if !(sr.is_finite() && sr > 0.0) {
        return Err(PlotError::InvalidSampleRate(sr));
    }

    let (n_bins, n_frames) = data.dim();
    let fmax_hz = config.fmax_for(sr);
    if fmax_hz <= config.fmin_hz {
        return Err(PlotError::InvalidParams(format!(
            "fmax {} Hz must exceed fmin {} Hz at sample rate {}",
            fmax_hz, config.fmin_hz, sr
        )));
    }
    let norm = norm.unwrap_or_else(|| Normalize::autoscale(data.iter()));

    let layer = ImageLayer {
        data: data.to_owned(),
        cmap,
        norm,
        alpha,
        x_coords: time_edges(n_frames, sr, config.hop_length),
        y_coords: mel_edges(n_bins, config.fmin_hz, fmax_hz),
    };

    let duration_s = layer.x_coords.last().copied().unwrap_or(0.0);
    axes.push_layer(layer)?;

    axes.set_x_limits(0.0, duration_s);
    axes.set_y_limits(config.fmin_hz, fmax_hz, AxisScale::Mel);
    axes.set_xlabel("Time");
    axes.set_ylabel("Hz");
    axes.set_xticks(&time_ticks(duration_s, config.target_time_ticks));
    axes.set_yticks(&mel_ticks(config.fmin_hz, fmax_hz));

    log::debug!(
        "specshow: {}x{} grid, cmap={}, range=[{}, {}], alpha={}",
        n_bins,
        n_frames,
        axes.layers().last().map(|l| l.cmap.name()).unwrap_or(""),
        norm.vmin,
        norm.vmax,
        alpha
    );

    Ok(())
}
