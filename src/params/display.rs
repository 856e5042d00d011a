//! Spectrogram display configuration.

use crate::error::PlotError;

/// How spectrogram grids map onto time and mel-frequency axes
#[derive(Debug, Clone, PartialEq)]
pub struct DisplayConfig {
    /// Samples between successive frames (used for the time axis only)
    pub hop_length: usize,

    /// Lowest mel band edge (Hz)
    pub fmin_hz: f32,

    /// Highest mel band edge (Hz), `None` = Nyquist (sr / 2)
    pub fmax_hz: Option<f32>,

    /// Colormap for the plain spectrogram panel
    pub spectrogram_cmap: String,

    /// Colormap for the spectrogram underneath the overlay
    pub background_cmap: String,

    /// Opacity of the importance overlay (0.0-1.0)
    pub overlay_alpha: f32,

    /// Approximate number of ticks on the time axis
    pub target_time_ticks: usize,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            hop_length: 512,
            fmin_hz: 0.0,
            fmax_hz: None,
            spectrogram_cmap: "viridis".to_string(),
            background_cmap: "Greys_r".to_string(),
            overlay_alpha: 0.75,
            target_time_ticks: 5,
        }
    }
}

impl DisplayConfig {
    /// Upper frequency edge for a given sample rate
    pub fn fmax_for(&self, sr: f32) -> f32 {
        self.fmax_hz.unwrap_or(sr / 2.0)
    }

    /// Validate configuration (hop length > 0, alpha within [0, 1], etc.)
    pub fn validate(&self) -> Result<(), PlotError> {
        if self.hop_length == 0 {
            return Err(PlotError::InvalidParams(
                "hop length must be > 0".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&self.overlay_alpha) {
            return Err(PlotError::InvalidParams(format!(
                "overlay alpha must be within [0, 1], got {}",
                self.overlay_alpha
            )));
        }
        if self.fmin_hz < 0.0 {
            return Err(PlotError::InvalidParams(format!(
                "fmin must be >= 0, got {}",
                self.fmin_hz
            )));
        }
        if let Some(fmax) = self.fmax_hz {
            if fmax <= self.fmin_hz {
                return Err(PlotError::InvalidParams(format!(
                    "fmax ({}) must exceed fmin ({})",
                    fmax, self.fmin_hz
                )));
            }
        }
        Ok(())
    }
}
