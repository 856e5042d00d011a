//! Error type shared by every fallible plotting operation.

use plotters::drawing::DrawingAreaErrorKind;
use plotters_bitmap::BitMapBackendError;
use thiserror::Error;

/// Errors raised while building or exporting a figure
#[derive(Debug, Error)]
pub enum PlotError {
    /// Class index outside the label set
    #[error("label index {index} out of range for {len} labels")]
    LabelIndex { index: usize, len: usize },

    /// Spectrogram still has more (or fewer) than two axes after squeezing
    #[error("spectrogram must squeeze to 2 dimensions, got shape {shape:?}")]
    NotTwoDimensional { shape: Vec<usize> },

    /// Overlay grid does not line up with the layer already on the axes
    #[error("layer shape {found:?} does not match axes grid {expected:?}")]
    ShapeMismatch {
        expected: [usize; 2],
        found: [usize; 2],
    },

    #[error("unknown colormap '{0}'")]
    UnknownColormap(String),

    #[error("sample rate must be positive and finite, got {0}")]
    InvalidSampleRate(f32),

    #[error("invalid plot parameters: {0}")]
    InvalidParams(String),

    #[error("failed to draw figure: {0}")]
    Draw(#[from] DrawingAreaErrorKind<BitMapBackendError>),

    #[error("failed to export figure: {0}")]
    Image(#[from] image::ImageError),
}
