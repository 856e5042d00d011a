//! Emotion class labels.

use crate::error::PlotError;

/// Class names in model output order
pub const LABELS: [&str; 8] = [
    "neutral", "calm", "happy", "sad", "angry", "fear", "disgust", "surprise",
];

/// Look up the display name for a class index
pub fn label_name(index: usize) -> Result<&'static str, PlotError> {
    LABELS.get(index).copied().ok_or(PlotError::LabelIndex {
        index,
        len: LABELS.len(),
    })
}
