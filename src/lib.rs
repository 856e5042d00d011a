//! Spectrogram heatmap - side-by-side spectrogram and attribution overlay figures

pub mod colormap;
pub mod display;
pub mod error;
pub mod figure;
pub mod labels;
pub mod overlay;
pub mod params;
pub mod raster;

pub use colormap::{CmapSpec, Colormap, Normalize};
pub use error::PlotError;
pub use figure::{Axes, Colorbar, Figure};
pub use labels::LABELS;
pub use overlay::{plot_spec_heatmap, HeatmapOptions};
