//! In-memory figure model: a grid of axes holding image layers, plus an
//! optional colorbar. Geometry is in figure fractions (0..1 spans the
//! figure box; values outside it place elements beyond the figure edge).

use std::path::Path;

use image::RgbImage;
use ndarray::Array2;

use crate::colormap::{Colormap, Normalize, Rgba};
use crate::display::{hz_to_mel, mel_to_hz};
use crate::error::PlotError;
use crate::params::FigureLayout;
use crate::raster;

/// Axis-aligned rectangle in figure fractions
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub left: f32,
    pub bottom: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn new(left: f32, bottom: f32, width: f32, height: f32) -> Self {
        Self {
            left,
            bottom,
            width,
            height,
        }
    }

    pub fn right(&self) -> f32 {
        self.left + self.width
    }

    pub fn top(&self) -> f32 {
        self.bottom + self.height
    }
}

/// How data coordinates map onto an axis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AxisScale {
    #[default]
    Linear,
    /// Evenly spaced in Slaney mels
    Mel,
}

/// A color-mapped 2D grid drawn into an axes
///
/// `data` rows are frequency bins (row 0 at the bottom), columns are frames.
#[derive(Debug, Clone)]
pub struct ImageLayer {
    pub data: Array2<f32>,
    pub cmap: Colormap,
    pub norm: Normalize,

    /// Layer opacity, multiplied with the colormap's own alpha
    pub alpha: f32,

    /// Column edges in x data units (len = columns + 1)
    pub x_coords: Vec<f32>,

    /// Row edges in y data units (len = rows + 1)
    pub y_coords: Vec<f32>,
}

impl ImageLayer {
    /// [rows, columns]
    pub fn shape(&self) -> [usize; 2] {
        let (rows, cols) = self.data.dim();
        [rows, cols]
    }

    /// Color of one cell before blending
    pub fn color_at(&self, row: usize, col: usize) -> Rgba {
        let mut color = self.cmap.sample(self.norm.apply(self.data[[row, col]]));
        color[3] *= self.alpha;
        color
    }
}

/// One plotting panel
#[derive(Debug, Clone)]
pub struct Axes {
    rect: Rect,
    layers: Vec<ImageLayer>,
    title: String,
    xlabel: String,
    ylabel: String,
    xticks: Vec<f32>,
    yticks: Vec<f32>,
    x_limits: (f32, f32),
    y_limits: (f32, f32),
    y_scale: AxisScale,
}

impl Axes {
    /// Empty axes occupying `rect`
    pub fn new(rect: Rect) -> Self {
        Self {
            rect,
            layers: Vec::new(),
            title: String::new(),
            xlabel: String::new(),
            ylabel: String::new(),
            xticks: Vec::new(),
            yticks: Vec::new(),
            x_limits: (0.0, 1.0),
            y_limits: (0.0, 1.0),
            y_scale: AxisScale::Linear,
        }
    }

    /// Stack a layer on top; it must share the grid of the layers below
    pub fn push_layer(&mut self, layer: ImageLayer) -> Result<(), PlotError> {
        if let Some(base) = self.layers.first() {
            if base.shape() != layer.shape() {
                return Err(PlotError::ShapeMismatch {
                    expected: base.shape(),
                    found: layer.shape(),
                });
            }
        }
        self.layers.push(layer);
        Ok(())
    }

    pub fn rect(&self) -> Rect {
        self.rect
    }

    pub fn layers(&self) -> &[ImageLayer] {
        &self.layers
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = title.into();
    }

    pub fn xlabel(&self) -> &str {
        &self.xlabel
    }

    pub fn set_xlabel(&mut self, label: impl Into<String>) {
        self.xlabel = label.into();
    }

    pub fn ylabel(&self) -> &str {
        &self.ylabel
    }

    pub fn set_ylabel(&mut self, label: impl Into<String>) {
        self.ylabel = label.into();
    }

    pub fn xticks(&self) -> &[f32] {
        &self.xticks
    }

    pub fn set_xticks(&mut self, ticks: &[f32]) {
        self.xticks = ticks.to_vec();
    }

    pub fn yticks(&self) -> &[f32] {
        &self.yticks
    }

    /// Replace the y ticks; an empty slice hides them
    pub fn set_yticks(&mut self, ticks: &[f32]) {
        self.yticks = ticks.to_vec();
    }

    pub fn x_limits(&self) -> (f32, f32) {
        self.x_limits
    }

    pub fn set_x_limits(&mut self, lo: f32, hi: f32) {
        self.x_limits = (lo, hi);
    }

    pub fn y_limits(&self) -> (f32, f32) {
        self.y_limits
    }

    pub fn set_y_limits(&mut self, lo: f32, hi: f32, scale: AxisScale) {
        self.y_limits = (lo, hi);
        self.y_scale = scale;
    }

    pub fn y_scale(&self) -> AxisScale {
        self.y_scale
    }

    /// Map a y data value onto the evenly spaced axis coordinate (mels on a mel axis)
    pub fn to_axis_y(&self, y: f32) -> f32 {
        match self.y_scale {
            AxisScale::Linear => y,
            AxisScale::Mel => hz_to_mel(y),
        }
    }

    /// Inverse of [`Axes::to_axis_y`]
    pub fn from_axis_y(&self, v: f32) -> f32 {
        match self.y_scale {
            AxisScale::Linear => v,
            AxisScale::Mel => mel_to_hz(v),
        }
    }
}

/// Horizontal color scale legend for one image layer
#[derive(Debug, Clone)]
pub struct Colorbar {
    pub rect: Rect,
    pub cmap: Colormap,
    pub norm: Normalize,
    pub alpha: f32,
    pub label: String,

    /// Long side over short side, recorded for layout consumers
    pub aspect: f32,

    pub outline_visible: bool,

    /// Tick positions in data units
    pub ticks: Vec<f32>,
}

impl Colorbar {
    /// Colorbar mirroring `layer`'s colormap, limits and opacity
    pub fn for_layer(layer: &ImageLayer, rect: Rect) -> Self {
        let norm = layer.norm;
        let ticks = if norm.is_degenerate() {
            vec![norm.vmin]
        } else {
            vec![norm.vmin, (norm.vmin + norm.vmax) / 2.0, norm.vmax]
        };
        Self {
            rect,
            cmap: layer.cmap.clone(),
            norm,
            alpha: layer.alpha,
            label: String::new(),
            aspect: rect.width / rect.height,
            outline_visible: true,
            ticks,
        }
    }
}

/// A figure: sized canvas, its axes and an optional colorbar
#[derive(Debug, Clone)]
pub struct Figure {
    size_in: [f32; 2],
    axes: Vec<Axes>,
    colorbar: Option<Colorbar>,
}

impl Figure {
    /// Figure with an `nrows` x `ncols` grid of empty axes (row-major order)
    pub fn subplots(nrows: usize, ncols: usize, layout: &FigureLayout) -> Self {
        let s = &layout.subplot;
        let nrows = nrows.max(1);
        let ncols = ncols.max(1);

        let cell_w = (s.right - s.left) / (ncols as f32 + s.wspace * (ncols - 1) as f32);
        let cell_h = (s.top - s.bottom) / (nrows as f32 + s.hspace * (nrows - 1) as f32);

        let mut axes = Vec::with_capacity(nrows * ncols);
        for row in 0..nrows {
            let top = s.top - row as f32 * cell_h * (1.0 + s.hspace);
            for col in 0..ncols {
                let left = s.left + col as f32 * cell_w * (1.0 + s.wspace);
                axes.push(Axes::new(Rect::new(left, top - cell_h, cell_w, cell_h)));
            }
        }

        Self {
            size_in: layout.figsize_in,
            axes,
            colorbar: None,
        }
    }

    /// [width, height] (inches)
    pub fn size_in(&self) -> [f32; 2] {
        self.size_in
    }

    pub fn axes(&self) -> &[Axes] {
        &self.axes
    }

    pub fn axes_mut(&mut self) -> &mut [Axes] {
        &mut self.axes
    }

    pub fn colorbar(&self) -> Option<&Colorbar> {
        self.colorbar.as_ref()
    }

    /// Attach a colorbar in `rect` for the topmost layer of axes `axes_index`
    pub fn add_colorbar(
        &mut self,
        axes_index: usize,
        rect: Rect,
    ) -> Result<&mut Colorbar, PlotError> {
        let layer = self
            .axes
            .get(axes_index)
            .and_then(|ax| ax.layers().last())
            .ok_or_else(|| {
                PlotError::InvalidParams(format!("axes {} has no image to map", axes_index))
            })?;

        Ok(self.colorbar.insert(Colorbar::for_layer(layer, rect)))
    }

    /// Rasterize at `dpi` pixels per inch
    pub fn render(&self, dpi: f32) -> Result<RgbImage, PlotError> {
        raster::render(self, dpi)
    }

    /// Rasterize and write to `path` (format from the file extension)
    pub fn save(&self, path: impl AsRef<Path>, dpi: f32) -> Result<(), PlotError> {
        let path = path.as_ref();
        self.render(dpi)?.save(path)?;
        log::info!("saved figure to {}", path.display());
        Ok(())
    }
}
