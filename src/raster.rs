//! Raster backend: draws a [`Figure`] into an RGB pixel buffer with `plotters`.
//!
//! The canvas covers the figure box plus anything placed outside it (the
//! importance colorbar hangs below the figure), padded on every side for
//! tick labels, axis descriptions and titles, like a tight bounding box.

use image::RgbImage;
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters_bitmap::BitMapBackendError;

use crate::colormap::Rgba as CellColor;
use crate::error::PlotError;
use crate::figure::{Axes, Colorbar, Figure, ImageLayer, Rect};

const FONT: &str = "sans-serif";

/// Gradient steps along the colorbar
const COLORBAR_STEPS: usize = 256;

type Root<'a> = DrawingArea<BitMapBackend<'a>, Shift>;
type DrawResult = Result<(), DrawingAreaErrorKind<BitMapBackendError>>;

/// Font sizes (pixels) and the label areas they need
struct TextMetrics {
    tick_px: i32,
    title_px: i32,
    desc_px: i32,
}

impl TextMetrics {
    fn for_dpi(dpi: f32) -> Self {
        let pt = |points: f32| (points * dpi / 72.0).round().max(1.0) as i32;
        Self {
            tick_px: pt(8.0),
            title_px: pt(10.0),
            desc_px: pt(9.0),
        }
    }

    /// Below an axes: tick labels, then the axis description
    fn x_label_area(&self) -> i32 {
        self.tick_px + self.desc_px + 12
    }

    /// Left of an axes: up to five digits of tick label plus the rotated description
    fn y_label_area(&self) -> i32 {
        3 * self.tick_px + self.desc_px + 12
    }

    fn caption_area(&self) -> i32 {
        self.title_px + 12
    }

    fn pad(&self) -> i32 {
        self.x_label_area()
            .max(self.y_label_area())
            .max(self.caption_area())
    }
}

/// Pixel mapping for figure-fraction coordinates
struct Canvas {
    width: u32,
    height: u32,
    fig_w_px: f32,
    fig_h_px: f32,
    min_left: f32,
    max_top: f32,
    pad: i32,
}

impl Canvas {
    fn for_figure(figure: &Figure, dpi: f32, pad: i32) -> Self {
        let [w_in, h_in] = figure.size_in();
        let fig_w_px = w_in * dpi;
        let fig_h_px = h_in * dpi;

        let rects = figure
            .axes()
            .iter()
            .map(Axes::rect)
            .chain(figure.colorbar().map(|cb| cb.rect));
        let (mut min_left, mut max_right, mut min_bottom, mut max_top) =
            (0.0f32, 1.0f32, 0.0f32, 1.0f32);
        for r in rects {
            min_left = min_left.min(r.left);
            max_right = max_right.max(r.right());
            min_bottom = min_bottom.min(r.bottom);
            max_top = max_top.max(r.top());
        }

        let body_w = ((max_right - min_left) * fig_w_px).round().max(1.0) as u32;
        let body_h = ((max_top - min_bottom) * fig_h_px).round().max(1.0) as u32;
        Self {
            width: body_w + 2 * pad as u32,
            height: body_h + 2 * pad as u32,
            fig_w_px,
            fig_h_px,
            min_left,
            max_top,
            pad,
        }
    }

    /// Pixel bounds [x0, x1) x [y0, y1) of a figure-fraction rect
    fn bounds(&self, rect: Rect) -> (i32, i32, i32, i32) {
        let x = |f: f32| ((f - self.min_left) * self.fig_w_px).round() as i32 + self.pad;
        let y = |f: f32| ((self.max_top - f) * self.fig_h_px).round() as i32 + self.pad;
        (x(rect.left), x(rect.right()), y(rect.top()), y(rect.bottom))
    }
}

/// Render `figure` at `dpi` pixels per inch
pub fn render(figure: &Figure, dpi: f32) -> Result<RgbImage, PlotError> {
    if !(dpi.is_finite() && dpi > 0.0) {
        return Err(PlotError::InvalidParams(format!(
            "dpi must be positive, got {}",
            dpi
        )));
    }

    let text = TextMetrics::for_dpi(dpi);
    let canvas = Canvas::for_figure(figure, dpi, text.pad());
    let mut buffer = vec![0u8; canvas.width as usize * canvas.height as usize * 3];
    {
        let root = BitMapBackend::with_buffer(&mut buffer, (canvas.width, canvas.height))
            .into_drawing_area();
        root.fill(&WHITE)?;
        for axes in figure.axes() {
            draw_axes(&root, &canvas, &text, axes)?;
        }
        if let Some(colorbar) = figure.colorbar() {
            draw_colorbar(&root, &canvas, &text, colorbar)?;
        }
        root.present()?;
    }

    log::debug!(
        "rendered {} axes to {}x{} px at {} dpi",
        figure.axes().len(),
        canvas.width,
        canvas.height,
        dpi
    );
    RgbImage::from_raw(canvas.width, canvas.height, buffer)
        .ok_or_else(|| PlotError::InvalidParams("pixel buffer does not match canvas".into()))
}

/// Non-empty axis range
fn span(lo: f32, hi: f32) -> (f32, f32) {
    if hi > lo {
        (lo, hi)
    } else {
        (lo, lo + 1.0)
    }
}

fn to_plotters(color: CellColor) -> RGBAColor {
    let channel = |c: f32| (c.clamp(0.0, 1.0) * 255.0).round() as u8;
    RGBAColor(
        channel(color[0]),
        channel(color[1]),
        channel(color[2]),
        f64::from(color[3].clamp(0.0, 1.0)),
    )
}

/// Corners of cell (row, col) in axis coordinates; row 0 is the lowest bin
fn cell_corners(
    axes: &Axes,
    layer: &ImageLayer,
    row: usize,
    col: usize,
) -> Option<[(f32, f32); 2]> {
    let x0 = *layer.x_coords.get(col)?;
    let x1 = *layer.x_coords.get(col + 1)?;
    let y0 = axes.to_axis_y(*layer.y_coords.get(row)?);
    let y1 = axes.to_axis_y(*layer.y_coords.get(row + 1)?);
    Some([(x0, y0), (x1, y1)])
}

fn draw_axes(root: &Root<'_>, canvas: &Canvas, text: &TextMetrics, axes: &Axes) -> DrawResult {
    let (x0, x1, y0, y1) = canvas.bounds(axes.rect());
    let caption_area = if axes.title().is_empty() {
        0
    } else {
        text.caption_area()
    };
    let area = root.clone().shrink(
        (x0 - text.y_label_area(), y0 - caption_area),
        (
            x1 - x0 + text.y_label_area(),
            y1 - y0 + caption_area + text.x_label_area(),
        ),
    );

    let (x_lo, x_hi) = axes.x_limits();
    let (x_lo, x_hi) = span(x_lo, x_hi);
    let (y_lo, y_hi) = axes.y_limits();
    let (y_lo, y_hi) = span(axes.to_axis_y(y_lo), axes.to_axis_y(y_hi));
    let y_keys: Vec<f32> = axes.yticks().iter().map(|&t| axes.to_axis_y(t)).collect();

    let mut builder = ChartBuilder::on(&area);
    builder
        .x_label_area_size(text.x_label_area())
        .y_label_area_size(text.y_label_area());
    if !axes.title().is_empty() {
        builder.caption(axes.title(), (FONT, text.title_px));
    }
    let mut chart = builder.build_cartesian_2d(
        (x_lo..x_hi).with_key_points(axes.xticks().to_vec()),
        (y_lo..y_hi).with_key_points(y_keys),
    )?;

    for layer in axes.layers() {
        let [rows, cols] = layer.shape();
        chart.draw_series(
            (0..rows)
                .flat_map(|row| (0..cols).map(move |col| (row, col)))
                .filter_map(|(row, col)| {
                    let color = layer.color_at(row, col);
                    if color[3] <= 0.0 {
                        return None;
                    }
                    let corners = cell_corners(axes, layer, row, col)?;
                    Some(Rectangle::new(corners, to_plotters(color).filled()))
                }),
        )?;
    }

    chart.draw_series(std::iter::once(Rectangle::new(
        [(x_lo, y_lo), (x_hi, y_hi)],
        BLACK.stroke_width(1),
    )))?;

    let x_fmt = |x: &f32| format!("{:.1}", x);
    let y_fmt = |v: &f32| format!("{:.0}", axes.from_axis_y(*v));
    let mut mesh = chart.configure_mesh();
    mesh.disable_mesh()
        .label_style((FONT, text.tick_px))
        .axis_desc_style((FONT, text.desc_px))
        .x_label_formatter(&x_fmt)
        .y_label_formatter(&y_fmt);
    if !axes.xlabel().is_empty() {
        mesh.x_desc(axes.xlabel());
    }
    if !axes.ylabel().is_empty() {
        mesh.y_desc(axes.ylabel());
    }
    mesh.draw()
}

fn draw_colorbar(
    root: &Root<'_>,
    canvas: &Canvas,
    text: &TextMetrics,
    colorbar: &Colorbar,
) -> DrawResult {
    let (x0, x1, y0, y1) = canvas.bounds(colorbar.rect);
    let area = root
        .clone()
        .shrink((x0, y0), (x1 - x0, y1 - y0 + text.x_label_area()));

    let norm = colorbar.norm;
    let (lo, hi) = if norm.is_degenerate() {
        (norm.vmin - 0.5, norm.vmin + 0.5)
    } else {
        (norm.vmin, norm.vmax)
    };

    let mut chart = ChartBuilder::on(&area)
        .x_label_area_size(text.x_label_area())
        .build_cartesian_2d((lo..hi).with_key_points(colorbar.ticks.clone()), 0f32..1f32)?;

    let step = (hi - lo) / COLORBAR_STEPS as f32;
    chart.draw_series((0..COLORBAR_STEPS).map(|i| {
        let start = lo + step * i as f32;
        let mut color = colorbar.cmap.sample(norm.apply(start + step / 2.0));
        color[3] *= colorbar.alpha;
        Rectangle::new([(start, 0.0), (start + step, 1.0)], to_plotters(color).filled())
    }))?;

    if colorbar.outline_visible {
        chart.draw_series(std::iter::once(Rectangle::new(
            [(lo, 0.0), (hi, 1.0)],
            BLACK.stroke_width(1),
        )))?;
    }

    let axis_color = BLACK.mix(if colorbar.outline_visible { 1.0 } else { 0.0 });
    let x_fmt = |v: &f32| format!("{:.2}", v);
    let mut mesh = chart.configure_mesh();
    mesh.disable_mesh()
        .y_labels(0)
        .axis_style(axis_color.stroke_width(1))
        .label_style((FONT, text.tick_px))
        .axis_desc_style((FONT, text.desc_px))
        .x_label_formatter(&x_fmt);
    if !colorbar.label.is_empty() {
        mesh.x_desc(colorbar.label.as_str());
    }
    mesh.draw()
}
