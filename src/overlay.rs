//! Side-by-side spectrogram / importance heatmap figure.

use ndarray::{ArrayView2, ArrayViewD};

use crate::colormap::{importance_limits, CmapSpec, Colormap};
use crate::display::{specshow, squeeze};
use crate::error::PlotError;
use crate::figure::Figure;
use crate::labels::label_name;
use crate::params::{DisplayConfig, FigureLayout};

/// Optional knobs for [`plot_spec_heatmap`]
#[derive(Debug, Clone)]
pub struct HeatmapOptions {
    /// Overlay colormap (defaults to the red/transparent/blue attribution scheme)
    pub cmap: CmapSpec,

    /// Whether the heatmap carries signed values.
    ///
    /// `true` scales colors over [-lim, lim], `false` over [0, lim], where
    /// lim is the heatmap's largest absolute value. The heatmap itself is
    /// never inspected to decide this.
    pub include_negative: bool,

    pub layout: FigureLayout,
    pub display: DisplayConfig,
}

impl Default for HeatmapOptions {
    fn default() -> Self {
        Self {
            cmap: CmapSpec::Shap,
            include_negative: true,
            layout: FigureLayout::default(),
            display: DisplayConfig::default(),
        }
    }
}

impl HeatmapOptions {
    /// Defaults: attribution colormap, signed color scale
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_cmap(mut self, cmap: impl Into<CmapSpec>) -> Self {
        self.cmap = cmap.into();
        self
    }

    pub fn with_include_negative(mut self, include_negative: bool) -> Self {
        self.include_negative = include_negative;
        self
    }
}

/// Plot a spectrogram next to the same spectrogram overlaid with an importance heatmap
///
/// # Arguments
/// * `heatmap` - Per-cell importance, same (frequency, frame) grid as `spec`
/// * `spec` - Spectrogram; length-1 axes are squeezed away
/// * `sr` - Sample rate (Hz), scales the time axis
/// * `pred` - Predicted class index (right panel title)
/// * `truth` - Ground-truth class index (left panel title)
///
/// # Returns
/// The figure: axes 0 is the plain spectrogram, axes 1 the overlay, and the
/// colorbar maps the overlay. Nothing is displayed or written.
pub fn plot_spec_heatmap(
    heatmap: ArrayView2<'_, f32>,
    spec: ArrayViewD<'_, f32>,
    sr: f32,
    pred: usize,
    truth: usize,
    options: &HeatmapOptions,
) -> Result<Figure, PlotError> {
    let pred_name = label_name(pred)?;
    let truth_name = label_name(truth)?;

    options.layout.validate()?;
    options.display.validate()?;

    let overlay_cmap = options.cmap.resolve()?;
    let spectrogram_cmap = Colormap::by_name(&options.display.spectrogram_cmap)?;
    let background_cmap = Colormap::by_name(&options.display.background_cmap)?;

    let spec = squeeze(spec)?;
    let mut fig = Figure::subplots(1, 2, &options.layout);

    {
        let ax = &mut fig.axes_mut()[0];
        specshow(ax, spec, sr, spectrogram_cmap, None, 1.0, &options.display)?;
        ax.set_title(format!("Label: {}", truth_name));
    }

    let norm = importance_limits(heatmap, options.include_negative);
    if norm.is_degenerate() {
        log::warn!(
            "heatmap has no non-zero values, color range collapses to [{}, {}]",
            norm.vmin,
            norm.vmax
        );
    }

    {
        let ax = &mut fig.axes_mut()[1];
        specshow(ax, spec, sr, background_cmap, None, 1.0, &options.display)?;
        specshow(
            ax,
            heatmap,
            sr,
            overlay_cmap,
            Some(norm),
            options.display.overlay_alpha,
            &options.display,
        )?;
        ax.set_yticks(&[]);
        ax.set_ylabel("");
        ax.set_title(format!("Pred: {}", pred_name));
    }

    let colorbar = fig.add_colorbar(1, options.layout.colorbar_rect())?;
    colorbar.label = options.layout.colorbar_label.clone();
    colorbar.aspect = options.layout.colorbar_aspect();
    colorbar.outline_visible = false;

    log::debug!(
        "built heatmap figure: truth={}, pred={}, range=[{}, {}]",
        truth_name,
        pred_name,
        norm.vmin,
        norm.vmax
    );

    Ok(fig)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::colormap::Normalize;
    use crate::labels::LABELS;
    use ndarray::{Array2, Array3};

    fn pseudo_random_spec(rows: usize, cols: usize) -> Array2<f32> {
        // Deterministic stand-in for a log-mel spectrogram
        Array2::from_shape_fn((rows, cols), |(f, t)| {
            let x = (f * 31 + t * 17) as f32;
            -80.0 * (x.sin() * 0.5 + 0.5)
        })
    }

    #[test]
    fn test_reference_example() {
        let heatmap = Array2::<f32>::zeros((64, 100));
        let spec = pseudo_random_spec(64, 100).into_dyn();

        let fig = plot_spec_heatmap(
            heatmap.view(),
            spec.view(),
            22050.0,
            2,
            3,
            &HeatmapOptions::new(),
        )
        .unwrap();

        assert_eq!(fig.axes()[0].title(), "Label: sad");
        assert_eq!(fig.axes()[1].title(), "Pred: happy");

        let overlay = &fig.axes()[1].layers()[1];
        assert_eq!(overlay.norm.vmin, 0.0);
        assert_eq!(overlay.norm.vmax, 0.0);
    }

    #[test]
    fn test_titles_for_every_label_pair() {
        let heatmap = Array2::<f32>::ones((4, 5));
        let spec = Array2::<f32>::ones((4, 5)).into_dyn();
        let options = HeatmapOptions::new();

        for pred in 0..LABELS.len() {
            for truth in 0..LABELS.len() {
                let fig =
                    plot_spec_heatmap(heatmap.view(), spec.view(), 16000.0, pred, truth, &options)
                        .unwrap();
                assert_eq!(fig.axes()[0].title(), format!("Label: {}", LABELS[truth]));
                assert_eq!(fig.axes()[1].title(), format!("Pred: {}", LABELS[pred]));
            }
        }
    }

    #[test]
    fn test_signed_color_range() {
        let heatmap = Array2::from_shape_fn((8, 10), |(f, t)| f as f32 - t as f32 * 0.5);
        let spec = pseudo_random_spec(8, 10).into_dyn();

        let fig = plot_spec_heatmap(
            heatmap.view(),
            spec.view(),
            22050.0,
            0,
            0,
            &HeatmapOptions::new().with_include_negative(true),
        )
        .unwrap();

        // max |f - t/2| is at f = 7, t = 0
        let overlay = &fig.axes()[1].layers()[1];
        assert_eq!(overlay.norm, Normalize::new(-7.0, 7.0));
        assert_eq!(fig.colorbar().unwrap().norm, Normalize::new(-7.0, 7.0));
    }

    #[test]
    fn test_unsigned_color_range() {
        let heatmap = Array2::from_shape_fn((8, 10), |(f, t)| f as f32 - t as f32 * 0.5);
        let spec = pseudo_random_spec(8, 10).into_dyn();

        let fig = plot_spec_heatmap(
            heatmap.view(),
            spec.view(),
            22050.0,
            0,
            0,
            &HeatmapOptions::new().with_include_negative(false),
        )
        .unwrap();

        let overlay = &fig.axes()[1].layers()[1];
        assert_eq!(overlay.norm, Normalize::new(0.0, 7.0));
    }

    #[test]
    fn test_panel_layers_and_axes() {
        let heatmap = Array2::<f32>::ones((16, 20));
        let spec = pseudo_random_spec(16, 20).into_dyn();
        let fig = plot_spec_heatmap(
            heatmap.view(),
            spec.view(),
            22050.0,
            1,
            1,
            &HeatmapOptions::new(),
        )
        .unwrap();

        let left = &fig.axes()[0];
        assert_eq!(left.layers().len(), 1);
        assert_eq!(left.layers()[0].cmap.name(), "viridis");
        assert_eq!(left.ylabel(), "Hz");
        assert!(!left.yticks().is_empty());

        let right = &fig.axes()[1];
        assert_eq!(right.layers().len(), 2);
        assert_eq!(right.layers()[0].cmap.name(), "Greys_r");
        assert_eq!(right.layers()[1].cmap.name(), "red_transparent_blue");
        assert_eq!(right.layers()[1].alpha, 0.75);
        assert!(right.yticks().is_empty());
        assert_eq!(right.ylabel(), "");
        assert_eq!(right.xlabel(), "Time");
    }

    #[test]
    fn test_colorbar_setup() {
        let heatmap = Array2::<f32>::ones((16, 20));
        let spec = pseudo_random_spec(16, 20).into_dyn();
        let fig = plot_spec_heatmap(
            heatmap.view(),
            spec.view(),
            22050.0,
            1,
            1,
            &HeatmapOptions::new(),
        )
        .unwrap();

        let cb = fig.colorbar().unwrap();
        assert_eq!(cb.label, "Importance");
        assert!(!cb.outline_visible);
        assert!((cb.aspect - 45.0).abs() < 1e-4);
        assert!((cb.rect.width - 0.725).abs() < 1e-6);
        assert!((cb.rect.left - 0.1475).abs() < 1e-6);
        assert_eq!(cb.cmap.stops().len(), 200);
        assert_eq!(cb.alpha, 0.75);
        assert_eq!(fig.size_in(), [9.0, 2.5]);
    }

    #[test]
    fn test_trailing_singleton_spectrogram() {
        let heatmap = Array2::<f32>::zeros((64, 100));
        let spec = Array3::<f32>::ones((64, 100, 1)).into_dyn();

        let fig = plot_spec_heatmap(
            heatmap.view(),
            spec.view(),
            22050.0,
            4,
            5,
            &HeatmapOptions::new(),
        )
        .unwrap();
        assert_eq!(fig.axes()[0].layers()[0].shape(), [64, 100]);
    }

    #[test]
    fn test_out_of_range_prediction() {
        let heatmap = Array2::<f32>::zeros((4, 4));
        let spec = Array2::<f32>::zeros((4, 4)).into_dyn();

        let result = plot_spec_heatmap(
            heatmap.view(),
            spec.view(),
            22050.0,
            8,
            0,
            &HeatmapOptions::new(),
        );
        assert!(matches!(
            result,
            Err(PlotError::LabelIndex { index: 8, len: 8 })
        ));
    }

    #[test]
    fn test_out_of_range_prediction_checked_first() {
        // Both indices bad and the spectrogram malformed: the prediction fails first
        let heatmap = Array2::<f32>::zeros((4, 4));
        let spec = Array3::<f32>::zeros((2, 3, 4)).into_dyn();

        let result = plot_spec_heatmap(
            heatmap.view(),
            spec.view(),
            22050.0,
            9,
            12,
            &HeatmapOptions::new(),
        );
        assert!(matches!(
            result,
            Err(PlotError::LabelIndex { index: 9, .. })
        ));

        let result = plot_spec_heatmap(
            heatmap.view(),
            spec.view(),
            22050.0,
            0,
            12,
            &HeatmapOptions::new(),
        );
        assert!(matches!(
            result,
            Err(PlotError::LabelIndex { index: 12, .. })
        ));
    }

    #[test]
    fn test_shape_mismatch_surfaces_from_display() {
        let heatmap = Array2::<f32>::zeros((64, 50));
        let spec = Array2::<f32>::zeros((64, 100)).into_dyn();

        let result = plot_spec_heatmap(
            heatmap.view(),
            spec.view(),
            22050.0,
            0,
            0,
            &HeatmapOptions::new(),
        );
        assert!(matches!(result, Err(PlotError::ShapeMismatch { .. })));
    }

    #[test]
    fn test_named_cmap_passes_through() {
        let heatmap = Array2::<f32>::ones((4, 4));
        let spec = Array2::<f32>::ones((4, 4)).into_dyn();

        let fig = plot_spec_heatmap(
            heatmap.view(),
            spec.view(),
            22050.0,
            0,
            0,
            &HeatmapOptions::new().with_cmap("Greys"),
        )
        .unwrap();
        assert_eq!(fig.axes()[1].layers()[1].cmap.name(), "Greys");

        let result = plot_spec_heatmap(
            heatmap.view(),
            spec.view(),
            22050.0,
            0,
            0,
            &HeatmapOptions::new().with_cmap("no-such-map"),
        );
        assert!(matches!(result, Err(PlotError::UnknownColormap(_))));
    }

    #[test]
    fn test_inputs_untouched() {
        let heatmap = Array2::from_shape_fn((8, 8), |(f, t)| (f * t) as f32);
        let spec = pseudo_random_spec(8, 8).into_dyn();
        let (heatmap_before, spec_before) = (heatmap.clone(), spec.clone());

        plot_spec_heatmap(
            heatmap.view(),
            spec.view(),
            22050.0,
            0,
            0,
            &HeatmapOptions::new(),
        )
        .unwrap();

        assert_eq!(heatmap, heatmap_before);
        assert_eq!(spec, spec_before);
    }

    #[test]
    fn test_render_reference_example() {
        let heatmap = Array2::from_shape_fn((64, 100), |(f, t)| {
            ((f as f32 - 32.0) / 32.0) * ((t as f32) / 100.0)
        });
        let spec = pseudo_random_spec(64, 100).into_dyn();

        let fig = plot_spec_heatmap(
            heatmap.view(),
            spec.view(),
            22050.0,
            2,
            3,
            &HeatmapOptions::new(),
        )
        .unwrap();

        // 9 x 2.5 in at 100 dpi, extended by the colorbar hanging 0.1 below,
        // plus the same label margin on every side
        let img = fig.render(100.0).unwrap();
        assert!(img.width() > 900);
        assert_eq!(img.width() - 900, img.height() - 275);
    }

    #[test]
    fn test_render_shows_label_names() {
        let heatmap = Array2::from_shape_fn((16, 20), |(f, t)| (f as f32 - t as f32) / 20.0);
        let spec = pseudo_random_spec(16, 20).into_dyn();
        let render = |pred, truth| {
            plot_spec_heatmap(
                heatmap.view(),
                spec.view(),
                22050.0,
                pred,
                truth,
                &HeatmapOptions::new(),
            )
            .unwrap()
            .render(50.0)
            .unwrap()
        };

        let reference = render(2, 3);
        assert_eq!(reference, render(2, 3));
        assert_ne!(reference, render(7, 0));
        assert_ne!(reference, render(2, 4));
    }
}
