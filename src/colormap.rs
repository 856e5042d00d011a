//! Colormaps and value normalization.
//!
//! A colormap is a list of evenly spaced RGBA stops (components in 0.0-1.0)
//! sampled with linear interpolation. Values reach a colormap through a
//! [`Normalize`] that maps the data range onto [0, 1].

use std::cmp::Ordering;

use ndarray::ArrayView2;

use crate::error::PlotError;

/// RGBA color with components in 0.0-1.0
pub type Rgba = [f32; 4];

/// Blue end of the attribution colormap (negative importance)
const ATTRIBUTION_BLUE: [f32; 3] = [30.0 / 255.0, 136.0 / 255.0, 229.0 / 255.0];

/// Red end of the attribution colormap (positive importance)
const ATTRIBUTION_RED: [f32; 3] = [1.0, 13.0 / 255.0, 87.0 / 255.0];

/// Stops per half of the attribution colormap
const ATTRIBUTION_HALF_STOPS: usize = 100;

/// Viridis sampled at nine evenly spaced positions
const VIRIDIS_ANCHORS: [Rgba; 9] = [
    [0.267, 0.004, 0.329, 1.0],
    [0.278, 0.176, 0.482, 1.0],
    [0.231, 0.322, 0.545, 1.0],
    [0.173, 0.447, 0.557, 1.0],
    [0.129, 0.569, 0.549, 1.0],
    [0.157, 0.682, 0.502, 1.0],
    [0.369, 0.788, 0.384, 1.0],
    [0.678, 0.863, 0.188, 1.0],
    [0.992, 0.906, 0.145, 1.0],
];

/// Linearly interpolated colormap over evenly spaced stops
#[derive(Debug, Clone, PartialEq)]
pub struct Colormap {
    name: String,
    stops: Vec<Rgba>,
}

impl Colormap {
    /// Build a colormap from a list of colors spread evenly over [0, 1]
    ///
    /// A single color yields a flat colormap.
    pub fn from_list(name: impl Into<String>, stops: Vec<Rgba>) -> Result<Self, PlotError> {
        let name = name.into();
        let stops = match stops.len() {
            0 => {
                return Err(PlotError::InvalidParams(format!(
                    "colormap '{}' needs at least one color",
                    name
                )))
            }
            1 => vec![stops[0], stops[0]],
            _ => stops,
        };
        Ok(Self { name, stops })
    }

    /// Diverging blue → transparent → red scheme used for attribution maps
    ///
    /// 100 blue stops fading from opaque to transparent, then 100 red stops
    /// fading back in.
    pub fn red_transparent_blue() -> Self {
        let [br, bg, bb] = ATTRIBUTION_BLUE;
        let [rr, rg, rb] = ATTRIBUTION_RED;

        let mut stops = Vec::with_capacity(ATTRIBUTION_HALF_STOPS * 2);
        stops.extend(linspace(1.0, 0.0, ATTRIBUTION_HALF_STOPS).map(|a| [br, bg, bb, a]));
        stops.extend(linspace(0.0, 1.0, ATTRIBUTION_HALF_STOPS).map(|a| [rr, rg, rb, a]));

        Self {
            name: "red_transparent_blue".to_string(),
            stops,
        }
    }

    pub fn viridis() -> Self {
        Self {
            name: "viridis".to_string(),
            stops: VIRIDIS_ANCHORS.to_vec(),
        }
    }

    /// Black to white
    pub fn greys_r() -> Self {
        Self {
            name: "Greys_r".to_string(),
            stops: vec![[0.0, 0.0, 0.0, 1.0], [1.0, 1.0, 1.0, 1.0]],
        }
    }

    /// White to black
    pub fn greys() -> Self {
        Self {
            name: "Greys".to_string(),
            stops: vec![[1.0, 1.0, 1.0, 1.0], [0.0, 0.0, 0.0, 1.0]],
        }
    }

    /// Look up a built-in colormap by name
    pub fn by_name(name: &str) -> Result<Self, PlotError> {
        match name {
            "viridis" => Ok(Self::viridis()),
            "Greys_r" => Ok(Self::greys_r()),
            "gray" => Ok(Self {
                name: "gray".to_string(),
                ..Self::greys_r()
            }),
            "Greys" => Ok(Self::greys()),
            "red_transparent_blue" => Ok(Self::red_transparent_blue()),
            other => Err(PlotError::UnknownColormap(other.to_string())),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn stops(&self) -> &[Rgba] {
        &self.stops
    }

    /// Color at position `t` (clamped to [0, 1]); NaN maps to transparent
    pub fn sample(&self, t: f32) -> Rgba {
        if t.is_nan() {
            return [0.0; 4];
        }
        let last = self.stops.len() - 1;
        let pos = t.clamp(0.0, 1.0) * last as f32;
        let i = pos.floor() as usize;
        if i >= last {
            return self.stops[last];
        }

        let frac = pos - i as f32;
        let (a, b) = (self.stops[i], self.stops[i + 1]);
        [
            a[0] + (b[0] - a[0]) * frac,
            a[1] + (b[1] - a[1]) * frac,
            a[2] + (b[2] - a[2]) * frac,
            a[3] + (b[3] - a[3]) * frac,
        ]
    }
}

/// Colormap choice for the importance overlay
#[derive(Debug, Clone, PartialEq, Default)]
pub enum CmapSpec {
    /// Built-in red/transparent/blue attribution scheme
    #[default]
    Shap,

    /// Any colormap known to [`Colormap::by_name`]
    Named(String),

    /// Caller-built colormap, used as is
    Custom(Colormap),
}

impl CmapSpec {
    /// Colormap to draw with
    pub fn resolve(&self) -> Result<Colormap, PlotError> {
        match self {
            CmapSpec::Shap => Ok(Colormap::red_transparent_blue()),
            CmapSpec::Named(name) => Colormap::by_name(name),
            CmapSpec::Custom(cmap) => Ok(cmap.clone()),
        }
    }
}

impl From<&str> for CmapSpec {
    fn from(name: &str) -> Self {
        match name {
            "shap" => CmapSpec::Shap,
            other => CmapSpec::Named(other.to_string()),
        }
    }
}

impl From<Colormap> for CmapSpec {
    fn from(cmap: Colormap) -> Self {
        CmapSpec::Custom(cmap)
    }
}

/// Linear mapping of [vmin, vmax] onto [0, 1]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Normalize {
    pub vmin: f32,
    pub vmax: f32,
}

impl Normalize {
    pub fn new(vmin: f32, vmax: f32) -> Self {
        Self { vmin, vmax }
    }

    /// Scale to the finite min/max of `data` ([0, 0] when nothing is finite)
    pub fn autoscale<'a>(data: impl IntoIterator<Item = &'a f32>) -> Self {
        let mut range: Option<(f32, f32)> = None;
        for &v in data.into_iter().filter(|v| v.is_finite()) {
            range = Some(match range {
                Some((lo, hi)) => (lo.min(v), hi.max(v)),
                None => (v, v),
            });
        }
        let (vmin, vmax) = range.unwrap_or((0.0, 0.0));
        Self { vmin, vmax }
    }

    /// A collapsed range maps every value to 0.0
    pub fn is_degenerate(&self) -> bool {
        self.vmax.partial_cmp(&self.vmin) != Some(Ordering::Greater)
    }

    /// Map a value into colormap space (not clipped; NaN stays NaN)
    pub fn apply(&self, value: f32) -> f32 {
        if value.is_nan() {
            return f32::NAN;
        }
        if self.is_degenerate() {
            return 0.0;
        }
        (value - self.vmin) / (self.vmax - self.vmin)
    }
}

/// Color limits for an importance heatmap
///
/// `lim` is the largest absolute value in the heatmap (0 when it is empty
/// or has no finite values). Signed heatmaps get [-lim, lim], unsigned ones
/// [0, lim].
pub fn importance_limits(heatmap: ArrayView2<f32>, include_negative: bool) -> Normalize {
    let lim = heatmap.iter().fold(0.0f32, |m, v| m.max(v.abs()));
    if include_negative {
        Normalize::new(-lim, lim)
    } else {
        Normalize::new(0.0, lim)
    }
}

/// `n` evenly spaced values from `start` to `end` inclusive
fn linspace(start: f32, end: f32, n: usize) -> impl Iterator<Item = f32> {
    let step = if n > 1 {
        (end - start) / (n - 1) as f32
    } else {
        0.0
    };
    (0..n).map(move |i| if i + 1 == n { end } else { start + step * i as f32 })
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{array, Array2};

    #[test]
    fn test_attribution_colormap_has_200_stops() {
        let cmap = Colormap::red_transparent_blue();
        assert_eq!(cmap.stops().len(), 200);
        assert_eq!(cmap.name(), "red_transparent_blue");
    }

    #[test]
    fn test_attribution_colormap_alpha_ramps() {
        let cmap = Colormap::red_transparent_blue();
        let (blue, red) = cmap.stops().split_at(100);

        assert_eq!(blue[0][3], 1.0);
        assert_eq!(blue[99][3], 0.0);
        assert!(blue.windows(2).all(|w| w[1][3] < w[0][3]));

        assert_eq!(red[0][3], 0.0);
        assert_eq!(red[99][3], 1.0);
        assert!(red.windows(2).all(|w| w[1][3] > w[0][3]));
    }

    #[test]
    fn test_attribution_colormap_colors() {
        let cmap = Colormap::red_transparent_blue();
        let first = cmap.sample(0.0);
        let last = cmap.sample(1.0);

        assert!((first[0] - 30.0 / 255.0).abs() < 1e-6);
        assert!((first[1] - 136.0 / 255.0).abs() < 1e-6);
        assert!((first[2] - 229.0 / 255.0).abs() < 1e-6);
        assert_eq!(first[3], 1.0);

        assert_eq!(last[0], 1.0);
        assert!((last[1] - 13.0 / 255.0).abs() < 1e-6);
        assert!((last[2] - 87.0 / 255.0).abs() < 1e-6);
        assert_eq!(last[3], 1.0);

        // Midpoint is fully transparent
        assert!(cmap.sample(0.5)[3] < 1e-6);
    }

    #[test]
    fn test_sample_interpolates_and_clamps() {
        let cmap = Colormap::greys_r();
        let mid = cmap.sample(0.5);
        assert!((mid[0] - 0.5).abs() < 1e-6);
        assert_eq!(cmap.sample(-3.0), [0.0, 0.0, 0.0, 1.0]);
        assert_eq!(cmap.sample(7.0), [1.0, 1.0, 1.0, 1.0]);
        assert_eq!(cmap.sample(f32::NAN), [0.0; 4]);
    }

    #[test]
    fn test_from_list() {
        let flat = Colormap::from_list("flat", vec![[0.2, 0.4, 0.6, 1.0]]).unwrap();
        assert_eq!(flat.sample(0.0), flat.sample(1.0));

        assert!(matches!(
            Colormap::from_list("empty", Vec::new()),
            Err(PlotError::InvalidParams(_))
        ));
    }

    #[test]
    fn test_registry_lookup() {
        assert_eq!(Colormap::by_name("viridis").unwrap().name(), "viridis");
        assert_eq!(Colormap::by_name("Greys_r").unwrap().name(), "Greys_r");
        assert_eq!(Colormap::by_name("gray").unwrap().stops(), Colormap::greys_r().stops());
        assert!(matches!(
            Colormap::by_name("plasma-ish"),
            Err(PlotError::UnknownColormap(name)) if name == "plasma-ish"
        ));
    }

    #[test]
    fn test_cmap_spec_resolution() {
        assert_eq!(CmapSpec::default(), CmapSpec::Shap);
        assert_eq!(CmapSpec::from("shap"), CmapSpec::Shap);
        assert_eq!(
            CmapSpec::from("viridis").resolve().unwrap(),
            Colormap::viridis()
        );
        assert_eq!(
            CmapSpec::Shap.resolve().unwrap().stops().len(),
            200
        );

        let custom = Colormap::from_list("mine", vec![[1.0, 0.0, 0.0, 1.0]]).unwrap();
        assert_eq!(CmapSpec::from(custom.clone()).resolve().unwrap(), custom);
    }

    #[test]
    fn test_normalize() {
        let norm = Normalize::new(-2.0, 2.0);
        assert_eq!(norm.apply(-2.0), 0.0);
        assert_eq!(norm.apply(0.0), 0.5);
        assert_eq!(norm.apply(2.0), 1.0);
        assert!(norm.apply(f32::NAN).is_nan());

        let degenerate = Normalize::new(0.0, 0.0);
        assert!(degenerate.is_degenerate());
        assert_eq!(degenerate.apply(5.0), 0.0);
    }

    #[test]
    fn test_autoscale_skips_non_finite() {
        let data = [3.0, f32::NAN, -1.0, f32::INFINITY];
        let norm = Normalize::autoscale(data.iter());
        assert_eq!(norm, Normalize::new(-1.0, 3.0));

        let empty: [f32; 0] = [];
        assert_eq!(Normalize::autoscale(empty.iter()), Normalize::new(0.0, 0.0));
    }

    #[test]
    fn test_importance_limits() {
        let heatmap = array![[0.5f32, -2.0], [1.0, 0.25]];

        let signed = importance_limits(heatmap.view(), true);
        assert_eq!(signed, Normalize::new(-2.0, 2.0));

        let unsigned = importance_limits(heatmap.view(), false);
        assert_eq!(unsigned, Normalize::new(0.0, 2.0));
    }

    #[test]
    fn test_importance_limits_degenerate() {
        let zeros = Array2::<f32>::zeros((64, 100));
        let norm = importance_limits(zeros.view(), true);
        assert_eq!(norm.vmin, 0.0);
        assert_eq!(norm.vmax, 0.0);

        let empty = Array2::<f32>::zeros((0, 0));
        assert_eq!(importance_limits(empty.view(), false), Normalize::new(0.0, 0.0));
    }

    #[test]
    fn test_linspace_endpoints() {
        let v: Vec<f32> = linspace(1.0, 0.0, 100).collect();
        assert_eq!(v.len(), 100);
        assert_eq!(v[0], 1.0);
        assert_eq!(v[99], 0.0);
    }
}
