//! Figure and colorbar layout.

use crate::error::PlotError;
use crate::figure::Rect;

/// Spacing of the subplot grid inside the figure (figure fractions)
#[derive(Debug, Clone, PartialEq)]
pub struct SubplotParams {
    /// Left edge of the grid
    pub left: f32,

    /// Right edge of the grid
    pub right: f32,

    /// Bottom edge of the grid
    pub bottom: f32,

    /// Top edge of the grid
    pub top: f32,

    /// Horizontal gap between panels, as a fraction of the mean panel width
    pub wspace: f32,

    /// Vertical gap between panels, as a fraction of the mean panel height
    pub hspace: f32,
}

impl Default for SubplotParams {
    fn default() -> Self {
        Self {
            left: 0.125,
            right: 0.9,
            bottom: 0.11,
            top: 0.88,
            wspace: 0.2,
            hspace: 0.2,
        }
    }
}

/// Overall figure geometry, including the importance colorbar
#[derive(Debug, Clone, PartialEq)]
pub struct FigureLayout {
    /// Figure size [width, height] (inches)
    pub figsize_in: [f32; 2],

    /// Panel grid spacing
    pub subplot: SubplotParams,

    /// Colorbar width (fraction of figure width)
    pub colorbar_width: f32,

    /// Shift of the centered colorbar to the right (figure fraction)
    pub colorbar_nudge: f32,

    /// Colorbar bottom edge (figure fraction, negative = below the figure)
    pub colorbar_bottom: f32,

    /// Colorbar thickness (figure fraction)
    pub colorbar_height: f32,

    /// Colorbar aspect is figure width (inches) divided by this value
    pub colorbar_aspect_divisor: f32,

    /// Text under the colorbar
    pub colorbar_label: String,
}

impl Default for FigureLayout {
    fn default() -> Self {
        Self {
            figsize_in: [9.0, 2.5],
            subplot: SubplotParams::default(),
            colorbar_width: 0.725,
            colorbar_nudge: 0.01,
            colorbar_bottom: -0.1,
            colorbar_height: 0.03,
            colorbar_aspect_divisor: 0.2,
            colorbar_label: "Importance".to_string(),
        }
    }
}

impl FigureLayout {
    /// Colorbar axes, centered horizontally then nudged right
    pub fn colorbar_rect(&self) -> Rect {
        let left = (1.0 - self.colorbar_width) / 2.0 + self.colorbar_nudge;
        Rect::new(
            left,
            self.colorbar_bottom,
            self.colorbar_width,
            self.colorbar_height,
        )
    }

    /// Long-to-short side ratio of the colorbar, proportional to figure width
    pub fn colorbar_aspect(&self) -> f32 {
        self.figsize_in[0] / self.colorbar_aspect_divisor
    }

    /// Validate layout (positive sizes, ordered grid edges)
    pub fn validate(&self) -> Result<(), PlotError> {
        let [w, h] = self.figsize_in;
        if !(w > 0.0 && h > 0.0) {
            return Err(PlotError::InvalidParams(format!(
                "figure size must be positive, got {}x{}",
                w, h
            )));
        }
        let s = &self.subplot;
        if s.left >= s.right || s.bottom >= s.top {
            return Err(PlotError::InvalidParams(format!(
                "subplot edges out of order: left={} right={} bottom={} top={}",
                s.left, s.right, s.bottom, s.top
            )));
        }
        if s.wspace < 0.0 || s.hspace < 0.0 {
            return Err(PlotError::InvalidParams(
                "subplot spacing must be >= 0".to_string(),
            ));
        }
        if !(self.colorbar_width > 0.0 && self.colorbar_height > 0.0) {
            return Err(PlotError::InvalidParams(
                "colorbar width and height must be > 0".to_string(),
            ));
        }
        if self.colorbar_aspect_divisor <= 0.0 {
            return Err(PlotError::InvalidParams(
                "colorbar aspect divisor must be > 0".to_string(),
            ));
        }
        Ok(())
    }
}
