//! Parameter definitions with units and documented semantics.
//!
//! All layout constants live here with:
//! - Units (inches, figure fractions, Hz, samples)
//! - Documented ranges and meanings
//! - A `validate` check run before a figure is built

mod display;
mod layout;

// Re-export all types
pub use display::DisplayConfig;
pub use layout::{FigureLayout, SubplotParams};
