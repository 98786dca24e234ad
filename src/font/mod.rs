//! Glyph rasterization seam.
//!
//! The bake pipeline only talks to [`Rasterizer`]; [`FontdueRasterizer`] is
//! the production implementation and tests drive the pipeline with
//! synthetic glyphs.

mod fontdue_adapter;
mod glyphs;

use std::error::Error;
use std::fmt;

pub(crate) use fontdue_adapter::load_font;
pub(crate) use glyphs::{GlyphRange, measure_cell, rasterize_glyphs};

/// Multiplier from font units to pixels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Scale(pub f32);

/// 8-bit coverage bitmap, `width * height` bytes, rows top to bottom.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Coverage {
    pub width: u32,
    pub height: u32,
    pub bitmap: Vec<u8>,
}

/// Font-wide vertical metrics in pixels. `descent` is negative below the baseline.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct VerticalMetrics {
    pub ascent: f32,
    pub descent: f32,
    pub line_gap: f32,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RasterError {
    /// The codepoint is not a Unicode scalar value.
    InvalidCodepoint(u32),
    /// The font has no horizontal line metrics.
    MissingLineMetrics,
}

impl fmt::Display for RasterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidCodepoint(cp) => write!(f, "U+{cp:04X} is not a valid character"),
            Self::MissingLineMetrics => write!(f, "font has no horizontal line metrics"),
        }
    }
}

impl Error for RasterError {}

/// Produces coverage bitmaps and metrics for single codepoints.
pub trait Rasterizer {
    /// Scale at which the font's ascent-to-descent span is `pixel_height` pixels.
    fn scale_for_pixel_height(&self, pixel_height: f32) -> Result<Scale, RasterError>;

    fn rasterize_codepoint(&self, codepoint: u32, scale: Scale) -> Result<Coverage, RasterError>;

    /// Bitmap `(width, height)` that `rasterize_codepoint` would produce.
    fn glyph_extent(&self, codepoint: u32, scale: Scale) -> Result<(u32, u32), RasterError>;

    fn horizontal_advance(&self, codepoint: u32, scale: Scale) -> Result<f32, RasterError>;

    fn vertical_metrics(&self, scale: Scale) -> Result<VerticalMetrics, RasterError>;
}

pub(crate) fn to_char(codepoint: u32) -> Result<char, RasterError> {
    char::from_u32(codepoint).ok_or(RasterError::InvalidCodepoint(codepoint))
}
