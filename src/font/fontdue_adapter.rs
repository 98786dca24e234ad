use std::fs::File;
use std::io::Read;
use std::path::Path;

use anyhow::{Context, anyhow};
use fontdue::{Font, FontSettings};

use crate::arena::Arena;

use super::{Coverage, RasterError, Rasterizer, Scale, VerticalMetrics, to_char};

/// [`Rasterizer`] backed by a parsed `fontdue` font.
pub struct FontdueRasterizer {
    font: Font,
}

impl FontdueRasterizer {
    pub fn from_bytes(bytes: &[u8]) -> anyhow::Result<Self> {
        let font = Font::from_bytes(bytes, FontSettings::default())
            .map_err(|e| anyhow!("failed to parse font: {e}"))?;
        Ok(Self { font })
    }

    /// Pixel em size for `scale`; fontdue sizes glyphs by em, not by scale.
    fn px(&self, scale: Scale) -> f32 {
        scale.0 * self.font.units_per_em()
    }
}

impl Rasterizer for FontdueRasterizer {
    fn scale_for_pixel_height(&self, pixel_height: f32) -> Result<Scale, RasterError> {
        // At px == units_per_em fontdue reports metrics in raw font units.
        let raw = self
            .font
            .horizontal_line_metrics(self.font.units_per_em())
            .ok_or(RasterError::MissingLineMetrics)?;
        Ok(Scale(pixel_height / (raw.ascent - raw.descent)))
    }

    fn rasterize_codepoint(&self, codepoint: u32, scale: Scale) -> Result<Coverage, RasterError> {
        let (metrics, bitmap) = self.font.rasterize(to_char(codepoint)?, self.px(scale));
        Ok(Coverage {
            width: metrics.width as u32,
            height: metrics.height as u32,
            bitmap,
        })
    }

    fn glyph_extent(&self, codepoint: u32, scale: Scale) -> Result<(u32, u32), RasterError> {
        let metrics = self.font.metrics(to_char(codepoint)?, self.px(scale));
        Ok((metrics.width as u32, metrics.height as u32))
    }

    fn horizontal_advance(&self, codepoint: u32, scale: Scale) -> Result<f32, RasterError> {
        let metrics = self.font.metrics(to_char(codepoint)?, self.px(scale));
        Ok(metrics.advance_width)
    }

    fn vertical_metrics(&self, scale: Scale) -> Result<VerticalMetrics, RasterError> {
        let line = self
            .font
            .horizontal_line_metrics(self.px(scale))
            .ok_or(RasterError::MissingLineMetrics)?;
        Ok(VerticalMetrics {
            ascent: line.ascent,
            descent: line.descent,
            line_gap: line.line_gap,
        })
    }
}

/// Reads the font file into a temporary arena scope and parses it.
///
/// The parsed font owns its outlines, so the file bytes are released (and
/// zeroed) before this returns.
pub fn load_font(arena: &mut Arena, path: &Path) -> anyhow::Result<FontdueRasterizer> {
    let mut file =
        File::open(path).with_context(|| format!("failed to open {}", path.display()))?;
    let file_len = file
        .metadata()
        .with_context(|| format!("failed to stat {}", path.display()))?
        .len();
    let file_len = usize::try_from(file_len)
        .with_context(|| format!("{} is too large", path.display()))?;

    let scope = arena.begin_temp();
    let parsed = read_into_arena(arena, &mut file, file_len, path);
    arena.end_temp(scope)?;
    let rasterizer = parsed?;

    log::info!("Loaded font {} ({file_len} bytes)", path.display());
    Ok(rasterizer)
}

fn read_into_arena(
    arena: &mut Arena,
    file: &mut File,
    file_len: usize,
    path: &Path,
) -> anyhow::Result<FontdueRasterizer> {
    let block = arena.push(file_len)?;
    file.read_exact(arena.bytes_mut(&block)?)
        .with_context(|| format!("failed to read {}", path.display()))?;
    FontdueRasterizer::from_bytes(arena.bytes(&block)?)
        .with_context(|| format!("failed to load font {}", path.display()))
}

#[cfg(test)]
#[path = "../../tests/unit/font_fontdue.rs"]
mod tests;
