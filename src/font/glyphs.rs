use serde::{Deserialize, Serialize};

use crate::arena::{Arena, ArenaBlock};
use crate::atlas::CellSize;

use super::{RasterError, Rasterizer, Scale};

/// Contiguous codepoint range baked into the atlas.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GlyphRange {
    /// First codepoint.
    pub base: u32,
    pub count: u32,
}

impl GlyphRange {
    pub fn codepoints(&self) -> impl Iterator<Item = u32> {
        self.base..self.base.saturating_add(self.count)
    }

    pub fn len(&self) -> usize {
        self.count as usize
    }

    /// Last codepoint in the range, if any.
    pub fn last(&self) -> Option<u32> {
        self.count
            .checked_sub(1)
            .and_then(|n| self.base.checked_add(n))
    }
}

impl Default for GlyphRange {
    /// Printable ASCII.
    fn default() -> Self {
        Self { base: 32, count: 96 }
    }
}

/// One rasterized glyph whose coverage lives in the arena.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GlyphRecord {
    pub codepoint: u32,
    pub bitmap: ArenaBlock,
    pub width: u32,
    pub height: u32,
    /// Horizontal advance in pixels.
    pub advance: f32,
}

/// Cell size enclosing every glyph in `range`, measured without rasterizing.
pub fn measure_cell<R: Rasterizer + ?Sized>(
    rasterizer: &R,
    range: GlyphRange,
    scale: Scale,
) -> Result<CellSize, RasterError> {
    let extents = range
        .codepoints()
        .map(|cp| rasterizer.glyph_extent(cp, scale))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(CellSize::enclosing(extents))
}

/// Rasterizes every glyph in `range`, copying each bitmap into `arena`.
///
/// Records come back in codepoint order. The caller owns the scope the
/// bitmaps were pushed into and must not resolve them after closing it.
pub fn rasterize_glyphs<R: Rasterizer + ?Sized>(
    rasterizer: &R,
    range: GlyphRange,
    scale: Scale,
    arena: &mut Arena,
) -> anyhow::Result<Vec<GlyphRecord>> {
    let mut records = Vec::with_capacity(range.len());
    for codepoint in range.codepoints() {
        let coverage = rasterizer.rasterize_codepoint(codepoint, scale)?;
        let expected = coverage.width as usize * coverage.height as usize;
        if coverage.bitmap.len() != expected {
            anyhow::bail!(
                "rasterizer returned {} bytes for a {}x{} glyph (U+{codepoint:04X})",
                coverage.bitmap.len(),
                coverage.width,
                coverage.height
            );
        }
        let record = GlyphRecord {
            codepoint,
            bitmap: arena.push_copy(&coverage.bitmap)?,
            width: coverage.width,
            height: coverage.height,
            advance: rasterizer.horizontal_advance(codepoint, scale)?,
        };
        log::trace!(
            "U+{:04X}: {}x{} advance {:.2}",
            record.codepoint,
            record.width,
            record.height,
            record.advance
        );
        records.push(record);
    }
    Ok(records)
}
