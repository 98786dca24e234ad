//! Texture-space rectangles for atlas cells.
//!
//! Rectangles always span the whole cell, not the glyph's tight bounds; the
//! glyph sits in the top-left of its cell and the rest samples as transparent.

use super::packer::AtlasLayout;

/// Point in normalized `[0, 1]` texture space.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct TexCoord {
    pub x: f32,
    pub y: f32,
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct CellRect {
    pub min: TexCoord,
    pub max: TexCoord,
}

/// Rectangle covering cell `(col, row)`.
///
/// Numerators are integer pixel offsets, so neighbouring cells share
/// bit-identical edges.
pub fn cell_rect(layout: &AtlasLayout, col: u32, row: u32) -> CellRect {
    let atlas_w = layout.width() as f32;
    let atlas_h = layout.height() as f32;
    let cell_w = u64::from(layout.cell.width);
    let cell_h = u64::from(layout.cell.height);
    let min_x = u64::from(col) * cell_w;
    let min_y = u64::from(row) * cell_h;
    CellRect {
        min: TexCoord {
            x: min_x as f32 / atlas_w,
            y: min_y as f32 / atlas_h,
        },
        max: TexCoord {
            x: (min_x + cell_w) as f32 / atlas_w,
            y: (min_y + cell_h) as f32 / atlas_h,
        },
    }
}

/// All cell rectangles in atlas pixel order (row 0 first, columns ascending).
#[cfg(test)]
pub fn cell_rects(layout: &AtlasLayout) -> Vec<CellRect> {
    let mut rects = Vec::with_capacity(layout.grid.capacity());
    for row in 0..layout.grid.rows {
        for col in 0..layout.grid.columns {
            rects.push(cell_rect(layout, col, row));
        }
    }
    rects
}
