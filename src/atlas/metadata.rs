//! Text metadata written next to the atlas image.
//!
//! Cell rectangles are emitted bottom row first (row `R-1` down to `0`),
//! columns ascending, while the atlas pixels are written top row first.
//! Consumers with a bottom-up vertical axis depend on this order.

use std::io::{self, Write};

use super::normalize::{CellRect, cell_rect};
use super::packer::AtlasLayout;

/// Font-wide metrics in pixels, rounded to integers.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FontMetrics {
    pub ascent: i32,
    pub descent: i32,
    pub line_gap: i32,
    /// Advance of the representative glyph.
    pub advance: i32,
}

/// Cells `(col, row)` in emission order.
pub fn emission_order(layout: &AtlasLayout) -> impl Iterator<Item = (u32, u32)> {
    let columns = layout.grid.columns;
    (0..layout.grid.rows)
        .rev()
        .flat_map(move |row| (0..columns).map(move |col| (col, row)))
}

/// Rectangles in the order they appear in the metadata.
pub fn emitted_rects(layout: &AtlasLayout) -> Vec<CellRect> {
    emission_order(layout)
        .map(|(col, row)| cell_rect(layout, col, row))
        .collect()
}

pub fn write_metadata<W: Write + ?Sized>(
    out: &mut W,
    glyph_count: usize,
    metrics: &FontMetrics,
    layout: &AtlasLayout,
) -> io::Result<()> {
    writeln!(out, "num_char {glyph_count}")?;
    writeln!(out, "ascent {}", metrics.ascent)?;
    writeln!(out, "descent {}", metrics.descent)?;
    writeln!(out, "linegap {}", metrics.line_gap)?;
    writeln!(out, "advance {}", metrics.advance)?;
    writeln!(out, "max_width {}", layout.cell.width)?;
    writeln!(out, "max_height {}", layout.cell.height)?;
    for rect in emitted_rects(layout) {
        writeln!(
            out,
            "min {:.6} {:.6} max {:.6} {:.6}",
            rect.min.x, rect.min.y, rect.max.x, rect.max.y
        )?;
    }
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/atlas_metadata.rs"]
mod tests;
