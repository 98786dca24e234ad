//! Fixed-grid atlas packing.
//!
//! Every glyph gets one cell of identical size (the largest glyph extent in
//! the set). Glyph `i` lands in column `i % columns`, row `i / columns`, with
//! row 0 at the top of the pixel buffer.

use std::error::Error;
use std::fmt;

use serde::{Deserialize, Serialize};

/// RGBA8.
pub const BYTES_PER_PIXEL: usize = 4;

/// Number of cell columns and rows in the atlas.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridShape {
    pub columns: u32,
    pub rows: u32,
}

impl GridShape {
    pub fn capacity(&self) -> usize {
        self.columns as usize * self.rows as usize
    }

    /// Cell `(col, row)` occupied by the glyph at linear `index`.
    pub fn cell_of(&self, index: usize) -> (u32, u32) {
        let columns = self.columns as usize;
        ((index % columns) as u32, (index / columns) as u32)
    }
}

impl Default for GridShape {
    fn default() -> Self {
        Self {
            columns: 16,
            rows: 6,
        }
    }
}

/// Pixel size of one grid cell.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CellSize {
    pub width: u32,
    pub height: u32,
}

impl CellSize {
    /// Smallest cell that holds every `(width, height)` extent.
    pub fn enclosing(extents: impl IntoIterator<Item = (u32, u32)>) -> Self {
        extents
            .into_iter()
            .fold(Self::default(), |cell, (w, h)| Self {
                width: cell.width.max(w),
                height: cell.height.max(h),
            })
    }

    pub fn fits(&self, width: u32, height: u32) -> bool {
        width <= self.width && height <= self.height
    }
}

/// Grid shape plus cell size: everything needed to address atlas pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AtlasLayout {
    pub grid: GridShape,
    pub cell: CellSize,
    width: u32,
    height: u32,
    byte_len: usize,
}

impl AtlasLayout {
    pub fn new(grid: GridShape, cell: CellSize) -> Result<Self, LayoutError> {
        if grid.columns == 0 || grid.rows == 0 || cell.width == 0 || cell.height == 0 {
            return Err(LayoutError::EmptyLayout { grid, cell });
        }
        let too_large = LayoutError::TooLarge { grid, cell };
        let width = grid.columns.checked_mul(cell.width).ok_or(too_large.clone())?;
        let height = grid.rows.checked_mul(cell.height).ok_or(too_large.clone())?;
        let byte_len = (width as usize)
            .checked_mul(height as usize)
            .and_then(|px| px.checked_mul(BYTES_PER_PIXEL))
            .ok_or(too_large)?;
        Ok(Self {
            grid,
            cell,
            width,
            height,
            byte_len,
        })
    }

    /// Atlas width in pixels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Atlas height in pixels.
    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn byte_len(&self) -> usize {
        self.byte_len
    }

    /// Top-left pixel of cell `(col, row)`.
    pub fn cell_origin(&self, col: u32, row: u32) -> (usize, usize) {
        (
            col as usize * self.cell.width as usize,
            row as usize * self.cell.height as usize,
        )
    }
}

/// Layout violations detected before any pixel is written.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LayoutError {
    /// Grid or cell has a zero dimension.
    EmptyLayout { grid: GridShape, cell: CellSize },
    /// Atlas dimensions or byte length overflow.
    TooLarge { grid: GridShape, cell: CellSize },
    /// More glyphs than grid cells.
    GridTooSmall { glyphs: usize, capacity: usize },
    /// A glyph bitmap is larger than the cell it is assigned to.
    GlyphExceedsCell {
        index: usize,
        width: u32,
        height: u32,
        cell: CellSize,
    },
    /// Coverage slice length does not match `width * height`.
    BitmapSize {
        index: usize,
        expected: usize,
        actual: usize,
    },
    /// Destination buffer does not match the layout's byte length.
    BufferSize { expected: usize, actual: usize },
}

impl fmt::Display for LayoutError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyLayout { grid, cell } => write!(
                f,
                "empty atlas layout: {}x{} grid of {}x{} cells",
                grid.columns, grid.rows, cell.width, cell.height
            ),
            Self::TooLarge { grid, cell } => write!(
                f,
                "atlas too large: {}x{} grid of {}x{} cells",
                grid.columns, grid.rows, cell.width, cell.height
            ),
            Self::GridTooSmall { glyphs, capacity } => {
                write!(f, "{glyphs} glyphs do not fit in a grid of {capacity} cells")
            }
            Self::GlyphExceedsCell {
                index,
                width,
                height,
                cell,
            } => write!(
                f,
                "glyph {index} is {width}x{height} which exceeds the {}x{} cell",
                cell.width, cell.height
            ),
            Self::BitmapSize {
                index,
                expected,
                actual,
            } => write!(
                f,
                "glyph {index} bitmap has {actual} bytes, expected {expected}"
            ),
            Self::BufferSize { expected, actual } => {
                write!(f, "atlas buffer has {actual} bytes, expected {expected}")
            }
        }
    }
}

impl Error for LayoutError {}

/// One glyph's coverage as seen by the packer.
#[derive(Clone, Copy, Debug)]
pub struct GlyphBitmap<'a> {
    pub coverage: &'a [u8],
    pub width: u32,
    pub height: u32,
}

/// Expands one coverage byte into an RGBA pixel; coverage doubles as alpha.
#[inline]
pub fn coverage_to_rgba(v: u8) -> [u8; BYTES_PER_PIXEL] {
    [v, v, v, v]
}

/// Copies a coverage bitmap into `dst` with its top-left at `origin`.
///
/// `dst` is an RGBA8 buffer `pitch_px` pixels wide. The caller guarantees the
/// bitmap fits; out-of-range writes panic on slice indexing.
pub fn blit_glyph(
    dst: &mut [u8],
    pitch_px: usize,
    origin: (usize, usize),
    coverage: &[u8],
    width: usize,
    height: usize,
) {
    let (origin_x, origin_y) = origin;
    for y in 0..height {
        let src_row = &coverage[y * width..(y + 1) * width];
        let row_start = ((origin_y + y) * pitch_px + origin_x) * BYTES_PER_PIXEL;
        let dst_row = &mut dst[row_start..row_start + width * BYTES_PER_PIXEL];
        for (px, &v) in dst_row.chunks_exact_mut(BYTES_PER_PIXEL).zip(src_row) {
            px.copy_from_slice(&coverage_to_rgba(v));
        }
    }
}

/// Blits every glyph into its grid cell of `dst`.
///
/// Everything is validated up front so a violation never leaves a
/// half-written atlas. Glyph `i` goes to `grid.cell_of(i)`; cells without a
/// glyph are left untouched.
pub fn pack(
    layout: &AtlasLayout,
    dst: &mut [u8],
    glyphs: &[GlyphBitmap<'_>],
) -> Result<(), LayoutError> {
    if dst.len() != layout.byte_len() {
        return Err(LayoutError::BufferSize {
            expected: layout.byte_len(),
            actual: dst.len(),
        });
    }
    if glyphs.len() > layout.grid.capacity() {
        return Err(LayoutError::GridTooSmall {
            glyphs: glyphs.len(),
            capacity: layout.grid.capacity(),
        });
    }
    for (index, glyph) in glyphs.iter().enumerate() {
        if !layout.cell.fits(glyph.width, glyph.height) {
            return Err(LayoutError::GlyphExceedsCell {
                index,
                width: glyph.width,
                height: glyph.height,
                cell: layout.cell,
            });
        }
        let expected = glyph.width as usize * glyph.height as usize;
        if glyph.coverage.len() != expected {
            return Err(LayoutError::BitmapSize {
                index,
                expected,
                actual: glyph.coverage.len(),
            });
        }
    }

    let pitch = layout.width() as usize;
    for (index, glyph) in glyphs.iter().enumerate() {
        let (col, row) = layout.grid.cell_of(index);
        blit_glyph(
            dst,
            pitch,
            layout.cell_origin(col, row),
            glyph.coverage,
            glyph.width as usize,
            glyph.height as usize,
        );
    }
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/atlas_packer.rs"]
mod tests;
