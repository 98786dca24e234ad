//! Fixed-grid glyph atlas: packing, texture-space rectangles and metadata.

mod metadata;
mod normalize;
mod packer;

pub(crate) use metadata::{FontMetrics, write_metadata};
pub(crate) use packer::{AtlasLayout, CellSize, GlyphBitmap, GridShape, pack};

#[cfg(test)]
pub(crate) use normalize::{CellRect, TexCoord, cell_rect};
#[cfg(test)]
pub(crate) use packer::LayoutError;
