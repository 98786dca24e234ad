//! The bake pipeline: font → glyph bitmaps → packed atlas → image + metadata.

use std::fs::File;
use std::io::{BufWriter, Write};

use anyhow::Context;

use crate::arena::{Arena, ArenaBlock, ArenaError};
use crate::atlas::{self, AtlasLayout, FontMetrics, GlyphBitmap};
use crate::config::BakeConfig;
use crate::font::{self, Rasterizer, Scale};
use crate::sink::{ImageFileSink, ImageSink};

/// What a finished bake produced.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BakeSummary {
    pub layout: AtlasLayout,
    pub metrics: FontMetrics,
    pub glyph_count: usize,
    /// Arena bytes still held after the bake (the atlas plus slack from earlier pushes).
    pub arena_used: usize,
}

/// Runs the whole bake described by `config`, writing both output files.
pub fn run(config: &BakeConfig) -> anyhow::Result<BakeSummary> {
    let mut arena = Arena::new(config.arena.size_bytes)?;
    let rasterizer = font::load_font(&mut arena, &config.font.path)?;

    let mut sink = ImageFileSink::new(&config.output.atlas);
    let metadata_path = &config.output.metadata;
    let file = File::create(metadata_path)
        .with_context(|| format!("failed to create {}", metadata_path.display()))?;
    let mut metadata = BufWriter::new(file);

    let summary = bake(config, &mut arena, &rasterizer, &mut sink, &mut metadata)?;
    metadata
        .flush()
        .with_context(|| format!("failed to write {}", metadata_path.display()))?;
    log::info!("Wrote metadata {}", metadata_path.display());
    Ok(summary)
}

/// Bakes with an already-loaded rasterizer into arbitrary outputs.
///
/// Arena order: the atlas is pushed as long-lived memory first, then glyph
/// bitmaps go into a temporary scope above it that is closed once every
/// glyph has been blitted.
pub fn bake<R, S, W>(
    config: &BakeConfig,
    arena: &mut Arena,
    rasterizer: &R,
    sink: &mut S,
    metadata: &mut W,
) -> anyhow::Result<BakeSummary>
where
    R: Rasterizer + ?Sized,
    S: ImageSink + ?Sized,
    W: Write + ?Sized,
{
    let scale = rasterizer.scale_for_pixel_height(config.font.pixel_height)?;
    let cell = font::measure_cell(rasterizer, config.glyphs, scale)?;
    let layout = AtlasLayout::new(config.grid, cell)?;

    log::info!("glyph bitmap w:{}, h:{}", cell.width, cell.height);
    log::info!("atlas w:{}, h:{}", layout.width(), layout.height());
    log::info!("size: {}", layout.byte_len());

    let atlas_block = arena.push(layout.byte_len())?;

    let glyph_scope = arena.begin_temp();
    let packed = rasterize_into_atlas(config, arena, rasterizer, scale, &layout, &atlas_block);
    log::debug!(
        "arena: {} of {} bytes used at peak (scope depth {})",
        arena.used(),
        arena.capacity(),
        arena.depth()
    );
    arena.trace_dump();
    arena.end_temp(glyph_scope)?;
    let glyph_count = packed?;

    sink.write_rgba(layout.width(), layout.height(), arena.bytes(&atlas_block)?)?;

    let vertical = rasterizer.vertical_metrics(scale)?;
    let advance_cp = u32::from(config.font.advance_char);
    let metrics = FontMetrics {
        ascent: vertical.ascent.round() as i32,
        descent: vertical.descent.round() as i32,
        line_gap: vertical.line_gap.round() as i32,
        advance: rasterizer.horizontal_advance(advance_cp, scale)?.round() as i32,
    };
    atlas::write_metadata(metadata, glyph_count, &metrics, &layout)
        .context("failed to write metadata")?;

    log::info!("atlas was generated");
    Ok(BakeSummary {
        layout,
        metrics,
        glyph_count,
        arena_used: arena.used(),
    })
}

/// Rasterizes every glyph above `atlas_block` and blits them into it.
fn rasterize_into_atlas<R>(
    config: &BakeConfig,
    arena: &mut Arena,
    rasterizer: &R,
    scale: Scale,
    layout: &AtlasLayout,
    atlas_block: &ArenaBlock,
) -> anyhow::Result<usize>
where
    R: Rasterizer + ?Sized,
{
    let records = font::rasterize_glyphs(rasterizer, config.glyphs, scale, arena)?;
    let (pixels, tail) = arena.split_at_block(atlas_block)?;
    let bitmaps = records
        .iter()
        .map(|record| {
            Ok(GlyphBitmap {
                coverage: tail.bytes(&record.bitmap)?,
                width: record.width,
                height: record.height,
            })
        })
        .collect::<Result<Vec<_>, ArenaError>>()?;
    atlas::pack(layout, pixels, &bitmaps)?;
    Ok(records.len())
}

#[cfg(test)]
#[path = "../tests/unit/bake.rs"]
mod tests;
