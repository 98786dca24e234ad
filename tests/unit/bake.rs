use super::*;
use crate::atlas::{CellRect, GridShape, TexCoord, cell_rect};
use crate::font::{Coverage, GlyphRange, RasterError, Scale, VerticalMetrics};

/// Every glyph is a solid `glyph`×`glyph` square inside a `cell`×`cell` box.
///
/// `glyph_extent` reports the padded `cell` size rather than the raster size
/// so that 5x5 squares can be baked into 10x10 cells.
struct SquareRasterizer {
    glyph: u32,
    cell: u32,
    coverage: u8,
}

impl Rasterizer for SquareRasterizer {
    fn scale_for_pixel_height(&self, pixel_height: f32) -> Result<Scale, RasterError> {
        Ok(Scale(pixel_height / 1000.0))
    }

    fn rasterize_codepoint(&self, codepoint: u32, _scale: Scale) -> Result<Coverage, RasterError> {
        char::from_u32(codepoint).ok_or(RasterError::InvalidCodepoint(codepoint))?;
        Ok(Coverage {
            width: self.glyph,
            height: self.glyph,
            bitmap: vec![self.coverage; (self.glyph * self.glyph) as usize],
        })
    }

    fn glyph_extent(&self, _codepoint: u32, _scale: Scale) -> Result<(u32, u32), RasterError> {
        Ok((self.cell, self.cell))
    }

    fn horizontal_advance(&self, codepoint: u32, scale: Scale) -> Result<f32, RasterError> {
        Ok(if codepoint == 'M' as u32 { 600.0 * scale.0 } else { 0.0 })
    }

    fn vertical_metrics(&self, scale: Scale) -> Result<VerticalMetrics, RasterError> {
        Ok(VerticalMetrics {
            ascent: 800.0 * scale.0,
            descent: -200.0 * scale.0,
            line_gap: 90.0 * scale.0,
        })
    }
}

#[derive(Default)]
struct MemorySink {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl ImageSink for MemorySink {
    fn write_rgba(&mut self, width: u32, height: u32, pixels: &[u8]) -> anyhow::Result<()> {
        self.width = width;
        self.height = height;
        self.pixels = pixels.to_vec();
        Ok(())
    }
}

fn pixel(sink: &MemorySink, x: u32, y: u32) -> [u8; 4] {
    let i = ((y * sink.width + x) * 4) as usize;
    [
        sink.pixels[i],
        sink.pixels[i + 1],
        sink.pixels[i + 2],
        sink.pixels[i + 3],
    ]
}

fn parse_rect(line: &str) -> CellRect {
    let parts: Vec<&str> = line.split_whitespace().collect();
    assert_eq!(parts[0], "min");
    assert_eq!(parts[3], "max");
    let num = |i: usize| parts[i].parse::<f32>().unwrap();
    CellRect {
        min: TexCoord { x: num(1), y: num(2) },
        max: TexCoord { x: num(4), y: num(5) },
    }
}

fn bake_squares(config: &BakeConfig) -> (BakeSummary, MemorySink, String) {
    let rasterizer = SquareRasterizer {
        glyph: 5,
        cell: 10,
        coverage: 255,
    };
    let mut arena = Arena::new(1 << 20).unwrap();
    let mut sink = MemorySink::default();
    let mut metadata = Vec::<u8>::new();
    let summary = bake(config, &mut arena, &rasterizer, &mut sink, &mut metadata).unwrap();
    (summary, sink, String::from_utf8(metadata).unwrap())
}

#[test]
fn end_to_end_96_squares_in_16_by_6_grid() {
    let config = BakeConfig::default();
    let (summary, sink, metadata) = bake_squares(&config);

    assert_eq!((sink.width, sink.height), (160, 60));
    assert_eq!(summary.glyph_count, 96);
    assert_eq!(summary.layout.cell.width, 10);
    assert_eq!(summary.layout.cell.height, 10);

    for row in 0..6 {
        for col in 0..16 {
            let (x0, y0) = (col * 10, row * 10);
            for dy in 0..10 {
                for dx in 0..10 {
                    let expected = if dx < 5 && dy < 5 { [255; 4] } else { [0; 4] };
                    assert_eq!(
                        pixel(&sink, x0 + dx, y0 + dy),
                        expected,
                        "cell ({col},{row}) offset ({dx},{dy})"
                    );
                }
            }
        }
    }

    let lines: Vec<&str> = metadata.lines().collect();
    assert_eq!(
        &lines[..7],
        &[
            "num_char 96",
            "ascent 160",
            "descent -40",
            "linegap 18",
            "advance 120",
            "max_width 10",
            "max_height 10",
        ]
    );
    let rects: Vec<CellRect> = lines[7..].iter().map(|l| parse_rect(l)).collect();
    assert_eq!(rects.len(), 96);
    for (k, rect) in rects.iter().enumerate() {
        let row = 5 - (k / 16) as u32;
        let col = (k % 16) as u32;
        let expected = cell_rect(&summary.layout, col, row);
        let close = |a: f32, b: f32| (a - b).abs() < 1e-6;
        assert!(close(rect.min.x, col as f32 * 10.0 / 160.0), "k = {k}");
        assert!(close(rect.min.y, row as f32 * 10.0 / 60.0), "k = {k}");
        assert!(close(rect.max.x, (col + 1) as f32 * 10.0 / 160.0), "k = {k}");
        assert!(close(rect.max.y, (row + 1) as f32 * 10.0 / 60.0), "k = {k}");
        assert!(close(rect.min.x, expected.min.x) && close(rect.max.y, expected.max.y));
    }
}

#[test]
fn glyph_scope_is_released_after_packing() {
    let config = BakeConfig::default();
    let (summary, _, _) = bake_squares(&config);
    assert_eq!(summary.arena_used, summary.layout.byte_len());
}

#[test]
fn unused_cells_stay_transparent() {
    let mut config = BakeConfig::default();
    config.glyphs = GlyphRange { base: 65, count: 3 };
    config.grid = GridShape { columns: 2, rows: 2 };
    let (summary, sink, metadata) = bake_squares(&config);

    assert_eq!(summary.glyph_count, 3);
    assert_eq!(pixel(&sink, 10, 10), [0; 4], "fourth cell is empty");
    assert_eq!(pixel(&sink, 0, 10), [255; 4], "third cell holds a glyph");
    assert!(metadata.starts_with("num_char 3\n"));
    assert_eq!(metadata.lines().filter(|l| l.starts_with("min ")).count(), 4);
}

#[test]
fn glyph_larger_than_measured_cell_is_rejected() {
    let rasterizer = SquareRasterizer {
        glyph: 12,
        cell: 10,
        coverage: 255,
    };
    let mut arena = Arena::new(1 << 20).unwrap();
    let mut sink = MemorySink::default();
    let mut metadata = Vec::<u8>::new();
    let err = bake(
        &BakeConfig::default(),
        &mut arena,
        &rasterizer,
        &mut sink,
        &mut metadata,
    )
    .unwrap_err();
    assert!(err.downcast_ref::<atlas::LayoutError>().is_some(), "{err:#}");
    assert!(sink.pixels.is_empty());
    assert!(metadata.is_empty());
    assert_eq!(arena.depth(), 0, "glyph scope closed on failure");
    assert_eq!(arena.used(), 160 * 60 * 4, "only the atlas is held");
}

#[test]
fn arena_is_reusable_after_a_failed_bake() {
    let oversized = SquareRasterizer {
        glyph: 12,
        cell: 10,
        coverage: 255,
    };
    let mut arena = Arena::new(1 << 20).unwrap();
    let config = BakeConfig::default();
    let mut sink = MemorySink::default();
    bake(
        &config,
        &mut arena,
        &oversized,
        &mut sink,
        &mut Vec::<u8>::new(),
    )
    .unwrap_err();

    let squares = SquareRasterizer {
        glyph: 5,
        cell: 10,
        coverage: 255,
    };
    let mut metadata = Vec::<u8>::new();
    let summary = bake(&config, &mut arena, &squares, &mut sink, &mut metadata).unwrap();
    assert_eq!(summary.arena_used, 2 * summary.layout.byte_len());
    assert_eq!(arena.depth(), 0);
    assert_eq!(pixel(&sink, 0, 0), [255; 4]);
}

#[test]
fn oversized_grid_is_a_layout_error() {
    let mut config = BakeConfig::default();
    config.grid = GridShape {
        columns: 500_000_000,
        rows: 1,
    };
    config.validate().unwrap();
    let rasterizer = SquareRasterizer {
        glyph: 5,
        cell: 10,
        coverage: 255,
    };
    let mut arena = Arena::new(1 << 20).unwrap();
    let err = bake(
        &config,
        &mut arena,
        &rasterizer,
        &mut MemorySink::default(),
        &mut Vec::<u8>::new(),
    )
    .unwrap_err();
    assert_eq!(
        err.downcast_ref::<atlas::LayoutError>(),
        Some(&atlas::LayoutError::TooLarge {
            grid: config.grid,
            cell: atlas::CellSize {
                width: 10,
                height: 10,
            },
        })
    );
    assert_eq!(arena.used(), 0);
}

#[test]
fn undersized_arena_fails_with_capacity_error() {
    let rasterizer = SquareRasterizer {
        glyph: 5,
        cell: 10,
        coverage: 255,
    };
    // Exactly the atlas size: the strict check leaves no room for it.
    let mut arena = Arena::new(160 * 60 * 4).unwrap();
    let mut sink = MemorySink::default();
    let err = bake(
        &BakeConfig::default(),
        &mut arena,
        &rasterizer,
        &mut sink,
        &mut Vec::<u8>::new(),
    )
    .unwrap_err();
    assert!(matches!(
        err.downcast_ref::<ArenaError>(),
        Some(ArenaError::CapacityExceeded { .. })
    ));
}

#[test]
fn missing_font_file_is_an_error() {
    let mut config = BakeConfig::default();
    config.font.path = std::env::temp_dir().join("glyph-baker-missing-font.ttf");
    let err = run(&config).unwrap_err();
    assert!(format!("{err:#}").contains("failed to open"), "{err:#}");
}
