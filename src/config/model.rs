use std::path::PathBuf;

use anyhow::bail;
use serde::{Deserialize, Serialize};

use crate::atlas::GridShape;
use crate::font::GlyphRange;

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub(crate) struct BakeConfig {
    pub font: FontConfig,
    pub glyphs: GlyphRange,
    pub grid: GridShape,
    pub output: OutputConfig,
    pub arena: ArenaConfig,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub(crate) struct FontConfig {
    pub path: PathBuf,
    /// Ascent-to-descent span in pixels.
    pub pixel_height: f32,
    /// Glyph whose advance is written as the font's advance.
    pub advance_char: char,
}

impl Default for FontConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("fonts/UbuntuMono-Regular.ttf"),
            pixel_height: 200.0,
            advance_char: 'M',
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub(crate) struct OutputConfig {
    /// Image format follows the extension.
    pub atlas: PathBuf,
    pub metadata: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            atlas: PathBuf::from("font_atlas.bmp"),
            metadata: PathBuf::from("font_atlas.txt"),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub(crate) struct ArenaConfig {
    pub size_bytes: usize,
}

impl Default for ArenaConfig {
    fn default() -> Self {
        Self {
            size_bytes: 40 * 1024 * 1024,
        }
    }
}

impl BakeConfig {
    /// Rejects configurations the bake can never satisfy.
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.grid.columns == 0 || self.grid.rows == 0 {
            bail!(
                "grid must have at least one column and row, got {}x{}",
                self.grid.columns,
                self.grid.rows
            );
        }
        if self.glyphs.count == 0 {
            bail!("glyph range is empty");
        }
        if self.glyphs.len() > self.grid.capacity() {
            bail!(
                "{} glyphs do not fit in a {}x{} grid",
                self.glyphs.count,
                self.grid.columns,
                self.grid.rows
            );
        }
        let Some(last) = self.glyphs.last() else {
            bail!("glyph range overflows u32");
        };
        if let Some(bad) = self
            .glyphs
            .codepoints()
            .find(|&cp| char::from_u32(cp).is_none())
        {
            bail!(
                "glyph range U+{:04X}..=U+{last:04X} contains invalid U+{bad:04X}",
                self.glyphs.base
            );
        }
        if !(self.font.pixel_height.is_finite() && self.font.pixel_height > 0.0) {
            bail!("pixel height must be positive, got {}", self.font.pixel_height);
        }
        Ok(())
    }
}
