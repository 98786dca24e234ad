//! Image encoding seam for the finished atlas.

use std::path::{Path, PathBuf};

use anyhow::Context;

/// Receives the finished RGBA8 atlas.
pub trait ImageSink {
    fn write_rgba(&mut self, width: u32, height: u32, pixels: &[u8]) -> anyhow::Result<()>;
}

/// Writes the atlas to a file; the format follows the file extension.
pub struct ImageFileSink {
    path: PathBuf,
}

impl ImageFileSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ImageSink for ImageFileSink {
    fn write_rgba(&mut self, width: u32, height: u32, pixels: &[u8]) -> anyhow::Result<()> {
        image::save_buffer(&self.path, pixels, width, height, image::ColorType::Rgba8)
            .with_context(|| format!("failed to write {}", self.path.display()))?;
        log::info!("Wrote atlas {} ({width}x{height})", self.path().display());
        Ok(())
    }
}
