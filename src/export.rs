//! Writing a panel's source pixels, or a rectangle of them, to disk.
//!
//! Rectangles are written straight out of the source buffer using the full
//! source row stride, so a crop never copies the pixels it exports.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use image::RgbaImage;
use thiserror::Error;

use crate::geometry::{IVec2, ivec2};
use crate::selection::{PixelRect, Selection};

const BYTES_PER_PIXEL: usize = 4;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExportFormat {
    Png,
    Jpeg,
    Bmp,
    Tga,
}

impl ExportFormat {
    pub const ALL: [ExportFormat; 4] = [
        ExportFormat::Png,
        ExportFormat::Jpeg,
        ExportFormat::Bmp,
        ExportFormat::Tga,
    ];

    pub fn label(self) -> &'static str {
        match self {
            ExportFormat::Png => "PNG",
            ExportFormat::Jpeg => "JPEG",
            ExportFormat::Bmp => "BMP",
            ExportFormat::Tga => "TGA",
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Png => "png",
            ExportFormat::Jpeg => "jpg",
            ExportFormat::Bmp => "bmp",
            ExportFormat::Tga => "tga",
        }
    }

    pub fn is_supported(self) -> bool {
        matches!(self, ExportFormat::Png)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ExportOptions {
    pub format: ExportFormat,
    /// zlib effort, 0 (fastest) to 9 (smallest).
    pub png_compression: u8,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            format: ExportFormat::Png,
            png_compression: 6,
        }
    }
}

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("nothing is selected")]
    NoSelection,

    #[error("{} export is not supported yet", .0.label())]
    UnsupportedFormat(ExportFormat),

    #[error("source image has no pixels")]
    EmptyImage,

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("png encoding failed: {0}")]
    Encode(#[from] png::EncodingError),
}

/// Applies the export clamping policy: out-of-range corners fall back to the
/// full extent (bottom-right) or the origin (top-left), and an empty or
/// inverted axis expands to the full extent instead of failing.
pub fn clamp_export_rect(top_left: IVec2, bottom_right: IVec2, full_size: IVec2) -> PixelRect {
    let mut tl = top_left;
    let mut br = bottom_right;
    for axis in 0..2 {
        if br[axis] < 0 || br[axis] > full_size[axis] {
            br[axis] = full_size[axis];
        }
        if tl[axis] < 0 || tl[axis] >= full_size[axis] {
            tl[axis] = 0;
        }
        if br[axis] <= tl[axis] {
            br[axis] = full_size[axis];
        }
    }
    PixelRect::new(tl, br)
}

/// Writes `[top_left, bottom_right)` of `source` to `path`. The corners need
/// not be pre-clamped. Returns the rectangle actually written.
pub fn export_rect(
    source: &RgbaImage,
    top_left: IVec2,
    bottom_right: IVec2,
    path: &Path,
    options: &ExportOptions,
) -> Result<PixelRect, ExportError> {
    let full_size = ivec2(source.width() as i32, source.height() as i32);
    if full_size.x <= 0 || full_size.y <= 0 {
        return Err(ExportError::EmptyImage);
    }
    if !options.format.is_supported() {
        return Err(ExportError::UnsupportedFormat(options.format));
    }

    let rect = clamp_export_rect(top_left, bottom_right, full_size);
    let stride = full_size.x as usize * BYTES_PER_PIXEL;
    let start_offset = rect.min.y as usize * stride + rect.min.x as usize * BYTES_PER_PIXEL;

    let file = File::create(path).map_err(|err| {
        tracing::warn!("cannot create {}: {}", path.display(), err);
        ExportError::Io(err)
    })?;
    let written = write_png(
        source.as_raw(),
        start_offset,
        stride,
        rect,
        file,
        png_compression(options.png_compression),
    );
    match written {
        Ok(()) => {
            tracing::info!(
                "exported {}x{} at ({}, {}) to {}",
                rect.width(),
                rect.height(),
                rect.min.x,
                rect.min.y,
                path.display()
            );
            Ok(rect)
        }
        Err(err) => {
            tracing::warn!("export to {} failed: {}", path.display(), err);
            if let Err(remove_err) = std::fs::remove_file(path) {
                tracing::warn!("could not remove partial {}: {}", path.display(), remove_err);
            }
            Err(err)
        }
    }
}

/// Exports the normalized selection rectangle, or fails with
/// [`ExportError::NoSelection`] when nothing is selected.
pub fn export_selection(
    source: &RgbaImage,
    selection: &Selection,
    path: &Path,
    options: &ExportOptions,
) -> Result<PixelRect, ExportError> {
    let size = ivec2(source.width() as i32, source.height() as i32);
    let rect = selection.rect(size).ok_or(ExportError::NoSelection)?;
    export_rect(source, rect.min, rect.max, path, options)
}

pub fn export_whole(
    source: &RgbaImage,
    path: &Path,
    options: &ExportOptions,
) -> Result<PixelRect, ExportError> {
    let size = ivec2(source.width() as i32, source.height() as i32);
    export_rect(source, IVec2::ZERO, size, path, options)
}

/// Picks `<dir>/<stem>-<suffix>.<ext>`, numbering the name until it does not
/// collide with an existing file.
pub fn build_output_path(dir: &Path, stem: &str, suffix: &str, format: ExportFormat) -> PathBuf {
    let ext = format.extension();
    let base = dir.join(format!("{}-{}.{}", stem, suffix, ext));
    if !base.exists() {
        return base;
    }
    let mut n: u64 = 2;
    loop {
        let candidate = dir.join(format!("{}-{}-{}.{}", stem, suffix, n, ext));
        if !candidate.exists() {
            return candidate;
        }
        n += 1;
    }
}

fn png_compression(level: u8) -> png::Compression {
    match level {
        0..=3 => png::Compression::Fast,
        4..=6 => png::Compression::Default,
        _ => png::Compression::Best,
    }
}

fn write_png(
    pixels: &[u8],
    start_offset: usize,
    stride: usize,
    rect: PixelRect,
    file: File,
    compression: png::Compression,
) -> Result<(), ExportError> {
    let width = rect.width() as usize;
    let height = rect.height() as usize;
    let row_bytes = width * BYTES_PER_PIXEL;

    let mut encoder = png::Encoder::new(BufWriter::new(file), width as u32, height as u32);
    encoder.set_color(png::ColorType::Rgba);
    encoder.set_depth(png::BitDepth::Eight);
    encoder.set_compression(compression);

    let mut writer = encoder.write_header()?;
    {
        let mut stream = writer.stream_writer()?;
        for row in 0..height {
            let start = start_offset + row * stride;
            stream.write_all(&pixels[start..start + row_bytes])?;
        }
        stream.finish()?;
    }
    writer.finish()?;
    Ok(())
}
