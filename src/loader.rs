use std::path::Path;

use anyhow::Context;
use image::RgbaImage;

static SUPPORTED_IMAGE_EXTS: &[&str] = &[
    "png", "jpg", "jpeg", "bmp", "tga", "gif", "tif", "tiff", "webp", "ico", "pnm", "hdr", "qoi",
];

fn has_extension(path: &Path, exts: &[&str]) -> bool {
    let Some(ext) = path.extension().map(|e| e.to_string_lossy()) else {
        return false;
    };
    exts.iter().any(|known| ext.eq_ignore_ascii_case(known))
}

/// Returns `true` if the path has an extension the decoder understands.
pub fn is_supported_image(path: &Path) -> bool {
    has_extension(path, SUPPORTED_IMAGE_EXTS)
}

/// Decodes `path` into an owned RGBA8 buffer, converting from whatever
/// channel layout the file uses.
pub fn open_rgba(path: &Path) -> anyhow::Result<RgbaImage> {
    let reader = image::ImageReader::open(path)
        .with_context(|| format!("cannot open {}", path.display()))?
        .with_guessed_format()
        .with_context(|| format!("cannot read {}", path.display()))?;
    let img = reader
        .decode()
        .with_context(|| format!("cannot decode {}", path.display()))?;
    to_rgba(img).with_context(|| format!("{} has no pixels", path.display()))
}

fn to_rgba(img: image::DynamicImage) -> Option<RgbaImage> {
    if img.width() == 0 || img.height() == 0 {
        return None;
    }
    Some(img.into_rgba8())
}

/// Display name for a path: its final component, or the whole path.
pub fn file_name(path: &Path) -> String {
    path.file_name()
        .unwrap_or(path.as_os_str())
        .to_string_lossy()
        .into_owned()
}
