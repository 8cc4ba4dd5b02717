//! One-shot file outputs with the product's fixed download names.

use std::path::{Path, PathBuf};

use anyhow::Context as _;

use crate::encoded::EncodedImage;
use crate::error::PicblendResult;
use crate::render::Surface;

/// Download name for the full composite returned by the service.
pub const FINAL_IMAGE_FILENAME: &str = "final_image.png";
/// Download name for the background-removed subject.
pub const SUBJECT_ONLY_FILENAME: &str = "car_only.png";
/// Output name for the standalone compositor's rasterized surface.
pub const COMPOSITE_FILENAME: &str = "pic-blender-result.png";

/// Writes `image` into `dir` under `name`, creating the directory if needed.
pub fn write_encoded(image: &EncodedImage, dir: &Path, name: &str) -> PicblendResult<PathBuf> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("create output dir '{}'", dir.display()))?;

    let path = dir.join(name);
    std::fs::write(&path, image.as_bytes())
        .with_context(|| format!("write image '{}'", path.display()))?;
    Ok(path)
}

/// Rasterizes `surface` losslessly to a PNG at `path`.
pub fn write_surface_png(surface: &Surface, path: &Path) -> PicblendResult<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }

    image::save_buffer_with_format(
        path,
        surface.rgba8(),
        surface.width(),
        surface.height(),
        image::ColorType::Rgba8,
        image::ImageFormat::Png,
    )
    .with_context(|| format!("write png '{}'", path.display()))?;
    Ok(())
}
