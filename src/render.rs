//! Drawing surface and the fixed-order preview render.
//!
//! A [`Surface`] is a plain straight-alpha RGBA8 pixmap. The preview render
//! always clears, then draws the background under [`FitPolicy::Cover`] and the
//! foreground under [`FitPolicy::ContainNoUpscale`] with the 0.7 height budget,
//! in that order; absent layers are skipped, never errors.

use std::io::Cursor;

use crate::composite;
use crate::encoded::EncodedImage;
use crate::error::{PicblendError, PicblendResult};
use crate::fit::{FOREGROUND_HEIGHT_BUDGET, FitPolicy, LayoutRect, Size, compute_fit};
use crate::handle::ImageHandle;

/// Default preview surface dimensions.
pub const DEFAULT_SURFACE_WIDTH: u32 = 800;
pub const DEFAULT_SURFACE_HEIGHT: u32 = 600;

pub struct Surface {
    width: u32,
    height: u32,
    rgba8: Vec<u8>,
}

impl Surface {
    pub fn new(width: u32, height: u32) -> PicblendResult<Self> {
        if width == 0 || height == 0 {
            return Err(PicblendError::validation(format!(
                "surface dimensions must be non-zero, got {width}x{height}"
            )));
        }
        Ok(Self {
            width,
            height,
            rgba8: vec![0; (width as usize) * (height as usize) * 4],
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn size(&self) -> Size {
        Size::new(self.width as f32, self.height as f32)
    }

    pub fn rgba8(&self) -> &[u8] {
        &self.rgba8
    }

    pub fn clear(&mut self) {
        self.rgba8.fill(0);
    }

    /// Resamples `handle` to `rect` and blends it source-over onto the surface.
    ///
    /// The rect may extend past the surface on any side (Cover overflow);
    /// out-of-bounds pixels are clipped. Empty rects are a no-op.
    pub fn draw_image(&mut self, handle: &ImageHandle, rect: LayoutRect) -> PicblendResult<()> {
        if rect.is_empty() {
            return Ok(());
        }

        let target_w = rect.width.round().max(1.0) as u32;
        let target_h = rect.height.round().max(1.0) as u32;

        let src = image::RgbaImage::from_raw(
            handle.width(),
            handle.height(),
            handle.rgba8().to_vec(),
        )
        .ok_or_else(|| PicblendError::decode("image handle buffer has inconsistent length"))?;

        let scaled = if target_w == handle.width() && target_h == handle.height() {
            src
        } else {
            image::imageops::resize(&src, target_w, target_h, image::imageops::FilterType::Triangle)
        };

        let origin_x = rect.x.round() as i64;
        let origin_y = rect.y.round() as i64;

        for sy in 0..target_h as i64 {
            let dy = origin_y + sy;
            if dy < 0 || dy >= self.height as i64 {
                continue;
            }
            for sx in 0..target_w as i64 {
                let dx = origin_x + sx;
                if dx < 0 || dx >= self.width as i64 {
                    continue;
                }
                let px = scaled.get_pixel(sx as u32, sy as u32).0;
                let idx = ((dy as u32 * self.width + dx as u32) * 4) as usize;
                let dst = [
                    self.rgba8[idx],
                    self.rgba8[idx + 1],
                    self.rgba8[idx + 2],
                    self.rgba8[idx + 3],
                ];
                self.rgba8[idx..idx + 4].copy_from_slice(&composite::over(dst, px));
            }
        }

        Ok(())
    }

    /// Rasterizes the current contents losslessly as a PNG.
    ///
    /// Always succeeds for a well-formed surface; an untouched surface exports
    /// as a blank (fully transparent) image.
    pub fn export(&self) -> PicblendResult<EncodedImage> {
        let img = image::RgbaImage::from_raw(self.width, self.height, self.rgba8.clone())
            .ok_or_else(|| PicblendError::export("surface buffer has inconsistent length"))?;

        let mut buf = Vec::new();
        image::DynamicImage::ImageRgba8(img)
            .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
            .map_err(|e| PicblendError::export(format!("encode surface png: {e}")))?;

        Ok(EncodedImage::from_bytes(buf))
    }
}

/// Clears `surface` and layers the two inputs in fixed z-order: background
/// beneath foreground, regardless of which handles are present.
pub fn render_preview(
    surface: &mut Surface,
    background: Option<&ImageHandle>,
    foreground: Option<&ImageHandle>,
) -> PicblendResult<()> {
    surface.clear();
    let container = surface.size();

    if let Some(bg) = background {
        let rect = compute_fit(
            container,
            Size::new(bg.width() as f32, bg.height() as f32),
            FitPolicy::Cover,
        );
        surface.draw_image(bg, rect)?;
    }

    if let Some(fg) = foreground {
        let rect = compute_fit(
            container,
            Size::new(fg.width() as f32, fg.height() as f32),
            FitPolicy::ContainNoUpscale {
                height_budget: FOREGROUND_HEIGHT_BUDGET,
            },
        );
        surface.draw_image(fg, rect)?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handle::Provenance;
    use std::io::Cursor;

    fn solid_handle(width: u32, height: u32, rgba: [u8; 4]) -> ImageHandle {
        let img = image::RgbaImage::from_pixel(width, height, image::Rgba(rgba));
        let mut buf = Vec::new();
        image::DynamicImage::ImageRgba8(img)
            .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
            .unwrap();
        ImageHandle::decode(buf, Provenance::LocalFile).unwrap()
    }

    fn pixel(surface: &Surface, x: u32, y: u32) -> [u8; 4] {
        let idx = ((y * surface.width() + x) * 4) as usize;
        let p = &surface.rgba8()[idx..idx + 4];
        [p[0], p[1], p[2], p[3]]
    }

    #[test]
    fn zero_sized_surface_is_rejected() {
        assert!(Surface::new(0, 10).is_err());
        assert!(Surface::new(10, 0).is_err());
    }

    #[test]
    fn untouched_surface_exports_as_blank_png() {
        let surface = Surface::new(8, 6).unwrap();
        let encoded = surface.export().unwrap();

        let back = image::load_from_memory(encoded.as_bytes())
            .unwrap()
            .to_rgba8();
        assert_eq!(back.dimensions(), (8, 6));
        assert!(back.pixels().all(|p| p.0 == [0, 0, 0, 0]));
    }

    #[test]
    fn missing_layers_are_skipped_without_error() {
        let mut surface = Surface::new(16, 12).unwrap();
        render_preview(&mut surface, None, None).unwrap();
        assert!(surface.rgba8().iter().all(|&b| b == 0));
    }

    #[test]
    fn background_covers_the_whole_surface() {
        let mut surface = Surface::new(40, 30).unwrap();
        let bg = solid_handle(20, 20, [200, 0, 0, 255]);
        render_preview(&mut surface, Some(&bg), None).unwrap();

        for (x, y) in [(0, 0), (39, 0), (0, 29), (39, 29), (20, 15)] {
            assert_eq!(pixel(&surface, x, y), [200, 0, 0, 255], "pixel {x},{y}");
        }
    }

    #[test]
    fn foreground_draws_above_background_centered() {
        let mut surface = Surface::new(40, 30).unwrap();
        let bg = solid_handle(40, 30, [200, 0, 0, 255]);
        // Small opaque foreground, below the height budget: drawn at intrinsic
        // size, centered.
        let fg = solid_handle(10, 10, [0, 0, 200, 255]);
        render_preview(&mut surface, Some(&bg), Some(&fg)).unwrap();

        assert_eq!(pixel(&surface, 20, 15), [0, 0, 200, 255]);
        assert_eq!(pixel(&surface, 1, 1), [200, 0, 0, 255]);
    }

    #[test]
    fn cover_overflow_is_clipped_not_an_error() {
        let mut surface = Surface::new(10, 30).unwrap();
        // Very wide background: cover pins height and massively overflows width.
        let bg = solid_handle(300, 30, [0, 200, 0, 255]);
        render_preview(&mut surface, Some(&bg), None).unwrap();

        assert_eq!(pixel(&surface, 0, 0), [0, 200, 0, 255]);
        assert_eq!(pixel(&surface, 9, 29), [0, 200, 0, 255]);
    }
}
