//! Drawing surfaces.
//!
//! A [`Surface`] is the 2-D raster target the compositor paints into. All
//! coordinates handed to a surface are logical pixels; the surface owns the
//! mapping onto its backing store through the device pixel ratio.

use std::path::Path;

use image::{Rgba, RgbaImage};

use crate::error::Result;
use crate::geometry::{Rect, Size};
use crate::layout::CanvasGeometry;
use crate::source::LoadedImage;

/// 2-D drawing surface supporting clipped-rectangle image blits.
pub trait Surface {
    /// Set the logical size and reallocate the backing store at
    /// `size * device_pixel_ratio`.
    fn resize(&mut self, size: Size, device_pixel_ratio: f32);

    /// Logical size of the surface.
    fn size(&self) -> Size;

    /// Clear the whole surface to transparent.
    fn clear(&mut self);

    /// Draw the `src` rectangle of `image` (in intrinsic image coordinates)
    /// scaled into the `dst` rectangle (in logical surface coordinates).
    fn draw_image(&mut self, image: &LoadedImage, src: Rect, dst: Rect);
}

/// Software surface compositing into an RGBA pixel buffer.
///
/// Blits use nearest-neighbour sampling. Destination edges are snapped to
/// whole backing pixels, so two blits sharing an edge never leave a gap or
/// overlap.
#[derive(Debug, Clone)]
pub struct RasterSurface {
    size: Size,
    device_pixel_ratio: f32,
    pixels: RgbaImage,
}

impl RasterSurface {
    pub fn new() -> Self {
        Self {
            size: Size::zero(),
            device_pixel_ratio: 1.0,
            pixels: RgbaImage::new(0, 0),
        }
    }

    pub fn device_pixel_ratio(&self) -> f32 {
        self.device_pixel_ratio
    }

    /// The backing store.
    pub fn pixels(&self) -> &RgbaImage {
        &self.pixels
    }

    /// Write the backing store as an image file, format picked by extension.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        self.pixels.save(path)?;
        Ok(())
    }

    fn to_backing(&self, value: f32, limit: u32) -> u32 {
        let scaled = (value * self.device_pixel_ratio).round();
        if scaled <= 0.0 {
            0
        } else {
            (scaled as u32).min(limit)
        }
    }
}

impl Default for RasterSurface {
    fn default() -> Self {
        Self::new()
    }
}

impl Surface for RasterSurface {
    fn resize(&mut self, size: Size, device_pixel_ratio: f32) {
        let ratio = if device_pixel_ratio > 0.0 {
            device_pixel_ratio
        } else {
            1.0
        };
        let (width, height) = CanvasGeometry::new(size, ratio).backing_size();

        self.size = size;
        self.device_pixel_ratio = ratio;
        if self.pixels.dimensions() != (width, height) {
            self.pixels = RgbaImage::new(width, height);
        }
    }

    fn size(&self) -> Size {
        self.size
    }

    fn clear(&mut self) {
        for pixel in self.pixels.pixels_mut() {
            *pixel = Rgba([0, 0, 0, 0]);
        }
    }

    fn draw_image(&mut self, image: &LoadedImage, src: Rect, dst: Rect) {
        if src.is_empty() || dst.is_empty() {
            return;
        }
        let source = image.pixels();
        let (source_width, source_height) = source.dimensions();
        if source_width == 0 || source_height == 0 {
            return;
        }

        let (width, height) = self.pixels.dimensions();
        let x0 = self.to_backing(dst.x, width);
        let x1 = self.to_backing(dst.right(), width);
        let y0 = self.to_backing(dst.y, height);
        let y1 = self.to_backing(dst.bottom(), height);

        // Intrinsic coordinates to source pixel coordinates
        let scale_x = source_width as f32 / image.width();
        let scale_y = source_height as f32 / image.height();
        let dst_x = dst.x * self.device_pixel_ratio;
        let dst_y = dst.y * self.device_pixel_ratio;
        let dst_width = dst.width * self.device_pixel_ratio;
        let dst_height = dst.height * self.device_pixel_ratio;

        for y in y0..y1 {
            let v = (y as f32 + 0.5 - dst_y) / dst_height;
            let sy = ((src.y + v * src.height) * scale_y).floor();
            let sy = (sy.max(0.0) as u32).min(source_height - 1);
            for x in x0..x1 {
                let u = (x as f32 + 0.5 - dst_x) / dst_width;
                let sx = ((src.x + u * src.width) * scale_x).floor();
                let sx = (sx.max(0.0) as u32).min(source_width - 1);
                self.pixels.put_pixel(x, y, *source.get_pixel(sx, sy));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn split_image() -> LoadedImage {
        // Left half red, right half green
        let pixels = RgbaImage::from_fn(4, 2, |x, _| {
            if x < 2 {
                Rgba([255, 0, 0, 255])
            } else {
                Rgba([0, 255, 0, 255])
            }
        });
        LoadedImage::from_rgba(pixels)
    }

    #[test]
    fn test_resize_applies_device_pixel_ratio() {
        let mut surface = RasterSurface::new();
        surface.resize(Size::new(100.0, 50.0), 2.0);
        assert_eq!(surface.pixels().dimensions(), (200, 100));
        assert_eq!(surface.size(), Size::new(100.0, 50.0));
    }

    #[test]
    fn test_draw_scales_source_rect() {
        let mut surface = RasterSurface::new();
        surface.resize(Size::new(8.0, 4.0), 1.0);
        surface.draw_image(
            &split_image(),
            Rect::new(2.0, 0.0, 2.0, 2.0),
            Rect::new(0.0, 0.0, 8.0, 4.0),
        );
        assert_eq!(surface.pixels().get_pixel(0, 0), &Rgba([0, 255, 0, 255]));
        assert_eq!(surface.pixels().get_pixel(7, 3), &Rgba([0, 255, 0, 255]));
    }

    #[test]
    fn test_draw_is_clipped_to_surface() {
        let mut surface = RasterSurface::new();
        surface.resize(Size::new(4.0, 2.0), 1.0);
        surface.draw_image(
            &split_image(),
            Rect::new(0.0, 0.0, 4.0, 2.0),
            Rect::new(2.0, 0.0, 40.0, 20.0),
        );
        assert_eq!(surface.pixels().get_pixel(1, 0), &Rgba([0, 0, 0, 0]));
        assert_eq!(surface.pixels().get_pixel(3, 1), &Rgba([255, 0, 0, 255]));
    }

    #[test]
    fn test_clear() {
        let mut surface = RasterSurface::new();
        surface.resize(Size::new(4.0, 2.0), 1.0);
        let image = split_image();
        surface.draw_image(&image, Rect::new(0.0, 0.0, 4.0, 2.0), Rect::new(0.0, 0.0, 4.0, 2.0));
        surface.clear();
        assert!(surface.pixels().pixels().all(|p| p[3] == 0));
    }
}
