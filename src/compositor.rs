//! Two-image compositing.
//!
//! A frame is the foreground revealed up to the fill offset and the
//! background covering the rest of the canvas. Horizontally the reveal grows
//! from the left edge; vertically it grows from the bottom edge. The two
//! destination rectangles always partition the canvas exactly.

use crate::geometry::{Axis, Rect, Size};
use crate::source::LoadedImage;
use crate::surface::Surface;

/// Source and destination rectangle of one image blit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Slice {
    /// Rectangle in intrinsic image coordinates
    pub src: Rect,
    /// Rectangle in logical canvas coordinates
    pub dst: Rect,
}

/// The two blits making up a frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameSlices {
    pub foreground: Slice,
    pub background: Slice,
}

/// Compute the slices for a fill `offset` along `axis`.
///
/// Offsets outside `[0, axis size]` (overshooting easing curves) are clamped
/// to the canvas. Each image's source slice is mapped through its own
/// intrinsic size, so the images do not need to share a resolution.
pub fn frame_slices(
    axis: Axis,
    offset: f32,
    canvas: Size,
    foreground: Size,
    background: Size,
) -> FrameSlices {
    let extent = axis.extent(canvas).max(0.0);
    let revealed = if offset.is_nan() {
        0.0
    } else {
        offset.clamp(0.0, extent)
    };
    let fraction = if extent > 0.0 { revealed / extent } else { 0.0 };

    match axis {
        Axis::Horizontal => {
            let fg_boundary = foreground.width * fraction;
            let bg_boundary = background.width * fraction;
            FrameSlices {
                foreground: Slice {
                    src: Rect::new(0.0, 0.0, fg_boundary, foreground.height),
                    dst: Rect::new(0.0, 0.0, revealed, canvas.height),
                },
                background: Slice {
                    src: Rect::new(
                        bg_boundary,
                        0.0,
                        background.width - bg_boundary,
                        background.height,
                    ),
                    dst: Rect::new(revealed, 0.0, canvas.width - revealed, canvas.height),
                },
            }
        }
        Axis::Vertical => {
            let fg_revealed = foreground.height * fraction;
            let bg_remaining = background.height - background.height * fraction;
            let boundary = canvas.height - revealed;
            FrameSlices {
                foreground: Slice {
                    src: Rect::new(
                        0.0,
                        foreground.height - fg_revealed,
                        foreground.width,
                        fg_revealed,
                    ),
                    dst: Rect::new(0.0, boundary, canvas.width, revealed),
                },
                background: Slice {
                    src: Rect::new(0.0, 0.0, background.width, bg_remaining),
                    dst: Rect::new(0.0, 0.0, canvas.width, boundary),
                },
            }
        }
    }
}

/// Paints frames for one fill axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Compositor {
    axis: Axis,
}

impl Compositor {
    pub fn new(axis: Axis) -> Self {
        Self { axis }
    }

    pub fn axis(&self) -> Axis {
        self.axis
    }

    /// Repaint the whole surface for fill `offset`.
    pub fn draw_frame(
        &self,
        surface: &mut dyn Surface,
        offset: f32,
        foreground: &LoadedImage,
        background: &LoadedImage,
    ) {
        let slices = frame_slices(
            self.axis,
            offset,
            surface.size(),
            foreground.intrinsic_size(),
            background.intrinsic_size(),
        );

        surface.clear();
        surface.draw_image(foreground, slices.foreground.src, slices.foreground.dst);
        surface.draw_image(background, slices.background.src, slices.background.dst);
    }
}

#[cfg(test)]
mod tests {
    use image::{Rgba, RgbaImage};

    use super::*;
    use crate::surface::RasterSurface;

    const RED: Rgba<u8> = Rgba([255, 0, 0, 255]);
    const BLUE: Rgba<u8> = Rgba([0, 0, 255, 255]);

    fn solid(width: u32, height: u32, color: Rgba<u8>) -> LoadedImage {
        LoadedImage::from_rgba(RgbaImage::from_pixel(width, height, color))
    }

    fn assert_partition(slices: &FrameSlices, canvas: Size) {
        let fg = slices.foreground.dst;
        let bg = slices.background.dst;
        assert!((fg.area() + bg.area() - canvas.width * canvas.height).abs() < 1e-3);
        assert!(fg.width >= 0.0 && fg.height >= 0.0);
        assert!(bg.width >= 0.0 && bg.height >= 0.0);
    }

    #[test]
    fn test_horizontal_partition() {
        let canvas = Size::new(200.0, 100.0);
        let image = Size::new(100.0, 50.0);
        for offset in [0.0, 0.5, 37.0, 100.0, 199.9, 200.0] {
            let slices = frame_slices(Axis::Horizontal, offset, canvas, image, image);
            assert_partition(&slices, canvas);
            assert_eq!(slices.foreground.dst.right(), slices.background.dst.x);
            assert!((slices.foreground.src.width - offset * 0.5).abs() < 1e-3);
            assert!((slices.background.src.right() - 100.0).abs() < 1e-3);
        }
    }

    #[test]
    fn test_vertical_partition_fills_from_bottom() {
        let canvas = Size::new(100.0, 200.0);
        let image = Size::new(50.0, 100.0);
        for offset in [0.0, 20.0, 150.0, 200.0] {
            let slices = frame_slices(Axis::Vertical, offset, canvas, image, image);
            assert_partition(&slices, canvas);
            assert!((slices.foreground.dst.bottom() - 200.0).abs() < 1e-3);
            assert_eq!(slices.background.dst.bottom(), slices.foreground.dst.y);
            assert!((slices.foreground.src.bottom() - 100.0).abs() < 1e-3);
        }
    }

    #[test]
    fn test_overshoot_is_clamped() {
        let canvas = Size::new(200.0, 100.0);
        let image = Size::new(100.0, 50.0);
        let slices = frame_slices(Axis::Horizontal, 230.0, canvas, image, image);
        assert_eq!(slices.foreground.dst.width, 200.0);
        assert_eq!(slices.background.dst.width, 0.0);
        let slices = frame_slices(Axis::Horizontal, -5.0, canvas, image, image);
        assert_eq!(slices.foreground.dst.width, 0.0);
    }

    #[test]
    fn test_images_of_different_sizes() {
        let canvas = Size::new(200.0, 100.0);
        let slices = frame_slices(
            Axis::Horizontal,
            50.0,
            canvas,
            Size::new(100.0, 50.0),
            Size::new(400.0, 200.0),
        );
        assert_eq!(slices.foreground.src.width, 25.0);
        assert_eq!(slices.background.src.x, 100.0);
        assert_eq!(slices.background.src.width, 300.0);
    }

    #[test]
    fn test_draw_frame_endpoints() {
        let foreground = solid(10, 5, RED);
        let background = solid(10, 5, BLUE);
        let mut surface = RasterSurface::new();
        surface.resize(Size::new(20.0, 10.0), 1.0);
        let compositor = Compositor::new(Axis::Horizontal);

        compositor.draw_frame(&mut surface, 0.0, &foreground, &background);
        assert!(surface.pixels().pixels().all(|p| *p == BLUE));

        compositor.draw_frame(&mut surface, 20.0, &foreground, &background);
        assert!(surface.pixels().pixels().all(|p| *p == RED));

        compositor.draw_frame(&mut surface, 5.0, &foreground, &background);
        assert_eq!(surface.pixels().get_pixel(4, 9), &RED);
        assert_eq!(surface.pixels().get_pixel(5, 0), &BLUE);
    }

    #[test]
    fn test_draw_frame_vertical_hidpi() {
        let foreground = solid(10, 10, RED);
        let background = solid(10, 10, BLUE);
        let mut surface = RasterSurface::new();
        surface.resize(Size::new(10.0, 10.0), 2.0);
        let compositor = Compositor::new(Axis::Vertical);

        compositor.draw_frame(&mut surface, 2.5, &foreground, &background);
        // 2.5 logical pixels revealed from the bottom = 5 backing rows
        assert_eq!(surface.pixels().get_pixel(0, 14), &BLUE);
        assert_eq!(surface.pixels().get_pixel(0, 15), &RED);
        assert_eq!(surface.pixels().get_pixel(19, 19), &RED);
    }
}
