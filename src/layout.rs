//! Canvas sizing.
//!
//! The canvas takes the largest size with the foreground image's aspect ratio
//! that fits the container, minus the space taken by the numeric display.
//! Explicit width/height overrides replace the container's dimension before
//! fitting.

use crate::geometry::Size;
use crate::host::{HostElement, NumericDisplay};

/// Logical canvas size together with the device pixel ratio of its backing
/// store.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CanvasGeometry {
    pub size: Size,
    pub device_pixel_ratio: f32,
}

impl CanvasGeometry {
    pub fn new(size: Size, device_pixel_ratio: f32) -> Self {
        Self {
            size,
            device_pixel_ratio,
        }
    }

    /// Size of the backing store in device pixels.
    pub fn backing_size(&self) -> (u32, u32) {
        (
            (self.size.width * self.device_pixel_ratio).round().max(0.0) as u32,
            (self.size.height * self.device_pixel_ratio).round().max(0.0) as u32,
        )
    }
}

impl Default for CanvasGeometry {
    fn default() -> Self {
        Self::new(Size::zero(), 1.0)
    }
}

/// Computes canvas geometry from container measurements.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Layout {
    width: Option<f32>,
    height: Option<f32>,
    reserve_numeric_display: bool,
}

impl Layout {
    pub fn new(width: Option<f32>, height: Option<f32>, reserve_numeric_display: bool) -> Self {
        Self {
            width,
            height,
            reserve_numeric_display,
        }
    }

    /// Space available to the canvas.
    pub fn target_size(&self, container: Size, numeric_display_height: f32) -> Size {
        let width = self.width.unwrap_or(container.width);
        let height = match self.height {
            Some(height) => height,
            None if self.reserve_numeric_display => container.height - numeric_display_height,
            None => container.height,
        };
        Size::new(width.max(0.0), height.max(0.0))
    }

    /// Measure `container` and fit an image of `image` size into it.
    pub fn compute(
        &self,
        container: &dyn HostElement,
        numeric_display: &dyn NumericDisplay,
        image: Size,
    ) -> CanvasGeometry {
        let target = self.target_size(container.bounding_box(), numeric_display.height());
        let ratio = container.device_pixel_ratio();
        let ratio = if ratio > 0.0 { ratio } else { 1.0 };
        CanvasGeometry::new(fit(target, image), ratio)
    }
}

/// Uniform scale fitting `image` inside `target`.
pub fn fit_scale(target: Size, image: Size) -> f32 {
    if image.is_empty() {
        return 0.0;
    }
    let vertical = target.height / image.height;
    let horizontal = target.width / image.width;
    vertical.min(horizontal)
}

/// Largest size with `image`'s aspect ratio fitting inside `target`.
pub fn fit(target: Size, image: Size) -> Size {
    image.scale(fit_scale(target, image))
}

/// Carry a fill offset over to a new axis size, keeping its reveal fraction.
pub fn rescale_offset(offset: f32, old_axis: f32, new_axis: f32) -> f32 {
    if offset > 0.0 && old_axis > 0.0 {
        offset / old_axis * new_axis
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_target_reserves_numeric_display() {
        let layout = Layout::new(None, None, true);
        assert_eq!(
            layout.target_size(Size::new(200.0, 120.0), 20.0),
            Size::new(200.0, 100.0)
        );
        let layout = Layout::new(None, None, false);
        assert_eq!(
            layout.target_size(Size::new(200.0, 120.0), 20.0),
            Size::new(200.0, 120.0)
        );
    }

    #[test]
    fn test_overrides_replace_container() {
        let layout = Layout::new(Some(300.0), Some(40.0), true);
        assert_eq!(
            layout.target_size(Size::new(200.0, 120.0), 20.0),
            Size::new(300.0, 40.0)
        );
    }

    #[test]
    fn test_fit_keeps_aspect_ratio() {
        let image = Size::new(100.0, 50.0);
        assert_eq!(fit(Size::new(200.0, 200.0), image), Size::new(200.0, 100.0));
        assert_eq!(fit(Size::new(400.0, 100.0), image), Size::new(200.0, 100.0));
        assert_eq!(fit(Size::new(0.0, 100.0), image), Size::zero());
        assert_eq!(fit_scale(Size::new(10.0, 10.0), Size::zero()), 0.0);
    }

    #[test]
    fn test_rescale_offset_keeps_fraction() {
        assert_eq!(rescale_offset(50.0, 200.0, 400.0), 100.0);
        assert_eq!(rescale_offset(0.0, 200.0, 400.0), 0.0);
        assert_eq!(rescale_offset(50.0, 0.0, 400.0), 0.0);
    }

    #[test]
    fn test_backing_size() {
        let geometry = CanvasGeometry::new(Size::new(150.5, 80.0), 2.0);
        assert_eq!(geometry.backing_size(), (301, 160));
    }
}
