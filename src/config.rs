use std::fmt;
use std::rc::Rc;

use crate::animation::EasingFunction;
use crate::error::{Error, ImageRole, Result};
use crate::geometry::Axis;
use crate::host::ContainerRef;
use crate::layout::Layout;
use crate::source::ImageSource;

/// Formats the interpolated progress value into numeric display markup.
pub type NumericFormatter = Rc<dyn Fn(f32) -> String>;

/// Called when an animation run reaches 100%.
pub type CompleteCallback = Rc<dyn Fn()>;

/// Configuration for an [`ImageFillProgressBar`](crate::ImageFillProgressBar).
///
/// Use the builder methods to override the defaults:
///
/// ```
/// use imagefill::{EasingFunction, ProgressBarConfig};
///
/// let config = ProgressBarConfig::new("#water-goal")
///     .background("assets/bottle-empty.png")
///     .foreground("assets/bottle-full.png")
///     .duration_ms(1500.0)
///     .draw_vertical(true)
///     .easing(EasingFunction::EaseOutBack)
///     .numeric_display_formatter(|value| format!("{:.0} ml", value * 20.0));
/// assert!(config.validate().is_ok());
/// ```
#[derive(Clone)]
pub struct ProgressBarConfig {
    /// Element (or lookup key of the element) to mount into.
    pub container: ContainerRef,
    /// Image shown where the bar is not yet filled.
    pub background: Option<ImageSource>,
    /// Image revealed as progress grows.
    pub foreground: Option<ImageSource>,
    /// Duration of one animation run in milliseconds.
    pub animation_duration_ms: f32,
    /// Whether to show the numeric display.
    pub show_numeric_display: bool,
    /// Formatter for the numeric display, called once per frame.
    pub numeric_display_formatter: NumericFormatter,
    /// Called when a run reaches 100%.
    pub on_complete: CompleteCallback,
    /// Curve applied to the fill offset.
    pub easing: EasingFunction,
    /// Fill bottom-to-top instead of left-to-right.
    pub draw_vertical: bool,
    /// Width in pixels, replacing the container's width.
    pub width: Option<f32>,
    /// Height in pixels, replacing the container's height.
    pub height: Option<f32>,
}

impl Default for ProgressBarConfig {
    fn default() -> Self {
        Self {
            container: ContainerRef::default(),
            background: None,
            foreground: None,
            animation_duration_ms: 1000.0,
            show_numeric_display: true,
            numeric_display_formatter: Rc::new(|value| value.floor().to_string()),
            on_complete: Rc::new(|| {}),
            easing: EasingFunction::default(),
            draw_vertical: false,
            width: None,
            height: None,
        }
    }
}

impl ProgressBarConfig {
    /// Create a configuration with default values for `container`.
    pub fn new(container: impl Into<ContainerRef>) -> Self {
        Self {
            container: container.into(),
            ..Self::default()
        }
    }

    pub fn container(mut self, container: impl Into<ContainerRef>) -> Self {
        self.container = container.into();
        self
    }

    pub fn background(mut self, source: impl Into<ImageSource>) -> Self {
        self.background = Some(source.into());
        self
    }

    pub fn foreground(mut self, source: impl Into<ImageSource>) -> Self {
        self.foreground = Some(source.into());
        self
    }

    pub fn duration_ms(mut self, duration_ms: f32) -> Self {
        self.animation_duration_ms = duration_ms;
        self
    }

    pub fn show_numeric_display(mut self, show: bool) -> Self {
        self.show_numeric_display = show;
        self
    }

    pub fn numeric_display_formatter<F>(mut self, formatter: F) -> Self
    where
        F: Fn(f32) -> String + 'static,
    {
        self.numeric_display_formatter = Rc::new(formatter);
        self
    }

    pub fn on_complete<F>(mut self, callback: F) -> Self
    where
        F: Fn() + 'static,
    {
        self.on_complete = Rc::new(callback);
        self
    }

    pub fn easing(mut self, easing: EasingFunction) -> Self {
        self.easing = easing;
        self
    }

    /// Select the easing curve by name, e.g. `"easeOutQuint"`.
    pub fn easing_name(self, name: &str) -> Result<Self> {
        Ok(self.easing(name.parse()?))
    }

    pub fn draw_vertical(mut self, vertical: bool) -> Self {
        self.draw_vertical = vertical;
        self
    }

    pub fn width(mut self, width: f32) -> Self {
        self.width = Some(width);
        self
    }

    pub fn height(mut self, height: f32) -> Self {
        self.height = Some(height);
        self
    }

    /// Fill axis selected by [`draw_vertical`](Self::draw_vertical).
    pub fn axis(&self) -> Axis {
        if self.draw_vertical {
            Axis::Vertical
        } else {
            Axis::Horizontal
        }
    }

    pub(crate) fn layout(&self) -> Layout {
        Layout::new(self.width, self.height, self.show_numeric_display)
    }

    /// Check the required fields.
    ///
    /// Container lookup itself happens at init time; here only an empty
    /// lookup key is rejected.
    pub fn validate(&self) -> Result<()> {
        if let ContainerRef::Selector(selector) = &self.container {
            if selector.trim().is_empty() {
                return Err(Error::InvalidContainer);
            }
        }
        check_source(self.foreground.as_ref(), ImageRole::Foreground)?;
        check_source(self.background.as_ref(), ImageRole::Background)?;
        Ok(())
    }
}

fn check_source(source: Option<&ImageSource>, role: ImageRole) -> Result<()> {
    match source {
        Some(source) if !source.is_empty() => Ok(()),
        _ => Err(Error::InvalidImageSource(role)),
    }
}

impl fmt::Debug for ProgressBarConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProgressBarConfig")
            .field("container", &self.container)
            .field("background", &self.background)
            .field("foreground", &self.foreground)
            .field("animation_duration_ms", &self.animation_duration_ms)
            .field("show_numeric_display", &self.show_numeric_display)
            .field("easing", &self.easing)
            .field("draw_vertical", &self.draw_vertical)
            .field("width", &self.width)
            .field("height", &self.height)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid() -> ProgressBarConfig {
        ProgressBarConfig::new("#city")
            .background("city-night.png")
            .foreground("city-day.png")
    }

    #[test]
    fn test_defaults() {
        let config = ProgressBarConfig::default();
        assert_eq!(config.animation_duration_ms, 1000.0);
        assert!(config.show_numeric_display);
        assert!(!config.draw_vertical);
        assert_eq!(config.easing.name(), Some("easeOutQuint"));
        assert_eq!((config.numeric_display_formatter)(42.9), "42");
        assert_eq!(config.axis(), Axis::Horizontal);
    }

    #[test]
    fn test_validate_requires_container() {
        let config = valid().container("  ");
        assert!(matches!(config.validate(), Err(Error::InvalidContainer)));
    }

    #[test]
    fn test_validate_requires_sources() {
        let mut config = valid();
        config.foreground = None;
        assert!(matches!(
            config.validate(),
            Err(Error::InvalidImageSource(ImageRole::Foreground))
        ));

        let config = valid().background("");
        assert!(matches!(
            config.validate(),
            Err(Error::InvalidImageSource(ImageRole::Background))
        ));

        assert!(valid().validate().is_ok());
    }

    #[test]
    fn test_easing_name() {
        let config = valid().easing_name("linear").unwrap();
        assert_eq!(config.easing.name(), Some("linear"));
        assert!(valid().easing_name("wobble").is_err());
    }
}
