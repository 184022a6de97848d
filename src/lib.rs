//! An image-fill progress bar.
//!
//! Progress is shown by revealing a foreground image on top of a background
//! image, left-to-right or bottom-to-top, with an eased animation between
//! progress values and an optional numeric display.
//!
//! The widget is host-agnostic. It measures and mounts into a
//! [`HostElement`](host::HostElement), draws through a
//! [`Surface`](surface::Surface), and advances its animation through a
//! [`FrameScheduler`](scheduler::FrameScheduler). [`RasterSurface`](surface::RasterSurface)
//! renders into an RGBA buffer, [`ManualScheduler`](scheduler::ManualScheduler)
//! is stepped by hand and [`CalloopScheduler`](scheduler::CalloopScheduler)
//! drives frames from a calloop event loop.

pub mod animation;
pub mod compositor;
pub mod config;
pub mod error;
pub mod geometry;
pub mod host;
pub mod layout;
pub mod progress_bar;
pub mod scheduler;
pub mod source;
pub mod surface;

pub use animation::EasingFunction;
pub use config::ProgressBarConfig;
pub use error::{Error, ImageRole, Result};
pub use host::Platform;
pub use progress_bar::{ImageFillProgressBar, LifecycleState};

pub mod prelude {
    pub use crate::animation::{EasingFunction, EASING_NAMES};
    pub use crate::config::ProgressBarConfig;
    pub use crate::error::{Error, ImageRole, Result};
    pub use crate::geometry::{Axis, Rect, Size};
    pub use crate::host::{
        ContainerRef, HostDocument, HostElement, Mount, NumericDisplay, Platform, ResizeNotifier,
        ResizeSource,
    };
    pub use crate::progress_bar::{ImageFillProgressBar, LifecycleState};
    pub use crate::scheduler::{CalloopScheduler, FrameScheduler, ManualScheduler};
    pub use crate::source::{DecodingImageLoader, ImageLoader, ImageSource, LoadedImage};
    pub use crate::surface::{RasterSurface, Surface};
}
