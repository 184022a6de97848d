use std::fmt;

use thiserror::Error;

/// Which of the two images an error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageRole {
    Foreground,
    Background,
}

impl fmt::Display for ImageRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ImageRole::Foreground => write!(f, "foreground"),
            ImageRole::Background => write!(f, "background"),
        }
    }
}

#[derive(Error, Debug)]
pub enum Error {
    #[error("[ImageFillProgressBar] Invalid container")]
    InvalidContainer,
    #[error("[ImageFillProgressBar] Invalid image source for the {0} image")]
    InvalidImageSource(ImageRole),
    #[error("[ImageFillProgressBar] Failed to load the {role} image: {reason}")]
    ImageLoad { role: ImageRole, reason: String },
    #[error("Unknown easing function: {0}")]
    UnknownEasing(String),
    #[error("Progress bar has been cleaned up")]
    Disposed,
    #[error("Progress bar is still loading its images")]
    InitInProgress,
    #[error("Image has no pixels")]
    EmptyImage,
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),
    #[error("SVG error: {0}")]
    Svg(#[from] resvg::usvg::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
