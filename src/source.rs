//! Image sources and decoding.
//!
//! Supports PNG, JPEG, GIF, WebP raster formats and SVG vector graphics.
//! Decoded images are kept as straight-alpha RGBA pixels together with their
//! intrinsic size, which is what layout uses for the aspect ratio.

use std::future::Future;
use std::path::PathBuf;
use std::pin::Pin;
use std::sync::Arc;

use image::{Rgba, RgbaImage};

use crate::error::{Error, Result};
use crate::geometry::Size;

/// Quality multiplier for SVG rasterization.
/// Higher values produce crisper SVGs when the canvas is scaled up.
pub const SVG_QUALITY_MULTIPLIER: f32 = 2.0;

/// Source for an image - can be a file path or in-memory bytes.
#[derive(Debug, Clone, PartialEq)]
pub enum ImageSource {
    /// Raster image from a file path (PNG, JPEG, GIF, WebP)
    Path(PathBuf),
    /// Raster image from in-memory bytes
    Bytes(Arc<[u8]>),
    /// SVG from a file path
    SvgPath(PathBuf),
    /// SVG from in-memory bytes
    SvgBytes(Arc<[u8]>),
}

impl ImageSource {
    /// An empty path or byte buffer can never produce an image.
    pub fn is_empty(&self) -> bool {
        match self {
            ImageSource::Path(path) | ImageSource::SvgPath(path) => path.as_os_str().is_empty(),
            ImageSource::Bytes(bytes) | ImageSource::SvgBytes(bytes) => bytes.is_empty(),
        }
    }
}

impl From<&str> for ImageSource {
    fn from(path: &str) -> Self {
        ImageSource::from(PathBuf::from(path))
    }
}

impl From<String> for ImageSource {
    fn from(path: String) -> Self {
        ImageSource::from(PathBuf::from(path))
    }
}

impl From<PathBuf> for ImageSource {
    fn from(path: PathBuf) -> Self {
        if path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("svg"))
        {
            ImageSource::SvgPath(path)
        } else {
            ImageSource::Path(path)
        }
    }
}

impl From<Vec<u8>> for ImageSource {
    fn from(bytes: Vec<u8>) -> Self {
        ImageSource::Bytes(bytes.into())
    }
}

/// A decoded image ready for compositing.
#[derive(Debug, Clone)]
pub struct LoadedImage {
    pixels: RgbaImage,
    intrinsic: Size,
}

impl LoadedImage {
    /// Wrap decoded pixels; the intrinsic size is the pixel size.
    pub fn from_rgba(pixels: RgbaImage) -> Self {
        let intrinsic = Size::new(pixels.width() as f32, pixels.height() as f32);
        Self { pixels, intrinsic }
    }

    /// Wrap pixels rasterized at a different resolution than the image's
    /// intrinsic size (SVG rendered at a quality multiplier).
    pub fn with_intrinsic_size(pixels: RgbaImage, intrinsic: Size) -> Self {
        Self { pixels, intrinsic }
    }

    pub fn pixels(&self) -> &RgbaImage {
        &self.pixels
    }

    /// Intrinsic width in image pixels.
    pub fn width(&self) -> f32 {
        self.intrinsic.width
    }

    /// Intrinsic height in image pixels.
    pub fn height(&self) -> f32 {
        self.intrinsic.height
    }

    pub fn intrinsic_size(&self) -> Size {
        self.intrinsic
    }
}

/// Future returned by [`ImageLoader::load`].
pub type LoadFuture<'a> = Pin<Box<dyn Future<Output = Result<LoadedImage>> + 'a>>;

/// Image-loading primitive: source in, decoded image with intrinsic size out.
pub trait ImageLoader {
    fn load<'a>(&'a self, source: &'a ImageSource) -> LoadFuture<'a>;
}

/// Loader that decodes sources with the `image` crate and rasterizes SVGs
/// with `resvg`.
#[derive(Debug, Clone)]
pub struct DecodingImageLoader {
    svg_scale: f32,
}

impl DecodingImageLoader {
    pub fn new() -> Self {
        Self {
            svg_scale: SVG_QUALITY_MULTIPLIER,
        }
    }

    /// Scale SVGs are rasterized at, relative to their intrinsic size.
    pub fn svg_scale(mut self, scale: f32) -> Self {
        self.svg_scale = scale;
        self
    }
}

impl Default for DecodingImageLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl ImageLoader for DecodingImageLoader {
    fn load<'a>(&'a self, source: &'a ImageSource) -> LoadFuture<'a> {
        Box::pin(async move { decode(source, self.svg_scale) })
    }
}

/// Decode `source` synchronously.
pub fn decode(source: &ImageSource, svg_scale: f32) -> Result<LoadedImage> {
    let loaded = match source {
        ImageSource::Path(path) => LoadedImage::from_rgba(image::open(path)?.to_rgba8()),
        ImageSource::Bytes(bytes) => {
            LoadedImage::from_rgba(image::load_from_memory(bytes)?.to_rgba8())
        }
        ImageSource::SvgPath(path) => {
            let data = std::fs::read(path)?;
            rasterize_svg(&data, svg_scale)?
        }
        ImageSource::SvgBytes(bytes) => rasterize_svg(bytes, svg_scale)?,
    };

    if loaded.intrinsic_size().is_empty() || loaded.pixels().width() == 0 {
        return Err(Error::EmptyImage);
    }
    Ok(loaded)
}

/// Rasterize SVG data at `scale` times its intrinsic size.
fn rasterize_svg(bytes: &[u8], scale: f32) -> Result<LoadedImage> {
    let tree = resvg::usvg::Tree::from_data(bytes, &resvg::usvg::Options::default())?;
    let size = tree.size();

    let scaled_width = (size.width() * scale).ceil() as u32;
    let scaled_height = (size.height() * scale).ceil() as u32;

    let mut pixmap =
        resvg::tiny_skia::Pixmap::new(scaled_width, scaled_height).ok_or(Error::EmptyImage)?;
    let transform = resvg::tiny_skia::Transform::from_scale(scale, scale);
    resvg::render(&tree, transform, &mut pixmap.as_mut());

    // Pixmap data is premultiplied; compositing works on straight alpha
    let mut pixels = RgbaImage::new(scaled_width, scaled_height);
    for (dst, src) in pixels.pixels_mut().zip(pixmap.pixels()) {
        let color = src.demultiply();
        *dst = Rgba([color.red(), color.green(), color.blue(), color.alpha()]);
    }

    Ok(LoadedImage::with_intrinsic_size(
        pixels,
        Size::new(size.width(), size.height()),
    ))
}
