#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::io::Cursor;
use std::rc::Rc;

use image::{ImageFormat, Rgba, RgbaImage};
use imagefill::prelude::*;

pub const RED: Rgba<u8> = Rgba([255, 0, 0, 255]);
pub const BLUE: Rgba<u8> = Rgba([0, 0, 255, 255]);

/// Encode a solid-color PNG in memory.
pub fn png_bytes(width: u32, height: u32, color: Rgba<u8>) -> Vec<u8> {
    let image = RgbaImage::from_pixel(width, height, color);
    let mut bytes = Vec::new();
    image
        .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
        .unwrap();
    bytes
}

#[derive(Debug, Clone, PartialEq)]
pub enum DrawCall {
    Clear,
    Image {
        color: Rgba<u8>,
        src: Rect,
        dst: Rect,
    },
}

pub struct SurfaceLog {
    pub size: Size,
    pub device_pixel_ratio: f32,
    pub resizes: usize,
    pub calls: Vec<DrawCall>,
}

impl SurfaceLog {
    /// Draw calls of the most recent frame.
    pub fn last_frame(&self) -> Vec<DrawCall> {
        let start = self
            .calls
            .iter()
            .rposition(|call| *call == DrawCall::Clear)
            .map(|i| i + 1)
            .unwrap_or(0);
        self.calls[start..].to_vec()
    }

    pub fn frames(&self) -> usize {
        self.calls
            .iter()
            .filter(|call| **call == DrawCall::Clear)
            .count()
    }

    /// Destination rectangle of the last blit of `color`.
    pub fn last_dst(&self, color: Rgba<u8>) -> Option<Rect> {
        self.last_frame().into_iter().find_map(|call| match call {
            DrawCall::Image { color: c, dst, .. } if c == color => Some(dst),
            _ => None,
        })
    }
}

/// Surface recording every call instead of rasterizing.
pub struct RecordingSurface {
    log: Rc<RefCell<SurfaceLog>>,
}

impl Surface for RecordingSurface {
    fn resize(&mut self, size: Size, device_pixel_ratio: f32) {
        let mut log = self.log.borrow_mut();
        log.size = size;
        log.device_pixel_ratio = device_pixel_ratio;
        log.resizes += 1;
    }

    fn size(&self) -> Size {
        self.log.borrow().size
    }

    fn clear(&mut self) {
        self.log.borrow_mut().calls.push(DrawCall::Clear);
    }

    fn draw_image(&mut self, image: &LoadedImage, src: Rect, dst: Rect) {
        let color = *image.pixels().get_pixel(0, 0);
        self.log
            .borrow_mut()
            .calls
            .push(DrawCall::Image { color, src, dst });
    }
}

#[derive(Default)]
pub struct NumericLog {
    pub visible: Option<bool>,
    pub markups: Vec<String>,
}

impl NumericLog {
    pub fn last(&self) -> Option<&str> {
        self.markups.last().map(String::as_str)
    }
}

pub struct FakeNumericDisplay {
    log: Rc<RefCell<NumericLog>>,
}

impl NumericDisplay for FakeNumericDisplay {
    fn set_visible(&mut self, visible: bool) {
        self.log.borrow_mut().visible = Some(visible);
    }

    fn set_markup(&mut self, markup: &str) {
        self.log.borrow_mut().markups.push(markup.to_string());
    }

    fn height(&self) -> f32 {
        if self.log.borrow().visible == Some(false) {
            0.0
        } else {
            20.0
        }
    }
}

pub struct FakeElement {
    pub size: Cell<Size>,
    pub device_pixel_ratio: f32,
    pub attached: bool,
    pub mounts: Cell<usize>,
    pub surface: Rc<RefCell<SurfaceLog>>,
    pub numeric: Rc<RefCell<NumericLog>>,
}

impl FakeElement {
    pub fn new(size: Size) -> Self {
        Self {
            size: Cell::new(size),
            device_pixel_ratio: 1.0,
            attached: true,
            mounts: Cell::new(0),
            surface: Rc::new(RefCell::new(SurfaceLog {
                size: Size::zero(),
                device_pixel_ratio: 1.0,
                resizes: 0,
                calls: Vec::new(),
            })),
            numeric: Rc::new(RefCell::new(NumericLog::default())),
        }
    }
}

impl HostElement for FakeElement {
    fn bounding_box(&self) -> Size {
        self.size.get()
    }

    fn is_attached(&self) -> bool {
        self.attached
    }

    fn device_pixel_ratio(&self) -> f32 {
        self.device_pixel_ratio
    }

    fn mount(&self) -> Mount {
        self.mounts.set(self.mounts.get() + 1);
        Mount {
            surface: Box::new(RecordingSurface {
                log: Rc::clone(&self.surface),
            }),
            numeric_display: Box::new(FakeNumericDisplay {
                log: Rc::clone(&self.numeric),
            }),
        }
    }
}

#[derive(Default)]
pub struct FakeDocument {
    elements: HashMap<String, Rc<FakeElement>>,
}

impl HostDocument for FakeDocument {
    fn query(&self, selector: &str) -> Option<Rc<dyn HostElement>> {
        self.elements
            .get(selector)
            .map(|element| Rc::clone(element) as Rc<dyn HostElement>)
    }
}

/// A widget environment with one container registered as `#bar`.
pub struct Harness {
    pub element: Rc<FakeElement>,
    pub scheduler: Rc<ManualScheduler>,
    pub resize: Rc<ResizeNotifier>,
    pub platform: Platform,
}

impl Harness {
    /// Container of 200x120 logical pixels; with the 20px numeric display
    /// and 100x50 images the canvas is 200x100.
    pub fn new() -> Self {
        Self::with_element(FakeElement::new(Size::new(200.0, 120.0)))
    }

    pub fn with_element(element: FakeElement) -> Self {
        let _ = env_logger::builder().is_test(true).try_init();
        let element = Rc::new(element);
        let mut document = FakeDocument::default();
        document
            .elements
            .insert("#bar".to_string(), Rc::clone(&element));

        let scheduler = Rc::new(ManualScheduler::new());
        let resize = Rc::new(ResizeNotifier::new());
        let platform = Platform::new(Rc::new(document), scheduler.clone(), resize.clone());
        Self {
            element,
            scheduler,
            resize,
            platform,
        }
    }

    /// Red foreground over blue background, 500ms runs (31 frames).
    pub fn config(&self) -> ProgressBarConfig {
        ProgressBarConfig::new("#bar")
            .foreground(png_bytes(100, 50, RED))
            .background(png_bytes(100, 50, BLUE))
            .duration_ms(500.0)
    }

    /// Construct, initialize and let the initial run finish.
    pub fn start(&self, config: ProgressBarConfig) -> ImageFillProgressBar {
        let bar = ImageFillProgressBar::new(config, self.platform.clone()).unwrap();
        bar.init_blocking().unwrap();
        self.settle();
        bar
    }

    /// Tick until no frame is pending.
    pub fn settle(&self) -> usize {
        self.scheduler.run_until_idle(1_000)
    }

    pub fn resize_to(&self, size: Size) {
        self.element.size.set(size);
        self.resize.notify();
    }
}
