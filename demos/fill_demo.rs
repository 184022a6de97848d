//! Fill demo: animates a progress bar on a calloop event loop and writes the
//! final frame to a PNG.
//!
//! Run with:
//!
//! ```text
//! RUST_LOG=debug cargo run --example fill_demo -- [foreground] [background] [output.png]
//! ```
//!
//! Without arguments a day and a night gradient are generated in memory.

use std::cell::{Cell, RefCell};
use std::io::Cursor;
use std::rc::Rc;
use std::result::Result;
use std::thread;
use std::time::Duration;

use calloop::channel::{self, Event};
use calloop::EventLoop;
use image::{ImageFormat, Rgba, RgbaImage};
use imagefill::prelude::*;

/// A fixed-size "window" that owns the raster surface.
struct DemoElement {
    size: Cell<Size>,
    surface: Rc<RefCell<RasterSurface>>,
}

impl HostElement for DemoElement {
    fn bounding_box(&self) -> Size {
        self.size.get()
    }

    fn mount(&self) -> Mount {
        Mount {
            surface: Box::new(SharedSurface(Rc::clone(&self.surface))),
            numeric_display: Box::new(LogDisplay { visible: false }),
        }
    }
}

struct SharedSurface(Rc<RefCell<RasterSurface>>);

impl Surface for SharedSurface {
    fn resize(&mut self, size: Size, device_pixel_ratio: f32) {
        self.0.borrow_mut().resize(size, device_pixel_ratio);
    }

    fn size(&self) -> Size {
        self.0.borrow().size()
    }

    fn clear(&mut self) {
        self.0.borrow_mut().clear();
    }

    fn draw_image(&mut self, image: &LoadedImage, src: Rect, dst: Rect) {
        self.0.borrow_mut().draw_image(image, src, dst);
    }
}

/// Prints the numeric display to the log instead of drawing text.
struct LogDisplay {
    visible: bool,
}

impl NumericDisplay for LogDisplay {
    fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    fn set_markup(&mut self, markup: &str) {
        if self.visible {
            log::debug!("numeric display: {}%", markup);
        }
    }

    fn height(&self) -> f32 {
        24.0
    }
}

struct DemoDocument(Rc<DemoElement>);

impl HostDocument for DemoDocument {
    fn query(&self, selector: &str) -> Option<Rc<dyn HostElement>> {
        (selector == "#demo").then(|| Rc::clone(&self.0) as Rc<dyn HostElement>)
    }
}

fn gradient(width: u32, height: u32, from: [u8; 3], to: [u8; 3]) -> Vec<u8> {
    let image = RgbaImage::from_fn(width, height, |_, y| {
        let t = y as f32 / height.max(1) as f32;
        let mix = |a: u8, b: u8| (a as f32 + (b as f32 - a as f32) * t) as u8;
        Rgba([mix(from[0], to[0]), mix(from[1], to[1]), mix(from[2], to[2]), 255])
    });
    let mut bytes = Vec::new();
    if let Err(err) = image.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png) {
        log::error!("Failed to encode generated image: {}", err);
    }
    bytes
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let (foreground, background) = match (args.first(), args.get(1)) {
        (Some(fg), Some(bg)) => (ImageSource::from(fg.as_str()), ImageSource::from(bg.as_str())),
        _ => (
            ImageSource::from(gradient(320, 120, [255, 200, 80], [120, 190, 255])),
            ImageSource::from(gradient(320, 120, [20, 20, 60], [60, 40, 90])),
        ),
    };
    let output = args
        .get(2)
        .cloned()
        .unwrap_or_else(|| "fill_demo.png".to_string());

    let mut event_loop: EventLoop<'static, ()> = EventLoop::try_new()?;
    let scheduler = Rc::new(CalloopScheduler::new(event_loop.handle()));
    let notifier = Rc::new(ResizeNotifier::new());

    let surface = Rc::new(RefCell::new(RasterSurface::new()));
    let element = Rc::new(DemoElement {
        size: Cell::new(Size::new(320.0, 144.0)),
        surface: Rc::clone(&surface),
    });

    // Resize events arrive from outside the loop, like a compositor would send them
    let (resize_sender, resize_events) = channel::channel::<Size>();
    {
        let element = Rc::clone(&element);
        let notifier = Rc::clone(&notifier);
        event_loop
            .handle()
            .insert_source(resize_events, move |event, _, _| {
                if let Event::Msg(size) = event {
                    log::info!("Window resized to {}x{}", size.width, size.height);
                    element.size.set(size);
                    notifier.notify();
                }
            })
            .map_err(|err| err.error)?;
    }

    let completed = Rc::new(Cell::new(false));
    let config = {
        let completed = Rc::clone(&completed);
        ProgressBarConfig::new("#demo")
            .foreground(foreground)
            .background(background)
            .easing_name("easeOutBack")?
            .duration_ms(800.0)
            .on_complete(move || completed.set(true))
    };
    let platform = Platform::new(
        Rc::new(DemoDocument(Rc::clone(&element))),
        scheduler.clone(),
        notifier.clone(),
    );

    let bar = ImageFillProgressBar::new(config, platform)?;
    bar.init_blocking()?;

    let idle = |event_loop: &mut EventLoop<'static, ()>| -> Result<(), calloop::Error> {
        while scheduler.pending() > 0 {
            event_loop.dispatch(Some(Duration::from_millis(16)), &mut ())?;
        }
        Ok(())
    };
    idle(&mut event_loop)?;

    bar.update(40.0)?;
    idle(&mut event_loop)?;
    log::info!("Reached 40%, fill offset {}", bar.fill_offset());

    let resizer = thread::spawn(move || {
        thread::sleep(Duration::from_millis(300));
        if resize_sender.send(Size::new(480.0, 204.0)).is_err() {
            log::warn!("Event loop gone before resize");
        }
    });

    bar.update(100.0)?;
    idle(&mut event_loop)?;
    let _ = resizer.join();
    // Pick up the resize if it arrived after the run finished
    event_loop.dispatch(Some(Duration::from_millis(16)), &mut ())?;

    let size = bar.canvas_size();
    log::info!(
        "Done: {}x{} canvas, fill offset {}, completed {}",
        size.width,
        size.height,
        bar.fill_offset(),
        completed.get()
    );

    surface.borrow().save(&output)?;
    log::info!("Wrote {}", output);

    bar.clean_up();
    Ok(())
}
