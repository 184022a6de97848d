//! The progress bar widget.
//!
//! ```ignore
//! let bar = ImageFillProgressBar::new(
//!     ProgressBarConfig::new("#city")
//!         .background("city-night.png")
//!         .foreground("city-day.png")
//!         .on_complete(|| log::info!("done")),
//!     platform,
//! )?;
//! bar.init_blocking()?;
//! bar.update(40.0)?;
//! ```
//!
//! All state lives behind one `Rc<RefCell<..>>`. Frame callbacks hold a weak
//! reference plus the [`AnimationRun`] they continue, so a dropped or
//! cleaned-up widget never runs another frame, and a superseded run is
//! cancelled through its pending [`FrameHandle`].

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use crate::animation::{iteration_count, AnimationRun};
use crate::compositor::Compositor;
use crate::config::ProgressBarConfig;
use crate::error::{Error, ImageRole, Result};
use crate::geometry::Size;
use crate::host::{ContainerRef, HostElement, ListenerId, NumericDisplay, Platform};
use crate::layout::{rescale_offset, CanvasGeometry};
use crate::scheduler::FrameHandle;
use crate::source::{ImageLoader, ImageSource, LoadedImage};
use crate::surface::Surface;

/// Where a progress bar is in its life.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    /// Constructed, `init` not called yet (or a previous `init` failed).
    Uninitialized,
    /// Waiting for both images to load.
    Initializing,
    /// Painted and idle.
    Ready,
    /// An animation run is scheduled.
    Animating,
    /// Cleaned up; no further callbacks fire.
    Disposed,
}

/// A progress indicator revealing a foreground image over a background image.
pub struct ImageFillProgressBar {
    inner: Rc<RefCell<Inner>>,
}

/// Everything that exists only once the widget is mounted.
struct View {
    container: Rc<dyn HostElement>,
    surface: Box<dyn Surface>,
    numeric_display: Box<dyn NumericDisplay>,
    foreground: LoadedImage,
    background: LoadedImage,
}

struct Inner {
    config: ProgressBarConfig,
    platform: Platform,
    compositor: Compositor,
    state: LifecycleState,
    progress: f32,
    previous_progress: f32,
    fill_offset: f32,
    geometry: CanvasGeometry,
    iteration_count: u32,
    pending_frame: Option<FrameHandle>,
    resize_listener: Option<ListenerId>,
    view: Option<View>,
}

impl ImageFillProgressBar {
    /// Create a progress bar, validating `config` eagerly.
    pub fn new(config: ProgressBarConfig, platform: Platform) -> Result<Self> {
        config.validate()?;
        let compositor = Compositor::new(config.axis());
        let inner = Inner {
            config,
            platform,
            compositor,
            state: LifecycleState::Uninitialized,
            progress: 0.0,
            previous_progress: 0.0,
            fill_offset: 0.0,
            geometry: CanvasGeometry::default(),
            iteration_count: 0,
            pending_frame: None,
            resize_listener: None,
            view: None,
        };
        Ok(Self {
            inner: Rc::new(RefCell::new(inner)),
        })
    }

    /// Load both images, mount into the container and paint the first frame.
    ///
    /// On failure nothing is mounted and the widget stays uninitialized, so
    /// `init` can be retried. Calling `init` again while the first call is
    /// still loading fails with [`Error::InitInProgress`]; calling it once
    /// the widget is ready does nothing.
    pub async fn init(&self) -> Result<()> {
        let (container, loader, foreground, background) = {
            let mut inner = self.inner.borrow_mut();
            match inner.state {
                LifecycleState::Uninitialized => {}
                LifecycleState::Disposed => return Err(Error::Disposed),
                LifecycleState::Initializing => return Err(Error::InitInProgress),
                state => {
                    log::warn!("init called on a progress bar that is {:?}", state);
                    return Ok(());
                }
            }

            let container = inner.resolve_container()?;
            let (foreground, background) = inner.sources()?;
            inner.iteration_count = iteration_count(inner.config.animation_duration_ms);
            inner.state = LifecycleState::Initializing;
            (
                container,
                Rc::clone(&inner.platform.loader),
                foreground,
                background,
            )
        };

        log::debug!("Loading images for progress bar");
        let loaded = load_images(&*loader, &foreground, &background).await;

        let progress = {
            let mut inner = self.inner.borrow_mut();
            if inner.state == LifecycleState::Disposed {
                return Err(Error::Disposed);
            }
            let (foreground, background) = match loaded {
                Ok(images) => images,
                Err(err) => {
                    log::error!("Progress bar initialization failed: {}", err);
                    inner.state = LifecycleState::Uninitialized;
                    return Err(err);
                }
            };

            inner.mount(container, foreground, background);
            let listener = Inner::listen_for_resize(&self.inner, &inner.platform);
            inner.resize_listener = Some(listener);
            inner.update_canvas_size();
            inner.state = LifecycleState::Ready;

            log::info!(
                "Progress bar ready: {}x{} logical, ratio {}, {} iterations per run",
                inner.geometry.size.width,
                inner.geometry.size.height,
                inner.geometry.device_pixel_ratio,
                inner.iteration_count
            );
            inner.progress
        };

        Inner::show_numeric(&self.inner, progress);
        Inner::animate(&self.inner);
        Ok(())
    }

    /// Run [`init`](Self::init) to completion on the current thread.
    pub fn init_blocking(&self) -> Result<()> {
        pollster::block_on(self.init())
    }

    /// Animate towards `progress` percent, superseding any run in flight.
    ///
    /// Values outside `[0, 100]` are clamped. Before `init` the value is only
    /// recorded; `init` animates to it. After [`clean_up`](Self::clean_up)
    /// this returns [`Error::Disposed`].
    pub fn update(&self, progress: f32) -> Result<()> {
        {
            let mut inner = self.inner.borrow_mut();
            if inner.state == LifecycleState::Disposed {
                log::warn!("update({}) called after clean_up", progress);
                return Err(Error::Disposed);
            }
            if progress.is_nan() {
                log::warn!("Ignoring NaN progress");
                return Ok(());
            }

            let clamped = progress.clamp(0.0, 100.0);
            if clamped != progress {
                log::warn!("Progress {} outside [0, 100], clamped to {}", progress, clamped);
            }

            inner.previous_progress = inner.progress;
            inner.progress = clamped;
            inner.cancel_pending_frame();

            if !matches!(
                inner.state,
                LifecycleState::Ready | LifecycleState::Animating
            ) {
                log::debug!("Recorded progress {} before init", clamped);
                return Ok(());
            }
        }

        Inner::animate(&self.inner);
        Ok(())
    }

    /// Recompute the canvas size from the container and redraw the current
    /// frame. Called automatically on every resize notification.
    pub fn resize(&self) {
        Inner::on_resize(&self.inner);
    }

    /// Stop all scheduled work and detach the resize listener. Idempotent.
    pub fn clean_up(&self) {
        self.inner.borrow_mut().dispose();
    }

    pub fn state(&self) -> LifecycleState {
        self.inner.borrow().state
    }

    /// Last progress target set via [`update`](Self::update).
    pub fn progress(&self) -> f32 {
        self.inner.borrow().progress
    }

    /// Progress target in effect before the last update.
    pub fn previous_progress(&self) -> f32 {
        self.inner.borrow().previous_progress
    }

    /// Fill offset of the last rendered frame, in logical pixels.
    pub fn fill_offset(&self) -> f32 {
        self.inner.borrow().fill_offset
    }

    /// Logical canvas size.
    pub fn canvas_size(&self) -> Size {
        self.inner.borrow().geometry.size
    }

    pub fn iteration_count(&self) -> u32 {
        self.inner.borrow().iteration_count
    }
}

impl Drop for ImageFillProgressBar {
    fn drop(&mut self) {
        if let Ok(mut inner) = self.inner.try_borrow_mut() {
            inner.dispose();
        }
    }
}

async fn load_images(
    loader: &dyn ImageLoader,
    foreground: &ImageSource,
    background: &ImageSource,
) -> Result<(LoadedImage, LoadedImage)> {
    let foreground = loader
        .load(foreground)
        .await
        .map_err(|err| load_error(ImageRole::Foreground, err))?;
    let background = loader
        .load(background)
        .await
        .map_err(|err| load_error(ImageRole::Background, err))?;
    Ok((foreground, background))
}

fn load_error(role: ImageRole, err: Error) -> Error {
    Error::ImageLoad {
        role,
        reason: err.to_string(),
    }
}

impl Inner {
    fn resolve_container(&self) -> Result<Rc<dyn HostElement>> {
        let element = match &self.config.container {
            ContainerRef::Selector(selector) => self
                .platform
                .document
                .query(selector)
                .ok_or(Error::InvalidContainer)?,
            ContainerRef::Element(element) => Rc::clone(element),
        };
        if !element.is_attached() {
            return Err(Error::InvalidContainer);
        }
        Ok(element)
    }

    fn sources(&self) -> Result<(ImageSource, ImageSource)> {
        let foreground = self
            .config
            .foreground
            .clone()
            .ok_or(Error::InvalidImageSource(ImageRole::Foreground))?;
        let background = self
            .config
            .background
            .clone()
            .ok_or(Error::InvalidImageSource(ImageRole::Background))?;
        Ok((foreground, background))
    }

    fn mount(
        &mut self,
        container: Rc<dyn HostElement>,
        foreground: LoadedImage,
        background: LoadedImage,
    ) {
        let mount = container.mount();
        let mut numeric_display = mount.numeric_display;
        numeric_display.set_visible(self.config.show_numeric_display);
        self.view = Some(View {
            container,
            surface: mount.surface,
            numeric_display,
            foreground,
            background,
        });
    }

    fn listen_for_resize(this: &Rc<RefCell<Inner>>, platform: &Platform) -> ListenerId {
        let weak = Rc::downgrade(this);
        platform.resize.subscribe(Box::new(move || {
            if let Some(inner) = weak.upgrade() {
                Inner::on_resize(&inner);
            }
        }))
    }

    fn axis_size(&self) -> f32 {
        self.compositor.axis().extent(self.geometry.size)
    }

    /// Recompute canvas geometry, keeping the reveal fraction of the current
    /// fill offset.
    fn update_canvas_size(&mut self) {
        let Some(view) = self.view.as_mut() else {
            return;
        };
        let geometry = self.config.layout().compute(
            &*view.container,
            &*view.numeric_display,
            view.foreground.intrinsic_size(),
        );

        let axis = self.compositor.axis();
        let old_axis = axis.extent(self.geometry.size);
        let new_axis = axis.extent(geometry.size);
        self.fill_offset = rescale_offset(self.fill_offset, old_axis, new_axis);

        view.surface
            .resize(geometry.size, geometry.device_pixel_ratio);
        self.geometry = geometry;
    }

    fn draw(&mut self, offset: f32) {
        if let Some(view) = self.view.as_mut() {
            self.compositor.draw_frame(
                &mut *view.surface,
                offset,
                &view.foreground,
                &view.background,
            );
        }
    }

    /// Format `value` and write it to the numeric display.
    ///
    /// The formatter runs with no borrow held so it may read the widget.
    fn show_numeric(this: &Rc<RefCell<Inner>>, value: f32) {
        let formatter = {
            let inner = this.borrow();
            if !inner.config.show_numeric_display || inner.view.is_none() {
                return;
            }
            Rc::clone(&inner.config.numeric_display_formatter)
        };
        let markup = formatter(value);
        if let Some(view) = this.borrow_mut().view.as_mut() {
            view.numeric_display.set_markup(&markup);
        }
    }

    fn cancel_pending_frame(&mut self) {
        if let Some(handle) = self.pending_frame.take() {
            self.platform.scheduler.cancel(handle);
        }
    }

    fn on_resize(this: &Rc<RefCell<Inner>>) {
        let mut inner = this.borrow_mut();
        if !matches!(
            inner.state,
            LifecycleState::Ready | LifecycleState::Animating
        ) {
            return;
        }
        let old_size = inner.geometry.size;
        inner.update_canvas_size();
        let offset = inner.fill_offset;
        inner.draw(offset);
        log::debug!(
            "Resized canvas from {}x{} to {}x{}, fill offset {}",
            old_size.width,
            old_size.height,
            inner.geometry.size.width,
            inner.geometry.size.height,
            offset
        );
    }

    /// Start a run from the rendered offset towards the current target.
    fn animate(this: &Rc<RefCell<Inner>>) {
        let run = {
            let mut inner = this.borrow_mut();
            inner.cancel_pending_frame();
            let run = AnimationRun::new(
                inner.fill_offset,
                inner.progress,
                inner.previous_progress,
                inner.axis_size(),
                inner.iteration_count,
            );
            log::debug!(
                "Animating fill from {} to {} ({} -> {}%)",
                run.start_offset(),
                run.target_offset(),
                inner.previous_progress,
                inner.progress
            );
            inner.state = LifecycleState::Animating;
            run
        };
        Inner::schedule(this, run);
    }

    fn schedule(this: &Rc<RefCell<Inner>>, run: AnimationRun) {
        let weak: Weak<RefCell<Inner>> = Rc::downgrade(this);
        let mut inner = this.borrow_mut();
        let handle = inner.platform.scheduler.schedule(Box::new(move || {
            if let Some(inner) = weak.upgrade() {
                Inner::step(&inner, run);
            }
        }));
        inner.pending_frame = Some(handle);
    }

    /// Render one frame of `run` and schedule the next.
    fn step(this: &Rc<RefCell<Inner>>, mut run: AnimationRun) {
        let frame = {
            let mut inner = this.borrow_mut();
            inner.pending_frame = None;
            if inner.state == LifecycleState::Disposed {
                return;
            }

            // A resize since the last frame changed the axis under the run
            run.fit_axis(inner.axis_size());
            let Some(frame) = run.step(&inner.config.easing) else {
                inner.state = LifecycleState::Ready;
                return;
            };

            inner.draw(frame.offset);
            inner.fill_offset = frame.offset;
            if frame.is_last {
                inner.state = LifecycleState::Ready;
            }
            frame
        };

        if !frame.is_last {
            Inner::schedule(this, run);
        }
        Inner::show_numeric(this, frame.numeric);

        if frame.completes {
            log::info!("Progress bar reached 100%");
            let on_complete = Rc::clone(&this.borrow().config.on_complete);
            on_complete();
        }
    }

    fn dispose(&mut self) {
        if self.state == LifecycleState::Disposed {
            return;
        }
        self.cancel_pending_frame();
        if let Some(listener) = self.resize_listener.take() {
            self.platform.resize.unsubscribe(listener);
        }
        self.state = LifecycleState::Disposed;
        log::debug!("Progress bar cleaned up");
    }
}
