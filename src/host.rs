//! The host environment a progress bar is mounted into.
//!
//! The widget only sees its surroundings through these traits: a container
//! element it measures and mounts its canvas and numeric display into, a
//! document to look containers up by key, and a source of resize
//! notifications. Together with a [`FrameScheduler`] and an [`ImageLoader`]
//! they form the [`Platform`] handed to the widget.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::geometry::Size;
use crate::scheduler::FrameScheduler;
use crate::source::{DecodingImageLoader, ImageLoader};
use crate::surface::Surface;

/// An element the progress bar can be mounted into.
pub trait HostElement {
    /// Current bounding box size in logical pixels.
    fn bounding_box(&self) -> Size;

    /// Whether the element is a real, attachable element.
    fn is_attached(&self) -> bool {
        true
    }

    /// Ratio of backing pixels to logical pixels.
    fn device_pixel_ratio(&self) -> f32 {
        1.0
    }

    /// Create the canvas and the numeric display inside this element.
    fn mount(&self) -> Mount;
}

/// What [`HostElement::mount`] creates.
pub struct Mount {
    pub surface: Box<dyn Surface>,
    pub numeric_display: Box<dyn NumericDisplay>,
}

/// Text overlay showing the interpolated progress value.
pub trait NumericDisplay {
    fn set_visible(&mut self, visible: bool);

    /// Replace the displayed content with formatted markup.
    fn set_markup(&mut self, markup: &str);

    /// Height the display occupies inside the container, in logical pixels.
    fn height(&self) -> f32;
}

/// Looks up container elements by key.
pub trait HostDocument {
    fn query(&self, selector: &str) -> Option<Rc<dyn HostElement>>;
}

/// A container given either directly or as a lookup key.
#[derive(Clone)]
pub enum ContainerRef {
    Selector(String),
    Element(Rc<dyn HostElement>),
}

impl Default for ContainerRef {
    fn default() -> Self {
        ContainerRef::Selector(String::new())
    }
}

impl fmt::Debug for ContainerRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContainerRef::Selector(selector) => write!(f, "Selector({:?})", selector),
            ContainerRef::Element(_) => write!(f, "Element"),
        }
    }
}

impl From<&str> for ContainerRef {
    fn from(selector: &str) -> Self {
        ContainerRef::Selector(selector.to_string())
    }
}

impl From<String> for ContainerRef {
    fn from(selector: String) -> Self {
        ContainerRef::Selector(selector)
    }
}

impl From<Rc<dyn HostElement>> for ContainerRef {
    fn from(element: Rc<dyn HostElement>) -> Self {
        ContainerRef::Element(element)
    }
}

/// Identifies a subscribed resize listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

impl ListenerId {
    /// Create a new unique listener ID.
    pub fn next() -> Self {
        static COUNTER: AtomicU64 = AtomicU64::new(0);
        ListenerId(COUNTER.fetch_add(1, Ordering::Relaxed))
    }
}

pub type ResizeListener = Box<dyn FnMut()>;

/// Source of viewport resize notifications.
pub trait ResizeSource {
    fn subscribe(&self, listener: ResizeListener) -> ListenerId;
    fn unsubscribe(&self, id: ListenerId);
}

/// In-process resize broadcaster.
///
/// Hosts call [`notify`](ResizeNotifier::notify) whenever their viewport
/// changes size.
#[derive(Default)]
pub struct ResizeNotifier {
    listeners: RefCell<Vec<(ListenerId, Rc<RefCell<ResizeListener>>)>>,
}

impl ResizeNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.borrow().len()
    }

    /// Call every subscribed listener once.
    pub fn notify(&self) {
        // Listeners may unsubscribe while being notified
        let listeners: Vec<_> = self
            .listeners
            .borrow()
            .iter()
            .map(|(_, listener)| Rc::clone(listener))
            .collect();
        for listener in listeners {
            let mut listener = listener.borrow_mut();
            let listener: &mut dyn FnMut() = &mut **listener;
            listener();
        }
    }
}

impl ResizeSource for ResizeNotifier {
    fn subscribe(&self, listener: ResizeListener) -> ListenerId {
        let id = ListenerId::next();
        self.listeners
            .borrow_mut()
            .push((id, Rc::new(RefCell::new(listener))));
        id
    }

    fn unsubscribe(&self, id: ListenerId) {
        self.listeners.borrow_mut().retain(|(other, _)| *other != id);
    }
}

/// External collaborators a progress bar runs against.
#[derive(Clone)]
pub struct Platform {
    pub document: Rc<dyn HostDocument>,
    pub scheduler: Rc<dyn FrameScheduler>,
    pub resize: Rc<dyn ResizeSource>,
    pub loader: Rc<dyn ImageLoader>,
}

impl Platform {
    /// Create a platform decoding images with [`DecodingImageLoader`].
    pub fn new(
        document: Rc<dyn HostDocument>,
        scheduler: Rc<dyn FrameScheduler>,
        resize: Rc<dyn ResizeSource>,
    ) -> Self {
        Self {
            document,
            scheduler,
            resize,
            loader: Rc::new(DecodingImageLoader::new()),
        }
    }

    /// Replace the image loader.
    pub fn loader(mut self, loader: Rc<dyn ImageLoader>) -> Self {
        self.loader = loader;
        self
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::*;

    #[test]
    fn test_notify_reaches_every_listener() {
        let notifier = ResizeNotifier::new();
        let calls = Rc::new(Cell::new(0));
        for _ in 0..2 {
            let calls = calls.clone();
            notifier.subscribe(Box::new(move || calls.set(calls.get() + 1)));
        }
        notifier.notify();
        assert_eq!(calls.get(), 2);
    }

    #[test]
    fn test_unsubscribe() {
        let notifier = ResizeNotifier::new();
        let calls = Rc::new(Cell::new(0));
        let counter = calls.clone();
        let id = notifier.subscribe(Box::new(move || counter.set(counter.get() + 1)));
        notifier.unsubscribe(id);
        notifier.notify();
        assert_eq!(calls.get(), 0);
        assert_eq!(notifier.listener_count(), 0);
    }

    #[test]
    fn test_container_ref_from_selector() {
        let container = ContainerRef::from("#city");
        assert_eq!(format!("{:?}", container), "Selector(\"#city\")");
    }
}
