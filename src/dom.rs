//! Host-page model: the document, its media elements, and user activation.
//!
//! The booster core runs inside a page context; this module is the crate's
//! stand-in for that page. It is deliberately single-threaded (`Rc` +
//! interior mutability) - everything here happens on the page's event loop.

use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::sync::Arc;

use thiserror::Error;

use crate::nodes::ElementSource;

/// What kind of media element this is.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum MediaKind {
    Audio,
    Video,
}

/// Why a media element's audio output could not be routed.
///
/// Both cases are permanent for the element's lifetime: a retry will fail the
/// same way, so callers swallow these and move on.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("media source is cross-origin and not CORS-enabled")]
    CrossOrigin,
    #[error("element is already bound to an audio graph")]
    AlreadyBound,
}

/// A media-capable element: something with a decodable audio/video output.
///
/// The element's audio output can be bound into a graph exactly once
/// ([`create_source`](Self::create_source)); the platform does not support
/// re-binding, so the second attempt fails with [`SourceError::AlreadyBound`].
pub struct MediaElement {
    kind: MediaKind,
    samples: Arc<[f32]>,
    looping: bool,
    cross_origin: bool,
    bound: Cell<bool>,
}

impl MediaElement {
    /// An `<audio>`-style element with the given decoded samples.
    pub fn audio(samples: Vec<f32>) -> Self {
        Self::with_kind(MediaKind::Audio, samples)
    }

    /// A `<video>`-style element (only its audio track matters here).
    pub fn video(samples: Vec<f32>) -> Self {
        Self::with_kind(MediaKind::Video, samples)
    }

    fn with_kind(kind: MediaKind, samples: Vec<f32>) -> Self {
        Self {
            kind,
            samples: samples.into(),
            looping: false,
            cross_origin: false,
            bound: Cell::new(false),
        }
    }

    /// Loop playback instead of ending after the last sample.
    pub fn looping(mut self) -> Self {
        self.looping = true;
        self
    }

    /// Mark the element's media source as cross-origin without CORS.
    /// Such an element can never be routed.
    pub fn cross_origin(mut self) -> Self {
        self.cross_origin = true;
        self
    }

    #[inline]
    pub fn kind(&self) -> MediaKind {
        self.kind
    }

    /// Bind this element's audio output to a source node.
    ///
    /// One-time and non-reversible. Fails for cross-origin sources and for
    /// elements that were already bound (to this graph or any other).
    pub fn create_source(&self) -> Result<ElementSource, SourceError> {
        if self.cross_origin {
            return Err(SourceError::CrossOrigin);
        }
        if self.bound.replace(true) {
            return Err(SourceError::AlreadyBound);
        }
        Ok(ElementSource::new(self.samples.clone(), self.looping))
    }
}

/// A node in the document. Discovery only cares about the media variant.
pub enum DomNode {
    Media(Rc<MediaElement>),
    /// Any other element, carried so queries have something to filter out.
    Other(&'static str),
}

/// Identifies a registered mutation observer for later disconnection.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct ObserverId(u64);

struct Observer {
    id: ObserverId,
    callback: Box<dyn FnMut()>,
}

/// The page document.
///
/// Holds the element tree (flattened), delivers coalesced mutation
/// notifications, and tracks user activation for the autoplay policy.
///
/// Every mutating operation delivers **one** notification to each observer,
/// no matter how many nodes it touched - observers get batches, not raw
/// records.
pub struct Document {
    nodes: RefCell<Vec<DomNode>>,
    observers: RefCell<Vec<Observer>>,
    // Observers disconnected while a delivery is in flight
    stale_observers: RefCell<Vec<ObserverId>>,
    gesture_hooks: RefCell<Vec<Box<dyn FnOnce()>>>,
    user_activated: Cell<bool>,
    next_observer_id: Cell<u64>,
}

impl Document {
    pub fn new() -> Rc<Self> {
        Rc::new(Self {
            nodes: RefCell::new(Vec::new()),
            observers: RefCell::new(Vec::new()),
            stale_observers: RefCell::new(Vec::new()),
            gesture_hooks: RefCell::new(Vec::new()),
            user_activated: Cell::new(false),
            next_observer_id: Cell::new(0),
        })
    }

    /// Append one node and notify observers.
    pub fn append(&self, node: DomNode) {
        self.nodes.borrow_mut().push(node);
        self.notify_observers();
    }

    /// Append several nodes as a single batch (one notification).
    pub fn append_all(&self, nodes: impl IntoIterator<Item = DomNode>) {
        self.nodes.borrow_mut().extend(nodes);
        self.notify_observers();
    }

    /// Remove a media element (by identity) and notify observers.
    pub fn remove_media(&self, element: &Rc<MediaElement>) {
        self.nodes.borrow_mut().retain(|node| match node {
            DomNode::Media(el) => !Rc::ptr_eq(el, element),
            DomNode::Other(_) => true,
        });
        self.notify_observers();
    }

    /// All media-capable elements currently in the document.
    pub fn media_elements(&self) -> Vec<Rc<MediaElement>> {
        self.nodes
            .borrow()
            .iter()
            .filter_map(|node| match node {
                DomNode::Media(el) => Some(el.clone()),
                DomNode::Other(_) => None,
            })
            .collect()
    }

    /// Register a mutation observer. The callback runs once per mutation
    /// batch until [`disconnect`](Self::disconnect) is called with the
    /// returned id.
    pub fn observe(&self, callback: Box<dyn FnMut()>) -> ObserverId {
        let id = ObserverId(self.next_observer_id.get());
        self.next_observer_id.set(id.0 + 1);
        self.observers.borrow_mut().push(Observer { id, callback });
        id
    }

    /// Stop delivering mutations to the given observer.
    pub fn disconnect(&self, id: ObserverId) {
        let mut observers = self.observers.borrow_mut();
        let before = observers.len();
        observers.retain(|o| o.id != id);
        if observers.len() == before {
            // Mid-delivery: the observer is temporarily out of the list
            self.stale_observers.borrow_mut().push(id);
        }
    }

    fn notify_observers(&self) {
        // Take the observers out so callbacks can re-enter the document
        let mut delivering = std::mem::take(&mut *self.observers.borrow_mut());
        for observer in &mut delivering {
            (observer.callback)();
        }

        // Merge back, dropping any observer disconnected during delivery
        let stale = std::mem::take(&mut *self.stale_observers.borrow_mut());
        delivering.retain(|o| !stale.contains(&o.id));
        let mut observers = self.observers.borrow_mut();
        delivering.append(&mut *observers);
        *observers = delivering;
    }

    /// Register a hook for the first user-gesture-class event. Fires at most
    /// once, then is dropped.
    pub fn on_first_gesture(&self, hook: Box<dyn FnOnce()>) {
        self.gesture_hooks.borrow_mut().push(hook);
    }

    /// A user gesture (e.g. the first pointer interaction) reached the page.
    ///
    /// Sets the sticky activation flag, then runs and discards all one-shot
    /// gesture hooks. The flag is set first so hooks observe an activated
    /// page.
    pub fn dispatch_gesture(&self) {
        self.user_activated.set(true);
        let hooks = std::mem::take(&mut *self.gesture_hooks.borrow_mut());
        for hook in hooks {
            hook();
        }
    }

    /// Whether a user gesture has ever reached this page. The platform only
    /// allows audio context resumption once this is true.
    #[inline]
    pub fn user_activated(&self) -> bool {
        self.user_activated.get()
    }
}
