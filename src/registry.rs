//! Discovery and one-time routing of media elements.

use std::rc::{Rc, Weak};

use hashbrown::HashMap;

use crate::dom::{Document, MediaElement};
use crate::gain_graph::GainGraph;

/// The set of media elements already routed into the gain graph.
///
/// Membership is monotonic - an element is never removed or reconnected,
/// because re-binding a media element's output is unsupported on the platform
/// and would blow up the whole pipeline. Keys are object identities, not DOM
/// attributes: an element removed from the document and re-added later is
/// still recognized, while a brand-new element never is.
///
/// Entries hold `Weak` references so membership does not keep dead elements
/// alive. An entry whose element has been dropped is discarded on lookup -
/// that also protects against a recycled allocation masquerading as an
/// already-routed element.
struct RoutedSet {
    entries: HashMap<usize, Weak<MediaElement>>,
}

impl RoutedSet {
    fn new() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    fn key(element: &Rc<MediaElement>) -> usize {
        Rc::as_ptr(element) as usize
    }

    fn contains(&mut self, element: &Rc<MediaElement>) -> bool {
        let key = Self::key(element);
        match self.entries.get(&key) {
            Some(weak) => match weak.upgrade() {
                Some(live) => Rc::ptr_eq(&live, element),
                None => {
                    // Dead entry at a reused address: the old element is gone
                    self.entries.remove(&key);
                    false
                }
            },
            None => false,
        }
    }

    fn insert(&mut self, element: &Rc<MediaElement>) {
        self.entries
            .insert(Self::key(element), Rc::downgrade(element));
    }

    fn live_count(&mut self) -> usize {
        self.entries.retain(|_, weak| weak.strong_count() > 0);
        self.entries.len()
    }
}

/// Finds media-capable elements in the document and routes each one into the
/// gain graph exactly once.
pub struct MediaElementRegistry {
    document: Rc<Document>,
    routed: RoutedSet,
}

impl MediaElementRegistry {
    pub fn new(document: &Rc<Document>) -> Self {
        Self {
            document: document.clone(),
            routed: RoutedSet::new(),
        }
    }

    /// Query the document and connect every unrouted media element.
    ///
    /// Safe to call any number of times: already-routed elements are skipped,
    /// and elements the platform refuses (cross-origin media, elements bound
    /// to another graph) are silently left unrouted. They will be retried on
    /// future calls and fail identically - a quiet no-op, never an error.
    pub fn discover_and_connect(&mut self, graph: &mut GainGraph) {
        let media = self.document.media_elements();
        if media.is_empty() {
            return;
        }

        graph.ensure();

        for element in &media {
            if self.routed.contains(element) {
                continue;
            }
            match element.create_source() {
                Ok(source) => {
                    graph.connect_source(source);
                    self.routed.insert(element);
                    tracing::debug!(kind = ?element.kind(), "routed media element");
                }
                Err(err) => {
                    tracing::trace!(%err, "leaving media element unrouted");
                }
            }
        }
    }

    /// How many routed elements are still alive.
    pub fn routed_count(&mut self) -> usize {
        self.routed.live_count()
    }
}
