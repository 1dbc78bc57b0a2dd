//! DOM mutation watcher.

use std::cell::RefCell;
use std::rc::Rc;

use crate::dom::{Document, ObserverId};
use crate::state::StateController;

/// Re-runs media discovery whenever the document's subtree changes.
///
/// Notifications arrive per mutation batch, not per mutated node, so one
/// large DOM operation costs one discovery pass. Elements inserted after
/// initial load are picked up this way without the embedder doing anything.
///
/// Disconnects its observer when dropped.
pub struct DomWatcher {
    document: Rc<Document>,
    observer: ObserverId,
}

impl DomWatcher {
    /// Start observing the document on behalf of `controller`.
    pub fn attach(document: &Rc<Document>, controller: &Rc<RefCell<StateController>>) -> Self {
        let weak = Rc::downgrade(controller);
        let observer = document.observe(Box::new(move || {
            if let Some(controller) = weak.upgrade() {
                controller.borrow_mut().discover();
            }
        }));
        Self {
            document: document.clone(),
            observer,
        }
    }
}

impl Drop for DomWatcher {
    fn drop(&mut self) {
        self.document.disconnect(self.observer);
    }
}
