//! First-gesture suspension recovery.

use std::cell::RefCell;
use std::rc::Rc;

use crate::dom::Document;
use crate::state::StateController;

/// Arm the one-shot first-gesture resume hook.
///
/// The platform suspends audio contexts created before any user gesture;
/// this hook unblocks them the moment the first qualifying interaction
/// happens, then deregisters itself. The proactive retry at the end of every
/// reconcile covers everything after that, so once is all it ever needs to
/// fire.
pub fn arm(document: &Rc<Document>, controller: &Rc<RefCell<StateController>>) {
    let weak = Rc::downgrade(controller);
    document.on_first_gesture(Box::new(move || {
        if let Some(controller) = weak.upgrade() {
            controller.borrow_mut().resume_if_suspended();
        }
    }));
}
