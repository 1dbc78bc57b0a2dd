//! The page-session booster: one owning object, no globals.

use std::cell::RefCell;
use std::rc::Rc;

use serde_json::Value;

use crate::dom::Document;
use crate::gain_graph::ContextState;
use crate::nodes::Output;
use crate::protocol::{Request, Responder, Response};
use crate::recovery;
use crate::state::{ControlState, StateController};
use crate::watcher::DomWatcher;

/// Everything the booster needs for one page session, under one owner.
///
/// Construction wires the whole core together: the state controller (which
/// owns the gain graph and the media registry), the DOM watcher, and the
/// first-gesture resume hook. The audio graph itself stays unbuilt until
/// something actually needs it.
///
/// Lifetime is the page session - drop the `Booster` (navigation/unload) and
/// everything goes with it.
pub struct Booster {
    document: Rc<Document>,
    controller: Rc<RefCell<StateController>>,
    _watcher: DomWatcher,
}

impl Booster {
    /// Attach a booster to `document`, terminating in `output`.
    pub fn new(document: Rc<Document>, output: Output, sample_rate: u32) -> Self {
        let controller = Rc::new(RefCell::new(StateController::new(
            &document,
            output,
            sample_rate,
        )));
        let watcher = DomWatcher::attach(&document, &controller);
        recovery::arm(&document, &controller);

        Self {
            document,
            controller,
            _watcher: watcher,
        }
    }

    /// Attach a booster playing through the default audio device.
    /// Returns `None` if no usable output device exists.
    #[cfg(feature = "cpal_sink")]
    pub fn default_output(document: Rc<Document>) -> Option<Self> {
        let sink = crate::nodes::CpalSink::default_output()?;
        let sample_rate = sink.sample_rate();
        Some(Self::new(document, Output::Cpal(sink), sample_rate))
    }

    /// Entry point for the command transport.
    ///
    /// Returns `true` if the message was one of ours (a response has been or
    /// will be delivered through `responder`), `false` for anything else -
    /// the responder is dropped unused and the transport should treat the
    /// message as unhandled.
    pub fn on_message(&self, message: &Value, responder: Responder) -> bool {
        let Some(request) = Request::parse(message) else {
            return false;
        };

        match request {
            Request::Ping => responder.respond(Response::ok()),
            Request::GetState => {
                let state = self.controller.borrow().state();
                responder.respond(Response::state(state));
            }
            Request::SetState { enabled, percent } => {
                let enabled = crate::policy::coerce_flag(&enabled);
                let percent = crate::policy::clamp_percent(crate::policy::coerce_number(&percent));
                self.controller.borrow_mut().set_state(enabled, percent);
                responder.respond(Response::ok());
            }
        }
        true
    }

    /// Directly overwrite the control state (same path `SET_STATE` takes
    /// after wire coercion).
    pub fn set_state(&self, enabled: bool, percent: f64) {
        self.controller.borrow_mut().set_state(enabled, percent);
    }

    /// Current control state, verbatim.
    pub fn state(&self) -> ControlState {
        self.controller.borrow().state()
    }

    /// Process one 64-sample audio block. The embedder paces this - a no-op
    /// while the context is suspended or not yet built.
    pub fn process(&self) {
        self.controller.borrow_mut().process();
    }

    /// Live count of media elements routed into the graph.
    pub fn connected_elements(&self) -> usize {
        self.controller.borrow_mut().routed_count()
    }

    /// The gain target currently scheduled on the amplifier.
    pub fn scheduled_gain(&self) -> Option<f32> {
        self.controller.borrow().scheduled_gain()
    }

    /// Audio context state, or `None` before the graph is built.
    pub fn context_state(&self) -> Option<ContextState> {
        self.controller.borrow().context_state()
    }

    pub fn document(&self) -> &Rc<Document> {
        &self.document
    }
}
