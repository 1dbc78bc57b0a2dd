//! lauter - in-page audio gain booster engine
//!
//! Intercepts the audio output of a page's media elements, routes everything
//! through one shared amplifier, and exposes a remote-controllable
//! on/off + percentage state (0-900%, i.e. up to 9x boost).
//!
//! Design principles:
//! - One lazily-built audio graph per page session; never torn down
//! - Each media element is routed exactly once (re-binding would throw)
//! - Gain changes ramp exponentially, never step - no clicks, no spikes
//! - The amplifier gets its parameters via message ring buffers, not shared
//!   state
//! - Nothing in the core is ever fatal: unroutable media, denied resumes,
//!   and malformed control input all degrade to no-ops or silence
//!
//! # Example
//!
//! ```
//! use std::rc::Rc;
//! use lauter::{Booster, Document, DomNode, MediaElement, Output};
//!
//! let (producer, mut consumer) = rtrb::RingBuffer::new(1 << 16);
//!
//! let document = Document::new();
//! document.append(DomNode::Media(Rc::new(
//!     MediaElement::audio(vec![0.25; 48_000]).looping(),
//! )));
//!
//! let booster = Booster::new(document.clone(), Output::rtrb(producer), 48_000);
//!
//! document.dispatch_gesture(); // first user interaction unblocks audio
//! booster.set_state(true, 300.0); // boost to 3x
//!
//! for _ in 0..16 {
//!     booster.process();
//! }
//! assert!(consumer.pop().is_ok());
//! assert_eq!(booster.state().percent, 300.0);
//! ```
//!
//! The external UI talks to the booster through an untyped request/response
//! transport ([`Booster::on_message`]): `PING`, `GET_STATE`, and `SET_STATE`,
//! with everything else left unanswered.

mod booster;
pub mod dom;
mod gain_graph;
mod graph;
mod node;
pub mod nodes;
pub mod policy;
mod protocol;
pub mod recovery;
mod registry;
mod state;
mod watcher;

pub use booster::Booster;
pub use dom::{Document, DomNode, MediaElement, MediaKind, SourceError};
pub use gain_graph::{ContextState, GainGraph};
pub use graph::{AudioGraph, Handle};
pub use node::{AudioNode, NodeId, ProcessContext};
pub use nodes::Output;
pub use protocol::{Request, Responder, Response};
pub use registry::MediaElementRegistry;
pub use state::{ControlState, StateController};
pub use watcher::DomWatcher;
