//! Built-in audio nodes
//!
//! The booster pipeline is small and fixed in shape:
//! media element sources feed one [`Amp`], which feeds one output sink.

pub mod effect;
pub mod sink;
pub mod source;

pub use effect::{Amp, AmpMessage};
pub use sink::{Output, RtrbSink};
pub use source::ElementSource;

#[cfg(feature = "cpal_sink")]
pub use sink::CpalSink;
