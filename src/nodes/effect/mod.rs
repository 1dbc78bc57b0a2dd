mod amp;

pub use amp::{Amp, AmpMessage};
