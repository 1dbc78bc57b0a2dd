mod rtrb_sink;

pub use rtrb_sink::RtrbSink;

#[cfg(feature = "cpal_sink")]
mod cpal_sink;

#[cfg(feature = "cpal_sink")]
pub use cpal_sink::CpalSink;

use dasp_graph::{Buffer, Input};

use crate::node::{AudioNode, ProcessContext};

/// The output sink the gain graph terminates in.
///
/// One closed set of variants instead of a generic parameter, so the graph
/// owner stays a plain struct. Ring buffer output is always available (and is
/// what the tests listen to); device output needs the `cpal_sink` feature.
pub enum Output {
    Rtrb(RtrbSink),
    #[cfg(feature = "cpal_sink")]
    Cpal(CpalSink),
}

impl Output {
    /// A stereo ring buffer output writing interleaved samples to `producer`.
    pub fn rtrb(producer: rtrb::Producer<f32>) -> Self {
        Output::Rtrb(RtrbSink::stereo(producer))
    }
}

impl AudioNode for Output {
    type Message = ();

    fn process(
        &mut self,
        ctx: &ProcessContext,
        messages: impl Iterator<Item = ()>,
        inputs: &[Input],
        outputs: &mut [Buffer],
    ) {
        match self {
            Output::Rtrb(s) => s.process(ctx, messages, inputs, outputs),
            #[cfg(feature = "cpal_sink")]
            Output::Cpal(s) => s.process(ctx, messages, inputs, outputs),
        }
    }

    #[inline]
    fn num_inputs(&self) -> usize {
        1
    }

    #[inline]
    fn num_outputs(&self) -> usize {
        0
    }
}
