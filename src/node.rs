//! Core node trait and context types.

use dasp_graph::{Buffer, Input};

/// Information available during audio processing.
///
/// Passed to every [`AudioNode::process`] call. Contains the graph's sample
/// rate and the block size (always 64 samples in the current implementation).
#[derive(Clone, Copy, Debug)]
pub struct ProcessContext {
    /// Sample rate of the graph in Hz (e.g., 44100, 48000)
    pub sample_rate: u32,
    /// Number of samples per block (currently always 64)
    pub block_size: usize,
}

/// Unique identifier for a node within an [`AudioGraph`](crate::graph::AudioGraph).
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct NodeId(pub(crate) u32);

/// The core trait for audio processing nodes.
///
/// Nodes never share mutable state with the control side. Parameter updates
/// arrive as messages through a lock-free ring buffer and are drained at the
/// start of each `process()` call.
///
/// Three shapes of node exist in this crate:
/// - **Sources** (0 inputs): media element outputs ([`ElementSource`](crate::nodes::ElementSource))
/// - **Effects** (1+ inputs, 1+ outputs): the amplifier ([`Amp`](crate::nodes::Amp))
/// - **Sinks** (1+ inputs, 0 outputs): ring buffer or device output
pub trait AudioNode: Send + 'static {
    /// Message type for parameter updates (use `()` if none are needed).
    type Message: Send + 'static;

    /// Process one block of audio.
    ///
    /// Implementations should drain `messages` first, then read `inputs` and
    /// fill `outputs`.
    fn process(
        &mut self,
        ctx: &ProcessContext,
        messages: impl Iterator<Item = Self::Message>,
        inputs: &[Input],
        outputs: &mut [Buffer],
    );

    /// Number of audio input channels (0 for sources).
    fn num_inputs(&self) -> usize {
        0
    }

    /// Number of audio output channels.
    fn num_outputs(&self) -> usize {
        1
    }
}
