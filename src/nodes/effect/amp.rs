//! The shared amplifier node

use dasp_graph::{Buffer, Input};

use crate::node::{AudioNode, ProcessContext};

/// Messages to control the amplifier
#[derive(Clone, Copy, Debug)]
pub enum AmpMessage {
    /// Replace the ramp target. Supersedes any earlier target still queued,
    /// so the last message of a block is the only one that matters.
    SetTarget(f32),
}

/// The single gain stage every routed media element feeds into.
///
/// Sums all connected inputs per channel and scales them by a smoothed gain.
/// The gain never steps: on every retarget it approaches the new value
/// exponentially with a fixed time constant, which is what keeps large boost
/// changes free of clicks and transient clipping spikes.
pub struct Amp {
    target: f32,
    current: f32,
    /// Exponential approach time constant in seconds
    time_constant: f32,
}

/// Matches the 0.02 s `setTargetAtTime` constant the booster schedules with.
const DEFAULT_TIME_CONSTANT: f32 = 0.02;

impl Amp {
    /// Create an amplifier with the given initial gain (applied unsmoothed).
    pub fn new(gain: f32) -> Self {
        Self {
            target: gain,
            current: gain,
            time_constant: DEFAULT_TIME_CONSTANT,
        }
    }

    /// Override the ramp time constant (seconds).
    pub fn with_time_constant(mut self, seconds: f32) -> Self {
        self.time_constant = seconds.max(0.0);
        self
    }

    /// The gain value currently being approached.
    #[inline]
    pub fn target(&self) -> f32 {
        self.target
    }
}

impl AudioNode for Amp {
    type Message = AmpMessage;

    fn process(
        &mut self,
        ctx: &ProcessContext,
        messages: impl Iterator<Item = AmpMessage>,
        inputs: &[Input],
        outputs: &mut [Buffer],
    ) {
        for msg in messages {
            match msg {
                AmpMessage::SetTarget(g) => self.target = g,
            }
        }

        if outputs.is_empty() {
            return;
        }

        // One-pole coefficient: after `time_constant` seconds the gain has
        // covered ~63% of the distance to the target.
        let coeff = if self.time_constant > 0.0 {
            (-1.0 / (self.time_constant * ctx.sample_rate as f32)).exp()
        } else {
            0.0
        };

        let target = self.target;
        let mut current = self.current;

        for (ch, out_buffer) in outputs.iter_mut().enumerate() {
            // Every channel walks the same gain trajectory
            let mut gain = self.current;

            for (i, out_sample) in out_buffer.iter_mut().enumerate() {
                gain = target + coeff * (gain - target);

                let mut acc = 0.0;
                for input in inputs {
                    let buffers = input.buffers();
                    if buffers.is_empty() {
                        continue;
                    }
                    // Mono inputs feed every output channel
                    let buffer = buffers.get(ch).unwrap_or_else(|| buffers.last().unwrap());
                    acc += buffer[i];
                }

                *out_sample = acc * gain;
            }

            if ch == 0 {
                current = gain;
            }
        }

        self.current = current;
    }

    #[inline]
    fn num_inputs(&self) -> usize {
        1
    }

    #[inline]
    fn num_outputs(&self) -> usize {
        2
    }
}
