//! Media element audio source

use std::sync::Arc;

use dasp_graph::{Buffer, Input};

use crate::node::{AudioNode, ProcessContext};

/// The audio output of a routed media element (mono source).
///
/// Created exclusively through
/// [`MediaElement::create_source`](crate::dom::MediaElement::create_source) -
/// binding an element's decoded samples into the graph is a one-time
/// operation, and the element keeps track of whether it already happened.
///
/// Plays the element's samples front to back, then either wraps (looping
/// elements) or goes silent (ended).
pub struct ElementSource {
    samples: Arc<[f32]>,
    pos: usize,
    looping: bool,
}

impl ElementSource {
    pub fn new(samples: Arc<[f32]>, looping: bool) -> Self {
        Self {
            samples,
            pos: 0,
            looping,
        }
    }

    /// True once a non-looping source has played all of its samples.
    #[inline]
    pub fn ended(&self) -> bool {
        !self.looping && self.pos >= self.samples.len()
    }
}

impl AudioNode for ElementSource {
    type Message = ();

    fn process(
        &mut self,
        _ctx: &ProcessContext,
        _messages: impl Iterator<Item = ()>,
        _inputs: &[Input],
        outputs: &mut [Buffer],
    ) {
        let Some((first, rest)) = outputs.split_first_mut() else {
            return;
        };

        for sample in first.iter_mut() {
            if self.pos >= self.samples.len() {
                if self.looping && !self.samples.is_empty() {
                    self.pos = 0;
                } else {
                    *sample = 0.0;
                    continue;
                }
            }
            *sample = self.samples[self.pos];
            self.pos += 1;
        }

        // Duplicate to any extra output channels
        for buffer in rest.iter_mut() {
            buffer.copy_from_slice(first);
        }
    }

    #[inline]
    fn num_inputs(&self) -> usize {
        0
    }

    #[inline]
    fn num_outputs(&self) -> usize {
        1
    }
}
