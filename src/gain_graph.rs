//! The gain graph: one amplifier, one sink, built on first need.

use std::rc::Rc;

use crate::dom::Document;
use crate::graph::{AudioGraph, Handle};
use crate::node::NodeId;
use crate::nodes::{Amp, AmpMessage, ElementSource, Output};

/// Whether the underlying audio context is allowed to process.
///
/// A context created before the page has user activation starts `Suspended`
/// (autoplay policy) and stays that way until a resume attempt is made while
/// the page is activated.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum ContextState {
    Suspended,
    Running,
}

struct GraphInner {
    graph: AudioGraph,
    amp: Handle<AmpMessage>,
    amp_id: NodeId,
    state: ContextState,
    /// Control-side mirror of the amp's ramp target
    target: f32,
}

/// Owns the page's single amplifier node and output sink.
///
/// Construction is lazy and idempotent: nothing is allocated until the first
/// [`ensure`](Self::ensure), and later calls are no-ops. The graph lives for
/// the rest of the page session once built - there is no teardown path.
pub struct GainGraph {
    document: Rc<Document>,
    sample_rate: u32,
    pending_output: Option<Output>,
    inner: Option<GraphInner>,
}

impl GainGraph {
    /// Prepare a gain graph that will terminate in `output` once built.
    pub fn new(document: &Rc<Document>, output: Output, sample_rate: u32) -> Self {
        Self {
            document: document.clone(),
            sample_rate,
            pending_output: Some(output),
            inner: None,
        }
    }

    /// Idempotently construct the context, amplifier, and sink wiring.
    pub fn ensure(&mut self) {
        if self.inner.is_some() {
            return;
        }
        let Some(output) = self.pending_output.take() else {
            return;
        };

        let mut graph = AudioGraph::new(self.sample_rate);
        let amp = graph.add(Amp::new(1.0));
        let amp_id = amp.id();
        let sink = graph.add(output);
        graph.connect(amp_id, sink.id());
        graph.set_terminal(sink.id());

        let state = if self.document.user_activated() {
            ContextState::Running
        } else {
            ContextState::Suspended
        };
        tracing::debug!(sample_rate = self.sample_rate, ?state, "audio graph constructed");

        self.inner = Some(GraphInner {
            graph,
            amp,
            amp_id,
            state,
            target: 1.0,
        });
    }

    /// Retarget the amplifier, ramping exponentially instead of stepping.
    ///
    /// A newer target always supersedes an in-flight ramp; the ramp restarts
    /// from wherever the gain currently sits, so there is never an audible
    /// discontinuity.
    pub fn apply_smooth(&mut self, gain: f32) {
        self.ensure();
        if let Some(inner) = &mut self.inner {
            inner.target = gain;
            inner.amp.send(AmpMessage::SetTarget(gain)).ok();
            tracing::debug!(gain, "gain retargeted");
        }
    }

    /// Best-effort resume of a suspended context.
    ///
    /// The platform denies resumption until the page has user activation;
    /// denial is expected and swallowed - the next reconcile or the first
    /// gesture will retry.
    pub fn resume_if_suspended(&mut self) {
        let Some(inner) = &mut self.inner else {
            return;
        };
        if inner.state == ContextState::Suspended {
            if self.document.user_activated() {
                inner.state = ContextState::Running;
                tracing::debug!("audio context resumed");
            } else {
                tracing::trace!("resume denied: no user activation yet");
            }
        }
    }

    /// Add a media element source and wire it into the amplifier.
    pub fn connect_source(&mut self, source: ElementSource) {
        self.ensure();
        if let Some(inner) = &mut self.inner {
            let handle = inner.graph.add(source);
            inner.graph.connect(handle.id(), inner.amp_id);
        }
    }

    /// Process one 64-sample block. No-op while the context is suspended
    /// (suspension pauses the audio clock, it does not output silence).
    pub fn process(&mut self) {
        if let Some(inner) = &mut self.inner {
            if inner.state == ContextState::Running {
                inner.graph.process();
            }
        }
    }

    /// The gain target currently scheduled on the amplifier, if the graph has
    /// been built.
    pub fn scheduled_target(&self) -> Option<f32> {
        self.inner.as_ref().map(|inner| inner.target)
    }

    /// Context state, or `None` before the graph exists.
    pub fn context_state(&self) -> Option<ContextState> {
        self.inner.as_ref().map(|inner| inner.state)
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Nodes in the underlying graph (0 before first [`ensure`](Self::ensure)).
    pub fn node_count(&self) -> usize {
        self.inner
            .as_ref()
            .map(|inner| inner.graph.node_count())
            .unwrap_or(0)
    }
}
