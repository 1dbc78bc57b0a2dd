//! Control state and the controller that reconciles it into applied gain.

use std::rc::Rc;

use serde::Serialize;

use crate::dom::Document;
use crate::gain_graph::{ContextState, GainGraph};
use crate::nodes::Output;
use crate::policy;
use crate::registry::MediaElementRegistry;

/// The remote-controllable on/off + percentage state.
///
/// Invariant: `0 <= percent <= 900`, enforced on every mutation. While
/// `enabled` is false the percent is remembered but not applied.
#[derive(Clone, Copy, PartialEq, Debug, Serialize)]
pub struct ControlState {
    pub enabled: bool,
    pub percent: f64,
}

impl Default for ControlState {
    fn default() -> Self {
        Self {
            enabled: false,
            percent: 100.0,
        }
    }
}

/// Holds the current [`ControlState`] and drives full reconciliation on each
/// update: discover new media, recompute the effective gain, re-apply it,
/// then opportunistically resume the context.
///
/// There is no partial-update mode - every change is an unconditional
/// overwrite followed by the same reconcile sequence, which is what makes
/// rapid successive updates safe (the last one always wins).
pub struct StateController {
    state: ControlState,
    registry: MediaElementRegistry,
    graph: GainGraph,
}

impl StateController {
    pub fn new(document: &Rc<Document>, output: Output, sample_rate: u32) -> Self {
        Self {
            state: ControlState::default(),
            registry: MediaElementRegistry::new(document),
            graph: GainGraph::new(document, output, sample_rate),
        }
    }

    /// Overwrite the control state and reconcile.
    ///
    /// `percent` is re-clamped here no matter where it came from.
    pub fn set_state(&mut self, enabled: bool, percent: f64) {
        self.state.enabled = enabled;
        self.state.percent = policy::clamp_percent(percent);
        tracing::debug!(enabled, percent = self.state.percent, "control state updated");
        self.reconcile();
    }

    /// Current state, verbatim. No side effects.
    pub fn state(&self) -> ControlState {
        self.state
    }

    /// Run discovery only (the DOM watcher's path).
    pub fn discover(&mut self) {
        self.registry.discover_and_connect(&mut self.graph);
    }

    /// Best-effort context resume (the first-gesture path).
    pub fn resume_if_suspended(&mut self) {
        self.graph.resume_if_suspended();
    }

    /// Process one audio block through the gain graph.
    pub fn process(&mut self) {
        self.graph.process();
    }

    /// Live routed-element count.
    pub fn routed_count(&mut self) -> usize {
        self.registry.routed_count()
    }

    /// Nodes in the gain graph (0 before it is built).
    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    /// The amp's scheduled gain target, if the graph exists yet.
    pub fn scheduled_gain(&self) -> Option<f32> {
        self.graph.scheduled_target()
    }

    /// Audio context state, if the graph exists yet.
    pub fn context_state(&self) -> Option<ContextState> {
        self.graph.context_state()
    }

    fn reconcile(&mut self) {
        self.registry.discover_and_connect(&mut self.graph);
        let gain = policy::effective_gain(&self.state) as f32;
        self.graph.apply_smooth(gain);
        self.graph.resume_if_suspended();
    }
}
