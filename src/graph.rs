//! Audio graph - owns nodes, their message queues, and the processing order.

use std::marker::PhantomData;

use dasp_graph::{Buffer, Input, NodeData, Processor};
use hashbrown::HashMap;
use petgraph::graph::NodeIndex;
use rtrb::{Consumer, Producer, RingBuffer};

use crate::node::{AudioNode, NodeId, ProcessContext};

/// A handle for sending messages to a node in the graph.
///
/// Returned by [`AudioGraph::add`]. Messages are buffered in a lock-free ring
/// buffer and drained at the start of the node's next `process()` call.
pub struct Handle<M: Send + 'static> {
    id: NodeId,
    sender: Producer<M>,
    _marker: PhantomData<M>,
}

impl<M: Send + 'static> Handle<M> {
    /// Send a message to the node (applied on the next audio block).
    ///
    /// Returns `Err(msg)` if the queue is full and the message was dropped.
    pub fn send(&mut self, msg: M) -> Result<(), M> {
        self.sender.push(msg).map_err(|rtrb::PushError::Full(m)| m)
    }

    pub fn id(&self) -> NodeId {
        self.id
    }
}

// Type-erased wrapper so heterogeneous nodes can live in one graph
trait ErasedNode: Send {
    fn process_erased(&mut self, ctx: &ProcessContext, inputs: &[Input], outputs: &mut [Buffer]);
}

struct NodeWrapper<N: AudioNode> {
    node: N,
    receiver: Consumer<N::Message>,
}

impl<N: AudioNode> ErasedNode for NodeWrapper<N> {
    fn process_erased(&mut self, ctx: &ProcessContext, inputs: &[Input], outputs: &mut [Buffer]) {
        // Split borrow so the draining iterator and the node can coexist
        let receiver = &mut self.receiver;
        let node = &mut self.node;

        let messages = std::iter::from_fn(|| receiver.pop().ok());
        node.process(ctx, messages, inputs, outputs);
    }
}

// Adapter for dasp_graph
struct DaspAdapter {
    node: Box<dyn ErasedNode>,
    ctx: ProcessContext,
}

impl dasp_graph::Node for DaspAdapter {
    fn process(&mut self, inputs: &[Input], outputs: &mut [Buffer]) {
        self.node.process_erased(&self.ctx, inputs, outputs);
    }
}

type InnerGraph = petgraph::graph::Graph<NodeData<DaspAdapter>, ()>;

/// An audio processing graph at a fixed sample rate.
///
/// Nodes are added with [`add`](Self::add), wired with
/// [`connect`](Self::connect), and the whole graph is pulled from its
/// terminal node one 64-sample block at a time via [`process`](Self::process).
pub struct AudioGraph {
    graph: InnerGraph,
    processor: Processor<InnerGraph>,
    ctx: ProcessContext,

    node_indices: HashMap<NodeId, NodeIndex>,
    next_node_id: u32,

    terminal: Option<NodeIndex>,
}

impl AudioGraph {
    /// Create a new graph with the given sample rate.
    pub fn new(sample_rate: u32) -> Self {
        Self {
            graph: InnerGraph::with_capacity(16, 16),
            processor: Processor::with_capacity(16),
            ctx: ProcessContext {
                sample_rate,
                block_size: 64, // dasp_graph block size
            },
            node_indices: HashMap::new(),
            next_node_id: 0,
            terminal: None,
        }
    }

    pub fn sample_rate(&self) -> u32 {
        self.ctx.sample_rate
    }

    /// Number of nodes currently in the graph.
    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Add a node, returning a handle for sending messages to it.
    pub fn add<N: AudioNode>(&mut self, node: N) -> Handle<N::Message> {
        let id = NodeId(self.next_node_id);
        self.next_node_id += 1;

        let (producer, consumer) = RingBuffer::new(64);

        let num_outputs = node.num_outputs();
        let wrapper = NodeWrapper {
            node,
            receiver: consumer,
        };
        let adapter = DaspAdapter {
            node: Box::new(wrapper),
            ctx: self.ctx,
        };

        // Sinks (0 outputs) still need one buffer for dasp_graph bookkeeping
        let node_data = match num_outputs {
            2 => NodeData::new2(adapter),
            _ => NodeData::new1(adapter),
        };

        let idx = self.graph.add_node(node_data);
        self.node_indices.insert(id, idx);

        Handle {
            id,
            sender: producer,
            _marker: PhantomData,
        }
    }

    /// Connect the output of `from` to an input of `to`.
    pub fn connect(&mut self, from: NodeId, to: NodeId) {
        let from_idx = self.node_indices[&from];
        let to_idx = self.node_indices[&to];
        self.graph.add_edge(from_idx, to_idx, ());
    }

    /// Set which node to process to (typically the sink).
    pub fn set_terminal(&mut self, id: NodeId) {
        self.terminal = Some(self.node_indices[&id]);
    }

    /// Process one block of audio through the graph.
    pub fn process(&mut self) {
        if let Some(terminal) = self.terminal {
            self.processor.process(&mut self.graph, terminal);
        }
    }
}
