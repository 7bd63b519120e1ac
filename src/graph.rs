//! The arena holding every tensor node of a secure computation graph.
//!
//! Nodes are never removed individually. A [`TensorHandle`] is a plain index into the arena, so
//! handles are `Copy` and may be shared freely between operations. Tearing down the graph means
//! dropping the [`TensorGraph`].

use std::sync::atomic::{AtomicU64, Ordering};

use tracing::trace;

use crate::{error::Error, ops::TensorDimensions, protocol::MpcProtocol};

static NEXT_GRAPH_ID: AtomicU64 = AtomicU64::new(0);

/// An opaque, immutable reference to a tensor node of a [`TensorGraph`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TensorHandle {
    graph: u64,
    index: usize,
}

impl TensorHandle {
    /// Position of the node in its graph, in creation order.
    pub fn index(self) -> usize {
        self.index
    }
}

#[derive(Debug)]
struct TensorNode {
    dims: TensorDimensions,
    protocol: MpcProtocol,
}

/// Arena of tensor nodes, owned by the graph builder.
#[derive(Debug)]
pub struct TensorGraph {
    id: u64,
    nodes: Vec<TensorNode>,
}

impl Default for TensorGraph {
    fn default() -> Self {
        Self::new()
    }
}

impl TensorGraph {
    /// Creates an empty graph.
    pub fn new() -> Self {
        Self {
            id: NEXT_GRAPH_ID.fetch_add(1, Ordering::Relaxed),
            nodes: vec![],
        }
    }

    /// Allocates a new tensor node with fixed dimensions and protocol.
    pub fn add_tensor(&mut self, dims: TensorDimensions, protocol: MpcProtocol) -> TensorHandle {
        let handle = TensorHandle {
            graph: self.id,
            index: self.nodes.len(),
        };
        trace!(index = handle.index, %protocol, shape = ?dims.as_slice(), "new tensor");
        self.nodes.push(TensorNode { dims, protocol });
        handle
    }

    /// The dimensions the tensor was created with.
    pub fn dimensions(&self, handle: TensorHandle) -> Result<&TensorDimensions, Error> {
        Ok(&self.node(handle)?.dims)
    }

    /// The protocol the tensor is shared in.
    pub fn protocol(&self, handle: TensorHandle) -> Result<MpcProtocol, Error> {
        Ok(self.node(handle)?.protocol)
    }

    /// Whether the handle was issued by this graph.
    pub fn contains(&self, handle: TensorHandle) -> bool {
        handle.graph == self.id && handle.index < self.nodes.len()
    }

    /// The number of tensor nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether no tensor was created yet.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    fn node(&self, handle: TensorHandle) -> Result<&TensorNode, Error> {
        if handle.graph != self.id {
            return Err(Error::UnknownTensor(handle));
        }
        self.nodes
            .get(handle.index)
            .ok_or(Error::UnknownTensor(handle))
    }
}
