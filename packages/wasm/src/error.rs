//! Error type shared by the graph, its serialization, and the editor session.
//!
//! Every variant is a recoverable condition reported back to the host; none
//! of them leaves the graph in a partially mutated state.

use thiserror::Error;

use crate::graph::NodeId;

/// Errors raised by graph mutation, path queries and loading.
#[derive(Debug, Error)]
pub enum GraphError {
    /// A link was requested between a node and itself.
    #[error("cannot link {0} to itself")]
    SelfLoop(NodeId),

    /// The two nodes are already linked.
    #[error("{0} and {1} are already linked")]
    DuplicateLink(NodeId, NodeId),

    /// Unlink requested for a pair that has no link.
    #[error("{0} and {1} are not linked")]
    NotLinked(NodeId, NodeId),

    /// A link was queried with a node that is neither of its endpoints.
    #[error("{0} is not an endpoint of this link")]
    InvalidEndpoint(NodeId),

    /// No path connects the two nodes.
    #[error("no path from {from} to {to}")]
    Unreachable { from: NodeId, to: NodeId },

    /// A serialized record has no link to any node loaded before it.
    #[error("node record {0} has no link to an already loaded node")]
    OrphanNode(NodeId),

    /// Serialized graph data is structurally invalid.
    #[error("malformed serialized graph: {0}")]
    MalformedSerializedGraph(String),

    /// The node id does not exist in the graph.
    #[error("unknown node {0}")]
    UnknownNode(NodeId),

    /// A node with this id already exists.
    #[error("duplicate node id {0}")]
    DuplicateNodeId(NodeId),

    /// Link cost must be finite and non-negative.
    #[error("invalid link cost {0}")]
    InvalidCost(f64),

    /// Every usable node id has been handed out.
    #[error("node id space exhausted")]
    IdsExhausted,

    /// A node position must have finite coordinates.
    #[error("non-finite position for {0}")]
    InvalidPosition(NodeId),

    /// The root anchors the graph and cannot be removed.
    #[error("cannot remove the root node {0}")]
    CannotRemoveRoot(NodeId),

    /// Serialized graph text is not valid JSON for the record format.
    #[error("malformed serialized graph: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result alias for graph operations.
pub type Result<T> = std::result::Result<T, GraphError>;
