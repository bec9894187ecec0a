//! Link type and related structures.
//!
//! Links are undirected weighted connections between two distinct nodes.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::node::NodeId;
use crate::error::{GraphError, Result};

/// Cost assigned to links created without an explicit one.
pub const DEFAULT_LINK_COST: f64 = 1.0;

/// Stable link identifier.
///
/// This ID remains valid even after other links are removed from the graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LinkId(pub u32);

impl LinkId {
    /// Create a new LinkId from a raw u32.
    #[inline]
    pub fn new(id: u32) -> Self {
        Self(id)
    }

    /// Get the raw u32 value.
    #[inline]
    pub fn raw(self) -> u32 {
        self.0
    }
}

impl fmt::Display for LinkId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Link({})", self.0)
    }
}

/// An undirected edge between two distinct nodes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Link {
    node_a: NodeId,
    node_b: NodeId,
    cost: f64,
}

impl Link {
    /// Create a link. Fails for self-loops and for negative or non-finite
    /// costs.
    pub fn new(node_a: NodeId, node_b: NodeId, cost: f64) -> Result<Self> {
        if node_a == node_b {
            return Err(GraphError::SelfLoop(node_a));
        }
        if !cost.is_finite() || cost < 0.0 {
            return Err(GraphError::InvalidCost(cost));
        }
        Ok(Self { node_a, node_b, cost })
    }

    #[inline]
    pub fn node_a(&self) -> NodeId {
        self.node_a
    }

    #[inline]
    pub fn node_b(&self) -> NodeId {
        self.node_b
    }

    #[inline]
    pub fn cost(&self) -> f64 {
        self.cost
    }

    #[inline]
    pub fn endpoints(&self) -> (NodeId, NodeId) {
        (self.node_a, self.node_b)
    }

    #[inline]
    pub fn contains(&self, node: NodeId) -> bool {
        self.node_a == node || self.node_b == node
    }

    /// The endpoint that is not `node`.
    pub fn other_node(&self, node: NodeId) -> Result<NodeId> {
        if node == self.node_a {
            Ok(self.node_b)
        } else if node == self.node_b {
            Ok(self.node_a)
        } else {
            Err(GraphError::InvalidEndpoint(node))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_link_id() {
        let id = LinkId::new(42);
        assert_eq!(id.raw(), 42);
        assert_eq!(format!("{}", id), "Link(42)");
    }

    #[test]
    fn test_other_node() {
        let link = Link::new(NodeId(1), NodeId(2), DEFAULT_LINK_COST).unwrap();
        assert_eq!(link.other_node(NodeId(1)).unwrap(), NodeId(2));
        assert_eq!(link.other_node(NodeId(2)).unwrap(), NodeId(1));
        assert!(matches!(
            link.other_node(NodeId(3)),
            Err(GraphError::InvalidEndpoint(NodeId(3)))
        ));
    }

    #[test]
    fn test_self_loop_rejected() {
        assert!(matches!(
            Link::new(NodeId(4), NodeId(4), 1.0),
            Err(GraphError::SelfLoop(NodeId(4)))
        ));
    }

    #[test]
    fn test_invalid_cost_rejected() {
        assert!(matches!(
            Link::new(NodeId(0), NodeId(1), -2.0),
            Err(GraphError::InvalidCost(_))
        ));
        assert!(Link::new(NodeId(0), NodeId(1), f64::NAN).is_err());
        assert!(Link::new(NodeId(0), NodeId(1), 0.0).is_ok());
    }
}
