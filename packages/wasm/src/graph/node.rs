//! Node type and related structures.
//!
//! Nodes are the vertices in the graph. Each node has:
//! - A stable unique identifier handed out by the owning graph's `IdAllocator`
//! - A display name and a radius
//! - Position in graph space, driven by the layout engine
//! - An ordered list of the links it participates in
//! - A typed key-value bag for user metadata

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::link::LinkId;
use crate::error::{GraphError, Result};
use crate::geometry::Vector2;

/// Radius given to nodes that do not specify one.
pub const DEFAULT_NODE_RADIUS: f64 = 5.0;

/// User-defined metadata attached to a node.
pub type NodeData = BTreeMap<String, serde_json::Value>;

/// Stable node identifier.
///
/// Ids are unique for the lifetime of a graph and survive save/load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub u32);

impl NodeId {
    /// Exclusive upper bound on usable ids.
    pub const MAX: NodeId = NodeId(u32::MAX);

    /// Create a new NodeId from a raw u32.
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

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Node({})", self.0)
    }
}

impl From<u32> for NodeId {
    #[inline]
    fn from(id: u32) -> Self {
        Self(id)
    }
}

impl From<NodeId> for u32 {
    #[inline]
    fn from(id: NodeId) -> Self {
        id.0
    }
}

/// Monotonic id source owned by a single graph.
///
/// `u32::MAX` is never handed out or accepted, so the counter cannot wrap
/// back onto live ids.
#[derive(Debug, Clone, Default)]
pub struct IdAllocator {
    next: u32,
}

impl IdAllocator {
    pub fn new() -> Self {
        Self { next: 0 }
    }

    /// Hand out the next unused id.
    pub fn allocate(&mut self) -> Result<NodeId> {
        let id = NodeId(self.next);
        if id >= NodeId::MAX {
            return Err(GraphError::IdsExhausted);
        }
        self.next += 1;
        Ok(id)
    }

    /// Record an externally chosen id so it is never handed out again.
    pub fn reserve(&mut self, id: NodeId) -> Result<()> {
        if id >= NodeId::MAX {
            return Err(GraphError::IdsExhausted);
        }
        self.next = self.next.max(id.0 + 1);
        Ok(())
    }

    /// The id the next call to `allocate` will return.
    pub fn peek(&self) -> NodeId {
        NodeId(self.next)
    }
}

/// Construction options for a node. Every field is optional.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct NodeOptions {
    pub id: Option<NodeId>,
    pub name: Option<String>,
    pub radius: Option<f64>,
    pub position: Option<Vector2>,
    pub data: NodeData,
}

impl NodeOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_id(mut self, id: NodeId) -> Self {
        self.id = Some(id);
        self
    }

    pub fn with_radius(mut self, radius: f64) -> Self {
        self.radius = Some(radius);
        self
    }

    pub fn at(mut self, x: f64, y: f64) -> Self {
        self.position = Some(Vector2::new(x, y));
        self
    }

    pub fn with_data(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.data.insert(key.into(), value);
        self
    }
}

/// A graph vertex.
///
/// The id and the link list are owned by the graph; everything else may be
/// edited through `Graph::node_mut`.
#[derive(Debug, Clone)]
pub struct Node {
    id: NodeId,
    pub name: String,
    pub radius: f64,
    pub position: Vector2,
    links: Vec<LinkId>,
    pub data: NodeData,
}

impl Node {
    /// Build a node from options, filling defaults. `position` must already
    /// be resolved by the caller.
    pub(crate) fn from_options(id: NodeId, options: NodeOptions, position: Vector2) -> Self {
        let radius = match options.radius {
            Some(r) if r.is_finite() && r > 0.0 => r,
            Some(r) => {
                log::warn!("{id}: invalid radius {r}, using {DEFAULT_NODE_RADIUS}");
                DEFAULT_NODE_RADIUS
            }
            None => DEFAULT_NODE_RADIUS,
        };

        Self {
            id,
            name: options.name.unwrap_or_else(|| id.0.to_string()),
            radius,
            position,
            links: Vec::new(),
            data: options.data,
        }
    }

    #[inline]
    pub fn id(&self) -> NodeId {
        self.id
    }

    /// Links touching this node, in the order they were created.
    #[inline]
    pub fn links(&self) -> &[LinkId] {
        &self.links
    }

    #[inline]
    pub fn degree(&self) -> usize {
        self.links.len()
    }

    pub(crate) fn push_link(&mut self, link: LinkId) {
        self.links.push(link);
    }

    pub(crate) fn drop_link(&mut self, link: LinkId) {
        self.links.retain(|&l| l != link);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_node_id() {
        let id = NodeId::new(42);
        assert_eq!(id.raw(), 42);
        assert_eq!(format!("{}", id), "Node(42)");
    }

    #[test]
    fn test_node_id_conversion() {
        let id: NodeId = 123.into();
        let raw: u32 = id.into();
        assert_eq!(raw, 123);
    }

    #[test]
    fn test_allocator_is_monotonic() {
        let mut ids = IdAllocator::new();
        assert_eq!(ids.allocate().unwrap(), NodeId(0));
        assert_eq!(ids.allocate().unwrap(), NodeId(1));

        ids.reserve(NodeId(10)).unwrap();
        assert_eq!(ids.allocate().unwrap(), NodeId(11));

        // Reserving a lower id never rewinds.
        ids.reserve(NodeId(3)).unwrap();
        assert_eq!(ids.peek(), NodeId(12));
    }

    #[test]
    fn test_allocator_stops_at_top_of_id_space() {
        let mut ids = IdAllocator::new();
        assert!(matches!(ids.reserve(NodeId(u32::MAX)), Err(GraphError::IdsExhausted)));
        assert_eq!(ids.peek(), NodeId(0));

        ids.reserve(NodeId(u32::MAX - 2)).unwrap();
        assert_eq!(ids.allocate().unwrap(), NodeId(u32::MAX - 1));
        assert!(matches!(ids.allocate(), Err(GraphError::IdsExhausted)));
        // A failed allocation leaves the counter where it was.
        assert!(matches!(ids.allocate(), Err(GraphError::IdsExhausted)));
        assert_eq!(ids.peek(), NodeId(u32::MAX));
    }

    #[test]
    fn test_defaults() {
        let node = Node::from_options(NodeId(7), NodeOptions::new(), Vector2::ZERO);
        assert_eq!(node.name, "7");
        assert_eq!(node.radius, DEFAULT_NODE_RADIUS);
        assert!(node.links().is_empty());
        assert!(node.data.is_empty());
    }

    #[test]
    fn test_invalid_radius_falls_back() {
        let options = NodeOptions::new().with_radius(-1.0);
        let node = Node::from_options(NodeId(0), options, Vector2::ZERO);
        assert_eq!(node.radius, DEFAULT_NODE_RADIUS);
    }

    #[test]
    fn test_options_from_json() {
        let options: NodeOptions =
            serde_json::from_str(r#"{"name": "hub", "position": {"x": 1.0, "y": 2.0}}"#).unwrap();
        assert_eq!(options.name.as_deref(), Some("hub"));
        assert_eq!(options.position, Some(Vector2::new(1.0, 2.0)));
        assert!(options.id.is_none());
    }
}
