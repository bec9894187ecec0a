//! Graph data structures and operations.
//!
//! This module provides the node-link graph: nodes and links stored in a
//! petgraph `StableGraph` arena and addressed by stable ids, breadth-first
//! enumeration from the root, cheapest-path search, and JSON persistence.

mod engine;
mod link;
mod node;
mod path;
mod persist;
mod placement;

pub use engine::{DEFAULT_SEED, Graph};
pub use link::{DEFAULT_LINK_COST, Link, LinkId};
pub use node::{DEFAULT_NODE_RADIUS, IdAllocator, Node, NodeData, NodeId, NodeOptions};
pub use path::Path;
pub use persist::{LinkRecord, NodeRecord};
pub use placement::PlacementConfig;
