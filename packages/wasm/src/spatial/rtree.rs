//! R-tree based spatial index using the rstar crate.
//!
//! Answers pointer hit tests against node discs in O(log n).

use rstar::{AABB, PointDistance, RTree, RTreeObject};

use crate::geometry::Vector2;
use crate::graph::NodeId;

/// A node disc in the spatial index.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NodePoint {
    /// The node identifier.
    pub id: NodeId,
    /// Centre of the node.
    pub position: Vector2,
    /// Hit radius of the node.
    pub radius: f64,
}

impl NodePoint {
    /// Create a new NodePoint.
    pub fn new(id: NodeId, position: Vector2, radius: f64) -> Self {
        Self { id, position, radius }
    }
}

impl RTreeObject for NodePoint {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_point([self.position.x, self.position.y])
    }
}

impl PointDistance for NodePoint {
    fn distance_2(&self, point: &[f64; 2]) -> f64 {
        let dx = self.position.x - point[0];
        let dy = self.position.y - point[1];
        dx * dx + dy * dy
    }
}

/// Spatial index for graph nodes.
///
/// Uses an R*-tree over node centres. Positions change every tick, so the
/// index is rebuilt in bulk rather than updated incrementally.
pub struct SpatialIndex {
    tree: RTree<NodePoint>,
    max_radius: f64,
}

impl SpatialIndex {
    /// Create a new empty spatial index.
    pub fn new() -> Self {
        Self {
            tree: RTree::new(),
            max_radius: 0.0,
        }
    }

    /// Rebuild the index from a set of node discs.
    pub fn rebuild(&mut self, points: impl IntoIterator<Item = NodePoint>) {
        let points: Vec<_> = points.into_iter().collect();
        self.max_radius = points.iter().map(|p| p.radius).fold(0.0, f64::max);
        self.tree = RTree::bulk_load(points);
    }

    /// The node whose disc contains `at`, preferring the closest centre.
    pub fn node_at(&self, at: Vector2) -> Option<NodeId> {
        let query = [at.x, at.y];
        self.tree
            .locate_within_distance(query, self.max_radius * self.max_radius)
            .filter(|point| point.distance_2(&query) < point.radius * point.radius)
            .min_by(|a, b| a.distance_2(&query).total_cmp(&b.distance_2(&query)))
            .map(|point| point.id)
    }
}

impl Default for SpatialIndex {
    fn default() -> Self {
        Self::new()
    }
}
