//! Spring/repulsion force step.
//!
//! Linked nodes are pulled toward (or pushed out to) an ideal distance by a
//! spring whose force grows with the square of the deviation. Unlinked nodes
//! that come closer than a minimum distance are pushed apart. Every pair is
//! visited, so a step is O(n²) in the number of reachable nodes; this is
//! meant for editor-sized graphs of tens of nodes.

use serde::{Deserialize, Serialize};

use crate::geometry::Vector2;
use crate::graph::{DEFAULT_NODE_RADIUS, Graph, NodeId};

/// Offset substituted for two nodes sitting on exactly the same point.
pub const ZERO_DISTANCE_JITTER: f64 = 1e-3;

/// Configuration for the force step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// Rest length of every link (default: 200).
    pub ideal_length: f64,
    /// Spring coefficient applied to the squared deviation (default: 0.1).
    pub spring_strength: f64,
    /// Nominal node radius (default: 5).
    pub node_radius: f64,
    /// Unlinked nodes closer than `node_radius * min_distance_factor` repel
    /// (default: 2.5).
    pub min_distance_factor: f64,
    /// Upper bound on the magnitude of the net force on one node
    /// (default: 10000).
    pub max_force: f64,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            ideal_length: 200.0,
            spring_strength: 0.1,
            node_radius: DEFAULT_NODE_RADIUS,
            min_distance_factor: 2.5,
            max_force: 10_000.0,
        }
    }
}

impl LayoutConfig {
    /// Distance below which unlinked nodes repel.
    #[inline]
    pub fn min_distance(&self) -> f64 {
        self.node_radius * self.min_distance_factor
    }
}

/// Applies layout forces to a graph.
#[derive(Debug, Clone, Default)]
pub struct LayoutEngine {
    config: LayoutConfig,
}

impl LayoutEngine {
    pub fn new(config: LayoutConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    /// Advance the simulation by `dt` seconds.
    ///
    /// Nodes are moved one at a time in node-list order, so later nodes see
    /// the already-updated positions of earlier ones. `excluded` (the node
    /// held by the pointer) keeps its position. A zero or invalid `dt` is a
    /// no-op.
    pub fn step(&self, graph: &mut Graph, dt: f64, excluded: Option<NodeId>) {
        if !(dt > 0.0 && dt.is_finite()) {
            return;
        }

        let order = graph.node_list().to_vec();
        for &id in &order {
            if excluded == Some(id) {
                continue;
            }

            let force = self.net_force_among(graph, id, &order);
            if let Some(node) = graph.node_mut(id) {
                node.position += force * dt;
            }
        }
    }

    /// Clamped net force currently acting on `id`.
    pub fn net_force(&self, graph: &Graph, id: NodeId) -> Vector2 {
        self.net_force_among(graph, id, graph.node_list())
    }

    fn net_force_among(&self, graph: &Graph, id: NodeId, others: &[NodeId]) -> Vector2 {
        let Some(node) = graph.node(id) else {
            return Vector2::ZERO;
        };

        let mut force = Vector2::ZERO;
        for &other_id in others {
            if other_id == id {
                continue;
            }
            let Some(other) = graph.node(other_id) else {
                continue;
            };

            let mut offset = other.position - node.position;
            if offset.magnitude_sq() == 0.0 {
                offset = jitter(id, other_id);
            }

            if graph.get_link(id, other_id).is_some() {
                force += self.spring_force(offset);
            } else if offset.magnitude() < self.config.min_distance() {
                force += -offset;
            }
        }

        if !force.is_finite() {
            log::warn!("{id}: non-finite force discarded");
            return Vector2::ZERO;
        }
        force.clamp_magnitude(self.config.max_force)
    }

    /// Force on a node whose linked neighbour sits at `offset`.
    fn spring_force(&self, offset: Vector2) -> Vector2 {
        let Some(direction) = offset.normalize() else {
            return Vector2::ZERO;
        };
        let distance = offset.magnitude();
        let deviation = distance - self.config.ideal_length;
        let magnitude = self.config.spring_strength * deviation * deviation;

        if distance < self.config.ideal_length {
            direction * -magnitude
        } else {
            direction * magnitude
        }
    }
}

/// Deterministic stand-in for the offset between two coincident nodes. The
/// lower id sees its partner to the right, the higher id to the left, so the
/// pair separates instead of stacking.
fn jitter(id: NodeId, other: NodeId) -> Vector2 {
    if id < other {
        Vector2::new(ZERO_DISTANCE_JITTER, 0.0)
    } else {
        Vector2::new(-ZERO_DISTANCE_JITTER, 0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::NodeOptions;

    fn pair(distance: f64, linked: bool) -> (Graph, NodeId, NodeId) {
        let mut graph = Graph::new(NodeOptions::new().at(0.0, 0.0)).unwrap();
        let a = graph.root();
        let b = graph
            .add_node(NodeOptions::new().at(distance, 0.0), Some(a))
            .unwrap();
        if !linked {
            // Keep both reachable through a hub sitting at the ideal length
            // from each, so its springs stay slack.
            let half = distance / 2.0;
            let height = (200.0_f64 * 200.0 - half * half).sqrt();
            let hub = graph
                .add_node(NodeOptions::new().at(half, height), Some(a))
                .unwrap();
            graph.unlink(a, b).unwrap();
            graph.link(hub, b, 1.0).unwrap();
        }
        (graph, a, b)
    }

    #[test]
    fn test_ideal_length_is_equilibrium() {
        let (mut graph, a, b) = pair(200.0, true);
        let engine = LayoutEngine::default();

        assert!(engine.net_force(&graph, a).magnitude() < 1e-9);
        engine.step(&mut graph, 0.1, None);

        assert!((graph.node(a).unwrap().position.x - 0.0).abs() < 1e-9);
        assert!((graph.node(b).unwrap().position.x - 200.0).abs() < 1e-9);
    }

    #[test]
    fn test_spring_pulls_when_stretched() {
        let (mut graph, a, b) = pair(300.0, true);
        let engine = LayoutEngine::default();

        // 0.1 * (300 - 200)^2 = 1000 toward the neighbour.
        let force = engine.net_force(&graph, a);
        assert!((force.x - 1000.0).abs() < 1e-6);

        engine.step(&mut graph, 0.01, None);
        let distance = graph
            .node(a)
            .unwrap()
            .position
            .distance(graph.node(b).unwrap().position);
        assert!(distance < 300.0);
    }

    #[test]
    fn test_spring_pushes_when_compressed() {
        let (mut graph, a, b) = pair(100.0, true);
        let engine = LayoutEngine::default();

        let force = engine.net_force(&graph, a);
        assert!(force.x < 0.0);

        engine.step(&mut graph, 0.01, None);
        let distance = graph
            .node(a)
            .unwrap()
            .position
            .distance(graph.node(b).unwrap().position);
        assert!(distance > 100.0);
    }

    #[test]
    fn test_close_unlinked_nodes_repel() {
        let (mut graph, a, b) = pair(1.0, false);
        let engine = LayoutEngine::default();
        assert_eq!(engine.config().min_distance(), 12.5);

        let before_a = graph.node(a).unwrap().position;
        let before_b = graph.node(b).unwrap().position;

        engine.step(&mut graph, 0.1, None);

        let after_a = graph.node(a).unwrap().position;
        let after_b = graph.node(b).unwrap().position;
        assert!(after_a.x < before_a.x);
        assert!(after_b.x > before_b.x);
        assert!(after_a.distance(after_b) > before_a.distance(before_b));
    }

    #[test]
    fn test_force_is_clamped() {
        let (graph, a, _) = pair(100_000.0, true);
        let engine = LayoutEngine::default();
        let force = engine.net_force(&graph, a);
        assert!(force.magnitude() <= engine.config().max_force + 1e-6);
        assert!(force.magnitude() > engine.config().max_force - 1e-6);
    }

    #[test]
    fn test_coincident_nodes_separate_without_nan() {
        for linked in [true, false] {
            let (mut graph, a, b) = pair(0.0, linked);
            let engine = LayoutEngine::default();

            for _ in 0..5 {
                engine.step(&mut graph, 0.05, None);
            }

            let pa = graph.node(a).unwrap().position;
            let pb = graph.node(b).unwrap().position;
            assert!(pa.is_finite() && pb.is_finite());
            assert!(pa.distance(pb) > 0.0, "linked={linked}");
            assert!(engine.net_force(&graph, a).magnitude() <= engine.config().max_force);
        }
    }

    #[test]
    fn test_excluded_node_stays_put() {
        let (mut graph, a, b) = pair(300.0, true);
        let engine = LayoutEngine::default();

        engine.step(&mut graph, 0.05, Some(a));

        assert_eq!(graph.node(a).unwrap().position, Vector2::new(0.0, 0.0));
        assert!(graph.node(b).unwrap().position.x < 300.0);
    }

    #[test]
    fn test_zero_dt_is_noop() {
        let (mut graph, a, b) = pair(300.0, true);
        let engine = LayoutEngine::default();

        engine.step(&mut graph, 0.0, None);
        engine.step(&mut graph, f64::NAN, None);

        assert_eq!(graph.node(a).unwrap().position, Vector2::new(0.0, 0.0));
        assert_eq!(graph.node(b).unwrap().position, Vector2::new(300.0, 0.0));
    }

    #[test]
    fn test_detached_nodes_are_ignored() {
        let (mut graph, a, _) = pair(200.0, true);
        let ghost = graph
            .add_node(NodeOptions::new().at(0.5, 0.0), None)
            .unwrap();
        let engine = LayoutEngine::default();

        engine.step(&mut graph, 0.1, None);

        assert_eq!(graph.node(ghost).unwrap().position, Vector2::new(0.5, 0.0));
        assert!((graph.node(a).unwrap().position.x).abs() < 1e-9);
    }
}
