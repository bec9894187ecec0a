//! Shortest paths over link costs.
//!
//! Dijkstra with a binary min-heap keyed by cumulative cost. Nodes are
//! indexed by their position in the BFS node list so ties resolve the same
//! way on every run.

use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap, HashSet};

use super::engine::Graph;
use super::node::NodeId;
use crate::error::{GraphError, Result};

/// A path between two nodes.
#[derive(Debug, Clone, PartialEq)]
pub struct Path {
    /// Nodes from start to end, inclusive.
    pub nodes: Vec<NodeId>,
    /// Sum of link costs along the path.
    pub cost: f64,
}

impl Path {
    /// Number of links traversed.
    pub fn hops(&self) -> usize {
        self.nodes.len().saturating_sub(1)
    }
}

/// Heap entry. Ordered so that `BinaryHeap` pops the cheapest first, with
/// the earlier node-list slot winning ties.
#[derive(Debug, Clone, Copy)]
struct Frontier {
    cost: f64,
    slot: usize,
}

impl PartialEq for Frontier {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Frontier {}

impl PartialOrd for Frontier {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Frontier {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .cost
            .total_cmp(&self.cost)
            .then_with(|| other.slot.cmp(&self.slot))
    }
}

/// Per-search bookkeeping. Slots start as the node-list order and grow as
/// nodes outside the root's component are discovered.
struct SearchState {
    ids: Vec<NodeId>,
    slots: HashMap<NodeId, usize>,
    cost: Vec<f64>,
    prev: Vec<Option<usize>>,
    settled: Vec<bool>,
}

impl SearchState {
    fn new(node_list: &[NodeId]) -> Self {
        let mut state = Self {
            ids: Vec::with_capacity(node_list.len()),
            slots: HashMap::with_capacity(node_list.len()),
            cost: Vec::with_capacity(node_list.len()),
            prev: Vec::with_capacity(node_list.len()),
            settled: Vec::with_capacity(node_list.len()),
        };
        for &id in node_list {
            state.slot(id);
        }
        state
    }

    fn slot(&mut self, id: NodeId) -> usize {
        if let Some(&slot) = self.slots.get(&id) {
            return slot;
        }
        let slot = self.ids.len();
        self.ids.push(id);
        self.slots.insert(id, slot);
        self.cost.push(f64::INFINITY);
        self.prev.push(None);
        self.settled.push(false);
        slot
    }
}

impl Graph {
    /// Cheapest path from `from` to `to`.
    ///
    /// Fails with `UnknownNode` if either id is not in the graph's arena and
    /// with `Unreachable` when the two nodes sit in different components.
    pub fn path(&self, from: NodeId, to: NodeId) -> Result<Path> {
        if self.node(from).is_none() {
            return Err(GraphError::UnknownNode(from));
        }
        if self.node(to).is_none() {
            return Err(GraphError::UnknownNode(to));
        }

        let mut state = SearchState::new(self.node_list());
        let start = state.slot(from);
        let mut frontier = BinaryHeap::new();

        state.cost[start] = 0.0;
        frontier.push(Frontier { cost: 0.0, slot: start });

        while let Some(Frontier { cost: reached, slot }) = frontier.pop() {
            if state.settled[slot] {
                continue;
            }
            state.settled[slot] = true;

            let id = state.ids[slot];
            let Some(node) = self.node(id) else {
                continue;
            };
            for &link_id in node.links() {
                let Some(link) = self.link_data(link_id) else {
                    continue;
                };
                let Ok(next) = link.other_node(id) else {
                    continue;
                };
                let next_slot = state.slot(next);

                let candidate = reached + link.cost();
                if candidate < state.cost[next_slot] {
                    state.cost[next_slot] = candidate;
                    state.prev[next_slot] = Some(slot);
                    frontier.push(Frontier {
                        cost: candidate,
                        slot: next_slot,
                    });
                }
            }
        }

        let goal = state.slot(to);
        if !state.settled[goal] {
            return Err(GraphError::Unreachable { from, to });
        }

        let mut walk = vec![to];
        let mut visited = HashSet::from([goal]);
        let mut current = goal;
        while current != start {
            current = match state.prev[current] {
                Some(p) if visited.insert(p) => p,
                _ => return Err(GraphError::Unreachable { from, to }),
            };
            walk.push(state.ids[current]);
        }
        walk.reverse();

        Ok(Path {
            nodes: walk,
            cost: state.cost[goal],
        })
    }
}
