//! Graph - core node-link data structure.
//!
//! Nodes and links live in a petgraph `StableGraph` arena and refer to each
//! other by stable id, never by pointer. The graph is defined as everything
//! reachable from the root; nodes that lose their last path to the root stay
//! in the arena but drop out of every enumeration.

use std::collections::{HashMap, HashSet, VecDeque};

use petgraph::Undirected;
use petgraph::stable_graph::{EdgeIndex, NodeIndex, StableGraph};
use rand::SeedableRng;
use rand::rngs::StdRng;

use super::link::{DEFAULT_LINK_COST, Link, LinkId};
use super::node::{IdAllocator, Node, NodeId, NodeOptions};
use super::placement::PlacementConfig;
use crate::error::{GraphError, Result};
use crate::geometry::Vector2;

/// Seed used when a graph is created without one.
pub const DEFAULT_SEED: u64 = 0x5eed;

/// The core graph.
///
/// This struct manages:
/// - Node and link storage via petgraph
/// - Id mapping between stable ids and arena indices
/// - The per-graph id allocator
/// - The cached BFS node list from the root
#[derive(Debug, Clone)]
pub struct Graph {
    /// Arena holding node and link payloads.
    arena: StableGraph<Node, Link, Undirected>,

    /// Map from stable NodeId to arena index
    node_index: HashMap<NodeId, NodeIndex>,

    /// Map from stable LinkId to arena index
    link_index: HashMap<LinkId, EdgeIndex>,

    root: NodeId,

    ids: IdAllocator,

    /// Next link ID to assign
    next_link_id: u32,

    placement: PlacementConfig,

    rng: StdRng,

    /// Reachable nodes in BFS order, refreshed after every structural change.
    node_list: Vec<NodeId>,
}

impl Graph {
    /// Create a graph containing only a root node built from `root`.
    pub fn new(root: NodeOptions) -> Result<Self> {
        Self::with_config(root, PlacementConfig::default(), DEFAULT_SEED)
    }

    /// Create a graph with explicit placement bounds and RNG seed.
    ///
    /// A root without a position is placed at the centre of the canvas.
    pub fn with_config(root: NodeOptions, placement: PlacementConfig, seed: u64) -> Result<Self> {
        Self::with_rng(root, placement, StdRng::seed_from_u64(seed))
    }

    pub(crate) fn with_rng(
        mut root: NodeOptions,
        placement: PlacementConfig,
        rng: StdRng,
    ) -> Result<Self> {
        if root.position.is_none() {
            root.position = Some(placement.center());
        }

        let mut graph = Self {
            arena: StableGraph::default(),
            node_index: HashMap::new(),
            link_index: HashMap::new(),
            root: NodeId(0),
            ids: IdAllocator::new(),
            next_link_id: 0,
            placement,
            rng,
            node_list: Vec::new(),
        };

        graph.root = graph.insert_node(root)?;
        graph.refresh_node_list();
        Ok(graph)
    }

    // =========================================================================
    // Node Operations
    // =========================================================================

    /// Add a node, optionally linked to `anchor` with the default cost.
    pub fn add_node(&mut self, options: NodeOptions, anchor: Option<NodeId>) -> Result<NodeId> {
        self.add_node_with_cost(options, anchor, DEFAULT_LINK_COST)
    }

    /// Add a node, optionally linked to `anchor` with the given cost.
    ///
    /// Without an anchor the node is created detached: it exists but is not
    /// part of the graph until something reachable links to it.
    pub fn add_node_with_cost(
        &mut self,
        options: NodeOptions,
        anchor: Option<NodeId>,
        cost: f64,
    ) -> Result<NodeId> {
        if let Some(anchor) = anchor {
            if !self.node_index.contains_key(&anchor) {
                return Err(GraphError::UnknownNode(anchor));
            }
        }

        let id = self.insert_node(options)?;

        if let Some(anchor) = anchor {
            if let Err(err) = self.link(anchor, id, cost) {
                self.discard_node(id);
                return Err(err);
            }
        }

        log::debug!("added {id} anchored to {anchor:?}");
        self.refresh_node_list();
        Ok(id)
    }

    /// Unlink every link of `id`. Returns how many links were removed.
    pub fn remove_all_links_of(&mut self, id: NodeId) -> Result<usize> {
        let node = self.node(id).ok_or(GraphError::UnknownNode(id))?;
        let links: Vec<LinkId> = node.links().iter().rev().copied().collect();

        for &link in &links {
            self.remove_link(link);
        }

        self.refresh_node_list();
        Ok(links.len())
    }

    /// Detach a node from all its neighbours and drop it from the arena.
    pub fn remove_node(&mut self, id: NodeId) -> Result<Node> {
        if id == self.root {
            return Err(GraphError::CannotRemoveRoot(id));
        }
        self.remove_all_links_of(id)?;

        let node = self.discard_node(id).ok_or(GraphError::UnknownNode(id))?;
        log::debug!("removed {id}");
        self.refresh_node_list();
        Ok(node)
    }

    /// Drop every node that is no longer reachable from the root.
    ///
    /// Returns the ids that were removed.
    pub fn prune_detached(&mut self) -> Vec<NodeId> {
        let reachable: HashSet<NodeId> = self.node_list.iter().copied().collect();
        let mut detached: Vec<NodeId> = self
            .node_index
            .keys()
            .filter(|id| !reachable.contains(id))
            .copied()
            .collect();
        detached.sort();

        for &id in &detached {
            let links = self.node(id).map(|node| node.links().to_vec()).unwrap_or_default();
            for link in links {
                self.remove_link(link);
            }
            self.discard_node(id);
        }

        if !detached.is_empty() {
            log::debug!("pruned {} detached nodes", detached.len());
        }
        detached
    }

    /// Move a node. Non-finite coordinates are rejected.
    pub fn set_position(&mut self, id: NodeId, position: Vector2) -> Result<()> {
        if !position.is_finite() {
            return Err(GraphError::InvalidPosition(id));
        }
        let node = self.node_mut(id).ok_or(GraphError::UnknownNode(id))?;
        node.position = position;
        Ok(())
    }

    /// Rename a node.
    pub fn rename(&mut self, id: NodeId, name: impl Into<String>) -> Result<()> {
        let node = self.node_mut(id).ok_or(GraphError::UnknownNode(id))?;
        node.name = name.into();
        Ok(())
    }

    /// Set one entry of a node's data bag, returning the previous value.
    pub fn set_data(
        &mut self,
        id: NodeId,
        key: impl Into<String>,
        value: serde_json::Value,
    ) -> Result<Option<serde_json::Value>> {
        let node = self.node_mut(id).ok_or(GraphError::UnknownNode(id))?;
        Ok(node.data.insert(key.into(), value))
    }

    // =========================================================================
    // Link Operations
    // =========================================================================

    /// Link two nodes. The new link is appended to both link lists.
    pub fn link(&mut self, a: NodeId, b: NodeId, cost: f64) -> Result<LinkId> {
        let link = Link::new(a, b, cost)?;
        let index_a = *self.node_index.get(&a).ok_or(GraphError::UnknownNode(a))?;
        let index_b = *self.node_index.get(&b).ok_or(GraphError::UnknownNode(b))?;

        if self.get_link(a, b).is_some() {
            return Err(GraphError::DuplicateLink(a, b));
        }

        let id = LinkId(self.next_link_id);
        self.next_link_id += 1;

        let index = self.arena.add_edge(index_a, index_b, link);
        self.link_index.insert(id, index);
        self.arena[index_a].push_link(id);
        self.arena[index_b].push_link(id);

        self.refresh_node_list();
        Ok(id)
    }

    /// Remove the link between two nodes from both endpoints.
    pub fn unlink(&mut self, a: NodeId, b: NodeId) -> Result<Link> {
        let link = self
            .get_link(a, b)
            .and_then(|id| self.remove_link(id))
            .ok_or(GraphError::NotLinked(a, b))?;
        self.refresh_node_list();
        Ok(link)
    }

    /// The link between `a` and `b`, if any. O(degree of `a`).
    pub fn get_link(&self, a: NodeId, b: NodeId) -> Option<LinkId> {
        let node = self.node(a)?;
        node.links().iter().copied().find(|&id| {
            self.link_data(id)
                .and_then(|link| link.other_node(a).ok())
                .is_some_and(|other| other == b)
        })
    }

    /// Neighbours of `id` in link-list order.
    ///
    /// The iterator reads the live link list; it is empty for unknown ids.
    pub fn linked_nodes(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.node(id)
            .into_iter()
            .flat_map(|node| node.links().iter())
            .filter_map(move |&link| self.link_data(link)?.other_node(id).ok())
    }

    /// Look up a link payload.
    pub fn link_data(&self, id: LinkId) -> Option<&Link> {
        self.link_index
            .get(&id)
            .and_then(|&index| self.arena.edge_weight(index))
    }

    /// Links between reachable nodes, each once, in node-list order.
    pub fn links(&self) -> Vec<LinkId> {
        let mut seen = HashSet::new();
        self.node_list
            .iter()
            .filter_map(|&id| self.node(id))
            .flat_map(|node| node.links().iter().copied())
            .filter(|link| seen.insert(*link))
            .collect()
    }

    // =========================================================================
    // Queries
    // =========================================================================

    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Reachable nodes in BFS discovery order, root first.
    pub fn node_list(&self) -> &[NodeId] {
        &self.node_list
    }

    /// Find a reachable node by id.
    pub fn node_by_id(&self, id: NodeId) -> Option<&Node> {
        self.node_list
            .iter()
            .find(|&&candidate| candidate == id)
            .and_then(|&id| self.node(id))
    }

    /// True when `id` is reachable from the root.
    pub fn contains(&self, id: NodeId) -> bool {
        self.node_list.contains(&id)
    }

    /// Any node in the arena, reachable or not.
    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.node_index
            .get(&id)
            .and_then(|&index| self.arena.node_weight(index))
    }

    pub fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        let index = *self.node_index.get(&id)?;
        self.arena.node_weight_mut(index)
    }

    /// Number of reachable nodes.
    pub fn node_count(&self) -> usize {
        self.node_list.len()
    }

    /// Number of links between reachable nodes.
    pub fn link_count(&self) -> usize {
        self.links().len()
    }

    /// Number of nodes in the arena, including detached ones.
    pub fn arena_len(&self) -> usize {
        self.arena.node_count()
    }

    pub fn placement(&self) -> &PlacementConfig {
        &self.placement
    }

    pub(crate) fn rng(&self) -> &StdRng {
        &self.rng
    }

    // =========================================================================
    // Internals
    // =========================================================================

    fn insert_node(&mut self, options: NodeOptions) -> Result<NodeId> {
        let id = match options.id {
            Some(id) => {
                self.ids.reserve(id)?;
                id
            }
            None => self.ids.allocate()?,
        };
        if self.node_index.contains_key(&id) {
            return Err(GraphError::DuplicateNodeId(id));
        }

        let position = match options.position {
            Some(position) if position.is_finite() => position,
            _ => self.placement.random_position(&mut self.rng),
        };

        let index = self.arena.add_node(Node::from_options(id, options, position));
        self.node_index.insert(id, index);
        Ok(id)
    }

    fn discard_node(&mut self, id: NodeId) -> Option<Node> {
        let index = self.node_index.remove(&id)?;
        self.arena.remove_node(index)
    }

    fn remove_link(&mut self, id: LinkId) -> Option<Link> {
        let index = self.link_index.remove(&id)?;
        if let Some((a, b)) = self.arena.edge_endpoints(index) {
            self.arena[a].drop_link(id);
            self.arena[b].drop_link(id);
        }
        self.arena.remove_edge(index)
    }

    fn refresh_node_list(&mut self) {
        self.node_list = self.compute_node_list();
    }

    fn compute_node_list(&self) -> Vec<NodeId> {
        let mut visited = HashSet::new();
        let mut order = Vec::new();
        let mut frontier = VecDeque::new();

        visited.insert(self.root);
        frontier.push_back(self.root);

        while let Some(id) = frontier.pop_front() {
            order.push(id);
            for next in self.linked_nodes(id) {
                if visited.insert(next) {
                    frontier.push_back(next);
                }
            }
        }

        order
    }
}
