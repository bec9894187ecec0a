//! EditorSession - routes pointer and UI input into graph operations.
//!
//! The session owns the graph together with everything the editor shell
//! needs between frames: the active tool, the selection, hovered links, the
//! highlighted path and the pending pointer press. All graph mutation and
//! layout stepping go through `&mut self`, one call at a time.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::config::EditorConfig;
use super::snapshot::{LinkView, NodeView};
use super::tool::{EditAction, Tool};
use crate::error::{GraphError, Result};
use crate::geometry::{Segment, Vector2};
use crate::graph::{DEFAULT_LINK_COST, DEFAULT_SEED, Graph, LinkId, NodeId, NodeOptions, Path};
use crate::layout::{LayoutEngine, TickDriver};
use crate::spatial::{NodePoint, SpatialIndex};

/// A pointer press that has not been released yet.
#[derive(Debug, Clone, Copy)]
struct Press {
    time_ms: f64,
}

/// Interactive editing state around a single graph.
pub struct EditorSession {
    config: EditorConfig,
    graph: Graph,
    layout: LayoutEngine,
    ticker: TickDriver,

    /// Hit-testing index over node discs
    spatial: SpatialIndex,

    /// Whether node positions or membership changed since the last rebuild
    spatial_dirty: bool,

    /// Used for picking anchors while seeding the initial graph
    rng: StdRng,

    tool: Tool,
    selected: Option<NodeId>,
    hovered_links: Vec<LinkId>,
    highlighted_path: Option<Path>,
    press: Option<Press>,
    pointer: Option<Vector2>,
}

impl EditorSession {
    /// Create a session with a root at the canvas centre and
    /// `config.seed_nodes - 1` more nodes, each linked to a random earlier
    /// node.
    pub fn new(config: EditorConfig) -> Result<Self> {
        let seed = config.seed.unwrap_or(DEFAULT_SEED);
        let root = NodeOptions::new()
            .named("Root")
            .with_radius(config.layout.node_radius);
        let graph = Graph::with_config(root, config.placement.clone(), seed)?;

        let mut session = Self {
            layout: LayoutEngine::new(config.layout.clone()),
            ticker: TickDriver::new(config.tick.clone()),
            spatial: SpatialIndex::new(),
            spatial_dirty: true,
            rng: StdRng::seed_from_u64(seed.wrapping_add(1)),
            tool: Tool::default(),
            selected: None,
            hovered_links: Vec::new(),
            highlighted_path: None,
            press: None,
            pointer: None,
            graph,
            config,
        };

        for _ in 1..session.config.seed_nodes {
            let nodes = session.graph.node_list();
            let anchor = nodes[session.rng.gen_range(0..nodes.len())];
            session.add_node(anchor, None)?;
        }

        log::info!(
            "editor session started with {} nodes",
            session.graph.node_count()
        );
        Ok(session)
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn tool(&self) -> Tool {
        self.tool
    }

    pub fn set_tool(&mut self, tool: Tool) {
        self.tool = tool;
    }

    pub fn selected(&self) -> Option<NodeId> {
        self.selected
    }

    /// Select a node, or clear the selection with `None`.
    pub fn select(&mut self, node: Option<NodeId>) -> Result<()> {
        if let Some(id) = node {
            if !self.graph.contains(id) {
                return Err(GraphError::UnknownNode(id));
            }
        }
        self.selected = node;
        Ok(())
    }

    pub fn hovered_links(&self) -> &[LinkId] {
        &self.hovered_links
    }

    pub fn highlighted_path(&self) -> Option<&Path> {
        self.highlighted_path.as_ref()
    }

    /// The node held by the pointer, excluded from layout while the press
    /// lasts.
    pub fn dragging(&self) -> Option<NodeId> {
        self.press.and(self.selected)
    }

    // =========================================================================
    // Simulation
    // =========================================================================

    /// Advance the layout for a frame at `timestamp_ms`. Returns the step
    /// that was applied, in seconds.
    pub fn tick(&mut self, timestamp_ms: f64) -> f64 {
        let dt = self.ticker.advance(timestamp_ms);
        if dt > 0.0 {
            let dragged = self.dragging();
            self.layout.step(&mut self.graph, dt, dragged);
            self.spatial_dirty = true;
            if let Some(at) = self.pointer {
                self.hovered_links = self.links_near(at);
            }
        }
        dt
    }

    // =========================================================================
    // Pointer Input
    // =========================================================================

    pub fn pointer_down(&mut self, at: Vector2, time_ms: f64) {
        self.pointer = Some(at);
        self.press = Some(Press { time_ms });
    }

    /// Track the pointer. A press held longer than the click threshold drags
    /// the selected node.
    pub fn pointer_move(&mut self, at: Vector2, time_ms: f64) {
        self.pointer = Some(at);

        if let (Some(press), Some(selected)) = (self.press, self.selected) {
            if time_ms - press.time_ms > self.config.click_threshold_ms {
                match self.graph.set_position(selected, at) {
                    Ok(()) => self.spatial_dirty = true,
                    Err(err) => log::warn!("drag ignored: {err}"),
                }
            }
        }

        self.hovered_links = self.links_near(at);
    }

    /// Release the pointer. A short press is a click and runs the active
    /// tool.
    pub fn pointer_up(&mut self, at: Vector2, time_ms: f64) -> Result<Option<EditAction>> {
        self.pointer = Some(at);
        match self.press.take() {
            Some(press) if time_ms - press.time_ms < self.config.click_threshold_ms => {
                self.click(at)
            }
            _ => Ok(None),
        }
    }

    /// The pointer left the canvas: cancel any press and hover.
    pub fn pointer_out(&mut self) {
        self.press = None;
        self.pointer = None;
        self.hovered_links.clear();
    }

    /// Run the active tool at `at`.
    pub fn click(&mut self, at: Vector2) -> Result<Option<EditAction>> {
        let clicked = self.node_at(at);

        let action = match self.tool {
            Tool::Select => {
                self.selected = clicked;
                Some(EditAction::Selected(clicked))
            }
            Tool::Add => match (self.selected, clicked) {
                (Some(anchor), None) => Some(EditAction::Added(self.add_node(anchor, Some(at))?)),
                _ => None,
            },
            Tool::Remove => match clicked {
                Some(id) => Some(EditAction::Removed(self.remove_node(id)?)),
                None => None,
            },
            Tool::Link => match self.pair_with_selection(clicked) {
                Some((a, b)) => Some(EditAction::Linked(self.link(a, b, DEFAULT_LINK_COST)?)),
                None => None,
            },
            Tool::Unlink => match self.pair_with_selection(clicked) {
                Some((a, b)) => {
                    self.unlink(a, b)?;
                    Some(EditAction::Unlinked(a, b))
                }
                None => None,
            },
            Tool::Path => match (self.selected, clicked) {
                (Some(a), Some(b)) => Some(EditAction::PathFound(self.find_path(a, b)?)),
                _ => None,
            },
        };

        Ok(action)
    }

    /// The node under `at`, if any.
    pub fn node_at(&mut self, at: Vector2) -> Option<NodeId> {
        self.refresh_spatial();
        self.spatial.node_at(at)
    }

    // =========================================================================
    // Graph Operations
    // =========================================================================

    /// Add a node linked to `anchor`. Without a position it is placed at
    /// random inside the canvas border.
    pub fn add_node(&mut self, anchor: NodeId, position: Option<Vector2>) -> Result<NodeId> {
        let options = NodeOptions {
            radius: Some(self.config.layout.node_radius),
            position,
            ..NodeOptions::default()
        };
        let id = self.graph.add_node(options, Some(anchor))?;
        self.after_structure_change();
        Ok(id)
    }

    /// Remove a node. Nodes left without a path to the root go with it.
    pub fn remove_node(&mut self, id: NodeId) -> Result<Vec<NodeId>> {
        self.graph.remove_node(id)?;
        let mut removed = vec![id];
        removed.extend(self.graph.prune_detached());
        self.after_structure_change();
        Ok(removed)
    }

    pub fn link(&mut self, a: NodeId, b: NodeId, cost: f64) -> Result<LinkId> {
        let id = self.graph.link(a, b, cost)?;
        self.after_structure_change();
        Ok(id)
    }

    /// Unlink two nodes, dropping whatever that disconnects from the root.
    pub fn unlink(&mut self, a: NodeId, b: NodeId) -> Result<Vec<NodeId>> {
        self.graph.unlink(a, b)?;
        let pruned = self.graph.prune_detached();
        self.after_structure_change();
        Ok(pruned)
    }

    /// Cheapest path between two nodes; also becomes the highlighted path.
    pub fn find_path(&mut self, from: NodeId, to: NodeId) -> Result<Path> {
        let path = self.graph.path(from, to)?;
        self.highlighted_path = Some(path.clone());
        Ok(path)
    }

    pub fn clear_path(&mut self) {
        self.highlighted_path = None;
    }

    /// Rename the selected node. Returns false when nothing is selected.
    pub fn rename_selected(&mut self, name: &str) -> Result<bool> {
        let Some(id) = self.selected else {
            log::warn!("rename ignored: no node selected");
            return Ok(false);
        };
        self.graph.rename(id, name)?;
        Ok(true)
    }

    pub fn set_node_data(
        &mut self,
        id: NodeId,
        key: &str,
        value: serde_json::Value,
    ) -> Result<Option<serde_json::Value>> {
        self.graph.set_data(id, key, value)
    }

    pub fn save(&self) -> Result<String> {
        self.graph.save()
    }

    /// Replace the graph. Selection, hover, path and any press are reset.
    pub fn load(&mut self, json: &str) -> Result<()> {
        self.graph.load(json)?;
        self.selected = None;
        self.press = None;
        self.hovered_links.clear();
        self.highlighted_path = None;
        self.spatial_dirty = true;
        Ok(())
    }

    // =========================================================================
    // Snapshots
    // =========================================================================

    /// Render-ready view of every node, in node-list order.
    pub fn node_views(&self) -> Vec<NodeView> {
        let on_path = |id: NodeId| {
            self.highlighted_path
                .as_ref()
                .is_some_and(|path| path.nodes.contains(&id))
        };

        self.graph
            .node_list()
            .iter()
            .filter_map(|&id| self.graph.node(id))
            .map(|node| NodeView {
                id: node.id(),
                name: node.name.clone(),
                radius: node.radius,
                x: node.position.x,
                y: node.position.y,
                root: node.id() == self.graph.root(),
                selected: Some(node.id()) == self.selected,
                on_path: on_path(node.id()),
                data: node.data.clone(),
            })
            .collect()
    }

    /// Render-ready view of every link.
    pub fn link_views(&self) -> Vec<LinkView> {
        self.graph
            .links()
            .into_iter()
            .filter_map(|id| Some((id, self.graph.link_data(id)?)))
            .map(|(id, link)| {
                let (a, b) = link.endpoints();
                LinkView {
                    id,
                    a,
                    b,
                    cost: link.cost(),
                    hovered: self.hovered_links.contains(&id),
                    on_path: self.path_uses(a, b),
                }
            })
            .collect()
    }

    /// Node positions as `[x0, y0, x1, y1, ...]` in node-list order.
    pub fn positions(&self) -> Vec<f64> {
        self.graph
            .node_list()
            .iter()
            .filter_map(|&id| self.graph.node(id))
            .flat_map(|node| [node.position.x, node.position.y])
            .collect()
    }

    // =========================================================================
    // Internals
    // =========================================================================

    fn pair_with_selection(&self, clicked: Option<NodeId>) -> Option<(NodeId, NodeId)> {
        let (Some(selected), Some(clicked)) = (self.selected, clicked) else {
            return None;
        };
        if selected == clicked {
            log::warn!("{} ignored: {selected} clicked against itself", self.tool);
            return None;
        }
        Some((selected, clicked))
    }

    fn path_uses(&self, a: NodeId, b: NodeId) -> bool {
        self.highlighted_path.as_ref().is_some_and(|path| {
            path.nodes
                .windows(2)
                .any(|w| (w[0] == a && w[1] == b) || (w[0] == b && w[1] == a))
        })
    }

    fn links_near(&self, at: Vector2) -> Vec<LinkId> {
        let threshold = self.config.link_hover_threshold;
        self.graph
            .links()
            .into_iter()
            .filter(|&id| {
                self.graph
                    .link_data(id)
                    .and_then(|link| {
                        let a = self.graph.node(link.node_a())?.position;
                        let b = self.graph.node(link.node_b())?.position;
                        Some(Segment::new(a, b).distance_to(at) < threshold)
                    })
                    .unwrap_or(false)
            })
            .collect()
    }

    fn refresh_spatial(&mut self) {
        if !self.spatial_dirty {
            return;
        }
        let graph = &self.graph;
        let points = graph
            .node_list()
            .iter()
            .filter_map(|&id| graph.node(id))
            .map(|node| NodePoint::new(node.id(), node.position, node.radius));
        self.spatial.rebuild(points);
        self.spatial_dirty = false;
    }

    fn after_structure_change(&mut self) {
        if let Some(id) = self.selected {
            if !self.graph.contains(id) {
                self.selected = None;
            }
        }
        let graph = &self.graph;
        self.hovered_links.retain(|&id| graph.link_data(id).is_some());
        self.highlighted_path = None;
        self.spatial_dirty = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Session with only the root, at (400, 300).
    fn empty_session() -> EditorSession {
        EditorSession::new(EditorConfig {
            seed_nodes: 1,
            seed: Some(1),
            ..EditorConfig::default()
        })
        .unwrap()
    }

    fn click(session: &mut EditorSession, x: f64, y: f64) -> Result<Option<EditAction>> {
        let at = Vector2::new(x, y);
        session.pointer_down(at, 1000.0);
        session.pointer_up(at, 1050.0)
    }

    #[test]
    fn test_seeded_graph_is_connected() {
        let session = EditorSession::new(EditorConfig {
            seed_nodes: 8,
            seed: Some(42),
            ..EditorConfig::default()
        })
        .unwrap();

        let graph = session.graph();
        assert_eq!(graph.node_count(), 8);
        assert_eq!(graph.link_count(), 7);
        assert_eq!(graph.node(graph.root()).unwrap().name, "Root");
        assert_eq!(
            graph.node(graph.root()).unwrap().position,
            Vector2::new(400.0, 300.0)
        );
    }

    #[test]
    fn test_same_seed_same_graph() {
        let config = EditorConfig {
            seed: Some(9),
            ..EditorConfig::default()
        };
        let a = EditorSession::new(config.clone()).unwrap();
        let b = EditorSession::new(config).unwrap();
        assert_eq!(a.save().unwrap(), b.save().unwrap());
    }

    #[test]
    fn test_select_and_deselect() {
        let mut session = empty_session();
        let root = session.graph().root();

        assert_eq!(
            click(&mut session, 402.0, 301.0).unwrap(),
            Some(EditAction::Selected(Some(root)))
        );
        assert_eq!(session.selected(), Some(root));

        click(&mut session, 10.0, 10.0).unwrap();
        assert_eq!(session.selected(), None);
    }

    #[test]
    fn test_add_tool() {
        let mut session = empty_session();
        let root = session.graph().root();
        session.select(Some(root)).unwrap();
        session.set_tool(Tool::Add);

        let action = click(&mut session, 600.0, 300.0).unwrap();
        let Some(EditAction::Added(id)) = action else {
            panic!("expected a new node, got {action:?}");
        };
        assert_eq!(session.graph().node(id).unwrap().position, Vector2::new(600.0, 300.0));
        assert!(session.graph().get_link(root, id).is_some());

        // Clicking on an existing node adds nothing.
        assert_eq!(click(&mut session, 600.0, 300.0).unwrap(), None);
    }

    #[test]
    fn test_link_and_unlink_tools() {
        let mut session = empty_session();
        let root = session.graph().root();
        let a = session.add_node(root, Some(Vector2::new(600.0, 300.0))).unwrap();
        let b = session.add_node(a, Some(Vector2::new(600.0, 100.0))).unwrap();

        session.select(Some(root)).unwrap();
        session.set_tool(Tool::Link);
        let action = click(&mut session, 600.0, 100.0).unwrap();
        assert!(matches!(action, Some(EditAction::Linked(_))));
        assert!(session.graph().get_link(root, b).is_some());

        // Linking again surfaces the error to the caller.
        assert!(matches!(
            click(&mut session, 600.0, 100.0),
            Err(GraphError::DuplicateLink(..))
        ));

        // Clicking the selection itself is a silent no-op.
        assert_eq!(click(&mut session, 400.0, 300.0).unwrap(), None);

        session.set_tool(Tool::Unlink);
        assert_eq!(
            click(&mut session, 600.0, 100.0).unwrap(),
            Some(EditAction::Unlinked(root, b))
        );
        assert!(session.graph().get_link(root, b).is_none());
        assert_eq!(session.graph().node_count(), 3);
    }

    #[test]
    fn test_remove_tool_prunes_detached() {
        let mut session = empty_session();
        let root = session.graph().root();
        let a = session.add_node(root, Some(Vector2::new(600.0, 300.0))).unwrap();
        let b = session.add_node(a, Some(Vector2::new(700.0, 300.0))).unwrap();
        session.select(Some(b)).unwrap();

        session.set_tool(Tool::Remove);
        let action = click(&mut session, 600.0, 300.0).unwrap();

        assert_eq!(action, Some(EditAction::Removed(vec![a, b])));
        assert_eq!(session.graph().node_list(), &[root]);
        assert_eq!(session.graph().arena_len(), 1);
        assert_eq!(session.selected(), None);

        assert!(matches!(
            click(&mut session, 400.0, 300.0),
            Err(GraphError::CannotRemoveRoot(_))
        ));
    }

    #[test]
    fn test_path_tool() {
        let mut session = empty_session();
        let root = session.graph().root();
        let a = session.add_node(root, Some(Vector2::new(600.0, 300.0))).unwrap();
        let b = session.add_node(a, Some(Vector2::new(600.0, 100.0))).unwrap();

        session.select(Some(root)).unwrap();
        session.set_tool(Tool::Path);
        let action = click(&mut session, 600.0, 100.0).unwrap();

        let Some(EditAction::PathFound(path)) = action else {
            panic!("expected a path, got {action:?}");
        };
        assert_eq!(path.nodes, vec![root, a, b]);
        assert_eq!(session.highlighted_path(), Some(&path));

        let on_path: Vec<_> = session.link_views().iter().map(|l| l.on_path).collect();
        assert_eq!(on_path, vec![true, true]);

        // Structural edits invalidate the highlight.
        session.add_node(b, None).unwrap();
        assert!(session.highlighted_path().is_none());
    }

    #[test]
    fn test_long_press_drags_selection() {
        let mut session = empty_session();
        let root = session.graph().root();
        let a = session.add_node(root, Some(Vector2::new(600.0, 300.0))).unwrap();
        session.select(Some(a)).unwrap();

        session.pointer_down(Vector2::new(600.0, 300.0), 0.0);
        // Within the click threshold nothing moves.
        session.pointer_move(Vector2::new(610.0, 300.0), 100.0);
        assert_eq!(session.graph().node(a).unwrap().position, Vector2::new(600.0, 300.0));

        session.pointer_move(Vector2::new(650.0, 320.0), 300.0);
        assert_eq!(session.graph().node(a).unwrap().position, Vector2::new(650.0, 320.0));
        assert_eq!(session.dragging(), Some(a));

        // Held node ignores layout forces.
        session.tick(1000.0);
        session.tick(1050.0);
        assert_eq!(session.graph().node(a).unwrap().position, Vector2::new(650.0, 320.0));

        // A long press does not count as a click.
        assert_eq!(session.pointer_up(Vector2::new(650.0, 320.0), 1100.0).unwrap(), None);
        assert_eq!(session.dragging(), None);
        assert_eq!(session.selected(), Some(a));
    }

    #[test]
    fn test_dragged_graph_reloads() {
        let mut session = empty_session();
        let root = session.graph().root();
        let a = session.add_node(root, Some(Vector2::new(600.0, 300.0))).unwrap();
        session.select(Some(a)).unwrap();

        session.pointer_down(Vector2::new(600.0, 300.0), 0.0);
        session.pointer_move(Vector2::new(123.25, 456.5), 300.0);
        // A non-finite pointer position never reaches the node.
        session.pointer_move(Vector2::new(f64::NAN, 10.0), 350.0);
        session.pointer_move(Vector2::new(f64::INFINITY, 10.0), 400.0);
        session.pointer_up(Vector2::new(123.25, 456.5), 450.0).unwrap();
        assert_eq!(session.graph().node(a).unwrap().position, Vector2::new(123.25, 456.5));

        let saved = session.save().unwrap();
        let mut reloaded = empty_session();
        reloaded.load(&saved).unwrap();
        assert_eq!(reloaded.graph().node(a).unwrap().position, Vector2::new(123.25, 456.5));
        assert_eq!(reloaded.save().unwrap(), saved);
    }

    #[test]
    fn test_tick_moves_nodes() {
        let mut session = empty_session();
        let root = session.graph().root();
        let a = session.add_node(root, Some(Vector2::new(700.0, 300.0))).unwrap();

        assert_eq!(session.tick(0.0), 0.0);
        assert_eq!(session.tick(16.0), 0.016);

        let distance = session
            .graph()
            .node(root)
            .unwrap()
            .position
            .distance(session.graph().node(a).unwrap().position);
        assert!(distance < 300.0);
    }

    #[test]
    fn test_hovered_links() {
        let mut session = empty_session();
        let root = session.graph().root();
        let a = session.add_node(root, Some(Vector2::new(600.0, 300.0))).unwrap();
        let link = session.graph().get_link(root, a).unwrap();

        session.pointer_move(Vector2::new(500.0, 303.0), 0.0);
        assert_eq!(session.hovered_links(), &[link]);

        session.pointer_move(Vector2::new(500.0, 320.0), 10.0);
        assert!(session.hovered_links().is_empty());

        session.pointer_move(Vector2::new(500.0, 301.0), 20.0);
        session.pointer_out();
        assert!(session.hovered_links().is_empty());
    }

    #[test]
    fn test_rename_selected() {
        let mut session = empty_session();
        assert!(!session.rename_selected("nobody").unwrap());

        let root = session.graph().root();
        session.select(Some(root)).unwrap();
        assert!(session.rename_selected("hub").unwrap());
        assert_eq!(session.graph().node(root).unwrap().name, "hub");
        assert!(session.graph().node(root).unwrap().data.is_empty());
        assert!(session.save().unwrap().contains(r#""name":"hub""#));
    }

    #[test]
    fn test_select_unknown_node() {
        let mut session = empty_session();
        assert!(matches!(
            session.select(Some(NodeId(50))),
            Err(GraphError::UnknownNode(_))
        ));
    }

    #[test]
    fn test_save_and_load_resets_state() {
        let mut session = EditorSession::new(EditorConfig {
            seed: Some(3),
            ..EditorConfig::default()
        })
        .unwrap();
        let saved = session.save().unwrap();

        let root = session.graph().root();
        session.select(Some(root)).unwrap();
        let extra = session.add_node(root, None).unwrap();

        session.load(&saved).unwrap();
        assert_eq!(session.selected(), None);
        assert!(session.graph().node(extra).is_none());
        assert_eq!(session.save().unwrap(), saved);

        assert!(session.load("{").is_err());
        assert_eq!(session.save().unwrap(), saved);
    }

    #[test]
    fn test_node_views() {
        let mut session = empty_session();
        let root = session.graph().root();
        session.select(Some(root)).unwrap();
        let a = session.add_node(root, Some(Vector2::new(1.0, 2.0))).unwrap();

        let views = session.node_views();
        assert_eq!(views.len(), 2);
        assert!(views[0].root && views[0].selected);
        assert_eq!(views[1].id, a);
        assert_eq!((views[1].x, views[1].y), (1.0, 2.0));
        assert_eq!(session.positions(), vec![400.0, 300.0, 1.0, 2.0]);
    }
}
