//! SpringLink - WASM Module
//!
//! This module provides the core of the SpringLink graph editor: a graph of
//! named nodes joined by weighted links, a spring-based layout, cheapest path
//! search and JSON persistence. It is compiled to WebAssembly and exposes a
//! JavaScript-friendly API via wasm-bindgen.
//!
//! # Architecture
//!
//! - `geometry`: Vector and segment math
//! - `graph`: Graph data structure using petgraph's StableGraph
//! - `layout`: Force-directed layout step and frame tick clamping
//! - `spatial`: R-tree spatial indexing for O(log n) hit testing
//! - `editor`: Pointer, tool and selection handling around a graph

use js_sys::Float64Array;
use serde::Serialize;
use wasm_bindgen::prelude::*;

pub mod editor;
pub mod error;
pub mod geometry;
pub mod graph;
pub mod layout;
pub mod spatial;

pub use editor::{EditAction, EditorConfig, EditorSession, Tool};
pub use error::GraphError;
pub use geometry::Vector2;
pub use graph::{Graph, LinkId, NodeId, NodeOptions, Path};

/// Initialize the WASM module.
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
    // A second init (e.g. module re-instantiated in tests) keeps the first logger.
    let _ = console_log::init_with_level(log::Level::Info);
}

/// Main entry point for the editor.
///
/// This struct wraps an `EditorSession` and provides the public API
/// exposed to JavaScript.
#[wasm_bindgen]
pub struct SpringLinkWasm {
    session: EditorSession,
}

#[wasm_bindgen]
impl SpringLinkWasm {
    /// Create an editor from a (possibly partial) config object.
    ///
    /// Without a `seed` the initial graph is randomised.
    #[wasm_bindgen(constructor)]
    pub fn new(config: JsValue) -> Result<SpringLinkWasm, JsError> {
        let mut config: EditorConfig = if config.is_undefined() || config.is_null() {
            EditorConfig::default()
        } else {
            serde_wasm_bindgen::from_value(config)?
        };
        config
            .seed
            .get_or_insert_with(|| (js_sys::Math::random() * u32::MAX as f64) as u64);

        Ok(Self {
            session: EditorSession::new(config)?,
        })
    }

    // =========================================================================
    // Frame Loop
    // =========================================================================

    /// Advance the layout for a frame. Returns the applied step in seconds.
    pub fn tick(&mut self, timestamp_ms: f64) -> f64 {
        self.session.tick(timestamp_ms)
    }

    // =========================================================================
    // Pointer Input
    // =========================================================================

    #[wasm_bindgen(js_name = pointerDown)]
    pub fn pointer_down(&mut self, x: f64, y: f64, time_ms: f64) {
        self.session.pointer_down(Vector2::new(x, y), time_ms);
    }

    #[wasm_bindgen(js_name = pointerMove)]
    pub fn pointer_move(&mut self, x: f64, y: f64, time_ms: f64) {
        self.session.pointer_move(Vector2::new(x, y), time_ms);
    }

    /// Release the pointer. Returns true when the release was a click that
    /// changed something.
    #[wasm_bindgen(js_name = pointerUp)]
    pub fn pointer_up(&mut self, x: f64, y: f64, time_ms: f64) -> Result<bool, JsError> {
        Ok(self.session.pointer_up(Vector2::new(x, y), time_ms)?.is_some())
    }

    #[wasm_bindgen(js_name = pointerOut)]
    pub fn pointer_out(&mut self) {
        self.session.pointer_out();
    }

    /// Find the node under a point.
    #[wasm_bindgen(js_name = nodeAt)]
    pub fn node_at(&mut self, x: f64, y: f64) -> Option<u32> {
        self.session.node_at(Vector2::new(x, y)).map(|id| id.0)
    }

    // =========================================================================
    // Tools & Selection
    // =========================================================================

    #[wasm_bindgen(js_name = setTool)]
    pub fn set_tool(&mut self, name: &str) -> Result<(), JsError> {
        self.session.set_tool(name.parse()?);
        Ok(())
    }

    pub fn tool(&self) -> String {
        self.session.tool().to_string()
    }

    #[wasm_bindgen(js_name = selectNode)]
    pub fn select_node(&mut self, node_id: Option<u32>) -> Result<(), JsError> {
        self.session.select(node_id.map(NodeId))?;
        Ok(())
    }

    #[wasm_bindgen(js_name = selectedNode)]
    pub fn selected_node(&self) -> Option<u32> {
        self.session.selected().map(|id| id.0)
    }

    /// Rename the selected node. Returns false when nothing is selected.
    #[wasm_bindgen(js_name = renameSelected)]
    pub fn rename_selected(&mut self, name: &str) -> Result<bool, JsError> {
        Ok(self.session.rename_selected(name)?)
    }

    #[wasm_bindgen(js_name = hoveredLinks)]
    pub fn hovered_links(&self) -> Vec<u32> {
        self.session.hovered_links().iter().map(|id| id.0).collect()
    }

    // =========================================================================
    // Graph Operations
    // =========================================================================

    /// Add a node linked to `anchor`. Omitted coordinates place it at random.
    #[wasm_bindgen(js_name = addNode)]
    pub fn add_node(
        &mut self,
        anchor: u32,
        x: Option<f64>,
        y: Option<f64>,
    ) -> Result<u32, JsError> {
        let position = x.zip(y).map(Vector2::from);
        Ok(self.session.add_node(NodeId(anchor), position)?.0)
    }

    /// Remove a node. Returns the ids of every node that was dropped.
    #[wasm_bindgen(js_name = removeNode)]
    pub fn remove_node(&mut self, node_id: u32) -> Result<Vec<u32>, JsError> {
        Ok(ids(self.session.remove_node(NodeId(node_id))?))
    }

    pub fn link(&mut self, a: u32, b: u32, cost: Option<f64>) -> Result<u32, JsError> {
        let cost = cost.unwrap_or(graph::DEFAULT_LINK_COST);
        Ok(self.session.link(NodeId(a), NodeId(b), cost)?.0)
    }

    /// Unlink two nodes. Returns the ids of nodes dropped as a result.
    pub fn unlink(&mut self, a: u32, b: u32) -> Result<Vec<u32>, JsError> {
        Ok(ids(self.session.unlink(NodeId(a), NodeId(b))?))
    }

    /// Cheapest path between two nodes, as node ids. Also highlights it.
    #[wasm_bindgen(js_name = findPath)]
    pub fn find_path(&mut self, from: u32, to: u32) -> Result<Vec<u32>, JsError> {
        let path = self.session.find_path(NodeId(from), NodeId(to))?;
        Ok(ids(path.nodes))
    }

    #[wasm_bindgen(js_name = highlightedPath)]
    pub fn highlighted_path(&self) -> Option<Vec<u32>> {
        self.session
            .highlighted_path()
            .map(|path| ids(path.nodes.iter().copied()))
    }

    #[wasm_bindgen(js_name = highlightedPathCost)]
    pub fn highlighted_path_cost(&self) -> Option<f64> {
        self.session.highlighted_path().map(|path| path.cost)
    }

    #[wasm_bindgen(js_name = clearPath)]
    pub fn clear_path(&mut self) {
        self.session.clear_path();
    }

    /// Set one entry of a node's data bag.
    #[wasm_bindgen(js_name = setNodeData)]
    pub fn set_node_data(
        &mut self,
        node_id: u32,
        key: &str,
        value: JsValue,
    ) -> Result<(), JsError> {
        let value: serde_json::Value = serde_wasm_bindgen::from_value(value)?;
        self.session.set_node_data(NodeId(node_id), key, value)?;
        Ok(())
    }

    // =========================================================================
    // Persistence
    // =========================================================================

    pub fn save(&self) -> Result<String, JsError> {
        Ok(self.session.save()?)
    }

    /// Replace the graph with a saved one. On error the graph is unchanged.
    pub fn load(&mut self, json: &str) -> Result<(), JsError> {
        self.session.load(json)?;
        Ok(())
    }

    // =========================================================================
    // Rendering Data
    // =========================================================================

    #[wasm_bindgen(js_name = nodeCount)]
    pub fn node_count(&self) -> u32 {
        self.session.graph().node_count() as u32
    }

    #[wasm_bindgen(js_name = linkCount)]
    pub fn link_count(&self) -> u32 {
        self.session.graph().link_count() as u32
    }

    /// Array of node objects in node-list order.
    pub fn nodes(&self) -> Result<JsValue, JsError> {
        to_js(&self.session.node_views())
    }

    /// Array of link objects.
    pub fn links(&self) -> Result<JsValue, JsError> {
        to_js(&self.session.link_views())
    }

    /// Node positions as [x0, y0, x1, y1, ...] in node-list order.
    pub fn positions(&self) -> Float64Array {
        Float64Array::from(self.session.positions().as_slice())
    }
}

fn ids<I: IntoIterator<Item = NodeId>>(nodes: I) -> Vec<u32> {
    nodes.into_iter().map(|id| id.0).collect()
}

/// Serialize as plain JS objects rather than `Map`s.
fn to_js<T: Serialize + ?Sized>(value: &T) -> Result<JsValue, JsError> {
    Ok(value.serialize(&serde_wasm_bindgen::Serializer::json_compatible())?)
}
