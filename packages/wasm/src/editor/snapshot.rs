//! Render-ready views of the session state, serialized for the host.

use serde::Serialize;

use crate::graph::{LinkId, NodeData, NodeId};

/// One node as the canvas draws it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NodeView {
    pub id: NodeId,
    pub name: String,
    pub radius: f64,
    pub x: f64,
    pub y: f64,
    pub root: bool,
    pub selected: bool,
    /// Part of the highlighted path
    pub on_path: bool,
    pub data: NodeData,
}

/// One link as the canvas draws it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LinkView {
    pub id: LinkId,
    pub a: NodeId,
    pub b: NodeId,
    pub cost: f64,
    pub hovered: bool,
    pub on_path: bool,
}
