//! Editor configuration.

use serde::{Deserialize, Serialize};

use crate::graph::PlacementConfig;
use crate::layout::{LayoutConfig, TickConfig};

/// Configuration for an [`EditorSession`](super::EditorSession).
///
/// Every field has a default, so the host may pass a partial object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Canvas area for nodes created without a position.
    pub placement: PlacementConfig,
    /// Force simulation parameters.
    pub layout: LayoutConfig,
    /// Frame step clamping.
    pub tick: TickConfig,
    /// Presses shorter than this are clicks, longer ones drag (default: 200).
    pub click_threshold_ms: f64,
    /// Pointer distance at which a link counts as hovered (default: 5).
    pub link_hover_threshold: f64,
    /// Number of nodes in the initial graph, root included (default: 5).
    pub seed_nodes: usize,
    /// Seed for random placement and the initial graph. `None` uses a fixed
    /// default.
    pub seed: Option<u64>,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            placement: PlacementConfig::default(),
            layout: LayoutConfig::default(),
            tick: TickConfig::default(),
            click_threshold_ms: 200.0,
            link_hover_threshold: 5.0,
            seed_nodes: 5,
            seed: None,
        }
    }
}
