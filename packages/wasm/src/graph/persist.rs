//! Save/load of the graph as a flat JSON record list.
//!
//! Records are written in node-list order, root first. Every link is listed
//! by both of its endpoints, so loading deduplicates.

use std::collections::{HashMap, HashSet};

use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};

use super::engine::{DEFAULT_SEED, Graph};
use super::node::{NodeData, NodeId, NodeOptions};
use super::placement::PlacementConfig;
use crate::error::{GraphError, Result};
use crate::geometry::Vector2;

/// One serialized node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeRecord {
    pub id: NodeId,
    pub name: String,
    pub r: f64,
    pub x: f64,
    pub y: f64,
    #[serde(default)]
    pub data: NodeData,
    #[serde(default)]
    pub links: Vec<LinkRecord>,
}

/// One end of a serialized link: the cost and the node at the other end.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LinkRecord {
    pub cost: f64,
    pub id: NodeId,
}

impl NodeRecord {
    fn options(&self) -> NodeOptions {
        NodeOptions {
            id: Some(self.id),
            name: Some(self.name.clone()),
            radius: Some(self.r),
            position: Some(Vector2::new(self.x, self.y)),
            data: self.data.clone(),
        }
    }
}

impl Graph {
    /// Snapshot every reachable node as a record.
    pub fn to_records(&self) -> Vec<NodeRecord> {
        self.node_list()
            .iter()
            .filter_map(|&id| self.node(id))
            .map(|node| NodeRecord {
                id: node.id(),
                name: node.name.clone(),
                r: node.radius,
                x: node.position.x,
                y: node.position.y,
                data: node.data.clone(),
                links: node
                    .links()
                    .iter()
                    .filter_map(|&link| self.link_data(link))
                    .filter_map(|link| {
                        Some(LinkRecord {
                            cost: link.cost(),
                            id: link.other_node(node.id()).ok()?,
                        })
                    })
                    .collect(),
            })
            .collect()
    }

    /// Serialize the graph to JSON.
    ///
    /// Fails with `InvalidPosition` rather than writing a node whose
    /// coordinates JSON cannot hold.
    pub fn save(&self) -> Result<String> {
        let records = self.to_records();
        if let Some(bad) = records.iter().find(|r| !(r.x.is_finite() && r.y.is_finite())) {
            return Err(GraphError::InvalidPosition(bad.id));
        }
        log::info!("saving {} nodes", records.len());
        Ok(serde_json::to_string(&records)?)
    }

    /// Parse a graph saved with [`Graph::save`].
    pub fn from_json(json: &str) -> Result<Self> {
        let records: Vec<NodeRecord> = serde_json::from_str(json)?;
        Self::from_records(&records)
    }

    /// Rebuild a graph from records using default placement and seed.
    pub fn from_records(records: &[NodeRecord]) -> Result<Self> {
        Self::rebuild(
            records,
            PlacementConfig::default(),
            StdRng::seed_from_u64(DEFAULT_SEED),
        )
    }

    /// Replace this graph with the one serialized in `json`.
    ///
    /// The graph is left untouched if loading fails. Placement bounds and
    /// random state carry over to the loaded graph.
    pub fn load(&mut self, json: &str) -> Result<()> {
        let records: Vec<NodeRecord> = serde_json::from_str(json)?;
        *self = Self::rebuild(&records, self.placement().clone(), self.rng().clone())?;
        log::info!("loaded {} nodes", self.node_count());
        Ok(())
    }

    fn rebuild(records: &[NodeRecord], placement: PlacementConfig, rng: StdRng) -> Result<Self> {
        validate(records)?;
        let Some((root, rest)) = records.split_first() else {
            return Err(GraphError::MalformedSerializedGraph("missing root".into()));
        };

        let mut graph = Self::with_rng(root.options(), placement, rng)?;
        let mut loaded = HashSet::from([root.id]);

        for record in rest {
            let anchor = record
                .links
                .iter()
                .find(|link| loaded.contains(&link.id))
                .ok_or(GraphError::OrphanNode(record.id))?;
            graph.add_node_with_cost(record.options(), Some(anchor.id), anchor.cost)?;
            loaded.insert(record.id);
        }

        for record in records {
            for link in &record.links {
                if graph.get_link(record.id, link.id).is_none() {
                    graph.link(record.id, link.id, link.cost)?;
                }
            }
        }

        Ok(graph)
    }
}

/// Structural checks that do not depend on load order.
fn validate(records: &[NodeRecord]) -> Result<()> {
    let malformed = |msg: String| Err(GraphError::MalformedSerializedGraph(msg));

    if records.is_empty() {
        return malformed("missing root".into());
    }

    let mut ids = HashSet::with_capacity(records.len());
    for record in records {
        if record.id >= NodeId::MAX {
            return malformed(format!("node id {} is out of range", record.id.0));
        }
        if !ids.insert(record.id) {
            return malformed(format!("duplicate node id {}", record.id));
        }
    }

    let mut costs: HashMap<(NodeId, NodeId), f64> = HashMap::new();
    for record in records {
        for link in &record.links {
            if link.id == record.id {
                return malformed(format!("{} links to itself", record.id));
            }
            if !ids.contains(&link.id) {
                return malformed(format!("{} links to unknown {}", record.id, link.id));
            }
            if !link.cost.is_finite() || link.cost < 0.0 {
                return malformed(format!("{} has invalid link cost {}", record.id, link.cost));
            }

            let key = (record.id.min(link.id), record.id.max(link.id));
            match costs.get(&key) {
                Some(&cost) if cost != link.cost => {
                    return malformed(format!(
                        "link {} - {} has conflicting costs {} and {}",
                        key.0, key.1, cost, link.cost
                    ));
                }
                Some(_) => {}
                None => {
                    costs.insert(key, link.cost);
                }
            }
        }
    }

    Ok(())
}
