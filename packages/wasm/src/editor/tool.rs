//! Editor tools: what a click does.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::graph::{LinkId, NodeId, Path};

/// The active click action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tool {
    /// Click a node to select it, empty space to clear the selection.
    #[default]
    Select,
    /// Click empty space to add a node linked to the selection.
    Add,
    /// Click a node to remove it.
    Remove,
    /// Click a node to link it to the selection.
    Link,
    /// Click a node to unlink it from the selection.
    Unlink,
    /// Click a node to highlight the cheapest path from the selection.
    Path,
}

impl Tool {
    pub const ALL: [Tool; 6] = [
        Tool::Select,
        Tool::Add,
        Tool::Remove,
        Tool::Link,
        Tool::Unlink,
        Tool::Path,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Tool::Select => "select",
            Tool::Add => "add",
            Tool::Remove => "remove",
            Tool::Link => "link",
            Tool::Unlink => "unlink",
            Tool::Path => "path",
        }
    }
}

impl fmt::Display for Tool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when parsing an unrecognised tool name.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown tool `{0}`")]
pub struct UnknownTool(pub String);

impl FromStr for Tool {
    type Err = UnknownTool;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Tool::ALL
            .into_iter()
            .find(|tool| tool.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| UnknownTool(s.to_string()))
    }
}

/// What a click ended up doing.
#[derive(Debug, Clone, PartialEq)]
pub enum EditAction {
    Selected(Option<NodeId>),
    Added(NodeId),
    /// The clicked node plus everything that lost its path to the root.
    Removed(Vec<NodeId>),
    Linked(LinkId),
    Unlinked(NodeId, NodeId),
    PathFound(Path),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_round_trip() {
        for tool in Tool::ALL {
            assert_eq!(tool.to_string().parse::<Tool>(), Ok(tool));
        }
        assert_eq!(" Link ".parse::<Tool>(), Ok(Tool::Link));
        assert_eq!("lasso".parse::<Tool>(), Err(UnknownTool("lasso".into())));
    }
}
