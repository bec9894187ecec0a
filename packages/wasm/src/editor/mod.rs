//! Interactive editing on top of the graph.
//!
//! `EditorSession` turns pointer events and tool choices into graph
//! operations, keeps selection and hover state, and drives the layout from
//! frame timestamps.

mod config;
mod session;
mod snapshot;
mod tool;

pub use config::EditorConfig;
pub use session::EditorSession;
pub use snapshot::{LinkView, NodeView};
pub use tool::{EditAction, Tool, UnknownTool};
