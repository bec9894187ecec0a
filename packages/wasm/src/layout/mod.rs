//! Force-directed layout.
//!
//! `LayoutEngine` moves nodes under spring and repulsion forces; the
//! `TickDriver` turns host frame timestamps into bounded time steps for it.

pub mod force;
pub mod ticker;

pub use force::{LayoutConfig, LayoutEngine};
pub use ticker::{TickConfig, TickDriver};
