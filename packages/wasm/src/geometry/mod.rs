//! Planar geometry primitives.
//!
//! `Vector2` is the value type for node positions and forces. `Segment`
//! answers closest-point queries used for pointer hover over links.

mod segment;
mod vector;

pub use segment::Segment;
pub use vector::Vector2;
