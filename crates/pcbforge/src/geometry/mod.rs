//! Geometry primitives: points, bounds, polygons and placement frames.

pub mod polygon;
pub mod transform;
pub mod types;

pub use polygon::*;
pub use transform::*;
pub use types::*;
