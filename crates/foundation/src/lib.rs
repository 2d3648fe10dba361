//! Geodesy, bounds and identity primitives shared by the viewer crates.

pub mod bounds;
pub mod handles;
pub mod ids;
pub mod math;

pub use bounds::*;
pub use handles::*;
pub use ids::*;
